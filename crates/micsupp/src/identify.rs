//! Device identification
//!
//! A bus device is identified from its hardware description node when it has
//! one, falling back to the bus-level device id otherwise. Both tables are
//! immutable statics.

use codec_platform::HwNode;

use crate::catalog::DeviceType;
use crate::error::{Error, Result};

/// Bus-level device ids (SPI modalias).
pub static BUS_ID_TABLE: [(&str, DeviceType); 4] = [
    ("wm5102", DeviceType::Wm5102),
    ("wm8280", DeviceType::Wm8280),
    ("wm8281", DeviceType::Wm8280),
    ("wm5110", DeviceType::Wm5110),
];

/// Description-node compatible strings.
pub static COMPATIBLE_TABLE: [(&str, DeviceType); 4] = [
    ("wlf,wm5102", DeviceType::Wm5102),
    ("wlf,wm8280", DeviceType::Wm8280),
    ("wlf,wm8281", DeviceType::Wm8280),
    ("wlf,wm5110", DeviceType::Wm5110),
];

fn lookup(table: &[(&str, DeviceType)], key: &str) -> Option<DeviceType> {
    table.iter().find(|(name, _)| *name == key).map(|&(_, ty)| ty)
}

/// Variant named by a compatible string.
#[must_use]
pub fn from_compatible(compatible: &str) -> Option<DeviceType> {
    lookup(&COMPATIBLE_TABLE, compatible)
}

/// Variant named by a bus device id.
#[must_use]
pub fn from_bus_id(bus_id: &str) -> Option<DeviceType> {
    lookup(&BUS_ID_TABLE, bus_id)
}

/// Resolve the chip variant of a bus device.
///
/// The node's compatible string wins when it names a known chip; the bus id
/// table is consulted otherwise.
pub fn identify<E>(node: Option<&dyn HwNode>, bus_id: &str) -> Result<DeviceType, E> {
    let from_node = node.and_then(|n| n.compatible()).and_then(from_compatible);
    match from_node.or_else(|| from_bus_id(bus_id)) {
        Some(ty) => Ok(ty),
        None => {
            error!("Unknown device type {}", bus_id);
            Err(Error::UnknownDevice)
        }
    }
}
