//! Hardware description node abstraction
//!
//! A device-tree style node attached to the bus device. Drivers use it for
//! two things: the `compatible` string that names the chip variant, and
//! per-child regulator init data overriding built-in defaults.

use crate::regulator::InitData;

/// Hardware description node of a bus device.
///
/// Nodes are read-only and shared by every driver bound to the device.
pub trait HwNode: Sync {
    /// Primary compatible string, e.g. `"wlf,wm5110"`.
    fn compatible(&self) -> Option<&str>;

    /// Regulator init data parsed from the child node `child`, if that
    /// child exists and carries regulator properties.
    fn regulator_init_data(&self, child: &str) -> Option<InitData>;
}
