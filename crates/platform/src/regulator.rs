//! Regulator framework abstraction
//!
//! Static regulator metadata, machine constraints, the registration seam and
//! the generic register-backed operations every selector-based regulator
//! driver reuses.

use heapless::String;

use crate::regmap::RegisterMap;

/// Capacity of a consumer device name, bytes. Fits full description-node
/// paths such as `soc:spi@7e204000:codec@1`.
pub const DEV_NAME_CAPACITY: usize = 64;

/// Kind of output a regulator controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegulatorType {
    /// Voltage regulator
    Voltage,
    /// Current regulator
    Current,
}

/// Static description of a selector-based regulator.
///
/// Register fields are given as (address, mask) pairs. The selector field is
/// shifted by the mask's trailing zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegulatorDesc {
    /// Regulator name
    pub name: &'static str,
    /// Name of the upstream supply
    pub supply_name: &'static str,
    /// Output kind
    pub kind: RegulatorType,
    /// Number of selectors (`0..n_voltages`)
    pub n_voltages: u32,
    /// Voltage selector register
    pub vsel_reg: u32,
    /// Voltage selector field
    pub vsel_mask: u32,
    /// Enable register
    pub enable_reg: u32,
    /// Enable field
    pub enable_mask: u32,
    /// Bypass register
    pub bypass_reg: u32,
    /// Bypass field
    pub bypass_mask: u32,
    /// Nominal time for the output to settle after enable, in µs
    pub enable_time_us: u32,
}

impl RegulatorDesc {
    /// Highest valid selector.
    #[must_use]
    pub const fn max_selector(&self) -> u32 {
        self.n_voltages.saturating_sub(1)
    }
}

/// Operations machine constraints allow a consumer to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidOps(u8);

impl ValidOps {
    /// No changes permitted
    pub const NONE: Self = Self(0);
    /// Output voltage may change
    pub const VOLTAGE: Self = Self(0x01);
    /// Current limit may change
    pub const CURRENT: Self = Self(0x02);
    /// Operating mode may change
    pub const MODE: Self = Self(0x04);
    /// Output may be enabled/disabled
    pub const STATUS: Self = Self(0x08);
    /// Dynamic load-based mode switching
    pub const DRMS: Self = Self(0x10);
    /// Bypass may be toggled
    pub const BYPASS: Self = Self(0x20);

    /// Build from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Union of two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every bit of `other` is permitted.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for ValidOps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Machine constraints applied when a regulator is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Constraints {
    /// Lowest permitted output, µV
    pub min_uv: u32,
    /// Highest permitted output, µV
    pub max_uv: u32,
    /// Permitted operations
    pub valid_ops: ValidOps,
}

/// Binds a regulator output to a named supply of a consumer device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerSupply {
    /// Supply name as seen by the consumer
    pub supply: &'static str,
    /// Consumer device name
    pub dev_name: String<DEV_NAME_CAPACITY>,
}

/// Initialisation data handed to the framework at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    /// Machine constraints
    pub constraints: Constraints,
    /// Consumer binding, if any
    pub consumer_supply: Option<ConsumerSupply>,
}

impl InitData {
    /// Init data with constraints only.
    #[must_use]
    pub const fn new(constraints: Constraints) -> Self {
        Self {
            constraints,
            consumer_supply: None,
        }
    }
}

/// Per-instance registration parameters.
#[derive(Debug, Clone, Copy)]
pub struct RegulatorConfig<'a> {
    /// Parent device name
    pub dev_name: &'a str,
    /// Resolved init data
    pub init_data: &'a InitData,
    /// Whether the init data came from a hardware description node
    pub from_node: bool,
}

/// Handle of a registered regulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegulatorId(pub u32);

/// Regulator framework registration seam.
pub trait RegulatorFramework {
    /// Registration error
    type Error: core::fmt::Debug;

    /// Register a regulator instance.
    fn register(
        &mut self,
        desc: &'static RegulatorDesc,
        config: &RegulatorConfig<'_>,
    ) -> Result<RegulatorId, Self::Error>;

    /// Unregister a previously registered instance.
    fn unregister(&mut self, id: RegulatorId);
}

#[inline]
const fn field_shift(mask: u32) -> u32 {
    mask.trailing_zeros()
}

/// Set the enable field.
pub fn enable_regmap<R: RegisterMap + ?Sized>(map: &R, desc: &RegulatorDesc) -> Result<(), R::Error> {
    map.update_bits(desc.enable_reg, desc.enable_mask, desc.enable_mask)
}

/// Clear the enable field.
pub fn disable_regmap<R: RegisterMap + ?Sized>(map: &R, desc: &RegulatorDesc) -> Result<(), R::Error> {
    map.update_bits(desc.enable_reg, desc.enable_mask, 0)
}

/// Whether the enable field is fully set.
pub fn is_enabled_regmap<R: RegisterMap + ?Sized>(map: &R, desc: &RegulatorDesc) -> Result<bool, R::Error> {
    let val = map.read(desc.enable_reg)?;
    Ok(val & desc.enable_mask == desc.enable_mask)
}

/// Current selector as held in the voltage-select field.
pub fn get_voltage_sel_regmap<R: RegisterMap + ?Sized>(map: &R, desc: &RegulatorDesc) -> Result<u32, R::Error> {
    let val = map.read(desc.vsel_reg)?;
    Ok((val & desc.vsel_mask) >> field_shift(desc.vsel_mask))
}

/// Write `selector` into the voltage-select field.
///
/// The selector is not range checked here; callers validate against
/// [`RegulatorDesc::n_voltages`] first.
pub fn set_voltage_sel_regmap<R: RegisterMap + ?Sized>(
    map: &R,
    desc: &RegulatorDesc,
    selector: u32,
) -> Result<(), R::Error> {
    let val = selector.wrapping_shl(field_shift(desc.vsel_mask)) & desc.vsel_mask;
    map.update_bits(desc.vsel_reg, desc.vsel_mask, val)
}

/// Whether the bypass field is fully set.
pub fn get_bypass_regmap<R: RegisterMap + ?Sized>(map: &R, desc: &RegulatorDesc) -> Result<bool, R::Error> {
    let val = map.read(desc.bypass_reg)?;
    Ok(val & desc.bypass_mask == desc.bypass_mask)
}

/// Set or clear the bypass field.
pub fn set_bypass_regmap<R: RegisterMap + ?Sized>(
    map: &R,
    desc: &RegulatorDesc,
    enable: bool,
) -> Result<(), R::Error> {
    let val = if enable { desc.bypass_mask } else { 0 };
    map.update_bits(desc.bypass_reg, desc.bypass_mask, val)
}

/// Lowest selector whose voltage falls in `[min_uv, max_uv]`.
///
/// Assumes `list_voltage` is ascending: the search stops at the first entry
/// above `max_uv`. Selectors for which `list_voltage` returns `None` are
/// skipped.
pub fn map_voltage_ascend<F>(n_voltages: u32, min_uv: u32, max_uv: u32, list_voltage: F) -> Option<u32>
where
    F: Fn(u32) -> Option<u32>,
{
    for selector in 0..n_voltages {
        let Some(uv) = list_voltage(selector) else {
            continue;
        };
        if uv > max_uv {
            break;
        }
        if uv >= min_uv {
            return Some(selector);
        }
    }
    None
}
