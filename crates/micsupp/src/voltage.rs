//! MICVDD selector to voltage conversion
//!
//! Two tables, one per hardware generation:
//!
//! - **Standard** (WM5102): `0x00..=0x1F`, 1.70 V + 50 mV/step. The top
//!   selector is pinned to 3.30 V rather than following the slope (the
//!   linear value would be 3.25 V).
//! - **Extended** (Florida): `0x00..=0x27`, two linear segments.
//!   `0x00..0x14` is 0.90 V + 25 mV/step; `0x14..=0x27` restarts at 1.40 V
//!   with 100 mV/step.
//!
//! Both tables are strictly ascending, so voltage-to-selector lookups use
//! the generic ascending search in `codec_platform::regulator`.

use crate::catalog::DeviceType;

/// Highest selector of the standard table.
pub const STD_MAX_SELECTOR: u32 = 0x1F;
/// Pinned voltage of the top standard selector, µV.
pub const STD_TOP_UV: u32 = 3_300_000;
/// Standard table base, µV.
pub const STD_BASE_UV: u32 = 1_700_000;
/// Standard table step, µV.
pub const STD_STEP_UV: u32 = 50_000;

/// First selector of the second extended segment.
pub const EXT_RANGE1_END: u32 = 0x14;
/// Highest selector of the extended table.
pub const EXT_MAX_SELECTOR: u32 = 0x27;
/// First extended segment base, µV.
pub const EXT_RANGE1_BASE_UV: u32 = 900_000;
/// First extended segment step, µV.
pub const EXT_RANGE1_STEP_UV: u32 = 25_000;
/// Second extended segment base, µV.
pub const EXT_RANGE2_BASE_UV: u32 = 1_400_000;
/// Second extended segment step, µV.
pub const EXT_RANGE2_STEP_UV: u32 = 100_000;

/// Selector was above the table's maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSelector {
    /// Requested selector
    pub selector: u32,
    /// Highest valid selector
    pub max: u32,
}

/// Standard-range selector to µV.
#[allow(clippy::arithmetic_side_effects)] // selector <= 0x1F: at most 3.25 V, no overflow
pub const fn standard_uv(selector: u32) -> Result<u32, InvalidSelector> {
    if selector > STD_MAX_SELECTOR {
        return Err(InvalidSelector {
            selector,
            max: STD_MAX_SELECTOR,
        });
    }
    if selector == STD_MAX_SELECTOR {
        Ok(STD_TOP_UV)
    } else {
        Ok(selector * STD_STEP_UV + STD_BASE_UV)
    }
}

/// Extended-range selector to µV.
#[allow(clippy::arithmetic_side_effects)] // selector <= 0x27 and rebased before the second slope
pub const fn extended_uv(selector: u32) -> Result<u32, InvalidSelector> {
    if selector > EXT_MAX_SELECTOR {
        return Err(InvalidSelector {
            selector,
            max: EXT_MAX_SELECTOR,
        });
    }
    if selector < EXT_RANGE1_END {
        Ok(selector * EXT_RANGE1_STEP_UV + EXT_RANGE1_BASE_UV)
    } else {
        Ok((selector - EXT_RANGE1_END) * EXT_RANGE2_STEP_UV + EXT_RANGE2_BASE_UV)
    }
}

/// Which selector table a variant uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageTable {
    /// 32 entries, 1.70 – 3.30 V
    Standard,
    /// 40 entries, 0.90 – 3.30 V
    Extended,
}

impl VoltageTable {
    /// Table used by `device`.
    #[must_use]
    pub const fn for_device(device: DeviceType) -> Self {
        if device.is_florida() {
            Self::Extended
        } else {
            Self::Standard
        }
    }

    /// Highest valid selector.
    #[must_use]
    pub const fn max_selector(self) -> u32 {
        match self {
            Self::Standard => STD_MAX_SELECTOR,
            Self::Extended => EXT_MAX_SELECTOR,
        }
    }

    /// Number of selectors.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // max_selector is a small constant
    pub const fn n_voltages(self) -> u32 {
        self.max_selector() + 1
    }

    /// Voltage of `selector`, µV.
    pub const fn voltage(self, selector: u32) -> Result<u32, InvalidSelector> {
        match self {
            Self::Standard => standard_uv(selector),
            Self::Extended => extended_uv(selector),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

    use super::*;

    #[test]
    fn standard_endpoints() {
        assert_eq!(standard_uv(0), Ok(1_700_000));
        assert_eq!(standard_uv(0x1E), Ok(3_200_000));
        assert_eq!(standard_uv(0x1F), Ok(3_300_000));
    }

    #[test]
    fn standard_top_is_pinned_not_linear() {
        let linear = 0x1F * STD_STEP_UV + STD_BASE_UV;
        assert_eq!(linear, 3_250_000);
        assert_ne!(standard_uv(0x1F).unwrap(), linear);
    }

    #[test]
    fn extended_segment_boundary() {
        assert_eq!(extended_uv(0x13), Ok(1_375_000));
        assert_eq!(extended_uv(0x14), Ok(1_400_000));
        assert_eq!(extended_uv(0x15), Ok(1_500_000));
        assert_eq!(extended_uv(0x27), Ok(3_300_000));
    }

    #[test]
    fn out_of_range_is_rejected_not_clamped() {
        assert_eq!(
            standard_uv(0x20),
            Err(InvalidSelector { selector: 0x20, max: 0x1F })
        );
        assert_eq!(
            extended_uv(0x28),
            Err(InvalidSelector { selector: 0x28, max: 0x27 })
        );
        assert!(standard_uv(u32::MAX).is_err());
        assert!(extended_uv(u32::MAX).is_err());
    }

    #[test]
    fn table_per_device() {
        assert_eq!(VoltageTable::for_device(DeviceType::Wm5102), VoltageTable::Standard);
        assert_eq!(VoltageTable::for_device(DeviceType::Wm5110), VoltageTable::Extended);
        assert_eq!(VoltageTable::for_device(DeviceType::Wm8280), VoltageTable::Extended);
        assert_eq!(VoltageTable::Standard.n_voltages(), 32);
        assert_eq!(VoltageTable::Extended.n_voltages(), 40);
    }

    #[test]
    fn both_tables_strictly_ascend() {
        for table in [VoltageTable::Standard, VoltageTable::Extended] {
            let mut prev = 0;
            for sel in 0..table.n_voltages() {
                let uv = table.voltage(sel).unwrap();
                assert!(uv > prev, "{table:?} selector {sel}: {uv} <= {prev}");
                prev = uv;
            }
        }
    }
}
