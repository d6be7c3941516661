//! MICVDD regulator descriptors and default constraints

use codec_platform::{Constraints, RegulatorDesc, RegulatorType, ValidOps};

use crate::catalog::DeviceType;
use crate::registers::{CPMIC_BYPASS, CPMIC_ENA, LDO2_CONTROL_1, LDO2_VSEL_MASK, MIC_CHARGE_PUMP_1};
use crate::voltage::{VoltageTable, EXT_RANGE1_BASE_UV, STD_BASE_UV, STD_TOP_UV};

/// Regulator name.
pub const REGULATOR_NAME: &str = "MICVDD";
/// Upstream supply.
pub const PARENT_SUPPLY: &str = "CPVDD";
/// Consumer supply name bound to the codec device.
pub const CONSUMER_SUPPLY: &str = "MICVDD";
/// Description-node child carrying board init data.
pub const NODE_CHILD: &str = "micvdd";
/// Routing pin that follows the charge pump state.
pub const ROUTING_PIN: &str = "MICSUPP";

/// Output settle time after enable, standard variant, µs.
pub const STD_ENABLE_TIME_US: u32 = 6_000;
/// Output settle time after enable, extended variants, µs.
pub const EXT_ENABLE_TIME_US: u32 = 3_000;

/// Operations consumers may perform by default.
pub const DEFAULT_VALID_OPS: ValidOps = ValidOps::STATUS.union(ValidOps::VOLTAGE).union(ValidOps::BYPASS);

const STD_DESC: RegulatorDesc = RegulatorDesc {
    name: REGULATOR_NAME,
    supply_name: PARENT_SUPPLY,
    kind: RegulatorType::Voltage,
    n_voltages: VoltageTable::Standard.n_voltages(),
    vsel_reg: LDO2_CONTROL_1,
    vsel_mask: LDO2_VSEL_MASK,
    enable_reg: MIC_CHARGE_PUMP_1,
    enable_mask: CPMIC_ENA,
    bypass_reg: MIC_CHARGE_PUMP_1,
    bypass_mask: CPMIC_BYPASS,
    enable_time_us: STD_ENABLE_TIME_US,
};

/// WM5102 MICVDD.
pub static MICSUPP_DESC: RegulatorDesc = STD_DESC;

/// Florida family MICVDD.
pub static MICSUPP_EXT_DESC: RegulatorDesc = RegulatorDesc {
    n_voltages: VoltageTable::Extended.n_voltages(),
    enable_time_us: EXT_ENABLE_TIME_US,
    ..STD_DESC
};

/// Default constraints, standard table.
pub const DEFAULT_CONSTRAINTS: Constraints = Constraints {
    min_uv: STD_BASE_UV,
    max_uv: STD_TOP_UV,
    valid_ops: DEFAULT_VALID_OPS,
};

/// Default constraints, extended table.
pub const EXT_DEFAULT_CONSTRAINTS: Constraints = Constraints {
    min_uv: EXT_RANGE1_BASE_UV,
    max_uv: STD_TOP_UV,
    valid_ops: DEFAULT_VALID_OPS,
};

/// Descriptor and default constraints for `device`.
#[must_use]
pub fn for_device(device: DeviceType) -> (&'static RegulatorDesc, Constraints) {
    match VoltageTable::for_device(device) {
        VoltageTable::Standard => (&MICSUPP_DESC, DEFAULT_CONSTRAINTS),
        VoltageTable::Extended => (&MICSUPP_EXT_DESC, EXT_DEFAULT_CONSTRAINTS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_per_variant() {
        let (d, c) = for_device(DeviceType::Wm5102);
        assert_eq!(d.n_voltages, 32);
        assert_eq!(d.enable_time_us, 6_000);
        assert_eq!((c.min_uv, c.max_uv), (1_700_000, 3_300_000));

        for ty in [DeviceType::Wm5110, DeviceType::Wm8280] {
            let (d, c) = for_device(ty);
            assert_eq!(d.n_voltages, 40);
            assert_eq!(d.enable_time_us, 3_000);
            assert_eq!((c.min_uv, c.max_uv), (900_000, 3_300_000));
        }
    }

    #[test]
    fn both_descriptors_share_registers() {
        assert_eq!(MICSUPP_EXT_DESC.name, "MICVDD");
        assert_eq!(MICSUPP_EXT_DESC.supply_name, "CPVDD");
        assert_eq!(MICSUPP_EXT_DESC.enable_reg, MICSUPP_DESC.enable_reg);
        assert_eq!(MICSUPP_EXT_DESC.bypass_mask, MICSUPP_DESC.bypass_mask);
        assert_eq!(MICSUPP_EXT_DESC.vsel_mask, MICSUPP_DESC.vsel_mask);
    }

    #[test]
    fn default_ops() {
        let ops = DEFAULT_CONSTRAINTS.valid_ops;
        assert!(ops.contains(ValidOps::STATUS));
        assert!(ops.contains(ValidOps::VOLTAGE));
        assert!(ops.contains(ValidOps::BYPASS));
        assert!(!ops.contains(ValidOps::MODE));
    }
}
