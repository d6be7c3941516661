//! Codec register map: the subset the mic supply touches
//!
//! Addresses are in the 16-bit register space shared by every supported
//! variant.
//!
//! # MIC_CHARGE_PUMP_1 (0x200)
//!
//! | Bit | Field        | Meaning                                   |
//! |-----|--------------|-------------------------------------------|
//! | 0   | CPMIC_ENA    | Charge pump enabled                       |
//! | 1   | CPMIC_BYPASS | Charge pump bypassed (CPVDD fed through)  |
//!
//! # LDO2_CONTROL_1 (0x213)
//!
//! | Bits  | Field     | Meaning                          |
//! |-------|-----------|----------------------------------|
//! | 10:5  | LDO2_VSEL | MICVDD voltage selector          |

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// Mic charge pump control and status
pub const MIC_CHARGE_PUMP_1: u32 = 0x200;

/// LDO2 (MICVDD) control
pub const LDO2_CONTROL_1: u32 = 0x213;

// ---------------------------------------------------------------------------
// Register fields
// ---------------------------------------------------------------------------

/// MIC_CHARGE_PUMP_1: charge pump enable
pub const CPMIC_ENA: u32 = 0x0001;

/// MIC_CHARGE_PUMP_1: charge pump bypass
pub const CPMIC_BYPASS: u32 = 0x0002;

/// LDO2_CONTROL_1: voltage selector field
pub const LDO2_VSEL_MASK: u32 = 0x07E0;

/// LDO2_CONTROL_1: voltage selector shift
pub const LDO2_VSEL_SHIFT: u32 = 5;

/// LDO2_CONTROL_1: voltage selector width
pub const LDO2_VSEL_WIDTH: u32 = 6;
