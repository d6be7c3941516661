//! Register-map catalog
//!
//! Read-only register layouts per chip variant. Every table here is a
//! `static`, so lookups hand out `&'static` references and nothing is ever
//! mutated after link time.
//!
//! | Variant        | Primary map         | Secondary map            |
//! |----------------|---------------------|--------------------------|
//! | WM5102         | 16-bit values       | none                     |
//! | WM5110, WM8280 | 16-bit values       | 32-bit DSP memory window |

use codec_platform::RegmapConfig;

/// Supported chip variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceType {
    /// WM5102
    Wm5102,
    /// WM5110 (Florida family)
    Wm5110,
    /// WM8280 / WM8281 (Florida family)
    Wm8280,
}

impl DeviceType {
    /// Chip name as used in bus id tables.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wm5102 => "wm5102",
            Self::Wm5110 => "wm5110",
            Self::Wm8280 => "wm8280",
        }
    }

    /// Whether the variant belongs to the Florida family, which carries the
    /// extended-range mic supply and a separate DSP register window.
    #[must_use]
    pub const fn is_florida(self) -> bool {
        matches!(self, Self::Wm5110 | Self::Wm8280)
    }
}

/// Register layout selected for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegmapLayout {
    /// Control register space
    pub primary: &'static RegmapConfig,
    /// Wider-addressed DSP space, for variants that have one
    pub secondary: Option<&'static RegmapConfig>,
}

/// WM5102 over SPI: 32-bit address, 16 bits of padding, 16-bit values.
pub static WM5102_SPI_REGMAP: RegmapConfig = RegmapConfig {
    name: "wm5102",
    reg_bits: 32,
    pad_bits: 16,
    val_bits: 16,
    max_register: 0x001A_9000,
};

/// Florida control space over SPI.
pub static FLORIDA_SPI_REGMAP: RegmapConfig = RegmapConfig {
    name: "florida",
    reg_bits: 32,
    pad_bits: 16,
    val_bits: 16,
    max_register: 0x0000_3100,
};

/// Florida DSP memory window over SPI.
pub static FLORIDA_SPI_REGMAP_32BIT: RegmapConfig = RegmapConfig {
    name: "florida-dsp",
    reg_bits: 32,
    pad_bits: 16,
    val_bits: 32,
    max_register: 0x003F_FFFF,
};

/// WM5102 layout.
pub static WM5102_LAYOUT: RegmapLayout = RegmapLayout {
    primary: &WM5102_SPI_REGMAP,
    secondary: None,
};

/// Florida family layout.
pub static FLORIDA_LAYOUT: RegmapLayout = RegmapLayout {
    primary: &FLORIDA_SPI_REGMAP,
    secondary: Some(&FLORIDA_SPI_REGMAP_32BIT),
};

/// Register layout for `device`.
#[must_use]
pub fn layout(device: DeviceType) -> &'static RegmapLayout {
    match device {
        DeviceType::Wm5102 => &WM5102_LAYOUT,
        DeviceType::Wm5110 | DeviceType::Wm8280 => &FLORIDA_LAYOUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{LDO2_CONTROL_1, MIC_CHARGE_PUMP_1};

    #[test]
    fn wm5102_has_no_secondary_map() {
        let l = layout(DeviceType::Wm5102);
        assert_eq!(l.primary.name, "wm5102");
        assert!(l.secondary.is_none());
    }

    #[test]
    fn florida_variants_share_a_layout() {
        assert_eq!(layout(DeviceType::Wm5110), layout(DeviceType::Wm8280));
        let secondary = layout(DeviceType::Wm5110).secondary;
        assert_eq!(secondary.map(|c| c.val_bits), Some(32));
    }

    #[test]
    fn every_primary_map_reaches_the_supply_registers() {
        for ty in [DeviceType::Wm5102, DeviceType::Wm5110, DeviceType::Wm8280] {
            let primary = layout(ty).primary;
            assert!(primary.contains(MIC_CHARGE_PUMP_1));
            assert!(primary.contains(LDO2_CONTROL_1));
        }
    }

    #[test]
    fn florida_family_membership() {
        assert!(!DeviceType::Wm5102.is_florida());
        assert!(DeviceType::Wm5110.is_florida());
        assert!(DeviceType::Wm8280.is_florida());
    }
}
