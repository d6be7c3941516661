//! Driver configuration
//!
//! Build-time choices of the vendor kernel (which register maps exist, which
//! boards need a settle delay after toggling bypass) are runtime options
//! here, resolved once at attach.

use crate::catalog::DeviceType;

/// Settle time after a bypass write on the Florida family, µs.
pub const FLORIDA_BYPASS_SETTLE_US: u32 = 1_000;

/// Wait after a bypass register write before `set_bypass` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BypassSettle {
    /// 1 ms on the Florida family, none on WM5102.
    #[default]
    VariantDefault,
    /// Fixed wait on every variant, µs.
    Always(u32),
    /// Never wait.
    Never,
}

impl BypassSettle {
    /// Settle time for `device`, µs. Zero means no wait.
    #[must_use]
    pub const fn for_device(self, device: DeviceType) -> u32 {
        match self {
            Self::VariantDefault => {
                if device.is_florida() {
                    FLORIDA_BYPASS_SETTLE_US
                } else {
                    0
                }
            }
            Self::Always(us) => us,
            Self::Never => 0,
        }
    }
}

/// Options applied when a codec is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Create the 32-bit DSP register map on variants that have one.
    pub dsp_regmap: bool,
    /// Wait after bypass writes.
    pub bypass_settle: BypassSettle,
}

impl DriverConfig {
    /// Defaults: no DSP map, per-variant bypass settle.
    pub const DEFAULT: Self = Self {
        dsp_regmap: false,
        bypass_settle: BypassSettle::VariantDefault,
    };

    /// Same configuration with the DSP register map enabled.
    #[must_use]
    pub const fn with_dsp_regmap(mut self) -> Self {
        self.dsp_regmap = true;
        self
    }

    /// Same configuration with a different bypass settle policy.
    #[must_use]
    pub const fn with_bypass_settle(mut self, settle: BypassSettle) -> Self {
        self.bypass_settle = settle;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settle_only_on_florida() {
        let s = BypassSettle::default();
        assert_eq!(s.for_device(DeviceType::Wm5102), 0);
        assert_eq!(s.for_device(DeviceType::Wm5110), 1_000);
        assert_eq!(s.for_device(DeviceType::Wm8280), 1_000);
    }

    #[test]
    fn explicit_settle_overrides_variant() {
        assert_eq!(BypassSettle::Always(250).for_device(DeviceType::Wm5102), 250);
        assert_eq!(BypassSettle::Never.for_device(DeviceType::Wm5110), 0);
    }

    #[test]
    fn builder_methods() {
        let cfg = DriverConfig::DEFAULT
            .with_dsp_regmap()
            .with_bypass_settle(BypassSettle::Never);
        assert!(cfg.dsp_regmap);
        assert_eq!(cfg.bypass_settle, BypassSettle::Never);
        assert_eq!(DriverConfig::default(), DriverConfig::DEFAULT);
    }
}
