//! Bus attach: the parent codec device
//!
//! [`Codec::attach`] is what the bus driver runs when a codec shows up:
//! identify the variant, pick its register layout from the catalog, and
//! create the register map(s) on the transport. The resulting [`Codec`] is
//! the parent context every function driver (the mic supply among them)
//! borrows.

use codec_platform::{BusTransport, HwNode, InitData, RegisterMap};

use crate::catalog::{self, DeviceType};
use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::identify::identify;

/// Board-supplied configuration for the codec's function drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformData {
    /// MICVDD regulator init data
    pub micvdd: Option<InitData>,
}

/// What the bus knows about a device at attach time.
#[derive(Clone, Copy)]
pub struct BusContext<'a> {
    /// Bus-level device id (e.g. SPI modalias `"wm5110"`)
    pub bus_id: &'a str,
    /// Device name, used for consumer bindings
    pub dev_name: &'a str,
    /// Hardware description node, if the board has one
    pub node: Option<&'a dyn HwNode>,
    /// Board platform data, if supplied
    pub platform_data: Option<&'a PlatformData>,
}

impl<'a> BusContext<'a> {
    /// Context with only a bus id and device name.
    #[must_use]
    pub const fn new(bus_id: &'a str, dev_name: &'a str) -> Self {
        Self {
            bus_id,
            dev_name,
            node: None,
            platform_data: None,
        }
    }

    /// Attach a hardware description node.
    #[must_use]
    pub const fn with_node(mut self, node: &'a dyn HwNode) -> Self {
        self.node = Some(node);
        self
    }

    /// Attach board platform data.
    #[must_use]
    pub const fn with_platform_data(mut self, pdata: &'a PlatformData) -> Self {
        self.platform_data = Some(pdata);
        self
    }
}

/// An attached codec: variant, register maps and board configuration.
pub struct Codec<'a, R> {
    device: DeviceType,
    dev_name: &'a str,
    regmap: R,
    dsp_regmap: Option<R>,
    node: Option<&'a dyn HwNode>,
    platform_data: Option<&'a PlatformData>,
    config: DriverConfig,
}

impl<'a, R: RegisterMap> Codec<'a, R> {
    /// Identify the device and create its register maps.
    ///
    /// The secondary (DSP) map is only created when the variant has one and
    /// `config.dsp_regmap` asks for it. Any map failure aborts the attach;
    /// maps created so far are dropped.
    pub fn attach<T>(ctx: &BusContext<'a>, transport: &mut T, config: DriverConfig) -> Result<Self, R::Error>
    where
        T: BusTransport<Map = R>,
    {
        let device = identify::<R::Error>(ctx.node, ctx.bus_id)?;
        let layout = catalog::layout(device);

        let regmap = transport.init_regmap(layout.primary).map_err(|_| {
            error!("Failed to allocate register map {}", layout.primary.name);
            Error::RegisterMapInit
        })?;

        let dsp_regmap = match layout.secondary {
            Some(secondary) if config.dsp_regmap => {
                let map = transport.init_regmap(secondary).map_err(|_| {
                    error!("Failed to allocate dsp register map {}", secondary.name);
                    Error::RegisterMapInit
                })?;
                Some(map)
            }
            _ => None,
        };

        info!("Attached {} as {}", ctx.dev_name, device.name());

        Ok(Self {
            device,
            dev_name: ctx.dev_name,
            regmap,
            dsp_regmap,
            node: ctx.node,
            platform_data: ctx.platform_data,
            config,
        })
    }

    /// Chip variant.
    pub fn device(&self) -> DeviceType {
        self.device
    }

    /// Device name.
    pub fn dev_name(&self) -> &'a str {
        self.dev_name
    }

    /// Control register map.
    pub fn regmap(&self) -> &R {
        &self.regmap
    }

    /// DSP register map, when one was created.
    pub fn dsp_regmap(&self) -> Option<&R> {
        self.dsp_regmap.as_ref()
    }

    /// Hardware description node.
    pub fn node(&self) -> Option<&'a dyn HwNode> {
        self.node
    }

    /// Board platform data.
    pub fn platform_data(&self) -> Option<&'a PlatformData> {
        self.platform_data
    }

    /// Driver configuration in force.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}
