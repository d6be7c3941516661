//! Attach / detach of the MICVDD regulator
//!
//! Attach order:
//!
//! 1. build the consumer binding for the codec device
//! 2. pick descriptor and default constraints for the variant
//! 3. resolve init data: platform data, then the description node's
//!    `micvdd` child, then the defaults
//! 4. force the charge pump out of bypass
//! 5. register with the regulator framework
//!
//! Nothing is registered if any earlier step fails.

use core::cell::RefCell;

use codec_platform::{
    AudioRouting, Constraints, ConsumerSupply, InitData, RegisterMap, RegulatorConfig, RegulatorFramework,
};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

use crate::charge_pump::ChargePumpSync;
use crate::desc::{self, CONSUMER_SUPPLY, NODE_CHILD};
use crate::device::Codec;
use crate::error::{Error, Result};
use crate::registers::{CPMIC_BYPASS, MIC_CHARGE_PUMP_1};
use crate::supply::MicSupply;
use crate::voltage::VoltageTable;

/// Where the init data handed to the framework came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitSource {
    /// Board platform data
    Platform,
    /// Description node child
    Node,
    /// Driver defaults for the variant
    Default,
}

/// Consumer binding of the MICVDD supply to `dev_name`.
///
/// The name is stored inline; one longer than
/// [`DEV_NAME_CAPACITY`](codec_platform::regulator::DEV_NAME_CAPACITY) bytes
/// fails with [`Error::AllocationFailure`].
pub fn consumer_supply<E>(dev_name: &str) -> Result<ConsumerSupply, E> {
    let mut name = String::new();
    name.push_str(dev_name).map_err(|_| {
        error!("Device name {} too long for supply binding", dev_name);
        Error::AllocationFailure
    })?;
    Ok(ConsumerSupply {
        supply: CONSUMER_SUPPLY,
        dev_name: name,
    })
}

/// Pick the init data for the regulator.
///
/// Platform data wins when it carries MICVDD init data; its own consumer
/// binding is kept, and ours is added only if it has none. The description
/// node is consulted only when the board supplied no platform data at all.
pub fn resolve_init_data<R: RegisterMap>(
    codec: &Codec<'_, R>,
    defaults: Constraints,
    supply: &ConsumerSupply,
) -> (InitData, InitSource) {
    match codec.platform_data() {
        Some(pdata) => {
            if let Some(init) = &pdata.micvdd {
                let mut init = init.clone();
                if init.consumer_supply.is_none() {
                    init.consumer_supply = Some(supply.clone());
                }
                return (init, InitSource::Platform);
            }
        }
        None => {
            if let Some(mut init) = codec.node().and_then(|n| n.regulator_init_data(NODE_CHILD)) {
                init.consumer_supply = Some(supply.clone());
                return (init, InitSource::Node);
            }
        }
    }

    let mut init = InitData::new(defaults);
    init.consumer_supply = Some(supply.clone());
    (init, InitSource::Default)
}

impl<'a, R, G, M, D> MicSupply<'a, R, G, M, D>
where
    R: RegisterMap,
    G: AudioRouting,
    M: RawMutex,
{
    /// Create and register the MICVDD regulator of `codec`.
    ///
    /// `delay` provides the bypass settle wait. The routing graph is bound
    /// later, with [`bind_routing`](Self::bind_routing), once the sound card
    /// exists.
    pub fn attach<F>(codec: &'a Codec<'a, R>, framework: &mut F, delay: D) -> Result<Self, R::Error>
    where
        F: RegulatorFramework,
    {
        let device = codec.device();
        let supply = consumer_supply::<R::Error>(codec.dev_name())?;
        let (desc, defaults) = desc::for_device(device);
        let (init_data, source) = resolve_init_data(codec, defaults, &supply);

        // Regulated mode until a consumer asks for bypass
        codec.regmap().update_bits(MIC_CHARGE_PUMP_1, CPMIC_BYPASS, 0)?;

        let config = RegulatorConfig {
            dev_name: codec.dev_name(),
            init_data: &init_data,
            from_node: source == InitSource::Node,
        };
        let id = framework.register(desc, &config).map_err(|_| {
            error!("Failed to register mic supply");
            Error::Registration
        })?;

        info!(
            "{} registered on {} ({}..{} uV)",
            desc.name,
            codec.dev_name(),
            init_data.constraints.min_uv,
            init_data.constraints.max_uv
        );

        Ok(Self {
            codec,
            desc,
            table: VoltageTable::for_device(device),
            init_data,
            id,
            bypass_settle_us: codec.config().bypass_settle.for_device(device),
            delay: Mutex::new(RefCell::new(delay)),
            cp: ChargePumpSync::new(),
        })
    }

    /// Unregister the regulator.
    ///
    /// Takes the instance by value, so the charge pump worker (which borrows
    /// it) must already have finished. Call [`shutdown`](Self::shutdown)
    /// first so a pending synchronization is not lost.
    pub fn detach<F: RegulatorFramework>(self, framework: &mut F) {
        if self.cp.is_pending() {
            warn!("Detaching {} with a pin sync still pending", self.desc.name);
        }
        framework.unregister(self.id);
        debug!("{} unregistered", self.desc.name);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::config::DriverConfig;
    use crate::device::{BusContext, PlatformData};
    use codec_platform::mocks::{MockDelay, MockFramework, MockNode, MockRegmap, MockRouting, MockTransport};
    use codec_platform::regulator::DEV_NAME_CAPACITY;
    use codec_platform::ValidOps;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Supply<'a> = MicSupply<'a, MockRegmap, MockRouting, NoopRawMutex, MockDelay>;

    fn codec<'a>(ctx: &BusContext<'a>) -> Codec<'a, MockRegmap> {
        Codec::attach(ctx, &mut MockTransport::new(), DriverConfig::DEFAULT).unwrap()
    }

    fn board() -> InitData {
        InitData::new(Constraints {
            min_uv: 2_000_000,
            max_uv: 2_800_000,
            valid_ops: ValidOps::VOLTAGE,
        })
    }

    #[test]
    fn long_device_names_fail_allocation() {
        let name = "x".repeat(DEV_NAME_CAPACITY + 1);
        assert_eq!(consumer_supply::<()>(&name), Err(Error::AllocationFailure));
        let name = "x".repeat(DEV_NAME_CAPACITY);
        assert_eq!(consumer_supply::<()>(&name).unwrap().dev_name.as_str(), name);
        assert_eq!(consumer_supply::<()>("spi0.0").unwrap().supply, "MICVDD");
    }

    #[test]
    fn defaults_bind_our_supply() {
        let c = codec(&BusContext::new("wm5102", "spi0.0"));
        let supply = consumer_supply::<()>("spi0.0").unwrap();
        let (init, src) = resolve_init_data(&c, desc::DEFAULT_CONSTRAINTS, &supply);
        assert_eq!(src, InitSource::Default);
        assert_eq!(init.constraints, desc::DEFAULT_CONSTRAINTS);
        assert_eq!(init.consumer_supply, Some(supply));
    }

    #[test]
    fn platform_data_shadows_node() {
        let node = MockNode::new("wlf,wm5110").with_child("micvdd", InitData::new(desc::DEFAULT_CONSTRAINTS));
        let pdata = PlatformData { micvdd: Some(board()) };
        let ctx = BusContext::new("wm5110", "spi0.0")
            .with_node(&node)
            .with_platform_data(&pdata);
        let c = codec(&ctx);
        let supply = consumer_supply::<()>("spi0.0").unwrap();
        let (init, src) = resolve_init_data(&c, desc::EXT_DEFAULT_CONSTRAINTS, &supply);
        assert_eq!(src, InitSource::Platform);
        assert_eq!(init.constraints.min_uv, 2_000_000);
        assert_eq!(init.consumer_supply, Some(supply));
    }

    #[test]
    fn empty_platform_data_skips_node() {
        let node = MockNode::new("wlf,wm5110").with_child("micvdd", board());
        let pdata = PlatformData::default();
        let ctx = BusContext::new("wm5110", "spi0.0")
            .with_node(&node)
            .with_platform_data(&pdata);
        let c = codec(&ctx);
        let supply = consumer_supply::<()>("spi0.0").unwrap();
        let (_, src) = resolve_init_data(&c, desc::EXT_DEFAULT_CONSTRAINTS, &supply);
        assert_eq!(src, InitSource::Default);
    }

    #[test]
    fn attach_clears_bypass_then_registers() {
        let c = codec(&BusContext::new("wm5110", "spi0.0"));
        c.regmap().set(MIC_CHARGE_PUMP_1, CPMIC_BYPASS | 0x1);
        let mut fw = MockFramework::new();
        let s = Supply::attach(&c, &mut fw, MockDelay::new()).unwrap();
        assert_eq!(c.regmap().get(MIC_CHARGE_PUMP_1), 0x1);
        assert_eq!(fw.registered().len(), 1);
        assert_eq!(fw.registered().first().unwrap().n_voltages, 40);
        assert_eq!(s.bypass_settle_us(), 1_000);
        s.detach(&mut fw);
        assert_eq!(fw.active(), 0);
    }

    #[test]
    fn rejected_registration() {
        let c = codec(&BusContext::new("wm5102", "spi0.0"));
        let mut fw = MockFramework::rejecting();
        let err = Supply::attach(&c, &mut fw, MockDelay::new()).err().unwrap();
        assert_eq!(err, Error::Registration);
    }
}
