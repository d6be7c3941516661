//! Attach / detach orchestration: identification, init data and registration.
// Integration test file: unwrap/expect are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
//!
//! Run with: cargo test -p micsupp --test attach_detach

use codec_platform::mocks::{MockBusError, MockDelay, MockFramework, MockNode, MockRegmap, MockRouting, MockTransport};
use codec_platform::{ConsumerSupply, Constraints, InitData, ValidOps};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use micsupp::registers::{CPMIC_BYPASS, CPMIC_ENA, MIC_CHARGE_PUMP_1};
use micsupp::{BusContext, Codec, DeviceType, DriverConfig, Error, InitSource, MicSupply, PlatformData};

type Supply<'a> = MicSupply<'a, MockRegmap, MockRouting, NoopRawMutex, MockDelay>;

fn board_constraints() -> Constraints {
    Constraints {
        min_uv: 2_500_000,
        max_uv: 2_900_000,
        valid_ops: ValidOps::VOLTAGE | ValidOps::STATUS,
    }
}

fn attach_codec<'a>(ctx: &BusContext<'a>) -> Codec<'a, MockRegmap> {
    Codec::attach(ctx, &mut MockTransport::new(), DriverConfig::DEFAULT).expect("codec attach")
}

#[test]
fn default_init_data_per_variant() {
    for (bus_id, min_uv) in [("wm5102", 1_700_000), ("wm5110", 900_000), ("wm8281", 900_000)] {
        let c = attach_codec(&BusContext::new(bus_id, "spi1.0"));
        let mut fw = MockFramework::new();
        let s: Supply<'_> = MicSupply::attach(&c, &mut fw, MockDelay::new()).unwrap();

        let reg = &fw.registered()[0];
        assert_eq!(reg.name, "MICVDD");
        assert_eq!(reg.dev_name, "spi1.0");
        assert!(!reg.from_node);
        assert_eq!(reg.init_data.constraints.min_uv, min_uv);
        assert_eq!(reg.init_data.constraints.max_uv, 3_300_000);
        assert!(reg.init_data.constraints.valid_ops.contains(ValidOps::BYPASS));

        let binding = reg.init_data.consumer_supply.as_ref().unwrap();
        assert_eq!(binding.supply, "MICVDD");
        assert_eq!(binding.dev_name.as_str(), "spi1.0");
        assert_eq!(s.consumer_supply(), Some(binding));
    }
}

#[test]
fn node_child_overrides_defaults() {
    let node = MockNode::new("wlf,wm5110").with_child("micvdd", InitData::new(board_constraints()));
    let ctx = BusContext::new("wm5110", "spi0.0").with_node(&node);
    let c = attach_codec(&ctx);
    let mut fw = MockFramework::new();
    let _s: Supply<'_> = MicSupply::attach(&c, &mut fw, MockDelay::new()).unwrap();

    let reg = &fw.registered()[0];
    assert!(reg.from_node);
    assert_eq!(reg.init_data.constraints, board_constraints());
    assert_eq!(reg.init_data.consumer_supply.as_ref().unwrap().supply, "MICVDD");
}

#[test]
fn platform_data_overrides_node() {
    let node = MockNode::new("wlf,wm5110").with_child(
        "micvdd",
        InitData::new(Constraints {
            min_uv: 1_000_000,
            max_uv: 1_100_000,
            valid_ops: ValidOps::NONE,
        }),
    );
    let pdata = PlatformData {
        micvdd: Some(InitData::new(board_constraints())),
    };
    let ctx = BusContext::new("wm5110", "spi0.0")
        .with_node(&node)
        .with_platform_data(&pdata);
    let c = attach_codec(&ctx);
    let mut fw = MockFramework::new();
    let s: Supply<'_> = MicSupply::attach(&c, &mut fw, MockDelay::new()).unwrap();

    let reg = &fw.registered()[0];
    assert!(!reg.from_node);
    assert_eq!(reg.init_data.constraints, board_constraints());
    assert_eq!(s.init_data().constraints, board_constraints());
}

#[test]
fn platform_consumer_binding_is_kept() {
    let mut own = InitData::new(board_constraints());
    own.consumer_supply = Some(ConsumerSupply {
        supply: "MICBIAS",
        dev_name: heapless::String::try_from("arizona-extcon").unwrap(),
    });
    let pdata = PlatformData { micvdd: Some(own.clone()) };
    let ctx = BusContext::new("wm5102", "spi0.0").with_platform_data(&pdata);
    let c = attach_codec(&ctx);
    let mut fw = MockFramework::new();
    let _s: Supply<'_> = MicSupply::attach(&c, &mut fw, MockDelay::new()).unwrap();

    assert_eq!(fw.registered()[0].init_data, own);
}

#[test]
fn init_source_reports_where_data_came_from() {
    let node = MockNode::new("wlf,wm5102").with_child("micvdd", InitData::new(board_constraints()));
    let ctx = BusContext::new("wm5102", "spi0.0").with_node(&node);
    let c = attach_codec(&ctx);
    let supply = micsupp::attach::consumer_supply::<()>("spi0.0").unwrap();
    let (_, source) = micsupp::attach::resolve_init_data(&c, micsupp::desc::DEFAULT_CONSTRAINTS, &supply);
    assert_eq!(source, InitSource::Node);
}

#[test]
fn bypass_is_cleared_before_registration() {
    let mut transport = MockTransport::new().with_preset(MIC_CHARGE_PUMP_1, CPMIC_ENA | CPMIC_BYPASS);
    let c = Codec::attach(&BusContext::new("wm5110", "spi0.0"), &mut transport, DriverConfig::DEFAULT).unwrap();

    // the write happens even when registration is then rejected
    let mut fw = MockFramework::rejecting();
    let err = Supply::attach(&c, &mut fw, MockDelay::new()).err().unwrap();
    assert_eq!(err, Error::Registration);
    assert_eq!(c.regmap().writes(), [(MIC_CHARGE_PUMP_1, CPMIC_ENA)]);
    assert!(fw.registered().is_empty());
}

#[test]
fn bypass_write_failure_aborts_before_registration() {
    let c = attach_codec(&BusContext::new("wm5110", "spi0.0"));
    c.regmap().set(MIC_CHARGE_PUMP_1, CPMIC_BYPASS);
    c.regmap().fail_writes(true);

    let mut fw = MockFramework::new();
    let err = Supply::attach(&c, &mut fw, MockDelay::new()).err().unwrap();
    assert_eq!(err, Error::RegisterAccess(MockBusError::Injected));
    assert!(fw.registered().is_empty());
}

#[test]
fn unknown_device_never_reaches_registration() {
    let mut transport = MockTransport::new();
    let err = Codec::<MockRegmap>::attach(&BusContext::new("wm1811", "spi0.0"), &mut transport, DriverConfig::DEFAULT)
        .err()
        .unwrap();
    assert_eq!(err, Error::UnknownDevice);
    assert!(transport.inits().is_empty());
}

#[test]
fn register_map_failure_is_reported() {
    let mut transport = MockTransport::failing_on("wm5102");
    let err = Codec::<MockRegmap>::attach(&BusContext::new("wm5102", "spi0.0"), &mut transport, DriverConfig::DEFAULT)
        .err()
        .unwrap();
    assert_eq!(err, Error::RegisterMapInit);
}

#[test]
fn dsp_map_only_on_request_and_only_for_florida() {
    for (bus_id, expect) in [("wm5102", false), ("wm5110", true), ("wm8280", true)] {
        let mut transport = MockTransport::new();
        let c = Codec::attach(
            &BusContext::new(bus_id, "spi0.0"),
            &mut transport,
            DriverConfig::DEFAULT.with_dsp_regmap(),
        )
        .unwrap();
        assert_eq!(c.dsp_regmap().is_some(), expect, "{bus_id}");
    }
}

#[test]
fn node_compatible_beats_bus_id() {
    let node = MockNode::new("wlf,wm8280");
    let c = attach_codec(&BusContext::new("wm5102", "spi0.0").with_node(&node));
    assert_eq!(c.device(), DeviceType::Wm8280);

    let mut fw = MockFramework::new();
    let _s: Supply<'_> = MicSupply::attach(&c, &mut fw, MockDelay::new()).unwrap();
    assert_eq!(fw.registered()[0].n_voltages, 40);
}

#[test]
fn node_path_device_name_is_bound() {
    let name: &'static str = "soc:spi@7e204000:audio-codec@1.wm5110";
    let c = attach_codec(&BusContext::new("wm5110", name));
    let s: Supply<'_> = MicSupply::attach(&c, &mut MockFramework::new(), MockDelay::new()).unwrap();
    assert_eq!(s.consumer_supply().unwrap().dev_name.as_str(), name);
}

#[test]
fn oversized_device_name_fails_allocation() {
    let name: &'static str = "soc:spi@7e204000:audio-codec@1.wm5102-with-a-name-past-the-64-byte-limit";
    let c = attach_codec(&BusContext::new("wm5102", name));
    let mut fw = MockFramework::new();
    let err = Supply::attach(&c, &mut fw, MockDelay::new()).err().unwrap();
    assert_eq!(err, Error::AllocationFailure);
    assert!(fw.registered().is_empty());
    assert!(c.regmap().writes().is_empty());
}

#[test]
fn detach_unregisters_the_instance() {
    let c = attach_codec(&BusContext::new("wm5110", "spi0.0"));
    let mut fw = MockFramework::new();
    let s: Supply<'_> = MicSupply::attach(&c, &mut fw, MockDelay::new()).unwrap();
    let id = s.id();
    assert_eq!(fw.active(), 1);

    embassy_futures::block_on(s.shutdown());
    s.detach(&mut fw);
    assert_eq!(fw.unregistered(), [id]);
    assert_eq!(fw.active(), 0);
}
