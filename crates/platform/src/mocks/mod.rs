//! Mock implementations for testing
//!
//! Host-side stand-ins for every collaborator a codec supply driver talks to:
//! register maps and their transport, the regulator framework, the audio
//! routing graph, hardware description nodes and a delay provider. Each mock
//! records what was done to it so tests can assert on side effects.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::arithmetic_side_effects)]

extern crate std;

use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use crate::node::HwNode;
use crate::regmap::{BusTransport, RegisterMap, RegmapConfig};
use crate::regulator::{InitData, RegulatorConfig, RegulatorDesc, RegulatorFramework, RegulatorId};
use crate::routing::AudioRouting;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Register map
// ---------------------------------------------------------------------------

/// Errors raised by [`MockRegmap`] and [`MockTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBusError {
    /// Failure injected by the test
    Injected,
    /// Address above the map's `max_register`
    OutOfRange(u32),
    /// Value wider than the map's `val_bits`
    ValueTooWide(u32),
}

#[derive(Default)]
struct RegmapState {
    regs: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32)>,
    reads: usize,
}

/// In-memory register map with fault injection and a write log.
pub struct MockRegmap {
    config: &'static RegmapConfig,
    state: Mutex<RegmapState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockRegmap {
    /// Empty map (all registers read as zero) with the given layout.
    pub fn new(config: &'static RegmapConfig) -> Self {
        Self {
            config,
            state: Mutex::new(RegmapState::default()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Layout this map was created with.
    pub fn config(&self) -> &'static RegmapConfig {
        self.config
    }

    /// Preset a register without logging a bus write.
    pub fn set(&self, reg: u32, value: u32) {
        lock(&self.state).regs.insert(reg, value);
    }

    /// Current register contents.
    pub fn get(&self, reg: u32) -> u32 {
        lock(&self.state).regs.get(&reg).copied().unwrap_or(0)
    }

    /// Every bus write so far, in order.
    pub fn writes(&self) -> Vec<(u32, u32)> {
        lock(&self.state).writes.clone()
    }

    /// Forget the write log.
    pub fn clear_writes(&self) {
        lock(&self.state).writes.clear();
    }

    /// Number of successful reads.
    pub fn read_count(&self) -> usize {
        lock(&self.state).reads
    }

    /// Make every read fail with [`MockBusError::Injected`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with [`MockBusError::Injected`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, reg: u32) -> Result<(), MockBusError> {
        if self.config.contains(reg) {
            Ok(())
        } else {
            Err(MockBusError::OutOfRange(reg))
        }
    }
}

impl RegisterMap for MockRegmap {
    type Error = MockBusError;

    fn read(&self, reg: u32) -> Result<u32, Self::Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(MockBusError::Injected);
        }
        self.check(reg)?;
        let mut state = lock(&self.state);
        state.reads += 1;
        Ok(state.regs.get(&reg).copied().unwrap_or(0))
    }

    fn write(&self, reg: u32, value: u32) -> Result<(), Self::Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MockBusError::Injected);
        }
        self.check(reg)?;
        if value & !self.config.value_mask() != 0 {
            return Err(MockBusError::ValueTooWide(value));
        }
        let mut state = lock(&self.state);
        state.regs.insert(reg, value);
        state.writes.push((reg, value));
        Ok(())
    }

    fn update_bits(&self, reg: u32, mask: u32, value: u32) -> Result<(), Self::Error> {
        let orig = self.read(reg)?;
        let new = (orig & !mask) | (value & mask);
        if new == orig {
            return Ok(());
        }
        self.write(reg, new)
    }
}

/// Transport that hands out [`MockRegmap`]s.
#[derive(Default)]
pub struct MockTransport {
    fail_on: Option<&'static str>,
    inits: Vec<&'static str>,
    presets: Vec<(u32, u32)>,
}

impl MockTransport {
    /// Transport whose maps all initialise successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail initialisation of the map named `name`.
    pub fn failing_on(name: &'static str) -> Self {
        Self {
            fail_on: Some(name),
            ..Self::default()
        }
    }

    /// Preset `reg` in every map created afterwards (power-on defaults).
    pub fn with_preset(mut self, reg: u32, value: u32) -> Self {
        self.presets.push((reg, value));
        self
    }

    /// Names of the maps created, in order.
    pub fn inits(&self) -> &[&'static str] {
        &self.inits
    }
}

impl BusTransport for MockTransport {
    type Map = MockRegmap;
    type Error = MockBusError;

    fn init_regmap(&mut self, config: &'static RegmapConfig) -> Result<Self::Map, Self::Error> {
        if self.fail_on == Some(config.name) {
            return Err(MockBusError::Injected);
        }
        self.inits.push(config.name);
        let map = MockRegmap::new(config);
        for &(reg, value) in &self.presets {
            if config.contains(reg) {
                map.set(reg, value);
            }
        }
        Ok(map)
    }
}

// ---------------------------------------------------------------------------
// Regulator framework
// ---------------------------------------------------------------------------

/// A registration seen by [`MockFramework`].
#[derive(Debug, Clone)]
pub struct Registration {
    /// Assigned handle
    pub id: RegulatorId,
    /// Descriptor name
    pub name: &'static str,
    /// Descriptor selector count
    pub n_voltages: u32,
    /// Parent device name
    pub dev_name: String,
    /// Init data handed over
    pub init_data: InitData,
    /// Whether init data came from a description node
    pub from_node: bool,
}

/// Mock regulator framework error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockRegistrationError;

/// Records registrations and unregistrations.
#[derive(Default)]
pub struct MockFramework {
    next_id: u32,
    fail: bool,
    registered: Vec<Registration>,
    unregistered: Vec<RegulatorId>,
}

impl MockFramework {
    /// Framework that accepts every registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Framework that rejects every registration.
    pub fn rejecting() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Registrations accepted so far.
    pub fn registered(&self) -> &[Registration] {
        &self.registered
    }

    /// Handles unregistered so far.
    pub fn unregistered(&self) -> &[RegulatorId] {
        &self.unregistered
    }

    /// Registrations not yet unregistered.
    pub fn active(&self) -> usize {
        self.registered
            .iter()
            .filter(|r| !self.unregistered.contains(&r.id))
            .count()
    }
}

impl RegulatorFramework for MockFramework {
    type Error = MockRegistrationError;

    fn register(
        &mut self,
        desc: &'static RegulatorDesc,
        config: &RegulatorConfig<'_>,
    ) -> Result<RegulatorId, Self::Error> {
        if self.fail {
            return Err(MockRegistrationError);
        }
        let id = RegulatorId(self.next_id);
        self.next_id += 1;
        self.registered.push(Registration {
            id,
            name: desc.name,
            n_voltages: desc.n_voltages,
            dev_name: config.dev_name.to_string(),
            init_data: config.init_data.clone(),
            from_node: config.from_node,
        });
        Ok(id)
    }

    fn unregister(&mut self, id: RegulatorId) {
        self.unregistered.push(id);
    }
}

// ---------------------------------------------------------------------------
// Audio routing graph
// ---------------------------------------------------------------------------

/// One operation applied to a [`MockRouting`] graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingOp {
    /// `force_pin_enabled(pin)`, and whether the card lock was held
    ForceEnable {
        /// Pin name
        pin: String,
        /// Card lock held during the call
        locked: bool,
    },
    /// `disable_pin(pin)`, and whether the card lock was held
    Disable {
        /// Pin name
        pin: String,
        /// Card lock held during the call
        locked: bool,
    },
    /// `synchronize()`
    Sync,
}

/// Mock routing graph error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockRoutingError;

/// Routing graph that records pin operations and lock usage.
pub struct MockRouting {
    explicit_lock: bool,
    card_lock: Mutex<()>,
    held: AtomicBool,
    lock_count: AtomicUsize,
    fail_pins: AtomicBool,
    ops: Mutex<Vec<RoutingOp>>,
    pins: Mutex<BTreeMap<String, bool>>,
}

impl MockRouting {
    /// Graph whose pin updates need the card lock taken by the driver.
    pub fn explicit_lock() -> Self {
        Self::with_convention(true)
    }

    /// Graph whose caller context already holds the card lock.
    pub fn implicit_lock() -> Self {
        Self::with_convention(false)
    }

    fn with_convention(explicit_lock: bool) -> Self {
        Self {
            explicit_lock,
            card_lock: Mutex::new(()),
            held: AtomicBool::new(false),
            lock_count: AtomicUsize::new(0),
            fail_pins: AtomicBool::new(false),
            ops: Mutex::new(Vec::new()),
            pins: Mutex::new(BTreeMap::new()),
        }
    }

    /// Operations applied so far.
    pub fn ops(&self) -> Vec<RoutingOp> {
        lock(&self.ops).clone()
    }

    /// `Some(true)` if `pin` is forced on, `Some(false)` if disabled,
    /// `None` if never touched.
    pub fn pin(&self, pin: &str) -> Option<bool> {
        lock(&self.pins).get(pin).copied()
    }

    /// How many times the card lock was taken.
    pub fn lock_count(&self) -> usize {
        self.lock_count.load(Ordering::SeqCst)
    }

    /// Make pin updates fail.
    pub fn fail_pins(&self, fail: bool) {
        self.fail_pins.store(fail, Ordering::SeqCst);
    }

    fn set_pin(&self, pin: &str, on: bool) -> Result<(), MockRoutingError> {
        if self.fail_pins.load(Ordering::SeqCst) {
            return Err(MockRoutingError);
        }
        let locked = self.held.load(Ordering::SeqCst);
        let op = if on {
            RoutingOp::ForceEnable { pin: pin.to_string(), locked }
        } else {
            RoutingOp::Disable { pin: pin.to_string(), locked }
        };
        lock(&self.ops).push(op);
        lock(&self.pins).insert(pin.to_string(), on);
        Ok(())
    }
}

impl AudioRouting for MockRouting {
    type Error = MockRoutingError;

    fn requires_explicit_lock(&self) -> bool {
        self.explicit_lock
    }

    fn force_pin_enabled(&self, pin: &str) -> Result<(), Self::Error> {
        self.set_pin(pin, true)
    }

    fn disable_pin(&self, pin: &str) -> Result<(), Self::Error> {
        self.set_pin(pin, false)
    }

    fn synchronize(&self) -> Result<(), Self::Error> {
        lock(&self.ops).push(RoutingOp::Sync);
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        let _card = lock(&self.card_lock);
        self.lock_count.fetch_add(1, Ordering::SeqCst);
        self.held.store(true, Ordering::SeqCst);
        let out = f(self);
        self.held.store(false, Ordering::SeqCst);
        out
    }
}

// ---------------------------------------------------------------------------
// Hardware description node
// ---------------------------------------------------------------------------

/// Description node with a fixed compatible string and child init data.
#[derive(Default)]
pub struct MockNode {
    compatible: Option<&'static str>,
    children: Vec<(&'static str, InitData)>,
}

impl MockNode {
    /// Node with the given compatible string.
    pub fn new(compatible: &'static str) -> Self {
        Self {
            compatible: Some(compatible),
            children: Vec::new(),
        }
    }

    /// Node without a compatible string.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Add a child carrying regulator init data.
    pub fn with_child(mut self, name: &'static str, init_data: InitData) -> Self {
        self.children.push((name, init_data));
        self
    }
}

impl HwNode for MockNode {
    fn compatible(&self) -> Option<&str> {
        self.compatible
    }

    fn regulator_init_data(&self, child: &str) -> Option<InitData> {
        self.children
            .iter()
            .find(|(name, _)| *name == child)
            .map(|(_, data)| data.clone())
    }
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// Delay provider that records requested time instead of sleeping.
///
/// Clones share the same counters.
#[derive(Clone, Default)]
pub struct MockDelay {
    total_ns: Arc<AtomicU64>,
    calls: Arc<AtomicUsize>,
}

impl MockDelay {
    /// Fresh recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total delay requested, µs.
    pub fn total_us(&self) -> u64 {
        self.total_ns.load(Ordering::SeqCst) / 1_000
    }

    /// Number of delay calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(u64::from(ns), Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    static MAP: RegmapConfig = RegmapConfig {
        name: "mock",
        reg_bits: 32,
        pad_bits: 16,
        val_bits: 16,
        max_register: 0x300,
    };

    #[test]
    fn update_bits_skips_unchanged_write() {
        let map = MockRegmap::new(&MAP);
        map.update_bits(0x200, 0x1, 0x1).unwrap();
        map.update_bits(0x200, 0x1, 0x1).unwrap();
        assert_eq!(map.writes(), [(0x200, 0x1)]);
    }

    #[test]
    fn out_of_range_and_too_wide_are_rejected() {
        let map = MockRegmap::new(&MAP);
        assert_eq!(map.read(0x301), Err(MockBusError::OutOfRange(0x301)));
        assert_eq!(map.write(0x10, 0x1_0000), Err(MockBusError::ValueTooWide(0x1_0000)));
    }

    #[test]
    fn injected_read_failure() {
        let map = MockRegmap::new(&MAP);
        map.fail_reads(true);
        assert_eq!(map.read(0), Err(MockBusError::Injected));
        map.fail_reads(false);
        assert_eq!(map.read(0), Ok(0));
    }

    #[test]
    fn routing_records_lock_state() {
        let g = MockRouting::explicit_lock();
        g.with_lock(|g| g.force_pin_enabled("P")).unwrap();
        g.disable_pin("P").unwrap();
        assert_eq!(
            g.ops(),
            [
                RoutingOp::ForceEnable { pin: "P".to_string(), locked: true },
                RoutingOp::Disable { pin: "P".to_string(), locked: false },
            ]
        );
        assert_eq!(g.pin("P"), Some(false));
        assert_eq!(g.lock_count(), 1);
    }

    #[test]
    fn delay_clones_share_counters() {
        use embedded_hal::delay::DelayNs;
        let d = MockDelay::new();
        let mut c = d.clone();
        c.delay_us(1000);
        assert_eq!(d.total_us(), 1000);
        assert!(d.calls() >= 1);
    }
}
