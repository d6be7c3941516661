//! MICVDD regulator instance and its control surface
//!
//! Every operation maps onto a field of MIC_CHARGE_PUMP_1 or LDO2_CONTROL_1
//! through the generic register helpers in `codec_platform::regulator`.
//! Operations that can change the charge pump state (enable, disable,
//! bypass) schedule a routing pin synchronization on success; they never
//! touch the routing graph themselves.

use codec_platform::regulator::{
    disable_regmap, enable_regmap, get_bypass_regmap, get_voltage_sel_regmap, is_enabled_regmap,
    map_voltage_ascend, set_bypass_regmap, set_voltage_sel_regmap,
};
use core::cell::RefCell;

use codec_platform::{AudioRouting, ConsumerSupply, InitData, RegisterMap, RegulatorDesc, RegulatorId};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;

use crate::catalog::DeviceType;
use crate::charge_pump::{ChargePumpSync, PinState, SyncStats};
use crate::device::Codec;
use crate::error::{Error, Result};
use crate::voltage::{InvalidSelector, VoltageTable};

/// A registered MICVDD regulator bound to its parent codec.
///
/// Created by [`MicSupply::attach`]. Control operations take `&self` and may
/// be called from any context that can reach the instance; the charge pump
/// worker ([`MicSupply::run_charge_pump`]) borrows it too, so the instance
/// cannot be detached while the worker is alive.
pub struct MicSupply<'a, R, G, M: RawMutex, D> {
    pub(crate) codec: &'a Codec<'a, R>,
    pub(crate) desc: &'static RegulatorDesc,
    pub(crate) table: VoltageTable,
    pub(crate) init_data: InitData,
    pub(crate) id: RegulatorId,
    pub(crate) bypass_settle_us: u32,
    pub(crate) delay: Mutex<M, RefCell<D>>,
    pub(crate) cp: ChargePumpSync<'a, M, G>,
}

impl<R: RegisterMap, G: AudioRouting, M: RawMutex, D: DelayNs> MicSupply<'_, R, G, M, D> {
    fn regmap(&self) -> &R {
        self.codec.regmap()
    }

    fn invalid(&self, err: InvalidSelector) -> Error<R::Error> {
        warn!("Selector {} out of range (max {})", err.selector, err.max);
        Error::InvalidSelector {
            selector: err.selector,
            max: err.max,
        }
    }

    /// Enable the charge pump.
    pub fn enable(&self) -> Result<(), R::Error> {
        enable_regmap(self.regmap(), self.desc)?;
        self.cp.schedule();
        Ok(())
    }

    /// Disable the charge pump.
    pub fn disable(&self) -> Result<(), R::Error> {
        disable_regmap(self.regmap(), self.desc)?;
        self.cp.schedule();
        Ok(())
    }

    /// Whether the charge pump enable bit is set.
    pub fn is_enabled(&self) -> Result<bool, R::Error> {
        Ok(is_enabled_regmap(self.regmap(), self.desc)?)
    }

    /// Current voltage selector.
    pub fn get_voltage_sel(&self) -> Result<u32, R::Error> {
        Ok(get_voltage_sel_regmap(self.regmap(), self.desc)?)
    }

    /// Program a voltage selector. Out-of-range selectors are rejected
    /// without a register write.
    pub fn set_voltage_sel(&self, selector: u32) -> Result<(), R::Error> {
        self.table.voltage(selector).map_err(|e| self.invalid(e))?;
        set_voltage_sel_regmap(self.regmap(), self.desc, selector)?;
        Ok(())
    }

    /// Voltage of `selector`, µV.
    pub fn list_voltage(&self, selector: u32) -> Result<u32, R::Error> {
        self.table.voltage(selector).map_err(|e| self.invalid(e))
    }

    /// Lowest selector whose voltage lies in `[min_uv, max_uv]`.
    pub fn map_voltage(&self, min_uv: u32, max_uv: u32) -> Result<u32, R::Error> {
        map_voltage_ascend(self.table.n_voltages(), min_uv, max_uv, |sel| self.table.voltage(sel).ok())
            .ok_or(Error::VoltageOutOfRange { min_uv, max_uv })
    }

    /// Program the lowest voltage in `[min_uv, max_uv]`. Returns the
    /// selector written.
    pub fn set_voltage(&self, min_uv: u32, max_uv: u32) -> Result<u32, R::Error> {
        let selector = self.map_voltage(min_uv, max_uv)?;
        set_voltage_sel_regmap(self.regmap(), self.desc, selector)?;
        Ok(selector)
    }

    /// Programmed output voltage, µV.
    pub fn get_voltage(&self) -> Result<u32, R::Error> {
        let selector = self.get_voltage_sel()?;
        self.list_voltage(selector)
    }

    /// Whether the charge pump is bypassed.
    pub fn get_bypass(&self) -> Result<bool, R::Error> {
        Ok(get_bypass_regmap(self.regmap(), self.desc)?)
    }

    /// Bypass the charge pump, or return it to regulation.
    ///
    /// Variants with a bypass settle time wait it out after the write, even
    /// when the write fails. A sync is scheduled only on success. The wait
    /// holds the delay's lock, so concurrent bypass writes settle in turn.
    pub fn set_bypass(&self, enable: bool) -> Result<(), R::Error> {
        let written = set_bypass_regmap(self.regmap(), self.desc, enable);
        if self.bypass_settle_us > 0 {
            self.delay.lock(|d| d.borrow_mut().delay_us(self.bypass_settle_us));
        }
        written?;
        self.cp.schedule();
        Ok(())
    }

    /// Output settle time after enable, µs.
    pub fn enable_time_us(&self) -> u32 {
        self.desc.enable_time_us
    }
}

impl<'a, R: RegisterMap, G: AudioRouting, M: RawMutex, D> MicSupply<'a, R, G, M, D> {
    /// Chip variant.
    pub fn device(&self) -> DeviceType {
        self.codec.device()
    }

    /// Parent codec.
    pub fn codec(&self) -> &'a Codec<'a, R> {
        self.codec
    }

    /// Descriptor in use.
    pub fn desc(&self) -> &'static RegulatorDesc {
        self.desc
    }

    /// Selector table in use.
    pub fn table(&self) -> VoltageTable {
        self.table
    }

    /// Init data handed to the framework.
    pub fn init_data(&self) -> &InitData {
        &self.init_data
    }

    /// Consumer binding handed to the framework.
    pub fn consumer_supply(&self) -> Option<&ConsumerSupply> {
        self.init_data.consumer_supply.as_ref()
    }

    /// Framework handle.
    pub fn id(&self) -> RegulatorId {
        self.id
    }

    /// Settle time applied after bypass writes, µs.
    pub fn bypass_settle_us(&self) -> u32 {
        self.bypass_settle_us
    }

    /// Bind the sound card's routing graph and schedule a pass so the pin
    /// picks up the current charge pump state.
    pub fn bind_routing(&self, graph: &'a G) {
        self.cp.bind(graph);
        self.cp.schedule();
    }

    /// Forget the routing graph, e.g. when the sound card goes away.
    pub fn unbind_routing(&self) {
        self.cp.unbind();
    }

    /// Request a routing pin synchronization.
    pub fn request_sync(&self) {
        self.cp.schedule();
    }

    /// Pin state applied by the last successful pass.
    pub fn pin_state(&self) -> Option<PinState> {
        self.cp.pin_state()
    }

    /// Synchronizer counters.
    pub fn sync_stats(&self) -> SyncStats {
        self.cp.stats()
    }

    /// Whether a synchronization is waiting for the worker.
    pub fn sync_pending(&self) -> bool {
        self.cp.is_pending()
    }

    /// Charge pump worker. Spawn or join it alongside whatever drives the
    /// control operations; it returns after [`shutdown`](Self::shutdown).
    pub async fn run_charge_pump(&self) {
        self.cp.run(self.codec.regmap()).await;
    }

    /// Stop the charge pump worker, draining a pass it has pending.
    pub async fn shutdown(&self) {
        self.cp.shutdown().await;
    }
}
