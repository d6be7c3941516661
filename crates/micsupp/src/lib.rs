//! Microphone supply (MICVDD) regulator for Wolfson Arizona-class codecs
//!
//! The codec's mic bias rail is fed by an on-chip charge pump (CPVDD in,
//! MICVDD out) that can be bypassed. This crate drives it as a voltage
//! regulator and keeps the sound card's `MICSUPP` routing pin in step with
//! the charge pump state.
//!
//! # Layers
//!
//! ```text
//! Codec::attach          identify variant, create register maps
//!        ↓
//! MicSupply::attach      resolve init data, register MICVDD
//!        ↓
//! control surface        enable / voltage / bypass  ──► schedule()
//!        ↓                                                │
//! run_charge_pump()      worker: read CP state, update MICSUPP pin
//! ```
//!
//! # Supported variants
//!
//! | Chip           | Selectors | Range          | Enable time |
//! |----------------|-----------|----------------|-------------|
//! | WM5102         | 32        | 1.70 – 3.30 V  | 6 ms        |
//! | WM5110, WM8280 | 40        | 0.90 – 3.30 V  | 3 ms        |
//!
//! # Example
//!
//! ```
//! use codec_platform::mocks::{MockDelay, MockFramework, MockRegmap, MockRouting, MockTransport};
//! use embassy_futures::{block_on, join::join};
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use micsupp::{BusContext, Codec, DriverConfig, MicSupply, PinState};
//!
//! let mut transport = MockTransport::new();
//! let codec = Codec::attach(&BusContext::new("wm5110", "spi0.0"), &mut transport, DriverConfig::DEFAULT)
//!     .map_err(|_| "attach")?;
//!
//! let mut framework = MockFramework::new();
//! let supply: MicSupply<'_, MockRegmap, MockRouting, NoopRawMutex, MockDelay> =
//!     MicSupply::attach(&codec, &mut framework, MockDelay::new()).map_err(|_| "register")?;
//!
//! let graph = MockRouting::explicit_lock();
//! block_on(join(supply.run_charge_pump(), async {
//!     supply.bind_routing(&graph);
//!     supply.enable().ok();
//!     supply.shutdown().await;
//! }));
//!
//! assert_eq!(supply.pin_state(), Some(PinState::ForcedOn));
//! supply.detach(&mut framework);
//! # Ok::<(), &'static str>(())
//! ```
//!
//! # Features
//!
//! - `tracing` (default): host logging
//! - `defmt`: hardware logging
//! - `std`: host mocks from `codec-platform`

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
mod fmt;

pub mod attach;
pub mod catalog;
pub mod charge_pump;
pub mod config;
pub mod desc;
pub mod device;
pub mod error;
pub mod identify;
pub mod registers;
pub mod supply;
pub mod voltage;

pub use attach::InitSource;
pub use catalog::DeviceType;
pub use charge_pump::{ChargePumpSync, PinState, SyncStats};
pub use config::{BypassSettle, DriverConfig};
pub use device::{BusContext, Codec, PlatformData};
pub use error::{Error, Result};
pub use supply::MicSupply;
pub use voltage::VoltageTable;
