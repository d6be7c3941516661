//! Collaborator interfaces for audio codec supply drivers
//!
//! This crate provides trait-based abstractions for everything a codec
//! regulator driver consumes but does not own, enabling development and
//! testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Driver Layer (micsupp crate)
//!         ↓
//! Collaborator traits (this crate)
//!         ↓
//! Bus transport, regulator framework, sound card
//! ```
//!
//! # Interfaces
//!
//! - [`RegisterMap`] / [`BusTransport`] - register access and map creation
//! - [`RegulatorFramework`] - regulator registration, plus the generic
//!   register-backed operations in [`regulator`]
//! - [`AudioRouting`] - pin control on the sound card's routing graph
//! - [`HwNode`] - hardware description node lookups
//!
//! # Features
//!
//! - `std`: host mocks of every interface ([`mocks`])
//! - `defmt`: `defmt::Format` derives for hardware logging
//!
//! # Example
//!
//! ```
//! use codec_platform::regulator::{enable_regmap, is_enabled_regmap, RegulatorDesc, RegulatorType};
//! use codec_platform::RegisterMap;
//!
//! fn bring_up<R: RegisterMap>(map: &R, desc: &RegulatorDesc) -> Result<bool, R::Error> {
//!     enable_regmap(map, desc)?;
//!     is_enabled_regmap(map, desc)
//! }
//! ```

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
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // callers decide on hardware accessors
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod node;
pub mod regmap;
pub mod regulator;
pub mod routing;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use node::HwNode;
pub use regmap::{BusTransport, RegisterMap, RegmapConfig};
pub use regulator::{
    ConsumerSupply, Constraints, InitData, RegulatorConfig, RegulatorDesc, RegulatorFramework,
    RegulatorId, RegulatorType, ValidOps,
};
pub use routing::AudioRouting;
