//! Error types for the mic supply driver
//!
//! `E` is the register transport's error type, kept so synchronous callers
//! can see what the bus reported.

/// Errors surfaced by attach, control and detach paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Neither the description node nor the bus id names a supported chip
    #[error("unknown device type")]
    UnknownDevice,
    /// Voltage selector above the variant's table
    #[error("selector {selector} out of range (max {max})")]
    InvalidSelector {
        /// Requested selector
        selector: u32,
        /// Highest valid selector for the variant
        max: u32,
    },
    /// No selector produces a voltage inside the requested window
    #[error("no voltage between {min_uv} and {max_uv} uV")]
    VoltageOutOfRange {
        /// Window floor, µV
        min_uv: u32,
        /// Window ceiling, µV
        max_uv: u32,
    },
    /// Register read or write failed on the bus
    #[error("register access failed")]
    RegisterAccess(E),
    /// Per-device state could not be allocated
    #[error("unable to allocate private data")]
    AllocationFailure,
    /// A register map could not be created on the bus
    #[error("failed to allocate register map")]
    RegisterMapInit,
    /// The regulator framework rejected the instance
    #[error("failed to register mic supply")]
    Registration,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::RegisterAccess(error)
    }
}

/// Driver result type.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_convert_into_register_access() {
        let err: Error<u8> = 7u8.into();
        assert_eq!(err, Error::RegisterAccess(7));
    }

    #[test]
    fn invalid_selector_message_names_the_bound() {
        let err: Error<()> = Error::InvalidSelector { selector: 0x20, max: 0x1f };
        assert_eq!(std::format!("{err}"), "selector 32 out of range (max 31)");
    }
}
