//! Register map abstraction
//!
//! Mirrors the generic register cache/transport layer a codec driver sits on:
//! fixed-width addresses and values, single-register read/write and a
//! read-modify-write primitive. Implementations do their own locking, so every
//! operation takes `&self` and a map can be shared between the caller's
//! context and deferred work.

/// Register access over a bus transport.
pub trait RegisterMap {
    /// Transport error
    type Error: core::fmt::Debug;

    /// Read one register.
    fn read(&self, reg: u32) -> Result<u32, Self::Error>;

    /// Write one register.
    fn write(&self, reg: u32, value: u32) -> Result<(), Self::Error>;

    /// Read-modify-write of the bits selected by `mask`.
    ///
    /// Implementations skip the bus write when the register already holds
    /// the requested bits.
    fn update_bits(&self, reg: u32, mask: u32, value: u32) -> Result<(), Self::Error>;
}

impl<T: RegisterMap + ?Sized> RegisterMap for &T {
    type Error = T::Error;

    fn read(&self, reg: u32) -> Result<u32, Self::Error> {
        (**self).read(reg)
    }

    fn write(&self, reg: u32, value: u32) -> Result<(), Self::Error> {
        (**self).write(reg, value)
    }

    fn update_bits(&self, reg: u32, mask: u32, value: u32) -> Result<(), Self::Error> {
        (**self).update_bits(reg, mask, value)
    }
}

/// Static description of one register space.
///
/// `reg_bits` + `pad_bits` is the address phase on the wire; `val_bits` is
/// the register width. One instance per register layout, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegmapConfig {
    /// Short name used in logs
    pub name: &'static str,
    /// Address width in bits
    pub reg_bits: u8,
    /// Padding bits between address and data
    pub pad_bits: u8,
    /// Value width in bits
    pub val_bits: u8,
    /// Highest valid register address
    pub max_register: u32,
}

impl RegmapConfig {
    /// Mask covering every bit a register of this map can hold.
    #[must_use]
    pub const fn value_mask(&self) -> u32 {
        if self.val_bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.val_bits).wrapping_sub(1)
        }
    }

    /// Whether `reg` is addressable in this map.
    #[must_use]
    pub const fn contains(&self, reg: u32) -> bool {
        reg <= self.max_register
    }
}

/// Bus transport able to build register maps (SPI or I2C client).
pub trait BusTransport {
    /// Register map produced by this transport
    type Map: RegisterMap;
    /// Initialisation error
    type Error: core::fmt::Debug;

    /// Create a register map with the given layout.
    fn init_regmap(&mut self, config: &'static RegmapConfig) -> Result<Self::Map, Self::Error>;
}
