//! Audio routing graph abstraction
//!
//! The subset of an audio-routing (DAPM-style) graph a supply driver needs:
//! forcing a named pin on or off and re-evaluating the graph. The graph owns
//! a card-wide lock; whether a driver must take it around pin updates
//! depends on the hardware generation the card was built for.

/// Audio routing graph of an active sound card.
pub trait AudioRouting {
    /// Graph error
    type Error: core::fmt::Debug;

    /// Whether pin updates from driver context must take the card lock.
    ///
    /// Read once when the graph is bound; the answer does not change for
    /// the life of the card.
    fn requires_explicit_lock(&self) -> bool;

    /// Keep `pin` powered regardless of path activity.
    fn force_pin_enabled(&self, pin: &str) -> Result<(), Self::Error>;

    /// Mark `pin` as disconnected.
    fn disable_pin(&self, pin: &str) -> Result<(), Self::Error>;

    /// Re-evaluate the graph so pin changes take effect.
    fn synchronize(&self) -> Result<(), Self::Error>;

    /// Run `f` while holding the card-wide routing lock.
    fn with_lock<T>(&self, f: impl FnOnce(&Self) -> T) -> T;
}
