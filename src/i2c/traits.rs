// Licensed under the Apache-2.0 license

//! # I2C core capability trait
//!
//! Each controller family implements [`I2cCore`] once; an initialized handle
//! is generic over it. The trait is the whole contract between the
//! bus-level adapter and the hardware: three blocking operations and an
//! error type that `embedded-hal` understands.
//!
//! ```text
//! I2cController<H: I2cCore>      (handle, embedded-hal adapter)
//!     └── HsocV2<R, T, L>         (hsoc v2 command/FIFO engine)
//!             ├── R: RegisterBlock
//!             ├── T: Timer
//!             └── L: Logger
//! ```

use crate::i2c::common::Condition;

/// Blocking master operations of one controller instance.
///
/// Calls on one instance are strictly sequential. The trait takes
/// `&mut self` everywhere and provides no internal locking.
///
/// # Examples
///
/// ```rust,no_run
/// use hsoc_i2c::i2c::{Condition, I2cCore};
///
/// fn read_id<C: I2cCore>(core: &mut C) -> Result<[u8; 2], C::Error> {
///     let mut id = [0u8; 2];
///     core.send(Condition::start(0x50), 0, &[0x00])?;
///     core.receive(Condition::start(0x50) | Condition::STOP, 0, &mut id)?;
///     Ok(id)
/// }
/// ```
pub trait I2cCore {
    /// Hardware-specific error type that implements embedded-hal error traits
    type Error: embedded_hal::i2c::Error + core::fmt::Debug;

    /// Write `data` framed by `condition`.
    ///
    /// With `Condition::START` the target addressed by `condition.address()`
    /// is polled up to `ack_poll` extra times; values beyond the hardware
    /// limit are clamped, never rejected.
    ///
    /// # Errors
    ///
    /// Fails before touching the hardware if a start is requested with empty
    /// `data`. Otherwise reports the first failed command; later phases,
    /// including the stop, are skipped.
    fn send(&mut self, condition: Condition, ack_poll: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buffer` framed by `condition`.
    ///
    /// # Errors
    ///
    /// Same contract as [`I2cCore::send`].
    fn receive(
        &mut self,
        condition: Condition,
        ack_poll: u32,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Program a raw, device-specific bus speed value.
    ///
    /// # Errors
    ///
    /// Returns an error without touching the hardware if `value` does not fit
    /// the speed field.
    fn set_device_specific_speed(&mut self, value: u32) -> Result<(), Self::Error>;
}
