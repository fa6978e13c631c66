// Licensed under the Apache-2.0 license

//! Common types and constants for the I2C driver modules.
//!
//! This module provides shared definitions for error handling, transaction
//! condition flags, bus speeds and the setup/configuration builders used
//! across the driver implementation.

use bitflags::bitflags;
use fugit::MillisDurationU32 as MilliSeconds;

use crate::i2c::hardware_instantiation::CoreId;
use crate::i2c::registers::{ACK_POLL_MAX, MAX_CHUNK};
use crate::pinctrl::PIN_UNUSED;

/// I2C driver error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The requested logical core does not exist on this device.
    UnknownCore,
    /// A start condition was requested without a data phase.
    InvalidStartWithoutData,
    /// A command did not reach idle before its deadline. The bus may be
    /// wedged until the instance is re-initialized.
    Timeout,
    /// The addressed target did not acknowledge.
    NotAcknowledged,
    /// A raw value does not fit its register field.
    OutOfRange,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::UnknownCore => "unknown I2C core",
            Error::InvalidStartWithoutData => "start condition requires data",
            Error::Timeout => "command timed out",
            Error::NotAcknowledged => "no acknowledge received",
            Error::OutOfRange => "value out of range",
        };
        f.write_str(msg)
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        match self {
            Error::NotAcknowledged => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            _ => ErrorKind::Other,
        }
    }
}

impl From<crate::timer::Elapsed> for Error {
    fn from(_: crate::timer::Elapsed) -> Self {
        Error::Timeout
    }
}

/// Bus speeds selectable through the master control mode field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum I2cSpeed {
    Khz50 = 0,
    Khz100 = 1,
    Khz200 = 2,
    Khz400 = 3,
    Khz800 = 4,
    Khz1200 = 5,
    /// High-speed mode
    HighSpeed1700 = 6,
    /// High-speed mode
    HighSpeed3400 = 7,
}

impl I2cSpeed {
    /// Raw value for the mode field.
    #[must_use]
    pub const fn mode(self) -> u32 {
        self as u32
    }

    /// Nominal SCL rate in bit/s.
    #[must_use]
    pub const fn bit_rate(self) -> u32 {
        match self {
            I2cSpeed::Khz50 => 50_000,
            I2cSpeed::Khz100 => 100_000,
            I2cSpeed::Khz200 => 200_000,
            I2cSpeed::Khz400 => 400_000,
            I2cSpeed::Khz800 => 800_000,
            I2cSpeed::Khz1200 => 1_200_000,
            I2cSpeed::HighSpeed1700 => 1_700_000,
            I2cSpeed::HighSpeed3400 => 3_400_000,
        }
    }
}

bitflags! {
    /// Bus conditions framing one `send`/`receive` call.
    ///
    /// When `START` is set the low seven bits carry the target address; see
    /// [`Condition::start`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Condition: u32 {
        /// Generate a (repeated) start and address the target.
        const START = 1 << 8;
        /// Generate a stop after the data phase.
        const STOP = 1 << 9;
        /// Keep the transfer open for a following call in the same direction.
        const CONTINUE = 1 << 10;
    }
}

impl Condition {
    const ADDRESS_MASK: u32 = 0x7f;

    /// `START` addressed to the 7-bit `address`.
    #[must_use]
    pub const fn start(address: u8) -> Self {
        Self::from_bits_retain(Self::START.bits() | (address as u32 & Self::ADDRESS_MASK))
    }

    /// Target address carried in the low seven bits.
    #[must_use]
    pub const fn address(self) -> u8 {
        (self.bits() & Self::ADDRESS_MASK) as u8
    }
}

/// Runtime behavior of an initialized controller.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct I2cConfig {
    /// Mode programmed at bring-up.
    pub speed: I2cSpeed,
    /// Acknowledge-poll bound used by the `embedded-hal` adapter.
    pub ack_poll: u32,
    /// Largest number of bytes moved by one hardware command.
    pub chunk_limit: usize,
    /// Deadline for a single hardware command.
    pub timeout: MilliSeconds,
}

impl Default for I2cConfig {
    fn default() -> Self {
        I2cConfigBuilder::new().build()
    }
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    ack_poll: u32,
    chunk_limit: usize,
    timeout: MilliSeconds,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    pub const DEFAULT_TIMEOUT: MilliSeconds = MilliSeconds::millis(1000);

    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: I2cSpeed::Khz100,
            ack_poll: 0,
            chunk_limit: MAX_CHUNK,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }
    /// Values above the field maximum are clamped.
    #[must_use]
    pub fn ack_poll(mut self, ack_poll: u32) -> Self {
        self.ack_poll = ack_poll.min(ACK_POLL_MAX);
        self
    }
    /// Clamped to `1..=MAX_CHUNK`.
    #[must_use]
    pub fn chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit.clamp(1, MAX_CHUNK);
        self
    }
    #[must_use]
    pub fn timeout(mut self, timeout: MilliSeconds) -> Self {
        self.timeout = timeout;
        self
    }
    #[must_use]
    pub fn build(self) -> I2cConfig {
        I2cConfig {
            speed: self.speed,
            ack_poll: self.ack_poll,
            chunk_limit: self.chunk_limit,
            timeout: self.timeout,
        }
    }
}

/// Board description of one instance to bring up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct I2cSetup {
    /// Raw logical core identifier, see [`CoreId`].
    pub core: u32,
    /// MMIO pin indices, SCL first.
    pub pins: [u8; 2],
    /// Port-control words for `pins`.
    pub port_control: [u16; 2],
}

pub struct I2cSetupBuilder {
    core: u32,
    pins: [u8; 2],
    port_control: [u16; 2],
}

impl I2cSetupBuilder {
    #[must_use]
    pub fn new(core: CoreId) -> Self {
        Self::raw_core(core as u32)
    }
    /// Identifier taken verbatim from external configuration; validated by
    /// the configurator.
    #[must_use]
    pub fn raw_core(core: u32) -> Self {
        Self {
            core,
            pins: [PIN_UNUSED; 2],
            port_control: [0; 2],
        }
    }
    #[must_use]
    pub fn pins(mut self, scl: u8, sda: u8) -> Self {
        self.pins = [scl, sda];
        self
    }
    #[must_use]
    pub fn port_control(mut self, scl: u16, sda: u16) -> Self {
        self.port_control = [scl, sda];
        self
    }
    #[must_use]
    pub fn build(self) -> I2cSetup {
        I2cSetup {
            core: self.core,
            pins: self.pins,
            port_control: self.port_control,
        }
    }
}
