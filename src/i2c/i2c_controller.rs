// Licensed under the Apache-2.0 license

//! High-level I2C controller abstraction.
//!
//! [`I2cController`] is the handle returned by instance initialization. It
//! exposes the raw condition-framed operations of the core and implements
//! `embedded_hal::i2c::I2c` on top of them, so drivers written against
//! `embedded-hal` run unchanged.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{Condition, I2cConfig, I2cSpeed};
use crate::i2c::traits::I2cCore;
use embedded_hal::i2c::{Operation, SevenBitAddress};

pub struct I2cController<H: I2cCore, L: Logger = NoOpLogger> {
    pub hardware: H,
    pub config: I2cConfig,
    pub logger: L,
}

impl<H: I2cCore> I2cController<H> {
    #[must_use]
    pub fn new(hardware: H, config: I2cConfig) -> Self {
        Self::with_logger(hardware, config, NoOpLogger)
    }
}

impl<H: I2cCore, L: Logger> I2cController<H, L> {
    #[must_use]
    pub fn with_logger(hardware: H, config: I2cConfig, logger: L) -> Self {
        Self {
            hardware,
            config,
            logger,
        }
    }

    /// See [`I2cCore::send`].
    ///
    /// # Errors
    ///
    /// Propagates the core's error.
    pub fn send(&mut self, condition: Condition, ack_poll: u32, data: &[u8]) -> Result<(), H::Error> {
        self.hardware.send(condition, ack_poll, data)
    }

    /// See [`I2cCore::receive`].
    ///
    /// # Errors
    ///
    /// Propagates the core's error.
    pub fn receive(
        &mut self,
        condition: Condition,
        ack_poll: u32,
        buffer: &mut [u8],
    ) -> Result<(), H::Error> {
        self.hardware.receive(condition, ack_poll, buffer)
    }

    /// See [`I2cCore::set_device_specific_speed`].
    ///
    /// # Errors
    ///
    /// Propagates the core's error.
    pub fn set_device_specific_speed(&mut self, value: u32) -> Result<(), H::Error> {
        self.hardware.set_device_specific_speed(value)
    }

    /// Switch to one of the named bus speeds.
    ///
    /// # Errors
    ///
    /// Propagates the core's error; the recorded speed is left unchanged.
    pub fn set_speed(&mut self, speed: I2cSpeed) -> Result<(), H::Error> {
        self.hardware.set_device_specific_speed(speed.mode())?;
        self.config.speed = speed;
        Ok(())
    }
}

impl<H: I2cCore, L: Logger> embedded_hal::i2c::ErrorType for I2cController<H, L> {
    type Error = H::Error;
}

impl<H: I2cCore, L: Logger> embedded_hal::i2c::I2c for I2cController<H, L> {
    fn read(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let ack_poll = self.config.ack_poll;
        self.hardware
            .receive(Condition::start(addr) | Condition::STOP, ack_poll, buffer)
    }

    fn write(&mut self, addr: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        let ack_poll = self.config.ack_poll;
        self.hardware
            .send(Condition::start(addr) | Condition::STOP, ack_poll, bytes)
    }

    fn write_read(
        &mut self,
        addr: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        let ack_poll = self.config.ack_poll;
        self.hardware.send(Condition::start(addr), ack_poll, bytes)?;
        self.hardware
            .receive(Condition::start(addr) | Condition::STOP, ack_poll, buffer)
    }

    /// A start is generated for the first operation and on every direction
    /// change. Adjacent operations of the same direction form one transfer.
    fn transaction(
        &mut self,
        addr: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let ack_poll = self.config.ack_poll;
        let mut previous_read = None;
        let mut operations = operations.iter_mut().peekable();

        while let Some(operation) = operations.next() {
            let is_read = matches!(operation, Operation::Read(_));
            let next_read = operations.peek().map(|next| matches!(**next, Operation::Read(_)));

            let mut condition = Condition::empty();
            if previous_read != Some(is_read) {
                condition |= Condition::start(addr);
            }
            match next_read {
                None => condition |= Condition::STOP,
                Some(next) if next == is_read => condition |= Condition::CONTINUE,
                Some(_) => {}
            }

            let result = match operation {
                Operation::Read(buffer) => self.hardware.receive(condition, ack_poll, buffer),
                Operation::Write(bytes) => self.hardware.send(condition, ack_poll, bytes),
            };
            if result.is_err() {
                self.logger.error("transaction aborted");
            }
            result?;
            previous_read = Some(is_read);
        }
        Ok(())
    }
}
