// Licensed under the Apache-2.0 license

//! I2C System Setup Helper
//!
//! Register-level bring-up of one controller instance. The steps are exposed
//! individually so a caller can recover a wedged instance (for example after
//! a command timeout) without repeating the pin configuration.

use crate::i2c::common::I2cSpeed;
use crate::i2c::registers::{McrVal, Register, RegisterBlock, FIFO_CR, IRQ, MCR, SR};

/// Helper for I2C register bring-up
pub struct I2cSystemSetup;

impl I2cSystemSetup {
    /// Complete register initialization
    ///
    /// Leaves the instance enabled in `speed`, with hardware bus timeout
    /// detection on, empty FIFOs and all interrupts and DMA requests off.
    pub fn bring_up<R: RegisterBlock>(regs: &mut R, speed: I2cSpeed) {
        Self::reset_unit(regs);
        Self::clear_fifos(regs);
        Self::disable_interrupts(regs);
        Self::disable_dma(regs);
        Self::clear_timeout(regs);
        Self::enable_unit(regs, speed);
    }

    /// Pulse the unit reset and clear the slave configuration.
    pub fn reset_unit<R: RegisterBlock>(regs: &mut R) {
        regs.write(Register::Mcr, MCR::RST_I2C::SET.value);
        regs.write(Register::Mcr, 0);
        regs.write(Register::Scr, 0);
    }

    /// Flush master and slave FIFOs.
    pub fn clear_fifos<R: RegisterBlock>(regs: &mut R) {
        let clear = FIFO_CR::CLR::SET.value;
        regs.write(Register::MfifoCr, clear);
        regs.write(Register::MfifoCr, 0);
        regs.write(Register::SfifoCr, clear);
        regs.write(Register::SfifoCr, 0);
    }

    /// Mask every interrupt source and acknowledge anything pending.
    pub fn disable_interrupts<R: RegisterBlock>(regs: &mut R) {
        regs.write(Register::IrqMsk, 0);
        regs.write(
            Register::IrqSr,
            (IRQ::SREQ::SET
                + IRQ::SFIFO_REQ::SET
                + IRQ::MFIFO_REQ::SET
                + IRQ::BUS_BUSY::SET
                + IRQ::FIFO_ERR::SET
                + IRQ::CMD_ERR::SET
                + IRQ::CMD_OK::SET)
                .value,
        );
    }

    pub fn disable_dma<R: RegisterBlock>(regs: &mut R) {
        regs.write(Register::DmaCr, 0);
    }

    /// Acknowledge a latched bus timeout.
    pub fn clear_timeout<R: RegisterBlock>(regs: &mut R) {
        regs.write(Register::Sr, SR::TIMEOUT::SET.value);
    }

    /// Enable the master with bus timeout detection in `speed`.
    pub fn enable_unit<R: RegisterBlock>(regs: &mut R, speed: I2cSpeed) {
        let mut mcr = McrVal::new(0);
        mcr.modify(MCR::EN_TIMEOUT::SET + MCR::MODE.val(speed.mode()) + MCR::EN_I2C::SET);
        regs.write(Register::Mcr, mcr.get());
    }
}
