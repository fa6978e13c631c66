// Licensed under the Apache-2.0 license

//! hsoc v2 master engine.
//!
//! Every transaction is built from blocking hardware commands: an
//! acknowledge-polled start, one transfer command per chunk, and a stop. A
//! chunk is at most `chunk_limit` bytes and never more than the 1024 the
//! transfer-size field allows; consecutive chunks are glued with the
//! "continued" opcode so the bus is held between them.

use fugit::MillisDurationU32 as MilliSeconds;

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{Condition, Error, I2cConfig};
use crate::i2c::registers::{
    command_idle, Command, Direction, McrVal, Register, RegisterBlock, Status, ACK_POLL_MAX,
    MAX_CHUNK, MCR, MODE_MAX,
};
use crate::i2c::traits::I2cCore;
use crate::timer::{poll_until, Timer};

pub struct HsocV2<R: RegisterBlock, T: Timer, L: Logger = NoOpLogger> {
    regs: R,
    timer: T,
    logger: L,
    chunk_limit: usize,
    timeout: MilliSeconds,
}

impl<R: RegisterBlock, T: Timer, L: Logger> HsocV2<R, T, L> {
    /// Wrap an already initialized register block.
    #[must_use]
    pub fn new(regs: R, timer: T, logger: L, config: &I2cConfig) -> Self {
        Self {
            regs,
            timer,
            logger,
            chunk_limit: config.chunk_limit.clamp(1, MAX_CHUNK),
            timeout: config.timeout,
        }
    }

    /// Borrow the underlying register block.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Give back the register block, timer and logger.
    pub fn release(self) -> (R, T, L) {
        (self.regs, self.timer, self.logger)
    }

    /// Write `command` and block until the command register reads idle.
    ///
    /// Idle only means "finished"; callers that need an acknowledge check
    /// `last_ac` afterwards. The hardware bus-timeout latch is not consulted;
    /// a stalled bus surfaces through the command deadline.
    ///
    /// # Errors
    ///
    /// `Timeout` if idle was not observed within the command deadline.
    pub fn issue_and_wait(&mut self, command: Command) -> Result<(), Error> {
        self.issue(command);
        self.wait_for_command_done()
    }

    fn issue(&mut self, command: Command) {
        self.regs.write(Register::Cmd, command.bits());
    }

    fn wait_for_command_done(&mut self) -> Result<(), Error> {
        let regs = &mut self.regs;
        poll_until(&mut self.timer, self.timeout, || command_idle(regs)).map_err(|e| {
            self.logger.error("command did not complete");
            Error::from(e)
        })
    }

    fn check_ack(&mut self) -> Result<(), Error> {
        if Status::read(&mut self.regs).last_ack {
            Ok(())
        } else {
            self.logger.error("no ACK received");
            Err(Error::NotAcknowledged)
        }
    }

    fn start(&mut self, direction: Direction, address: u8, ack_poll: u32) -> Result<(), Error> {
        let mut mcr = McrVal::new(self.regs.read(Register::Mcr));
        mcr.modify(MCR::SADR.val(u32::from(address)));
        self.regs.write(Register::Mcr, mcr.get());

        self.issue_and_wait(Command::ack_poll(direction, ack_poll))?;
        self.check_ack()
    }

    fn stop(&mut self) -> Result<(), Error> {
        self.logger.debug("stop");
        self.issue_and_wait(Command::stop())
    }

    fn write_chunks(&mut self, data: &[u8], continue_after: bool) -> Result<(), Error> {
        let mut chunks = data.chunks(self.chunk_limit).peekable();
        while let Some(chunk) = chunks.next() {
            let Some((&first, rest)) = chunk.split_first() else {
                continue;
            };
            let continued = chunks.peek().is_some() || continue_after;

            // A write command needs at least one byte in the FIFO when it starts.
            self.regs.write(Register::Mdr, u32::from(first));
            self.issue(Command::transfer(Direction::Write, chunk.len(), continued));
            self.fill_fifo(rest)?;

            self.wait_for_command_done()?;
            self.check_ack()?;
        }
        Ok(())
    }

    fn fill_fifo(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mut pending = bytes.iter();
        let mut next = pending.next();
        let regs = &mut self.regs;
        poll_until(&mut self.timer, self.timeout, || {
            if let Some(&byte) = next {
                if !Status::read(regs).fifo_full {
                    regs.write(Register::Mdr, u32::from(byte));
                    next = pending.next();
                }
            }
            next.is_none()
        })
        .map_err(|e| {
            self.logger.error("master FIFO stalled");
            Error::from(e)
        })
    }

    fn read_chunks(&mut self, buffer: &mut [u8], continue_after: bool) -> Result<(), Error> {
        let mut chunks = buffer.chunks_mut(self.chunk_limit).peekable();
        while let Some(chunk) = chunks.next() {
            let continued = chunks.peek().is_some() || continue_after;

            self.issue(Command::transfer(Direction::Read, chunk.len(), continued));
            self.drain_fifo(chunk)?;
            self.wait_for_command_done()?;
        }
        Ok(())
    }

    fn drain_fifo(&mut self, chunk: &mut [u8]) -> Result<(), Error> {
        let mut slots = chunk.iter_mut();
        let regs = &mut self.regs;
        poll_until(&mut self.timer, self.timeout, || {
            let level = Status::read(regs).fifo_level;
            for slot in slots.by_ref().take(level) {
                *slot = regs.read(Register::Mdr) as u8;
            }
            slots.len() == 0
        })
        .map_err(|e| {
            self.logger.error("master FIFO starved");
            Error::from(e)
        })
    }

    fn begin(
        &mut self,
        direction: Direction,
        condition: Condition,
        ack_poll: u32,
        len: usize,
    ) -> Result<(), Error> {
        if condition.contains(Condition::START) {
            if len == 0 {
                return Err(Error::InvalidStartWithoutData);
            }
            self.start(direction, condition.address(), ack_poll.min(ACK_POLL_MAX))?;
        }
        Ok(())
    }
}

impl<R: RegisterBlock, T: Timer, L: Logger> I2cCore for HsocV2<R, T, L> {
    type Error = Error;

    fn send(&mut self, condition: Condition, ack_poll: u32, data: &[u8]) -> Result<(), Error> {
        self.begin(Direction::Write, condition, ack_poll, data.len())?;
        if !data.is_empty() {
            self.write_chunks(data, condition.contains(Condition::CONTINUE))?;
        }
        if condition.contains(Condition::STOP) {
            self.stop()?;
        }
        Ok(())
    }

    fn receive(
        &mut self,
        condition: Condition,
        ack_poll: u32,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.begin(Direction::Read, condition, ack_poll, buffer.len())?;
        if !buffer.is_empty() {
            self.read_chunks(buffer, condition.contains(Condition::CONTINUE))?;
        }
        if condition.contains(Condition::STOP) {
            self.stop()?;
        }
        Ok(())
    }

    fn set_device_specific_speed(&mut self, value: u32) -> Result<(), Error> {
        if value > MODE_MAX {
            return Err(Error::OutOfRange);
        }
        let mut mcr = McrVal::new(self.regs.read(Register::Mcr));
        mcr.modify(MCR::MODE.val(value));
        self.regs.write(Register::Mcr, mcr.get());
        Ok(())
    }
}
