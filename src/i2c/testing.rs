// Licensed under the Apache-2.0 license

//! Simulated register block and collaborators shared by the unit tests.

use std::collections::{HashMap, VecDeque};

use fugit::MillisDurationU32 as MilliSeconds;

use crate::i2c::registers::{
    Command, CmdVal, Direction, McrVal, Opcode, Register, RegisterBlock, SrVal, CMD, MCR, SR,
};
use crate::pinctrl::{PinFunction, PortControl};
use crate::timer::Timer;

const FIFO_DEPTH: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Read(Register, u32),
    Write(Register, u32),
}

/// Behavioral model of one controller instance.
///
/// Commands complete immediately unless told otherwise, every start is
/// acknowledged and the transmit FIFO never fills.
pub struct SimBus {
    regs: HashMap<Register, u32>,
    pub accesses: Vec<Access>,
    pub commands: Vec<Command>,
    /// Bytes written to the master data register.
    pub written: Vec<u8>,
    /// Bytes already in the FIFO when each write transfer was issued.
    pub primed: Vec<usize>,
    pub ack: bool,
    /// Acknowledge only while at most this many commands were issued.
    pub nack_after: Option<usize>,
    /// Status reads that report a full FIFO.
    pub full_polls: u32,
    pub device_data: VecDeque<u8>,
    /// Largest FIFO level a single status read reports.
    pub fifo_trickle: Option<usize>,
    /// The command with this index and all later ones never finish.
    pub stuck_after: Option<usize>,
    /// Command reads that report busy after each issued command.
    pub busy_polls: u32,
    rx_fifo: VecDeque<u8>,
    tx_pending: usize,
    tx_owed: usize,
    busy_left: u32,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            regs: HashMap::new(),
            accesses: Vec::new(),
            commands: Vec::new(),
            written: Vec::new(),
            primed: Vec::new(),
            ack: true,
            nack_after: None,
            full_polls: 0,
            device_data: VecDeque::new(),
            fifo_trickle: None,
            stuck_after: None,
            busy_polls: 0,
            rx_fifo: VecDeque::new(),
            tx_pending: 0,
            tx_owed: 0,
            busy_left: 0,
        }
    }

    /// Preset a register without recording an access.
    pub fn set(&mut self, reg: Register, value: u32) {
        self.regs.insert(reg, value);
    }

    /// Stored register value, without recording an access.
    pub fn get(&self, reg: Register) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    /// Target address currently programmed into the master control register.
    pub fn address(&self) -> u8 {
        McrVal::new(self.get(Register::Mcr)).read(MCR::SADR) as u8
    }

    pub fn writes(&self) -> Vec<(Register, u32)> {
        self.accesses
            .iter()
            .filter_map(|a| match *a {
                Access::Write(reg, value) => Some((reg, value)),
                Access::Read(..) => None,
            })
            .collect()
    }

    fn stuck(&self) -> bool {
        self.stuck_after
            .is_some_and(|n| self.commands.len() > n)
    }

    fn acked(&self) -> bool {
        self.ack && self.nack_after.map_or(true, |n| self.commands.len() <= n)
    }

    fn command_written(&mut self, value: u32) {
        let command = Command::from_bits(value);
        if command.size > 0 {
            match command.direction {
                Direction::Write => {
                    self.primed.push(self.tx_pending);
                    self.tx_owed = command.size.saturating_sub(self.tx_pending);
                    self.tx_pending = 0;
                }
                Direction::Read => {
                    let staged = command.size.min(self.device_data.len());
                    self.rx_fifo.extend(self.device_data.drain(..staged));
                }
            }
        }
        self.commands.push(command);
        self.busy_left = self.busy_polls;
    }

    fn read_cmd(&mut self) -> u32 {
        let mut cmd = CmdVal::new(self.get(Register::Cmd));
        if self.stuck() {
            return cmd.get();
        }
        if self.busy_left > 0 {
            self.busy_left -= 1;
            return cmd.get();
        }
        cmd.modify(CMD::OP.val(Opcode::Idle as u32));
        cmd.get()
    }

    fn read_sr(&mut self) -> u32 {
        let mut sr = SrVal::new(self.get(Register::Sr));
        let mut level = self.rx_fifo.len().min(FIFO_DEPTH);
        if let Some(trickle) = self.fifo_trickle {
            level = level.min(trickle);
        }
        let full = self.full_polls > 0;
        if self.full_polls != u32::MAX {
            self.full_polls = self.full_polls.saturating_sub(1);
        }
        sr.modify(SR::MFIFO_LEVEL.val(level as u32));
        sr.modify(if full {
            SR::MFIFO_FULL::SET
        } else {
            SR::MFIFO_FULL::CLEAR
        });
        sr.modify(if self.acked() {
            SR::LAST_AC::SET
        } else {
            SR::LAST_AC::CLEAR
        });
        sr.get()
    }
}

impl RegisterBlock for SimBus {
    fn read(&mut self, reg: Register) -> u32 {
        let value = match reg {
            Register::Cmd => self.read_cmd(),
            Register::Sr => self.read_sr(),
            Register::Mdr => self.rx_fifo.pop_front().map_or(0, u32::from),
            _ => self.get(reg),
        };
        self.accesses.push(Access::Read(reg, value));
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.accesses.push(Access::Write(reg, value));
        match reg {
            Register::Cmd => {
                self.set(reg, value);
                self.command_written(value);
            }
            Register::Mdr => {
                self.written.push(value as u8);
                if self.tx_owed > 0 {
                    self.tx_owed -= 1;
                } else {
                    self.tx_pending += 1;
                }
            }
            _ => self.set(reg, value),
        }
    }
}

/// Deadline that expires after a fixed number of polls.
pub struct PollTimer {
    limit: Option<u32>,
    polls: u32,
}

impl PollTimer {
    pub fn never() -> Self {
        Self {
            limit: None,
            polls: 0,
        }
    }

    /// `is_elapsed` reports `false` `polls` times per deadline, then `true`.
    pub fn after(polls: u32) -> Self {
        Self {
            limit: Some(polls),
            polls: 0,
        }
    }
}

impl Timer for PollTimer {
    type Handle = ();

    fn start(&mut self, _timeout: MilliSeconds) {
        self.polls = 0;
    }

    fn is_elapsed(&mut self, _handle: &()) -> bool {
        match self.limit {
            Some(limit) if self.polls >= limit => true,
            _ => {
                self.polls += 1;
                false
            }
        }
    }
}

#[derive(Default)]
pub struct MockPortControl {
    pub calls: Vec<(Vec<u8>, Vec<u16>)>,
}

impl PortControl for MockPortControl {
    fn apply(&mut self, pins: &[u8], values: &[u16]) {
        self.calls.push((pins.to_vec(), values.to_vec()));
    }
}

#[derive(Default)]
pub struct MockPinFunction {
    pub calls: Vec<(Vec<u8>, Vec<u8>)>,
}

impl PinFunction for MockPinFunction {
    fn apply(&mut self, pins: &[u8], functions: &[u8]) {
        self.calls.push((pins.to_vec(), functions.to_vec()));
    }
}
