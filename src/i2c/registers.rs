// Licensed under the Apache-2.0 license

//! Register interface of one hsoc v2 I2C instance.
//!
//! Field layouts are declared with `tock-registers` and used on local copies
//! only: the block itself is reached through [`RegisterBlock`] so the same
//! driver code runs against memory-mapped hardware and against the simulated
//! block used in tests.

use core::ptr::{read_volatile, write_volatile, NonNull};

use tock_registers::{register_bitfields, LocalRegisterCopy};

register_bitfields![u32,
    /// Master control
    pub MCR [
        EN_I2C OFFSET(0) NUMBITS(1) [],
        /// Bus speed, see `I2cSpeed`
        MODE OFFSET(1) NUMBITS(3) [],
        /// Target address for the next start sequence
        SADR OFFSET(4) NUMBITS(7) [],
        EN_TIMEOUT OFFSET(11) NUMBITS(1) [],
        RST_I2C OFFSET(15) NUMBITS(1) []
    ],

    /// Master command
    pub CMD [
        /// 1 = read from the target
        NWR OFFSET(0) NUMBITS(1) [],
        /// Opcode; reads back `Idle` once the last command finished
        OP OFFSET(1) NUMBITS(3) [],
        /// Bytes to transfer minus one
        TSIZE OFFSET(4) NUMBITS(10) [],
        /// Additional start sequences while the target does not acknowledge
        ACPOLLMAX OFFSET(16) NUMBITS(8) []
    ],

    /// Master and slave FIFO control
    pub FIFO_CR [
        CLR OFFSET(4) NUMBITS(1) []
    ],

    /// Status
    pub SR [
        MFIFO_LEVEL OFFSET(0) NUMBITS(5) [],
        MFIFO_FULL OFFSET(6) NUMBITS(1) [],
        LAST_AC OFFSET(16) NUMBITS(1) [],
        /// Bus timeout latched; write 1 to clear
        TIMEOUT OFFSET(19) NUMBITS(1) []
    ],

    /// Interrupt mask and raw status
    pub IRQ [
        CMD_OK OFFSET(0) NUMBITS(1) [],
        CMD_ERR OFFSET(1) NUMBITS(1) [],
        FIFO_ERR OFFSET(2) NUMBITS(1) [],
        BUS_BUSY OFFSET(3) NUMBITS(1) [],
        MFIFO_REQ OFFSET(4) NUMBITS(1) [],
        SFIFO_REQ OFFSET(5) NUMBITS(1) [],
        SREQ OFFSET(6) NUMBITS(1) []
    ]
];

pub type McrVal = LocalRegisterCopy<u32, MCR::Register>;
pub type CmdVal = LocalRegisterCopy<u32, CMD::Register>;
pub type SrVal = LocalRegisterCopy<u32, SR::Register>;

/// Largest acknowledge-poll count the command register can hold.
pub const ACK_POLL_MAX: u32 = CMD::ACPOLLMAX.mask;
/// Largest raw value of the mode field.
pub const MODE_MAX: u32 = MCR::MODE.mask;
/// Largest number of bytes a single transfer command can move.
pub const MAX_CHUNK: usize = CMD::TSIZE.mask as usize + 1;

/// Registers of one instance, by byte offset from its base.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Register {
    Mcr = 0x00,
    Scr = 0x04,
    Cmd = 0x08,
    Mdr = 0x0c,
    Sdr = 0x10,
    MfifoCr = 0x14,
    SfifoCr = 0x18,
    Sr = 0x1c,
    IrqMsk = 0x20,
    IrqSr = 0x24,
    IrqMsked = 0x28,
    DmaCr = 0x2c,
}

/// Word access to one instance's registers.
///
/// Writes are single stores and may start bus activity (the command
/// register). Reads return the instantaneous hardware state and may have
/// side effects (the master data register pops the FIFO), hence `&mut self`.
pub trait RegisterBlock {
    fn read(&mut self, reg: Register) -> u32;

    fn write(&mut self, reg: Register, value: u32);
}

/// Memory-mapped register block.
pub struct MmioRegisters {
    base: NonNull<u32>,
}

impl MmioRegisters {
    /// Returns `None` for a null base.
    ///
    /// # Safety
    ///
    /// `base` must be the address of an hsoc v2 I2C register block that stays
    /// mapped for the lifetime of the returned value, and no other owner may
    /// access it concurrently.
    #[must_use]
    pub unsafe fn new(base: usize) -> Option<Self> {
        NonNull::new(base as *mut u32).map(|base| Self { base })
    }

    fn address(&self, reg: Register) -> *mut u32 {
        self.base.as_ptr().wrapping_byte_add(reg as usize)
    }
}

impl RegisterBlock for MmioRegisters {
    fn read(&mut self, reg: Register) -> u32 {
        // SAFETY: every `Register` offset lies inside the block promised by `new`.
        unsafe { read_volatile(self.address(reg)) }
    }

    fn write(&mut self, reg: Register, value: u32) {
        // SAFETY: every `Register` offset lies inside the block promised by `new`.
        unsafe { write_volatile(self.address(reg), value) }
    }
}

/// Command opcodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Opcode {
    /// Generate a (repeated) start condition.
    Start = 0,
    /// Generate up to `acpollmax + 1` start sequences until acknowledged.
    AckPoll = 1,
    /// `AckPoll`, then transfer; not continued.
    AckPollTransfer = 2,
    /// `AckPoll`, then transfer; continued.
    AckPollTransferContinued = 3,
    /// Continue the transfer; not continued afterwards.
    Transfer = 4,
    /// Continue the transfer; continued afterwards.
    TransferContinued = 5,
    /// Generate a stop condition.
    Stop = 6,
    /// Nothing to do; the last command finished.
    Idle = 7,
}

impl Opcode {
    /// Decode the 3-bit opcode field.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & CMD::OP.mask {
            0 => Opcode::Start,
            1 => Opcode::AckPoll,
            2 => Opcode::AckPollTransfer,
            3 => Opcode::AckPollTransferContinued,
            4 => Opcode::Transfer,
            5 => Opcode::TransferContinued,
            6 => Opcode::Stop,
            _ => Opcode::Idle,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

/// One value of the command register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub direction: Direction,
    pub opcode: Opcode,
    /// Bytes moved by a transfer opcode, `1..=MAX_CHUNK`; zero otherwise.
    pub size: usize,
    pub ack_poll: u32,
}

impl Command {
    /// Address the target, retrying up to `ack_poll` extra times.
    #[must_use]
    pub fn ack_poll(direction: Direction, ack_poll: u32) -> Self {
        Self {
            direction,
            opcode: Opcode::AckPoll,
            size: 0,
            ack_poll: ack_poll.min(ACK_POLL_MAX),
        }
    }

    /// Move `size` bytes through the master FIFO.
    #[must_use]
    pub fn transfer(direction: Direction, size: usize, continued: bool) -> Self {
        Self {
            direction,
            opcode: if continued {
                Opcode::TransferContinued
            } else {
                Opcode::Transfer
            },
            size: size.clamp(1, MAX_CHUNK),
            ack_poll: 0,
        }
    }

    /// Release the bus.
    #[must_use]
    pub fn stop() -> Self {
        Self {
            direction: Direction::Read,
            opcode: Opcode::Stop,
            size: 0,
            ack_poll: 0,
        }
    }

    #[must_use]
    pub fn is_continued(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::TransferContinued | Opcode::AckPollTransferContinued
        )
    }

    /// Encode for the command register.
    #[must_use]
    pub fn bits(&self) -> u32 {
        let mut cmd = CmdVal::new(0);
        if self.direction == Direction::Read {
            cmd.modify(CMD::NWR::SET);
        }
        let tsize = u32::try_from(self.size.saturating_sub(1)).unwrap_or(CMD::TSIZE.mask);
        cmd.modify(
            CMD::OP.val(self.opcode as u32)
                + CMD::TSIZE.val(tsize.min(CMD::TSIZE.mask))
                + CMD::ACPOLLMAX.val(self.ack_poll.min(ACK_POLL_MAX)),
        );
        cmd.get()
    }

    /// Decode a command register value.
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        let cmd = CmdVal::new(bits);
        let opcode = Opcode::from_bits(cmd.read(CMD::OP));
        let moves_data = matches!(
            opcode,
            Opcode::AckPollTransfer
                | Opcode::AckPollTransferContinued
                | Opcode::Transfer
                | Opcode::TransferContinued
        );
        Self {
            direction: if cmd.is_set(CMD::NWR) {
                Direction::Read
            } else {
                Direction::Write
            },
            opcode,
            size: if moves_data {
                cmd.read(CMD::TSIZE) as usize + 1
            } else {
                0
            },
            ack_poll: cmd.read(CMD::ACPOLLMAX),
        }
    }
}

/// Snapshot of the status register. Never cached across polls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub last_ack: bool,
    pub fifo_level: usize,
    pub fifo_full: bool,
    /// Hardware bus-timeout latch. Informational only: command completion
    /// is judged by the command register and the software deadline.
    pub timeout: bool,
}

impl Status {
    pub fn read<R: RegisterBlock>(regs: &mut R) -> Self {
        Self::from_bits(regs.read(Register::Sr))
    }

    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        let sr = SrVal::new(bits);
        Self {
            last_ack: sr.is_set(SR::LAST_AC),
            fifo_level: sr.read(SR::MFIFO_LEVEL) as usize,
            fifo_full: sr.is_set(SR::MFIFO_FULL),
            timeout: sr.is_set(SR::TIMEOUT),
        }
    }
}

/// Whether the command register reads back `Idle`.
pub fn command_idle<R: RegisterBlock>(regs: &mut R) -> bool {
    let cmd = CmdVal::new(regs.read(Register::Cmd));
    Opcode::from_bits(cmd.read(CMD::OP)) == Opcode::Idle
}
