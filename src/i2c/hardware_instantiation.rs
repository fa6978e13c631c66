// Licensed under the Apache-2.0 license

//! # I2C Hardware Instantiation for hsoc v2
//!
//! The controller provides nine master instances. They share one register
//! layout, so unlike a PAC with one type per peripheral every initialized
//! instance has the same Rust type and instances can be kept in an array:
//!
//! ```rust,ignore
//! let mut buses: [Option<HsocI2c<MmioInstances, DelayTimer<_>>>; 2] = [None, None];
//! buses[0] = Some(configurator.initialize(&rapi2c0, config, timer_a, NoOpLogger)?);
//! buses[1] = Some(configurator.initialize(&i2c1, config, timer_b, NoOpLogger)?);
//! ```
//!
//! ## Instance table
//!
//! | Raw id | Core              | Pin mux                        |
//! |--------|-------------------|--------------------------------|
//! | 0..=5  | `RAPI2C0..RAPI2C5`| fixed function, none           |
//! | 6..=8  | `I2C0..I2C2`      | general purpose, SCL + SDA     |
//!
//! Fixed-function instances only receive port control; general-purpose
//! instances additionally have SCL and SDA routed through the MMIO matrix.
//!
//! ## Bring-up order
//!
//! 1. Validate the raw identifier (no side effects on failure)
//! 2. Claim the register block
//! 3. Port control for the two configured pins
//! 4. Pin-function routing, general-purpose instances only
//! 5. Register initialization, see [`I2cSystemSetup::bring_up`]

use crate::common::Logger;
use crate::i2c::common::{Error, I2cConfig, I2cSetup};
use crate::i2c::hsoc_v2::HsocV2;
use crate::i2c::i2c_controller::I2cController;
use crate::i2c::registers::{MmioRegisters, RegisterBlock};
use crate::i2c::system_setup::I2cSystemSetup;
use crate::pinctrl::{PinFunction, PortControl};
use crate::timer::Timer;

/// Logical controller instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum CoreId {
    Rapi2c0 = 0,
    Rapi2c1 = 1,
    Rapi2c2 = 2,
    Rapi2c3 = 3,
    Rapi2c4 = 4,
    Rapi2c5 = 5,
    I2c0 = 6,
    I2c1 = 7,
    I2c2 = 8,
}

impl CoreId {
    pub const COUNT: usize = 9;

    pub const ALL: [CoreId; Self::COUNT] = [
        CoreId::Rapi2c0,
        CoreId::Rapi2c1,
        CoreId::Rapi2c2,
        CoreId::Rapi2c3,
        CoreId::Rapi2c4,
        CoreId::Rapi2c5,
        CoreId::I2c0,
        CoreId::I2c1,
        CoreId::I2c2,
    ];

    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(CoreId::Rapi2c0),
            1 => Some(CoreId::Rapi2c1),
            2 => Some(CoreId::Rapi2c2),
            3 => Some(CoreId::Rapi2c3),
            4 => Some(CoreId::Rapi2c4),
            5 => Some(CoreId::Rapi2c5),
            6 => Some(CoreId::I2c0),
            7 => Some(CoreId::I2c1),
            8 => Some(CoreId::I2c2),
            _ => None,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Slot of a general-purpose instance in the MMIO function table.
    #[must_use]
    pub const fn mux_slot(self) -> Option<usize> {
        match self {
            CoreId::I2c0 => Some(0),
            CoreId::I2c1 => Some(1),
            CoreId::I2c2 => Some(2),
            _ => None,
        }
    }
}

impl TryFrom<u32> for CoreId {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self, Error> {
        CoreId::from_raw(raw).ok_or(Error::UnknownCore)
    }
}

/// MMIO function codes `[SCL, SDA]` of the general-purpose instances.
///
/// The numbering belongs to the chip's MMIO matrix and is supplied by the
/// board support code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MmioFunctionTable {
    codes: [[u8; 2]; 3],
}

impl MmioFunctionTable {
    #[must_use]
    pub const fn new(i2c0: [u8; 2], i2c1: [u8; 2], i2c2: [u8; 2]) -> Self {
        Self {
            codes: [i2c0, i2c1, i2c2],
        }
    }

    /// `None` for fixed-function instances.
    #[must_use]
    pub fn functions(&self, core: CoreId) -> Option<[u8; 2]> {
        self.codes.get(core.mux_slot()?).copied()
    }
}

/// Source of per-instance register blocks.
pub trait RegisterProvider {
    type Registers: RegisterBlock;

    /// Hand out the register block of `core`, or `None` if the board does
    /// not provide it or it was already claimed.
    fn claim(&mut self, core: CoreId) -> Option<Self::Registers>;
}

/// Memory-mapped instances at board-specific base addresses.
pub struct MmioInstances {
    bases: [usize; CoreId::COUNT],
    claimed: u16,
}

impl MmioInstances {
    /// `bases` is indexed by [`CoreId::index`]; a zero base marks an
    /// instance the board does not have.
    ///
    /// # Safety
    ///
    /// Every non-zero base must be the address of an hsoc v2 I2C register
    /// block that stays mapped for the lifetime of the claimed blocks and is
    /// accessed through this value only.
    #[must_use]
    pub const unsafe fn new(bases: [usize; CoreId::COUNT]) -> Self {
        Self { bases, claimed: 0 }
    }
}

impl RegisterProvider for MmioInstances {
    type Registers = MmioRegisters;

    fn claim(&mut self, core: CoreId) -> Option<MmioRegisters> {
        let bit = 1u16 << core.index();
        if self.claimed & bit != 0 {
            return None;
        }
        let base = *self.bases.get(core.index())?;
        // SAFETY: validity of non-zero bases is a precondition of `new`, and
        // each block is handed out at most once.
        let regs = unsafe { MmioRegisters::new(base) }?;
        self.claimed |= bit;
        Some(regs)
    }
}

/// Initialized hsoc v2 handle for instances claimed from `P`.
pub type HsocI2c<P, T, L> = I2cController<HsocV2<<P as RegisterProvider>::Registers, T, L>>;

/// Brings up controller instances with the board's collaborators.
pub struct InstanceConfigurator<P, PC, PF> {
    provider: P,
    port_control: PC,
    pin_function: PF,
    functions: MmioFunctionTable,
}

impl<P, PC, PF> InstanceConfigurator<P, PC, PF>
where
    P: RegisterProvider,
    PC: PortControl,
    PF: PinFunction,
{
    #[must_use]
    pub fn new(
        provider: P,
        port_control: PC,
        pin_function: PF,
        functions: MmioFunctionTable,
    ) -> Self {
        Self {
            provider,
            port_control,
            pin_function,
            functions,
        }
    }

    /// Configure pins and registers of `setup.core` and return its handle.
    ///
    /// The returned instance runs at `config.speed` with all interrupts and
    /// DMA disabled.
    ///
    /// # Errors
    ///
    /// `UnknownCore` if `setup.core` names no instance or its register block
    /// is unavailable. Nothing is touched in either case.
    pub fn initialize<T: Timer, L: Logger>(
        &mut self,
        setup: &I2cSetup,
        config: I2cConfig,
        timer: T,
        mut logger: L,
    ) -> Result<HsocI2c<P, T, L>, Error> {
        let Some(core) = CoreId::from_raw(setup.core) else {
            logger.error("unknown I2C core");
            return Err(Error::UnknownCore);
        };
        let Some(mut regs) = self.provider.claim(core) else {
            logger.error("I2C core not available");
            return Err(Error::UnknownCore);
        };

        self.port_control.apply(&setup.pins, &setup.port_control);
        if let Some(functions) = self.functions.functions(core) {
            self.pin_function.apply(&setup.pins, &functions);
        }

        I2cSystemSetup::bring_up(&mut regs, config.speed);
        logger.debug("core initialized");

        Ok(I2cController::new(
            HsocV2::new(regs, timer, logger, &config),
            config,
        ))
    }

    pub fn release(self) -> (P, PC, PF) {
        (self.provider, self.port_control, self.pin_function)
    }
}
