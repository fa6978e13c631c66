// Licensed under the Apache-2.0 license

//! hsoc v2 I2C master driver.
//!
//! This module provides the register interface, the command/FIFO engine and
//! the instance bring-up for the hsoc v2 I2C controller, for bare-metal and
//! `no_std` environments. Initialized instances implement
//! `embedded_hal::i2c::I2c`.

pub mod common;
pub mod hardware_instantiation;
pub mod hsoc_v2;
pub mod i2c_controller;
pub mod registers;
pub mod system_setup;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use common::{Condition, Error, I2cConfig, I2cConfigBuilder, I2cSetup, I2cSetupBuilder, I2cSpeed};
pub use hardware_instantiation::{
    CoreId, HsocI2c, InstanceConfigurator, MmioFunctionTable, MmioInstances, RegisterProvider,
};
pub use hsoc_v2::HsocV2;
pub use i2c_controller::I2cController;
pub use traits::I2cCore;
