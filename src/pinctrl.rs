// Licensed under the Apache-2.0 license

//! Pin configuration collaborators used while bringing up an I2C instance.
//!
//! Two independent units are involved: port control sets the electrical
//! characteristics of a pad (drive strength, pulls), the MMIO matrix binds a
//! pad to a peripheral function. Fixed-function controllers only need the
//! former.

use core::ptr::{read_volatile, write_volatile, NonNull};

/// Pin index meaning "not routed"; pin-function writes for it are skipped.
pub const PIN_UNUSED: u8 = 0xff;

/// Electrical pad configuration.
pub trait PortControl {
    /// Apply `values[n]` to `pins[n]`. Extra entries in the longer slice are
    /// ignored.
    fn apply(&mut self, pins: &[u8], values: &[u16]);
}

/// Pad to peripheral-function routing.
pub trait PinFunction {
    /// Route `pins[n]` to `functions[n]`, skipping `PIN_UNUSED` entries.
    fn apply(&mut self, pins: &[u8], functions: &[u8]);
}

/// Port control for boards whose pads are configured elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPortControl;

impl PortControl for NoPortControl {
    fn apply(&mut self, _pins: &[u8], _values: &[u16]) {}
}

/// MMIO matrix routing through memory-mapped configuration words.
///
/// Every configuration write must be preceded by a read-modify-write of the
/// ASIC control access key; the unit silently drops unlocked writes.
pub struct MmioPinMux {
    access_key: NonNull<u32>,
    mmio_cfg: NonNull<u32>,
}

impl MmioPinMux {
    /// Returns `None` if either address is null.
    ///
    /// # Safety
    ///
    /// `access_key` must be the address of the access-key register and
    /// `mmio_cfg` the address of the first MMIO configuration word, with one
    /// word per pin index the caller will route. Both must stay valid for
    /// the lifetime of the returned value.
    #[must_use]
    pub unsafe fn new(access_key: usize, mmio_cfg: usize) -> Option<Self> {
        Some(Self {
            access_key: NonNull::new(access_key as *mut u32)?,
            mmio_cfg: NonNull::new(mmio_cfg as *mut u32)?,
        })
    }

    fn unlock(&mut self) {
        // SAFETY: address validity is a precondition of `new`.
        unsafe {
            let key = read_volatile(self.access_key.as_ptr());
            write_volatile(self.access_key.as_ptr(), key);
        }
    }
}

impl PinFunction for MmioPinMux {
    fn apply(&mut self, pins: &[u8], functions: &[u8]) {
        for (&pin, &function) in pins.iter().zip(functions) {
            if pin == PIN_UNUSED {
                continue;
            }
            self.unlock();
            // SAFETY: `pin` indexes the configuration array promised by `new`.
            unsafe {
                write_volatile(
                    self.mmio_cfg.as_ptr().add(usize::from(pin)),
                    u32::from(function),
                );
            }
        }
    }
}
