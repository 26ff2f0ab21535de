//! Interrupt-safe register file access
//!
//! The register file is read and written from mainline code, from the
//! protocol engine and from the timer interrupt. Every access through this
//! handle runs inside a critical section, so 16-bit values are never torn.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

use crate::error::RingResult;
use crate::registers::{ControlRegister, Register, RegisterFile};

/// Borrowed handle to a node's register file
#[derive(Clone, Copy)]
pub struct RegisterAccess<'a> {
    file: &'a Mutex<Cell<RegisterFile>>,
}

impl<'a> RegisterAccess<'a> {
    /// Wraps a shared register file
    pub const fn new(file: &'a Mutex<Cell<RegisterFile>>) -> Self {
        Self { file }
    }

    /// Copies the whole register file
    pub fn snapshot(&self) -> RegisterFile {
        critical_section::with(|cs| self.file.borrow(cs).get())
    }

    /// [`snapshot`](Self::snapshot) for callers already holding a critical section
    pub fn snapshot_in(&self, cs: CriticalSection<'_>) -> RegisterFile {
        self.file.borrow(cs).get()
    }

    /// Reads one register
    pub fn read(&self, register: Register) -> u16 {
        critical_section::with(|cs| self.file.borrow(cs).get().get(register))
    }

    /// Reads one register as a signed value
    pub fn read_signed(&self, register: Register) -> i16 {
        critical_section::with(|cs| self.file.borrow(cs).get().get_signed(register))
    }

    /// Reads a register by index
    pub fn read_index(&self, index: usize) -> RingResult<u16> {
        Ok(self.read(Register::new(index)?))
    }

    /// Writes one register
    pub fn write(&self, register: Register, value: u16) {
        self.modify(|file| file.set(register, value));
    }

    /// Writes one register as a signed value
    pub fn write_signed(&self, register: Register, value: i16) {
        self.modify(|file| file.set_signed(register, value));
    }

    /// Writes a register by index
    pub fn write_index(&self, index: usize, value: u16) -> RingResult<()> {
        self.write(Register::new(index)?, value);
        Ok(())
    }

    /// Decodes register 0
    pub fn control(&self) -> ControlRegister {
        self.snapshot().control()
    }

    /// Read-modify-writes register 0 atomically
    pub fn update_control<F>(&self, f: F)
    where
        F: FnOnce(&mut ControlRegister),
    {
        self.modify(|file| file.update_control(f));
    }

    /// Runs a read-modify-write on the whole file inside one critical section
    pub fn modify<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RegisterFile) -> R,
    {
        critical_section::with(|cs| self.modify_in(cs, f))
    }

    /// Same as [`modify`](Self::modify) for callers already holding a critical section
    pub fn modify_in<F, R>(&self, cs: CriticalSection<'_>, f: F) -> R
    where
        F: FnOnce(&mut RegisterFile) -> R,
    {
        let cell = self.file.borrow(cs);
        let mut file = cell.get();
        let result = f(&mut file);
        cell.set(file);
        result
    }
}
