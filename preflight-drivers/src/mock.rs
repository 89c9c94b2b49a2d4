//! Scripted bus and pin doubles for driver tests

use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};

/// I2C device modelled as a flat register file with auto-increment
pub struct RegisterI2c {
    pub address: u8,
    pub regs: [u8; 256],
    /// Every register write, in order
    pub writes: Vec<(u8, u8)>,
    /// Registers whose writes are recorded but not applied (status flags)
    frozen: Vec<u8>,
    /// Fail every transaction after this many have succeeded
    fail_after: Option<usize>,
    transactions: usize,
    pointer: u8,
}

impl RegisterI2c {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: [0; 256],
            writes: Vec::new(),
            frozen: Vec::new(),
            fail_after: None,
            transactions: 0,
            pointer: 0,
        }
    }

    pub fn load(&mut self, reg: u8, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.regs[reg as usize + i] = *b;
        }
    }

    pub fn freeze(&mut self, reg: u8) {
        self.frozen.push(reg);
    }

    pub fn fail_after(&mut self, transactions: usize) {
        self.fail_after = Some(transactions);
    }

    /// Last value written to a register
    pub fn last_write(&self, reg: u8) -> Option<u8> {
        self.writes.iter().rev().find(|(r, _)| *r == reg).map(|(_, v)| *v)
    }
}

impl i2c::ErrorType for RegisterI2c {
    type Error = ErrorKind;
}

impl i2c::I2c for RegisterI2c {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if self.fail_after.is_some_and(|n| self.transactions >= n) {
            return Err(ErrorKind::Bus);
        }
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        self.transactions += 1;

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((&reg, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = reg;
                    for &b in data {
                        self.writes.push((self.pointer, b));
                        if !self.frozen.contains(&self.pointer) {
                            self.regs[self.pointer as usize] = b;
                        }
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.regs[self.pointer as usize];
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that only counts
#[derive(Default)]
pub struct NoopDelay {
    pub total_ns: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Output pin remembering its level
#[derive(Default)]
pub struct MockPin {
    pub high: bool,
    pub writes: usize,
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}
