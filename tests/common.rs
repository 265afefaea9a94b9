#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};
use video_settings::video::{Register, VideoInterface};

pub const ERASE_BLOCK_SIZE: usize = 4096;
pub const WORD_SIZE: usize = 4;
pub const SLOT_SIZE: usize = 256;
pub const SECTOR_SIZE: usize = 256 * SLOT_SIZE;

#[derive(Default)]
pub struct Flash {
    pub buf: Vec<u8>,
    pub fail_after_operation: usize,
    pub operations: Vec<Operation>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Read { offset: u32, len: usize },
    Write { offset: u32, len: usize },
    Erase { offset: u32, len: usize },
}

impl Flash {
    pub fn new(sectors: usize) -> Self {
        Self {
            buf: vec![0xffu8; SECTOR_SIZE * sectors],
            fail_after_operation: usize::MAX,
            ..Default::default()
        }
    }

    pub fn new_with_fault(sectors: usize, fail_after_operation: usize) -> Self {
        Self {
            buf: vec![0xffu8; SECTOR_SIZE * sectors],
            fail_after_operation,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
    }

    pub fn fail_next_operation(&mut self) {
        self.fail_after_operation = self.operations.len();
    }

    pub fn erases(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Erase { .. }))
            .count()
    }

    pub fn written_slots(&self, base: usize) -> Vec<usize> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::Write { offset, .. }
                    if (*offset as usize - base).is_multiple_of(SLOT_SIZE) =>
                {
                    Some((*offset as usize - base) / SLOT_SIZE)
                }
                _ => None,
            })
            .collect()
    }

    pub fn slot(&self, base: usize, slot: usize) -> &[u8] {
        let start = base + slot * SLOT_SIZE;
        &self.buf[start..start + SLOT_SIZE]
    }

    pub fn slot_mut(&mut self, base: usize, slot: usize) -> &mut [u8] {
        let start = base + slot * SLOT_SIZE;
        &mut self.buf[start..start + SLOT_SIZE]
    }

    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }
}

#[derive(Debug)]
pub struct FlashError;

impl NorFlashError for FlashError {
    fn kind(&self) -> NorFlashErrorKind {
        NorFlashErrorKind::Other
    }
}

impl ErrorType for Flash {
    type Error = FlashError;
}

impl ReadNorFlash for Flash {
    const READ_SIZE: usize = WORD_SIZE;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        assert!(offset.is_multiple_of(Self::READ_SIZE as _));
        assert!(bytes.len().is_multiple_of(Self::READ_SIZE));

        if self.operations.len() >= self.fail_after_operation {
            println!("    flash: FAULT");
            return Err(FlashError);
        }
        self.operations.push(Operation::Read {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl NorFlash for Flash {
    const WRITE_SIZE: usize = WORD_SIZE;

    const ERASE_SIZE: usize = ERASE_BLOCK_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        assert!(from.is_multiple_of(Self::ERASE_SIZE as _));
        assert!(to.is_multiple_of(Self::ERASE_SIZE as _));

        println!(
            "    flash: erase: {from:06X} - {to:06X} #{:>2}",
            self.operations.len()
        );

        if self.operations.len() >= self.fail_after_operation {
            println!("    flash: FAULT");
            return Err(FlashError);
        }

        self.operations.push(Operation::Erase {
            offset: from,
            len: (to - from) as usize,
        });

        for addr in from..to {
            self.buf[addr as usize] = 0xff;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        assert!(offset.is_multiple_of(Self::WRITE_SIZE as _));
        assert!(bytes.len().is_multiple_of(Self::WRITE_SIZE as _));
        assert!(bytes.len() > 0);

        if self.operations.len() >= self.fail_after_operation {
            println!("    flash: FAULT");
            return Err(FlashError);
        }

        self.operations.push(Operation::Write {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        for (i, &val) in bytes.iter().enumerate() {
            // NOR flash can only flip bits from 1 to 0
            self.buf[offset + i] &= val;
        }
        Ok(())
    }
}

/// Register file standing in for the memory mapped video interface.
#[derive(Default)]
pub struct Video {
    pub registers: [u32; 7],
    pub writes: Vec<(Register, u32)>,
}

impl Video {
    pub fn with_flags(flags: u32) -> Self {
        let mut video = Self::default();
        video.registers[Register::Flags as usize] = flags;
        video
    }

    pub fn get(&self, register: Register) -> u32 {
        self.registers[register as usize]
    }

    pub fn set(&mut self, register: Register, value: u32) {
        self.registers[register as usize] = value;
    }
}

impl VideoInterface for Video {
    fn read(&mut self, register: Register) -> u32 {
        self.registers[register as usize]
    }

    fn write(&mut self, register: Register, value: u32) {
        self.writes.push((register, value));
        self.registers[register as usize] = value;
    }
}
