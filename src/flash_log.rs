//! Wear leveling over a single 64k flash sector.
//!
//! The sector is split into 256 slots of 256 bytes. Records are written at strictly decreasing
//! slot indices, starting at slot 255 after an erase. The sector is only erased again once
//! slot 0 has been used, so every erase cycle absorbs 256 saves. Because of the write order the
//! newest record is always the one with the lowest index.

use crate::error::Error;
use crate::platform::{AlignedOps, Platform};
use crate::record::{self, MAX_RECORD_SIZE, RecordBuffer, SettingsRecord};
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

pub const SLOT_SIZE: usize = 256;
pub const SLOT_COUNT: usize = 256;
pub const SECTOR_SIZE: usize = SLOT_SIZE * SLOT_COUNT;

const _: () = assert!(MAX_RECORD_SIZE <= SLOT_SIZE);

/// Contents of a single slot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// Never written since the last erase
    Empty,
    Valid(SettingsRecord),
    /// Written, but the record is unusable. Holds the reason reported by the record decoder.
    Dirty(Error),
}

/// Outcome of [`FlashLog::scan`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// Lowest slot that is not empty, `SLOT_COUNT` if the whole sector is erased
    pub cursor: u16,
    /// Newest record, `None` if the scan stopped on a dirty slot or found no record at all
    pub record: Option<SettingsRecord>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlotStatistics {
    pub empty: u16,
    pub valid: u16,
    pub dirty: u16,
}

pub struct FlashLog {
    pub(crate) base_address: u32,
    // index of the slot written last, records go to `cursor - 1` next
    pub(crate) cursor: u16,
}

impl FlashLog {
    /// Checks that the sector at `sector_offset` can be handled by `hal`. The cursor starts at
    /// slot 0 so that saving without a prior scan erases the sector first.
    pub fn new<T: Platform>(sector_offset: usize, hal: &T) -> Result<Self, Error> {
        if T::ERASE_SIZE == 0 || !SECTOR_SIZE.is_multiple_of(T::ERASE_SIZE) {
            return Err(Error::UnsupportedEraseSize);
        }

        if !sector_offset.is_multiple_of(T::ERASE_SIZE) {
            return Err(Error::InvalidSectorOffset);
        }

        if T::READ_SIZE == 0
            || T::WRITE_SIZE == 0
            || T::READ_SIZE > SLOT_SIZE
            || T::WRITE_SIZE > SLOT_SIZE
            || !SLOT_SIZE.is_multiple_of(T::READ_SIZE)
            || !SLOT_SIZE.is_multiple_of(T::WRITE_SIZE)
        {
            return Err(Error::UnsupportedAccessSize);
        }

        let end = sector_offset
            .checked_add(SECTOR_SIZE)
            .ok_or(Error::SectorOutOfBounds)?;
        if end > hal.capacity() || end > u32::MAX as usize {
            return Err(Error::SectorOutOfBounds);
        }

        Ok(Self {
            base_address: sector_offset as u32,
            cursor: 0,
        })
    }

    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn slot_address(&self, slot: u16) -> u32 {
        self.base_address + (slot as u32) * SLOT_SIZE as u32
    }

    pub fn read_slot<T: Platform>(&self, hal: &mut T, slot: u16) -> Result<SlotState, Error> {
        let address = self.slot_address(slot);

        #[cfg(feature = "defmt")]
        trace!("read_slot: {} @{:#08x}", slot, address);

        let mut buf = [record::ERASED; SLOT_SIZE];
        let len = T::align_read(MAX_RECORD_SIZE);
        hal.read(address, &mut buf[..len])
            .map_err(|_| Error::FlashError)?;

        let mut raw: RecordBuffer = [record::ERASED; MAX_RECORD_SIZE];
        raw.copy_from_slice(&buf[..MAX_RECORD_SIZE]);

        Ok(match record::decode(&raw) {
            Ok(record) => SlotState::Valid(record),
            Err(_) if record::is_erased(&raw) => SlotState::Empty,
            Err(reason) => SlotState::Dirty(reason),
        })
    }

    /// Searches for the newest record, starting at slot 0. Stops at the first slot that is not
    /// empty: a valid record there is the newest one, a dirty slot ends the search without a
    /// record since nothing below it can be written anymore.
    pub fn scan<T: Platform>(&mut self, hal: &mut T) -> Result<Scan, Error> {
        let mut result = Scan {
            cursor: SLOT_COUNT as u16,
            record: None,
        };

        for slot in 0..SLOT_COUNT as u16 {
            match self.read_slot(hal, slot)? {
                SlotState::Empty => continue,
                SlotState::Valid(record) => {
                    #[cfg(feature = "debug-logs")]
                    println!("  FlashLog: found {} record in slot {slot}", record.version());

                    result = Scan {
                        cursor: slot,
                        record: Some(record),
                    };
                }
                SlotState::Dirty(_reason) => {
                    #[cfg(feature = "defmt")]
                    warn!("scan: slot {} is dirty: {}", slot, _reason);

                    #[cfg(feature = "debug-logs")]
                    println!("  FlashLog: slot {slot} is dirty: {_reason}");

                    result.cursor = slot;
                }
            }
            break;
        }

        self.cursor = result.cursor;
        Ok(result)
    }

    /// Writes `bytes` to the next free slot, erasing the sector first if the previous write
    /// used slot 0. Returns the slot index written.
    pub fn allocate_and_write<T: Platform>(
        &mut self,
        hal: &mut T,
        bytes: &RecordBuffer,
    ) -> Result<u16, Error> {
        if self.cursor == 0 {
            #[cfg(feature = "defmt")]
            trace!("erase: @{:#08x}", self.base_address);

            #[cfg(feature = "debug-logs")]
            println!("  FlashLog: erase sector {:#08x}", self.base_address);

            hal.erase(self.base_address, self.base_address + SECTOR_SIZE as u32)
                .map_err(|_| Error::FlashError)?;
            self.cursor = SLOT_COUNT as u16;
        }

        self.cursor -= 1;

        #[cfg(feature = "debug-logs")]
        println!("  FlashLog: write slot {}", self.cursor);

        write_aligned(hal, self.slot_address(self.cursor), bytes).map_err(|_| Error::FlashError)?;

        Ok(self.cursor)
    }

    /// Classifies every slot of the sector. Read only, the cursor is not touched.
    pub fn statistics<T: Platform>(&self, hal: &mut T) -> Result<SlotStatistics, Error> {
        let mut stats = SlotStatistics::default();
        for slot in 0..SLOT_COUNT as u16 {
            match self.read_slot(hal, slot)? {
                SlotState::Empty => stats.empty += 1,
                SlotState::Valid(_) => stats.valid += 1,
                SlotState::Dirty(_) => stats.dirty += 1,
            }
        }
        Ok(stats)
    }
}

#[inline(always)]
pub(crate) fn write_aligned<T: Platform>(
    hal: &mut T,
    offset: u32,
    bytes: &[u8],
) -> Result<(), T::Error> {
    #[cfg(feature = "defmt")]
    trace!("write_aligned @{:#08x}: [{}]", offset, bytes.len());

    if bytes.len().is_multiple_of(T::WRITE_SIZE) {
        hal.write(offset, bytes)
    } else {
        let pivot = T::align_write_floor(bytes.len());
        let header = &bytes[..pivot];
        let trailer = &bytes[pivot..];
        if !header.is_empty() {
            hal.write(offset, header)?;
        }

        // an all ones trailer matches the erased flash already
        if trailer.iter().any(|&e| e != record::ERASED) {
            let mut buf = [record::ERASED; SLOT_SIZE];
            buf[..trailer.len()].copy_from_slice(trailer);
            hal.write(offset + (pivot as u32), &buf[..T::WRITE_SIZE])?
        }

        Ok(())
    }
}
