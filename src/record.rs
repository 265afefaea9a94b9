//! Fixed layout of a stored settings record.
//!
//! ```text
//! offset  size  field
//!      0     1  checksum, 8-bit sum of all following bytes of the record
//!      1     1  version
//!      2     1  flags (bit 0: resolution box, bit 1: audio muted)
//!      3     1  volume
//!      4    24  video settings, one word per video mode
//!     28     4  OSD background
//!     32     4  mode switch delay
//!     36    24  IR codes
//!     60     1  brightness (version 5)
//!     61     1  contrast (version 5)
//!     62     1  saturation (version 5)
//! ```
//!
//! Words are stored big-endian. The size covered by the checksum depends on the version only.

use crate::error::Error;
use crate::image::PictureControls;
use crate::mode::VIDEO_MODE_COUNT;
use crate::settings::{IR_CODE_COUNT, Settings};

pub const RECORD_SIZE_V4: usize = 60;
pub const RECORD_SIZE_V5: usize = 63;
pub const MAX_RECORD_SIZE: usize = RECORD_SIZE_V5;

pub const FLAG_RESBOX: u8 = 1 << 0;
pub const FLAG_MUTE: u8 = 1 << 1;

/// Value of every byte of freshly erased flash
pub(crate) const ERASED: u8 = 0xFF;

const CHECKSUM_OFFSET: usize = 0;
const VERSION_OFFSET: usize = 1;
const FLAGS_OFFSET: usize = 2;
const VOLUME_OFFSET: usize = 3;
const VIDEO_SETTINGS_OFFSET: usize = 4;
const OSD_BACKGROUND_OFFSET: usize = VIDEO_SETTINGS_OFFSET + 4 * VIDEO_MODE_COUNT;
const MODE_SWITCH_DELAY_OFFSET: usize = OSD_BACKGROUND_OFFSET + 4;
const IR_CODES_OFFSET: usize = MODE_SWITCH_DELAY_OFFSET + 4;
const BRIGHTNESS_OFFSET: usize = IR_CODES_OFFSET + 4 * IR_CODE_COUNT;
const CONTRAST_OFFSET: usize = BRIGHTNESS_OFFSET + 1;
const SATURATION_OFFSET: usize = CONTRAST_OFFSET + 1;

const _: () = assert!(
    BRIGHTNESS_OFFSET == RECORD_SIZE_V4,
    "version 4 records end before the picture controls"
);
const _: () = assert!(SATURATION_OFFSET + 1 == RECORD_SIZE_V5);

/// Raw record as written to a slot. Bytes past the record size of its version stay erased.
pub type RecordBuffer = [u8; MAX_RECORD_SIZE];

#[derive(strum::FromRepr, strum::Display, Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RecordVersion {
    V4 = 4,
    V5 = 5,
}

impl RecordVersion {
    pub const CURRENT: RecordVersion = RecordVersion::V5;

    pub const fn size(self) -> usize {
        match self {
            RecordVersion::V4 => RECORD_SIZE_V4,
            RecordVersion::V5 => RECORD_SIZE_V5,
        }
    }
}

/// Fields shared by all record versions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredSettings {
    pub resbox_enabled: bool,
    pub audio_mute: bool,
    pub volume: u8,
    pub video_settings: [u32; VIDEO_MODE_COUNT],
    pub osd_background: u32,
    pub mode_switch_delay: u32,
    pub ir_codes: [u32; IR_CODE_COUNT],
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsRecord {
    /// Written by firmware without picture controls
    V4(StoredSettings),
    V5(StoredSettings, PictureControls),
}

impl SettingsRecord {
    pub fn version(&self) -> RecordVersion {
        match self {
            SettingsRecord::V4(_) => RecordVersion::V4,
            SettingsRecord::V5(..) => RecordVersion::V5,
        }
    }

    pub fn stored(&self) -> &StoredSettings {
        match self {
            SettingsRecord::V4(stored) | SettingsRecord::V5(stored, _) => stored,
        }
    }

    pub fn picture_controls(&self) -> Option<PictureControls> {
        match self {
            SettingsRecord::V4(_) => None,
            SettingsRecord::V5(_, picture) => Some(*picture),
        }
    }

    /// Copies the record into `settings`. Picture controls are left alone for version 4 records.
    pub fn apply_to(&self, settings: &mut Settings) {
        let stored = self.stored();
        settings.video_settings = stored.video_settings;
        settings.osd_background = stored.osd_background;
        settings.mode_switch_delay = stored.mode_switch_delay;
        settings.resbox_enabled = stored.resbox_enabled;
        settings.audio_volume = stored.volume;
        settings.audio_mute = stored.audio_mute;
        settings.ir_codes = stored.ir_codes;

        if let Some(picture) = self.picture_controls() {
            settings.picture = picture;
        }
    }

    pub fn encode(&self) -> RecordBuffer {
        let mut buf = [ERASED; MAX_RECORD_SIZE];
        let version = self.version();
        let stored = self.stored();

        let mut flags = 0;
        if stored.resbox_enabled {
            flags |= FLAG_RESBOX;
        }
        if stored.audio_mute {
            flags |= FLAG_MUTE;
        }

        buf[VERSION_OFFSET] = version as u8;
        buf[FLAGS_OFFSET] = flags;
        buf[VOLUME_OFFSET] = stored.volume;
        write_words(&mut buf, VIDEO_SETTINGS_OFFSET, &stored.video_settings);
        write_words(&mut buf, OSD_BACKGROUND_OFFSET, &[stored.osd_background]);
        write_words(&mut buf, MODE_SWITCH_DELAY_OFFSET, &[stored.mode_switch_delay]);
        write_words(&mut buf, IR_CODES_OFFSET, &stored.ir_codes);

        if let Some(picture) = self.picture_controls() {
            buf[BRIGHTNESS_OFFSET] = picture.brightness.cast_unsigned();
            buf[CONTRAST_OFFSET] = picture.contrast.cast_unsigned();
            buf[SATURATION_OFFSET] = picture.saturation.cast_unsigned();
        }

        buf[CHECKSUM_OFFSET] = checksum(&buf[..version.size()]);
        buf
    }
}

impl From<&Settings> for SettingsRecord {
    fn from(settings: &Settings) -> Self {
        SettingsRecord::V5(
            StoredSettings {
                resbox_enabled: settings.resbox_enabled,
                audio_mute: settings.audio_mute,
                volume: settings.audio_volume,
                video_settings: settings.video_settings,
                osd_background: settings.osd_background,
                mode_switch_delay: settings.mode_switch_delay,
                ir_codes: settings.ir_codes,
            },
            settings.picture,
        )
    }
}

/// Serializes `settings` as a record of the current version.
pub fn encode(settings: &Settings) -> RecordBuffer {
    SettingsRecord::from(settings).encode()
}

/// Parses and validates a raw record. Nothing is recovered from a record with a bad checksum.
///
/// The 8-bit sum does not catch every single bit error: clearing bit 0 of a version 5 record
/// turns it into a version 4 record, which still validates if the three picture control bytes
/// sum to 255.
pub fn decode(bytes: &RecordBuffer) -> Result<SettingsRecord, Error> {
    let version = RecordVersion::from_repr(bytes[VERSION_OFFSET])
        .ok_or(Error::UnsupportedVersion(bytes[VERSION_OFFSET]))?;

    let stored = bytes[CHECKSUM_OFFSET];
    let computed = checksum(&bytes[..version.size()]);
    if stored != computed {
        return Err(Error::ChecksumMismatch { stored, computed });
    }

    let flags = bytes[FLAGS_OFFSET];
    let stored = StoredSettings {
        resbox_enabled: flags & FLAG_RESBOX != 0,
        audio_mute: flags & FLAG_MUTE != 0,
        volume: bytes[VOLUME_OFFSET],
        video_settings: read_words(bytes, VIDEO_SETTINGS_OFFSET),
        osd_background: read_word(bytes, OSD_BACKGROUND_OFFSET),
        mode_switch_delay: read_word(bytes, MODE_SWITCH_DELAY_OFFSET),
        ir_codes: read_words(bytes, IR_CODES_OFFSET),
    };

    Ok(match version {
        RecordVersion::V4 => SettingsRecord::V4(stored),
        RecordVersion::V5 => SettingsRecord::V5(
            stored,
            PictureControls {
                brightness: bytes[BRIGHTNESS_OFFSET].cast_signed(),
                contrast: bytes[CONTRAST_OFFSET].cast_signed(),
                saturation: bytes[SATURATION_OFFSET].cast_signed(),
            },
        ),
    })
}

/// A slot is empty if both version and checksum still hold the erased value.
pub fn is_erased(bytes: &RecordBuffer) -> bool {
    bytes[VERSION_OFFSET] == ERASED && bytes[CHECKSUM_OFFSET] == ERASED
}

/// Wrapping sum over `record`, skipping the checksum byte itself.
pub fn checksum(record: &[u8]) -> u8 {
    record
        .iter()
        .skip(CHECKSUM_OFFSET + 1)
        .fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

fn write_words(buf: &mut RecordBuffer, offset: usize, words: &[u32]) {
    for (chunk, word) in buf[offset..offset + 4 * words.len()]
        .chunks_exact_mut(4)
        .zip(words)
    {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
}

fn read_word(buf: &RecordBuffer, offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn read_words<const N: usize>(buf: &RecordBuffer, offset: usize) -> [u32; N] {
    core::array::from_fn(|i| read_word(buf, offset + 4 * i))
}
