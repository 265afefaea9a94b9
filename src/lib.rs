#![doc = include_str!("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod error;
pub mod flash_log;
pub mod image;
pub mod mode;
pub mod platform;
pub mod record;
pub mod settings;
pub mod video;

pub use flash_log::{FlashLog, Scan, SlotState, SlotStatistics};
pub use image::PictureControls;
pub use mode::{Resolution, VideoMode};
pub use record::{RecordVersion, SettingsRecord};
pub use settings::Settings;

use crate::error::Error;
use crate::image::DEFAULT_IMAGE_CONTROLS;
use crate::platform::Platform;
use crate::settings::IR_CODE_COUNT;
use crate::video::{Register, VideoInterface};

/// Owns the in-memory settings together with the flash sector they are persisted to and the
/// video interface they are applied to.
///
/// Not reentrant: `load` and `save` must not run concurrently, e.g. from an interrupt handler.
pub struct SettingsStore<T: Platform, V: VideoInterface> {
    pub(crate) hal: T,
    pub(crate) video: V,
    pub(crate) log: FlashLog,
    pub(crate) settings: Settings,
    pub(crate) current_mode: VideoMode,
    pub(crate) faulted: bool,
}

impl<T: Platform, V: VideoInterface> SettingsStore<T, V> {
    /// Validates the sector location against the flash geometry. Neither flash nor registers
    /// are accessed, call [`Self::init_defaults`] and [`Self::load`] afterwards.
    pub fn new(sector_offset: usize, hal: T, video: V) -> Result<Self, Error> {
        let log = FlashLog::new(sector_offset, &hal)?;

        Ok(Self {
            hal,
            video,
            log,
            settings: Settings::default(),
            current_mode: VideoMode::Mode480i,
            faulted: false,
        })
    }

    /// Resets all settings to the built-in defaults and pushes them to the video interface.
    pub fn init_defaults(&mut self) {
        self.settings = Settings::default();
        self.current_mode = mode::detect_from_flags(self.video.read(Register::Flags));

        self.video.write(
            Register::Settings,
            self.settings.settings_word(self.current_mode),
        );
        self.video
            .write(Register::OsdBackground, self.settings.osd_background);
        self.video.write(Register::AudioVolume, u8::MAX as u32);
        self.video
            .write(Register::ImageControls, DEFAULT_IMAGE_CONTROLS);
    }

    /// Replaces the in-memory settings with the newest valid record from flash.
    ///
    /// Returns the version of the record that was applied, `None` if the sector holds no usable
    /// record in which case the current settings are kept as is. Only the image controls
    /// register is updated, and only for records carrying picture controls.
    pub fn load(&mut self) -> Result<Option<RecordVersion>, Error> {
        if self.faulted {
            return Err(Error::FlashError);
        }

        let scan = match self.log.scan(&mut self.hal) {
            Ok(scan) => scan,
            Err(e) => return Err(self.fault(e)),
        };

        let Some(record) = scan.record else {
            return Ok(None);
        };

        record.apply_to(&mut self.settings);
        if let Some(picture) = record.picture_controls() {
            self.video.write(Register::ImageControls, picture.encode());
        }

        Ok(Some(record.version()))
    }

    /// Appends the current settings to the flash sector. Returns the slot written.
    pub fn save(&mut self) -> Result<u16, Error> {
        if self.faulted {
            return Err(Error::FlashError);
        }

        let bytes = record::encode(&self.settings);
        match self.log.allocate_and_write(&mut self.hal, &bytes) {
            Ok(slot) => Ok(slot),
            Err(e) => Err(self.fault(e)),
        }
    }

    fn fault(&mut self, error: Error) -> Error {
        if error == Error::FlashError {
            self.faulted = true;
        }
        error
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Slot of the newest record, `SLOT_COUNT` after scanning an empty sector
    pub fn cursor(&self) -> u16 {
        self.log.cursor()
    }

    pub fn current_mode(&self) -> VideoMode {
        self.current_mode
    }

    /// Re-detects the input mode and applies its settings word.
    pub fn update_video_mode(&mut self) -> VideoMode {
        self.current_mode = mode::detect_from_flags(self.video.read(Register::Flags));
        self.write_settings_register();
        self.current_mode
    }

    /// Sets or clears `flag` for all video modes at once.
    pub fn set_all_modes(&mut self, flag: u32, enabled: bool) {
        if enabled {
            self.settings.video_settings_global |= flag;
        } else {
            self.settings.video_settings_global &= !flag;
        }
        self.write_settings_register();
    }

    /// Stores the settings word of `mode`, the register is rewritten if `mode` is active.
    pub fn set_video_settings(&mut self, mode: VideoMode, value: u32) {
        self.settings.video_settings[mode.index()] = value;
        if mode == self.current_mode {
            self.write_settings_register();
        }
    }

    /// Stores and applies the OSD background color.
    pub fn set_osd_background(&mut self, value: u32) {
        self.settings.osd_background = value;
        self.video.write(Register::OsdBackground, value);
    }

    /// Stores the audio volume, the register stays silent while muted.
    pub fn set_volume(&mut self, volume: u8) {
        self.settings.audio_volume = volume;
        self.video
            .write(Register::AudioVolume, self.settings.volume_word());
    }

    /// Mutes or unmutes audio without losing the volume.
    pub fn set_mute(&mut self, mute: bool) {
        self.settings.audio_mute = mute;
        self.video
            .write(Register::AudioVolume, self.settings.volume_word());
    }

    /// Stores the calibration values and writes the packed image control word.
    pub fn set_picture_controls(&mut self, picture: PictureControls) {
        self.settings.picture = picture;
        self.video.write(Register::ImageControls, picture.encode());
    }

    /// Only kept for the next save, no register is written.
    pub fn set_mode_switch_delay(&mut self, delay: u32) {
        self.settings.mode_switch_delay = delay;
    }

    /// Only kept for the next save, no register is written.
    pub fn set_resbox_enabled(&mut self, enabled: bool) {
        self.settings.resbox_enabled = enabled;
    }

    /// Replaces the remote control code table. Only kept for the next save, no register is written.
    pub fn set_ir_codes(&mut self, codes: [u32; IR_CODE_COUNT]) {
        self.settings.ir_codes = codes;
    }

    /// Writes the complete in-memory state to the video interface.
    pub fn apply(&mut self) {
        self.write_settings_register();
        self.video
            .write(Register::OsdBackground, self.settings.osd_background);
        self.video
            .write(Register::AudioVolume, self.settings.volume_word());
        self.video
            .write(Register::ImageControls, self.settings.picture.encode());
    }

    /// Resolution of the incoming signal.
    pub fn resolution(&mut self) -> Resolution {
        Resolution::from_registers(
            self.video.read(Register::XResolution),
            self.video.read(Register::YResolution),
            self.video.read(Register::Flags),
        )
    }

    /// Returns how many slots of the sector are empty, valid or dirty.
    pub fn statistics(&mut self) -> Result<SlotStatistics, Error> {
        if self.faulted {
            return Err(Error::FlashError);
        }

        match self.log.statistics(&mut self.hal) {
            Ok(stats) => Ok(stats),
            Err(e) => Err(self.fault(e)),
        }
    }

    fn write_settings_register(&mut self) {
        self.video.write(
            Register::Settings,
            self.settings.settings_word(self.current_mode),
        );
    }
}
