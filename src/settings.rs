use crate::image::PictureControls;
use crate::mode::{VIDEO_MODE_COUNT, VideoMode};
use crate::video::{SET_CABLEDETECT, SET_LD_ENABLE, SET_SL_ALTERNATE};

/// Number of remote control codes kept in the settings record.
pub const IR_CODE_COUNT: usize = 6;

/// Partially transparent, blue tinted background
pub const DEFAULT_OSD_BACKGROUND: u32 = 0x0050_1bf8;

const DEFAULT_SCANLINE_STRENGTH: u32 = 0x80;

/// In-memory copy of all user tunable settings. `Default` yields the built-in power on values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// One settings word per [`VideoMode`], indexed by the mode discriminant
    pub video_settings: [u32; VIDEO_MODE_COUNT],
    /// Bits applied to all modes, never persisted
    pub video_settings_global: u32,
    pub osd_background: u32,
    pub mode_switch_delay: u32,
    pub resbox_enabled: bool,
    pub ir_codes: [u32; IR_CODE_COUNT],
    pub audio_volume: u8,
    pub audio_mute: bool,
    pub picture: PictureControls,
}

impl Default for Settings {
    fn default() -> Self {
        let mut video_settings = [DEFAULT_SCANLINE_STRENGTH; VIDEO_MODE_COUNT];
        video_settings[VideoMode::Mode240p.index()] |= SET_LD_ENABLE;
        video_settings[VideoMode::Mode288p.index()] |= SET_LD_ENABLE;
        video_settings[VideoMode::Mode480i.index()] |= SET_LD_ENABLE | SET_SL_ALTERNATE;
        video_settings[VideoMode::Mode576i.index()] |= SET_LD_ENABLE | SET_SL_ALTERNATE;

        Self {
            video_settings,
            video_settings_global: SET_CABLEDETECT,
            osd_background: DEFAULT_OSD_BACKGROUND,
            mode_switch_delay: 0,
            resbox_enabled: true,
            ir_codes: [0; IR_CODE_COUNT],
            audio_volume: u8::MAX,
            audio_mute: false,
            picture: PictureControls::default(),
        }
    }
}

impl Settings {
    /// Value of the settings register while `mode` is active.
    pub fn settings_word(&self, mode: VideoMode) -> u32 {
        self.video_settings[mode.index()] | self.video_settings_global
    }

    /// Value of the audio volume register, silent while muted.
    pub fn volume_word(&self) -> u32 {
        if self.audio_mute {
            0
        } else {
            self.audio_volume as u32
        }
    }
}
