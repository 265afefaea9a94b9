use crate::video::{FLAG_31KHZ, FLAG_PAL, FLAG_PROGRESSIVE};
use core::fmt;

pub const VIDEO_MODE_COUNT: usize = <VideoMode as strum::EnumCount>::COUNT;

/// Logical video modes. The discriminant indexes the per-mode settings table, so the order is
/// part of the stored record format: even entries are 60Hz, odd entries 50Hz.
#[derive(
    strum::FromRepr,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
    strum::IntoStaticStr,
    Debug,
    Eq,
    PartialEq,
    Copy,
    Clone,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum VideoMode {
    #[strum(serialize = "240p")]
    Mode240p = 0,
    #[strum(serialize = "288p")]
    Mode288p = 1,
    #[strum(serialize = "480i")]
    Mode480i = 2,
    #[strum(serialize = "576i")]
    Mode576i = 3,
    #[strum(serialize = "480p")]
    Mode480p = 4,
    #[strum(serialize = "576p")]
    Mode576p = 5,
}

impl VideoMode {
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Self::from_repr)
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Number of output lines per frame
    pub const fn lines(self) -> u16 {
        match self {
            VideoMode::Mode240p | VideoMode::Mode480i => 240,
            VideoMode::Mode288p | VideoMode::Mode576i => 288,
            VideoMode::Mode480p => 480,
            VideoMode::Mode576p => 576,
        }
    }

    pub const fn is_interlaced(self) -> bool {
        matches!(self, VideoMode::Mode480i | VideoMode::Mode576i)
    }

    pub const fn is_50hz(self) -> bool {
        (self as u8) & 1 == 1
    }
}

/// Maps the signal detection flags to a video mode.
///
/// PAL with 31kHz sync is always 576p as the console cannot output 960i/1152i. Combinations not
/// covered by the table end up as 480i.
pub const fn detect(progressive: bool, pal: bool, sync31k: bool) -> VideoMode {
    match (progressive, pal, sync31k) {
        (_, true, true) => VideoMode::Mode576p,
        (true, true, false) => VideoMode::Mode288p,
        (false, true, false) => VideoMode::Mode576i,
        (_, false, true) => VideoMode::Mode480p,
        (true, false, false) => VideoMode::Mode240p,
        (false, false, false) => VideoMode::Mode480i,
    }
}

/// Same as [`detect`], taking the raw contents of the flags register.
pub const fn detect_from_flags(flags: u32) -> VideoMode {
    detect(
        flags & FLAG_PROGRESSIVE != 0,
        flags & FLAG_PAL != 0,
        flags & FLAG_31KHZ != 0,
    )
}

/// Resolution of the incoming signal as reported by the video interface.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution {
    pub width: u32,
    /// Lines per frame, already doubled for interlaced signals
    pub height: u32,
    pub progressive: bool,
    pub pal: bool,
}

impl Resolution {
    pub fn from_registers(xres: u32, yres: u32, flags: u32) -> Self {
        let progressive = flags & FLAG_PROGRESSIVE != 0;
        Self {
            width: xres,
            height: if progressive {
                yres
            } else {
                yres.wrapping_mul(2)
            },
            progressive,
            pal: flags & FLAG_PAL != 0,
        }
    }

    pub const fn refresh_rate(&self) -> u8 {
        if self.pal { 50 } else { 60 }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:3}x{:3}{}{}",
            self.width,
            self.height,
            if self.progressive { 'p' } else { 'i' },
            self.refresh_rate()
        )
    }
}
