//! Named registers of the memory mapped video interface.
//!
//! The store never touches hardware directly, it goes through [`VideoInterface`] so that it can
//! be driven against a plain register file in tests.

/// Registers of the video interface block used by the settings code.
#[derive(strum::Display, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Per-mode settings word OR'd with the global settings bits
    Settings = 0,
    /// Packed contrast, brightness and saturation, see [`crate::image`]
    ImageControls = 1,
    /// OSD background color and alpha
    OsdBackground = 2,
    /// Audio volume, 0..=255
    AudioVolume = 3,
    /// Read-only signal detection flags
    Flags = 4,
    /// Read-only horizontal resolution of the incoming signal
    XResolution = 5,
    /// Read-only vertical resolution of the incoming signal, per field
    YResolution = 6,
}

/// Access to the video interface registers. Register accesses cannot fail.
pub trait VideoInterface {
    fn read(&mut self, register: Register) -> u32;
    fn write(&mut self, register: Register, value: u32);
}

impl<T: VideoInterface> VideoInterface for &mut T {
    fn read(&mut self, register: Register) -> u32 {
        (*self).read(register)
    }

    fn write(&mut self, register: Register, value: u32) {
        (*self).write(register, value)
    }
}

// Register::Flags
pub const FLAG_PROGRESSIVE: u32 = 1 << 0;
pub const FLAG_PAL: u32 = 1 << 1;
pub const FLAG_31KHZ: u32 = 1 << 2;

// Register::Settings
pub const SET_SL_STRENGTH_MASK: u32 = 0xff;
pub const SET_SL_ALTERNATE: u32 = 1 << 8;
pub const SET_SL_EVEN: u32 = 1 << 9;
pub const SET_SL_ENABLE: u32 = 1 << 10;
pub const SET_LD_ENABLE: u32 = 1 << 11;
pub const SET_CABLEDETECT: u32 = 1 << 13;

// Register::ImageControls
pub const IMGCTL_CONTRAST_SHIFT: u32 = 0;
pub const IMGCTL_BRIGHTNESS_SHIFT: u32 = 8;
pub const IMGCTL_SATURATION_SHIFT: u32 = 16;
