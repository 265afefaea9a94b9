use crate::video::{IMGCTL_BRIGHTNESS_SHIFT, IMGCTL_CONTRAST_SHIFT, IMGCTL_SATURATION_SHIFT};

/// Image control word written at power on, equal to `encode(0, 0, 0)`.
pub const DEFAULT_IMAGE_CONTROLS: u32 = 0x0080_0080;

/// User calibration values, 0 is neutral.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PictureControls {
    pub brightness: i8,
    pub contrast: i8,
    pub saturation: i8,
}

impl PictureControls {
    pub const fn encode(&self) -> u32 {
        encode(self.brightness, self.contrast, self.saturation)
    }
}

/// Packs the calibration values into the image control register word.
///
/// Saturation is scaled with the contrast so that raising the contrast does not wash out the
/// colors, the result can exceed 8 bits and is stored unmasked.
pub const fn encode(brightness: i8, contrast: i8, saturation: i8) -> u32 {
    let contrast = (contrast as i16 + 128) as u32;
    let saturation = (saturation as i16 + 128) as u32 * contrast / 128;

    (contrast << IMGCTL_CONTRAST_SHIFT)
        | ((brightness.cast_unsigned() as u32) << IMGCTL_BRIGHTNESS_SHIFT)
        | (saturation << IMGCTL_SATURATION_SHIFT)
}

const _: () = assert!(encode(0, 0, 0) == DEFAULT_IMAGE_CONTROLS);
