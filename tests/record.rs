use pretty_assertions::assert_eq;
use video_settings::error::Error;
use video_settings::image::PictureControls;
use video_settings::record::{
    self, RECORD_SIZE_V4, RECORD_SIZE_V5, RecordVersion, SettingsRecord, StoredSettings,
};
use video_settings::settings::Settings;

fn custom_settings() -> Settings {
    Settings {
        video_settings: [0x11, 0x2233, 0x44_5566, 0x7788_99aa, 0, 0xffff_ffff],
        video_settings_global: 0,
        osd_background: 0x1234_5678,
        mode_switch_delay: 300,
        resbox_enabled: false,
        ir_codes: [1, 2, 3, 0xdead_beef, 5, 6],
        audio_volume: 17,
        audio_mute: true,
        picture: PictureControls {
            brightness: -5,
            contrast: 42,
            saturation: -128,
        },
    }
}

fn stored() -> StoredSettings {
    StoredSettings {
        resbox_enabled: true,
        audio_mute: false,
        volume: 99,
        video_settings: [1, 2, 3, 4, 5, 6],
        osd_background: 0xabcd,
        mode_switch_delay: 7,
        ir_codes: [8, 9, 10, 11, 12, 13],
    }
}

#[test]
fn encode_writes_current_version() {
    let bytes = record::encode(&Settings::default());

    assert_eq!(bytes.len(), RECORD_SIZE_V5);
    assert_eq!(bytes[1], RecordVersion::CURRENT as u8);
    assert_eq!(bytes[0], record::checksum(&bytes));
}

#[test]
fn encode_then_decode() {
    let settings = custom_settings();
    let bytes = record::encode(&settings);
    let decoded = record::decode(&bytes).unwrap();

    assert_eq!(decoded, SettingsRecord::from(&settings));
    assert_eq!(decoded.version(), RecordVersion::V5);

    let mut restored = Settings {
        video_settings_global: 0,
        ..Settings::default()
    };
    decoded.apply_to(&mut restored);
    assert_eq!(restored, settings);
}

#[test]
fn layout_is_big_endian_and_fixed() {
    let bytes = record::encode(&custom_settings());

    // flags: muted, no resolution box
    assert_eq!(bytes[2], record::FLAG_MUTE);
    assert_eq!(bytes[3], 17);
    assert_eq!(&bytes[4..8], &[0x00, 0x00, 0x00, 0x11]);
    assert_eq!(&bytes[16..20], &[0x77, 0x88, 0x99, 0xaa]);
    assert_eq!(&bytes[28..32], &[0x12, 0x34, 0x56, 0x78]);
    assert_eq!(&bytes[32..36], &[0x00, 0x00, 0x01, 0x2c]);
    assert_eq!(&bytes[48..52], &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(&bytes[60..63], &[0xfb, 42, 0x80]);
}

#[test]
fn single_bit_flips_invalidate_typical_record() {
    // picture controls of this record do not sum to 255, see `version_downgrade_collision`
    let bytes = record::encode(&custom_settings());

    for byte in 0..RECORD_SIZE_V5 {
        for bit in 0..8 {
            let mut corrupted = bytes;
            corrupted[byte] ^= 1 << bit;
            assert!(
                record::decode(&corrupted).is_err(),
                "flipping bit {bit} of byte {byte} went unnoticed"
            );
        }
    }
}

#[test]
fn version_downgrade_collision() {
    let settings = Settings {
        picture: PictureControls {
            brightness: -1,
            contrast: 0,
            saturation: 0,
        },
        ..Settings::default()
    };
    let mut bytes = record::encode(&settings);
    bytes[1] ^= 0x01;

    // version 5 -> 4 drops 0xff + 0 + 0 from the sum, exactly what the version byte lost
    let decoded = record::decode(&bytes).unwrap();
    assert_eq!(decoded.version(), RecordVersion::V4);
    assert_eq!(decoded.stored(), SettingsRecord::from(&settings).stored());
}

#[test]
fn checksum_mismatch_is_reported() {
    let mut bytes = record::encode(&Settings::default());
    let stored = bytes[0];
    bytes[0] = stored.wrapping_add(1);

    assert_eq!(
        record::decode(&bytes),
        Err(Error::ChecksumMismatch {
            stored: stored.wrapping_add(1),
            computed: stored,
        })
    );
}

#[test]
fn unknown_versions_are_rejected_despite_valid_checksum() {
    let template = record::encode(&Settings::default());

    for version in (0..=u8::MAX).filter(|v| *v != 4 && *v != 5) {
        let mut bytes = template;
        bytes[1] = version;
        for size in [RECORD_SIZE_V4, RECORD_SIZE_V5] {
            bytes[0] = record::checksum(&bytes[..size]);
            assert_eq!(
                record::decode(&bytes),
                Err(Error::UnsupportedVersion(version))
            );
        }
    }
}

#[test]
fn version_4_record() {
    let bytes = SettingsRecord::V4(stored()).encode();

    assert_eq!(bytes[1], 4);
    // nothing past the version 4 layout is written
    assert_eq!(&bytes[RECORD_SIZE_V4..], &[0xff, 0xff, 0xff]);

    let decoded = record::decode(&bytes).unwrap();
    assert_eq!(decoded, SettingsRecord::V4(stored()));
    assert_eq!(decoded.picture_controls(), None);
}

#[test]
fn version_4_checksum_ignores_trailing_bytes() {
    let mut bytes = SettingsRecord::V4(stored()).encode();
    bytes[RECORD_SIZE_V4] = 0x12;
    bytes[RECORD_SIZE_V5 - 1] = 0x00;

    assert_eq!(record::decode(&bytes), Ok(SettingsRecord::V4(stored())));
}

#[test]
fn version_4_keeps_picture_controls() {
    let picture = PictureControls {
        brightness: 3,
        contrast: -3,
        saturation: 9,
    };
    let mut settings = Settings {
        picture,
        ..Settings::default()
    };

    SettingsRecord::V4(stored()).apply_to(&mut settings);

    assert_eq!(settings.picture, picture);
    assert_eq!(settings.audio_volume, 99);
    assert_eq!(settings.video_settings, [1, 2, 3, 4, 5, 6]);
    assert_eq!(settings.ir_codes, [8, 9, 10, 11, 12, 13]);
    assert!(settings.resbox_enabled);
}

#[test]
fn erased_bytes() {
    let bytes = [0xffu8; RECORD_SIZE_V5];

    assert!(record::is_erased(&bytes));
    assert_eq!(record::decode(&bytes), Err(Error::UnsupportedVersion(0xff)));

    let mut dirty = bytes;
    dirty[0] = 0x00;
    assert!(!record::is_erased(&dirty));
}
