use std::path::PathBuf;

use retropass_core::bits::{self, BitOrder};
use retropass_core::core_api::{CoreError, CoreErrorCode, Engine, Game};
use retropass_core::password::Password;
use retropass_core::settings::Settings;
use retropass_core::structured::Level;
use retropass_core::text::TextCodec;

fn engine() -> Engine {
    Engine::builtin().unwrap()
}

fn blank() -> Password {
    engine().make_password(Game::KidIcarus, None).unwrap()
}

fn sample() -> Password {
    let mut pw = blank();
    pw.set("level", 24).unwrap();
    pw.set("hearts", 500).unwrap();
    pw.set("has_bow", 1).unwrap();
    pw.set("score", 12345).unwrap();
    pw
}

#[test]
fn blank_password() {
    let pw = blank();
    assert_eq!(pw.to_string(), "000000 000000 000000 000000");
    assert_eq!(pw.get("stage").unwrap(), 1);
}

#[test]
fn fortress_level_sets_stage_fields() {
    let pw = sample();
    assert_eq!(pw.get("stage").unwrap(), 2);
    assert_eq!(pw.get("substage").unwrap(), 0);
    assert_eq!(pw.get("fortress").unwrap(), 1);
    assert_eq!(pw.get("level").unwrap(), 24);
    assert_eq!(pw.to_string(), "H0GVv0 301000 000000 00000?");
    assert_eq!(pw.checksum(), Some(248));
}

#[test]
fn setting_stage_fields_directly_matches_level() {
    let mut pw = blank();
    pw.set("stage", 2).unwrap();
    pw.set("fortress", 1).unwrap();
    pw.set("hearts", 500).unwrap();
    pw.set("has_bow", 1).unwrap();
    pw.set("score", 12345).unwrap();
    assert_eq!(pw, sample());
}

#[test]
fn decode_round_trip() {
    let pw = engine()
        .make_password(Game::KidIcarus, Some("H0GVv0 301000 000000 00000?"))
        .unwrap();
    assert_eq!(pw, sample());
    assert_eq!(pw.to_string(), "H0GVv0 301000 000000 00000?");

    let Password::Structured(structured) = &pw else {
        panic!("kid icarus passwords are structured");
    };
    assert_eq!(structured.level().unwrap(), Level::new(2, 4).unwrap());
    assert_eq!(structured.level().unwrap().to_string(), "2-4");
}

#[test]
fn plain_stage_level() {
    let mut pw = sample();
    pw.set("level", 31).unwrap();
    assert_eq!(pw.get("stage").unwrap(), 3);
    assert_eq!(pw.get("substage").unwrap(), 1);
    assert_eq!(pw.get("fortress").unwrap(), 0);
    assert_eq!(pw.get("level").unwrap(), 31);
}

#[test]
fn level_out_of_range_leaves_state_alone() {
    let mut pw = sample();
    for value in [9, 15, 45, -1] {
        assert!(matches!(
            pw.set("level", value),
            Err(CoreError::FieldRange { .. })
        ));
    }
    assert_eq!(pw, sample());
}

#[test]
fn blank_level_is_world_one() {
    let mut pw = blank();
    assert_eq!(pw.get("level").unwrap(), 10);
    pw.set("level", 10).unwrap();
    assert_eq!(pw, blank());

    let Password::Structured(structured) = &pw else {
        panic!("kid icarus passwords are structured");
    };
    assert_eq!(structured.level().unwrap().to_string(), "1-0");
}

#[test]
fn dumped_values_can_be_set_back() {
    let decoded = engine()
        .make_password(Game::KidIcarus, Some("H0GVv0 301000 000000 00000?"))
        .unwrap();
    let mut mixed = blank();
    mixed.set("stage", 3).unwrap();
    mixed.set("substage", 2).unwrap();
    mixed.set("fortress", 1).unwrap();

    for pw in [blank(), decoded, mixed] {
        let settings = Settings::parse(&pw.dump().unwrap()).unwrap();
        let mut restored = blank();
        settings.apply(&mut restored).unwrap();
        assert_eq!(restored, pw, "{pw}");
    }
}

#[test]
fn no_shift_field() {
    let mut pw = blank();
    assert!(matches!(pw.get("shift"), Err(CoreError::UnknownField(_))));
    assert!(matches!(pw.set("shift", 1), Err(CoreError::UnknownField(_))));
    assert!(!pw.field_ids().unwrap().iter().any(|id| id == "shift"));
    assert!(pw.field_ids().unwrap().iter().any(|id| id == "level"));
}

#[test]
fn every_flipped_bit_is_caught() {
    let Password::Structured(pw) = sample() else {
        panic!("kid icarus passwords are structured");
    };
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    let text = TextCodec::load(dir.join("kidicarus.tbl")).unwrap();
    let stored = pw.bits();
    assert_eq!(stored.len(), 144);

    for i in 0..stored.len() {
        let mut damaged = stored.clone();
        damaged[i] = !damaged[i];
        let codes = bits::chunk(&damaged, 6, BitOrder::Lsb0);
        let password = text.decode(&codes).unwrap();
        let err = engine()
            .make_password(Game::KidIcarus, Some(&password))
            .unwrap_err();
        assert_eq!(err.code(), CoreErrorCode::InvalidPassword, "bit {i}");
    }
}

#[test]
fn field_bounds() {
    let mut pw = blank();
    assert!(pw.set("hearts", 1023).is_ok());
    assert!(pw.set("hearts", 1024).is_err());
    assert!(pw.set("stage", 0).is_err());
    assert!(pw.set("stage", 5).is_err());
    assert!(pw.set("stage", 4).is_ok());
}
