use std::fs;
use std::path::PathBuf;

use retropass_core::cells::BossTable;
use retropass_core::core_api::{CoreErrorCode, Engine, Game};
use retropass_core::password::Password;
use retropass_core::settings::Settings;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

#[test]
fn builtin_knows_every_game() {
    let engine = Engine::builtin().unwrap();
    assert_eq!(engine.games(), Game::ALL.to_vec());
    for game in Game::ALL {
        let pw = engine.make_password(game, None).unwrap();
        assert_eq!(pw.game(), game);
    }
}

#[test]
fn lookup_by_id_and_alias() {
    let engine = Engine::builtin().unwrap();
    let pw = engine
        .make_password_by_id("mega-man-2", Some("A1 B5 C3 C4 D2 D5 E1 E2 E4"))
        .unwrap();
    assert_eq!(pw.game(), Game::MegaMan2);
    assert!(matches!(pw, Password::Cells(_)));

    let pw = engine.make_password_by_id("icarus", None).unwrap();
    assert_eq!(pw.game(), Game::KidIcarus);

    let err = engine.make_password_by_id("zelda", None).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::UnknownGame);
}

#[test]
fn load_dir_matches_builtin() {
    let loaded = Engine::load_dir(data_dir()).unwrap();
    assert_eq!(loaded, Engine::builtin().unwrap());
}

#[test]
fn load_dir_skips_absent_games() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(
        data_dir().join("sjetman.tbl"),
        dir.path().join("sjetman.tbl"),
    )
    .unwrap();
    // a field table without its text table is not enough
    fs::copy(
        data_dir().join("metroid.tsv"),
        dir.path().join("metroid.tsv"),
    )
    .unwrap();

    let engine = Engine::load_dir(dir.path()).unwrap();
    assert_eq!(engine.games(), vec![Game::SolarJetman]);
    let err = engine.make_password(Game::Metroid, None).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::UnknownGame);
}

#[test]
fn load_dir_reports_broken_tables() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mm2.tsv"), "name\talive\tdead\nairman\tA1\tB1\n").unwrap();
    let err = Engine::load_dir(dir.path()).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::Schema);

    let dir = tempfile::tempdir().unwrap();
    fs::copy(
        data_dir().join("kidicarus.tbl"),
        dir.path().join("kidicarus.tbl"),
    )
    .unwrap();
    fs::write(
        dir.path().join("kidicarus.tsv"),
        "fid\toffset\twidth\ttype\tmod\nstage\t0\t2\tuint\t1\n",
    )
    .unwrap();
    let err = Engine::load_dir(dir.path()).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::Schema);
}

#[test]
fn builder_accepts_custom_boss_tables() {
    let bosses = BossTable::parse(Game::MegaMan2, "name\talive\tdead\nairman\tB1\tC1\n").unwrap();
    let engine = Engine::builder().cells(bosses).build();
    assert_eq!(engine.games(), vec![Game::MegaMan2]);

    let pw = engine
        .make_password(Game::MegaMan2, Some("A2 C2"))
        .unwrap();
    assert_eq!(pw.get("tanks").unwrap(), 1);
    assert_eq!(pw.get("airman").unwrap(), 1);
    assert_eq!(pw.to_string(), "A2 C2");
}

#[test]
fn settings_file_applies_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("start.txt");
    fs::write(
        &path,
        "# full kit\ntaken_marumari: 1\nhas_marumari: 0b1\n\nmissiles: 0x64\nshift: 3\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.len(), 4);

    let engine = Engine::builtin().unwrap();
    let mut pw = engine.make_password(Game::Metroid, None).unwrap();
    settings.apply(&mut pw).unwrap();
    assert_eq!(pw.get("missiles").unwrap(), 100);
    assert_eq!(pw.get("shift").unwrap(), 3);
    assert_eq!(pw.get("has_marumari").unwrap(), 1);

    let decoded = engine
        .make_password(Game::Metroid, Some(&pw.to_string()))
        .unwrap();
    assert_eq!(decoded, pw);
}

#[test]
fn settings_stop_at_rejected_field() {
    let settings = Settings::parse("tanks: 2\nbubbleman: 1\nwilyman: 1\n").unwrap();
    let engine = Engine::builtin().unwrap();
    let mut pw = engine.make_password(Game::MegaMan2, None).unwrap();
    let err = settings.apply(&mut pw).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::UnknownField);
    assert_eq!(pw.get("tanks").unwrap(), 0);
}

#[test]
fn failed_settings_leave_password_untouched() {
    let settings = Settings::parse("missiles: 5\nbogus: 1\n").unwrap();
    let engine = Engine::builtin().unwrap();
    let mut pw = engine.make_password(Game::Metroid, None).unwrap();
    let before = pw.clone();
    let err = settings.apply(&mut pw).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::UnknownField);
    assert_eq!(pw.get("missiles").unwrap(), 0);
    assert_eq!(pw, before);
}

#[test]
fn blank_passwords_decode_to_themselves() {
    let engine = Engine::builtin().unwrap();
    for game in Game::ALL {
        let blank = engine.make_password(game, None).unwrap();
        let decoded = engine
            .make_password(game, Some(&blank.to_string()))
            .unwrap();
        assert_eq!(decoded, blank, "{game}");
    }
}

#[test]
fn missing_settings_file_is_io() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(dir.path().join("absent.txt")).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::Io);
}
