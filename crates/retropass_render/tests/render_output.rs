use retropass_core::core_api::{CoreErrorCode, Engine, Game};
use retropass_core::password::Password;
use retropass_render::{
    FieldSelection, TextRenderOptions, render_json, render_json_selected, render_selected,
    render_text,
};
use serde_json::Value;

fn password(game: Game, text: Option<&str>) -> Password {
    Engine::builtin()
        .expect("bundled tables should load")
        .make_password(game, text)
        .expect("password should decode")
}

#[test]
fn plain_text_is_just_the_password() {
    let pw = password(Game::Metroid, Some("0G0000 000000 400000 00000H"));
    let text = render_text(&pw, TextRenderOptions::default()).unwrap();
    assert_eq!(text, "0G0000 000000 400000 00000H\n");
}

#[test]
fn verbose_text_appends_the_dump() {
    let pw = password(Game::MegaMan2, Some("A5 B2 B4 C1 C3 C5 D4 D5 E2"));
    let text = render_text(&pw, TextRenderOptions { verbose: true }).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("A5 B2 B4 C1 C3 C5 D4 D5 E2"));
    assert_eq!(lines.next(), Some(""));
    assert_eq!(lines.next(), Some("tanks:     4"));
    assert_eq!(text.lines().count(), 11);
}

#[test]
fn json_uses_canonical_top_level_order() {
    let pw = password(Game::SolarJetman, Some("HDMGRBHLKGBW"));
    let value = render_json(&pw).unwrap();
    let object = value.as_object().expect("json should be an object");
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["game", "password", "checksum", "fields"]);

    assert_eq!(value["game"], "sjetman");
    assert_eq!(value["password"], "HDMGRBHLKGBW");
    assert_eq!(value["checksum"], 0xD0);
    assert_eq!(value["fields"]["score"], 4321);

    let field_keys: Vec<&str> = value["fields"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(field_keys[..2], ["level", "score"]);
}

#[test]
fn cell_passwords_have_null_checksum() {
    let pw = password(Game::MegaMan2, None);
    let value = render_json(&pw).unwrap();
    assert_eq!(value["checksum"], Value::Null);
    assert_eq!(value["fields"]["tanks"], 0);
}

#[test]
fn selected_fields_keep_request_order() {
    let pw = password(Game::Metroid, Some("GGW01G 000020 VsG000 00002n"));
    let fields = FieldSelection::new(["missiles", "has_ice", "shift"]);
    assert!(fields.is_any_selected());

    let text = render_selected(&pw, &fields).unwrap();
    assert_eq!(text, "missiles=100\nhas_ice=0\nshift=0\n");

    let value = render_json_selected(&pw, &fields).unwrap();
    let keys: Vec<&str> = value["fields"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["missiles", "has_ice", "shift"]);
    assert_eq!(value["game"], "metroid");
}

#[test]
fn unknown_selected_field_is_an_error() {
    let pw = password(Game::KidIcarus, None);
    let fields = FieldSelection::new(["hearts", "lives"]);
    let err = render_selected(&pw, &fields).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::UnknownField);
    assert!(!FieldSelection::default().is_any_selected());
}
