use bartender_config::load_settings_toml;
use rstest::rstest;

#[test]
fn empty_settings_use_factory_defaults() {
    let settings = load_settings_toml("").expect("parse empty TOML");
    settings.validate().expect("defaults are valid");
    assert!((settings.dispense.secs_per_ml - 60.0 / 500.0).abs() < 1e-6);
    assert_eq!(settings.dispense.clean_secs, 20);
    assert_eq!(settings.dispense.settle_ms, 2000);
    assert_eq!(settings.buttons.advance_pin, 13);
    assert_eq!(settings.buttons.select_pin, 5);
    assert_eq!(settings.display.wrap_width, 13);
}

#[test]
fn partial_file_overrides_only_named_fields() {
    let toml = r#"
[dispense]
clean_secs = 30

[display]
wrap_width = 20
"#;
    let settings = load_settings_toml(toml).expect("parse");
    settings.validate().expect("valid");
    assert_eq!(settings.dispense.clean_secs, 30);
    assert_eq!(settings.display.wrap_width, 20);
    // untouched sections keep their defaults
    assert_eq!(settings.dispense.settle_ms, 2000);
    assert_eq!(settings.buttons.bounce_ms, 200);
}

#[rstest]
#[case("[dispense]\nsecs_per_ml = 0.0", "secs_per_ml")]
#[case("[dispense]\nsecs_per_ml = -1.0", "secs_per_ml")]
#[case("[dispense]\nclean_secs = 0", "clean_secs")]
#[case("[buttons]\nbounce_ms = 0", "bounce_ms")]
#[case("[buttons]\nadvance_pin = 5\nselect_pin = 5", "must differ")]
#[case("[display]\nwrap_width = 0", "wrap_width")]
#[case("[logging]\nrotation = \"weekly\"", "rotation")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let settings = load_settings_toml(toml).expect("parse");
    let err = settings.validate().expect_err("must be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error for {toml:?} should mention {needle:?}, got: {err}"
    );
}
