use super::*;

#[test]
fn palette_names_resolve_case_insensitively() {
    assert_eq!(resolve_color("blue").unwrap(), Rgba8::rgb(0x3b, 0x82, 0xf6));
    assert_eq!(resolve_color(" Emerald ").unwrap(), Rgba8::rgb(0x10, 0xb9, 0x81));
}

#[test]
fn hex_colors_pass_through_and_junk_is_rejected() {
    assert_eq!(resolve_color("#112233").unwrap(), Rgba8::rgb(0x11, 0x22, 0x33));
    let err = resolve_color("chartreuse-ish").unwrap_err();
    assert!(matches!(err, ThumbnailError::Config(_)), "{err}");
}

#[test]
fn custom_scale_steps_match_rem_values() {
    assert_eq!(TextSize::Xxs.px(), 10.0);
    assert!((TextSize::Smd.px() - 15.04).abs() < 1e-4);
    assert_eq!(TextSize::X5l.px(), 48.0);
    assert_eq!(TextSize::X4l.px(), 36.0);
}

#[test]
fn with_primary_replaces_only_primary() {
    let base = Theme::default();
    let themed = base.clone().with_primary("purple").unwrap();
    assert_eq!(themed.primary, Rgba8::rgb(0xa8, 0x55, 0xf7));
    assert_eq!(themed.background, base.background);
    assert!(Theme::default().with_primary("nope").is_err());
}

#[test]
fn theme_deserializes_from_hex_tokens() {
    let t: Theme = serde_json::from_str(
        r##"{"primary":"#ff0000","background":"#000000","foreground":"#ffffff","muted":"#9ca3af","brand":"Chat"}"##,
    )
    .unwrap();
    assert_eq!(t.primary, Rgba8::rgb(255, 0, 0));
    assert_eq!(t.brand.as_deref(), Some("Chat"));
}
