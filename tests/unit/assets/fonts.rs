use super::*;

#[test]
fn garbage_font_bytes_are_a_config_error() {
    let err = FontSet::from_bytes(b"not a font".to_vec(), b"nope".to_vec()).unwrap_err();
    assert!(matches!(err, ThumbnailError::Config(_)), "{err}");
}

#[test]
fn missing_font_files_are_reported_with_path() {
    let err = FontSet::from_files(
        Path::new("/definitely/missing/Regular.ttf"),
        Path::new("/definitely/missing/Bold.ttf"),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Regular.ttf"), "{err}");
}

#[test]
fn vendored_font_set_exposes_family_and_weights() {
    let fonts = fixture_font_set();

    assert_eq!(fonts.regular().family, "DejaVu Sans");
    assert_eq!(fonts.bold().family, "DejaVu Sans");
    assert_eq!((fonts.regular().weight, fonts.bold().weight), (400, 700));

    assert!(!fonts.bold().bytes.is_empty());
    assert!(std::ptr::eq(fonts.face_for_weight(500), fonts.regular()));
    assert!(std::ptr::eq(fonts.face_for_weight(700), fonts.bold()));

    let db = fonts.fontdb();
    let family = fonts.regular().family.clone();
    assert!(
        db.faces()
            .any(|f| f.families.iter().any(|(name, _)| *name == family))
    );
}

#[test]
fn font_bytes_round_trip_through_from_bytes() {
    let fonts = fixture_font_set();
    let again = FontSet::from_bytes(
        fonts.regular().bytes.as_ref().clone(),
        fonts.bold().bytes.as_ref().clone(),
    )
    .unwrap();
    assert_eq!(again.regular().family, fonts.regular().family);
    assert_eq!(again.bold().weight, fonts.bold().weight);
}
