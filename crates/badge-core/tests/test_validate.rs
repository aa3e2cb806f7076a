mod common;

use badge_core::config::ValidationConfig;
use badge_core::error::ValidationError;
use badge_core::source::Size;
use badge_core::validate::{ImageValidator, Upload};

use common::{solid_jpeg, solid_png};

fn validator() -> ImageValidator {
    ImageValidator::default()
}

#[test]
fn test_shorter_side_below_minimum_rejected() {
    let bytes = solid_png(799, 900, [10, 20, 30]);
    let report = validator().validate(Upload::new(&bytes, "image/png"));

    assert!(!report.is_valid);
    assert!(report.warning.is_none());
    assert_eq!(report.dimensions, Some(Size::new(799, 900)));
    match report.error {
        Some(ValidationError::ResolutionTooLow {
            actual, required, ..
        }) => {
            assert_eq!(actual, 799);
            assert_eq!(required, 800);
        }
        other => panic!("expected ResolutionTooLow, got {other:?}"),
    }
}

#[test]
fn test_resolution_error_names_actual_and_required() {
    let bytes = solid_png(799, 900, [10, 20, 30]);
    let err = validator()
        .accept(Upload::new(&bytes, "image/png"))
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("799"), "got: {msg}");
    assert!(msg.contains("800"), "got: {msg}");
}

#[test]
fn test_exact_minimum_accepted_without_warning() {
    let bytes = solid_png(800, 800, [10, 20, 30]);
    let report = validator().validate(Upload::new(&bytes, "image/png"));

    assert!(report.is_valid);
    assert!(report.error.is_none());
    assert!(report.warning.is_none());
    assert_eq!(report.aspect_ratio, Some(1.0));
}

#[test]
fn test_below_recommended_accepted_with_warning() {
    let bytes = solid_png(1000, 1000, [10, 20, 30]);
    let report = validator().validate(Upload::new(&bytes, "image/png"));

    assert!(report.is_valid);
    assert!(report.error.is_none());
    let warning = report.warning.expect("quality warning");
    let msg = warning.to_string();
    assert!(msg.contains("1500"), "got: {msg}");
    assert!(msg.contains("500px short"), "got: {msg}");
}

#[test]
fn test_recommended_resolution_accepted_without_warning() {
    let bytes = solid_png(1600, 1600, [10, 20, 30]);
    let report = validator().validate(Upload::new(&bytes, "image/png"));

    assert!(report.is_valid);
    assert!(report.warning.is_none());
    assert_eq!(report.dimensions, Some(Size::new(1600, 1600)));
}

#[test]
fn test_accept_returns_decoded_image_and_warning() {
    let bytes = solid_png(1200, 900, [10, 20, 30]);
    let accepted = validator()
        .accept(Upload::new(&bytes, "image/png"))
        .unwrap();
    assert_eq!(accepted.dimensions(), Size::new(1200, 900));
    assert!(accepted.warning.is_some());
}

#[test]
fn test_jpeg_accepted() {
    let bytes = solid_jpeg(900, 1000, [200, 100, 50]);
    let report = validator().validate(Upload::new(&bytes, "image/jpeg"));
    assert!(report.is_valid, "{:?}", report.error);
    assert!(report.warning.is_some());
}

#[test]
fn test_unsupported_mime_rejected_before_decode() {
    let bytes = solid_png(1600, 1600, [10, 20, 30]);
    let report = validator().validate(Upload::new(&bytes, "image/gif"));

    assert!(!report.is_valid);
    assert!(report.dimensions.is_none());
    match report.error {
        Some(ValidationError::UnsupportedFormat { ref mime }) => assert_eq!(mime, "image/gif"),
        ref other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn test_mime_match_is_case_insensitive() {
    let bytes = solid_png(800, 800, [10, 20, 30]);
    let report = validator().validate(Upload::new(&bytes, " Image/PNG "));
    assert!(report.is_valid);
}

#[test]
fn test_missing_mime_is_sniffed() {
    let bytes = solid_png(800, 800, [10, 20, 30]);
    assert!(validator().validate(Upload::sniffed(&bytes)).is_valid);

    let garbage = vec![0x42u8; 64];
    let report = validator().validate(Upload::sniffed(&garbage));
    assert!(matches!(
        report.error,
        Some(ValidationError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_oversized_file_rejected() {
    let mut bytes = solid_png(800, 800, [10, 20, 30]);
    bytes.resize(20 * 1024 * 1024 + 1, 0);
    let report = validator().validate(Upload::new(&bytes, "image/png"));

    assert!(!report.is_valid);
    match report.error {
        Some(ValidationError::FileTooLarge { size_mb, max_mb }) => {
            assert!(size_mb > 20.0);
            assert_eq!(max_mb, 20.0);
        }
        other => panic!("expected FileTooLarge, got {other:?}"),
    }
}

#[test]
fn test_size_limit_comes_from_config() {
    let bytes = solid_png(800, 800, [10, 20, 30]);
    let strict = ImageValidator::new(ValidationConfig {
        max_bytes: 16,
        ..Default::default()
    });
    let err = strict.accept(Upload::new(&bytes, "image/png")).unwrap_err();
    assert!(matches!(err, ValidationError::FileTooLarge { .. }));
    assert!(err.to_string().contains("Maximum allowed size"));
}

#[test]
fn test_corrupt_file_is_distinct_error() {
    let mut bytes = solid_png(800, 800, [10, 20, 30]);
    bytes.truncate(60);
    let report = validator().validate(Upload::new(&bytes, "image/png"));

    assert!(!report.is_valid);
    assert!(matches!(report.error, Some(ValidationError::Corrupt(_))));
    assert!(report.dimensions.is_none());
}
