//! Tests for operation mode and view parsing.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use rstest::rstest;

use crate::ReviewPoliceConfig;
use crate::config::OperationMode;
use crate::error::AppError;
use crate::github::ReviewRequestView;

#[rstest]
#[case::unset(None, OperationMode::Listen)]
#[case::listen(Some("listen"), OperationMode::Listen)]
#[case::relay(Some("relay"), OperationMode::Relay)]
#[case::show_uppercase(Some("SHOW"), OperationMode::Show)]
#[case::accept_padded(Some(" accept "), OperationMode::Accept)]
fn operation_mode_parses_known_modes(#[case] mode: Option<&str>, #[case] expected: OperationMode) {
    let config = ReviewPoliceConfig {
        mode: mode.map(str::to_owned),
        ..Default::default()
    };

    assert_eq!(
        config.operation_mode().ok(),
        Some(expected),
        "mode {mode:?} should parse"
    );
}

#[rstest]
fn operation_mode_rejects_unknown_mode() {
    let config = ReviewPoliceConfig {
        mode: Some("patrol".to_owned()),
        ..Default::default()
    };

    let result = config.operation_mode();
    assert!(
        matches!(result, Err(AppError::Configuration { .. })),
        "expected Configuration error, got {result:?}"
    );
}

#[rstest]
#[case::unset(None, ReviewRequestView::All)]
#[case::accepted(Some("accepted"), ReviewRequestView::Accepted)]
#[case::unaccepted(Some("Unaccepted"), ReviewRequestView::Unaccepted)]
fn review_view_parses_known_views(
    #[case] view: Option<&str>,
    #[case] expected: ReviewRequestView,
) {
    let config = ReviewPoliceConfig {
        view: view.map(str::to_owned),
        ..Default::default()
    };

    assert_eq!(config.review_view().ok(), Some(expected));
}

#[rstest]
fn review_view_rejects_unknown_view() {
    let config = ReviewPoliceConfig {
        view: Some("pending".to_owned()),
        ..Default::default()
    };

    assert!(
        config.review_view().is_err(),
        "unknown view should be rejected"
    );
}

/// Loads configuration from `cli_args` with an isolated home directory.
fn load_from_cli(cli_args: &[&str]) -> ReviewPoliceConfig {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();

    let _guard = env_lock::lock_env([
        ("REVIEW_POLICE_MODE", None),
        ("REVIEW_POLICE_PULLS", None),
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ]);

    let mut args = vec![OsString::from("review-police")];
    args.extend(cli_args.iter().map(OsString::from));
    ReviewPoliceConfig::load_from_iter(args).expect("config should load")
}

#[rstest]
#[case::short_flags(&["-M", "accept", "-P", "10,55"])]
#[case::long_flags(&["--mode", "accept", "--pulls", "10,55"])]
fn mode_and_pulls_parse_from_command_line(#[case] cli_args: &[&str]) {
    let config = load_from_cli(cli_args);

    assert_eq!(config.operation_mode().ok(), Some(OperationMode::Accept));
    assert_eq!(
        config.require_pull_selections().ok(),
        Some(vec!["10".to_owned(), "55".to_owned()])
    );
}
