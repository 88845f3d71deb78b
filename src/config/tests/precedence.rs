//! Tests for configuration layer precedence.

use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::{Value, json};

use super::helpers::{apply_layer, build_config_from_layers};
use crate::ReviewPoliceConfig;

#[rstest]
#[case::file_overrides_defaults(
    vec![("defaults", json!({"owner": "default-owner"})), ("file", json!({"owner": "file-owner"}))],
    "owner",
    "file-owner",
    "file should override default"
)]
#[case::environment_overrides_file(
    vec![
        ("file", json!({"github_token": "file-token"})),
        ("environment", json!({"github_token": "env-token"})),
    ],
    "github_token",
    "env-token",
    "environment should override file"
)]
#[case::cli_overrides_environment(
    vec![("environment", json!({"mode": "listen"})), ("cli", json!({"mode": "relay"}))],
    "mode",
    "relay",
    "CLI should override environment"
)]
#[case::mappings_path_defaults_file_env_cli(
    vec![
        ("defaults", json!({"mappings_path": "default.json"})),
        ("file", json!({"mappings_path": "file.json"})),
        ("environment", json!({"mappings_path": "env.json"})),
        ("cli", json!({"mappings_path": "cli.json"}))
    ],
    "mappings_path",
    "cli.json",
    "CLI should win for mappings_path"
)]
fn test_layer_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] field: &str,
    #[case] expected: &str,
    #[case] message: &str,
) {
    let mut composer = MergeComposer::new();

    for (layer_type, value) in layers {
        apply_layer(&mut composer, layer_type, value);
    }

    let config =
        ReviewPoliceConfig::merge_from_layers(composer.layers()).expect("merge should succeed");

    let actual = match field {
        "owner" => config.owner.as_deref(),
        "github_token" => config.github_token.as_deref(),
        "mode" => config.mode.as_deref(),
        "mappings_path" => Some(config.mappings_path.as_str()),
        _ => panic!("unknown field: {field}"),
    };

    assert_eq!(actual, Some(expected), "{message}");
}

#[rstest]
fn defaults_apply_when_no_sources_provided() {
    let mut composer = MergeComposer::new();
    composer.push_defaults(json!({"github_token": null, "owner": null}));

    let config = ReviewPoliceConfig::merge_from_layers(composer.layers())
        .expect("merge should succeed with empty defaults");

    assert!(config.github_token.is_none(), "token should be None");
    assert!(config.webhook_secret.is_none(), "secret should be None");
    assert_eq!(config.mappings_path, "account-mappings.json");
    assert_eq!(config.listen_addr, "0.0.0.0:3000");
    assert_eq!(
        config.grace_window_ms, 5000,
        "grace window should default to five seconds"
    );
    assert_eq!(
        config.pending_ttl_secs, 600,
        "idle entries should default to ten minutes"
    );
}

#[rstest]
fn full_precedence_chain() {
    let mut composer = MergeComposer::new();
    composer.push_defaults(json!({
        "owner": "default",
        "repo": "default-repo",
        "grace_window_ms": 1000
    }));
    composer.push_file(
        json!({"owner": "file", "repo": "file-repo", "grace_window_ms": 2000}),
        None,
    );
    composer.push_environment(json!({"owner": "env", "grace_window_ms": 3000}));
    composer.push_cli(json!({"owner": "cli"}));

    let config =
        ReviewPoliceConfig::merge_from_layers(composer.layers()).expect("merge should succeed");

    assert_eq!(config.owner.as_deref(), Some("cli"), "CLI wins for owner");
    assert_eq!(
        config.repo.as_deref(),
        Some("file-repo"),
        "file wins for repo (no env/cli override)"
    );
    assert_eq!(
        config.grace_window_ms, 3000,
        "environment wins for grace_window_ms"
    );
}

#[rstest]
fn partial_overrides_preserve_lower_values() {
    let config = build_config_from_layers(&[
        ("defaults", json!({"discord_channel_id": "100", "discord_token": "default-bot"})),
        ("cli", json!({"discord_channel_id": "200"})),
    ]);

    assert_eq!(
        config.discord_channel_id.as_deref(),
        Some("200"),
        "CLI should override the channel"
    );
    assert_eq!(
        config.discord_token.as_deref(),
        Some("default-bot"),
        "default bot token should be preserved"
    );
}
