//! Focused unit tests covering match configuration and execution.

use super::helpers::{
    StubMatcherBuilder, drawn_collection, snapped_route, workspace, write_collection, write_utf8,
};
use super::*;
use crate::match_cmd::{MatchConfig, config_from_layers_for_test, load_features, run_match_with};
use camino::Utf8PathBuf;
use rstest::rstest;
use serde_json::json;
use std::time::Duration;
use trailsnap_core::{MatchError, Profile};
use trailsnap_data::matching::test_support::StubMapMatcher;

fn args_for(features: &Utf8PathBuf) -> MatchArgs {
    MatchArgs {
        features: Some(features.clone()),
        access_token: Some("pk.test".to_owned()),
        ..MatchArgs::default()
    }
}

fn config_for(features: Utf8PathBuf) -> MatchConfig {
    MatchConfig {
        features,
        access_token: "pk.test".to_owned(),
        base_url: "https://api.mapbox.com".to_owned(),
        profile: Profile::Driving,
        timeout: Duration::from_secs(30),
        output: None,
    }
}

#[rstest]
#[case::features(None, Some("pk.test"), ARG_MATCH_FEATURES, ENV_MATCH_FEATURES)]
#[case::token(Some("drawn.geojson"), None, ARG_MATCH_ACCESS_TOKEN, ENV_MATCH_ACCESS_TOKEN)]
#[case::blank_token(
    Some("drawn.geojson"),
    Some("  "),
    ARG_MATCH_ACCESS_TOKEN,
    ENV_MATCH_ACCESS_TOKEN
)]
fn converting_without_required_fields_errors(
    #[case] features: Option<&str>,
    #[case] token: Option<&str>,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let args = MatchArgs {
        features: features.map(Utf8PathBuf::from),
        access_token: token.map(str::to_owned),
        ..MatchArgs::default()
    };

    let err = MatchConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn match_config_applies_defaults() {
    let features = Utf8PathBuf::from("drawn.geojson");

    let config = MatchConfig::try_from(args_for(&features)).expect("config should build");

    assert_eq!(config, config_for(features));
}

#[rstest]
fn match_config_rejects_unknown_profile() {
    let args = MatchArgs {
        profile: Some("flying".to_owned()),
        ..args_for(&Utf8PathBuf::from("drawn.geojson"))
    };

    let err = MatchConfig::try_from(args).expect_err("unknown profile should error");
    match err {
        CliError::InvalidProfile(source) => assert_eq!(source.0, "flying"),
        other => panic!("expected InvalidProfile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_features() {
    let (_tmp, root) = workspace();
    let config = config_for(root.join("absent.geojson"));

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_MATCH_FEATURES),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = workspace();
    let features = root.join("drawn.geojson");
    std::fs::create_dir(features.as_std_path()).expect("features directory");
    let config = config_for(features.clone());

    let err = config
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_MATCH_FEATURES);
            assert_eq!(path, features);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_features_keeps_collection_order() {
    let (_tmp, root) = workspace();
    let path = root.join("drawn.geojson");
    write_collection(&path, &drawn_collection());

    let features = load_features(&path).expect("features should load");

    assert_eq!(features.len(), 2);
    assert_eq!(features.last().map(|feature| feature.id.get()), Some(2));
}

#[rstest]
fn load_features_rejects_invalid_json() {
    let (_tmp, root) = workspace();
    let path = root.join("drawn.geojson");
    write_utf8(&path, b"{ not geojson");

    let err = load_features(&path).expect_err("invalid json should error");
    match err {
        CliError::ParseFeatures { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected ParseFeatures, found {other:?}"),
    }
}

#[rstest]
fn load_features_rejects_empty_collection() {
    let (_tmp, root) = workspace();
    let path = root.join("drawn.geojson");
    write_collection(&path, &json!({ "type": "FeatureCollection", "features": [] }));

    let err = load_features(&path).expect_err("empty collection should error");
    assert!(matches!(err, CliError::NoFeatures { .. }), "found {err:?}");
}

#[rstest]
fn load_features_reports_read_errors() {
    let (_tmp, root) = workspace();
    let path = root.join("absent.geojson");

    let err = load_features(&path).expect_err("missing file should error");
    assert!(matches!(err, CliError::ReadFeatures { .. }), "found {err:?}");
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "timeout_secs": "soon" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "access_token": "pk.file",
            "base_url": "http://from-file:8080",
            "profile": "cycling",
        }),
        None,
    );
    composer.push_environment(json!({
        "features": "from-env.geojson",
        "access_token": "pk.env",
    }));
    composer.push_cli(json!({ "access_token": "pk.cli" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");

    assert_eq!(config.features, Utf8PathBuf::from("from-env.geojson"));
    assert_eq!(config.access_token, "pk.cli");
    assert_eq!(config.base_url, "http://from-file:8080");
    assert_eq!(config.profile, Profile::Cycling);
}

#[rstest]
fn run_match_prints_route_and_summary() {
    let (_tmp, root) = workspace();
    let path = root.join("drawn.geojson");
    write_collection(&path, &drawn_collection());
    let matcher = StubMapMatcher::with_route(snapped_route());
    let mut stdout = Vec::new();

    run_match_with(
        args_for(&path),
        &StubMatcherBuilder(matcher.clone()),
        &mut stdout,
    )
    .expect("match should succeed");

    let requests = matcher.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests.first().map(|request| request.coordinates_param()),
        Some("76.9,43.24;76.91,43.25".to_owned())
    );

    let output = String::from_utf8(stdout).expect("stdout utf-8");
    assert!(output.contains("\"FeatureCollection\""), "{output}");
    assert!(output.contains("\"stroke\": \"#DA4E41\""), "{output}");
    assert!(
        output.ends_with("Trip duration: 2 min.\n1. Head north\n2. Arrive\n"),
        "{output}"
    );
}

#[rstest]
fn run_match_writes_route_file() {
    let (_tmp, root) = workspace();
    let path = root.join("drawn.geojson");
    let output = root.join("out").join("route.geojson");
    write_collection(&path, &drawn_collection());
    let args = MatchArgs {
        output: Some(output.clone()),
        ..args_for(&path)
    };
    let mut stdout = Vec::new();

    run_match_with(
        args,
        &StubMatcherBuilder(StubMapMatcher::with_route(snapped_route())),
        &mut stdout,
    )
    .expect("match should succeed");

    let written = std::fs::read_to_string(output.as_std_path()).expect("route file");
    let route: geojson::FeatureCollection =
        serde_json::from_str(&written).expect("route file is GeoJSON");
    assert_eq!(route.features.len(), 1);
    assert_eq!(
        String::from_utf8(stdout).expect("stdout utf-8"),
        "Trip duration: 2 min.\n1. Head north\n2. Arrive\n"
    );
}

#[rstest]
fn run_match_reports_service_failures() {
    let (_tmp, root) = workspace();
    let path = root.join("drawn.geojson");
    write_collection(&path, &drawn_collection());
    let matcher = StubMapMatcher::with_error(MatchError::Service {
        code: "NoMatch".to_owned(),
        message: "Could not match the trace".to_owned(),
    });
    let mut stdout = Vec::new();

    let err = run_match_with(args_for(&path), &StubMatcherBuilder(matcher), &mut stdout)
        .expect_err("service failure should surface");

    match err {
        CliError::MatchFailed { message } => {
            assert!(message.starts_with("NoMatch - Could not match the trace."), "{message}");
        }
        other => panic!("expected MatchFailed, found {other:?}"),
    }
    assert!(stdout.is_empty());
}

#[rstest]
fn run_match_skips_when_last_feature_is_not_a_line() {
    let (_tmp, root) = workspace();
    let path = root.join("drawn.geojson");
    write_collection(
        &path,
        &json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[76.9, 43.24], [76.91, 43.25]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": { "type": "Point", "coordinates": [76.88, 43.23] }
                }
            ]
        }),
    );
    let matcher = StubMapMatcher::with_route(snapped_route());
    let mut stdout = Vec::new();

    let err = run_match_with(
        args_for(&path),
        &StubMatcherBuilder(matcher.clone()),
        &mut stdout,
    )
    .expect_err("point feature cannot be matched");

    assert!(matches!(err, CliError::NothingToMatch { .. }), "found {err:?}");
    assert!(matcher.requests().is_empty());
}
