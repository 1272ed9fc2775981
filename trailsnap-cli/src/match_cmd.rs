//! `match` command: snap the last drawn line of a GeoJSON file.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geojson::FeatureCollection;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use trailsnap_core::{DrawnFeature, DrawnFeatures, MapMatcher, Profile, ROUTE_OVERLAY_ID};
use trailsnap_data::{HttpMapMatcher, HttpMapMatcherConfig};
use trailsnap_session::{SessionBuilder, SessionConfig, SessionEvent, SessionParts};

use crate::headless::{AlertLog, HeadlessSurface, PanelText};
use crate::{
    ARG_MATCH_ACCESS_TOKEN, ARG_MATCH_BASE_URL, ARG_MATCH_FEATURES, ARG_MATCH_OUTPUT,
    ARG_MATCH_PROFILE, ARG_MATCH_TIMEOUT_SECS, CliError, ENV_MATCH_ACCESS_TOKEN,
    ENV_MATCH_FEATURES, fs,
};

/// CLI arguments for the `match` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a GeoJSON feature collection as exported by a drawing \
                 tool, snap its last line onto the road network with the Map \
                 Matching API, and print the trip summary. The access token \
                 can come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Snap a drawn line onto the road network"
)]
#[ortho_config(prefix = "TRAILSNAP")]
pub(crate) struct MatchArgs {
    /// Path to a GeoJSON feature collection.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) features: Option<Utf8PathBuf>,
    /// Map Matching API access token.
    #[arg(long = ARG_MATCH_ACCESS_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    /// Service root (default "https://api.mapbox.com").
    #[arg(long = ARG_MATCH_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Travel profile: driving, walking or cycling.
    #[arg(long = ARG_MATCH_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// Request deadline in seconds.
    #[arg(long = ARG_MATCH_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Write the snapped route here instead of stdout.
    #[arg(long = ARG_MATCH_OUTPUT, short = 'o', value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl MatchArgs {
    pub(crate) fn into_config(self) -> Result<MatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatchConfig::try_from(merged)
    }
}

/// Resolved `match` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchConfig {
    /// GeoJSON input.
    pub(crate) features: Utf8PathBuf,
    /// Credential for the matching service.
    pub(crate) access_token: String,
    /// Service root.
    pub(crate) base_url: String,
    /// Travel profile.
    pub(crate) profile: Profile,
    /// Request deadline.
    pub(crate) timeout: Duration,
    /// Route output file.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl MatchConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.features, ARG_MATCH_FEATURES)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_profile(self.profile)
            .with_request_timeout(self.timeout)
    }
}

impl TryFrom<MatchArgs> for MatchConfig {
    type Error = CliError;

    fn try_from(args: MatchArgs) -> Result<Self, Self::Error> {
        let features = args.features.ok_or(CliError::MissingArgument {
            field: ARG_MATCH_FEATURES,
            env: ENV_MATCH_FEATURES,
        })?;
        let access_token = args
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_MATCH_ACCESS_TOKEN,
                env: ENV_MATCH_ACCESS_TOKEN,
            })?;

        let defaults = HttpMapMatcherConfig::default();
        let base_url = args.base_url.unwrap_or(defaults.base_url);
        let profile = args
            .profile
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        let timeout = args
            .timeout_secs
            .map_or(defaults.timeout, Duration::from_secs);

        Ok(Self {
            features,
            access_token,
            base_url,
            profile,
            timeout,
            output: args.output,
        })
    }
}

/// Builds the matcher for the current invocation.
pub(crate) trait MatcherBuilder {
    fn build(&self, config: &MatchConfig) -> Result<Arc<dyn MapMatcher>, CliError>;
}

pub(crate) struct HttpMatcherBuilder;

impl MatcherBuilder for HttpMatcherBuilder {
    fn build(&self, config: &MatchConfig) -> Result<Arc<dyn MapMatcher>, CliError> {
        let matcher_config = HttpMapMatcherConfig::new(config.access_token.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout);
        let matcher = HttpMapMatcher::with_config(matcher_config).map_err(|source| {
            CliError::BuildMatcher {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Arc::new(matcher))
    }
}

/// What a finished match produced.
#[derive(Debug)]
pub(crate) struct MatchReport {
    pub(crate) route: FeatureCollection,
    pub(crate) panel: String,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_match_with(args, &HttpMatcherBuilder, &mut stdout)
}

pub(crate) fn run_match_with(
    args: MatchArgs,
    builder: &dyn MatcherBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let report = execute_match(&config, builder)?;
    write_report(&config, &report, writer)
}

fn execute_match(
    config: &MatchConfig,
    builder: &dyn MatcherBuilder,
) -> Result<MatchReport, CliError> {
    let features = load_features(&config.features)?;
    let matcher = builder.build(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let parts = runtime.block_on(run_session(config.session_config(), matcher, features))?;
    report_from_parts(&config.features, parts)
}

async fn run_session(
    session_config: SessionConfig,
    matcher: Arc<dyn MapMatcher>,
    features: Vec<DrawnFeature>,
) -> Result<SessionParts<HeadlessSurface, PanelText, AlertLog>, CliError> {
    let handle = SessionBuilder::new(session_config)
        .surface(HeadlessSurface::default())
        .instruction_panel(PanelText::default())
        .alerts(AlertLog::default())
        .matcher(matcher)
        .build()?
        .spawn();
    handle.send(SessionEvent::DrawCreate(features))?;
    handle.settle().await?;
    Ok(handle.shutdown().await?)
}

fn report_from_parts(
    input: &Utf8Path,
    parts: SessionParts<HeadlessSurface, PanelText, AlertLog>,
) -> Result<MatchReport, CliError> {
    if let Some(feature) = parts.surface.layer_feature(ROUTE_OVERLAY_ID) {
        return Ok(MatchReport {
            route: FeatureCollection {
                bbox: None,
                features: vec![feature],
                foreign_members: None,
            },
            panel: parts.region.as_str().to_owned(),
        });
    }
    match parts.alerts.messages() {
        [] => Err(CliError::NothingToMatch {
            path: input.to_path_buf(),
        }),
        messages => Err(CliError::MatchFailed {
            message: messages.join("\n"),
        }),
    }
}

/// Loads the drawn features from a GeoJSON feature collection.
pub(crate) fn load_features(path: &Utf8Path) -> Result<Vec<DrawnFeature>, CliError> {
    let text = fs::read_utf8_file(path).map_err(|source| CliError::ReadFeatures {
        path: path.to_path_buf(),
        source,
    })?;
    let collection: FeatureCollection =
        serde_json::from_str(&text).map_err(|source| CliError::ParseFeatures {
            path: path.to_path_buf(),
            source,
        })?;
    let features = DrawnFeatures::from_feature_collection(collection);
    if features.is_empty() {
        return Err(CliError::NoFeatures {
            path: path.to_path_buf(),
        });
    }
    Ok(features.into_features())
}

fn write_report(
    config: &MatchConfig,
    report: &MatchReport,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(&report.route).map_err(CliError::SerializeRoute)?;
    if let Some(output) = &config.output {
        fs::write_utf8_file(output, payload.as_bytes()).map_err(|source| CliError::WriteRoute {
            path: output.clone(),
            source,
        })?;
        info!("route written to {output}");
    } else {
        writeln!(writer, "{payload}").map_err(CliError::WriteOutput)?;
    }
    writeln!(writer, "{}", report.panel).map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MatchConfig, CliError> {
    let merged = MatchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MatchConfig::try_from(merged)
}
