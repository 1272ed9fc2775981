//! Error types emitted by the trailsnap CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use trailsnap_core::ProfileParseError;
use trailsnap_data::HttpMatcherBuildError;
use trailsnap_session::{SessionBuildError, SessionError};

/// Errors emitted by the trailsnap CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable supplying the option.
        env: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The travel profile is not recognised.
    #[error(transparent)]
    InvalidProfile(#[from] ProfileParseError),
    /// Reading the feature collection failed.
    #[error("failed to read features from {path:?}: {source}")]
    ReadFeatures {
        /// Input path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The feature collection is not valid GeoJSON.
    #[error("failed to parse GeoJSON feature collection at {path:?}: {source}")]
    ParseFeatures {
        /// Input path.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The feature collection holds no features with geometry.
    #[error("{path:?} contains no drawn features")]
    NoFeatures {
        /// Input path.
        path: Utf8PathBuf,
    },
    /// Constructing the HTTP matcher failed.
    #[error("failed to build map matcher for {base_url:?}: {source}")]
    BuildMatcher {
        /// Service root.
        base_url: String,
        /// Construction failure.
        #[source]
        source: HttpMatcherBuildError,
    },
    /// Building the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Assembling the session failed.
    #[error(transparent)]
    BuildSession(#[from] SessionBuildError),
    /// The session stopped unexpectedly.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The matching service reported a failure.
    #[error("map matching failed: {message}")]
    MatchFailed {
        /// Alert text shown to the user.
        message: String,
    },
    /// No route was produced and no failure was reported.
    #[error("the last feature in {path:?} is not a line with at least two valid points")]
    NothingToMatch {
        /// Input path.
        path: Utf8PathBuf,
    },
    /// Serialising the route failed.
    #[error("failed to serialize route: {0}")]
    SerializeRoute(#[source] serde_json::Error),
    /// Writing the route file failed.
    #[error("failed to write route to {path:?}: {source}")]
    WriteRoute {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
