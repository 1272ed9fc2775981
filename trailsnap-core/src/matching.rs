//! Map-matching requests, results and the matcher seam.
//!
//! [`MatchRequest`] turns a [`DrawnPath`] into the parameters a map-matching
//! service expects: `lon,lat` pairs joined with `;` and a parallel list of
//! search radii. [`MapMatcher`] abstracts the service itself so the pipeline
//! only sees an asynchronous request/response call.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use geo::{Coord, LineString};
use thiserror::Error;

use crate::DrawnPath;

/// Search radius applied to every drawn point, in metres.
pub const DEFAULT_RADIUS_METRES: u32 = 25;

/// Reference included in user-facing alerts about failed matches.
pub const MATCHING_ERRORS_DOC_URL: &str =
    "https://docs.mapbox.com/api/navigation/map-matching/#map-matching-api-errors";

/// Travel mode used by the matching service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Profile {
    /// Motor vehicle routing.
    #[default]
    Driving,
    /// Pedestrian routing.
    Walking,
    /// Bicycle routing.
    Cycling,
}

impl Profile {
    /// Path segment used by the matching endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown profile name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel profile {0:?} (expected driving, walking or cycling)")]
pub struct ProfileParseError(pub String);

impl FromStr for Profile {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(Self::Driving),
            "walking" => Ok(Self::Walking),
            "cycling" => Ok(Self::Cycling),
            _ => Err(ProfileParseError(s.to_owned())),
        }
    }
}

/// Errors returned by [`MatchRequest::with_radii`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchRequestError {
    /// The radius list does not line up with the coordinates.
    #[error("expected {expected} radii, one per coordinate, found {actual}")]
    RadiusCountMismatch {
        /// Number of coordinates in the path.
        expected: usize,
        /// Number of radii supplied.
        actual: usize,
    },
}

/// A map-matching request for one drawn path.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trailsnap_core::{DrawnPath, MatchRequest, Profile};
///
/// let path = DrawnPath::new(vec![
///     Coord { x: 76.9, y: 43.24 },
///     Coord { x: 76.91, y: 43.25 },
/// ])?;
/// let request = MatchRequest::new(path, Profile::Driving);
/// assert_eq!(request.coordinates_param(), "76.9,43.24;76.91,43.25");
/// assert_eq!(request.radiuses_param(), "25;25");
/// # Ok::<(), trailsnap_core::ExtractionError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    path: DrawnPath,
    radii: Vec<u32>,
    profile: Profile,
}

impl MatchRequest {
    /// Build a request using [`DEFAULT_RADIUS_METRES`] for every point.
    #[must_use]
    pub fn new(path: DrawnPath, profile: Profile) -> Self {
        let radii = vec![DEFAULT_RADIUS_METRES; path.len()];
        Self {
            path,
            radii,
            profile,
        }
    }

    /// Build a request with explicit per-point radii.
    ///
    /// # Errors
    ///
    /// Returns [`MatchRequestError::RadiusCountMismatch`] unless there is
    /// exactly one radius per point.
    pub fn with_radii(
        path: DrawnPath,
        radii: Vec<u32>,
        profile: Profile,
    ) -> Result<Self, MatchRequestError> {
        if radii.len() != path.len() {
            return Err(MatchRequestError::RadiusCountMismatch {
                expected: path.len(),
                actual: radii.len(),
            });
        }
        Ok(Self {
            path,
            radii,
            profile,
        })
    }

    /// Points to match.
    #[must_use]
    pub fn coordinates(&self) -> &[Coord<f64>] {
        self.path.points()
    }

    /// Search radius per point, in metres.
    #[must_use]
    pub fn radii(&self) -> &[u32] {
        &self.radii
    }

    /// Travel profile.
    #[must_use]
    pub const fn profile(&self) -> Profile {
        self.profile
    }

    /// Coordinates formatted as `lon,lat` pairs joined with `;`.
    #[must_use]
    pub fn coordinates_param(&self) -> String {
        self.path
            .points()
            .iter()
            .map(|point| format!("{},{}", point.x, point.y))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Radii joined with `;`.
    #[must_use]
    pub fn radiuses_param(&self) -> String {
        self.radii
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// The first matching returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRoute {
    /// Snapped route geometry.
    pub geometry: LineString<f64>,
    /// Trip duration.
    pub duration: Duration,
    /// Trip distance in metres, when reported.
    pub distance_metres: Option<f64>,
    /// Service confidence in `[0.0, 1.0]`, when reported.
    pub confidence: Option<f64>,
    /// Turn-by-turn instructions across all legs, in order.
    pub instructions: Vec<String>,
}

impl MatchedRoute {
    /// Construct a route with only geometry and duration.
    #[must_use]
    pub const fn new(geometry: LineString<f64>, duration: Duration) -> Self {
        Self {
            geometry,
            duration,
            distance_metres: None,
            confidence: None,
            instructions: Vec::new(),
        }
    }

    /// Attach step instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }
}

/// Reasons a map-matching request produced no route.
///
/// Every variant is terminal for its request: nothing is rendered and the
/// request is not retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The service answered with a status code other than `"Ok"`.
    #[error("{code} - {message}")]
    Service {
        /// Status code reported by the service.
        code: String,
        /// Human-readable message reported by the service.
        message: String,
    },
    /// The service answered `"Ok"` without any matching.
    #[error("the matching service returned no matchings")]
    NoMatchings,
    /// No response arrived before the deadline.
    #[error("map-matching request timed out after {timeout_ms} ms")]
    Timeout {
        /// Deadline that expired, in milliseconds.
        timeout_ms: u64,
    },
    /// The request failed before a response was available.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL without credentials.
        url: String,
        /// Description of the failure.
        message: String,
    },
    /// The service returned an HTTP error without a usable body.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Request URL without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Description of the failure.
        message: String,
    },
    /// The matching task stopped before producing an outcome.
    #[error("map-matching request stopped unexpectedly: {message}")]
    Aborted {
        /// Description of the failure.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("failed to parse matching response: {message}")]
    Parse {
        /// Description of the failure.
        message: String,
    },
}

impl MatchError {
    /// Build a timeout error from the expired deadline.
    #[must_use]
    pub fn timeout(deadline: Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Text shown to the user when this error ends a request.
    ///
    /// # Examples
    /// ```
    /// use trailsnap_core::MatchError;
    ///
    /// let err = MatchError::Service {
    ///     code: "NoMatch".to_owned(),
    ///     message: "Could not match the trace".to_owned(),
    /// };
    /// assert!(err.alert_message().starts_with("NoMatch - Could not match the trace.\n\n"));
    /// ```
    #[must_use]
    pub fn alert_message(&self) -> String {
        format!("{self}.\n\nFor more information: {MATCHING_ERRORS_DOC_URL}")
    }
}

/// Asynchronous map-matching service.
///
/// Implementations issue at most one attempt per call and classify every
/// failure as a [`MatchError`].
#[async_trait]
pub trait MapMatcher: Send + Sync {
    /// Snap `request` onto the road network.
    async fn match_path(&self, request: &MatchRequest) -> Result<MatchedRoute, MatchError>;
}
