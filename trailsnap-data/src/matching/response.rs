//! Map Matching API response types.
//!
//! See: <https://docs.mapbox.com/api/navigation/map-matching/#map-matching-response-object>

use serde::Deserialize;

/// Top-level Map Matching response.
///
/// `code` is `"Ok"` on success; any other value carries an explanatory
/// `message` and no matchings.
#[derive(Debug, Deserialize)]
pub struct MatchingResponse {
    /// Status code from the service, e.g. `"Ok"`, `"NoMatch"`,
    /// `"InvalidInput"` or `"TooManyCoordinates"`.
    pub code: String,

    /// Error description when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate matchings, best first.
    #[serde(default)]
    pub matchings: Vec<Matching>,
}

impl MatchingResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// One snapped route through the trace.
#[derive(Debug, Deserialize)]
pub struct Matching {
    /// Route geometry, requested as GeoJSON.
    pub geometry: MatchingGeometry,
    /// Estimated travel time in seconds.
    pub duration: f64,
    /// Travelled distance in metres.
    pub distance: Option<f64>,
    /// Confidence in `[0, 1]`.
    pub confidence: Option<f64>,
    /// Legs between consecutive tracepoints.
    #[serde(default)]
    pub legs: Vec<MatchingLeg>,
}

/// GeoJSON `LineString` geometry of a matching.
#[derive(Debug, Deserialize)]
pub struct MatchingGeometry {
    /// Geometry type; `"LineString"` for matchings.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lon, lat]` positions.
    pub coordinates: Vec<Vec<f64>>,
}

/// A leg of a matching.
#[derive(Debug, Deserialize)]
pub struct MatchingLeg {
    /// Turn-by-turn steps, present when `steps=true` was requested.
    #[serde(default)]
    pub steps: Vec<MatchingStep>,
}

/// A single manoeuvre step.
#[derive(Debug, Deserialize)]
pub struct MatchingStep {
    /// Manoeuvre performed at the start of the step.
    pub maneuver: Maneuver,
}

/// Manoeuvre details.
#[derive(Debug, Deserialize)]
pub struct Maneuver {
    /// Human-readable instruction.
    #[serde(default)]
    pub instruction: String,
}
