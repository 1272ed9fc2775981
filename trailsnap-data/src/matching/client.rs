//! `MapMatcher` implementation over the Map Matching HTTP API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use geo::{Coord, LineString};
use log::debug;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use trailsnap_core::{MapMatcher, MatchError, MatchRequest, MatchedRoute};

use super::response::{Matching, MatchingResponse};

/// Default user agent for matching requests.
pub const DEFAULT_USER_AGENT: &str = "trailsnap-matching/0.1";

/// Default service root.
const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Default profile namespace, as in `mapbox/driving`.
const DEFAULT_PROFILE_NAMESPACE: &str = "mapbox";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for [`HttpMapMatcher`] construction failures.
#[derive(Debug, Error)]
pub enum HttpMatcherBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configuration carries no access token.
    #[error("an access token is required for map matching")]
    MissingAccessToken,
}

/// Configuration for [`HttpMapMatcher`].
///
/// The `Debug` output redacts the access token.
#[derive(Clone)]
pub struct HttpMapMatcherConfig {
    /// Service root (e.g., `"https://api.mapbox.com"`).
    pub base_url: String,
    /// Credential sent as the `access_token` query parameter.
    pub access_token: String,
    /// Prefix of the profile path segment (e.g., `"mapbox"`).
    pub profile_namespace: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl fmt::Debug for HttpMapMatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMapMatcherConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("profile_namespace", &self.profile_namespace)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpMapMatcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            access_token: String::new(),
            profile_namespace: DEFAULT_PROFILE_NAMESPACE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpMapMatcherConfig {
    /// Create a configuration for the default service with `access_token`.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Point at a different service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the profile namespace.
    #[must_use]
    pub fn with_profile_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.profile_namespace = namespace.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Map matcher backed by the Map Matching HTTP API.
///
/// Each call makes a single attempt. The access token travels only in the
/// query string and never appears in returned errors or logs.
#[derive(Debug)]
pub struct HttpMapMatcher {
    client: Client,
    config: HttpMapMatcherConfig,
}

impl HttpMapMatcher {
    /// Create a matcher for the default service.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client fails to
    /// build.
    pub fn new(access_token: impl Into<String>) -> Result<Self, HttpMatcherBuildError> {
        Self::with_config(HttpMapMatcherConfig::new(access_token))
    }

    /// Create a matcher with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client fails to
    /// build.
    pub fn with_config(config: HttpMapMatcherConfig) -> Result<Self, HttpMatcherBuildError> {
        if config.access_token.trim().is_empty() {
            return Err(HttpMatcherBuildError::MissingAccessToken);
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(HttpMatcherBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HttpMapMatcherConfig {
        &self.config
    }

    /// Build the request URL without its query string.
    ///
    /// The URL format is
    /// `{base_url}/matching/v5/{namespace}/{profile}/{coordinates}`.
    fn build_matching_url(&self, request: &MatchRequest) -> String {
        format!(
            "{}/matching/v5/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile_namespace,
            request.profile(),
            request.coordinates_param()
        )
    }

    /// Query parameters, credential last.
    fn query_params(&self, request: &MatchRequest) -> [(&'static str, String); 4] {
        [
            ("geometries", "geojson".to_owned()),
            ("radiuses", request.radiuses_param()),
            ("steps", "true".to_owned()),
            ("access_token", self.config.access_token.clone()),
        ]
    }

    /// Convert a reqwest error to a `MatchError`.
    ///
    /// The URL is stripped from the error first because it carries the token.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> MatchError {
        let error = error.without_url();
        if error.is_timeout() {
            return MatchError::timeout(self.config.timeout);
        }

        if let Some(status) = error.status() {
            return MatchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        MatchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Interpret a response body received with `status`.
///
/// Error statuses whose body still decodes to a service error report that
/// error, so the user sees the service's own code and message.
fn classify_response(
    url: &str,
    status: StatusCode,
    body: &str,
) -> Result<MatchedRoute, MatchError> {
    let decoded = serde_json::from_str::<MatchingResponse>(body);
    if !status.is_success() {
        return match decoded {
            Ok(payload) if !payload.is_ok() => convert_response(payload),
            _ => Err(MatchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_owned(),
            }),
        };
    }

    let payload = decoded.map_err(|err| MatchError::Parse {
        message: err.to_string(),
    })?;
    convert_response(payload)
}

/// Convert a decoded response to the first matched route.
fn convert_response(response: MatchingResponse) -> Result<MatchedRoute, MatchError> {
    if !response.is_ok() {
        return Err(MatchError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let matching = response
        .matchings
        .into_iter()
        .next()
        .ok_or(MatchError::NoMatchings)?;
    convert_matching(matching)
}

fn convert_matching(matching: Matching) -> Result<MatchedRoute, MatchError> {
    if matching.geometry.kind != "LineString" {
        return Err(MatchError::Parse {
            message: format!(
                "expected LineString geometry, found {}",
                matching.geometry.kind
            ),
        });
    }

    let points = matching
        .geometry
        .coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(MatchError::Parse {
                message: "position has fewer than two ordinates".to_owned(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if points.len() < 2 {
        return Err(MatchError::Parse {
            message: format!("matched geometry has {} positions", points.len()),
        });
    }

    let duration =
        Duration::try_from_secs_f64(matching.duration).map_err(|err| MatchError::Parse {
            message: format!("invalid duration {}: {err}", matching.duration),
        })?;

    let instructions = matching
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| step.maneuver.instruction)
        .filter(|instruction| !instruction.is_empty())
        .collect();

    Ok(MatchedRoute {
        geometry: LineString::new(points),
        duration,
        distance_metres: matching.distance,
        confidence: matching.confidence,
        instructions,
    })
}

#[async_trait]
impl MapMatcher for HttpMapMatcher {
    async fn match_path(&self, request: &MatchRequest) -> Result<MatchedRoute, MatchError> {
        let url = self.build_matching_url(request);
        debug!(
            "matching {} points with profile {}",
            request.coordinates().len(),
            request.profile()
        );

        let response = self
            .client
            .get(&url)
            .query(&self.query_params(request))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &url))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &url))?;

        classify_response(&url, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::response::MatchingGeometry;
    use rstest::{fixture, rstest};
    use trailsnap_core::{DrawnPath, Profile};

    const TOKEN: &str = "pk.test-secret";

    fn sample_request() -> MatchRequest {
        let path = DrawnPath::new(vec![
            Coord { x: 76.9, y: 43.24 },
            Coord { x: 76.91, y: 43.25 },
        ])
        .expect("valid path");
        MatchRequest::new(path, Profile::Driving)
    }

    #[fixture]
    fn request() -> MatchRequest {
        sample_request()
    }

    #[fixture]
    fn matcher() -> HttpMapMatcher {
        HttpMapMatcher::with_config(
            HttpMapMatcherConfig::new(TOKEN).with_base_url("https://matching.example.com/"),
        )
        .expect("matcher should build")
    }

    fn ok_body(duration: f64) -> String {
        format!(
            r#"{{
                "code": "Ok",
                "matchings": [{{
                    "duration": {duration},
                    "distance": 1520.0,
                    "confidence": 0.8,
                    "geometry": {{
                        "type": "LineString",
                        "coordinates": [[76.9, 43.24], [76.905, 43.245], [76.91, 43.25]]
                    }},
                    "legs": [{{"steps": [
                        {{"maneuver": {{"instruction": "Head north."}}}},
                        {{"maneuver": {{"instruction": ""}}}},
                        {{"maneuver": {{"instruction": "You have arrived."}}}}
                    ]}}]
                }}]
            }}"#
        )
    }

    #[rstest]
    fn build_matching_url_formats_path(matcher: HttpMapMatcher, request: MatchRequest) {
        assert_eq!(
            matcher.build_matching_url(&request),
            "https://matching.example.com/matching/v5/mapbox/driving/76.9,43.24;76.91,43.25"
        );
    }

    #[rstest]
    fn query_carries_radii_steps_and_token(matcher: HttpMapMatcher, request: MatchRequest) {
        let params = matcher.query_params(&request);
        assert_eq!(
            params,
            [
                ("geometries", "geojson".to_owned()),
                ("radiuses", "25;25".to_owned()),
                ("steps", "true".to_owned()),
                ("access_token", TOKEN.to_owned()),
            ]
        );
    }

    #[rstest]
    fn overflowing_duration_body_is_parse_error() {
        let err = classify_response("u", StatusCode::OK, &ok_body(1e20))
            .expect_err("duration beyond Duration::MAX should fail");

        assert!(matches!(err, MatchError::Parse { .. }), "found {err:?}");
    }

    #[rstest]
    fn success_yields_first_matching() {
        let route = classify_response("u", StatusCode::OK, &ok_body(125.0)).expect("route");

        assert_eq!(route.geometry.0.len(), 3);
        assert_eq!(route.duration, Duration::from_secs(125));
        assert_eq!(route.distance_metres, Some(1520.0));
        assert_eq!(route.confidence, Some(0.8));
        assert_eq!(
            route.instructions,
            vec!["Head north.".to_owned(), "You have arrived.".to_owned()]
        );
    }

    #[rstest]
    #[case(StatusCode::OK)]
    #[case(StatusCode::UNPROCESSABLE_ENTITY)]
    fn service_code_is_reported(#[case] status: StatusCode) {
        let body = r#"{"code": "NoMatch", "message": "Could not match the trace."}"#;

        let err = classify_response("u", status, body).expect_err("should fail");

        assert_eq!(
            err,
            MatchError::Service {
                code: "NoMatch".to_owned(),
                message: "Could not match the trace.".to_owned(),
            }
        );
    }

    #[rstest]
    fn error_status_without_service_body_is_http_error() {
        let err = classify_response("https://m.example.com/x", StatusCode::BAD_GATEWAY, "<html>")
            .expect_err("should fail");

        assert_eq!(
            err,
            MatchError::Http {
                url: "https://m.example.com/x".to_owned(),
                status: 502,
                message: "Bad Gateway".to_owned(),
            }
        );
    }

    #[rstest]
    fn undecodable_success_body_is_parse_error() {
        let err = classify_response("u", StatusCode::OK, "not json").expect_err("should fail");
        assert!(matches!(err, MatchError::Parse { .. }));
    }

    #[rstest]
    fn ok_without_matchings_is_reported() {
        let err = classify_response("u", StatusCode::OK, r#"{"code": "Ok", "matchings": []}"#)
            .expect_err("should fail");
        assert_eq!(err, MatchError::NoMatchings);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(1e20)]
    fn invalid_duration_is_parse_error(#[case] duration: f64) {
        let response = MatchingResponse {
            code: "Ok".to_owned(),
            message: None,
            matchings: vec![Matching {
                geometry: MatchingGeometry {
                    kind: "LineString".to_owned(),
                    coordinates: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
                },
                duration,
                distance: None,
                confidence: None,
                legs: Vec::new(),
            }],
        };

        let err = convert_response(response).expect_err("should fail");

        assert!(matches!(err, MatchError::Parse { .. }));
    }

    #[rstest]
    fn short_positions_are_rejected() {
        let body = r#"{"code": "Ok", "matchings": [{
            "duration": 1,
            "geometry": {"type": "LineString", "coordinates": [[0.0], [1.0, 1.0]]}
        }]}"#;

        let err = classify_response("u", StatusCode::OK, body).expect_err("should fail");

        assert!(matches!(err, MatchError::Parse { .. }));
    }

    #[rstest]
    fn empty_token_is_rejected() {
        let err = HttpMapMatcher::new("  ").expect_err("should fail");
        assert!(matches!(err, HttpMatcherBuildError::MissingAccessToken));
    }

    #[rstest]
    fn debug_output_redacts_token(matcher: HttpMapMatcher) {
        let rendered = format!("{matcher:?}");
        assert!(!rendered.contains(TOKEN));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpMapMatcherConfig::new(TOKEN)
            .with_base_url("http://localhost:5000")
            .with_profile_namespace("osrm")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.profile_namespace, "osrm");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }

    #[rstest]
    fn defaults_target_mapbox() {
        let config = HttpMapMatcherConfig::default();
        assert_eq!(config.base_url, "https://api.mapbox.com");
        assert_eq!(config.profile_namespace, "mapbox");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error_without_token() {
        let matcher = HttpMapMatcher::with_config(
            HttpMapMatcherConfig::new(TOKEN)
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_secs(5)),
        )
        .expect("matcher should build");

        let err = matcher
            .match_path(&sample_request())
            .await
            .expect_err("nothing listens on port 1");

        assert!(
            matches!(err, MatchError::Network { .. } | MatchError::Timeout { .. }),
            "unexpected error: {err:?}"
        );
        assert!(!err.to_string().contains(TOKEN));
    }
}
