//! Fixtures shared by the CLI unit and behaviour tests.

use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use geo::LineString;
use serde_json::json;
use tempfile::TempDir;
use trailsnap_core::{MapMatcher, MatchedRoute};
use trailsnap_data::matching::test_support::StubMapMatcher;

use crate::CliError;
use crate::match_cmd::{MatchConfig, MatcherBuilder};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// A drawing export with a point followed by the line to snap.
pub(super) fn drawn_collection() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [76.88, 43.23] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[76.9, 43.24], [76.91, 43.25]]
                }
            }
        ]
    })
}

pub(super) fn write_collection(path: &Utf8Path, collection: &serde_json::Value) {
    let payload = serde_json::to_string_pretty(collection).expect("serialize collection");
    write_utf8(path, payload.as_bytes());
}

pub(super) fn snapped_route() -> MatchedRoute {
    MatchedRoute::new(
        LineString::from(vec![(76.9, 43.24), (76.905, 43.246), (76.91, 43.25)]),
        Duration::from_secs(125),
    )
    .with_instructions(vec!["Head north".to_owned(), "Arrive".to_owned()])
}

/// Hands out a shared stub instead of the HTTP client.
#[derive(Debug, Clone)]
pub(super) struct StubMatcherBuilder(pub(super) StubMapMatcher);

impl MatcherBuilder for StubMatcherBuilder {
    fn build(&self, _config: &MatchConfig) -> Result<Arc<dyn MapMatcher>, CliError> {
        Ok(Arc::new(self.0.clone()))
    }
}
