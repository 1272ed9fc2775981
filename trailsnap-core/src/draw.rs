//! Drawn features and extraction of the active path.
//!
//! The drawing tool owns a collection of GeoJSON features. Each feature gets a
//! [`FeatureId`] when it is created; the collection remembers which feature
//! was touched last, and that *active* feature is the one sent for matching.
//! Tracking the id explicitly avoids guessing from positions in the
//! collection when several features coexist.

use std::collections::BTreeMap;
use std::fmt;

use geo::{Coord, LineString};
use geojson::{FeatureCollection, Geometry, Value};
use log::debug;
use thiserror::Error;

/// Identifier assigned to a drawn feature at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u64);

impl FeatureId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feature#{}", self.0)
    }
}

/// Errors raised when no matchable path can be read from the drawn features.
///
/// The pipeline treats all of these as a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The collection holds no features.
    #[error("no drawn feature is available")]
    NoFeature,
    /// The active feature is not a line.
    #[error("{id} is a {kind}, not a LineString")]
    NotALine {
        /// Identifier of the offending feature.
        id: FeatureId,
        /// GeoJSON geometry type that was found.
        kind: &'static str,
    },
    /// The line has fewer than two points.
    #[error("a path needs at least two points, found {count}")]
    TooFewPoints {
        /// Number of points found.
        count: usize,
    },
    /// A position was missing a component or was not finite.
    #[error("position {index} is not a finite longitude/latitude pair")]
    InvalidCoordinate {
        /// Index of the offending position.
        index: usize,
    },
}

/// Ordered longitude/latitude points drawn by the user.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. A path always
/// holds at least two finite points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trailsnap_core::DrawnPath;
///
/// let path = DrawnPath::new(vec![
///     Coord { x: 76.9, y: 43.24 },
///     Coord { x: 76.91, y: 43.25 },
/// ])?;
/// assert_eq!(path.len(), 2);
/// # Ok::<(), trailsnap_core::ExtractionError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPath {
    points: Vec<Coord<f64>>,
}

impl DrawnPath {
    /// Validate and construct a path.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::TooFewPoints`] for fewer than two points and
    /// [`ExtractionError::InvalidCoordinate`] for non-finite values.
    pub fn new(points: Vec<Coord<f64>>) -> Result<Self, ExtractionError> {
        if let Some(index) = points
            .iter()
            .position(|point| !point.x.is_finite() || !point.y.is_finite())
        {
            return Err(ExtractionError::InvalidCoordinate { index });
        }
        if points.len() < 2 {
            return Err(ExtractionError::TooFewPoints {
                count: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Points in drawing order.
    #[must_use]
    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Convert into a `geo` line string.
    #[must_use]
    pub fn into_line_string(self) -> LineString<f64> {
        LineString::new(self.points)
    }
}

/// A feature as reported by the drawing tool.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnFeature {
    /// Identifier assigned by the drawing tool.
    pub id: FeatureId,
    /// Current geometry of the feature.
    pub geometry: Geometry,
}

impl DrawnFeature {
    /// Pair an identifier with a geometry.
    #[must_use]
    pub const fn new(id: FeatureId, geometry: Geometry) -> Self {
        Self { id, geometry }
    }

    /// Build a line feature from longitude/latitude pairs.
    ///
    /// # Examples
    /// ```
    /// use trailsnap_core::{DrawnFeature, FeatureId};
    ///
    /// let feature = DrawnFeature::line(FeatureId::new(1), &[(76.9, 43.24), (76.91, 43.25)]);
    /// assert_eq!(feature.id.get(), 1);
    /// ```
    #[must_use]
    pub fn line(id: FeatureId, points: &[(f64, f64)]) -> Self {
        let positions = points.iter().map(|&(lon, lat)| vec![lon, lat]).collect();
        Self::new(id, Geometry::new(Value::LineString(positions)))
    }
}

/// The drawing tool's feature collection with an explicit active feature.
#[derive(Debug, Clone, Default)]
pub struct DrawnFeatures {
    features: BTreeMap<FeatureId, Geometry>,
    // Touch order; the active feature is last.
    touched: Vec<FeatureId>,
}

impl DrawnFeatures {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from features in drawing order.
    #[must_use]
    pub fn from_features<I>(features: I) -> Self
    where
        I: IntoIterator<Item = DrawnFeature>,
    {
        let mut collection = Self::new();
        for feature in features {
            collection.upsert(feature);
        }
        collection
    }

    /// Load a GeoJSON feature collection.
    ///
    /// Identifiers are assigned sequentially from one in collection order, so
    /// the last feature with a geometry becomes active. Features without a
    /// geometry are skipped.
    #[must_use]
    pub fn from_feature_collection(collection: FeatureCollection) -> Self {
        let features = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                if feature.geometry.is_none() {
                    debug!("skipping drawn feature without geometry");
                }
                feature.geometry
            })
            .zip(1_u64..)
            .map(|(geometry, raw)| DrawnFeature::new(FeatureId::new(raw), geometry));
        Self::from_features(features)
    }

    /// Release the features, least recently touched first.
    ///
    /// Upserting them in this order restores the same active feature.
    #[must_use]
    pub fn into_features(mut self) -> Vec<DrawnFeature> {
        self.touched
            .iter()
            .filter_map(|id| {
                self.features
                    .remove(id)
                    .map(|geometry| DrawnFeature::new(*id, geometry))
            })
            .collect()
    }

    /// Insert or replace a feature and mark it active.
    pub fn upsert(&mut self, feature: DrawnFeature) -> FeatureId {
        let DrawnFeature { id, geometry } = feature;
        self.features.insert(id, geometry);
        self.touch(id);
        id
    }

    /// Remove a feature; returns whether it existed.
    ///
    /// If the active feature is removed, the most recently touched remaining
    /// feature becomes active.
    pub fn remove(&mut self, id: FeatureId) -> bool {
        self.touched.retain(|touched| *touched != id);
        self.features.remove(&id).is_some()
    }

    /// Identifier of the active feature, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<FeatureId> {
        self.touched.last().copied()
    }

    /// Geometry of a feature.
    #[must_use]
    pub fn get(&self, id: FeatureId) -> Option<&Geometry> {
        self.features.get(&id)
    }

    /// Number of features held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Read the active feature's line as a matchable path.
    ///
    /// # Errors
    ///
    /// See [`ExtractionError`]; every variant means "do not issue a request".
    pub fn active_path(&self) -> Result<DrawnPath, ExtractionError> {
        let id = self.active_id().ok_or(ExtractionError::NoFeature)?;
        let geometry = self.features.get(&id).ok_or(ExtractionError::NoFeature)?;
        let Value::LineString(positions) = &geometry.value else {
            return Err(ExtractionError::NotALine {
                id,
                kind: geometry_kind(&geometry.value),
            });
        };
        let points = positions
            .iter()
            .enumerate()
            .map(|(index, position)| position_to_coord(position, index))
            .collect::<Result<Vec<_>, _>>()?;
        DrawnPath::new(points)
    }

    fn touch(&mut self, id: FeatureId) {
        self.touched.retain(|touched| *touched != id);
        self.touched.push(id);
    }
}

fn position_to_coord(position: &[f64], index: usize) -> Result<Coord<f64>, ExtractionError> {
    match (position.first(), position.get(1)) {
        (Some(&x), Some(&y)) => Ok(Coord { x, y }),
        _ => Err(ExtractionError::InvalidCoordinate { index }),
    }
}

const fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
