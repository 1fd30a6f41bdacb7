//! GeoJSON point datasets
//!
//! The dataset is a `FeatureCollection` of `Point` features carrying a
//! numeric weight property (earthquake magnitude). Parsing is split in two:
//! the document itself must be well formed or loading fails, while each
//! feature is validated on its own and skipped when unusable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{core::geo::LngLat, MapError, Result};

/// A weighted point of the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub id: Option<String>,
    pub position: LngLat,
    /// Weight driving the rendered radius
    pub magnitude: f64,
    /// Remaining feature properties, kept for diagnostics
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl GeoPoint {
    pub fn new(position: LngLat, magnitude: f64) -> Self {
        Self {
            id: None,
            position,
            magnitude,
            properties: Map::new(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.position.is_finite() && self.magnitude.is_finite()
    }
}

/// A feature rejected during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position of the feature in the source document
    pub index: usize,
    pub reason: String,
}

/// Validated points plus the records that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub points: Vec<GeoPoint>,
    pub skipped: Vec<SkippedRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest finite weight, or `None` for an empty dataset
    pub fn max_magnitude(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.magnitude)
            .filter(|m| m.is_finite())
            .fold(None, |acc, m| Some(acc.map_or(m, |a: f64| a.max(m))))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonDocument {
    /// Features stay untyped until validated so one bad entry cannot fail the document
    FeatureCollection { features: Vec<Value> },
    Feature(RawFeature),
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Value>,
}

/// GeoJSON geometry types. Only points are drawn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonGeometry {
    Point { coordinates: Vec<f64> },
    #[serde(other)]
    Unsupported,
}

/// Parses a GeoJSON document into validated points.
///
/// `weight_properties` are tried in order; the first finite numeric one is
/// the point's weight. Features without a usable point geometry or weight
/// are skipped and reported, never fatal.
pub fn parse_dataset(text: &str, source_name: &str, weight_properties: &[String]) -> Result<Dataset> {
    let document: GeoJsonDocument =
        serde_json::from_str(text).map_err(|e| MapError::dataset(source_name, format!("invalid GeoJSON: {}", e)))?;

    let features: Vec<std::result::Result<RawFeature, String>> = match document {
        GeoJsonDocument::FeatureCollection { features } => features
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(|e| format!("malformed feature: {}", e)))
            .collect(),
        GeoJsonDocument::Feature(feature) => vec![Ok(feature)],
    };

    let mut dataset = Dataset::default();
    for (index, feature) in features.into_iter().enumerate() {
        match feature.and_then(|feature| validate_feature(feature, weight_properties)) {
            Ok(point) => dataset.points.push(point),
            Err(reason) => {
                log::warn!("skipping feature {} of {}: {}", index, source_name, reason);
                dataset.skipped.push(SkippedRecord { index, reason });
            }
        }
    }

    log::info!(
        "loaded {} points from {} ({} skipped)",
        dataset.points.len(),
        source_name,
        dataset.skipped.len()
    );
    Ok(dataset)
}

fn validate_feature(feature: RawFeature, weight_properties: &[String]) -> std::result::Result<GeoPoint, String> {
    let geometry = feature.geometry.ok_or_else(|| "missing geometry".to_string())?;
    let coordinates = match serde_json::from_value::<GeoJsonGeometry>(geometry) {
        Ok(GeoJsonGeometry::Point { coordinates }) => coordinates,
        Ok(GeoJsonGeometry::Unsupported) => return Err("geometry is not a Point".to_string()),
        Err(e) => return Err(format!("malformed geometry: {}", e)),
    };
    if coordinates.len() < 2 {
        return Err(format!("point has {} coordinates", coordinates.len()));
    }
    let position = LngLat::new(coordinates[0], coordinates[1]);
    if !position.is_finite() {
        return Err("non-finite coordinates".to_string());
    }

    let properties = match feature.properties {
        Some(Value::Object(map)) => map,
        _ => return Err("missing properties".to_string()),
    };
    let magnitude = weight_properties
        .iter()
        .find_map(|name| properties.get(name).and_then(Value::as_f64))
        .filter(|m| m.is_finite())
        .ok_or_else(|| format!("no numeric weight in {:?}", weight_properties))?;

    let id = feature.id.map(|id| match id {
        Value::String(s) => s,
        other => other.to_string(),
    });

    Ok(GeoPoint {
        id,
        position,
        magnitude,
        properties,
    })
}
