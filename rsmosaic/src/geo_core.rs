use geo::{Area, BoundingRect, Intersects, Line, LineString, Polygon};
use serde_json::Value;

use crate::errors::GeometryError;

/// Target polygon whose coverage is being optimized for.
///
/// Immutable once constructed. The unsigned area is computed up front so
/// every coverage evaluation divides by the same value. A zero-area region
/// is constructible (the coverage evaluator rejects it with
/// [`GeometryError::DegenerateRegion`]); an invalid one is not.
#[derive(Debug, Clone)]
pub struct Region {
    polygon: Polygon<f64>,
    area: f64,
}

impl Region {
    pub fn new(polygon: Polygon<f64>) -> Result<Self, GeometryError> {
        validate_polygon(&polygon)?;
        let area = polygon.unsigned_area();
        Ok(Region { polygon, area })
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Unsigned area in the units of the input coordinate system.
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::of_polygon(&self.polygon)
    }
}

/// One candidate scene: its geographic outline plus the opaque catalog
/// record it came from.
///
/// Two footprints with identical geometry are still independent candidates;
/// identity is the position in the collection, never the geometry.
#[derive(Debug, Clone)]
pub struct Footprint {
    geometry: Polygon<f64>,
    record: Value,
}

impl Footprint {
    pub fn new(geometry: Polygon<f64>, record: Value) -> Result<Self, GeometryError> {
        validate_polygon(&geometry)?;
        Ok(Footprint { geometry, record })
    }

    pub fn geometry(&self) -> &Polygon<f64> {
        &self.geometry
    }

    /// The scene record this footprint was built from.
    pub fn record(&self) -> &Value {
        &self.record
    }

    pub fn into_record(self) -> Value {
        self.record
    }

    /// Catalog item id, when the record carries one.
    pub fn id(&self) -> Option<&str> {
        self.record.get("id").and_then(Value::as_str)
    }
}

/// Axis-aligned bounding box, used for logging and request summaries.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn of_polygon(polygon: &Polygon<f64>) -> Option<Self> {
        polygon
            .bounding_rect()
            .map(|rect| BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Check that a polygon is usable as a simple polygon: finite coordinates,
/// rings of at least four coordinates once closed, and no crossing between
/// non-adjacent ring segments.
fn validate_polygon(polygon: &Polygon<f64>) -> Result<(), GeometryError> {
    validate_ring(polygon.exterior())?;
    for interior in polygon.interiors() {
        validate_ring(interior)?;
    }
    Ok(())
}

fn validate_ring(ring: &LineString<f64>) -> Result<(), GeometryError> {
    for coord in &ring.0 {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(GeometryError::InvalidGeometry(format!(
                "non-finite coordinate ({}, {})",
                coord.x, coord.y
            )));
        }
    }
    if ring.0.len() < 4 {
        return Err(GeometryError::InvalidGeometry(format!(
            "ring has {} coordinates, at least 4 are required",
            ring.0.len()
        )));
    }

    let segments: Vec<Line<f64>> = ring.lines().collect();
    let count = segments.len();
    for i in 0..count {
        for j in (i + 2)..count {
            // The closing segment is adjacent to the first one.
            if i == 0 && j == count - 1 {
                continue;
            }
            if segments[i].intersects(&segments[j]) {
                return Err(GeometryError::InvalidGeometry(format!(
                    "ring segments {} and {} cross",
                    i, j
                )));
            }
        }
    }
    Ok(())
}
