use geo::{Area, BooleanOps, MultiPolygon, Polygon};

use crate::errors::GeometryError;
use crate::geo_core::{Footprint, Region};

/// Fraction of `region`'s area covered by the union of `footprints`.
///
/// The union is folded in collection order and the intersection and area
/// computations always take the same code path, so repeated calls over
/// identical inputs are bit-identical. The redundancy reducer relies on
/// that determinism for its strict equality test; do not reorder the fold
/// or swap the kernel without revisiting [`crate::mosaic::reduce`].
///
/// An empty collection covers nothing and yields `0.0`. A zero-area region
/// fails with [`GeometryError::DegenerateRegion`].
pub fn coverage(footprints: &[Footprint], region: &Region) -> Result<f64, GeometryError> {
    coverage_of_polygons(footprints.iter().map(Footprint::geometry), region)
}

/// Same contract as [`coverage`], over bare polygons.
pub(crate) fn coverage_of_polygons<'a, I>(
    polygons: I,
    region: &Region,
) -> Result<f64, GeometryError>
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    if region.area() == 0.0 {
        return Err(GeometryError::DegenerateRegion);
    }
    let union = cascaded_union(polygons);
    if union.0.is_empty() {
        return Ok(0.0);
    }
    let overlap = union.intersection(&MultiPolygon::from(region.polygon().clone()));
    Ok(overlap.unsigned_area() / region.area())
}

/// Union of a polygon sequence, folded left to right. An empty sequence
/// yields an empty multipolygon.
pub(crate) fn cascaded_union<'a, I>(polygons: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    let mut merged: Option<MultiPolygon<f64>> = None;
    for polygon in polygons {
        let next = MultiPolygon::from(polygon.clone());
        merged = Some(match merged {
            None => next,
            Some(union) => union.union(&next),
        });
    }
    merged.unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Running union of scene outlines with its cached area.
///
/// Threads the accumulation state explicitly through the scene-list fold
/// instead of a pair of mutable locals, so the first observation is handled
/// like every later one.
#[derive(Debug, Clone)]
pub struct RunningUnion {
    geometry: MultiPolygon<f64>,
    area: f64,
}

impl RunningUnion {
    pub fn new() -> Self {
        RunningUnion {
            geometry: MultiPolygon::new(Vec::new()),
            area: 0.0,
        }
    }

    /// Merge one more outline into the union. Returns whether the union
    /// area actually grew.
    pub fn push(&mut self, polygon: &Polygon<f64>) -> bool {
        let next = MultiPolygon::from(polygon.clone());
        let merged = if self.geometry.0.is_empty() {
            next
        } else {
            self.geometry.union(&next)
        };
        let merged_area = merged.unsigned_area();
        let grew = merged_area > self.area;
        self.geometry = merged;
        self.area = merged_area;
        grew
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }

    /// Fraction of `region` covered by the union accumulated so far.
    pub fn covered_fraction(&self, region: &Region) -> Result<f64, GeometryError> {
        if region.area() == 0.0 {
            return Err(GeometryError::DegenerateRegion);
        }
        if self.geometry.0.is_empty() {
            return Ok(0.0);
        }
        let overlap = self
            .geometry
            .intersection(&MultiPolygon::from(region.polygon().clone()));
        Ok(overlap.unsigned_area() / region.area())
    }
}

impl Default for RunningUnion {
    fn default() -> Self {
        RunningUnion::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString};
    use serde_json::json;

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        polygon![
            (x: min_x, y: min_y),
            (x: max_x, y: min_y),
            (x: max_x, y: max_y),
            (x: min_x, y: max_y),
        ]
    }

    fn unit_region() -> Region {
        Region::new(square(0.0, 0.0, 1.0, 1.0)).unwrap()
    }

    fn zero_area_region() -> Region {
        Region::new(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.5, 0.0)]),
            vec![],
        ))
        .unwrap()
    }

    fn footprint(polygon: Polygon<f64>) -> Footprint {
        Footprint::new(polygon, json!({"id": "scene"})).unwrap()
    }

    #[test]
    fn test_empty_collection_covers_nothing() {
        let value = coverage(&[], &unit_region()).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_identical_squares_cover_fully() {
        let footprints = vec![
            footprint(square(0.0, 0.0, 1.0, 1.0)),
            footprint(square(0.0, 0.0, 1.0, 1.0)),
            footprint(square(0.0, 0.0, 1.0, 1.0)),
        ];
        let value = coverage(&footprints, &unit_region()).unwrap();
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_half_cover() {
        let footprints = vec![footprint(square(0.0, 0.0, 0.5, 1.0))];
        let value = coverage(&footprints, &unit_region()).unwrap();
        assert_eq!(value, 0.5);
    }

    #[test]
    fn test_footprint_outside_region_contributes_nothing() {
        let footprints = vec![footprint(square(2.0, 2.0, 3.0, 3.0))];
        let value = coverage(&footprints, &unit_region()).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_degenerate_region_is_rejected() {
        let footprints = vec![footprint(square(0.0, 0.0, 1.0, 1.0))];
        let err = coverage(&footprints, &zero_area_region()).unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateRegion));
    }

    #[test]
    fn test_repeated_evaluation_is_bit_identical() {
        let footprints = vec![
            footprint(square(0.0, 0.0, 0.7, 0.9)),
            footprint(square(0.3, 0.2, 1.1, 1.0)),
            footprint(square(-0.2, 0.4, 0.5, 0.8)),
        ];
        let region = unit_region();
        let first = coverage(&footprints, &region).unwrap();
        let second = coverage(&footprints, &region).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_running_union_grows_and_saturates() {
        let mut union = RunningUnion::new();
        assert!(union.is_empty());
        assert!(union.push(&square(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(union.area(), 1.0);
        // The same outline again adds nothing.
        assert!(!union.push(&square(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(union.area(), 1.0);
        assert!(union.push(&square(1.0, 0.0, 2.0, 1.0)));
        assert_eq!(union.area(), 2.0);
    }

    #[test]
    fn test_running_union_covered_fraction() {
        let region = unit_region();
        let mut union = RunningUnion::new();
        assert_eq!(union.covered_fraction(&region).unwrap(), 0.0);
        union.push(&square(0.0, 0.0, 0.5, 1.0));
        assert_eq!(union.covered_fraction(&region).unwrap(), 0.5);
        union.push(&square(0.5, 0.0, 2.0, 1.0));
        assert_eq!(union.covered_fraction(&region).unwrap(), 1.0);
    }

    #[test]
    fn test_running_union_rejects_degenerate_region() {
        let union = RunningUnion::new();
        let err = union.covered_fraction(&zero_area_region()).unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateRegion));
    }
}
