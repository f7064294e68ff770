use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::{BooleanOps, ConvexHull, Geometry as GeoGeometry, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use log::debug;
use serde_json::Value;

use crate::geo_core::{Footprint, Region};
use crate::mosaic::scene_list::footprint_from_item;

/// Parse a GeoJSON file.
pub fn read_geojson(path: &Path) -> Result<GeoJson> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    raw.parse()
        .with_context(|| format!("{} is not valid GeoJSON", path.display()))
}

/// Build the target region from a GeoJSON file.
///
/// With `idx` the region is the convex hull of that single feature; without
/// it, the convex hull of the union of every feature.
pub fn region_from_file(path: &Path, idx: Option<usize>) -> Result<Region> {
    let collection = feature_collection(read_geojson(path)?, path)?;
    let geometries = feature_geometries(&collection)?;
    if geometries.is_empty() {
        bail!("{} contains no polygonal features", path.display());
    }

    let merged = match idx {
        Some(idx) => {
            if idx >= geometries.len() {
                bail!(
                    "geometry index {} out of range, {} has {} features",
                    idx,
                    path.display(),
                    geometries.len()
                );
            }
            geometries[idx].clone()
        }
        None => geometries
            .iter()
            .skip(1)
            .fold(geometries[0].clone(), |merged, next| merged.union(next)),
    };
    let hull = merged.convex_hull();
    debug!("region hull has {} exterior points", hull.exterior().0.len());
    Ok(Region::new(hull)?)
}

/// Load candidate footprints from a scene FeatureCollection. Each feature's
/// whole JSON becomes the footprint payload.
pub fn footprints_from_file(path: &Path) -> Result<Vec<Footprint>> {
    let collection = feature_collection(read_geojson(path)?, path)?;
    let mut footprints = Vec::new();
    for feature in collection.features {
        let record = serde_json::to_value(&feature).context("failed to serialize feature")?;
        let footprint = footprint_from_item(record)
            .with_context(|| format!("invalid scene feature in {}", path.display()))?;
        footprints.push(footprint);
    }
    Ok(footprints)
}

/// Write footprint payload records back out as a FeatureCollection.
/// Round-trips with [`footprints_from_file`].
pub fn write_scene_collection(path: &Path, footprints: &[Footprint]) -> Result<()> {
    let records: Vec<&Value> = footprints.iter().map(Footprint::record).collect();
    let collection = serde_json::json!({
        "type": "FeatureCollection",
        "features": records,
    });
    let body = serde_json::to_string_pretty(&collection)
        .context("failed to serialize scene collection")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn feature_collection(geojson: GeoJson, path: &Path) -> Result<FeatureCollection> {
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => bail!("{} is not a FeatureCollection", path.display()),
    }
}

fn feature_geometries(collection: &FeatureCollection) -> Result<Vec<MultiPolygon<f64>>> {
    let mut geometries = Vec::new();
    for feature in &collection.features {
        let geometry = match &feature.geometry {
            Some(geometry) => geometry,
            None => continue,
        };
        let geo_geometry: GeoGeometry<f64> = geometry
            .try_into()
            .context("failed to convert feature geometry")?;
        match geo_geometry {
            GeoGeometry::Polygon(polygon) => geometries.push(MultiPolygon::from(polygon)),
            GeoGeometry::MultiPolygon(multi) => geometries.push(multi),
            _ => bail!("feature geometry is not polygonal"),
        }
    }
    Ok(geometries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn square_feature(id: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Value {
        json!({
            "type": "Feature",
            "id": id,
            "properties": { "item_type": "PSOrthoTile" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [min_x, min_y], [max_x, min_y], [max_x, max_y], [min_x, max_y], [min_x, min_y]
                ]],
            },
        })
    }

    fn write_collection(features: Vec<Value>) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let body = json!({"type": "FeatureCollection", "features": features});
        write!(file, "{}", body).unwrap();
        file
    }

    #[test]
    fn test_region_from_single_feature() {
        let file = write_collection(vec![square_feature("a", 0.0, 0.0, 2.0, 2.0)]);
        let region = region_from_file(file.path(), Some(0)).unwrap();
        assert_eq!(region.area(), 4.0);
    }

    #[test]
    fn test_region_from_all_features_takes_the_union_hull() {
        let file = write_collection(vec![
            square_feature("a", 0.0, 0.0, 1.0, 1.0),
            square_feature("b", 1.0, 0.0, 2.0, 1.0),
        ]);
        let region = region_from_file(file.path(), None).unwrap();
        // Hull of the two adjacent squares is the 2x1 rectangle.
        assert_eq!(region.area(), 2.0);
    }

    #[test]
    fn test_region_index_out_of_range_fails() {
        let file = write_collection(vec![square_feature("a", 0.0, 0.0, 1.0, 1.0)]);
        let err = region_from_file(file.path(), Some(3)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_scene_collection_round_trip() {
        let file = write_collection(vec![
            square_feature("a", 0.0, 0.0, 1.0, 1.0),
            square_feature("b", 1.0, 0.0, 2.0, 1.0),
        ]);
        let footprints = footprints_from_file(file.path()).unwrap();
        assert_eq!(footprints.len(), 2);
        assert_eq!(footprints[0].id(), Some("a"));
        assert_eq!(footprints[0].geometry().unsigned_area(), 1.0);

        let out = NamedTempFile::new().unwrap();
        write_scene_collection(out.path(), &footprints).unwrap();
        let reloaded = footprints_from_file(out.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[1].id(), Some("b"));
    }

    #[test]
    fn test_non_feature_collection_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({"type": "Point", "coordinates": [0.0, 0.0]})
        )
        .unwrap();
        let err = region_from_file(file.path(), None).unwrap_err();
        assert!(err.to_string().contains("not a FeatureCollection"));
    }
}
