use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use geo::{ConvexHull, Geometry as GeoGeometry};
use log::info;
use serde_json::Value;

use crate::collect::planet::filters;
use crate::collect::planet::PlanetCollect;
use crate::geo_core::{Footprint, Region};
use crate::mosaic::coverage::RunningUnion;

/// Catalog search thresholds for candidate scenes.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub item_types: Vec<String>,
    pub max_cloud_cover: f64,
    pub max_view_angle: f64,
    pub min_sun_elevation: f64,
    /// Most items accepted from one acquisition window.
    pub page_limit: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            item_types: vec!["PSOrthoTile".to_string()],
            max_cloud_cover: 0.1,
            max_view_angle: 5.0,
            min_sun_elevation: 45.0,
            page_limit: 1000,
        }
    }
}

/// Monthly acquisition windows reaching `months` months into the past,
/// newest first, on a 31-day stride.
pub fn build_date_ranges(months: u32) -> Vec<(NaiveDate, NaiveDate)> {
    build_date_ranges_from(Local::now().date_naive(), months)
}

pub(crate) fn build_date_ranges_from(today: NaiveDate, months: u32) -> Vec<(NaiveDate, NaiveDate)> {
    let mut keydates = vec![today];
    for month in 0..months {
        keydates.push(today - Duration::days(31 * (i64::from(month) + 1)));
    }
    keydates.windows(2).map(|pair| (pair[1], pair[0])).collect()
}

/// Queries the catalog window by window and assembles the candidate
/// footprint list for a region.
///
/// The client is borrowed, not owned: whoever orchestrates a run decides
/// where the API session comes from.
pub struct SceneSearch<'a> {
    collect: &'a PlanetCollect,
    params: SearchParams,
}

impl<'a> SceneSearch<'a> {
    pub fn new(collect: &'a PlanetCollect) -> Self {
        SceneSearch {
            collect,
            params: SearchParams::default(),
        }
    }

    pub fn with_params(collect: &'a PlanetCollect, params: SearchParams) -> Self {
        SceneSearch { collect, params }
    }

    /// Search every acquisition window and collect candidate footprints.
    ///
    /// A running union of the outlines is kept so the covered fraction can
    /// be reported as the list grows.
    pub fn run(&self, region: &Region, months: u32) -> Result<Vec<Footprint>> {
        let mut scenes: Vec<Footprint> = Vec::new();
        let mut union = RunningUnion::new();

        for (from, to) in build_date_ranges(months) {
            info!("searching acquisitions from {} to {}", from, to);
            let request = filters::build_search_request(
                self.search_filter(region, from, to),
                &self.params.item_types,
            );
            let items = self
                .collect
                .quick_search(&request, "acquired asc", self.params.page_limit)?;
            for item in items {
                let footprint = footprint_from_item(item)?;
                union.push(footprint.geometry());
                scenes.push(footprint);
            }
        }

        let fraction = union.covered_fraction(region)?;
        info!(
            "candidate scenes: {}, covering {:.4} of the region",
            scenes.len(),
            fraction
        );
        Ok(scenes)
    }

    fn search_filter(&self, region: &Region, from: NaiveDate, to: NaiveDate) -> Value {
        filters::and_filter(vec![
            filters::geometry_filter(&region.polygon().convex_hull()),
            filters::date_range_filter("acquired", from, to),
            filters::range_filter("cloud_cover", None, Some(self.params.max_cloud_cover)),
            filters::range_filter("view_angle", None, Some(self.params.max_view_angle)),
            filters::range_filter("sun_elevation", Some(self.params.min_sun_elevation), None),
        ])
    }
}

/// Build a footprint from one catalog item, using its `geometry` member as
/// the outline and the whole item as the payload.
pub fn footprint_from_item(item: Value) -> Result<Footprint> {
    let geometry = item
        .get("geometry")
        .context("catalog item has no geometry member")?;
    let geojson_geometry: geojson::Geometry = serde_json::from_value(geometry.clone())
        .context("catalog item geometry is not valid GeoJSON")?;
    let geo_geometry: GeoGeometry<f64> = (&geojson_geometry)
        .try_into()
        .context("failed to convert catalog item geometry")?;
    let polygon = match geo_geometry {
        GeoGeometry::Polygon(polygon) => polygon,
        _ => bail!("catalog item geometry is not a polygon"),
    };
    Ok(Footprint::new(polygon, item)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_ranges_cover_the_requested_months() {
        let today = NaiveDate::from_ymd_opt(2016, 6, 1).unwrap();
        let ranges = build_date_ranges_from(today, 3);
        assert_eq!(ranges.len(), 3);

        // Newest window ends today, every window runs 31 days.
        assert_eq!(ranges[0].1, today);
        for (from, to) in &ranges {
            assert_eq!(*to - *from, Duration::days(31));
        }
        // Windows are contiguous, newest first.
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].0, pair[1].1);
        }
    }

    #[test]
    fn test_no_months_means_no_windows() {
        let today = NaiveDate::from_ymd_opt(2016, 6, 1).unwrap();
        assert!(build_date_ranges_from(today, 0).is_empty());
    }

    #[test]
    fn test_footprint_from_item_keeps_the_record() {
        let item = json!({
            "id": "20160601_1057917_1234",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]],
            },
            "properties": { "item_type": "PSOrthoTile", "cloud_cover": 0.01 },
        });
        let footprint = footprint_from_item(item).unwrap();
        assert_eq!(footprint.id(), Some("20160601_1057917_1234"));
        assert_eq!(footprint.geometry().exterior().0.len(), 5);
    }

    #[test]
    fn test_footprint_from_item_rejects_missing_geometry() {
        let err = footprint_from_item(json!({"id": "x"})).unwrap_err();
        assert!(err.to_string().contains("no geometry"));
    }

    #[test]
    fn test_footprint_from_item_rejects_non_polygons() {
        let item = json!({
            "id": "pt",
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
        });
        let err = footprint_from_item(item).unwrap_err();
        assert!(err.to_string().contains("not a polygon"));
    }

    #[test]
    fn test_default_params_match_catalog_thresholds() {
        let params = SearchParams::default();
        assert_eq!(params.item_types, vec!["PSOrthoTile".to_string()]);
        assert_eq!(params.max_cloud_cover, 0.1);
        assert_eq!(params.max_view_angle, 5.0);
        assert_eq!(params.min_sun_elevation, 45.0);
        assert_eq!(params.page_limit, 1000);
    }
}
