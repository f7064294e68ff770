//! Builders for the Data API search filter grammar.
//!
//! Each builder returns the JSON fragment the API expects. Compose them
//! with [`and_filter`] and wrap the result with [`build_search_request`].

use chrono::NaiveDate;
use geo::Polygon;
use serde_json::{json, Value};

pub fn and_filter(config: Vec<Value>) -> Value {
    json!({ "type": "AndFilter", "config": config })
}

/// Filter on intersection with a geometry. The API accepts any GeoJSON
/// geometry; callers usually pass the region's convex hull to keep the
/// request body small.
pub fn geometry_filter(polygon: &Polygon<f64>) -> Value {
    let geometry = geojson::Geometry::new(geojson::Value::from(polygon));
    json!({
        "type": "GeometryFilter",
        "field_name": "geometry",
        "config": geometry,
    })
}

/// Filter on an RFC 3339 timestamp field, exclusive on both ends.
pub fn date_range_filter(field_name: &str, gt: NaiveDate, lt: NaiveDate) -> Value {
    json!({
        "type": "DateRangeFilter",
        "field_name": field_name,
        "config": {
            "gt": format!("{}T00:00:00Z", gt),
            "lt": format!("{}T00:00:00Z", lt),
        }
    })
}

/// Filter on a numeric property. Bounds are exclusive; pass `None` to
/// leave a side open.
pub fn range_filter(field_name: &str, gt: Option<f64>, lt: Option<f64>) -> Value {
    let mut config = serde_json::Map::new();
    if let Some(gt) = gt {
        config.insert("gt".to_string(), json!(gt));
    }
    if let Some(lt) = lt {
        config.insert("lt".to_string(), json!(lt));
    }
    json!({
        "type": "RangeFilter",
        "field_name": field_name,
        "config": config,
    })
}

/// Wrap a filter into a search request body for the given item types.
pub fn build_search_request(filter: Value, item_types: &[String]) -> Value {
    json!({ "item_types": item_types, "filter": filter })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]
    }

    #[test]
    fn test_and_filter_wraps_children() {
        let filter = and_filter(vec![
            range_filter("cloud_cover", None, Some(0.1)),
            range_filter("sun_elevation", Some(45.0), None),
        ]);
        assert_eq!(filter["type"], "AndFilter");
        assert_eq!(filter["config"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_geometry_filter_embeds_geojson() {
        let filter = geometry_filter(&unit_square());
        assert_eq!(filter["type"], "GeometryFilter");
        assert_eq!(filter["field_name"], "geometry");
        assert_eq!(filter["config"]["type"], "Polygon");
        // Exterior ring is closed: 4 corners plus the repeated first point.
        let ring = filter["config"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn test_date_range_filter_formats_rfc3339() {
        let from = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2016, 4, 1).unwrap();
        let filter = date_range_filter("acquired", from, to);
        assert_eq!(
            filter,
            json!({
                "type": "DateRangeFilter",
                "field_name": "acquired",
                "config": {
                    "gt": "2016-03-01T00:00:00Z",
                    "lt": "2016-04-01T00:00:00Z",
                }
            })
        );
    }

    #[test]
    fn test_range_filter_skips_open_sides() {
        let filter = range_filter("view_angle", None, Some(5.0));
        assert_eq!(
            filter,
            json!({
                "type": "RangeFilter",
                "field_name": "view_angle",
                "config": { "lt": 5.0 }
            })
        );
    }

    #[test]
    fn test_build_search_request_shape() {
        let request = build_search_request(
            and_filter(vec![]),
            &["PSOrthoTile".to_string()],
        );
        assert_eq!(request["item_types"], json!(["PSOrthoTile"]));
        assert_eq!(request["filter"]["type"], "AndFilter");
    }
}
