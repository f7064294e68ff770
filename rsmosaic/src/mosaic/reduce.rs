use std::collections::HashSet;

use geo::{Area, BooleanOps};
use log::debug;

use crate::errors::GeometryError;
use crate::geo_core::{Footprint, Region};
use crate::mosaic::coverage::{coverage, coverage_of_polygons};

/// Remove every footprint whose absence leaves the covered fraction of
/// `region` unchanged.
///
/// Greedy elimination: footprints are sorted by ascending standalone area
/// inside the region (the smallest contributors are the most likely to be
/// subsumed by the rest) and each one is tentatively dropped in that order.
/// A drop is committed only when the recomputed coverage is *exactly* equal
/// to the coverage of the full input. Exact float equality is deliberate:
/// the evaluator is deterministic, and a tolerance would change which
/// footprints count as redundant.
///
/// The survivors are returned in the sorted-by-area order, which callers
/// can observe. Either a complete reduced collection is returned or an
/// error, never a partial result.
pub fn reduce(footprints: Vec<Footprint>, region: &Region) -> Result<Vec<Footprint>, GeometryError> {
    let ref_coverage = coverage(&footprints, region)?;
    if footprints.is_empty() {
        return Ok(footprints);
    }

    let mut records: Vec<(f64, Footprint)> = footprints
        .into_iter()
        .map(|footprint| {
            let overlap = footprint.geometry().intersection(region.polygon());
            (overlap.unsigned_area(), footprint)
        })
        .collect();
    // Stable sort: footprints with equal area keep their input order.
    records.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut removed: HashSet<usize> = HashSet::new();
    for idx in 0..records.len() {
        let remainder = records
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != idx && !removed.contains(&i))
            .map(|(_, (_, footprint))| footprint.geometry());
        let trial = coverage_of_polygons(remainder, region)?;
        if trial == ref_coverage {
            debug!(
                "footprint {}/{} is redundant, coverage holds at {}",
                idx + 1,
                records.len(),
                ref_coverage
            );
            removed.insert(idx);
        }
    }

    Ok(records
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, (_, footprint))| footprint)
        .collect())
}
