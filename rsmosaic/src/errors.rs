use thiserror::Error;

/// Errors raised by the coverage evaluator and the redundancy reducer.
///
/// Both variants are local validation failures, never transient: there is
/// nothing to retry, callers should surface them immediately.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The region polygon has zero area, so a covered fraction is undefined.
    #[error("region has zero area, coverage fraction is undefined")]
    DegenerateRegion,

    /// A polygon is not a valid simple polygon, so union and intersection
    /// are undefined for it. Geometry is never auto-repaired.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
