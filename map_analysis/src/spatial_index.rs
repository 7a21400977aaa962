//! Broad phase helpers over `static_aabb2d_index`.
use crate::lattice::IntPoint;
use static_aabb2d_index::{
    StaticAABB2DIndex, StaticAABB2DIndexBuildError, StaticAABB2DIndexBuilder, AABB,
};

/// Builds a packed index over `boxes`, the position in the iterator is the item key.
pub(crate) fn build_index<I>(boxes: I) -> StaticAABB2DIndex<f64>
where
    I: ExactSizeIterator<Item = AABB<f64>>,
{
    let mut builder = StaticAABB2DIndexBuilder::new(boxes.len());
    for b in boxes {
        builder.add(b.min_x, b.min_y, b.max_x, b.max_y);
    }

    match builder.build() {
        Ok(x) => x,
        Err(e) => match e {
            StaticAABB2DIndexBuildError::ItemCountError { .. } => {
                unreachable!("internal library error: count mismatch when building spatial index")
            }
            StaticAABB2DIndexBuildError::NumericCastError => {
                unreachable!("f64 index bounds always cast: {e}")
            }
        },
    }
}

/// Bounding box of a lattice segment.
#[inline]
pub(crate) fn segment_box(a: IntPoint, b: IntPoint) -> AABB<f64> {
    AABB::new(
        a.x.min(b.x) as f64,
        a.y.min(b.y) as f64,
        a.x.max(b.x) as f64,
        a.y.max(b.y) as f64,
    )
}
