use super::FuzzyEq;
use static_aabb2d_index::IndexableNum;

/// Trait representing a real number (e.g. 1.1, -3.5, etc.) that can be fuzzy compared and
/// stored in a spatial index.
pub trait Real:
    num_traits::real::Real
    + num_traits::Bounded
    + FuzzyEq
    + std::default::Default
    + std::fmt::Debug
    + IndexableNum
    + 'static
{
    fn pi() -> Self;

    /// Degrees per radian, used when converting bearings.
    #[inline]
    fn rad_to_deg() -> Self {
        Self::from(180.0).unwrap_or_else(Self::one) / Self::pi()
    }
}

impl Real for f32 {
    #[inline]
    fn pi() -> Self {
        std::f32::consts::PI
    }
}

impl Real for f64 {
    #[inline]
    fn pi() -> Self {
        std::f64::consts::PI
    }
}
