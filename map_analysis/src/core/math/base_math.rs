use super::Vector2;
use crate::core::traits::Real;

/// Returns the (min, max) values from `v1` and `v2`.
///
/// # Examples
///
/// ```
/// # use map_analysis::core::math::*;
/// let (min_val, max_val) = min_max(8, 4);
/// assert_eq!(min_val, 4);
/// assert_eq!(max_val, 8);
/// ```
#[inline]
pub fn min_max<T>(v1: T, v2: T) -> (T, T)
where
    T: PartialOrd,
{
    if v1 < v2 { (v1, v2) } else { (v2, v1) }
}

/// Distance squared between the points `p0` and `p1`.
#[inline]
pub fn dist_squared<T>(p0: Vector2<T>, p1: Vector2<T>) -> T
where
    T: Real,
{
    let d = p0 - p1;
    d.dot(d)
}

/// Angle of the direction vector described by `p0` to `p1` in radians.
#[inline]
pub fn angle<T>(p0: Vector2<T>, p1: Vector2<T>) -> T
where
    T: Real,
{
    T::atan2(p1.y - p0.y, p1.x - p0.x)
}

/// Angle of the direction vector described by `p0` to `p1` in degrees, in the range
/// `[-180, 180]`.
///
/// # Examples
///
/// ```
/// # use map_analysis::core::math::*;
/// # use map_analysis::core::traits::*;
/// let origin = Vector2::new(0.0, 0.0);
/// assert!(angle_degrees(origin, Vector2::new(1.0, 1.0)).fuzzy_eq(45.0));
/// assert!(angle_degrees(origin, Vector2::new(-1.0, 0.0)).fuzzy_eq(180.0));
/// assert!(angle_degrees(origin, Vector2::new(0.0, -1.0)).fuzzy_eq(-90.0));
/// ```
#[inline]
pub fn angle_degrees<T>(p0: Vector2<T>, p1: Vector2<T>) -> T
where
    T: Real,
{
    angle(p0, p1) * T::rad_to_deg()
}

/// Returns the point on the line segment going from `p0` to `p1` at parametric value `t`.
#[inline]
pub fn point_from_parametric<T>(p0: Vector2<T>, p1: Vector2<T>, t: T) -> Vector2<T>
where
    T: Real,
{
    p0 + (p1 - p0).scale(t)
}

/// Returns the parametric value on the line segment going from `p0` to `p1` at the `point` given.
///
/// Note this function assumes the `point` is on the line and properly handles the cases of vertical
/// and horizontal lines by using the `epsilon` parameter to fuzzy compare for when `p0.x == p1.x`.
#[inline]
pub fn parametric_from_point<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>, epsilon: T) -> T
where
    T: Real,
{
    if p0.x.fuzzy_eq_eps(p1.x, epsilon) {
        // vertical segment, use y coordinate
        (point.y - p0.y) / (p1.y - p0.y)
    } else {
        (point.x - p0.x) / (p1.x - p0.x)
    }
}

/// Returns the closest point on the line segment from `p0` to `p1` to the `point` given.
///
/// # Examples
///
/// ```
/// # use map_analysis::core::math::*;
/// let p0 = Vector2::new(0.0, 0.0);
/// let p1 = Vector2::new(10.0, 0.0);
/// assert_eq!(line_seg_closest_point(p0, p1, Vector2::new(4.0, 3.0)), Vector2::new(4.0, 0.0));
/// assert_eq!(line_seg_closest_point(p0, p1, Vector2::new(-4.0, 3.0)), p0);
/// assert_eq!(line_seg_closest_point(p0, p1, Vector2::new(14.0, 3.0)), p1);
/// ```
#[inline]
pub fn line_seg_closest_point<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> Vector2<T>
where
    T: Real,
{
    // Dot product used to find angles
    // See: http://geomalgorithms.com/a02-_lines.html
    let v = p1 - p0;
    let w = point - p0;
    let c1 = w.dot(v);
    if c1 < T::fuzzy_epsilon() {
        return p0;
    }

    let c2 = v.length_squared();
    if c2 < c1 + T::fuzzy_epsilon() {
        return p1;
    }

    let b = c1 / c2;
    p0 + v.scale(b)
}
