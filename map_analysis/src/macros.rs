/// Macro used for test assertions.
#[doc(hidden)]
#[macro_export]
macro_rules! assert_fuzzy_eq {
    ($left:expr, $right:expr) => {{
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(left_val.fuzzy_eq(*right_val)) {
                    panic!(
                        r#"assertion failed: `left.fuzzy_eq(right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        &*left_val, &*right_val
                    )
                }
            }
        }
    }};
    ($left:expr, $right:expr, $eps:expr) => {{
        match (&$left, &$right, &$eps) {
            (left_val, right_val, eps_val) => {
                if !(left_val.fuzzy_eq_eps(*right_val, *eps_val)) {
                    panic!(
                        r#"assertion failed: `left.fuzzy_eq_eps(right, eps)`
  left: `{:?}`,
 right: `{:?}`
 eps: `{:?}`"#,
                        &*left_val, &*right_val, &*eps_val
                    )
                }
            }
        }
    }};
}

/// Construct a coordinate sequence from a list of (x, y) tuples.
///
/// # Examples
///
/// ```
/// # use map_analysis::coords;
/// # use map_analysis::core::math::vec2;
/// let line = coords![(0.0, 1.0), (2.0, 0.0)];
/// assert_eq!(line, vec![vec2(0.0, 1.0), vec2(2.0, 0.0)]);
/// ```
#[macro_export]
macro_rules! coords {
    ($( $x:expr ),* $(,)?) => {
        {
            let v: ::std::vec::Vec<$crate::geometry::Coord> =
                vec![$($crate::core::math::vec2($x.0, $x.1)),*];
            v
        }
    };
}

/// Construct a polygon geometry from rings of (x, y) tuples, closing every ring that is not
/// already closed. The first ring is the shell.
///
/// # Examples
///
/// ```
/// # use map_analysis::polygon;
/// # use map_analysis::geometry::*;
/// let square = polygon![[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]];
/// match square {
///     Geometry::Polygon(rings) => assert_eq!(rings[0].len(), 5),
///     _ => unreachable!(),
/// }
/// ```
#[macro_export]
macro_rules! polygon {
    ($( [$( $x:expr ),* $(,)?] ),* $(,)?) => {
        $crate::geometry::Geometry::Polygon(vec![
            $($crate::geometry::close_ring($crate::coords![$($x),*])),*
        ])
    };
}
