//! Circle and axis-aligned square predicates used by the neighbour search.

use crate::models::Point2;

/// True when `point` lies strictly inside the circle.
pub fn point_in_circle(center: &Point2, radius: f64, point: &Point2) -> bool {
    (*point - *center).norm_squared() < radius * radius
}

/// True when the whole circle lies inside the square `[leftbottom, righttop]`.
pub fn circle_inside_square(leftbottom: &Point2, righttop: &Point2, center: &Point2, radius: f64) -> bool {
    let low = *center - Point2::xy(radius, radius);
    let high = *center + Point2::xy(radius, radius);
    low.all_ge(leftbottom) && high.all_le(righttop)
}

/// True when the circle and the square `[leftbottom, righttop]` overlap.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::Point2;
/// use rs_gas_collapse::tree::square_circle_intersection;
///
/// let lb = Point2::xy(0.0, 0.0);
/// let rt = Point2::xy(1.0, 1.0);
///
/// assert!(square_circle_intersection(&lb, &rt, &Point2::xy(1.5, 0.5), 0.6));
/// assert!(!square_circle_intersection(&lb, &rt, &Point2::xy(1.5, 1.5), 0.6));
/// ```
pub fn square_circle_intersection(leftbottom: &Point2, righttop: &Point2, center: &Point2, radius: f64) -> bool {
    let closest = center.clamp(leftbottom, righttop);
    (*center - closest).norm_squared() < radius * radius
}
