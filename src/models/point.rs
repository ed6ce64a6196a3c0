use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// A fixed-dimension point (or vector) of `f64` components.
///
/// Arithmetic is component-wise; scaling is by `f64` on either side.
/// Ordering comparisons hold only when they hold for *every* component, which is
/// what the tree needs for bounding-box tests, so `Point` does not implement `PartialOrd`.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::Point2;
///
/// let a = Point2::xy(1.0, 2.0);
/// let b = Point2::xy(3.0, -1.0);
///
/// assert_eq!(a + b, Point2::xy(4.0, 1.0));
/// assert_eq!(2.0 * a, Point2::xy(2.0, 4.0));
/// assert_eq!(a.dot(&b), 1.0);
/// assert!(b.all_ge(&Point2::xy(3.0, -1.0)));
/// assert!(!a.all_ge(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const N: usize> {
    pub coords: [f64; N],
}

/// The two-dimensional point used by the whole simulation.
pub type Point2 = Point<2>;

impl<const N: usize> Default for Point<N> {
    fn default() -> Self {
        Self { coords: [0.0; N] }
    }
}

impl<const N: usize> Point<N> {
    pub const fn new(coords: [f64; N]) -> Self {
        Self { coords }
    }

    pub const fn zero() -> Self {
        Self { coords: [0.0; N] }
    }

    pub const fn dims(&self) -> usize {
        N
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.coords.iter().zip(other.coords.iter()).map(|(a, b)| a * b).sum()
    }

    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Applies `f` to every component.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self { coords: self.coords.map(f) }
    }

    /// Combines two points component by component.
    pub fn zip_with(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut coords = self.coords;
        for (c, o) in coords.iter_mut().zip(other.coords.iter()) {
            *c = f(*c, *o);
        }
        Self { coords }
    }

    /// Component-wise clamp into the box `[low, high]`.
    pub fn clamp(self, low: &Self, high: &Self) -> Self {
        self.zip_with(*low, f64::max).zip_with(*high, f64::min)
    }

    fn all(&self, other: &Self, cmp: impl Fn(f64, f64) -> bool) -> bool {
        self.coords.iter().zip(other.coords.iter()).all(|(a, b)| cmp(*a, *b))
    }

    pub fn all_gt(&self, other: &Self) -> bool {
        self.all(other, |a, b| a > b)
    }

    pub fn all_ge(&self, other: &Self) -> bool {
        self.all(other, |a, b| a >= b)
    }

    pub fn all_lt(&self, other: &Self) -> bool {
        self.all(other, |a, b| a < b)
    }

    pub fn all_le(&self, other: &Self) -> bool {
        self.all(other, |a, b| a <= b)
    }
}

impl Point<2> {
    pub const fn xy(x: f64, y: f64) -> Self {
        Self { coords: [x, y] }
    }

    pub fn x(&self) -> f64 {
        self.coords[0]
    }

    pub fn y(&self) -> f64 {
        self.coords[1]
    }
}

impl<const N: usize> From<[f64; N]> for Point<N> {
    fn from(coords: [f64; N]) -> Self {
        Self { coords }
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::xy(x, y)
    }
}

impl<const N: usize> Index<usize> for Point<N> {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.coords[index]
    }
}

impl<const N: usize> IndexMut<usize> for Point<N> {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.coords[index]
    }
}

impl<const N: usize> Add for Point<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl<const N: usize> Sub for Point<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl<const N: usize> Mul<f64> for Point<N> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.map(|c| c * rhs)
    }
}

impl<const N: usize> Mul<Point<N>> for f64 {
    type Output = Point<N>;

    fn mul(self, rhs: Point<N>) -> Point<N> {
        rhs * self
    }
}

impl<const N: usize> Div<f64> for Point<N> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.map(|c| c / rhs)
    }
}

impl<const N: usize> Neg for Point<N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|c| -c)
    }
}

impl<const N: usize> AddAssign for Point<N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const N: usize> SubAssign for Point<N> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const N: usize> MulAssign<f64> for Point<N> {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl<const N: usize> DivAssign<f64> for Point<N> {
    fn div_assign(&mut self, rhs: f64) {
        *self = *self / rhs;
    }
}

impl<const N: usize> fmt::Display for Point<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}
