use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::models::Point;

/// A dense `N x N` matrix stored as rows.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::{Point2, SquareMatrix};
///
/// let m = SquareMatrix::from_rows([Point2::xy(2.0, 0.0), Point2::xy(0.0, 4.0)]);
/// let inverse = m.inverse();
///
/// assert_eq!(m * inverse, SquareMatrix::identity());
/// assert_eq!(m.mul_vec(&Point2::xy(1.0, 1.0)), Point2::xy(2.0, 4.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareMatrix<const N: usize> {
    rows: [Point<N>; N],
}

impl<const N: usize> Default for SquareMatrix<N> {
    fn default() -> Self {
        Self { rows: [Point::zero(); N] }
    }
}

impl<const N: usize> SquareMatrix<N> {
    pub fn from_rows(rows: [Point<N>; N]) -> Self {
        Self { rows }
    }

    /// `value` on the diagonal, zero elsewhere.
    pub fn scalar(value: f64) -> Self {
        let mut matrix = Self::default();
        for i in 0..N {
            matrix.rows[i][i] = value;
        }
        matrix
    }

    pub fn identity() -> Self {
        Self::scalar(1.0)
    }

    /// The outer product `a bᵀ`.
    pub fn outer_product(a: &Point<N>, b: &Point<N>) -> Self {
        let mut matrix = Self::default();
        for i in 0..N {
            matrix.rows[i] = *b * a[i];
        }
        matrix
    }

    /// Returns the element at `(row, col)`, or `None` when out of range.
    pub fn at(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.coords.get(col).copied())
    }

    pub fn row(&self, row: usize) -> Option<&Point<N>> {
        self.rows.get(row)
    }

    pub fn transpose(&self) -> Self {
        let mut matrix = Self::default();
        for i in 0..N {
            for j in 0..N {
                matrix.rows[j][i] = self.rows[i][j];
            }
        }
        matrix
    }

    pub fn mul_vec(&self, v: &Point<N>) -> Point<N> {
        let mut out = Point::zero();
        for i in 0..N {
            out[i] = self.rows[i].dot(v);
        }
        out
    }

    /// Gauss-Jordan inverse with partial pivoting.
    ///
    /// A singular matrix has no inverse; the identity is returned instead so
    /// callers always get a usable transform.
    pub fn inverse(&self) -> Self {
        let mut a = *self;
        let mut inv = Self::identity();
        for step in 0..N {
            let pivot = (step..N)
                .max_by(|&i, &j| a.rows[i][step].abs().total_cmp(&a.rows[j][step].abs()))
                .unwrap_or(step);
            if a.rows[pivot][step].abs() <= f64::EPSILON {
                return Self::identity();
            }
            a.rows.swap(step, pivot);
            inv.rows.swap(step, pivot);

            let diag = a.rows[step][step];
            a.rows[step] /= diag;
            inv.rows[step] /= diag;

            for row in 0..N {
                if row == step {
                    continue;
                }
                let factor = a.rows[row][step];
                if factor == 0.0 {
                    continue;
                }
                let (a_step, inv_step) = (a.rows[step], inv.rows[step]);
                a.rows[row] -= a_step * factor;
                inv.rows[row] -= inv_step * factor;
            }
        }
        inv
    }
}

impl<const N: usize> Add for SquareMatrix<N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (row, other) in self.rows.iter_mut().zip(rhs.rows.iter()) {
            *row += *other;
        }
        self
    }
}

impl<const N: usize> Sub for SquareMatrix<N> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (row, other) in self.rows.iter_mut().zip(rhs.rows.iter()) {
            *row -= *other;
        }
        self
    }
}

impl<const N: usize> Mul for SquareMatrix<N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let columns = rhs.transpose();
        let mut out = Self::default();
        for i in 0..N {
            for j in 0..N {
                out.rows[i][j] = self.rows[i].dot(&columns.rows[j]);
            }
        }
        out
    }
}

impl<const N: usize> Mul<f64> for SquareMatrix<N> {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        for row in self.rows.iter_mut() {
            *row *= rhs;
        }
        self
    }
}

impl<const N: usize> Div<f64> for SquareMatrix<N> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self * (1.0 / rhs)
    }
}

impl<const N: usize> Mul<Point<N>> for SquareMatrix<N> {
    type Output = Point<N>;

    fn mul(self, rhs: Point<N>) -> Point<N> {
        self.mul_vec(&rhs)
    }
}

impl<const N: usize> fmt::Display for SquareMatrix<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.rows.iter() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
