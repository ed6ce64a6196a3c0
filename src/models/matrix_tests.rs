use approx::assert_relative_eq;

use crate::models::{Point, Point2, SquareMatrix};

fn assert_matrix_eq<const N: usize>(a: &SquareMatrix<N>, b: &SquareMatrix<N>) {
    for i in 0..N {
        for j in 0..N {
            assert_relative_eq!(
                a.at(i, j).unwrap(),
                b.at(i, j).unwrap(),
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn test_identity_and_scalar() {
    let identity = SquareMatrix::<3>::identity();
    assert_eq!(identity.at(0, 0), Some(1.0));
    assert_eq!(identity.at(0, 1), Some(0.0));
    assert_eq!(identity.at(3, 0), None);
    assert_eq!(SquareMatrix::<2>::scalar(3.0) * 2.0, SquareMatrix::scalar(6.0));
    assert_eq!(SquareMatrix::<2>::scalar(3.0) / 3.0, SquareMatrix::identity());
}

#[test]
fn test_matrix_arithmetic() {
    let a = SquareMatrix::from_rows([Point2::xy(1.0, 2.0), Point2::xy(3.0, 4.0)]);
    let b = SquareMatrix::from_rows([Point2::xy(0.0, 1.0), Point2::xy(1.0, 0.0)]);

    let product = a * b;
    assert_eq!(product, SquareMatrix::from_rows([Point2::xy(2.0, 1.0), Point2::xy(4.0, 3.0)]));
    assert_eq!(a + b - b, a);
    assert_eq!(a * SquareMatrix::identity(), a);
    assert_eq!(a * Point2::xy(1.0, 1.0), Point2::xy(3.0, 7.0));
    assert_eq!(a.transpose().row(0), Some(&Point2::xy(1.0, 3.0)));
}

#[test]
fn test_outer_product() {
    let m = SquareMatrix::outer_product(&Point2::xy(1.0, 2.0), &Point2::xy(3.0, 4.0));
    assert_eq!(m, SquareMatrix::from_rows([Point2::xy(3.0, 4.0), Point2::xy(6.0, 8.0)]));
}

#[test]
fn test_inverse_with_negative_and_zero_pivots() {
    let a = SquareMatrix::from_rows([
        Point::new([0.0, 2.0, -1.0]),
        Point::new([-3.0, 1.0, 4.0]),
        Point::new([2.0, -5.0, 1.0]),
    ]);
    let inverse = a.inverse();
    assert_matrix_eq(&(a * inverse), &SquareMatrix::identity());
    assert_matrix_eq(&(inverse * a), &SquareMatrix::identity());
}

#[test]
fn test_singular_inverse_is_identity() {
    let singular = SquareMatrix::from_rows([Point2::xy(1.0, 2.0), Point2::xy(2.0, 4.0)]);
    assert_eq!(singular.inverse(), SquareMatrix::identity());
}
