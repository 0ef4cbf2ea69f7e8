//! Dense operations on small fixed-size matrices.
//!
//! The laminate kernel only ever deals with 3×3 ply and 6×6 laminate matrices,
//! so everything here works on stack-allocated [`SMatrix`] values and is
//! generic over the dimension.

use nalgebra::{DMatrix, Matrix3, Matrix6, SMatrix};

use crate::errors::MatrixError;

/// Relative pivot magnitude below which a matrix is treated as singular.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1.0e-14;

/// Multiply two matrices.
#[must_use]
pub fn multiply<const R: usize, const K: usize, const C: usize>(
    a: &SMatrix<f64, R, K>,
    b: &SMatrix<f64, K, C>,
) -> SMatrix<f64, R, C> {
    a * b
}

/// Return the transpose of a matrix.
#[must_use]
pub fn transpose<const R: usize, const C: usize>(a: &SMatrix<f64, R, C>) -> SMatrix<f64, C, R> {
    a.transpose()
}

/// Invert a square matrix using [`DEFAULT_PIVOT_TOLERANCE`].
///
/// # Errors
///
/// Returns [`MatrixError::Singular`] when a pivot vanishes.
///
/// # Examples
/// ```
/// use laminax::matrix::inverse;
/// use nalgebra::Matrix3;
///
/// let a = Matrix3::new(4.0, 1.0, 0.0, 1.0, 3.0, 0.0, 0.0, 0.0, 2.0);
/// let a_inv = inverse(&a).expect("well conditioned");
/// assert!((a * a_inv - Matrix3::identity()).amax() < 1.0e-12);
/// ```
pub fn inverse<const N: usize>(a: &SMatrix<f64, N, N>) -> Result<SMatrix<f64, N, N>, MatrixError> {
    inverse_with_tolerance(a, DEFAULT_PIVOT_TOLERANCE)
}

/// Invert a square matrix through its LU decomposition.
///
/// A pivot of `U` is rejected when its magnitude is at most `tolerance` times
/// the largest absolute entry of `a`, which keeps the test independent of the
/// unit system the stiffness terms are expressed in.
///
/// # Errors
///
/// Returns [`MatrixError::Singular`] naming the first vanishing pivot.
pub fn inverse_with_tolerance<const N: usize>(
    a: &SMatrix<f64, N, N>,
    tolerance: f64,
) -> Result<SMatrix<f64, N, N>, MatrixError> {
    let scale = a.amax();
    if !scale.is_finite() || scale == 0.0 {
        return Err(MatrixError::Singular {
            pivot: 0,
            magnitude: scale,
        });
    }
    let threshold = tolerance * scale;

    let lu = DMatrix::from_column_slice(N, N, a.as_slice()).lu();
    if let Some((pivot, magnitude)) = lu
        .u()
        .diagonal()
        .iter()
        .map(|value| value.abs())
        .enumerate()
        .find(|(_, magnitude)| magnitude.is_nan() || *magnitude <= threshold)
    {
        return Err(MatrixError::Singular { pivot, magnitude });
    }

    let inverse = lu.try_inverse().ok_or(MatrixError::Singular {
        pivot: N.saturating_sub(1),
        magnitude: 0.0,
    })?;
    Ok(SMatrix::from_column_slice(inverse.as_slice()))
}

/// Check whether a square matrix is symmetric to a relative tolerance.
#[must_use]
pub fn is_symmetric<const N: usize>(a: &SMatrix<f64, N, N>, tolerance: f64) -> bool {
    let scale = a.amax().max(f64::MIN_POSITIVE);
    (0..N).all(|i| (0..i).all(|j| (a[(i, j)] - a[(j, i)]).abs() <= tolerance * scale))
}

/// Assemble the 6×6 ABD matrix from its 3×3 blocks.
#[must_use]
pub fn block_symmetric(a: &Matrix3<f64>, b: &Matrix3<f64>, d: &Matrix3<f64>) -> Matrix6<f64> {
    let mut abd = Matrix6::zeros();
    abd.fixed_view_mut::<3, 3>(0, 0).copy_from(a);
    abd.fixed_view_mut::<3, 3>(0, 3).copy_from(b);
    abd.fixed_view_mut::<3, 3>(3, 0).copy_from(b);
    abd.fixed_view_mut::<3, 3>(3, 3).copy_from(d);
    abd
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Matrix2x3, Matrix3x2};

    use super::*;

    fn spd6() -> Matrix6<f64> {
        let mut m = Matrix6::zeros();
        for i in 0..6 {
            for j in 0..6 {
                m[(i, j)] = 1.0 / (1.0 + (i as f64 - j as f64).abs());
            }
            m[(i, i)] += 4.0;
        }
        m
    }

    #[test]
    fn inverse_of_inverse_recovers_3x3() {
        let a = Matrix3::new(37_892.0, 1_647.9, 0.0, 1_647.9, 37_892.0, 0.0, 0.0, 0.0, 2_250.0);
        let twice = inverse(&inverse(&a).expect("invertible")).expect("invertible");
        assert_relative_eq!(twice, a, max_relative = 1.0e-10);
    }

    #[test]
    fn inverse_of_inverse_recovers_6x6() {
        let a = spd6();
        let twice = inverse(&inverse(&a).expect("invertible")).expect("invertible");
        assert_relative_eq!(twice, a, max_relative = 1.0e-10);
    }

    #[test]
    fn inverse_handles_row_exchanges() {
        let a = Matrix3::new(0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 5.0);
        let a_inv = inverse(&a).expect("permutation-like matrix is invertible");
        assert_relative_eq!(a * a_inv, Matrix3::identity(), epsilon = 1.0e-14);
    }

    #[test]
    fn singular_matrix_is_reported() {
        let a = Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0);
        let error = inverse(&a).expect_err("rank deficient");
        assert!(matches!(error, MatrixError::Singular { pivot: 1, .. }));
    }

    #[test]
    fn zero_matrix_is_singular() {
        let error = inverse(&Matrix6::<f64>::zeros()).expect_err("zero matrix");
        assert_eq!(
            error,
            MatrixError::Singular {
                pivot: 0,
                magnitude: 0.0
            }
        );
    }

    #[test]
    fn singular_pivot_reports_its_magnitude() {
        let a = Matrix3::new(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 1.0e-20);
        let error = inverse(&a).expect_err("vanishing last pivot");
        assert_eq!(
            error,
            MatrixError::Singular {
                pivot: 2,
                magnitude: 1.0e-20
            }
        );
    }

    #[test]
    fn tolerance_is_relative_to_the_largest_entry() {
        let a = Matrix3::new(1.0e6, 0.0, 0.0, 0.0, 1.0e6, 0.0, 0.0, 0.0, 1.0e-3);
        assert!(inverse(&a).is_ok());
        assert!(inverse_with_tolerance(&a, 1.0e-8).is_err());
    }

    #[test]
    fn vanishing_shear_term_is_singular() {
        let a = Matrix3::new(17_625.0, 0.0, 0.0, 0.0, 1_167.5, 0.0, 0.0, 0.0, 1.0e-22);
        assert!(inverse(&a).is_err());
    }

    #[test]
    fn multiply_and_transpose_agree_with_hand_calculation() {
        let a = Matrix2x3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let b: Matrix3x2<f64> = transpose(&a);
        let product = multiply(&a, &b);
        assert_eq!(product, nalgebra::Matrix2::new(14.0, 32.0, 32.0, 77.0));
    }

    #[test]
    fn block_assembly_is_symmetric() {
        let a = Matrix3::new(3.0, 1.0, 0.0, 1.0, 3.0, 0.0, 0.0, 0.0, 1.0);
        let b = Matrix3::new(0.1, 0.0, 0.2, 0.0, -0.1, 0.0, 0.2, 0.0, 0.0);
        let d = a * 0.01;
        let abd = block_symmetric(&a, &b, &d);
        assert!(is_symmetric(&abd, 1.0e-15));
        assert_eq!(abd[(0, 5)], 0.2);
        assert_eq!(abd[(5, 0)], 0.2);
    }
}
