//! Small dense linear algebra for the shooting solver
//!
//! Determinant by cofactor expansion along the first row, inverse by
//! adjugate / determinant, and matrix-vector products. Meant for the 3 x 3
//! Jacobians of the Newton step (and the minors they recurse into), not for
//! large systems: expansion is O(n!).

use nalgebra::{DMatrix, DVector};

use super::error::LinAlgError;

/// |det| at or below this fraction of the Hadamard bound (product of row norms)
/// counts as zero
pub const SINGULAR_RTOL: f64 = 1e-12;

/// Determinant of a square matrix
pub fn determinant(m: &DMatrix<f64>) -> Result<f64, LinAlgError> {
    check_square(m)?;
    Ok(cofactor_expansion(m))
}

// m without row `row` and column `col`, m must be at least 1 x 1
fn minor(m: &DMatrix<f64>, row: usize, col: usize) -> DMatrix<f64> {
    let n = m.nrows();
    let k = m.ncols();
    DMatrix::from_fn(n - 1, k - 1, |i, j| {
        let si = if i >= row { i + 1 } else { i };
        let sj = if j >= col { j + 1 } else { j };
        m[(si, sj)]
    })
}

/// Matrix of signed minor determinants, C_ij = (-1)^(i+j) det(M_ij)
pub fn cofactor_matrix(m: &DMatrix<f64>) -> Result<DMatrix<f64>, LinAlgError> {
    let n = check_square(m)?;
    if n == 1 {
        // the only minor is 0 x 0, whose determinant is 1
        return Ok(DMatrix::from_element(1, 1, 1.0));
    }
    Ok(DMatrix::from_fn(n, n, |i, j| {
        sign(i + j) * cofactor_expansion(&minor(m, i, j))
    }))
}

/// Inverse via adjugate (transposed cofactor matrix) divided by the determinant.
/// Fails with `SingularMatrix` instead of dividing by a (numerically) zero determinant.
pub fn inverse(m: &DMatrix<f64>) -> Result<DMatrix<f64>, LinAlgError> {
    let det = determinant(m)?;
    if is_singular(m, det) {
        return Err(LinAlgError::SingularMatrix { determinant: det });
    }
    let adjugate = cofactor_matrix(m)?.transpose();
    Ok(adjugate / det)
}

/// `m * x`
pub fn multiply(m: &DMatrix<f64>, x: &DVector<f64>) -> Result<DVector<f64>, LinAlgError> {
    if m.ncols() != x.len() {
        return Err(LinAlgError::DimensionMismatch {
            expected: m.ncols(),
            found: x.len(),
        });
    }
    Ok(m * x)
}

fn check_square(m: &DMatrix<f64>) -> Result<usize, LinAlgError> {
    let (rows, cols) = m.shape();
    if rows == 0 || cols == 0 {
        return Err(LinAlgError::Empty);
    }
    if rows != cols {
        return Err(LinAlgError::NotSquare { rows, cols });
    }
    Ok(rows)
}

// m must be square and non-empty
fn cofactor_expansion(m: &DMatrix<f64>) -> f64 {
    match m.nrows() {
        1 => m[(0, 0)],
        2 => m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        n => (0..n)
            .map(|j| sign(j) * m[(0, j)] * cofactor_expansion(&minor(m, 0, j)))
            .sum(),
    }
}

fn is_singular(m: &DMatrix<f64>, det: f64) -> bool {
    if det == 0.0 || !det.is_finite() {
        return true;
    }
    let bound: f64 = m.row_iter().map(|r| r.norm()).product();
    det.abs() <= SINGULAR_RTOL * bound
}

fn sign(k: usize) -> f64 {
    if k % 2 == 0 { 1.0 } else { -1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn m3(rows: [[f64; 3]; 3]) -> DMatrix<f64> {
        DMatrix::from_fn(3, 3, |i, j| rows[i][j])
    }

    #[test]
    fn det_2x2() {
        let m = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        assert_eq!(determinant(&m).unwrap(), 4.0 * 6.0 - 7.0 * 2.0);
    }

    #[test]
    fn det_3x3() {
        let m = m3([[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]]);
        assert_abs_diff_eq!(determinant(&m).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn det_4x4_matches_nalgebra() {
        let m = DMatrix::from_row_slice(
            4,
            4,
            &[
                2.0, -1.0, 0.0, 3.0, //
                1.0, 4.0, -2.0, 0.5, //
                0.0, 1.0, 3.0, -1.0, //
                5.0, 0.0, 1.0, 2.0,
            ],
        );
        assert_abs_diff_eq!(determinant(&m).unwrap(), m.determinant(), epsilon = 1e-9);
    }

    #[test]
    fn cofactors_3x3() {
        let m = m3([[1.0, 0.0, 1.0], [2.0, -2.0, -1.0], [3.0, 0.0, 0.0]]);
        let c = cofactor_matrix(&m).unwrap();
        let expected = m3([[0.0, -3.0, 6.0], [0.0, -3.0, 0.0], [2.0, 3.0, -2.0]]);
        assert_abs_diff_eq!(c, expected, epsilon = 1e-12);
    }

    #[test]
    fn inverse_3x3() {
        let m = m3([[1.0, 0.0, 1.0], [2.0, -2.0, -1.0], [3.0, 0.0, 0.0]]);
        let inv = inverse(&m).unwrap();
        let expected = m3([
            [0.0, 0.0, 1.0 / 3.0],
            [-0.5, -0.5, 0.5],
            [1.0, 0.0, -1.0 / 3.0],
        ]);
        assert_abs_diff_eq!(inv, expected, epsilon = 1e-12);

        let m = m3([[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]]);
        let inv = inverse(&m).unwrap();
        let expected = m3([[-24.0, 18.0, 5.0], [20.0, -15.0, -4.0], [-5.0, 4.0, 1.0]]);
        assert_abs_diff_eq!(inv, expected, epsilon = 1e-9);
    }

    #[test]
    fn inverse_1x1_and_2x2() {
        let m = DMatrix::from_element(1, 1, 4.0);
        assert_abs_diff_eq!(inverse(&m).unwrap()[(0, 0)], 0.25);

        let m = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let expected = DMatrix::from_row_slice(2, 2, &[0.6, -0.7, -0.2, 0.4]);
        assert_abs_diff_eq!(inverse(&m).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn singular_is_reported() {
        let m = m3([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 1.0]]);
        assert!(matches!(inverse(&m), Err(LinAlgError::SingularMatrix { .. })));

        // zero column, the shape of a Jacobian blind to one velocity component
        let m = m3([[3.0, 1.0, 0.0], [1.0, 2.0, 0.0], [4.0, 5.0, 0.0]]);
        assert!(matches!(inverse(&m), Err(LinAlgError::SingularMatrix { .. })));
    }

    #[test]
    fn shape_errors() {
        let rect = DMatrix::from_row_slice(2, 3, &[1.0, 3.0, 4.0, 2.0, 1.0, 6.0]);
        assert_eq!(
            determinant(&rect),
            Err(LinAlgError::NotSquare { rows: 2, cols: 3 })
        );
        assert_eq!(determinant(&DMatrix::zeros(0, 0)), Err(LinAlgError::Empty));

        let x = DVector::from_vec(vec![1.0, 2.0]);
        assert_eq!(
            multiply(&rect, &x),
            Err(LinAlgError::DimensionMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    fn inverse_undoes_multiply() {
        let matrices = [
            DMatrix::from_element(1, 1, -2.5),
            DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]),
            m3([[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]]),
            DMatrix::from_row_slice(
                4,
                4,
                &[
                    2.0, -1.0, 0.0, 3.0, //
                    1.0, 4.0, -2.0, 0.5, //
                    0.0, 1.0, 3.0, -1.0, //
                    5.0, 0.0, 1.0, 2.0,
                ],
            ),
        ];

        for m in &matrices {
            let n = m.nrows();
            let inv = inverse(m).unwrap();
            for k in 0..3 {
                let b = DVector::from_fn(n, |i, _| (i as f64 + 1.0) * (k as f64 - 1.5) + 0.25 * k as f64);
                let x = multiply(&inv, &b).unwrap();
                let back = multiply(m, &x).unwrap();
                assert_abs_diff_eq!(back, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn minor_drops_row_and_column() {
        let m = m3([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(minor(&m, 1, 1), DMatrix::from_row_slice(2, 2, &[1.0, 3.0, 7.0, 9.0]));
        assert_eq!(minor(&m, 0, 2), DMatrix::from_row_slice(2, 2, &[4.0, 5.0, 7.0, 8.0]));
    }

    #[test]
    fn multiply_rectangular() {
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 3.0, 4.0, 2.0, 1.0, 6.0]);
        let x = DVector::from_vec(vec![4.0, 2.0, -1.0]);
        let b = multiply(&a, &x).unwrap();
        assert_eq!(b.as_slice(), &[6.0, 4.0]);
    }
}
