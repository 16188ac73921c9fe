//! Dense linear-system solving for cycle balancing.
//!
//! Gaussian elimination with partial pivoting: each column picks the
//! largest-magnitude pivot among the remaining rows to bound numerical
//! error. Recipe ratios are floating point, so singularity is detected
//! against a small epsilon rather than exact zero.

/// Pivot magnitude below which the matrix is treated as singular.
const SINGULAR_EPS: f64 = 1e-9;

/// Solve `matrix * x = constants` for `x`.
///
/// `matrix` must be square with one row per constant. Returns `None` when
/// the matrix is singular (no usable pivot in some column).
pub fn solve(matrix: &[Vec<f64>], constants: &[f64]) -> Option<Vec<f64>> {
    let n = constants.len();
    debug_assert!(matrix.len() == n && matrix.iter().all(|row| row.len() == n));
    if n == 0 {
        return Some(Vec::new());
    }

    // Work on an augmented copy; inputs stay untouched.
    let mut a: Vec<Vec<f64>> = matrix
        .iter()
        .zip(constants)
        .map(|(row, &c)| {
            let mut r = row.clone();
            r.push(c);
            r
        })
        .collect();

    // Forward elimination with partial pivoting.
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < SINGULAR_EPS {
            return None;
        }
        a.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    // Back substitution.
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = a[row][n];
        for (col, &xv) in x.iter().enumerate().skip(row + 1) {
            acc -= a[row][col] * xv;
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}
