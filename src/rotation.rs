//! Extraction of rotation quaternions from rotation matrices.

use nalgebra::{Matrix3, Quaternion};

/// Computes the quaternion corresponding to the given rotation matrix.
///
/// Uses Shepperd's method: the quaternion component with the largest
/// magnitude is computed first from the trace or the largest diagonal element,
/// and the remaining components are derived from it. This avoids dividing by
/// a small number for rotations close to 180 degrees, where the naive
/// trace-based formula breaks down.
///
/// The returned quaternion has a non-negative real part. It is of unit length
/// only to the extent that the input is an orthonormal matrix.
pub fn quaternion_from_rotation_matrix(matrix: &Matrix3<f64>) -> Quaternion<f64> {
    let m = |row: usize, col: usize| matrix[(row, col)];

    let trace = matrix.trace();

    let (w, x, y, z) = if trace > 0.0 {
        let s = 2.0 * (1.0 + trace).sqrt();
        (
            0.25 * s,
            (m(2, 1) - m(1, 2)) / s,
            (m(0, 2) - m(2, 0)) / s,
            (m(1, 0) - m(0, 1)) / s,
        )
    } else if m(0, 0) > m(1, 1) && m(0, 0) > m(2, 2) {
        let s = 2.0 * (1.0 + m(0, 0) - m(1, 1) - m(2, 2)).sqrt();
        (
            (m(2, 1) - m(1, 2)) / s,
            0.25 * s,
            (m(0, 1) + m(1, 0)) / s,
            (m(0, 2) + m(2, 0)) / s,
        )
    } else if m(1, 1) > m(2, 2) {
        let s = 2.0 * (1.0 + m(1, 1) - m(0, 0) - m(2, 2)).sqrt();
        (
            (m(0, 2) - m(2, 0)) / s,
            (m(0, 1) + m(1, 0)) / s,
            0.25 * s,
            (m(1, 2) + m(2, 1)) / s,
        )
    } else {
        let s = 2.0 * (1.0 + m(2, 2) - m(0, 0) - m(1, 1)).sqrt();
        (
            (m(1, 0) - m(0, 1)) / s,
            (m(0, 2) + m(2, 0)) / s,
            (m(1, 2) + m(2, 1)) / s,
            0.25 * s,
        )
    };

    let quaternion = Quaternion::new(w, x, y, z);
    if w < 0.0 { -quaternion } else { quaternion }
}
