//! Rotation and affine helpers shared by the geometry derivations.
use crate::error::{ConvertError, Result};
use nalgebra::{Matrix3, Matrix4, Vector3};

/// A 3x3 linear transformation.
pub type Affine3 = Matrix3<f64>;
/// A 4x4 homogeneous affine transformation.
pub type Affine4 = Matrix4<f64>;

/// Tolerance on `b² + c² + d²` exceeding 1 before a quaternion is rejected.
const QUATERNION_THRESHOLD: f64 = 1e-6;

/// Component-wise sign flip from RAS+ world coordinates to LPS+.
pub const RAS_TO_LPS: [f64; 3] = [-1., -1., 1.];

/// Separate a 4x4 affine into its 3x3 affine and translation components.
pub fn get_affine_and_translation(affine: &Affine4) -> (Affine3, Vector3<f64>) {
    let translation = Vector3::new(affine[(0, 3)], affine[(1, 3)], affine[(2, 3)]);
    let affine = affine.fixed_view::<3, 3>(0, 0).into_owned();
    (affine, translation)
}

/// Build a 4x4 affine from its three stored rows.
pub fn affine_from_rows(x: &[f32; 4], y: &[f32; 4], z: &[f32; 4]) -> Affine4 {
    let mut affine = Affine4::identity();
    for (r, row) in [x, y, z].iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            affine[(r, c)] = f64::from(*v);
        }
    }
    affine
}

/// Reconstruct the rotation matrix of a unit quaternion from its last
/// three components, with the first one taken as
/// `a = sqrt(1 - b² - c² - d²)`.
///
/// Rounding may push `b² + c² + d²` slightly above 1, in which case `a` is
/// 0, which corresponds to a 180 degree rotation.
///
/// # Errors
///
/// - `ConvertError::UnsupportedGeometry` if the components are not finite
/// or clearly do not belong to a unit quaternion.
pub fn quaternion_to_rotation(b: f64, c: f64, d: f64) -> Result<Affine3> {
    let bcd = b * b + c * c + d * d;
    if !bcd.is_finite() || bcd > 1. + QUATERNION_THRESHOLD {
        return Err(ConvertError::geometry(
            "NIfTI",
            format!("quaternion ({}, {}, {}) is not a unit quaternion", b, c, d),
        ));
    }
    let a = (1. - bcd).max(0.).sqrt();
    #[rustfmt::skip]
    let rotation = Affine3::new(
        a * a + b * b - c * c - d * d, 2. * b * c - 2. * a * d,       2. * b * d + 2. * a * c,
        2. * b * c + 2. * a * d,       a * a + c * c - b * b - d * d, 2. * c * d - 2. * a * b,
        2. * b * d - 2. * a * c,       2. * c * d + 2. * a * b,       a * a + d * d - c * c - b * b,
    );
    Ok(rotation)
}

/// Apply a component-wise sign vector.
pub fn flip(v: &Vector3<f64>, signs: [f64; 3]) -> Vector3<f64> {
    Vector3::new(v.x * signs[0], v.y * signs[1], v.z * signs[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_quaternion() {
        let r = quaternion_to_rotation(0., 0., 0.).unwrap();
        assert_eq!(r, Affine3::identity());
    }

    #[test]
    fn half_turn_about_z() {
        let r = quaternion_to_rotation(0., 0., 1.).unwrap();
        assert_abs_diff_eq!(r, Affine3::from_diagonal(&Vector3::new(-1., -1., 1.)), epsilon = 1e-12);
    }

    #[test]
    fn rotation_is_orthonormal() {
        let (b, c, d) = (0.1, -0.3, 0.25);
        let r = quaternion_to_rotation(b, c, d).unwrap();
        assert_abs_diff_eq!(r * r.transpose(), Affine3::identity(), epsilon = 1e-12);
        assert_abs_diff_eq!(r.determinant(), 1., epsilon = 1e-12);
    }

    #[test]
    fn rounding_tolerated() {
        let r = quaternion_to_rotation(0., 1.0000001, 0.).unwrap();
        assert_abs_diff_eq!(r[(1, 1)], 1., epsilon = 1e-6);
        assert!(quaternion_to_rotation(0.9, 0.9, 0.).is_err());
        assert!(quaternion_to_rotation(f64::NAN, 0., 0.).is_err());
    }

    #[test]
    fn affine_split() {
        let a = affine_from_rows(
            &[2., 0., 0., -10.],
            &[0., 3., 0., 20.],
            &[0., 0., 4., 30.],
        );
        let (m, t) = get_affine_and_translation(&a);
        assert_eq!(m, Affine3::from_diagonal(&Vector3::new(2., 3., 4.)));
        assert_eq!(t, Vector3::new(-10., 20., 30.));
        assert_eq!(flip(&t, RAS_TO_LPS), Vector3::new(10., -20., 30.));
    }
}
