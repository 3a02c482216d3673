//! # Fixed reference frames and rotation helpers
//!
//! The engine only knows two inertial frames, both tied to the J2000 mean equinox:
//!
//! - [`RefFrame::EclipticJ2000`]: mean ecliptic and equinox of J2000, the frame in which
//!   asteroid and comet elements are published,
//! - [`RefFrame::EquatorialJ2000`]: mean equator and equinox of J2000 (ICRF-aligned to the
//!   precision relevant here), the frame in which state vectors are usually exchanged.
//!
//! The rotation between them is a constant matrix built from the J2000 obliquity
//! (84381.406″). No precession or nutation is ever applied.

use std::fmt;

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Radian, OBLIQUITY_J2000_ARCSEC, RADSEC};

/// Inertial frame tag carried by every [`StateVector`](crate::orbit_type::state_vector::StateVector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefFrame {
    /// Mean ecliptic and equinox of J2000.
    #[default]
    EclipticJ2000,
    /// Mean equator and equinox of J2000.
    EquatorialJ2000,
}

impl fmt::Display for RefFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefFrame::EclipticJ2000 => write!(f, "ecliptic J2000"),
            RefFrame::EquatorialJ2000 => write!(f, "equatorial J2000"),
        }
    }
}

/// Principal axis used by [`rotmt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Mean obliquity of the ecliptic at J2000, in radians.
pub fn obliquity_j2000() -> Radian {
    OBLIQUITY_J2000_ARCSEC * RADSEC
}

/// Rotation matrix taking equatorial J2000 coordinates to ecliptic J2000 coordinates.
///
/// The coefficients are the cosine and sine of the J2000 obliquity (84381.406″)
/// written out to full precision, so that results agree bit-for-bit with published
/// ephemeris tools using the same constant. The inverse rotation is the transpose.
pub fn ecliptic_j2000_matrix() -> Matrix3<f64> {
    const C: f64 = 0.917_482_137_086_962_521_575_615_807_374;
    const S: f64 = 0.397_776_982_901_650_696_710_316_869_067;
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, C, S, //
        0.0, -S, C,
    )
}

/// Rotation matrix between two fixed frames, such that `x_to = R · x_from`.
///
/// Arguments
/// -----------------
/// * `from`: frame the input vector is expressed in.
/// * `to`: frame the output vector must be expressed in.
///
/// Return
/// ----------
/// * The identity when `from == to`, otherwise the constant ecliptic/equatorial rotation
///   or its transpose.
///
/// See also
/// ------------
/// * [`ecliptic_j2000_matrix`] – equatorial → ecliptic rotation.
pub fn rotation_between(from: RefFrame, to: RefFrame) -> Matrix3<f64> {
    match (from, to) {
        (RefFrame::EquatorialJ2000, RefFrame::EclipticJ2000) => ecliptic_j2000_matrix(),
        (RefFrame::EclipticJ2000, RefFrame::EquatorialJ2000) => ecliptic_j2000_matrix().transpose(),
        _ => Matrix3::identity(),
    }
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes.
///
/// This is an **active rotation** of a vector by `alpha` in the direct
/// (counter-clockwise) sense when looking down the axis toward the origin.
///
/// # Arguments
///
/// * `alpha` - Rotation angle in radians.
/// * `axis` - Axis of rotation.
///
/// # Returns
///
/// A 3×3 orthonormal matrix `R` such that the rotated vector is `x' = R · x`.
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Orientation of the perifocal basis `(P̂, Q̂, Ŵ)` inside the element frame.
///
/// Classical 3-1-3 Euler sequence `Rz(Ω) · Rx(i) · Rz(ω)`; its columns are the
/// periapsis direction, the in-plane normal to it, and the orbit pole.
pub fn perifocal_orientation(
    inclination: Radian,
    ascending_node_longitude: Radian,
    periapsis_argument: Radian,
) -> Matrix3<f64> {
    rotmt(ascending_node_longitude, Axis::Z)
        * rotmt(inclination, Axis::X)
        * rotmt(periapsis_argument, Axis::Z)
}
