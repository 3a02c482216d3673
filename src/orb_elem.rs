//! Conversions between classical elements and Cartesian states.
//!
//! Both directions work in the **element frame** (the frame the elements are referred to);
//! aligning the result with an output frame is left to the caller.
use nalgebra::Vector3;

use crate::constants::{GravitationalParameter, Radian};
use crate::kepler::{principal_angle, Anomaly};
use crate::orbit_errors::OrbitError;
use crate::orbit_type::osculating::ElementGeometry;
use crate::ref_system::perifocal_orientation;

/// Position and velocity in the perifocal basis `(P̂, Q̂, Ŵ)` for a true anomaly `ν`.
///
/// `r = p/(1 + e cos ν)`, position `(r cos ν, r sin ν, 0)`,
/// velocity `√(μ/p)·(−sin ν, e + cos ν, 0)`.
pub fn perifocal_state(
    semi_latus_rectum: f64,
    eccentricity: f64,
    true_anomaly: Radian,
    mu: GravitationalParameter,
) -> (Vector3<f64>, Vector3<f64>) {
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();
    let r = semi_latus_rectum / (1.0 + eccentricity * cos_nu);
    let vscale = (mu / semi_latus_rectum).sqrt();
    (
        Vector3::new(r * cos_nu, r * sin_nu, 0.0),
        Vector3::new(-vscale * sin_nu, vscale * (eccentricity + cos_nu), 0.0),
    )
}

/// Perifocal state written directly in the auxiliary anomaly.
///
/// Same state as [`perifocal_state`] for `ν = anomaly.true_anomaly(e)`, but without going
/// through `1 + e cos ν`, which cancels near the asymptotes of a hyperbola:
///
/// * `Eccentric(E)`: `a(cos E − e)`, `b sin E`, with `r = a(1 − e cos E)`,
/// * `Hyperbolic(H)`: `|a|(e − cosh H)`, `|a|√(e² − 1) sinh H`, with `r = |a|(e cosh H − 1)`,
/// * `Parabolic(D)`: `p(1 − D²)/2`, `pD`, with `r = p(1 + D²)/2` (`e` is taken as exactly 1).
pub fn perifocal_state_from_anomaly(
    semi_latus_rectum: f64,
    eccentricity: f64,
    anomaly: Anomaly,
    mu: GravitationalParameter,
) -> (Vector3<f64>, Vector3<f64>) {
    let p = semi_latus_rectum;
    let e = eccentricity;
    match anomaly {
        Anomaly::Eccentric(ea) => {
            let one_minus_e2 = 1.0 - e * e;
            let a = p / one_minus_e2;
            let sq = one_minus_e2.sqrt();
            let (s, c) = ea.sin_cos();
            let r = a * (1.0 - e * c);
            let vs = (mu * a).sqrt() / r;
            (
                Vector3::new(a * (c - e), a * sq * s, 0.0),
                Vector3::new(-vs * s, vs * sq * c, 0.0),
            )
        }
        Anomaly::Hyperbolic(h) => {
            let e2_minus_one = e * e - 1.0;
            let a = p / e2_minus_one;
            let sq = e2_minus_one.sqrt();
            let (s, c) = (h.sinh(), h.cosh());
            let r = a * (e * c - 1.0);
            let vs = (mu * a).sqrt() / r;
            (
                Vector3::new(a * (e - c), a * sq * s, 0.0),
                Vector3::new(-vs * s, vs * sq * c, 0.0),
            )
        }
        Anomaly::Parabolic(d) => {
            let d2 = d * d;
            let vs = 2.0 * (mu / p).sqrt() / (1.0 + d2);
            (
                Vector3::new(0.5 * p * (1.0 - d2), p * d, 0.0),
                Vector3::new(-vs * d, vs, 0.0),
            )
        }
    }
}

/// Cartesian state in the element frame from classical elements and a true anomaly.
///
/// Arguments
/// ---------
/// * `semi_latus_rectum`: `p` in AU.
/// * `eccentricity`: `e`.
/// * `inclination`, `ascending_node_longitude`, `periapsis_argument`: orientation angles.
/// * `true_anomaly`: `ν`.
/// * `mu`: gravitational parameter in AU³/day².
///
/// Return
/// ------
/// * `(position, velocity)`: the perifocal state rotated by `Rz(Ω)·Rx(i)·Rz(ω)`.
#[allow(clippy::too_many_arguments)]
pub fn elements_to_state(
    semi_latus_rectum: f64,
    eccentricity: f64,
    inclination: Radian,
    ascending_node_longitude: Radian,
    periapsis_argument: Radian,
    true_anomaly: Radian,
    mu: GravitationalParameter,
) -> (Vector3<f64>, Vector3<f64>) {
    let rot = perifocal_orientation(inclination, ascending_node_longitude, periapsis_argument);
    let (r, v) = perifocal_state(semi_latus_rectum, eccentricity, true_anomaly, mu);
    (rot * r, rot * v)
}

/// Classical elements recovered from a Cartesian state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassicalElements {
    pub semi_latus_rectum: f64,
    pub eccentricity: f64,
    /// Points to periapsis with magnitude `e`.
    pub eccentricity_vector: Vector3<f64>,
    pub inclination: Radian,
    pub ascending_node_longitude: Radian,
    pub periapsis_argument: Radian,
    pub true_anomaly: Radian,
    /// Specific angular momentum `r × v`.
    pub angular_momentum: Vector3<f64>,
    /// Unit vector toward the ascending node (the x axis for equatorial orbits).
    pub node_vector: Vector3<f64>,
    pub geometry: ElementGeometry,
}

/// Recover classical elements from a state, in the frame of that state.
///
/// Algorithm
/// -----------------
/// * `h = r × v`, `e⃗ = (v × h)/μ − r/|r|`, `p = |h|²/μ`.
/// * `i = atan2(|h_xy|, h_z)`.
/// * `Ω = atan2(h_x, −h_y)`, node direction `n̂ = (cos Ω, sin Ω, 0)`, `m̂ = ĥ × n̂`.
/// * `ω = atan2(e⃗·m̂, e⃗·n̂)`, periapsis direction `P̂ = cos ω n̂ + sin ω m̂`, `Q̂ = ĥ × P̂`.
/// * `ν = atan2(r·Q̂, r·P̂)`.
///
/// Degenerate geometry
/// -----------------
/// * `sin i < degenerate_tolerance` (equatorial): `Ω = 0` and `n̂` is the x axis, so `ω` is the
///   longitude of periapsis measured in the direction of motion.
/// * `e < degenerate_tolerance` (circular): `ω = 0` and `ν` is the argument of latitude.
/// * both: `Ω = ω = 0` and `ν` is the true longitude.
///
/// The chosen case is reported in [`ClassicalElements::geometry`]. All angles are in `[0, 2π)`
/// except `i ∈ [0, π]`.
///
/// Errors
/// -----------------
/// * [`OrbitError::RectilinearMotion`] if `|h| ≤ degenerate_tolerance · |r| |v|`.
pub fn state_to_elements(
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    mu: GravitationalParameter,
    degenerate_tolerance: f64,
) -> Result<ClassicalElements, OrbitError> {
    let r = position.norm();
    let h = position.cross(velocity);
    let hnorm = h.norm();
    if r == 0.0 || hnorm <= degenerate_tolerance * r * velocity.norm() {
        return Err(OrbitError::RectilinearMotion);
    }
    let h_hat = h / hnorm;

    let eccentricity_vector = velocity.cross(&h) / mu - position / r;
    let eccentricity = eccentricity_vector.norm();
    let semi_latus_rectum = hnorm * hnorm / mu;

    let hxy = h.x.hypot(h.y);
    let inclination = hxy.atan2(h.z);

    let equatorial = hxy / hnorm < degenerate_tolerance;
    let circular = eccentricity < degenerate_tolerance;

    let ascending_node_longitude = if equatorial {
        0.0
    } else {
        principal_angle(h.x.atan2(-h.y))
    };
    let (sin_node, cos_node) = ascending_node_longitude.sin_cos();
    let node_vector = Vector3::new(cos_node, sin_node, 0.0);
    let m_hat = h_hat.cross(&node_vector);

    let periapsis_argument = if circular {
        0.0
    } else {
        principal_angle(
            eccentricity_vector
                .dot(&m_hat)
                .atan2(eccentricity_vector.dot(&node_vector)),
        )
    };
    let (sin_peri, cos_peri) = periapsis_argument.sin_cos();
    let p_hat = cos_peri * node_vector + sin_peri * m_hat;
    let q_hat = h_hat.cross(&p_hat);
    let true_anomaly = principal_angle(position.dot(&q_hat).atan2(position.dot(&p_hat)));

    Ok(ClassicalElements {
        semi_latus_rectum,
        eccentricity,
        eccentricity_vector,
        inclination,
        ascending_node_longitude,
        periapsis_argument,
        true_anomaly,
        angular_momentum: h,
        node_vector,
        geometry: ElementGeometry::from_flags(circular, equatorial),
    })
}
