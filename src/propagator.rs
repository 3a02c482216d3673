//! # Two-body propagation
//!
//! Two interchangeable ways of moving a Keplerian state through time:
//!
//! - [`ConicMotion`]: advance the mean anomaly, `M = M₀ + n Δt`, solve the Kepler equation
//!   of the regime and rebuild the perifocal state. Elliptic intervals are first reduced
//!   modulo the period, so the result is periodic by construction and stays accurate for
//!   very large `|Δt|`.
//! - [`propagate_universal`]: solve the universal Kepler equation for the reference
//!   Cartesian state and apply the Lagrange `f, g, ḟ, ġ` coefficients. A single code path
//!   covers every conic, exact parabolas included.
//!
//! Both return states in the frame of the inputs; orientation and frame alignment are
//! applied by [`KeplerOrbit`](crate::kepler_orbit::KeplerOrbit).
use nalgebra::Vector3;
use tracing::trace;

use crate::constants::{Day, GravitationalParameter, Radian, DPI};
use crate::kepler::{mean_motion, solve_kepler, solve_universal, Anomaly, Conic};
use crate::orb_elem::perifocal_state_from_anomaly;
use crate::orbit_errors::OrbitError;

/// Ellipses and hyperbolas with `|e − 1|` below this are propagated with the universal
/// variable under either [`PropagationMethod`].
pub const NEAR_PARABOLIC_BAND: f64 = 1e-4;

/// Propagation algorithm used by a [`KeplerOrbit`](crate::kepler_orbit::KeplerOrbit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationMethod {
    /// Mean-anomaly advance and regime-specific Kepler solver.
    #[default]
    MeanAnomaly,
    /// Universal variable with Stumpff functions and Lagrange coefficients.
    UniversalVariable,
}

/// In-plane motion of a body on a conic: the regime, its shape and its mean anomaly
/// at the reference epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicMotion {
    pub conic: Conic,
    pub semi_latus_rectum: f64,
    pub eccentricity: f64,
    /// `M₀`, as given (not wrapped).
    pub mean_anomaly_at_epoch: Radian,
    /// rad/day
    pub mean_motion: f64,
    pub mu: GravitationalParameter,
}

impl ConicMotion {
    pub fn new(
        conic: Conic,
        semi_latus_rectum: f64,
        eccentricity: f64,
        mean_anomaly_at_epoch: Radian,
        mu: GravitationalParameter,
    ) -> Self {
        ConicMotion {
            conic,
            semi_latus_rectum,
            eccentricity,
            mean_anomaly_at_epoch,
            mean_motion: mean_motion(conic, mu, semi_latus_rectum, eccentricity),
            mu,
        }
    }

    /// `true` for an ellipse or hyperbola with `|e − 1| < NEAR_PARABOLIC_BAND`.
    pub fn is_near_parabolic(&self) -> bool {
        self.conic != Conic::Parabolic && (self.eccentricity - 1.0).abs() < NEAR_PARABOLIC_BAND
    }

    /// Orbital period `2π/n` in days, for elliptic motion only.
    pub fn period(&self) -> Option<Day> {
        self.conic.is_closed().then(|| DPI / self.mean_motion)
    }

    /// Mean anomaly `Δt` days after the reference epoch.
    ///
    /// For ellipses `Δt` is reduced to `[−P/2, P/2]` first, so whole revolutions do not
    /// accumulate rounding in `M`.
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::TimeBeyondRange`] if `M` is not finite.
    pub fn mean_anomaly_at(&self, dt: Day) -> Result<Radian, OrbitError> {
        let dt_eff = match self.period() {
            Some(period) => dt - period * (dt / period).round(),
            None => dt,
        };
        let m = self.mean_anomaly_at_epoch + self.mean_motion * dt_eff;
        if m.is_finite() {
            Ok(m)
        } else {
            Err(OrbitError::TimeBeyondRange(dt))
        }
    }

    /// Auxiliary anomaly `Δt` days after the reference epoch.
    pub fn anomaly_at(
        &self,
        dt: Day,
        tolerance: f64,
        max_iter: usize,
    ) -> Result<Anomaly, OrbitError> {
        let m = self.mean_anomaly_at(dt)?;
        solve_kepler(self.conic, m, self.eccentricity, tolerance, max_iter)
    }

    /// Perifocal position and velocity `Δt` days after the reference epoch.
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::TimeBeyondRange`] when the state overflows (open orbits far from
    ///   periapsis).
    /// * [`OrbitError::Convergence`] from the Kepler solver.
    pub fn perifocal_state_at(
        &self,
        dt: Day,
        tolerance: f64,
        max_iter: usize,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrbitError> {
        let anomaly = self.anomaly_at(dt, tolerance, max_iter)?;
        let (r, v) = perifocal_state_from_anomaly(
            self.semi_latus_rectum,
            self.eccentricity,
            anomaly,
            self.mu,
        );
        finite_state(r, v, dt)
    }
}

/// Propagate a Cartesian state by `dt` days with the universal-variable formulation.
///
/// Arguments
/// -----------------
/// * `position`, `velocity`: state at the start of the interval (AU, AU/day).
/// * `mu`: gravitational parameter in AU³/day².
/// * `dt`: interval in days, any sign.
/// * `period`: orbital period when the motion is elliptic; `dt` is reduced modulo it.
/// * `max_iter`: iteration cap of the universal Kepler solver.
///
/// Return
/// ----------
/// * `(position, velocity)` at the end of the interval, in the input frame:
///   `r = f r₀ + g v₀`, `v = ḟ r₀ + ġ v₀` with `f = 1 − μ s₂/r₀`, `g = Δt − μ s₃`,
///   `ḟ = −μ s₁/(r r₀)`, `ġ = 1 − μ s₂/r`.
///
/// Errors
/// ----------
/// * [`OrbitError::TimeBeyondRange`] if the universal functions or the final state overflow.
/// * [`OrbitError::Convergence`] from the universal solver.
pub fn propagate_universal(
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    mu: GravitationalParameter,
    dt: Day,
    period: Option<Day>,
    max_iter: usize,
) -> Result<(Vector3<f64>, Vector3<f64>), OrbitError> {
    let dt_eff = match period {
        Some(period) => dt - period * (dt / period).round(),
        None => dt,
    };
    if !dt_eff.is_finite() {
        return Err(OrbitError::TimeBeyondRange(dt));
    }

    let r0 = position.norm();
    let sig0 = position.dot(velocity);
    let alpha = velocity.norm_squared() - 2.0 * mu / r0;

    let sol = solve_universal(dt_eff, r0, sig0, mu, alpha, max_iter).map_err(|err| match err {
        OrbitError::TimeBeyondRange(_) => OrbitError::TimeBeyondRange(dt),
        other => other,
    })?;
    let [s0, s1, s2, s3] = sol.s;

    let r = r0 * s0 + sig0 * s1 + mu * s2;
    let f = 1.0 - mu * s2 / r0;
    let g = dt_eff - mu * s3;
    let fdot = -mu * s1 / (r * r0);
    let gdot = 1.0 - mu * s2 / r;
    trace!(psi = sol.psi, r, "universal propagation");

    finite_state(
        f * position + g * velocity,
        fdot * position + gdot * velocity,
        dt,
    )
}

fn finite_state(
    r: Vector3<f64>,
    v: Vector3<f64>,
    dt: Day,
) -> Result<(Vector3<f64>, Vector3<f64>), OrbitError> {
    if r.iter().chain(v.iter()).all(|x| x.is_finite()) {
        Ok((r, v))
    } else {
        Err(OrbitError::TimeBeyondRange(dt))
    }
}

#[cfg(test)]
mod propagator_test {
    use super::*;
    use crate::constants::GM_SUN_PITJEVA_2005 as MU;
    use crate::kepler::Anomaly;
    use crate::orb_elem::perifocal_state;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const TOL: f64 = 1e-14;

    fn ellipse() -> ConicMotion {
        ConicMotion::new(Conic::Elliptic, 2.0, 0.3, 0.4, MU)
    }

    #[test]
    fn test_period() {
        let m = ellipse();
        let a: f64 = 2.0 / (1.0 - 0.09);
        assert_relative_eq!(
            m.period().unwrap(),
            DPI * (a.powi(3) / MU).sqrt(),
            max_relative = 1e-14
        );
        assert_eq!(
            ConicMotion::new(Conic::Hyperbolic, 2.0, 1.3, 0.0, MU).period(),
            None
        );
        assert_eq!(
            ConicMotion::new(Conic::Parabolic, 2.0, 1.0, 0.0, MU).period(),
            None
        );
    }

    #[test]
    fn test_near_parabolic_band() {
        let near = |conic, e| ConicMotion::new(conic, 1.0, e, 0.0, MU).is_near_parabolic();
        assert!(near(Conic::Elliptic, 1.0 - 1e-6));
        assert!(near(Conic::Hyperbolic, 1.0 + 1e-10));
        assert!(!near(Conic::Parabolic, 1.0));
        assert!(!near(Conic::Elliptic, 0.999));
        assert!(!near(Conic::Hyperbolic, 1.001));
    }

    #[test]
    fn test_mean_anomaly_reduction() {
        let m = ellipse();
        let period = m.period().unwrap();
        let base = m.mean_anomaly_at(37.5).unwrap();
        for k in [-3.0, -1.0, 1.0, 1000.0] {
            assert_abs_diff_eq!(
                m.mean_anomaly_at(37.5 + k * period).unwrap(),
                base,
                epsilon = 1e-9
            );
        }
        assert_eq!(m.mean_anomaly_at(0.0).unwrap(), 0.4);
    }

    #[test]
    fn test_open_orbit_mean_anomaly_overflow() {
        let m = ConicMotion::new(Conic::Hyperbolic, 2.0, 1.3, 0.0, MU);
        assert_eq!(
            m.mean_anomaly_at(f64::INFINITY),
            Err(OrbitError::TimeBeyondRange(f64::INFINITY))
        );
        assert_eq!(
            m.perifocal_state_at(f64::INFINITY, TOL, 100),
            Err(OrbitError::TimeBeyondRange(f64::INFINITY))
        );
    }

    #[test]
    fn test_perifocal_state_at_epoch() {
        let m = ellipse();
        let (r, v) = m.perifocal_state_at(0.0, TOL, 100).unwrap();
        let nu = solve_kepler(Conic::Elliptic, 0.4, 0.3, TOL, 100)
            .unwrap()
            .true_anomaly(0.3);
        let (r_ref, v_ref) = perifocal_state(2.0, 0.3, nu, MU);
        assert_abs_diff_eq!(r, r_ref, epsilon = 1e-14);
        assert_abs_diff_eq!(v, v_ref, epsilon = 1e-16);
    }

    #[test]
    fn test_universal_matches_mean_anomaly() {
        for (conic, p, e) in [
            (Conic::Elliptic, 2.0, 0.3),
            (Conic::Elliptic, 0.5, 0.95),
            (Conic::Parabolic, 1.2, 1.0),
            (Conic::Hyperbolic, 1.5, 2.2),
        ] {
            let motion = ConicMotion::new(conic, p, e, -0.2, MU);
            let (r0, v0) = motion.perifocal_state_at(0.0, TOL, 100).unwrap();
            for dt in [-400.0, -3.0, 0.0, 25.0, 900.0] {
                let (r1, v1) = motion.perifocal_state_at(dt, TOL, 100).unwrap();
                let (r2, v2) =
                    propagate_universal(&r0, &v0, MU, dt, motion.period(), 100).unwrap();
                assert_relative_eq!(r1, r2, max_relative = 1e-9, epsilon = 1e-12);
                assert_relative_eq!(v1, v2, max_relative = 1e-9, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_universal_zero_interval_is_identity() {
        let r0 = Vector3::new(1.0, 0.2, -0.1);
        let v0 = Vector3::new(-0.003, 0.016, 0.001);
        let (r, v) = propagate_universal(&r0, &v0, MU, 0.0, None, 100).unwrap();
        assert_eq!(r, r0);
        assert_eq!(v, v0);
    }

    #[test]
    fn test_universal_preserves_invariants() {
        let r0 = Vector3::new(0.4, -1.1, 0.3);
        let v0 = Vector3::new(0.018, 0.007, -0.002);
        let h0 = r0.cross(&v0);
        let e0 = 0.5 * v0.norm_squared() - MU / r0.norm();
        let (r, v) = propagate_universal(&r0, &v0, MU, 12345.6, None, 100).unwrap();
        assert_relative_eq!(r.cross(&v), h0, max_relative = 1e-9);
        assert_relative_eq!(
            0.5 * v.norm_squared() - MU / r.norm(),
            e0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_universal_far_hyperbolic_overflow() {
        let (r0, v0) =
            perifocal_state_from_anomaly(1.0, 3.0, Anomaly::Hyperbolic(0.0), MU);
        // the root lies where s₃ no longer fits in a double
        assert_eq!(
            propagate_universal(&r0, &v0, MU, 1e306, None, 200),
            Err(OrbitError::TimeBeyondRange(1e306))
        );
    }
}
