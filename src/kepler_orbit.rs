//! # Kepler orbit
//!
//! [`KeplerOrbit`] is the immutable two-body orbit at the heart of the crate. It is built
//! either from classical elements ([`KeplerOrbit::from_elements`]) or from a Cartesian state
//! ([`KeplerOrbit::from_state`], [`KeplerOrbit::from_state_vector`]) and answers two kinds of
//! queries:
//!
//! - **Propagation**: [`propagate`](KeplerOrbit::propagate) returns the state at any epoch,
//!   before or after the reference epoch, in the configured output frame.
//! - **Introspection**: [`elements_at_epoch`](KeplerOrbit::elements_at_epoch) and
//!   [`osculating_elements`](KeplerOrbit::osculating_elements) recover element sets.
//!
//! ## Frames
//!
//! Elements and the stored reference state live in `config.element_frame` (ecliptic J2000 by
//! default). Propagated states are rotated into `config.output_frame` (equatorial J2000 by
//! default) by a constant matrix computed once at construction.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hifitime::{Epoch, TimeScale};
//! use kepler_orbit::config::KeplerConfig;
//! use kepler_orbit::constants::{GM_SUN_PITJEVA_2005, RADEG};
//! use kepler_orbit::kepler_orbit::KeplerOrbit;
//! use kepler_orbit::orbit_type::{AnomalyAtEpoch, OrbitalElements};
//!
//! let epoch = Epoch::from_gregorian_at_midnight(2020, 1, 1, TimeScale::TT);
//! let ceres = OrbitalElements::from_semi_major_axis(
//!     2.769289292143484,
//!     0.07687465013145245,
//!     10.59127767086216 * RADEG,
//!     80.3011901917491 * RADEG,
//!     73.80896808746482 * RADEG,
//!     AnomalyAtEpoch::Mean(130.3159688200986 * RADEG),
//!     epoch,
//! )
//! .unwrap();
//!
//! let orbit = KeplerOrbit::from_elements(&ceres, GM_SUN_PITJEVA_2005, KeplerConfig::default()).unwrap();
//! let target = Epoch::from_gregorian_hms(2025, 4, 21, 12, 0, 0, TimeScale::TT);
//! let state = orbit.propagate(target).unwrap();
//! println!("{state}");
//! ```
use std::f64::consts::PI;
use std::fmt;

use hifitime::Epoch;
use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use crate::config::{DegeneratePolicy, KeplerConfig};
use crate::constants::{CentralBody, Day, GravitationalParameter, Radian};
use crate::kepler::{mean_motion, principal_angle, wrap_pi, Anomaly, Conic};
use crate::orb_elem::{perifocal_state, state_to_elements};
use crate::orbit_errors::{ElementError, OrbitError};
use crate::orbit_type::osculating::{ElementGeometry, OsculatingElements};
use crate::orbit_type::state_vector::StateVector;
use crate::orbit_type::{AnomalyAtEpoch, OrbitalElements};
use crate::propagator::{propagate_universal, ConicMotion, PropagationMethod};
use crate::ref_system::{perifocal_orientation, rotation_between, RefFrame};
use crate::time::elapsed_days;

/// Two-body orbit around a central body of gravitational parameter `μ`.
///
/// Immutable once built; every query takes `&self`, so a single orbit can be shared between
/// threads without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct KeplerOrbit {
    mu: GravitationalParameter,
    reference_epoch: Epoch,
    /// State at `reference_epoch`, in the element frame.
    reference_state: StateVector,
    motion: ConicMotion,
    inclination: Radian,
    ascending_node_longitude: Radian,
    periapsis_argument: Radian,
    geometry: ElementGeometry,
    /// Perifocal basis → element frame.
    orientation: Matrix3<f64>,
    /// Element frame → output frame.
    alignment: Matrix3<f64>,
    config: KeplerConfig,
}

fn check_mu(mu: GravitationalParameter) -> Result<(), OrbitError> {
    if mu.is_finite() && mu > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::NonPositiveGravitationalParameter(mu))
    }
}

impl KeplerOrbit {
    /// Build an orbit from classical elements.
    ///
    /// Arguments
    /// -----------------
    /// * `elements`: elements referred to `config.element_frame`.
    /// * `mu`: gravitational parameter of the central body, in AU³/day².
    /// * `config`: solver, frame and time-scale configuration.
    ///
    /// Return
    /// ----------
    /// * The orbit, with its reference state computed at `elements.reference_epoch`.
    ///   A [`AnomalyAtEpoch::PeriapsisTime`] is turned into `M₀ = n (t₀ − T)` with the
    ///   interval measured in `config.time_scale`.
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::NonPositiveGravitationalParameter`] if `μ ≤ 0` or is not finite.
    /// * [`OrbitError::InvalidElement`] for any [`OrbitalElements::validate`] failure, and for
    ///   a true anomaly of `±π` on an orbit inside the parabolic band.
    /// * [`OrbitError::Convergence`] if the Kepler solver fails at the reference epoch.
    pub fn from_elements(
        elements: &OrbitalElements,
        mu: GravitationalParameter,
        config: KeplerConfig,
    ) -> Result<Self, OrbitError> {
        check_mu(mu)?;
        elements.validate()?;

        let p = elements.semi_latus_rectum;
        let e = elements.eccentricity;
        let conic = elements.conic(config.parabolic_tolerance);
        if let (Conic::Parabolic, AnomalyAtEpoch::True(nu)) = (conic, elements.anomaly) {
            if wrap_pi(nu).abs() >= PI {
                return Err(ElementError::BeyondAsymptote {
                    true_anomaly: nu,
                    limit: PI,
                }
                .into());
            }
        }
        let n = mean_motion(conic, mu, p, e);

        let m0 = match elements.anomaly {
            AnomalyAtEpoch::Mean(m) => m,
            AnomalyAtEpoch::True(nu) => {
                let nu = if conic.is_closed() { nu } else { wrap_pi(nu) };
                Anomaly::from_true_anomaly(conic, e, nu).mean_anomaly(e)
            }
            AnomalyAtEpoch::PeriapsisTime(t) => {
                n * elapsed_days(t, elements.reference_epoch, config.time_scale)
            }
        };
        if !m0.is_finite() {
            return Err(ElementError::NonFinite("mean_anomaly").into());
        }

        let motion = ConicMotion::new(conic, p, e, m0, mu);
        let orientation = perifocal_orientation(
            elements.inclination,
            elements.ascending_node_longitude,
            elements.periapsis_argument,
        );
        let (r, v) = match elements.anomaly {
            AnomalyAtEpoch::True(nu) if motion.is_near_parabolic() => {
                perifocal_state(p, e, nu, mu)
            }
            _ => motion.perifocal_state_at(
                0.0,
                config.kepler_tolerance,
                config.kepler_max_iter,
            )?,
        };

        let geometry = ElementGeometry::from_flags(
            e < config.degenerate_tolerance,
            elements.inclination.sin() < config.degenerate_tolerance,
        );

        debug!(
            conic = %conic,
            geometry = %geometry,
            p,
            e,
            mean_anomaly = m0,
            epoch = %elements.reference_epoch,
            "Kepler orbit built from elements"
        );

        Ok(KeplerOrbit {
            mu,
            reference_epoch: elements.reference_epoch,
            reference_state: StateVector::new(
                orientation * r,
                orientation * v,
                elements.reference_epoch,
                config.element_frame,
            ),
            motion,
            inclination: elements.inclination,
            ascending_node_longitude: elements.ascending_node_longitude,
            periapsis_argument: elements.periapsis_argument,
            geometry,
            orientation,
            alignment: rotation_between(config.element_frame, config.output_frame),
            config,
        })
    }

    /// Build an orbit from classical elements around a tabulated [`CentralBody`], with
    /// `μ = body.gm()`.
    pub fn from_elements_around(
        elements: &OrbitalElements,
        body: CentralBody,
        config: KeplerConfig,
    ) -> Result<Self, OrbitError> {
        Self::from_elements(elements, body.gm(), config)
    }

    /// Build an orbit from a Cartesian state given in `config.element_frame`.
    ///
    /// The elements are recovered with the degenerate-geometry convention of
    /// [`state_to_elements`]; the given state is stored verbatim as the reference state.
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::NonPositiveGravitationalParameter`] if `μ ≤ 0` or is not finite.
    /// * [`OrbitError::InvalidElement`] if the state has non-finite components.
    /// * [`OrbitError::RectilinearMotion`] if the angular momentum vanishes.
    pub fn from_state(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        epoch: Epoch,
        mu: GravitationalParameter,
        config: KeplerConfig,
    ) -> Result<Self, OrbitError> {
        check_mu(mu)?;
        if !position.iter().all(|x| x.is_finite()) {
            return Err(ElementError::NonFinite("position").into());
        }
        if !velocity.iter().all(|x| x.is_finite()) {
            return Err(ElementError::NonFinite("velocity").into());
        }

        let el = state_to_elements(&position, &velocity, mu, config.degenerate_tolerance)?;
        let e = el.eccentricity;
        let conic = Conic::from_eccentricity(e, config.parabolic_tolerance);
        let nu = if conic.is_closed() {
            el.true_anomaly
        } else {
            wrap_pi(el.true_anomaly)
        };
        let m0 = Anomaly::from_true_anomaly(conic, e, nu).mean_anomaly(e);

        if el.geometry.is_degenerate() {
            debug!(
                geometry = %el.geometry,
                "undefined angles set to zero by the degenerate-geometry convention"
            );
        }
        debug!(
            conic = %conic,
            p = el.semi_latus_rectum,
            e,
            epoch = %epoch,
            "Kepler orbit built from state"
        );

        Ok(KeplerOrbit {
            mu,
            reference_epoch: epoch,
            reference_state: StateVector::new(position, velocity, epoch, config.element_frame),
            motion: ConicMotion::new(conic, el.semi_latus_rectum, e, m0, mu),
            inclination: el.inclination,
            ascending_node_longitude: el.ascending_node_longitude,
            periapsis_argument: el.periapsis_argument,
            geometry: el.geometry,
            orientation: perifocal_orientation(
                el.inclination,
                el.ascending_node_longitude,
                el.periapsis_argument,
            ),
            alignment: rotation_between(config.element_frame, config.output_frame),
            config,
        })
    }

    /// Build an orbit from a tagged [`StateVector`], rotating it into
    /// `config.element_frame` first when its frame differs.
    pub fn from_state_vector(
        state: &StateVector,
        mu: GravitationalParameter,
        config: KeplerConfig,
    ) -> Result<Self, OrbitError> {
        let state = state.in_frame(config.element_frame);
        Self::from_state(state.position, state.velocity, state.epoch, mu, config)
    }

    pub fn mu(&self) -> GravitationalParameter {
        self.mu
    }

    pub fn reference_epoch(&self) -> Epoch {
        self.reference_epoch
    }

    pub fn config(&self) -> &KeplerConfig {
        &self.config
    }

    pub fn conic(&self) -> Conic {
        self.motion.conic
    }

    pub fn geometry(&self) -> ElementGeometry {
        self.geometry
    }

    pub fn semi_latus_rectum(&self) -> f64 {
        self.motion.semi_latus_rectum
    }

    pub fn eccentricity(&self) -> f64 {
        self.motion.eccentricity
    }

    pub fn inclination(&self) -> Radian {
        self.inclination
    }

    pub fn ascending_node_longitude(&self) -> Radian {
        self.ascending_node_longitude
    }

    pub fn periapsis_argument(&self) -> Radian {
        self.periapsis_argument
    }

    /// Mean anomaly at the reference epoch, as given or derived at construction.
    pub fn mean_anomaly_at_epoch(&self) -> Radian {
        self.motion.mean_anomaly_at_epoch
    }

    /// Mean motion in rad/day (Barker normalisation for parabolas).
    pub fn mean_motion(&self) -> f64 {
        self.motion.mean_motion
    }

    /// Orbital period in days, `None` for open orbits.
    pub fn period(&self) -> Option<Day> {
        self.motion.period()
    }

    /// Reference state at the reference epoch, in the element frame.
    pub fn reference_state(&self) -> StateVector {
        self.reference_state
    }

    /// Classical elements at the reference epoch, with the anomaly given as a mean anomaly
    /// (in `[0, 2π)` for ellipses).
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::DegenerateGeometry`] under [`DegeneratePolicy::Reject`] when the orbit
    ///   is circular and/or equatorial.
    pub fn elements_at_epoch(&self) -> Result<OrbitalElements, OrbitError> {
        self.check_geometry(self.geometry)?;
        let m0 = self.motion.mean_anomaly_at_epoch;
        Ok(OrbitalElements {
            reference_epoch: self.reference_epoch,
            semi_latus_rectum: self.motion.semi_latus_rectum,
            eccentricity: self.motion.eccentricity,
            inclination: self.inclination,
            ascending_node_longitude: self.ascending_node_longitude,
            periapsis_argument: self.periapsis_argument,
            anomaly: AnomalyAtEpoch::Mean(if self.motion.conic.is_closed() {
                principal_angle(m0)
            } else {
                m0
            }),
        })
    }

    /// Osculating elements of the reference state, in the element frame.
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::DegenerateGeometry`] under [`DegeneratePolicy::Reject`].
    pub fn osculating_elements(&self) -> Result<OsculatingElements, OrbitError> {
        let s = &self.reference_state;
        self.osculating_from(&s.position, &s.velocity, s.epoch)
    }

    /// Osculating elements of the propagated state at `epoch`, in the element frame.
    ///
    /// Errors
    /// ----------
    /// * Any [`propagate`](KeplerOrbit::propagate) error.
    /// * [`OrbitError::DegenerateGeometry`] under [`DegeneratePolicy::Reject`].
    pub fn osculating_elements_at(&self, epoch: Epoch) -> Result<OsculatingElements, OrbitError> {
        let (r, v) = self.state_in_element_frame(epoch)?;
        self.osculating_from(&r, &v, epoch)
    }

    /// State at `target`, in `config.output_frame`.
    ///
    /// Arguments
    /// -----------------
    /// * `target`: query epoch; the interval to the reference epoch is measured in
    ///   `config.time_scale` and may be negative.
    ///
    /// Near-parabolic orbits (see [`ConicMotion::is_near_parabolic`]) always take the
    /// universal-variable path, whatever `config.propagation` says.
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::TimeBeyondRange`] when the interval or the resulting state overflows.
    /// * [`OrbitError::Convergence`] if a Kepler solver does not converge.
    pub fn propagate(&self, target: Epoch) -> Result<StateVector, OrbitError> {
        let (r, v) = self.state_in_element_frame(target)?;
        Ok(StateVector::new(
            self.alignment * r,
            self.alignment * v,
            target,
            self.config.output_frame,
        ))
    }

    /// State at `target`, in an arbitrary frame.
    pub fn propagate_to_frame(
        &self,
        target: Epoch,
        frame: RefFrame,
    ) -> Result<StateVector, OrbitError> {
        let (r, v) = self.state_in_element_frame(target)?;
        let rot = rotation_between(self.config.element_frame, frame);
        Ok(StateVector::new(rot * r, rot * v, target, frame))
    }

    fn state_in_element_frame(
        &self,
        target: Epoch,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrbitError> {
        let dt = elapsed_days(self.reference_epoch, target, self.config.time_scale);
        debug!(dt, method = ?self.config.propagation, "propagating Kepler orbit");

        match self.config.propagation {
            PropagationMethod::MeanAnomaly if !self.motion.is_near_parabolic() => {
                let (r, v) = self.motion.perifocal_state_at(
                    dt,
                    self.config.kepler_tolerance,
                    self.config.kepler_max_iter,
                )?;
                Ok((self.orientation * r, self.orientation * v))
            }
            _ => propagate_universal(
                &self.reference_state.position,
                &self.reference_state.velocity,
                self.mu,
                dt,
                self.motion.period(),
                self.config.universal_max_iter,
            ),
        }
    }

    fn osculating_from(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        epoch: Epoch,
    ) -> Result<OsculatingElements, OrbitError> {
        let osc = OsculatingElements::from_state(
            position,
            velocity,
            epoch,
            self.mu,
            self.config.degenerate_tolerance,
            self.config.parabolic_tolerance,
            self.config.time_scale,
        )?;
        self.check_geometry(osc.geometry)?;
        Ok(osc)
    }

    fn check_geometry(&self, geometry: ElementGeometry) -> Result<(), OrbitError> {
        match self.config.degenerate_policy {
            DegeneratePolicy::Reject if geometry.is_degenerate() => {
                Err(OrbitError::DegenerateGeometry(geometry))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for KeplerOrbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / PI;
        writeln!(
            f,
            "Kepler orbit ({}, {}) @ {} [{}]",
            self.motion.conic, self.geometry, self.reference_epoch, self.config.element_frame
        )?;
        writeln!(f, "  μ  = {:.15e} AU³/day²", self.mu)?;
        writeln!(f, "  p  = {:.12} AU", self.motion.semi_latus_rectum)?;
        writeln!(f, "  e  = {:.12}", self.motion.eccentricity)?;
        writeln!(f, "  i  = {:.9}°", self.inclination * rad_to_deg)?;
        writeln!(f, "  Ω  = {:.9}°", self.ascending_node_longitude * rad_to_deg)?;
        writeln!(f, "  ω  = {:.9}°", self.periapsis_argument * rad_to_deg)?;
        writeln!(
            f,
            "  M₀ = {:.9}°",
            self.motion.mean_anomaly_at_epoch * rad_to_deg
        )?;
        write!(f, "  n  = {:.12e} rad/day", self.motion.mean_motion)
    }
}

#[cfg(test)]
mod kepler_orbit_test {
    use super::*;
    use crate::constants::{GM_SUN_PITJEVA_2005 as MU, RADEG};
    use crate::orbit_type::orbit_type_test::deg;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use hifitime::TimeScale;

    fn epoch() -> Epoch {
        Epoch::from_gregorian_at_midnight(2020, 1, 1, TimeScale::TT)
    }

    fn ceres_elements() -> OrbitalElements {
        OrbitalElements::from_semi_major_axis(
            2.769289292143484,
            0.07687465013145245,
            10.59127767086216 * RADEG,
            80.3011901917491 * RADEG,
            73.80896808746482 * RADEG,
            AnomalyAtEpoch::Mean(130.3159688200986 * RADEG),
            epoch(),
        )
        .unwrap()
    }

    #[test]
    fn test_reference_state_of_ceres() {
        let orbit = KeplerOrbit::from_elements(&ceres_elements(), MU, KeplerConfig::default())
            .unwrap();
        let s = orbit.reference_state();
        assert_eq!(s.frame, RefFrame::EclipticJ2000);
        assert_abs_diff_eq!(
            s.position,
            Vector3::new(1.007608869622793, -2.7227298037145053, -0.27148738417656254),
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(
            s.velocity,
            Vector3::new(
                0.009201724467239806,
                0.0029788843372813506,
                -0.001602173934571897
            ),
            epsilon = 1e-12
        );
        assert_eq!(orbit.conic(), Conic::Elliptic);
        assert_eq!(orbit.geometry(), ElementGeometry::General);
    }

    #[test]
    fn test_propagate_at_reference_epoch() {
        let orbit = KeplerOrbit::from_elements(&ceres_elements(), MU, KeplerConfig::default())
            .unwrap();
        let s = orbit.propagate(epoch()).unwrap();
        let expected = orbit.reference_state().in_frame(RefFrame::EquatorialJ2000);
        assert_eq!(s.frame, RefFrame::EquatorialJ2000);
        assert_abs_diff_eq!(s.position, expected.position, epsilon = 1e-14);
        assert_abs_diff_eq!(s.velocity, expected.velocity, epsilon = 1e-16);

        let ecl = orbit
            .propagate_to_frame(epoch(), RefFrame::EclipticJ2000)
            .unwrap();
        assert_abs_diff_eq!(ecl.position, orbit.reference_state().position, epsilon = 1e-14);
    }

    #[test]
    fn test_invalid_mu() {
        for mu in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = KeplerOrbit::from_elements(&ceres_elements(), mu, KeplerConfig::default())
                .unwrap_err();
            assert!(matches!(
                err,
                OrbitError::NonPositiveGravitationalParameter(_)
            ));
        }
    }

    #[test]
    fn test_invalid_elements_rejected() {
        let mut el = ceres_elements();
        el.eccentricity = -0.1;
        assert_eq!(
            KeplerOrbit::from_elements(&el, MU, KeplerConfig::default()),
            Err(OrbitError::InvalidElement(
                ElementError::NegativeEccentricity(-0.1)
            ))
        );

        let mut el = ceres_elements();
        el.inclination = 4.0;
        assert_eq!(
            KeplerOrbit::from_elements(&el, MU, KeplerConfig::default()),
            Err(OrbitError::InvalidElement(
                ElementError::InclinationOutOfRange(4.0)
            ))
        );
    }

    #[test]
    fn test_anomaly_variants_agree() {
        let base = KeplerOrbit::from_elements(&ceres_elements(), MU, KeplerConfig::default())
            .unwrap();
        let osc = base.osculating_elements().unwrap();

        let mut by_true = ceres_elements();
        by_true.anomaly = AnomalyAtEpoch::True(osc.true_anomaly);
        let by_true = KeplerOrbit::from_elements(&by_true, MU, KeplerConfig::default()).unwrap();

        let mut by_time = ceres_elements();
        by_time.anomaly = AnomalyAtEpoch::PeriapsisTime(osc.periapsis_time);
        let by_time = KeplerOrbit::from_elements(&by_time, MU, KeplerConfig::default()).unwrap();

        let r = base.reference_state().position;
        assert_abs_diff_eq!(by_true.reference_state().position, r, epsilon = 1e-11);
        assert_abs_diff_eq!(by_time.reference_state().position, r, epsilon = 1e-9);
    }

    #[test]
    fn test_from_state_recovers_elements() {
        let base = KeplerOrbit::from_elements(&ceres_elements(), MU, KeplerConfig::default())
            .unwrap();
        let s = base.reference_state();
        let orbit =
            KeplerOrbit::from_state(s.position, s.velocity, s.epoch, MU, KeplerConfig::default())
                .unwrap();
        let el = orbit.elements_at_epoch().unwrap();
        let expected = ceres_elements();

        assert_relative_eq!(
            el.semi_latus_rectum,
            expected.semi_latus_rectum,
            max_relative = 1e-12
        );
        assert_relative_eq!(el.eccentricity, expected.eccentricity, max_relative = 1e-10);
        assert_abs_diff_eq!(el.inclination, expected.inclination, epsilon = 1e-12);
        assert_abs_diff_eq!(
            el.ascending_node_longitude,
            expected.ascending_node_longitude,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            el.periapsis_argument,
            expected.periapsis_argument,
            epsilon = 1e-9
        );
        match el.anomaly {
            AnomalyAtEpoch::Mean(m) => {
                assert_abs_diff_eq!(m, 130.3159688200986 * RADEG, epsilon = 1e-9)
            }
            other => panic!("unexpected anomaly {other:?}"),
        }
    }

    #[test]
    fn test_from_state_vector_rotates_into_element_frame() {
        let base = KeplerOrbit::from_elements(&ceres_elements(), MU, KeplerConfig::default())
            .unwrap();
        let equ = base.reference_state().in_frame(RefFrame::EquatorialJ2000);
        let orbit = KeplerOrbit::from_state_vector(&equ, MU, KeplerConfig::default()).unwrap();
        assert_eq!(orbit.reference_state().frame, RefFrame::EclipticJ2000);
        assert_abs_diff_eq!(
            orbit.inclination(),
            10.59127767086216 * RADEG,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_degenerate_policy() {
        let circular = OrbitalElements {
            reference_epoch: epoch(),
            semi_latus_rectum: 1.0,
            eccentricity: 0.0,
            inclination: deg(30.0),
            ascending_node_longitude: deg(45.0),
            periapsis_argument: 0.0,
            anomaly: AnomalyAtEpoch::Mean(deg(10.0)),
        };

        let fallback = KeplerOrbit::from_elements(&circular, MU, KeplerConfig::default()).unwrap();
        assert_eq!(fallback.geometry(), ElementGeometry::Circular);
        let osc = fallback.osculating_elements().unwrap();
        assert_eq!(osc.geometry, ElementGeometry::Circular);
        assert_eq!(osc.periapsis_argument, 0.0);
        assert_abs_diff_eq!(osc.argument_of_latitude, deg(10.0), epsilon = 1e-10);

        let reject = KeplerConfig::builder()
            .degenerate_policy(DegeneratePolicy::Reject)
            .build()
            .unwrap();
        let orbit = KeplerOrbit::from_elements(&circular, MU, reject).unwrap();
        assert_eq!(
            orbit.elements_at_epoch(),
            Err(OrbitError::DegenerateGeometry(ElementGeometry::Circular))
        );
        assert_eq!(
            orbit.osculating_elements(),
            Err(OrbitError::DegenerateGeometry(ElementGeometry::Circular))
        );
        // propagation is unaffected by the policy
        assert!(orbit.propagate(epoch() + hifitime::Unit::Day * 100.0).is_ok());
    }

    #[test]
    fn test_rectilinear_state_rejected() {
        let r = Vector3::new(1.0, 0.0, 0.0);
        let v = Vector3::new(-0.01, 0.0, 0.0);
        assert_eq!(
            KeplerOrbit::from_state(r, v, epoch(), MU, KeplerConfig::default()),
            Err(OrbitError::RectilinearMotion)
        );
        assert_eq!(
            KeplerOrbit::from_state(
                Vector3::new(f64::NAN, 0.0, 0.0),
                v,
                epoch(),
                MU,
                KeplerConfig::default()
            ),
            Err(OrbitError::InvalidElement(ElementError::NonFinite(
                "position"
            )))
        );
    }

    #[test]
    fn test_hyperbolic_true_anomaly_construction() {
        let el = OrbitalElements {
            reference_epoch: epoch(),
            semi_latus_rectum: 2.0,
            eccentricity: 1.5,
            inclination: deg(20.0),
            ascending_node_longitude: deg(10.0),
            periapsis_argument: deg(50.0),
            anomaly: AnomalyAtEpoch::True(deg(300.0)),
        };
        let orbit = KeplerOrbit::from_elements(&el, MU, KeplerConfig::default()).unwrap();
        assert_eq!(orbit.conic(), Conic::Hyperbolic);
        // inbound branch: negative mean anomaly
        assert!(orbit.mean_anomaly_at_epoch() < 0.0);
        let osc = orbit.osculating_elements().unwrap();
        assert_abs_diff_eq!(osc.true_anomaly, deg(300.0), epsilon = 1e-10);
        assert_eq!(osc.period, None);
    }

    #[test]
    fn test_orbit_around_central_body() {
        let around_sun = KeplerOrbit::from_elements_around(
            &ceres_elements(),
            CentralBody::Sun,
            KeplerConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(around_sun.mu(), MU, max_relative = 1e-12);
        assert_abs_diff_eq!(
            around_sun.reference_state().position,
            KeplerOrbit::from_elements(&ceres_elements(), MU, KeplerConfig::default())
                .unwrap()
                .reference_state()
                .position,
            epsilon = 1e-11
        );

        let mut lunar = ceres_elements();
        lunar.semi_latus_rectum = 0.00257;
        lunar.eccentricity = 0.0549;
        let moon =
            KeplerOrbit::from_elements_around(&lunar, CentralBody::Earth, KeplerConfig::default())
                .unwrap();
        assert_relative_eq!(moon.mu(), CentralBody::Earth.gm());
        // about 27 days
        let period = moon.period().unwrap();
        assert!(period > 25.0 && period < 29.0, "{period}");
    }

    #[test]
    fn test_parabolic_band_rejects_true_anomaly_at_pi() {
        let mut el = OrbitalElements {
            reference_epoch: epoch(),
            semi_latus_rectum: 1.0,
            eccentricity: 1.0 - 1e-13,
            inclination: deg(20.0),
            ascending_node_longitude: deg(10.0),
            periapsis_argument: deg(50.0),
            anomaly: AnomalyAtEpoch::True(PI),
        };
        assert_eq!(
            KeplerOrbit::from_elements(&el, MU, KeplerConfig::default()),
            Err(OrbitError::InvalidElement(ElementError::BeyondAsymptote {
                true_anomaly: PI,
                limit: PI
            }))
        );

        el.anomaly = AnomalyAtEpoch::True(-PI);
        assert!(matches!(
            KeplerOrbit::from_elements(&el, MU, KeplerConfig::default()),
            Err(OrbitError::InvalidElement(ElementError::BeyondAsymptote { .. }))
        ));

        el.anomaly = AnomalyAtEpoch::True(3.0);
        let orbit = KeplerOrbit::from_elements(&el, MU, KeplerConfig::default()).unwrap();
        assert_eq!(orbit.conic(), Conic::Parabolic);
        assert!(orbit.propagate(epoch()).unwrap().radius() < 1e3);
    }

    #[test]
    fn test_display() {
        let orbit = KeplerOrbit::from_elements(&ceres_elements(), MU, KeplerConfig::default())
            .unwrap();
        let text = format!("{orbit}");
        assert!(text.starts_with("Kepler orbit (elliptic, general)"));
        assert!(text.contains("e  = 0.076874650131"));
    }
}
