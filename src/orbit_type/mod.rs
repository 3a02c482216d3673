//! # Orbital element representations
//!
//! This module defines the data exchanged with the Kepler engine:
//!
//! - [`OrbitalElements`](crate::orbit_type::OrbitalElements): classical elements
//!   `(p, e, i, Ω, ω)` plus **one** anomaly specification ([`AnomalyAtEpoch`]). The
//!   semi-latus rectum `p` is used instead of the semi-major axis so that the same set
//!   describes elliptic, parabolic and hyperbolic orbits.
//! - [`state_vector`](crate::orbit_type::state_vector): Cartesian position/velocity with
//!   its epoch and reference frame.
//! - [`osculating`](crate::orbit_type::osculating): the full set of osculating quantities
//!   extracted from a state (anomalies, distances, period, longitudes, …) together with
//!   the degenerate-geometry tag.
//!
//! ## Typical workflow
//!
//! ```rust, no_run
//! use hifitime::{Epoch, TimeScale};
//! use kepler_orbit::orbit_type::{AnomalyAtEpoch, OrbitalElements};
//! use kepler_orbit::constants::RADEG;
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
//! println!("{ceres}");
//! ```
use std::f64::consts::PI;
use std::fmt;

use hifitime::Epoch;

use crate::constants::{AstronomicalUnit, Radian};
use crate::kepler::Conic;
use crate::orbit_errors::{ElementError, OrbitError};

/// Cartesian state vectors tagged with epoch and frame.
pub mod state_vector;

/// Osculating elements and the degenerate-geometry convention.
pub mod osculating;

/// How the position of the body on its conic is given at the reference epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnomalyAtEpoch {
    /// Mean anomaly `M` in radians (`D + D³/3` for parabolas, `e sinh H − H` for hyperbolas).
    Mean(Radian),
    /// True anomaly `ν` in radians.
    True(Radian),
    /// Epoch of periapsis passage.
    PeriapsisTime(Epoch),
}

/// Classical orbital elements of a two-body conic.
///
/// Units: AU and radians. The elements are expressed in whatever frame the orbit
/// is configured with (ecliptic J2000 by default).
///
/// Fields
/// -----------------
/// * `reference_epoch`: epoch at which `anomaly` is given.
/// * `semi_latus_rectum`: `p = h²/μ` in AU (`a(1 − e²)` for ellipses, `2q` for parabolas).
/// * `eccentricity`: `e ≥ 0`.
/// * `inclination`: `i ∈ [0, π]`.
/// * `ascending_node_longitude`: `Ω`.
/// * `periapsis_argument`: `ω`.
/// * `anomaly`: exactly one anomaly specification.
///
/// See also
/// ------------
/// * [`crate::kepler_orbit::KeplerOrbit::from_elements`] – builds a propagatable orbit.
/// * [`crate::orbit_type::osculating::OsculatingElements`] – derived quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElements {
    pub reference_epoch: Epoch,
    pub semi_latus_rectum: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Radian,
    pub ascending_node_longitude: Radian,
    pub periapsis_argument: Radian,
    pub anomaly: AnomalyAtEpoch,
}

impl OrbitalElements {
    /// Build elements from the semi-major axis instead of the semi-latus rectum.
    ///
    /// Arguments
    /// -----------------
    /// * `semi_major_axis`: `a` in AU, positive for ellipses and negative for hyperbolas.
    /// * `eccentricity`, `inclination`, `ascending_node_longitude`, `periapsis_argument`: as in
    ///   [`OrbitalElements`].
    /// * `anomaly`: anomaly at `reference_epoch`.
    ///
    /// Return
    /// ----------
    /// * Elements with `p = a(1 − e²)`.
    ///
    /// Errors
    /// ----------
    /// * [`ElementError::ParabolicSemiMajorAxis`] for `e = 1`, where `a` is infinite.
    /// * [`ElementError::SemiMajorAxisSign`] when the sign of `a` contradicts `e`.
    /// * Any [`OrbitalElements::validate`] failure.
    pub fn from_semi_major_axis(
        semi_major_axis: AstronomicalUnit,
        eccentricity: f64,
        inclination: Radian,
        ascending_node_longitude: Radian,
        periapsis_argument: Radian,
        anomaly: AnomalyAtEpoch,
        reference_epoch: Epoch,
    ) -> Result<Self, OrbitError> {
        if eccentricity == 1.0 {
            return Err(ElementError::ParabolicSemiMajorAxis(eccentricity).into());
        }
        if (semi_major_axis > 0.0) != (eccentricity < 1.0) {
            return Err(ElementError::SemiMajorAxisSign {
                a: semi_major_axis,
                e: eccentricity,
            }
            .into());
        }

        let elements = OrbitalElements {
            reference_epoch,
            semi_latus_rectum: semi_major_axis * (1.0 - eccentricity * eccentricity),
            eccentricity,
            inclination,
            ascending_node_longitude,
            periapsis_argument,
            anomaly,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Build elements from the periapsis distance `q`, the natural parameter of
    /// cometary orbits (`p = q(1 + e)`).
    pub fn from_periapsis_distance(
        periapsis_distance: AstronomicalUnit,
        eccentricity: f64,
        inclination: Radian,
        ascending_node_longitude: Radian,
        periapsis_argument: Radian,
        anomaly: AnomalyAtEpoch,
        reference_epoch: Epoch,
    ) -> Result<Self, OrbitError> {
        let elements = OrbitalElements {
            reference_epoch,
            semi_latus_rectum: periapsis_distance * (1.0 + eccentricity),
            eccentricity,
            inclination,
            ascending_node_longitude,
            periapsis_argument,
            anomaly,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Check the domain of every element.
    ///
    /// Rules
    /// -----------------
    /// * every value is finite,
    /// * `e ≥ 0`, `p > 0`, `0 ≤ i ≤ π`,
    /// * for `e ≥ 1` a true anomaly must satisfy `|ν| < acos(−1/e)` (the body cannot sit on
    ///   or beyond the asymptotes).
    pub fn validate(&self) -> Result<(), ElementError> {
        let finite = [
            ("semi_latus_rectum", self.semi_latus_rectum),
            ("eccentricity", self.eccentricity),
            ("inclination", self.inclination),
            ("ascending_node_longitude", self.ascending_node_longitude),
            ("periapsis_argument", self.periapsis_argument),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ElementError::NonFinite(*name));
        }
        match self.anomaly {
            AnomalyAtEpoch::Mean(m) if !m.is_finite() => {
                return Err(ElementError::NonFinite("mean_anomaly"))
            }
            AnomalyAtEpoch::True(nu) if !nu.is_finite() => {
                return Err(ElementError::NonFinite("true_anomaly"))
            }
            _ => {}
        }

        if self.eccentricity < 0.0 {
            return Err(ElementError::NegativeEccentricity(self.eccentricity));
        }
        if self.semi_latus_rectum <= 0.0 {
            return Err(ElementError::NonPositiveSemiLatusRectum(
                self.semi_latus_rectum,
            ));
        }
        if !(0.0..=PI).contains(&self.inclination) {
            return Err(ElementError::InclinationOutOfRange(self.inclination));
        }

        if let AnomalyAtEpoch::True(nu) = self.anomaly {
            if self.eccentricity >= 1.0 {
                let limit = (-1.0 / self.eccentricity).acos();
                let wrapped = crate::kepler::wrap_pi(nu);
                if wrapped.abs() >= limit {
                    return Err(ElementError::BeyondAsymptote {
                        true_anomaly: nu,
                        limit,
                    });
                }
            }
        }
        Ok(())
    }

    /// Conic regime, with `|e − 1| ≤ parabolic_tolerance` counted as parabolic.
    pub fn conic(&self, parabolic_tolerance: f64) -> Conic {
        Conic::from_eccentricity(self.eccentricity, parabolic_tolerance)
    }

    /// Semi-major axis `p/(1 − e²)`, negative for hyperbolas, `None` for an exact parabola.
    pub fn semi_major_axis(&self) -> Option<AstronomicalUnit> {
        let d = 1.0 - self.eccentricity * self.eccentricity;
        (d != 0.0).then(|| self.semi_latus_rectum / d)
    }

    /// Periapsis distance `q = p/(1 + e)`.
    pub fn periapsis_distance(&self) -> AstronomicalUnit {
        self.semi_latus_rectum / (1.0 + self.eccentricity)
    }
}

impl fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / PI;
        writeln!(f, "Orbital Elements @ epoch: {}", self.reference_epoch)?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  p   (semi-latus rectum)     = {:.6} AU",
            self.semi_latus_rectum
        )?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis) = {:.6} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        match self.anomaly {
            AnomalyAtEpoch::Mean(m) => writeln!(
                f,
                "  M   (mean anomaly)          = {:.6} rad ({:.6}°)",
                m,
                m * rad_to_deg
            ),
            AnomalyAtEpoch::True(nu) => writeln!(
                f,
                "  ν   (true anomaly)          = {:.6} rad ({:.6}°)",
                nu,
                nu * rad_to_deg
            ),
            AnomalyAtEpoch::PeriapsisTime(t) => {
                writeln!(f, "  T   (periapsis passage)     = {t}")
            }
        }
    }
}
