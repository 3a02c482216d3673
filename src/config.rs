//! # Kepler engine configuration
//!
//! This module defines [`KeplerConfig`] and its builder. Every choice that would otherwise
//! be ambient state (time scale, frames, solver tolerances, degenerate-geometry policy,
//! propagation method) is an explicit field here, and each [`KeplerOrbit`](crate::kepler_orbit::KeplerOrbit)
//! carries the configuration it was built with.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hifitime::TimeScale;
//! use kepler_orbit::config::{DegeneratePolicy, KeplerConfig};
//! use kepler_orbit::propagator::PropagationMethod;
//! use kepler_orbit::ref_system::RefFrame;
//!
//! let config = KeplerConfig::builder()
//!     .time_scale(TimeScale::TDB)
//!     .element_frame(RefFrame::EquatorialJ2000)
//!     .degenerate_policy(DegeneratePolicy::Reject)
//!     .propagation(PropagationMethod::UniversalVariable)
//!     .kepler_tolerance(1e-13)
//!     .build()
//!     .unwrap();
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use hifitime::TimeScale;

use crate::orbit_errors::OrbitError;
use crate::propagator::PropagationMethod;
use crate::ref_system::RefFrame;

/// What element extraction does when the geometry leaves some angles undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Apply the zero-angle convention and tag the result.
    #[default]
    Fallback,
    /// Refuse with [`OrbitError::DegenerateGeometry`].
    Reject,
}

/// Configuration of orbit construction and propagation.
///
/// Fields
/// -----------------
/// **Time and frames**
/// * `time_scale` – scale in which elapsed times between epochs are measured.
/// * `element_frame` – frame the orbital elements (and reference state) are referred to.
/// * `output_frame` – frame of the states returned by
///   [`propagate`](crate::kepler_orbit::KeplerOrbit::propagate).
///
/// **Solvers**
/// * `kepler_max_iter` – iteration cap for the elliptic and hyperbolic Kepler solvers.
/// * `kepler_tolerance` – residual tolerance of the Kepler solvers (relative to `max(1, |M|)`
///   for hyperbolas).
/// * `universal_max_iter` – iteration cap for the universal-variable solver.
/// * `parabolic_tolerance` – band `|e − 1| ≤ tol` handled with Barker's equation.
///
/// **Degenerate geometry**
/// * `degenerate_tolerance` – threshold on `e` and `sin i` below which the orbit is treated as
///   circular and/or equatorial.
/// * `degenerate_policy` – see [`DegeneratePolicy`].
///
/// **Propagation**
/// * `propagation` – see [`PropagationMethod`].
///
/// Defaults
/// -----------------
/// * `time_scale`: TT
/// * `element_frame`: ecliptic J2000
/// * `output_frame`: equatorial J2000
/// * `kepler_max_iter`: 100
/// * `kepler_tolerance`: 1e-14
/// * `universal_max_iter`: 100
/// * `parabolic_tolerance`: 1e-12
/// * `degenerate_tolerance`: 1e-11
/// * `degenerate_policy`: fallback
/// * `propagation`: mean anomaly
///
/// Validation
/// -----------------
/// * `kepler_max_iter ≥ 1`, `universal_max_iter ≥ 1`.
/// * `0 < kepler_tolerance ≤ 1e-12`.
/// * `degenerate_tolerance > 0`.
/// * `0 ≤ parabolic_tolerance < 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeplerConfig {
    // --- Time and frames ---
    pub time_scale: TimeScale,
    pub element_frame: RefFrame,
    pub output_frame: RefFrame,

    // --- Solvers ---
    pub kepler_max_iter: usize,
    pub kepler_tolerance: f64,
    pub universal_max_iter: usize,
    pub parabolic_tolerance: f64,

    // --- Degenerate geometry ---
    pub degenerate_tolerance: f64,
    pub degenerate_policy: DegeneratePolicy,

    // --- Propagation ---
    pub propagation: PropagationMethod,
}

impl KeplerConfig {
    /// Equivalent to [`KeplerConfig::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`KeplerConfigBuilder`] initialised with the defaults.
    pub fn builder() -> KeplerConfigBuilder {
        KeplerConfigBuilder::new()
    }
}

impl Default for KeplerConfig {
    fn default() -> Self {
        KeplerConfig {
            time_scale: TimeScale::TT,
            element_frame: RefFrame::EclipticJ2000,
            output_frame: RefFrame::EquatorialJ2000,

            kepler_max_iter: 100,
            kepler_tolerance: 1e-14,
            universal_max_iter: 100,
            parabolic_tolerance: 1e-12,

            degenerate_tolerance: 1e-11,
            degenerate_policy: DegeneratePolicy::Fallback,

            propagation: PropagationMethod::MeanAnomaly,
        }
    }
}

/// Builder for [`KeplerConfig`], with validation.
#[derive(Debug, Clone)]
pub struct KeplerConfigBuilder {
    config: KeplerConfig,
}

impl Default for KeplerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeplerConfigBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            config: KeplerConfig::default(),
        }
    }

    // --- Time and frames ---
    pub fn time_scale(mut self, v: TimeScale) -> Self {
        self.config.time_scale = v;
        self
    }
    pub fn element_frame(mut self, v: RefFrame) -> Self {
        self.config.element_frame = v;
        self
    }
    pub fn output_frame(mut self, v: RefFrame) -> Self {
        self.config.output_frame = v;
        self
    }

    // --- Solvers ---
    pub fn kepler_max_iter(mut self, v: usize) -> Self {
        self.config.kepler_max_iter = v;
        self
    }
    pub fn kepler_tolerance(mut self, v: f64) -> Self {
        self.config.kepler_tolerance = v;
        self
    }
    pub fn universal_max_iter(mut self, v: usize) -> Self {
        self.config.universal_max_iter = v;
        self
    }
    pub fn parabolic_tolerance(mut self, v: f64) -> Self {
        self.config.parabolic_tolerance = v;
        self
    }

    // --- Degenerate geometry ---
    pub fn degenerate_tolerance(mut self, v: f64) -> Self {
        self.config.degenerate_tolerance = v;
        self
    }
    pub fn degenerate_policy(mut self, v: DegeneratePolicy) -> Self {
        self.config.degenerate_policy = v;
        self
    }

    // --- Propagation ---
    pub fn propagation(mut self, v: PropagationMethod) -> Self {
        self.config.propagation = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder and produce a [`KeplerConfig`].
    ///
    /// Returns
    /// -----------------
    /// * `Ok(KeplerConfig)` if every rule listed on [`KeplerConfig`] holds.
    /// * `Err(OrbitError::InvalidConfig)` naming the first violated rule otherwise.
    pub fn build(self) -> Result<KeplerConfig, OrbitError> {
        let c = &self.config;

        if c.kepler_max_iter == 0 {
            return Err(OrbitError::InvalidConfig(
                "kepler_max_iter must be >= 1".into(),
            ));
        }
        if c.universal_max_iter == 0 {
            return Err(OrbitError::InvalidConfig(
                "universal_max_iter must be >= 1".into(),
            ));
        }
        if !Self::gt0(c.kepler_tolerance) || c.kepler_tolerance.partial_cmp(&1e-12) == Some(Greater)
        {
            return Err(OrbitError::InvalidConfig(
                "kepler_tolerance must lie in (0, 1e-12]".into(),
            ));
        }
        if !Self::gt0(c.degenerate_tolerance) {
            return Err(OrbitError::InvalidConfig(
                "degenerate_tolerance must be > 0".into(),
            ));
        }
        if !Self::ge0(c.parabolic_tolerance) || c.parabolic_tolerance.partial_cmp(&1.0) != Some(Less)
        {
            return Err(OrbitError::InvalidConfig(
                "parabolic_tolerance must lie in [0, 1)".into(),
            ));
        }

        Ok(self.config)
    }
}

impl fmt::Display for KeplerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 46;
            writeln!(f, "Kepler Engine Configuration")?;
            writeln!(f, "---------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Time and frames]")?;
            line!(
                "time_scale           = {}",
                self.time_scale,
                "Scale of elapsed times"
            )?;
            line!(
                "element_frame        = {}",
                self.element_frame,
                "Frame of the orbital elements"
            )?;
            line!(
                "output_frame         = {}",
                self.output_frame,
                "Frame of propagated states"
            )?;

            writeln!(f, "\n[Solvers]")?;
            line!(
                "kepler_max_iter      = {}",
                self.kepler_max_iter,
                "Max Kepler solver iterations"
            )?;
            line!(
                "kepler_tolerance     = {:.1e}",
                self.kepler_tolerance,
                "Kepler residual tolerance"
            )?;
            line!(
                "universal_max_iter   = {}",
                self.universal_max_iter,
                "Max universal solver iterations"
            )?;
            line!(
                "parabolic_tolerance  = {:.1e}",
                self.parabolic_tolerance,
                "Band around e = 1 solved as a parabola"
            )?;

            writeln!(f, "\n[Degenerate geometry]")?;
            line!(
                "degenerate_tolerance = {:.1e}",
                self.degenerate_tolerance,
                "Threshold on e and sin(i)"
            )?;
            line!(
                "degenerate_policy    = {:?}",
                self.degenerate_policy,
                "Fallback convention or rejection"
            )?;

            writeln!(f, "\n[Propagation]")?;
            line!(
                "propagation          = {:?}",
                self.propagation,
                "Propagation method"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "KeplerConfig(time_scale={}, frames={}→{}, kepler_tol={:.1e}, max_iter={}, degenerate_tol={:.1e}, policy={:?}, propagation={:?})",
                self.time_scale,
                self.element_frame,
                self.output_frame,
                self.kepler_tolerance,
                self.kepler_max_iter,
                self.degenerate_tolerance,
                self.degenerate_policy,
                self.propagation,
            )
        }
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = KeplerConfig::default();
        assert_eq!(c, KeplerConfig::builder().build().unwrap());
        assert_eq!(c.time_scale, TimeScale::TT);
        assert_eq!(c.element_frame, RefFrame::EclipticJ2000);
        assert_eq!(c.output_frame, RefFrame::EquatorialJ2000);
        assert_eq!(c.kepler_max_iter, 100);
        assert_eq!(c.kepler_tolerance, 1e-14);
        assert_eq!(c.degenerate_policy, DegeneratePolicy::Fallback);
        assert_eq!(c.propagation, PropagationMethod::MeanAnomaly);
    }

    #[test]
    fn test_builder_overrides() {
        let c = KeplerConfig::builder()
            .time_scale(TimeScale::TDB)
            .element_frame(RefFrame::EquatorialJ2000)
            .degenerate_policy(DegeneratePolicy::Reject)
            .propagation(PropagationMethod::UniversalVariable)
            .build()
            .unwrap();
        assert_eq!(c.time_scale, TimeScale::TDB);
        assert_eq!(c.element_frame, RefFrame::EquatorialJ2000);
        assert_eq!(c.degenerate_policy, DegeneratePolicy::Reject);
        assert_eq!(c.propagation, PropagationMethod::UniversalVariable);
    }

    #[test]
    fn test_builder_validation() {
        let err = |b: KeplerConfigBuilder| b.build().unwrap_err();

        assert_eq!(
            err(KeplerConfig::builder().kepler_max_iter(0)),
            OrbitError::InvalidConfig("kepler_max_iter must be >= 1".into())
        );
        assert_eq!(
            err(KeplerConfig::builder().universal_max_iter(0)),
            OrbitError::InvalidConfig("universal_max_iter must be >= 1".into())
        );
        for tol in [0.0, -1e-15, 1e-10, f64::NAN] {
            assert_eq!(
                err(KeplerConfig::builder().kepler_tolerance(tol)),
                OrbitError::InvalidConfig("kepler_tolerance must lie in (0, 1e-12]".into())
            );
        }
        assert!(KeplerConfig::builder()
            .kepler_tolerance(1e-12)
            .build()
            .is_ok());
        assert!(KeplerConfig::builder()
            .degenerate_tolerance(0.0)
            .build()
            .is_err());
        assert!(KeplerConfig::builder()
            .parabolic_tolerance(1.0)
            .build()
            .is_err());
        assert!(KeplerConfig::builder()
            .parabolic_tolerance(0.0)
            .build()
            .is_ok());
    }

    #[test]
    fn test_display() {
        let c = KeplerConfig::default();
        let short = format!("{c}");
        assert!(short.starts_with("KeplerConfig(time_scale=TT"));

        let long = format!("{c:#}");
        assert!(long.contains("[Degenerate geometry]"));
        assert!(long.contains("kepler_tolerance     = 1.0e-14"));
    }
}
