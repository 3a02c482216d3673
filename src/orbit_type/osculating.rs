use std::f64::consts::PI;
use std::fmt;

use hifitime::{Epoch, TimeScale};
use nalgebra::Vector3;

use crate::constants::{AstronomicalUnit, Day, GravitationalParameter, Radian, DPI};
use crate::kepler::{mean_motion, principal_angle, Anomaly, Conic};
use crate::orb_elem::state_to_elements;
use crate::orbit_errors::OrbitError;
use crate::time::shift_days;

/// Which angles of an element set are defined by convention rather than by the geometry.
///
/// * `Circular`: no periapsis, `ω = 0` and anomalies are measured from the ascending node.
/// * `Equatorial`: no node line, `Ω = 0` and `ω` is measured from the x axis.
/// * `CircularEquatorial`: both, anomalies are true longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementGeometry {
    General,
    Circular,
    Equatorial,
    CircularEquatorial,
}

impl ElementGeometry {
    pub fn from_flags(circular: bool, equatorial: bool) -> Self {
        match (circular, equatorial) {
            (false, false) => ElementGeometry::General,
            (true, false) => ElementGeometry::Circular,
            (false, true) => ElementGeometry::Equatorial,
            (true, true) => ElementGeometry::CircularEquatorial,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !matches!(self, ElementGeometry::General)
    }

    pub fn is_circular(&self) -> bool {
        matches!(
            self,
            ElementGeometry::Circular | ElementGeometry::CircularEquatorial
        )
    }

    pub fn is_equatorial(&self) -> bool {
        matches!(
            self,
            ElementGeometry::Equatorial | ElementGeometry::CircularEquatorial
        )
    }
}

impl fmt::Display for ElementGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementGeometry::General => write!(f, "general"),
            ElementGeometry::Circular => write!(f, "circular"),
            ElementGeometry::Equatorial => write!(f, "equatorial"),
            ElementGeometry::CircularEquatorial => write!(f, "circular equatorial"),
        }
    }
}

/// Complete set of osculating quantities of a state vector.
///
/// Angles follow the conventions of [`crate::orb_elem::state_to_elements`]: `i ∈ [0, π]`,
/// every other angle in `[0, 2π)`. For elliptic orbits the mean anomaly is in `[0, 2π)`, so
/// `periapsis_time` is the **latest** periapsis passage at or before `epoch`. For open orbits
/// the mean anomaly keeps its sign and `periapsis_time` is the unique passage.
///
/// Quantities that do not exist for a regime are `None`: the semi-major and semi-minor
/// axes of a parabola, the period and apoapsis of any open orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct OsculatingElements {
    pub epoch: Epoch,
    pub conic: Conic,
    pub geometry: ElementGeometry,

    pub semi_latus_rectum: AstronomicalUnit,
    pub eccentricity: f64,
    pub eccentricity_vector: Vector3<f64>,
    pub inclination: Radian,
    pub ascending_node_longitude: Radian,
    pub periapsis_argument: Radian,
    /// Unit vector toward the ascending node.
    pub node_vector: Vector3<f64>,
    pub angular_momentum: Vector3<f64>,

    pub true_anomaly: Radian,
    /// `E`, `D = tan(ν/2)` or `H` depending on the conic.
    pub auxiliary_anomaly: Anomaly,
    pub mean_anomaly: Radian,
    /// rad/day
    pub mean_motion: f64,

    pub semi_major_axis: Option<AstronomicalUnit>,
    pub semi_minor_axis: Option<AstronomicalUnit>,
    /// days
    pub period: Option<Day>,
    pub periapsis_distance: AstronomicalUnit,
    pub apoapsis_distance: Option<AstronomicalUnit>,
    pub periapsis_time: Epoch,

    pub argument_of_latitude: Radian,
    pub longitude_of_periapsis: Radian,
    pub mean_longitude: Radian,
    pub true_longitude: Radian,
    /// `v²/2 − μ/r`, AU²/day²
    pub specific_energy: f64,
}

impl OsculatingElements {
    /// Osculating elements of a state, in the frame the state is expressed in.
    ///
    /// Arguments
    /// -----------------
    /// * `position`, `velocity`: Cartesian state in AU and AU/day.
    /// * `epoch`: epoch of the state.
    /// * `mu`: gravitational parameter in AU³/day².
    /// * `degenerate_tolerance`: threshold on `e` and `sin i` below which the
    ///   [`ElementGeometry`] convention applies.
    /// * `parabolic_tolerance`: band around `e = 1` treated as parabolic.
    /// * `time_scale`: scale in which `periapsis_time` is computed.
    ///
    /// Errors
    /// -----------------
    /// * [`OrbitError::RectilinearMotion`] when the state has no orbital plane.
    pub fn from_state(
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        epoch: Epoch,
        mu: GravitationalParameter,
        degenerate_tolerance: f64,
        parabolic_tolerance: f64,
        time_scale: TimeScale,
    ) -> Result<Self, OrbitError> {
        let el = state_to_elements(position, velocity, mu, degenerate_tolerance)?;
        let e = el.eccentricity;
        let p = el.semi_latus_rectum;
        let conic = Conic::from_eccentricity(e, parabolic_tolerance);

        let nu = el.true_anomaly;
        let auxiliary_anomaly = match conic {
            Conic::Elliptic => Anomaly::from_true_anomaly(conic, e, nu),
            _ => Anomaly::from_true_anomaly(conic, e, wrap_open(nu)),
        };
        let mean_anomaly = match conic {
            Conic::Elliptic => principal_angle(auxiliary_anomaly.mean_anomaly(e)),
            _ => auxiliary_anomaly.mean_anomaly(e),
        };
        let n = mean_motion(conic, mu, p, e);

        let one_minus_e2 = 1.0 - e * e;
        let (semi_major_axis, semi_minor_axis) = match conic {
            Conic::Parabolic => (None, None),
            _ => (
                Some(p / one_minus_e2),
                Some(p / one_minus_e2.abs().sqrt()),
            ),
        };
        let (period, apoapsis_distance) = match conic {
            Conic::Elliptic => (Some(DPI / n), Some(p / (1.0 - e))),
            _ => (None, None),
        };

        let node = el.ascending_node_longitude;
        let peri = el.periapsis_argument;
        let speed2 = velocity.norm_squared();

        Ok(OsculatingElements {
            epoch,
            conic,
            geometry: el.geometry,
            semi_latus_rectum: p,
            eccentricity: e,
            eccentricity_vector: el.eccentricity_vector,
            inclination: el.inclination,
            ascending_node_longitude: node,
            periapsis_argument: peri,
            node_vector: el.node_vector,
            angular_momentum: el.angular_momentum,
            true_anomaly: nu,
            auxiliary_anomaly,
            mean_anomaly,
            mean_motion: n,
            semi_major_axis,
            semi_minor_axis,
            period,
            periapsis_distance: p / (1.0 + e),
            apoapsis_distance,
            periapsis_time: shift_days(epoch, -mean_anomaly / n, time_scale),
            argument_of_latitude: principal_angle(peri + nu),
            longitude_of_periapsis: principal_angle(node + peri),
            mean_longitude: principal_angle(node + peri + mean_anomaly),
            true_longitude: principal_angle(node + peri + nu),
            specific_energy: 0.5 * speed2 - mu / position.norm(),
        })
    }

    /// Eccentric anomaly `E ∈ (−π, π]`, for elliptic orbits only.
    pub fn eccentric_anomaly(&self) -> Option<Radian> {
        match self.auxiliary_anomaly {
            Anomaly::Eccentric(e) => Some(e),
            _ => None,
        }
    }
}

/// Open-orbit true anomalies are signed: before periapsis they are negative.
fn wrap_open(nu: Radian) -> Radian {
    if nu > PI {
        nu - DPI
    } else {
        nu
    }
}

impl fmt::Display for OsculatingElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / PI;
        let opt = |v: Option<f64>| v.map_or_else(|| "undefined".to_string(), |x| format!("{x:.9}"));

        writeln!(
            f,
            "Osculating Elements @ epoch: {} ({}, {})",
            self.epoch, self.conic, self.geometry
        )?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(f, "  p   (semi-latus rectum)     = {:.9} AU", self.semi_latus_rectum)?;
        writeln!(f, "  a   (semi-major axis)       = {} AU", opt(self.semi_major_axis))?;
        writeln!(f, "  e   (eccentricity)          = {:.9}", self.eccentricity)?;
        writeln!(
            f,
            "  i   (inclination)           = {:.9} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.9} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis) = {:.9} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        writeln!(
            f,
            "  ν   (true anomaly)          = {:.9} rad ({:.6}°)",
            self.true_anomaly,
            self.true_anomaly * rad_to_deg
        )?;
        writeln!(
            f,
            "  M   (mean anomaly)          = {:.9} rad ({:.6}°)",
            self.mean_anomaly,
            self.mean_anomaly * rad_to_deg
        )?;
        writeln!(f, "  n   (mean motion)           = {:.9e} rad/day", self.mean_motion)?;
        writeln!(f, "  q   (periapsis distance)    = {:.9} AU", self.periapsis_distance)?;
        writeln!(f, "  Q   (apoapsis distance)     = {} AU", opt(self.apoapsis_distance))?;
        writeln!(f, "  P   (period)                = {} days", opt(self.period))?;
        writeln!(f, "  T   (periapsis passage)     = {}", self.periapsis_time)
    }
}
