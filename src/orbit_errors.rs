use thiserror::Error;

use crate::catalog::mpcorb::ParseMpcError;
use crate::orbit_type::osculating::ElementGeometry;

/// Reasons an element set is refused before any orbit is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("eccentricity must be non-negative, got {0}")]
    NegativeEccentricity(f64),

    #[error("semi-latus rectum must be strictly positive, got {0} AU")]
    NonPositiveSemiLatusRectum(f64),

    #[error("inclination must lie in [0, π], got {0} rad")]
    InclinationOutOfRange(f64),

    #[error("element `{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("true anomaly {true_anomaly} rad lies beyond the hyperbolic asymptote ±{limit} rad")]
    BeyondAsymptote { true_anomaly: f64, limit: f64 },

    #[error("a semi-major axis cannot describe a parabolic orbit (e = {0})")]
    ParabolicSemiMajorAxis(f64),

    #[error("semi-major axis sign does not match eccentricity (a = {a}, e = {e})")]
    SemiMajorAxisSign { a: f64, e: f64 },
}

#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("Invalid orbital element: {0}")]
    InvalidElement(#[from] ElementError),

    #[error("{solver} did not converge after {iterations} iterations (residual = {residual:e})")]
    Convergence {
        solver: &'static str,
        iterations: usize,
        residual: f64,
    },

    #[error("Degenerate orbit geometry ({0}) rejected by the configured policy")]
    DegenerateGeometry(ElementGeometry),

    #[error("Angular momentum vanishes: rectilinear motion has no orbital plane")]
    RectilinearMotion,

    #[error("Gravitational parameter must be strictly positive, got {0}")]
    NonPositiveGravitationalParameter(f64),

    #[error("Propagation interval of {0} days is beyond the representable range")]
    TimeBeyondRange(f64),

    #[error("Invalid Kepler configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown central body NAIF id: {0}")]
    UnknownCentralBody(i32),

    #[error("Incomplete catalog record: {0}")]
    IncompleteRecord(String),

    #[error("Error during the MPC orbit line parsing: {0}")]
    MpcParsing(ParseMpcError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ParseMpcError> for OrbitError {
    fn from(err: ParseMpcError) -> Self {
        OrbitError::MpcParsing(err)
    }
}

impl PartialEq for OrbitError {
    fn eq(&self, other: &Self) -> bool {
        use OrbitError::*;
        match (self, other) {
            (InvalidElement(a), InvalidElement(b)) => a == b,
            (
                Convergence {
                    solver: s1,
                    iterations: i1,
                    ..
                },
                Convergence {
                    solver: s2,
                    iterations: i2,
                    ..
                },
            ) => s1 == s2 && i1 == i2,
            (DegenerateGeometry(a), DegenerateGeometry(b)) => a == b,
            (NonPositiveGravitationalParameter(a), NonPositiveGravitationalParameter(b)) => a == b,
            (TimeBeyondRange(a), TimeBeyondRange(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (UnknownCentralBody(a), UnknownCentralBody(b)) => a == b,
            (IncompleteRecord(a), IncompleteRecord(b)) => a == b,
            (MpcParsing(a), MpcParsing(b)) => a == b,

            // foreign errors are not comparable: same variant is enough
            (CsvError(_), CsvError(_)) => true,
            (IoError(_), IoError(_)) => true,

            (RectilinearMotion, RectilinearMotion) => true,

            _ => false,
        }
    }
}
