//! # Constants and type definitions for the Kepler engine
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Angle and time conversions (degrees ↔ radians, days ↔ seconds, AU ↔ km)
//! - Heliocentric gravitational parameters in AU³/day²
//! - The [`CentralBody`] table of planetary gravitational parameters keyed by NAIF id
//!
//! Every quantity exposed by the engine uses AU, days and radians; the constants below are the
//! only place where SI values are converted.

use crate::orbit_errors::OrbitError;

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Obliquity of the ecliptic at J2000 (IAU 2006), in arcseconds
pub const OBLIQUITY_J2000_ARCSEC: f64 = 84381.406;

/// Gaussian gravitational constant k (used in classical orbit dynamics)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// k², the heliocentric gravitational parameter in AU³/day² of the Gaussian system
pub const GAUSS_GRAV_SQUARED: f64 = GAUSS_GRAV * GAUSS_GRAV;

/// Heliocentric gravitational constant GM☉ in km³/s² (Pitjeva 2005)
pub const GM_SUN_PITJEVA_2005_KM3_S2: f64 = 1.327_124_400_419_393_8e11;

/// Heliocentric gravitational constant GM☉ (Pitjeva 2005) converted to AU³/day²
pub const GM_SUN_PITJEVA_2005: f64 =
    GM_SUN_PITJEVA_2005_KM3_S2 * SECONDS_PER_DAY * SECONDS_PER_DAY / AU / AU / AU;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Duration in days
pub type Day = f64;
/// Gravitational parameter in AU³/day²
pub type GravitationalParameter = f64;

/// Convert a gravitational parameter from km³/s² to AU³/day².
#[inline]
pub fn km3_s2_to_au3_day2(gm: f64) -> GravitationalParameter {
    gm * SECONDS_PER_DAY * SECONDS_PER_DAY / AU / AU / AU
}

// -------------------------------------------------------------------------------------------------
// Central bodies
// -------------------------------------------------------------------------------------------------

/// Attracting bodies with a tabulated gravitational parameter.
///
/// Discriminants are the NAIF integer ids. Planetary values are the DE440 system
/// masses (planet plus satellites for the outer planets); the Sun uses the
/// Pitjeva (2005) value so that heliocentric orbits agree with [`GM_SUN_PITJEVA_2005`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CentralBody {
    Sun = 10,
    Mercury = 199,
    Venus = 299,
    Earth = 399,
    Moon = 301,
    EarthMoonBarycenter = 3,
    Mars = 4,
    Jupiter = 5,
    Saturn = 6,
    Uranus = 7,
    Neptune = 8,
    Pluto = 9,
}

impl CentralBody {
    pub fn from_id(id: i32) -> Result<Self, OrbitError> {
        match id {
            10 => Ok(CentralBody::Sun),
            199 => Ok(CentralBody::Mercury),
            299 => Ok(CentralBody::Venus),
            399 => Ok(CentralBody::Earth),
            301 => Ok(CentralBody::Moon),
            3 => Ok(CentralBody::EarthMoonBarycenter),
            4 => Ok(CentralBody::Mars),
            5 => Ok(CentralBody::Jupiter),
            6 => Ok(CentralBody::Saturn),
            7 => Ok(CentralBody::Uranus),
            8 => Ok(CentralBody::Neptune),
            9 => Ok(CentralBody::Pluto),
            _ => Err(OrbitError::UnknownCentralBody(id)),
        }
    }

    pub fn to_id(&self) -> i32 {
        *self as i32
    }

    /// Gravitational parameter in km³/s².
    pub fn gm_km3_s2(&self) -> f64 {
        match self {
            CentralBody::Sun => GM_SUN_PITJEVA_2005_KM3_S2,
            CentralBody::Mercury => 22_031.868_551,
            CentralBody::Venus => 324_858.592,
            CentralBody::Earth => 398_600.435_507,
            CentralBody::Moon => 4_902.800_118,
            CentralBody::EarthMoonBarycenter => 403_503.235_502,
            CentralBody::Mars => 42_828.375_816,
            CentralBody::Jupiter => 126_712_764.1,
            CentralBody::Saturn => 37_940_584.841_8,
            CentralBody::Uranus => 5_794_556.4,
            CentralBody::Neptune => 6_836_527.100_58,
            CentralBody::Pluto => 975.5,
        }
    }

    /// Gravitational parameter in AU³/day², the unit used by the propagator.
    pub fn gm(&self) -> GravitationalParameter {
        km3_s2_to_au3_day2(self.gm_km3_s2())
    }

    pub fn name(&self) -> &'static str {
        match self {
            CentralBody::Sun => "Sun",
            CentralBody::Mercury => "Mercury",
            CentralBody::Venus => "Venus",
            CentralBody::Earth => "Earth",
            CentralBody::Moon => "Moon",
            CentralBody::EarthMoonBarycenter => "Earth-Moon barycenter",
            CentralBody::Mars => "Mars",
            CentralBody::Jupiter => "Jupiter",
            CentralBody::Saturn => "Saturn",
            CentralBody::Uranus => "Uranus",
            CentralBody::Neptune => "Neptune",
            CentralBody::Pluto => "Pluto",
        }
    }
}

impl From<CentralBody> for i32 {
    fn from(body: CentralBody) -> Self {
        body.to_id()
    }
}

impl TryFrom<i32> for CentralBody {
    type Error = OrbitError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        CentralBody::from_id(id)
    }
}

impl std::fmt::Display for CentralBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
