//! # kepler-orbit
//!
//! Two-body (Keplerian) propagation of heliocentric orbits.
//!
//! A [`KeplerOrbit`](crate::kepler_orbit::KeplerOrbit) is built either from classical
//! elements or from a Cartesian state, then evaluated at any epoch. Elliptic, parabolic and
//! hyperbolic motions share one code path: the elements carry the semi-latus rectum, the
//! Kepler equation is solved per conic in [`kepler`], and a universal-variable propagator
//! is available as an alternative in [`propagator`].
//!
//! ```rust, no_run
//! use hifitime::{Epoch, TimeScale};
//! use kepler_orbit::config::KeplerConfig;
//! use kepler_orbit::constants::{GM_SUN_PITJEVA_2005, RADEG};
//! use kepler_orbit::kepler_orbit::KeplerOrbit;
//! use kepler_orbit::orbit_type::{AnomalyAtEpoch, OrbitalElements};
//!
//! let epoch = Epoch::from_gregorian_at_midnight(2020, 1, 1, TimeScale::TT);
//! let elements = OrbitalElements::from_semi_major_axis(
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
//! let orbit = KeplerOrbit::from_elements(&elements, GM_SUN_PITJEVA_2005, KeplerConfig::default()).unwrap();
//! let state = orbit
//!     .propagate(Epoch::from_gregorian_hms(2025, 4, 21, 12, 0, 0, TimeScale::TT))
//!     .unwrap();
//! println!("{state}");
//! ```
pub mod catalog;
pub mod config;
pub mod constants;
pub mod kepler;
pub mod kepler_orbit;
pub mod orb_elem;
pub mod orbit_errors;
pub mod orbit_type;
pub mod propagator;
pub mod ref_system;
pub mod time;
