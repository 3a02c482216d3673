//! # Orbit catalogs
//!
//! Readers for the element catalogs distributed by the Minor Planet Center and by JPL,
//! turning their records into [`OrbitalElements`](crate::orbit_type::OrbitalElements)
//! referred to the ecliptic J2000.
//!
//! - [`mpcorb`]: fixed-width `MPCORB.DAT` asteroid lines and `CometEls.txt` comet lines.
//! - [`sbdb_csv`]: CSV exports of the JPL Small-Body Database query tool.
//!
//! Lines that cannot be parsed while reading a whole file are skipped with a warning; the
//! single-record entry points (`FromStr`, `to_elements`) return the error instead.
pub mod mpcorb;
pub mod sbdb_csv;
