//! JPL Small-Body Database CSV exports.
//!
//! The SBDB query tool exports one object per row with the header
//! `full_name,epoch,e,a,q,i,om,w,ma,tp`. Epochs are Julian dates in TDB, angles are in
//! degrees referred to the ecliptic J2000, distances in AU. Columns may be left empty:
//! `a` and `ma` are undefined for open orbits, and `tp` is sometimes missing for asteroids.
use std::io::Read;

use camino::Utf8Path;
use hifitime::TimeScale;
use serde::Deserialize;
use tracing::debug;

use crate::config::KeplerConfig;
use crate::constants::GravitationalParameter;
use crate::kepler_orbit::KeplerOrbit;
use crate::orbit_errors::OrbitError;
use crate::orbit_type::{AnomalyAtEpoch, OrbitalElements};
use crate::time::epoch_from_julian_date;

/// One row of an SBDB CSV export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SbdbRecord {
    pub full_name: String,
    /// Osculation epoch, JD (TDB).
    pub epoch: f64,
    pub e: f64,
    /// Semi-major axis, AU.
    pub a: Option<f64>,
    /// Perihelion distance, AU.
    pub q: Option<f64>,
    /// Inclination, degrees.
    pub i: f64,
    /// Longitude of the ascending node, degrees.
    pub om: f64,
    /// Argument of perihelion, degrees.
    pub w: f64,
    /// Mean anomaly at `epoch`, degrees.
    pub ma: Option<f64>,
    /// Time of perihelion passage, JD (TDB).
    pub tp: Option<f64>,
}

impl SbdbRecord {
    /// Classical elements at the osculation epoch.
    ///
    /// The anomaly is the mean anomaly when the row has one for a bound orbit, otherwise the
    /// perihelion passage. The size of the conic comes from `q` when present, else from `a`.
    ///
    /// Errors
    /// ----------
    /// * [`OrbitError::IncompleteRecord`] if the row has no usable anomaly or no conic size.
    /// * [`OrbitError::InvalidElement`] for out-of-domain values.
    pub fn to_elements(&self) -> Result<OrbitalElements, OrbitError> {
        let epoch = epoch_from_julian_date(self.epoch, TimeScale::TDB);
        let anomaly = match (self.ma, self.tp) {
            (Some(ma), _) if self.e < 1.0 => AnomalyAtEpoch::Mean(ma.to_radians()),
            (_, Some(tp)) => {
                AnomalyAtEpoch::PeriapsisTime(epoch_from_julian_date(tp, TimeScale::TDB))
            }
            _ => {
                return Err(OrbitError::IncompleteRecord(format!(
                    "{}: no mean anomaly or perihelion time",
                    self.full_name
                )))
            }
        };

        let (i, om, w) = (self.i.to_radians(), self.om.to_radians(), self.w.to_radians());
        match (self.q, self.a) {
            (Some(q), _) => {
                OrbitalElements::from_periapsis_distance(q, self.e, i, om, w, anomaly, epoch)
            }
            (None, Some(a)) => {
                OrbitalElements::from_semi_major_axis(a, self.e, i, om, w, anomaly, epoch)
            }
            (None, None) => Err(OrbitError::IncompleteRecord(format!(
                "{}: no perihelion distance or semi-major axis",
                self.full_name
            ))),
        }
    }

    /// Propagatable orbit; `config.element_frame` should be ecliptic J2000.
    pub fn to_orbit(
        &self,
        mu: GravitationalParameter,
        config: KeplerConfig,
    ) -> Result<KeplerOrbit, OrbitError> {
        KeplerOrbit::from_elements(&self.to_elements()?, mu, config)
    }
}

/// Deserialize SBDB rows from any reader (header row required).
///
/// Errors
/// ----------
/// * [`OrbitError::CsvError`] on the first malformed row.
pub fn parse_sbdb_csv<R: Read>(reader: R) -> Result<Vec<SbdbRecord>, OrbitError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv_reader
        .deserialize::<SbdbRecord>()
        .map(|record| record.map_err(OrbitError::from))
        .collect()
}

/// Read an SBDB CSV export from disk.
pub fn read_sbdb_csv(path: &Utf8Path) -> Result<Vec<SbdbRecord>, OrbitError> {
    let file = std::fs::File::open(path)?;
    let records = parse_sbdb_csv(file)?;
    debug!(path = %path, count = records.len(), "SBDB CSV loaded");
    Ok(records)
}

#[cfg(test)]
mod sbdb_csv_test {
    use super::*;
    use crate::orbit_errors::ElementError;
    use approx::assert_relative_eq;

    const EXPORT: &str = "\
full_name,epoch,e,a,q,i,om,w,ma,tp
\"     1 Ceres (A801 AA)\",2460800.5,.07957631994609543,2.765615651508659,2.545543769013596,10.58788658206854,80.24963090816965,73.29975464616518,1.404498396186631,2460611.020089304
\"     1P/Halley\",2439875.5,.9679427911271415,17.92863504856929,.5751596225563,162.1951462980701,59.07198712310091,112.2128395742619,,2446469.966793622
\"  C/2019 Q4 (Borisov)\",2458900.5,3.356474173123264,,2.006564940009213,44.05347037453957,308.1438043362212,209.1211049009993,,2458826.052218955
";

    #[test]
    fn test_parse_export() {
        let rows = parse_sbdb_csv(EXPORT.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].full_name, "1 Ceres (A801 AA)");
        assert_eq!(rows[0].epoch, 2460800.5);
        assert_eq!(rows[0].ma, Some(1.404498396186631));
        assert_eq!(rows[1].ma, None);
        assert_eq!(rows[2].a, None);
        assert!(rows[2].e > 1.0);
    }

    #[test]
    fn test_to_elements() {
        let rows = parse_sbdb_csv(EXPORT.as_bytes()).unwrap();

        let ceres = rows[0].to_elements().unwrap();
        assert!(matches!(ceres.anomaly, AnomalyAtEpoch::Mean(_)));
        assert_relative_eq!(ceres.periapsis_distance(), 2.545543769013596, max_relative = 1e-14);

        let halley = rows[1].to_elements().unwrap();
        assert!(matches!(halley.anomaly, AnomalyAtEpoch::PeriapsisTime(_)));

        let borisov = rows[2].to_elements().unwrap();
        assert!(borisov.eccentricity > 1.0);
        assert!(borisov.semi_major_axis().unwrap() < 0.0);
    }

    #[test]
    fn test_incomplete_and_invalid_rows() {
        let rows = parse_sbdb_csv(EXPORT.as_bytes()).unwrap();

        let mut no_anomaly = rows[1].clone();
        no_anomaly.tp = None;
        assert!(matches!(
            no_anomaly.to_elements(),
            Err(OrbitError::IncompleteRecord(_))
        ));

        let mut no_size = rows[0].clone();
        no_size.a = None;
        no_size.q = None;
        assert!(matches!(
            no_size.to_elements(),
            Err(OrbitError::IncompleteRecord(_))
        ));

        let mut bad = rows[0].clone();
        bad.i = 200.0;
        assert!(matches!(
            bad.to_elements(),
            Err(OrbitError::InvalidElement(ElementError::InclinationOutOfRange(_)))
        ));

        let malformed = "full_name,epoch,e,a,q,i,om,w,ma,tp\nx,not-a-date,0.1,1,0.9,1,1,1,1,\n";
        assert!(matches!(
            parse_sbdb_csv(malformed.as_bytes()),
            Err(OrbitError::CsvError(_))
        ));
    }
}
