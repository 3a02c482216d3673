//! # MPC orbit catalogs
//!
//! Fixed-column readers for the two element files published by the Minor Planet Center:
//!
//! - **MPCORB** (`MPCORB.DAT`, one asteroid per line): mean anomaly at a packed osculation
//!   epoch, angles in degrees (ecliptic J2000), semi-major axis in AU.
//! - **CometEls** (`CometEls.txt`, one comet per line): perihelion date with a fractional day,
//!   perihelion distance `q` in AU, angles in degrees (ecliptic J2000).
//!
//! Each line parses into a typed record ([`MpcOrbit`], [`MpcComet`]) through [`FromStr`], which
//! then converts into [`OrbitalElements`] or directly into a [`KeplerOrbit`]. Calendar dates
//! of both files are in TT.
//!
//! ## Packed dates
//!
//! MPCORB epochs use the 5-character packed form `CYYMD`: `C` is the century
//! (`I` = 18, `J` = 19, `K` = 20), `YY` the year in the century, and `M`, `D` month and day
//! coded with `0-9A-V`. See [`pack_date`] and [`unpack_date`].
//!
//! ```rust
//! use kepler_orbit::catalog::mpcorb::{pack_date, unpack_date};
//!
//! assert_eq!(unpack_date("K01AM").unwrap(), (2001, 10, 22));
//! assert_eq!(pack_date(1996, 1, 10).unwrap(), "J961A");
//! ```
use std::ops::Range;
use std::str::FromStr;

use camino::Utf8Path;
use hifitime::{Epoch, TimeScale};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::KeplerConfig;
use crate::constants::{AstronomicalUnit, GravitationalParameter, Radian};
use crate::kepler_orbit::KeplerOrbit;
use crate::orbit_errors::OrbitError;
use crate::orbit_type::{AnomalyAtEpoch, OrbitalElements};
use crate::time::epoch_from_fractional_day;

const PACKED_DATE_CHARS: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";

/// Shortest MPCORB line that still carries every orbital element (through the semi-major axis).
const MPCORB_MIN_LEN: usize = 103;

/// Shortest CometEls line that still carries every orbital element (through the inclination).
const COMET_MIN_LEN: usize = 79;

/// Line-level parsing errors for MPC element files.
///
/// Variants
/// -----------------
/// * `TooShortLine` – The line ends before the last orbital element column.
/// * `InvalidNumber` – A numeric column does not parse; carries the column name and raw text.
/// * `InvalidPackedDate` – The packed epoch is not of the form `CYYMD`.
/// * `InvalidDate` – The calendar date does not exist.
/// * `UnknownOrbitType` – The comet orbit type is not one of `P`, `C`, `D`, `X`, `I`, `A`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseMpcError {
    #[error("The line is too short ({0} characters)")]
    TooShortLine(usize),
    #[error("Invalid value for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Invalid packed date: {0:?}")]
    InvalidPackedDate(String),
    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),
    #[error("Unknown comet orbit type: {0:?}")]
    UnknownOrbitType(char),
}

/// Trimmed column slice; columns past the end of a shortened line are empty.
fn column(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    line.get(range.start.min(end)..end).unwrap_or("").trim()
}

fn parse_number<T: FromStr>(
    line: &str,
    range: Range<usize>,
    field: &'static str,
) -> Result<T, ParseMpcError> {
    let raw = column(line, range);
    raw.parse::<T>().map_err(|_| ParseMpcError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Same as [`parse_number`], blank columns give `None`.
fn parse_optional<T: FromStr>(
    line: &str,
    range: Range<usize>,
    field: &'static str,
) -> Result<Option<T>, ParseMpcError> {
    if column(line, range.clone()).is_empty() {
        Ok(None)
    } else {
        parse_number(line, range, field).map(Some)
    }
}

fn packed_value(c: u8) -> Option<u8> {
    PACKED_DATE_CHARS
        .iter()
        .position(|&p| p == c)
        .map(|v| v as u8)
}

/// Decode a packed MPC date `CYYMD` into `(year, month, day)`.
pub fn unpack_date(packed: &str) -> Result<(i32, u8, u8), ParseMpcError> {
    let invalid = || ParseMpcError::InvalidPackedDate(packed.to_string());
    let bytes = packed.as_bytes();
    if bytes.len() != 5 {
        return Err(invalid());
    }

    let century = packed_value(bytes[0]).ok_or_else(invalid)?;
    let year_in_century: i32 = packed
        .get(1..3)
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)?;
    let month = packed_value(bytes[3]).ok_or_else(invalid)?;
    let day = packed_value(bytes[4]).ok_or_else(invalid)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }

    Ok((100 * century as i32 + year_in_century, month, day))
}

/// Encode a calendar date into the packed MPC form `CYYMD`.
///
/// Years must lie in `0..3200`, the range of the century character.
pub fn pack_date(year: i32, month: u8, day: u8) -> Result<String, ParseMpcError> {
    if !(0..3200).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(ParseMpcError::InvalidDate(format!(
            "{year:04}-{month:02}-{day:02}"
        )));
    }
    let chars = [
        PACKED_DATE_CHARS[(year / 100) as usize] as char,
        (b'0' + ((year % 100) / 10) as u8) as char,
        (b'0' + (year % 10) as u8) as char,
        PACKED_DATE_CHARS[month as usize] as char,
        PACKED_DATE_CHARS[day as usize] as char,
    ];
    Ok(chars.iter().collect())
}

/// One asteroid of an MPCORB file.
///
/// Angles are converted to radians at parse time; every other field keeps the units of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct MpcOrbit {
    pub designation_packed: String,
    /// Absolute magnitude, blank for some objects.
    pub magnitude_h: Option<f64>,
    /// Slope parameter.
    pub magnitude_g: Option<f64>,
    pub epoch_packed: String,
    pub mean_anomaly: Radian,
    pub periapsis_argument: Radian,
    pub ascending_node_longitude: Radian,
    pub inclination: Radian,
    pub eccentricity: f64,
    /// degrees/day
    pub mean_daily_motion: f64,
    pub semi_major_axis: AstronomicalUnit,
    pub uncertainty: String,
    pub reference: String,
    pub observations: Option<u32>,
    pub oppositions: Option<u32>,
    pub observation_period: String,
    /// arcseconds
    pub rms_residual: Option<f64>,
    pub coarse_perturbers: String,
    pub precise_perturbers: String,
    pub computer_name: String,
    pub hex_flags: String,
    pub designation: String,
    /// `YYYYMMDD`
    pub last_observation_date: String,
}

impl FromStr for MpcOrbit {
    type Err = ParseMpcError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line.len() < MPCORB_MIN_LEN {
            return Err(ParseMpcError::TooShortLine(line.len()));
        }

        let angle = |range: Range<usize>, field| -> Result<Radian, ParseMpcError> {
            parse_number::<f64>(line, range, field).map(f64::to_radians)
        };

        Ok(MpcOrbit {
            designation_packed: column(line, 0..7).to_string(),
            magnitude_h: parse_optional(line, 8..13, "H")?,
            magnitude_g: parse_optional(line, 14..19, "G")?,
            epoch_packed: column(line, 20..25).to_string(),
            mean_anomaly: angle(26..35, "mean anomaly")?,
            periapsis_argument: angle(37..46, "argument of perihelion")?,
            ascending_node_longitude: angle(48..57, "longitude of ascending node")?,
            inclination: angle(59..68, "inclination")?,
            eccentricity: parse_number(line, 70..79, "eccentricity")?,
            mean_daily_motion: parse_number(line, 80..91, "mean daily motion")?,
            semi_major_axis: parse_number(line, 92..103, "semi-major axis")?,
            uncertainty: column(line, 105..106).to_string(),
            reference: column(line, 107..116).to_string(),
            observations: parse_optional(line, 117..122, "number of observations")?,
            oppositions: parse_optional(line, 123..126, "number of oppositions")?,
            observation_period: column(line, 127..136).to_string(),
            rms_residual: parse_optional(line, 137..141, "rms residual")?,
            coarse_perturbers: column(line, 142..145).to_string(),
            precise_perturbers: column(line, 146..149).to_string(),
            computer_name: column(line, 150..160).to_string(),
            hex_flags: column(line, 161..165).to_string(),
            designation: column(line, 166..194).to_string(),
            last_observation_date: column(line, 194..202).to_string(),
        })
    }
}

impl MpcOrbit {
    /// Osculation epoch, at 0h TT of the packed date.
    pub fn epoch(&self) -> Result<Epoch, ParseMpcError> {
        let (year, month, day) = unpack_date(&self.epoch_packed)?;
        Epoch::maybe_from_gregorian(year, month, day, 0, 0, 0, 0, TimeScale::TT)
            .map_err(|_| ParseMpcError::InvalidDate(self.epoch_packed.clone()))
    }

    /// Classical elements (ecliptic J2000) with the mean anomaly at the osculation epoch.
    pub fn to_elements(&self) -> Result<OrbitalElements, OrbitError> {
        OrbitalElements::from_semi_major_axis(
            self.semi_major_axis,
            self.eccentricity,
            self.inclination,
            self.ascending_node_longitude,
            self.periapsis_argument,
            AnomalyAtEpoch::Mean(self.mean_anomaly),
            self.epoch()?,
        )
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

/// Orbit type letter of a CometEls entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CometOrbitType {
    /// `P`: periodic comet.
    Periodic,
    /// `C`: long-period or non-periodic comet.
    NonPeriodic,
    /// `D`: defunct or disappeared comet.
    Defunct,
    /// `X`: no meaningful orbit could be computed.
    Uncertain,
    /// `I`: interstellar object.
    Interstellar,
    /// `A`: object first designated as an asteroid.
    Asteroidal,
}

impl TryFrom<char> for CometOrbitType {
    type Error = ParseMpcError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'P' => Ok(CometOrbitType::Periodic),
            'C' => Ok(CometOrbitType::NonPeriodic),
            'D' => Ok(CometOrbitType::Defunct),
            'X' => Ok(CometOrbitType::Uncertain),
            'I' => Ok(CometOrbitType::Interstellar),
            'A' => Ok(CometOrbitType::Asteroidal),
            other => Err(ParseMpcError::UnknownOrbitType(other)),
        }
    }
}

/// One comet of a CometEls file.
#[derive(Debug, Clone, PartialEq)]
pub struct MpcComet {
    /// Periodic comet number, absent for unnumbered comets.
    pub number: Option<u32>,
    pub orbit_type: CometOrbitType,
    pub designation_packed: String,
    pub perihelion_year: i32,
    pub perihelion_month: u8,
    /// Day of month with its fraction, e.g. `31.8266`.
    pub perihelion_day: f64,
    pub perihelion_distance: AstronomicalUnit,
    pub eccentricity: f64,
    pub periapsis_argument: Radian,
    pub ascending_node_longitude: Radian,
    pub inclination: Radian,
    /// Epoch of the perturbed solution `(year, month, day)`, blank for unperturbed orbits.
    pub perturbed_epoch: Option<(i32, u8, u8)>,
    /// Absolute magnitude.
    pub magnitude_g: Option<f64>,
    /// Slope parameter.
    pub magnitude_k: Option<f64>,
    pub designation: String,
}

impl FromStr for MpcComet {
    type Err = ParseMpcError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line.len() < COMET_MIN_LEN {
            return Err(ParseMpcError::TooShortLine(line.len()));
        }

        let angle = |range: Range<usize>, field| -> Result<Radian, ParseMpcError> {
            parse_number::<f64>(line, range, field).map(f64::to_radians)
        };

        let type_char = column(line, 4..5).chars().next().unwrap_or(' ');
        let whole_day: u8 = parse_number(line, 22..24, "perihelion day")?;
        let day_fraction = match column(line, 24..29) {
            "" => 0.0,
            raw => raw.parse::<f64>().map_err(|_| ParseMpcError::InvalidNumber {
                field: "perihelion day fraction",
                value: raw.to_string(),
            })?,
        };

        let perturbed_epoch = if column(line, 81..89).is_empty() {
            None
        } else {
            Some((
                parse_number(line, 81..85, "perturbed epoch year")?,
                parse_number(line, 85..87, "perturbed epoch month")?,
                parse_number(line, 87..89, "perturbed epoch day")?,
            ))
        };

        Ok(MpcComet {
            number: parse_optional(line, 0..4, "comet number")?,
            orbit_type: CometOrbitType::try_from(type_char)?,
            designation_packed: column(line, 5..12).to_string(),
            perihelion_year: parse_number(line, 14..18, "perihelion year")?,
            perihelion_month: parse_number(line, 19..21, "perihelion month")?,
            perihelion_day: whole_day as f64 + day_fraction,
            perihelion_distance: parse_number(line, 30..39, "perihelion distance")?,
            eccentricity: parse_number(line, 41..49, "eccentricity")?,
            periapsis_argument: angle(51..59, "argument of perihelion")?,
            ascending_node_longitude: angle(61..69, "longitude of ascending node")?,
            inclination: angle(71..79, "inclination")?,
            perturbed_epoch,
            magnitude_g: parse_optional(line, 91..95, "magnitude G")?,
            magnitude_k: parse_optional(line, 96..100, "magnitude K")?,
            designation: column(line, 102..158).to_string(),
        })
    }
}

impl MpcComet {
    /// Epoch of perihelion passage (TT).
    pub fn perihelion_time(&self) -> Result<Epoch, ParseMpcError> {
        epoch_from_fractional_day(
            self.perihelion_year,
            self.perihelion_month,
            self.perihelion_day,
            TimeScale::TT,
        )
        .ok_or_else(|| {
            ParseMpcError::InvalidDate(format!(
                "{:04}-{:02}-{}",
                self.perihelion_year, self.perihelion_month, self.perihelion_day
            ))
        })
    }

    /// Classical elements (ecliptic J2000) referred to the perihelion passage.
    pub fn to_elements(&self) -> Result<OrbitalElements, OrbitError> {
        let perihelion = self.perihelion_time()?;
        OrbitalElements::from_periapsis_distance(
            self.perihelion_distance,
            self.eccentricity,
            self.inclination,
            self.ascending_node_longitude,
            self.periapsis_argument,
            AnomalyAtEpoch::PeriapsisTime(perihelion),
            perihelion,
        )
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

/// Parse every line of `content`, skipping blanks and logging the lines that fail.
fn parse_lines<T>(content: &str, kind: &str) -> Vec<T>
where
    T: FromStr<Err = ParseMpcError>,
{
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match line.parse::<T>() {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(line = idx + 1, error = %err, "skipping {kind} line");
                None
            }
        })
        .collect()
}

/// Parse the body of an MPCORB file.
///
/// When the text carries the usual MPCORB.DAT header, everything up to and including the
/// dashed separator line is ignored. Unparsable lines are skipped with a warning.
pub fn parse_mpcorb(content: &str) -> Vec<MpcOrbit> {
    let body = match content.find("\n-----") {
        Some(start) => content[start + 1..]
            .split_once('\n')
            .map_or("", |(_, rest)| rest),
        None => content,
    };
    parse_lines(body, "MPCORB")
}

/// Parse a CometEls file body. Unparsable lines are skipped with a warning.
pub fn parse_comet_els(content: &str) -> Vec<MpcComet> {
    parse_lines(content, "CometEls")
}

/// Read and parse an MPCORB file.
///
/// Errors
/// ----------
/// * [`OrbitError::IoError`] if the file cannot be read.
pub fn read_mpcorb_file(path: &Utf8Path) -> Result<Vec<MpcOrbit>, OrbitError> {
    let content = std::fs::read_to_string(path)?;
    let orbits = parse_mpcorb(&content);
    debug!(path = %path, count = orbits.len(), "MPCORB file loaded");
    Ok(orbits)
}

/// Read and parse a CometEls file.
///
/// Errors
/// ----------
/// * [`OrbitError::IoError`] if the file cannot be read.
pub fn read_comet_els_file(path: &Utf8Path) -> Result<Vec<MpcComet>, OrbitError> {
    let content = std::fs::read_to_string(path)?;
    let comets = parse_comet_els(&content);
    debug!(path = %path, count = comets.len(), "CometEls file loaded");
    Ok(comets)
}
