//! Time-scale helpers on top of [`hifitime`].
//!
//! Every elapsed time handed to the propagator is a difference of two [`Epoch`]s
//! expressed in one explicit [`TimeScale`], in days.

use hifitime::{Epoch, TimeScale, Unit};

use crate::constants::Day;

/// Signed number of days from `from` to `to`, both read in `time_scale`.
///
/// Arguments
/// ---------
/// * `from`: start epoch.
/// * `to`: end epoch.
/// * `time_scale`: scale in which the two epochs are differenced (TT, TDB, …).
///
/// Return
/// ------
/// * `to - from` in days; negative when `to` precedes `from`.
pub fn elapsed_days(from: Epoch, to: Epoch, time_scale: TimeScale) -> Day {
    (to.to_time_scale(time_scale) - from.to_time_scale(time_scale)).to_unit(Unit::Day)
}

/// Shift `epoch` by a (possibly negative, fractional) number of days in `time_scale`.
///
/// The result is expressed in `time_scale`.
pub fn shift_days(epoch: Epoch, days: Day, time_scale: TimeScale) -> Epoch {
    epoch.to_time_scale(time_scale) + Unit::Day * days
}

/// Build an epoch from a calendar date whose day carries a fractional part,
/// e.g. `2061 08 31.8266` as printed in MPC comet tables.
///
/// Arguments
/// ---------
/// * `year`, `month`: calendar year and month.
/// * `day`: day of month with its fraction (31.8266 = 31 Aug, 19h50m18.24s).
/// * `time_scale`: scale the calendar date refers to.
///
/// Return
/// ------
/// * `None` if the integer part of the date is not a valid Gregorian date.
pub fn epoch_from_fractional_day(
    year: i32,
    month: u8,
    day: f64,
    time_scale: TimeScale,
) -> Option<Epoch> {
    if !day.is_finite() || day < 1.0 || day >= 32.0 {
        return None;
    }
    let whole = day.trunc();
    let midnight = Epoch::maybe_from_gregorian(year, month, whole as u8, 0, 0, 0, 0, time_scale)
        .ok()?;
    Some(midnight + Unit::Day * (day - whole))
}

/// Julian date of an epoch read in `time_scale`.
///
/// TT, TDB, ET and UTC use their own Julian day count; every other scale is read as TAI.
pub fn julian_date(epoch: Epoch, time_scale: TimeScale) -> f64 {
    match time_scale {
        TimeScale::TT => epoch.to_jde_tt_days(),
        TimeScale::TDB => epoch.to_jde_tdb_days(),
        TimeScale::ET => epoch.to_jde_et_days(),
        TimeScale::UTC => epoch.to_jde_utc_days(),
        _ => epoch.to_jde_tai_days(),
    }
}

/// Epoch of a Julian date expressed in `time_scale`.
pub fn epoch_from_julian_date(jd: f64, time_scale: TimeScale) -> Epoch {
    Epoch::from_jde_in_time_scale(jd, time_scale)
}
