#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use hifitime::{Epoch, TimeScale};
use kepler_orbit::constants::RADEG;
use kepler_orbit::orbit_type::{AnomalyAtEpoch, OrbitalElements};
use nalgebra::Vector3;

pub const CERES_MPC: &str = "00001    3.34  0.15 K2555 188.70269   73.27343   80.25221   10.58780  0.0794013  0.21424651   2.7660512  0 E2024-V47  7330 125 1801-2024 0.80 M-v 30k MPCLINUX   4000      (1) Ceres              20241101";
pub const HALLEY_MPC: &str = "0001P         2061 08 31.8266  0.583972  0.967311  112.5470   59.6368  162.2146  20250501   4.0  6.0  1P/Halley                                                 98, 1083";

/// 2025-04-21 12:00 TT, the common query epoch of the reference solutions.
pub fn target_epoch() -> Epoch {
    Epoch::from_gregorian_hms(2025, 4, 21, 12, 0, 0, TimeScale::TT)
}

pub fn ceres_elements() -> OrbitalElements {
    OrbitalElements::from_semi_major_axis(
        2.769289292143484,
        0.07687465013145245,
        10.59127767086216 * RADEG,
        80.3011901917491 * RADEG,
        73.80896808746482 * RADEG,
        AnomalyAtEpoch::Mean(130.3159688200986 * RADEG),
        Epoch::from_gregorian_at_midnight(2020, 1, 1, TimeScale::TT),
    )
    .unwrap()
}

/// Component-wise comparison with a tolerance per axis.
pub fn assert_components(actual: &Vector3<f64>, expected: [f64; 3], epsilon: [f64; 3]) {
    for k in 0..3 {
        assert_abs_diff_eq!(actual[k], expected[k], epsilon = epsilon[k]);
    }
}
