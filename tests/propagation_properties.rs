mod common;

use std::thread;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use common::ceres_elements;
use hifitime::{Epoch, TimeScale, Unit};
use itertools::iproduct;
use kepler_orbit::config::KeplerConfig;
use kepler_orbit::constants::{GM_SUN_PITJEVA_2005 as MU, RADEG};
use kepler_orbit::kepler::Conic;
use kepler_orbit::kepler_orbit::KeplerOrbit;
use kepler_orbit::orbit_type::{AnomalyAtEpoch, OrbitalElements};
use kepler_orbit::propagator::PropagationMethod;

const INTERVALS: [f64; 5] = [-1000.0, -10.5, 3.25, 250.0, 5000.0];

fn epoch() -> Epoch {
    Epoch::from_gregorian_at_midnight(2020, 1, 1, TimeScale::TT)
}

fn elements(p: f64, e: f64, i: f64, node: f64, peri: f64, anomaly: AnomalyAtEpoch) -> OrbitalElements {
    OrbitalElements {
        reference_epoch: epoch(),
        semi_latus_rectum: p,
        eccentricity: e,
        inclination: i * RADEG,
        ascending_node_longitude: node * RADEG,
        periapsis_argument: peri * RADEG,
        anomaly,
    }
}

/// One orbit per regime, plus a very eccentric ellipse.
fn sample_elements() -> Vec<OrbitalElements> {
    vec![
        ceres_elements(),
        elements(1.1318652519349035, 0.9679221169240834, 162.2, 59.1, 112.2, AnomalyAtEpoch::True(0.0)),
        elements(2.0, 1.0, 30.0, 40.0, 60.0, AnomalyAtEpoch::True(-45.0 * RADEG)),
        elements(3.0, 1.8, 120.0, 200.0, 10.0, AnomalyAtEpoch::Mean(-2.0)),
    ]
}

fn orbit_with(el: &OrbitalElements, method: PropagationMethod) -> KeplerOrbit {
    let config = KeplerConfig::builder().propagation(method).build().unwrap();
    KeplerOrbit::from_elements(el, MU, config).unwrap()
}

#[test]
fn elliptic_motion_is_periodic() {
    for method in [PropagationMethod::MeanAnomaly, PropagationMethod::UniversalVariable] {
        let orbit = orbit_with(&ceres_elements(), method);
        let period = orbit.period().unwrap();
        let start = orbit.propagate(epoch()).unwrap();

        for k in -2..=2 {
            let s = orbit.propagate(epoch() + Unit::Day * (k as f64 * period)).unwrap();
            assert_abs_diff_eq!(s.position, start.position, epsilon = 1e-10);
            assert_abs_diff_eq!(s.velocity, start.velocity, epsilon = 1e-12);
        }
    }
}

#[test]
fn energy_and_angular_momentum_are_conserved() {
    for (el, dt) in iproduct!(sample_elements(), INTERVALS) {
        let orbit = orbit_with(&el, PropagationMethod::MeanAnomaly);
        let reference = orbit.reference_state();
        let energy = reference.specific_energy(MU);
        let momentum = reference.angular_momentum().norm();

        let s = orbit.propagate(epoch() + Unit::Day * dt).unwrap();
        assert_relative_eq!(s.specific_energy(MU), energy, epsilon = 1e-13, max_relative = 1e-9);
        assert_relative_eq!(s.angular_momentum().norm(), momentum, max_relative = 1e-10);
    }
}

#[test]
fn circular_orbit_keeps_its_radius() {
    let el = elements(1.5, 0.0, 17.0, 57.0, 0.0, AnomalyAtEpoch::Mean(0.5));
    let orbit = orbit_with(&el, PropagationMethod::MeanAnomaly);
    let speed = (MU / 1.5).sqrt();

    for dt in INTERVALS {
        let s = orbit.propagate(epoch() + Unit::Day * dt).unwrap();
        assert_abs_diff_eq!(s.radius(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(s.speed(), speed, max_relative = 1e-12);
        assert_abs_diff_eq!(s.position.dot(&s.velocity), 0.0, epsilon = 1e-14);
    }
}

#[test]
fn both_methods_agree() {
    for (el, dt) in iproduct!(sample_elements(), INTERVALS) {
        let by_mean = orbit_with(&el, PropagationMethod::MeanAnomaly);
        let by_universal = orbit_with(&el, PropagationMethod::UniversalVariable);
        let target = epoch() + Unit::Day * dt;

        let a = by_mean.propagate(target).unwrap();
        let b = by_universal.propagate(target).unwrap();
        assert_relative_eq!(a.position, b.position, epsilon = 1e-9, max_relative = 1e-8);
        assert_relative_eq!(a.velocity, b.velocity, epsilon = 1e-11, max_relative = 1e-8);
    }
}

#[test]
fn near_parabolic_orbits_keep_their_invariants() {
    let eccentricities = [1.0 - 1e-6, 1.0 + 1e-6, 1.0 - 1e-8, 1.0 + 1e-8, 1.0 - 1e-10, 1.0 + 1e-10];
    for (e, dt) in iproduct!(eccentricities, [-300.0, 10.0, 100.0, 500.0]) {
        let el = elements(1.0, e, 23.0, 17.0, 40.0, AnomalyAtEpoch::True(0.3));
        let by_mean = orbit_with(&el, PropagationMethod::MeanAnomaly);
        let by_universal = orbit_with(&el, PropagationMethod::UniversalVariable);
        assert_ne!(by_mean.conic(), Conic::Parabolic);

        let reference = by_mean.reference_state();
        let energy = reference.specific_energy(MU);
        let momentum = reference.angular_momentum().norm();

        let target = epoch() + Unit::Day * dt;
        let a = by_mean.propagate(target).unwrap();
        let b = by_universal.propagate(target).unwrap();

        // the energy is close to zero, so it is compared against the scale μ/p
        assert_abs_diff_eq!(a.specific_energy(MU), energy, epsilon = 1e-9 * MU);
        assert_relative_eq!(a.angular_momentum().norm(), momentum, max_relative = 1e-9);
        assert_relative_eq!(a.position, b.position, epsilon = 1e-12, max_relative = 1e-9);
        assert_relative_eq!(a.velocity, b.velocity, epsilon = 1e-14, max_relative = 1e-9);
    }
}

#[test]
fn propagation_is_reversible() {
    for el in sample_elements() {
        let orbit = orbit_with(&el, PropagationMethod::MeanAnomaly);
        let later = orbit.propagate(epoch() + Unit::Day * 250.0).unwrap();

        let restarted = KeplerOrbit::from_state_vector(&later, MU, KeplerConfig::default()).unwrap();
        assert_eq!(restarted.conic(), orbit.conic());

        let back = restarted.propagate(epoch()).unwrap();
        let start = orbit.propagate(epoch()).unwrap();
        assert_relative_eq!(back.position, start.position, epsilon = 1e-10, max_relative = 1e-9);
        assert_relative_eq!(back.velocity, start.velocity, epsilon = 1e-12, max_relative = 1e-9);
    }
}

#[test]
fn orbit_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<KeplerOrbit>();

    let orbit = orbit_with(&ceres_elements(), PropagationMethod::MeanAnomaly);
    assert_eq!(orbit.conic(), Conic::Elliptic);
    let serial: Vec<_> = INTERVALS
        .iter()
        .map(|dt| orbit.propagate(epoch() + Unit::Day * *dt).unwrap())
        .collect();

    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = INTERVALS
            .iter()
            .map(|dt| {
                let orbit = &orbit;
                scope.spawn(move || orbit.propagate(epoch() + Unit::Day * *dt).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(serial, parallel);
}
