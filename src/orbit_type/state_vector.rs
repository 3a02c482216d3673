use std::fmt;

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::constants::GravitationalParameter;
use crate::ref_system::{rotation_between, RefFrame};

/// Cartesian state of a body: position in AU, velocity in AU/day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub epoch: Epoch,
    pub frame: RefFrame,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, epoch: Epoch, frame: RefFrame) -> Self {
        StateVector {
            position,
            velocity,
            epoch,
            frame,
        }
    }

    /// Same state expressed in `frame`; a no-op when the frames already agree.
    pub fn in_frame(&self, frame: RefFrame) -> StateVector {
        if frame == self.frame {
            return *self;
        }
        let rot = rotation_between(self.frame, frame);
        StateVector {
            position: rot * self.position,
            velocity: rot * self.velocity,
            epoch: self.epoch,
            frame,
        }
    }

    /// Distance from the central body.
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Specific angular momentum `r × v`, in AU²/day.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Specific orbital energy `v²/2 − μ/r`, in AU²/day².
    pub fn specific_energy(&self, mu: GravitationalParameter) -> f64 {
        0.5 * self.velocity.norm_squared() - mu / self.radius()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State vector @ {} ({})", self.epoch, self.frame)?;
        writeln!(
            f,
            "  r = [{:+.12e}, {:+.12e}, {:+.12e}] AU",
            self.position.x, self.position.y, self.position.z
        )?;
        writeln!(
            f,
            "  v = [{:+.12e}, {:+.12e}, {:+.12e}] AU/day",
            self.velocity.x, self.velocity.y, self.velocity.z
        )
    }
}
