//! # Kepler equation solvers
//!
//! Root finders for the three conic regimes and for the universal-variable form:
//!
//! | regime     | equation                 | auxiliary anomaly        |
//! |------------|--------------------------|--------------------------|
//! | elliptic   | `M = E − e sin E`        | eccentric anomaly `E`    |
//! | parabolic  | `M = D + D³/3`           | Barker variable `D = tan(ν/2)` |
//! | hyperbolic | `M = e sinh H − H`       | hyperbolic anomaly `H`   |
//! | universal  | `r₀ s₁ + σ₀ s₂ + μ s₃ = Δt` | universal anomaly `ψ` |
//!
//! Every iterative solver is a Newton–Raphson iteration kept inside a shrinking
//! bracket: a step that leaves the bracket (or is not finite) is replaced by a bisection
//! step, so convergence never depends on the quality of the starting guess.
use std::f64::consts::PI;

use tracing::trace;

use crate::constants::{Radian, DPI};
use crate::orbit_errors::OrbitError;

/// Conic regime of an orbit, selected from its eccentricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conic {
    Elliptic,
    Parabolic,
    Hyperbolic,
}

impl Conic {
    /// Classify an eccentricity; `|e − 1| ≤ parabolic_tolerance` is parabolic.
    pub fn from_eccentricity(eccentricity: f64, parabolic_tolerance: f64) -> Self {
        if (eccentricity - 1.0).abs() <= parabolic_tolerance {
            Conic::Parabolic
        } else if eccentricity < 1.0 {
            Conic::Elliptic
        } else {
            Conic::Hyperbolic
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Conic::Elliptic)
    }
}

impl std::fmt::Display for Conic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conic::Elliptic => write!(f, "elliptic"),
            Conic::Parabolic => write!(f, "parabolic"),
            Conic::Hyperbolic => write!(f, "hyperbolic"),
        }
    }
}

/// Auxiliary anomaly returned by [`solve_kepler`], one variant per conic regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anomaly {
    /// Eccentric anomaly `E` (elliptic orbits).
    Eccentric(Radian),
    /// Barker variable `D = tan(ν/2)` (parabolic orbits).
    Parabolic(f64),
    /// Hyperbolic anomaly `H` (hyperbolic orbits).
    Hyperbolic(f64),
}

impl Anomaly {
    /// Auxiliary anomaly corresponding to a true anomaly `ν`.
    ///
    /// For hyperbolic orbits `ν` must lie strictly inside the asymptotes,
    /// `|ν| < acos(−1/e)`; callers validate this beforehand.
    pub fn from_true_anomaly(conic: Conic, eccentricity: f64, true_anomaly: Radian) -> Self {
        let e = eccentricity;
        match conic {
            Conic::Elliptic => {
                let (s, c) = true_anomaly.sin_cos();
                Anomaly::Eccentric(((1.0 - e * e).sqrt() * s).atan2(e + c))
            }
            Conic::Parabolic => Anomaly::Parabolic((0.5 * true_anomaly).tan()),
            Conic::Hyperbolic => Anomaly::Hyperbolic(
                2.0 * (((e - 1.0) / (e + 1.0)).sqrt() * (0.5 * true_anomaly).tan()).atanh(),
            ),
        }
    }

    /// True anomaly `ν`, in `(−π, π]`.
    pub fn true_anomaly(&self, eccentricity: f64) -> Radian {
        let e = eccentricity;
        match *self {
            Anomaly::Eccentric(ea) => {
                let (s, c) = ea.sin_cos();
                ((1.0 - e * e).sqrt() * s).atan2(c - e)
            }
            Anomaly::Parabolic(d) => 2.0 * d.atan(),
            Anomaly::Hyperbolic(h) => {
                2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (0.5 * h).tanh()).atan()
            }
        }
    }

    /// Mean anomaly given by the regime's Kepler equation.
    pub fn mean_anomaly(&self, eccentricity: f64) -> Radian {
        let e = eccentricity;
        match *self {
            Anomaly::Eccentric(ea) => ea - e * ea.sin(),
            Anomaly::Parabolic(d) => d + d.powi(3) / 3.0,
            Anomaly::Hyperbolic(h) => e * h.sinh() - h,
        }
    }

    /// Raw value of the auxiliary anomaly.
    pub fn value(&self) -> f64 {
        match *self {
            Anomaly::Eccentric(v) | Anomaly::Parabolic(v) | Anomaly::Hyperbolic(v) => v,
        }
    }
}

/// Return the principal value of an angle in radians, in `[0, 2π)`.
pub fn principal_angle(a: f64) -> f64 {
    let r = a.rem_euclid(DPI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if r >= DPI {
        0.0
    } else {
        r
    }
}

/// Return the angle wrapped into `[−π, π)`.
pub fn wrap_pi(a: f64) -> f64 {
    principal_angle(a + PI) - PI
}

/// Return the principal difference `a − b` between two angles, in `[−π, π]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let a = principal_angle(a);
    let b = principal_angle(b);

    let mut diff = a - b;

    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }

    diff
}

/// Mean motion of a conic, in rad/day.
///
/// Arguments
/// -----------------
/// * `conic`: regime of the orbit.
/// * `mu`: gravitational parameter in AU³/day².
/// * `semi_latus_rectum`: `p` in AU.
/// * `eccentricity`: `e`.
///
/// Return
/// ----------
/// * elliptic: `√(μ/p³)·(1 − e²)^{3/2}`, i.e. `√(μ/a³)`,
/// * hyperbolic: `√(μ/p³)·(e² − 1)^{3/2}`,
/// * parabolic: `2·√(μ/p³)`, the normalisation that turns Barker's equation into `M = D + D³/3`.
pub fn mean_motion(conic: Conic, mu: f64, semi_latus_rectum: f64, eccentricity: f64) -> f64 {
    let base = (mu / semi_latus_rectum.powi(3)).sqrt();
    let e2 = eccentricity * eccentricity;
    match conic {
        Conic::Elliptic => base * (1.0 - e2).powf(1.5),
        Conic::Parabolic => 2.0 * base,
        Conic::Hyperbolic => base * (e2 - 1.0).powf(1.5),
    }
}

/// Solve the Kepler equation of the given regime for a mean anomaly.
///
/// Elliptic mean anomalies are first wrapped into `[−π, π)`, so the returned
/// eccentric anomaly lies in `[−π, π]` whatever the number of elapsed revolutions.
///
/// Errors
/// ------
/// * [`OrbitError::Convergence`] if the elliptic or hyperbolic iteration does not reach
///   `tolerance` within `max_iter` steps.
pub fn solve_kepler(
    conic: Conic,
    mean_anomaly: Radian,
    eccentricity: f64,
    tolerance: f64,
    max_iter: usize,
) -> Result<Anomaly, OrbitError> {
    match conic {
        Conic::Elliptic => {
            solve_elliptic(mean_anomaly, eccentricity, tolerance, max_iter).map(Anomaly::Eccentric)
        }
        Conic::Parabolic => Ok(Anomaly::Parabolic(solve_parabolic(mean_anomaly))),
        Conic::Hyperbolic => solve_hyperbolic(mean_anomaly, eccentricity, tolerance, max_iter)
            .map(Anomaly::Hyperbolic),
    }
}

/// Solve `E − e sin E = M` for `0 ≤ e < 1`.
///
/// The residual `f(E) = E − e sin E − M` is monotone on `[−π, π]` and changes sign
/// there once `M` has been wrapped, so the bracket is known from the start.
/// Starting guess is `M + e sin M` for moderate eccentricities and `±π` above `e = 0.8`.
/// Converged when `|f(E)| ≤ tolerance`.
pub fn solve_elliptic(
    mean_anomaly: Radian,
    eccentricity: f64,
    tolerance: f64,
    max_iter: usize,
) -> Result<Radian, OrbitError> {
    let m = wrap_pi(mean_anomaly);
    let e = eccentricity;

    let (mut lo, mut hi) = (-PI, PI);
    let mut ea = if e < 0.8 {
        m + e * m.sin()
    } else if m < 0.0 {
        -PI
    } else {
        PI
    };
    let mut residual = f64::NAN;

    for iter in 0..max_iter {
        residual = ea - e * ea.sin() - m;
        if residual.abs() <= tolerance {
            trace!(iterations = iter, "elliptic Kepler solver converged");
            return Ok(ea);
        }

        if residual > 0.0 {
            hi = ea;
        } else {
            lo = ea;
        }

        let next = ea - residual / (1.0 - e * ea.cos());
        ea = if next.is_finite() && next >= lo && next <= hi {
            next
        } else {
            0.5 * (lo + hi)
        };
    }

    Err(OrbitError::Convergence {
        solver: "elliptic Kepler",
        iterations: max_iter,
        residual,
    })
}

/// Solve `e sinh H − H = M` for `e > 1`.
///
/// The equation is solved for `|M|` inside `[asinh(|M|/e), asinh(|M|/(e − 1))]`
/// and the sign restored afterwards. The residual is convex on that bracket, so Newton
/// steps started from the upper end approach the root from above. Converged when
/// `|f(H)| ≤ tolerance · max(1, |M|)`.
pub fn solve_hyperbolic(
    mean_anomaly: f64,
    eccentricity: f64,
    tolerance: f64,
    max_iter: usize,
) -> Result<f64, OrbitError> {
    let e = eccentricity;
    let m = mean_anomaly.abs();
    let sign = mean_anomaly.signum();

    let mut lo = (m / e).asinh();
    let mut hi = (m / (e - 1.0)).asinh();
    let mut h = hi;
    let scaled_tol = tolerance * m.max(1.0);
    let mut residual = f64::NAN;

    for iter in 0..max_iter {
        residual = e * h.sinh() - h - m;
        if residual.abs() <= scaled_tol {
            trace!(iterations = iter, "hyperbolic Kepler solver converged");
            return Ok(sign * h);
        }

        if residual > 0.0 {
            hi = h;
        } else {
            lo = h;
        }

        let next = h - residual / (e * h.cosh() - 1.0);
        h = if next.is_finite() && next >= lo && next <= hi {
            next
        } else {
            0.5 * (lo + hi)
        };
    }

    Err(OrbitError::Convergence {
        solver: "hyperbolic Kepler",
        iterations: max_iter,
        residual,
    })
}

/// Solve Barker's equation `D + D³/3 = M` in closed form.
///
/// With `D = 2 sinh θ` the cubic becomes `2 sinh 3θ = 3M`, hence
/// `D = 2 sinh(asinh(3M/2) / 3)`, which stays accurate for tiny and huge `M` alike.
pub fn solve_parabolic(mean_anomaly: f64) -> f64 {
    2.0 * ((1.5 * mean_anomaly).asinh() / 3.0).sinh()
}

/// Stumpff functions `c₀(x) … c₃(x)`.
///
/// `c₀ = cos √x`, `c₁ = sin √x / √x`, `c₂ = (1 − c₀)/x`, `c₃ = (1 − c₁)/x`, with the
/// hyperbolic analogues for `x < 0`. Inside `|x| ≤ 1` the closed forms lose digits to
/// cancellation, so `c₂` and `c₃` are summed from their series and `c₀`, `c₁` recovered
/// from `c₀ = 1 − x c₂`, `c₁ = 1 − x c₃`.
pub fn stumpff(x: f64) -> [f64; 4] {
    const NTERMS: usize = 20;

    if x > 1.0 {
        let z = x.sqrt();
        let c0 = z.cos();
        let c1 = z.sin() / z;
        [c0, c1, (1.0 - c0) / x, (1.0 - c1) / x]
    } else if x < -1.0 {
        let z = (-x).sqrt();
        let c0 = z.cosh();
        let c1 = z.sinh() / z;
        [c0, c1, (1.0 - c0) / x, (1.0 - c1) / x]
    } else {
        let mut term2 = 0.5;
        let mut term3 = 1.0 / 6.0;
        let mut c2 = term2;
        let mut c3 = term3;
        for k in 1..=NTERMS {
            let k = k as f64;
            term2 *= -x / ((2.0 * k + 1.0) * (2.0 * k + 2.0));
            term3 *= -x / ((2.0 * k + 2.0) * (2.0 * k + 3.0));
            c2 += term2;
            c3 += term3;
            if term2.abs() < f64::EPSILON * c2.abs() && term3.abs() < f64::EPSILON * c3.abs() {
                break;
            }
        }
        [1.0 - x * c2, 1.0 - x * c3, c2, c3]
    }
}

/// Universal functions `s_k(ψ, α) = ψᵏ c_k(−α ψ²)`, `k = 0..3`.
///
/// `α = v² − 2μ/r` is twice the specific orbital energy (negative on ellipses).
pub fn universal_functions(psi: f64, alpha: f64) -> [f64; 4] {
    let c = stumpff(-alpha * psi * psi);
    let psi2 = psi * psi;
    [c[0], psi * c[1], psi2 * c[2], psi2 * psi * c[3]]
}

/// Root of the universal Kepler equation with its universal functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniversalSolution {
    /// Universal anomaly `ψ`.
    pub psi: f64,
    /// `[s₀, s₁, s₂, s₃]` evaluated at `ψ`.
    pub s: [f64; 4],
}

/// Solve the universal Kepler equation `r₀ s₁ + σ₀ s₂ + μ s₃ = Δt` for `ψ`.
///
/// Arguments
/// -----------------
/// * `dt`: propagation interval in days (any sign).
/// * `r0`: distance at the start of the interval, in AU.
/// * `sig0`: `r₀ · v₀`, in AU²/day.
/// * `mu`: gravitational parameter in AU³/day².
/// * `alpha`: `v₀² − 2μ/r₀`, in AU²/day².
/// * `max_iter`: maximum number of Newton/bisection steps after bracketing.
///
/// Return
/// ----------
/// * The root `ψ` and `[s₀..s₃]` at that root. The left-hand side is strictly increasing
///   in `ψ` (its derivative is the distance `r`), so the root is unique. It is bracketed by
///   halving or doubling `Δt/r₀`, then refined until `|Δψ| < 100 ε` or `|Δψ| < 1000 ε |ψ|`.
///
/// Errors
/// ----------
/// * [`OrbitError::TimeBeyondRange`] if `Δt` cannot be bracketed with finite universal
///   functions or the converged functions overflow.
/// * [`OrbitError::Convergence`] if `max_iter` steps do not reach the tolerance.
pub fn solve_universal(
    dt: f64,
    r0: f64,
    sig0: f64,
    mu: f64,
    alpha: f64,
    max_iter: usize,
) -> Result<UniversalSolution, OrbitError> {
    const MAX_DOUBLING: usize = 2048;
    let contr = 100.0 * f64::EPSILON;

    if !dt.is_finite() {
        return Err(OrbitError::TimeBeyondRange(dt));
    }
    if dt == 0.0 {
        return Ok(UniversalSolution {
            psi: 0.0,
            s: universal_functions(0.0, alpha),
        });
    }

    let kepuni = |psi: f64| {
        let s = universal_functions(psi, alpha);
        (r0 * s[1] + sig0 * s[2] + mu * s[3] - dt, s)
    };

    let crossed =
        |fun: f64| !fun.is_finite() || (dt > 0.0 && fun >= 0.0) || (dt < 0.0 && fun <= 0.0);

    // Bracket the root between `previous` and `bound`, a factor 2 apart. The guess
    // dt/r0 is doubled while it falls short of the root and halved while it
    // overshoots it (F(0) = −Δt never overshoots).
    let mut previous = 0.0;
    let mut bound = dt / r0;
    let mut bracketed = false;
    if crossed(kepuni(bound).0) {
        for _ in 0..MAX_DOUBLING {
            let inner = 0.5 * bound;
            if !crossed(kepuni(inner).0) {
                previous = inner;
                bracketed = true;
                break;
            }
            bound = inner;
        }
    } else {
        for _ in 0..MAX_DOUBLING {
            previous = bound;
            bound *= 2.0;
            if crossed(kepuni(bound).0) {
                bracketed = true;
                break;
            }
        }
    }
    if !bracketed {
        return Err(OrbitError::TimeBeyondRange(dt));
    }

    let (mut lo, mut hi) = if dt > 0.0 {
        (previous, bound)
    } else {
        (bound, previous)
    };
    let mut psi = 0.5 * (lo + hi);
    let mut dpsi = f64::NAN;

    for iter in 0..max_iter {
        let (fun, s) = kepuni(psi);
        if fun == 0.0 {
            return Ok(UniversalSolution { psi, s });
        }

        // Overflowed functions only happen far beyond the root
        if !fun.is_finite() {
            if psi > 0.0 {
                hi = psi;
            } else {
                lo = psi;
            }
        } else if fun > 0.0 {
            hi = psi;
        } else {
            lo = psi;
        }

        let funp = r0 * s[0] + sig0 * s[1] + mu * s[2];
        let newton = psi - fun / funp;
        let next = if newton.is_finite() && newton >= lo && newton <= hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        dpsi = next - psi;
        psi = next;

        if dpsi.abs() < contr || dpsi.abs() < contr * 10.0 * psi.abs() {
            let (fun, s) = kepuni(psi);
            // a bracket closing on the overflow threshold instead of a root
            if s.iter().any(|v| !v.is_finite()) || fun.abs() > 1e-6 * dt.abs().max(r0) {
                return Err(OrbitError::TimeBeyondRange(dt));
            }
            trace!(iterations = iter, psi, "universal Kepler solver converged");
            return Ok(UniversalSolution { psi, s });
        }
    }

    Err(OrbitError::Convergence {
        solver: "universal Kepler",
        iterations: max_iter,
        residual: dpsi,
    })
}
