//! Bertsch–Pratt decomposition of the relative momentum of a pair.
//!
//! For a pair with momenta `p₁`, `p₂` we define `q = p₁ − p₂` and the total
//! momentum `P = p₁ + p₂`. The 3 components of `q` are taken in the
//! longitudinally co-moving system (LCMS), the frame boosted along the beam
//! (`z`) axis in which `P_z = 0`:
//!
//! - `Q_long`: along the beam, `γ_L (q_z − β_L q₀)` with `β_L = P_z/P₀`
//! - `Q_out`: along the transverse pair momentum, `(q_x P_x + q_y P_y)/P_T`
//! - `Q_side`: perpendicular to both, `(q_y P_x − q_x P_y)/P_T`
//!
//! The transverse components are untouched by a longitudinal boost. When
//! `P_T = 0` the out direction is undefined and we use the `x` axis.

use crate::dimension::expect_dims;
use crate::{BinnedContainer, Error};

/// Violations of `|p|² − E²` below this fraction of `E²` are attributed to
/// rounding (this matters for massless particles)
const MASS_SHELL_TOLERANCE: f64 = 1e-12;

/// How the longitudinal kinematics of a particle are specified
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LongitudinalVariable {
    PseudoRapidity,
    Rapidity,
}

/// The measured kinematics of a single particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleKinematics {
    pub pt: f64,
    pub phi: f64,
    /// pseudo-rapidity or rapidity, depending on the [`LongitudinalVariable`]
    pub longitudinal: f64,
    pub mass: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FourMomentum {
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    pub fn from_kinematics(p: &ParticleKinematics, variable: LongitudinalVariable) -> Self {
        let (px, py) = (p.pt * p.phi.cos(), p.pt * p.phi.sin());
        match variable {
            LongitudinalVariable::PseudoRapidity => {
                let pz = p.pt * p.longitudinal.sinh();
                let e = (px * px + py * py + pz * pz + p.mass * p.mass).sqrt();
                FourMomentum { e, px, py, pz }
            }
            LongitudinalVariable::Rapidity => {
                let mt = (p.pt * p.pt + p.mass * p.mass).sqrt();
                FourMomentum {
                    e: mt * p.longitudinal.cosh(),
                    px,
                    py,
                    pz: mt * p.longitudinal.sinh(),
                }
            }
        }
    }

    pub fn p2(&self) -> f64 {
        self.px * self.px + self.py * self.py + self.pz * self.pz
    }

    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Returns whether the momentum is finite and `|p| ≤ E`
    pub fn is_physical(&self) -> bool {
        let finite = [self.e, self.px, self.py, self.pz]
            .iter()
            .all(|v| v.is_finite());
        let e2 = self.e * self.e;
        finite && self.e >= 0.0 && (self.p2() - e2) <= MASS_SHELL_TOLERANCE * e2
    }
}

impl core::ops::Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: Self) -> Self {
        FourMomentum {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

impl core::ops::Sub for FourMomentum {
    type Output = FourMomentum;

    fn sub(self, rhs: Self) -> Self {
        FourMomentum {
            e: self.e - rhs.e,
            px: self.px - rhs.px,
            py: self.py - rhs.py,
            pz: self.pz - rhs.pz,
        }
    }
}

/// The LCMS components of the relative momentum of a pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Q3d {
    pub q_long: f64,
    pub q_out: f64,
    pub q_side: f64,
}

/// Identifies which momentum made [`q3d`] give up. The pair should be
/// skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unphysical {
    Particle1,
    Particle2,
    /// the summed momentum violates `|P| ≤ E` or has no longitudinal rest
    /// frame (`E² − P_z² ≤ 0`)
    Pair,
}

impl core::fmt::Display for Unphysical {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let what = match self {
            Unphysical::Particle1 => "particle 1",
            Unphysical::Particle2 => "particle 2",
            Unphysical::Pair => "the pair",
        };
        write!(f, "the momentum of {what} is unphysical")
    }
}

/// Compute `(Q_long, Q_out, Q_side)` from the kinematics of 2 particles
pub fn q3d(
    p1: &ParticleKinematics,
    p2: &ParticleKinematics,
    variable: LongitudinalVariable,
) -> Result<Q3d, Unphysical> {
    q3d_from_momenta(
        &FourMomentum::from_kinematics(p1, variable),
        &FourMomentum::from_kinematics(p2, variable),
    )
}

/// Like [`q3d`], but starting from the 4-momenta
pub fn q3d_from_momenta(p1: &FourMomentum, p2: &FourMomentum) -> Result<Q3d, Unphysical> {
    if !p1.is_physical() {
        return Err(Unphysical::Particle1);
    }
    if !p2.is_physical() {
        return Err(Unphysical::Particle2);
    }
    let total = *p1 + *p2;
    let mt2 = total.e * total.e - total.pz * total.pz;
    if !total.is_physical() || mt2 <= 0.0 {
        return Err(Unphysical::Pair);
    }
    let q = *p1 - *p2;

    let beta = total.pz / total.e;
    let gamma = total.e / mt2.sqrt();
    let q_long = gamma * (q.pz - beta * q.e);

    let pt = total.pt();
    let (q_out, q_side) = if pt > 0.0 {
        (
            (q.px * total.px + q.py * total.py) / pt,
            (q.py * total.px - q.px * total.py) / pt,
        )
    } else {
        (q.px, q.py)
    };
    Ok(Q3d {
        q_long,
        q_out,
        q_side,
    })
}

/// Fill a 3D container with axes `(Q_out, Q_side, Q_long)`. Returns whether
/// the pair fell inside the container.
pub fn fill_q3d(c: &mut BinnedContainer, q: &Q3d, weight: f64) -> Result<bool, Error> {
    expect_dims("fill_q3d", c, 3)?;
    c.fill(&[q.q_out, q.q_side, q.q_long], weight)
}
