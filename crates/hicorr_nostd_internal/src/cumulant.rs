//! Factorial cumulants from factorial moments
//!
//! The factorial cumulant of order `n` (for particle species/bins labelled
//! `1..n`) is obtained from the factorial moments through the usual
//! inclusion–exclusion expansion over the set partitions of `{1, .., n}`:
//! ```text
//! Fₙ = Σ_π (−1)^(|π|−1) (|π|−1)! Π_{B∈π} f_B
//! ```
//! where `f_B` is the moment of the members of block `B`. For example,
//! `F₂ = f₁₂ − f₁f₂` and
//! `F₃ = f₁₂₃ − f₁₂f₃ − f₁₃f₂ − f₂₃f₁ + 2f₁f₂f₃`.
//!
//! Moments are addressed by a bitmask over the particle labels (bit 0 is
//! particle 1). We support up to 4 particles.

/// Below this value a single-particle moment is treated as empty
pub const CUMULANT_FLOOR: f64 = 1e-20;

/// The maximum supported order
pub const MAX_ORDER: usize = 4;

/// Holds the factorial moments of every non-empty subset of up to
/// [`MAX_ORDER`] particles
#[derive(Clone, Debug)]
pub struct FactorialMoments {
    order: usize,
    values: [f64; 1 << MAX_ORDER],
}

impl FactorialMoments {
    pub fn new(order: usize) -> Result<Self, &'static str> {
        if order == 0 || order > MAX_ORDER {
            Err("the order of factorial moments must lie in [1, 4]")
        } else {
            Ok(Self {
                order,
                values: [0.0; 1 << MAX_ORDER],
            })
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// mask with a bit set for every particle
    fn full_mask(&self) -> u8 {
        ((1_u16 << self.order) - 1) as u8
    }

    /// store the moment of the particles in `mask`
    ///
    /// # Panics
    /// if `mask` is empty or names particles beyond the order
    pub fn set(&mut self, mask: u8, value: f64) {
        assert!(mask != 0 && (mask & !self.full_mask()) == 0, "invalid mask");
        self.values[mask as usize] = value;
    }

    /// store the moment of the particles (1-based labels)
    pub fn set_members(&mut self, members: &[usize], value: f64) {
        let mut mask = 0_u8;
        for &m in members {
            assert!(m >= 1 && m <= self.order, "invalid particle label");
            mask |= 1 << (m - 1);
        }
        self.set(mask, value);
    }

    pub fn get(&self, mask: u8) -> f64 {
        self.values[mask as usize]
    }

    /// the single-particle moment of particle `label` (1-based)
    pub fn single(&self, label: usize) -> f64 {
        self.values[1 << (label - 1)]
    }

    /// product of the single-particle moments
    pub fn single_product(&self) -> f64 {
        (1..=self.order).map(|l| self.single(l)).product()
    }

    /// returns whether any single-particle moment falls below
    /// [`CUMULANT_FLOOR`]
    pub fn below_floor(&self) -> bool {
        (1..=self.order).any(|l| self.single(l) < CUMULANT_FLOOR)
    }

    /// the factorial cumulant of all particles
    pub fn cumulant(&self) -> f64 {
        let mut total = 0.0;
        self.accumulate_partitions(self.full_mask(), 0, 1.0, &mut total);
        total
    }

    /// recursively enumerates the set partitions of `remaining`.
    ///
    /// To enumerate each partition exactly once, the block that is split off
    /// always contains the lowest remaining particle
    fn accumulate_partitions(&self, remaining: u8, n_blocks: usize, product: f64, total: &mut f64) {
        if remaining == 0 {
            *total += partition_coefficient(n_blocks) * product;
            return;
        }
        let lowest = remaining & remaining.wrapping_neg();
        let rest = remaining & !lowest;
        // iterate over every subset of `rest` (including the empty set)
        let mut subset = rest;
        loop {
            let block = subset | lowest;
            self.accumulate_partitions(
                remaining & !block,
                n_blocks + 1,
                product * self.values[block as usize],
                total,
            );
            if subset == 0 {
                break;
            }
            subset = (subset - 1) & rest;
        }
    }
}

/// `(−1)^(k−1) (k−1)!` for a partition with `k` blocks
fn partition_coefficient(n_blocks: usize) -> f64 {
    match n_blocks {
        1 => 1.0,
        2 => -1.0,
        3 => 2.0,
        4 => -6.0,
        _ => unreachable!("at most 4 blocks are supported"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_bounds() {
        assert!(FactorialMoments::new(0).is_err());
        assert!(FactorialMoments::new(5).is_err());
        assert!(FactorialMoments::new(4).is_ok());
    }

    #[test]
    fn second_order() {
        let mut m = FactorialMoments::new(2).unwrap();
        m.set_members(&[1], 2.0);
        m.set_members(&[2], 2.0);
        m.set_members(&[1, 2], 4.5);
        assert_eq!(m.cumulant(), 0.5);
        assert_eq!(m.cumulant() / m.single_product(), 0.125);
    }

    #[test]
    fn third_order_matches_explicit_expansion() {
        let (f1, f2, f3) = (1.5, 2.5, 3.0);
        let (f12, f13, f23) = (4.0, 5.0, 8.0);
        let f123 = 13.0;
        let mut m = FactorialMoments::new(3).unwrap();
        m.set_members(&[1], f1);
        m.set_members(&[2], f2);
        m.set_members(&[3], f3);
        m.set_members(&[1, 2], f12);
        m.set_members(&[1, 3], f13);
        m.set_members(&[2, 3], f23);
        m.set_members(&[1, 2, 3], f123);
        let expected = f123 - f12 * f3 - f13 * f2 - f23 * f1 + 2.0 * f1 * f2 * f3;
        assert!((m.cumulant() - expected).abs() < 1e-12);
    }

    #[test]
    fn fourth_order_vanishes_for_independent_particles() {
        // if every moment factorizes, all connected correlations vanish
        let singles = [1.2, 0.7, 2.0, 3.1];
        let mut m = FactorialMoments::new(4).unwrap();
        for mask in 1_u8..16 {
            let mut value = 1.0;
            for (bit, s) in singles.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    value *= s;
                }
            }
            m.set(mask, value);
        }
        assert!(m.cumulant().abs() < 1e-12);
        assert!(!m.below_floor());
    }

    #[test]
    fn floor() {
        let mut m = FactorialMoments::new(2).unwrap();
        m.set_members(&[1], 1.0);
        m.set_members(&[2], 1e-21);
        assert!(m.below_floor());
    }
}
