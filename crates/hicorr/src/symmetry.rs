//! Enforce the reflection symmetries that correlation functions have by
//! construction.
//!
//! Each routine partitions the bins into orbits of the symmetry group,
//! replaces every member of an orbit by the orbit average, and assigns the
//! averaged error `sqrt(Σσ²)/divisor`. Every orbit is processed once.
//! Orbits are built literally from the index reflections, so a bin that is
//! its own mirror image appears in its orbit more than once (and therefore
//! carries more weight in the average).

use crate::dimension::{expect_dims, expect_extents};
use crate::{BinnedContainer, Error};

/// average the bins at the flat indices in `orbit` and write the result
/// back to each of them
fn average_orbit(c: &mut BinnedContainer, orbit: &[usize], divisor: f64) {
    let mut total = 0.0;
    let mut err2 = 0.0;
    for &flat in orbit {
        total += c.content_at(flat);
        err2 += c.error_at(flat) * c.error_at(flat);
    }
    let (v, e) = (total / divisor, err2.sqrt() / divisor);
    for &flat in orbit {
        c.set_bin_at(flat, v, e);
    }
}

/// Symmetrize a `(Δη, Δφ)` container under `Δη → −Δη` and `Δφ → −Δφ`.
///
/// The Δη axis is assumed to be centered on 0 (bin `i` mirrors to
/// `nΔη−1−i`) and the Δφ axis to start at 0 and wrap around (bin `j`
/// mirrors to `(nΔφ−j) mod nΔφ`). Each orbit holds 4 entries; its value is
/// their sum divided by 4, or by 2 when pairs were counted once
/// (`ij_normalization`).
pub fn symmetrize_delta_eta_delta_phi(
    c: &mut BinnedContainer,
    ij_normalization: bool,
) -> Result<(), Error> {
    let extents = expect_dims("symmetrize_delta_eta_delta_phi", c, 2)?;
    let (n_eta, n_phi) = (extents[0], extents[1]);
    let divisor = if ij_normalization { 2.0 } else { 4.0 };

    let mut visited = vec![false; c.n_bins()];
    for i in 0..n_eta {
        let i_mirror = n_eta - 1 - i;
        for j in 0..n_phi {
            if visited[i * n_phi + j] {
                continue;
            }
            let j_mirror = (n_phi - j) % n_phi;
            let orbit = [
                i * n_phi + j,
                i_mirror * n_phi + j,
                i * n_phi + j_mirror,
                i_mirror * n_phi + j_mirror,
            ];
            average_orbit(c, &orbit, divisor);
            for flat in orbit {
                visited[flat] = true;
            }
        }
    }
    Ok(())
}

/// Symmetrize a square `(x₁, x₂)` container under the exchange `x₁ ↔ x₂`
pub fn symmetrize_xx(c: &mut BinnedContainer) -> Result<(), Error> {
    let n = expect_dims("symmetrize_xx", c, 2)?[0];
    expect_extents("symmetrize_xx", c, &[n, n])?;
    for i in 0..n {
        for j in (i + 1)..n {
            average_orbit(c, &[i * n + j, j * n + i], 2.0);
        }
    }
    Ok(())
}

/// Symmetrize a 3D container under reflection about the center of every
/// axis (8-bin orbits)
pub fn symmetrize_3d(c: &mut BinnedContainer) -> Result<(), Error> {
    expect_dims("symmetrize_3d", c, 3)?;
    let layout = *c.layout();
    let mut visited = vec![false; c.n_bins()];
    for flat in 0..c.n_bins() {
        if visited[flat] {
            continue;
        }
        let [i, j, k] = layout.reverse_map_idx(flat);
        let is = [i, layout.mirror(0, i)];
        let js = [j, layout.mirror(1, j)];
        let ks = [k, layout.mirror(2, k)];
        let mut orbit = [0_usize; 8];
        for (n, slot) in orbit.iter_mut().enumerate() {
            *slot = layout.map_idx3(is[n >> 2], js[(n >> 1) & 1], ks[n & 1]);
        }
        average_orbit(c, &orbit, 8.0);
        for member in orbit {
            visited[member] = true;
        }
    }
    Ok(())
}
