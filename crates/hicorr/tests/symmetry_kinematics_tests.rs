mod common;

use common::{empty_histogram, isclose, random_histogram, rng};
use hicorr::{
    FourMomentum, LongitudinalVariable, ParticleKinematics, Unphysical, fill_q3d, q3d,
    q3d_from_momenta, symmetrize_3d, symmetrize_delta_eta_delta_phi, symmetrize_xx,
};
use rand::distr::{Distribution, Uniform};

#[test]
fn xx_symmetric_after_symmetrization() {
    let mut rng = rng(10582441886303702641_u64);
    let mut c = random_histogram("c", &[6, 6], 0.0, 5.0, &mut rng);
    let original = c.clone();
    symmetrize_xx(&mut c).unwrap();
    for i in 0..6 {
        for j in 0..6 {
            assert_eq!(c.content(&[i, j]), c.content(&[j, i]));
            assert_eq!(c.error(&[i, j]), c.error(&[j, i]));
        }
        assert_eq!(c.content(&[i, i]), original.content(&[i, i]));
    }
    // the total is preserved
    assert!(isclose(c.integral().0, original.integral().0, 1e-13, 0.0));
}

#[test]
fn delta_eta_delta_phi_symmetric() {
    let mut rng = rng(5);
    let (n_eta, n_phi) = (5, 8);
    let mut c = random_histogram("c", &[n_eta, n_phi], 0.0, 5.0, &mut rng);
    symmetrize_delta_eta_delta_phi(&mut c, false).unwrap();
    for i in 0..n_eta {
        for j in 0..n_phi {
            let v = c.content(&[i, j]);
            assert_eq!(v, c.content(&[n_eta - 1 - i, j]));
            assert_eq!(v, c.content(&[i, (n_phi - j) % n_phi]));
        }
    }
    // symmetrizing twice changes nothing
    let once = c.clone();
    symmetrize_delta_eta_delta_phi(&mut c, false).unwrap();
    for i in 0..c.n_bins() {
        assert!(isclose(c.content_at(i), once.content_at(i), 1e-14, 0.0));
    }
    assert!(symmetrize_delta_eta_delta_phi(&mut empty_histogram("h", &[4]), false).is_err());
}

#[test]
fn three_d_symmetric() {
    let mut rng = rng(6);
    let mut c = random_histogram("c", &[4, 3, 5], 0.0, 5.0, &mut rng);
    symmetrize_3d(&mut c).unwrap();
    for i in 0..4 {
        for j in 0..3 {
            for k in 0..5 {
                let v = c.content(&[i, j, k]);
                assert_eq!(v, c.content(&[3 - i, j, k]));
                assert_eq!(v, c.content(&[i, 2 - j, k]));
                assert_eq!(v, c.content(&[i, j, 4 - k]));
            }
        }
    }
    assert!(symmetrize_3d(&mut empty_histogram("h", &[4, 4])).is_err());
}

#[test]
fn q3d_of_identical_momenta_vanishes() {
    let p = ParticleKinematics {
        pt: 0.45,
        phi: 2.0,
        longitudinal: 0.3,
        mass: 0.938,
    };
    let q = q3d(&p, &p, LongitudinalVariable::PseudoRapidity).unwrap();
    assert_eq!((q.q_long, q.q_out, q.q_side), (0.0, 0.0, 0.0));
}

#[test]
fn q3d_invariants() {
    // in the LCMS, q_out² + q_side² + q_long² − q₀'² equals −q² (a Lorentz
    // invariant), where q₀' is the boosted energy difference
    let mut rng = rng(10582441886303702641_u64);
    let pt = Uniform::new_inclusive(0.2, 2.0).unwrap();
    let phi = Uniform::new(0.0, 2.0 * std::f64::consts::PI).unwrap();
    let eta = Uniform::new_inclusive(-0.8, 0.8).unwrap();
    for _ in 0..100 {
        let mut draw = || ParticleKinematics {
            pt: pt.sample(&mut rng),
            phi: phi.sample(&mut rng),
            longitudinal: eta.sample(&mut rng),
            mass: 0.13957,
        };
        let (a, b) = (draw(), draw());
        let pa = FourMomentum::from_kinematics(&a, LongitudinalVariable::Rapidity);
        let pb = FourMomentum::from_kinematics(&b, LongitudinalVariable::Rapidity);
        let q = q3d_from_momenta(&pa, &pb).unwrap();

        let d = pa - pb;
        let total = pa + pb;
        let beta = total.pz / total.e;
        let gamma = 1.0 / (1.0 - beta * beta).sqrt();
        let q0 = gamma * (d.e - beta * d.pz);
        let lhs = q.q_out.powi(2) + q.q_side.powi(2) + q.q_long.powi(2) - q0 * q0;
        let rhs = d.p2() - d.e * d.e;
        assert!(isclose(lhs, rhs, 1e-9, 1e-12), "{lhs} vs {rhs}");
        // the transverse part is frame independent
        let qt2 = d.px * d.px + d.py * d.py;
        assert!(isclose(q.q_out.powi(2) + q.q_side.powi(2), qt2, 1e-9, 1e-12));
    }
}

#[test]
fn unphysical_pairs_are_flagged() {
    let tachyon = ParticleKinematics {
        pt: 1.0,
        phi: 0.0,
        longitudinal: 0.0,
        mass: f64::NAN,
    };
    let fine = ParticleKinematics {
        pt: 1.0,
        phi: 0.0,
        longitudinal: 0.0,
        mass: 0.1,
    };
    let variable = LongitudinalVariable::Rapidity;
    assert_eq!(q3d(&tachyon, &fine, variable), Err(Unphysical::Particle1));
    assert_eq!(q3d(&fine, &tachyon, variable), Err(Unphysical::Particle2));
}

#[test]
fn fill_q3d_histogram() {
    let p1 = FourMomentum {
        e: 2.0,
        px: 1.0,
        py: 0.25,
        pz: 0.0,
    };
    let p2 = FourMomentum { py: -0.25, ..p1 };
    let q = q3d_from_momenta(&p1, &p2).unwrap();
    let mut h = empty_histogram("q3d", &[4, 4, 4]);
    assert!(fill_q3d(&mut h, &q, 1.0).unwrap());
    // (q_out, q_side, q_long) = (0, 0.5, 0)
    assert_eq!(h.content(&[0, 0, 0]), 1.0);
    assert!(fill_q3d(&mut empty_histogram("bad", &[4]), &q, 1.0).is_err());
}
