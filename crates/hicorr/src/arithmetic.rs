//! Bin-wise arithmetic between containers of identical shape.
//!
//! Every operation comes in 2 flavors of error propagation, selected by
//! [`ErrorMode`]. All shape checks happen before the destination is touched.

use crate::dimension::{all_same_dimensions, same_dimensions};
use crate::{BinnedContainer, Error};

/// How the errors of 2 operands are combined
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorMode {
    /// The operands are independent: (relative) errors are added in
    /// quadrature
    Uncorrelated,
    /// The operands share a random component (e.g. one is a subset of the
    /// other): the result uses `sqrt(|σa² − σb²|)`
    Correlated,
}

impl ErrorMode {
    #[inline]
    pub fn combine(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Uncorrelated => (a * a + b * b).sqrt(),
            Self::Correlated => (a * a - b * b).abs().sqrt(),
        }
    }
}

/// value & error of `a / b` for a single bin
#[inline]
fn ratio_bin(a: f64, ea: f64, b: f64, eb: f64, mode: ErrorMode) -> (f64, f64) {
    if b == 0.0 {
        return (0.0, 0.0);
    }
    if a == 0.0 {
        return (0.0, ea / b.abs());
    }
    let r = a / b;
    (r, r.abs() * mode.combine(ea / a, eb / b))
}

/// In place: `dst += coef * src`
pub fn add(
    dst: &mut BinnedContainer,
    src: &BinnedContainer,
    coef: f64,
    mode: ErrorMode,
) -> Result<(), Error> {
    same_dimensions("add", dst, src)?;
    let (content, error) = dst.bins_mut();
    for i in 0..content.len() {
        content[i] += coef * src.content_at(i);
        error[i] = mode.combine(error[i], coef * src.error_at(i));
    }
    Ok(())
}

/// `dst = ca * a + cb * b`
pub fn sum(
    dst: &mut BinnedContainer,
    a: &BinnedContainer,
    b: &BinnedContainer,
    ca: f64,
    cb: f64,
    mode: ErrorMode,
) -> Result<(), Error> {
    all_same_dimensions("sum", &[&*dst, a, b])?;
    for i in 0..dst.n_bins() {
        let v = ca * a.content_at(i) + cb * b.content_at(i);
        let e = mode.combine(ca * a.error_at(i), cb * b.error_at(i));
        dst.set_bin_at(i, v, e);
    }
    Ok(())
}

/// `dst = a - b`
pub fn difference(
    dst: &mut BinnedContainer,
    a: &BinnedContainer,
    b: &BinnedContainer,
    mode: ErrorMode,
) -> Result<(), Error> {
    sum(dst, a, b, 1.0, -1.0, mode)
}

/// In place: `dst /= src`. Bins where `src` is zero are set to `(0, 0)`
pub fn divide(
    dst: &mut BinnedContainer,
    src: &BinnedContainer,
    mode: ErrorMode,
) -> Result<(), Error> {
    same_dimensions("divide", dst, src)?;
    let (content, error) = dst.bins_mut();
    for i in 0..content.len() {
        let (v, e) = ratio_bin(content[i], error[i], src.content_at(i), src.error_at(i), mode);
        content[i] = v;
        error[i] = e;
    }
    Ok(())
}

/// `dst = a / b`. Bins where `b` is zero are set to `(0, 0)`.
///
/// Dividing a container by itself is always treated as fully correlated,
/// i.e. every non-empty bin becomes `(1, 0)`, whatever `mode` is.
pub fn ratio(
    dst: &mut BinnedContainer,
    a: &BinnedContainer,
    b: &BinnedContainer,
    mode: ErrorMode,
) -> Result<(), Error> {
    all_same_dimensions("ratio", &[&*dst, a, b])?;
    let mode = if std::ptr::eq(a, b) {
        ErrorMode::Correlated
    } else {
        mode
    };
    for i in 0..dst.n_bins() {
        let (v, e) = ratio_bin(a.content_at(i), a.error_at(i), b.content_at(i), b.error_at(i), mode);
        dst.set_bin_at(i, v, e);
    }
    Ok(())
}

/// multiply the content & error of every bin by `factor`
pub fn scale(c: &mut BinnedContainer, factor: f64) {
    let (content, error) = c.bins_mut();
    for v in content.iter_mut() {
        *v *= factor;
    }
    for e in error.iter_mut() {
        *e *= factor.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axis;

    fn hist(values: &[f64], errors: &[f64]) -> BinnedContainer {
        let mut h = BinnedContainer::histogram_1d(
            "h",
            Axis::regular("x", values.len(), 0.0, 1.0).unwrap(),
        )
        .unwrap();
        for i in 0..values.len() {
            h.set_bin_at(i, values[i], errors[i]);
        }
        h
    }

    #[test]
    fn error_modes() {
        assert_eq!(ErrorMode::Uncorrelated.combine(3.0, 4.0), 5.0);
        assert_eq!(ErrorMode::Correlated.combine(5.0, 4.0), 3.0);
        assert_eq!(ErrorMode::Correlated.combine(4.0, 5.0), 3.0);
    }

    #[test]
    fn ratio_zero_denominator() {
        let a = hist(&[2.0, 4.0, 0.0], &[1.0, 1.0, 1.0]);
        let b = hist(&[0.0, 2.0, 2.0], &[1.0, 0.0, 1.0]);
        let mut dst = a.empty_like("r");
        ratio(&mut dst, &a, &b, ErrorMode::Uncorrelated).unwrap();
        assert_eq!(dst.contents(), &[0.0, 2.0, 0.0]);
        assert_eq!(dst.error_at(0), 0.0);
        assert_eq!(dst.error_at(1), 0.5);
        assert_eq!(dst.error_at(2), 0.5);
        assert!(dst.contents().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn in_place_ops() {
        let mut a = hist(&[1.0, 2.0], &[3.0, 0.0]);
        let b = hist(&[1.0, 1.0], &[4.0, 0.0]);
        add(&mut a, &b, 2.0, ErrorMode::Uncorrelated).unwrap();
        assert_eq!(a.contents(), &[3.0, 4.0]);
        assert_eq!(a.error_at(0), (9.0_f64 + 64.0).sqrt());

        divide(&mut a, &b, ErrorMode::Uncorrelated).unwrap();
        assert_eq!(a.contents(), &[3.0, 4.0]);

        scale(&mut a, -2.0);
        assert_eq!(a.contents(), &[-6.0, -8.0]);
        assert!(a.errors().iter().all(|&e| e >= 0.0));
    }
}
