//! Shape checks that run before any cross-container operation.
//!
//! Every operation that combines containers calls into this module before it
//! writes anything. That way, a mismatch aborts the operation while leaving
//! every operand untouched.

use crate::{BinnedContainer, Error};

/// Check that `a` and `b` have the same dimensionality and the same number
/// of bins along each axis
pub fn same_dimensions(
    operation: &'static str,
    a: &BinnedContainer,
    b: &BinnedContainer,
) -> Result<(), Error> {
    if a.same_shape(b) {
        Ok(())
    } else {
        Err(Error::dimension_mismatch(
            operation,
            a.axis_extents(),
            b.axis_extents(),
        ))
    }
}

/// Check that every container shares the shape of the first one
pub fn all_same_dimensions(
    operation: &'static str,
    containers: &[&BinnedContainer],
) -> Result<(), Error> {
    if let Some((first, rest)) = containers.split_first() {
        for other in rest {
            same_dimensions(operation, first, other)?;
        }
    }
    Ok(())
}

/// Check that `c` has exactly the per-axis bin counts given by `expected`
pub fn expect_extents(
    operation: &'static str,
    c: &BinnedContainer,
    expected: &[usize],
) -> Result<(), Error> {
    if c.axis_extents() == expected {
        Ok(())
    } else {
        Err(Error::dimension_mismatch(
            operation,
            c.axis_extents(),
            expected,
        ))
    }
}

/// Check that `c` has the given dimensionality, returning its extents
pub fn expect_dims<'a>(
    operation: &'static str,
    c: &'a BinnedContainer,
    n_dims: usize,
) -> Result<&'a [usize], Error> {
    if c.dims() == n_dims {
        Ok(c.axis_extents())
    } else {
        // report a placeholder shape with the expected dimensionality
        Err(Error::dimension_mismatch(
            operation,
            c.axis_extents(),
            &vec![0; n_dims],
        ))
    }
}
