use archmage::prelude::*;

use super::{swap16_tail, swap32_tail};

// ===========================================================================
// Scalar contiguous wrappers (dispatch targets for incant!)
// ===========================================================================

pub(super) fn swap16_impl_scalar(_token: ScalarToken, b: &mut [u8]) {
    swap16_tail(b);
}

pub(super) fn swap32_impl_scalar(_token: ScalarToken, b: &mut [u8]) {
    swap32_tail(b);
}
