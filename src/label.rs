//! Label integers for the ordered list, and the tag-range parameters derived
//! from them.

use std::fmt::Debug;

use num_traits::{PrimInt, Unsigned, WrappingMul};

/// Simple empty helper trait naming all the properties needed of a label
/// integer. Types with a larger range relabel less often and raise the
/// list's `max_size`.
pub trait Label: PrimInt + Unsigned + WrappingMul + Debug {}
impl<L: PrimInt + Unsigned + WrappingMul + Debug> Label for L {}

#[inline]
pub(crate) fn two<L: Label>() -> L {
    L::one() + L::one()
}

/// Half the label type's range. Upper labels live in `[0, M-1]`.
#[inline]
pub(crate) fn m<L: Label>() -> L {
    L::max_value() / two::<L>()
}

/// `⌊log2 M⌋` - the length of a freshly relabelled sublist.
#[inline]
pub(crate) fn log_m<L: Label>() -> u32 {
    let bits = std::mem::size_of::<L>() as u32 * 8;
    bits - 1 - m::<L>().leading_zeros()
}

/// First label handed out when a sublist is rebuilt.
#[inline]
pub(crate) fn m_start<L: Label>() -> L {
    m::<L>() / two::<L>()
}

/// Gap between consecutive labels in a rebuilt sublist.
#[inline]
pub(crate) fn m_step<L: Label>() -> L {
    m_start::<L>() / L::from(log_m::<L>()).unwrap()
}

/// Reduce a count into the label type the way C-style unsigned arithmetic
/// would (modulo the type's range). The density scan squares its window
/// size, which overflows small label types; order stays correct either way,
/// the scan just terminates earlier.
#[inline]
pub(crate) fn from_wrapped<L: Label>(n: usize) -> L {
    let mask = L::max_value().to_usize().unwrap_or(usize::MAX);
    L::from(n & mask).unwrap()
}
