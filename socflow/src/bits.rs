//! Arbitrary-width bit vectors.

use std::fmt;

use itertools::Itertools;

/// Bit vector, least significant bit first.
///
/// Slicing never fails: reads beyond the width return zero and writes beyond the width are dropped, the way a
/// hardware part-select onto a narrower signal truncates.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bits {
    inner: Vec<bool>,
}

impl Bits {
    /// Creates bits from booleans, least significant bit first.
    pub fn new(inner: Vec<bool>) -> Self { Self { inner } }

    /// Creates zero bits of the given width.
    pub fn zero(width: usize) -> Self { Self { inner: vec![false; width] } }

    /// Creates bits of the given width from an integer. Bits of `value` above `width` are dropped.
    pub fn from_u64(width: usize, value: u64) -> Self {
        Self { inner: (0..width).map(|i| i < 64 && (value >> i) & 1 != 0).collect() }
    }

    /// Bit width.
    pub fn width(&self) -> usize { self.inner.len() }

    /// Returns the bit at `index`, or `false` if it is out of range.
    pub fn get(&self, index: usize) -> bool { self.inner.get(index).copied().unwrap_or(false) }

    /// Returns the lower 64 bits as an integer.
    pub fn to_u64(&self) -> u64 {
        self.inner.iter().take(64).enumerate().fold(0, |acc, (i, bit)| acc | (u64::from(*bit) << i))
    }

    /// Returns `width` bits starting from `offset`.
    pub fn clip(&self, offset: usize, width: usize) -> Self {
        Self { inner: (offset..offset + width).map(|i| self.get(i)).collect() }
    }

    /// Overwrites the bits starting from `offset` with `value`.
    pub fn set_slice(&mut self, offset: usize, value: &Bits) {
        for (i, bit) in value.inner.iter().enumerate() {
            if let Some(slot) = self.inner.get_mut(offset + i) {
                *slot = *bit;
            }
        }
    }

    /// Zero-extends or truncates to `width` bits.
    pub fn resize(&self, width: usize) -> Self { self.clip(0, width) }

    /// Returns whether every bit is zero.
    pub fn is_zero(&self) -> bool { self.inner.iter().all(|bit| !bit) }

    /// Iterates over the bits, least significant bit first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ { self.inner.iter().copied() }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b{}", self.width(), self.inner.iter().rev().map(|bit| if *bit { '1' } else { '0' }).join(""))
    }
}

impl fmt::LowerHex for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self
            .inner
            .chunks(4)
            .rev()
            .map(|nibble| {
                let value = nibble.iter().enumerate().fold(0u32, |acc, (i, bit)| acc | (u32::from(*bit) << i));
                char::from_digit(value, 16).unwrap_or('?')
            })
            .join("");
        write!(f, "{}'h{}", self.width(), digits)
    }
}

impl From<bool> for Bits {
    fn from(value: bool) -> Self { Self { inner: vec![value] } }
}

impl FromIterator<bool> for Bits {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self { Self { inner: iter.into_iter().collect() } }
}
