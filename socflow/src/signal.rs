//! Bit-representable values.

use std::fmt::Debug;

use crate::*;

/// Port names and bitwidths.
///
/// A module's ports are the flattened leaves of its signals' `PortDecls`, in `transl()` order. Member names are
/// joined with `_`; a member without a name is flattened into its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortDecls {
    /// Struct of ports.
    Struct(Vec<(Option<String>, PortDecls)>),

    /// Bits.
    Bits(usize),
}

impl PortDecls {
    /// Total bit width.
    pub fn width(&self) -> usize {
        match self {
            Self::Struct(inner) => inner.iter().map(|(_, member)| member.width()).sum(),
            Self::Bits(width) => *width,
        }
    }

    /// Returns the flattened ports with their names prefixed by `prefix`.
    pub fn flatten(&self, prefix: Option<&str>) -> Vec<(Option<String>, usize)> {
        match self {
            Self::Bits(width) => vec![(prefix.map(String::from), *width)],
            Self::Struct(inner) => inner
                .iter()
                .flat_map(|(name, member)| {
                    let name = join_options("_", [prefix.map(String::from), name.clone()]);
                    member.flatten(name.as_deref())
                })
                .collect(),
        }
    }
}

/// Bit-representable values.
///
/// Unlike types whose shape is fixed at compile time, bus widths here are chosen when a component is configured, so
/// the shape of a signal is a property of the value.
pub trait Signal: 'static + Debug + Clone {
    /// Flattens the value into bits, least significant bit of the first port first.
    #[doc(hidden)]
    fn transl(&self) -> Vec<bool>;

    /// Port names and bitwidths.
    fn port_decls(&self) -> PortDecls;

    /// Signal's bit width.
    ///
    /// # Note
    ///
    /// `self.width()` and `self.transl().len()` should be equal.
    fn width(&self) -> usize { self.port_decls().width() }
}

impl Signal for () {
    fn transl(&self) -> Vec<bool> { vec![] }

    fn port_decls(&self) -> PortDecls { PortDecls::Bits(0) }
}

impl Signal for bool {
    fn transl(&self) -> Vec<bool> { vec![*self] }

    fn port_decls(&self) -> PortDecls { PortDecls::Bits(1) }
}

impl Signal for Bits {
    fn transl(&self) -> Vec<bool> { self.iter().collect() }

    fn port_decls(&self) -> PortDecls { PortDecls::Bits(Bits::width(self)) }
}

impl<V: Signal> Signal for Vec<V> {
    fn transl(&self) -> Vec<bool> { self.iter().flat_map(|v| v.transl()).collect() }

    fn port_decls(&self) -> PortDecls {
        PortDecls::Struct(self.iter().enumerate().map(|(i, v)| (Some(i.to_string()), v.port_decls())).collect())
    }
}

macro_rules! impl_signal {
    ($typ:ty) => {
        impl Signal for $typ {
            fn transl(&self) -> Vec<bool> { (0..<$typ>::BITS).map(|i| (*self >> i) & 1 != 0).collect() }

            fn port_decls(&self) -> PortDecls { PortDecls::Bits(<$typ>::BITS as usize) }
        }
    };
}

impl_signal!(u8);
impl_signal!(u16);
impl_signal!(u32);
impl_signal!(u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_bits() {
        assert_eq!(0xa5u8.transl(), vec![true, false, true, false, false, true, false, true]);
        assert_eq!(0u32.width(), 32);
    }

    #[test]
    fn flatten_names() {
        let decls = PortDecls::Struct(vec![
            (Some("addr".to_string()), PortDecls::Bits(16)),
            (None, PortDecls::Struct(vec![(Some("stb".to_string()), PortDecls::Bits(1))])),
            (Some("data".to_string()), PortDecls::Struct(vec![(None, PortDecls::Bits(8))])),
        ]);
        assert_eq!(decls.width(), 25);
        assert_eq!(decls.flatten(Some("in")), vec![
            (Some("in_addr".to_string()), 16),
            (Some("in_stb".to_string()), 1),
            (Some("in_data".to_string()), 8),
        ]);
    }

    #[test]
    fn vec_members_are_indexed() {
        let signal = vec![Bits::from_u64(4, 0xa), Bits::from_u64(2, 0b01)];
        assert_eq!(signal.width(), 6);
        assert_eq!(signal.transl(), vec![false, true, false, true, true, false]);
        assert_eq!(signal.port_decls().flatten(None), vec![(Some("0".to_string()), 4), (Some("1".to_string()), 2)]);
    }
}
