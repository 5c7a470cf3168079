//! A small bitflags macro for the flag sets carried by members.

/// Defines a bitflags struct: a transparent newtype with associated
/// constants, `empty`/`contains`/`union`, `|` and a `Debug` listing the set
/// flag names.
macro_rules! bitflags {
    (
        $(#[$outer:meta])*
        $vis:vis struct $Name:ident : $T:ty {
            $(
                $(#[$inner:meta])*
                const $FLAG:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        $vis struct $Name($T);

        impl $Name {
            $(
                $(#[$inner])*
                pub const $FLAG: Self = Self($value);
            )*

            /// An empty set of flags.
            #[inline]
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Returns `true` if all flags in `other` are contained in `self`.
            #[inline]
            pub const fn contains(self, other: Self) -> bool {
                (self.0 & other.0) == other.0
            }

            /// Returns the union of `self` and `other`.
            #[inline]
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Returns the raw bits.
            #[inline]
            pub const fn bits(self) -> $T {
                self.0
            }
        }

        impl ::core::ops::BitOr for $Name {
            type Output = Self;

            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl ::core::fmt::Debug for $Name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let mut first = true;
                $(
                    if self.contains(Self::$FLAG) {
                        if !first {
                            f.write_str(" | ")?;
                        }
                        f.write_str(stringify!($FLAG))?;
                        first = false;
                    }
                )*
                if first {
                    f.write_str("(empty)")?;
                }
                Ok(())
            }
        }
    };
}

pub(crate) use bitflags;
