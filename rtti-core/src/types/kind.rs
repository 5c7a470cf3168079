use core::fmt;

/// Coarse category of a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    /// The unit type `()`, standing in for "returns nothing".
    Void,
    /// A polymorphic type taking part in a parent chain.
    Class,
    /// A plain value type.
    Struct,
    /// A primitive or opaque type described only by its layout.
    Pod,
    /// A fieldless enum with named discriminants.
    Enum,
    /// One instantiation of a generic type.
    Template,
    /// A type registered without saying what it is.
    Unknown,
    /// Placeholder handed out while the real descriptor is being built.
    Forward,
}

impl Kind {
    /// Lowercase name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Void => "void",
            Kind::Class => "class",
            Kind::Struct => "struct",
            Kind::Pod => "pod",
            Kind::Enum => "enum",
            Kind::Template => "template",
            Kind::Unknown => "unknown",
            Kind::Forward => "forward",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
