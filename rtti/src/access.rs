use core::fmt;

use rtti_core::{Attribute, AttributeBase, reflect};

/// Member visibility, as recorded by [`Accessibility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Access {
    /// Visible to the declaring type only.
    Private,
    /// Visible to the declaring type and types deriving from it.
    Protected,
    /// Visible to everyone.
    Public,
    /// Not specified.
    #[default]
    Unknown,
}

impl Access {
    /// Lowercase name of the access level.
    pub const fn name(self) -> &'static str {
        match self {
            Access::Private => "private",
            Access::Protected => "protected",
            Access::Public => "public",
            Access::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

reflect!(enum Access: u8 { Private, Protected, Public, Unknown });

/// Attribute recording the visibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Accessibility {
    base: AttributeBase,
    /// The recorded visibility.
    pub access: Access,
}

impl Accessibility {
    /// An attribute recording `access`.
    pub const fn new(access: Access) -> Self {
        Self {
            base: AttributeBase,
            access,
        }
    }
}

reflect!(class Accessibility: AttributeBase(base) as "Accessibility" {
    properties { access }
});

impl Attribute for Accessibility {}
