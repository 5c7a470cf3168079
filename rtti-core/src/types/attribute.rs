use alloc::sync::Arc;

use crate::{Polymorphic, Reflect, cast};

/// Metadata attachable to a type, property or method.
///
/// Attributes form their own small class hierarchy rooted at
/// [`AttributeBase`]: an attribute type is registered as a `class` deriving
/// (directly or not) from it, embedding its base as the first field, and then
/// implements this marker trait.
///
/// ```ignore
/// #[repr(C)]
/// pub struct Tooltip {
///     base: AttributeBase,
///     pub text: &'static str,
/// }
/// reflect!(class Tooltip: AttributeBase(base) { properties { text } });
/// impl Attribute for Tooltip {}
/// ```
pub trait Attribute: Polymorphic + Send + Sync + 'static {}

/// Root of the attribute hierarchy, registered as `"Attribute"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AttributeBase;

crate::reflect!(class AttributeBase as "Attribute" {});

impl Attribute for AttributeBase {}

/// Owned attribute list of a descriptor or member.
pub type AttributeList = alloc::vec::Vec<Arc<dyn Attribute>>;

/// Builds an [`AttributeList`] from attribute values.
///
/// ```ignore
/// let attrs = attributes![Accessibility::new(Access::Public), Tooltip::new("x")];
/// ```
#[macro_export]
macro_rules! attributes {
    ($($attr:expr),* $(,)?) => {{
        let list: $crate::AttributeList = ::std::vec![
            $( ::std::sync::Arc::new($attr) as ::std::sync::Arc<dyn $crate::Attribute> ),*
        ];
        list
    }};
}

/// Anything carrying an attribute list.
pub trait HasAttributes {
    /// Attributes in registration order.
    fn attributes(&self) -> &[Arc<dyn Attribute>];

    /// First attribute that is (or derives from) `T`.
    fn attribute<T: Reflect>(&self) -> Option<&T> {
        self.attributes()
            .iter()
            .find_map(|attr| cast::<T, dyn Attribute>(Some(attr.as_ref())))
    }

    /// Whether some attribute is (or derives from) `T`.
    fn has_attribute<T: Reflect>(&self) -> bool {
        self.attribute::<T>().is_some()
    }
}
