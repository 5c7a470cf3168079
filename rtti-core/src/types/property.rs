use alloc::sync::Arc;
use core::fmt;

use crate::{
    Attribute, AttributeList, Declaration, Declare, HasAttributes, PtrConst, PtrMut, Reflect,
    RttiError, StableId, Type, Variable, fatal, hash_name, is_a,
};

/// A described, offset-addressable data member.
pub struct Property {
    variable: Variable,
    offset: usize,
    owner: fn() -> &'static Type,
    id: StableId,
    attributes: AttributeList,
}

impl Property {
    /// A property named `name` at `offset` bytes into `owner`'s layout.
    ///
    /// # Safety
    ///
    /// `owner` must describe a type holding, at `offset`, a member of exactly
    /// the type `declaration` describes, with its indirection and constness.
    /// The checked accessors read and write through that offset.
    pub unsafe fn new(
        name: &'static str,
        offset: usize,
        declaration: Declaration,
        owner: fn() -> &'static Type,
    ) -> Self {
        Self {
            variable: Variable::new(name, declaration),
            offset,
            owner,
            id: hash_name(name),
            attributes: AttributeList::new(),
        }
    }

    /// Attaches attributes.
    pub fn with_attributes(mut self, attributes: AttributeList) -> Self {
        self.attributes = attributes;
        self
    }

    /// Name of the member.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.variable.name()
    }

    /// Stable id, the hash of the name.
    #[inline]
    pub fn id(&self) -> StableId {
        self.id
    }

    /// Name and declaration.
    #[inline]
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// How the member is declared.
    #[inline]
    pub fn declaration(&self) -> &Declaration {
        self.variable.declaration()
    }

    /// Byte offset within the owning type.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The type declaring this property.
    #[inline]
    pub fn owner(&self) -> &'static Type {
        (self.owner)()
    }

    /// Address of the member inside `object`.
    ///
    /// # Safety
    /// `object` must point to a live instance of the owning type (or of a type
    /// embedding it at offset 0).
    #[inline]
    pub unsafe fn field_ptr(&self, object: PtrConst) -> PtrConst {
        unsafe { object.field(self.offset) }
    }

    /// Mutable address of the member inside `object`.
    ///
    /// # Safety
    /// Same as [`Property::field_ptr`], plus exclusive access.
    #[inline]
    pub unsafe fn field_ptr_mut(&self, object: PtrMut) -> PtrMut {
        unsafe { object.field(self.offset) }
    }

    fn check_object<O: Reflect>(&self) -> Result<(), RttiError> {
        let actual = O::type_of();
        if !actual.describes::<O>() {
            return Err(RttiError::Foreign {
                ty: actual,
                rust: core::any::type_name::<O>(),
            });
        }
        let expected = self.owner();
        if is_a(actual, expected) {
            Ok(())
        } else {
            Err(RttiError::NotA { expected, actual })
        }
    }

    fn mismatch(&self, provided: Declaration) -> RttiError {
        RttiError::PropertyType {
            property: self.name(),
            declared: *self.declaration(),
            provided,
        }
    }

    /// Stores `value` into the member, dropping the previous value.
    ///
    /// Pointer members accept pointers to any descendant of their declared
    /// pointee.
    pub fn try_set<O: Reflect, V: Declare + 'static>(
        &self,
        object: &mut O,
        value: V,
    ) -> Result<(), RttiError> {
        self.check_object::<O>()?;
        if !self.declaration().accepts(&V::DECLARATION) {
            return Err(self.mismatch(V::DECLARATION));
        }
        crate::trace!("set {}::{}", self.owner().name(), self.name());
        // SAFETY: the object is (derived from) the owner, and the slot holds
        // either a `V` or a thin pointer with the same representation.
        unsafe {
            let field = self.field_ptr_mut(PtrMut::from_mut(object));
            *field.as_mut::<V>() = value;
        }
        Ok(())
    }

    /// Stores `value` into the member, panicking on a type mismatch.
    #[track_caller]
    pub fn set<O: Reflect, V: Declare + 'static>(&self, object: &mut O, value: V) {
        if let Err(err) = self.try_set(object, value) {
            fatal(err)
        }
    }

    /// Reads a copy of the member.
    ///
    /// Pointer members can be read as pointers to any ancestor of their
    /// declared pointee.
    pub fn try_get<O: Reflect, V: Declare + Clone>(&self, object: &O) -> Result<V, RttiError> {
        self.check_object::<O>()?;
        if !self.declaration().converts_to(&V::DECLARATION) {
            return Err(self.mismatch(V::DECLARATION));
        }
        // SAFETY: see `try_set`.
        Ok(unsafe {
            self.field_ptr(PtrConst::from_ref(object))
                .get::<V>()
                .clone()
        })
    }

    /// Reads a copy of the member, panicking on a type mismatch.
    #[track_caller]
    pub fn get<O: Reflect, V: Declare + Clone>(&self, object: &O) -> V {
        self.try_get(object).unwrap_or_else(|err| fatal(err))
    }

    /// Borrows a by-value member.
    pub fn try_get_ref<'a, O: Reflect, V: Reflect + Declare>(
        &self,
        object: &'a O,
    ) -> Result<&'a V, RttiError> {
        self.check_object::<O>()?;
        let wanted = Declaration::value::<V>();
        if !self.declaration().is_value() || !self.declaration().converts_to(&wanted) {
            return Err(self.mismatch(wanted));
        }
        // SAFETY: the member is a `V` living inside `object`.
        Ok(unsafe { self.field_ptr(PtrConst::from_ref(object)).get::<V>() })
    }

    /// Borrows a by-value member, panicking on a type mismatch.
    #[track_caller]
    pub fn get_ref<'a, O: Reflect, V: Reflect + Declare>(&self, object: &'a O) -> &'a V {
        self.try_get_ref(object).unwrap_or_else(|err| fatal(err))
    }
}

impl HasAttributes for Property {
    fn attributes(&self) -> &[Arc<dyn Attribute>] {
        &self.attributes
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name())
            .field("declaration", self.declaration())
            .field("offset", &self.offset)
            .field("attributes", &self.attributes.len())
            .finish()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.declaration())
    }
}
