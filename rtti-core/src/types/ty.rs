use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{
    alloc::Layout,
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
    mem::{ManuallyDrop, MaybeUninit},
};

use crate::{
    Attribute, AttributeList, Declaration, EnumInfo, HasAttributes, Instance, Kind, Method,
    Property, PtrConst, PtrMut, PtrUninit, Reflect, RttiError, StableId, TypeOps,
    alloc_for_layout, fatal, hash_name, is_a,
};

/// The runtime descriptor of one type.
///
/// Descriptors are built once, lazily, and live for the rest of the process:
/// every lookup hands out `&'static Type`. Two descriptors are equal when
/// their ids are; the typed entry points additionally compare the
/// [`TypeId`] of the Rust type behind them, see [`Type::is_same`].
pub struct Type {
    name: &'static str,
    id: StableId,
    type_id: Option<TypeId>,
    kind: Kind,
    size: usize,
    align: usize,
    parent: Option<fn() -> &'static Type>,
    ops: TypeOps,
    properties: Vec<Property>,
    methods: Vec<Method>,
    templates: Vec<Declaration>,
    attributes: AttributeList,
    enumeration: Option<EnumInfo>,
    forward_of: Option<fn() -> &'static Type>,
}

/// Builder for [`Type`].
pub struct TypeBuilder {
    ty: Type,
}

impl TypeBuilder {
    /// Overrides the name (and with it the id).
    pub fn name(mut self, name: &'static str) -> Self {
        self.ty.name = name;
        self.ty.id = hash_name(name);
        self
    }

    /// Overrides the id, keeping the name.
    ///
    /// Must come after [`TypeBuilder::name`], which recomputes it.
    pub fn id(mut self, id: StableId) -> Self {
        self.ty.id = id;
        self
    }

    /// Links the parent type.
    pub fn parent(mut self, parent: fn() -> &'static Type) -> Self {
        self.ty.parent = Some(parent);
        self
    }

    /// Replaces the lifecycle operations.
    pub fn ops(mut self, ops: TypeOps) -> Self {
        self.ty.ops = ops;
        self
    }

    /// Sets the declared properties.
    pub fn properties(mut self, properties: Vec<Property>) -> Self {
        self.ty.properties = properties;
        self
    }

    /// Sets the declared methods.
    pub fn methods(mut self, methods: Vec<Method>) -> Self {
        self.ty.methods = methods;
        self
    }

    /// Sets the template arguments of a generic instantiation.
    pub fn templates(mut self, templates: Vec<Declaration>) -> Self {
        self.ty.templates = templates;
        self
    }

    /// Attaches attributes.
    pub fn attributes(mut self, attributes: AttributeList) -> Self {
        self.ty.attributes = attributes;
        self
    }

    /// Attaches the enum table.
    pub fn enumeration(mut self, enumeration: EnumInfo) -> Self {
        self.ty.enumeration = Some(enumeration);
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> Type {
        self.ty
    }
}

impl Type {
    /// Starts a descriptor for `T`, named after `core::any::type_name`,
    /// with `T`'s layout and its relocation and destruction operations.
    ///
    /// # Safety
    ///
    /// The finished descriptor is trusted by every checked accessor. The
    /// caller must make sure that:
    /// - a [`TypeBuilder::parent`] is embedded at offset 0 of `T`,
    /// - [`TypeBuilder::ops`] operate on values of `T`,
    /// - every [`Property`] and [`Method`] handed to the builder was made for
    ///   `T` (see [`Property::new`] and [`Thunk::new`](crate::Thunk::new)).
    pub unsafe fn builder<T: 'static>(kind: Kind) -> TypeBuilder {
        let name = core::any::type_name::<T>();
        let layout = Layout::new::<T>();
        TypeBuilder {
            ty: Type {
                name,
                id: hash_name(name),
                type_id: Some(TypeId::of::<T>()),
                kind,
                size: layout.size(),
                align: layout.align(),
                parent: None,
                ops: TypeOps::of::<T>(),
                properties: Vec::new(),
                methods: Vec::new(),
                templates: Vec::new(),
                attributes: AttributeList::new(),
                enumeration: None,
                forward_of: None,
            },
        }
    }

    /// The descriptor of `()`, meaning "nothing".
    pub fn void() -> Type {
        Type {
            name: "void",
            id: StableId::VOID,
            type_id: Some(TypeId::of::<()>()),
            kind: Kind::Void,
            size: 0,
            align: 1,
            parent: None,
            ops: TypeOps::none(),
            properties: Vec::new(),
            methods: Vec::new(),
            templates: Vec::new(),
            attributes: AttributeList::new(),
            enumeration: None,
            forward_of: None,
        }
    }

    /// A placeholder standing in for the descriptor named `name` while it is
    /// being built. `resolve` yields the finished descriptor once there is
    /// one.
    pub fn forward(name: &'static str, resolve: fn() -> &'static Type) -> Type {
        Type {
            name,
            id: hash_name(name),
            type_id: None,
            kind: Kind::Forward,
            size: 0,
            align: 1,
            parent: None,
            ops: TypeOps::none(),
            properties: Vec::new(),
            methods: Vec::new(),
            templates: Vec::new(),
            attributes: AttributeList::new(),
            enumeration: None,
            forward_of: Some(resolve),
        }
    }

    /// Name of the type.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stable id, the hash of the name.
    #[inline]
    pub fn id(&self) -> StableId {
        self.id
    }

    /// [`TypeId`] of the Rust type behind the descriptor; `None` for forward
    /// placeholders.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Whether both descriptors stand for the same type: equal ids, and equal
    /// [`TypeId`]s unless one of them is a placeholder.
    ///
    /// Stricter than `==`, which only compares ids: two Rust types registered
    /// under the same name are equal but not the same.
    pub fn is_same(&self, other: &Type) -> bool {
        self.id == other.id
            && match (self.type_id, other.type_id) {
                (Some(ours), Some(theirs)) => ours == theirs,
                _ => true,
            }
    }

    /// Whether this descriptor was built for `T`. Placeholders describe
    /// anything.
    #[inline]
    pub fn describes<T: 'static>(&self) -> bool {
        self.type_id.is_none_or(|id| id == TypeId::of::<T>())
    }

    /// Category of the type.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment in bytes.
    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    /// Memory layout; `None` for void and forward placeholders.
    pub fn layout(&self) -> Option<Layout> {
        match self.kind {
            Kind::Void | Kind::Forward => None,
            _ => Layout::from_size_align(self.size, self.align).ok(),
        }
    }

    /// The direct parent, if any.
    #[inline]
    pub fn parent(&self) -> Option<&'static Type> {
        self.parent.map(|parent| parent())
    }

    /// Lifecycle operations.
    #[inline]
    pub fn ops(&self) -> &TypeOps {
        &self.ops
    }

    /// Properties declared by this type itself.
    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Methods declared by this type itself.
    #[inline]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Template arguments, for generic instantiations.
    #[inline]
    pub fn templates(&self) -> &[Declaration] {
        &self.templates
    }

    /// The enum table, for enums.
    #[inline]
    pub fn enumeration(&self) -> Option<&EnumInfo> {
        self.enumeration.as_ref()
    }

    /// `true` for the descriptor of `()`.
    #[inline]
    pub fn is_void(&self) -> bool {
        self.kind == Kind::Void
    }

    /// `true` for a placeholder handed out during a build.
    #[inline]
    pub fn is_forward(&self) -> bool {
        self.kind == Kind::Forward
    }

    /// Whether default construction is available.
    #[inline]
    pub fn has_construct(&self) -> bool {
        self.ops.construct.is_some()
    }

    /// Whether copy construction is available.
    #[inline]
    pub fn has_copy_construct(&self) -> bool {
        self.ops.copy_construct.is_some()
    }

    /// Whether relocation is available.
    #[inline]
    pub fn has_move_construct(&self) -> bool {
        self.ops.move_construct.is_some()
    }

    /// Whether destruction is available.
    #[inline]
    pub fn has_destruct(&self) -> bool {
        self.ops.destruct.is_some()
    }

    /// The finished descriptor this placeholder stands for, or `self`.
    ///
    /// Still returns the placeholder while its build is in progress.
    pub fn complete(&'static self) -> &'static Type {
        match self.forward_of {
            Some(resolve) => resolve(),
            None => self,
        }
    }

    /// `self`, then each parent up to the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Whether `self` is `base` or derives from it.
    #[inline]
    pub fn is_a(&self, base: &Type) -> bool {
        is_a(self, base)
    }

    /// Looks up a property by name, on this type and then its ancestors.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.ancestors()
            .find_map(|ty| ty.properties.iter().find(|p| p.name() == name))
    }

    /// Looks up a property by id, on this type and then its ancestors.
    pub fn property_by_id(&self, id: StableId) -> Option<&Property> {
        self.ancestors()
            .find_map(|ty| ty.properties.iter().find(|p| p.id() == id))
    }

    /// Looks up a method by name, on this type and then its ancestors.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.ancestors()
            .find_map(|ty| ty.methods.iter().find(|m| m.name() == name))
    }

    /// Looks up a method by id, on this type and then its ancestors.
    pub fn method_by_id(&self, id: StableId) -> Option<&Method> {
        self.ancestors()
            .find_map(|ty| ty.methods.iter().find(|m| m.id() == id))
    }

    /// Discriminant of the variant called `name`.
    pub fn enum_value(&self, name: &str) -> Option<i64> {
        self.enumeration.as_ref()?.value_of(name)
    }

    /// Name of the variant with discriminant `value`.
    pub fn enum_name(&self, value: i64) -> Option<&'static str> {
        self.enumeration.as_ref()?.name_of(value)
    }

    fn missing(&'static self, operation: &'static str) -> RttiError {
        RttiError::MissingOperation {
            ty: self,
            operation,
        }
    }

    /// Default-constructs a value at `dst`.
    ///
    /// # Safety
    /// `dst` must be valid for writes of this type's layout.
    ///
    /// # Panics
    /// Panics if the type is not default-constructible.
    pub unsafe fn construct(&'static self, dst: PtrUninit) -> PtrMut {
        let Some(construct) = self.ops.construct else {
            fatal(self.missing("construct"))
        };
        unsafe { construct(dst) }
    }

    /// Clones the value at `src` into `dst`.
    ///
    /// # Safety
    /// `src` must point to a live value of this type and `dst` must be valid
    /// for writes of its layout.
    ///
    /// # Panics
    /// Panics if the type is not clonable.
    pub unsafe fn copy_construct(&'static self, src: PtrConst, dst: PtrUninit) -> PtrMut {
        let Some(copy_construct) = self.ops.copy_construct else {
            fatal(self.missing("copy_construct"))
        };
        unsafe { copy_construct(src, dst) }
    }

    /// Relocates the value at `src` into `dst`. `src` is left logically
    /// uninitialized.
    ///
    /// # Safety
    /// Same as [`Type::copy_construct`]; the caller must not drop `src`
    /// afterwards.
    pub unsafe fn move_construct(&'static self, src: PtrMut, dst: PtrUninit) -> PtrMut {
        let Some(move_construct) = self.ops.move_construct else {
            fatal(self.missing("move_construct"))
        };
        unsafe { move_construct(src, dst) }
    }

    /// Drops the value at `target` in place.
    ///
    /// # Safety
    /// `target` must point to a live value of this type, which must not be
    /// used afterwards.
    pub unsafe fn destruct(&'static self, target: PtrMut) -> PtrUninit {
        let Some(destruct) = self.ops.destruct else {
            fatal(self.missing("destruct"))
        };
        unsafe { destruct(target) }
    }

    fn check_static<T: Reflect>(&'static self) {
        let actual = T::type_of();
        if !actual.is_same(self) || !self.describes::<T>() {
            fatal(RttiError::WrongType {
                expected: self,
                actual,
            })
        }
    }

    /// Allocates and default-constructs a `T` through this descriptor.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's type or is not
    /// default-constructible.
    #[track_caller]
    pub fn new<T: Reflect>(&'static self) -> Box<T> {
        self.check_static::<T>();
        let mut boxed = Box::<T>::new_uninit();
        // SAFETY: the descriptor belongs to `T`, so its construct op writes a `T`.
        unsafe {
            self.construct(PtrUninit::from_maybe_uninit(&mut *boxed));
            boxed.assume_init()
        }
    }

    /// Allocates a clone of `src` through this descriptor.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's type or is not clonable.
    #[track_caller]
    pub fn new_copy<T: Reflect>(&'static self, src: &T) -> Box<T> {
        self.check_static::<T>();
        let mut boxed = Box::<T>::new_uninit();
        // SAFETY: see `new`.
        unsafe {
            self.copy_construct(
                PtrConst::from_ref(src),
                PtrUninit::from_maybe_uninit(&mut *boxed),
            );
            boxed.assume_init()
        }
    }

    /// Destroys and frees a value through this descriptor. `None` is a no-op.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's type.
    #[track_caller]
    pub fn delete<T: Reflect>(&'static self, value: Option<Box<T>>) {
        let Some(value) = value else {
            return;
        };
        self.check_static::<T>();
        let raw = Box::into_raw(value);
        // SAFETY: `raw` holds a live `T` which we destroy exactly once, then
        // free without dropping again.
        unsafe {
            self.destruct(PtrMut::new(raw));
            drop(Box::from_raw(raw.cast::<MaybeUninit<T>>()));
        }
    }

    /// Relocates `value` into `dst` through this descriptor.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's type.
    #[track_caller]
    pub fn move_into<'a, T: Reflect>(
        &'static self,
        value: T,
        dst: &'a mut MaybeUninit<T>,
    ) -> &'a mut T {
        self.check_static::<T>();
        let mut value = ManuallyDrop::new(value);
        // SAFETY: the move op reads `value` out exactly once; it is never
        // dropped here.
        unsafe {
            self.move_construct(
                PtrMut::from_mut(&mut *value),
                PtrUninit::from_maybe_uninit(dst),
            );
            dst.assume_init_mut()
        }
    }

    /// Allocates a default-constructed instance owned by its descriptor.
    ///
    /// # Panics
    /// Panics for void and forward descriptors and for types that are not
    /// default-constructible.
    pub fn instantiate(&'static self) -> Instance {
        let (true, Some(layout)) = (self.has_construct(), self.layout()) else {
            fatal(self.missing("construct"))
        };
        let storage = alloc_for_layout(layout);
        // SAFETY: fresh storage with this type's layout.
        let ptr = unsafe { self.construct(storage) };
        crate::trace!("instantiated {}", self.name);
        unsafe { Instance::from_raw(ptr, self) }
    }

    /// Allocates a copy of the value at `src`, owned by its descriptor.
    ///
    /// # Safety
    /// `src` must point to a live value of this type.
    ///
    /// # Panics
    /// Panics for void and forward descriptors and for types that are not
    /// clonable.
    pub unsafe fn instantiate_copy(&'static self, src: PtrConst) -> Instance {
        let (true, Some(layout)) = (self.has_copy_construct(), self.layout()) else {
            fatal(self.missing("copy_construct"))
        };
        let storage = alloc_for_layout(layout);
        let ptr = unsafe { self.copy_construct(src, storage) };
        unsafe { Instance::from_raw(ptr, self) }
    }
}

/// Iterator over a type and its ancestors, see [`Type::ancestors`].
pub struct Ancestors<'a> {
    next: Option<&'a Type>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Type;

    fn next(&mut self) -> Option<&'a Type> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl HasAttributes for Type {
    fn attributes(&self) -> &[Arc<dyn Attribute>] {
        &self.attributes
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
