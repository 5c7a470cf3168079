//! Lazy, re-entrancy aware descriptor storage.
//!
//! Building a descriptor may need the descriptor itself: a node whose
//! property points to another node, an attribute that inspects its owner.
//! While a descriptor is being built, the building thread gets a
//! [`Kind::Forward`](crate::Kind::Forward) placeholder with the same name and
//! id instead of recursing; other threads wait for the build to finish.

use alloc::boxed::Box;
use core::{any::TypeId, cell::Cell, cell::RefCell};
use std::{collections::HashMap, sync::OnceLock};

use parking_lot::{ReentrantMutex, RwLock};

use crate::{RttiError, Type, fatal};

/// A statically known type with a runtime descriptor.
///
/// Implemented by the [`reflect!`](crate::reflect) macro.
///
/// # Safety
///
/// Property accessors, method calls, casts and instances all trust the
/// descriptor: it must be built for `Self` (see [`Type::builder`]) and
/// describe its layout, its parent, its members and its lifecycle operations
/// faithfully.
///
/// ```compile_fail
/// use rtti_core::{Reflect, Type, type_of};
///
/// struct Liar;
///
/// impl Reflect for Liar {
///     fn type_of_forward() -> &'static Type {
///         type_of::<u64>()
///     }
/// }
/// ```
pub unsafe trait Reflect: 'static {
    /// The descriptor, or a forward placeholder when called while the
    /// descriptor is being built on this thread.
    fn type_of_forward() -> &'static Type;

    /// The finished descriptor.
    ///
    /// # Panics
    /// Panics when called while the descriptor is being built on this thread.
    #[track_caller]
    fn type_of() -> &'static Type {
        let ty = Self::type_of_forward();
        if ty.is_forward() {
            fatal(RttiError::Incomplete { name: ty.name() })
        }
        ty
    }
}

/// The finished descriptor of `T`.
#[inline]
#[track_caller]
pub fn type_of<T: Reflect>() -> &'static Type {
    T::type_of()
}

/// The descriptor of `T`, or its placeholder while it is being built.
#[inline]
pub fn type_of_forward<T: Reflect>() -> &'static Type {
    T::type_of_forward()
}

/// Values that know their dynamic type.
///
/// This is what makes `cast` work through `dyn` pointers: the registration
/// macros implement it by returning the static descriptor, and trait objects
/// dispatch to the concrete type's impl.
///
/// # Safety
///
/// `dyn_type` must return the descriptor of the concrete type of `self`:
/// casts reinterpret the value based on it.
pub unsafe trait Polymorphic {
    /// Descriptor of the concrete type of `self`.
    fn dyn_type(&self) -> &'static Type;
}

/// Per-type storage of a descriptor, meant to live in a `static`.
///
/// ```ignore
/// unsafe impl Reflect for Point {
///     fn type_of_forward() -> &'static Type {
///         static CELL: TypeCell = TypeCell::new();
///         CELL.get_or_init(
///             || Type::forward("Point", <Point as Reflect>::type_of_forward),
///             // SAFETY: a bare descriptor of `Point`.
///             || unsafe { Type::builder::<Point>(Kind::Struct) }.name("Point").build(),
///         )
///     }
/// }
/// ```
pub struct TypeCell {
    ty: OnceLock<Type>,
    forward: OnceLock<Type>,
    building: ReentrantMutex<Cell<bool>>,
}

impl TypeCell {
    /// An empty cell.
    pub const fn new() -> Self {
        Self {
            ty: OnceLock::new(),
            forward: OnceLock::new(),
            building: parking_lot::const_reentrant_mutex(Cell::new(false)),
        }
    }

    /// Returns the descriptor, building it with `build` on first use.
    ///
    /// A call made by `build` itself (directly or not) gets the placeholder
    /// made by `forward` instead. Calls from other threads block until the
    /// build is done. A panicking build leaves the cell empty.
    ///
    /// The lock is held while `build` runs. Two threads first touching two
    /// types whose builds need each other (an attribute expression calling
    /// `type_of` on the other type, say) each hold one lock and wait for the
    /// other: they deadlock. Touch one of them first, or move such lookups
    /// out of the build.
    pub fn get_or_init(
        &'static self,
        forward: impl FnOnce() -> Type,
        build: impl FnOnce() -> Type,
    ) -> &'static Type {
        if let Some(ty) = self.ty.get() {
            return ty;
        }

        let building = self.building.lock();
        if let Some(ty) = self.ty.get() {
            return ty;
        }
        if building.get() {
            let placeholder = self.forward.get_or_init(forward);
            crate::debug!(
                "{} requested while being built, handing out a forward placeholder",
                placeholder.name()
            );
            return placeholder;
        }

        building.set(true);
        let _latch = Latch(&building);
        let ty = build();
        crate::trace!("built descriptor {} ({})", ty.name(), ty.id());
        self.ty.get_or_init(|| ty)
    }
}

impl Default for TypeCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the building flag, also when the build unwinds.
struct Latch<'a>(&'a Cell<bool>);

impl Drop for Latch<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Default)]
struct GenericCache {
    built: HashMap<TypeId, &'static Type>,
    forwards: HashMap<TypeId, &'static Type>,
}

static GENERIC: OnceLock<RwLock<GenericCache>> = OnceLock::new();

std::thread_local! {
    static BUILDING_GENERIC: RefCell<alloc::vec::Vec<TypeId>> =
        const { RefCell::new(alloc::vec::Vec::new()) };
}

/// Pops the innermost generic build, also when it unwinds.
struct GenericLatch;

impl Drop for GenericLatch {
    fn drop(&mut self) {
        BUILDING_GENERIC.with(|building| {
            building.borrow_mut().pop();
        });
    }
}

/// Descriptor storage for instantiations of generic types, keyed by
/// `TypeId`: a `static` inside a generic function is shared by all
/// instantiations, so these cannot use a [`TypeCell`].
///
/// Same contract as [`TypeCell::get_or_init`], except that two threads
/// building the same instantiation concurrently may both run `build`; the
/// first one to finish wins and the other result is dropped.
pub fn generic_type_of<T: 'static>(
    forward: impl FnOnce() -> Type,
    build: impl FnOnce() -> Type,
) -> &'static Type {
    let key = TypeId::of::<T>();
    let cache = GENERIC.get_or_init(Default::default);
    if let Some(&ty) = cache.read().built.get(&key) {
        return ty;
    }

    let reentrant = BUILDING_GENERIC.with(|building| building.borrow().contains(&key));
    if reentrant {
        let mut cache = cache.write();
        let placeholder: &'static Type = *cache.forwards.entry(key).or_insert_with(|| {
            let leaked: &'static Type = Box::leak(Box::new(forward()));
            leaked
        });
        crate::debug!(
            "{} requested while being built, handing out a forward placeholder",
            placeholder.name()
        );
        return placeholder;
    }

    BUILDING_GENERIC.with(|building| building.borrow_mut().push(key));
    let latch = GenericLatch;
    let ty = build();
    drop(latch);

    let mut cache = cache.write();
    if let Some(&existing) = cache.built.get(&key) {
        return existing;
    }
    crate::trace!("built descriptor {} ({})", ty.name(), ty.id());
    let ty: &'static Type = Box::leak(Box::new(ty));
    cache.built.insert(key, ty);
    ty
}
