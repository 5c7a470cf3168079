use core::fmt;

use crate::{Reflect, Type, is_a};

/// How a slot holds its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Indirection {
    /// The slot stores the value itself.
    Value,
    /// The slot stores a raw pointer (`*const T` / `*mut T`).
    Pointer,
    /// The slot stores a reference (`&T` / `&mut T`).
    Reference,
}

/// Describes one typed slot: a property, a method argument or a return value.
///
/// The referenced type is resolved lazily, through the forward-safe lookup,
/// so that declarations can name a type whose descriptor is still being built
/// (a node pointing to itself, two types pointing to each other).
#[derive(Clone, Copy)]
pub struct Declaration {
    ty: fn() -> &'static Type,
    indirection: Indirection,
    is_const: bool,
}

impl Declaration {
    /// A declaration with explicit modifiers.
    pub const fn new(ty: fn() -> &'static Type, indirection: Indirection, is_const: bool) -> Self {
        Self {
            ty,
            indirection,
            is_const,
        }
    }

    /// A by-value slot holding a `T`.
    pub const fn value<T: Reflect>() -> Self {
        Self::new(T::type_of_forward, Indirection::Value, false)
    }

    /// A raw pointer slot pointing to a `T`.
    pub const fn pointer<T: Reflect>(is_const: bool) -> Self {
        Self::new(T::type_of_forward, Indirection::Pointer, is_const)
    }

    /// A reference slot referring to a `T`.
    pub const fn reference<T: Reflect>(is_const: bool) -> Self {
        Self::new(T::type_of_forward, Indirection::Reference, is_const)
    }

    /// The same declaration with a different constness.
    pub const fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    /// The referenced type, or its placeholder while it is still building.
    #[inline]
    pub fn ty(&self) -> &'static Type {
        (self.ty)()
    }

    /// How the slot holds its type.
    #[inline]
    pub const fn indirection(&self) -> Indirection {
        self.indirection
    }

    /// `true` for by-value slots.
    #[inline]
    pub const fn is_value(&self) -> bool {
        matches!(self.indirection, Indirection::Value)
    }

    /// `true` for raw pointer slots.
    #[inline]
    pub const fn is_pointer(&self) -> bool {
        matches!(self.indirection, Indirection::Pointer)
    }

    /// `true` for reference slots.
    #[inline]
    pub const fn is_reference(&self) -> bool {
        matches!(self.indirection, Indirection::Reference)
    }

    /// `true` if the slot (or its pointee) is read-only.
    #[inline]
    pub const fn is_const(&self) -> bool {
        self.is_const
    }

    /// `true` if this is the "returns nothing" declaration.
    #[inline]
    pub fn is_void(&self) -> bool {
        self.is_value() && self.ty().is_void()
    }

    /// Whether a value described by `provided` may be stored into this slot.
    ///
    /// Values need the exact type. Pointers and references need the same
    /// indirection and a pointee that `is_a` the declared one, and never turn
    /// a const pointee into a mutable one.
    pub fn accepts(&self, provided: &Declaration) -> bool {
        match self.indirection {
            Indirection::Value => provided.is_value() && provided.ty().is_same(self.ty()),
            Indirection::Pointer | Indirection::Reference => {
                provided.indirection == self.indirection
                    && (self.is_const || !provided.is_const)
                    && is_a(provided.ty(), self.ty())
            }
        }
    }

    /// Whether this slot may be read out as a value described by `wanted`.
    ///
    /// The mirror of [`Declaration::accepts`]: pointees only convert towards
    /// their ancestors.
    pub fn converts_to(&self, wanted: &Declaration) -> bool {
        match self.indirection {
            Indirection::Value => wanted.is_value() && wanted.ty().is_same(self.ty()),
            Indirection::Pointer | Indirection::Reference => {
                wanted.indirection == self.indirection
                    && (wanted.is_const || !self.is_const)
                    && is_a(self.ty(), wanted.ty())
            }
        }
    }

    /// References read back as raw pointers: the same declaration with
    /// `Reference` turned into `Pointer`.
    pub const fn as_pointer(mut self) -> Self {
        if let Indirection::Reference = self.indirection {
            self.indirection = Indirection::Pointer;
        }
        self
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.ty().name();
        match (self.indirection, self.is_const) {
            (Indirection::Value, false) => write!(f, "{name}"),
            (Indirection::Value, true) => write!(f, "const {name}"),
            (Indirection::Pointer, false) => write!(f, "*mut {name}"),
            (Indirection::Pointer, true) => write!(f, "*const {name}"),
            (Indirection::Reference, false) => write!(f, "&mut {name}"),
            (Indirection::Reference, true) => write!(f, "&{name}"),
        }
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("ty", &self.ty().name())
            .field("indirection", &self.indirection)
            .field("is_const", &self.is_const)
            .finish()
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.indirection == other.indirection
            && self.is_const == other.is_const
            && self.ty() == other.ty()
    }
}

impl Eq for Declaration {}

/// A named slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variable {
    name: &'static str,
    declaration: Declaration,
}

impl Variable {
    /// A variable named `name` declared as `declaration`.
    pub const fn new(name: &'static str, declaration: Declaration) -> Self {
        Self { name, declaration }
    }

    /// Name of the slot.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declaration of the slot.
    #[inline]
    pub const fn declaration(&self) -> &Declaration {
        &self.declaration
    }
}

/// Static types that can be described by a [`Declaration`].
///
/// Implemented by every registered value type (the registration macros emit
/// the impl), by references and raw pointers to them, and by `()`, which is
/// the void declaration.
///
/// # Safety
///
/// `Returned` must be what an invocation thunk writes into a return slot for
/// a function returning `Self`: `Self` for values, a raw pointer for
/// references. Callers reinterpret return slots based on `DECLARATION`.
pub unsafe trait Declare: Sized {
    /// The slot description for `Self`.
    const DECLARATION: Declaration;

    /// `true` only for `()`.
    const IS_VOID: bool = false;

    /// What ends up in a return slot when a function returns a `Self`.
    type Returned;

    /// Converts a returned value into what gets stored in the return slot.
    fn into_returned(self) -> Self::Returned;
}

unsafe impl<'a, T: Reflect> Declare for &'a T {
    const DECLARATION: Declaration = Declaration::reference::<T>(true);
    type Returned = *const T;

    #[inline]
    fn into_returned(self) -> *const T {
        self as *const T
    }
}

unsafe impl<'a, T: Reflect> Declare for &'a mut T {
    const DECLARATION: Declaration = Declaration::reference::<T>(false);
    type Returned = *mut T;

    #[inline]
    fn into_returned(self) -> *mut T {
        self as *mut T
    }
}

unsafe impl<T: Reflect> Declare for *const T {
    const DECLARATION: Declaration = Declaration::pointer::<T>(true);
    type Returned = *const T;

    #[inline]
    fn into_returned(self) -> *const T {
        self
    }
}

unsafe impl<T: Reflect> Declare for *mut T {
    const DECLARATION: Declaration = Declaration::pointer::<T>(false);
    type Returned = *mut T;

    #[inline]
    fn into_returned(self) -> *mut T {
        self
    }
}

unsafe impl Declare for () {
    const DECLARATION: Declaration = Declaration::value::<()>();
    const IS_VOID: bool = true;
    type Returned = ();

    #[inline]
    fn into_returned(self) {}
}

/// The declaration of the field a projection closure points at.
///
/// ```ignore
/// let decl = declaration_of(&|p: &Point| &p.x);
/// ```
pub fn declaration_of<S, F: Declare>(_projection: &dyn Fn(&S) -> &F) -> Declaration {
    F::DECLARATION
}

/// The declaration of `T`.
#[inline]
pub const fn declare<T: Declare>() -> Declaration {
    T::DECLARATION
}
