use core::fmt;

use crate::{PtrConst, PtrMut, PtrUninit};

/// Default-constructs a value into uninitialized memory.
pub type ConstructFn = unsafe fn(dst: PtrUninit) -> PtrMut;

/// Clones the value at `src` into uninitialized memory at `dst`.
pub type CopyConstructFn = unsafe fn(src: PtrConst, dst: PtrUninit) -> PtrMut;

/// Relocates the value at `src` into uninitialized memory at `dst`.
///
/// Afterwards `src` is logically uninitialized and must not be destructed.
pub type MoveConstructFn = unsafe fn(src: PtrMut, dst: PtrUninit) -> PtrMut;

/// Drops the value in place.
pub type DestructFn = unsafe fn(target: PtrMut) -> PtrUninit;

/// Lifecycle operations of a type, each independently optional.
///
/// A forward placeholder has none. A complete type always has `move_construct`
/// and `destruct`, and has `construct` / `copy_construct` when it implements
/// `Default` / `Clone`.
#[derive(Clone, Copy, Default)]
pub struct TypeOps {
    /// Default construction, present iff the type is `Default`.
    pub construct: Option<ConstructFn>,
    /// Copy construction, present iff the type is `Clone`.
    pub copy_construct: Option<CopyConstructFn>,
    /// Relocation.
    pub move_construct: Option<MoveConstructFn>,
    /// Destruction.
    pub destruct: Option<DestructFn>,
}

impl TypeOps {
    /// No operations at all, as carried by void and forward descriptors.
    pub const fn none() -> Self {
        Self {
            construct: None,
            copy_construct: None,
            move_construct: None,
            destruct: None,
        }
    }

    /// The operations every complete `T` has: relocation and destruction.
    pub const fn of<T>() -> Self {
        Self {
            construct: None,
            copy_construct: None,
            move_construct: Some(move_construct_for::<T>()),
            destruct: Some(destruct_for::<T>()),
        }
    }

    /// Replaces the default-construction operation.
    pub const fn with_construct(mut self, construct: Option<ConstructFn>) -> Self {
        self.construct = construct;
        self
    }

    /// Replaces the copy-construction operation.
    pub const fn with_copy_construct(mut self, copy_construct: Option<CopyConstructFn>) -> Self {
        self.copy_construct = copy_construct;
        self
    }
}

impl fmt::Debug for TypeOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeOps")
            .field("construct", &self.construct.is_some())
            .field("copy_construct", &self.copy_construct.is_some())
            .field("move_construct", &self.move_construct.is_some())
            .field("destruct", &self.destruct.is_some())
            .finish()
    }
}

/// Default-construction for `T`.
pub const fn construct_for<T: Default>() -> ConstructFn {
    |dst| unsafe { dst.put(T::default()) }
}

/// Copy-construction for `T`.
pub const fn copy_construct_for<T: Clone>() -> CopyConstructFn {
    |src, dst| unsafe { dst.put(src.get::<T>().clone()) }
}

/// Relocation for `T`.
pub const fn move_construct_for<T>() -> MoveConstructFn {
    |src, dst| unsafe { dst.put(src.read::<T>()) }
}

/// Destruction for `T`.
pub const fn destruct_for<T>() -> DestructFn {
    |target| unsafe { target.drop_in_place::<T>() }
}

/// Creates the [`TypeOps`] of a type.
///
/// With an explicit trait list only the listed optional operations are
/// generated:
///
/// ```ignore
/// const OPS: TypeOps = type_ops!(u32 => Default, Clone);
/// ```
///
/// Without one, `Default` and `Clone` are detected with autoderef
/// specialization. Detection only sees bounds that hold for the type as
/// written, so inside a generic impl it reports what holds for every
/// instantiation.
#[macro_export]
macro_rules! type_ops {
    (@with $ops:expr, $ty:ty, Default) => {
        $ops.with_construct(::core::option::Option::Some($crate::construct_for::<$ty>()))
    };
    (@with $ops:expr, $ty:ty, Clone) => {
        $ops.with_copy_construct(::core::option::Option::Some(
            $crate::copy_construct_for::<$ty>(),
        ))
    };
    ($ty:ty => $($trait:ident),* $(,)?) => {{
        let ops = $crate::TypeOps::of::<$ty>();
        $( let ops = $crate::type_ops!(@with ops, $ty, $trait); )*
        ops
    }};
    ($ty:ty) => {{
        #[allow(unused_imports)]
        use $crate::spez::*;
        $crate::TypeOps::of::<$ty>()
            .with_construct((&&Spez(::core::marker::PhantomData::<$ty>)).spez_construct())
            .with_copy_construct((&&Spez(::core::marker::PhantomData::<$ty>)).spez_copy_construct())
    }};
}
