//! Autoderef specialization, used by [`type_ops!`](crate::type_ops) to find
//! out whether a concrete type is `Default` and `Clone`.
//!
//! Method lookup on `&&Spez<PhantomData<T>>` first tries impls for
//! `&Spez<_>` (which carry the trait bound) and only then falls back to the
//! impls for `Spez<_>` (which carry none). Must be expanded where `T` is a
//! concrete type; in generic code the fallback always wins unless the bound
//! holds for every instantiation.

use core::marker::PhantomData;

use crate::{ConstructFn, CopyConstructFn, construct_for, copy_construct_for};

/// Probe wrapper for autoderef specialization.
pub struct Spez<T>(pub T);

//////////////////////////////////////////////////////////////////////
// Default
//////////////////////////////////////////////////////////////////////

/// Picked when the probed type implements `Default`.
pub trait SpezConstructYes {
    /// The type's default-construction operation.
    fn spez_construct(&self) -> Option<ConstructFn>;
}

impl<T: Default> SpezConstructYes for &Spez<PhantomData<T>> {
    fn spez_construct(&self) -> Option<ConstructFn> {
        Some(construct_for::<T>())
    }
}

/// Fallback when the probed type is not `Default`.
pub trait SpezConstructNo {
    /// Always `None`.
    fn spez_construct(&self) -> Option<ConstructFn>;
}

impl<T> SpezConstructNo for Spez<PhantomData<T>> {
    fn spez_construct(&self) -> Option<ConstructFn> {
        None
    }
}

//////////////////////////////////////////////////////////////////////
// Clone
//////////////////////////////////////////////////////////////////////

/// Picked when the probed type implements `Clone`.
pub trait SpezCopyConstructYes {
    /// The type's copy-construction operation.
    fn spez_copy_construct(&self) -> Option<CopyConstructFn>;
}

impl<T: Clone> SpezCopyConstructYes for &Spez<PhantomData<T>> {
    fn spez_copy_construct(&self) -> Option<CopyConstructFn> {
        Some(copy_construct_for::<T>())
    }
}

/// Fallback when the probed type is not `Clone`.
pub trait SpezCopyConstructNo {
    /// Always `None`.
    fn spez_copy_construct(&self) -> Option<CopyConstructFn>;
}

impl<T> SpezCopyConstructNo for Spez<PhantomData<T>> {
    fn spez_copy_construct(&self) -> Option<CopyConstructFn> {
        None
    }
}
