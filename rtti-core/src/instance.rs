//! Heap values owned through their descriptor.

use alloc::boxed::Box;
use core::fmt;

use crate::{PtrConst, PtrMut, Reflect, Type, dealloc_for_layout, is_a};

/// A heap-allocated value of a type known only at runtime.
///
/// Created by [`Type::instantiate`] and [`Type::instantiate_copy`]. Dropping
/// it runs the type's destructor and frees the storage.
pub struct Instance {
    ptr: PtrMut,
    ty: &'static Type,
}

impl Instance {
    /// Takes ownership of a live value allocated with `alloc_for_layout`.
    ///
    /// # Safety
    /// `ptr` must point to a live value of `ty`, allocated by
    /// [`alloc_for_layout`](crate::alloc_for_layout) with `ty`'s layout, and
    /// owned by nobody else.
    pub unsafe fn from_raw(ptr: PtrMut, ty: &'static Type) -> Self {
        Self { ptr, ty }
    }

    /// The descriptor of the value.
    #[inline]
    pub fn ty(&self) -> &'static Type {
        self.ty
    }

    /// Erased address of the value.
    #[inline]
    pub fn as_ptr(&self) -> PtrConst {
        self.ptr.as_const()
    }

    /// Erased mutable address of the value.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> PtrMut {
        self.ptr
    }

    /// Views the value as a `T`, if its type is (derived from) `T`.
    pub fn get<T: Reflect>(&self) -> Option<&T> {
        let base = T::type_of();
        // SAFETY: `T` is the type or one of its ancestors, embedded at offset 0.
        (base.describes::<T>() && is_a(self.ty, base)).then(|| unsafe { self.ptr.get::<T>() })
    }

    /// Mutably views the value as a `T`, if its type is (derived from) `T`.
    pub fn get_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        let base = T::type_of();
        // SAFETY: see `get`.
        (base.describes::<T>() && is_a(self.ty, base)).then(|| unsafe { self.ptr.as_mut::<T>() })
    }

    /// Turns the instance into a typed box if its type is exactly `T`.
    pub fn downcast<T: Reflect>(self) -> Result<Box<T>, Instance> {
        if !self.ty.is_same(T::type_of()) || !self.ty.describes::<T>() {
            return Err(self);
        }
        let this = core::mem::ManuallyDrop::new(self);
        // SAFETY: the storage was allocated with `T`'s layout by the global
        // allocator (or is a dangling aligned pointer for zero-sized `T`),
        // which is what `Box<T>` expects.
        Ok(unsafe { Box::from_raw(this.ptr.as_ptr::<T>()) })
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        crate::trace!("dropping instance of {}", self.ty.name());
        // SAFETY: we own a live value of `ty`, allocated for its layout.
        unsafe {
            let storage = self.ty.destruct(self.ptr);
            if let Some(layout) = self.ty.layout() {
                dealloc_for_layout(storage, layout);
            }
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("ty", &self.ty.name())
            .field("ptr", &self.ptr)
            .finish()
    }
}
