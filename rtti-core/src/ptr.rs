//! Opaque pointers
//!
//! Type-erased pointers handed to lifecycle operations, property accessors
//! and invocation thunks.
//!
//! - `PtrMut` - Raw mutable pointer, can do everything
//! - `PtrConst` - Wraps PtrMut, exposes only read methods
//! - `PtrUninit` - Wraps PtrMut, for uninitialized memory
//!
//! Every reflected type is `Sized`, so all three are thin. None of them
//! carry a lifetime: safety is the caller's responsibility.

use core::{alloc::Layout, fmt};

// ============================================================================
// PtrMut - The base mutable pointer type
// ============================================================================

/// A type-erased mutable pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PtrMut {
    ptr: *mut u8,
}

impl fmt::Debug for PtrMut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:p}", self.ptr)
    }
}

impl PtrMut {
    /// Creates a new mutable pointer from a raw pointer.
    #[inline]
    pub const fn new<T>(ptr: *mut T) -> Self {
        Self {
            ptr: ptr as *mut u8,
        }
    }

    /// Creates a pointer from a mutable reference.
    #[inline]
    pub fn from_mut<T>(value: &mut T) -> Self {
        Self::new(value as *mut T)
    }

    /// Returns the underlying data pointer.
    #[inline]
    pub const fn as_byte_ptr(self) -> *mut u8 {
        self.ptr
    }

    /// Gets the underlying raw pointer as a pointer of type T.
    #[inline]
    pub const fn as_ptr<T>(self) -> *mut T {
        self.ptr as *mut T
    }

    /// Borrows the underlying object as a reference of type `T`.
    ///
    /// # Safety
    /// - `T` must be the actual underlying type
    /// - The memory must be valid and initialized
    /// - The returned reference must not outlive the actual data
    #[inline]
    pub unsafe fn get<'a, T>(self) -> &'a T {
        unsafe { &*(self.ptr as *const T) }
    }

    /// Borrows the underlying object as a mutable reference of type `T`.
    ///
    /// # Safety
    /// Same as [`PtrMut::get`], plus the caller must have exclusive access.
    #[inline]
    pub unsafe fn as_mut<'a, T>(self) -> &'a mut T {
        unsafe { &mut *(self.ptr as *mut T) }
    }

    /// Moves the value out, leaving the memory logically uninitialized.
    ///
    /// # Safety
    /// - `T` must be the actual underlying type
    /// - The memory must be properly initialized
    /// - The value must not be read or dropped again afterwards
    #[inline]
    pub unsafe fn read<T>(self) -> T {
        unsafe { core::ptr::read(self.ptr as *const T) }
    }

    /// Drops the value in place.
    ///
    /// # Safety
    /// - `T` must be the actual underlying type
    /// - The memory must be properly initialized
    #[inline]
    pub unsafe fn drop_in_place<T>(self) -> PtrUninit {
        unsafe { core::ptr::drop_in_place(self.ptr as *mut T) }
        PtrUninit { ptr: self }
    }

    /// Returns a pointer with the given offset added.
    ///
    /// # Safety
    /// Offset must be within bounds of the allocated memory.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> PtrMut {
        Self {
            ptr: unsafe { self.ptr.add(offset) },
        }
    }

    /// Read-only view of this pointer.
    #[inline]
    pub const fn as_const(self) -> PtrConst {
        PtrConst { ptr: self }
    }

    /// Treats the pointee as uninitialized.
    #[inline]
    pub const fn as_uninit(self) -> PtrUninit {
        PtrUninit { ptr: self }
    }
}

// ============================================================================
// PtrConst - Read-only pointer (wraps PtrMut)
// ============================================================================

/// A type-erased read-only pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PtrConst {
    ptr: PtrMut,
}

impl fmt::Debug for PtrConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ptr.fmt(f)
    }
}

impl PtrConst {
    /// Creates a new const pointer from a raw pointer.
    #[inline]
    pub const fn new<T>(ptr: *const T) -> Self {
        Self {
            ptr: PtrMut::new(ptr as *mut T),
        }
    }

    /// Creates a pointer from a shared reference.
    #[inline]
    pub fn from_ref<T>(value: &T) -> Self {
        Self::new(value as *const T)
    }

    /// Returns the underlying data pointer.
    #[inline]
    pub const fn as_byte_ptr(self) -> *const u8 {
        self.ptr.ptr as *const u8
    }

    /// Gets the underlying raw pointer as a pointer of type T.
    #[inline]
    pub const fn as_ptr<T>(self) -> *const T {
        self.ptr.ptr as *const T
    }

    /// Borrows the underlying object as a reference of type `T`.
    ///
    /// # Safety
    /// - `T` must be the actual underlying type
    /// - The memory must be valid and initialized
    /// - The returned reference must not outlive the actual data
    #[inline]
    pub unsafe fn get<'a, T>(self) -> &'a T {
        unsafe { self.ptr.get::<T>() }
    }

    /// Copies the bits of the pointee out as a `T`.
    ///
    /// # Safety
    /// - `T` must be the actual underlying type, or a `Copy` type with the
    ///   same representation
    /// - The memory must be properly initialized
    #[inline]
    pub unsafe fn read<T>(self) -> T {
        unsafe { self.ptr.read() }
    }

    /// Returns a pointer with the given offset added.
    ///
    /// # Safety
    /// Offset must be within bounds of the allocated memory.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> PtrConst {
        PtrConst {
            ptr: unsafe { self.ptr.field(offset) },
        }
    }

    /// Convert to a mutable pointer.
    ///
    /// # Safety
    /// Caller must ensure they have exclusive access.
    #[inline]
    pub const unsafe fn into_mut(self) -> PtrMut {
        self.ptr
    }
}

// ============================================================================
// PtrUninit - Pointer to uninitialized memory (wraps PtrMut)
// ============================================================================

/// A type-erased pointer to uninitialized memory.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PtrUninit {
    ptr: PtrMut,
}

impl fmt::Debug for PtrUninit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ptr.fmt(f)
    }
}

impl PtrUninit {
    /// Create a new uninit pointer from a raw pointer.
    #[inline]
    pub const fn new<T>(ptr: *mut T) -> Self {
        Self {
            ptr: PtrMut::new(ptr),
        }
    }

    /// Creates from a reference to a `MaybeUninit`.
    #[inline]
    pub fn from_maybe_uninit<T>(borrow: &mut core::mem::MaybeUninit<T>) -> Self {
        Self::new(borrow.as_mut_ptr())
    }

    /// Returns the underlying raw pointer as a mutable byte pointer.
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.ptr.ptr
    }

    /// Assumes the pointer is initialized and returns a `PtrMut`.
    ///
    /// # Safety
    /// The memory must actually be initialized.
    #[inline]
    pub const unsafe fn assume_init(self) -> PtrMut {
        self.ptr
    }

    /// Write a value to this location and return an initialized pointer.
    ///
    /// # Safety
    /// The pointer must be properly aligned for `T` and point to allocated
    /// memory large enough to hold it.
    #[inline]
    pub unsafe fn put<T>(self, value: T) -> PtrMut {
        unsafe {
            core::ptr::write(self.ptr.as_ptr::<T>(), value);
            self.assume_init()
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<PtrMut> for PtrConst {
    #[inline]
    fn from(p: PtrMut) -> Self {
        p.as_const()
    }
}

impl From<PtrMut> for PtrUninit {
    #[inline]
    fn from(p: PtrMut) -> Self {
        p.as_uninit()
    }
}

// ============================================================================
// Allocation Helpers
// ============================================================================

/// Allocates memory for a layout, correctly handling zero-sized types.
///
/// Zero-sized layouts get a dangling but aligned pointer and no allocation,
/// since `alloc::alloc::alloc` with a zero-sized layout is UB.
///
/// # Panics
///
/// Panics if allocation fails (calls `handle_alloc_error`).
pub fn alloc_for_layout(layout: Layout) -> PtrUninit {
    if layout.size() == 0 {
        PtrUninit::new(core::ptr::null_mut::<u8>().wrapping_byte_add(layout.align()))
    } else {
        // SAFETY: layout.size() > 0
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        if ptr.is_null() {
            alloc::alloc::handle_alloc_error(layout);
        }
        PtrUninit::new(ptr)
    }
}

/// Deallocates memory obtained from [`alloc_for_layout`].
///
/// # Safety
///
/// - For non-ZST layouts, `ptr` must have been allocated by [`alloc_for_layout`]
///   with the same layout.
/// - `ptr` must not have been deallocated already.
pub unsafe fn dealloc_for_layout(ptr: PtrUninit, layout: Layout) {
    if layout.size() == 0 {
        return;
    }
    unsafe { alloc::alloc::dealloc(ptr.as_mut_byte_ptr(), layout) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::MaybeUninit;

    #[rtti_testhelpers::test]
    fn field_offsets_land_on_members() {
        #[repr(C)]
        struct Pair {
            a: u32,
            b: u64,
        }
        let mut pair = Pair { a: 1, b: 2 };
        let ptr = PtrMut::from_mut(&mut pair);
        unsafe {
            *ptr.field(core::mem::offset_of!(Pair, b)).as_mut::<u64>() = 40;
            assert_eq!(*ptr.as_const().field(0).get::<u32>(), 1);
        }
        assert_eq!(pair.b, 40);
        assert_eq!(pair.a, 1);
    }

    #[rtti_testhelpers::test]
    fn put_then_read_moves_ownership() {
        let mut slot = MaybeUninit::<String>::uninit();
        let uninit = PtrUninit::from_maybe_uninit(&mut slot);
        let init = unsafe { uninit.put(String::from("moved")) };
        let back: String = unsafe { init.read() };
        assert_eq!(back, "moved");
    }

    #[rtti_testhelpers::test]
    fn zero_sized_allocation_is_dangling_and_aligned() {
        let layout = Layout::from_size_align(0, 8).unwrap();
        let ptr = alloc_for_layout(layout);
        assert_eq!(ptr.as_mut_byte_ptr() as usize % 8, 0);
        unsafe { dealloc_for_layout(ptr, layout) };
    }
}
