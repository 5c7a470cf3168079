//! Helpers called from the invocation thunks generated by
//! [`reflect!`](crate::reflect).
//!
//! A thunk receives an optional receiver, an optional return slot and a slice
//! of argument slots. The checked call paths on [`Method`](crate::Method)
//! validate all of them before the thunk runs; the assertions here only catch
//! contract violations coming through [`Method::unsafe_call`](crate::Method::unsafe_call).

use crate::{Declare, PtrMut, PtrUninit, rtti_assert};

/// Asserts that exactly `arity` argument slots were passed.
#[inline]
#[track_caller]
pub fn expect_arity(args: &[PtrMut], arity: usize) {
    rtti_assert!(
        args.len() == arity,
        "argument count mismatch: expected {arity}, got {}",
        args.len()
    );
}

/// Asserts that a static function was called without a receiver.
#[inline]
#[track_caller]
pub fn expect_static(object: Option<PtrMut>) {
    rtti_assert!(object.is_none(), "static function called on an object");
}

/// Borrows the receiver of a `&self` method.
///
/// # Safety
/// `object` must point to a live `S` that is not mutably borrowed elsewhere.
#[inline]
#[track_caller]
pub unsafe fn receiver_ref<'a, S>(object: Option<PtrMut>) -> &'a S {
    let Some(object) = object else {
        crate::__rtti_assert_failed(format_args!("member function called without an object"))
    };
    unsafe { object.get::<S>() }
}

/// Borrows the receiver of a `&mut self` method.
///
/// # Safety
/// `object` must point to a live `S` that is not borrowed elsewhere.
#[inline]
#[track_caller]
pub unsafe fn receiver_mut<'a, S>(object: Option<PtrMut>) -> &'a mut S {
    let Some(object) = object else {
        crate::__rtti_assert_failed(format_args!("member function called without an object"))
    };
    unsafe { object.as_mut::<S>() }
}

/// Moves the next argument out of its slot.
///
/// # Safety
/// The slot must hold a live `A`, which the caller must not use again.
#[inline]
#[track_caller]
pub unsafe fn next_argument<A>(args: &mut impl Iterator<Item = PtrMut>) -> A {
    let Some(slot) = args.next() else {
        crate::__rtti_assert_failed(format_args!("not enough arguments"))
    };
    unsafe { slot.read::<A>() }
}

/// Stores a function result into the return slot.
///
/// Functions returning `()` must get no slot, everything else must get one.
/// References are stored as raw pointers.
///
/// # Safety
/// `ret` must be valid for writes of `R::Returned`.
#[inline]
#[track_caller]
pub unsafe fn store_return<R: Declare>(ret: Option<PtrUninit>, value: R) {
    if R::IS_VOID {
        rtti_assert!(ret.is_none(), "return slot provided for a function returning void");
        return;
    }
    let Some(ret) = ret else {
        crate::__rtti_assert_failed(format_args!("missing return slot"))
    };
    unsafe {
        ret.put(value.into_returned());
    }
}
