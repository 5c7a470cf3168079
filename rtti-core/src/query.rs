//! IsA queries and checked casts along the parent chain.

use crate::{Polymorphic, Reflect, Type};

/// Whether `ty` is `base` or derives from it.
///
/// Compares with [`Type::is_same`], so a forward placeholder `is_a` its own
/// finished descriptor.
pub fn is_a(ty: &Type, base: &Type) -> bool {
    ty.ancestors().any(|ancestor| ancestor.is_same(base))
}

/// Whether `T` is `B` or derives from it.
#[inline]
pub fn is_a_typed<T: Reflect, B: Reflect>() -> bool {
    is_a(T::type_of(), B::type_of())
}

/// Whether the dynamic type of `value` is `B` or derives from it.
#[inline]
pub fn instance_is_a<B: Reflect, T: Polymorphic + ?Sized>(value: &T) -> bool {
    is_a(value.dyn_type(), B::type_of())
}

/// Views `value` as a `B` when its dynamic type is `B` or derives from it.
///
/// `None` in, `None` out. Relies on every derived type embedding its base
/// at offset 0, which the registration macro checks at compile time.
pub fn cast<B: Reflect, T: Polymorphic + ?Sized>(value: Option<&T>) -> Option<&B> {
    let value = value?;
    if !instance_is_a::<B, T>(value) {
        return None;
    }
    // SAFETY: the concrete value starts with a `B`.
    Some(unsafe { &*(value as *const T as *const B) })
}

/// Mutable version of [`cast`].
pub fn cast_mut<B: Reflect, T: Polymorphic + ?Sized>(value: Option<&mut T>) -> Option<&mut B> {
    let value = value?;
    if !instance_is_a::<B, T>(value) {
        return None;
    }
    // SAFETY: see `cast`.
    Some(unsafe { &mut *(value as *mut T as *mut B) })
}
