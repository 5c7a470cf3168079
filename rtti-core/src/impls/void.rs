use std::sync::OnceLock;

use crate::{Reflect, Type};

// SAFETY: `Type::void` describes `()`: no layout, no operations.
unsafe impl Reflect for () {
    fn type_of_forward() -> &'static Type {
        static VOID: OnceLock<Type> = OnceLock::new();
        VOID.get_or_init(Type::void)
    }
}
