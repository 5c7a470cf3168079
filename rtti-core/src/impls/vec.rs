use alloc::vec::Vec;

crate::reflect!(template Vec<T> as "Vec" {
    methods {
        fn len(&self) -> usize;
        fn is_empty(&self) -> bool;
    }
});
