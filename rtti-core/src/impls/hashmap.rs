use std::collections::HashMap;

crate::reflect!(template HashMap<K, V> as "HashMap" {
    methods {
        fn len(&self) -> usize;
        fn is_empty(&self) -> bool;
    }
});
