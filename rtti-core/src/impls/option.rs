crate::reflect!(template Option<T> as "Option" {
    methods {
        fn is_some(&self) -> bool;
        fn is_none(&self) -> bool;
    }
});

#[cfg(test)]
mod tests {
    use crate::{Kind, type_of};

    #[rtti_testhelpers::test]
    fn instantiations_are_distinct() {
        let a = type_of::<Option<i32>>();
        let b = type_of::<Option<u8>>();
        assert_eq!(a.kind(), Kind::Template);
        assert_eq!(a.name(), "Option<i32>");
        assert_ne!(a, b);
        assert_eq!(a.templates().len(), 1);
        assert_eq!(a.templates()[0].ty(), type_of::<i32>());
    }

    #[rtti_testhelpers::test]
    fn methods_dispatch_on_the_instantiation() {
        let ty = type_of::<Option<i32>>();
        let is_some = ty.method("is_some").unwrap();
        assert!(is_some.is_const());
        let value = Some(3);
        assert!(is_some.invoke_const::<_, bool, _>(&value, ()));
        assert!(!is_some.invoke_const::<_, bool, _>(&None::<i32>, ()));
    }
}
