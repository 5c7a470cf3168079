use std::collections::HashMap;

use rtti::{Kind, Reflect, RttiError, reflect, type_of};

#[derive(Default)]
struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    fn push(&mut self, item: T) {
        self.items.push(item);
    }

    fn depth(&self) -> usize {
        self.items.len()
    }
}

reflect!(template Stack<T> {
    methods {
        fn push(&mut self, item: T);
        fn depth(&self) -> usize;
    }
});

#[derive(Debug, Default, Clone, PartialEq)]
struct Pair<A, B> {
    first: A,
    second: B,
}

reflect!(template Pair<A, B>: Clone as "Pair" {
    properties { first, second }
});

#[rtti_testhelpers::test]
fn one_descriptor_per_instantiation() {
    let ints = type_of::<Stack<i32>>();
    let strings = type_of::<Stack<String>>();
    assert_ne!(ints, strings);
    assert!(core::ptr::eq(ints, Stack::<i32>::type_of()));
    assert_eq!(ints.kind(), Kind::Template);
    assert_eq!(ints.name(), concat!(module_path!(), "::Stack<i32>"));
    assert_eq!(strings.name(), concat!(module_path!(), "::Stack<String>"));
    assert_eq!(ints.templates().len(), 1);
    assert_eq!(ints.templates()[0].ty(), type_of::<i32>());
}

#[rtti_testhelpers::test]
fn generic_methods() {
    let ty = type_of::<Stack<String>>();
    let mut stack = Stack::<String>::default();
    let push = ty.method("push").unwrap();
    assert_eq!(push.arguments()[0].declaration().ty(), type_of::<String>());

    push.call_method(&mut stack, None::<&mut ()>, (String::from("a"),));
    push.call_method(&mut stack, None::<&mut ()>, (String::from("b"),));
    assert_eq!(stack.items, ["a", "b"]);

    let depth: usize = ty.method("depth").unwrap().invoke_const(&stack, ());
    assert_eq!(depth, 2);
    assert!(push.try_invoke::<_, (), _>(&mut stack, (1_i32,)).is_err());
}

#[rtti_testhelpers::test]
fn generic_properties() {
    let ty = type_of::<Pair<u8, Vec<i64>>>();
    assert_eq!(ty.name(), "Pair<u8, Vec<i64>>");
    assert_eq!(ty.templates().len(), 2);

    let mut pair = Pair::<u8, Vec<i64>>::default();
    ty.property("first").unwrap().set(&mut pair, 7_u8);
    ty.property("second").unwrap().set(&mut pair, vec![1_i64, 2]);
    assert_eq!(pair.first, 7);
    assert_eq!(pair.second, [1, 2]);
    assert_eq!(
        ty.property("second").unwrap().declaration().ty(),
        type_of::<Vec<i64>>()
    );
}

#[rtti_testhelpers::test]
fn std_containers() {
    assert_eq!(type_of::<Option<u32>>().name(), "Option<u32>");
    let is_some = type_of::<Option<u32>>().method("is_some").unwrap();
    let yes: bool = is_some.invoke_const(&Some(3_u32), ());
    let no: bool = is_some.invoke_const(&None::<u32>, ());
    assert!(yes);
    assert!(!no);

    let map_ty = type_of::<HashMap<String, i64>>();
    let mut map = HashMap::new();
    map.insert(String::from("k"), 1_i64);
    let len: usize = map_ty.method("len").unwrap().invoke_const(&map, ());
    assert_eq!(len, 1);
}

#[rtti_testhelpers::test]
fn clone_is_opt_in() {
    let stack = type_of::<Stack<i32>>();
    assert!(stack.has_construct());
    assert!(!stack.has_copy_construct());

    let ty = type_of::<Pair<u8, Vec<i64>>>();
    assert!(ty.has_copy_construct());
    let pair = Pair {
        first: 3_u8,
        second: vec![4_i64, 5],
    };
    let copy = ty.new_copy(&pair);
    assert_eq!(*copy, pair);
}

mod shelf {
    #[derive(Default)]
    pub struct Stack<T> {
        pub top: T,
    }

    rtti::reflect!(template Stack<T> { properties { top } });

    #[derive(Default)]
    pub struct Slot<T> {
        pub value: T,
    }

    rtti::reflect!(template Slot<T> as "Slot" { properties { value } });
}

mod pile {
    #[derive(Default)]
    pub struct Stack<T> {
        pub items: Vec<T>,
    }

    rtti::reflect!(template Stack<T> { properties { items } });

    #[derive(Default)]
    pub struct Slot<T> {
        pub values: Vec<T>,
    }

    rtti::reflect!(template Slot<T> as "Slot" { properties { values } });
}

#[derive(Default)]
struct Storage {
    stack: shelf::Stack<u64>,
    slot: shelf::Slot<u64>,
}

reflect!(struct Storage { properties { stack, slot } });

#[rtti_testhelpers::test]
fn same_named_templates_in_different_modules_are_distinct() {
    let shelf = type_of::<shelf::Stack<u64>>();
    let pile = type_of::<pile::Stack<u64>>();
    assert!(shelf.name().ends_with("shelf::Stack<u64>"));
    assert!(pile.name().ends_with("pile::Stack<u64>"));
    assert_ne!(shelf, pile);

    let mut storage = Storage::default();
    let err = type_of::<Storage>()
        .property("stack")
        .unwrap()
        .try_set(&mut storage, pile::Stack::<u64>::default())
        .unwrap_err();
    assert!(matches!(err, RttiError::PropertyType { property: "stack", .. }));
}

#[rtti_testhelpers::test]
fn display_names_do_not_make_types_interchangeable() {
    let shelf = type_of::<shelf::Slot<u64>>();
    let pile = type_of::<pile::Slot<u64>>();
    assert_eq!(shelf.name(), "Slot<u64>");
    assert_eq!(shelf, pile);
    assert!(!shelf.is_same(pile));

    let mut storage = Storage::default();
    let slot = type_of::<Storage>().property("slot").unwrap();
    let err = slot
        .try_set(&mut storage, pile::Slot::<u64> { values: vec![1, 2, 3] })
        .unwrap_err();
    assert!(matches!(err, RttiError::PropertyType { property: "slot", .. }));
    assert!(slot.try_set(&mut storage, shelf::Slot { value: 9_u64 }).is_ok());
    assert_eq!(storage.slot.value, 9);
}
