use core::ptr;

use insta::assert_snapshot;
use rtti::{MethodFlags, PtrMut, PtrUninit, RttiError, hash_name, reflect, type_of};

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl Point {
    fn set(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    fn length_squared(&self) -> i32 {
        self.x * self.x + self.y * self.y
    }

    fn x_ref(&self) -> &i32 {
        &self.x
    }

    fn origin() -> Point {
        Point::default()
    }

    fn add(a: &Point, b: &Point) -> Point {
        Point {
            x: a.x + b.x,
            y: a.y + b.y,
        }
    }
}

reflect!(struct Point as "Point" {
    properties { x, y }
    methods {
        fn set(&mut self, x: i32, y: i32);
        fn length_squared(&self) -> i32;
        fn x_ref(&self) -> &i32;
        fn origin() -> Point;
        fn add(a: &Point, b: &Point) -> Point;
        fn scaled(&self, k: i32) -> Point = |p: &Point, k: i32| Point { x: p.x * k, y: p.y * k };
        fn reset(&mut self) = |p: &mut Point| *p = Point::default();
        fn doubled_x(&self) -> i32 = |p: &Point| p.x * 2;
    }
});

#[derive(Default)]
#[repr(C)]
struct Counter {
    value: i32,
}

#[derive(Default)]
#[repr(C)]
struct LabeledCounter {
    base: Counter,
    label: String,
}

impl Counter {
    fn get(&self) -> i32 {
        self.value
    }

    fn bump(&mut self, by: i32) -> i32 {
        self.value += by;
        self.value
    }
}

reflect!(class Counter {
    methods {
        fn get(&self) -> i32;
        fn bump(&mut self, by: i32) -> i32;
    }
});
reflect!(class LabeledCounter: Counter(base) { properties { label } });

#[rtti_testhelpers::test]
fn method_metadata() {
    let ty = type_of::<Point>();
    assert_eq!(ty.methods().len(), 8);

    let set = ty.method("set").unwrap();
    assert_eq!(set.id(), hash_name("set"));
    assert_eq!(set.flags(), MethodFlags::empty());
    assert!(set.returns().declaration().is_void());
    assert_eq!(set.arguments().len(), 2);
    assert_eq!(set.arguments()[1].name(), "y");
    assert_eq!(set.owner(), ty);

    assert!(ty.method("length_squared").unwrap().is_const());
    assert!(ty.method("origin").unwrap().is_static());
    let scaled = ty.method("scaled").unwrap();
    assert!(scaled.is_lambda());
    assert!(scaled.is_const());
    assert!(ty.method_by_id(hash_name("reset")).unwrap().is_lambda());
    assert!(ty.method("missing").is_none());
}

#[rtti_testhelpers::test]
fn signatures() {
    let ty = type_of::<Point>();
    let signatures: Vec<String> = ty.methods().iter().map(|m| m.to_string()).collect();
    assert_snapshot!(signatures.join("\n"), @r"
    fn set(&mut self, x: i32, y: i32)
    fn length_squared(&self) -> i32
    fn x_ref(&self) -> &i32
    fn origin() -> Point
    fn add(a: &Point, b: &Point) -> Point
    fn scaled(&self, k: i32) -> Point
    fn reset(&mut self)
    fn doubled_x(&self) -> i32
    ");
}

#[rtti_testhelpers::test]
fn member_calls() {
    let ty = type_of::<Point>();
    let mut point = Point::default();

    ty.method("set")
        .unwrap()
        .call_method(&mut point, None::<&mut ()>, (3_i32, 4_i32));
    assert_eq!(point, Point { x: 3, y: 4 });

    let mut length = 0_i32;
    ty.method("length_squared")
        .unwrap()
        .call_method(&mut point, Some(&mut length), ());
    assert_eq!(length, 25);

    let length: i32 = ty.method("length_squared").unwrap().invoke_const(&point, ());
    assert_eq!(length, 25);
}

#[rtti_testhelpers::test]
fn references_come_back_as_pointers() {
    let point = Point { x: 8, y: 0 };
    let mut out: *const i32 = ptr::null();
    type_of::<Point>()
        .method("x_ref")
        .unwrap()
        .call_const_method(&point, Some(&mut out), ());
    assert!(ptr::eq(out, &point.x));
}

#[rtti_testhelpers::test]
fn static_calls() {
    let ty = type_of::<Point>();
    let origin: Point = ty.method("origin").unwrap().invoke_static(());
    assert_eq!(origin, Point::default());

    let a = Point { x: 1, y: 2 };
    let b = Point { x: 10, y: 20 };
    let mut sum = Point::default();
    ty.method("add")
        .unwrap()
        .call_static_method(Some(&mut sum), (&a, &b));
    assert_eq!(sum, Point { x: 11, y: 22 });
}

#[rtti_testhelpers::test]
fn closure_adapters_get_the_receiver_first() {
    let ty = type_of::<Point>();
    let mut point = Point { x: 1, y: -2 };

    let scaled: Point = ty.method("scaled").unwrap().invoke_const(&point, (3_i32,));
    assert_eq!(scaled, Point { x: 3, y: -6 });

    let () = ty.method("reset").unwrap().invoke(&mut point, ());
    assert_eq!(point, Point::default());
}

#[rtti_testhelpers::test]
fn closure_adapters_without_arguments_return_values() {
    let doubled_x = type_of::<Point>().method("doubled_x").unwrap();
    assert!(doubled_x.is_lambda());
    assert!(doubled_x.arguments().is_empty());

    let point = Point { x: 21, y: 5 };
    let mut out = 0_i32;
    doubled_x.call_const_method(&point, Some(&mut out), ());
    assert_eq!(out, point.x * 2);

    let direct: i32 = doubled_x.invoke_const(&point, ());
    assert_eq!(direct, point.x * 2);
}

#[rtti_testhelpers::test]
fn inherited_methods_run_on_derived_objects() {
    let mut counter = LabeledCounter::default();
    let ty = type_of::<LabeledCounter>();
    let bump = ty.method("bump").unwrap();
    assert_eq!(bump.owner(), type_of::<Counter>());

    let value: i32 = bump.invoke(&mut counter, (5_i32,));
    assert_eq!(value, 5);
    let value: i32 = ty.method("get").unwrap().invoke_const(&counter, ());
    assert_eq!(value, 5);
    assert_eq!(counter.base.value, 5);
}

#[rtti_testhelpers::test]
fn mismatches_are_reported() {
    let ty = type_of::<Point>();
    let mut point = Point::default();
    let set = ty.method("set").unwrap();

    let err = set
        .try_call_method(&mut point, None::<&mut ()>, (3_i64, 4_i32))
        .unwrap_err();
    assert!(matches!(err, RttiError::ArgumentType { index: 0, .. }));

    let err = set
        .try_call_method(&mut point, None::<&mut ()>, (3_i32,))
        .unwrap_err();
    assert!(matches!(
        err,
        RttiError::ArgumentCount {
            expected: 2,
            actual: 1,
            ..
        }
    ));

    let mut out = 0_i32;
    let err = set
        .try_call_method(&mut point, Some(&mut out), (3_i32, 4_i32))
        .unwrap_err();
    assert!(matches!(err, RttiError::UnexpectedReturnSlot { method: "set" }));

    let length = ty.method("length_squared").unwrap();
    let err = length
        .try_call_method(&mut point, None::<&mut ()>, ())
        .unwrap_err();
    assert!(matches!(err, RttiError::MissingReturnSlot { .. }));

    let mut wrong = 0_u64;
    let err = length
        .try_call_method(&mut point, Some(&mut wrong), ())
        .unwrap_err();
    assert!(matches!(err, RttiError::ReturnType { .. }));

    let err = set
        .try_call_const_method(&point, None::<&mut ()>, (1_i32, 2_i32))
        .unwrap_err();
    assert!(matches!(err, RttiError::ConstReceiver { method: "set" }));

    let err = ty
        .method("origin")
        .unwrap()
        .try_call_method(&mut point, Some(&mut Point::default()), ())
        .unwrap_err();
    assert!(matches!(err, RttiError::Receiver { is_static: true, .. }));

    let err = set
        .try_call_static_method(None::<&mut ()>, (1_i32, 2_i32))
        .unwrap_err();
    assert!(matches!(err, RttiError::Receiver { is_static: false, .. }));

    let mut counter = Counter::default();
    let err = set
        .try_call_method(&mut counter, None::<&mut ()>, (1_i32, 2_i32))
        .unwrap_err();
    assert!(matches!(err, RttiError::NotA { .. }));

    assert_eq!(point, Point::default());
}

#[rtti_testhelpers::test]
fn receiver_is_checked_before_arguments() {
    let err = type_of::<Point>()
        .method("set")
        .unwrap()
        .try_call_static_method(None::<&mut ()>, ())
        .unwrap_err();
    assert!(matches!(err, RttiError::Receiver { .. }));
}

#[rtti_testhelpers::test]
#[should_panic(expected = "argument 1 of set() must be of type i32, not u8")]
fn call_method_panics_on_mismatch() {
    let mut point = Point::default();
    type_of::<Point>()
        .method("set")
        .unwrap()
        .call_method(&mut point, None::<&mut ()>, (1_i32, 2_u8));
}

#[rtti_testhelpers::test]
fn unchecked_calls() {
    let ty = type_of::<Point>();
    let mut point = Point::default();
    let mut x = 6_i32;
    let mut y = 7_i32;
    unsafe {
        ty.method("set").unwrap().unsafe_call(
            Some(PtrMut::from_mut(&mut point)),
            None,
            &[PtrMut::from_mut(&mut x), PtrMut::from_mut(&mut y)],
        );
    }
    assert_eq!(point, Point { x: 6, y: 7 });

    let mut k = 2_i32;
    let mut out = core::mem::MaybeUninit::<Point>::uninit();
    let out = unsafe {
        ty.method("scaled").unwrap().unsafe_call(
            Some(PtrMut::from_mut(&mut point)),
            Some(PtrUninit::from_maybe_uninit(&mut out)),
            &[PtrMut::from_mut(&mut k)],
        );
        out.assume_init()
    };
    assert_eq!(out, Point { x: 12, y: 14 });
}

#[rtti_testhelpers::test]
#[should_panic(expected = "cannot provide a return slot to reset(), it returns void")]
fn unchecked_calls_still_check_the_return_slot() {
    let mut point = Point::default();
    let mut out = core::mem::MaybeUninit::<u8>::uninit();
    unsafe {
        type_of::<Point>().method("reset").unwrap().unsafe_call(
            Some(PtrMut::from_mut(&mut point)),
            Some(PtrUninit::from_maybe_uninit(&mut out)),
            &[],
        );
    }
}
