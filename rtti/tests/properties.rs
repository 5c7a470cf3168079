use core::mem::offset_of;
use core::ptr;

use rtti::{
    Indirection, PtrConst, PtrMut, RttiError, Type, declare, hash_name, reflect, type_of,
};

#[repr(C)]
struct Sample {
    int_value: i32,
    float_value: f32,
    int_ptr: *mut i32,
    floats: Vec<f32>,
}

reflect!(struct Sample as "Sample" {
    properties { int_value, float_value, int_ptr, floats }
});

struct Holder {
    int_value: i32,
    int_const_value: i32,
    int_ptr: *mut i32,
    int_const_ptr: *const i32,
    name: String,
}

impl Holder {
    fn new() -> Self {
        Self {
            int_value: 0,
            int_const_value: 0,
            int_ptr: ptr::null_mut(),
            int_const_ptr: ptr::null(),
            name: String::new(),
        }
    }
}

reflect!(struct Holder {
    properties { int_value, const int_const_value, int_ptr, int_const_ptr, name }
});

#[repr(C)]
struct Object {
    id: u32,
    object_ptr: *mut Object,
    foo_ptr: *mut Foo,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            id: 0,
            object_ptr: ptr::null_mut(),
            foo_ptr: ptr::null_mut(),
        }
    }
}

#[derive(Default)]
#[repr(C)]
struct Foo {
    base: Object,
    tag: u8,
}

#[derive(Default)]
#[repr(C)]
struct Doo {
    base: Foo,
}

reflect!(class Object { properties { id, object_ptr, foo_ptr } });
reflect!(class Foo: Object(base) { properties { tag } });
reflect!(class Doo: Foo(base) {});

#[rtti_testhelpers::test]
fn offsets_and_declarations() {
    let ty = type_of::<Sample>();
    let names: Vec<_> = ty.properties().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["int_value", "float_value", "int_ptr", "floats"]);

    let int_value = ty.property("int_value").unwrap();
    assert_eq!(int_value.offset(), offset_of!(Sample, int_value));
    assert_eq!(int_value.id(), hash_name("int_value"));
    assert_eq!(int_value.owner(), ty);
    assert_eq!(*int_value.declaration(), declare::<i32>());

    let float_value = ty.property("float_value").unwrap();
    assert_eq!(float_value.offset(), offset_of!(Sample, float_value));
    assert_eq!(float_value.declaration().ty(), type_of::<f32>());

    let int_ptr = ty.property("int_ptr").unwrap();
    assert_eq!(int_ptr.offset(), offset_of!(Sample, int_ptr));
    assert_eq!(int_ptr.declaration().indirection(), Indirection::Pointer);
    assert!(!int_ptr.declaration().is_const());
    assert_eq!(int_ptr.declaration().ty(), type_of::<i32>());

    let floats = ty.property("floats").unwrap();
    assert_eq!(floats.offset(), offset_of!(Sample, floats));
    assert_eq!(floats.declaration().ty(), type_of::<Vec<f32>>());
    assert_eq!(floats.declaration().ty().name(), "Vec<f32>");
}

#[rtti_testhelpers::test]
fn field_pointers() {
    let mut sample = Sample {
        int_value: 1,
        float_value: 2.0,
        int_ptr: ptr::null_mut(),
        floats: vec![1.0],
    };
    let floats = type_of::<Sample>().property("floats").unwrap();
    let field = unsafe { floats.field_ptr(PtrConst::from_ref(&sample)) };
    assert_eq!(field.as_ptr::<Vec<f32>>(), &sample.floats as *const Vec<f32>);

    let field = unsafe { floats.field_ptr_mut(PtrMut::from_mut(&mut sample)) };
    unsafe { field.as_mut::<Vec<f32>>().push(2.0) };
    assert_eq!(sample.floats, [1.0, 2.0]);
}

#[rtti_testhelpers::test]
fn value_properties() {
    let ty = type_of::<Holder>();
    let mut holder = Holder::new();

    let int_value = ty.property("int_value").unwrap();
    int_value.set(&mut holder, 12_i32);
    assert_eq!(holder.int_value, 12);
    assert_eq!(int_value.get::<_, i32>(&holder), 12);

    let int_const_value = ty.property("int_const_value").unwrap();
    assert!(int_const_value.declaration().is_const());
    int_const_value.set(&mut holder, 12_i32);
    assert_eq!(int_const_value.get::<_, i32>(&holder), 12);

    let name = ty.property("name").unwrap();
    name.set(&mut holder, String::from("door"));
    assert_eq!(name.get_ref::<_, String>(&holder), "door");
    assert_eq!(name.get::<_, String>(&holder), "door");
}

#[rtti_testhelpers::test]
fn pointer_properties() {
    let ty = type_of::<Holder>();
    let mut holder = Holder::new();
    let mut target = 12_i32;

    let int_ptr = ty.property("int_ptr").unwrap();
    assert!(!int_ptr.declaration().is_const());
    int_ptr.set(&mut holder, &mut target as *mut i32);
    assert!(ptr::eq(holder.int_ptr, &target));
    assert!(ptr::eq(int_ptr.get::<_, *mut i32>(&holder), &target));
    // a mutable pointer reads back as a const one
    assert!(ptr::eq(int_ptr.get::<_, *const i32>(&holder), &target));

    let int_const_ptr = ty.property("int_const_ptr").unwrap();
    assert!(int_const_ptr.declaration().is_const());
    int_const_ptr.set(&mut holder, &target as *const i32);
    assert!(ptr::eq(holder.int_const_ptr, &target));
    int_const_ptr.set(&mut holder, &mut target as *mut i32);
    assert!(ptr::eq(int_const_ptr.get::<_, *const i32>(&holder), &target));
}

#[rtti_testhelpers::test]
fn mismatched_values_are_rejected() {
    let ty = type_of::<Holder>();
    let mut holder = Holder::new();
    let target = 1_i32;

    let int_value = ty.property("int_value").unwrap();
    let err = int_value.try_set(&mut holder, 1_i64).unwrap_err();
    assert!(matches!(err, RttiError::PropertyType { property: "int_value", .. }));
    assert!(int_value.try_get::<_, u32>(&holder).is_err());

    let int_ptr = ty.property("int_ptr").unwrap();
    assert!(int_ptr.try_set(&mut holder, &target as *const i32).is_err());
    assert!(int_ptr.try_set(&mut holder, 5_i32).is_err());
    assert!(holder.int_ptr.is_null());

    let int_const_ptr = ty.property("int_const_ptr").unwrap();
    assert!(int_const_ptr.try_get::<_, *mut i32>(&holder).is_err());
    assert!(int_const_ptr.try_get_ref::<_, i32>(&holder).is_err());
}

#[rtti_testhelpers::test]
fn objects_must_own_the_property() {
    let ty = type_of::<Holder>();
    let mut sample = Sample {
        int_value: 0,
        float_value: 0.0,
        int_ptr: ptr::null_mut(),
        floats: Vec::new(),
    };
    let err = ty
        .property("int_value")
        .unwrap()
        .try_set(&mut sample, 3_i32)
        .unwrap_err();
    let RttiError::NotA { expected, actual } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(expected, ty);
    assert_eq!(actual, type_of::<Sample>());
    assert_eq!(sample.int_value, 0);
}

#[rtti_testhelpers::test]
#[should_panic(expected = "property int_value is declared as i32, not f64")]
fn set_panics_on_mismatch() {
    let mut holder = Holder::new();
    type_of::<Holder>()
        .property("int_value")
        .unwrap()
        .set(&mut holder, 1.0_f64);
}

#[rtti_testhelpers::test]
fn polymorphic_pointer_properties() {
    let object_ty = type_of::<Object>();
    let object_ptr = object_ty.property("object_ptr").unwrap();
    let foo_ptr = object_ty.property("foo_ptr").unwrap();
    assert_eq!(object_ptr.declaration().ty(), object_ty);
    assert_eq!(foo_ptr.declaration().ty(), type_of::<Foo>());

    let mut object = Object::default();
    let mut foo = Foo::default();
    let mut doo = Doo::default();

    // anything deriving from the pointee fits
    object_ptr.set(&mut object, &mut foo as *mut Foo);
    assert!(ptr::eq(object.object_ptr, &foo.base));
    object_ptr.set(&mut object, &mut doo as *mut Doo);
    assert!(ptr::eq(object.object_ptr, &doo.base.base));
    foo_ptr.set(&mut object, &mut doo as *mut Doo);
    assert!(ptr::eq(object.foo_ptr, &doo.base));

    // a base does not
    let mut other = Object::default();
    assert!(foo_ptr.try_set(&mut object, &mut other as *mut Object).is_err());

    // derived objects expose inherited properties
    let inherited = type_of::<Doo>().property("object_ptr").unwrap();
    assert_eq!(inherited.owner(), object_ty);
    inherited.set(&mut doo, &mut other as *mut Object);
    assert!(ptr::eq(doo.base.base.object_ptr, &other));

    // pointers read back as pointers to an ancestor, never a descendant
    let read: *mut Object = foo_ptr.get(&object);
    assert!(ptr::eq(read, &doo.base.base));
    assert!(foo_ptr.try_get::<_, *mut Doo>(&object).is_err());
}

#[rtti_testhelpers::test]
fn properties_are_found_by_name_and_id() {
    let ty: &Type = type_of::<Doo>();
    assert!(ty.property("tag").is_some());
    assert!(ty.property_by_id(hash_name("foo_ptr")).is_some());
    assert!(ty.property_by_id(hash_name("nope")).is_none());
    assert!(ty.properties().is_empty());
}
