use rtti::{
    Access, Accessibility, Attribute, AttributeBase, Polymorphic, cast, cast_mut, reflect,
    type_of,
};

#[derive(Default, Clone)]
#[repr(C)]
struct Shape {
    sides: u32,
}

#[derive(Default, Clone)]
#[repr(C)]
struct Square {
    base: Shape,
    length: f32,
}

#[derive(Default, Clone)]
#[repr(C)]
struct Tile {
    base: Square,
    color: u32,
}

#[derive(Default, Clone)]
struct Unrelated;

reflect!(class Shape { properties { sides } });
reflect!(class Square: Shape(base) { properties { length } });
reflect!(class Tile: Square(base) { properties { color } });
reflect!(struct Unrelated {});

#[rtti_testhelpers::test]
fn upcasts_succeed() {
    let tile = Tile {
        base: Square {
            base: Shape { sides: 4 },
            length: 2.0,
        },
        color: 7,
    };
    let shape = cast::<Shape, _>(Some(&tile)).unwrap();
    assert_eq!(shape.sides, 4);
    let square = cast::<Square, _>(Some(&tile)).unwrap();
    assert_eq!(square.length, 2.0);
}

#[rtti_testhelpers::test]
fn downcasts_through_dyn_follow_the_dynamic_type() {
    let tile = Tile::default();
    let erased: &dyn Polymorphic = &tile;
    assert!(cast::<Tile, _>(Some(erased)).is_some());
    assert!(cast::<Square, _>(Some(erased)).is_some());
    assert!(cast::<Unrelated, _>(Some(erased)).is_none());

    let square = Square::default();
    let erased: &dyn Polymorphic = &square;
    assert!(cast::<Tile, _>(Some(erased)).is_none());
    assert!(cast::<Shape, _>(Some(erased)).is_some());
}

#[rtti_testhelpers::test]
fn none_casts_to_none() {
    assert!(cast::<Shape, Tile>(None).is_none());
    assert!(cast_mut::<Shape, Tile>(None).is_none());
}

#[rtti_testhelpers::test]
fn mutable_casts_write_through() {
    let mut tile = Tile::default();
    cast_mut::<Shape, _>(Some(&mut tile)).unwrap().sides = 6;
    assert_eq!(tile.base.base.sides, 6);
    assert!(cast_mut::<Unrelated, _>(Some(&mut tile)).is_none());
}

#[rtti_testhelpers::test]
fn attributes_cast_through_the_attribute_hierarchy() {
    let attr: Box<dyn Attribute> = Box::new(Accessibility::new(Access::Protected));
    assert_eq!(attr.dyn_type(), type_of::<Accessibility>());
    assert_eq!(
        cast::<Accessibility, dyn Attribute>(Some(attr.as_ref()))
            .unwrap()
            .access,
        Access::Protected
    );
    assert!(cast::<AttributeBase, dyn Attribute>(Some(attr.as_ref())).is_some());
    assert!(cast::<Shape, dyn Attribute>(Some(attr.as_ref())).is_none());

    let plain: Box<dyn Attribute> = Box::new(AttributeBase);
    assert!(cast::<Accessibility, dyn Attribute>(Some(plain.as_ref())).is_none());
}
