use alloc::{boxed::Box, format, string::String, vec::Vec};

use crate::Declaration;

/// Registers a type: implements [`Reflect`](crate::Reflect),
/// [`Declare`](crate::Declare) and, for structs and classes,
/// [`Polymorphic`](crate::Polymorphic).
///
/// One item per invocation:
///
/// ```ignore
/// // a plain value type
/// reflect!(struct Point as "Point" {
///     properties { x, y }
///     methods {
///         fn set(&mut self, x: i32, y: i32);
///         fn length_squared(&self) -> i32;
///         fn origin() -> Point;
///         fn scaled(&self, k: i32) -> Point = |p: &Point, k: i32| Point { x: p.x * k, y: p.y * k };
///     }
/// });
///
/// // a polymorphic root and a type deriving from it; the base must be the
/// // first field of a `#[repr(C)]` struct
/// reflect!(class Object {});
/// reflect!(#[attributes(Accessibility::new(Access::Public))]
///          class Door: Object(base) { properties { const width, #[attributes(Tooltip::new("open?"))] open } });
///
/// // primitives and opaque types
/// reflect!(pod Uuid as "Uuid");
///
/// // fieldless enums
/// reflect!(enum Color: u8 { Red, Green, Blue });
///
/// // generic types, one descriptor per instantiation, named after the
/// // module path unless a display name is given
/// reflect!(template Stack<T> { methods { fn len(&self) -> usize; } });
///
/// // copy construction for generic types is opt-in, and restricts the
/// // registration to `Clone` instantiations
/// reflect!(template Pair<A, B>: Clone as "Pair" { properties { first, second } });
/// ```
///
/// Lambda adapters receive the receiver as their first parameter; annotate
/// their parameter types.
#[macro_export]
macro_rules! reflect {
    (
        $(#[attributes($($tattr:expr),* $(,)?)])?
        struct $name:ident $(as $display:literal)? { $($body:tt)* }
    ) => {
        $crate::__rtti_record! {
            kind = Struct,
            name = $name,
            display = [$($display)?],
            attributes = [$($($tattr),*)?],
            parent = [],
            body = { $($body)* }
        }
    };
    (
        $(#[attributes($($tattr:expr),* $(,)?)])?
        class $name:ident : $base:ident ( $field:ident ) $(as $display:literal)? { $($body:tt)* }
    ) => {
        const _: () = ::core::assert!(
            ::core::mem::offset_of!($name, $field) == 0,
            ::core::concat!(
                ::core::stringify!($name), " must embed ",
                ::core::stringify!($base), " as its first field"
            )
        );
        const _: fn(&$name) -> &$base = |derived| &derived.$field;

        $crate::__rtti_record! {
            kind = Class,
            name = $name,
            display = [$($display)?],
            attributes = [$($($tattr),*)?],
            parent = [$base],
            body = { $($body)* }
        }
    };
    (
        $(#[attributes($($tattr:expr),* $(,)?)])?
        class $name:ident $(as $display:literal)? { $($body:tt)* }
    ) => {
        $crate::__rtti_record! {
            kind = Class,
            name = $name,
            display = [$($display)?],
            attributes = [$($($tattr),*)?],
            parent = [],
            body = { $($body)* }
        }
    };
    (pod $ty:ty $(as $display:literal)?) => {
        // SAFETY: built by `Type::builder::<Self>` from the type's own layout.
        unsafe impl $crate::Reflect for $ty {
            fn type_of_forward() -> &'static $crate::Type {
                static CELL: $crate::TypeCell = $crate::TypeCell::new();
                let name: &'static str = $crate::__rtti_name!(Self; $($display)?);
                CELL.get_or_init(
                    || $crate::Type::forward(name, <Self as $crate::Reflect>::type_of_forward),
                    || {
                        let builder = unsafe { $crate::Type::builder::<Self>($crate::Kind::Pod) };
                        builder
                            .name(name)
                            .ops($crate::type_ops!(Self))
                            .build()
                    },
                )
            }
        }

        $crate::__rtti_declare!($ty);
    };
    (
        $(#[attributes($($tattr:expr),* $(,)?)])?
        enum $name:ident : $repr:ty { $($variant:ident),* $(,)? }
    ) => {
        unsafe impl $crate::Reflect for $name {
            fn type_of_forward() -> &'static $crate::Type {
                static CELL: $crate::TypeCell = $crate::TypeCell::new();
                let name: &'static str = $crate::__rtti_name!(Self;);
                CELL.get_or_init(
                    || $crate::Type::forward(name, <Self as $crate::Reflect>::type_of_forward),
                    || {
                        let builder = unsafe { $crate::Type::builder::<Self>($crate::Kind::Enum) };
                        builder
                            .name(name)
                            .ops($crate::type_ops!(Self))
                            .enumeration($crate::EnumInfo::new(
                                ::core::concat!($(::core::stringify!($variant), ","),*),
                                ::std::vec![$(Self::$variant as $repr as i64),*],
                                <$repr as $crate::Reflect>::type_of_forward,
                            ))
                            .attributes($crate::attributes![$($($tattr),*)?])
                            .build()
                    },
                )
            }
        }

        $crate::__rtti_declare!($name);
    };
    (
        $(#[attributes($($tattr:expr),* $(,)?)])?
        template $name:ident < $($param:ident),+ > : Clone $(as $display:literal)? { $($body:tt)* }
    ) => {
        $crate::__rtti_template! {
            name = $name,
            params = [$($param),+],
            clone = [Clone],
            display = [$($display)?],
            attributes = [$($($tattr),*)?],
            body = { $($body)* }
        }
    };
    (
        $(#[attributes($($tattr:expr),* $(,)?)])?
        template $name:ident < $($param:ident),+ > $(as $display:literal)? { $($body:tt)* }
    ) => {
        $crate::__rtti_template! {
            name = $name,
            params = [$($param),+],
            clone = [],
            display = [$($display)?],
            attributes = [$($($tattr),*)?],
            body = { $($body)* }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_name {
    ($ty:ty;) => {
        ::core::any::type_name::<$ty>()
    };
    ($ty:ty; $display:literal) => {
        $display
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_ret {
    () => { () };
    ($ret:ty) => { $ret };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_count {
    ($($arg:ident)*) => {
        <[&str]>::len(&[$(::core::stringify!($arg)),*])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_declare {
    ($ty:ty) => {
        unsafe impl $crate::Declare for $ty {
            const DECLARATION: $crate::Declaration = $crate::Declaration::value::<Self>();
            type Returned = Self;

            #[inline]
            fn into_returned(self) -> Self {
                self
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_record {
    (
        kind = $kind:ident,
        name = $name:ident,
        display = [$($display:literal)?],
        attributes = [$($tattr:expr),*],
        parent = [$($base:ident)?],
        body = {
            $(properties { $($props:tt)* })?
            $(methods { $($methods:tt)* })?
        }
    ) => {
        unsafe impl $crate::Reflect for $name {
            fn type_of_forward() -> &'static $crate::Type {
                static CELL: $crate::TypeCell = $crate::TypeCell::new();
                let name: &'static str = $crate::__rtti_name!(Self; $($display)?);
                CELL.get_or_init(
                    || $crate::Type::forward(name, <Self as $crate::Reflect>::type_of_forward),
                    || {
                        #[allow(unused_mut)]
                        let mut properties = ::std::vec::Vec::new();
                        $( $crate::__rtti_properties!(properties; $($props)*); )?
                        #[allow(unused_mut)]
                        let mut methods = ::std::vec::Vec::new();
                        $( $crate::__rtti_methods!(methods; $($methods)*); )?

                        // SAFETY: the parent is checked to sit at offset 0, and
                        // the members were generated from `Self`'s fields and
                        // methods.
                        let builder = unsafe { $crate::Type::builder::<Self>($crate::Kind::$kind) };
                        builder
                            .name(name)
                            .ops($crate::type_ops!(Self))
                            $( .parent(<$base as $crate::Reflect>::type_of_forward) )?
                            .properties(properties)
                            .methods(methods)
                            .attributes($crate::attributes![$($tattr),*])
                            .build()
                    },
                )
            }
        }

        $crate::__rtti_declare!($name);

        unsafe impl $crate::Polymorphic for $name {
            #[inline]
            fn dyn_type(&self) -> &'static $crate::Type {
                <Self as $crate::Reflect>::type_of()
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_template {
    (
        name = $name:ident,
        params = [$($param:ident),+],
        clone = [$($clone:ident)?],
        display = [$($display:literal)?],
        attributes = [$($tattr:expr),*],
        body = {
            $(properties { $($props:tt)* })?
            $(methods { $($methods:tt)* })?
        }
    ) => {
        unsafe impl<$($param: $crate::Reflect + $crate::Declare),+> $crate::Reflect for $name<$($param),+>
        $(where Self: $clone)?
        {
            fn type_of_forward() -> &'static $crate::Type {
                let base: &'static str = $crate::__rtti_template_base!($name; $($display)?);
                let arguments = || ::std::vec![$($crate::Declaration::value::<$param>()),+];
                $crate::generic_type_of::<Self>(
                    || {
                        let name = $crate::__template_name(base, &arguments());
                        $crate::Type::forward(name, <Self as $crate::Reflect>::type_of_forward)
                    },
                    || {
                        let templates = arguments();
                        let name = $crate::__template_name(base, &templates);
                        #[allow(unused_mut)]
                        let mut properties = ::std::vec::Vec::new();
                        $( $crate::__rtti_properties!(properties; $($props)*); )?
                        #[allow(unused_mut)]
                        let mut methods = ::std::vec::Vec::new();
                        $( $crate::__rtti_methods!(methods; $($methods)*); )?

                        let builder = unsafe { $crate::Type::builder::<Self>($crate::Kind::Template) };

                        builder
                            .name(name)
                            .ops({
                                let ops = $crate::type_ops!(Self);
                                $( let ops = $crate::type_ops!(@with ops, Self, $clone); )?
                                ops
                            })
                            .templates(templates)
                            .properties(properties)
                            .methods(methods)
                            .attributes($crate::attributes![$($tattr),*])
                            .build()
                    },
                )
            }
        }

        unsafe impl<$($param: $crate::Reflect + $crate::Declare),+> $crate::Declare for $name<$($param),+>
        $(where Self: $clone)?
        {
            const DECLARATION: $crate::Declaration = $crate::Declaration::value::<Self>();
            type Returned = Self;

            #[inline]
            fn into_returned(self) -> Self {
                self
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_template_base {
    ($name:ident;) => {
        ::core::concat!(::core::module_path!(), "::", ::core::stringify!($name))
    };
    ($name:ident; $display:literal) => {
        $display
    };
}

/// Name of a generic instantiation: `path::to::Base<Arg1, Arg2>`, or
/// `Display<Arg1, Arg2>` with an explicit display name. Leaked, since
/// descriptors live forever.
#[doc(hidden)]
pub fn __template_name(base: &str, arguments: &[Declaration]) -> &'static str {
    let arguments: Vec<String> = arguments.iter().map(|arg| format!("{arg}")).collect();
    let name = format!("{base}<{}>", arguments.join(", "));
    Box::leak(name.into_boxed_str())
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_properties {
    ($list:ident;) => {};
    (
        $list:ident;
        $(#[attributes($($attr:expr),* $(,)?)])?
        const $field:ident
        $(, $($rest:tt)*)?
    ) => {
        $list.push($crate::__rtti_property!($field, true, [$($($attr),*)?]));
        $crate::__rtti_properties!($list; $($($rest)*)?);
    };
    (
        $list:ident;
        $(#[attributes($($attr:expr),* $(,)?)])?
        $field:ident
        $(, $($rest:tt)*)?
    ) => {
        $list.push($crate::__rtti_property!($field, false, [$($($attr),*)?]));
        $crate::__rtti_properties!($list; $($($rest)*)?);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_property {
    ($field:ident, $is_const:literal, [$($attr:expr),*]) => {
        {
            let declaration = $crate::declaration_of(&|this: &Self| &this.$field);
            // SAFETY: offset and declaration both come from the field itself.
            let property = unsafe {
                $crate::Property::new(
                    ::core::stringify!($field),
                    ::core::mem::offset_of!(Self, $field),
                    declaration.with_const(declaration.is_const() || $is_const),
                    <Self as $crate::Reflect>::type_of_forward,
                )
            };
            property.with_attributes($crate::attributes![$($attr),*])
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_methods {
    ($list:ident;) => {};
    // fn name(&mut self, ..) -> R;
    (
        $list:ident;
        $(#[attributes($($attr:expr),* $(,)?)])?
        fn $method:ident (&mut self $(, $arg:ident : $ty:ty)* $(,)?) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        $list.push($crate::__rtti_method! {
            method = $method,
            flags = $crate::MethodFlags::empty(),
            attributes = [$($($attr),*)?],
            arguments = [$($arg: $ty),*],
            returns = [$($ret)?],
            thunk = $crate::__rtti_thunk!(|object, ret, args| {
                $crate::bridge::expect_arity(args, $crate::__rtti_count!($($arg)*));
                #[allow(unused_mut, unused_variables)]
                let mut args = args.iter().copied();
                // SAFETY: the checked call paths validated every slot
                // against the declarations of this method.
                unsafe {
                    let this = $crate::bridge::receiver_mut::<Self>(object);
                    $( let $arg = $crate::bridge::next_argument::<$ty>(&mut args); )*
                    $crate::bridge::store_return::<$crate::__rtti_ret!($($ret)?)>(
                        ret,
                        Self::$method(this $(, $arg)*),
                    );
                }
            })
        });
        $crate::__rtti_methods!($list; $($rest)*);
    };
    // fn name(&self, ..) -> R;
    (
        $list:ident;
        $(#[attributes($($attr:expr),* $(,)?)])?
        fn $method:ident (&self $(, $arg:ident : $ty:ty)* $(,)?) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        $list.push($crate::__rtti_method! {
            method = $method,
            flags = $crate::MethodFlags::CONST,
            attributes = [$($($attr),*)?],
            arguments = [$($arg: $ty),*],
            returns = [$($ret)?],
            thunk = $crate::__rtti_thunk!(|object, ret, args| {
                $crate::bridge::expect_arity(args, $crate::__rtti_count!($($arg)*));
                #[allow(unused_mut, unused_variables)]
                let mut args = args.iter().copied();
                // SAFETY: see above.
                unsafe {
                    let this = $crate::bridge::receiver_ref::<Self>(object);
                    $( let $arg = $crate::bridge::next_argument::<$ty>(&mut args); )*
                    $crate::bridge::store_return::<$crate::__rtti_ret!($($ret)?)>(
                        ret,
                        Self::$method(this $(, $arg)*),
                    );
                }
            })
        });
        $crate::__rtti_methods!($list; $($rest)*);
    };
    // fn name(&mut self, ..) -> R = closure;
    (
        $list:ident;
        $(#[attributes($($attr:expr),* $(,)?)])?
        fn $method:ident (&mut self $(, $arg:ident : $ty:ty)* $(,)?) $(-> $ret:ty)? = $lambda:expr;
        $($rest:tt)*
    ) => {
        $list.push($crate::__rtti_method! {
            method = $method,
            flags = $crate::MethodFlags::LAMBDA,
            attributes = [$($($attr),*)?],
            arguments = [$($arg: $ty),*],
            returns = [$($ret)?],
            thunk = {
                let lambda = $lambda;
                $crate::__rtti_thunk!(move |object, ret, args| {
                    $crate::bridge::expect_static(object);
                    $crate::bridge::expect_arity(args, 1 + $crate::__rtti_count!($($arg)*));
                    let mut args = args.iter().copied();
                    // SAFETY: see above; the receiver comes first.
                    unsafe {
                        let this = $crate::bridge::receiver_mut::<Self>(args.next());
                        $( let $arg = $crate::bridge::next_argument::<$ty>(&mut args); )*
                        $crate::bridge::store_return::<$crate::__rtti_ret!($($ret)?)>(
                            ret,
                            lambda(this $(, $arg)*),
                        );
                    }
                })
            }
        });
        $crate::__rtti_methods!($list; $($rest)*);
    };
    // fn name(&self, ..) -> R = closure;
    (
        $list:ident;
        $(#[attributes($($attr:expr),* $(,)?)])?
        fn $method:ident (&self $(, $arg:ident : $ty:ty)* $(,)?) $(-> $ret:ty)? = $lambda:expr;
        $($rest:tt)*
    ) => {
        $list.push($crate::__rtti_method! {
            method = $method,
            flags = $crate::MethodFlags::CONST | $crate::MethodFlags::LAMBDA,
            attributes = [$($($attr),*)?],
            arguments = [$($arg: $ty),*],
            returns = [$($ret)?],
            thunk = {
                let lambda = $lambda;
                $crate::__rtti_thunk!(move |object, ret, args| {
                    $crate::bridge::expect_static(object);
                    $crate::bridge::expect_arity(args, 1 + $crate::__rtti_count!($($arg)*));
                    let mut args = args.iter().copied();
                    // SAFETY: see above; the receiver comes first.
                    unsafe {
                        let this = $crate::bridge::receiver_ref::<Self>(args.next());
                        $( let $arg = $crate::bridge::next_argument::<$ty>(&mut args); )*
                        $crate::bridge::store_return::<$crate::__rtti_ret!($($ret)?)>(
                            ret,
                            lambda(this $(, $arg)*),
                        );
                    }
                })
            }
        });
        $crate::__rtti_methods!($list; $($rest)*);
    };
    // fn name(..) -> R;
    (
        $list:ident;
        $(#[attributes($($attr:expr),* $(,)?)])?
        fn $method:ident ($($arg:ident : $ty:ty),* $(,)?) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        $list.push($crate::__rtti_method! {
            method = $method,
            flags = $crate::MethodFlags::STATIC,
            attributes = [$($($attr),*)?],
            arguments = [$($arg: $ty),*],
            returns = [$($ret)?],
            thunk = $crate::__rtti_thunk!(|object, ret, args| {
                $crate::bridge::expect_static(object);
                $crate::bridge::expect_arity(args, $crate::__rtti_count!($($arg)*));
                #[allow(unused_mut, unused_variables)]
                let mut args = args.iter().copied();
                // SAFETY: see above.
                unsafe {
                    $( let $arg = $crate::bridge::next_argument::<$ty>(&mut args); )*
                    $crate::bridge::store_return::<$crate::__rtti_ret!($($ret)?)>(
                        ret,
                        Self::$method($($arg),*),
                    );
                }
            })
        });
        $crate::__rtti_methods!($list; $($rest)*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_thunk {
    ($call:expr) => {
        // SAFETY: generated from the same signature as the declarations of
        // the method it is attached to.
        unsafe { $crate::Thunk::new($call) }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_method {
    (
        method = $method:ident,
        flags = $flags:expr,
        attributes = [$($attr:expr),*],
        arguments = [$($arg:ident : $ty:ty),*],
        returns = [$($ret:ty)?],
        thunk = $thunk:expr
    ) => {
        $crate::Method::builder(
            ::core::stringify!($method),
            <Self as $crate::Reflect>::type_of_forward,
        )
        .flags($flags)
        .returns(<$crate::__rtti_ret!($($ret)?) as $crate::Declare>::DECLARATION)
        .arguments(::std::vec![
            $( $crate::Variable::new(
                ::core::stringify!($arg),
                <$ty as $crate::Declare>::DECLARATION,
            ) ),*
        ])
        .attributes($crate::attributes![$($attr),*])
        .thunk($thunk)
        .build()
    };
}
