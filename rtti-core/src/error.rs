use crate::{Declaration, StableId, Type};

/// A broken contract at a checked reflection boundary.
///
/// Every variant is a programmer error: the panicking entry points
/// (`Property::set`, `Method::call_method`, ...) log it and abort the
/// current thread, the `try_` variants hand it back instead.
#[derive(Debug, Clone)]
pub enum RttiError {
    /// The object passed in is not (derived from) the type declaring the member.
    NotA {
        /// Type declaring the property or method.
        expected: &'static Type,
        /// Static type of the object that was provided.
        actual: &'static Type,
    },

    /// A value does not fit the declared slot of a property.
    PropertyType {
        /// Name of the property.
        property: &'static str,
        /// Declaration of the property.
        declared: Declaration,
        /// Declaration of the value provided or requested.
        provided: Declaration,
    },

    /// A method received the wrong number of arguments.
    ArgumentCount {
        /// Name of the method.
        method: &'static str,
        /// Number of declared arguments.
        expected: usize,
        /// Number of arguments provided.
        actual: usize,
    },

    /// An argument does not fit the declared parameter.
    ArgumentType {
        /// Name of the method.
        method: &'static str,
        /// Zero-based position of the argument.
        index: usize,
        /// Declaration of the parameter.
        declared: Declaration,
        /// Declaration of the argument provided.
        provided: Declaration,
    },

    /// A return slot was provided for a method returning nothing.
    UnexpectedReturnSlot {
        /// Name of the method.
        method: &'static str,
    },

    /// No return slot was provided for a method returning a value.
    MissingReturnSlot {
        /// Name of the method.
        method: &'static str,
    },

    /// The return slot cannot hold what the method returns.
    ReturnType {
        /// Name of the method.
        method: &'static str,
        /// Declaration of the method's return value.
        declared: Declaration,
        /// Declaration of the slot provided.
        provided: Declaration,
    },

    /// A static method was called on an object, or a member method without one.
    Receiver {
        /// Name of the method.
        method: &'static str,
        /// Whether the method is static.
        is_static: bool,
    },

    /// A mutating method was called through a shared reference.
    ConstReceiver {
        /// Name of the method.
        method: &'static str,
    },

    /// The descriptor lacks the lifecycle operation needed.
    MissingOperation {
        /// The descriptor.
        ty: &'static Type,
        /// Name of the missing operation.
        operation: &'static str,
    },

    /// A typed lifecycle helper was used with a different static type.
    WrongType {
        /// The descriptor the helper was called on.
        expected: &'static Type,
        /// The static type supplied.
        actual: &'static Type,
    },

    /// A descriptor claimed by a Rust type was built for another one.
    Foreign {
        /// The descriptor.
        ty: &'static Type,
        /// Name of the Rust type claiming it.
        rust: &'static str,
    },

    /// The descriptor is still a forward placeholder.
    Incomplete {
        /// Name of the type being built.
        name: &'static str,
    },

    /// An id is already registered under the same name.
    DuplicateId {
        /// The id.
        id: StableId,
        /// Name registered under it.
        name: &'static str,
    },

    /// A name is already registered under a different id.
    DuplicateName {
        /// The name.
        name: &'static str,
    },

    /// Two different names hash to the same id.
    IdCollision {
        /// The shared id.
        id: StableId,
        /// Name already registered.
        existing: &'static str,
        /// Name being registered.
        incoming: &'static str,
    },
}

impl core::fmt::Display for RttiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RttiError::NotA { expected, actual } => {
                write!(f, "object of type {actual} is not a {expected}")
            }
            RttiError::PropertyType {
                property,
                declared,
                provided,
            } => write!(
                f,
                "property {property} is declared as {declared}, not {provided}"
            ),
            RttiError::ArgumentCount {
                method,
                expected,
                actual,
            } => write!(
                f,
                "argument count mismatch on {method}(): expected {expected}, got {actual}"
            ),
            RttiError::ArgumentType {
                method,
                index,
                declared,
                provided,
            } => write!(
                f,
                "argument {index} of {method}() must be of type {declared}, not {provided}"
            ),
            RttiError::UnexpectedReturnSlot { method } => write!(
                f,
                "cannot provide a return slot to {method}(), it returns void"
            ),
            RttiError::MissingReturnSlot { method } => {
                write!(f, "missing return slot for {method}(), it returns a value")
            }
            RttiError::ReturnType {
                method,
                declared,
                provided,
            } => write!(
                f,
                "{method}() returns {declared}, which does not fit a {provided} slot"
            ),
            RttiError::Receiver { method, is_static } => {
                if *is_static {
                    write!(f, "static method {method}() called on an object")
                } else {
                    write!(f, "member method {method}() called without an object")
                }
            }
            RttiError::ConstReceiver { method } => {
                write!(f, "{method}() needs a mutable receiver")
            }
            RttiError::MissingOperation { ty, operation } => {
                write!(f, "type {ty} has no {operation} operation")
            }
            RttiError::WrongType { expected, actual } => {
                write!(f, "expected type {expected}, got {actual}")
            }
            RttiError::Foreign { ty, rust } => {
                write!(f, "descriptor {ty} does not describe {rust}")
            }
            RttiError::Incomplete { name } => write!(
                f,
                "type {name} is requested while its descriptor is still being built"
            ),
            RttiError::DuplicateId { id, name } => {
                write!(f, "type {name} ({id}) is already registered")
            }
            RttiError::DuplicateName { name } => {
                write!(f, "a type named {name} is already registered")
            }
            RttiError::IdCollision {
                id,
                existing,
                incoming,
            } => write!(
                f,
                "type id collision: {incoming} and {existing} both hash to {id}"
            ),
        }
    }
}

impl core::error::Error for RttiError {}

/// Logs a broken contract and panics with it.
#[cold]
#[track_caller]
pub fn fatal(err: RttiError) -> ! {
    crate::error!("{err}");
    panic!("{err}")
}

/// Asserts a reflection contract, logging before panicking.
#[macro_export]
macro_rules! rtti_assert {
    ($cond:expr, $($msg:tt)+) => {
        if !$cond {
            $crate::__rtti_assert_failed(::core::format_args!($($msg)+));
        }
    };
}

#[doc(hidden)]
#[cold]
#[track_caller]
pub fn __rtti_assert_failed(msg: core::fmt::Arguments<'_>) -> ! {
    crate::error!("{msg}");
    panic!("{msg}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Declaration, type_of};
    use insta::assert_snapshot;
    use static_assertions::assert_impl_all;

    assert_impl_all!(RttiError: Send, Sync, core::error::Error);

    #[rtti_testhelpers::test]
    fn messages() {
        let errors = [
            RttiError::NotA {
                expected: type_of::<u8>(),
                actual: type_of::<i64>(),
            },
            RttiError::PropertyType {
                property: "width",
                declared: Declaration::value::<i32>(),
                provided: Declaration::pointer::<i32>(true),
            },
            RttiError::ArgumentCount {
                method: "set",
                expected: 2,
                actual: 3,
            },
            RttiError::ArgumentType {
                method: "set",
                index: 1,
                declared: Declaration::reference::<u8>(true),
                provided: Declaration::reference::<u8>(false),
            },
            RttiError::Receiver {
                method: "origin",
                is_static: true,
            },
            RttiError::MissingOperation {
                ty: type_of::<bool>(),
                operation: "construct",
            },
            RttiError::Incomplete { name: "Node" },
        ];
        let messages: alloc::vec::Vec<alloc::string::String> =
            errors.iter().map(alloc::string::ToString::to_string).collect();
        assert_snapshot!(messages.join("\n"), @r"
        object of type i64 is not a u8
        property width is declared as i32, not *const i32
        argument count mismatch on set(): expected 2, got 3
        argument 1 of set() must be of type &u8, not &mut u8
        static method origin() called on an object
        type bool has no construct operation
        type Node is requested while its descriptor is still being built
        ");
    }

    #[rtti_testhelpers::test]
    #[should_panic(expected = "widths differ: 1 != 2")]
    fn assertions_panic_with_their_message() {
        let (left, right) = (1, 2);
        rtti_assert!(left == right, "widths differ: {left} != {right}");
    }
}
