//! The descriptor model: types, their members and the slots those members
//! are declared with.

mod bitflags;

mod identity;
pub use identity::*;

mod kind;
pub use kind::*;

mod declaration;
pub use declaration::*;

mod ops;
pub use ops::*;

mod attribute;
pub use attribute::*;

mod property;
pub use property::*;

mod method;
pub use method::*;

mod enumeration;
pub use enumeration::*;

mod ty;
pub use ty::*;
