#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod macros;
pub use macros::*;

// Opaque pointer utilities
mod ptr;
pub use ptr::*;

// Specialization utilities
pub mod spez;

// Glue used by generated invocation thunks
pub mod bridge;

mod error;
pub use error::*;

mod types;
pub use types::*;

mod reflect;
pub use reflect::*;

mod query;
pub use query::*;

mod instance;
pub use instance::*;

// Descriptors for `core`, `alloc` and `std` types
mod impls;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, trace};

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use logging::{debug, error, trace};

/// No-op stand-ins for the `tracing` macros.
#[cfg(not(feature = "tracing"))]
mod logging {
    macro_rules! trace {
        ($($tt:tt)*) => {};
    }
    pub(crate) use trace;

    macro_rules! debug {
        ($($tt:tt)*) => {};
    }
    pub(crate) use debug;

    macro_rules! error {
        ($($tt:tt)*) => {};
    }
    pub(crate) use error;
}
