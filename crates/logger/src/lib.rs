//! Tracing setup shared by the ipcheck binaries.

mod tracing;

pub use self::tracing::{init as init_tracing, init_with_level};
