pub mod bag;
pub mod bytes;
pub mod keys;

pub use bag::{Arg, PropertyBag};
pub use bytes::{to_bytes_binary, to_string_binary};
