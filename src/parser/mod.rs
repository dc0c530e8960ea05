//! HTTP request parser module.
//!
//! Requests are read line by line: a request line followed by a header block
//! terminated by an empty line. Bodies are never read.

mod request;
mod method;
mod error;
mod tests;

// Re-export public items
pub use request::{Header, HttpRequest};
pub use method::Method;
pub use error::Error;

pub use request::{parse_request, read_request};
