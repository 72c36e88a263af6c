//! HTTP protocol layer
//!
//! Protocol-level helpers shared by the root-document and asset handlers:
//! MIME lookup, response builders, cache validators, Range parsing.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used builders
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_416_response, build_500_response, build_options_response,
};
