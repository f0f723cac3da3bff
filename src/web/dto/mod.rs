//! Data Transfer Objects for the blob API.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
