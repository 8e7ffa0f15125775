//! Database records and the request/response shapes built from them.
//!
//! Each entity has one typed record (`FromRow`) plus explicit conversions
//! to the DTOs returned over the API.

pub mod basket;
pub mod comment;
pub mod common;
pub mod order;
pub mod payment;
pub mod phone;
pub mod user;
pub mod wish;

pub use basket::*;
pub use comment::*;
pub use common::*;
pub use order::*;
pub use payment::*;
pub use phone::*;
pub use user::*;
pub use wish::*;
