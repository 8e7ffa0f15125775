//! Persistence for each entity.
//!
//! Every function takes the pool and runs parameterized SQL. Writes that
//! touch more than one row run inside a single transaction, which rolls
//! back when dropped before `commit`.

pub mod baskets;
pub mod comments;
pub mod orders;
pub mod payments;
pub mod phones;
pub mod users;
pub mod wishes;
