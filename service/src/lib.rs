//! Recipe costing service layer.
//!
//! [`Mutation`] holds every write. Each write takes an explicit [`AuthContext`],
//! validates its input before touching the database, and runs in a single
//! transaction, so a recipe's links and its stored `cost` never disagree.
//! [`Query`] holds the reads.

mod auth;
pub mod cost;
mod error;
mod input;
pub mod links;
mod mutation;
mod query;

pub use auth::*;
pub use error::*;
pub use input::*;
pub use mutation::*;
pub use query::*;

pub use sea_orm;
