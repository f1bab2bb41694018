//! PostgreSQL transport for the registrar toolkit, built on a single
//! [`sqlx::PgConnection`].

mod catalog;
mod store;

pub mod error;

pub use error::Error;
pub use store::PgDatabase;
