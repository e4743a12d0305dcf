//! SQL generation for MySQL, PostgreSQL and SQLite.
//!
//! Statements are plain data ([`stmt`]); a [`Serializer`] configured for one
//! [`Flavor`] turns them into SQL text plus an ordered parameter list. Nothing
//! in this crate talks to a database.

pub mod bulk;

mod migration;
pub use migration::{applied_migrations, migrations_table, MigrationStatement, MIGRATIONS_TABLE};

pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer, Sql, Transaction};

pub mod stmt;
pub use stmt::Statement;

pub use tabula_core::driver::Flavor;
