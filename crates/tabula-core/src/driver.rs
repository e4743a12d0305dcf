mod capability;
pub use capability::{Capability, Flavor};

mod response;
pub use response::{Response, Rows};

use crate::{async_trait, stmt::Value};

use std::fmt::Debug;

/// A database backend: knows its SQL flavor and how to open connections.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the driver's capability, which selects the SQL flavor.
    fn capability(&self) -> &'static Capability;

    /// Creates a new connection to the database.
    async fn connect(&self) -> crate::Result<Box<dyn Connection>>;

    /// Upper bound on simultaneous connections, if the backend imposes one.
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

/// An open connection that executes SQL text with bound parameters.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Executes one statement. `params` are bound in order.
    async fn exec(&mut self, sql: &str, params: &[Value]) -> crate::Result<Response>;
}
