use tabula_core::{
    driver::{Capability, Connection, Driver},
    Error, Result,
};
use url::Url;

/// A driver selected from a connection URL.
///
/// Only schemes whose driver was compiled in are accepted. Any other scheme
/// is an invalid connection URL naming the driver that would be needed.
#[derive(Debug)]
pub struct Connect {
    driver: Box<dyn Driver>,
}

impl Connect {
    pub fn new(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_connection_url(format!("{url}: {err}")))?;

        let driver: Box<dyn Driver> = match parsed.scheme() {
            #[cfg(feature = "sqlite")]
            "sqlite" => Box::new(tabula_driver_sqlite::Sqlite::new(url)?),
            scheme => return Err(unsupported_scheme(scheme)),
        };

        Ok(Self { driver })
    }
}

fn unsupported_scheme(scheme: &str) -> Error {
    let driver = match scheme {
        "sqlite" => "the `sqlite` feature",
        "mysql" => "a MySQL driver",
        "postgres" | "postgresql" => "a PostgreSQL driver",
        _ => return Error::invalid_connection_url(format!("unsupported database `{scheme}`")),
    };
    Error::invalid_connection_url(format!("`{scheme}` URLs need {driver}"))
}

#[tabula_core::async_trait]
impl Driver for Connect {
    fn capability(&self) -> &'static Capability {
        self.driver.capability()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect().await
    }

    fn max_connections(&self) -> Option<usize> {
        self.driver.max_connections()
    }
}
