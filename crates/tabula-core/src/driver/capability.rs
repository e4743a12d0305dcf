/// SQL dialect spoken by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Mysql,
    Postgresql,
    Sqlite,
}

impl Flavor {
    pub fn name(self) -> &'static str {
        match self {
            Flavor::Mysql => "mysql",
            Flavor::Postgresql => "postgresql",
            Flavor::Sqlite => "sqlite",
        }
    }
}

impl core::fmt::Display for Flavor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub struct Capability {
    pub flavor: Flavor,

    /// Maximum number of bound parameters in one statement.
    pub max_params: usize,

    /// Whether `ALTER TABLE .. DROP COLUMN` is available.
    pub drop_column: bool,

    /// Whether INSERT supports `RETURNING`.
    pub returning: bool,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        flavor: Flavor::Sqlite,
        max_params: 32_766,
        drop_column: false,
        returning: true,
    };

    /// PostgreSQL capabilities.
    pub const POSTGRESQL: Self = Self {
        flavor: Flavor::Postgresql,
        max_params: 65_535,
        drop_column: true,
        returning: true,
    };

    /// MySQL capabilities.
    pub const MYSQL: Self = Self {
        flavor: Flavor::Mysql,
        max_params: 65_535,
        drop_column: true,
        returning: false,
    };

    pub fn of(flavor: Flavor) -> &'static Capability {
        match flavor {
            Flavor::Mysql => &Self::MYSQL,
            Flavor::Postgresql => &Self::POSTGRESQL,
            Flavor::Sqlite => &Self::SQLITE,
        }
    }
}
