use pretty_assertions::assert_eq;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tabula::{
    schema::FieldMapping,
    stmt::CreateIndex,
    Model, ModelSchema,
};
use tabula_core::{
    async_trait,
    driver::{Capability, Connection, Driver, Response},
};
use tabula_driver_sqlite::Sqlite;
use tests::{prelude::*, LoggingDriver};

#[derive(Debug, Default)]
struct Account {
    id: i64,
    name: String,
}

impl Model for Account {
    fn schema() -> tabula::Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("accounts")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |account| account.id.into(),
                |account, value| Ok(account.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("name"),
                |account| account.name.as_str().into(),
                |account, value| Ok(account.name = value.try_into()?),
            )
            .build()
    }
}

/// `accounts` with one more field, as after a model change.
#[derive(Debug, Default)]
struct AccountV2 {
    id: i64,
    name: String,
    nickname: Option<String>,
}

impl Model for AccountV2 {
    fn schema() -> tabula::Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("accounts")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |account| account.id.into(),
                |account, value| Ok(account.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("name"),
                |account| account.name.as_str().into(),
                |account, value| Ok(account.name = value.try_into()?),
            )
            .field(
                FieldMapping::of::<Option<String>>("nickname"),
                |account| account.nickname.clone().into(),
                |account, value| Ok(account.nickname = tabula::schema::Primitive::load(value)?),
            )
            .build()
    }
}

async fn open() -> (Db, ExecLog) {
    tests::init_tracing();
    let driver = LoggingDriver::new(Sqlite::in_memory());
    let log = driver.log();
    let db = Db::builder()
        .register::<Account>()
        .cache_sweep_interval(None)
        .build(driver)
        .await
        .unwrap();
    (db, log)
}

#[tokio::test]
async fn creates_missing_tables_once() {
    let (db, log) = open().await;

    let applied = assert_ok!(db.auto_migrate().await);
    assert_eq!(applied, ["create_table_accounts"]);
    assert_eq!(log.count("CREATE TABLE"), 2);
    assert_eq!(
        log.starting_with("CREATE TABLE")[1].sql,
        "CREATE TABLE IF NOT EXISTS \"accounts\" (\n    \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,\n    \"name\" TEXT NOT NULL\n)"
    );

    log.clear();
    let applied = assert_ok!(db.auto_migrate().await);
    assert!(applied.is_empty());
    assert_eq!(log.count("CREATE"), 0);
    assert_eq!(log.count("ALTER"), 0);
    assert_eq!(log.count("INSERT"), 0);

    let recorded = assert_ok!(db.migrator().applied().await);
    let names: Vec<_> = recorded.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["create_table_accounts"]);
    assert!(recorded[0].applied);
}

#[tokio::test]
async fn adds_one_column_for_one_new_field() {
    let (db, log) = open().await;
    assert_ok!(db.auto_migrate().await);
    log.clear();

    let v2 = assert_ok!(AccountV2::schema());
    let applied = assert_ok!(db.migrator().migrate(v2.table()).await);
    assert_eq!(applied, ["add_column_accounts_nickname"]);

    let alters = log.starting_with("ALTER");
    assert_eq!(alters.len(), 1);
    assert_eq!(
        alters[0].sql,
        "ALTER TABLE \"accounts\" ADD COLUMN \"nickname\" TEXT"
    );
    assert_eq!(log.count("INSERT INTO \"tabula_migrations\""), 1);

    let columns = assert_ok!(db.migrator().columns("accounts").await);
    assert!(columns.contains("nickname"));

    let recorded = assert_ok!(db.migrator().applied().await);
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].name, "add_column_accounts_nickname");

    // The live schema now matches
    log.clear();
    assert!(assert_ok!(db.migrator().migrate(v2.table()).await).is_empty());
    assert_eq!(log.count("ALTER"), 0);
}

#[tokio::test]
async fn extra_live_columns_are_kept() {
    let (db, _log) = open().await;
    let v2 = assert_ok!(AccountV2::schema());
    assert_ok!(db.migrator().migrate(v2.table()).await);

    // `Account` lacks `nickname`; reconciling it drops nothing
    assert!(assert_ok!(db.auto_migrate().await).is_empty());
    let columns = assert_ok!(db.migrator().columns("accounts").await);
    assert_eq!(columns.len(), 3);
}

#[tokio::test]
async fn indexes_are_recorded() {
    let (db, log) = open().await;
    assert_ok!(db.auto_migrate().await);
    log.clear();

    let index = CreateIndex::new("idx_accounts_name", "accounts", ["name"]).unique();
    assert_ok!(db.migrator().create_index(index).await);
    assert_eq!(
        log.starting_with("CREATE")[0].sql,
        "CREATE UNIQUE INDEX \"idx_accounts_name\" ON \"accounts\" (\"name\")"
    );

    let recorded = assert_ok!(db.migrator().applied().await);
    assert_eq!(recorded[1].name, "create_index_idx_accounts_name");
}

#[tokio::test]
async fn existing_objects_count_as_created() {
    let (db, _log) = open().await;
    assert_ok!(db.auto_migrate().await);

    // A second process created the index first
    let index = CreateIndex::new("idx_accounts_name", "accounts", ["name"]);
    assert_ok!(db.exec(index.clone()).await);

    assert_ok!(db.migrator().create_index(index).await);
    let recorded = assert_ok!(db.migrator().applied().await);
    assert_eq!(recorded.len(), 1);
}

#[tokio::test]
async fn table_lookups() {
    let (db, _log) = open().await;
    assert!(!assert_ok!(db.migrator().table_exists("accounts").await));
    assert_ok!(db.auto_migrate().await);
    assert!(assert_ok!(db.migrator().table_exists("accounts").await));
    assert!(assert_ok!(db.migrator().table_exists("tabula_migrations").await));
}

#[tokio::test]
async fn concurrent_reconciliations_apply_once() {
    let (db, log) = open().await;

    let (a, b) = tokio::join!(db.auto_migrate(), db.auto_migrate());
    let mut applied = assert_ok!(a);
    applied.extend(assert_ok!(b));
    assert_eq!(applied, ["create_table_accounts"]);
    assert_eq!(log.count("CREATE TABLE IF NOT EXISTS \"accounts\""), 1);
}

/// `accounts` with two more fields.
#[derive(Debug, Default)]
struct AccountV3 {
    id: i64,
    name: String,
    nickname: Option<String>,
    email: Option<String>,
}

impl Model for AccountV3 {
    fn schema() -> tabula::Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("accounts")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |account| account.id.into(),
                |account, value| Ok(account.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("name"),
                |account| account.name.as_str().into(),
                |account, value| Ok(account.name = value.try_into()?),
            )
            .field(
                FieldMapping::of::<Option<String>>("nickname"),
                |account| account.nickname.clone().into(),
                |account, value| Ok(account.nickname = tabula::schema::Primitive::load(value)?),
            )
            .field(
                FieldMapping::of::<Option<String>>("email"),
                |account| account.email.clone().into(),
                |account, value| Ok(account.email = tabula::schema::Primitive::load(value)?),
            )
            .build()
    }
}

/// SQLite, except that the `n`th ALTER statement fails.
#[derive(Debug)]
struct FailingAlter {
    inner: Sqlite,
    n: usize,
    alters: Arc<AtomicUsize>,
}

#[async_trait]
impl Driver for FailingAlter {
    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    async fn connect(&self) -> tabula::Result<Box<dyn Connection>> {
        Ok(Box::new(FailingAlterConnection {
            inner: self.inner.connect().await?,
            n: self.n,
            alters: self.alters.clone(),
        }))
    }

    fn max_connections(&self) -> Option<usize> {
        self.inner.max_connections()
    }
}

#[derive(Debug)]
struct FailingAlterConnection {
    inner: Box<dyn Connection>,
    n: usize,
    alters: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for FailingAlterConnection {
    async fn exec(&mut self, sql: &str, params: &[Value]) -> tabula::Result<Response> {
        if sql.starts_with("ALTER") && self.alters.fetch_add(1, Ordering::SeqCst) + 1 == self.n {
            return Err(tabula_core::err!("disk I/O error"));
        }
        self.inner.exec(sql, params).await
    }
}

#[tokio::test]
async fn failed_column_keeps_earlier_columns_and_resumes() {
    tests::init_tracing();
    let driver = LoggingDriver::new(FailingAlter {
        inner: Sqlite::in_memory(),
        n: 2,
        alters: Arc::new(AtomicUsize::new(0)),
    });
    let log = driver.log();
    let db = assert_ok!(
        Db::builder()
            .register::<Account>()
            .cache_sweep_interval(None)
            .build(driver)
            .await
    );
    assert_ok!(db.auto_migrate().await);

    let v3 = assert_ok!(AccountV3::schema());
    let err = assert_err!(db.migrator().migrate(v3.table()).await);
    assert_eq!(err.root().to_string(), "disk I/O error");

    // The first column and its audit row stay
    let columns = assert_ok!(db.migrator().columns("accounts").await);
    assert!(columns.contains("nickname"));
    assert!(!columns.contains("email"));
    let recorded = assert_ok!(db.migrator().applied().await);
    let names: Vec<_> = recorded.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["create_table_accounts", "add_column_accounts_nickname"]);

    // A second run adds only what is missing
    log.clear();
    let applied = assert_ok!(db.migrator().migrate(v3.table()).await);
    assert_eq!(applied, ["add_column_accounts_email"]);
    let alters = log.starting_with("ALTER");
    assert_eq!(alters.len(), 1);
    assert_eq!(alters[0].sql, "ALTER TABLE \"accounts\" ADD COLUMN \"email\" TEXT");

    let recorded = assert_ok!(db.migrator().applied().await);
    assert_eq!(recorded.len(), 3);
}
