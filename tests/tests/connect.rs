use pretty_assertions::assert_eq;
use tabula::Flavor;
use tests::prelude::*;

#[tokio::test]
async fn sqlite_urls_open_a_database() {
    tests::init_tracing();

    let db = assert_ok!(
        Db::builder()
            .register::<Item>()
            .connect("sqlite::memory:")
            .await
    );
    assert_eq!(db.flavor(), Flavor::Sqlite);
    assert_eq!(db.pool_status().max_size, 1);

    assert_ok!(db.auto_migrate().await);
    assert_ok!(db.model::<Item>().create(&mut Item::new("apple", 3)).await);
    assert_eq!(assert_ok!(db.model::<Item>().count().await), 1);
}

#[tokio::test]
async fn unsupported_schemes_are_rejected() {
    let err = assert_err!(
        Db::builder()
            .register::<Item>()
            .connect("mysql://localhost/app")
            .await
    );
    assert!(err.is_invalid_connection_url());
    assert_eq!(
        err.to_string(),
        "invalid connection URL: `mysql` URLs need a MySQL driver"
    );
}
