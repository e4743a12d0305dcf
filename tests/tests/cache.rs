use pretty_assertions::assert_eq;
use std::{sync::Arc, time::Duration};
use tabula::{metrics, stmt::Insert, Collector};
use tests::prelude::*;

const TTL: Duration = Duration::from_secs(60);

async fn seeded(collector: &Arc<Collector>) -> (Db, ExecLog) {
    let (db, log) = sqlite(|builder| {
        builder.metrics(collector.clone());
    })
    .await;
    for (name, qty) in [("apple", 3), ("pear", 10)] {
        assert_ok!(db.model::<Item>().create(&mut Item::new(name, qty)).await);
    }
    log.clear();
    collector.clear();
    (db, log)
}

#[tokio::test]
async fn repeated_queries_are_served_from_the_cache() {
    let collector = Arc::new(Collector::new());
    let (db, log) = seeded(&collector).await;

    let first = assert_ok!(db.model::<Item>().order_by("id", false).cached(TTL).find().await);
    let second = assert_ok!(db.model::<Item>().order_by("id", false).cached(TTL).find().await);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);

    assert_eq!(log.count("SELECT"), 1);
    assert_eq!(collector.total(metrics::CACHE_MISS), 1.0);
    assert_eq!(collector.total(metrics::CACHE_HIT), 1.0);

    let hit = &collector.named(metrics::CACHE_HIT)[0];
    assert_eq!(hit.labels.get("table").map(String::as_str), Some("items"));
}

#[tokio::test]
async fn queries_differing_in_parameters_are_cached_apart() {
    let collector = Arc::new(Collector::new());
    let (db, log) = seeded(&collector).await;

    for qty in [3, 10, 3] {
        let items = assert_ok!(
            db.model::<Item>()
                .filter("qty", Op::Eq, qty)
                .cached(TTL)
                .find()
                .await
        );
        assert_eq!(items[0].qty, qty);
    }

    assert_eq!(log.count("SELECT"), 2);
    assert_eq!(collector.total(metrics::CACHE_HIT), 1.0);
}

#[tokio::test]
async fn writes_invalidate_the_table() {
    let collector = Arc::new(Collector::new());
    let (db, log) = seeded(&collector).await;

    assert_ok!(db.model::<Item>().cached(TTL).find().await);
    assert_ok!(db.model::<Item>().create(&mut Item::new("plum", 7)).await);

    let items = assert_ok!(db.model::<Item>().cached(TTL).find().await);
    assert_eq!(items.len(), 3);
    assert_eq!(log.count("SELECT"), 2);

    assert_ok!(
        db.model::<Item>()
            .filter("name", Op::Eq, "plum")
            .update_columns([("qty", 8)])
            .await
    );
    let items = assert_ok!(db.model::<Item>().cached(TTL).find().await);
    assert_eq!(items[2].qty, 8);
    assert_eq!(log.count("SELECT"), 3);
}

#[tokio::test]
async fn writes_to_other_tables_keep_entries() {
    let collector = Arc::new(Collector::new());
    let (db, log) = seeded(&collector).await;

    assert_ok!(db.model::<Item>().cached(TTL).find().await);
    assert_ok!(db.model::<Tag>().create(&mut Tag { id: 0, name: "rust".into() }).await);
    assert_ok!(db.model::<Item>().cached(TTL).find().await);

    assert_eq!(log.count("SELECT"), 1);
}

#[tokio::test]
async fn entries_expire() {
    let collector = Arc::new(Collector::new());
    let (db, log) = seeded(&collector).await;

    let ttl = Duration::from_millis(20);
    assert_ok!(db.model::<Item>().cached(ttl).find().await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_ok!(db.model::<Item>().cached(ttl).find().await);

    assert_eq!(log.count("SELECT"), 2);
    assert_eq!(collector.total(metrics::CACHE_HIT), 0.0);
}

#[tokio::test]
async fn uncached_queries_skip_the_cache() {
    let collector = Arc::new(Collector::new());
    let (db, log) = seeded(&collector).await;

    assert_ok!(db.model::<Item>().find().await);
    assert_ok!(db.model::<Item>().find().await);

    assert_eq!(log.count("SELECT"), 2);
    assert!(db.cache().is_empty());
    assert!(collector.named(metrics::CACHE_MISS).is_empty());
}

#[tokio::test]
async fn statements_are_measured() {
    let collector = Arc::new(Collector::new());
    let (db, _log) = seeded(&collector).await;

    assert_ok!(db.model::<Item>().find().await);
    assert_err!(db.model::<Item>().filter("missing", Op::Eq, 1).find().await);

    let timings = collector.named(metrics::QUERY_EXECUTION);
    assert_eq!(timings.len(), 2);
    assert_eq!(
        timings[0].labels.get("type").map(String::as_str),
        Some("select")
    );
    assert_eq!(collector.total(metrics::ERROR_COUNT), 1.0);
}

#[tokio::test]
async fn statements_run_directly_invalidate_the_table() {
    let collector = Arc::new(Collector::new());
    let (db, _log) = seeded(&collector).await;

    assert_eq!(assert_ok!(db.model::<Item>().cached(TTL).find().await).len(), 2);

    let mut insert = Insert::new("items", ["name", "qty"]);
    insert.row(vec!["plum".into(), 7.into()]);
    assert_ok!(db.exec(insert).await);

    assert_eq!(assert_ok!(db.model::<Item>().cached(TTL).find().await).len(), 3);
}

#[tokio::test]
async fn rolled_back_rows_never_reach_the_cache() {
    let collector = Arc::new(Collector::new());
    let (db, log) = seeded(&collector).await;

    let err = assert_err!(
        db.transaction(async |tx: &Db| {
            tx.model::<Item>().create(&mut Item::new("ghost", 1)).await?;
            let items = tx.model::<Item>().cached(TTL).find().await?;
            assert_eq!(items.len(), 3);
            Err::<(), _>(tabula_core::err!("changed my mind"))
        })
        .await
    );
    assert!(err.is_transaction_rolled_back());
    assert!(collector.named(metrics::CACHE_MISS).is_empty());

    let items = assert_ok!(db.model::<Item>().cached(TTL).find().await);
    let names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, ["apple", "pear"]);
    assert_eq!(log.count("ROLLBACK"), 1);
}

#[tokio::test]
async fn transactions_drop_results_cached_before_they_end() {
    let collector = Arc::new(Collector::new());
    let (db, _log) = seeded(&collector).await;

    assert_ok!(
        db.transaction(async |tx: &Db| {
            tx.model::<Item>().create(&mut Item::new("plum", 7)).await?;
            // Cached on the side before the commit
            db.cache()
                .set("table:items|stale", Vec::<tabula_core::stmt::Row>::new(), TTL);
            Ok(())
        })
        .await
    );

    assert!(db.cache().is_empty());
}
