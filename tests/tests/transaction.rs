use futures::FutureExt;
use pretty_assertions::assert_eq;
use std::{panic::AssertUnwindSafe, time::Duration};
use tests::prelude::*;

#[tokio::test]
async fn commits_when_the_body_succeeds() {
    let (db, log) = sqlite(|_| {}).await;

    let ids = assert_ok!(
        db.transaction(async |tx: &Db| {
            assert!(tx.in_transaction());

            let mut apple = Item::new("apple", 3);
            let mut pear = Item::new("pear", 10);
            tx.model::<Item>().create(&mut apple).await?;
            tx.model::<Item>().create(&mut pear).await?;
            Ok((apple.id, pear.id))
        })
        .await
    );
    assert_eq!(ids, (1, 2));

    let statements = log.statements();
    assert_eq!(statements.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(statements.last().map(String::as_str), Some("COMMIT"));
    assert_eq!(log.count("ROLLBACK"), 0);

    assert!(!db.in_transaction());
    assert_eq!(assert_ok!(db.model::<Item>().count().await), 2);
}

#[tokio::test]
async fn rolls_back_when_the_body_fails() {
    let (db, log) = sqlite(|builder| {
        builder.rule::<Item>("qty", Rule::Min(0));
    })
    .await;

    let err = assert_err!(
        db.transaction(async |tx: &Db| {
            tx.model::<Item>().create(&mut Item::new("apple", 3)).await?;
            tx.model::<Item>().create(&mut Item::new("debt", -1)).await?;
            Ok(())
        })
        .await
    );

    assert!(err.is_transaction_rolled_back());
    let cause = assert_some!(err.cause());
    assert_eq!(cause.validation_failure(), Some(("qty", "min")));

    assert_eq!(log.count("ROLLBACK"), 1);
    assert_eq!(log.count("COMMIT"), 0);
    assert_eq!(assert_ok!(db.model::<Item>().count().await), 0);
}

#[tokio::test]
async fn transactions_do_not_nest() {
    let (db, log) = sqlite(|_| {}).await;

    assert_ok!(
        db.transaction(async |tx: &Db| {
            let err = assert_err!(tx.transaction(async |_: &Db| Ok(())).await);
            assert!(err.is_nested_transaction());
            Ok(())
        })
        .await
    );

    assert_eq!(log.count("BEGIN"), 1);
    assert_eq!(log.count("COMMIT"), 1);
}

#[tokio::test]
async fn rolls_back_then_resumes_a_panic() {
    let (db, log) = sqlite(|_| {}).await;

    let res = AssertUnwindSafe(db.transaction(async |tx: &Db| {
        tx.model::<Item>().create(&mut Item::new("apple", 3)).await?;
        if tx.in_transaction() {
            panic!("boom");
        }
        Ok(())
    }))
    .catch_unwind()
    .await;
    assert!(res.is_err());

    assert_eq!(log.count("ROLLBACK"), 1);
    assert_eq!(assert_ok!(db.model::<Item>().count().await), 0);
}

#[tokio::test]
async fn dropped_transactions_roll_back() {
    let (db, log) = sqlite(|_| {}).await;

    let res = tokio::time::timeout(
        Duration::from_millis(50),
        db.transaction(async |tx: &Db| {
            tx.model::<Item>().create(&mut Item::new("apple", 3)).await?;
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }),
    )
    .await;
    assert!(res.is_err());

    // The rollback runs on a spawned task; the pool hands the connection
    // out again once it is done
    assert_eq!(assert_ok!(db.model::<Item>().count().await), 0);
    assert_eq!(log.count("ROLLBACK"), 1);
}
