use pretty_assertions::assert_eq;
use tests::prelude::*;

async fn seeded() -> (Db, ExecLog) {
    let (db, log) = sqlite(|_| {}).await;
    for (name, age) in [("Alice", 30), ("Bob", 25), ("Carol", 41)] {
        assert_ok!(db.model::<User>().create(&mut User::new(name, age)).await);
    }
    log.clear();
    (db, log)
}

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.name.as_str()).collect()
}

#[tokio::test]
async fn delete_marks_rows_instead_of_removing_them() {
    let (db, log) = seeded().await;

    let rows = assert_ok!(db.model::<User>().filter("name", Op::Eq, "Bob").delete().await);
    assert_eq!(rows, 1);

    assert_eq!(log.count("DELETE"), 0);
    let update = assert_some!(log.pop());
    assert_eq!(
        update.sql,
        "UPDATE \"users\" SET \"deleted_at\" = ? WHERE \"name\" = ? AND \"deleted_at\" IS NULL"
    );

    let users = assert_ok!(db.model::<User>().order_by("id", false).find().await);
    assert_eq!(names(&users), ["Alice", "Carol"]);

    let all = assert_ok!(db.model::<User>().with_trashed().order_by("id", false).find().await);
    assert_eq!(names(&all), ["Alice", "Bob", "Carol"]);
    assert!(all[1].deleted_at.is_some());

    let trashed = assert_ok!(db.model::<User>().only_trashed().find().await);
    assert_eq!(names(&trashed), ["Bob"]);
}

#[tokio::test]
async fn finds_filter_out_trashed_rows() {
    let (db, log) = seeded().await;

    assert_ok!(db.model::<User>().find().await);
    assert_eq!(
        assert_some!(log.pop()).sql,
        "SELECT * FROM \"users\" WHERE \"deleted_at\" IS NULL"
    );
}

#[tokio::test]
async fn deleting_twice_touches_nothing() {
    let (db, _log) = seeded().await;

    assert_eq!(
        assert_ok!(db.model::<User>().filter("name", Op::Eq, "Bob").delete().await),
        1
    );
    let first = assert_ok!(db.model::<User>().only_trashed().get().await).deleted_at;

    assert_eq!(
        assert_ok!(db.model::<User>().filter("name", Op::Eq, "Bob").delete().await),
        0
    );
    let second = assert_ok!(db.model::<User>().only_trashed().get().await).deleted_at;
    assert_eq!(first, second);
}

#[tokio::test]
async fn restore_clears_the_mark() {
    let (db, _log) = seeded().await;
    assert_ok!(db.model::<User>().filter("age", Op::Gt, 28).delete().await);
    assert_eq!(assert_ok!(db.model::<User>().count().await), 1);

    let restored = assert_ok!(
        db.model::<User>()
            .filter("name", Op::Eq, "Carol")
            .restore()
            .await
    );
    assert_eq!(restored, 1);

    let users = assert_ok!(db.model::<User>().order_by("name", false).find().await);
    assert_eq!(names(&users), ["Bob", "Carol"]);
    assert_none!(users[1].deleted_at);
}

#[tokio::test]
async fn force_delete_removes_rows() {
    let (db, log) = seeded().await;

    let rows = assert_ok!(
        db.model::<User>()
            .filter("name", Op::Eq, "Alice")
            .force_delete()
            .await
    );
    assert_eq!(rows, 1);
    assert_eq!(
        assert_some!(log.pop()).sql,
        "DELETE FROM \"users\" WHERE \"name\" = ?"
    );

    let all = assert_ok!(db.model::<User>().with_trashed().count().await);
    assert_eq!(all, 2);
}

#[tokio::test]
async fn models_without_the_column_cannot_be_soft_deleted() {
    let (db, log) = sqlite(|_| {}).await;

    let err = assert_err!(db.model::<Item>().filter("id", Op::Eq, 1).soft_delete().await);
    assert!(err.is_unsupported_operation());

    let err = assert_err!(db.model::<Item>().filter("id", Op::Eq, 1).restore().await);
    assert!(err.is_unsupported_operation());

    assert!(log.is_empty());
}

#[tokio::test]
async fn soft_delete_column_is_configurable() {
    let (db, log) = sqlite(|builder| {
        builder.soft_delete_column("removed_at");
    })
    .await;

    // `users` has no `removed_at`, so deletes are physical
    assert_ok!(db.model::<User>().create(&mut User::new("Alice", 30)).await);
    log.clear();
    assert_ok!(db.model::<User>().filter("name", Op::Eq, "Alice").delete().await);
    assert_eq!(log.count("DELETE FROM \"users\""), 1);
}
