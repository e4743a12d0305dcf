use pretty_assertions::assert_eq;
use tabula::stmt::Query;
use tests::prelude::*;

async fn seeded() -> (Db, ExecLog) {
    let (db, log) = sqlite(|builder| {
        builder
            .scope::<User>("adults", |q: &mut Query| {
                q.filter("age", Op::Ge, 18);
            })
            .named_scope::<User>("seniors", |q: &mut Query| {
                q.filter("age", Op::Ge, 65);
            })
            .named_scope::<User>("by_age", |q: &mut Query| {
                q.order_by("age", true);
            });
    })
    .await;

    for (name, age) in [("Tim", 12), ("Alice", 30), ("Ruth", 70), ("Bob", 25)] {
        assert_ok!(db.model::<User>().create(&mut User::new(name, age)).await);
    }
    log.clear();
    (db, log)
}

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.name.as_str()).collect()
}

#[tokio::test]
async fn default_scopes_apply_to_every_find() {
    let (db, log) = seeded().await;

    let users = assert_ok!(db.model::<User>().order_by("id", false).find().await);
    assert_eq!(names(&users), ["Alice", "Ruth", "Bob"]);
    assert_eq!(assert_ok!(db.model::<User>().count().await), 3);

    // Scope conditions come before the query's own
    assert_ok!(db.model::<User>().filter("name", Op::Eq, "Bob").find().await);
    assert_eq!(
        assert_some!(log.last()).sql,
        "SELECT * FROM \"users\" WHERE \"age\" >= ? AND \"name\" = ? AND \"deleted_at\" IS NULL"
    );
}

#[tokio::test]
async fn named_scopes_are_opt_in() {
    let (db, _log) = seeded().await;

    let seniors = assert_ok!(db.model::<User>().scope("seniors").find().await);
    assert_eq!(names(&seniors), ["Ruth"]);

    let by_age = assert_ok!(db.model::<User>().scope("by_age").find().await);
    assert_eq!(names(&by_age), ["Ruth", "Alice", "Bob"]);
}

#[tokio::test]
async fn unscoped_skips_defaults_but_not_named_scopes() {
    let (db, _log) = seeded().await;

    let everyone = assert_ok!(db.model::<User>().unscoped().scope("by_age").find().await);
    assert_eq!(names(&everyone), ["Ruth", "Alice", "Bob", "Tim"]);
}

#[tokio::test]
async fn unknown_named_scopes_fail() {
    let (db, log) = seeded().await;

    let err = assert_err!(db.model::<User>().scope("vip").find().await);
    assert_eq!(err.to_string(), "no scope `vip` for `users`");
    assert!(log.is_empty());

    // Named scopes belong to one model
    assert_err!(db.model::<Item>().scope("seniors").find().await);
}

#[tokio::test]
async fn global_scopes_apply_to_every_model() {
    let (db, log) = sqlite(|builder| {
        builder.global_scope("newest_first", |q: &mut Query| {
            q.order_by("id", true);
        });
    })
    .await;

    for (name, qty) in [("apple", 3), ("pear", 10)] {
        assert_ok!(db.model::<Item>().create(&mut Item::new(name, qty)).await);
    }
    assert_ok!(db.model::<User>().create(&mut User::new("Alice", 30)).await);
    log.clear();

    let items = assert_ok!(db.model::<Item>().find().await);
    assert_eq!(items[0].name, "pear");

    assert_ok!(db.model::<User>().find().await);
    assert_eq!(
        assert_some!(log.last()).sql,
        "SELECT * FROM \"users\" WHERE \"deleted_at\" IS NULL ORDER BY \"id\" DESC"
    );

    let items = assert_ok!(db.model::<Item>().unscoped().find().await);
    assert_eq!(items[0].name, "apple");
}

#[tokio::test]
async fn scopes_do_not_narrow_writes() {
    let (db, _log) = seeded().await;

    let rows = assert_ok!(
        db.model::<User>()
            .filter("age", Op::Lt, 100)
            .update_columns([("email", "redacted@example.com")])
            .await
    );
    assert_eq!(rows, 4);
}
