use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use tabula::HookContext;
use tests::prelude::*;

/// Records `point table rows` for every hook call.
#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    fn push(&self, cx: &HookContext<'_>) {
        let rows = cx.rows.map(|rows| format!(" {rows}")).unwrap_or_default();
        self.0
            .lock()
            .unwrap()
            .push(format!("{} {}{rows}", cx.point, cx.table));
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

const POINTS: [HookPoint; 8] = [
    HookPoint::BeforeCreate,
    HookPoint::AfterCreate,
    HookPoint::BeforeUpdate,
    HookPoint::AfterUpdate,
    HookPoint::BeforeDelete,
    HookPoint::AfterDelete,
    HookPoint::BeforeQuery,
    HookPoint::AfterQuery,
];

#[tokio::test]
async fn hooks_run_around_every_operation() {
    let calls = Calls::default();
    let (db, _log) = sqlite(|builder| {
        for point in POINTS {
            let calls = calls.clone();
            builder.hook(point, move |cx: &HookContext<'_>| {
                calls.push(cx);
                Ok(())
            });
        }
    })
    .await;

    let mut item = Item::new("apple", 3);
    assert_ok!(db.model::<Item>().create(&mut item).await);
    assert_eq!(calls.take(), ["before_create items", "after_create items 1"]);

    item.qty = 4;
    assert_ok!(db.model::<Item>().update(&item).await);
    assert_eq!(calls.take(), ["before_update items", "after_update items 1"]);

    assert_ok!(db.model::<Item>().find().await);
    assert_eq!(calls.take(), ["before_query items", "after_query items 1"]);

    assert_ok!(db.model::<Item>().filter("id", Op::Eq, item.id).delete().await);
    assert_eq!(calls.take(), ["before_delete items", "after_delete items 1"]);
}

#[tokio::test]
async fn counts_run_query_hooks() {
    let calls = Calls::default();
    let (db, _log) = sqlite(|builder| {
        for point in [HookPoint::BeforeQuery, HookPoint::AfterQuery] {
            let calls = calls.clone();
            builder.hook(point, move |cx: &HookContext<'_>| {
                calls.push(cx);
                Ok(())
            });
        }
    })
    .await;

    for name in ["apple", "pear"] {
        assert_ok!(db.model::<Item>().create(&mut Item::new(name, 3)).await);
    }
    assert_eq!(assert_ok!(db.model::<Item>().count().await), 2);
    assert_eq!(calls.take(), ["before_query items", "after_query items 2"]);
}

#[tokio::test]
async fn failing_before_hook_aborts_without_sql() {
    let (db, log) = sqlite(|builder| {
        builder.hook(HookPoint::BeforeCreate, |cx: &HookContext<'_>| {
            match cx.get::<Item>() {
                Some(item) if item.name == "forbidden" => {
                    tabula_core::bail!("`{}` may not be created", item.name)
                }
                _ => Ok(()),
            }
        });
    })
    .await;

    let err = assert_err!(
        db.model::<Item>()
            .create(&mut Item::new("forbidden", 1))
            .await
    );
    assert_eq!(err.to_string(), "`forbidden` may not be created");
    assert!(log.is_empty());

    assert_ok!(db.model::<Item>().create(&mut Item::new("allowed", 1)).await);
    assert_eq!(log.count("INSERT"), 1);
}

#[tokio::test]
async fn first_failing_hook_stops_the_chain() {
    let calls = Calls::default();
    let (db, _log) = sqlite(|builder| {
        for fail in [false, true, false] {
            let calls = calls.clone();
            builder.hook(HookPoint::BeforeQuery, move |cx: &HookContext<'_>| {
                calls.push(cx);
                if fail {
                    tabula_core::bail!("no reads today");
                }
                Ok(())
            });
        }
    })
    .await;

    assert_err!(db.model::<Item>().find().await);
    assert_eq!(calls.take().len(), 2);
}

#[tokio::test]
async fn model_hooks_only_see_their_model() {
    let calls = Calls::default();
    let (db, _log) = sqlite(|builder| {
        let calls = calls.clone();
        builder.model_hook::<User>(HookPoint::AfterCreate, move |cx: &HookContext<'_>| {
            let user = cx.get::<User>().expect("user record");
            assert_ne!(user.id, 0);
            calls.push(cx);
            Ok(())
        });
    })
    .await;

    assert_ok!(db.model::<Item>().create(&mut Item::new("apple", 3)).await);
    assert!(calls.take().is_empty());

    assert_ok!(db.model::<User>().create(&mut User::new("Alice", 30)).await);
    assert_eq!(calls.take(), ["after_create users 1"]);
}

#[tokio::test]
async fn failing_after_hook_still_reports_the_error() {
    let (db, _log) = sqlite(|builder| {
        builder.hook(HookPoint::AfterCreate, |_: &HookContext<'_>| {
            tabula_core::bail!("audit log unavailable")
        });
    })
    .await;

    let err = assert_err!(db.model::<Item>().create(&mut Item::new("apple", 3)).await);
    assert_eq!(err.to_string(), "audit log unavailable");

    // The row itself was written
    assert_eq!(assert_ok!(db.model::<Item>().count().await), 1);
}

#[tokio::test]
async fn update_columns_hooks_see_conditions() {
    let conditions = Arc::new(Mutex::new(vec![]));
    let (db, _log) = sqlite(|builder| {
        let conditions = conditions.clone();
        builder.hook(HookPoint::BeforeUpdate, move |cx: &HookContext<'_>| {
            assert!(cx.get::<Item>().is_none());
            conditions.lock().unwrap().extend(cx.conditions.iter().cloned());
            Ok(())
        });
    })
    .await;

    assert_ok!(
        db.model::<Item>()
            .filter("qty", Op::Lt, 5)
            .update_columns([("qty", 5)])
            .await
    );
    assert_eq!(*conditions.lock().unwrap(), [Condition::lt("qty", 5)]);
}

#[tokio::test]
async fn invalid_records_are_never_written() {
    let (db, log) = sqlite(|builder| {
        builder
            .rule::<User>("name", Rule::Required)
            .rule::<User>("email", Rule::Email)
            .rule::<User>("age", Rule::Min(0))
            .rule::<User>("age", Rule::Max(150));
    })
    .await;

    let err = assert_err!(db.model::<User>().create(&mut User::new("", 30)).await);
    assert_eq!(err.validation_failure(), Some(("name", "required")));

    let mut user = User::new("Alice", 30);
    user.email = "alice-at-example".into();
    let err = assert_err!(db.model::<User>().create(&mut user).await);
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "validation failed for `email` (email): must be a valid email address"
    );

    let err = assert_err!(db.model::<User>().create(&mut User::new("Old", 151)).await);
    assert_eq!(err.validation_failure(), Some(("age", "max")));

    assert!(log.is_empty());
}

#[tokio::test]
async fn updates_are_validated_too() {
    let (db, log) = sqlite(|builder| {
        builder.rule::<Item>("name", Rule::MaxLength(5));
    })
    .await;

    let mut item = Item::new("apple", 3);
    assert_ok!(db.model::<Item>().create(&mut item).await);
    log.clear();

    item.name = "pineapple".into();
    let err = assert_err!(db.model::<Item>().update(&item).await);
    assert_eq!(err.validation_failure(), Some(("name", "max_length")));
    assert!(log.is_empty());
}

#[tokio::test]
async fn custom_rules() {
    let (db, _log) = sqlite(|builder| {
        builder.rule::<Item>(
            "qty",
            Rule::custom("even", |value: &Value| match value.as_i64() {
                Some(n) if n % 2 != 0 => Err("must be even".into()),
                _ => Ok(()),
            }),
        );
    })
    .await;

    let err = assert_err!(db.model::<Item>().create(&mut Item::new("apple", 3)).await);
    assert_eq!(err.validation_failure(), Some(("qty", "even")));
    assert_ok!(db.model::<Item>().create(&mut Item::new("apple", 4)).await);
}

#[tokio::test]
async fn rules_on_unknown_fields_fail_the_build() {
    let mut builder = Db::builder();
    tests::models::register_all(&mut builder);
    builder.rule::<Item>("colour", Rule::Required);

    let err = assert_err!(builder.build(MockDriver::sqlite()).await);
    assert!(err.is_invalid_mapping());
}
