//! Relations between models and eager loading of related records.

use crate::{model::Registry, Db, Model};

use tabula_core::{
    schema::{Relation, RelationKind},
    stmt::{Condition, Row, Value},
    Error, Result,
};
use tabula_sql::stmt::Query;

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Rows fetched for one relation.
pub(crate) struct Loaded {
    /// Join table rows, many-to-many only
    join: Vec<Row>,
    targets: Vec<Row>,
}

type AttachFn<O> = Arc<dyn Fn(&Registry, &Relation, &mut [O], Loaded) -> Result<()> + Send + Sync>;

/// A registered relation from owner `O`.
pub(crate) struct RelationLoader<O> {
    pub(crate) relation: Relation,
    target: TypeId,
    preload: AtomicBool,
    attach: AttachFn<O>,
}

/// Relations keyed by owner type.
#[derive(Default)]
pub(crate) struct Relations {
    /// Each value is a `Vec<RelationLoader<O>>` for its owner `O`
    by_owner: HashMap<TypeId, Box<dyn Any + Send + Sync>>,

    /// `(owner, field, target)` of every relation
    edges: Vec<(&'static str, String, TypeId)>,
}

impl<O: Model> RelationLoader<O> {
    /// `attach` receives every related record of one owner.
    pub(crate) fn new<T: Model>(
        relation: Relation,
        attach: impl Fn(&mut O, Vec<T>) + Send + Sync + 'static,
    ) -> RelationLoader<O> {
        RelationLoader {
            preload: AtomicBool::new(relation.preload),
            relation,
            target: TypeId::of::<T>(),
            attach: Arc::new(
                move |registry: &Registry, relation: &Relation, owners: &mut [O], loaded: Loaded| {
                    attach_loaded::<O, T>(registry, relation, owners, loaded, &attach)
                },
            ),
        }
    }

    pub(crate) fn preload(&self) -> bool {
        self.preload.load(Ordering::Relaxed)
    }
}

impl Relations {
    pub(crate) fn add<O: Model>(&mut self, loader: RelationLoader<O>) -> Result<()> {
        let loaders = self
            .by_owner
            .entry(TypeId::of::<O>())
            .or_insert_with(|| Box::new(Vec::<RelationLoader<O>>::new()))
            .downcast_mut::<Vec<RelationLoader<O>>>()
            .ok_or_else(|| tabula_core::err!("relation registry holds the wrong owner type"))?;

        if loaders
            .iter()
            .any(|existing| existing.relation.field == loader.relation.field)
        {
            return Err(Error::invalid_mapping(
                std::any::type_name::<O>(),
                format!("relation `{}` is registered twice", loader.relation.field),
            ));
        }

        self.edges.push((
            std::any::type_name::<O>(),
            loader.relation.field.clone(),
            loader.target,
        ));
        loaders.push(loader);
        Ok(())
    }

    pub(crate) fn of<O: Model>(&self) -> &[RelationLoader<O>] {
        self.by_owner
            .get(&TypeId::of::<O>())
            .and_then(|loaders| loaders.downcast_ref::<Vec<RelationLoader<O>>>())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Checks that every relation targets a registered model.
    pub(crate) fn check(&self, registry: &Registry) -> Result<()> {
        for (owner, field, target) in &self.edges {
            if !registry.contains(*target) {
                return Err(Error::invalid_mapping(
                    *owner,
                    format!("relation `{field}` targets a model that is not registered"),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Relations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relations")
            .field("owners", &self.by_owner.len())
            .finish()
    }
}

/// Stable grouping key for a column value. Nulls never match.
fn group_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        value => Some(format!("{value:?}")),
    }
}

fn column<'a>(row: &'a Row, name: &str) -> Result<&'a Value> {
    row.get(name)
        .ok_or_else(|| tabula_core::err!("related row has no column `{name}`"))
}

fn attach_loaded<O: Model, T: Model>(
    registry: &Registry,
    relation: &Relation,
    owners: &mut [O],
    loaded: Loaded,
    attach: &(impl Fn(&mut O, Vec<T>) + ?Sized),
) -> Result<()> {
    let owner_schema = registry.schema::<O>()?;
    let target_schema = registry.schema::<T>()?;

    // Owner reference key -> related rows
    let mut groups: HashMap<String, Vec<Row>> = HashMap::new();

    match relation.kind {
        RelationKind::OneToOne | RelationKind::OneToMany => {
            for row in loaded.targets {
                if let Some(key) = group_key(column(&row, &relation.foreign_key)?) {
                    groups.entry(key).or_default().push(row);
                }
            }
        }
        RelationKind::ManyToMany => {
            let join_table = relation.join_table.as_ref().ok_or_else(|| {
                tabula_core::err!("many-to-many relation `{}` has no join table", relation.field)
            })?;

            let mut targets = HashMap::new();
            for row in loaded.targets {
                if let Some(key) = group_key(column(&row, &relation.target_key)?) {
                    targets.insert(key, row);
                }
            }

            for link in &loaded.join {
                let owner = group_key(column(link, &join_table.owner_column)?);
                let target = group_key(column(link, &join_table.target_column)?);
                if let (Some(owner), Some(target)) = (owner, target.and_then(|t| targets.get(&t)))
                {
                    groups.entry(owner).or_default().push(target.clone());
                }
            }
        }
    }

    for owner in owners.iter_mut() {
        let rows = owner_schema
            .get(owner, &relation.reference_key)
            .as_ref()
            .and_then(group_key)
            .and_then(|key| groups.get(&key))
            .cloned()
            .unwrap_or_default();

        let records = rows
            .into_iter()
            .map(|row| target_schema.load(row))
            .collect::<Result<Vec<T>>>()?;
        attach(owner, records);
    }

    Ok(())
}

impl Db {
    /// Loads the relations of `records` that have preloading enabled, plus
    /// the ones named in `fields`.
    pub(crate) async fn preload<O: Model>(&self, records: &mut [O], fields: &[String]) -> Result<()> {
        let loaders = self.shared.relations.of::<O>();

        for field in fields {
            if !loaders.iter().any(|loader| &loader.relation.field == field) {
                return Err(tabula_core::err!(
                    "`{}` has no relation `{field}`",
                    std::any::type_name::<O>()
                ));
            }
        }

        if records.is_empty() {
            return Ok(());
        }

        let schema = self.shared.models.schema::<O>()?;

        for loader in loaders
            .iter()
            .filter(|loader| loader.preload() || fields.contains(&loader.relation.field))
        {
            let relation = &loader.relation;
            let mut keys = vec![];
            let mut seen = std::collections::HashSet::new();
            for record in records.iter() {
                let Some(key) = schema.get(record, &relation.reference_key) else {
                    return Err(Error::invalid_mapping(
                        schema.name(),
                        format!("relation key `{}` is not a field", relation.reference_key),
                    ));
                };
                if group_key(&key).is_some_and(|k| seen.insert(k)) {
                    keys.push(key);
                }
            }

            let loaded = if keys.is_empty() {
                Loaded {
                    join: vec![],
                    targets: vec![],
                }
            } else {
                self.load_relation(relation, keys).await?
            };

            tracing::debug!(
                relation = %relation.field,
                target = %relation.target_table,
                rows = loaded.targets.len(),
                "preloaded relation"
            );

            (loader.attach)(&self.shared.models, relation, records, loaded)?;
        }

        Ok(())
    }

    async fn load_relation(&self, relation: &Relation, keys: Vec<Value>) -> Result<Loaded> {
        match relation.kind {
            RelationKind::OneToOne if keys.len() == 1 => {
                let mut query = Query::new(&relation.target_table);
                query
                    .condition(Condition::eq(&relation.foreign_key, keys[0].clone()))
                    .limit(1);
                Ok(Loaded {
                    join: vec![],
                    targets: self.query_rows(query).await?,
                })
            }
            RelationKind::OneToOne | RelationKind::OneToMany => {
                let mut query = Query::new(&relation.target_table);
                query.condition(Condition::in_list(&relation.foreign_key, keys));
                Ok(Loaded {
                    join: vec![],
                    targets: self.query_rows(query).await?,
                })
            }
            RelationKind::ManyToMany => {
                let join_table = relation.join_table.as_ref().ok_or_else(|| {
                    tabula_core::err!("many-to-many relation `{}` has no join table", relation.field)
                })?;

                let mut query = Query::new(&join_table.name);
                query
                    .select([&join_table.owner_column, &join_table.target_column])
                    .condition(Condition::in_list(&join_table.owner_column, keys));
                let join = self.query_rows(query).await?;

                let mut seen = std::collections::HashSet::new();
                let mut target_keys = vec![];
                for link in &join {
                    let key = column(link, &join_table.target_column)?;
                    if group_key(key).is_some_and(|k| seen.insert(k)) {
                        target_keys.push(key.clone());
                    }
                }

                let targets = if target_keys.is_empty() {
                    vec![]
                } else {
                    let mut query = Query::new(&relation.target_table);
                    query.condition(Condition::in_list(&relation.target_key, target_keys));
                    self.query_rows(query).await?
                };

                Ok(Loaded { join, targets })
            }
        }
    }

    /// Turns default preloading of `field` on `O` on or off.
    pub fn set_preload<O: Model>(&self, field: &str, preload: bool) -> Result<()> {
        let loader = self
            .shared
            .relations
            .of::<O>()
            .iter()
            .find(|loader| loader.relation.field == field)
            .ok_or_else(|| {
                tabula_core::err!("`{}` has no relation `{field}`", std::any::type_name::<O>())
            })?;
        loader.preload.store(preload, Ordering::Relaxed);
        Ok(())
    }

    /// Relation fields of `O` loaded by every query.
    pub fn preload_fields<O: Model>(&self) -> Vec<String> {
        self.shared
            .relations
            .of::<O>()
            .iter()
            .filter(|loader| loader.preload())
            .map(|loader| loader.relation.field.clone())
            .collect()
    }
}
