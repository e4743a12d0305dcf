//! Callbacks around create, update, delete and query.

use tabula_core::{stmt::Condition, Result};

use std::{any::Any, any::TypeId, collections::HashMap, fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeCreate,
    AfterCreate,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
    BeforeQuery,
    AfterQuery,
}

/// What a hook is told about the operation it runs around.
pub struct HookContext<'a> {
    pub point: HookPoint,
    pub table: &'a str,

    /// WHERE conditions of the statement, when it has any
    pub conditions: &'a [Condition],

    /// Rows written or returned. Set for `After*` points only.
    pub rows: Option<u64>,

    record: Option<&'a (dyn Any + Send + Sync)>,
}

/// A lifecycle callback. Returning an error aborts the operation and skips
/// the remaining hooks for that point.
pub type Hook = Arc<dyn Fn(&HookContext<'_>) -> Result<()> + Send + Sync>;

#[derive(Clone)]
struct Registered {
    /// `None` runs for every model
    model: Option<TypeId>,
    hook: Hook,
}

#[derive(Clone, Default)]
pub(crate) struct Hooks {
    hooks: HashMap<HookPoint, Vec<Registered>>,
}

impl HookPoint {
    pub fn name(self) -> &'static str {
        match self {
            HookPoint::BeforeCreate => "before_create",
            HookPoint::AfterCreate => "after_create",
            HookPoint::BeforeUpdate => "before_update",
            HookPoint::AfterUpdate => "after_update",
            HookPoint::BeforeDelete => "before_delete",
            HookPoint::AfterDelete => "after_delete",
            HookPoint::BeforeQuery => "before_query",
            HookPoint::AfterQuery => "after_query",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(point: HookPoint, table: &'a str) -> HookContext<'a> {
        HookContext {
            point,
            table,
            conditions: &[],
            rows: None,
            record: None,
        }
    }

    pub(crate) fn conditions(mut self, conditions: &'a [Condition]) -> Self {
        self.conditions = conditions;
        self
    }

    pub(crate) fn rows(mut self, rows: u64) -> Self {
        self.rows = Some(rows);
        self
    }

    pub(crate) fn record<M: Any + Send + Sync>(mut self, record: &'a M) -> Self {
        self.record = Some(record);
        self
    }

    /// The record being written, if the operation has one and it is an `M`.
    pub fn get<M: Any>(&self) -> Option<&M> {
        self.record.and_then(|record| record.downcast_ref())
    }
}

impl Hooks {
    pub(crate) fn add(&mut self, point: HookPoint, model: Option<TypeId>, hook: Hook) {
        self.hooks
            .entry(point)
            .or_default()
            .push(Registered { model, hook });
    }

    /// Runs the hooks registered for `cx.point` in registration order,
    /// stopping at the first failure.
    pub(crate) fn run(&self, model: TypeId, cx: &HookContext<'_>) -> Result<()> {
        let Some(hooks) = self.hooks.get(&cx.point) else {
            return Ok(());
        };

        for registered in hooks
            .iter()
            .filter(|registered| registered.model.is_none_or(|m| m == model))
        {
            if let Err(err) = (registered.hook)(cx) {
                tracing::debug!(hook = %cx.point, table = cx.table, %err, "hook failed");
                return Err(err);
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.hooks.iter().map(|(point, hooks)| (point, hooks.len())))
            .finish()
    }
}
