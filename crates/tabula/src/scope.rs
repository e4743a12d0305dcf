//! Reusable query modifiers.
//!
//! Global scopes apply to every model's finds. Default scopes apply to one
//! model's finds. Named scopes apply only when a query asks for them with
//! [`ModelQuery::scope`](crate::ModelQuery::scope).

use tabula_core::Result;
use tabula_sql::stmt::Query;

use std::{any::TypeId, collections::HashMap, fmt, sync::Arc};

/// A query modifier.
pub type ScopeFn = Arc<dyn Fn(&mut Query) + Send + Sync>;

#[derive(Clone)]
struct Scope {
    name: String,
    apply: ScopeFn,
}

#[derive(Clone, Default)]
pub(crate) struct Scopes {
    global: Vec<Scope>,
    defaults: HashMap<TypeId, Vec<Scope>>,
    named: HashMap<TypeId, Vec<Scope>>,
}

impl Scopes {
    pub(crate) fn add_global(&mut self, name: String, apply: ScopeFn) {
        self.global.push(Scope { name, apply });
    }

    pub(crate) fn add_default(&mut self, model: TypeId, name: String, apply: ScopeFn) {
        self.defaults
            .entry(model)
            .or_default()
            .push(Scope { name, apply });
    }

    pub(crate) fn add_named(&mut self, model: TypeId, name: String, apply: ScopeFn) {
        self.named
            .entry(model)
            .or_default()
            .push(Scope { name, apply });
    }

    /// Applies global scopes, then the model's default scopes, each in
    /// registration order.
    pub(crate) fn apply_defaults(&self, model: TypeId, query: &mut Query) {
        let defaults = self.defaults.get(&model).into_iter().flatten();
        for scope in self.global.iter().chain(defaults) {
            tracing::trace!(scope = %scope.name, table = %query.table, "apply scope");
            (scope.apply)(query);
        }
    }

    pub(crate) fn apply_named(&self, model: TypeId, name: &str, query: &mut Query) -> Result<()> {
        let scope = self
            .named
            .get(&model)
            .and_then(|scopes| scopes.iter().find(|scope| scope.name == name))
            .ok_or_else(|| tabula_core::err!("no scope `{name}` for `{}`", query.table))?;
        (scope.apply)(query);
        Ok(())
    }
}

impl fmt::Debug for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |scopes: &[Scope]| scopes.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        f.debug_struct("Scopes")
            .field("global", &names(&self.global))
            .field("defaults", &self.defaults.len())
            .field("named", &self.named.len())
            .finish()
    }
}
