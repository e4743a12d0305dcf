/// Cardinality of a relation between two mapped types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// Join table linking both sides of a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    pub name: String,

    /// Column holding the owner's reference key
    pub owner_column: String,

    /// Column holding the target's key
    pub target_column: String,
}

/// A relation from an owner table to a target table.
///
/// For one-to-one and one-to-many relations, `target.foreign_key` holds the
/// owner's `reference_key`. Many-to-many relations go through `join_table`,
/// whose `target_column` references the target's `target_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,

    /// Field on the owner that receives the loaded records
    pub field: String,

    /// Table the related records live in
    pub target_table: String,

    pub foreign_key: String,

    pub reference_key: String,

    /// Key on the target matched by the join table. Many-to-many only.
    pub target_key: String,

    pub join_table: Option<JoinTable>,

    /// Whether the relation is loaded on every query
    pub preload: bool,
}

impl Relation {
    fn new(
        kind: RelationKind,
        field: impl Into<String>,
        target_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Relation {
        Relation {
            kind,
            field: field.into(),
            target_table: target_table.into(),
            foreign_key: foreign_key.into(),
            reference_key: "id".to_string(),
            target_key: "id".to_string(),
            join_table: None,
            preload: false,
        }
    }

    pub fn has_one(
        field: impl Into<String>,
        target_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Relation {
        Relation::new(RelationKind::OneToOne, field, target_table, foreign_key)
    }

    pub fn has_many(
        field: impl Into<String>,
        target_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Relation {
        Relation::new(RelationKind::OneToMany, field, target_table, foreign_key)
    }

    /// A many-to-many relation through `join_table`. The join table's
    /// `owner_column` doubles as the relation's foreign key.
    pub fn many_to_many(
        field: impl Into<String>,
        target_table: impl Into<String>,
        join_table: JoinTable,
    ) -> Relation {
        let mut relation = Relation::new(
            RelationKind::ManyToMany,
            field,
            target_table,
            join_table.owner_column.clone(),
        );
        relation.join_table = Some(join_table);
        relation
    }

    pub fn reference_key(mut self, key: impl Into<String>) -> Self {
        self.reference_key = key.into();
        self
    }

    pub fn target_key(mut self, key: impl Into<String>) -> Self {
        self.target_key = key.into();
        self
    }

    pub fn preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }
}
