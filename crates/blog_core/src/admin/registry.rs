//! Entity registration table for the admin surface.

use crate::admin::{AdminError, AdminResult};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Pseudo-field rendering the entity's display label.
pub const LABEL_FIELD: &str = "label";

/// Entity kinds exposed to the admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Post,
    Tag,
    Comment,
}

/// Storage shape of an entity field, as far as the admin cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Value,
    ForeignKey,
    ManyToMany,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Post, Self::Tag, Self::Comment];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Tag => "tag",
            Self::Comment => "comment",
        }
    }

    /// Known fields with their storage shape.
    pub fn fields(self) -> &'static [(&'static str, FieldKind)] {
        match self {
            Self::Post => &[
                ("id", FieldKind::Value),
                ("title", FieldKind::Value),
                ("text", FieldKind::Value),
                ("slug", FieldKind::Value),
                ("image", FieldKind::Value),
                ("published_at", FieldKind::Value),
                ("author", FieldKind::ForeignKey),
                ("likes", FieldKind::ManyToMany),
                ("tags", FieldKind::ManyToMany),
            ],
            Self::Tag => &[("id", FieldKind::Value), ("title", FieldKind::Value)],
            Self::Comment => &[
                ("id", FieldKind::Value),
                ("post", FieldKind::ForeignKey),
                ("author", FieldKind::ForeignKey),
                ("text", FieldKind::Value),
                ("published_at", FieldKind::Value),
            ],
        }
    }

    pub fn field_kind(self, field: &str) -> Option<FieldKind> {
        if field == LABEL_FIELD {
            return Some(FieldKind::Value);
        }
        self.fields()
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AdminError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| AdminError::UnknownEntity(value.to_string()))
    }
}

/// List-view and picker configuration for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Columns shown in the list view, in order.
    pub list_display: Vec<&'static str>,
    /// Relation fields edited through a raw-identifier input instead of a
    /// rendered choice list.
    pub raw_id_fields: Vec<&'static str>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            list_display: vec![LABEL_FIELD],
            raw_id_fields: Vec::new(),
        }
    }
}

impl AdminConfig {
    pub fn new(list_display: Vec<&'static str>, raw_id_fields: Vec<&'static str>) -> Self {
        Self {
            list_display,
            raw_id_fields,
        }
    }

    fn check(&self, kind: EntityKind) -> AdminResult<()> {
        for field in &self.list_display {
            match kind.field_kind(field) {
                None => {
                    return Err(AdminError::UnknownField {
                        kind,
                        field: field.to_string(),
                    })
                }
                Some(FieldKind::ManyToMany) => {
                    return Err(AdminError::ManyToManyInListDisplay {
                        kind,
                        field: field.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        for field in &self.raw_id_fields {
            match kind.field_kind(field) {
                None => {
                    return Err(AdminError::UnknownField {
                        kind,
                        field: field.to_string(),
                    })
                }
                Some(FieldKind::Value) => {
                    return Err(AdminError::NotRelationField {
                        kind,
                        field: field.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Explicit registration table, built once at startup and passed around.
#[derive(Debug, Clone, Default)]
pub struct AdminRegistry {
    entries: BTreeMap<EntityKind, AdminConfig>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for the blog: posts and comments pick related rows by id.
    pub fn blog_default() -> AdminResult<Self> {
        let mut registry = Self::new();
        registry.register(
            EntityKind::Post,
            AdminConfig::new(
                vec!["title", "published_at"],
                vec!["author", "likes", "tags"],
            ),
        )?;
        registry.register(EntityKind::Tag, AdminConfig::default())?;
        registry.register(
            EntityKind::Comment,
            AdminConfig::new(vec!["published_at", "author"], vec!["post", "author"]),
        )?;
        Ok(registry)
    }

    pub fn register(&mut self, kind: EntityKind, config: AdminConfig) -> AdminResult<()> {
        if self.entries.contains_key(&kind) {
            return Err(AdminError::AlreadyRegistered(kind));
        }
        config.check(kind)?;
        self.entries.insert(kind, config);
        Ok(())
    }

    pub fn get(&self, kind: EntityKind) -> AdminResult<&AdminConfig> {
        self.entries
            .get(&kind)
            .ok_or(AdminError::NotRegistered(kind))
    }

    pub fn is_registered(&self, kind: EntityKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<EntityKind> {
        self.entries.keys().copied().collect()
    }
}
