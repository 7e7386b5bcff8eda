//! Administrative surface configuration.
//!
//! # Responsibility
//! - Hold an explicit registration table mapping each entity kind to its
//!   list-view columns and raw-identifier picker fields.
//! - Render list-view rows and raw-identifier labels from the content store.
//!
//! # Invariants
//! - Each entity kind is registered at most once.
//! - Registered field names are checked against the entity's known fields.
//! - Many-to-many fields are never list-view columns.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod list_view;
pub mod registry;

pub use list_view::{list_rows, raw_id_label, AdminRow};
pub use registry::{AdminConfig, AdminRegistry, EntityKind, FieldKind, LABEL_FIELD};

pub type AdminResult<T> = Result<T, AdminError>;

#[derive(Debug)]
pub enum AdminError {
    /// Entity name does not match any known kind.
    UnknownEntity(String),
    AlreadyRegistered(EntityKind),
    NotRegistered(EntityKind),
    UnknownField {
        kind: EntityKind,
        field: String,
    },
    /// Many-to-many fields cannot be rendered as a single list column.
    ManyToManyInListDisplay {
        kind: EntityKind,
        field: String,
    },
    /// Raw-identifier pickers only apply to relation fields.
    NotRelationField {
        kind: EntityKind,
        field: String,
    },
    /// Field is valid but not configured as a raw-identifier picker.
    NotRawIdField {
        kind: EntityKind,
        field: String,
    },
    Repo(RepoError),
}

impl Display for AdminError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntity(value) => write!(f, "unknown entity `{value}`"),
            Self::AlreadyRegistered(kind) => write!(f, "{kind} is already registered"),
            Self::NotRegistered(kind) => write!(f, "{kind} is not registered"),
            Self::UnknownField { kind, field } => write!(f, "{kind} has no field `{field}`"),
            Self::ManyToManyInListDisplay { kind, field } => write!(
                f,
                "{kind}.{field} is many-to-many and cannot be a list column"
            ),
            Self::NotRelationField { kind, field } => {
                write!(f, "{kind}.{field} is not a relation field")
            }
            Self::NotRawIdField { kind, field } => {
                write!(f, "{kind}.{field} is not a raw-id field")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AdminError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
