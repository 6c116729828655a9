//! Admin catalog: the applications, models and fields registered with the
//! admin console, described as plain data.
//!
//! Descriptors are produced per request by a [`CatalogProvider`], already
//! filtered to what the requesting user may access. Consumers never compute
//! permissions themselves.

pub mod site;
pub mod source;
pub mod sql_source;

pub use site::{AdminSite, ModelRegistration};
pub use source::{
    FieldPath, FieldPredicate, MatchOp, ModelSource, ObjectHit, ObjectQuery, SourceError,
};
pub use sql_source::{RelationDef, RelationKind, SqlModelSource};

use std::sync::Arc;

use crate::auth::AuthUser;

/// Kind of a registered model field. Decides which fields the default
/// search strategy may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Short text
    Char,
    /// Key/slug text
    Slug,
    /// URL text
    Url,
    /// Long free-form text
    Text,
    Integer,
    Date,
    DateTime,
    Boolean,
    /// To-one relation
    ForeignKey,
    /// One-to-one relation, possibly doubling as the primary key
    OneToOne,
    /// To-many relation through a link table
    ManyToMany,
}

impl FieldKind {
    /// Short and long text kinds are candidates for containment filtering.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            FieldKind::Char | FieldKind::Slug | FieldKind::Url | FieldKind::Text
        )
    }
}

/// One field of a registered model, as shown in the admin.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Internal name, matching the column name for table-backed models
    pub name: String,
    /// Human label, when one was registered
    pub label: Option<String>,
    /// Help text shown next to the field, when one was registered
    pub help_text: Option<String>,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            help_text: None,
            kind,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn help(mut self, help_text: &str) -> Self {
        self.help_text = Some(help_text.to_string());
        self
    }
}

/// Permissions the requesting user holds on one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelPerms {
    /// View or change permission; either grants read access in the admin
    pub can_view: bool,
    /// Add permission, controls whether the add URL is exposed
    pub can_add: bool,
}

/// A model the requesting user holds at least one permission on.
#[derive(Clone)]
pub struct ModelDescriptor {
    /// Composite id, `<app_label>.<ClassName>`
    pub id: String,
    /// Plural display name, e.g. "Teams"
    pub name: String,
    /// Class name, e.g. "Team"
    pub class_name: String,
    /// Changelist URL, e.g. "/admin/teams/team/"
    pub url: String,
    /// Add-form URL, exposed in results only with add permission
    pub add_url: String,
    pub fields: Vec<FieldDescriptor>,
    pub perms: ModelPerms,
    /// Record store behind this model. `None` when the registration could
    /// not be resolved to a concrete store; search skips such models.
    pub source: Option<Arc<dyn ModelSource>>,
    /// Per-model search fields for the delegated strategy, passed through
    /// verbatim from registration. A `=` prefix requests exact matching, a
    /// dotted path traverses a relation.
    pub search_fields: Option<Vec<String>>,
}

impl std::fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("fields", &self.fields.len())
            .field("perms", &self.perms)
            .field("has_source", &self.source.is_some())
            .field("search_fields", &self.search_fields)
            .finish()
    }
}

/// An application with at least one model visible to the requesting user.
#[derive(Debug, Clone)]
pub struct AppDescriptor {
    /// App label, e.g. "teams"
    pub label: String,
    /// Display name, e.g. "Teams"
    pub name: String,
    /// Admin index URL of the app
    pub url: String,
    /// Whether the user holds module-level access to the app
    pub has_module_perms: bool,
    pub models: Vec<ModelDescriptor>,
}

/// Read-only view of the catalog for one user.
pub trait CatalogProvider: Send + Sync {
    /// Applications visible to the user, models filtered to those the user
    /// holds a permission on. Empty for users without admin access.
    fn app_list(&self, user: &AuthUser) -> Vec<AppDescriptor>;
}
