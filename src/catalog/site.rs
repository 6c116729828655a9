//! The admin site registry.
//!
//! Applications and models are registered once at startup; each request
//! then gets its own permission-filtered snapshot through
//! [`CatalogProvider::app_list`]. Permission codenames follow the
//! `<action>_<model>` convention, e.g. `view_team` or `add_squad`.

use std::sync::Arc;

use crate::auth::AuthUser;

use super::source::ModelSource;
use super::{AppDescriptor, CatalogProvider, FieldDescriptor, ModelDescriptor, ModelPerms};

/// Registration data for one model.
pub struct ModelRegistration {
    class_name: String,
    name: String,
    fields: Vec<FieldDescriptor>,
    source: Option<Arc<dyn ModelSource>>,
    search_fields: Option<Vec<String>>,
}

impl ModelRegistration {
    pub fn new(class_name: &str, name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            name: name.to_string(),
            fields: Vec::new(),
            source: None,
            search_fields: None,
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn source(mut self, source: Arc<dyn ModelSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}

struct AppRegistration {
    label: String,
    name: String,
    models: Vec<ModelRegistration>,
}

/// Registry of everything the admin console manages.
pub struct AdminSite {
    base_path: String,
    apps: Vec<AppRegistration>,
}

impl AdminSite {
    /// `base_path` is the admin URL prefix, e.g. "/admin", no trailing slash.
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
            apps: Vec::new(),
        }
    }

    pub fn register_app(&mut self, label: &str, name: &str, models: Vec<ModelRegistration>) {
        self.apps.push(AppRegistration {
            label: label.to_string(),
            name: name.to_string(),
            models,
        });
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn describe_model(&self, app_label: &str, reg: &ModelRegistration, user: &AuthUser) -> Option<ModelDescriptor> {
        let key = reg.class_name.to_lowercase();
        let can_view = user.has_perm(&format!("view_{}", key)) || user.has_perm(&format!("change_{}", key));
        let can_add = user.has_perm(&format!("add_{}", key));
        let can_delete = user.has_perm(&format!("delete_{}", key));
        // Any permission at all puts the model on the user's admin index.
        if !(can_view || can_add || can_delete) {
            return None;
        }

        let url = format!("{}/{}/{}/", self.base_path, app_label, key);
        Some(ModelDescriptor {
            id: format!("{}.{}", app_label, reg.class_name),
            name: reg.name.clone(),
            class_name: reg.class_name.clone(),
            add_url: format!("{}add/", url),
            url,
            fields: reg.fields.clone(),
            perms: ModelPerms { can_view, can_add },
            source: reg.source.clone(),
            search_fields: reg.search_fields.clone(),
        })
    }
}

impl CatalogProvider for AdminSite {
    fn app_list(&self, user: &AuthUser) -> Vec<AppDescriptor> {
        if !user.is_staff {
            return Vec::new();
        }

        let mut apps: Vec<AppDescriptor> = Vec::new();
        for app in &self.apps {
            let mut models: Vec<ModelDescriptor> = app
                .models
                .iter()
                .filter_map(|reg| self.describe_model(&app.label, reg, user))
                .collect();
            if models.is_empty() {
                continue;
            }
            models.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

            apps.push(AppDescriptor {
                label: app.label.clone(),
                name: app.name.clone(),
                url: format!("{}/{}/", self.base_path, app.label),
                // A visible model implies at least one permission in the app.
                has_module_perms: true,
                models,
            });
        }
        apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        apps
    }
}
