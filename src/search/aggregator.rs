//! Search orchestration: walks the visible catalog and assembles the
//! nested result tree, isolating per-model failures.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::AuthUser;
use crate::catalog::{CatalogProvider, ModelDescriptor, SourceError};

use super::matchers::{match_app, match_model};
use super::strategy::ObjectSearch;

/// One matched record.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectResult {
    /// Primary key rendered as text
    pub id: String,
    /// Display label
    pub name: String,
    /// Admin change URL of the record
    pub url: String,
}

/// One matched model with its object matches.
#[derive(Debug, Clone, Serialize)]
pub struct ModelResult {
    /// Composite id, `<app_label>.<ClassName>`
    pub id: String,
    pub name: String,
    /// Changelist URL
    pub url: String,
    /// Add-form URL, `null` without add permission
    pub url_add: Option<String>,
    pub objects: Vec<ObjectResult>,
}

/// One application carrying matched models, or matched by name itself.
#[derive(Debug, Clone, Serialize)]
pub struct AppResult {
    /// App label
    pub id: String,
    pub name: String,
    /// App index URL, `null` without module-level access
    pub url: Option<String>,
    pub models: Vec<ModelResult>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub apps: Vec<AppResult>,
}

/// Totals across the tree. An app matched only via a contained model still
/// counts as an app match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchCounts {
    pub apps: u32,
    pub models: u32,
    pub objects: u32,
}

/// One isolated per-model failure. Only populated in debug deployments.
#[derive(Debug, Clone, Serialize)]
pub struct SearchErrorEntry {
    /// Developer rendering of the error
    pub error: String,
    /// Display message of the error
    pub error_message: String,
    /// Label of the app the failing model belongs to
    pub app: String,
    /// Class name of the failing model
    pub model: String,
}

/// The full search response. `errors` is always present, and empty outside
/// debug deployments.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: SearchResults,
    pub counts: SearchCounts,
    pub errors: Vec<SearchErrorEntry>,
}

impl SearchResponse {
    fn empty() -> Self {
        Self {
            results: SearchResults::default(),
            counts: SearchCounts::default(),
            errors: Vec::new(),
        }
    }
}

/// Runs the site-wide search for one deployment.
pub struct SearchAggregator {
    catalog: Arc<dyn CatalogProvider>,
    strategy: Arc<dyn ObjectSearch>,
    debug: bool,
}

impl SearchAggregator {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        strategy: Arc<dyn ObjectSearch>,
        debug: bool,
    ) -> Self {
        Self {
            catalog,
            strategy,
            debug,
        }
    }

    /// Search applications, models and objects visible to the user.
    ///
    /// An empty query returns the empty response without touching the
    /// catalog. A failure while searching one model drops that model from
    /// the tree, never the whole response; debug deployments report the
    /// failure under `errors`.
    pub async fn search(&self, user: &AuthUser, query: &str) -> SearchResponse {
        if query.is_empty() {
            return SearchResponse::empty();
        }

        let mut results = SearchResults::default();
        let mut counts = SearchCounts::default();
        let mut errors = Vec::new();

        for app in self.catalog.app_list(user) {
            let mut app_result = AppResult {
                id: app.label.clone(),
                name: app.name.clone(),
                url: app.has_module_perms.then(|| app.url.clone()),
                models: Vec::new(),
            };

            for model in &app.models {
                if !model.perms.can_view {
                    continue;
                }
                // Registrations without a resolvable store are skipped;
                // the app itself can still match by name.
                if model.source.is_none() {
                    continue;
                }

                match self.match_model_entry(user, query, model).await {
                    Ok(Some(model_result)) => {
                        counts.models += 1;
                        counts.objects += model_result.objects.len() as u32;
                        app_result.models.push(model_result);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!(
                            model = %model.id,
                            error = %err,
                            "admin search: model skipped after failure"
                        );
                        if self.debug {
                            errors.push(SearchErrorEntry {
                                error: format!("{:?}", err),
                                error_message: err.to_string(),
                                app: app.label.clone(),
                                model: model.class_name.clone(),
                            });
                        }
                    }
                }
            }

            if !app_result.models.is_empty() || match_app(query, &app.name) {
                counts.apps += 1;
                results.apps.push(app_result);
            }
        }

        SearchResponse {
            results,
            counts,
            errors,
        }
    }

    /// Match one model: object hits first, since a hit alone qualifies the
    /// model, then name and field metadata. `None` means no match.
    async fn match_model_entry(
        &self,
        user: &AuthUser,
        query: &str,
        model: &ModelDescriptor,
    ) -> Result<Option<ModelResult>, SourceError> {
        let hits = self.strategy.match_objects(user, query, model).await?;

        if hits.is_empty() && !match_model(query, &model.name, &model.class_name, &model.fields) {
            return Ok(None);
        }

        let objects = hits
            .into_iter()
            .map(|hit| ObjectResult {
                url: format!("{}{}", model.url, hit.pk),
                id: hit.pk,
                name: hit.label,
            })
            .collect();

        Ok(Some(ModelResult {
            id: model.id.clone(),
            name: model.name.clone(),
            url: model.url.clone(),
            url_add: model.perms.can_add.then(|| model.add_url.clone()),
            objects,
        }))
    }
}
