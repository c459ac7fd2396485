//! Model catalog: the last list of models fetched from the backend.

use crate::error::CoreError;
use providers::ChatBackend;
use shared::models::ModelInfo;
use std::collections::HashSet;

/// Where the catalog is in its refresh cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    Loading,
    Error,
    Loaded(Vec<ModelInfo>),
}

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    state: CatalogState,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelCatalog {
    /// A catalog starts out loading; nothing is known until the first refresh.
    pub fn new() -> Self {
        Self {
            state: CatalogState::Loading,
        }
    }

    /// Build an already-loaded catalog (applies the same filtering as a refresh).
    pub fn from_models(models: Vec<ModelInfo>) -> Self {
        let mut catalog = Self::new();
        let _ = catalog.complete_refresh(Ok(models));
        catalog
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, CatalogState::Loaded(_))
    }

    /// Loaded models in server order; empty while loading or after an error.
    pub fn items(&self) -> &[ModelInfo] {
        match &self.state {
            CatalogState::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ModelInfo> {
        if name.is_empty() {
            return None;
        }
        self.items().iter().find(|m| m.name == name)
    }

    pub fn begin_refresh(&mut self) {
        self.state = CatalogState::Loading;
    }

    /// Install the outcome of a fetch. Nameless entries and repeated names are
    /// dropped; a failure leaves the catalog in `Error`.
    pub fn complete_refresh(
        &mut self,
        result: anyhow::Result<Vec<ModelInfo>>,
    ) -> Result<usize, CoreError> {
        match result {
            Ok(models) => {
                let mut seen = HashSet::new();
                let items: Vec<ModelInfo> = models
                    .into_iter()
                    .filter(|m| {
                        if m.name.is_empty() {
                            tracing::debug!("dropping catalog entry without a name");
                            return false;
                        }
                        if !seen.insert(m.name.clone()) {
                            tracing::debug!("dropping duplicate catalog entry {}", m.name);
                            return false;
                        }
                        true
                    })
                    .collect();
                let count = items.len();
                self.state = CatalogState::Loaded(items);
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Failed to load models: {:#}", e);
                self.state = CatalogState::Error;
                Err(CoreError::CatalogLoad(e))
            }
        }
    }

    /// Fetch the model list. Never retried automatically.
    pub async fn refresh(&mut self, backend: &dyn ChatBackend) -> Result<usize, CoreError> {
        self.begin_refresh();
        let result = backend.list_models().await;
        self.complete_refresh(result)
    }

    /// Pick the model to use given the user's preference: the preference if
    /// the catalog has it, else the first loaded model. `None` when the
    /// catalog has nothing to offer.
    pub fn resolve_selection<'a>(&'a self, preferred: &'a str) -> Option<&'a str> {
        let items = self.items();
        if items.iter().any(|m| m.name == preferred) {
            return Some(preferred);
        }
        items.first().map(|m| m.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use providers::{BackendReply, ChatSubmission};

    struct FixedModels(Option<Vec<ModelInfo>>);

    #[async_trait]
    impl ChatBackend for FixedModels {
        async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
            self.0.clone().ok_or_else(|| anyhow!("connection refused"))
        }

        async fn chat(&self, _submission: ChatSubmission) -> anyhow::Result<BackendReply> {
            unreachable!("catalog never chats")
        }
    }

    #[test]
    fn test_new_catalog_is_loading() {
        let catalog = ModelCatalog::new();
        assert_eq!(catalog.state(), &CatalogState::Loading);
        assert!(catalog.lookup("qwen3:4b").is_none());
    }

    #[test]
    fn test_refresh_drops_nameless_and_duplicates() {
        let catalog = ModelCatalog::from_models(vec![
            ModelInfo::named("qwen3:4b").with_context_length(40960.0),
            ModelInfo::named(""),
            ModelInfo::named("qwen3:4b"),
            ModelInfo::named("llama3.2:3b"),
        ]);

        assert_eq!(catalog.items().len(), 2);
        assert_eq!(
            catalog.lookup("qwen3:4b").and_then(|m| m.context_length),
            Some(40960.0)
        );
        assert!(catalog.lookup("").is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_sets_error_and_hides_old_snapshot() {
        let mut catalog = ModelCatalog::new();
        let ok = FixedModels(Some(vec![ModelInfo::named("phi3:mini")]));
        assert_eq!(catalog.refresh(&ok).await.unwrap(), 1);
        assert!(catalog.lookup("phi3:mini").is_some());

        let err = catalog.refresh(&FixedModels(None)).await.unwrap_err();
        assert!(matches!(err, CoreError::CatalogLoad(_)));
        assert_eq!(catalog.state(), &CatalogState::Error);
        assert!(catalog.lookup("phi3:mini").is_none());
    }

    #[test]
    fn test_resolve_selection() {
        let catalog = ModelCatalog::from_models(vec![
            ModelInfo::named("gemma3:1b"),
            ModelInfo::named("qwen3:4b"),
        ]);
        assert_eq!(catalog.resolve_selection("qwen3:4b"), Some("qwen3:4b"));
        assert_eq!(catalog.resolve_selection("gone:7b"), Some("gemma3:1b"));
        assert_eq!(ModelCatalog::from_models(vec![]).resolve_selection("x"), None);
        assert_eq!(ModelCatalog::new().resolve_selection("x"), None);
    }
}
