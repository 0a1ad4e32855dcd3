//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::gemini::GeminiClient;
use crate::notion::{NotionClient, NotionError};
use crate::search::TavilyClient;
use crate::services::CheckoutService;
use crate::supabase::{StoreError, SupabaseStore};
use crate::toss::TossClient;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("store client error: {0}")]
    Store(#[from] StoreError),
    #[error("notion client error: {0}")]
    Notion(#[from] NotionError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and every external-service client. Clients are constructed
/// once here from injected configuration; nothing reads the environment at
/// request time.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: SupabaseStore,
    checkout: CheckoutService<SupabaseStore, TossClient>,
    notion: Option<NotionClient>,
    gemini: Option<GeminiClient>,
    search: Option<TavilyClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if any client cannot be constructed from the
    /// configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let store = SupabaseStore::new(&config.supabase)?;
        let gateway = TossClient::new(&config.toss);
        let checkout = CheckoutService::new(store.clone(), gateway);
        let notion = config.notion.as_ref().map(NotionClient::new).transpose()?;
        let gemini = config.gemini.as_ref().map(GeminiClient::new);
        let search = config.tavily.as_ref().map(TavilyClient::new);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                checkout,
                notion,
                gemini,
                search,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the data store client.
    #[must_use]
    pub fn store(&self) -> &SupabaseStore {
        &self.inner.store
    }

    /// Get a reference to the order finalizer.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService<SupabaseStore, TossClient> {
        &self.inner.checkout
    }

    /// Get the Notion client, when CRM logging is configured.
    #[must_use]
    pub fn notion(&self) -> Option<&NotionClient> {
        self.inner.notion.as_ref()
    }

    /// Get the Gemini client, when the chatbot is configured.
    #[must_use]
    pub fn gemini(&self) -> Option<&GeminiClient> {
        self.inner.gemini.as_ref()
    }

    /// Get the search client, when web search is configured.
    #[must_use]
    pub fn search(&self) -> Option<&TavilyClient> {
        self.inner.search.as_ref()
    }
}
