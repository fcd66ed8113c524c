use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiResult};
use crate::cache::MenuCache;
use crate::filter::{category_options, filter_items, MenuFilter, SearchScope};
use crate::language::Language;
use crate::models::MenuItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Monotonic tickets per view. Only the latest ticket's response may be
/// applied; older ones are dropped.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Network,
    Cache,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAudience {
    /// Customer-facing: only available items, backed by the local cache.
    Public,
    /// Dashboard: every item, always fresh from the network.
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSnapshot {
    pub language: Language,
    pub items: Vec<MenuItem>,
    pub categories: Vec<String>,
    pub source: DataSource,
    /// Set when the last fetch failed and a stale or empty view is shown.
    pub error: Option<String>,
}

impl MenuSnapshot {
    fn new(language: Language, items: Vec<MenuItem>, source: DataSource) -> Self {
        Self {
            language,
            categories: category_options(&items),
            items,
            source,
            error: None,
        }
    }

    pub fn empty(language: Language) -> Self {
        Self::new(language, Vec::new(), DataSource::Empty)
    }
}

pub struct MenuView {
    audience: MenuAudience,
    sequence: RequestSequence,
    state: Mutex<MenuSnapshot>,
}

impl MenuView {
    pub fn new(audience: MenuAudience, language: Language) -> Self {
        Self {
            audience,
            sequence: RequestSequence::new(),
            state: Mutex::new(MenuSnapshot::empty(language)),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, MenuSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> MenuSnapshot {
        self.lock_state().clone()
    }

    /// Empties the view and invalidates any load still in flight.
    pub fn reset(&self) {
        self.sequence.issue();
        let mut state = self.lock_state();
        let language = state.language;
        *state = MenuSnapshot::empty(language);
    }

    /// Starts a load for `language`. The public view paints the cached menu
    /// straight away; otherwise the view is emptied so languages never mix.
    pub fn begin(&self, language: Language, cache: &MenuCache) -> RequestTicket {
        let ticket = self.sequence.issue();

        let painted = match self.audience {
            MenuAudience::Public => cache
                .get(language)
                .map(|items| MenuSnapshot::new(language, items, DataSource::Cache)),
            MenuAudience::Admin => None,
        };

        let mut state = self.lock_state();
        match painted {
            Some(snapshot) => *state = snapshot,
            None if state.language != language => *state = MenuSnapshot::empty(language),
            None => {}
        }

        ticket
    }

    /// Applies a fetch result. Returns `None` when the ticket is stale and
    /// the result was dropped. A denied request is reported even when stale.
    pub fn complete(
        &self,
        ticket: RequestTicket,
        language: Language,
        result: ApiResult<Vec<MenuItem>>,
        cache: &MenuCache,
    ) -> Option<ApiResult<MenuSnapshot>> {
        if !self.sequence.is_current(ticket) {
            debug!("Dropping stale menu response for {language}");
            return match result {
                Err(e) if e.is_unauthorized() => Some(Err(e)),
                _ => None,
            };
        }

        let outcome = match result {
            Ok(items) => {
                let items: Vec<MenuItem> = match self.audience {
                    MenuAudience::Public => {
                        items.into_iter().filter(|item| item.is_available).collect()
                    }
                    MenuAudience::Admin => items,
                };

                if self.audience == MenuAudience::Public {
                    if let Err(e) = cache.put(language, &items) {
                        warn!("Failed to cache menu for {language}: {e}");
                    }
                }

                let snapshot = MenuSnapshot::new(language, items, DataSource::Network);
                *self.lock_state() = snapshot.clone();
                Ok(snapshot)
            }
            Err(e) if self.audience == MenuAudience::Public && !e.is_unauthorized() => {
                warn!("Menu fetch for {language} failed, showing saved data if available: {e}");
                let mut state = self.lock_state();
                state.error = Some(e.to_string());
                Ok(state.clone())
            }
            Err(e) => Err(e),
        };

        Some(outcome)
    }

    /// Full load cycle. A superseded load reports the newest state instead.
    pub async fn load(
        &self,
        api: &ApiClient,
        cache: &MenuCache,
        language: Language,
    ) -> ApiResult<MenuSnapshot> {
        let ticket = self.begin(language, cache);

        let result = match self.audience {
            MenuAudience::Public => api.public_menu(language).await,
            MenuAudience::Admin => api.menu(language).await,
        };

        match self.complete(ticket, language, result, cache) {
            Some(outcome) => outcome,
            None => Ok(self.snapshot()),
        }
    }

    /// Filters the current items; search scope follows the audience.
    pub fn filtered(&self, filter: &MenuFilter) -> Vec<MenuItem> {
        let scope = match self.audience {
            MenuAudience::Public => SearchScope::NameAndDescription,
            MenuAudience::Admin => SearchScope::AllNames,
        };
        let filter = MenuFilter {
            scope,
            ..filter.clone()
        };

        filter_items(&self.lock_state().items, &filter)
    }
}
