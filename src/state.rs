use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::api::{ApiClient, ApiResult};
use crate::cache::MenuCache;
use crate::config::Config;
use crate::db::KeyValueStore;
use crate::models::ContactMessage;
use crate::session::Session;
use crate::sync::{MenuAudience, MenuView};

type ContactList = Arc<Mutex<Vec<ContactMessage>>>;

/// Everything the command layer needs, built once at startup.
pub struct AppState {
    pub config: Config,
    pub session: Arc<Session>,
    pub api: ApiClient,
    pub cache: MenuCache,
    pub public_menu: MenuView,
    pub admin_menu: Arc<MenuView>,
    contact_messages: ContactList,
}

fn lock_contacts(list: &ContactList) -> MutexGuard<'_, Vec<ContactMessage>> {
    list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_admin_data(admin_menu: &MenuView, contact_messages: &ContactList) {
    admin_menu.reset();
    lock_contacts(contact_messages).clear();
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        let session = Arc::new(Session::new(store.clone()));
        let restored = session.init()?;
        info!("Session on startup: {restored:?}");

        let api = ApiClient::new(&config, session.clone())?;
        let language = config.default_language;

        let admin_menu = Arc::new(MenuView::new(MenuAudience::Admin, language));
        let contact_messages = ContactList::default();

        let (menu, contacts) = (admin_menu.clone(), contact_messages.clone());
        session.on_expired(move || clear_admin_data(&menu, &contacts));

        Ok(AppState {
            api,
            session,
            cache: MenuCache::new(store),
            public_menu: MenuView::new(MenuAudience::Public, language),
            admin_menu,
            contact_messages,
            config,
        })
    }

    pub(crate) fn contact_messages(&self) -> MutexGuard<'_, Vec<ContactMessage>> {
        lock_contacts(&self.contact_messages)
    }

    /// Drops everything only an admin may see.
    pub(crate) fn clear_admin_data(&self) {
        clear_admin_data(&self.admin_menu, &self.contact_messages);
    }
}
