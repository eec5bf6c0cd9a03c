//! Page-load entry point wiring the gatekeeper, API client and controllers.

use std::sync::Arc;

use crate::api::NotesApi;
use crate::config::Config;
use crate::errors::ClientError;
use crate::gatekeeper::{Access, Gatekeeper};
use crate::navigation::{Location, Navigator, Page};
use crate::notify::{AlertNotifier, BannerNotifier, Notice, Notifier, NotifyStyle};
use crate::pages::{
    AuthFormController, EditorView, NoteEditorController, NotesListController, NotesView,
};
use crate::store::{CredentialStore, FileStore};

/// What a page load resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView {
    Login,
    Register,
    Notes(NotesView),
    Editor(EditorView),
    /// The viewer was sent elsewhere; nothing should render.
    Redirected(Location),
}

/// Build the notifier matching the configured style.
pub fn notifier_for(config: &Config) -> Arc<dyn Notifier> {
    match config.notify_style {
        NotifyStyle::Banner => Arc::new(BannerNotifier::new(config.banner_duration)),
        NotifyStyle::Alert => Arc::new(AlertNotifier::new()),
    }
}

/// Application state shared across page controllers.
#[derive(Clone)]
pub struct App {
    gate: Arc<Gatekeeper>,
    api: NotesApi,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    pub fn new(
        config: Config,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let gate = Arc::new(Gatekeeper::new(
            Arc::new(config),
            store,
            navigator.clone(),
        )?);
        Ok(Self {
            api: NotesApi::new(gate.clone()),
            gate,
            navigator,
            notifier,
        })
    }

    /// Build with the file-backed credential store and the configured notifier.
    pub fn from_config(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self, ClientError> {
        tracing::info!("API: {}", config.api_url);
        tracing::info!("Auth scheme: {}", config.auth_scheme.as_str());
        tracing::info!("Credential store: {:?}", config.store_path);

        let store = Arc::new(FileStore::new(config.store_path.clone()));
        let notifier = notifier_for(&config);
        Self::new(config, store, navigator, notifier)
    }

    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gate
    }

    pub fn api(&self) -> &NotesApi {
        &self.api
    }

    pub fn auth_form(&self) -> AuthFormController {
        AuthFormController::new(self.gate.clone(), self.notifier.clone())
    }

    pub fn notes_list(&self) -> NotesListController {
        NotesListController::new(
            self.api.clone(),
            self.navigator.clone(),
            self.notifier.clone(),
        )
    }

    pub fn note_editor(&self) -> NoteEditorController {
        NoteEditorController::new(
            self.api.clone(),
            self.navigator.clone(),
            self.notifier.clone(),
        )
    }

    pub fn logout(&self) {
        self.gate.logout();
    }

    /// Handle a page load: gate first, then fetch whatever the page shows.
    pub async fn load_page(&self, location: &Location) -> Result<PageView, ClientError> {
        if let Access::Redirected(to) = self.gate.check_access(location) {
            return Ok(PageView::Redirected(to));
        }

        let view = match location.page {
            Page::Entry => PageView::Login,
            Page::Register => PageView::Register,
            Page::Notes => match self.notes_list().load().await {
                Ok(view) => PageView::Notes(view),
                Err(e) => return self.protected_load_failed(e),
            },
            Page::NoteEditor => match self.note_editor().load(location.note_id).await {
                Ok(view) => PageView::Editor(view),
                Err(e) if e.is_unauthenticated() => return self.protected_load_failed(e),
                Err(e) => {
                    tracing::error!("Error loading note: {}", e);
                    self.notifier.notify(Notice::error(e.message()));
                    PageView::Editor(EditorView::blank(location.note_id))
                }
            },
        };
        Ok(view)
    }

    /// A protected page could not initialise; the viewer ends up on the entry page.
    fn protected_load_failed(&self, error: ClientError) -> Result<PageView, ClientError> {
        tracing::warn!("Page init failed: {}", error);
        let entry = Location::page(Page::Entry);
        // An unauthorized response has already redirected.
        if !error.is_unauthenticated() {
            self.navigator.replace(entry.clone());
        }
        Ok(PageView::Redirected(entry))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::navigation::HistoryNavigator;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            api_url: "http://127.0.0.1:9".to_string(),
            store_path: dir.path().join("credentials.json"),
            notify_style: NotifyStyle::Alert,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_from_config_serves_auth_pages_offline() {
        let dir = TempDir::new().unwrap();
        let app = App::from_config(config_in(&dir), Arc::new(HistoryNavigator::new())).unwrap();

        assert_eq!(
            app.load_page(&Location::page(Page::Entry)).await.unwrap(),
            PageView::Login
        );
        assert_eq!(
            app.load_page(&Location::page(Page::Register)).await.unwrap(),
            PageView::Register
        );
    }

    #[tokio::test]
    async fn test_blank_editor_needs_no_request() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.store_path, r#"{"token":"abc"}"#).unwrap();
        let app = App::from_config(config, Arc::new(HistoryNavigator::new())).unwrap();

        assert_eq!(
            app.load_page(&Location::editor(None)).await.unwrap(),
            PageView::Editor(EditorView::blank(None))
        );
    }

    #[test]
    fn test_notifier_follows_style() {
        let dir = TempDir::new().unwrap();
        let notifier = notifier_for(&config_in(&dir));
        // Alert style confirms by default and accepts notices without a host attached.
        notifier.notify(Notice::success("ok"));
        assert!(notifier.confirm("Delete this note?"));
    }
}
