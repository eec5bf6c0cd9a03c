//! Pages, locations and the navigator seam.

use std::sync::Mutex;

use reqwest::Url;

/// Every page the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Entry page; hosts the login form
    Entry,
    Register,
    Notes,
    NoteEditor,
}

impl Page {
    pub fn file_name(&self) -> &'static str {
        match self {
            Page::Entry => "index.html",
            Page::Register => "register.html",
            Page::Notes => "notes.html",
            Page::NoteEditor => "note-editor.html",
        }
    }

    /// Pages that require a stored credential.
    pub fn is_protected(&self) -> bool {
        matches!(self, Page::Notes | Page::NoteEditor)
    }

    /// Pages that only make sense for a signed-out viewer.
    pub fn is_auth_form(&self) -> bool {
        matches!(self, Page::Entry | Page::Register)
    }

    /// Resolve a request path. The empty path and `/` are the entry page.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Page::Entry);
        }
        [Page::NoteEditor, Page::Notes, Page::Register, Page::Entry]
            .into_iter()
            .find(|page| {
                path.rsplit('/')
                    .next()
                    .is_some_and(|last| last == page.file_name())
            })
    }
}

/// A page plus the note it refers to, if any (`?id=`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub page: Page,
    pub note_id: Option<i64>,
}

impl Location {
    pub fn page(page: Page) -> Self {
        Self {
            page,
            note_id: None,
        }
    }

    pub fn editor(note_id: Option<i64>) -> Self {
        Self {
            page: Page::NoteEditor,
            note_id,
        }
    }

    /// Parse `notes.html` or `/app/note-editor.html?id=4`.
    ///
    /// Unknown pages resolve to `None`; a malformed `id` is dropped.
    pub fn parse(raw: &str) -> Option<Self> {
        let base = Url::parse("http://page.local/").ok()?;
        let url = base.join(raw).ok()?;
        let page = Page::from_path(url.path())?;
        let note_id = url
            .query_pairs()
            .find(|(key, _)| key == "id")
            .and_then(|(_, value)| value.parse().ok());
        Some(Self { page, note_id })
    }

    pub fn to_href(&self) -> String {
        match self.note_id {
            Some(id) => format!("{}?id={}", self.page.file_name(), id),
            None => self.page.file_name().to_string(),
        }
    }
}

impl From<Page> for Location {
    fn from(page: Page) -> Self {
        Location::page(page)
    }
}

/// How a navigation was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Replace the current entry (no back-button return)
    Replace(Location),
    /// Push a new entry
    Assign(Location),
}

impl Navigation {
    pub fn location(&self) -> &Location {
        match self {
            Navigation::Replace(location) | Navigation::Assign(location) => location,
        }
    }
}

/// The page host. Implementations move the viewer somewhere else.
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);

    fn replace(&self, location: Location) {
        self.navigate(Navigation::Replace(location));
    }

    fn assign(&self, location: Location) {
        self.navigate(Navigation::Assign(location));
    }
}

/// Keeps every requested navigation in order. Headless hosts read it back.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.history().pop()
    }

    /// Number of redirects (replacements) that landed on `page`.
    pub fn redirects_to(&self, page: Page) -> usize {
        self.history()
            .iter()
            .filter(|nav| matches!(nav, Navigation::Replace(loc) if loc.page == page))
            .count()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, navigation: Navigation) {
        tracing::debug!("Navigating: {:?}", navigation);
        if let Ok(mut history) = self.history.lock() {
            history.push(navigation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_path() {
        assert_eq!(Page::from_path("/"), Some(Page::Entry));
        assert_eq!(Page::from_path("/index.html"), Some(Page::Entry));
        assert_eq!(Page::from_path("/app/notes.html"), Some(Page::Notes));
        assert_eq!(Page::from_path("note-editor.html"), Some(Page::NoteEditor));
        assert_eq!(Page::from_path("/register.html"), Some(Page::Register));
        assert_eq!(Page::from_path("/other-notes.html"), None);
    }

    #[test]
    fn test_location_parse() {
        let loc = Location::parse("/note-editor.html?id=12&x=1").unwrap();
        assert_eq!(loc, Location::editor(Some(12)));

        let loc = Location::parse("note-editor.html?id=abc").unwrap();
        assert_eq!(loc.note_id, None);

        assert!(Location::parse("/missing.html").is_none());
    }

    #[test]
    fn test_location_parse_decodes_query() {
        let loc = Location::parse("note-editor.html?x=%26id%3D9&id=%31").unwrap();
        assert_eq!(loc, Location::editor(Some(1)));

        let loc = Location::parse("/app/notes.html#top").unwrap();
        assert_eq!(loc, Location::page(Page::Notes));

        assert_eq!(Location::parse("").unwrap().page, Page::Entry);
    }

    #[test]
    fn test_location_href() {
        assert_eq!(Location::editor(Some(3)).to_href(), "note-editor.html?id=3");
        assert_eq!(Location::page(Page::Notes).to_href(), "notes.html");
    }

    #[test]
    fn test_protection() {
        assert!(Page::Notes.is_protected());
        assert!(Page::NoteEditor.is_protected());
        assert!(!Page::Entry.is_protected());
        assert!(Page::Register.is_auth_form());
    }

    #[test]
    fn test_history_navigator_counts_redirects() {
        let nav = HistoryNavigator::new();
        nav.replace(Location::page(Page::Entry));
        nav.assign(Location::page(Page::Entry));
        nav.replace(Location::page(Page::Notes));
        assert_eq!(nav.redirects_to(Page::Entry), 1);
        assert_eq!(
            nav.last(),
            Some(Navigation::Replace(Location::page(Page::Notes)))
        );
    }
}
