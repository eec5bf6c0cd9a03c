//! Notes client
//!
//! Session gatekeeper and typed REST client for the notes web application:
//! registration and login, the note list, the note editor and file attachments.
//! Rendering, navigation and notifications are left to the host through the
//! `Navigator` and `Notifier` traits.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod gatekeeper;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod store;
pub mod telemetry;

pub use api::{FileUpload, NotesApi};
pub use app::{App, PageView};
pub use auth::{AuthScheme, Credential, Session};
pub use config::Config;
pub use errors::ClientError;
pub use gatekeeper::{Access, Gatekeeper};
pub use navigation::{HistoryNavigator, Location, Navigation, Navigator, Page};
pub use notify::{Notice, Notifier, NotifyStyle};
pub use store::{CredentialStore, FileStore, MemoryStore};
