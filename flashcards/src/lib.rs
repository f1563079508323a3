//! Client core of the Word Hero flashcard app.
//!
//! Everything here is free of browser APIs: the web frontend supplies an
//! HTTP transport implementing [`WordApi`] and a [`KeyValueStore`] backed by
//! local storage, and drives the state objects below from its components.

pub mod api;
pub mod auth;
pub mod config;
pub mod deck;
pub mod error;
pub mod known;
pub mod pager;
pub mod prefs;
pub mod search;
pub mod shortcuts;
pub mod speech;
pub mod store;

pub use api::WordApi;
pub use auth::AuthSession;
pub use config::ClientConfig;
pub use deck::{Card, Deck};
pub use error::{ApiError, AuthError, FormError, StoreError};
pub use known::{KnownWords, Mark};
pub use pager::{Nav, PageResult, Pager};
pub use prefs::{Preferences, Visibility};
pub use search::SearchGate;
pub use speech::{Accent, SpeechController};
pub use store::{KeyValueStore, MemoryStore};
pub use word_api::WordEntry;
