use std::time::Duration;

use codee::string::JsonSerdeCodec;
use flashcards::{
    ApiError, AuthSession, ClientConfig, Deck, KnownWords, Pager, Preferences, SearchGate,
    SpeechController, search::SearchView, store::PREFERENCES_KEY,
};
use leptos::prelude::*;
use leptos_use::storage::use_local_storage;
use rand::{SeedableRng, rngs::SmallRng};
use reactive_stores::Store;
use web_sys::wasm_bindgen::JsValue;

use crate::{http::HttpApi, pager::Navigator, storage::BrowserStore, toast::Toasts};

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Login,
    Register,
    Stats,
    Help,
    /// Detail view of the card at this display index.
    Detail(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchPanel {
    /// The query is too short to search.
    Prompt,
    Searching,
    Done(SearchView),
}

/// Transient view state: which overlay is open.
#[derive(Debug, Clone, Default, Store)]
pub struct Ui {
    dialog: Option<Dialog>,
    search: Option<SearchPanel>,
    /// Display index of the card whose action menu is open.
    menu: Option<u32>,
    shuffled_flash: bool,
}

/// Everything the components share, provided once at the root.
#[derive(Clone, Copy)]
pub struct AppState {
    pub config: StoredValue<ClientConfig>,
    pub api: StoredValue<HttpApi>,
    pub store: BrowserStore,
    pub pager: RwSignal<Pager>,
    pub deck: RwSignal<Deck>,
    pub known: RwSignal<KnownWords>,
    pub session: RwSignal<AuthSession>,
    pub search: RwSignal<SearchGate>,
    pub speech: RwSignal<SpeechController>,
    pub rng: StoredValue<SmallRng>,
    /// Page and size of the deck on screen, once a load succeeded.
    pub shown: StoredValue<Option<(u32, u32)>>,
    pub prefs: Signal<Preferences>,
    pub set_prefs: WriteSignal<Preferences>,
    pub toasts: Toasts,
    pub ui: Store<Ui>,
    pub nav: Navigator,
}

impl AppState {
    /// Must be called below the `<Router>`.
    pub fn new(config: ClientConfig) -> Self {
        let store = BrowserStore;
        let (prefs, set_prefs, _) =
            use_local_storage::<Preferences, JsonSerdeCodec>(PREFERENCES_KEY.to_owned());

        Self {
            api: StoredValue::new(HttpApi::new(&config)),
            store,
            pager: RwSignal::new(Pager::new(&config)),
            deck: RwSignal::new(Deck::default()),
            known: RwSignal::new(KnownWords::load(&store)),
            session: RwSignal::new(AuthSession::load(&store)),
            search: RwSignal::new(SearchGate::new(config.min_query_len)),
            speech: RwSignal::new(SpeechController::new(config.speech.clone())),
            rng: StoredValue::new(SmallRng::seed_from_u64(js_sys::Date::now() as u64)),
            shown: StoredValue::new(None),
            prefs,
            set_prefs,
            toasts: Toasts::new(Duration::from_millis(config.toast_ms)),
            ui: Store::new(Ui::default()),
            nav: Navigator::new(),
            config: StoredValue::new(config),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.with(AuthSession::is_authenticated)
    }

    pub fn open(&self, dialog: Dialog) {
        self.ui.dialog().set(Some(dialog));
    }

    pub fn close_dialog(&self) {
        self.ui.dialog().set(None);
    }

    /// Escape: dialogs, the search overlay and card menus.
    pub fn close_overlays(&self) {
        self.ui.dialog().set(None);
        self.ui.menu().set(None);
        if self.ui.search().get_untracked().is_some() {
            self.search.update(SearchGate::cancel);
            self.ui.search().set(None);
        }
    }

    /// Drops the session on a rejected token and asks for a new login.
    pub fn expire_session(&self) {
        tracing::info!("session rejected by server");
        self.session.set(AuthSession::clear(&self.store));
        self.known.update(KnownWords::detach);
        self.open(Dialog::Login);
        self.toasts.error("Your session has expired, please log in again");
    }

    /// Reports a failed server call; a 401 ends the session.
    pub fn api_failed(&self, action: &str, error: ApiError) {
        tracing::warn!(action, error = %error, "request failed");
        if error.needs_login() {
            self.expire_session();
        } else {
            self.toasts.error(format!("{action}: {error}"));
        }
    }
}

pub fn use_app() -> AppState {
    expect_context::<AppState>()
}

pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// Human readable date for a mark timestamp in seconds or milliseconds.
pub fn format_timestamp(at: i64) -> String {
    let ms = if at < 100_000_000_000 { at * 1000 } else { at };
    let date = js_sys::Date::new(&JsValue::from_f64(ms as f64));
    String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
}
