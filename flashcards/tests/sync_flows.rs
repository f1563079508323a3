use std::cell::RefCell;
use std::collections::BTreeSet;

use flashcards::{
    ApiError, AuthSession, ClientConfig, Deck, KeyValueStore, KnownWords, Mark, MemoryStore,
    PageResult, Pager, WordApi,
    auth::{self, SessionCheck},
    known::{self, MarkPlan},
    store::KNOWN_WORDS_KEY,
};
use futures::executor::block_on;
use rand::{SeedableRng, rngs::SmallRng};
use word_api::{
    Stats, WordEntry,
    auth::{AuthPayload, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile},
    tags::{ForgetAllResponse, ForgetWordsResponse, KnownWords as KnownIds, MarkResponse, MarkStatus},
};

/// Backend double: records every call and answers from in-memory state or
/// with a scripted failure.
#[derive(Default)]
struct FakeApi {
    calls: RefCell<Vec<String>>,
    fail_with: RefCell<Option<ApiError>>,
    server_known: RefCell<BTreeSet<String>>,
    words: Vec<WordEntry>,
}

impl FakeApi {
    fn with_words(n: usize) -> Self {
        Self {
            words: (1..=n)
                .map(|i| WordEntry::new(Some(&i.to_string()), &format!("word{i}"), "词"))
                .collect(),
            ..Default::default()
        }
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        match self.fail_with.borrow().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn user() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            username: "amy".into(),
            ..Default::default()
        }
    }
}

impl WordApi for FakeApi {
    async fn list_words(&self, page: u32, page_size: u32) -> Result<PageResult, ApiError> {
        self.record(format!("list {page} {page_size}"))?;
        let start = ((page - 1) * page_size) as usize;
        Ok(PageResult {
            items: self
                .words
                .iter()
                .skip(start)
                .take(page_size as usize)
                .cloned()
                .collect(),
            total: self.words.len() as u64,
            ..Default::default()
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<WordEntry>, ApiError> {
        self.record(format!("search {query}"))?;
        Ok(self
            .words
            .iter()
            .filter(|w| w.english.contains(query))
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        self.record("stats".into())?;
        Ok(Stats::default())
    }

    async fn mark_known(&self, token: &str, word_id: &str) -> Result<MarkResponse, ApiError> {
        self.record(format!("mark {token} {word_id}"))?;
        self.server_known.borrow_mut().insert(word_id.to_owned());
        Ok(MarkResponse::default())
    }

    async fn unmark_known(&self, token: &str, word_id: &str) -> Result<MarkResponse, ApiError> {
        self.record(format!("unmark {token} {word_id}"))?;
        self.server_known.borrow_mut().remove(word_id);
        Ok(MarkResponse::default())
    }

    async fn mark_status(&self, token: &str, word_id: &str) -> Result<MarkStatus, ApiError> {
        self.record(format!("status {token} {word_id}"))?;
        Ok(MarkStatus {
            word_id: word_id.to_owned(),
            is_marked: self.server_known.borrow().contains(word_id),
            ..Default::default()
        })
    }

    async fn known_words(&self, token: &str) -> Result<KnownIds, ApiError> {
        self.record(format!("known {token}"))?;
        let ids: Vec<String> = self.server_known.borrow().iter().cloned().collect();
        Ok(KnownIds {
            total_count: ids.len() as u64,
            word_ids: ids,
        })
    }

    async fn forget_words(
        &self,
        token: &str,
        word_ids: &[String],
    ) -> Result<ForgetWordsResponse, ApiError> {
        self.record(format!("forget {token} {}", word_ids.join(",")))?;
        let mut known = self.server_known.borrow_mut();
        let forgotten = word_ids.iter().filter(|id| known.remove(*id)).count();
        Ok(ForgetWordsResponse {
            word_ids: word_ids.to_vec(),
            forgotten_count: forgotten as u64,
            message: String::new(),
        })
    }

    async fn forget_all(&self, token: &str) -> Result<ForgetAllResponse, ApiError> {
        self.record(format!("forget-all {token}"))?;
        let count = self.server_known.borrow().len();
        self.server_known.borrow_mut().clear();
        Ok(ForgetAllResponse {
            forgotten_count: count as u64,
            message: String::new(),
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError> {
        self.record(format!("login {}", request.username))?;
        Ok(AuthPayload {
            token: "tok".into(),
            user: Self::user(),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        self.record(format!("register {}", request.username))?;
        Ok(AuthPayload {
            token: "tok".into(),
            user: Self::user(),
        })
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.record(format!("me {token}"))?;
        Ok(Self::user())
    }

    async fn update_profile(
        &self,
        token: &str,
        request: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        self.record(format!("profile {token}"))?;
        Ok(UserProfile {
            full_name: request.full_name.clone(),
            ..Self::user()
        })
    }

    async fn change_password(
        &self,
        token: &str,
        _request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        self.record(format!("password {token}"))
    }
}

fn signed_in() -> AuthSession {
    AuthSession {
        token: Some("tok".into()),
        user: Some(FakeApi::user()),
    }
}

/// The sequence the card menu runs: plan, server call, then apply or drop
/// the session on 401.
fn toggle(
    api: &FakeApi,
    store: &MemoryStore,
    known: &mut KnownWords,
    session: &mut AuthSession,
    word: &WordEntry,
    mark: Mark,
) -> Result<MarkPlan, ApiError> {
    let plan = known.plan(word, mark, session);
    if plan == MarkPlan::Unchanged {
        return Ok(plan);
    }
    match block_on(known::push_mark(api, &plan, mark)) {
        Ok(()) => {
            known.apply(store, word, mark, 1_000);
            Ok(plan)
        }
        Err(e) => {
            if e.needs_login() {
                *session = AuthSession::clear(store);
            }
            Err(e)
        }
    }
}

#[test]
fn signed_out_mark_stays_local() {
    let api = FakeApi::default();
    let store = MemoryStore::new();
    let mut known = KnownWords::default();
    let mut session = AuthSession::default();
    let word = WordEntry::new(Some("42"), "abandon", "放弃");

    let plan = toggle(&api, &store, &mut known, &mut session, &word, Mark::Known).unwrap();

    assert_eq!(plan, MarkPlan::Local { prompt_login: true });
    assert!(api.calls().is_empty());
    let cached: Vec<String> = store.load_json(KNOWN_WORDS_KEY).unwrap();
    assert_eq!(cached, vec!["42"]);
}

#[test]
fn unauthorized_mark_leaves_state_and_drops_session() {
    let api = FakeApi::default();
    *api.fail_with.borrow_mut() = Some(ApiError::unauthorized("token expired"));
    let store = MemoryStore::new();
    let mut known = KnownWords::default();
    let mut session = signed_in();
    session.persist(&store);
    let word = WordEntry::new(Some("42"), "abandon", "放弃");

    let err = toggle(&api, &store, &mut known, &mut session, &word, Mark::Known).unwrap_err();

    assert!(err.needs_login());
    assert_eq!(api.calls(), vec!["mark tok 42"]);
    assert!(!known.is_known(&word));
    assert!(!session.is_authenticated());
    assert_eq!(AuthSession::load(&store), AuthSession::default());
}

#[test]
fn toggles_are_idempotent() {
    let api = FakeApi::default();
    let store = MemoryStore::new();
    let mut known = KnownWords::default();
    let mut session = signed_in();
    let word = WordEntry::new(Some("7"), "able", "能");

    toggle(&api, &store, &mut known, &mut session, &word, Mark::Known).unwrap();
    toggle(&api, &store, &mut known, &mut session, &word, Mark::Known).unwrap();
    assert_eq!(known.count(), 1);
    assert_eq!(api.calls(), vec!["mark tok 7"]);

    toggle(&api, &store, &mut known, &mut session, &word, Mark::Unknown).unwrap();
    let plan = toggle(&api, &store, &mut known, &mut session, &word, Mark::Unknown).unwrap();
    assert_eq!(plan, MarkPlan::Unchanged);
    assert_eq!(api.calls(), vec!["mark tok 7", "unmark tok 7"]);
    assert_eq!(known.count(), 0);
}

#[test]
fn server_set_overrides_cache_on_load() {
    let api = FakeApi::default();
    api.server_known.borrow_mut().extend(["2".to_owned(), "3".to_owned()]);
    let store = MemoryStore::new();
    let mut known = KnownWords::default();
    known.apply(&store, &WordEntry::new(Some("1"), "one", "一"), Mark::Known, 1);

    let ids = block_on(known::fetch_known(&api, &signed_in())).unwrap().unwrap();
    known.reconcile(&store, ids, 50);

    assert!(!known.is_known(&WordEntry::new(Some("1"), "one", "一")));
    assert!(known.is_known(&WordEntry::new(Some("3"), "three", "三")));
    assert_eq!(KnownWords::load(&store).count(), 2);

    assert_eq!(
        block_on(known::fetch_known(&api, &AuthSession::default())).unwrap(),
        None
    );
}

#[test]
fn signed_in_mark_of_word_without_id_outlives_server_sync() {
    let api = FakeApi::default();
    api.server_known.borrow_mut().insert("1".to_owned());
    let store = MemoryStore::new();
    let mut known = KnownWords::default();
    let mut session = signed_in();
    let legacy = WordEntry::new(None, "legacy", "旧");

    let ids = block_on(known::fetch_known(&api, &session)).unwrap().unwrap();
    known.reconcile(&store, ids, 10);
    let plan = toggle(&api, &store, &mut known, &mut session, &legacy, Mark::Known).unwrap();
    assert_eq!(plan, MarkPlan::Local { prompt_login: false });
    assert_eq!(api.calls(), vec!["known tok"]);

    let ids = block_on(known::fetch_known(&api, &session)).unwrap().unwrap();
    known.reconcile(&store, ids, 20);
    assert!(known.is_known(&legacy));
    assert!(known.is_known(&WordEntry::new(Some("1"), "one", "一")));
    assert_eq!(known.count(), 2);

    let mut reloaded = KnownWords::load(&store);
    let ids = block_on(known::fetch_known(&api, &session)).unwrap().unwrap();
    reloaded.reconcile(&store, ids, 30);
    assert!(reloaded.is_known(&legacy));
}

#[test]
fn reset_all_requires_confirmation() {
    let api = FakeApi::default();
    let store = MemoryStore::new();
    let session = signed_in();
    let mut known = KnownWords::default();
    api.server_known.borrow_mut().extend(["1".to_owned(), "2".to_owned()]);
    known.reconcile(&store, vec!["1".to_owned(), "2".to_owned()], 1);

    assert!(known.plan_forget_all(false, &session).is_none());
    assert_eq!(known.count(), 2);

    let plan = known.plan_forget_all(true, &session).unwrap();
    let forgotten = block_on(known::push_forget_all(&api, &plan, known.count())).unwrap();
    known.apply_forget_all(&store);

    assert_eq!(forgotten, 2);
    assert_eq!(known.count(), 0);
    assert!(api.server_known.borrow().is_empty());
    assert_eq!(KnownWords::load(&store).count(), 0);
}

#[test]
fn reset_page_sends_exactly_the_page_ids() {
    let api = FakeApi::with_words(5);
    let store = MemoryStore::new();
    let session = signed_in();
    let mut pager = Pager::new(&ClientConfig::default());
    let mut deck = Deck::default();
    let mut known = KnownWords::default();
    api.server_known.borrow_mut().extend(["2".to_owned(), "4".to_owned()]);
    known.reconcile(&store, vec!["2".to_owned(), "4".to_owned()], 1);

    let ticket = pager.begin_load(1, Some("3")).unwrap();
    let page = block_on(api.list_words(ticket.page, ticket.page_size)).unwrap();
    let loaded = pager.complete(&ticket, page).unwrap();
    deck.replace(loaded.items, loaded.start_index);

    let plan = known.plan_forget(deck.words(), &session).unwrap();
    assert_eq!(plan.known_count(), 1);
    block_on(known::push_forget(&api, &plan)).unwrap();
    known.apply_forget(&store, &plan);

    assert!(api.calls().contains(&"forget tok 1,2,3".to_owned()));
    assert_eq!(known.count(), 1);
    assert!(known.is_known(&WordEntry::new(Some("4"), "word4", "词")));
}

#[test]
fn page_load_then_shuffle_and_restore() {
    let api = FakeApi::with_words(50);
    let mut pager = Pager::new(&ClientConfig::default());
    let mut deck = Deck::default();

    let ticket = pager.begin_load(1, Some("24")).unwrap();
    let page = block_on(api.list_words(ticket.page, ticket.page_size)).unwrap();
    let loaded = pager.complete(&ticket, page).unwrap();
    assert_eq!(loaded.total_pages, 3);
    assert!(pager.has_next() && !pager.has_prev());

    deck.replace(loaded.items, loaded.start_index);
    let original: Vec<u32> = deck.cards().iter().map(|c| c.index).collect();
    deck.shuffle(&mut SmallRng::seed_from_u64(3));
    deck.restore();
    let restored: Vec<u32> = deck.cards().iter().map(|c| c.index).collect();
    assert_eq!(restored, original);
}

#[test]
fn zero_page_size_requests_default() {
    let api = FakeApi::with_words(30);
    let mut pager = Pager::new(&ClientConfig::default());

    let ticket = pager.begin_load(1, Some("0")).unwrap();
    block_on(api.list_words(ticket.page, ticket.page_size)).unwrap();

    assert_eq!(api.calls(), vec!["list 1 24"]);
}

#[test]
fn login_then_validate_then_expire() {
    let api = FakeApi::default();
    let store = MemoryStore::new();

    let session = block_on(auth::login(
        &api,
        &store,
        LoginRequest {
            username: " amy ".into(),
            password: "secret1".into(),
        },
    ))
    .unwrap();
    assert_eq!(session.token.as_deref(), Some("tok"));
    assert_eq!(api.calls(), vec!["login amy"]);

    let check = block_on(auth::validate(&api, &store, AuthSession::load(&store)));
    assert!(matches!(check, SessionCheck::Valid(ref s) if s.user.is_some()));

    *api.fail_with.borrow_mut() = Some(ApiError::unauthorized(""));
    let check = block_on(auth::validate(&api, &store, AuthSession::load(&store)));
    assert_eq!(check, SessionCheck::Expired);
    assert_eq!(AuthSession::load(&store), AuthSession::default());
}

#[test]
fn validation_keeps_session_when_offline() {
    let api = FakeApi::default();
    *api.fail_with.borrow_mut() = Some(ApiError::Network("offline".into()));
    let store = MemoryStore::new();
    signed_in().persist(&store);

    let check = block_on(auth::validate(&api, &store, AuthSession::load(&store)));
    assert!(matches!(check, SessionCheck::Unverified(ref s, _) if s.is_authenticated()));
    assert!(AuthSession::load(&store).is_authenticated());
}

#[test]
fn invalid_forms_never_reach_the_server() {
    let api = FakeApi::default();
    let store = MemoryStore::new();

    let err = block_on(auth::register(
        &api,
        &store,
        RegisterRequest {
            username: "amy".into(),
            email: "amy@example.com".into(),
            password: "secret1".into(),
            full_name: String::new(),
        },
        "secret2",
    ))
    .unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match");

    let err = block_on(auth::change_password(
        &api,
        &AuthSession::default(),
        ChangePasswordRequest {
            current_password: "old-secret".into(),
            new_password: "new-secret".into(),
        },
        "new-secret",
    ))
    .unwrap_err();
    assert!(err.needs_login());
    assert!(api.calls().is_empty());
}

#[test]
fn profile_update_refreshes_user() {
    let api = FakeApi::default();
    let store = MemoryStore::new();

    let session = block_on(auth::update_profile(
        &api,
        &store,
        &signed_in(),
        ProfileUpdate {
            full_name: "Amy Pond".into(),
            ..Default::default()
        },
    ))
    .unwrap();

    assert_eq!(session.user.as_ref().map(|u| u.display_name()), Some("Amy Pond"));
    assert_eq!(AuthSession::load(&store), session);
}
