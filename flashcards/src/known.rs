//! Known-word tracking.
//!
//! A word is either known or unknown. Marks live in two tiers: a local cache
//! keyed by [`WordEntry::key`] (authoritative while signed out) and the set of
//! word ids the server reports as known (authoritative once signed in and
//! fetched). Words without an id never reach the server, so their marks stay
//! in the local tier even while signed in. Mutations are split into a plan, an optional server call and an
//! apply step so the caller never holds state across an await.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use word_api::WordEntry;

use crate::api::WordApi;
use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::store::{KNOWN_WORDS_KEY, KeyValueStore, LOCAL_ONLY_KEY, WORD_MARKS_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Known,
    Unknown,
}

impl Mark {
    pub fn toggled(self) -> Self {
        match self {
            Mark::Known => Mark::Unknown,
            Mark::Unknown => Mark::Known,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkPlan {
    /// The word is already in the requested state.
    Unchanged,
    /// Change the local cache only. `prompt_login` is set when the user is
    /// signed out and should be nudged to sign in to sync.
    Local { prompt_login: bool },
    Remote { token: String, word_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgetPlan {
    /// Keys of the page's words that are currently known.
    known_keys: Vec<String>,
    remote: Option<(String, Vec<String>)>,
}

impl ForgetPlan {
    pub fn known_count(&self) -> usize {
        self.known_keys.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgetAllPlan {
    Local,
    Remote { token: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownWords {
    marks: BTreeMap<String, i64>,
    /// Keys of marked words that have no server id.
    local_only: BTreeSet<String>,
    server: Option<HashSet<String>>,
}

impl KnownWords {
    pub fn load(store: &impl KeyValueStore) -> Self {
        let mut marks: BTreeMap<String, i64> = store.load_json(WORD_MARKS_KEY).unwrap_or_default();
        // Keys listed without a timestamp (older caches) still count as known.
        let listed: Vec<String> = store.load_json(KNOWN_WORDS_KEY).unwrap_or_default();
        for key in listed {
            marks.entry(key).or_insert(0);
        }
        let local_only: BTreeSet<String> = store.load_json(LOCAL_ONLY_KEY).unwrap_or_default();
        let local_only = local_only
            .into_iter()
            .filter(|key| marks.contains_key(key))
            .collect();
        Self {
            marks,
            local_only,
            server: None,
        }
    }

    fn persist(&self, store: &impl KeyValueStore) {
        let mut ordered: Vec<(&String, &i64)> = self.marks.iter().collect();
        ordered.sort_by_key(|(key, at)| (**at, (*key).clone()));
        let keys: Vec<&String> = ordered.into_iter().map(|(key, _)| key).collect();

        let result = store
            .save_json(KNOWN_WORDS_KEY, &keys)
            .and_then(|_| store.save_json(WORD_MARKS_KEY, &self.marks))
            .and_then(|_| store.save_json(LOCAL_ONLY_KEY, &self.local_only));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist known words");
        }
    }

    pub fn is_known(&self, word: &WordEntry) -> bool {
        match (&self.server, word.server_id()) {
            (Some(server), Some(id)) => server.contains(id),
            _ => self.marks.contains_key(word.key()),
        }
    }

    pub fn marked_at(&self, word: &WordEntry) -> Option<i64> {
        self.marks.get(word.key()).copied().filter(|at| *at > 0)
    }

    pub fn count(&self) -> usize {
        match &self.server {
            Some(server) => server.len() + self.local_only.len(),
            None => self.marks.len(),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.server.is_some()
    }

    pub fn plan(&self, word: &WordEntry, mark: Mark, session: &AuthSession) -> MarkPlan {
        if self.is_known(word) == (mark == Mark::Known) {
            return MarkPlan::Unchanged;
        }
        match (session.token.as_ref(), word.server_id()) {
            (Some(token), Some(id)) => MarkPlan::Remote {
                token: token.clone(),
                word_id: id.to_owned(),
            },
            (Some(_), None) => MarkPlan::Local {
                prompt_login: false,
            },
            (None, _) => MarkPlan::Local { prompt_login: true },
        }
    }

    /// Records a mark locally. Call only after the plan's server call, if
    /// any, succeeded.
    pub fn apply(&mut self, store: &impl KeyValueStore, word: &WordEntry, mark: Mark, now_ms: i64) {
        let key = word.key().to_owned();
        match mark {
            Mark::Known => {
                if word.server_id().is_none() {
                    self.local_only.insert(key.clone());
                }
                self.marks.entry(key).or_insert(now_ms);
                if let (Some(server), Some(id)) = (self.server.as_mut(), word.server_id()) {
                    server.insert(id.to_owned());
                }
            }
            Mark::Unknown => {
                self.local_only.remove(&key);
                self.marks.remove(&key);
                if let (Some(server), Some(id)) = (self.server.as_mut(), word.server_id()) {
                    server.remove(id);
                }
            }
        }
        tracing::debug!(word = %word.english, ?mark, "word mark applied");
        self.persist(store);
    }

    /// Plans the reset of the current page. Returns `None` for an empty
    /// page or when a signed-out user has nothing known on it.
    pub fn plan_forget<'a>(
        &self,
        words: impl IntoIterator<Item = &'a WordEntry>,
        session: &AuthSession,
    ) -> Option<ForgetPlan> {
        let mut known_keys = Vec::new();
        let mut ids = Vec::new();
        for word in words {
            if self.is_known(word) {
                known_keys.push(word.key().to_owned());
            }
            if let Some(id) = word.server_id() {
                ids.push(id.to_owned());
            }
        }
        let remote = match &session.token {
            Some(token) if !ids.is_empty() => Some((token.clone(), ids)),
            _ => None,
        };
        if remote.is_none() && known_keys.is_empty() {
            return None;
        }
        Some(ForgetPlan { known_keys, remote })
    }

    pub fn apply_forget(&mut self, store: &impl KeyValueStore, plan: &ForgetPlan) {
        for key in &plan.known_keys {
            self.marks.remove(key);
            self.local_only.remove(key);
            if let Some(server) = self.server.as_mut() {
                server.remove(key);
            }
        }
        if let (Some(server), Some((_, ids))) = (self.server.as_mut(), plan.remote.as_ref()) {
            for id in ids {
                server.remove(id);
            }
        }
        tracing::debug!(forgotten = plan.known_keys.len(), "page marks cleared");
        self.persist(store);
    }

    /// Without confirmation nothing is planned.
    pub fn plan_forget_all(&self, confirmed: bool, session: &AuthSession) -> Option<ForgetAllPlan> {
        if !confirmed {
            return None;
        }
        Some(match &session.token {
            Some(token) => ForgetAllPlan::Remote {
                token: token.clone(),
            },
            None => ForgetAllPlan::Local,
        })
    }

    pub fn apply_forget_all(&mut self, store: &impl KeyValueStore) {
        self.marks.clear();
        self.local_only.clear();
        if let Some(server) = self.server.as_mut() {
            server.clear();
        }
        tracing::debug!("all marks cleared");
        self.persist(store);
    }

    /// Adopts the server's known set and rewrites the local cache to mirror
    /// it, keeping timestamps of entries that were already cached. Marks of
    /// words without an id are kept.
    pub fn reconcile(
        &mut self,
        store: &impl KeyValueStore,
        server_ids: impl IntoIterator<Item = String>,
        now_ms: i64,
    ) {
        let server: HashSet<String> = server_ids.into_iter().collect();
        let mut marks: BTreeMap<String, i64> = server
            .iter()
            .map(|id| (id.clone(), self.marks.get(id).copied().unwrap_or(now_ms)))
            .collect();
        for key in &self.local_only {
            if let Some(at) = self.marks.get(key) {
                marks.entry(key.clone()).or_insert(*at);
            }
        }
        tracing::debug!(
            known = server.len(),
            local_only = self.local_only.len(),
            "reconciled with server"
        );
        self.marks = marks;
        self.server = Some(server);
        self.persist(store);
    }

    /// Forgets the server tier after logout; the local cache stays.
    pub fn detach(&mut self) {
        self.server = None;
    }
}

/// Performs the server half of a mark plan. Local plans succeed without a
/// request.
pub async fn push_mark<A: WordApi>(api: &A, plan: &MarkPlan, mark: Mark) -> Result<(), ApiError> {
    let MarkPlan::Remote { token, word_id } = plan else {
        return Ok(());
    };
    match mark {
        Mark::Known => api.mark_known(token, word_id).await?,
        Mark::Unknown => api.unmark_known(token, word_id).await?,
    };
    Ok(())
}

/// Returns the number of marks the server reports as forgotten, or the
/// local count when no request was needed.
pub async fn push_forget<A: WordApi>(api: &A, plan: &ForgetPlan) -> Result<u64, ApiError> {
    match &plan.remote {
        Some((token, ids)) => Ok(api.forget_words(token, ids).await?.forgotten_count),
        None => Ok(plan.known_keys.len() as u64),
    }
}

pub async fn push_forget_all<A: WordApi>(
    api: &A,
    plan: &ForgetAllPlan,
    local_count: usize,
) -> Result<u64, ApiError> {
    match plan {
        ForgetAllPlan::Remote { token } => Ok(api.forget_all(token).await?.forgotten_count),
        ForgetAllPlan::Local => Ok(local_count as u64),
    }
}

/// Fetches the server's known ids; `None` when signed out.
pub async fn fetch_known<A: WordApi>(
    api: &A,
    session: &AuthSession,
) -> Result<Option<Vec<String>>, ApiError> {
    match &session.token {
        Some(token) => Ok(Some(api.known_words(token).await?.word_ids)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn signed_in() -> AuthSession {
        AuthSession {
            token: Some("tok".into()),
            user: None,
        }
    }

    fn word(id: &str) -> WordEntry {
        WordEntry::new(Some(id), &format!("word-{id}"), "词")
    }

    #[test]
    fn marking_twice_keeps_one_entry_and_first_timestamp() {
        let store = MemoryStore::new();
        let mut known = KnownWords::default();
        known.apply(&store, &word("42"), Mark::Known, 10);
        known.apply(&store, &word("42"), Mark::Known, 20);

        assert_eq!(known.count(), 1);
        assert_eq!(known.marked_at(&word("42")), Some(10));
        let listed: Vec<String> = store.load_json(KNOWN_WORDS_KEY).unwrap();
        assert_eq!(listed, vec!["42"]);
    }

    #[test]
    fn plans_follow_state_and_session() {
        let mut known = KnownWords::default();
        let store = MemoryStore::new();

        assert_eq!(
            known.plan(&word("1"), Mark::Unknown, &signed_in()),
            MarkPlan::Unchanged
        );
        assert_eq!(
            known.plan(&word("1"), Mark::Known, &AuthSession::default()),
            MarkPlan::Local { prompt_login: true }
        );
        assert_eq!(
            known.plan(&WordEntry::new(None, "legacy", "旧"), Mark::Known, &signed_in()),
            MarkPlan::Local {
                prompt_login: false
            }
        );
        assert_eq!(
            known.plan(&word("1"), Mark::Known, &signed_in()),
            MarkPlan::Remote {
                token: "tok".into(),
                word_id: "1".into()
            }
        );

        known.apply(&store, &word("1"), Mark::Known, 1);
        assert_eq!(
            known.plan(&word("1"), Mark::Known, &signed_in()),
            MarkPlan::Unchanged
        );
    }

    #[test]
    fn cache_survives_reload() {
        let store = MemoryStore::new();
        let mut known = KnownWords::default();
        known.apply(&store, &word("7"), Mark::Known, 5);
        known.apply(&store, &WordEntry::new(None, "plain", "普通"), Mark::Known, 6);

        let reloaded = KnownWords::load(&store);
        assert!(reloaded.is_known(&word("7")));
        assert!(reloaded.is_known(&WordEntry::new(None, "plain", "普通")));
        assert_eq!(reloaded.count(), 2);
    }

    #[test]
    fn key_list_without_timestamps_is_honoured() {
        let store = MemoryStore::new();
        store.save_json(KNOWN_WORDS_KEY, &vec!["9"]).unwrap();
        let known = KnownWords::load(&store);
        assert!(known.is_known(&word("9")));
        assert_eq!(known.marked_at(&word("9")), None);
    }

    #[test]
    fn server_wins_after_reconcile() {
        let store = MemoryStore::new();
        let mut known = KnownWords::default();
        known.apply(&store, &word("1"), Mark::Known, 5);
        known.apply(&store, &word("2"), Mark::Known, 6);

        known.reconcile(&store, vec!["2".to_owned(), "3".to_owned()], 100);

        assert!(!known.is_known(&word("1")));
        assert!(known.is_known(&word("2")));
        assert!(known.is_known(&word("3")));
        assert_eq!(known.marked_at(&word("2")), Some(6));
        assert_eq!(known.marked_at(&word("3")), Some(100));
        assert!(known.is_synced());

        known.detach();
        assert!(!known.is_synced());
        assert!(known.is_known(&word("3")));
    }

    #[test]
    fn words_without_id_survive_reconcile_and_reload() {
        let store = MemoryStore::new();
        let legacy = WordEntry::new(None, "legacy", "旧");
        let mut known = KnownWords::default();
        known.reconcile(&store, vec!["1".to_owned()], 1);
        known.apply(&store, &legacy, Mark::Known, 7);

        known.reconcile(&store, vec!["1".to_owned()], 9);
        assert!(known.is_known(&legacy));
        assert_eq!(known.marked_at(&legacy), Some(7));

        let mut reloaded = KnownWords::load(&store);
        reloaded.reconcile(&store, Vec::new(), 10);
        assert!(reloaded.is_known(&legacy));
        assert!(!reloaded.is_known(&word("1")));
        assert_eq!(reloaded.count(), 1);

        reloaded.apply(&store, &legacy, Mark::Unknown, 11);
        reloaded.reconcile(&store, Vec::new(), 12);
        assert!(!reloaded.is_known(&legacy));
    }

    #[test]
    fn forget_plan_collects_page_identifiers() {
        let store = MemoryStore::new();
        let mut known = KnownWords::default();
        known.apply(&store, &word("1"), Mark::Known, 1);
        let page = [word("1"), word("2")];

        let plan = known.plan_forget(&page, &signed_in()).unwrap();
        assert_eq!(plan.known_count(), 1);
        assert_eq!(
            plan.remote,
            Some(("tok".to_owned(), vec!["1".to_owned(), "2".to_owned()]))
        );

        known.apply_forget(&store, &plan);
        assert_eq!(known.count(), 0);
    }

    #[test]
    fn signed_out_forget_with_nothing_known_is_a_no_op() {
        let known = KnownWords::default();
        assert_eq!(known.plan_forget(&[word("1")], &AuthSession::default()), None);
        assert_eq!(known.plan_forget(&[], &signed_in()), None);
    }

    #[test]
    fn forget_all_needs_confirmation() {
        let store = MemoryStore::new();
        let mut known = KnownWords::default();
        known.apply(&store, &word("1"), Mark::Known, 1);

        assert_eq!(known.plan_forget_all(false, &signed_in()), None);
        assert_eq!(known.count(), 1);

        assert_eq!(
            known.plan_forget_all(true, &AuthSession::default()),
            Some(ForgetAllPlan::Local)
        );
        known.apply_forget_all(&store);
        assert_eq!(known.count(), 0);
        assert_eq!(KnownWords::load(&store).count(), 0);
    }
}
