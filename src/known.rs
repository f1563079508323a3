use flashcards::{
    KnownWords, Mark, WordEntry,
    known::{self, MarkPlan},
};
use leptos::{prelude::*, task::spawn_local};

use crate::state::{AppState, now_ms, use_app};

/// Marks `word` known or unknown, syncing with the server when signed in.
pub fn set_mark(state: AppState, word: WordEntry, mark: Mark) {
    let plan = state
        .session
        .with_untracked(|session| state.known.with_untracked(|k| k.plan(&word, mark, session)));
    match plan {
        MarkPlan::Unchanged => return,
        MarkPlan::Local { prompt_login: true } => {
            state.toasts.info("Saved on this device. Log in to sync your progress.")
        }
        _ => {}
    }

    let api = state.api.get_value();
    spawn_local(async move {
        match known::push_mark(&api, &plan, mark).await {
            Ok(()) => {
                state
                    .known
                    .update(|k| k.apply(&state.store, &word, mark, now_ms()));
                if mark == Mark::Known {
                    state.toasts.success(format!("\"{}\" marked as known", word.english));
                }
            }
            Err(e) => state.api_failed("Could not update word", e),
        }
    });
}

pub fn toggle_mark(state: AppState, word: WordEntry) {
    let mark = if state.known.with_untracked(|k| k.is_known(&word)) {
        Mark::Unknown
    } else {
        Mark::Known
    };
    set_mark(state, word, mark);
}

/// Forgets the known words of the page on screen.
pub fn reset_page(state: AppState) {
    let plan = state.session.with_untracked(|session| {
        state.deck.with_untracked(|deck| {
            state
                .known
                .with_untracked(|k| k.plan_forget(deck.words(), session))
        })
    });
    let Some(plan) = plan else {
        state.toasts.info("No known words on this page");
        return;
    };

    let api = state.api.get_value();
    spawn_local(async move {
        match known::push_forget(&api, &plan).await {
            Ok(forgotten) => {
                state.known.update(|k| k.apply_forget(&state.store, &plan));
                state
                    .toasts
                    .success(format!("Reset {forgotten} known words on this page"));
            }
            Err(e) => state.api_failed("Could not reset this page", e),
        }
    });
}

/// Forgets every known word after the user confirms.
pub fn reset_all(state: AppState) {
    let confirmed = window()
        .confirm_with_message("Reset all known words? This cannot be undone.")
        .unwrap_or(false);
    let Some(plan) = state.session.with_untracked(|session| {
        state
            .known
            .with_untracked(|k| k.plan_forget_all(confirmed, session))
    }) else {
        return;
    };

    let local_count = state.known.with_untracked(KnownWords::count);
    let api = state.api.get_value();
    spawn_local(async move {
        match known::push_forget_all(&api, &plan, local_count).await {
            Ok(forgotten) => {
                state.known.update(|k| k.apply_forget_all(&state.store));
                state.toasts.success(format!("Reset {forgotten} known words"));
            }
            Err(e) => state.api_failed("Could not reset known words", e),
        }
    });
}

/// Pulls the server's known set when signed in. A failure other than a
/// rejected token keeps the local cache.
pub async fn sync(state: AppState) {
    let session = state.session.get_untracked();
    let api = state.api.get_value();
    match known::fetch_known(&api, &session).await {
        Ok(Some(ids)) => state
            .known
            .update(|k| k.reconcile(&state.store, ids, now_ms())),
        Ok(None) => {}
        Err(e) if e.needs_login() => state.expire_session(),
        Err(e) => tracing::warn!(error = %e, "could not fetch known words, using local cache"),
    }
}

#[component]
pub fn Progress() -> impl IntoView {
    let state = use_app();
    let known = move || state.known.with(KnownWords::count);
    let total = move || state.pager.with(|p| p.total());
    let synced = move || state.known.with(KnownWords::is_synced);

    view! {
        <div class="stats shadow" aria-label="progress">
            <div class="stat py-2">
                <div class="stat-title">Known</div>
                <div class="stat-value text-2xl">{known} " / " {total}</div>
                <div class="stat-desc">
                    {move || if synced() { "synced with your account" } else { "saved on this device" }}
                </div>
            </div>
        </div>
    }
}
