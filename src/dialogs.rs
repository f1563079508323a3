use flashcards::{WordApi, shortcuts::HELP};
use leptos::prelude::*;

use crate::{
    auth::{LoginForm, RegisterForm},
    cards::WordDetail,
    state::{Dialog, UiStoreFields, use_app},
};

/// The one modal that may be open at a time.
#[component]
pub fn DialogHost() -> impl IntoView {
    let state = use_app();
    let dialog = move || state.ui.dialog().get();

    view! {
        <Show when=move || dialog().is_some()>
            <div class="modal modal-open" role="dialog" aria-modal="true">
                <section class="modal-box">
                    <button
                        type="button"
                        class="btn btn-sm btn-circle btn-ghost absolute right-2 top-2"
                        aria-label="close"
                        on:click=move |_| state.close_dialog()
                    >
                        "✕"
                    </button>
                    {move || match dialog() {
                        Some(Dialog::Login) => view! { <LoginForm /> }.into_any(),
                        Some(Dialog::Register) => view! { <RegisterForm /> }.into_any(),
                        Some(Dialog::Stats) => view! { <StatsPanel /> }.into_any(),
                        Some(Dialog::Help) => view! { <HelpPanel /> }.into_any(),
                        Some(Dialog::Detail(index)) => view! { <WordDetail index /> }.into_any(),
                        None => ().into_any(),
                    }}
                </section>
                <div class="modal-backdrop" on:click=move |_| state.close_dialog()></div>
            </div>
        </Show>
    }
}

#[component]
fn StatsPanel() -> impl IntoView {
    let state = use_app();
    let api = state.api.get_value();
    let stats = LocalResource::new(move || {
        let api = api.clone();
        async move { api.stats().await }
    });

    view! {
        <h3 class="text-2xl font-bold">Statistics</h3>
        <Suspense fallback=|| view! { <span class="loading loading-spinner"></span> }>
            {move || Suspend::new(async move {
                match stats.await {
                    Ok(stats) => leptos::either::Either::Left(view! {
                        <div class="stats stats-vertical sm:stats-horizontal w-full mt-4">
                            <div class="stat">
                                <div class="stat-title">Total words</div>
                                <div class="stat-value">{stats.total_words}</div>
                            </div>
                            <div class="stat">
                                <div class="stat-title">Pages</div>
                                <div class="stat-value">{stats.total_pages}</div>
                            </div>
                            <div class="stat">
                                <div class="stat-title">Per page</div>
                                <div class="stat-value">{stats.page_size}</div>
                            </div>
                        </div>
                        <p class="opacity-70">"Source: " {stats.file_source}</p>
                    }),
                    Err(e) => {
                        state.toasts.error(format!("Failed to load stats: {e}"));
                        leptos::either::Either::Right(view! {
                            <p class="text-error" role="alert">"Statistics are unavailable"</p>
                        })
                    }
                }
            })}
        </Suspense>
    }
}

#[component]
fn HelpPanel() -> impl IntoView {
    view! {
        <h3 class="text-2xl font-bold">Keyboard shortcuts</h3>
        <table class="table mt-4">
            <tbody>
                {HELP
                    .into_iter()
                    .map(|(keys, shortcut)| view! {
                        <tr>
                            <td><kbd class="kbd kbd-sm">{keys}</kbd></td>
                            <td>{shortcut.describe()}</td>
                        </tr>
                    })
                    .collect_view()}
            </tbody>
        </table>
        <p class="mt-4 opacity-70">
            "Click a card to select it. Use its menu to mark it known or see details."
        </p>
    }
}
