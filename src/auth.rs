use flashcards::{
    AuthError, AuthSession, KnownWords,
    auth::{self, SessionCheck},
    pager::page_query,
};
use leptos::{prelude::*, task::spawn_local};
use leptos_router::components::A;
use word_api::auth::{ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest};

use crate::{
    known,
    state::{AppState, Dialog, use_app},
};

/// Checks a session restored from storage once per app start.
pub fn validate_stored_session(state: AppState) {
    let session = state.session.get_untracked();
    if !session.is_authenticated() {
        return;
    }
    let api = state.api.get_value();
    spawn_local(async move {
        match auth::validate(&api, &state.store, session).await {
            SessionCheck::Valid(session) => state.session.set(session),
            SessionCheck::Expired => {
                state.session.set(AuthSession::default());
                state.known.update(KnownWords::detach);
                state.toasts.info("Your session has expired, please log in again");
            }
            SessionCheck::Unverified(_, e) => {
                tracing::warn!(error = %e, "keeping unverified session")
            }
            SessionCheck::Anonymous => {}
        }
    });
}

fn signed_in(state: AppState, session: AuthSession, greeting: &str) {
    let name = session
        .user
        .as_ref()
        .map(|user| user.display_name().to_owned())
        .unwrap_or_default();
    state.session.set(session);
    state.close_dialog();
    state.toasts.success(format!("{greeting}, {name}"));
    spawn_local(known::sync(state));
}

pub fn logout(state: AppState) {
    state.session.set(AuthSession::clear(&state.store));
    state.known.update(KnownWords::detach);
    tracing::info!("logged out");
    state.toasts.info("You have been logged out");
}

/// Form error shown above the submit button.
fn error_line(error: ReadSignal<Option<String>>) -> impl IntoView {
    move || {
        error
            .get()
            .map(|message| view! { <p class="text-error" role="alert">{message}</p> })
    }
}

#[component]
pub fn LoginForm() -> impl IntoView {
    let state = use_app();
    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (pending, set_pending) = signal(false);

    let submit = move |e: web_sys::SubmitEvent| {
        e.prevent_default();
        let request = LoginRequest {
            username: username.get_untracked(),
            password: password.get_untracked(),
        };
        let api = state.api.get_value();
        set_pending.set(true);
        set_error.set(None);
        spawn_local(async move {
            match auth::login(&api, &state.store, request).await {
                Ok(session) => signed_in(state, session, "Welcome back"),
                Err(e) => set_error.set(Some(e.to_string())),
            }
            set_pending.set(false);
        });
    };

    view! {
        <h3 class="text-2xl font-bold">Log in</h3>
        <form class="flex flex-col gap-3 mt-4" on:submit=submit>
            <input
                type="text"
                class="input w-full"
                placeholder="Username"
                aria-label="username"
                autocomplete="username"
                bind:value=(username, set_username)
            />
            <input
                type="password"
                class="input w-full"
                placeholder="Password"
                aria-label="password"
                autocomplete="current-password"
                bind:value=(password, set_password)
            />
            {error_line(error)}
            <button type="submit" class="btn btn-primary" disabled=pending>
                log in
            </button>
        </form>
        <p class="mt-3">
            "No account yet? "
            <button type="button" class="link" on:click=move |_| state.open(Dialog::Register)>
                register
            </button>
        </p>
    }
}

#[component]
pub fn RegisterForm() -> impl IntoView {
    let state = use_app();
    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (full_name, set_full_name) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (pending, set_pending) = signal(false);

    let submit = move |e: web_sys::SubmitEvent| {
        e.prevent_default();
        let request = RegisterRequest {
            username: username.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            full_name: full_name.get_untracked(),
        };
        let confirm = confirm.get_untracked();
        let api = state.api.get_value();
        set_pending.set(true);
        set_error.set(None);
        spawn_local(async move {
            match auth::register(&api, &state.store, request, &confirm).await {
                Ok(session) => signed_in(state, session, "Welcome"),
                Err(e) => set_error.set(Some(e.to_string())),
            }
            set_pending.set(false);
        });
    };

    view! {
        <h3 class="text-2xl font-bold">Create an account</h3>
        <form class="flex flex-col gap-3 mt-4" on:submit=submit>
            <input
                type="text"
                class="input w-full"
                placeholder="Username"
                aria-label="username"
                autocomplete="username"
                bind:value=(username, set_username)
            />
            <input
                type="email"
                class="input w-full"
                placeholder="Email"
                aria-label="email"
                bind:value=(email, set_email)
            />
            <input
                type="text"
                class="input w-full"
                placeholder="Full name (optional)"
                aria-label="full name"
                bind:value=(full_name, set_full_name)
            />
            <input
                type="password"
                class="input w-full"
                placeholder="Password"
                aria-label="password"
                autocomplete="new-password"
                bind:value=(password, set_password)
            />
            <input
                type="password"
                class="input w-full"
                placeholder="Confirm password"
                aria-label="confirm password"
                autocomplete="new-password"
                bind:value=(confirm, set_confirm)
            />
            {error_line(error)}
            <button type="submit" class="btn btn-primary" disabled=pending>
                register
            </button>
        </form>
        <p class="mt-3">
            "Already registered? "
            <button type="button" class="link" on:click=move |_| state.open(Dialog::Login)>
                log in
            </button>
        </p>
    }
}

#[component]
pub fn AccountMenu() -> impl IntoView {
    let state = use_app();
    let name = move || {
        state.session.with(|session| {
            session
                .user
                .as_ref()
                .map(|user| user.display_name().to_owned())
                .unwrap_or_else(|| "Account".to_owned())
        })
    };

    view! {
        <Show
            when=move || state.is_signed_in()
            fallback=move || view! {
                <div class="join">
                    <button type="button" class="btn btn-sm join-item" on:click=move |_| state.open(Dialog::Login)>
                        log in
                    </button>
                    <button type="button" class="btn btn-sm join-item" on:click=move |_| state.open(Dialog::Register)>
                        register
                    </button>
                </div>
            }
        >
            <div class="join">
                <A href="/account" attr:class="btn btn-sm join-item">{name}</A>
                <button type="button" class="btn btn-sm join-item" on:click=move |_| logout(state)>
                    log out
                </button>
            </div>
        </Show>
    }
}

/// Reports a failed account call; a rejected token ends the session.
fn account_failed(state: AppState, set_error: WriteSignal<Option<String>>, e: AuthError) {
    if e.needs_login() {
        state.expire_session();
    } else {
        set_error.set(Some(e.to_string()));
    }
}

#[component]
pub fn AccountPage() -> impl IntoView {
    let state = use_app();
    let back = move || match state.shown.get_value() {
        Some((page, page_size)) => format!("/{}", page_query(page, page_size)),
        None => "/".to_owned(),
    };

    view! {
        <main class="container mx-auto p-4 flex flex-col gap-8 max-w-xl">
            <A href=back attr:class="link">"← back to the cards"</A>
            <Show
                when=move || state.is_signed_in()
                fallback=move || view! {
                    <p>
                        "Log in to manage your account. "
                        <button type="button" class="link" on:click=move |_| state.open(Dialog::Login)>
                            log in
                        </button>
                    </p>
                }
            >
                <ProfileForm />
                <PasswordForm />
            </Show>
        </main>
    }
}

#[component]
fn ProfileForm() -> impl IntoView {
    let state = use_app();
    let user = state
        .session
        .with_untracked(|session| session.user.clone())
        .unwrap_or_default();
    let (full_name, set_full_name) = signal(user.full_name);
    let (email, set_email) = signal(user.email);
    let (avatar_url, set_avatar_url) = signal(user.avatar_url);
    let (bio, set_bio) = signal(user.bio);
    let (error, set_error) = signal(None::<String>);
    let (pending, set_pending) = signal(false);

    let submit = move |e: web_sys::SubmitEvent| {
        e.prevent_default();
        let request = ProfileUpdate {
            full_name: full_name.get_untracked(),
            avatar_url: avatar_url.get_untracked(),
            bio: bio.get_untracked(),
            email: email.get_untracked(),
        };
        let session = state.session.get_untracked();
        let api = state.api.get_value();
        set_pending.set(true);
        set_error.set(None);
        spawn_local(async move {
            match auth::update_profile(&api, &state.store, &session, request).await {
                Ok(session) => {
                    state.session.set(session);
                    state.toasts.success("Profile updated");
                }
                Err(e) => account_failed(state, set_error, e),
            }
            set_pending.set(false);
        });
    };

    view! {
        <section>
            <h2 class="text-2xl font-bold">Profile</h2>
            <p class="opacity-70">
                {move || state.session.with(|s| s.user.as_ref().map(|u| u.username.clone()))}
            </p>
            <form class="flex flex-col gap-3 mt-4" on:submit=submit>
                <input
                    type="text"
                    class="input w-full"
                    placeholder="Full name"
                    aria-label="full name"
                    bind:value=(full_name, set_full_name)
                />
                <input
                    type="email"
                    class="input w-full"
                    placeholder="Email"
                    aria-label="email"
                    bind:value=(email, set_email)
                />
                <input
                    type="url"
                    class="input w-full"
                    placeholder="Avatar URL"
                    aria-label="avatar url"
                    bind:value=(avatar_url, set_avatar_url)
                />
                <textarea
                    class="textarea w-full"
                    placeholder="Bio"
                    aria-label="bio"
                    bind:value=(bio, set_bio)
                ></textarea>
                {error_line(error)}
                <button type="submit" class="btn btn-primary" disabled=pending>
                    save
                </button>
            </form>
        </section>
    }
}

#[component]
fn PasswordForm() -> impl IntoView {
    let state = use_app();
    let (current, set_current) = signal(String::new());
    let (new_password, set_new_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (pending, set_pending) = signal(false);

    let submit = move |e: web_sys::SubmitEvent| {
        e.prevent_default();
        let request = ChangePasswordRequest {
            current_password: current.get_untracked(),
            new_password: new_password.get_untracked(),
        };
        let confirm_password = confirm.get_untracked();
        let session = state.session.get_untracked();
        let api = state.api.get_value();
        set_pending.set(true);
        set_error.set(None);
        spawn_local(async move {
            match auth::change_password(&api, &session, request, &confirm_password).await {
                Ok(()) => {
                    set_current.set(String::new());
                    set_new_password.set(String::new());
                    set_confirm.set(String::new());
                    state.toasts.success("Password changed");
                }
                Err(e) => account_failed(state, set_error, e),
            }
            set_pending.set(false);
        });
    };

    view! {
        <section>
            <h2 class="text-2xl font-bold">Change password</h2>
            <form class="flex flex-col gap-3 mt-4" on:submit=submit>
                <input
                    type="password"
                    class="input w-full"
                    placeholder="Current password"
                    aria-label="current password"
                    autocomplete="current-password"
                    bind:value=(current, set_current)
                />
                <input
                    type="password"
                    class="input w-full"
                    placeholder="New password"
                    aria-label="new password"
                    autocomplete="new-password"
                    bind:value=(new_password, set_new_password)
                />
                <input
                    type="password"
                    class="input w-full"
                    placeholder="Confirm new password"
                    aria-label="confirm new password"
                    autocomplete="new-password"
                    bind:value=(confirm, set_confirm)
                />
                {error_line(error)}
                <button type="submit" class="btn btn-primary" disabled=pending>
                    change password
                </button>
            </form>
        </section>
    }
}
