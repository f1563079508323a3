use std::time::Duration;

use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    id: u64,
    kind: ToastKind,
    message: String,
}

/// Transient notifications; each one disappears after `ttl`.
#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
    ttl: Duration,
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
            ttl,
        }
    }

    pub fn push(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        let message = message.into();
        match kind {
            ToastKind::Error => leptos::logging::warn!("{}", message),
            _ => leptos::logging::log!("{}", message),
        }
        self.items.update(|items| items.push(Toast { id, kind, message }));

        let items = self.items;
        set_timeout(
            move || items.update(|items| items.retain(|t| t.id != id)),
            self.ttl,
        );
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message)
    }
}

#[component]
pub fn ToastHost(toasts: Toasts) -> impl IntoView {
    view! {
        <div class="toast toast-top toast-end z-50" aria-live="polite">
            <For
                each=move || toasts.items.get()
                key=|toast| toast.id
                children=move |toast| {
                    let kind = toast.kind;
                    view! {
                        <div
                            class="alert"
                            class=("alert-info", move || kind == ToastKind::Info)
                            class=("alert-success", move || kind == ToastKind::Success)
                            class=("alert-error", move || kind == ToastKind::Error)
                        >
                            <span>{toast.message}</span>
                        </div>
                    }
                }
            />
        </div>
    }
}
