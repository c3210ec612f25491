use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::{ShellState, landing_view, report_failure};
use crate::vm::{DialogKind, ViewId};

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let submit_ctx = ctx.clone();
    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let ctx = submit_ctx.clone();
        let email_value = email().trim().to_string();
        let password_value = password();
        spawn(async move {
            if email_value.is_empty() || password_value.is_empty() {
                ctx.dialogs()
                    .alert(
                        DialogKind::Warning,
                        "Missing details",
                        "Please enter your email and password.",
                    )
                    .await;
                return;
            }

            busy.set(true);
            let result = ctx.api().login(&email_value, &password_value).await;
            busy.set(false);
            match result {
                Ok(response) => {
                    password.set(String::new());
                    let credentials = response.into_credentials();
                    let target = landing_view(&credentials);
                    shell.set_user(Some(credentials));
                    shell.navigate(&ctx, target).await;
                }
                Err(err) => report_failure(ctx, shell, "Login failed", err).await,
            }
        });
    };

    let label = if busy() { "Signing in..." } else { "Sign in" };

    rsx! {
        div { class: "page auth-page",
            h2 { "Sign in" }
            form { class: "auth-form", onsubmit: on_submit,
                label { r#for: "login-email", "Email" }
                input {
                    id: "login-email",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "login-password", "Password" }
                input {
                    id: "login-password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(), "{label}" }
            }
            p { class: "auth-switch",
                "No account yet? "
                button {
                    class: "link",
                    onclick: move |_| shell.go(&ctx, ViewId::Register),
                    "Create one"
                }
            }
        }
    }
}
