use dioxus::prelude::*;
use virtuatest_core::model::RegisterDraft;

use crate::context::AppContext;
use crate::views::{ShellState, landing_view, report_failure};
use crate::vm::{DialogKind, ViewId};

#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let mut full_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut password_confirm = use_signal(String::new);
    let mut otp_code = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let otp_ctx = ctx.clone();
    let on_request_code = move |_: MouseEvent| {
        let ctx = otp_ctx.clone();
        let email_value = email().trim().to_lowercase();
        spawn(async move {
            if email_value.is_empty() {
                ctx.dialogs()
                    .alert(DialogKind::Warning, "Email required", "Enter your email first.")
                    .await;
                return;
            }
            match ctx.api().request_otp(&email_value).await {
                Ok(response) => {
                    ctx.dialogs()
                        .alert(DialogKind::Info, "Code sent", response.message)
                        .await;
                }
                Err(err) => report_failure(ctx, shell, "Could not send code", err).await,
            }
        });
    };

    let submit_ctx = ctx.clone();
    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let ctx = submit_ctx.clone();
        let draft = RegisterDraft {
            email: email(),
            password: password(),
            password_confirm: password_confirm(),
            full_name: Some(full_name()),
        };
        let code = otp_code().trim().to_string();
        spawn(async move {
            let request = match draft.validate() {
                Ok(request) => request,
                Err(err) => {
                    ctx.dialogs()
                        .alert(DialogKind::Warning, "Check your details", err.to_string())
                        .await;
                    return;
                }
            };

            busy.set(true);
            let otp = (!code.is_empty()).then_some(code.as_str());
            let result = ctx.api().register(&request, otp).await;
            busy.set(false);
            match result {
                Ok(response) => {
                    password.set(String::new());
                    password_confirm.set(String::new());
                    let credentials = response.into_credentials(request.full_name.clone());
                    let target = landing_view(&credentials);
                    shell.set_user(Some(credentials));
                    shell.navigate(&ctx, target).await;
                }
                Err(err) => report_failure(ctx, shell, "Registration failed", err).await,
            }
        });
    };

    rsx! {
        div { class: "page auth-page",
            h2 { "Create account" }
            form { class: "auth-form", onsubmit: on_submit,
                label { r#for: "register-name", "Full name" }
                input {
                    id: "register-name",
                    value: "{full_name}",
                    oninput: move |evt| full_name.set(evt.value()),
                }
                label { r#for: "register-email", "Email" }
                input {
                    id: "register-email",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "register-password", "Password" }
                input {
                    id: "register-password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                label { r#for: "register-confirm", "Confirm password" }
                input {
                    id: "register-confirm",
                    r#type: "password",
                    value: "{password_confirm}",
                    oninput: move |evt| password_confirm.set(evt.value()),
                }
                label { r#for: "register-otp", "Verification code" }
                div { class: "otp-row",
                    input {
                        id: "register-otp",
                        inputmode: "numeric",
                        value: "{otp_code}",
                        oninput: move |evt| otp_code.set(evt.value()),
                    }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: on_request_code,
                        "Send code"
                    }
                }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(), "Create account" }
            }
            p { class: "auth-switch",
                "Already registered? "
                button {
                    class: "link",
                    onclick: move |_| shell.go(&ctx, ViewId::Login),
                    "Sign in"
                }
            }
        }
    }
}
