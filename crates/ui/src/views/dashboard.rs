use dioxus::prelude::*;
use tracing::warn;
use virtuatest_core::model::{SessionId, SessionSummary, TestProgress};

use crate::context::AppContext;
use crate::views::{
    ShellState, ViewError, ViewState, log_out, report_failure, use_sign_out_on_rejection,
    view_state_from_resource,
};
use crate::vm::{Dropdown, ViewId};

const RECENT_LIMIT: u32 = 5;

#[derive(Clone, Debug, PartialEq)]
struct DashboardData {
    /// Progress of the cached, unfinished session.
    progress: Option<TestProgress>,
    recent: Vec<SessionSummary>,
}

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let mut menu = use_signal(Dropdown::default);
    let mut busy = use_signal(|| false);
    let active = use_memo(move || shell.is_target(ViewId::Dashboard));

    let api = ctx.api();
    let resource = use_resource(move || {
        let api = api.clone();
        let active = active();
        async move {
            if !active {
                return Ok(None);
            }
            let progress = match api.current_session().await? {
                Some(session) if !session.is_completed() => {
                    match api.progress(session.session_id()).await {
                        Ok(progress) if progress.is_finished() => None,
                        Ok(progress) => Some(progress),
                        Err(err) if err.is_auth_failure() => return Err(err.into()),
                        Err(err) => {
                            warn!(error = %err, "could not load progress of cached session");
                            None
                        }
                    }
                }
                _ => None,
            };
            let recent = api.history(RECENT_LIMIT).await?;
            Ok::<_, ViewError>(Some(DashboardData { progress, recent }))
        }
    });
    use_sign_out_on_rejection(resource);
    let state = view_state_from_resource(resource);

    let start_ctx = ctx.clone();
    let on_start = move |_: MouseEvent| {
        if busy() {
            return;
        }
        let ctx = start_ctx.clone();
        spawn(async move {
            busy.set(true);
            let result = ctx.api().start_test().await;
            busy.set(false);
            match result {
                Ok(session) => {
                    shell.set_focus(Some(session.session_id()));
                    shell.navigate(&ctx, ViewId::Test).await;
                }
                Err(err) => report_failure(ctx, shell, "Could not start test", err).await,
            }
        });
    };

    let logout_ctx = ctx.clone();
    let on_logout = move |evt: MouseEvent| {
        evt.stop_propagation();
        menu.write().close();
        let ctx = logout_ctx.clone();
        spawn(async move {
            if !ctx
                .dialogs()
                .confirm("Log out", "Do you want to log out?")
                .await
            {
                return;
            }
            log_out(&ctx, shell).await;
        });
    };

    let user = shell.user.read().clone();
    let name = user
        .as_ref()
        .map(|c| c.user.display_name().to_string())
        .unwrap_or_default();
    let is_admin = user.as_ref().is_some_and(|c| c.user.role.is_admin());
    let menu_class = menu().class();
    let history_ctx = ctx.clone();
    let admin_ctx = ctx.clone();
    let continue_ctx = ctx.clone();

    rsx! {
        div { class: "page dashboard", onclick: move |_| menu.write().close(),
            header { class: "dashboard-header",
                h2 { "Welcome, {name}" }
                div { class: "{menu_class}",
                    button {
                        class: "btn btn-secondary dropdown-toggle",
                        onclick: move |evt: MouseEvent| {
                            evt.stop_propagation();
                            menu.write().toggle();
                        },
                        i { class: "fa-solid fa-user" }
                    }
                    if menu().is_open() {
                        ul { class: "dropdown-menu",
                            li {
                                button {
                                    onclick: move |_| shell.go(&history_ctx, ViewId::History),
                                    "History"
                                }
                            }
                            if is_admin {
                                li {
                                    button {
                                        onclick: move |_| shell.go(&admin_ctx, ViewId::Admin),
                                        "Admin panel"
                                    }
                                }
                            }
                            li {
                                button { onclick: on_logout, "Log out" }
                            }
                        }
                    }
                }
            }

            match state {
                ViewState::Idle | ViewState::Ready(None) => rsx! {},
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(Some(data)) => rsx! {
                    match data.progress {
                        Some(progress) => rsx! {
                            ProgressCard {
                                progress,
                                on_continue: move |session_id| {
                                    shell.set_focus(Some(session_id));
                                    shell.go(&continue_ctx, ViewId::Test);
                                },
                            }
                        },
                        None => rsx! {
                            div { class: "card start-card",
                                h3 { "Ready for your assessment?" }
                                p { "Reading, listening, speaking and writing, in that order." }
                                button {
                                    class: "btn btn-primary",
                                    disabled: busy(),
                                    onclick: on_start,
                                    "Start test"
                                }
                            }
                        },
                    }
                    RecentSessions { sessions: data.recent }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn ProgressCard(
    progress: TestProgress,
    on_continue: EventHandler<SessionId>,
) -> Element {
    let percent = format!("{:.0}", progress.progress_percent);
    let current = progress
        .current_module
        .map_or("Finished", |module| module.label());
    let session_id = progress.session_id;
    let done = progress.completed_modules;
    let total = progress.total_modules;

    rsx! {
        div { class: "card progress-card",
            h3 { "Test in progress" }
            div { class: "progress-bar",
                div { class: "progress-fill", style: "width: {percent}%" }
            }
            p { "{done} of {total} modules completed. Next: {current}" }
            button {
                class: "btn btn-primary",
                onclick: move |_| on_continue.call(session_id),
                "Continue test"
            }
        }
    }
}

#[component]
fn RecentSessions(sessions: Vec<SessionSummary>) -> Element {
    rsx! {
        div { class: "card recent-card",
            h3 { "Recent tests" }
            if sessions.is_empty() {
                p { "No tests taken yet." }
            } else {
                ul {
                    for session in sessions {
                        RecentRow { key: "{session.id}", session }
                    }
                }
            }
        }
    }
}

#[component]
fn RecentRow(session: SessionSummary) -> Element {
    let date = session.start_date.format("%Y-%m-%d").to_string();
    let level = session
        .overall_cefr_level
        .clone()
        .unwrap_or_else(|| "-".to_string());
    let status = if session.is_completed {
        "Completed"
    } else {
        "In progress"
    };
    rsx! {
        li { class: "recent-row",
            span { class: "recent-date", "{date}" }
            span { class: "recent-status", "{status}" }
            span { class: "recent-level", "{level}" }
        }
    }
}
