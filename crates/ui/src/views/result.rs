use dioxus::prelude::*;
use virtuatest_core::model::{ModuleResult, TestResult};

use crate::context::AppContext;
use crate::views::{
    ShellState, ViewError, ViewState, use_sign_out_on_rejection, view_state_from_resource,
};
use crate::vm::ViewId;

#[component]
pub fn ResultView() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let active = use_memo(move || shell.is_target(ViewId::Result));

    let api = ctx.api();
    let resource = use_resource(move || {
        let api = api.clone();
        let active = active();
        let focus = *shell.focus.read();
        async move {
            if !active {
                return Ok(None);
            }
            let session_id = match focus {
                Some(id) => id,
                None => api
                    .current_session()
                    .await?
                    .map(|session| session.session_id())
                    .ok_or(ViewError::NoSession)?,
            };
            let result = api.result(session_id).await?;
            Ok::<_, ViewError>(Some(result))
        }
    });
    use_sign_out_on_rejection(resource);
    let state = view_state_from_resource(resource);
    let dashboard_ctx = ctx.clone();

    rsx! {
        div { class: "page result-page",
            h2 { "Your result" }
            match state {
                ViewState::Idle | ViewState::Ready(None) => rsx! {},
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(Some(result)) => rsx! {
                    ResultSummary { result }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
            }
            div { class: "result-actions",
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| shell.go(&ctx, ViewId::History),
                    "History"
                }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| shell.go(&dashboard_ctx, ViewId::Dashboard),
                    "Dashboard"
                }
            }
        }
    }
}

#[component]
fn ResultSummary(result: TestResult) -> Element {
    let overall = format!("{:.1}", result.overall_score);
    let minutes = format!("{:.0}", result.total_duration_minutes);
    let completed_on = result.completion_date.format("%Y-%m-%d %H:%M").to_string();
    let description = result.cefr_description.clone().unwrap_or_default();

    rsx! {
        div { class: "card overall-card",
            span { class: "level-badge large", "{result.overall_cefr_level}" }
            p { class: "overall-score", "Overall score: {overall}" }
            if !description.is_empty() {
                p { class: "level-description", "{description}" }
            }
            p { class: "result-meta", "Completed {completed_on} in {minutes} minutes" }
        }
        table { class: "module-results",
            thead {
                tr {
                    th { "Module" }
                    th { "Score" }
                    th { "Level" }
                    th { "Feedback" }
                }
            }
            tbody {
                for module in result.module_results {
                    ModuleRow { key: "{module.module_name}", module }
                }
            }
        }
        if !result.recommendations.is_empty() {
            div { class: "card recommendations",
                h3 { "Recommendations" }
                ul {
                    for (index, tip) in result.recommendations.into_iter().enumerate() {
                        li { key: "{index}", "{tip}" }
                    }
                }
            }
        }
    }
}

#[component]
fn ModuleRow(module: ModuleResult) -> Element {
    let score = format!("{:.1}", module.score);
    let feedback = module.feedback.clone().unwrap_or_default();
    rsx! {
        tr {
            td { "{module.module_name.label()}" }
            td { "{score}" }
            td { "{module.cefr_level}" }
            td { class: "feedback", "{feedback}" }
        }
    }
}
