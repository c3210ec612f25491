use dioxus::prelude::*;
use virtuatest_core::model::{SessionId, SessionSummary};

use crate::context::AppContext;
use crate::views::{
    ShellState, ViewError, ViewState, use_sign_out_on_rejection, view_state_from_resource,
};
use crate::vm::ViewId;

const HISTORY_LIMIT: u32 = 20;

#[derive(Clone, Debug, PartialEq)]
struct HistoryRowVm {
    id: SessionId,
    date: String,
    status: &'static str,
    level: String,
    score: String,
    modules: String,
    completed: bool,
}

fn map_history_rows(items: &[SessionSummary]) -> Vec<HistoryRowVm> {
    items
        .iter()
        .map(|item| HistoryRowVm {
            id: item.id,
            date: item.start_date.format("%Y-%m-%d %H:%M").to_string(),
            status: if item.is_completed {
                "Completed"
            } else {
                "In progress"
            },
            level: item
                .overall_cefr_level
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            score: item
                .overall_score
                .map_or_else(|| "-".to_string(), |score| format!("{score:.1}")),
            modules: format!("{}/4", item.completed_modules.len()),
            completed: item.is_completed,
        })
        .collect()
}

#[component]
pub fn HistoryView() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let active = use_memo(move || shell.is_target(ViewId::History));

    let api = ctx.api();
    let resource = use_resource(move || {
        let api = api.clone();
        let active = active();
        async move {
            if !active {
                return Ok(None);
            }
            let items = api.history(HISTORY_LIMIT).await?;
            Ok::<_, ViewError>(Some(map_history_rows(&items)))
        }
    });

    use_sign_out_on_rejection(resource);
    let state = view_state_from_resource(resource);
    let back_ctx = ctx.clone();

    rsx! {
        div { class: "page",
            h2 { "History" }

            match state {
                ViewState::Idle | ViewState::Ready(None) => rsx! {},
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(Some(rows)) => rsx! {
                    if rows.is_empty() {
                        p { "No tests taken yet." }
                    } else {
                        table { class: "history",
                            thead {
                                tr {
                                    th { "Started" }
                                    th { "Status" }
                                    th { "Modules" }
                                    th { "Level" }
                                    th { "Score" }
                                    th {}
                                }
                            }
                            tbody {
                                for row in rows {
                                    HistoryRow { key: "{row.id}", row }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }

            button {
                class: "btn btn-secondary",
                onclick: move |_| shell.go(&back_ctx, ViewId::Dashboard),
                "Back"
            }
        }
    }
}

#[component]
fn HistoryRow(row: HistoryRowVm) -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let id = row.id;
    rsx! {
        tr {
            td { "{row.date}" }
            td { "{row.status}" }
            td { "{row.modules}" }
            td { "{row.level}" }
            td { "{row.score}" }
            td {
                if row.completed {
                    button {
                        class: "link",
                        onclick: move |_| {
                            shell.set_focus(Some(id));
                            shell.go(&ctx, ViewId::Result);
                        },
                        "View result"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_show_placeholders_for_unfinished_tests() {
        let items: Vec<SessionSummary> = serde_json::from_value(json!([
            {
                "id": 4,
                "student_id": 1,
                "start_date": "2025-03-02T10:15:00",
                "is_completed": true,
                "overall_cefr_level": "B2",
                "overall_score": 71.4,
                "completed_modules": ["reading", "listening", "speaking", "writing"]
            },
            {
                "id": 5,
                "student_id": 1,
                "start_date": "2025-03-03T08:00:00",
                "is_completed": false,
                "completed_modules": ["reading"]
            }
        ]))
        .unwrap();

        let rows = map_history_rows(&items);
        assert_eq!(rows[0].date, "2025-03-02 10:15");
        assert_eq!(rows[0].score, "71.4");
        assert_eq!(rows[0].modules, "4/4");
        assert_eq!(rows[1].status, "In progress");
        assert_eq!(rows[1].level, "-");
        assert_eq!(rows[1].score, "-");
        assert!(!rows[1].completed);
    }
}
