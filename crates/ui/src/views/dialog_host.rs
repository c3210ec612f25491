use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::ShellState;
use crate::vm::DialogState;

#[component]
pub fn DialogHost() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let state = shell.dialog.read().clone();

    let DialogState::Open(request) = state else {
        return rsx! {};
    };

    let overlay_dialogs = ctx.dialogs();
    let modal_class = format!("modal modal-{}", request.kind.as_str());
    let icon_class = format!("fa-solid {}", request.kind.icon_class());
    let title = request.title.clone();
    let message = request.message.clone();
    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| overlay_dialogs.dismiss(),
            div {
                class: "{modal_class}",
                role: "dialog",
                onclick: move |evt: MouseEvent| evt.stop_propagation(),
                div { class: "modal-icon",
                    i { class: "{icon_class}" }
                }
                h3 { class: "modal-title", "{title}" }
                p { class: "modal-message", "{message}" }
                div { class: "modal-buttons",
                    for (index, button) in request.buttons.iter().enumerate() {
                        DialogButtonView {
                            key: "{index}",
                            index,
                            label: button.label.clone(),
                            class: button.style.class(),
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn DialogButtonView(index: usize, label: String, class: &'static str) -> Element {
    let ctx = use_context::<AppContext>();
    let dialogs = ctx.dialogs();
    rsx! {
        button {
            class,
            onclick: move |_| {
                dialogs.select(index);
            },
            "{label}"
        }
    }
}
