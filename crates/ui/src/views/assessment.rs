use std::time::Duration;

use dioxus::prelude::*;
use virtuatest_core::model::{CefrLevel, ModuleName, Question};

use crate::context::AppContext;
use crate::views::{
    ShellState, ViewError, ViewState, report_failure, use_sign_out_on_rejection,
    view_state_from_resource,
};
use crate::vm::{
    AudioProgress, DialogKind, ModuleContent, ModuleFlowVm, ViewId, WordCountVm, format_clock,
    next_module,
};

#[component]
pub fn TestView() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let mut flow = use_signal(|| None::<ModuleFlowVm>);
    let mut completed = use_signal(Vec::<ModuleName>::new);
    let mut audio = use_signal(|| None::<AudioProgress>);
    let mut busy = use_signal(|| false);
    let active = use_memo(move || shell.is_target(ViewId::Test));

    let api = ctx.api();
    let resource = use_resource(move || {
        let api = api.clone();
        let active = active();
        async move {
            flow.set(None);
            audio.set(None);
            if !active {
                return Ok(());
            }
            let session = api.current_session().await?.ok_or(ViewError::NoSession)?;
            let session_id = session.session_id();
            let progress = api.progress(session_id).await?;
            let done: Vec<ModuleName> = progress
                .modules
                .iter()
                .filter(|(_, module)| module.completed)
                .map(|(name, _)| *name)
                .collect();
            let module = progress
                .current_module
                .or_else(|| ModuleName::next_after(&done))
                .ok_or(ViewError::NoSession)?;

            let start = api
                .start_module(session_id, module, CefrLevel::default())
                .await?;
            let vm = ModuleFlowVm::new(start)?;
            if let ModuleContent::Listening(listening) = vm.content() {
                if listening.audio_url.is_none() {
                    audio.set(Some(AudioProgress::for_script(&listening.script)));
                }
            }
            completed.set(done);
            flow.set(Some(vm));
            Ok::<_, ViewError>(())
        }
    });
    use_sign_out_on_rejection(resource);
    let state = view_state_from_resource(resource);

    use_future(move || async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if flow.peek().is_some() {
                flow.with_mut(|vm| {
                    if let Some(vm) = vm.as_mut() {
                        vm.tick();
                    }
                });
            }
            if audio.peek().is_some_and(AudioProgress::is_playing) {
                audio.with_mut(|progress| {
                    if let Some(progress) = progress.as_mut() {
                        progress.tick(1);
                    }
                });
            }
        }
    });

    let submit_ctx = ctx.clone();
    let on_submit = move |_: MouseEvent| {
        if busy() {
            return;
        }
        let ctx = submit_ctx.clone();
        let pending = flow.read().as_ref().map(|vm| (vm.module_name(), vm.submission()));
        spawn(async move {
            let Some((module, submission)) = pending else {
                return;
            };
            let Some(submission) = submission else {
                let message = if module.is_objective() {
                    "Please answer every question before submitting."
                } else {
                    "Please choose a topic and write your response."
                };
                ctx.dialogs()
                    .alert(DialogKind::Warning, "Not finished yet", message)
                    .await;
                return;
            };

            busy.set(true);
            let result = ctx.api().submit_module(&submission).await;
            busy.set(false);
            let evaluation = match result {
                Ok(evaluation) => evaluation,
                Err(err) => {
                    report_failure(ctx, shell, "Submission failed", err).await;
                    return;
                }
            };

            let mut summary = format!(
                "Score: {:.0} ({})",
                evaluation.score, evaluation.cefr_level
            );
            if let Some(feedback) = evaluation.feedback.as_deref() {
                summary.push_str("\n\n");
                summary.push_str(feedback);
            }
            let title = format!("{} completed", module.label());
            ctx.dialogs()
                .alert(DialogKind::Success, title, summary)
                .await;

            match next_module(&evaluation, &completed.peek()) {
                Some(_) => {
                    let mut resource = resource;
                    resource.restart();
                }
                None => {
                    shell.set_focus(Some(evaluation.session_id));
                    shell.navigate(&ctx, ViewId::Result).await;
                }
            }
        });
    };

    let leave_ctx = ctx.clone();
    let on_leave = move |_: MouseEvent| {
        let ctx = leave_ctx.clone();
        spawn(async move {
            if ctx
                .dialogs()
                .confirm_with(
                    DialogKind::Warning,
                    "Leave test?",
                    "Answers for the current module will be lost.",
                    "Leave",
                    "Stay",
                )
                .await
            {
                shell.navigate(&ctx, ViewId::Dashboard).await;
            }
        });
    };

    let current = flow.read().clone();

    rsx! {
        div { class: "page test-page",
            match (state, current) {
                (ViewState::Idle, _) => rsx! {},
                (ViewState::Loading, _) => rsx! {
                    p { class: "loading", "Preparing your module..." }
                },
                (ViewState::Error(err), _) => rsx! {
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
                (ViewState::Ready(()), None) => rsx! {},
                (ViewState::Ready(()), Some(vm)) => rsx! {
                    ModuleHeader {
                        module: vm.module_name(),
                        level: vm.cefr_level(),
                        remaining: vm.remaining_seconds(),
                        done: completed.read().len(),
                    }
                    match vm.content().clone() {
                        ModuleContent::Reading(reading) => rsx! {
                            article { class: "passage", "{reading.text}" }
                            QuestionList { questions: reading.questions, answers: answers_of(&vm), flow }
                        },
                        ModuleContent::Listening(listening) => rsx! {
                            ListeningPlayer {
                                audio_url: listening.audio_url,
                                script: listening.script,
                                progress: audio,
                            }
                            QuestionList { questions: listening.questions, answers: answers_of(&vm), flow }
                        },
                        ModuleContent::Topics(topics) => rsx! {
                            TopicResponse {
                                module: vm.module_name(),
                                topics: topics.topics,
                                chosen: vm.topic().map(str::to_string),
                                response: vm.response().to_string(),
                                flow,
                            }
                        },
                    }
                    div { class: "test-actions",
                        button { class: "btn btn-secondary", onclick: on_leave, "Leave" }
                        button {
                            class: "btn btn-primary",
                            disabled: busy(),
                            onclick: on_submit,
                            if busy() { "Submitting..." } else { "Submit" }
                        }
                    }
                },
            }
        }
    }
}

fn answers_of(vm: &ModuleFlowVm) -> Vec<Option<usize>> {
    (0..vm.questions().len()).map(|index| vm.answer(index)).collect()
}

#[component]
fn ModuleHeader(module: ModuleName, level: CefrLevel, remaining: u32, done: usize) -> Element {
    let clock = format_clock(remaining);
    let timer_class = if remaining == 0 { "timer expired" } else { "timer" };
    let step = done + 1;
    rsx! {
        header { class: "module-header",
            h2 { "{module.label()}" }
            span { class: "module-step", "Module {step} of 4" }
            span { class: "level-badge", "{level}" }
            span { class: "{timer_class}",
                i { class: "fa-solid fa-clock" }
                " {clock}"
            }
        }
    }
}

#[component]
fn QuestionList(
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    flow: Signal<Option<ModuleFlowVm>>,
) -> Element {
    let mut flow = flow;
    rsx! {
        ol { class: "questions",
            for (qi, question) in questions.into_iter().enumerate() {
                li { key: "{qi}", class: "question",
                    p { class: "question-text", "{question.question_text}" }
                    for (oi, option) in question.options.into_iter().enumerate() {
                        label { key: "{oi}", class: "option",
                            input {
                                r#type: "radio",
                                name: "question-{qi}",
                                checked: answers.get(qi).copied().flatten() == Some(oi),
                                onchange: move |_| {
                                    flow.with_mut(|vm| {
                                        if let Some(vm) = vm.as_mut() {
                                            vm.select_answer(qi, oi);
                                        }
                                    });
                                },
                            }
                            " {option}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ListeningPlayer(
    audio_url: Option<String>,
    script: String,
    progress: Signal<Option<AudioProgress>>,
) -> Element {
    let mut progress = progress;
    if let Some(url) = audio_url {
        return rsx! {
            audio { class: "listening-audio", controls: true, src: "{url}" }
        };
    }

    let state = *progress.read();
    let percent = state.map_or(0, AudioProgress::percent);
    let playing = state.is_some_and(AudioProgress::is_playing);
    let finished = state.is_some_and(AudioProgress::is_finished);
    let label = if playing { "Pause" } else { "Play" };

    rsx! {
        div { class: "audio-player",
            button {
                class: "btn btn-secondary",
                disabled: finished,
                onclick: move |_| {
                    progress.with_mut(|progress| {
                        if let Some(progress) = progress.as_mut() {
                            if progress.is_playing() {
                                progress.pause();
                            } else {
                                progress.play();
                            }
                        }
                    });
                },
                "{label}"
            }
            div { class: "progress-bar",
                div { class: "progress-fill", style: "width: {percent}%" }
            }
            if finished {
                details { class: "transcript",
                    summary { "Transcript" }
                    p { "{script}" }
                }
            }
        }
    }
}

#[component]
fn TopicResponse(
    module: ModuleName,
    topics: Vec<String>,
    chosen: Option<String>,
    response: String,
    flow: Signal<Option<ModuleFlowVm>>,
) -> Element {
    let mut flow = flow;
    let counter = WordCountVm::writing(&response);
    let counter_class = counter.class();
    let counter_label = counter.label();
    let placeholder = if module == ModuleName::Speaking {
        "Type what you would say..."
    } else {
        "Write your essay here..."
    };

    rsx! {
        div { class: "topics",
            h3 { "Choose a topic" }
            for (index, topic) in topics.into_iter().enumerate() {
                label { key: "{index}", class: "option",
                    input {
                        r#type: "radio",
                        name: "topic",
                        checked: chosen.as_deref() == Some(topic.as_str()),
                        onchange: move |_| {
                            flow.with_mut(|vm| {
                                if let Some(vm) = vm.as_mut() {
                                    vm.choose_topic(index);
                                }
                            });
                        },
                    }
                    " {topic}"
                }
            }
        }
        textarea {
            class: "response",
            rows: 14,
            placeholder,
            value: "{response}",
            oninput: move |evt| {
                flow.with_mut(|vm| {
                    if let Some(vm) = vm.as_mut() {
                        vm.set_response(evt.value());
                    }
                });
            },
        }
        if module == ModuleName::Writing {
            p { class: "{counter_class}", "{counter_label}" }
        }
    }
}
