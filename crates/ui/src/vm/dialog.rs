use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{oneshot, watch};
use tracing::debug;

/// Semantic flavour of a dialog; selects its icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Success,
    Warning,
    Error,
    Question,
}

impl DialogKind {
    #[must_use]
    pub fn icon_class(self) -> &'static str {
        match self {
            DialogKind::Info => "fa-circle-info",
            DialogKind::Success => "fa-circle-check",
            DialogKind::Warning => "fa-triangle-exclamation",
            DialogKind::Error => "fa-circle-xmark",
            DialogKind::Question => "fa-circle-question",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DialogKind::Info => "info",
            DialogKind::Success => "success",
            DialogKind::Warning => "warning",
            DialogKind::Error => "error",
            DialogKind::Question => "question",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Danger,
}

impl ButtonStyle {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            ButtonStyle::Primary => "btn btn-primary",
            ButtonStyle::Secondary => "btn btn-secondary",
            ButtonStyle::Danger => "btn btn-danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogButton {
    pub label: String,
    pub value: String,
    pub style: ButtonStyle,
}

impl DialogButton {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            style,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogRequest {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    pub buttons: Vec<DialogButton>,
}

impl DialogRequest {
    #[must_use]
    pub fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            buttons: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: DialogButton) -> Self {
        self.buttons.push(button);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Closed,
    Open(DialogRequest),
}

impl DialogState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, DialogState::Open(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The value of the clicked button.
    Selected(String),
    /// Overlay click, or replaced by a newer dialog.
    Dismissed,
}

const OK_VALUE: &str = "ok";
const CONFIRM_VALUE: &str = "confirm";
const CANCEL_VALUE: &str = "cancel";

/// Handle to the pending answer of a shown dialog.
#[derive(Debug)]
pub struct PendingDialog(oneshot::Receiver<DialogOutcome>);

impl PendingDialog {
    pub async fn outcome(self) -> DialogOutcome {
        self.0.await.unwrap_or(DialogOutcome::Dismissed)
    }
}

/// The single modal of the application.
///
/// Cloned handles share one dialog. Showing a request while another is open
/// replaces its content and resolves the earlier caller as `Dismissed`.
#[derive(Clone)]
pub struct DialogService {
    inner: Arc<DialogInner>,
}

struct DialogInner {
    state: watch::Sender<DialogState>,
    pending: Mutex<Option<oneshot::Sender<DialogOutcome>>>,
}

impl Default for DialogService {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogService {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(DialogState::Closed);
        Self {
            inner: Arc::new(DialogInner {
                state,
                pending: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> DialogState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DialogState> {
        self.inner.state.subscribe()
    }

    /// Open the dialog with `request`. The content is visible as soon as this
    /// returns; await the handle for the user's answer.
    pub fn show(&self, request: DialogRequest) -> PendingDialog {
        let (reply, outcome) = oneshot::channel();
        let replaced = self.lock_pending().replace(reply);
        if let Some(previous) = replaced {
            let _ = previous.send(DialogOutcome::Dismissed);
        }
        debug!(kind = request.kind.as_str(), title = %request.title, "dialog opened");
        self.inner.state.send_replace(DialogState::Open(request));
        PendingDialog(outcome)
    }

    /// Single-button notice.
    pub async fn alert(
        &self,
        kind: DialogKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        let request = DialogRequest::new(kind, title, message).with_button(DialogButton::new(
            "OK",
            OK_VALUE,
            ButtonStyle::Primary,
        ));
        self.show(request).outcome().await;
    }

    /// True only when the confirm button is clicked.
    pub async fn confirm(&self, title: impl Into<String>, message: impl Into<String>) -> bool {
        self.confirm_with(DialogKind::Question, title, message, "Confirm", "Cancel")
            .await
    }

    pub async fn confirm_with(
        &self,
        kind: DialogKind,
        title: impl Into<String>,
        message: impl Into<String>,
        confirm_label: &str,
        cancel_label: &str,
    ) -> bool {
        let confirm_style = if kind == DialogKind::Warning {
            ButtonStyle::Danger
        } else {
            ButtonStyle::Primary
        };
        let request = DialogRequest::new(kind, title, message)
            .with_button(DialogButton::new(
                cancel_label,
                CANCEL_VALUE,
                ButtonStyle::Secondary,
            ))
            .with_button(DialogButton::new(confirm_label, CONFIRM_VALUE, confirm_style));
        self.show(request).outcome().await == DialogOutcome::Selected(CONFIRM_VALUE.into())
    }

    /// Button click. Returns false when no dialog is open or `index` is out
    /// of range.
    pub fn select(&self, index: usize) -> bool {
        let value = match &*self.inner.state.borrow() {
            DialogState::Open(request) => request.buttons.get(index).map(|b| b.value.clone()),
            DialogState::Closed => None,
        };
        match value {
            Some(value) => {
                self.resolve(DialogOutcome::Selected(value));
                true
            }
            None => false,
        }
    }

    /// Overlay click.
    pub fn dismiss(&self) {
        if self.inner.state.borrow().is_open() {
            self.resolve(DialogOutcome::Dismissed);
        }
    }

    fn resolve(&self, outcome: DialogOutcome) {
        self.inner.state.send_replace(DialogState::Closed);
        if let Some(reply) = self.lock_pending().take() {
            let _ = reply.send(outcome);
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<oneshot::Sender<DialogOutcome>>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn wait_open(dialogs: &DialogService) -> DialogRequest {
        let mut rx = dialogs.subscribe();
        loop {
            if let DialogState::Open(request) = rx.borrow_and_update().clone() {
                return request;
            }
            rx.changed().await.unwrap();
        }
    }

    #[test]
    fn kinds_map_to_icons() {
        assert_eq!(DialogKind::Info.icon_class(), "fa-circle-info");
        assert_eq!(DialogKind::Success.icon_class(), "fa-circle-check");
        assert_eq!(DialogKind::Warning.icon_class(), "fa-triangle-exclamation");
        assert_eq!(DialogKind::Error.icon_class(), "fa-circle-xmark");
        assert_eq!(DialogKind::Question.icon_class(), "fa-circle-question");
    }

    #[tokio::test]
    async fn select_resolves_with_button_value_and_closes() {
        let dialogs = DialogService::new();
        let pending = dialogs.show(
            DialogRequest::new(DialogKind::Info, "Pick", "Choose one")
                .with_button(DialogButton::new("A", "a", ButtonStyle::Primary))
                .with_button(DialogButton::new("B", "b", ButtonStyle::Secondary)),
        );
        assert!(dialogs.state().is_open());

        assert!(dialogs.select(1));
        assert_eq!(pending.outcome().await, DialogOutcome::Selected("b".into()));
        assert_eq!(dialogs.state(), DialogState::Closed);
    }

    #[tokio::test]
    async fn select_out_of_range_keeps_dialog_open() {
        let dialogs = DialogService::new();
        let _pending = dialogs.show(DialogRequest::new(DialogKind::Info, "t", "m"));
        assert!(!dialogs.select(0));
        assert!(dialogs.state().is_open());
    }

    #[tokio::test]
    async fn confirm_is_true_only_for_confirm_button() {
        let dialogs = DialogService::new();

        let task = tokio::spawn({
            let dialogs = dialogs.clone();
            async move { dialogs.confirm("Delete?", "This cannot be undone").await }
        });
        let request = wait_open(&dialogs).await;
        assert_eq!(request.kind, DialogKind::Question);
        let confirm = request
            .buttons
            .iter()
            .position(|b| b.label == "Confirm")
            .unwrap();
        dialogs.select(confirm);
        assert!(task.await.unwrap());

        let task = tokio::spawn({
            let dialogs = dialogs.clone();
            async move { dialogs.confirm("Delete?", "Again").await }
        });
        let request = wait_open(&dialogs).await;
        let cancel = request
            .buttons
            .iter()
            .position(|b| b.label == "Cancel")
            .unwrap();
        dialogs.select(cancel);
        assert!(!task.await.unwrap());
    }

    #[tokio::test]
    async fn overlay_click_rejects_confirm() {
        let dialogs = DialogService::new();
        let task = tokio::spawn({
            let dialogs = dialogs.clone();
            async move { dialogs.confirm("Leave test?", "Progress is kept").await }
        });
        wait_open(&dialogs).await;
        dialogs.dismiss();
        assert!(!task.await.unwrap());
        assert_eq!(dialogs.state(), DialogState::Closed);
    }

    #[tokio::test]
    async fn second_show_replaces_content_and_dismisses_first() {
        let dialogs = DialogService::new();
        let first = dialogs.show(DialogRequest::new(DialogKind::Info, "First", "one"));
        let second = dialogs.show(
            DialogRequest::new(DialogKind::Error, "Second", "two")
                .with_button(DialogButton::new("OK", "ok", ButtonStyle::Primary)),
        );

        assert_eq!(first.outcome().await, DialogOutcome::Dismissed);
        match dialogs.state() {
            DialogState::Open(request) => assert_eq!(request.title, "Second"),
            DialogState::Closed => panic!("dialog should stay open"),
        }
        dialogs.select(0);
        assert_eq!(second.outcome().await, DialogOutcome::Selected("ok".into()));
    }

    #[tokio::test]
    async fn alert_has_single_ok_button() {
        let dialogs = DialogService::new();
        let task = tokio::spawn({
            let dialogs = dialogs.clone();
            async move { dialogs.alert(DialogKind::Error, "Login failed", "Bad password").await }
        });
        let request = wait_open(&dialogs).await;
        assert_eq!(request.buttons.len(), 1);
        assert_eq!(request.buttons[0].label, "OK");
        assert_eq!(request.message, "Bad password");
        dialogs.select(0);
        task.await.unwrap();
    }
}
