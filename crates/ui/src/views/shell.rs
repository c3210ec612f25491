use dioxus::prelude::*;
use services::ApiError;
use tracing::warn;
use virtuatest_core::model::{Credentials, SessionId};

use crate::context::AppContext;
use crate::views::{
    AdminView, DashboardView, DialogHost, HistoryView, LoginView, RegisterView, ResultView,
    TestView, ViewError,
};
use crate::vm::{DialogKind, DialogState, RoutePhase, ViewId, guard};

/// Reactive mirrors of the router and dialog plus state shared by views.
#[derive(Clone, Copy, PartialEq)]
pub struct ShellState {
    pub phase: Signal<RoutePhase>,
    pub dialog: Signal<DialogState>,
    pub user: Signal<Option<Credentials>>,
    /// Session the test and result views work on.
    pub focus: Signal<Option<SessionId>>,
}

impl ShellState {
    /// True while `view` is shown or being navigated to.
    #[must_use]
    pub fn is_target(self, view: ViewId) -> bool {
        self.phase.read().target() == view
    }

    pub fn set_user(mut self, credentials: Option<Credentials>) {
        self.user.set(credentials);
    }

    pub fn set_focus(mut self, session_id: Option<SessionId>) {
        self.focus.set(session_id);
    }

    /// Navigate after applying the login check.
    pub async fn navigate(self, ctx: &AppContext, target: ViewId) {
        let target = guard(target, self.user.peek().as_ref());
        ctx.router().navigate(target).await;
    }

    /// Fire-and-forget `navigate` for click handlers.
    pub fn go(self, ctx: &AppContext, target: ViewId) {
        let ctx = ctx.clone();
        spawn(async move {
            self.navigate(&ctx, target).await;
        });
    }

    /// Forget the signed-in user and show the login view. Local storage is
    /// left to the caller.
    pub async fn leave_to_login(self, ctx: &AppContext) {
        self.set_user(None);
        self.set_focus(None);
        self.navigate(ctx, ViewId::Login).await;
    }

    /// Drop credentials and the cached session, then show the login view.
    pub async fn sign_out(self, ctx: &AppContext) {
        ctx.clear_local_session().await;
        self.leave_to_login(ctx).await;
    }
}

/// Create the shell state and provide it to everything rendered below.
pub fn use_shell_provider() -> ShellState {
    let ctx = use_context::<AppContext>();
    let router = ctx.router();
    let dialogs = ctx.dialogs();
    let phase = use_signal(|| router.phase());
    let dialog = use_signal(|| dialogs.state());
    let user = use_signal(|| None::<Credentials>);
    let focus = use_signal(|| None::<SessionId>);
    use_context_provider(|| ShellState {
        phase,
        dialog,
        user,
        focus,
    })
}

/// Sign out once a view load is rejected for a bad token.
pub fn use_sign_out_on_rejection<T: 'static>(resource: Resource<Result<T, ViewError>>) {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    use_effect(move || {
        let message = match &*resource.value().read() {
            Some(Err(ViewError::SignedOut(message))) => message.clone(),
            _ => return,
        };
        let ctx = ctx.clone();
        spawn(async move {
            shell.sign_out(&ctx).await;
            ctx.dialogs()
                .alert(DialogKind::Warning, "Signed out", message)
                .await;
        });
    });
}

/// Notify the backend, clear local state and return to the login view.
pub async fn log_out(ctx: &AppContext, shell: ShellState) {
    if let Err(err) = ctx.api().logout().await {
        warn!(error = %err, "logout did not clear local state");
    }
    shell.leave_to_login(ctx).await;
}

/// Home view for a freshly signed-in user.
#[must_use]
pub fn landing_view(credentials: &Credentials) -> ViewId {
    if credentials.user.role.is_admin() {
        ViewId::Admin
    } else {
        ViewId::Dashboard
    }
}

/// Alert the user about `err`; on a rejected token also sign out.
pub async fn report_failure(ctx: AppContext, shell: ShellState, title: &str, err: ApiError) {
    if ctx.report_error(title, &err).await {
        shell.leave_to_login(&ctx).await;
    }
}

#[component]
pub fn Shell() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let router = ctx.router();
    let dialogs = ctx.dialogs();
    let mut phase = shell.phase;
    let mut dialog = shell.dialog;

    use_future(move || {
        let router = router.clone();
        async move {
            let mut rx = router.subscribe();
            loop {
                let next = *rx.borrow_and_update();
                if *phase.peek() != next {
                    phase.set(next);
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    use_future(move || {
        let dialogs = dialogs.clone();
        async move {
            let mut rx = dialogs.subscribe();
            loop {
                let next = rx.borrow_and_update().clone();
                if *dialog.peek() != next {
                    dialog.set(next);
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    let restore_ctx = ctx.clone();
    use_future(move || {
        let ctx = restore_ctx.clone();
        async move {
            match ctx.api().current_credentials().await {
                Ok(Some(credentials)) => {
                    let target = landing_view(&credentials);
                    shell.set_user(Some(credentials));
                    shell.navigate(&ctx, target).await;
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "could not restore credentials"),
            }
        }
    });

    let current = phase();

    rsx! {
        div { class: "shell",
            section { id: "login-view", class: current.class_for(ViewId::Login), LoginView {} }
            section { id: "register-view", class: current.class_for(ViewId::Register), RegisterView {} }
            section { id: "dashboard-view", class: current.class_for(ViewId::Dashboard), DashboardView {} }
            section { id: "test-view", class: current.class_for(ViewId::Test), TestView {} }
            section { id: "result-view", class: current.class_for(ViewId::Result), ResultView {} }
            section { id: "history-view", class: current.class_for(ViewId::History), HistoryView {} }
            section { id: "admin-view", class: current.class_for(ViewId::Admin), AdminView {} }
            DialogHost {}
        }
    }
}
