use std::sync::Arc;

use services::{ApiClient, ApiError};
use tracing::warn;

use crate::vm::{DialogKind, DialogService, ViewRouter};

pub trait UiApp: Send + Sync {
    fn api(&self) -> Arc<ApiClient>;
    fn dialogs(&self) -> DialogService;
    fn router(&self) -> ViewRouter;
}

#[derive(Clone)]
pub struct AppContext {
    api: Arc<ApiClient>,
    dialogs: DialogService,
    router: ViewRouter,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            api: app.api(),
            dialogs: app.dialogs(),
            router: app.router(),
        }
    }

    #[must_use]
    pub fn api(&self) -> Arc<ApiClient> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn dialogs(&self) -> DialogService {
        self.dialogs.clone()
    }

    #[must_use]
    pub fn router(&self) -> ViewRouter {
        self.router.clone()
    }

    /// Remove the stored token, profile and cached test session.
    pub async fn clear_local_session(&self) {
        if let Err(err) = self.api.credentials().clear().await {
            warn!(error = %err, "could not clear credentials");
        }
        if let Err(err) = self.api.session_cache().clear().await {
            warn!(error = %err, "could not clear session cache");
        }
    }

    /// Show a failed call to the user. A rejected token is also cleared
    /// locally; returns true in that case so the caller can leave the view.
    pub async fn report_error(&self, title: &str, err: &ApiError) -> bool {
        let signed_out = err.is_auth_failure();
        if signed_out {
            self.clear_local_session().await;
        }
        self.dialogs
            .alert(DialogKind::Error, title, err.to_string())
            .await;
        signed_out
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
