use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

use virtuatest_core::model::{
    CefrLevel, Evaluation, ModuleName, ModuleStart, ModuleStartRequest, ModuleSubmission,
    SessionDetail, SessionId, SessionSummary, TestProgress, TestResult, TestSession,
};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// Open (or resume) a test session and remember it in the session cache.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the session cannot be cached.
    pub async fn start_test(&self) -> Result<TestSession, ApiError> {
        let request = self.authorized(Method::POST, "/test/start").await?;
        let session: TestSession = self.send(request, "Failed to start test").await?;

        self.session_cache().store(&session).await?;
        info!(session_id = %session.session_id(), "test session started");
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn session(&self, session_id: SessionId) -> Result<SessionDetail, ApiError> {
        let path = format!("/test/session/{session_id}");
        let request = self.authorized(Method::GET, &path).await?;
        self.send(request, "Failed to load test session").await
    }

    /// Generate content for one module. The id is sent as given; an unknown
    /// or missing session is for the backend to reject.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn start_module(
        &self,
        session_id: SessionId,
        module_name: ModuleName,
        cefr_level: CefrLevel,
    ) -> Result<ModuleStart, ApiError> {
        let body = ModuleStartRequest {
            session_id,
            module_name,
            cefr_level,
        };
        let request = self
            .authorized(Method::POST, "/test/module/start")
            .await?
            .json(&body);
        self.send(request, "Failed to start module").await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn submit_module(
        &self,
        submission: &ModuleSubmission,
    ) -> Result<Evaluation, ApiError> {
        let request = self
            .authorized(Method::POST, "/test/module/submit")
            .await?
            .json(submission);
        let evaluation: Evaluation = self.send(request, "Failed to submit module").await?;
        info!(
            session_id = %evaluation.session_id,
            module = %evaluation.module_name,
            completed = evaluation.is_test_completed,
            "module submitted"
        );
        if evaluation.is_test_completed {
            self.forget_finished_session(evaluation.session_id).await;
        }
        Ok(evaluation)
    }

    /// A completed test takes no more module calls.
    async fn forget_finished_session(&self, session_id: SessionId) {
        let cache = self.session_cache();
        match cache.load().await {
            Ok(Some(cached)) if cached.session_id() == session_id => {
                if let Err(err) = cache.clear().await {
                    warn!(error = %err, %session_id, "could not clear finished session");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "could not read session cache"),
        }
    }

    /// Upload a speaking recording for transcription and scoring.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn upload_speaking(
        &self,
        session_id: SessionId,
        topic: &str,
        audio: Vec<u8>,
        file_name: &str,
    ) -> Result<Evaluation, ApiError> {
        let part = Part::bytes(audio)
            .file_name(file_name.to_owned())
            .mime_str(audio_mime(file_name))?;
        let form = Form::new().part("audio", part);
        let session = session_id.to_string();
        let request = self
            .authorized(Method::POST, "/test/module/speaking/upload")
            .await?
            .query(&[("session_id", session.as_str()), ("topic", topic)])
            .multipart(form);
        self.send(request, "Failed to upload recording").await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn progress(&self, session_id: SessionId) -> Result<TestProgress, ApiError> {
        let path = format!("/test/progress/{session_id}");
        let request = self.authorized(Method::GET, &path).await?;
        self.send(request, "Failed to load progress").await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails (including tests that are not
    /// completed yet).
    pub async fn result(&self, session_id: SessionId) -> Result<TestResult, ApiError> {
        let path = format!("/test/result/{session_id}");
        let request = self.authorized(Method::GET, &path).await?;
        self.send(request, "Failed to load result").await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn history(&self, limit: u32) -> Result<Vec<SessionSummary>, ApiError> {
        let request = self
            .authorized(Method::GET, "/test/history")
            .await?
            .query(&[("limit", limit)]);
        self.send(request, "Failed to load history").await
    }
}

fn audio_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        _ => "audio/webm",
    }
}
