use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{SessionId, UserId};

// ─── Modules & levels ──────────────────────────────────────────────────────────

/// One of the four skill tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleName {
    Reading,
    Listening,
    Speaking,
    Writing,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown module: {0}")]
pub struct ModuleNameParseError(pub String);

impl ModuleName {
    /// Canonical order in which a test walks through its modules.
    pub const ALL: [ModuleName; 4] = [
        ModuleName::Reading,
        ModuleName::Listening,
        ModuleName::Speaking,
        ModuleName::Writing,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleName::Reading => "reading",
            ModuleName::Listening => "listening",
            ModuleName::Speaking => "speaking",
            ModuleName::Writing => "writing",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ModuleName::Reading => "Reading",
            ModuleName::Listening => "Listening",
            ModuleName::Speaking => "Speaking",
            ModuleName::Writing => "Writing",
        }
    }

    /// Multiple-choice modules are scored against answer keys; the others
    /// are free responses evaluated by the backend.
    #[must_use]
    pub fn is_objective(self) -> bool {
        matches!(self, ModuleName::Reading | ModuleName::Listening)
    }

    /// First module in canonical order that is not in `completed`.
    #[must_use]
    pub fn next_after(completed: &[ModuleName]) -> Option<ModuleName> {
        Self::ALL
            .into_iter()
            .find(|module| !completed.contains(module))
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleName {
    type Err = ModuleNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reading" => Ok(ModuleName::Reading),
            "listening" => Ok(ModuleName::Listening),
            "speaking" => Ok(ModuleName::Speaking),
            "writing" => Ok(ModuleName::Writing),
            _ => Err(ModuleNameParseError(s.to_owned())),
        }
    }
}

/// Common European Framework of Reference proficiency tier.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CefrLevel {
    A1,
    A2,
    #[default]
    B1,
    B2,
    C1,
    C2,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown CEFR level: {0}")]
pub struct CefrLevelParseError(pub String);

impl CefrLevel {
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CefrLevel {
    type Err = CefrLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == upper)
            .ok_or_else(|| CefrLevelParseError(s.to_owned()))
    }
}

// ─── Test session ──────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestSessionError {
    #[error("test session payload has no numeric `session_id` or `id`")]
    MissingId,
}

/// Session payload returned by `POST /test/start`.
///
/// The client treats it as opaque: the raw object is kept verbatim and only
/// the id is extracted. Backends answer with either `session_id` or `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TestSession {
    session_id: SessionId,
    raw: Map<String, Value>,
}

impl TestSession {
    /// Wrap a raw server object.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::MissingId` if neither `session_id` nor `id`
    /// holds an unsigned integer.
    pub fn from_raw(raw: Map<String, Value>) -> Result<Self, TestSessionError> {
        let session_id = raw
            .get("session_id")
            .or_else(|| raw.get("id"))
            .and_then(Value::as_u64)
            .map(SessionId::new)
            .ok_or(TestSessionError::MissingId)?;
        Ok(Self { session_id, raw })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.raw.get(field)
    }

    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.raw
            .get("is_completed")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn completed_modules(&self) -> Vec<ModuleName> {
        self.module_list("completed_modules")
    }

    #[must_use]
    pub fn remaining_modules(&self) -> Vec<ModuleName> {
        self.module_list("remaining_modules")
    }

    /// Module the student should take next, derived from what the server
    /// reported as completed.
    #[must_use]
    pub fn next_module(&self) -> Option<ModuleName> {
        if self.is_completed() {
            return None;
        }
        ModuleName::next_after(&self.completed_modules())
    }

    fn module_list(&self, field: &str) -> Vec<ModuleName> {
        self.raw
            .get(field)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|name| name.parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TryFrom<Map<String, Value>> for TestSession {
    type Error = TestSessionError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<TestSession> for Map<String, Value> {
    fn from(session: TestSession) -> Self {
        session.raw
    }
}

/// One row of `GET /test/history`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub student_id: UserId,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub overall_cefr_level: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub completed_modules: Vec<ModuleName>,
    #[serde(default)]
    pub remaining_modules: Vec<ModuleName>,
}

/// `GET /test/session/{id}`: a summary plus per-module scores.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    #[serde(default)]
    pub module_scores: Vec<ModuleScore>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ModuleScore {
    pub module_name: ModuleName,
    pub score: f64,
    #[serde(default)]
    pub cefr_level: Option<String>,
    #[serde(with = "timestamp")]
    pub test_date: DateTime<Utc>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
}

// ─── Module content ────────────────────────────────────────────────────────────

/// JSON body of `POST /test/module/start`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStartRequest {
    pub session_id: SessionId,
    pub module_name: ModuleName,
    pub cefr_level: CefrLevel,
}

/// Generated content for a started module.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ModuleStart {
    pub session_id: SessionId,
    pub module_name: ModuleName,
    #[serde(default)]
    pub cefr_level: CefrLevel,
    #[serde(default)]
    pub content: Value,
}

impl ModuleStart {
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the content is not a reading passage.
    pub fn reading_content(&self) -> Result<ReadingContent, serde_json::Error> {
        ReadingContent::deserialize(&self.content)
    }

    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the content is not a listening script.
    pub fn listening_content(&self) -> Result<ListeningContent, serde_json::Error> {
        ListeningContent::deserialize(&self.content)
    }

    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the content carries no topic list.
    pub fn topic_content(&self) -> Result<TopicContent, serde_json::Error> {
        TopicContent::deserialize(&self.content)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub question_text: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<usize>,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadingContent {
    pub text: String,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListeningContent {
    pub script: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    pub questions: Vec<Question>,
}

/// Speaking and writing prompts.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TopicContent {
    pub topics: Vec<String>,
}

// ─── Submission & evaluation ───────────────────────────────────────────────────

/// Answer fields merged into a module submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionAnswers {
    Choices {
        user_answers: Vec<usize>,
        correct_answers: Vec<usize>,
        weights: Vec<u32>,
    },
    Response {
        topic: String,
        student_response: String,
    },
}

/// JSON body of `POST /test/module/submit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSubmission {
    pub session_id: SessionId,
    pub module_name: ModuleName,
    #[serde(flatten)]
    pub answers: SubmissionAnswers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

impl ModuleSubmission {
    /// Multiple-choice submission; answer keys and weights come from the
    /// generated questions.
    #[must_use]
    pub fn choices(
        session_id: SessionId,
        module_name: ModuleName,
        questions: &[Question],
        user_answers: Vec<usize>,
    ) -> Self {
        let correct_answers = questions
            .iter()
            .map(|q| q.correct_answer.unwrap_or_default())
            .collect();
        let weights = questions.iter().map(|q| q.weight).collect();
        Self {
            session_id,
            module_name,
            answers: SubmissionAnswers::Choices {
                user_answers,
                correct_answers,
                weights,
            },
            duration_seconds: None,
        }
    }

    #[must_use]
    pub fn response(
        session_id: SessionId,
        module_name: ModuleName,
        topic: impl Into<String>,
        student_response: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            module_name,
            answers: SubmissionAnswers::Response {
                topic: topic.into(),
                student_response: student_response.into(),
            },
            duration_seconds: None,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }
}

/// Score returned after a module submission.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Evaluation {
    pub session_id: SessionId,
    pub module_name: ModuleName,
    pub score: f64,
    pub cefr_level: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub is_test_completed: bool,
    #[serde(default)]
    pub next_module: Option<ModuleName>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub overall_cefr_level: Option<String>,
}

// ─── Progress & results ────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ModuleProgress {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub cefr: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TestProgress {
    pub session_id: SessionId,
    #[serde(default = "default_total_modules")]
    pub total_modules: u32,
    #[serde(default)]
    pub completed_modules: u32,
    #[serde(default)]
    pub progress_percent: f64,
    #[serde(default)]
    pub current_module: Option<ModuleName>,
    #[serde(default)]
    pub modules: BTreeMap<ModuleName, ModuleProgress>,
}

impl TestProgress {
    /// No module is left to take.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_module.is_none() || self.completed_modules >= self.total_modules
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ModuleResult {
    pub module_name: ModuleName,
    pub score: f64,
    pub cefr_level: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

/// Final report for a completed test.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TestResult {
    pub session_id: SessionId,
    pub student_id: UserId,
    pub overall_score: f64,
    pub overall_cefr_level: String,
    #[serde(default)]
    pub module_results: Vec<ModuleResult>,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub completion_date: DateTime<Utc>,
    #[serde(default)]
    pub total_duration_minutes: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub cefr_description: Option<String>,
}

fn default_weight() -> u32 {
    25
}

fn default_total_modules() -> u32 {
    4
}

/// Backend timestamps are usually naive UTC (`2025-01-01T10:00:00`), but an
/// explicit offset is accepted too.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(at) => serializer.serialize_some(&at.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {raw}"))
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn started_session() -> Value {
        json!({
            "id": 12,
            "student_id": 5,
            "start_date": "2025-01-01T10:00:00",
            "is_completed": false,
            "completed_modules": ["reading"],
            "remaining_modules": ["listening", "speaking", "writing"]
        })
    }

    #[test]
    fn test_session_keeps_server_fields_verbatim() {
        let raw = started_session();
        let session: TestSession = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(session.session_id(), SessionId::new(12));
        assert_eq!(serde_json::to_value(&session).unwrap(), raw);
        assert_eq!(session.completed_modules(), vec![ModuleName::Reading]);
        assert_eq!(session.next_module(), Some(ModuleName::Listening));
    }

    #[test]
    fn test_session_accepts_session_id_field() {
        let session: TestSession =
            serde_json::from_value(json!({"session_id": 4, "extra": true})).unwrap();
        assert_eq!(session.session_id().value(), 4);
        assert_eq!(session.get("extra"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_session_without_id_is_rejected() {
        let err = serde_json::from_value::<TestSession>(json!({"student_id": 1})).unwrap_err();
        assert!(err.to_string().contains("session_id"));
    }

    #[test]
    fn next_module_follows_canonical_order() {
        assert_eq!(ModuleName::next_after(&[]), Some(ModuleName::Reading));
        assert_eq!(
            ModuleName::next_after(&[ModuleName::Reading, ModuleName::Speaking]),
            Some(ModuleName::Listening)
        );
        assert_eq!(ModuleName::next_after(&ModuleName::ALL), None);
    }

    #[test]
    fn cefr_level_parses_case_insensitively() {
        assert_eq!("b2".parse::<CefrLevel>().unwrap(), CefrLevel::B2);
        assert!("D1".parse::<CefrLevel>().is_err());
        assert_eq!(CefrLevel::default(), CefrLevel::B1);
    }

    #[test]
    fn choice_submission_flattens_answer_fields() {
        let questions = vec![
            Question {
                question_text: "Q1".into(),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: Some(1),
                weight: 30,
            },
            Question {
                question_text: "Q2".into(),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: Some(3),
                weight: 20,
            },
        ];
        let submission = ModuleSubmission::choices(
            SessionId::new(1),
            ModuleName::Reading,
            &questions,
            vec![1, 0],
        )
        .with_duration(95);

        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({
                "session_id": 1,
                "module_name": "reading",
                "user_answers": [1, 0],
                "correct_answers": [1, 3],
                "weights": [30, 20],
                "duration_seconds": 95
            })
        );
    }

    #[test]
    fn response_submission_omits_missing_duration() {
        let submission =
            ModuleSubmission::response(SessionId::new(2), ModuleName::Writing, "Travel", "I think");
        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({
                "session_id": 2,
                "module_name": "writing",
                "topic": "Travel",
                "student_response": "I think"
            })
        );
    }

    #[test]
    fn progress_parses_module_map() {
        let progress: TestProgress = serde_json::from_value(json!({
            "session_id": 1,
            "total_modules": 4,
            "completed_modules": 2,
            "progress_percent": 50.0,
            "current_module": "speaking",
            "modules": {
                "reading": {"completed": true, "score": 75.0, "cefr": "B2"},
                "listening": {"completed": true, "score": 80.0, "cefr": "B2"},
                "speaking": {"completed": false, "score": null, "cefr": null},
                "writing": {"completed": false, "score": null, "cefr": null}
            }
        }))
        .unwrap();
        assert_eq!(progress.current_module, Some(ModuleName::Speaking));
        assert!(progress.modules[&ModuleName::Reading].completed);
        assert_eq!(progress.modules[&ModuleName::Writing].score, None);
    }

    #[test]
    fn progress_without_current_module_is_finished() {
        let running: TestProgress = serde_json::from_value(json!({
            "session_id": 1,
            "completed_modules": 3,
            "current_module": "writing"
        }))
        .unwrap();
        assert!(!running.is_finished());

        let done: TestProgress = serde_json::from_value(json!({
            "session_id": 1,
            "total_modules": 4,
            "completed_modules": 4,
            "progress_percent": 100.0,
            "current_module": null
        }))
        .unwrap();
        assert!(done.is_finished());
    }

    #[test]
    fn history_row_accepts_naive_and_offset_timestamps() {
        let row: SessionSummary = serde_json::from_value(json!({
            "id": 3,
            "student_id": 1,
            "start_date": "2025-01-01T10:00:00",
            "completion_date": "2025-01-01T11:30:00Z",
            "is_completed": true,
            "overall_cefr_level": "B1",
            "overall_score": 61.5,
            "completed_modules": ["reading", "listening", "speaking", "writing"]
        }))
        .unwrap();
        assert!(row.completion_date.unwrap() > row.start_date);
        assert!(row.remaining_modules.is_empty());
    }

    #[test]
    fn module_start_exposes_typed_content() {
        let start: ModuleStart = serde_json::from_value(json!({
            "session_id": 1,
            "module_name": "listening",
            "cefr_level": "B1",
            "content": {
                "script": "Hello",
                "audio_url": "/static/audio/a.mp3",
                "questions": [
                    {"question_text": "Who?", "options": ["a", "b", "c", "d"], "correct_answer": 0}
                ]
            }
        }))
        .unwrap();
        let content = start.listening_content().unwrap();
        assert_eq!(content.questions[0].weight, 25);
        assert!(start.reading_content().is_err());
    }
}
