use virtuatest_core::model::{
    CefrLevel, Evaluation, ListeningContent, ModuleName, ModuleStart, ModuleSubmission, Question,
    ReadingContent, SessionId, TestConfig, TopicContent,
};

use crate::views::ViewError;
use crate::vm::widgets::word_count;

/// Parsed content of a started module.
#[derive(Clone, Debug, PartialEq)]
pub enum ModuleContent {
    Reading(ReadingContent),
    Listening(ListeningContent),
    /// Speaking and writing prompts.
    Topics(TopicContent),
}

/// State of the module the student is working on.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleFlowVm {
    session_id: SessionId,
    module_name: ModuleName,
    cefr_level: CefrLevel,
    content: ModuleContent,
    answers: Vec<Option<usize>>,
    topic: Option<usize>,
    response: String,
    elapsed_seconds: u32,
    time_limit_seconds: u32,
}

impl ModuleFlowVm {
    /// # Errors
    ///
    /// Returns `ViewError::InvalidContent` if the generated content does not
    /// match the module.
    pub fn new(start: ModuleStart) -> Result<Self, ViewError> {
        let content = match start.module_name {
            ModuleName::Reading => start.reading_content().map(ModuleContent::Reading),
            ModuleName::Listening => start.listening_content().map(ModuleContent::Listening),
            ModuleName::Speaking | ModuleName::Writing => {
                start.topic_content().map(ModuleContent::Topics)
            }
        }
        .map_err(|_| ViewError::InvalidContent)?;

        let question_count = match &content {
            ModuleContent::Reading(reading) => reading.questions.len(),
            ModuleContent::Listening(listening) => listening.questions.len(),
            ModuleContent::Topics(_) => 0,
        };

        Ok(Self {
            session_id: start.session_id,
            module_name: start.module_name,
            cefr_level: start.cefr_level,
            content,
            answers: vec![None; question_count],
            topic: None,
            response: String::new(),
            elapsed_seconds: 0,
            time_limit_seconds: TestConfig::default().time_limit(start.module_name),
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn module_name(&self) -> ModuleName {
        self.module_name
    }

    #[must_use]
    pub fn cefr_level(&self) -> CefrLevel {
        self.cefr_level
    }

    #[must_use]
    pub fn content(&self) -> &ModuleContent {
        &self.content
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        match &self.content {
            ModuleContent::Reading(reading) => &reading.questions,
            ModuleContent::Listening(listening) => &listening.questions,
            ModuleContent::Topics(_) => &[],
        }
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        match &self.content {
            ModuleContent::Topics(topics) => &topics.topics,
            _ => &[],
        }
    }

    /// Record the chosen option. Out-of-range picks are ignored.
    pub fn select_answer(&mut self, question: usize, option: usize) -> bool {
        let in_range = self
            .questions()
            .get(question)
            .is_some_and(|q| option < q.options.len());
        if in_range {
            self.answers[question] = Some(option);
        }
        in_range
    }

    #[must_use]
    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|answer| answer.is_some()).count()
    }

    pub fn choose_topic(&mut self, index: usize) -> bool {
        if index < self.topics().len() {
            self.topic = Some(index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic
            .and_then(|index| self.topics().get(index))
            .map(String::as_str)
    }

    pub fn set_response(&mut self, text: impl Into<String>) {
        self.response = text.into();
    }

    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    #[must_use]
    pub fn response_words(&self) -> usize {
        word_count(&self.response)
    }

    pub fn tick(&mut self) {
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.time_limit_seconds.saturating_sub(self.elapsed_seconds)
    }

    #[must_use]
    pub fn is_out_of_time(&self) -> bool {
        self.remaining_seconds() == 0
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        if self.module_name.is_objective() {
            !self.answers.is_empty() && self.answers.iter().all(Option::is_some)
        } else {
            self.topic().is_some() && !self.response.trim().is_empty()
        }
    }

    /// Request body for the current answers, or `None` while incomplete.
    #[must_use]
    pub fn submission(&self) -> Option<ModuleSubmission> {
        if !self.can_submit() {
            return None;
        }
        let submission = if self.module_name.is_objective() {
            let user_answers = self.answers.iter().flatten().copied().collect();
            ModuleSubmission::choices(
                self.session_id,
                self.module_name,
                self.questions(),
                user_answers,
            )
        } else {
            ModuleSubmission::response(
                self.session_id,
                self.module_name,
                self.topic().unwrap_or_default(),
                self.response.trim(),
            )
        };
        Some(submission.with_duration(self.elapsed_seconds))
    }
}

/// Module to start after `evaluation`, or `None` once the test is complete.
#[must_use]
pub fn next_module(evaluation: &Evaluation, completed: &[ModuleName]) -> Option<ModuleName> {
    if evaluation.is_test_completed {
        return None;
    }
    evaluation.next_module.or_else(|| {
        let mut done = completed.to_vec();
        done.push(evaluation.module_name);
        ModuleName::next_after(&done)
    })
}

/// `mm:ss` countdown label.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
