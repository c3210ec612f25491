mod admin;
mod assessment;
mod auth;
mod ids;
mod user;

pub use admin::{
    AdminReport, AdminStats, AdminUser, AiGenerationSettings, ConfigUpdate, NewUser, TestConfig,
    UserUpdate,
};
pub use assessment::{
    CefrLevel, CefrLevelParseError, Evaluation, ListeningContent, ModuleName,
    ModuleNameParseError, ModuleProgress, ModuleResult, ModuleScore, ModuleStart,
    ModuleStartRequest, ModuleSubmission, Question, ReadingContent, SessionDetail,
    SessionSummary, SubmissionAnswers, TestProgress, TestResult, TestSession, TestSessionError, TopicContent,
};
pub use auth::{
    ErrorBody, LoginResponse, MessageResponse, RegisterDraft, RegisterError, RegisterRequest,
    RegisterResponse,
};
pub use ids::{SessionId, UserId};
pub use user::{AccessToken, AccountStatus, Credentials, Role, UserProfile};
