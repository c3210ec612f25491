use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{AccountStatus, CefrLevel, ModuleName, Role, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_admins: u64,
    pub active_users: u64,
    pub ai_status: String,
}

/// Row of `GET /admin/users`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdminUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    pub account_status: AccountStatus,
}

/// Body of `POST /admin/users`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
}

/// Body of `PUT /admin/users/{id}`; absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_status: Option<AccountStatus>,
}

impl UserUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.role.is_none() && self.account_status.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AiGenerationSettings {
    #[serde(default)]
    pub difficulty: CefrLevel,
}

/// Module time limits (seconds) and generation difficulty.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestConfig {
    pub reading_time_limit: u32,
    pub listening_time_limit: u32,
    pub writing_time_limit: u32,
    pub speaking_time_limit: u32,
    #[serde(default = "default_generation")]
    pub ai_generation_settings: AiGenerationSettings,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            reading_time_limit: 1200,
            listening_time_limit: 840,
            writing_time_limit: 2400,
            speaking_time_limit: 180,
            ai_generation_settings: default_generation(),
        }
    }
}

impl TestConfig {
    /// Time limit in seconds for one module.
    #[must_use]
    pub fn time_limit(&self, module: ModuleName) -> u32 {
        match module {
            ModuleName::Reading => self.reading_time_limit,
            ModuleName::Listening => self.listening_time_limit,
            ModuleName::Writing => self.writing_time_limit,
            ModuleName::Speaking => self.speaking_time_limit,
        }
    }

    #[must_use]
    pub fn to_update(&self) -> ConfigUpdate {
        ConfigUpdate {
            reading_time_limit: self.reading_time_limit,
            listening_time_limit: self.listening_time_limit,
            writing_time_limit: self.writing_time_limit,
            speaking_time_limit: self.speaking_time_limit,
            difficulty: self.ai_generation_settings.difficulty,
        }
    }
}

/// Body of `PUT /admin/config`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigUpdate {
    pub reading_time_limit: u32,
    pub listening_time_limit: u32,
    pub writing_time_limit: u32,
    pub speaking_time_limit: u32,
    pub difficulty: CefrLevel,
}

/// Entry of `GET /admin/reports`. The shape is owned by the backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AdminReport(pub Map<String, Value>);

impl AdminReport {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        ["title", "name", "type"]
            .into_iter()
            .find_map(|key| self.0.get(key).and_then(Value::as_str))
    }
}

fn default_generation() -> AiGenerationSettings {
    AiGenerationSettings {
        difficulty: CefrLevel::B1,
    }
}
