//! Explicit configuration values for the external collaborators.
//!
//! Configuration is read once at the boundary and passed by value into
//! whatever needs it; nothing in the pipeline mutates shared endpoint or
//! credential state.

use std::env;

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// LimeSurvey RemoteControl endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimeConfig {
    /// RemoteControl URL, e.g.
    /// `http://localhost:8080/index.php/admin/remotecontrol`.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Language created surveys and localized rows use.
    pub language: String,
}

impl LimeConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or(
                "LIMESURVEY_URL",
                "http://localhost:8080/index.php/admin/remotecontrol",
            ),
            username: env_or("LIMESURVEY_USERNAME", "admin"),
            password: env_or("LIMESURVEY_PASSWORD", "admin"),
            language: env_or("LIMESURVEY_LANGUAGE", "en"),
        }
    }

    /// Survey administration URL for a created survey.
    pub fn admin_url(&self, survey_id: i64) -> String {
        let base = self.url.replace("/admin/remotecontrol", "");
        format!("{base}/admin/survey/sa/view/surveyid/{survey_id}")
    }
}

/// GraphDB SPARQL endpoint and repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDbConfig {
    pub base_url: String,
    pub repository: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl GraphDbConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_or("GRAPHDB_URL", "http://localhost:7200"),
            repository: env_or("GRAPHDB_REPOSITORY", "limesurvey"),
            username: env::var("GRAPHDB_USERNAME").ok(),
            password: env::var("GRAPHDB_PASSWORD").ok(),
        }
    }

    /// Query endpoint of the configured repository.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/repositories/{}",
            self.base_url.trim_end_matches('/'),
            self.repository
        )
    }
}
