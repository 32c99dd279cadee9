//! Blocking LimeSurvey RemoteControl client.
//!
//! RemoteControl speaks a JSON-RPC-shaped protocol: POST
//! `{method, params, id}`, read `{result, error, id}`. Misconfigured
//! installations answer with an HTML login page instead of JSON, and some
//! methods report failure inside a successful envelope as
//! `{"status": "..."}` — the client normalizes all of that into
//! [`Error::Transport`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::time::Duration;

use surveygraph_export_lsq::WireDocument;
use surveygraph_model::Error;

use crate::config::LimeConfig;

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// The write-side import operations the orchestrator drives. The external
/// platform assigns every identifier; callers thread returned ids into
/// child calls.
pub trait SurveyImporter {
    fn create_survey(&mut self, title: &str, language: &str) -> Result<i64, Error>;
    fn create_group(
        &mut self,
        survey_id: i64,
        title: &str,
        description: &str,
        order: i64,
    ) -> Result<i64, Error>;
    fn import_question(
        &mut self,
        survey_id: i64,
        group_id: i64,
        document: &WireDocument,
        mandatory: &str,
    ) -> Result<i64, Error>;
    fn activate_survey(&mut self, survey_id: i64) -> Result<(), Error>;
}

/// FNV-1a 64-bit over arbitrary bytes. Used to derive the provisional
/// survey id deterministically from the title.
fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Provisional six-digit survey id passed to `add_survey`. The platform
/// replaces it on collision, so it only has to be well-formed and stable.
pub fn provisional_survey_id(title: &str) -> i64 {
    100_000 + (fnv1a64(title.as_bytes()) % 900_000) as i64
}

/// Parse the platform's several ways of answering "here is the new id".
fn id_from_result(result: &Value, context: &str) -> Result<i64, Error> {
    if let Some(n) = result.as_i64() {
        return Ok(n);
    }
    if let Some(s) = result.as_str() {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(n);
        }
    }
    if let Some(map) = result.as_object() {
        if let Some(status) = map.get("status").and_then(Value::as_str) {
            return Err(Error::Transport(format!("{context} failed: {status}")));
        }
        for key in ["newqid", "qid", "id"] {
            if let Some(inner) = map.get(key) {
                return id_from_result(inner, context);
            }
        }
    }
    Err(Error::Transport(format!(
        "unexpected {context} response shape: {result}"
    )))
}

/// Blocking RemoteControl client. Holds at most one session key; the key is
/// acquired lazily on the first call and released exactly once — explicitly
/// via [`LimeSurveyClient::release_session`], or on drop for every other
/// exit path.
pub struct LimeSurveyClient {
    config: LimeConfig,
    http: reqwest::blocking::Client,
    session_key: Option<String>,
}

impl LimeSurveyClient {
    pub fn new(config: LimeConfig) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self {
            config,
            http,
            session_key: None,
        })
    }

    pub fn config(&self) -> &LimeConfig {
        &self.config
    }

    fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        let url = &self.config.url;
        tracing::debug!(method, url = %url, "remotecontrol call");

        let payload = json!({
            "method": method,
            "params": params,
            "id": 1,
        });

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .map_err(|e| Error::Transport(format!("failed to reach limesurvey at {url}: {e}")))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if content_type.contains("text/html") {
            return Err(Error::Transport(format!(
                "limesurvey returned HTML instead of JSON; check that the \
                 RemoteControl interface is enabled and the URL is correct ({url})"
            )));
        }

        let envelope: Value = response
            .json()
            .map_err(|e| Error::Transport(format!("invalid JSON from limesurvey: {e}")))?;

        match envelope.get("error") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(Error::Transport(format!("{method} failed: {message}")));
            }
            Some(other) => {
                return Err(Error::Transport(format!("{method} failed: {other}")));
            }
        }

        Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
    }

    fn session_key(&mut self) -> Result<String, Error> {
        if let Some(key) = &self.session_key {
            return Ok(key.clone());
        }

        let result = self.call(
            "get_session_key",
            json!([self.config.username, self.config.password]),
        )?;

        // Failed logins come back inside a successful envelope.
        if let Some(status) = result.get("status").and_then(Value::as_str) {
            return Err(Error::Transport(format!("authentication failed: {status}")));
        }
        let key = match result.as_str() {
            Some(key) if !key.is_empty() && key != "null" => key.to_string(),
            _ => {
                return Err(Error::Transport(
                    "failed to authenticate with limesurvey".to_string(),
                ))
            }
        };

        self.session_key = Some(key.clone());
        Ok(key)
    }

    /// Release the session key. Idempotent; also runs on drop.
    pub fn release_session(&mut self) {
        if let Some(key) = self.session_key.take() {
            if let Err(e) = self.call("release_session_key", json!([key])) {
                tracing::warn!("failed to release session key: {e}");
            }
        }
    }

    // ------------------------------------------------------------------
    // Read operations
    // ------------------------------------------------------------------

    pub fn list_surveys(&mut self) -> Result<Value, Error> {
        let key = self.session_key()?;
        self.call("list_surveys", json!([key]))
    }

    pub fn list_questions(&mut self, survey_id: i64) -> Result<Value, Error> {
        let key = self.session_key()?;
        self.call("list_questions", json!([key, survey_id]))
    }

    /// The nested question document the normalizer consumes.
    pub fn get_question_properties(&mut self, question_id: i64) -> Result<Value, Error> {
        let key = self.session_key()?;
        self.call("get_question_properties", json!([key, question_id]))
    }
}

impl SurveyImporter for LimeSurveyClient {
    fn create_survey(&mut self, title: &str, language: &str) -> Result<i64, Error> {
        let key = self.session_key()?;
        let provisional = provisional_survey_id(title);
        let result = self.call(
            "add_survey",
            json!([key, provisional, title, language, "G"]),
        )?;
        let survey_id = id_from_result(&result, "add_survey")?;
        tracing::info!(survey_id, title, "survey created");
        Ok(survey_id)
    }

    fn create_group(
        &mut self,
        survey_id: i64,
        title: &str,
        description: &str,
        _order: i64,
    ) -> Result<i64, Error> {
        let key = self.session_key()?;
        let result = self.call("add_group", json!([key, survey_id, title, description]))?;
        let group_id = id_from_result(&result, "add_group")?;
        tracing::info!(group_id, title, "group created");
        Ok(group_id)
    }

    fn import_question(
        &mut self,
        survey_id: i64,
        group_id: i64,
        document: &WireDocument,
        mandatory: &str,
    ) -> Result<i64, Error> {
        let key = self.session_key()?;
        let xml = document
            .to_xml()
            .map_err(|e| Error::Transport(format!("wire document rendering failed: {e}")))?;
        let encoded = BASE64.encode(xml.as_bytes());

        let result = self.call(
            "import_question",
            json!([key, survey_id, group_id, encoded, "lsq", mandatory]),
        )?;
        let question_id = id_from_result(&result, "import_question")?;
        tracing::info!(question_id, survey_id, group_id, "question imported");
        Ok(question_id)
    }

    fn activate_survey(&mut self, survey_id: i64) -> Result<(), Error> {
        let key = self.session_key()?;
        self.call("activate_survey", json!([key, survey_id]))?;
        tracing::info!(survey_id, "survey activated");
        Ok(())
    }
}

impl Drop for LimeSurveyClient {
    fn drop(&mut self) {
        self.release_session();
    }
}
