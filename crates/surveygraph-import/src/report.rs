//! Per-run outcome accounting.

use serde::Serialize;
use std::fmt;

/// The pipeline stage a question failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStage {
    Group,
    Fetch,
    Serialize,
    Import,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Group => "group",
            ImportStage::Fetch => "fetch",
            ImportStage::Serialize => "serialize",
            ImportStage::Import => "import",
        };
        f.write_str(name)
    }
}

/// One recorded failure, labeled with the entity's human-readable title so
/// a caller can retry selectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub label: String,
    pub stage: ImportStage,
    pub message: String,
}

/// The complete outcome of one survey import run. Always complete —
/// possibly all-failed — rather than a partial crash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub survey_id: String,
    pub groups_created: usize,
    pub questions_attempted: usize,
    pub questions_imported: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn new(survey_id: String) -> Self {
        Self {
            survey_id,
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self, label: &str, stage: ImportStage, message: String) {
        tracing::warn!(label, %stage, %message, "import failure");
        self.failures.push(ImportFailure {
            label: label.to_string(),
            stage,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_display_lowercase() {
        assert_eq!(ImportStage::Fetch.to_string(), "fetch");
        assert_eq!(ImportStage::Group.to_string(), "group");
    }

    #[test]
    fn report_serializes_with_lowercase_stage() {
        let mut report = ImportReport::new("900001".into());
        report.record_failure("Q2", ImportStage::Fetch, "no data".into());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""stage":"fetch""#));
    }
}
