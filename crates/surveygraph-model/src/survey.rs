//! Canonical survey hierarchy types.
//!
//! A [`QuestionDocument`] is the reconstructed form of one root question:
//! scalar fields plus ordered subquestions, ordered answer options and an
//! attribute map. Attribute storage is a `BTreeMap` so that two documents
//! with the same content always iterate (and serialize) identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute names rendered into dedicated wire fields instead of the
/// generic attribute section.
pub const FIRST_CLASS_ATTRIBUTES: [&str; 4] =
    ["mandatory", "question_order", "relevance", "question_theme_name"];

/// A question group. Created once per survey target; owns zero or more
/// questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    pub order: i64,
}

/// One subquestion of a root question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subquestion {
    pub id: String,
    pub parent_question_id: String,
    pub variable_code: String,
    pub text: String,
    /// Numeric sort key. Missing or unparseable source values coerce to 0;
    /// ties keep encounter order.
    pub order: i64,
}

/// One answer option of a root question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub code: String,
    pub parent_question_id: String,
    pub text: String,
    pub sort_order: i64,
    pub assessment_value: i64,
    pub scale_id: i64,
}

/// The canonical reconstructed form of one root question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDocument {
    pub qid: String,
    pub sid: String,
    pub gid: String,
    pub type_code: String,
    /// Variable code, used as the question title in the wire document.
    pub title: String,
    pub text: String,
    pub script: String,
    /// Non-empty when the source graph marks this question as a child of
    /// another question; such questions are modeled as [`Subquestion`]s of
    /// their parent once reconstructed, never imported standalone.
    pub parent_qid: String,
    pub attributes: BTreeMap<String, String>,
    pub subquestions: Vec<Subquestion>,
    pub answer_options: Vec<AnswerOption>,
}

impl QuestionDocument {
    /// Rewrite the document's survey and group references to
    /// target-assigned identifiers. Every child row serialized afterwards
    /// carries these values instead of the source-system ones.
    pub fn retarget(&mut self, sid: &str, gid: &str) {
        self.sid = sid.to_string();
        self.gid = gid.to_string();
    }

    /// The `mandatory` flag as stored in the attribute map, or `None` when
    /// the source never set one.
    pub fn mandatory(&self) -> Option<&str> {
        self.attributes.get("mandatory").map(String::as_str)
    }
}

/// A question as it appears in group listings: enough to label it, decide
/// group membership and order it, without the full document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub uri: String,
    pub id: String,
    pub text: String,
    pub variable_code: String,
    pub type_code: String,
    pub order: i64,
    pub group_uri: String,
}

impl QuestionSummary {
    /// Human-readable label used in import reports.
    pub fn label(&self) -> &str {
        if self.variable_code.is_empty() {
            &self.id
        } else {
            &self.variable_code
        }
    }
}
