//! Flat record shapes produced by tree-to-flat normalization.
//!
//! Each record carries an explicit `parent_qid` foreign key in place of the
//! implicit nesting of the source document, so downstream row-oriented
//! processing can join the relations without walking a tree.

use serde::{Deserialize, Serialize};

/// Scalar core of one root question, with every collection field stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionRecord {
    pub qid: String,
    pub parent_qid: String,
    pub sid: String,
    pub gid: String,
    #[serde(rename = "type")]
    pub type_code: String,
    pub title: String,
    pub preg: String,
    pub other: String,
    pub mandatory: String,
    pub encrypted: String,
    pub question_order: String,
    pub scale_id: String,
    pub same_default: String,
    pub relevance: String,
    pub question_theme_name: String,
    pub modulename: String,
    pub same_script: String,
    pub defaultvalue: String,
    pub question_text: String,
}

/// One subquestion row. The map key of the source document becomes `qid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubquestionRecord {
    pub qid: String,
    pub parent_qid: String,
    pub title: String,
    pub question: String,
    pub scale_id: String,
}

/// One answer option row. The map key of the source document becomes
/// `code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerOptionRecord {
    pub code: String,
    pub parent_qid: String,
    pub answer: String,
    pub assessment_value: String,
    pub scale_id: String,
    pub order: String,
}

/// One extension attribute row (generic or language-localized).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeRecord {
    pub name: String,
    pub value: String,
    pub parent_qid: String,
}
