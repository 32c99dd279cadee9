//! Target-schema descriptor: section field lists, defaults, language.
//!
//! Field order in these tables is the wire contract. Reordering any of them
//! changes the emitted documents and breaks the external importer.

/// `questions` section fields.
pub const QUESTION_FIELDS: [&str; 17] = [
    "qid",
    "parent_qid",
    "sid",
    "gid",
    "type",
    "title",
    "preg",
    "other",
    "mandatory",
    "encrypted",
    "question_order",
    "scale_id",
    "same_default",
    "relevance",
    "question_theme_name",
    "modulename",
    "same_script",
];

/// `subquestions` section fields: the question fields plus the localized
/// row tail.
pub const SUBQUESTION_FIELDS: [&str; 22] = [
    "qid",
    "parent_qid",
    "sid",
    "gid",
    "type",
    "title",
    "preg",
    "other",
    "mandatory",
    "encrypted",
    "question_order",
    "scale_id",
    "same_default",
    "relevance",
    "question_theme_name",
    "modulename",
    "same_script",
    "id",
    "question",
    "help",
    "script",
    "language",
];

/// `question_l10ns` section fields.
pub const L10N_FIELDS: [&str; 6] = ["id", "qid", "question", "help", "script", "language"];

/// `question_attributes` section fields.
pub const ATTRIBUTE_FIELDS: [&str; 4] = ["qid", "attribute", "value", "language"];

/// `answers` section fields.
pub const ANSWER_FIELDS: [&str; 7] = [
    "qid",
    "code",
    "answer",
    "sortorder",
    "assessment_value",
    "scale_id",
    "language",
];

/// Extension attributes every emitted question carries unless the entity
/// supplies its own value.
pub const DEFAULT_ATTRIBUTES: [(&str, &str); 10] = [
    ("hidden", "0"),
    ("page_break", "0"),
    ("random_order", "0"),
    ("array_filter", ""),
    ("array_filter_exclude", ""),
    ("exclude_all_others", ""),
    ("hide_tip", "0"),
    ("time_limit", ""),
    ("time_limit_action", "1"),
    ("save_as_default", "N"),
];

/// Attribute names whose rows carry the document language instead of an
/// empty language marker.
pub const LOCALIZED_ATTRIBUTE_NAMES: [&str; 4] =
    ["prefix", "suffix", "em_validation_q_tip", "em_validation_sq_tip"];

/// Version and language of the emitted wire documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireSchema {
    /// `DBVersion` header value the importer validates against.
    pub db_version: String,
    /// Language code stamped on localized rows.
    pub language: String,
}

impl WireSchema {
    /// The schema generation current LimeSurvey 6 installations accept.
    pub fn v6(language: &str) -> Self {
        Self {
            db_version: "623".to_string(),
            language: language.to_string(),
        }
    }
}

impl Default for WireSchema {
    fn default() -> Self {
        Self::v6("en")
    }
}
