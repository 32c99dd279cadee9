//! Tree-to-flat normalization (boundary adapter).
//!
//! LimeSurvey's `get_question_properties` answers a nested document whose
//! collection-valued fields shift shape with upstream state: absent, an
//! explicit `null`, a sentinel string ("No available answers" and friends),
//! a map keyed by child identifier, or an already-flat list. This crate
//! resolves each field through [`CollectionValue`] exactly once at the
//! boundary and emits independent flat relations — one per entity kind —
//! with the root question's `qid` injected as an explicit foreign key.
//!
//! This is the shape-level inverse of `surveygraph-ingest-graph`, but the
//! two operate on different wire formats and share only the model crate.

use serde::Serialize;
use serde_json::Value;
use surveygraph_model::flat::{
    AnswerOptionRecord, AttributeRecord, QuestionRecord, SubquestionRecord,
};

/// Shape of one collection-valued field, resolved once. Downstream code
/// only ever sees flat record lists.
#[derive(Debug, Clone, Copy)]
pub enum CollectionValue<'a> {
    /// Missing, `null`, or a sentinel string.
    Absent,
    /// A map keyed by child identifier.
    Keyed(&'a serde_json::Map<String, Value>),
    /// An already-flat list, passed through unchanged.
    Sequence(&'a [Value]),
}

impl<'a> CollectionValue<'a> {
    pub fn classify(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Object(map)) => CollectionValue::Keyed(map),
            Some(Value::Array(items)) => CollectionValue::Sequence(items),
            // Strings here are upstream sentinels, not data.
            Some(Value::String(_)) | Some(Value::Null) | None => CollectionValue::Absent,
            Some(_) => CollectionValue::Absent,
        }
    }
}

/// Flat relations for a batch of root documents, concatenated per kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedBatch {
    pub questions: Vec<QuestionRecord>,
    pub subquestions: Vec<SubquestionRecord>,
    pub answer_options: Vec<AnswerOptionRecord>,
    pub attributes: Vec<AttributeRecord>,
    pub localized_attributes: Vec<AttributeRecord>,
    /// One entry per skipped root record.
    pub warnings: Vec<String>,
}

fn scalar(doc: &Value, key: &str) -> String {
    match doc.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn scalar_or(doc: &Value, key: &str, default: &str) -> String {
    let v = scalar(doc, key);
    if v.is_empty() {
        default.to_string()
    } else {
        v
    }
}

fn attribute_rows(field: CollectionValue<'_>, parent_qid: &str) -> Vec<AttributeRecord> {
    match field {
        CollectionValue::Keyed(map) => map
            .iter()
            .map(|(name, value)| AttributeRecord {
                name: name.clone(),
                value: match value {
                    Value::Null => String::new(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                parent_qid: parent_qid.to_string(),
            })
            .collect(),
        CollectionValue::Sequence(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        CollectionValue::Absent => Vec::new(),
    }
}

/// Normalize a batch of nested question documents into flat relations.
///
/// A root record missing its own `qid` is skipped with a recorded warning;
/// one malformed root never aborts the batch.
pub fn normalize(docs: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (index, doc) in docs.iter().enumerate() {
        let qid = scalar(doc, "qid");
        if qid.is_empty() {
            let warning = format!("root record {index} skipped: missing qid");
            tracing::warn!("{warning}");
            batch.warnings.push(warning);
            continue;
        }

        batch.questions.push(QuestionRecord {
            qid: qid.clone(),
            parent_qid: scalar(doc, "parent_qid"),
            sid: scalar(doc, "sid"),
            gid: scalar(doc, "gid"),
            type_code: scalar(doc, "type"),
            title: scalar(doc, "title"),
            preg: scalar(doc, "preg"),
            other: scalar(doc, "other"),
            mandatory: scalar(doc, "mandatory"),
            encrypted: scalar(doc, "encrypted"),
            question_order: scalar(doc, "question_order"),
            scale_id: scalar(doc, "scale_id"),
            same_default: scalar(doc, "same_default"),
            relevance: scalar(doc, "relevance"),
            question_theme_name: scalar(doc, "question_theme_name"),
            modulename: scalar(doc, "modulename"),
            same_script: scalar(doc, "same_script"),
            defaultvalue: scalar(doc, "defaultvalue"),
            question_text: scalar(doc, "question_text"),
        });

        match CollectionValue::classify(doc.get("subquestions")) {
            CollectionValue::Keyed(map) => {
                for (sub_qid, sub) in map {
                    batch.subquestions.push(SubquestionRecord {
                        qid: sub_qid.clone(),
                        parent_qid: qid.clone(),
                        title: scalar(sub, "title"),
                        question: scalar(sub, "question"),
                        scale_id: scalar_or(sub, "scale_id", "0"),
                    });
                }
            }
            CollectionValue::Sequence(items) => {
                batch.subquestions.extend(
                    items
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok()),
                );
            }
            CollectionValue::Absent => {}
        }

        match CollectionValue::classify(doc.get("answeroptions")) {
            CollectionValue::Keyed(map) => {
                for (code, answer) in map {
                    // Keyed entries that are not maps carry no usable fields.
                    if !answer.is_object() {
                        continue;
                    }
                    batch.answer_options.push(AnswerOptionRecord {
                        code: code.clone(),
                        parent_qid: qid.clone(),
                        answer: scalar(answer, "answer"),
                        assessment_value: scalar_or(answer, "assessment_value", "0"),
                        scale_id: scalar_or(answer, "scale_id", "0"),
                        order: scalar_or(answer, "order", "0"),
                    });
                }
            }
            CollectionValue::Sequence(items) => {
                batch.answer_options.extend(
                    items
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok()),
                );
            }
            CollectionValue::Absent => {}
        }

        batch.attributes.extend(attribute_rows(
            CollectionValue::classify(doc.get("attributes")),
            &qid,
        ));
        batch.localized_attributes.extend(attribute_rows(
            CollectionValue::classify(doc.get("attributes_lang")),
            &qid,
        ));
    }

    batch
}
