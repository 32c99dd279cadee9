//! Reconstruction of one root question from its fact rows.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use surveygraph_model::{AnswerOption, Error, QuestionDocument, Result, Subquestion};

/// One flat row of the complete-question result set.
///
/// Every field is optional except `qid`, which reconstruction enforces.
/// Field names follow the query's projection variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactRow {
    pub qid: Option<String>,
    pub sid: Option<String>,
    pub gid: Option<String>,
    #[serde(rename = "type")]
    pub type_code: Option<String>,
    pub title: Option<String>,
    pub question_text: Option<String>,
    pub script: Option<String>,
    pub attr_name: Option<String>,
    pub attr_value: Option<String>,
    pub parent_qid: Option<String>,
    pub sub_qid: Option<String>,
    pub sub_title: Option<String>,
    pub sub_question_text: Option<String>,
    pub sub_order: Option<String>,
    pub answer_uri: Option<String>,
    pub answer_code: Option<String>,
    pub answer_text: Option<String>,
    pub answer_sort_order: Option<String>,
    pub answer_assessment_value: Option<String>,
    pub answer_scale_id: Option<String>,
}

fn text_or(value: &Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

/// Numeric sort keys: missing or unparseable values coerce to 0.
fn order_or_zero(value: &Option<String>) -> i64 {
    value
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Fold a flat result set into one [`QuestionDocument`].
///
/// Scalar question fields come from the first row; by the query layer's
/// convention all rows for one question carry identical scalar values, and
/// divergent fan-out is not detected. An empty row set means the question
/// does not exist and yields `Ok(None)`; a present row set whose root
/// identifier is absent is an [`Error::IncompleteEntity`].
///
/// Child facts repeat across rows because of the cartesian join between
/// subquestion and answer-option paths, so registration is
/// first-seen-wins: subquestions are keyed by their identifier, answer
/// options by their node URI (not their code, which may repeat across
/// scales). Attribute facts upsert last-write-wins by name. A child fact
/// with an identifier but no text still registers, with empty-string
/// defaults.
pub fn reconstruct_question(rows: &[FactRow]) -> Result<Option<QuestionDocument>> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let qid = match first.qid.as_deref() {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            return Err(Error::IncompleteEntity {
                kind: "question",
                detail: "root row carries no qid".to_string(),
            })
        }
    };

    let mut doc = QuestionDocument {
        qid: qid.clone(),
        sid: text_or(&first.sid, "0"),
        gid: text_or(&first.gid, "0"),
        type_code: text_or(&first.type_code, "T"),
        title: text_or(&first.title, "Q1"),
        text: text_or(&first.question_text, ""),
        script: text_or(&first.script, ""),
        parent_qid: text_or(&first.parent_qid, "0"),
        ..Default::default()
    };

    let mut seen_subquestions: HashSet<&str> = HashSet::new();
    let mut seen_answers: HashSet<&str> = HashSet::new();

    for row in rows {
        if let Some(name) = row.attr_name.as_deref() {
            if !name.is_empty() {
                doc.attributes
                    .insert(name.to_string(), text_or(&row.attr_value, ""));
            }
        }

        if let Some(sub_qid) = row.sub_qid.as_deref() {
            if !sub_qid.is_empty() && seen_subquestions.insert(sub_qid) {
                doc.subquestions.push(Subquestion {
                    id: sub_qid.to_string(),
                    parent_question_id: qid.clone(),
                    variable_code: text_or(&row.sub_title, ""),
                    text: text_or(&row.sub_question_text, ""),
                    order: order_or_zero(&row.sub_order),
                });
            }
        }

        if let Some(answer_uri) = row.answer_uri.as_deref() {
            if !answer_uri.is_empty() && seen_answers.insert(answer_uri) {
                doc.answer_options.push(AnswerOption {
                    code: text_or(&row.answer_code, ""),
                    parent_question_id: qid.clone(),
                    text: text_or(&row.answer_text, ""),
                    sort_order: order_or_zero(&row.answer_sort_order),
                    assessment_value: order_or_zero(&row.answer_assessment_value),
                    scale_id: order_or_zero(&row.answer_scale_id),
                });
            }
        }
    }

    // Stable sorts: ties keep encounter order.
    doc.subquestions.sort_by_key(|s| s.order);
    doc.answer_options.sort_by_key(|a| a.sort_order);

    Ok(Some(doc))
}
