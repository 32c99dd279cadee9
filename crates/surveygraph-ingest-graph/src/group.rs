//! Reconstruction of the group → question outline from the unified
//! groups+questions result set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surveygraph_model::{Group, QuestionSummary};

/// One flat row of the unified groups+questions result set. Group fields
/// repeat for every question of the group; question fields are absent for
/// empty groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupFactRow {
    pub group_uri: Option<String>,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub group_description: Option<String>,
    pub question_uri: Option<String>,
    pub question_id: Option<String>,
    pub question_text: Option<String>,
    pub variable_code: Option<String>,
    pub question_type: Option<String>,
    pub question_order: Option<String>,
}

/// A group together with its member question summaries, in query order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTree {
    pub uri: String,
    pub group: Group,
    pub questions: Vec<QuestionSummary>,
}

fn text_or(value: &Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

/// Fold the unified result set into one [`GroupTree`] per group node.
///
/// Groups register first-seen-wins keyed by node URI and are numbered by
/// encounter order (1-based, used as the group order downstream). Question
/// rows repeat per group; each question registers once per group, also
/// keyed by URI. Rows without a group URI are dropped: there is nothing to
/// attach them to.
pub fn reconstruct_groups(rows: &[GroupFactRow]) -> Vec<GroupTree> {
    let mut trees: Vec<GroupTree> = Vec::new();
    let mut index_by_uri: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(group_uri) = row.group_uri.as_deref() else {
            continue;
        };
        if group_uri.is_empty() {
            continue;
        }

        let idx = match index_by_uri.get(group_uri) {
            Some(&idx) => idx,
            None => {
                let idx = trees.len();
                trees.push(GroupTree {
                    uri: group_uri.to_string(),
                    group: Group {
                        id: text_or(&row.group_id, ""),
                        name: text_or(&row.group_name, "Unnamed group"),
                        description: text_or(&row.group_description, ""),
                        order: (idx + 1) as i64,
                    },
                    questions: Vec::new(),
                });
                index_by_uri.insert(group_uri.to_string(), idx);
                idx
            }
        };

        let Some(question_uri) = row.question_uri.as_deref() else {
            continue;
        };
        if question_uri.is_empty() {
            continue;
        }

        let tree = &mut trees[idx];
        if tree.questions.iter().any(|q| q.uri == question_uri) {
            continue;
        }
        tree.questions.push(QuestionSummary {
            uri: question_uri.to_string(),
            id: text_or(&row.question_id, ""),
            text: text_or(&row.question_text, ""),
            variable_code: text_or(&row.variable_code, ""),
            type_code: text_or(&row.question_type, "L"),
            order: row
                .question_order
                .as_deref()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(0),
            group_uri: group_uri.to_string(),
        });
    }

    trees
}
