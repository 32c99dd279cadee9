//! The serializer: canonical question document → wire document.

use std::collections::BTreeMap;

use surveygraph_model::ident::{
    sanitize_code, QUESTION_CODE_PREFIX, SUBQUESTION_CODE_PREFIX,
};
use surveygraph_model::{Error, QuestionDocument, FIRST_CLASS_ATTRIBUTES};

use crate::schema::{
    WireSchema, ANSWER_FIELDS, ATTRIBUTE_FIELDS, DEFAULT_ATTRIBUTES, L10N_FIELDS,
    LOCALIZED_ATTRIBUTE_NAMES, QUESTION_FIELDS, SUBQUESTION_FIELDS,
};
use crate::wire::{WireDocument, WireSection};
use crate::ExportError;

/// Coerce a flag value into the two-valued `Y`/`N` domain. Truthy source
/// encodings map to `Y`; anything unrecognized is `N`.
fn coerce_flag(value: Option<&str>) -> &'static str {
    match value.map(str::trim) {
        Some("Y") | Some("y") | Some("1") | Some("true") => "Y",
        _ => "N",
    }
}

/// Normalize a value destined for a numeric position: parseable integers
/// pass through re-rendered, everything else becomes `default`.
fn coerce_numeric(value: Option<&str>, default: i64) -> String {
    value
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
        .to_string()
}

/// Serializes [`QuestionDocument`]s against one target schema.
#[derive(Debug, Clone, Default)]
pub struct LsqSerializer {
    schema: WireSchema,
}

impl LsqSerializer {
    pub fn new(schema: WireSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &WireSchema {
        &self.schema
    }

    /// Serialize one question document.
    ///
    /// Normalization rules, in order: variable codes are rewritten into the
    /// identifier grammar (`Q` prefix for the root, `SQ` for subquestions);
    /// the type code truncates to its first character; flags coerce to
    /// `Y`/`N`; numeric positions default instead of carrying empty values;
    /// the default extension attributes merge under the entity's attribute
    /// map with entity values winning and first-class names excluded; every
    /// child row carries the document's current (re-keyed) parent
    /// identifiers.
    pub fn serialize(&self, doc: &QuestionDocument) -> Result<WireDocument, ExportError> {
        if doc.qid.is_empty() {
            return Err(Error::IncompleteEntity {
                kind: "question",
                detail: "document carries no qid".to_string(),
            }
            .into());
        }

        let attr = |name: &str| doc.attributes.get(name).map(String::as_str);

        let type_code: String = doc.type_code.chars().take(1).collect();
        let type_code = if type_code.is_empty() {
            "T".to_string()
        } else {
            type_code
        };
        let title = sanitize_code(&doc.title, QUESTION_CODE_PREFIX, 1);

        let mut sections = Vec::new();

        // questions
        let mut questions = WireSection::new("questions", &QUESTION_FIELDS);
        questions.rows.push(vec![
            doc.qid.clone(),
            "0".to_string(),
            doc.sid.clone(),
            doc.gid.clone(),
            type_code,
            title,
            String::new(),
            coerce_flag(attr("other")).to_string(),
            coerce_flag(attr("mandatory")).to_string(),
            coerce_flag(attr("encrypted")).to_string(),
            coerce_numeric(attr("question_order"), 1),
            coerce_numeric(attr("scale_id"), 0),
            coerce_numeric(attr("same_default"), 0),
            attr("relevance").unwrap_or("1").to_string(),
            attr("question_theme_name").unwrap_or("").to_string(),
            attr("modulename").unwrap_or("").to_string(),
            coerce_numeric(attr("same_script"), 0),
        ]);
        sections.push(questions);

        // subquestions
        if !doc.subquestions.is_empty() {
            let mut subquestions = WireSection::new("subquestions", &SUBQUESTION_FIELDS);
            for (idx, sub) in doc.subquestions.iter().enumerate() {
                subquestions.rows.push(vec![
                    sub.id.clone(),
                    doc.qid.clone(),
                    doc.sid.clone(),
                    doc.gid.clone(),
                    "T".to_string(),
                    sanitize_code(&sub.variable_code, SUBQUESTION_CODE_PREFIX, idx + 1),
                    String::new(),
                    "N".to_string(),
                    "N".to_string(),
                    "N".to_string(),
                    sub.order.to_string(),
                    "0".to_string(),
                    "0".to_string(),
                    "1".to_string(),
                    String::new(),
                    String::new(),
                    "0".to_string(),
                    String::new(),
                    sub.text.clone(),
                    String::new(),
                    String::new(),
                    self.schema.language.clone(),
                ]);
            }
            sections.push(subquestions);
        }

        // question_l10ns
        let mut l10ns = WireSection::new("question_l10ns", &L10N_FIELDS);
        l10ns.rows.push(vec![
            String::new(),
            doc.qid.clone(),
            doc.text.clone(),
            String::new(),
            doc.script.clone(),
            self.schema.language.clone(),
        ]);
        sections.push(l10ns);

        // question_attributes: defaults merged under entity values, with
        // first-class names routed to their dedicated fields above.
        let mut merged: BTreeMap<String, String> = DEFAULT_ATTRIBUTES
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        for (name, value) in &doc.attributes {
            merged.insert(name.clone(), value.clone());
        }
        for excluded in FIRST_CLASS_ATTRIBUTES {
            merged.remove(excluded);
        }

        let mut attributes = WireSection::new("question_attributes", &ATTRIBUTE_FIELDS);
        for (name, value) in &merged {
            let language = if LOCALIZED_ATTRIBUTE_NAMES.contains(&name.as_str()) {
                self.schema.language.clone()
            } else {
                String::new()
            };
            attributes
                .rows
                .push(vec![doc.qid.clone(), name.clone(), value.clone(), language]);
        }
        sections.push(attributes);

        // answers
        if !doc.answer_options.is_empty() {
            let mut answers = WireSection::new("answers", &ANSWER_FIELDS);
            for option in &doc.answer_options {
                answers.rows.push(vec![
                    doc.qid.clone(),
                    option.code.clone(),
                    option.text.clone(),
                    option.sort_order.to_string(),
                    option.assessment_value.to_string(),
                    option.scale_id.to_string(),
                    self.schema.language.clone(),
                ]);
            }
            sections.push(answers);
        }

        Ok(WireDocument {
            doc_type: "Question".to_string(),
            db_version: self.schema.db_version.clone(),
            languages: vec![self.schema.language.clone()],
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use surveygraph_model::{AnswerOption, Subquestion};

    fn serializer() -> LsqSerializer {
        LsqSerializer::new(WireSchema::v6("it"))
    }

    fn base_document() -> QuestionDocument {
        QuestionDocument {
            qid: "446".into(),
            sid: "900001".into(),
            gid: "34".into(),
            type_code: "F".into(),
            title: "Satisfaction".into(),
            text: "How satisfied are you?".into(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_qid_is_rejected() {
        let doc = QuestionDocument::default();
        assert!(matches!(
            serializer().serialize(&doc),
            Err(ExportError::Model(Error::IncompleteEntity { .. }))
        ));
    }

    #[test]
    fn question_row_follows_field_order() {
        let wire = serializer().serialize(&base_document()).unwrap();
        let questions = wire.section("questions").unwrap();
        assert_eq!(
            questions.fields,
            QUESTION_FIELDS.map(String::from).to_vec()
        );
        assert_eq!(questions.rows.len(), 1);
        assert_eq!(questions.rows[0].len(), QUESTION_FIELDS.len());
        assert_eq!(questions.cell(0, "sid"), Some("900001"));
        assert_eq!(questions.cell(0, "gid"), Some("34"));
        assert_eq!(questions.cell(0, "parent_qid"), Some("0"));
    }

    #[test]
    fn type_code_truncates_to_one_character() {
        let mut doc = base_document();
        doc.type_code = "F-array".into();
        let wire = serializer().serialize(&doc).unwrap();
        assert_eq!(wire.section("questions").unwrap().cell(0, "type"), Some("F"));
    }

    #[test]
    fn empty_type_code_defaults_to_text() {
        let mut doc = base_document();
        doc.type_code.clear();
        let wire = serializer().serialize(&doc).unwrap();
        assert_eq!(wire.section("questions").unwrap().cell(0, "type"), Some("T"));
    }

    #[test]
    fn mandatory_flag_coerces_to_yn() {
        let mut doc = base_document();
        doc.attributes.insert("mandatory".into(), "1".into());
        let wire = serializer().serialize(&doc).unwrap();
        assert_eq!(
            wire.section("questions").unwrap().cell(0, "mandatory"),
            Some("Y")
        );

        let wire = serializer().serialize(&base_document()).unwrap();
        assert_eq!(
            wire.section("questions").unwrap().cell(0, "mandatory"),
            Some("N")
        );
    }

    #[test]
    fn unparseable_numeric_positions_default() {
        let mut doc = base_document();
        doc.attributes
            .insert("question_order".into(), "soon".into());
        doc.attributes.insert("scale_id".into(), "".into());
        let wire = serializer().serialize(&doc).unwrap();
        let questions = wire.section("questions").unwrap();
        assert_eq!(questions.cell(0, "question_order"), Some("1"));
        assert_eq!(questions.cell(0, "scale_id"), Some("0"));
    }

    #[test]
    fn default_attributes_inject_exactly_ten_rows() {
        let wire = serializer().serialize(&base_document()).unwrap();
        let attributes = wire.section("question_attributes").unwrap();
        assert_eq!(attributes.rows.len(), DEFAULT_ATTRIBUTES.len());
        let mut names: Vec<&str> = attributes
            .rows
            .iter()
            .map(|row| row[1].as_str())
            .collect();
        names.sort_unstable();
        let mut expected: Vec<&str> = DEFAULT_ATTRIBUTES.iter().map(|(n, _)| *n).collect();
        expected.sort_unstable();
        assert_eq!(names, expected);
    }

    #[test]
    fn entity_attributes_override_defaults_and_first_class_are_excluded() {
        let mut doc = base_document();
        doc.attributes.insert("hidden".into(), "1".into());
        doc.attributes.insert("mandatory".into(), "Y".into());
        doc.attributes.insert("relevance".into(), "0".into());
        let wire = serializer().serialize(&doc).unwrap();
        let attributes = wire.section("question_attributes").unwrap();

        let hidden = attributes
            .rows
            .iter()
            .find(|row| row[1] == "hidden")
            .unwrap();
        assert_eq!(hidden[2], "1");
        assert!(attributes.rows.iter().all(|row| row[1] != "mandatory"));
        assert!(attributes.rows.iter().all(|row| row[1] != "relevance"));
    }

    #[test]
    fn localized_attribute_rows_carry_the_language() {
        let mut doc = base_document();
        doc.attributes.insert("prefix".into(), "€".into());
        let wire = serializer().serialize(&doc).unwrap();
        let attributes = wire.section("question_attributes").unwrap();
        let prefix = attributes
            .rows
            .iter()
            .find(|row| row[1] == "prefix")
            .unwrap();
        assert_eq!(prefix[3], "it");
        let hidden = attributes
            .rows
            .iter()
            .find(|row| row[1] == "hidden")
            .unwrap();
        assert_eq!(hidden[3], "");
    }

    #[test]
    fn round_trip_shape_preserves_child_counts_and_parents() {
        let mut doc = base_document();
        doc.retarget("910000", "51");
        for i in 0..3 {
            doc.subquestions.push(Subquestion {
                id: format!("90{i}"),
                parent_question_id: doc.qid.clone(),
                variable_code: format!("SQ00{i}"),
                text: format!("Row {i}"),
                order: i,
            });
        }
        for i in 0..2 {
            doc.answer_options.push(AnswerOption {
                code: format!("A{i}"),
                parent_question_id: doc.qid.clone(),
                text: format!("Option {i}"),
                sort_order: i,
                assessment_value: 0,
                scale_id: 0,
            });
        }

        let wire = serializer().serialize(&doc).unwrap();
        let subquestions = wire.section("subquestions").unwrap();
        let answers = wire.section("answers").unwrap();
        assert_eq!(subquestions.rows.len(), 3);
        assert_eq!(answers.rows.len(), 2);
        for row in 0..3 {
            assert_eq!(subquestions.cell(row, "parent_qid"), Some("446"));
            assert_eq!(subquestions.cell(row, "sid"), Some("910000"));
            assert_eq!(subquestions.cell(row, "gid"), Some("51"));
        }
        for row in 0..2 {
            assert_eq!(answers.cell(row, "qid"), Some("446"));
        }
    }

    #[test]
    fn empty_child_sections_are_omitted() {
        let wire = serializer().serialize(&base_document()).unwrap();
        assert!(wire.section("subquestions").is_none());
        assert!(wire.section("answers").is_none());
        assert!(wire.section("question_l10ns").is_some());
    }

    #[test]
    fn generated_titles_satisfy_the_identifier_grammar() {
        let grammar = Regex::new("^[A-Za-z][A-Za-z0-9_]*$").unwrap();
        let mut doc = base_document();
        doc.title = "3. Quale età?".into();
        doc.subquestions.push(Subquestion {
            id: "901".into(),
            parent_question_id: doc.qid.clone(),
            variable_code: "1-riga".into(),
            text: String::new(),
            order: 0,
        });
        doc.subquestions.push(Subquestion {
            id: "902".into(),
            parent_question_id: doc.qid.clone(),
            variable_code: "---".into(),
            text: String::new(),
            order: 1,
        });

        let wire = serializer().serialize(&doc).unwrap();
        let title = wire.section("questions").unwrap().cell(0, "title").unwrap();
        assert!(grammar.is_match(title), "bad title: {title}");
        let subquestions = wire.section("subquestions").unwrap();
        for row in 0..subquestions.rows.len() {
            let sub_title = subquestions.cell(row, "title").unwrap();
            assert!(grammar.is_match(sub_title), "bad subquestion title: {sub_title}");
        }
    }

    #[test]
    fn serialization_is_byte_deterministic() {
        let mut doc = base_document();
        doc.attributes.insert("hidden".into(), "1".into());
        doc.attributes.insert("cssclass".into(), "wide".into());
        let a = serializer().serialize(&doc).unwrap().to_xml().unwrap();
        let b = serializer().serialize(&doc).unwrap().to_xml().unwrap();
        assert_eq!(a, b);
    }
}
