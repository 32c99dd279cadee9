//! Integration tests for the complete surveygraph pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - Fact rows → reconstruction → serialization → wire XML
//! - Nested JSON → normalization → flat relations
//! - Orchestration against an in-memory importer
//!
//! Run with: cargo test --test integration_tests

use std::collections::HashMap;

use surveygraph_export_lsq::{LsqSerializer, WireDocument, WireSchema};
use surveygraph_import::{
    import_survey, GroupPlan, QuestionPlan, QuestionSource, SurveyImporter, SurveyPlan,
};
use surveygraph_ingest_graph::{reconstruct_question, FactRow};
use surveygraph_model::{Error, Group, QuestionDocument};

// ============================================================================
// Fixtures
// ============================================================================

fn fact_rows() -> Vec<FactRow> {
    let scalar = FactRow {
        qid: Some("446".into()),
        sid: Some("694511".into()),
        gid: Some("12".into()),
        type_code: Some("F".into()),
        title: Some("satisfaction".into()),
        question_text: Some("How satisfied are you?".into()),
        ..Default::default()
    };

    vec![
        FactRow {
            attr_name: Some("mandatory".into()),
            attr_value: Some("1".into()),
            ..scalar.clone()
        },
        FactRow {
            sub_qid: Some("901".into()),
            sub_title: Some("row_one".into()),
            sub_order: Some("2".into()),
            answer_uri: Some("urn:a1".into()),
            answer_code: Some("A1".into()),
            answer_text: Some("Agree".into()),
            answer_sort_order: Some("1".into()),
            ..scalar.clone()
        },
        FactRow {
            sub_qid: Some("901".into()),
            sub_title: Some("row_one".into()),
            sub_order: Some("2".into()),
            answer_uri: Some("urn:a2".into()),
            answer_code: Some("A2".into()),
            answer_text: Some("Disagree".into()),
            answer_sort_order: Some("2".into()),
            ..scalar.clone()
        },
        FactRow {
            sub_qid: Some("902".into()),
            sub_title: Some("row_two".into()),
            sub_order: Some("1".into()),
            ..scalar
        },
    ]
}

struct MemoryImporter {
    next_id: i64,
    imported_xml: Vec<String>,
}

impl MemoryImporter {
    fn new() -> Self {
        Self {
            next_id: 0,
            imported_xml: Vec::new(),
        }
    }
}

impl SurveyImporter for MemoryImporter {
    fn create_survey(&mut self, _title: &str, _language: &str) -> Result<i64, Error> {
        self.next_id += 1;
        Ok(910_000 + self.next_id)
    }

    fn create_group(
        &mut self,
        _survey_id: i64,
        _title: &str,
        _description: &str,
        _order: i64,
    ) -> Result<i64, Error> {
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn import_question(
        &mut self,
        _survey_id: i64,
        _group_id: i64,
        document: &WireDocument,
        _mandatory: &str,
    ) -> Result<i64, Error> {
        self.imported_xml.push(document.to_xml().map_err(|e| {
            Error::Transport(format!("render failed: {e}"))
        })?);
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn activate_survey(&mut self, _survey_id: i64) -> Result<(), Error> {
        Ok(())
    }
}

struct MemorySource {
    documents: HashMap<String, QuestionDocument>,
}

impl QuestionSource for MemorySource {
    fn fetch(&self, reference: &str) -> Result<Option<QuestionDocument>, Error> {
        Ok(self.documents.get(reference).cloned())
    }
}

// ============================================================================
// Reconstruction → serialization
// ============================================================================

#[test]
fn test_fact_rows_to_wire_document() {
    let document = reconstruct_question(&fact_rows()).unwrap().unwrap();

    assert_eq!(document.qid, "446");
    assert_eq!(document.subquestions.len(), 2);
    // order 1 sorts before order 2
    assert_eq!(document.subquestions[0].variable_code, "row_two");
    assert_eq!(document.answer_options.len(), 2);
    assert_eq!(document.attributes.get("mandatory").unwrap(), "1");

    let serializer = LsqSerializer::new(WireSchema::v6("en"));
    let wire = serializer.serialize(&document).unwrap();

    let questions = wire.section("questions").unwrap();
    assert_eq!(questions.cell(0, "type"), Some("F"));
    assert_eq!(questions.cell(0, "mandatory"), Some("Y"));

    let subquestions = wire.section("subquestions").unwrap();
    assert_eq!(subquestions.rows.len(), 2);
    let answers = wire.section("answers").unwrap();
    assert_eq!(answers.rows.len(), 2);
    assert_eq!(answers.cell(0, "code"), Some("A1"));

    let xml = wire.to_xml().unwrap();
    assert!(xml.contains("<LimeSurveyDocType>Question</LimeSurveyDocType>"));
    assert!(xml.contains("<fieldname>sortorder</fieldname>"));
}

#[test]
fn test_reconstruction_is_idempotent_across_runs() {
    let rows = fact_rows();
    let a = reconstruct_question(&rows).unwrap().unwrap();
    let b = reconstruct_question(&rows).unwrap().unwrap();
    assert_eq!(a, b);

    let serializer = LsqSerializer::new(WireSchema::v6("en"));
    let xml_a = serializer.serialize(&a).unwrap().to_xml().unwrap();
    let xml_b = serializer.serialize(&b).unwrap().to_xml().unwrap();
    assert_eq!(xml_a, xml_b);
}

#[test]
fn test_wire_document_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("question_446.lsq");

    let document = reconstruct_question(&fact_rows()).unwrap().unwrap();
    let serializer = LsqSerializer::new(WireSchema::v6("en"));
    let xml = serializer.serialize(&document).unwrap().to_xml().unwrap();

    std::fs::write(&path, &xml).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), xml);
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_nested_json_to_flat_relations() {
    let docs: Vec<serde_json::Value> = serde_json::from_str(
        r#"[{
            "qid": "446",
            "sid": "694511",
            "gid": "12",
            "type": "F",
            "title": "satisfaction",
            "question_text": "How satisfied are you?",
            "subquestions": {
                "901": {"title": "SQ001", "question": "Row one"},
                "902": {"title": "SQ002", "question": "Row two"}
            },
            "answeroptions": {
                "A1": {"answer": "Agree", "order": "1"},
                "A2": {"answer": "Disagree", "order": "2"}
            },
            "attributes": {"hidden": "0"},
            "attributes_lang": "No available attributes"
        }]"#,
    )
    .unwrap();

    let batch = surveygraph_ingest_lime::normalize(&docs);
    assert_eq!(batch.questions.len(), 1);
    assert_eq!(batch.questions[0].type_code, "F");
    assert_eq!(batch.subquestions.len(), 2);
    assert_eq!(batch.answer_options.len(), 2);
    assert!(batch
        .answer_options
        .iter()
        .all(|a| a.parent_qid == "446"));
    assert_eq!(batch.attributes.len(), 1);
    assert!(batch.localized_attributes.is_empty());
    assert!(batch.warnings.is_empty());
}

// ============================================================================
// Orchestration
// ============================================================================

#[test]
fn test_import_rekeys_documents_to_created_identifiers() {
    let document = reconstruct_question(&fact_rows()).unwrap().unwrap();
    let source = MemorySource {
        documents: HashMap::from([("urn:q446".to_string(), document)]),
    };
    let mut importer = MemoryImporter::new();
    let serializer = LsqSerializer::new(WireSchema::v6("en"));

    let plan = SurveyPlan {
        title: "Household survey".into(),
        language: "en".into(),
        groups: vec![GroupPlan {
            group: Group {
                id: "12".into(),
                name: "Demographics".into(),
                description: "Who answers".into(),
                order: 1,
            },
            questions: vec![QuestionPlan {
                reference: "urn:q446".into(),
                label: "satisfaction".into(),
                document: None,
            }],
        }],
        ungrouped: Vec::new(),
    };

    let report = import_survey(&mut importer, &source, &serializer, &plan).unwrap();

    assert_eq!(report.questions_attempted, 1);
    assert_eq!(report.questions_imported, 1);
    assert!(report.failures.is_empty());

    // The emitted wire document points at the target survey, not the
    // source system's identifiers.
    let xml = &importer.imported_xml[0];
    assert!(xml.contains(&format!("<sid>{}</sid>", report.survey_id)));
    assert!(!xml.contains("<sid>694511</sid>"));
}

#[test]
fn test_partial_failure_yields_a_complete_report() {
    let q1 = reconstruct_question(&fact_rows()).unwrap().unwrap();
    let mut q3 = q1.clone();
    q3.qid = "447".into();
    q3.title = "followup".into();

    let source = MemorySource {
        documents: HashMap::from([
            ("urn:q1".to_string(), q1),
            ("urn:q3".to_string(), q3),
        ]),
    };
    let mut importer = MemoryImporter::new();
    let serializer = LsqSerializer::new(WireSchema::v6("en"));

    let questions = vec![
        QuestionPlan {
            reference: "urn:q1".into(),
            label: "satisfaction".into(),
            document: None,
        },
        QuestionPlan {
            reference: "urn:q2".into(),
            label: "missing".into(),
            document: None,
        },
        QuestionPlan {
            reference: "urn:q3".into(),
            label: "followup".into(),
            document: None,
        },
    ];
    let plan = SurveyPlan {
        title: "Household survey".into(),
        language: "en".into(),
        groups: vec![GroupPlan {
            group: Group {
                id: "12".into(),
                name: "Demographics".into(),
                description: String::new(),
                order: 1,
            },
            questions,
        }],
        ungrouped: Vec::new(),
    };

    let report = import_survey(&mut importer, &source, &serializer, &plan).unwrap();

    assert_eq!(report.questions_attempted, 3);
    assert_eq!(report.questions_imported, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].label, "missing");
    assert_eq!(report.failures[0].stage.to_string(), "fetch");
}

#[test]
fn test_ungrouped_questions_survive_under_fallback_group() {
    let document = reconstruct_question(&fact_rows()).unwrap().unwrap();
    let source = MemorySource {
        documents: HashMap::from([("urn:q446".to_string(), document)]),
    };
    let mut importer = MemoryImporter::new();
    let serializer = LsqSerializer::new(WireSchema::v6("en"));

    let plan = SurveyPlan {
        title: "Household survey".into(),
        language: "en".into(),
        groups: Vec::new(),
        ungrouped: vec![QuestionPlan {
            reference: "urn:q446".into(),
            label: "satisfaction".into(),
            document: None,
        }],
    };

    let report = import_survey(&mut importer, &source, &serializer, &plan).unwrap();
    assert_eq!(report.groups_created, 1);
    assert_eq!(report.questions_imported, 1);
}
