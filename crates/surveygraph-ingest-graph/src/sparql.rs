//! SPARQL SELECT result parsing and the canned queries the pipeline runs.
//!
//! The query layer itself (endpoint, auth, transport) lives in
//! `surveygraph-import`; this module only knows the
//! `application/sparql-results+json` shape and how to project bindings into
//! fact rows.

use serde::Deserialize;
use std::collections::HashMap;

use crate::group::GroupFactRow;
use crate::question::FactRow;

/// Ontology namespace of the survey knowledge graph.
pub const ONTOLOGY_PREFIX: &str = "https://w3id.org/fossr/ontology/limesurvey/";

/// `application/sparql-results+json` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: SparqlHead,
    #[serde(default)]
    pub results: SparqlResultSet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlResultSet {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// One result row: projection variable → term.
pub type Binding = HashMap<String, SparqlTerm>;

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlTerm {
    pub value: String,
    #[serde(rename = "type", default)]
    pub term_type: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
}

fn var(binding: &Binding, name: &str) -> Option<String> {
    binding.get(name).map(|t| t.value.clone())
}

impl FactRow {
    /// Project one binding of the complete-question query into a fact row.
    pub fn from_binding(binding: &Binding) -> Self {
        Self {
            qid: var(binding, "qid"),
            sid: var(binding, "sid"),
            gid: var(binding, "gid"),
            type_code: var(binding, "type"),
            title: var(binding, "title"),
            question_text: var(binding, "questionText"),
            script: var(binding, "script"),
            attr_name: var(binding, "attrName"),
            attr_value: var(binding, "attrValue"),
            parent_qid: var(binding, "parentQid"),
            sub_qid: var(binding, "subQid"),
            sub_title: var(binding, "subTitle"),
            sub_question_text: var(binding, "subQuestionText"),
            sub_order: var(binding, "subOrder"),
            answer_uri: var(binding, "answer"),
            answer_code: var(binding, "answerCode"),
            answer_text: var(binding, "answerText"),
            answer_sort_order: var(binding, "answerSortOrder"),
            answer_assessment_value: var(binding, "answerAssessmentValue"),
            answer_scale_id: var(binding, "answerScaleId"),
        }
    }
}

impl GroupFactRow {
    /// Project one binding of the unified groups query into a fact row.
    pub fn from_binding(binding: &Binding) -> Self {
        Self {
            group_uri: var(binding, "group"),
            group_id: var(binding, "groupId"),
            group_name: var(binding, "groupName"),
            group_description: var(binding, "groupDescription"),
            question_uri: var(binding, "question"),
            question_id: var(binding, "questionId"),
            question_text: var(binding, "questionText"),
            variable_code: var(binding, "variableCod"),
            question_type: var(binding, "questionType"),
            question_order: var(binding, "questionOrder"),
        }
    }
}

/// The complete-question query: one row per logical join path, scalar
/// fields repeated on every row, ordered so that child rows arrive in sort
/// order.
pub fn complete_question_query(question_uri: &str) -> String {
    format!(
        r#"PREFIX ls: <{ONTOLOGY_PREFIX}>

SELECT DISTINCT
  ?qid ?sid ?gid ?type ?title ?questionText ?script
  ?attrName ?attrValue
  ?parentQid
  ?subQid ?subTitle ?subQuestionText ?subOrder
  ?answer ?answerCode ?answerText ?answerSortOrder ?answerAssessmentValue ?answerScaleId
WHERE {{
  <{question_uri}> a ls:Question .
  <{question_uri}> ls:hasId ?idNode .
  ?idNode ls:id ?qid .

  OPTIONAL {{
    <{question_uri}> ls:hasSurveyId ?sidNode .
    ?sidNode ls:id ?sid .
  }}

  OPTIONAL {{
    <{question_uri}> ls:hasGroup ?groupNode .
    ?groupNode ls:hasId ?gidNode .
    ?gidNode ls:id ?gid .
  }}

  OPTIONAL {{
    <{question_uri}> ls:hasType ?typeNode .
    ?typeNode ls:code ?type .
  }}

  OPTIONAL {{
    <{question_uri}> ls:hasVariable ?varNode .
    ?varNode ls:variableCod ?title .
  }}

  OPTIONAL {{
    <{question_uri}> ls:hasContent ?contentNode .
    ?contentNode ls:text ?questionText .
  }}

  OPTIONAL {{
    <{question_uri}> ls:hasContent ?scriptNode .
    ?scriptNode ls:script ?script .
  }}

  OPTIONAL {{
    <{question_uri}> ls:hasComponentAttribute ?attr .
    ?attr ls:componentName ?attrName .
    ?attr ls:componentValue ?attrValue .
  }}

  OPTIONAL {{
    <{question_uri}> ls:hasParentQuestion ?parentQuestion .
    ?parentQuestion ls:hasId ?parentIdNode .
    ?parentIdNode ls:id ?parentQid .
  }}

  OPTIONAL {{
    ?subQuestion ls:hasParentQuestion <{question_uri}> .
    ?subQuestion ls:hasId ?subIdNode .
    ?subIdNode ls:id ?subQid .

    OPTIONAL {{
      ?subQuestion ls:hasVariable ?subVarNode .
      ?subVarNode ls:variableCod ?subTitle .
    }}

    OPTIONAL {{
      ?subQuestion ls:hasContent ?subContentNode .
      ?subContentNode ls:text ?subQuestionText .
    }}

    OPTIONAL {{
      ?subQuestion ls:hasComponentAttribute ?subOrderAttr .
      ?subOrderAttr ls:componentName "question_order" .
      ?subOrderAttr ls:componentValue ?subOrder .
    }}
  }}

  OPTIONAL {{
    ?answer a ls:AnswerOption .
    <{question_uri}> ls:hasAnswerOption ?answer .

    OPTIONAL {{ ?answer ls:componentValue ?answerCode . }}

    OPTIONAL {{
      ?answer ls:hasContent ?answerContentNode .
      ?answerContentNode ls:text ?answerText .
    }}

    OPTIONAL {{
      ?answer ls:hasComponentAttribute ?answerAttr1 .
      ?answerAttr1 ls:componentName "sortorder" .
      ?answerAttr1 ls:componentValue ?answerSortOrder .
    }}

    OPTIONAL {{
      ?answer ls:hasComponentAttribute ?answerAttr2 .
      ?answerAttr2 ls:componentName "assessment_value" .
      ?answerAttr2 ls:componentValue ?answerAssessmentValue .
    }}

    OPTIONAL {{
      ?answer ls:hasComponentAttribute ?answerAttr3 .
      ?answerAttr3 ls:componentName "scale_id" .
      ?answerAttr3 ls:componentValue ?answerScaleId .
    }}
  }}
}}
ORDER BY ?qid ?subOrder ?answerSortOrder
"#
    )
}

/// The unified groups+questions query: group scalar fields repeat per
/// member question; empty groups yield a single row with unbound question
/// variables.
pub const GROUPS_QUERY: &str = r#"PREFIX ls: <https://w3id.org/fossr/ontology/limesurvey/>

SELECT ?group ?groupId ?groupName ?groupDescription
       ?question ?questionId ?questionText ?variableCod ?questionType ?questionOrder
WHERE {
    ?group a ls:QuestionGroup .

    OPTIONAL {
        ?group ls:hasId ?identifier .
        ?identifier ls:id ?groupId .
    }

    OPTIONAL {
        ?group ls:hasName ?name .
        ?name ls:nameText ?groupName .
    }

    OPTIONAL {
        ?group ls:hasContent ?content .
        ?content ls:text ?groupDescription .
    }

    OPTIONAL {
        ?question ls:hasGroup ?group .

        OPTIONAL {
            ?question ls:hasId ?questionIdentifier .
            ?questionIdentifier ls:id ?questionId .
        }

        OPTIONAL {
            ?question ls:hasContent ?questionContent .
            ?questionContent ls:text ?questionText .
        }

        OPTIONAL {
            ?question ls:hasVariable ?var .
            ?var ls:variableCod ?variableCod .
        }

        OPTIONAL {
            ?question ls:hasType ?type .
            ?type ls:code ?questionType .
        }

        OPTIONAL {
            ?group ls:hasQuestionFlow ?flow .
            ?flow ls:hasQuestionStep ?step .
            ?step ls:hasQuestion ?question .
            ?step ls:questionOrder ?questionOrder .
        }
    }
}
ORDER BY ?groupId ?questionOrder ?questionId
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sparql_json_bindings() {
        let raw = r#"{
            "head": {"vars": ["qid", "title"]},
            "results": {"bindings": [
                {"qid": {"type": "literal", "value": "446"},
                 "title": {"type": "literal", "value": "AgeGroup"}}
            ]}
        }"#;
        let results: SparqlResults = serde_json::from_str(raw).unwrap();
        assert_eq!(results.head.vars, ["qid", "title"]);
        let row = FactRow::from_binding(&results.results.bindings[0]);
        assert_eq!(row.qid.as_deref(), Some("446"));
        assert_eq!(row.title.as_deref(), Some("AgeGroup"));
        assert!(row.sub_qid.is_none());
    }

    #[test]
    fn question_query_embeds_the_uri() {
        let q = complete_question_query("https://w3id.org/fossr/data/question_446");
        assert!(q.contains("<https://w3id.org/fossr/data/question_446> a ls:Question"));
        assert!(q.contains("ORDER BY ?qid ?subOrder ?answerSortOrder"));
    }
}
