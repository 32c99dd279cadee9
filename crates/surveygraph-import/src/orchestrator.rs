//! End-to-end import sequencing with per-item failure capture.

use surveygraph_export_lsq::LsqSerializer;
use surveygraph_ingest_graph::GroupTree;
use surveygraph_model::{Error, Group, QuestionDocument};

use crate::client::SurveyImporter;
use crate::report::{ImportReport, ImportStage};

/// Name of the synthesized group that collects questions without a
/// resolvable group assignment.
pub const FALLBACK_GROUP_NAME: &str = "Other questions";
pub const FALLBACK_GROUP_DESCRIPTION: &str = "Questions without a specific group";

/// Lazy access to full question documents. `Ok(None)` is "nothing to
/// import" (recorded, not an error); `Err` is "attempted and failed".
pub trait QuestionSource {
    fn fetch(&self, reference: &str) -> Result<Option<QuestionDocument>, Error>;
}

/// One question scheduled for import: a human-readable label for the
/// report, plus either a preloaded document or a reference the source can
/// resolve.
#[derive(Debug, Clone, Default)]
pub struct QuestionPlan {
    pub reference: String,
    pub label: String,
    pub document: Option<QuestionDocument>,
}

/// A group together with the questions to import under it.
#[derive(Debug, Clone, Default)]
pub struct GroupPlan {
    pub group: Group,
    pub questions: Vec<QuestionPlan>,
}

impl From<GroupTree> for GroupPlan {
    fn from(tree: GroupTree) -> Self {
        Self {
            questions: tree
                .questions
                .iter()
                .map(|q| QuestionPlan {
                    reference: q.uri.clone(),
                    label: q.label().to_string(),
                    document: None,
                })
                .collect(),
            group: tree.group,
        }
    }
}

/// Everything one import run needs, passed by value: no global state.
#[derive(Debug, Clone, Default)]
pub struct SurveyPlan {
    pub title: String,
    pub language: String,
    pub groups: Vec<GroupPlan>,
    /// Questions without a resolvable group assignment; imported under the
    /// synthesized fallback group rather than dropped.
    pub ungrouped: Vec<QuestionPlan>,
}

/// Drive one complete survey import.
///
/// Survey creation is the only operation allowed to abort the run. A group
/// creation failure skips that group's question batch (each member is
/// recorded, never silently dropped) and the loop continues with the next
/// group. Within a group, each question's fetch → re-key → serialize →
/// import sequence is isolated: any step's failure becomes a report entry
/// naming the question and the failing stage, and the siblings proceed.
pub fn import_survey(
    importer: &mut dyn SurveyImporter,
    source: &dyn QuestionSource,
    serializer: &LsqSerializer,
    plan: &SurveyPlan,
) -> Result<ImportReport, Error> {
    if plan.title.trim().is_empty() {
        return Err(Error::FatalSetup("survey title is required".to_string()));
    }

    let survey_id = importer
        .create_survey(&plan.title, &plan.language)
        .map_err(|e| Error::FatalSetup(format!("survey creation failed: {e}")))?;
    tracing::info!(survey_id, title = %plan.title, "survey import started");

    let mut report = ImportReport::new(survey_id.to_string());

    for group_plan in &plan.groups {
        import_group(importer, source, serializer, survey_id, group_plan, &mut report);
    }

    if !plan.ungrouped.is_empty() {
        let fallback = GroupPlan {
            group: Group {
                id: String::new(),
                name: FALLBACK_GROUP_NAME.to_string(),
                description: FALLBACK_GROUP_DESCRIPTION.to_string(),
                order: (plan.groups.len() + 1) as i64,
            },
            questions: plan.ungrouped.clone(),
        };
        import_group(importer, source, serializer, survey_id, &fallback, &mut report);
    }

    tracing::info!(
        survey_id,
        imported = report.questions_imported,
        attempted = report.questions_attempted,
        "survey import finished"
    );
    Ok(report)
}

fn import_group(
    importer: &mut dyn SurveyImporter,
    source: &dyn QuestionSource,
    serializer: &LsqSerializer,
    survey_id: i64,
    plan: &GroupPlan,
    report: &mut ImportReport,
) {
    let group_id = match importer.create_group(
        survey_id,
        &plan.group.name,
        &plan.group.description,
        plan.group.order,
    ) {
        Ok(group_id) => group_id,
        Err(e) => {
            report.record_failure(&plan.group.name, ImportStage::Group, e.to_string());
            // The batch is skipped, but every member stays visible in the
            // report as an unresolved dependency.
            for question in &plan.questions {
                report.questions_attempted += 1;
                let unresolved = Error::DependencyUnresolved {
                    entity: question.label.clone(),
                    dependency: format!("group '{}'", plan.group.name),
                };
                report.record_failure(&question.label, ImportStage::Group, unresolved.to_string());
            }
            return;
        }
    };
    report.groups_created += 1;

    for question in &plan.questions {
        import_question(importer, source, serializer, survey_id, group_id, question, report);
    }
}

fn import_question(
    importer: &mut dyn SurveyImporter,
    source: &dyn QuestionSource,
    serializer: &LsqSerializer,
    survey_id: i64,
    group_id: i64,
    plan: &QuestionPlan,
    report: &mut ImportReport,
) {
    report.questions_attempted += 1;

    let fetched = match &plan.document {
        Some(document) => document.clone(),
        None => match source.fetch(&plan.reference) {
            Ok(Some(document)) => document,
            Ok(None) => {
                report.record_failure(
                    &plan.label,
                    ImportStage::Fetch,
                    "no data available".to_string(),
                );
                return;
            }
            Err(e) => {
                report.record_failure(&plan.label, ImportStage::Fetch, e.to_string());
                return;
            }
        },
    };

    let mut document = fetched;
    document.retarget(&survey_id.to_string(), &group_id.to_string());
    let mandatory = document.mandatory().unwrap_or("N").to_string();

    let wire = match serializer.serialize(&document) {
        Ok(wire) => wire,
        Err(e) => {
            report.record_failure(&plan.label, ImportStage::Serialize, e.to_string());
            return;
        }
    };

    match importer.import_question(survey_id, group_id, &wire, &mandatory) {
        Ok(question_id) => {
            tracing::debug!(question_id, label = %plan.label, "question imported");
            report.questions_imported += 1;
        }
        Err(e) => {
            report.record_failure(&plan.label, ImportStage::Import, e.to_string());
        }
    }
}
