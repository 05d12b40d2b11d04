//! Data model of the tally pipeline.
//!
//! The shapes mirror the JSON produced by the extraction step and by the
//! tally engine. Everything this stage does not interpret is preserved
//! verbatim through flattened maps, so unknown fields survive a round trip.

use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use std::path::PathBuf;

/// An answer identifier, unique within one question.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerId {
    Number(i64),
    Text(String),
}

/// One selectable answer of a question.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub text: String,
    #[serde(flatten)]
    pub extra: JSMap<String, JSValue>,
}

/// One election question with its ordered answer list.
///
/// After tallying, the engine may attach per-answer counts and
/// question-level aggregates. Those land in the flattened maps and are
/// opaque to this stage.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub answers: Vec<Answer>,
    #[serde(flatten)]
    pub extra: JSMap<String, JSValue>,
}

/// Diagnostic trail for one question's tally, opaque to this stage.
pub type QuestionLog = JSMap<String, JSValue>;

/// Aggregated output of the tally engine for one election.
///
/// Questions are keyed by position, matching the definition order.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyResult {
    pub questions: Vec<QuestionDefinition>,
    #[serde(flatten)]
    pub extra: JSMap<String, JSValue>,
}

/// A candidate withdrawn before counting. Affects tally semantics and is
/// interpreted by the engine, not here.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub question_index: usize,
    pub answer_id: AnswerId,
}

/// A candidate to strike from already-computed results. Does not affect
/// counts.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RemovalRecord {
    pub question_index: usize,
    pub answer_id: AnswerId,
}

/// Caller-supplied correction applied to each question before tallying,
/// for instance to adjust winner counts when election sizes changed.
pub trait SizeCorrection {
    fn apply(
        &self,
        question: &mut QuestionDefinition,
        spec: &JSValue,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// One election's data bundle flowing through the pipeline.
///
/// Constructed by the caller, mutated in place by [`run_tallies`]
/// (`results` and `log` slots), read back by the removal and output stages.
///
/// [`run_tallies`]: crate::tallies::run_tallies
pub struct ElectionJob {
    /// Directory holding the extracted election data, including the
    /// `questions_json` definition file.
    pub extract_dir: PathBuf,
    /// Correction spec passed through to `size_corrector` when both are set.
    pub size_corrections: Option<JSValue>,
    pub size_corrector: Option<Box<dyn SizeCorrection>>,
    pub withdrawals: Vec<Withdrawal>,
    pub removed_candidates: Option<Vec<RemovalRecord>>,
    pub results: Option<TallyResult>,
    /// One entry per question once the job has been tallied.
    pub log: Vec<QuestionLog>,
}

impl ElectionJob {
    pub fn new(extract_dir: impl Into<PathBuf>) -> ElectionJob {
        ElectionJob {
            extract_dir: extract_dir.into(),
            size_corrections: None,
            size_corrector: None,
            withdrawals: Vec::new(),
            removed_candidates: None,
            results: None,
            log: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_id_accepts_numbers_and_strings() {
        let answers: Vec<Answer> =
            serde_json::from_value(json!([{"id": 3, "text": "A"}, {"id": "w-1", "text": "B"}]))
                .unwrap();
        assert_eq!(answers[0].id, AnswerId::Number(3));
        assert_eq!(answers[1].id, AnswerId::Text("w-1".to_string()));
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let js = json!({
            "answers": [{"id": 0, "text": "A", "total_count": 42}],
            "title": "Board",
            "tally_type": "plurality-at-large"
        });
        let question: QuestionDefinition = serde_json::from_value(js.clone()).unwrap();
        assert_eq!(question.extra["title"], json!("Board"));
        assert_eq!(question.answers[0].extra["total_count"], json!(42));
        assert_eq!(serde_json::to_value(&question).unwrap(), js);
    }
}
