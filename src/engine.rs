//! The tally-engine capability.
//!
//! Counting is not implemented in this crate. Any concrete engine plugs in
//! through [`TallyEngine`]: one synchronous `tally` call per election, plus a
//! per-question log snapshot retrievable after the call.

use log::debug;

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::model::{QuestionDefinition, QuestionLog, TallyResult, Withdrawal};

/// Opaque failure surfaced by an engine. Never interpreted or retried here.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Marker for a ballot that, after parsing, selects no answers.
/// A valid outcome, not an error.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct BlankVote;

/// Hook invoked by the engine for every ballot it parses.
///
/// The observer receives the parse outcome (answer positions, or a blank
/// vote) and returns the selection the engine should keep counting with.
/// Implementations must not alter tally semantics: return the parsed
/// selection unchanged, mapping a blank vote to an empty selection.
pub trait VoteObserver {
    fn observe(
        &mut self,
        question_num: usize,
        question: &QuestionDefinition,
        parsed: Result<Vec<usize>, BlankVote>,
    ) -> Vec<usize>;
}

/// Everything an engine needs for one election.
pub struct TallyRequest<'a, 'o> {
    pub extract_dir: &'a Path,
    pub questions: &'a [QuestionDefinition],
    pub ignore_invalid_votes: bool,
    /// When set, only these question positions are tallied.
    pub question_indexes: Option<&'a HashSet<usize>>,
    pub withdrawals: &'a [Withdrawal],
    pub observer: Option<&'a mut (dyn VoteObserver + 'o)>,
}

pub trait TallyEngine {
    /// Counts one whole election. Either returns a complete [`TallyResult`]
    /// or fails without partial output.
    fn tally(&mut self, req: TallyRequest<'_, '_>) -> Result<TallyResult, EngineError>;

    /// Log snapshot for one question of the last `tally` call. Empty when
    /// the engine has nothing to report for that question.
    fn question_log(&self, index: usize) -> QuestionLog;
}

/// An engine that replays a pre-computed tally from the extraction
/// directory (`tally_json`, holding the results and per-question logs).
///
/// Pure deserialization: it never counts anything, which keeps voting
/// methods out of this crate. Used by the command line driver and the tests.
#[derive(Default)]
pub struct RecordedEngine {
    logs: Vec<QuestionLog>,
}

#[derive(Deserialize)]
struct RecordedTally {
    results: TallyResult,
    #[serde(default)]
    logs: Vec<QuestionLog>,
}

impl RecordedEngine {
    pub fn new() -> RecordedEngine {
        RecordedEngine::default()
    }
}

impl TallyEngine for RecordedEngine {
    fn tally(&mut self, req: TallyRequest<'_, '_>) -> Result<TallyResult, EngineError> {
        let path = req.extract_dir.join("tally_json");
        debug!("RecordedEngine: replaying {:?}", path);
        let contents = fs::read_to_string(&path)?;
        let recorded: RecordedTally = serde_json::from_str(&contents)?;
        self.logs = recorded.logs;
        Ok(recorded.results)
    }

    fn question_log(&self, index: usize) -> QuestionLog {
        self.logs.get(index).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn request(dir: &Path) -> TallyRequest<'_, '_> {
        TallyRequest {
            extract_dir: dir,
            questions: &[],
            ignore_invalid_votes: true,
            question_indexes: None,
            withdrawals: &[],
            observer: None,
        }
    }

    #[test]
    fn recorded_engine_replays_results_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("tally_json")).unwrap();
        let js = json!({
            "results": {"questions": [{"answers": [{"id": 0, "text": "A"}]}], "total_votes": 10},
            "logs": [{"invalid_votes": 2}]
        });
        write!(f, "{}", js).unwrap();

        let mut engine = RecordedEngine::new();
        let results = engine.tally(request(dir.path())).unwrap();
        assert_eq!(results.questions.len(), 1);
        assert_eq!(results.extra["total_votes"], json!(10));
        assert_eq!(engine.question_log(0)["invalid_votes"], json!(2));
        // No recorded log for the second question.
        assert!(engine.question_log(1).is_empty());
    }

    #[test]
    fn recorded_engine_fails_without_a_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = RecordedEngine::new();
        assert!(engine.tally(request(dir.path())).is_err());
    }
}
