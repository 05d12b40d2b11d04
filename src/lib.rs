//! Pipeline stage that orchestrates election-result tallying.
//!
//! The counting itself happens in an external engine behind the
//! [`TallyEngine`] trait. This crate loads the question definitions of each
//! election, drives the engine once per election, reconciles the per-question
//! logs, and post-processes the results (candidate removals, canonical JSON
//! output, optional CSV side channel).

use snafu::Snafu;

pub mod config_reader;
pub mod csv_log;
pub mod engine;
pub mod model;
pub mod output;
pub mod removals;
pub mod tallies;

pub use crate::csv_log::CsvVoteLogger;
pub use crate::engine::{
    BlankVote, EngineError, RecordedEngine, TallyEngine, TallyRequest, VoteObserver,
};
pub use crate::model::{
    Answer, AnswerId, ElectionJob, QuestionDefinition, QuestionLog, RemovalRecord, SizeCorrection,
    TallyResult, Withdrawal,
};
pub use crate::output::{to_canonical_json, write_results};
pub use crate::removals::apply_removals;
pub use crate::tallies::{load_questions, run_tallies, TallyOptions};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PipeError {
    #[snafu(display("Error opening questions file {path}"))]
    QuestionsOpen {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing questions file {path}"))]
    QuestionsParse {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Duplicate answer id {answer_id:?} in question {question_index}"))]
    DuplicateAnswerId {
        question_index: usize,
        answer_id: AnswerId,
    },
    #[snafu(display("No results available for job {job_index}"))]
    MissingResults { job_index: usize },
    #[snafu(display("Size correction failed on question {question_index}"))]
    Correction {
        question_index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[snafu(display("Tally engine failed on job {job_index}"))]
    Engine {
        job_index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[snafu(display("Error serializing results for job {job_index}"))]
    ResultSerialize {
        source: serde_json::Error,
        job_index: usize,
    },
    #[snafu(display("Error writing results file {path}"))]
    ResultWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{count} output paths provided for {num_jobs} jobs"))]
    PathsMismatch { count: usize, num_jobs: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PipeResult<T> = Result<T, PipeError>;
