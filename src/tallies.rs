//! The orchestrator: loads question definitions, drives the engine once per
//! election job and reconciles the per-question logs.

use log::{debug, info};

use snafu::prelude::*;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::engine::{TallyEngine, TallyRequest, VoteObserver};
use crate::model::{AnswerId, ElectionJob, QuestionDefinition, QuestionLog};
use crate::{
    CorrectionSnafu, DuplicateAnswerIdSnafu, EngineSnafu, MissingResultsSnafu, PipeResult,
    QuestionsOpenSnafu, QuestionsParseSnafu,
};

/// Batch options for [`run_tallies`]. Construct a fresh value per call;
/// nothing here is shared across invocations.
#[derive(Debug, Clone)]
pub struct TallyOptions {
    pub ignore_invalid_votes: bool,
    /// When set, only these question positions are tallied; the logs of the
    /// other questions are carried over from the previous run.
    pub question_indexes: Option<HashSet<usize>>,
    /// Reuse the questions already stored in each job's results instead of
    /// reading `questions_json` again.
    pub reuse_results: bool,
    /// When set, jobs at other positions are skipped without any mutation.
    pub tallies_indexes: Option<HashSet<usize>>,
}

impl Default for TallyOptions {
    fn default() -> TallyOptions {
        TallyOptions {
            ignore_invalid_votes: true,
            question_indexes: None,
            reuse_results: false,
            tallies_indexes: None,
        }
    }
}

/// Reads and checks the question definitions of one extraction directory.
pub fn load_questions(extract_dir: &Path) -> PipeResult<Vec<QuestionDefinition>> {
    let path = extract_dir.join("questions_json");
    let contents = fs::read_to_string(&path).context(QuestionsOpenSnafu {
        path: path.display().to_string(),
    })?;
    let questions: Vec<QuestionDefinition> =
        serde_json::from_str(&contents).context(QuestionsParseSnafu {
            path: path.display().to_string(),
        })?;
    for (qindex, question) in questions.iter().enumerate() {
        let mut seen: HashSet<&AnswerId> = HashSet::new();
        for answer in &question.answers {
            ensure!(
                seen.insert(&answer.id),
                DuplicateAnswerIdSnafu {
                    question_index: qindex,
                    answer_id: answer.id.clone(),
                }
            );
        }
    }
    debug!("load_questions: {:?}: {} questions", path, questions.len());
    Ok(questions)
}

/// Tallies every job of the batch, in order.
///
/// Per job: load (or reuse) the question definitions, apply the job's size
/// correction to every question, call the engine exactly once, then store
/// the results and the reconciled per-question logs back onto the job.
///
/// The first failing job aborts the whole batch, since result files are
/// persisted together. A job that fails is left untouched: its `results`
/// and `log` slots keep their previous content.
pub fn run_tallies(
    jobs: &mut [ElectionJob],
    engine: &mut dyn TallyEngine,
    mut observer: Option<&mut dyn VoteObserver>,
    opts: &TallyOptions,
) -> PipeResult<()> {
    for (jindex, job) in jobs.iter_mut().enumerate() {
        if let Some(indexes) = &opts.tallies_indexes {
            if !indexes.contains(&jindex) {
                debug!("run_tallies: skipping job {}", jindex);
                continue;
            }
        }

        let mut questions = if opts.reuse_results {
            job.results
                .as_ref()
                .context(MissingResultsSnafu { job_index: jindex })?
                .questions
                .clone()
        } else {
            load_questions(&job.extract_dir)?
        };

        if let (Some(spec), Some(corrector)) = (&job.size_corrections, &job.size_corrector) {
            for (qindex, question) in questions.iter_mut().enumerate() {
                corrector.apply(question, spec).context(CorrectionSnafu {
                    question_index: qindex,
                })?;
            }
        }

        info!(
            "run_tallies: job {} dir {:?}: {} questions, {} withdrawals",
            jindex,
            job.extract_dir,
            questions.len(),
            job.withdrawals.len()
        );

        let results = engine
            .tally(TallyRequest {
                extract_dir: &job.extract_dir,
                questions: &questions,
                ignore_invalid_votes: opts.ignore_invalid_votes,
                question_indexes: opts.question_indexes.as_ref(),
                // Withdrawals come from the job, never from individual questions.
                withdrawals: &job.withdrawals,
                observer: observer.as_deref_mut(),
            })
            .context(EngineSnafu { job_index: jindex })?;

        let log: Vec<QuestionLog> = (0..questions.len())
            .map(|qindex| reconciled_log(&*engine, job, qindex, opts.question_indexes.as_ref()))
            .collect();

        job.results = Some(results);
        job.log = log;
    }
    Ok(())
}

// A question excluded from this run keeps its log from the previous run (or
// an empty one when there was no previous run). Only tallied questions get
// the fresh engine log.
fn reconciled_log(
    engine: &dyn TallyEngine,
    job: &ElectionJob,
    qindex: usize,
    question_indexes: Option<&HashSet<usize>>,
) -> QuestionLog {
    match question_indexes {
        Some(indexes) if !indexes.contains(&qindex) => {
            job.log.get(qindex).cloned().unwrap_or_default()
        }
        _ => engine.question_log(qindex),
    }
}
