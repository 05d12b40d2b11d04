//! Post-hoc candidate removal.
//!
//! Strikes disqualified candidates from already-computed results. This is a
//! presentation-level edit: vote counts and other aggregates embedded in the
//! results are left as-is, even when they reference a removed answer.

use log::info;

use snafu::prelude::*;

use std::collections::HashSet;

use crate::model::{AnswerId, ElectionJob};
use crate::{MissingResultsSnafu, PipeResult};

/// Applies the removal list of the first job of the batch.
///
/// Only the first job is ever touched; removal lists on later jobs are
/// ignored. A job without a removal list is a no-op. Idempotent: a second
/// application finds nothing left to remove.
pub fn apply_removals(jobs: &mut [ElectionJob]) -> PipeResult<()> {
    let job = match jobs.first_mut() {
        Some(job) => job,
        None => return Ok(()),
    };
    let removed_list = match &job.removed_candidates {
        Some(list) => list.clone(),
        None => return Ok(()),
    };
    let results = job
        .results
        .as_mut()
        .context(MissingResultsSnafu { job_index: 0usize })?;

    for (qindex, question) in results.questions.iter_mut().enumerate() {
        let q_removed: HashSet<&AnswerId> = removed_list
            .iter()
            .filter(|removed| removed.question_index == qindex)
            .map(|removed| &removed.answer_id)
            .collect();
        if q_removed.is_empty() {
            continue;
        }
        let before = question.answers.len();
        question.answers.retain(|answer| !q_removed.contains(&answer.id));
        info!(
            "apply_removals: question {}: {} of {} answers removed",
            qindex,
            before - question.answers.len(),
            before
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, QuestionDefinition, RemovalRecord, TallyResult};
    use crate::PipeError;
    use serde_json::Map as JSMap;

    fn answer(id: i64, text: &str) -> Answer {
        Answer {
            id: AnswerId::Number(id),
            text: text.to_string(),
            extra: JSMap::new(),
        }
    }

    fn removal(question_index: usize, id: i64) -> RemovalRecord {
        RemovalRecord {
            question_index,
            answer_id: AnswerId::Number(id),
        }
    }

    fn job_with_results(questions: Vec<Vec<Answer>>) -> ElectionJob {
        let mut job = ElectionJob::new("unused");
        job.results = Some(TallyResult {
            questions: questions
                .into_iter()
                .map(|answers| QuestionDefinition {
                    answers,
                    extra: JSMap::new(),
                })
                .collect(),
            extra: JSMap::new(),
        });
        job
    }

    fn answer_ids(job: &ElectionJob, qindex: usize) -> Vec<AnswerId> {
        job.results.as_ref().unwrap().questions[qindex]
            .answers
            .iter()
            .map(|a| a.id.clone())
            .collect()
    }

    #[test]
    fn removes_exactly_the_listed_answers_in_order() {
        let mut jobs = vec![job_with_results(vec![
            vec![answer(0, "A"), answer(1, "B"), answer(2, "C")],
            vec![answer(0, "X"), answer(1, "Y")],
        ])];
        jobs[0].removed_candidates = Some(vec![removal(0, 1), removal(1, 0)]);

        apply_removals(&mut jobs).unwrap();

        assert_eq!(
            answer_ids(&jobs[0], 0),
            vec![AnswerId::Number(0), AnswerId::Number(2)]
        );
        assert_eq!(answer_ids(&jobs[0], 1), vec![AnswerId::Number(1)]);
    }

    #[test]
    fn is_idempotent() {
        let mut jobs = vec![job_with_results(vec![vec![
            answer(0, "A"),
            answer(1, "B"),
        ]])];
        jobs[0].removed_candidates = Some(vec![removal(0, 0)]);

        apply_removals(&mut jobs).unwrap();
        let once = jobs[0].results.clone();
        apply_removals(&mut jobs).unwrap();
        assert_eq!(jobs[0].results, once);
    }

    #[test]
    fn only_the_first_job_is_touched() {
        let mut jobs = vec![
            job_with_results(vec![vec![answer(0, "A")]]),
            job_with_results(vec![vec![answer(0, "A")]]),
        ];
        jobs[1].removed_candidates = Some(vec![removal(0, 0)]);

        apply_removals(&mut jobs).unwrap();

        // The second job keeps its answers even though it lists a removal.
        assert_eq!(answer_ids(&jobs[1], 0), vec![AnswerId::Number(0)]);
    }

    #[test]
    fn no_removal_list_is_a_noop() {
        let mut jobs = vec![job_with_results(vec![vec![answer(0, "A")]])];
        apply_removals(&mut jobs).unwrap();
        assert_eq!(answer_ids(&jobs[0], 0), vec![AnswerId::Number(0)]);
    }

    #[test]
    fn removals_without_results_are_an_error() {
        let mut jobs = vec![ElectionJob::new("unused")];
        jobs[0].removed_candidates = Some(vec![removal(0, 0)]);
        let err = apply_removals(&mut jobs).unwrap_err();
        assert!(matches!(err, PipeError::MissingResults { job_index: 0 }));
    }

    #[test]
    fn empty_batch_is_a_noop() {
        apply_removals(&mut []).unwrap();
    }
}
