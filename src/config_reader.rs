//! Reading of the pipeline description consumed by the command line driver.

use log::debug;

use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::fs;
use std::path::Path;

use crate::model::{ElectionJob, RemovalRecord, Withdrawal};
use crate::tallies::TallyOptions;
use crate::{OpeningJsonSnafu, ParsingJsonSnafu, PipeResult};

/// One election job as described in the pipeline file.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub extract_dir: String,
    /// File name of the result file for this job.
    pub output: String,
    #[serde(default)]
    pub withdrawals: Vec<Withdrawal>,
    #[serde(rename = "removed-candidates")]
    pub removed_candidates: Option<Vec<RemovalRecord>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub jobs: Vec<JobConfig>,
    #[serde(default = "default_true")]
    pub ignore_invalid_votes: bool,
    #[serde(default)]
    pub print_as_csv: bool,
    pub question_indexes: Option<Vec<usize>>,
    pub tallies_indexes: Option<Vec<usize>>,
    #[serde(default)]
    pub reuse_results: bool,
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    pub fn tally_options(&self) -> TallyOptions {
        TallyOptions {
            ignore_invalid_votes: self.ignore_invalid_votes,
            question_indexes: self
                .question_indexes
                .as_ref()
                .map(|indexes| indexes.iter().copied().collect()),
            reuse_results: self.reuse_results,
            tallies_indexes: self
                .tallies_indexes
                .as_ref()
                .map(|indexes| indexes.iter().copied().collect()),
        }
    }

    pub fn jobs(&self) -> Vec<ElectionJob> {
        self.jobs
            .iter()
            .map(|jc| {
                let mut job = ElectionJob::new(&jc.extract_dir);
                job.withdrawals = jc.withdrawals.clone();
                job.removed_candidates = jc.removed_candidates.clone();
                job
            })
            .collect()
    }
}

pub fn read_config(path: &str) -> PipeResult<PipelineConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: PipelineConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Reads a result file back as a JSON value, for reference comparisons.
pub fn read_results_json(path: &Path) -> PipeResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.display().to_string(),
    })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu {
        path: path.display().to_string(),
    })?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerId;
    use std::io::Write;

    #[test]
    fn parses_a_pipeline_description_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{
                "jobs": [
                    {{"extract_dir": "e1", "output": "r1.json",
                      "removed-candidates": [{{"question_index": 0, "answer_id": 2}}]}},
                    {{"extract_dir": "e2", "output": "r2.json"}}
                ],
                "tallies_indexes": [0]
            }}"#
        )
        .unwrap();

        let config = read_config(path.to_str().unwrap()).unwrap();
        assert!(config.ignore_invalid_votes);
        assert!(!config.print_as_csv);
        assert!(!config.reuse_results);
        assert_eq!(
            config.jobs[0].removed_candidates.as_ref().unwrap()[0].answer_id,
            AnswerId::Number(2)
        );

        let opts = config.tally_options();
        assert_eq!(opts.tallies_indexes, Some([0].into_iter().collect()));
        assert_eq!(opts.question_indexes, None);

        let jobs = config.jobs();
        assert_eq!(jobs.len(), 2);
        assert!(jobs[0].removed_candidates.is_some());
        assert!(jobs[1].removed_candidates.is_none());
    }
}
