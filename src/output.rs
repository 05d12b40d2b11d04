//! Canonical JSON serialization of the results.
//!
//! The output is byte-stable: keys sorted, 4-space indentation, non-ASCII
//! characters written literally. Two runs over the same results produce the
//! same bytes, which keeps published result files diffable.

use log::info;

use snafu::prelude::*;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

use crate::model::{ElectionJob, TallyResult};
use crate::{
    MissingResultsSnafu, PathsMismatchSnafu, PipeResult, ResultSerializeSnafu, ResultWriteSnafu,
};

/// Renders one result as canonical JSON.
pub fn to_canonical_json(results: &TallyResult) -> Result<String, serde_json::Error> {
    // Going through a Value first puts every object behind serde_json's
    // sorted map, including the flattened extra fields.
    let value = serde_json::to_value(results)?;
    let mut buf: Vec<u8> = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf).expect("serde_json emits valid utf-8"))
}

/// Writes each job's results to the file named by the path at the same
/// position, inside `out_dir`.
///
/// Paths are reduced to their file name: a path list coming from an
/// untrusted source cannot direct writes outside `out_dir`. A failure stops
/// the batch; files already written stay valid.
pub fn write_results(
    jobs: &[ElectionJob],
    paths: &[String],
    out_dir: &Path,
) -> PipeResult<()> {
    ensure!(
        paths.len() == jobs.len(),
        PathsMismatchSnafu {
            count: paths.len(),
            num_jobs: jobs.len(),
        }
    );

    for (jindex, (job, path)) in jobs.iter().zip(paths.iter()).enumerate() {
        let file_name = Path::new(path)
            .file_name()
            .whatever_context(format!("output path {:?} has no file name", path))?;
        let dest = out_dir.join(file_name);

        let results = job
            .results
            .as_ref()
            .context(MissingResultsSnafu { job_index: jindex })?;
        let contents =
            to_canonical_json(results).context(ResultSerializeSnafu { job_index: jindex })?;
        fs::write(&dest, contents).context(ResultWriteSnafu {
            path: dest.display().to_string(),
        })?;
        info!("write_results: job {} -> {:?}", jindex, dest);
    }
    Ok(())
}
