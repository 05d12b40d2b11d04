//! CSV side channel for ballot observation.

use log::warn;

use std::io::Write;

use crate::engine::{BlankVote, VoteObserver};
use crate::model::QuestionDefinition;

/// Writes one line per observed ballot: the question number followed by the
/// selected answers as `"<position>. <text>"` entries, comma-joined.
///
/// A pure side channel: the parsed selection is returned unchanged, and a
/// blank vote becomes an empty selection (a line with just the question
/// number). Sink failures are logged, never surfaced, so observation can
/// never fail a tally.
pub struct CsvVoteLogger<W: Write> {
    out: W,
}

impl<W: Write> CsvVoteLogger<W> {
    pub fn new(out: W) -> CsvVoteLogger<W> {
        CsvVoteLogger { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> VoteObserver for CsvVoteLogger<W> {
    fn observe(
        &mut self,
        question_num: usize,
        question: &QuestionDefinition,
        parsed: Result<Vec<usize>, BlankVote>,
    ) -> Vec<usize> {
        // Blank ballots are a valid outcome: an empty selection.
        let selection = parsed.unwrap_or_default();
        let mut fields = vec![question_num.to_string()];
        for &pos in &selection {
            let text = question
                .answers
                .get(pos)
                .map(|answer| answer.text.as_str())
                .unwrap_or("");
            fields.push(format!("\"{}. {}\"", pos, text));
        }
        if let Err(e) = writeln!(self.out, "{}", fields.join(",")) {
            warn!("csv side channel: write failed: {}", e);
        }
        selection
    }
}
