//! The human-in-the-loop step: candidate list in, one index (or nothing) out.

use pdfhunt_core::SearchCandidate;
use std::io::{self, BufRead, BufReader, Read, Write};

pub const PROMPT: &str = "Enter the number to download (or 0 to exit): ";

/// `1. Title: link` lines, one per candidate.
pub fn format_candidates(candidates: &[SearchCandidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}: {}\n", i + 1, c.title, c.link))
        .collect()
}

/// Map a 1-based choice to a 0-based index. `0`, out-of-range and non-numeric input mean
/// "no action".
pub fn parse_selection(input: &str, len: usize) -> Option<usize> {
    let token = input.split_whitespace().next()?;
    let n: usize = token.parse().ok()?;
    if n == 0 || n > len {
        return None;
    }
    Some(n - 1)
}

/// Print the prompt to `out` and read one line from `input`. EOF counts as "no action".
pub fn prompt_selection<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
    len: usize,
) -> io::Result<Option<usize>> {
    write!(out, "{PROMPT}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(parse_selection(&line, len))
}

/// [`prompt_selection`] on the blocking pool, so a terminal read never parks a runtime worker.
pub async fn prompt_selection_blocking<R, W>(
    input: R,
    out: W,
    len: usize,
) -> io::Result<Option<usize>>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || prompt_selection(BufReader::new(input), out, len))
        .await
        .map_err(io::Error::other)?
}
