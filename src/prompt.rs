use std::fmt::Display;
use std::io::{self, BufRead, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Failed to read selection: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid selection: {0:?} is not a number")]
    NotANumber(String),

    #[error("Invalid selection: {choice} is not between 1 and {max}")]
    OutOfRange { choice: i64, max: usize },
}

/// Print `heading` followed by the items numbered from 1.
pub fn render_menu<W, T>(out: &mut W, heading: &str, items: &[T]) -> io::Result<()>
where
    W: Write,
    T: Display,
{
    writeln!(out, "{heading}")?;
    for (i, item) in items.iter().enumerate() {
        writeln!(out, "{}: {}", i + 1, item)?;
    }
    Ok(())
}

/// Prompt for a menu choice and return its zero-based index.
///
/// One line is read from `input` and trimmed; it must parse as an integer in
/// `1..=count`. End of input counts as an empty, non-numeric answer.
pub fn read_selection<R, W>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    count: usize,
) -> Result<usize, SelectionError>
where
    R: BufRead,
    W: Write,
{
    write!(out, "\n{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    parse_selection(line.trim(), count)
}

fn parse_selection(answer: &str, count: usize) -> Result<usize, SelectionError> {
    let choice: i64 = answer
        .parse()
        .map_err(|_| SelectionError::NotANumber(answer.to_string()))?;
    match usize::try_from(choice) {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(SelectionError::OutOfRange { choice, max: count }),
    }
}
