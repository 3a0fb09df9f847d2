// Interactive question loop
// Reads questions line by line and prints answers until `exit` or end of input

#[cfg(test)]
mod tests;

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::Result;
use crate::pipeline::Answerer;

const QUESTION_PROMPT: &str = "\nQuestion: ";
const FAREWELL: &str = "Exiting...";

/// What a line of user input asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput<'a> {
    Exit,
    Empty,
    Question(&'a str),
}

/// Counts reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub answered: usize,
    pub failed: usize,
}

/// Classify one line of input. The trailing line terminator is dropped from
/// questions; other whitespace is passed through.
#[inline]
pub fn classify_input(line: &str) -> UserInput<'_> {
    let line = line.trim_end_matches(['\n', '\r']);
    let trimmed = line.trim();

    if trimmed.eq_ignore_ascii_case("exit") {
        UserInput::Exit
    } else if trimmed.is_empty() {
        UserInput::Empty
    } else {
        UserInput::Question(line)
    }
}

/// Run the read-answer loop.
///
/// Errors scoped to one question are printed and the loop continues. Console
/// I/O errors and anything else end the session.
#[inline]
pub async fn run_session<A, R, W>(answerer: &A, mut input: R, mut output: W) -> Result<SessionSummary>
where
    A: Answerer + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();

    writeln!(output, "\nAmbedkarGPT is ready.")?;
    writeln!(output, "Ask questions based on the speech. Type 'exit' to quit.")?;

    let mut line = String::new();
    loop {
        write!(output, "{}", QUESTION_PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            writeln!(output, "{}", FAREWELL)?;
            break;
        }

        let question = match classify_input(&line) {
            UserInput::Exit => {
                writeln!(output, "{}", FAREWELL)?;
                break;
            }
            UserInput::Empty => continue,
            UserInput::Question(question) => question,
        };

        match answerer.answer(question).await {
            Ok(answer) => {
                writeln!(output, "Answer: {}", answer)?;
                summary.answered += 1;
            }
            Err(e) if e.is_per_query() => {
                warn!("Failed to answer question: {}", e);
                writeln!(output, "Error: {}", e)?;
                summary.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Session ended: {} answered, {} failed",
        summary.answered, summary.failed
    );
    Ok(summary)
}
