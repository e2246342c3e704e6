//! Line-oriented question loop.

use std::io::{self, BufRead, Write};
use tracing::warn;

use docpilot_core::traits::VectorCollection;
use docpilot_core::Error;
use docpilot_rag::QueryEngine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub answered: usize,
    pub failed: usize,
}

pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit")
}

/// Answer questions read from `input` until `quit`, `exit` or end of input.
///
/// A failed question is reported on `out` and the loop keeps going; only I/O
/// errors on `input`/`out` end the session early.
pub async fn run_repl<C, R, W>(engine: &QueryEngine<C>, mut input: R, out: &mut W) -> io::Result<SessionStats>
where
    C: VectorCollection,
    R: BufRead,
    W: Write,
{
    writeln!(out, "Documentation Copilot is ready. Ask your questions below.")?;
    writeln!(out, "Type 'quit' or 'exit' to stop.")?;

    let mut stats = SessionStats::default();
    loop {
        write!(out, "\nQuestion: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        if is_exit_command(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match engine.answer(&line).await {
            Ok(answer) => {
                writeln!(out, "\n--- Answer ---")?;
                writeln!(out, "{}", answer.text)?;
                writeln!(out, "{}", answer.context)?;
                stats.answered += 1;
            }
            Err(Error::EmptyQuestion) => {}
            Err(e) => {
                warn!("Question failed: {e}");
                writeln!(out, "An error occurred: {e}")?;
                stats.failed += 1;
            }
        }
    }

    writeln!(out, "\nCopilot session ended. Goodbye!")?;
    Ok(stats)
}
