//! Yes/no confirmation drawn through the live renderer.
//!
//! The question is printed below the status table. Answering `?` shows a
//! help overlay beneath the question and asks again; once the user answers,
//! the overlay is erased back to the marker set before asking and only the
//! answered question stays on screen.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::output::OutputConfig;
use crate::renderer::LiveRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    Help,
    Invalid,
}

fn parse_answer(raw: &str) -> Answer {
    match raw.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Answer::Yes,
        "n" | "no" => Answer::No,
        "?" | "h" | "help" => Answer::Help,
        _ => Answer::Invalid,
    }
}

/// Asks `question`, defaulting to yes.
///
/// `help` is shown when the user answers `?`. End of input declines.
pub fn confirm<W, R>(
    renderer: &LiveRenderer<W>,
    input: &mut R,
    question: &str,
    help: &str,
    output: &OutputConfig,
) -> Result<bool>
where
    W: Write,
    R: BufRead,
{
    let prompt = format!("{} {question} [Y/n/?] ", output.bold(">>>"));
    renderer.mark();
    let mut overlay_shown = false;

    loop {
        renderer.print(&prompt)?;
        let mut line = String::new();
        let read = input.read_line(&mut line).map_err(|e| Error::Prompt {
            message: e.to_string(),
        })?;
        if read == 0 {
            renderer.print("\n")?;
            return Ok(false);
        }
        // The terminal echoed the user's Enter
        renderer.add_line_breaks(1);

        let answer = parse_answer(&line);
        let overlay = match answer {
            Answer::Yes | Answer::No => {
                if overlay_shown {
                    renderer.reset_to_marker()?;
                    renderer.print(&format!("{prompt}{}\n", line.trim()))?;
                }
                return Ok(answer == Answer::Yes);
            }
            Answer::Help => help.to_string(),
            Answer::Invalid => format!(
                "{} Invalid option '{}', answer y, n or ?\n",
                output.red("!"),
                line.trim()
            ),
        };

        renderer.reset_to_marker()?;
        renderer.print(&format!("{prompt}{}\n", line.trim()))?;
        renderer.print(&overlay)?;
        overlay_shown = true;
    }
}
