//! Flattening preprocessor for hierarchical notes.
//!
//! Converts a blocked notes file into one self-contained record line per
//! fact. Input blocks look like:
//!
//! ```text
//! [USER]
//! Name: Bob Smith
//! Currency: EUR
//! ```
//!
//! and flatten to `"USER (Bob Smith) | Currency: EUR"` style lines, so every
//! fact carries its block header and entity name and can be matched
//! independently.

use std::path::Path;

use anyhow::{Context, Result};

/// Parser state: outside any block, or inside one with accumulated context.
#[derive(Debug)]
enum State {
    NoBlock,
    InBlock {
        header: String,
        name: Option<String>,
        buffer: Vec<String>,
    },
}

/// Line-oriented flattening state machine.
///
/// The implicit state of the format (current block header, current entity
/// name) is carried explicitly: a `[Header]` line flushes the previous block
/// and opens a new one, `Name:` lines set the entity name, and every other
/// content line is buffered until the block closes.
#[derive(Debug)]
pub struct Flattener {
    state: State,
    output: Vec<String>,
}

impl Flattener {
    /// Creates a flattener with no open block.
    pub fn new() -> Self {
        Self {
            state: State::NoBlock,
            output: Vec::new(),
        }
    }

    /// Feeds one input line to the state machine.
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        // Block boundary: flush whatever we were accumulating.
        if line.starts_with('[') {
            self.flush();
            self.state = State::InBlock {
                header: line.trim_matches(['[', ']']).to_string(),
                name: None,
                buffer: Vec::new(),
            };
            return;
        }

        let State::InBlock { name, buffer, .. } = &mut self.state else {
            // Content before the first block header has no context to
            // attach; the original preprocessor dropped it too.
            return;
        };

        if let Some(value) = line.strip_prefix("Name:") {
            *name = Some(value.trim().to_string());
        } else if name.is_none()
            && let Some((_, value)) = line.split_once("Technician:")
        {
            // Infrastructure blocks name their responsible technician
            // instead of carrying a Name field.
            *name = Some(value.trim().to_string());
        }

        let clean = line
            .replace("Enabled (true)", "Enabled")
            .replace("Disabled (false)", "Disabled");
        buffer.push(clean);
    }

    /// Flushes the current block's buffer into output lines.
    fn flush(&mut self) {
        let state = std::mem::replace(&mut self.state, State::NoBlock);
        let State::InBlock {
            header,
            name,
            buffer,
        } = state
        else {
            return;
        };

        let prefix = match name {
            Some(name) if !name.is_empty() => format!("{header} ({name})"),
            _ => header,
        };
        for item in buffer {
            self.output.push(format!("{prefix} | {item}"));
        }
    }

    /// Flushes the final block and returns all flattened lines.
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.output
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattens an iterator of input lines into record lines.
///
/// # Examples
///
/// ```
/// use factline::flatten::flatten_lines;
///
/// let lines = flatten_lines(["[USER]", "Name: Bob Smith", "Currency: EUR"]);
/// assert_eq!(lines, vec![
///     "USER (Bob Smith) | Name: Bob Smith".to_string(),
///     "USER (Bob Smith) | Currency: EUR".to_string(),
/// ]);
/// ```
pub fn flatten_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut flattener = Flattener::new();
    for line in lines {
        flattener.push_line(line.as_ref());
    }
    flattener.finish()
}

/// Flattens `input` into `output`, returning the number of record lines written.
///
/// # Errors
///
/// Returns an error if the input file cannot be read or the output file
/// cannot be written.
pub fn flatten_file(input: &Path, output: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read notes file: {}", input.display()))?;

    let flattened = flatten_lines(text.lines());

    std::fs::write(output, flattened.join("\n"))
        .with_context(|| format!("Failed to write data file: {}", output.display()))?;

    Ok(flattened.len())
}
