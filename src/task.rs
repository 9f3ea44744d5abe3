//! Task text resolution.
//!
//! The task comes from the positional arguments, from a file named by the
//! only argument, or from piped standard input, in that order.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Resolves the task text.
///
/// `stdin` is only consulted when there are no arguments; pass `None` when
/// standard input is a terminal. Invalid UTF-8 is replaced, not rejected. Returns `None` when no task text results.
pub(crate) fn resolve_task<R: Read>(
    args: &[String],
    stdin: Option<R>,
) -> io::Result<Option<String>> {
    let task = match args {
        [] => match stdin {
            Some(mut reader) => {
                debug!("Reading task from standard input");
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                String::from_utf8_lossy(&bytes)
                    .lines()
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            None => String::new(),
        },
        [single] if Path::new(single).is_file() => {
            debug!("Reading task from file: {}", single);
            String::from_utf8_lossy(&fs::read(single)?).trim().to_string()
        }
        words => words.join(" "),
    };

    Ok(Some(task).filter(|t| !t.trim().is_empty()))
}
