//! Confirmation hooks for opening a directory that already holds data.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

/// Exit status used when the operator declines to reuse an existing run
/// directory.
pub const CONFLICT_EXIT_CODE: i32 = 65;

/// Describes a directory conflict handed to a confirmation callback.
#[derive(Debug, Clone)]
pub struct DirConflict {
    /// The run directory that already holds logged data.
    pub dir: PathBuf,
}

/// Whether `answer` counts as a confirmation.
///
/// Accepted (case-insensitive): `y`, `yes`, `j`, `ja`.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "j" | "ja"
    )
}

/// Ask the operator on stdin whether to continue with existing data.
pub fn stdin_confirm(conflict: &DirConflict) -> bool {
    print!(
        "The directory {} already exists. Continue (this may overwrite old data)? [y/N] ",
        conflict.dir.display()
    );
    let _ = io::stdout().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(_) => false,
    }
}

/// Like [`stdin_confirm`], but aborts the process with
/// [`CONFLICT_EXIT_CODE`] when the operator declines.
pub fn stdin_confirm_or_exit(conflict: &DirConflict) -> bool {
    if stdin_confirm(conflict) {
        true
    } else {
        eprintln!("Exiting due to existing data in {}", conflict.dir.display());
        process::exit(CONFLICT_EXIT_CODE);
    }
}
