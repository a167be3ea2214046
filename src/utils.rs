//! Utility functions
use std::io::{stdin, stdout, Write};

use crate::errors::{MigrateError, MigrateErrorKind};

/// Get input from the user
/// # Errors
/// Error if stdin can't be read or is closed
pub(crate) fn input() -> Result<String, MigrateError> {
    let mut s = String::new();
    let _ = stdout().flush();
    let read = stdin().read_line(&mut s)?;
    if read == 0 {
        return Err(MigrateError::new(MigrateErrorKind::Io)
            .with_text("No input (stdin closed), use --yes to skip the confirmation"));
    }
    if let Some('\n') = s.chars().next_back() {
        s.pop();
    }
    if let Some('\r') = s.chars().next_back() {
        s.pop();
    }
    Ok(s)
}

/// Parse a yes/no answer
fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Get a yes/no input from the user
/// # Errors
/// Error if stdin can't be read
pub(crate) fn yes_no_input<S: AsRef<str>>(msg: S) -> Result<bool, MigrateError> {
    let msg = msg.as_ref();
    loop {
        println!("{msg}");
        match parse_yes_no(&input()?) {
            Some(answer) => return Ok(answer),
            None => println!("Invalid input"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn yes_no_answers() {
        for answer in ["y", "Y", "yes", "YES", "Yes "] {
            assert_eq!(parse_yes_no(answer), Some(true), "{answer}");
        }
        for answer in ["n", "N", "no", "No"] {
            assert_eq!(parse_yes_no(answer), Some(false), "{answer}");
        }
        for answer in ["", "maybe", "yess"] {
            assert_eq!(parse_yes_no(answer), None, "{answer}");
        }
    }
}
