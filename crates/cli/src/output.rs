//! Terminal output.
//!
//! Results go to stdout; logs and failures go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

/// Print one result line.
pub fn line(text: &str) {
    println!("{text}");
}

/// Print a heading followed by an underline.
pub fn heading(text: &str) {
    println!("{text}");
    println!("{}", "-".repeat(text.chars().count()));
}

/// Print a failure for the user.
pub fn failure(text: &str) {
    eprintln!("error: {text}");
}
