//! Output helpers shared by the CLI commands.
//!
//! Commands that are not given an `--output` path print to stdout.

use std::io::Write;

use anyhow::Context;

/// Writes `content` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn emit(content: &[u8]) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_terminated(&mut stdout, content).context("could not write to stdout")
}

/// Writes `content`, adding a final newline if it lacks one.
fn write_terminated<W: Write>(out: &mut W, content: &[u8]) -> std::io::Result<()> {
    out.write_all(content)?;
    if !content.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Formats a numbered list, one entry per line.
#[must_use]
pub fn numbered<S: AsRef<str>>(items: &[S]) -> String {
    let width = items.len().to_string().len();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("  {:>width$}. {}\n", i + 1, item.as_ref()))
        .collect()
}

/// Splits comma-separated values and drops empty entries.
#[must_use]
pub fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_output_is_unchanged() {
        let mut out = Vec::new();
        write_terminated(&mut out, b"version: '3.2'\n").expect("write");
        assert_eq!(out, b"version: '3.2'\n");
    }

    #[test]
    fn missing_newline_is_added() {
        let mut out = Vec::new();
        write_terminated(&mut out, b"{}").expect("write");
        assert_eq!(out, b"{}\n");
    }

    #[test]
    fn numbered_pads_indices() {
        let items: Vec<String> = (0..10).map(|i| format!("svc{i}")).collect();
        let text = numbered(&items);
        assert!(text.starts_with("   1. svc0\n"), "got: {text}");
        assert!(text.ends_with("  10. svc9\n"), "got: {text}");
    }

    #[test]
    fn split_list_handles_commas_and_repeats() {
        let input = vec!["auth,www".to_string(), " db ".to_string(), ",".to_string()];
        assert_eq!(split_list(&input), vec!["auth", "www", "db"]);
    }
}
