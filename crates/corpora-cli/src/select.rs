//! Interactive dataset selection.

use anyhow::Context;
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};

use corpora_core::DatasetRegistry;

use crate::error::{CliError, CliResult};

/// Prompts on the terminal until a registered dataset is chosen.
///
/// Refuses to prompt when stdin is not a terminal.
pub fn pick_dataset(registry: &DatasetRegistry) -> CliResult<String> {
    if !io::stdin().is_terminal() {
        return Err(CliError::usage(
            "no dataset given and stdin is not a terminal",
            "pass --dataset <NAME>",
        ));
    }

    let stdin = io::stdin();
    prompt_loop(registry, &mut stdin.lock(), &mut io::stderr())
}

fn prompt_loop(
    registry: &DatasetRegistry,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> CliResult<String> {
    writeln!(out, "Available datasets:").context("failed to write prompt")?;
    for (i, descriptor) in registry.iter().enumerate() {
        writeln!(
            out,
            "  {}. {}  ({})",
            i + 1,
            descriptor.name.bold(),
            descriptor.file_path.display()
        )
        .context("failed to write prompt")?;
    }

    loop {
        write!(out, "Select a dataset [1-{}]: ", registry.names().len())
            .context("failed to write prompt")?;
        out.flush().context("failed to write prompt")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("failed to read selection")?;
        if read == 0 {
            return Err(CliError::usage(
                "no dataset selected",
                "pass --dataset <NAME>",
            ));
        }

        match parse_choice(registry, &line) {
            Some(name) => return Ok(name),
            None => writeln!(
                out,
                "{} '{}' is not a listed number or name",
                "invalid:".yellow(),
                line.trim()
            )
            .context("failed to write prompt")?,
        }
    }
}

/// Interprets `input` as a 1-based list number or a dataset name.
pub fn parse_choice(registry: &DatasetRegistry, input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(n) = input.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| registry.iter().nth(i))
            .map(|d| d.name.clone());
    }
    registry.get(input).map(|d| d.name.clone())
}
