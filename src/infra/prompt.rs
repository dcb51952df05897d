use crate::domain::Prompter;
use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};

/// Prompts on stderr and reads answers line by line from stdin
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        read_input(&mut io::stdin().lock(), &mut io::stderr(), message, default)
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        let answer = ask(
            &mut io::stdin().lock(),
            &mut io::stderr(),
            &format!("{message} [y/N]: "),
        )?;
        Ok(parse_confirmation(&answer))
    }
}

/// Without a default the answer is required: empty lines are asked again
fn read_input<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
    default: Option<&str>,
) -> Result<String> {
    let prompt = match default {
        Some(default) => format!("{message} [{default}]: "),
        None => format!("{message}: "),
    };

    loop {
        let answer = ask(reader, writer, &prompt)?;

        match default {
            Some(default) if answer.is_empty() => return Ok(default.to_string()),
            None if answer.is_empty() => {
                writeln!(writer, "{message} is required").context("writing prompt")?;
            }
            _ => return Ok(answer),
        }
    }
}

fn ask<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, prompt: &str) -> Result<String> {
    write!(writer, "{prompt}").context("writing prompt")?;
    writer.flush().context("writing prompt")?;

    let mut line = String::new();
    let read = reader.read_line(&mut line).context("reading answer")?;

    if read == 0 {
        bail!("No input available for prompt: {}", prompt.trim_end());
    }

    Ok(line.trim().to_string())
}

fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}
