//! Blocking confirmation and selection prompts.

use std::io::{self, BufRead, Write};

/// Interactive questions asked while running a command.
pub trait Prompt {
    /// Ask a yes/no question. Anything but an explicit yes declines.
    fn confirm(&mut self, message: &str) -> io::Result<bool>;

    /// Ask the user to pick one of `choices`, returning its index, or `None`
    /// if input ended before a valid choice was made.
    fn select(&mut self, message: &str, choices: &[&str]) -> io::Result<Option<usize>>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        (**self).confirm(message)
    }

    fn select(&mut self, message: &str, choices: &[&str]) -> io::Result<Option<usize>> {
        (**self).select(message, choices)
    }
}

/// Prompts read line by line from `input`, with questions written to `output`.
#[derive(Debug)]
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stdin, writing questions to stderr so stdout stays clean.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R, W> TerminalPrompt<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }
}

impl<R, W> Prompt for TerminalPrompt<R, W>
where
    R: BufRead,
    W: Write,
{
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        write!(self.output, "{message} [y/N]: ")?;
        self.output.flush()?;

        let answer = self.read_line()?.unwrap_or_default().to_ascii_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes"))
    }

    fn select(&mut self, message: &str, choices: &[&str]) -> io::Result<Option<usize>> {
        writeln!(self.output, "{message}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {choice}", i + 1)?;
        }

        loop {
            write!(self.output, "Select [1-{}]: ", choices.len())?;
            self.output.flush()?;

            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };

            if let Some(index) = parse_selection(&answer, choices) {
                return Ok(Some(index));
            }
            writeln!(self.output, "'{answer}' is not a valid choice.")?;
        }
    }
}

/// Accept either a 1-based position or the (case-insensitive) choice itself.
fn parse_selection(answer: &str, choices: &[&str]) -> Option<usize> {
    if let Ok(n) = answer.parse::<usize>() {
        return (1..=choices.len()).contains(&n).then(|| n - 1);
    }
    choices
        .iter()
        .position(|choice| choice.eq_ignore_ascii_case(answer))
}
