use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::Path;

use clap::ValueEnum;
use colored::Colorize;
use derive_more::Display;

/// Decides whether a root path whose parent is also missing may be created.
pub trait ConfirmationPolicy {
    fn confirm_create(&mut self, path: &Path) -> io::Result<bool>;
}

/// Creates missing roots without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCreate;

impl ConfirmationPolicy for AlwaysCreate {
    fn confirm_create(&mut self, _path: &Path) -> io::Result<bool> {
        Ok(true)
    }
}

/// Never creates missing roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAbort;

impl ConfirmationPolicy for AlwaysAbort {
    fn confirm_create(&mut self, _path: &Path) -> io::Result<bool> {
        Ok(false)
    }
}

/// Prompts an operator on `output` and reads a `y`/`n` answer from `input`.
/// Anything other than `y` or `yes` declines, including end of input.
pub struct AskOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> AskOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl AskOperator<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmationPolicy for AskOperator<R, W> {
    fn confirm_create(&mut self, path: &Path) -> io::Result<bool> {
        write!(
            self.output,
            "{} {} doesn't exist and neither does its parent. Create it with `mkdir -p`? (y/n) ",
            "?".yellow().bold(),
            path.display()
        )?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Selectable form of the confirmation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
pub enum MissingRootPolicy {
    #[default]
    #[display("ask")]
    Ask,
    #[display("always-create")]
    AlwaysCreate,
    #[display("always-abort")]
    AlwaysAbort,
}

impl MissingRootPolicy {
    pub fn into_policy(self) -> Box<dyn ConfirmationPolicy> {
        match self {
            MissingRootPolicy::Ask => Box::new(AskOperator::stdio()),
            MissingRootPolicy::AlwaysCreate => Box::new(AlwaysCreate),
            MissingRootPolicy::AlwaysAbort => Box::new(AlwaysAbort),
        }
    }
}
