use inquire::error::InquireError;
use inquire::{Confirm, Select, Text};
use tracing::debug;

use crate::error::{Result, ScriptsError};

/// Everything the app asks the user goes through here.
pub trait Prompter {
    /// Pick one of `options`. `None` means the user backed out (Esc).
    fn select(&self, message: &str, options: &[String], default: Option<usize>)
        -> Result<Option<usize>>;

    /// One line of free text, possibly empty.
    fn text(&self, message: &str) -> Result<String>;

    fn confirm(&self, message: &str) -> Result<bool>;

    /// Free text, trimmed. When `required`, blank answers are rejected and asked again.
    fn input(&self, message: &str, required: bool) -> Result<String> {
        loop {
            let value = self.text(message)?.trim().to_string();
            if !required || !value.is_empty() {
                return Ok(value);
            }
            println!("A value is required.");
        }
    }
}

fn prompt_error(e: InquireError) -> ScriptsError {
    ScriptsError::Prompt(e.to_string())
}

/// Interactive prompts on the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<usize>,
    ) -> Result<Option<usize>> {
        let cursor = default.filter(|i| *i < options.len()).unwrap_or(0);
        match Select::new(message, options.to_vec())
            .with_starting_cursor(cursor)
            .raw_prompt()
        {
            Ok(choice) => Ok(Some(choice.index)),
            Err(InquireError::OperationCanceled) => {
                debug!(message, "Selection cancelled");
                Ok(None)
            }
            Err(e) => Err(prompt_error(e)),
        }
    }

    fn text(&self, message: &str) -> Result<String> {
        match Text::new(message).prompt() {
            Ok(value) => Ok(value),
            Err(InquireError::OperationCanceled) => Ok(String::new()),
            Err(e) => Err(prompt_error(e)),
        }
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        match Confirm::new(message).with_default(false).prompt() {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled) => Ok(false),
            Err(e) => Err(prompt_error(e)),
        }
    }
}

/// Replays canned answers in order. Running out of answers is a prompt error.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: std::cell::RefCell<std::collections::VecDeque<Answer>>,
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) enum Answer {
    /// Select the option with this label
    Pick(String),
    Cancel,
    Text(String),
    Yes,
    No,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pick(self, label: &str) -> Self {
        self.push(Answer::Pick(label.to_string()))
    }

    pub(crate) fn cancel(self) -> Self {
        self.push(Answer::Cancel)
    }

    pub(crate) fn text(self, value: &str) -> Self {
        self.push(Answer::Text(value.to_string()))
    }

    pub(crate) fn yes(self) -> Self {
        self.push(Answer::Yes)
    }

    pub(crate) fn no(self) -> Self {
        self.push(Answer::No)
    }

    fn push(self, answer: Answer) -> Self {
        self.answers.borrow_mut().push_back(answer);
        self
    }

    pub(crate) fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, message: &str) -> Result<Answer> {
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ScriptsError::Prompt(format!("no scripted answer for '{message}'")))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn select(
        &self,
        message: &str,
        options: &[String],
        _default: Option<usize>,
    ) -> Result<Option<usize>> {
        match self.next(message)? {
            Answer::Pick(label) => options
                .iter()
                .position(|o| *o == label)
                .map(Some)
                .ok_or_else(|| {
                    ScriptsError::Prompt(format!("'{label}' is not an option of '{message}'"))
                }),
            Answer::Cancel => Ok(None),
            other => Err(ScriptsError::Prompt(format!(
                "expected a selection for '{message}', got {other:?}"
            ))),
        }
    }

    fn text(&self, message: &str) -> Result<String> {
        match self.next(message)? {
            Answer::Text(value) => Ok(value),
            other => Err(ScriptsError::Prompt(format!(
                "expected text for '{message}', got {other:?}"
            ))),
        }
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        match self.next(message)? {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => Err(ScriptsError::Prompt(format!(
                "expected yes/no for '{message}', got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_input_asks_again_on_blank() {
        let prompter = ScriptedPrompter::new().text("  ").text("").text(" name ");
        assert_eq!(prompter.input("Name?", true).unwrap(), "name");
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_optional_input_accepts_blank() {
        let prompter = ScriptedPrompter::new().text("   ");
        assert_eq!(prompter.input("Schedule?", false).unwrap(), "");
    }

    #[test]
    fn test_scripted_select_by_label() {
        let options = vec!["a".to_string(), "b".to_string()];
        let prompter = ScriptedPrompter::new().pick("b").cancel();
        assert_eq!(prompter.select("?", &options, None).unwrap(), Some(1));
        assert_eq!(prompter.select("?", &options, None).unwrap(), None);
    }

    #[test]
    fn test_scripted_prompter_runs_out() {
        let prompter = ScriptedPrompter::new();
        assert!(matches!(prompter.confirm("?"), Err(ScriptsError::Prompt(_))));
    }
}
