//! Interactive input.
//!
//! The pipeline asks questions through [`InputProvider`]; the terminal
//! implementation reads stdin, tests script the answers.
use anyhow::{anyhow, Context, Result};
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};

/// Source of answers to interactive questions.
pub trait InputProvider {
    /// Show `question` and return one line of input without its newline.
    /// End of input is an error.
    fn read_line(&mut self, question: &str) -> Result<String>;
}

/// Reads answers from the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputProvider for TerminalInput {
    fn read_line(&mut self, question: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{} ", question.bold()).context("write prompt")?;
        stdout.flush().context("flush prompt")?;
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read answer from stdin")?;
        if read == 0 {
            return Err(anyhow!("input closed while waiting for: {question}"));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Ask a question, returning the trimmed answer.
pub fn ask(input: &mut dyn InputProvider, question: &str) -> Result<String> {
    Ok(input.read_line(question)?.trim().to_string())
}

/// Ask a question with a default used when the answer is blank.
pub fn ask_with_default(
    input: &mut dyn InputProvider,
    question: &str,
    default: &str,
) -> Result<String> {
    let answer = ask(input, &format!("{question} [{default}]:"))?;
    if answer.is_empty() {
        return Ok(default.to_string());
    }
    Ok(answer)
}

/// Ask until a non-blank answer is given.
pub fn ask_required(input: &mut dyn InputProvider, question: &str) -> Result<String> {
    loop {
        let answer = ask(input, question)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        crate::output::warn("a value is required");
    }
}

/// Yes/no question. A blank answer counts as yes.
pub fn confirm(input: &mut dyn InputProvider, question: &str) -> Result<bool> {
    let answer = ask(input, &format!("{question} [Y/n]:"))?;
    Ok(is_affirmative(&answer))
}

/// Block until the user presses Enter.
pub fn pause(input: &mut dyn InputProvider, message: &str) -> Result<()> {
    input.read_line(&format!("{message} (press Enter to continue)"))?;
    Ok(())
}

/// Interpret a confirmation answer; empty or whitespace is default-accept.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.is_empty() || answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedInput;
    use super::*;

    #[test]
    fn blank_confirmation_is_yes() {
        assert!(is_affirmative(""));
        assert!(is_affirmative("   "));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("yes"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("nope"));
    }

    #[test]
    fn ask_with_default_falls_back() {
        let mut input = ScriptedInput::new(&["", "custom"]);
        assert_eq!(ask_with_default(&mut input, "Desc", "dflt").expect("ask"), "dflt");
        assert_eq!(ask_with_default(&mut input, "Desc", "dflt").expect("ask"), "custom");
        assert_eq!(input.questions[0], "Desc [dflt]:");
    }

    #[test]
    fn ask_required_reprompts_on_blank() {
        let mut input = ScriptedInput::new(&["", "  ", "value"]);
        assert_eq!(ask_required(&mut input, "Name:").expect("ask"), "value");
        assert_eq!(input.questions.len(), 3);
    }

    #[test]
    fn exhausted_input_is_an_error() {
        let mut input = ScriptedInput::new(&[]);
        assert!(confirm(&mut input, "Continue?").is_err());
    }
}
