use dialoguer::{theme::ColorfulTheme, Input};
use shipwright_core::prompt::Prompter;
use std::io::IsTerminal;

/// Reads answers from the terminal. Without a terminal on stdin it never
/// answers, so unattended runs fall through to "no selection".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn prompt(&self, message: &str, default: Option<&str>) -> Option<String> {
        if !std::io::stdin().is_terminal() {
            return None;
        }

        // Menus arrive as several lines; only the last one is the question.
        let question = match message.rsplit_once('\n') {
            Some((preamble, question)) => {
                eprintln!("{preamble}");
                question
            }
            None => message,
        };

        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(question)
            .allow_empty(true);
        if let Some(default_val) = default {
            input = input.default(default_val.to_string());
        }

        match input.interact_text() {
            Ok(answer) if !answer.trim().is_empty() => Some(answer.trim().to_string()),
            Ok(_) => default.map(str::to_string),
            Err(e) => {
                tracing::debug!(error = %e, "prompt aborted");
                None
            }
        }
    }
}
