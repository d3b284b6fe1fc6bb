//! Scripted runner and prompter used by unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

use crate::error::{Result, ShipError};
use crate::prompt::Prompter;
use crate::runner::{display_command, CommandOutput, CommandRunner};

#[derive(Debug, Clone)]
pub enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    SpawnError,
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Reply::Exit {
            code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        Reply::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

struct Rule {
    prefix: String,
    replies: VecDeque<Reply>,
}

/// Answers commands by prefix match on the displayed command line
/// (`firebase projects:list --json`). Each rule replays its replies in order
/// and repeats the last one. Unmatched commands exit 0 with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, prefix: &str, replies: Vec<Reply>) -> Self {
        self.rules.borrow_mut().push(Rule {
            prefix: prefix.to_string(),
            replies: replies.into(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn answer(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let line = display_command(program, args);
        self.calls.borrow_mut().push(line.clone());
        let mut rules = self.rules.borrow_mut();
        let reply = rules
            .iter_mut()
            .find(|r| line.starts_with(&r.prefix))
            .and_then(|r| {
                if r.replies.len() > 1 {
                    r.replies.pop_front()
                } else {
                    r.replies.front().cloned()
                }
            });
        match reply {
            None => Ok(CommandOutput::default()),
            Some(Reply::Exit {
                code,
                stdout,
                stderr,
            }) => Ok(CommandOutput {
                code,
                stdout,
                stderr,
            }),
            Some(Reply::SpawnError) => Err(ShipError::Spawn {
                program: program.to_string(),
                reason: "not found".into(),
            }),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandOutput> {
        self.answer(program, args)
    }

    fn run_interactive(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandOutput> {
        self.answer(program, args)
    }
}

/// Replays queued answers. `None` in the script means "pressed enter", which
/// yields the default. An exhausted script behaves like a closed stdin.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Option<String>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[Option<&str>]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, message: &str, default: Option<&str>) -> Option<String> {
        self.prompts.borrow_mut().push(message.to_string());
        let answer = self.answers.borrow_mut().pop_front()?;
        match answer {
            Some(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => default.map(str::to_string),
        }
    }
}
