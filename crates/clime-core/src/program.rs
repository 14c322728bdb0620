//! Multi-command dispatcher.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::command::{Command, RawArgs};
use crate::error::Error;
use crate::value::Value;

const HELP: &str = "--help";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProgramOptions {
    /// Shown in error messages and the usage text.
    pub name: String,
    /// Command run when the first token names no command.
    pub default: Option<String>,
    /// When set, only these commands are registered.
    pub white_list: Option<Vec<String>>,
    pub black_list: Vec<String>,
    /// Treat `--help` as an ordinary token.
    pub ignore_help: bool,
    /// Report failures with their full cause chain.
    pub debug: bool,
    /// Program-level text printed under the usage lines.
    pub doc: Option<String>,
}

/// What a dispatch produced. The caller decides how to print it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(Value),
    Usage(String),
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    options: ProgramOptions,
    commands: IndexMap<String, Command>,
}

impl Program {
    pub fn new(options: ProgramOptions) -> Self {
        Self {
            options,
            commands: IndexMap::new(),
        }
    }

    pub fn with(mut self, command: Command) -> Self {
        self.register(command);
        self
    }

    /// Add `command` unless its name is private (leading `_`) or filtered out
    /// by the white or black list. Returns whether it was added.
    pub fn register(&mut self, command: Command) -> bool {
        let name = command.name();
        let allowed = !name.starts_with('_')
            && self
                .options
                .white_list
                .as_ref()
                .is_none_or(|white| white.iter().any(|w| w == name))
            && !self.options.black_list.iter().any(|b| b == name);
        if !allowed {
            tracing::debug!(command = %name, "command filtered out");
            return false;
        }
        self.commands.insert(name.to_string(), command);
        true
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// The configured default command, or the only command when exactly one
    /// is registered.
    pub fn default_command(&self) -> Option<&Command> {
        if self.commands.len() == 1 {
            return self.commands.values().next();
        }
        let name = self.options.default.as_deref()?;
        let found = self.commands.get(name);
        if found.is_none() {
            tracing::warn!(command = %name, "default command is not registered");
        }
        found
    }

    /// Select a command from the first token and run it with the rest.
    pub fn dispatch(&self, raw: impl Into<RawArgs>) -> Result<Outcome, Error> {
        let mut tokens = raw.into().into_tokens();
        let help = !self.options.ignore_help;

        if help && tokens.first().is_some_and(|t| t == HELP) {
            return Ok(Outcome::Usage(self.usage(None)));
        }

        let named = tokens
            .first()
            .and_then(|first| self.commands.get(first.as_str()));
        let (selected, command) = match named {
            Some(command) => {
                tokens.remove(0);
                (Some(command.name()), command)
            }
            None => match self.default_command() {
                Some(command) => (None, command),
                None => {
                    tracing::debug!("no command selected");
                    return Ok(Outcome::Usage(self.usage(None)));
                }
            },
        };

        if help && tokens.iter().any(|t| t == HELP) {
            return Ok(Outcome::Usage(self.usage(selected)));
        }

        tracing::debug!(command = %command.name(), named = selected.is_some(), "dispatch");
        command.execute(tokens).map(Outcome::Value)
    }

    /// `usage: ...` / `   or: ...` lines, then the description if any.
    ///
    /// Without `command`, every command is listed (the default one first and
    /// without its name) followed by the program's own text.
    pub fn usage(&self, command: Option<&str>) -> String {
        let default = self.default_command().map(Command::name);
        let mut lines = Vec::new();

        let doc = match command.and_then(|name| self.commands.get(name)) {
            Some(cmd) => {
                if default == Some(cmd.name()) {
                    lines.push(cmd.build_usage(true));
                }
                lines.push(cmd.build_usage(false));
                cmd.description()
            }
            None => {
                if let Some(cmd) = self.default_command() {
                    lines.push(cmd.build_usage(true));
                }
                let mut names: Vec<&String> = self.commands.keys().collect();
                names.sort();
                lines.extend(names.into_iter().map(|n| self.commands[n].build_usage(false)));
                self.options.doc.as_deref()
            }
        };

        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            let label = if i == 0 { "usage:" } else { "   or:" };
            out.push_str(label);
            if !line.is_empty() {
                out.push(' ');
                out.push_str(line);
            }
            out.push('\n');
        }
        if lines.is_empty() {
            out.push_str(&format!("usage: {}\n", self.name()));
        }
        if let Some(doc) = doc.map(dedent).filter(|d| !d.is_empty()) {
            out.push('\n');
            out.push_str(&doc);
            out.push('\n');
        }
        out
    }
}

/// Strip the indentation shared by every line after the first, and
/// surrounding blank lines.
fn dedent(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default().trim();
    let rest: Vec<&str> = lines.collect();
    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = vec![first];
    out.extend(rest.iter().map(|l| l.get(indent..).unwrap_or("").trim_end()));
    out.join("\n").trim_matches('\n').to_string()
}
