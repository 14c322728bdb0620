//! Tokenizer: splits raw tokens into positional values and option occurrences.

use indexmap::IndexMap;
use std::collections::VecDeque;

use crate::error::ParseError;
use crate::model::{ParameterModel, normalize_key};

/// One appearance of an option on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occurrence {
    /// The option appeared bare, e.g. `-v` rather than `-v VALUE`.
    Absent,
    Value(String),
}

impl Occurrence {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Raw scan output, keyed by canonical parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scanned {
    pub positionals: Vec<String>,
    pub occurrences: IndexMap<String, Vec<Occurrence>>,
}

/// Left-to-right scanner over a private token queue. A scanner is built per
/// parse and consumed by [`Scanner::run`].
#[derive(Debug)]
pub struct Scanner<'m> {
    model: &'m ParameterModel,
    queue: VecDeque<String>,
    options_ended: bool,
    out: Scanned,
}

impl<'m> Scanner<'m> {
    pub fn new<I, S>(model: &'m ParameterModel, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model,
            queue: tokens.into_iter().map(Into::into).collect(),
            options_ended: false,
            out: Scanned::default(),
        }
    }

    pub fn run(mut self) -> Result<Scanned, ParseError> {
        while let Some(token) = self.queue.pop_front() {
            self.step(token)?;
        }
        Ok(self.out)
    }

    fn step(&mut self, token: String) -> Result<(), ParseError> {
        if self.options_ended || !self.is_option(&token) {
            tracing::trace!(%token, "positional");
            self.out.positionals.push(token);
            return Ok(());
        }
        if token == "--" {
            self.options_ended = true;
            return Ok(());
        }

        // `--key=value` / `-k=value`: the head names the option.
        let (head, inline) = match token.split_once('=') {
            Some((head, tail)) => (head, Some(tail.to_string())),
            None => (token.as_str(), None),
        };
        match head.strip_prefix("--") {
            Some(long) => self.long(long, inline),
            None => self.short(&head[1..], inline),
        }
    }

    fn long(&mut self, raw: &str, inline: Option<String>) -> Result<(), ParseError> {
        let model = self.model;
        let key = normalize_key(raw);
        let name = model.canonical(&key).to_string();
        let spelling = format!("--{raw}");

        if model.is_mode_flag(&name) {
            self.record(name, Occurrence::Absent);
            self.push_back(inline);
            return Ok(());
        }

        let value = inline.filter(|v| !v.is_empty()).or_else(|| self.next_value());
        self.finish(name, spelling, value)
    }

    /// `-abc`, `-mvalue`, `-m value`, `-ttcm=value`.
    fn short(&mut self, body: &str, inline: Option<String>) -> Result<(), ParseError> {
        let model = self.model;
        let chars: Vec<char> = body.chars().collect();

        for (i, &c) in chars.iter().enumerate() {
            let key = c.to_string();
            let name = model.canonical(&key).to_string();

            if model.is_mode_flag(&name) {
                self.record(name, Occurrence::Absent);
                continue;
            }
            // A counter is bundled only when another known option follows it,
            // so `-t3` still reads as `-t 3`.
            if model.is_counter(&name)
                && chars
                    .get(i + 1)
                    .is_some_and(|next| model.is_known(&next.to_string()))
            {
                self.record(name, Occurrence::Absent);
                continue;
            }

            let rest: String = chars[i + 1..].iter().collect();
            let value = if rest.is_empty() {
                inline.filter(|v| !v.is_empty()).or_else(|| self.next_value())
            } else {
                Some(match inline {
                    Some(tail) => format!("{rest}={tail}"),
                    None => rest,
                })
            };
            return self.finish(name, format!("-{c}"), value);
        }

        // Every character was a flag.
        self.push_back(inline);
        Ok(())
    }

    /// A flag never takes a value, so an `=value` tail is scanned as the
    /// next token.
    fn push_back(&mut self, inline: Option<String>) {
        if let Some(tail) = inline.filter(|v| !v.is_empty()) {
            self.queue.push_front(tail);
        }
    }

    fn finish(
        &mut self,
        name: String,
        spelling: String,
        value: Option<String>,
    ) -> Result<(), ParseError> {
        match value {
            Some(value) => self.record(name, Occurrence::Value(value)),
            None if self.model.requires_value(&name) => {
                return Err(ParseError::MissingValue { option: spelling });
            }
            None => self.record(name, Occurrence::Absent),
        }
        Ok(())
    }

    fn record(&mut self, name: String, occurrence: Occurrence) {
        tracing::trace!(%name, ?occurrence, "option");
        self.out.occurrences.entry(name).or_default().push(occurrence);
    }

    /// Pop the next token if it can serve as an option value.
    fn next_value(&mut self) -> Option<String> {
        if self.options_ended {
            return None;
        }
        let usable = self.queue.front().is_some_and(|next| !self.is_option(next));
        if usable { self.queue.pop_front() } else { None }
    }

    /// `-` alone and negative decimal numbers (unless their first digit is a
    /// known short option) are values, not options. `-inf` and `-nan` are
    /// options.
    fn is_option(&self, token: &str) -> bool {
        let Some(body) = token.strip_prefix('-') else {
            return false;
        };
        if body.is_empty() {
            return false;
        }
        let numeric = body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
            && body.parse::<f64>().is_ok()
            && !body
                .chars()
                .next()
                .is_some_and(|c| self.model.is_known(&c.to_string()));
        !numeric
    }
}
