//! The command facade: a callable plus its parameter model.

use std::fmt;
use std::sync::Arc;

use crate::bind::{self, Parsed};
use crate::error::{Error, ParseError, Result};
use crate::model::ParameterModel;
use crate::scan::Scanner;
use crate::signature::{Arguments, Signature};
use crate::usage;
use crate::value::Value;

/// The wrapped function. It receives arguments already bound to its signature.
pub type Callable = Arc<dyn Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync>;

/// Raw command-line input: a single line split on whitespace, or tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArgs {
    Line(String),
    Tokens(Vec<String>),
}

impl RawArgs {
    pub fn into_tokens(self) -> Vec<String> {
        match self {
            Self::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            Self::Tokens(tokens) => tokens,
        }
    }
}

impl From<&str> for RawArgs {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for RawArgs {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<Vec<String>> for RawArgs {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<&[String]> for RawArgs {
    fn from(tokens: &[String]) -> Self {
        Self::Tokens(tokens.to_vec())
    }
}

impl From<Vec<&str>> for RawArgs {
    fn from(tokens: Vec<&str>) -> Self {
        Self::Tokens(tokens.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RawArgs {
    fn from(tokens: &[&str]) -> Self {
        Self::Tokens(tokens.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RawArgs {
    fn from(tokens: [&str; N]) -> Self {
        Self::Tokens(tokens.into_iter().map(str::to_string).collect())
    }
}

#[derive(Clone)]
pub struct Command {
    signature: Signature,
    description: Option<String>,
    model: ParameterModel,
    func: Callable,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("signature", &self.signature)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Wrap `func`. Never fails: a missing or malformed description simply
    /// yields no aliases or metavars.
    pub fn build<F>(signature: Signature, description: Option<&str>, func: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        if let Err(err) = signature.validate() {
            tracing::warn!(command = %signature.name, %err, "invalid signature");
        }
        let model = ParameterModel::new(&signature, description);
        Self {
            signature,
            description: description.map(str::to_string),
            model,
            func: Arc::new(func),
        }
    }

    /// Like [`Command::build`], but rejects an invalid signature or a
    /// description line that names more than one parameter.
    pub fn try_build<F>(signature: Signature, description: Option<&str>, func: F) -> Result<Self>
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        signature.validate()?;
        let model = ParameterModel::try_new(&signature, description)?;
        Ok(Self {
            signature,
            description: description.map(str::to_string),
            model,
            func: Arc::new(func),
        })
    }

    /// Wrap a callable whose only introspectable trait is its description,
    /// whose first line reads like `name(x, y[, z])`.
    pub fn from_doc<F>(name: &str, description: &str, func: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let signature = Signature::from_doc_line(name, description);
        Self::build(signature, Some(description), func)
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn model(&self) -> &ParameterModel {
        &self.model
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Scan and bind `raw` into positional and keyword values.
    pub fn parse(&self, raw: impl Into<RawArgs>) -> Result<Parsed, ParseError> {
        let tokens = raw.into().into_tokens();
        tracing::trace!(command = %self.name(), ?tokens, "parse");
        let scanned = Scanner::new(&self.model, tokens).run()?;
        bind::bind(&self.model, scanned)
    }

    /// Parse `raw` and call the wrapped function with the result.
    pub fn execute(&self, raw: impl Into<RawArgs>) -> Result<Value> {
        let (positionals, keywords) = self.parse(raw)?.into_parts();
        let args = self.signature.bind(positionals, keywords)?;
        tracing::debug!(command = %self.name(), "execute");
        (self.func)(&args).map_err(Error::Failed)
    }

    pub fn build_usage(&self, without_name: bool) -> String {
        usage::render(&self.model, (!without_name).then_some(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use crate::error::{InvokeError, SignatureError};

    const REPEAT_DOC: &str = "It repeats the message.

    options:
        -m=<str>, --message=<str>  The message.
        -t=<int>, --times=<int>
        -c, --count
    ";

    fn repeat() -> Command {
        let sig = Signature::new("repeat")
            .param("message")
            .param_default("times", 2)
            .param_default("count", false);
        Command::build(sig, Some(REPEAT_DOC), |args| {
            let message = args.get("message").map(Value::to_string).unwrap_or_default();
            let times = args.int("times").context("times must be an integer")?;
            let s = message.repeat(usize::try_from(times).unwrap_or(0));
            if args.bool("count").unwrap_or(false) {
                Ok(Value::Int(s.chars().count() as i64))
            } else {
                Ok(Value::Str(s))
            }
        })
    }

    fn files() -> Command {
        let sig = Signature::new("files").param_default("mode", "r").vararg("paths");
        Command::build(sig, None, |args| {
            let paths: Vec<String> = args.varargs().iter().map(Value::to_string).collect();
            let mode = args.str("mode").unwrap_or_default();
            Ok(Value::Str(format!("{mode} {}", paths.join(","))))
        })
    }

    #[test]
    fn parse_accepts_lines_and_tokens() {
        let cmd = repeat();
        let from_line = cmd.parse("Hi! -t 3").unwrap();
        let from_tokens = cmd.parse(["Hi!", "-t", "3"]).unwrap();
        assert_eq!(from_line, from_tokens);
        assert_eq!(from_line.keywords["times"], Value::Int(3));
    }

    #[test]
    fn execute_runs_callable() {
        let cmd = repeat();
        assert_eq!(cmd.execute("Hi!").unwrap(), Value::from("Hi!Hi!"));
        assert_eq!(cmd.execute("Hi! -t 3").unwrap(), Value::from("Hi!Hi!Hi!"));
        assert_eq!(cmd.execute("-ttcttmHi!").unwrap(), Value::Int(12));
        assert_eq!(cmd.execute("--times=1 --message hey").unwrap(), Value::from("hey"));
    }

    #[test]
    fn flag_with_equals_value_still_toggles() {
        let parsed = repeat().parse("--count=yes Hi!").unwrap();
        assert_eq!(parsed.positionals[0], Value::from("yes"));
        assert_eq!(parsed.positionals[2], Value::Bool(true));
        assert_eq!(parsed.positionals[3], Value::from("Hi!"));

        assert_eq!(repeat().execute("Hi! -c=").unwrap(), Value::Int(6));
    }

    #[test]
    fn keyword_first_through_execute() {
        let cmd = files();
        assert_eq!(cmd.execute("--mode w f1.txt f2.txt").unwrap(), Value::from("w f1.txt,f2.txt"));
        assert_eq!(cmd.execute("f1.txt").unwrap(), Value::from("r f1.txt"));
    }

    #[test]
    fn missing_required_is_an_invoke_error() {
        let err = repeat().execute("-t 3").unwrap_err();
        match err {
            Error::Invoke(InvokeError::MissingArgument { name }) => assert_eq!(name, "message"),
            other => panic!("expected MissingArgument, got: {other:?}"),
        }
    }

    #[test]
    fn scan_and_cast_errors_propagate() {
        let err = repeat().execute("-m").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::MissingValue { .. })), "{err:?}");

        let err = repeat().execute("Hi! -t many").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InvalidValue { .. })), "{err:?}");
        assert_eq!(err.to_string(), "option 'times' must be int, got 'many'");
    }

    #[test]
    fn unknown_option_goes_to_catch_all_or_fails_at_invocation() {
        let sig = Signature::new("echo").vararg("args").kwarg("opts");
        let echo = Command::build(sig, None, |args| Ok(Value::Int(args.kwargs().len() as i64)));
        assert_eq!(echo.execute("--bogus=1 a b").unwrap(), Value::Int(1));

        let err = repeat().execute("Hi! --bogus=1").unwrap_err();
        assert!(matches!(err, Error::Invoke(InvokeError::UnexpectedKeyword { .. })), "{err:?}");
    }

    #[test]
    fn callable_errors_are_wrapped() {
        let sig = Signature::new("fail");
        let cmd = Command::build(sig, None, |_| anyhow::bail!("boom"));
        let err = cmd.execute("").unwrap_err();
        assert!(matches!(err, Error::Failed(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn try_build_validates() {
        let sig = Signature::new("f").param_default("a", 0).param_default("b", 0);
        let noop = |_: &Arguments| -> anyhow::Result<Value> { Ok(Value::None) };
        assert!(Command::try_build(sig.clone(), Some("-x, --a, --b"), noop).is_err());
        assert!(Command::try_build(sig, Some("-x, --a\n-y, --b"), noop).is_ok());

        let bad = Signature::new("f").param_default("a", 0).param("b");
        let err = Command::try_build(bad, None, |_| Ok(Value::None)).unwrap_err();
        assert!(
            matches!(err, Error::Signature(SignatureError::RequiredAfterDefault { .. })),
            "{err:?}"
        );
    }

    #[test]
    fn from_doc_builds_positional_only_command() {
        let cmd = Command::from_doc("pow", "pow(x, y[, z])\n\nRaise x to y.", |args| {
            let x = args.int("x").context("x must be an integer")?;
            let y = args.int("y").context("y must be an integer")?;
            Ok(Value::Int(x.pow(u32::try_from(y)?)))
        });
        assert_eq!(cmd.execute("2 10").unwrap(), Value::Int(1024));
        assert_eq!(cmd.build_usage(false), "pow [-z] <x> <y>");
    }

    #[test]
    fn usage_with_and_without_name() {
        let cmd = repeat();
        assert_eq!(
            cmd.build_usage(false),
            "repeat [-t<int> | --times=<int>] [-c | --count] <message>"
        );
        assert!(!cmd.build_usage(true).starts_with("repeat"));
    }

    #[test]
    fn command_is_shareable_across_threads() {
        let cmd = Arc::new(repeat());
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let cmd = Arc::clone(&cmd);
                std::thread::spawn(move || cmd.execute(format!("x -t {n}")).unwrap())
            })
            .collect();
        for (n, h) in (1..=4).zip(handles) {
            assert_eq!(h.join().unwrap(), Value::Str("x".repeat(n)));
        }
    }
}
