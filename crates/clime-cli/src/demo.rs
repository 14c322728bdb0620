//! Commands exposed by the `clime` binary.

use anyhow::{Context, Result, ensure};
use clime_core::{Arguments, Command, Signature, Value};
use serde_json::json;

const HELLO_DOC: &str = "Just print Hello for you.";

const REPEAT_DOC: &str = "Repeat a message.

    Options:
        -m=<str>, --message=<str>  The message to repeat.
        -t=<int>, --times=<int>    How many times. Default is 2.
        -c, --count                Print the length instead of the text.
";

const DRAW_DOC: &str = "It draws a pyramid.

    Options:
        -s <int>, --squash=<int>  Widen each story by this much.
";

const FILES_DOC: &str = "Collect paths under an open mode.

    Options:
        -m <str>, --mode=<str>  The open mode. Default is r.
";

const ECHO_DOC: &str = "Echo positionals and options back as JSON.";

pub fn commands() -> Vec<Command> {
    vec![hello(), repeat(), draw(), files(), echo()]
}

fn hello() -> Command {
    Command::build(Signature::new("hello"), Some(HELLO_DOC), |_| {
        Ok(Value::from("Hello!"))
    })
}

fn repeat() -> Command {
    let sig = Signature::new("repeat")
        .param("message")
        .param_default("times", 2)
        .param_default("count", false);
    Command::build(sig, Some(REPEAT_DOC), run_repeat)
}

fn run_repeat(args: &Arguments) -> Result<Value> {
    let message = args
        .get("message")
        .map(Value::to_string)
        .unwrap_or_default();
    let times = args.int("times").context("times must be an integer")?;
    let times = usize::try_from(times).context("times must not be negative")?;
    let text = message.repeat(times);
    if args.bool("count").unwrap_or(false) {
        return Ok(Value::Int(text.chars().count() as i64));
    }
    Ok(Value::Str(text))
}

fn draw() -> Command {
    let sig = Signature::new("draw")
        .param("story")
        .param_default("squash", 1);
    Command::build(sig, Some(DRAW_DOC), run_draw)
}

fn run_draw(args: &Arguments) -> Result<Value> {
    let story = args.int("story").context("story must be an integer")?;
    let squash = args.int("squash").context("squash must be an integer")?;
    ensure!(story >= 1, "story must be at least 1, got {story}");
    ensure!(squash >= 1, "squash must be at least 1, got {squash}");

    let story = usize::try_from(story)?;
    let squash = usize::try_from(squash)?;
    let ground = 1 + (story - 1) * squash * 2;
    let rows: Vec<String> = (1..=ground)
        .step_by(squash * 2)
        .map(|width| format!("{:^ground$}", "*".repeat(width)).trim_end().to_string())
        .collect();
    Ok(Value::Str(rows.join("\n")))
}

fn files() -> Command {
    let sig = Signature::new("files")
        .param_default("mode", "r")
        .vararg("paths");
    Command::build(sig, Some(FILES_DOC), |args| {
        Ok(Value::Json(json!({
            "mode": args.get("mode"),
            "paths": args.varargs(),
        })))
    })
}

fn echo() -> Command {
    let sig = Signature::new("echo").vararg("args").kwarg("kwargs");
    Command::build(sig, Some(ECHO_DOC), |args| {
        Ok(Value::Json(json!({
            "args": args.varargs(),
            "kwargs": args.kwargs(),
        })))
    })
}
