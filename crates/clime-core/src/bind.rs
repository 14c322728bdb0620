//! Reducer/binder: collapses option occurrences into final values, merges
//! defaults, applies keyword-first placement and casts positionals.

use indexmap::IndexMap;

use crate::cast::Caster;
use crate::error::ParseError;
use crate::model::ParameterModel;
use crate::scan::{Occurrence, Scanned};
use crate::value::Value;

/// Result of parsing: the values a command will be called with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed {
    pub positionals: Vec<Value>,
    pub keywords: IndexMap<String, Value>,
}

impl Parsed {
    pub fn into_parts(self) -> (Vec<Value>, IndexMap<String, Value>) {
        (self.positionals, self.keywords)
    }
}

/// A positional slot: either a raw token still to be cast, or a value that
/// was placed there by keyword-first resolution.
#[derive(Debug)]
enum Slot {
    Raw(String),
    Ready(Value),
}

pub fn bind(model: &ParameterModel, scanned: Scanned) -> Result<Parsed, ParseError> {
    let mut keywords = IndexMap::new();
    for (name, occurrences) in scanned.occurrences {
        let value = reduce(model, &name, &occurrences)?;
        tracing::trace!(%name, %value, n = occurrences.len(), "reduced");
        keywords.insert(name, value);
    }

    for (name, default) in model.defaults() {
        if !keywords.contains_key(name) {
            keywords.insert(name.clone(), default.clone());
        }
    }

    let mut slots: Vec<Slot> = scanned.positionals.into_iter().map(Slot::Raw).collect();

    // Keyword-first: a keyword claims the slot of its parameter and pushes
    // literal positionals to the right.
    for (pos, name) in model.names().iter().enumerate() {
        if pos >= slots.len() && !model.positional_only() {
            continue;
        }
        if let Some(value) = keywords.shift_remove(name) {
            slots.insert(pos.min(slots.len()), Slot::Ready(value));
        }
    }

    let names = model.names();
    let positionals = slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| match slot {
            Slot::Ready(value) => Ok(value),
            Slot::Raw(raw) => match names.get(i).map(String::as_str).or(model.vararg()) {
                Some(name) => model.caster(name).cast(name, &raw),
                // Overflow with nowhere to go; binding reports it.
                None => Ok(Value::Str(raw)),
            },
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Parsed {
        positionals,
        keywords,
    })
}

/// Toggle, count, or last-wins.
fn reduce(
    model: &ParameterModel,
    name: &str,
    occurrences: &[Occurrence],
) -> Result<Value, ParseError> {
    let default = model.default(name);
    if let Some(Value::Bool(b)) = default {
        return Ok(Value::Bool(!b));
    }

    match occurrences.iter().rev().find_map(|o| match o {
        Occurrence::Value(v) => Some(v),
        Occurrence::Absent => None,
    }) {
        Some(raw) => cast_option(model, name, raw),
        None if matches!(default, Some(Value::Int(_))) => Ok(Value::Int(occurrences.len() as i64)),
        None => Ok(Value::None),
    }
}

fn cast_option(model: &ParameterModel, name: &str, raw: &str) -> Result<Value, ParseError> {
    let caster = match model.caster(name) {
        // Undocumented keys collected by a catch-all use its metavar, if any.
        Caster::Auto if !model.is_known(name) => {
            model.kwarg().map_or(Caster::Auto, |k| model.caster(k))
        }
        caster => caster,
    };
    caster.cast(name, raw)
}
