//! The static parameter model of a command: names, defaults, mode-flags, and
//! the aliases and metavars mined from the description text.

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::cast::Caster;
use crate::error::SignatureError;
use crate::signature::Signature;
use crate::value::Value;

/// Matches one option spelling inside the option part of a description line:
/// `-m`, `-m=<str>`, `-s <int>`, `--dry-run`, `--times=<int>`, with an
/// optional trailing comma.
fn option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"-(?:-(?P<long>[^\s,=-][^\s,=]*)|(?P<short>[^\s,=-]))",
            r"(?:[= ](?P<meta>[^\s,\-][^\s,]*))?,?",
        ))
        .expect("option pattern is valid")
    })
}

/// Long spellings use `-` where parameter names use `_`.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.replace('-', "_")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterModel {
    names: Vec<String>,
    vararg: Option<String>,
    kwarg: Option<String>,
    positional_only: bool,
    defaults: IndexMap<String, Value>,
    mode_flags: IndexSet<String>,
    meta_of: HashMap<String, String>,
    alias_of: IndexMap<String, String>,
}

impl ParameterModel {
    /// Build the model, resolving lines that name several parameters to the
    /// first one.
    pub fn new(signature: &Signature, description: Option<&str>) -> Self {
        match Self::build(signature, description, false) {
            Ok(model) => model,
            // Lenient mining never reports ambiguity.
            Err(_) => Self::from_signature(signature),
        }
    }

    /// Like [`ParameterModel::new`], but a description line naming more than
    /// one declared parameter is an error.
    pub fn try_new(
        signature: &Signature,
        description: Option<&str>,
    ) -> Result<Self, SignatureError> {
        Self::build(signature, description, true)
    }

    fn from_signature(signature: &Signature) -> Self {
        let mut model = Self {
            names: signature.names().map(str::to_string).collect(),
            vararg: signature.vararg.clone(),
            kwarg: signature.kwarg.clone(),
            positional_only: signature.positional_only,
            ..Default::default()
        };
        for param in &signature.params {
            let Some(default) = &param.default else {
                continue;
            };
            if matches!(default, Value::Bool(_)) {
                model.mode_flags.insert(param.name.clone());
            }
            model.defaults.insert(param.name.clone(), default.clone());
        }
        model
    }

    fn build(
        signature: &Signature,
        description: Option<&str>,
        strict: bool,
    ) -> Result<Self, SignatureError> {
        let mut model = Self::from_signature(signature);
        let Some(description) = description else {
            return Ok(model);
        };

        for line in description.lines() {
            let trimmed = line.trim_start();
            if !trimmed.starts_with('-') {
                continue;
            }
            // The option part ends where the prose starts: two spaces or a tab.
            let end = [trimmed.find("  "), trimmed.find('\t')]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(trimmed.len());
            model.mine_line(trimmed, &trimmed[..end], strict)?;
        }

        tracing::debug!(
            command = %signature.name,
            params = model.names.len(),
            aliases = model.alias_of.len(),
            metavars = model.meta_of.len(),
            "built parameter model"
        );
        Ok(model)
    }

    fn mine_line(&mut self, line: &str, options: &str, strict: bool) -> Result<(), SignatureError> {
        let mut keys: IndexSet<String> = IndexSet::new();
        for caps in option_re().captures_iter(options) {
            let key = match (caps.name("long"), caps.name("short")) {
                (Some(long), _) => normalize_key(long.as_str()),
                (None, Some(short)) => short.as_str().to_string(),
                (None, None) => continue,
            };
            if let Some(meta) = caps.name("meta") {
                self.meta_of.insert(key.clone(), meta.as_str().to_string());
            }
            keys.insert(key);
        }

        let (declared, aliases): (Vec<String>, Vec<String>) =
            keys.into_iter().partition(|k| self.names.contains(k));
        let Some(canonical) = declared.first().cloned() else {
            return Ok(());
        };
        if declared.len() > 1 {
            if strict {
                return Err(SignatureError::AmbiguousOption {
                    line: line.trim_end().to_string(),
                    names: declared,
                });
            }
            tracing::warn!(
                line = line.trim_end(),
                chosen = %canonical,
                "description line names several parameters"
            );
        }
        for alias in aliases {
            self.alias_of.insert(alias, canonical.clone());
        }
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn vararg(&self) -> Option<&str> {
        self.vararg.as_deref()
    }

    pub fn kwarg(&self) -> Option<&str> {
        self.kwarg.as_deref()
    }

    pub fn positional_only(&self) -> bool {
        self.positional_only
    }

    pub fn default(&self, name: &str) -> Option<&Value> {
        self.defaults.get(name)
    }

    pub fn defaults(&self) -> &IndexMap<String, Value> {
        &self.defaults
    }

    /// Parameters that have a default, in declaration order.
    pub fn optional_names(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str)
    }

    /// Parameters without a default, in declaration order.
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| !self.defaults.contains_key(*n))
    }

    /// Canonical parameter name for an option key. Unknown keys map to
    /// themselves.
    pub fn canonical<'a>(&'a self, key: &'a str) -> &'a str {
        self.alias_of.get(key).map_or(key, String::as_str)
    }

    /// Whether `key` is a declared parameter name or an alias of one.
    pub fn is_known(&self, key: &str) -> bool {
        self.alias_of.contains_key(key) || self.names.iter().any(|n| n == key)
    }

    pub fn is_mode_flag(&self, name: &str) -> bool {
        self.mode_flags.contains(name)
    }

    /// Options with an integer default count their bare occurrences.
    pub fn is_counter(&self, name: &str) -> bool {
        matches!(self.defaults.get(name), Some(Value::Int(_)))
    }

    /// Options documented with a metavar must be given a value, unless they
    /// toggle or count.
    pub fn requires_value(&self, name: &str) -> bool {
        !self.is_mode_flag(name) && !self.is_counter(name) && self.metavar(name).is_some()
    }

    /// Aliases of `name`, in the order they appeared in the description.
    pub fn aliases(&self, name: &str) -> impl Iterator<Item = &str> {
        self.alias_of
            .iter()
            .filter(move |(_, target)| *target == name)
            .map(|(alias, _)| alias.as_str())
    }

    /// Metavar recorded for exactly this spelling.
    pub fn spelling_metavar(&self, key: &str) -> Option<&str> {
        self.meta_of.get(key).map(String::as_str)
    }

    /// Metavar of a parameter, falling back to the first alias that has one.
    pub fn metavar(&self, name: &str) -> Option<&str> {
        self.spelling_metavar(name)
            .or_else(|| self.aliases(name).find_map(|a| self.spelling_metavar(a)))
    }

    pub fn caster(&self, name: &str) -> Caster {
        Caster::from_metavar(self.metavar(name))
    }
}
