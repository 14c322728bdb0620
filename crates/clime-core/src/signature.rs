//! Explicit description of a callable's parameters, and call-time binding.
//!
//! A [`Signature`] stands in for runtime reflection: it is written once per
//! callable (or recovered from a one-line description such as
//! `pow(x, y[, z])`) and then shared read-only by every parse.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::error::{InvokeError, SignatureError};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Param {
    pub name: String,
    /// `Some(Value::None)` is a real default; a missing key means required.
    #[serde(
        default,
        deserialize_with = "present_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

fn present_default<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(de).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Signature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    /// Collects positionals beyond `params`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vararg: Option<String>,
    /// Collects keywords that name no parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwarg: Option<String>,
    /// Keyword values always claim their positional slot.
    #[serde(default)]
    pub positional_only: bool,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build from the classic descriptor shape: ordered names plus a default
    /// list aligned to the tail of `names`.
    pub fn from_parts(
        name: impl Into<String>,
        names: &[&str],
        defaults: Vec<Value>,
        vararg: Option<&str>,
        kwarg: Option<&str>,
    ) -> Result<Self, SignatureError> {
        if defaults.len() > names.len() {
            return Err(SignatureError::TooManyDefaults {
                params: names.len(),
                defaults: defaults.len(),
            });
        }
        let first_default = names.len() - defaults.len();
        let mut defaults = defaults.into_iter();
        let params = names
            .iter()
            .enumerate()
            .map(|(i, n)| Param {
                name: n.to_string(),
                default: if i >= first_default { defaults.next() } else { None },
            })
            .collect();
        let sig = Self {
            name: name.into(),
            params,
            vararg: vararg.map(str::to_string),
            kwarg: kwarg.map(str::to_string),
            positional_only: false,
        };
        sig.validate()?;
        Ok(sig)
    }

    /// Recover a signature from a one-line description like `f(x, y[, a[, b]])`.
    ///
    /// Parameters inside square brackets are optional and default to `None`.
    /// The result is positional-only. Text without a parenthesised part gives
    /// an empty parameter list.
    pub fn from_doc_line(name: impl Into<String>, doc: &str) -> Self {
        let mut sig = Self::new(name);
        sig.positional_only = true;

        let line = doc.lines().next().unwrap_or_default();
        let (Some(open), Some(close)) = (line.find('('), line.rfind(')')) else {
            return sig;
        };
        if close <= open {
            return sig;
        }

        const NOISE: &[char] = &[' ', '(', ')', '[', ']'];
        let mut optional = false;
        for piece in line[open + 1..close].split(',') {
            let start = piece.find(|c: char| !NOISE.contains(&c)).unwrap_or(piece.len());
            let (lead, rest) = piece.split_at(start);
            optional |= lead.contains('[');
            let end = rest.find(NOISE).unwrap_or(rest.len());
            let (name, tail) = rest.split_at(end);
            if !name.is_empty() {
                sig.params.push(Param {
                    name: name.to_string(),
                    default: optional.then_some(Value::None),
                });
            }
            optional |= tail.contains('[');
        }
        sig
    }

    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    pub fn param_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    pub fn vararg(mut self, name: impl Into<String>) -> Self {
        self.vararg = Some(name.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>) -> Self {
        self.kwarg = Some(name.into());
        self
    }

    pub fn positional_only(mut self) -> Self {
        self.positional_only = true;
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    /// Index of the first parameter that has a default.
    pub fn first_default(&self) -> usize {
        self.params
            .iter()
            .position(|p| p.default.is_some())
            .unwrap_or(self.params.len())
    }

    pub fn validate(&self) -> Result<(), SignatureError> {
        let mut seen = HashSet::new();
        let all = self
            .names()
            .chain(self.vararg.as_deref())
            .chain(self.kwarg.as_deref());
        for name in all {
            if !seen.insert(name) {
                return Err(SignatureError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }

        let first_default = self.first_default();
        if let Some(p) = self.params[first_default..]
            .iter()
            .find(|p| p.default.is_none())
        {
            return Err(SignatureError::RequiredAfterDefault {
                name: p.name.clone(),
            });
        }
        Ok(())
    }

    /// Bind call values to parameters the way a function call would.
    pub fn bind(
        &self,
        positionals: Vec<Value>,
        keywords: IndexMap<String, Value>,
    ) -> Result<Arguments, InvokeError> {
        let given = positionals.len();
        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        let mut varargs = Vec::new();
        let mut kwargs = IndexMap::new();

        for (i, value) in positionals.into_iter().enumerate() {
            match slots.get_mut(i) {
                Some(slot) => *slot = Some(value),
                None if self.vararg.is_some() => varargs.push(value),
                None => {
                    return Err(InvokeError::TooManyPositionals {
                        expected: self.params.len(),
                        given,
                    });
                }
            }
        }

        for (name, value) in keywords {
            match self.params.iter().position(|p| p.name == name) {
                Some(i) if slots[i].is_some() => {
                    return Err(InvokeError::MultipleValues { name });
                }
                Some(i) => slots[i] = Some(value),
                None if self.kwarg.is_some() => {
                    kwargs.insert(name, value);
                }
                None => return Err(InvokeError::UnexpectedKeyword { name }),
            }
        }

        let values = slots
            .into_iter()
            .zip(&self.params)
            .map(|(slot, param)| {
                slot.or_else(|| param.default.clone())
                    .ok_or_else(|| InvokeError::MissingArgument {
                        name: param.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Arguments {
            names: self.params.iter().map(|p| p.name.clone()).collect(),
            values,
            varargs,
            kwargs,
        })
    }
}

/// Values bound to a [`Signature`], handed to the callable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    names: Vec<String>,
    values: Vec<Value>,
    varargs: Vec<Value>,
    kwargs: IndexMap<String, Value>,
}

impl Arguments {
    /// Value of a declared parameter, or of a collected keyword.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
            .or_else(|| self.kwargs.get(name))
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn varargs(&self) -> &[Value] {
        &self.varargs
    }

    pub fn kwargs(&self) -> &IndexMap<String, Value> {
        &self.kwargs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat() -> Signature {
        Signature::new("repeat")
            .param("message")
            .param_default("times", 2)
            .param_default("count", false)
    }

    #[test]
    fn from_parts_aligns_defaults_to_tail() {
        let sig = Signature::from_parts(
            "f",
            &["a", "b", "c"],
            vec![Value::Int(1), Value::None],
            Some("rest"),
            None,
        )
        .unwrap();
        assert_eq!(sig.params[0].default, None);
        assert_eq!(sig.params[1].default, Some(Value::Int(1)));
        assert_eq!(sig.params[2].default, Some(Value::None));
        assert_eq!(sig.first_default(), 1);

        let err = Signature::from_parts("f", &["a"], vec![Value::None, Value::None], None, None)
            .unwrap_err();
        assert!(matches!(err, SignatureError::TooManyDefaults { .. }));
    }

    #[test]
    fn from_doc_line_reads_bracketed_optionals() {
        let cases: &[(&str, &[&str], usize)] = &[
            ("", &[], 0),
            ("abcd", &[], 0),
            ("f1()", &[], 0),
            ("f2(x)", &["x"], 0),
            ("f3(x, y)", &["x", "y"], 0),
            ("f4(x[, a])", &["x", "a"], 1),
            ("f5(x, y[, a])", &["x", "y", "a"], 1),
            ("f6(x, y[, a[, b]])", &["x", "y", "a", "b"], 2),
            ("f7([a])", &["a"], 1),
            ("f8([a[, b]])", &["a", "b"], 2),
        ];
        for (doc, names, defaults) in cases {
            let sig = Signature::from_doc_line("f", doc);
            let got: Vec<&str> = sig.names().collect();
            assert_eq!(&got, names, "names for {doc:?}");
            let n = sig.params.iter().filter(|p| p.default.is_some()).count();
            assert_eq!(n, *defaults, "defaults for {doc:?}");
            assert!(sig.validate().is_ok());
            assert!(sig.positional_only);
        }
    }

    #[test]
    fn validate_rejects_bad_descriptors() {
        let dup = Signature::new("f").param("a").vararg("a");
        assert!(matches!(dup.validate(), Err(SignatureError::DuplicateName { .. })));

        let order = Signature::new("f").param_default("a", 1).param("b");
        assert_eq!(
            order.validate(),
            Err(SignatureError::RequiredAfterDefault {
                name: "b".to_string()
            })
        );
    }

    #[test]
    fn bind_fills_defaults_and_reports_missing() {
        let args = repeat()
            .bind(vec![Value::from("Hi!")], IndexMap::new())
            .unwrap();
        assert_eq!(args.str("message"), Some("Hi!"));
        assert_eq!(args.int("times"), Some(2));
        assert_eq!(args.bool("count"), Some(false));

        let err = repeat().bind(vec![], IndexMap::new()).unwrap_err();
        assert_eq!(
            err,
            InvokeError::MissingArgument {
                name: "message".to_string()
            }
        );
    }

    #[test]
    fn bind_rejects_mismatches() {
        let mut kw = IndexMap::new();
        kw.insert("message".to_string(), Value::from("x"));
        let err = repeat().bind(vec![Value::from("y")], kw).unwrap_err();
        assert!(matches!(err, InvokeError::MultipleValues { .. }));

        let mut kw = IndexMap::new();
        kw.insert("bogus".to_string(), Value::Int(1));
        let err = repeat().bind(vec![Value::from("y")], kw).unwrap_err();
        assert!(matches!(err, InvokeError::UnexpectedKeyword { .. }));

        let many = vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)];
        let err = repeat().bind(many, IndexMap::new()).unwrap_err();
        assert_eq!(
            err,
            InvokeError::TooManyPositionals {
                expected: 3,
                given: 4
            }
        );
    }

    #[test]
    fn bind_collects_varargs_and_kwargs() {
        let sig = Signature::new("echo").vararg("args").kwarg("opts");
        let mut kw = IndexMap::new();
        kw.insert("bogus".to_string(), Value::Int(1));
        let args = sig
            .bind(vec![Value::from("a"), Value::from("b")], kw)
            .unwrap();
        assert_eq!(args.varargs(), &[Value::from("a"), Value::from("b")]);
        assert_eq!(args.get("bogus"), Some(&Value::Int(1)));
    }

    #[test]
    fn json_descriptor_keeps_null_default() {
        let sig: Signature = serde_json::from_str(
            r#"{"name":"f","params":[{"name":"a"},{"name":"b","default":null}],"vararg":"rest"}"#,
        )
        .unwrap();
        assert_eq!(sig.params[0].default, None);
        assert_eq!(sig.params[1].default, Some(Value::None));
        assert_eq!(sig.vararg.as_deref(), Some("rest"));
    }
}
