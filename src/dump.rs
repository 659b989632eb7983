//! Reading and writing validator parameters in dump trees.
//!
//! A dump tree is a [`Value::Map`] holding `"__class__"` plus one entry per
//! non-default parameter. [`Params`] reads such a map back while enforcing the
//! parameter contracts (flags, non-negative lengths, non-empty containers,
//! item types), and the `put*` helpers write parameters on the way out.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

use crate::error::ContractError;
use crate::load::{self, LoadError};
use crate::registry::Registry;
use crate::schema::Validator;
use crate::value::{Map, Value};

/// Parameters of a single node being loaded.
///
/// Each reader removes the entry it consumes; [`finish`](Params::finish)
/// rejects whatever is left over.
pub struct Params<'a> {
    class: &'static str,
    entries: Map,
    registry: &'a Registry,
}

impl<'a> Params<'a> {
    pub(crate) fn new(class: &'static str, entries: Map, registry: &'a Registry) -> Self {
        Self {
            class,
            entries,
            registry,
        }
    }

    pub(crate) fn registry(&self) -> &'a Registry {
        self.registry
    }

    fn take(&mut self, name: &str) -> Option<Value> {
        match self.entries.shift_remove(&Value::from(name)) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn type_error(&self, name: &str, expected: &'static str, actual: &Value) -> LoadError {
        ContractError::Type {
            class: self.class,
            param: name.to_string(),
            expected,
            actual: actual.kind(),
        }
        .into()
    }

    /// Fails if `value` is absent.
    pub(crate) fn require<T>(&self, name: &str, value: Option<T>) -> Result<T, LoadError> {
        value.ok_or_else(|| {
            ContractError::Required {
                class: self.class,
                param: name.to_string(),
            }
            .into()
        })
    }

    /// Reads a flag. Absent and null mean `false`; integers are truthy when
    /// non-zero.
    pub(crate) fn flag(&mut self, name: &str) -> Result<bool, LoadError> {
        match self.take(name) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(b),
            Some(Value::Int(n)) => Ok(n != 0),
            Some(other) => Err(self.type_error(name, "a flag", &other)),
        }
    }

    /// Reads a non-negative length.
    pub(crate) fn length(&mut self, name: &str) -> Result<Option<usize>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Int(n)) => usize::try_from(n).map(Some).map_err(|_| {
                ContractError::Negative {
                    class: self.class,
                    param: name.to_string(),
                    actual: n,
                }
                .into()
            }),
            Some(other) => Err(self.type_error(name, "an integer", &other)),
        }
    }

    pub(crate) fn string(&mut self, name: &str) -> Result<Option<String>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(self.type_error(name, "a string", &other)),
        }
    }

    pub(crate) fn int(&mut self, name: &str) -> Result<Option<i64>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(n)),
            Some(other) => Err(self.type_error(name, "an integer", &other)),
        }
    }

    /// Reads a float; integers are widened.
    pub(crate) fn float(&mut self, name: &str) -> Result<Option<f64>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Float(x)) => Ok(Some(x)),
            Some(Value::Int(n)) => Ok(Some(n as f64)),
            Some(other) => Err(self.type_error(name, "a number", &other)),
        }
    }

    /// Reads a date, accepting ISO-8601 strings as well.
    pub(crate) fn date(&mut self, name: &str) -> Result<Option<NaiveDate>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Date(d)) => Ok(Some(d)),
            Some(Value::Str(s)) => s
                .parse()
                .map(Some)
                .map_err(|e| ContractError::invalid(self.class, name, e).into()),
            Some(other) => Err(self.type_error(name, "a date", &other)),
        }
    }

    pub(crate) fn time(&mut self, name: &str) -> Result<Option<NaiveTime>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Time(t)) => Ok(Some(t)),
            Some(Value::Str(s)) => s
                .parse()
                .map(Some)
                .map_err(|e| ContractError::invalid(self.class, name, e).into()),
            Some(other) => Err(self.type_error(name, "a time", &other)),
        }
    }

    pub(crate) fn datetime(&mut self, name: &str) -> Result<Option<NaiveDateTime>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Datetime(dt)) => Ok(Some(dt)),
            Some(Value::Str(s)) => s
                .parse()
                .map(Some)
                .map_err(|e| ContractError::invalid(self.class, name, e).into()),
            Some(other) => Err(self.type_error(name, "a datetime", &other)),
        }
    }

    /// Reads any value, including null.
    pub(crate) fn value(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(&Value::from(name))
    }

    /// Reads a non-empty list or tuple.
    pub(crate) fn values(&mut self, name: &str) -> Result<Option<Vec<Value>>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::List(items)) | Some(Value::Tuple(items)) => {
                if items.is_empty() {
                    Err(ContractError::empty(self.class, name).into())
                } else {
                    Ok(Some(items))
                }
            }
            Some(other) => Err(self.type_error(name, "a sequence", &other)),
        }
    }

    /// Reads a possibly empty sequence of names. Absent means empty.
    pub(crate) fn names(&mut self, name: &str) -> Result<Vec<String>, LoadError> {
        let items = match self.take(name) {
            None => return Ok(Vec::new()),
            Some(Value::List(items)) | Some(Value::Tuple(items)) => items,
            Some(other) => return Err(self.type_error(name, "a sequence", &other)),
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Str(s) => Ok(s),
                other => Err(self.type_error(name, "a sequence of strings", &other)),
            })
            .collect()
    }

    /// Reads a non-empty sequence of strings.
    pub(crate) fn strings(&mut self, name: &str) -> Result<Option<Vec<String>>, LoadError> {
        let Some(items) = self.values(name)? else {
            return Ok(None);
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Str(s) => Ok(s),
                other => Err(self.type_error(name, "a sequence of strings", &other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Reads a non-empty sequence of integers.
    pub(crate) fn ints(&mut self, name: &str) -> Result<Option<Vec<i64>>, LoadError> {
        let Some(items) = self.values(name)? else {
            return Ok(None);
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Int(n) => Ok(n),
                other => Err(self.type_error(name, "a sequence of integers", &other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Reads a nested validator definition.
    pub(crate) fn validator(&mut self, name: &str) -> Result<Option<Validator>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(tree) => load::build(&tree, self.registry).map(Some),
        }
    }

    /// Reads a non-empty sequence of validator definitions.
    pub(crate) fn validators(&mut self, name: &str) -> Result<Option<Vec<Validator>>, LoadError> {
        let Some(items) = self.values(name)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| load::build(item, self.registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Reads a string-keyed mapping of validator definitions. The mapping may
    /// be empty.
    pub(crate) fn validator_map(
        &mut self,
        name: &str,
    ) -> Result<Option<IndexMap<String, Validator>>, LoadError> {
        let Some(entries) = self.raw_map(name)? else {
            return Ok(None);
        };
        entries
            .iter()
            .map(|(key, tree)| Ok((key.clone(), load::build(tree, self.registry)?)))
            .collect::<Result<IndexMap<_, _>, LoadError>>()
            .map(Some)
    }

    /// Reads a string-keyed mapping without interpreting its values.
    pub(crate) fn raw_map(
        &mut self,
        name: &str,
    ) -> Result<Option<IndexMap<String, Value>>, LoadError> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Map(map)) => map
                .into_iter()
                .map(|(key, value)| match key {
                    Value::Str(key) => Ok((key, value)),
                    other => Err(self.type_error(name, "a mapping with string keys", &other)),
                })
                .collect::<Result<IndexMap<_, _>, LoadError>>()
                .map(Some),
            Some(other) => Err(self.type_error(name, "a mapping", &other)),
        }
    }

    /// Reads a mapping from strings to strings.
    pub(crate) fn string_map(
        &mut self,
        name: &str,
    ) -> Result<Option<IndexMap<String, String>>, LoadError> {
        let Some(entries) = self.raw_map(name)? else {
            return Ok(None);
        };
        entries
            .into_iter()
            .map(|(key, value)| match value {
                Value::Str(value) => Ok((key, value)),
                other => Err(self.type_error(name, "a mapping of strings", &other)),
            })
            .collect::<Result<IndexMap<_, _>, LoadError>>()
            .map(Some)
    }

    /// Rejects parameters nobody consumed.
    pub(crate) fn finish(self) -> Result<(), LoadError> {
        match self.entries.into_iter().next() {
            None => Ok(()),
            Some((key, _)) => Err(ContractError::Unknown {
                class: self.class,
                param: key.key_string(),
            }
            .into()),
        }
    }
}

pub(crate) fn put(params: &mut Map, name: &str, value: impl Into<Value>) {
    params.insert(Value::from(name), value.into());
}

/// Writes a flag only when it is set.
pub(crate) fn put_flag(params: &mut Map, name: &str, flag: bool) {
    if flag {
        put(params, name, true);
    }
}

pub(crate) fn put_opt<T: Into<Value>>(params: &mut Map, name: &str, value: Option<T>) {
    if let Some(value) = value {
        put(params, name, value);
    }
}

pub(crate) fn put_list<T: Into<Value>>(
    params: &mut Map,
    name: &str,
    items: Option<impl IntoIterator<Item = T>>,
) {
    if let Some(items) = items {
        put(params, name, Value::list(items));
    }
}
