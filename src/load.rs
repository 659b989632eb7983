//! Building validators from dump trees.
//!
//! A dump tree is a mapping with one of three roots:
//!
//! - `{"__class__": "Int", ...params}` builds a new node of that class
//! - `{"__use__": alias}` copies the validator registered under `alias`
//! - `{"__clone__": alias, "update": {..}, "unset": {..}}` copies it with
//!   overrides applied
//!
//! [`Overrides`] patch a tree before it is built. They address nodes by path:
//! `/` is the root, `/schema/x` is the `x` entry of the root's `schema`
//! parameter, `/steps/1` the second step of a combinator.
//!
//! # Example
//!
//! ```rust
//! use vouch::{load, Registry, Schema, Validator, Value};
//!
//! let registry = Registry::new();
//! let tree = Value::map([
//!     ("__class__", Value::from("List")),
//!     ("item", Value::map([("__class__", "Int")])),
//!     ("maxlen", Value::Int(3)),
//! ]);
//!
//! let validator = load(&tree, &registry).unwrap();
//! assert_eq!(validator, Validator::from(Schema::list(Schema::integer()).max_len(3)));
//! assert_eq!(validator.dump(), tree);
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::dump::Params;
use crate::error::ContractError;
use crate::registry::{Registry, RegistryError};
use crate::schema::{
    AllOfSchema, AnySchema, BoolSchema, BytesSchema, ConstSchema, DateSchema, DatetimeSchema,
    DictSchema, FloatSchema, IntSchema, LazyRefSchema, ListSchema, MappingSchema, OneOfSchema,
    SchemaLike, StrSchema, TimeSchema, TupleSchema, Validator, CLASS_KEY,
};
use crate::value::{Map, Value, ValueKind};

const USE_KEY: &str = "__use__";
const CLONE_KEY: &str = "__clone__";
const EXTEND_KEY: &str = "extend";

/// Errors raised while building a validator from a dump tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("expected a mapping, got {0}")]
    NotAMapping(ValueKind),

    #[error("one of \"__class__\", \"__use__\" or \"__clone__\" must be specified")]
    MissingDiscriminator,

    #[error("{key:?} must be a string, got {actual}")]
    Discriminator {
        key: &'static str,
        actual: ValueKind,
    },

    #[error("unknown validator class {0:?}")]
    UnknownClass(String),

    #[error("invalid override path {0:?}: paths start with \"/\"")]
    InvalidPath(String),

    #[error("invalid override at {path:?}: {reason}")]
    InvalidOverride { path: String, reason: String },

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

type LoadFn = fn(&mut Params<'_>) -> Result<Validator, LoadError>;

macro_rules! class_table {
    ($($schema:ty),* $(,)?) => {{
        let mut table: HashMap<&'static str, LoadFn> = HashMap::new();
        $(
            table.insert(<$schema as SchemaLike>::CLASS, |params: &mut Params<'_>| {
                <$schema>::load(params).map(Validator::from)
            });
        )*
        table
    }};
}

static CLASSES: OnceLock<HashMap<&'static str, LoadFn>> = OnceLock::new();

fn classes() -> &'static HashMap<&'static str, LoadFn> {
    CLASSES.get_or_init(|| {
        class_table!(
            IntSchema,
            FloatSchema,
            StrSchema,
            BytesSchema,
            BoolSchema,
            DateSchema,
            TimeSchema,
            DatetimeSchema,
            AnySchema,
            ConstSchema,
            ListSchema,
            TupleSchema,
            DictSchema,
            MappingSchema,
            AllOfSchema,
            OneOfSchema,
            LazyRefSchema,
        )
    })
}

/// Builds a validator from a dump tree.
///
/// # Errors
///
/// Returns a `LoadError` if the tree is malformed, names an unknown class,
/// breaks a parameter contract or refers to an unregistered alias.
pub fn load(tree: &Value, registry: &Registry) -> Result<Validator, LoadError> {
    let validator = build(tree, registry)?;
    debug!(class = validator.class(), "loaded validator");
    Ok(validator)
}

/// Patches a dump tree with `overrides`, then builds it.
pub fn load_with(
    tree: &Value,
    overrides: &Overrides,
    registry: &Registry,
) -> Result<Validator, LoadError> {
    if overrides.is_empty() {
        return load(tree, registry);
    }
    let patched = overrides.apply(tree);
    let validator = build(&patched, registry)?;
    debug!(
        class = validator.class(),
        updates = overrides.update.len(),
        unsets = overrides.unset.len(),
        "loaded validator with overrides"
    );
    Ok(validator)
}

fn discriminator<'v>(key: &'static str, value: &'v Value) -> Result<&'v str, LoadError> {
    value.as_str().ok_or(LoadError::Discriminator {
        key,
        actual: value.kind(),
    })
}

pub(crate) fn build(tree: &Value, registry: &Registry) -> Result<Validator, LoadError> {
    let map = match tree {
        Value::Map(map) => map,
        other => return Err(LoadError::NotAMapping(other.kind())),
    };

    if let Some(class) = map.get(&Value::from(CLASS_KEY)) {
        let class = discriminator(CLASS_KEY, class)?;
        let (&class, load) = classes()
            .get_key_value(class)
            .ok_or_else(|| LoadError::UnknownClass(class.to_string()))?;

        let mut entries = map.clone();
        entries.shift_remove(&Value::from(CLASS_KEY));
        let mut params = Params::new(class, entries, registry);
        let alias = params.string("alias")?;
        let replace = params.flag("replace")?;
        let validator = load(&mut params)?;
        params.finish()?;

        return match alias {
            Some(alias) if replace => Ok(registry.put(alias, validator).as_ref().clone()),
            Some(alias) => Ok(registry.add(alias, validator)?.as_ref().clone()),
            None => Ok(validator),
        };
    }

    if let Some(alias) = map.get(&Value::from(CLONE_KEY)) {
        let alias = discriminator(CLONE_KEY, alias)?;
        let overrides = Overrides::from_tree(
            map.get(&Value::from("update")),
            map.get(&Value::from("unset")),
        )?;
        debug!(alias, "cloning registered validator");
        return registry.get(alias)?.clone_with(&overrides, registry);
    }

    if let Some(alias) = map.get(&Value::from(USE_KEY)) {
        let alias = discriminator(USE_KEY, alias)?;
        debug!(alias, "using registered validator");
        return Ok(registry.get(alias)?.as_ref().clone());
    }

    Err(LoadError::MissingDiscriminator)
}

fn parse_path(path: &str) -> Result<Vec<String>, LoadError> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| LoadError::InvalidPath(path.to_string()))?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    Ok(rest.split('/').map(str::to_string).collect())
}

fn index_of(value: &Value) -> Option<usize> {
    match value {
        Value::Int(n) => usize::try_from(*n).ok(),
        Value::Str(s) => s.parse().ok(),
        _ => None,
    }
}

/// Parameter overrides applied when cloning or loading a validator.
///
/// `update` merges entries into the node at a path: on a mapping it sets
/// keys, on a sequence it replaces items by index and appends the items
/// listed under `"extend"`. `unset` removes keys or indices from the node at
/// a path. Appended items are not patched further.
///
/// # Example
///
/// ```rust
/// use vouch::{Overrides, Registry, Schema, Validator, Value};
///
/// let registry = Registry::new();
/// let original = Validator::from(
///     Schema::dict()
///         .field("x", Schema::integer())
///         .field("y", Schema::integer()),
/// );
///
/// let overrides = Overrides::new()
///     .update("/schema/x", Value::map([("min", 0)]))
///     .unwrap()
///     .unset("/schema", ["y"])
///     .unwrap();
/// let copy = original.clone_with(&overrides, &registry).unwrap();
///
/// assert_eq!(
///     copy,
///     Validator::from(Schema::dict().field("x", Schema::integer().min(0)))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    update: HashMap<Vec<String>, Map>,
    unset: HashMap<Vec<String>, Vec<Value>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.unset.is_empty()
    }

    /// Merges `changes` into the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidPath` if `path` does not start with `/`, and
    /// `LoadError::InvalidOverride` if `changes` is not a mapping.
    pub fn update(mut self, path: &str, changes: impl Into<Value>) -> Result<Self, LoadError> {
        let segments = parse_path(path)?;
        let changes = match changes.into() {
            Value::Map(changes) => changes,
            other => {
                return Err(LoadError::InvalidOverride {
                    path: path.to_string(),
                    reason: format!("update must be a mapping, got {}", other.kind()),
                })
            }
        };
        self.update.entry(segments).or_default().extend(changes);
        Ok(self)
    }

    /// Removes the keys or indices `names` from the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidPath` if `path` does not start with `/`.
    pub fn unset<T: Into<Value>>(
        mut self,
        path: &str,
        names: impl IntoIterator<Item = T>,
    ) -> Result<Self, LoadError> {
        let segments = parse_path(path)?;
        self.unset
            .entry(segments)
            .or_default()
            .extend(names.into_iter().map(Into::into));
        Ok(self)
    }

    /// Reads the `update` and `unset` entries of a `__clone__` node.
    pub(crate) fn from_tree(
        update: Option<&Value>,
        unset: Option<&Value>,
    ) -> Result<Self, LoadError> {
        let mut overrides = Self::new();
        match update {
            None | Some(Value::Null) => {}
            Some(Value::Map(paths)) => {
                for (path, changes) in paths {
                    overrides = overrides.update(&path.key_string(), changes.clone())?;
                }
            }
            Some(other) => {
                return Err(LoadError::InvalidOverride {
                    path: "update".to_string(),
                    reason: format!("expected a mapping of paths, got {}", other.kind()),
                })
            }
        }
        match unset {
            None | Some(Value::Null) => {}
            Some(Value::Map(paths)) => {
                for (path, names) in paths {
                    let names = names.as_seq().ok_or_else(|| LoadError::InvalidOverride {
                        path: path.key_string(),
                        reason: format!("unset must be a sequence, got {}", names.kind()),
                    })?;
                    overrides = overrides.unset(&path.key_string(), names.iter().cloned())?;
                }
            }
            Some(other) => {
                return Err(LoadError::InvalidOverride {
                    path: "unset".to_string(),
                    reason: format!("expected a mapping of paths, got {}", other.kind()),
                })
            }
        }
        Ok(overrides)
    }

    /// Returns a patched copy of `tree`.
    pub(crate) fn apply(&self, tree: &Value) -> Value {
        self.patch(tree, &mut Vec::new())
    }

    fn patch(&self, value: &Value, path: &mut Vec<String>) -> Value {
        match value {
            Value::Map(map) => Value::Map(self.patch_map(map, path)),
            Value::List(items) => Value::List(self.patch_seq(items, path)),
            Value::Tuple(items) => Value::Tuple(self.patch_seq(items, path)),
            other => other.clone(),
        }
    }

    fn patch_map(&self, map: &Map, path: &mut Vec<String>) -> Map {
        let mut merged = map.clone();
        if let Some(changes) = self.update.get(path.as_slice()) {
            merged.extend(changes.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(names) = self.unset.get(path.as_slice()) {
            merged.retain(|key, _| !names.iter().any(|name| name.key_string() == key.key_string()));
        }

        merged
            .into_iter()
            .map(|(key, value)| {
                path.push(key.key_string());
                let value = self.patch(&value, path);
                path.pop();
                (key, value)
            })
            .collect()
    }

    fn patch_seq(&self, items: &[Value], path: &mut Vec<String>) -> Vec<Value> {
        let update = self.update.get(path.as_slice());
        let unset = self.unset.get(path.as_slice());
        let mut result = Vec::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            if unset.is_some_and(|names| names.iter().any(|name| index_of(name) == Some(idx))) {
                continue;
            }
            let item = update
                .and_then(|changes| changes.iter().find(|(key, _)| index_of(key) == Some(idx)))
                .map_or(item, |(_, replacement)| replacement);
            path.push(idx.to_string());
            result.push(self.patch(item, path));
            path.pop();
        }

        if let Some(extend) = update.and_then(|changes| changes.get(&Value::from(EXTEND_KEY))) {
            match extend.as_seq() {
                Some(extra) => result.extend(extra.iter().cloned()),
                None => result.push(extend.clone()),
            }
        }
        result
    }
}
