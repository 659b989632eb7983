//! Text and byte string schema validation.
//!
//! This module provides [`StrSchema`] for text, optionally decoded from byte
//! strings, and [`BytesSchema`] for raw byte strings.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;

use crate::dump::{self, Params};
use crate::error::{ContractError, ErrorKind, ValidationError};
use crate::load::LoadError;
use crate::validation::Context;
use crate::value::{Map, Value, ValueKind};

use super::traits::{check_length, settle, Outcome, SchemaLike};

/// A compiled pattern anchored at the start of the input.
///
/// Patterns compare by their source text.
#[derive(Clone)]
struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    fn new(source: &str) -> Result<Self, ContractError> {
        let regex = Regex::new(&format!("^(?:{})", source))
            .map_err(|e| ContractError::invalid(StrSchema::CLASS, "pattern", e))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Encoding {
    Utf8,
    Ascii,
    Latin1,
}

/// An encoding as configured, keeping the caller's label for dumps and
/// error payloads.
#[derive(Debug, Clone, PartialEq)]
struct Charset {
    label: String,
    encoding: Encoding,
}

impl Charset {
    fn new(label: &str) -> Result<Self, ContractError> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        let encoding = match normalized.as_str() {
            "utf-8" | "utf8" => Encoding::Utf8,
            "ascii" | "us-ascii" => Encoding::Ascii,
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Encoding::Latin1,
            _ => {
                return Err(ContractError::invalid(
                    StrSchema::CLASS,
                    "encoding",
                    format!("unsupported encoding {:?}", label),
                ))
            }
        };
        Ok(Self {
            label: label.to_string(),
            encoding,
        })
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, ValidationError> {
        let decoded = match self.encoding {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Encoding::Ascii if bytes.is_ascii() => {
                std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
            }
            Encoding::Ascii => None,
            Encoding::Latin1 => Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
        };
        decoded.ok_or_else(|| {
            ValidationError::new(ErrorKind::StrDecode {
                expected: self.label.clone(),
                actual: bytes.to_vec(),
            })
        })
    }
}

/// A schema for validating text values.
///
/// Constraints are checked in the order minlen, maxlen, pattern, options.
/// Lengths count characters, not bytes.
///
/// # Example
///
/// ```rust
/// use vouch::{Schema, SchemaLike, Value};
///
/// let schema = Schema::string().min_len(2).max_len(5);
///
/// let error = schema.check(&Value::from("a")).unwrap().into_result().unwrap_err();
/// assert_eq!(error.first().code(), "min_length");
///
/// let error = schema.check(&Value::from("abcdef")).unwrap().into_result().unwrap_err();
/// assert_eq!(error.first().code(), "max_length");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrSchema {
    nullable: bool,
    encoding: Option<Charset>,
    minlen: Option<usize>,
    maxlen: Option<usize>,
    pattern: Option<Pattern>,
    options: Option<BTreeSet<String>>,
}

impl StrSchema {
    /// Creates a new string schema with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Decodes byte string input using `encoding`.
    ///
    /// Supported encodings are UTF-8, ASCII and Latin-1, under their common
    /// labels (`utf-8`, `utf8`, `ascii`, `latin-1`, `iso-8859-1`, ...).
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Invalid` for an unsupported encoding.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, SchemaLike, Value};
    ///
    /// let schema = Schema::string().encoding("utf-8").unwrap();
    ///
    /// let result = schema.check(&Value::bytes("café".as_bytes())).unwrap();
    /// assert_eq!(result.into_result().unwrap(), Value::from("café"));
    ///
    /// // "café" encoded as Latin-1 is not valid UTF-8
    /// let result = schema.check(&Value::bytes(*b"caf\xe9")).unwrap();
    /// assert_eq!(result.into_result().unwrap_err().first().code(), "str_decode");
    /// ```
    pub fn encoding(mut self, encoding: &str) -> Result<Self, ContractError> {
        self.encoding = Some(Charset::new(encoding)?);
        Ok(self)
    }

    /// Adds a minimum length constraint, in characters.
    pub fn min_len(mut self, len: usize) -> Self {
        self.minlen = Some(len);
        self
    }

    /// Adds a maximum length constraint, in characters.
    pub fn max_len(mut self, len: usize) -> Self {
        self.maxlen = Some(len);
        self
    }

    /// Adds a regex pattern constraint.
    ///
    /// The pattern must match at the start of the string; add `$` to match the
    /// whole string.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Invalid` if the pattern does not compile.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, SchemaLike, Value};
    ///
    /// let schema = Schema::string().pattern(r"\d+").unwrap();
    ///
    /// assert!(schema.check(&Value::from("123abc")).unwrap().is_success());
    /// assert!(schema.check(&Value::from("abc123")).unwrap().is_failure());
    /// ```
    pub fn pattern(mut self, pattern: &str) -> Result<Self, ContractError> {
        self.pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    /// Restricts the value to an enumerated set.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Empty` if no options are given.
    pub fn options<S: Into<String>>(
        mut self,
        options: impl IntoIterator<Item = S>,
    ) -> Result<Self, ContractError> {
        let options: BTreeSet<String> = options.into_iter().map(Into::into).collect();
        if options.is_empty() {
            return Err(ContractError::empty(Self::CLASS, "options"));
        }
        self.options = Some(options);
        Ok(self)
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        let text: Cow<'_, str> = match (value, &self.encoding) {
            (Value::Null, _) if self.nullable => return Ok(Value::Null),
            (Value::Str(s), _) => Cow::Borrowed(s.as_str()),
            (Value::Bytes(bytes), Some(charset)) => charset.decode(bytes)?,
            _ => return Err(ValidationError::invalid_type(ValueKind::Str, value)),
        };

        check_length(self.minlen, self.maxlen, text.chars().count())?;

        if let Some(pattern) = &self.pattern {
            if !pattern.regex.is_match(&text) {
                return Err(ValidationError::new(ErrorKind::PatternMatch {
                    expected: pattern.source.clone(),
                    actual: text.into_owned(),
                }));
            }
        }
        if let Some(options) = &self.options {
            if !options.contains(&*text) {
                return Err(ValidationError::options(
                    options.iter().map(Value::from).collect(),
                    text.into_owned(),
                ));
            }
        }
        Ok(Value::Str(text.into_owned()))
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let mut schema = Self {
            nullable: params.flag("nullable")?,
            minlen: params.length("minlen")?,
            maxlen: params.length("maxlen")?,
            ..Self::default()
        };
        if let Some(encoding) = params.string("encoding")? {
            schema = schema.encoding(&encoding)?;
        }
        if let Some(pattern) = params.string("pattern")? {
            schema = schema.pattern(&pattern)?;
        }
        if let Some(options) = params.strings("options")? {
            schema = schema.options(options)?;
        }
        Ok(schema)
    }
}

impl SchemaLike for StrSchema {
    const CLASS: &'static str = "Str";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_opt(
            params,
            "encoding",
            self.encoding.as_ref().map(|c| c.label.clone()),
        );
        dump::put_opt(params, "minlen", self.minlen);
        dump::put_opt(params, "maxlen", self.maxlen);
        dump::put_opt(
            params,
            "pattern",
            self.pattern.as_ref().map(|p| p.source.clone()),
        );
        dump::put_list(params, "options", self.options.clone());
    }
}

/// A schema for validating byte strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BytesSchema {
    nullable: bool,
    minlen: Option<usize>,
    maxlen: Option<usize>,
}

impl BytesSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets null through untouched.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        self.minlen = Some(len);
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.maxlen = Some(len);
        self
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Null if self.nullable => Ok(Value::Null),
            Value::Bytes(bytes) => {
                check_length(self.minlen, self.maxlen, bytes.len())?;
                Ok(value.clone())
            }
            _ => Err(ValidationError::invalid_type(ValueKind::Bytes, value)),
        }
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            nullable: params.flag("nullable")?,
            minlen: params.length("minlen")?,
            maxlen: params.length("maxlen")?,
        })
    }
}

impl SchemaLike for BytesSchema {
    const CLASS: &'static str = "Bytes";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_opt(params, "minlen", self.minlen);
        dump::put_opt(params, "maxlen", self.maxlen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stillwater::Validation;

    fn unwrap_success(v: Outcome) -> Value {
        v.unwrap().into_result().unwrap()
    }

    fn unwrap_error(v: Outcome) -> ValidationError {
        match v.unwrap() {
            Validation::Failure(invalid) => invalid.first().clone(),
            Validation::Success(value) => panic!("expected failure, got {}", value),
        }
    }

    #[test]
    fn test_unconstrained_accepts_text_unchanged() {
        let value = Value::from("anything at all");
        assert_eq!(unwrap_success(StrSchema::new().check(&value)), value);
    }

    #[test]
    fn test_bytes_rejected_without_encoding() {
        let error = unwrap_error(StrSchema::new().check(&Value::bytes(*b"abc")));
        assert_eq!(
            error.kind,
            ErrorKind::InvalidType {
                expected: ValueKind::Str,
                actual: ValueKind::Bytes
            }
        );
    }

    #[test]
    fn test_decode_failure_keeps_original_bytes() {
        let schema = StrSchema::new().encoding("utf-8").unwrap();
        let error = unwrap_error(schema.check(&Value::bytes(*b"caf\xe9")));
        assert_eq!(
            error.kind,
            ErrorKind::StrDecode {
                expected: "utf-8".to_string(),
                actual: b"caf\xe9".to_vec(),
            }
        );
    }

    #[test]
    fn test_latin1_and_ascii() {
        let latin1 = StrSchema::new().encoding("latin-1").unwrap();
        assert_eq!(
            unwrap_success(latin1.check(&Value::bytes(*b"caf\xe9"))),
            Value::from("café")
        );

        let ascii = StrSchema::new().encoding("ASCII").unwrap();
        assert_eq!(
            unwrap_error(ascii.check(&Value::bytes(*b"caf\xe9"))).code(),
            "str_decode"
        );
    }

    #[test]
    fn test_unsupported_encoding() {
        assert!(StrSchema::new().encoding("ebcdic").is_err());
    }

    #[test]
    fn test_length_counts_chars() {
        let schema = StrSchema::new().max_len(4);
        assert!(schema.check(&Value::from("café")).unwrap().is_success());
    }

    #[test]
    fn test_pattern_anchored_at_start() {
        let schema = StrSchema::new().pattern("[a-z]+").unwrap();
        assert!(schema.check(&Value::from("abc1")).unwrap().is_success());
        let error = unwrap_error(schema.check(&Value::from("1abc")));
        assert_eq!(
            error.kind,
            ErrorKind::PatternMatch {
                expected: "[a-z]+".to_string(),
                actual: "1abc".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(StrSchema::new().pattern("[invalid").is_err());
    }

    #[test]
    fn test_maxlen_checked_before_pattern() {
        let schema = StrSchema::new().max_len(2).pattern("x").unwrap();
        assert_eq!(
            unwrap_error(schema.check(&Value::from("abc"))).code(),
            "max_length"
        );
    }

    #[test]
    fn test_options() {
        let schema = StrSchema::new().options(["b", "a"]).unwrap();
        assert!(schema.check(&Value::from("a")).unwrap().is_success());
        let error = unwrap_error(schema.check(&Value::from("c")));
        assert_eq!(
            error.kind,
            ErrorKind::Options {
                expected: vec![Value::from("a"), Value::from("b")],
                actual: Value::from("c"),
            }
        );
    }

    #[test]
    fn test_bytes_schema() {
        let schema = BytesSchema::new().min_len(2);
        assert!(schema.check(&Value::bytes(*b"ab")).unwrap().is_success());
        assert_eq!(
            unwrap_error(schema.check(&Value::bytes(*b"a"))).code(),
            "min_length"
        );
        assert_eq!(
            unwrap_error(schema.check(&Value::from("ab"))).code(),
            "invalid_type"
        );
    }
}
