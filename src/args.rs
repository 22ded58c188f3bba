//! Argument validation.
//!
//! [`Extraction::from_args`](crate::Extraction::from_args) accepts loosely
//! typed call arguments, as produced by bindings, scripting hosts, or
//! configuration layers, and validates them before any I/O happens. Each
//! argument is a [`Value`]; the optional third argument must be a plain
//! key/value object whose keys are checked against a declarative table of
//! option validators.
//!
//! The first failed check wins and is reported as a single [`Error`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::entry::EntryHeader;
use crate::error::{Error, Result};
use crate::options::{ExtractOptions, MAP, MAP_STREAM, MapFn, MapStreamFn, TAR_TRANSFORM};
use crate::stream::{BoxedReader, Stream, Transform};

/// Name used in messages about the options object.
const CRATE_NAME: &str = "tar-to-file";

const ARCHIVE_ROLE: &str = "a path of a tar archive";
const DESTINATION_ROLE: &str = "a destination file path";

/// A callable argument value.
#[derive(Clone)]
pub enum Function {
    /// A function mapping an entry header.
    MapHeader(MapFn),
    /// A function mapping an entry content stream.
    MapStream(MapStreamFn),
}

/// A loosely typed call argument.
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// A regular expression, stored as its source pattern.
    Regex(String),
    /// A symbol, stored as its description.
    Symbol(String),
    /// An ordered list of values.
    Array(Vec<Value>),
    /// A plain key/value object; keys keep their insertion order.
    Object(Vec<(String, Value)>),
    /// A function.
    Function(Function),
    /// A stream.
    Stream(Stream),
}

impl Value {
    /// Creates a header mapping function value.
    pub fn map_fn<F>(f: F) -> Self
    where
        F: Fn(EntryHeader) -> EntryHeader + Send + Sync + 'static,
    {
        Value::Function(Function::MapHeader(Arc::new(f)))
    }

    /// Creates a stream mapping function value.
    pub fn map_stream_fn<F>(f: F) -> Self
    where
        F: Fn(BoxedReader, &EntryHeader) -> Stream + Send + Sync + 'static,
    {
        Value::Function(Function::MapStream(Arc::new(f)))
    }

    /// Creates an object value from key/value pairs.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the runtime category of the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(s) if s.is_empty() => "empty string",
            Value::String(_) => "string",
            Value::Regex(_) => "regexp",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Stream(_) => "stream",
        }
    }

    /// Formats the value followed by its category, e.g. `1 (number)`.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            other => format!("{} ({})", other, other.type_name()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Regex(pattern) => write!(f, "/{}/", pattern),
            Value::Symbol(description) => write!(f, "Symbol({})", description),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) if entries.is_empty() => write!(f, "{{}}"),
            Value::Object(entries) => {
                write!(f, "{{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, " }}")
            }
            Value::Function(Function::MapHeader(_)) => write!(f, "[Function: map]"),
            Value::Function(Function::MapStream(_)) => write!(f, "[Function: mapStream]"),
            Value::Stream(stream) => write!(f, "[{:?}]", stream),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&Path> for Value {
    fn from(path: &Path) -> Self {
        Value::String(path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Value {
    fn from(path: PathBuf) -> Self {
        Value::from(path.as_path())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Stream> for Value {
    fn from(stream: Stream) -> Self {
        Value::Stream(stream)
    }
}

impl From<Transform> for Value {
    fn from(transform: Transform) -> Self {
        Value::Stream(Stream::Transform(transform))
    }
}

impl From<ExtractOptions> for Value {
    fn from(options: ExtractOptions) -> Self {
        let mut entries = Vec::new();
        if let Some(map) = options.map {
            entries.push((MAP.to_string(), Value::Function(Function::MapHeader(map))));
        }
        if let Some(map_stream) = options.map_stream {
            entries.push((
                MAP_STREAM.to_string(),
                Value::Function(Function::MapStream(map_stream)),
            ));
        }
        if let Some(transform) = options.tar_transform {
            entries.push((TAR_TRANSFORM.to_string(), Value::from(transform)));
        }
        Value::Object(entries)
    }
}

/// A validated extraction request.
#[derive(Debug)]
pub struct ExtractionRequest {
    /// Path of the tar archive.
    pub archive_path: PathBuf,
    /// Path of the file to create.
    pub destination_path: PathBuf,
    /// Pipeline hooks.
    pub options: ExtractOptions,
}

impl ExtractionRequest {
    /// Validates typed arguments.
    ///
    /// Types are already enforced by the compiler; only emptiness is checked.
    pub fn new(
        archive_path: impl Into<PathBuf>,
        destination_path: impl Into<PathBuf>,
        options: ExtractOptions,
    ) -> Result<Self> {
        let archive_path = archive_path.into();
        let destination_path = destination_path.into();
        ensure_non_empty(&archive_path, ARCHIVE_ROLE)?;
        ensure_non_empty(&destination_path, DESTINATION_ROLE)?;
        Ok(Self {
            archive_path,
            destination_path,
            options,
        })
    }
}

fn ensure_non_empty(path: &Path, role: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid_value(format!(
            "Expected {}, but got '' (empty string).",
            role
        )));
    }
    Ok(())
}

fn path_argument(value: Value, role: &str) -> Result<PathBuf> {
    match value {
        Value::String(s) => {
            let path = PathBuf::from(s);
            ensure_non_empty(&path, role)?;
            Ok(path)
        }
        other => Err(Error::invalid_type(format!(
            "Expected {} (string), but got {}.",
            role,
            other.describe()
        ))),
    }
}

/// Validates one option value and stores it into the options.
type OptionValidator = fn(Value, &mut ExtractOptions) -> Result<()>;

/// Recognized options, in the order they are validated.
const OPTION_VALIDATORS: &[(&str, OptionValidator)] = &[
    (MAP, validate_map),
    (MAP_STREAM, validate_map_stream),
    (TAR_TRANSFORM, validate_tar_transform),
];

fn validate_map(value: Value, options: &mut ExtractOptions) -> Result<()> {
    match value {
        Value::Function(Function::MapHeader(map)) => {
            options.map = Some(map);
            Ok(())
        }
        Value::Function(Function::MapStream(_)) => Err(Error::invalid_type(format!(
            "`{}` option must be a function that maps an entry header, \
             but a stream mapping function was provided to it.",
            MAP
        ))),
        other => Err(Error::invalid_type(format!(
            "`{}` option must be a function, but {} was provided to it.",
            MAP,
            other.describe()
        ))),
    }
}

fn validate_map_stream(value: Value, options: &mut ExtractOptions) -> Result<()> {
    match value {
        Value::Function(Function::MapStream(map_stream)) => {
            options.map_stream = Some(map_stream);
            Ok(())
        }
        Value::Function(Function::MapHeader(_)) => Err(Error::invalid_type(format!(
            "`{}` option must be a function that maps an entry stream, \
             but a header mapping function was provided to it.",
            MAP_STREAM
        ))),
        other => Err(Error::invalid_type(format!(
            "`{}` option must be a function, but {} was provided to it.",
            MAP_STREAM,
            other.describe()
        ))),
    }
}

fn validate_tar_transform(value: Value, options: &mut ExtractOptions) -> Result<()> {
    let prefix = format!(
        "`{}` option must be a transform stream that modifies the tar archive before extraction, but got",
        TAR_TRANSFORM
    );
    match value {
        Value::Stream(Stream::Transform(transform)) => {
            options.tar_transform = Some(transform);
            Ok(())
        }
        Value::Stream(stream) => Err(Error::invalid_type(format!(
            "{} {} instead.",
            prefix,
            stream.describe()
        ))),
        other => Err(Error::invalid_type(format!(
            "{} a non-stream value {}.",
            prefix, other
        ))),
    }
}

fn options_argument(value: Value) -> Result<ExtractOptions> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => {
            return Err(Error::invalid_type(format!(
                "Expected an object to specify `{}` options, but got {}.",
                CRATE_NAME,
                other.describe()
            )));
        }
    };

    if let Some((key, value)) = entries
        .iter()
        .find(|(key, _)| !OPTION_VALIDATORS.iter().any(|(name, _)| name == key))
    {
        return Err(Error::invalid_type(format!(
            "`{}` doesn't support `{}` option, but {} was provided to it.",
            CRATE_NAME,
            key,
            value.describe()
        )));
    }

    // Later duplicates override earlier ones, as in an object literal.
    let mut slots: Vec<Option<Value>> = OPTION_VALIDATORS.iter().map(|_| None).collect();
    for (key, value) in entries {
        if let Some(index) = OPTION_VALIDATORS.iter().position(|(name, _)| *name == key) {
            slots[index] = Some(value);
        }
    }

    let mut options = ExtractOptions::default();
    for ((_, validate), slot) in OPTION_VALIDATORS.iter().zip(slots) {
        if let Some(value) = slot {
            validate(value, &mut options)?;
        }
    }
    Ok(options)
}

/// Validates dynamic call arguments.
///
/// Expects `(archive, destination[, options])`.
///
/// # Example
///
/// ```rust
/// use tar_to_file::args::{Value, validate};
///
/// let err = validate(vec![Value::from(1i64), Value::from("a")]).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Expected a path of a tar archive (string), but got 1 (number)."
/// );
/// ```
pub fn validate(args: Vec<Value>) -> Result<ExtractionRequest> {
    let got = args.len();
    if !(2..=3).contains(&got) {
        return Err(Error::Arity { got });
    }

    let mut args = args.into_iter();
    let (Some(archive), Some(destination)) = (args.next(), args.next()) else {
        return Err(Error::Arity { got });
    };

    let archive_path = path_argument(archive, ARCHIVE_ROLE)?;
    let destination_path = path_argument(destination, DESTINATION_ROLE)?;
    let options = match args.next() {
        Some(value) => options_argument(value)?,
        None => ExtractOptions::default(),
    };

    Ok(ExtractionRequest {
        archive_path,
        destination_path,
        options,
    })
}
