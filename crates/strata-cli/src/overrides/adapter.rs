use super::descriptor::{DEFAULT_SEPARATOR, FlagKind, FlagSpec, ScalarKind, describe};
use crate::error::{Error, Result};
use clap::{Arg, ArgMatches, Command, value_parser};
use serde_json::{Number, Value};
use std::collections::HashSet;
use strata_tree::SetMode;
use tracing::{debug, warn};

/// Long flags clap generates on its own
const RESERVED_LONGS: [&str; 2] = ["help", "version"];

/// Registers override flags on a command and applies what was parsed
///
/// ```
/// use clap::{Arg, Command};
/// use serde_json::json;
/// use strata_cli::OverrideAdapter;
///
/// let tree = json!({"verbose": false, "db": {"port": 5432}});
/// let mut adapter = OverrideAdapter::from_tree(&tree);
///
/// // `--verbose` already belongs to the caller, so only `--db.port` is added.
/// let command = adapter.augment(Command::new("app").arg(Arg::new("verbose").long("verbose")));
/// assert_eq!(adapter.registered().count(), 1);
/// assert!(command.get_arguments().any(|a| a.get_long() == Some("db.port")));
/// ```
#[derive(Debug, Clone)]
pub struct OverrideAdapter {
    specs: Vec<FlagSpec>,
    /// Indices into `specs` of the flags `augment` actually added
    registered: Vec<usize>,
}

impl OverrideAdapter {
    pub fn new(specs: Vec<FlagSpec>) -> Self {
        Self {
            specs,
            registered: Vec::new(),
        }
    }

    /// Describe `tree` with the default `.` separator.
    pub fn from_tree(tree: &Value) -> Self {
        Self::with_separator(tree, DEFAULT_SEPARATOR)
    }

    /// Describe `tree`, joining address segments with `separator`.
    pub fn with_separator(tree: &Value, separator: &str) -> Self {
        Self::new(describe(tree, separator))
    }

    /// Every overridable leaf, registered or not.
    pub fn specs(&self) -> &[FlagSpec] {
        &self.specs
    }

    /// The flags the last [`augment`](Self::augment) added.
    pub fn registered(&self) -> impl Iterator<Item = &FlagSpec> {
        self.registered.iter().map(|&i| &self.specs[i])
    }

    /// Add one optional long flag per [`FlagSpec`] to `command`.
    ///
    /// Scalar flags take exactly one value and sequence flags one or more.
    /// A flag whose name is already used by the command is skipped with a
    /// warning; the command's own argument is left alone.
    pub fn augment(&mut self, mut command: Command) -> Command {
        let mut taken: HashSet<String> = command
            .get_arguments()
            .flat_map(|arg| {
                let id = arg.get_id().as_str().to_string();
                std::iter::once(id).chain(arg.get_long().map(str::to_string))
            })
            .chain(RESERVED_LONGS.iter().map(|s| s.to_string()))
            .collect();

        self.registered.clear();
        for (index, spec) in self.specs.iter().enumerate() {
            if !taken.insert(spec.flag_name.clone()) {
                warn!(flag = %spec.flag_name, "Override flag collides with an existing argument, skipping");
                continue;
            }
            command = command.arg(flag_for(spec));
            self.registered.push(index);
        }

        debug!(
            registered = self.registered.len(),
            skipped = self.specs.len() - self.registered.len(),
            "Registered override flags"
        );
        command
    }

    /// Write every supplied override into `tree`.
    ///
    /// Values are coerced to the kind of the leaf they replace; sequences
    /// may change length. Flags that weren't supplied leave the tree
    /// untouched. Either every override is written or, on error, none is.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeCoercion`] when a value doesn't fit the leaf's kind
    /// - [`Error::Tree`] when the address can no longer be written
    ///
    /// Returns the number of overrides applied.
    pub fn apply(&self, tree: &mut Value, matches: &ArgMatches) -> Result<usize> {
        let mut pending = Vec::new();

        for spec in self.registered() {
            // Absent when `matches` came from a command without this flag.
            let Some(raw) = matches
                .try_get_many::<String>(&spec.flag_name)
                .ok()
                .flatten()
            else {
                continue;
            };
            let raw: Vec<&String> = raw.collect();

            let value = match spec.kind {
                FlagKind::Scalar(kind) => match raw.as_slice() {
                    [single] => coerce(spec, single, kind)?,
                    _ => continue,
                },
                FlagKind::Sequence(kind) => Value::Array(
                    raw.iter()
                        .map(|item| coerce(spec, item, kind))
                        .collect::<Result<_>>()?,
                ),
            };
            pending.push((spec, value));
        }

        if pending.is_empty() {
            return Ok(0);
        }

        let applied = pending.len();
        let mut staged = tree.clone();
        for (spec, value) in pending {
            debug!(flag = %spec.flag_name, %value, "Applying override");
            strata_tree::set_value(&mut staged, &spec.address, value, SetMode::Replace)?;
        }
        *tree = staged;

        Ok(applied)
    }

    /// Parse `args` (without a binary name) against a command holding only
    /// the override flags, and apply the result to `tree`.
    ///
    /// # Errors
    ///
    /// [`Error::Clap`] when the arguments don't parse, otherwise as
    /// [`apply`](Self::apply).
    pub fn apply_args<I, T>(&mut self, tree: &mut Value, name: &str, args: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let command = self.augment(
            Command::new(name.to_string())
                .no_binary_name(true)
                .disable_version_flag(true),
        );
        let matches = command.try_get_matches_from(args)?;
        self.apply(tree, &matches)
    }
}

fn flag_for(spec: &FlagSpec) -> Arg {
    let arg = Arg::new(spec.flag_name.clone())
        .long(spec.flag_name.clone())
        .value_name(spec.kind.element().value_name())
        .value_parser(value_parser!(String))
        .allow_negative_numbers(true)
        .required(false)
        .help(format!("Override `{}` (default: {})", spec.address, spec.default));

    match spec.kind {
        FlagKind::Scalar(_) => arg.num_args(1),
        FlagKind::Sequence(_) => arg.num_args(1..),
    }
}

/// Convert one command-line value to `kind`.
fn coerce(spec: &FlagSpec, raw: &str, kind: ScalarKind) -> Result<Value> {
    let fail = || Error::coercion(&spec.address, raw, kind);

    match kind {
        ScalarKind::String => Ok(Value::String(raw.to_string())),
        ScalarKind::Integer => raw.trim().parse::<i64>().map(Value::from).map_err(|_| fail()),
        ScalarKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(fail),
        ScalarKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(fail()),
        },
    }
}
