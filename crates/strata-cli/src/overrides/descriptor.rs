use serde_json::Value;
use std::fmt;
use strata_tree::{Address, ValueKind};
use tracing::debug;

/// Joins address segments into flag names
pub const DEFAULT_SEPARATOR: &str = ".";

/// Kind of a single command-line value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Float,
    Boolean,
    /// Also used for null leaves, which have no kind of their own
    String,
}

impl ScalarKind {
    /// Kind of a scalar node; `None` for mappings and sequences.
    pub fn of(value: &Value) -> Option<Self> {
        match ValueKind::of(value) {
            ValueKind::Integer => Some(Self::Integer),
            ValueKind::Float => Some(Self::Float),
            ValueKind::Boolean => Some(Self::Boolean),
            ValueKind::String | ValueKind::Null => Some(Self::String),
            ValueKind::Sequence | ValueKind::Mapping => None,
        }
    }

    /// Placeholder shown in help output.
    pub fn value_name(self) -> &'static str {
        match self {
            Self::Integer => "INT",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOL",
            Self::String => "TEXT",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// What a flag accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// Exactly one value
    Scalar(ScalarKind),
    /// One or more values of the element kind
    Sequence(ScalarKind),
}

impl FlagKind {
    pub fn element(self) -> ScalarKind {
        match self {
            Self::Scalar(kind) | Self::Sequence(kind) => kind,
        }
    }

    pub fn is_sequence(self) -> bool {
        matches!(self, Self::Sequence(_))
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Sequence(kind) => write!(f, "sequence of {kind}"),
        }
    }
}

/// One overridable leaf
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    pub address: Address,
    /// Long flag name, without the leading `--`
    pub flag_name: String,
    pub kind: FlagKind,
    /// The leaf's current value
    pub default: Value,
}

/// List a flag for every overridable leaf of `tree`, in document order.
///
/// Leaves are skipped (and debug-logged) when they can't be expressed as a
/// flag: sequences holding mappings or sequences, and keys that are empty
/// or contain whitespace or `=`.
pub fn describe(tree: &Value, separator: &str) -> Vec<FlagSpec> {
    strata_tree::leaves(tree)
        .into_iter()
        .filter_map(|(address, value)| {
            let flag_name = address.join(separator);
            if !is_valid_flag_name(&flag_name) {
                debug!(%address, "Skipping leaf whose name can't be a flag");
                return None;
            }

            let kind = match value {
                Value::Array(items) => {
                    let element = match items.first() {
                        Some(first) => ScalarKind::of(first),
                        None => Some(ScalarKind::String),
                    };
                    match element {
                        Some(kind) if items.iter().all(|i| ScalarKind::of(i).is_some()) => {
                            FlagKind::Sequence(kind)
                        }
                        _ => {
                            debug!(%address, "Skipping sequence with nested elements");
                            return None;
                        }
                    }
                }
                scalar => FlagKind::Scalar(ScalarKind::of(scalar)?),
            };

            Some(FlagSpec {
                address,
                flag_name,
                kind,
                default: value.clone(),
            })
        })
        .collect()
}

fn is_valid_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.chars().any(|c| c.is_whitespace() || c == '=')
}
