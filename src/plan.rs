use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported primitive operations.
///
/// Kept small and well-defined; this enum is the contract between the planner
/// and the executor. Tool dispatch is by tagged variant, never by free-form
/// string at runtime.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum ToolKind {
    #[serde(rename = "WEATHER")]
    #[strum(serialize = "WEATHER")]
    Weather,
    #[serde(rename = "WIKIPEDIA_SUMMARY")]
    #[strum(serialize = "WIKIPEDIA_SUMMARY")]
    WikipediaSummary,
    #[serde(rename = "CALCULATE")]
    #[strum(serialize = "CALCULATE")]
    Calculate,
    #[serde(rename = "TIME_IN")]
    #[strum(serialize = "TIME_IN")]
    TimeIn,
    #[serde(rename = "SUMMARIZE")]
    #[strum(serialize = "SUMMARIZE")]
    Summarize,
}

/// How the final answer should read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Concise,
    Detailed,
    Bullet,
}

/// One unit of work in a [`Plan`].
///
/// Created once by the planner and immutable thereafter. `input` is a nested
/// JSON value whose string leaves may be placeholder tokens referencing the
/// output of a dependency (see [`OutputRef`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToolKind,
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Short planner rationale, carried through for audit only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, kind: ToolKind, input: Value) -> Self {
        Self {
            id: id.into(),
            kind,
            input,
            depends_on: Vec::new(),
            notes: None,
        }
    }

    pub fn depends_on(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Structured plan produced by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub user_intent: String,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub output_style: OutputStyle,
}

impl Plan {
    pub fn new(user_intent: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            user_intent: user_intent.into(),
            steps,
            output_style: OutputStyle::Concise,
        }
    }
}

/// A parsed placeholder reference: `{{step_id}}` or `{{step_id.output.a.b}}`.
///
/// The leading `output` segment after the step id is part of the token syntax
/// and is not a lookup key; everything after it is a dot-path into the
/// referenced step's output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRef {
    pub step_id: String,
    pub path: Vec<String>,
}

impl OutputRef {
    /// Parse a string that is entirely a placeholder token.
    ///
    /// Returns `None` for ordinary strings, including ones that merely
    /// *contain* `{{..}}` somewhere in the middle.
    pub fn parse(raw: &str) -> Option<Self> {
        let inner = raw.strip_prefix("{{")?.strip_suffix("}}")?.trim();
        if inner.is_empty() {
            return None;
        }

        let mut segments = inner.split('.').map(str::trim);
        let step_id = segments.next()?.to_string();
        if step_id.is_empty() {
            return None;
        }

        let mut path: Vec<String> = segments.map(str::to_string).collect();
        if path.iter().any(String::is_empty) {
            return None;
        }
        if path.first().map(String::as_str) == Some("output") {
            path.remove(0);
        }

        Some(Self { step_id, path })
    }

    /// Canonical token rendering, used in fault messages.
    pub fn token(&self) -> String {
        if self.path.is_empty() {
            format!("{{{{{}}}}}", self.step_id)
        } else {
            format!("{{{{{}.output.{}}}}}", self.step_id, self.path.join("."))
        }
    }
}
