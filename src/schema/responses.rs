/// Response configuration — moods, variables, and the document formats they load from.

use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponsesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How NSFW a mood or variable is. An open set: configurations may
/// define their own levels next to the well-known ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Spiciness(pub String);

impl Spiciness {
    pub fn chill() -> Self {
        Self("chill".to_string())
    }

    /// NSFW.
    pub fn thirsty() -> Self {
        Self("thirsty".to_string())
    }

    /// NSFW.
    pub fn yikes() -> Self {
        Self("yikes".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything except `chill` is NSFW.
    pub fn is_nsfw(&self) -> bool {
        self.0 != "chill"
    }
}

impl From<&str> for Spiciness {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for Spiciness {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Spiciness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a template variable, as written inside `{...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableKey(pub String);

impl VariableKey {
    /// Selects the mood the response is drawn from.
    pub fn mood() -> Self {
        Self("mood".to_string())
    }

    pub fn emote() -> Self {
        Self("emote".to_string())
    }

    /// Possessive pronoun used for the speaker, e.g. "her".
    pub fn pronoun() -> Self {
        Self("pronoun".to_string())
    }

    /// The speaker's role, e.g. "mommy".
    pub fn role() -> Self {
        Self("role".to_string())
    }

    /// What the speaker calls you.
    pub fn affectionate_term() -> Self {
        Self("affectionate_term".to_string())
    }

    /// NSFW.
    pub fn denigrating_term() -> Self {
        Self("denigrating_term".to_string())
    }

    /// NSFW.
    pub fn part() -> Self {
        Self("part".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariableKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for VariableKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the response praises or consoles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Positive,
    Negative,
}

impl ResponseType {
    pub const ALL: [ResponseType; 2] = [ResponseType::Positive, ResponseType::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" | "+" | "0" => Ok(Self::Positive),
            "negative" | "-" | "1" => Ok(Self::Negative),
            other => Err(format!(
                "unknown response type '{}', want positive|negative",
                other
            )),
        }
    }
}

/// The raw templates of one mood.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mood {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spiciness: Option<Spiciness>,
}

impl Mood {
    pub fn templates(&self, response: ResponseType) -> &[String] {
        match response {
            ResponseType::Positive => &self.positive,
            ResponseType::Negative => &self.negative,
        }
    }
}

/// A template variable and the values it is drawn from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub defaults: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spiciness: Option<Spiciness>,
    /// Environment variable a front end may read to replace the defaults.
    /// The engine itself never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_key: Option<String>,
}

/// Per-call variable values that bypass random default selection.
pub type Overrides = HashMap<VariableKey, String>;

/// The root configuration: moods keyed by spiciness, variables by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Responses {
    #[serde(default)]
    pub moods: HashMap<Spiciness, Mood>,
    #[serde(default)]
    pub vars: HashMap<VariableKey, Variable>,
}

impl Responses {
    /// Load a configuration file. `.json` files are read as JSON,
    /// everything else as RON.
    pub fn load(path: &Path) -> Result<Responses, ResponsesError> {
        let contents = std::fs::read_to_string(path)?;
        let responses = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::parse_json(&contents)?,
            _ => Self::parse_ron(&contents)?,
        };
        tracing::debug!(
            path = %path.display(),
            moods = responses.moods.len(),
            vars = responses.vars.len(),
            "loaded responses"
        );
        Ok(responses)
    }

    /// Parse a configuration from a RON string. Optional tags may be
    /// written bare (`spiciness: "yikes"`) instead of `Some("yikes")`.
    pub fn parse_ron(input: &str) -> Result<Responses, ResponsesError> {
        let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
        Ok(options.from_str(input)?)
    }

    /// Parse a configuration from a JSON string.
    pub fn parse_json(input: &str) -> Result<Responses, ResponsesError> {
        Ok(serde_json::from_str(input)?)
    }

    /// A copy with `key`'s default list replaced. The receiver is left
    /// untouched.
    pub fn with_variable(&self, key: VariableKey, defaults: Vec<String>) -> Responses {
        let mut derived = self.clone();
        derived.replace_defaults(key, defaults);
        derived
    }

    /// A copy with every listed variable's defaults replaced.
    pub fn with_variables<I>(&self, vars: I) -> Responses
    where
        I: IntoIterator<Item = (VariableKey, Vec<String>)>,
    {
        let mut derived = self.clone();
        for (key, defaults) in vars {
            derived.replace_defaults(key, defaults);
        }
        derived
    }

    fn replace_defaults(&mut self, key: VariableKey, defaults: Vec<String>) {
        self.vars.entry(key).or_default().defaults = defaults;
    }

    /// Default lists taken from each variable's `env_key`, looked up
    /// through `lookup`. Values are `/`-separated; empty values are skipped.
    pub fn env_overrides<F>(&self, lookup: F) -> HashMap<VariableKey, Vec<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = HashMap::new();
        for (key, var) in &self.vars {
            let Some(env_key) = var.env_key.as_deref() else {
                continue;
            };
            let Some(value) = lookup(env_key) else {
                continue;
            };
            let defaults: Vec<String> = value
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !defaults.is_empty() {
                overrides.insert(key.clone(), defaults);
            }
        }
        overrides
    }

    /// True if the `mood` variable may pick anything but `chill`.
    pub fn is_nsfw(&self) -> bool {
        self.vars
            .get("mood")
            .map(|var| var.defaults.iter().any(|m| m != "chill"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Responses {
        Responses::parse_ron(
            r#"(
                moods: {
                    "chill": (
                        positive: ["good {affectionate_term}~"],
                        negative: ["{role} still loves you~"],
                    ),
                    "thirsty": (
                        positive: ["*pats your head*"],
                        negative: ["try harder~"],
                        spiciness: "thirsty",
                    ),
                },
                vars: {
                    "mood": (defaults: ["chill"], env_key: "MOMMYS_MOODS"),
                    "role": (defaults: ["mommy"], env_key: "MOMMYS_ROLES"),
                    "affectionate_term": (defaults: ["girl"]),
                    "part": (defaults: [], spiciness: "yikes"),
                },
            )"#,
        )
        .unwrap()
    }

    #[test]
    fn parse_ron_document() {
        let r = sample();
        assert_eq!(r.moods.len(), 2);
        assert_eq!(r.vars.len(), 4);
        assert_eq!(r.moods["chill"].positive, vec!["good {affectionate_term}~"]);
        assert_eq!(r.moods["thirsty"].spiciness, Some(Spiciness::thirsty()));
        assert_eq!(r.moods["chill"].spiciness, None);
        assert_eq!(r.vars["part"].spiciness, Some(Spiciness::yikes()));
        assert_eq!(r.vars["role"].env_key.as_deref(), Some("MOMMYS_ROLES"));
        assert!(r.vars["part"].defaults.is_empty());
    }

    #[test]
    fn parse_json_document() {
        let r = Responses::parse_json(
            r#"{
                "moods": {
                    "chill": {
                        "positive": ["good {affectionate_term}~"],
                        "negative": ["{role} still loves you~"]
                    }
                },
                "vars": {
                    "role": { "defaults": ["mommy"], "env_key": "MOMMYS_ROLES" },
                    "denigrating_term": { "defaults": ["pet"], "spiciness": "yikes" }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(r.moods["chill"].negative, vec!["{role} still loves you~"]);
        assert_eq!(r.vars["role"].defaults, vec!["mommy"]);
        assert_eq!(
            r.vars["denigrating_term"].spiciness,
            Some(Spiciness::yikes())
        );
    }

    #[test]
    fn parse_rejects_malformed_documents() {
        assert!(matches!(
            Responses::parse_ron("(moods: {"),
            Err(ResponsesError::Ron(_))
        ));
        assert!(matches!(
            Responses::parse_json("{\"moods\": []}"),
            Err(ResponsesError::Json(_))
        ));
    }

    #[test]
    fn with_variable_leaves_original_untouched() {
        let base = sample();
        let derived = base.with_variable(VariableKey::role(), vec!["daddy".to_string()]);

        assert_eq!(derived.vars["role"].defaults, vec!["daddy"]);
        assert_eq!(base.vars["role"].defaults, vec!["mommy"]);
        // Tags survive the replacement.
        assert_eq!(derived.vars["role"].env_key.as_deref(), Some("MOMMYS_ROLES"));
    }

    #[test]
    fn with_variables_inserts_unknown_keys() {
        let base = sample();
        let derived = base.with_variables([
            (VariableKey::pronoun(), vec!["his".to_string()]),
            (VariableKey::mood(), vec!["chill".to_string(), "thirsty".to_string()]),
        ]);

        assert_eq!(derived.vars["pronoun"].defaults, vec!["his"]);
        assert_eq!(derived.vars["pronoun"].env_key, None);
        assert_eq!(derived.vars["mood"].defaults.len(), 2);
        assert!(!base.vars.contains_key("pronoun"));
    }

    #[test]
    fn env_overrides_split_on_slash() {
        let r = sample();
        let env = HashMap::from([
            ("MOMMYS_ROLES".to_string(), "mommy/daddy".to_string()),
            ("MOMMYS_MOODS".to_string(), String::new()),
        ]);
        let overrides = r.env_overrides(|k| env.get(k).cloned());

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[&VariableKey::role()], vec!["mommy", "daddy"]);
    }

    #[test]
    fn nsfw_detection() {
        let r = sample();
        assert!(!r.is_nsfw());
        let spicy = r.with_variable(
            VariableKey::mood(),
            vec!["chill".to_string(), "thirsty".to_string()],
        );
        assert!(spicy.is_nsfw());
        assert!(!Responses::default().is_nsfw());

        assert!(!Spiciness::chill().is_nsfw());
        assert!(Spiciness::thirsty().is_nsfw());
        assert!(Spiciness::from("spicy").is_nsfw());
    }

    #[test]
    fn response_type_parsing() {
        assert_eq!("positive".parse::<ResponseType>(), Ok(ResponseType::Positive));
        assert_eq!("+".parse::<ResponseType>(), Ok(ResponseType::Positive));
        assert_eq!("0".parse::<ResponseType>(), Ok(ResponseType::Positive));
        assert_eq!("negative".parse::<ResponseType>(), Ok(ResponseType::Negative));
        assert_eq!("-".parse::<ResponseType>(), Ok(ResponseType::Negative));
        assert_eq!("1".parse::<ResponseType>(), Ok(ResponseType::Negative));
        assert!("meh".parse::<ResponseType>().is_err());
        assert_eq!(ResponseType::Negative.to_string(), "negative");
    }

    #[test]
    fn mood_templates_by_response() {
        let r = sample();
        let chill = &r.moods["chill"];
        assert_eq!(chill.templates(ResponseType::Positive), &chill.positive[..]);
        assert_eq!(chill.templates(ResponseType::Negative), &chill.negative[..]);
    }
}
