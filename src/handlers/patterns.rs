//! Argument validation patterns.
//!
//! Each command carries one [`ArgPattern`] that its whole argument text must
//! match before the handler runs. Patterns are always anchored at both
//! ends; partial matches do not count.

use regex::Regex;
use std::fmt;

/// Named patterns available to registrations and the config file.
const NAMED: &[(&str, &str)] = &[
    ("digits", "[0-9]+"),
    ("song_id", "[0-9]+-[0-9]+"),
    ("alphanumeric", "[0-9A-Za-z]+"),
    ("remap", "[0-9]+,[0-9]+"),
    ("song_version", "[0-9]+(?:-[0-9]+)?"),
    ("nothing", ""),
    ("atleast1", "(?s).+"),
    ("deck", "(?:current|draw|first|last|random|unload)?"),
    ("drawcard", "(?:[0-9]+(?:-[0-9]+)?)?"),
];

/// Whole-argument validation pattern.
#[derive(Clone, Default)]
pub enum ArgPattern {
    /// Accepts any argument, including none.
    #[default]
    Anything,
    /// Accepts nothing. Used by help-only commands.
    Fail,
    /// Anchored regular expression.
    Regex { name: String, re: Regex },
}

impl ArgPattern {
    /// Compile `source` as a whole-string pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Self::compile(source, source)
    }

    fn compile(name: &str, source: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!(r"\A(?:{source})\z"))?;
        Ok(Self::Regex {
            name: name.to_string(),
            re,
        })
    }

    /// Look up a named pattern.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "anything" => return Some(Self::Anything),
            "fail" => return Some(Self::Fail),
            _ => {}
        }
        NAMED
            .iter()
            .find(|(n, _)| *n == name)
            // Table entries are known-good.
            .and_then(|(n, source)| Self::compile(n, source).ok())
    }

    /// A named pattern if `text` names one, otherwise `text` compiled as a
    /// regular expression.
    pub fn parse(text: &str) -> Result<Self, regex::Error> {
        match Self::named(text) {
            Some(pattern) => Ok(pattern),
            None => Self::new(text),
        }
    }

    pub fn anything() -> Self {
        Self::Anything
    }

    pub fn fail() -> Self {
        Self::Fail
    }

    /// Pattern that requires a non-empty argument.
    pub fn at_least_one() -> Self {
        Self::named("atleast1").unwrap_or(Self::Anything)
    }

    /// Pattern that only accepts an empty argument.
    pub fn nothing() -> Self {
        Self::named("nothing").unwrap_or(Self::Fail)
    }

    /// Whether the whole of `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Anything => true,
            Self::Fail => false,
            Self::Regex { re, .. } => re.is_match(text),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Anything => "anything",
            Self::Fail => "fail",
            Self::Regex { name, .. } => name,
        }
    }
}

impl fmt::Debug for ArgPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgPattern({})", self.name())
    }
}
