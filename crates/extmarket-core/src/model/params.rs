// ── Query parameters ──
//
// Everything the user can change about what the feed shows. Two
// parameter sets are the same feed exactly when they compare equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ── Category ────────────────────────────────────────────────────────

/// Catalog category (`widgets`, `themes`, ...). Free-form on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Build from user input. Blank input means "no category filter".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── SortKey ─────────────────────────────────────────────────────────

/// Result ordering. Every ordering is made total by an `id` tie-break.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    /// Recently updated, not yet popular.
    #[default]
    #[strum(to_string = "new_and_rising", serialize = "up_and_coming")]
    #[serde(alias = "up_and_coming")]
    NewAndRising,
    DownloadCountMonth,
    DownloadCountTotal,
    GithubStars,
    LastUpdated,
    Name,
}

impl SortKey {
    /// Stable key used on the command line and in saved preferences.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Human label shown in status text.
    pub fn label(self) -> &'static str {
        match self {
            Self::NewAndRising => "New & Rising",
            Self::DownloadCountMonth => "Popular This Month",
            Self::DownloadCountTotal => "Most Downloaded",
            Self::GithubStars => "Most Stars",
            Self::LastUpdated => "Recently Updated",
            Self::Name => "Name (A-Z)",
        }
    }
}

// ── VersionTag ──────────────────────────────────────────────────────

/// JupyterLab major version an extension must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum VersionTag {
    #[serde(rename = "3")]
    Lab3,
    #[serde(rename = "4")]
    Lab4,
}

impl VersionTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lab3 => "3",
            Self::Lab4 => "4",
        }
    }

    /// Parse a user choice where `all` (or blank) means no version filter.
    pub fn parse_choice(raw: &str) -> Result<Option<Self>, UnknownVersion> {
        match raw.trim() {
            "" | "all" => Ok(None),
            other => other.parse().map(Some),
        }
    }

    /// Inverse of [`parse_choice`](Self::parse_choice).
    pub fn choice_str(tag: Option<Self>) -> &'static str {
        tag.map_or("all", Self::as_str)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected JupyterLab version string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown JupyterLab version {0:?} (expected 3, 4 or all)")]
pub struct UnknownVersion(pub String);

impl FromStr for VersionTag {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3" => Ok(Self::Lab3),
            "4" => Ok(Self::Lab4),
            other => Err(UnknownVersion(other.to_owned())),
        }
    }
}

// ── QueryParameters ─────────────────────────────────────────────────

/// The user-controlled inputs of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryParameters {
    pub search_text: String,
    pub category: Option<Category>,
    pub sort: SortKey,
    pub version: Option<VersionTag>,
}

impl QueryParameters {
    /// Search text with surrounding whitespace removed, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        let trimmed = self.search_text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Same parameters with the search text reduced to its `search_term`,
    /// so queries that would encode identically also compare equal.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let term = self.search_term().unwrap_or_default();
        if term.len() != self.search_text.len() {
            self.search_text = term.to_owned();
        }
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_version(mut self, version: Option<VersionTag>) -> Self {
        self.version = version;
        self
    }
}
