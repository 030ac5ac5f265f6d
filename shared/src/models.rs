use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// One nomination in the ledger. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub category: String,
    pub candidate: String,
    pub voter: Option<String>,
    #[serde(with = "iso8601")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VoteMetadata>,
}

impl Vote {
    pub fn new(
        category: impl Into<String>,
        candidate: impl Into<String>,
        voter: impl Into<String>,
        metadata: Option<VoteMetadata>,
    ) -> Self {
        Self::at(category, candidate, voter, metadata, OffsetDateTime::now_utc())
    }

    pub fn at(
        category: impl Into<String>,
        candidate: impl Into<String>,
        voter: impl Into<String>,
        metadata: Option<VoteMetadata>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            category: category.into(),
            candidate: candidate.into(),
            voter: Some(voter.into()),
            timestamp,
            metadata,
        }
    }

    pub fn is_by(&self, voter: &str) -> bool {
        self.voter.as_deref() == Some(voter)
    }
}

/// Audit data captured when a vote is written. Not used for tallying.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteMetadata {
    pub ip: String,
    pub user_agent: String,
    pub raw_ua: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub results_locked: bool,
}

/// The whole persisted store. `settings` is `None` only for documents written
/// before settings existed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            votes: Vec::new(),
            settings: Some(Settings::default()),
        }
    }
}

impl Document {
    pub fn settings(&self) -> Settings {
        self.settings.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub category: String,
    pub candidate: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoterStats {
    pub voter: String,
    pub categories_voted: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub last_voted_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub candidate: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResults {
    pub category: String,
    pub total_votes: usize,
    pub standings: Vec<Standing>,
}

impl CategoryResults {
    pub fn leader(&self) -> Option<&Standing> {
        self.standings.first()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub categories: Vec<CategoryResults>,
}

impl Leaderboard {
    pub fn category(&self, name: &str) -> Option<&CategoryResults> {
        self.categories.iter().find(|c| c.category == name)
    }
}

/// A participant's nominations, keyed by category so no category can appear twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BallotRequest {
    pub voter: String,
    pub nominations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BallotResponse {
    pub voter: String,
    pub recorded: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub cast_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoterStatus {
    pub voter: String,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemovedResponse {
    pub removed: usize,
}

/// Timestamps are written as RFC 3339. Older documents carry naive ISO 8601
/// timestamps with no offset; those are read as UTC.
pub mod iso8601 {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::{Iso8601, Rfc3339};
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = value.format(&Rfc3339).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(de::Error::custom)
    }

    pub fn parse(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
        OffsetDateTime::parse(text, &Rfc3339).or_else(|_| {
            PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(PrimitiveDateTime::assume_utc)
        })
    }
}
