//! Session data types
//!
//! Two families of types live here:
//! - **Raw types** mirror the remote CFP platform's JSON and are only ever
//!   deserialized from API responses.
//! - **Normalized types** (`Talk` and its parts) are what the cache stores,
//!   persists in the snapshot, and hands to consumers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Raw remote types
// ============================================================================

/// Deserialize an explicit `null` the same way as an absent field
///
/// Pair with `#[serde(default)]` so both cases yield `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reference to another remote object
///
/// The API returns a bare id, or the full object when the field is listed in
/// `expand`. Only the id is needed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdRef {
    Id(i64),
    Expanded { id: i64 },
}

impl IdRef {
    pub fn id(&self) -> i64 {
        match *self {
            IdRef::Id(id) | IdRef::Expanded { id } => id,
        }
    }
}

/// Text in both site languages
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalizedText {
    #[serde(default, deserialize_with = "null_as_default")]
    pub en: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ja: String,
}

/// One submission record as returned by the remote source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSubmission {
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub track: Option<IdRef>,
    #[serde(alias = "submission_type_id")]
    pub submission_type: IdRef,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slots: Vec<RawSlot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub speakers: Vec<RawSpeaker>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<RawResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<RawAnswer>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSlot {
    #[serde(default)]
    pub room: Option<RawRoom>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRoom {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: LocalizedText,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSpeaker {
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default, alias = "avatar")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAnswer {
    pub question: IdRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
}

/// One page of a paginated list response
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Absolute URL of the next page, `None` on the last page
    #[serde(default)]
    pub next: Option<String>,
}

// ============================================================================
// Normalized types
// ============================================================================

/// Canonical session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Talk {
    /// Unique session code, used as the cache key
    pub code: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub description: String,
    pub speakers: Vec<Speaker>,
    pub track: Track,
    pub talk_language: Language,
    pub slide_language: Language,
    pub level: Level,
    pub resource: Vec<Resource>,
    /// Room and time, only when the session is fully scheduled
    pub slot: Option<Slot>,
    pub submission_type_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub code: String,
    pub name: String,
    pub biography: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub resource: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: LocalizedText,
}

/// Scheduled room and time of a session
///
/// Only constructible with all three parts present, so a `Slot` is never
/// partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    room: Room,
    start: String,
    end: String,
}

impl Slot {
    pub fn new(room: Room, start: String, end: String) -> Self {
        Self { room, start, end }
    }

    /// Build from a raw slot; `None` unless room, start and end are all set
    pub fn from_raw(raw: &RawSlot) -> Option<Self> {
        let room = raw.room.as_ref()?;
        let start = raw.start.as_ref()?;
        let end = raw.end.as_ref()?;

        Some(Self::new(
            Room {
                id: room.id,
                name: room.name.clone(),
            },
            start.clone(),
            end.clone(),
        ))
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    /// ISO-8601 start timestamp, as sent by the remote source
    pub fn start(&self) -> &str {
        &self.start
    }

    /// ISO-8601 end timestamp, as sent by the remote source
    pub fn end(&self) -> &str {
        &self.end
    }
}

/// Thematic track of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Web,
    Frontend,
    Backend,
    Mobile,
    Ai,
    Devops,
    Security,
    Design,
    Community,
    Other,
}

impl Track {
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Web => "web",
            Track::Frontend => "frontend",
            Track::Backend => "backend",
            Track::Mobile => "mobile",
            Track::Ai => "ai",
            Track::Devops => "devops",
            Track::Security => "security",
            Track::Design => "design",
            Track::Community => "community",
            Track::Other => "other",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language a talk is given in, or its slides are written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
}

/// Expected audience experience, ordered from least to most
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

// ============================================================================
// Submission categories
// ============================================================================

/// Kind of session, identified by a fixed submission-type id on the remote platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionCategory {
    Talk,
    SpecialSession,
    Poster,
    CommunityPoster,
}

impl SubmissionCategory {
    /// Every category, in the order they are fetched during cache generation
    pub const ALL: [SubmissionCategory; 4] = [
        SubmissionCategory::Talk,
        SubmissionCategory::SpecialSession,
        SubmissionCategory::Poster,
        SubmissionCategory::CommunityPoster,
    ];

    /// Submission-type id on the remote platform
    pub fn id(&self) -> i64 {
        match self {
            SubmissionCategory::Talk => 3301,
            SubmissionCategory::SpecialSession => 3302,
            SubmissionCategory::Poster => 3303,
            SubmissionCategory::CommunityPoster => 3304,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionCategory::Talk => "talk",
            SubmissionCategory::SpecialSession => "special",
            SubmissionCategory::Poster => "poster",
            SubmissionCategory::CommunityPoster => "community-poster",
        }
    }
}

impl fmt::Display for SubmissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown category '{}' (expected one of: talk, special, poster, community-poster)",
                    s
                )
            })
    }
}
