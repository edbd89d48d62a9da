//! Session normalizer
//!
//! Turns one [`RawSubmission`] into a [`Talk`]. Normalization is total: every
//! input yields a talk, and anything that cannot be resolved (unknown track
//! id, missing or unrecognized survey answer, incomplete slot) falls back to
//! a documented default instead of failing.
//!
//! The ids below are contract constants of the remote CFP platform. They are
//! versioned with this code rather than discovered at runtime.

use crate::types::{
    Language, Level, RawSubmission, Resource, Slot, Speaker, Talk, Track,
};

/// Track id on the remote platform → track tag
const TRACK_TABLE: &[(i64, Track)] = &[
    (5201, Track::Web),
    (5202, Track::Frontend),
    (5203, Track::Backend),
    (5204, Track::Mobile),
    (5205, Track::Ai),
    (5206, Track::Devops),
    (5207, Track::Security),
    (5208, Track::Design),
    (5209, Track::Community),
    (5210, Track::Other),
];

/// Track used for unmapped or missing track ids
pub const FALLBACK_TRACK: Track = Track::Other;

/// Question asking which language the talk is given in
pub const TALK_LANGUAGE_QUESTION_ID: i64 = 4101;
/// Question asking which language the slides are written in
pub const SLIDE_LANGUAGE_QUESTION_ID: i64 = 4102;
/// Question asking for the audience level
pub const LEVEL_QUESTION_ID: i64 = 4103;

/// Answer text → language, compared trimmed and case-insensitively
const LANGUAGE_TABLE: &[(&str, Language)] = &[
    ("english", Language::En),
    ("英語", Language::En),
    ("japanese", Language::Ja),
    ("日本語", Language::Ja),
];

/// Answer text → level, compared trimmed and case-insensitively
const LEVEL_TABLE: &[(&str, Level)] = &[
    ("beginner", Level::Beginner),
    ("初級", Level::Beginner),
    ("intermediate", Level::Intermediate),
    ("中級", Level::Intermediate),
    ("advanced", Level::Advanced),
    ("上級", Level::Advanced),
    ("expert", Level::Expert),
    ("エキスパート", Level::Expert),
];

/// Map a remote track id to its tag
pub fn track_for_id(track_id: Option<i64>) -> Track {
    track_id
        .and_then(|id| {
            TRACK_TABLE
                .iter()
                .find(|(known, _)| *known == id)
                .map(|(_, track)| *track)
        })
        .unwrap_or(FALLBACK_TRACK)
}

/// Text of the answer to `question_id`, or an empty string when unanswered
fn answer_text(raw: &RawSubmission, question_id: i64) -> &str {
    raw.answers
        .iter()
        .find(|a| a.question.id() == question_id)
        .map(|a| a.answer.as_str())
        .unwrap_or("")
}

fn lookup<T: Copy + Default>(table: &[(&str, T)], text: &str) -> T {
    let key = text.trim().to_lowercase();
    table
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, value)| *value)
        .unwrap_or_default()
}

pub fn language_from_answer(text: &str) -> Language {
    lookup(LANGUAGE_TABLE, text)
}

pub fn level_from_answer(text: &str) -> Level {
    lookup(LEVEL_TABLE, text)
}

/// Normalize one raw submission
pub fn normalize(raw: &RawSubmission) -> Talk {
    let speakers = raw
        .speakers
        .iter()
        .map(|s| Speaker {
            code: s.code.clone(),
            name: s.name.clone(),
            biography: s.biography.clone().unwrap_or_default(),
            avatar_url: s.avatar_url.clone(),
        })
        .collect();

    let resource = raw
        .resources
        .iter()
        .map(|r| Resource {
            resource: r.resource.clone(),
            description: r.description.clone(),
        })
        .collect();

    Talk {
        code: raw.code.clone(),
        title: raw.title.clone(),
        summary: raw.summary.clone().unwrap_or_default(),
        description: raw.description.clone().unwrap_or_default(),
        speakers,
        track: track_for_id(raw.track.map(|t| t.id())),
        talk_language: language_from_answer(answer_text(raw, TALK_LANGUAGE_QUESTION_ID)),
        slide_language: language_from_answer(answer_text(raw, SLIDE_LANGUAGE_QUESTION_ID)),
        level: level_from_answer(answer_text(raw, LEVEL_QUESTION_ID)),
        resource,
        // Only the first slot counts
        slot: raw.slots.first().and_then(Slot::from_raw),
        submission_type_id: raw.submission_type.id(),
    }
}
