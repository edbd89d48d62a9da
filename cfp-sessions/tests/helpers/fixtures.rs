//! Sample records for tests

use cfp_sessions::types::{Language, Level, Track};
use cfp_sessions::{SubmissionCategory, Talk};
use serde_json::{json, Value};

/// Raw submission JSON as the CFP API returns it (expanded form)
pub fn raw_submission(code: &str, category: SubmissionCategory) -> Value {
    json!({
        "code": code,
        "title": format!("Session {}", code),
        "abstract": "Abstract",
        "description": "Description",
        "track": {"id": 5203, "name": {"en": "Backend"}},
        "submission_type": {"id": category.id(), "name": {"en": category.as_str()}},
        "state": "confirmed",
        "slots": [],
        "speakers": [
            {"code": format!("SPK-{}", code), "name": "Speaker", "biography": "Bio", "avatar_url": null}
        ],
        "resources": [],
        "answers": [
            {"question": {"id": 4101}, "answer": "Japanese"},
            {"question": {"id": 4103}, "answer": "Intermediate"}
        ]
    })
}

/// `count` raw submissions with codes `{prefix}-0`, `{prefix}-1`, ...
pub fn raw_submissions(prefix: &str, count: usize, category: SubmissionCategory) -> Vec<Value> {
    (0..count)
        .map(|i| raw_submission(&format!("{}-{}", prefix, i), category))
        .collect()
}

/// Normalized talk
pub fn talk(code: &str, category: SubmissionCategory) -> Talk {
    Talk {
        code: code.to_string(),
        title: format!("Session {}", code),
        summary: "Abstract".to_string(),
        description: "Description".to_string(),
        speakers: vec![],
        track: Track::Backend,
        talk_language: Language::Ja,
        slide_language: Language::En,
        level: Level::Intermediate,
        resource: vec![],
        slot: None,
        submission_type_id: category.id(),
    }
}
