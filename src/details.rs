//! Word detail model, and turning raw model output into it.
//!
//! Generated text is untrusted: it may be wrapped in Markdown fences, cut off
//! mid-object, or have fields of the wrong type. [`parse_json_from_text`]
//! handles the framing and [`normalize`] coerces the shape, so everything
//! downstream can rely on a fully populated [`WordDetails`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TangoError};

/// Upper bound on `wordForms`, `synonyms` and `toeicExamples` entries.
pub const MAX_LIST_ENTRIES: usize = 5;

/// Structured Japanese explanation of one English word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordDetails {
    pub word: String,
    /// IPA transcription.
    pub pronunciation: String,
    pub meanings: Vec<Meaning>,
    pub word_forms: Vec<WordForm>,
    pub synonyms: Vec<String>,
    pub nuance: String,
    pub toeic_examples: Vec<ToeicExample>,
    pub english_definition: String,
    pub japanese_translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etymology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_notes: Option<UsageNotes>,
}

/// Meanings grouped under one part of speech.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meaning {
    pub part_of_speech: String,
    /// Short Japanese summary.
    pub meaning: String,
    pub detailed_meanings: Vec<DetailedMeaning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailedMeaning {
    /// Sense number. Generated fractional numbers are truncated toward zero
    /// and non-numeric ones become 0, so clients always get an integer.
    pub number: i64,
    pub definition: String,
    pub example: String,
    pub example_japanese: String,
    pub context: String,
    /// 高 / 中 / 低
    pub frequency: String,
    pub synonyms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordForm {
    pub form: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToeicExample {
    pub english: String,
    pub japanese: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_collocations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_variations: Option<String>,
}

/// Parsed but unvalidated model output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWordPayload(pub Value);

/// Extract the JSON object from free-form model output.
pub fn parse_json_from_text(text: &str) -> Result<RawWordPayload> {
    let without_fences = strip_fences(text.trim());

    if !without_fences.contains('{') {
        return Err(TangoError::Generation(
            "Gemini response did not include a JSON object".into(),
        ));
    }

    let slice = match (without_fences.find('{'), without_fences.rfind('}')) {
        (Some(start), Some(end)) if end > start => &without_fences[start..=end],
        _ => without_fences,
    };

    if !slice.trim().ends_with('}') {
        return Err(TangoError::Generation(
            "Gemini JSON output appears truncated (missing closing brace)".into(),
        ));
    }

    serde_json::from_str(slice)
        .map(RawWordPayload)
        .map_err(|e| TangoError::Generation(format!("Invalid JSON from Gemini: {e}")))
}

fn strip_fences(text: &str) -> &str {
    let mut s = text;
    if let Some(rest) = s.strip_prefix("```") {
        s = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        s = s.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s.trim()
}

/// Coerce a raw payload into [`WordDetails`], with `term` as the headword.
pub fn normalize(term: &str, raw: &RawWordPayload) -> WordDetails {
    let payload = &raw.0;

    let meanings = array(payload, "meanings")
        .iter()
        .map(|m| Meaning {
            part_of_speech: string(m, "partOfSpeech"),
            meaning: string(m, "meaning"),
            detailed_meanings: array(m, "detailedMeanings")
                .iter()
                .map(|d| DetailedMeaning {
                    number: d
                        .get("number")
                        .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
                        .unwrap_or(0),
                    definition: string(d, "definition"),
                    example: string(d, "example"),
                    example_japanese: string(d, "exampleJapanese"),
                    context: string(d, "context"),
                    frequency: string(d, "frequency"),
                    synonyms: strings(d, "synonyms"),
                    grammar_pattern: optional_string(d, "grammarPattern"),
                })
                .collect(),
        })
        .collect();

    let word_forms = array(payload, "wordForms")
        .iter()
        .take(MAX_LIST_ENTRIES)
        .map(|wf| WordForm {
            form: string(wf, "form"),
            kind: string(wf, "type"),
        })
        .collect();

    let mut synonyms = strings(payload, "synonyms");
    synonyms.truncate(MAX_LIST_ENTRIES);

    let toeic_examples = array(payload, "toeicExamples")
        .iter()
        .take(MAX_LIST_ENTRIES)
        .map(|ex| ToeicExample {
            english: string(ex, "english"),
            japanese: string(ex, "japanese"),
        })
        .collect();

    WordDetails {
        word: term.to_string(),
        pronunciation: string(payload, "pronunciation"),
        meanings,
        word_forms,
        synonyms,
        nuance: string(payload, "nuance"),
        toeic_examples,
        english_definition: string(payload, "englishDefinition"),
        japanese_translation: string(payload, "japaneseTranslation"),
        etymology: optional_string(payload, "etymology"),
        usage_notes: payload
            .get("usageNotes")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    }
}

/// Minimal shape check for values read back from the cache.
pub fn looks_like_details(value: &Value) -> bool {
    value.get("word").is_some() && value.get("meanings").is_some_and(Value::is_array)
}

fn string(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_string(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(String::from)
}

fn array<'a>(v: &'a Value, key: &str) -> &'a [Value] {
    v.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn strings(v: &Value, key: &str) -> Vec<String> {
    array(v, key)
        .iter()
        .filter_map(|s| s.as_str().map(String::from))
        .collect()
}
