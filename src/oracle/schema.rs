//! Typed oracle replies and the response schemas sent alongside requests.
//!
//! The schema's `required` list and the struct's non-defaulted fields must
//! agree: a reply missing a required field fails to decode instead of
//! producing a half-filled value.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{AppError, Result};

pub fn string() -> Value {
    json!({ "type": "STRING" })
}

pub fn boolean() -> Value {
    json!({ "type": "BOOLEAN" })
}

pub fn number() -> Value {
    json!({ "type": "NUMBER" })
}

pub fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

pub fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let props: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, ty)| (name.to_string(), ty.clone()))
        .collect();
    json!({ "type": "OBJECT", "properties": props, "required": required })
}

/// A reply type with a declared response schema.
pub trait StructuredResponse: DeserializeOwned {
    fn schema() -> Value;

    /// Checks serde cannot express (non-empty lists and the like).
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Decode a structured reply, or fail with [`AppError::OracleSchema`].
pub fn decode<T: StructuredResponse>(raw: &str) -> Result<T> {
    let body = strip_code_fence(raw);
    let value: T = serde_json::from_str(body)
        .map_err(|e| AppError::OracleSchema(format!("{e}")))?;
    value.validate()?;
    Ok(value)
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsodyAnalysis {
    pub verse: String,
    pub diacritized_verse: String,
    pub meter: String,
    pub scanning: String,
    pub feet: Vec<String>,
    #[serde(default)]
    pub syllables: Vec<String>,
    pub explanation: String,
    pub is_correct: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl StructuredResponse for ProsodyAnalysis {
    fn schema() -> Value {
        object(
            &[
                ("verse", string()),
                ("diacritizedVerse", string()),
                ("meter", string()),
                ("scanning", string()),
                ("feet", string_array()),
                ("syllables", string_array()),
                ("explanation", string()),
                ("isCorrect", boolean()),
                ("errors", string_array()),
            ],
            &[
                "verse",
                "diacritizedVerse",
                "meter",
                "scanning",
                "feet",
                "explanation",
                "isCorrect",
            ],
        )
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GeneratedPoem {
    pub verses: Vec<String>,
}

impl StructuredResponse for GeneratedPoem {
    fn schema() -> Value {
        object(&[("verses", string_array())], &["verses"])
    }

    fn validate(&self) -> Result<()> {
        if self.verses.iter().all(|v| v.trim().is_empty()) {
            return Err(AppError::OracleSchema("poem has no verses".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreativeSuggestions {
    pub themes: Vec<String>,
    pub imagery: Vec<String>,
    pub emotions: Vec<String>,
}

impl StructuredResponse for CreativeSuggestions {
    fn schema() -> Value {
        object(
            &[
                ("themes", string_array()),
                ("imagery", string_array()),
                ("emotions", string_array()),
            ],
            &["themes", "imagery", "emotions"],
        )
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub hint: String,
}

impl StructuredResponse for QuizQuestion {
    fn schema() -> Value {
        object(
            &[
                ("id", string()),
                ("type", string()),
                ("question", string()),
                ("options", string_array()),
                ("correctAnswer", string()),
                ("explanation", string()),
                ("hint", string()),
            ],
            &["id", "type", "question", "correctAnswer", "explanation", "hint"],
        )
    }

    fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() || self.correct_answer.trim().is_empty() {
            return Err(AppError::OracleSchema(
                "quiz question without question text or answer".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentFeedback {
    pub is_correct: bool,
    /// Out of 10.
    pub score: f64,
    pub message: String,
    pub guidance: String,
}

impl StructuredResponse for AssessmentFeedback {
    fn schema() -> Value {
        object(
            &[
                ("isCorrect", boolean()),
                ("score", number()),
                ("message", string()),
                ("guidance", string()),
            ],
            &["isCorrect", "score", "message", "guidance"],
        )
    }

    fn validate(&self) -> Result<()> {
        if !self.score.is_finite() {
            return Err(AppError::OracleSchema("feedback score is not a number".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_of<T: StructuredResponse>() -> Vec<String> {
        T::schema()["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn analysis_decodes_with_optional_fields_missing() {
        let raw = r#"{
            "verse": "قفا نبك من ذكرى حبيب ومنزل",
            "diacritizedVerse": "قِفَا نَبْكِ مِنْ ذِكْرَى حَبِيبٍ وَمَنْزِلِ",
            "meter": "الطويل",
            "scanning": "11010 1101010 11010 110110",
            "feet": ["فعولن", "مفاعيلن", "فعولن", "مفاعلن"],
            "explanation": "...",
            "isCorrect": true
        }"#;
        let a: ProsodyAnalysis = decode(raw).unwrap();
        assert_eq!(a.meter, "الطويل");
        assert_eq!(a.feet.len(), 4);
        assert!(a.syllables.is_empty());
        assert!(a.errors.is_empty());
    }

    #[test]
    fn every_required_field_is_enforced() {
        let full = serde_json::json!({
            "verse": "v", "diacritizedVerse": "d", "meter": "m", "scanning": "s",
            "feet": [], "explanation": "e", "isCorrect": false
        });
        for field in required_of::<ProsodyAnalysis>() {
            let mut partial = full.clone();
            partial.as_object_mut().unwrap().remove(&field);
            let err = decode::<ProsodyAnalysis>(&partial.to_string()).unwrap_err();
            assert!(matches!(err, AppError::OracleSchema(_)), "{field} should be required");
        }
    }

    #[test]
    fn wrong_type_is_schema_error() {
        let raw = r#"{"isCorrect": "yes", "score": 7, "message": "m", "guidance": "g"}"#;
        assert!(matches!(
            decode::<AssessmentFeedback>(raw),
            Err(AppError::OracleSchema(_))
        ));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"verses\": [\"a\", \"b\"]}\n```";
        let poem: GeneratedPoem = decode(raw).unwrap();
        assert_eq!(poem.verses, vec!["a", "b"]);
    }

    #[test]
    fn empty_poem_fails_validation() {
        assert!(decode::<GeneratedPoem>(r#"{"verses": []}"#).is_err());
        assert!(decode::<GeneratedPoem>(r#"{"verses": ["  "]}"#).is_err());
    }

    #[test]
    fn quiz_question_maps_type_field() {
        let raw = r#"{
            "id": "q1", "type": "knowledge", "question": "كم تفعيلة في الطويل؟",
            "options": ["4", "6", "8"], "correctAnswer": "8",
            "explanation": "أربع في كل شطر", "hint": "عدّ الشطرين"
        }"#;
        let q: QuizQuestion = decode(raw).unwrap();
        assert_eq!(q.kind, "knowledge");
        assert_eq!(q.options.len(), 3);
        assert_eq!(q.correct_answer, "8");
    }

    #[test]
    fn schema_required_lists_match_declared_properties() {
        for schema in [
            ProsodyAnalysis::schema(),
            GeneratedPoem::schema(),
            CreativeSuggestions::schema(),
            QuizQuestion::schema(),
            AssessmentFeedback::schema(),
        ] {
            let props = schema["properties"].as_object().unwrap();
            for req in schema["required"].as_array().unwrap() {
                assert!(props.contains_key(req.as_str().unwrap()));
            }
        }
    }
}
