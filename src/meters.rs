//! Reference data for the prosody lab: the sixteen meters and the lesson path.

use rust_i18n::t;

use crate::error::{AppError, Result};
use crate::oracle::prosody::QuizLevel;
use crate::text::normalize_input;

/// The fifteen meters of al-Khalil plus al-Mutadarak, in circle order.
pub const METERS: [&str; 16] = [
    "الطويل",
    "المديد",
    "البسيط",
    "الوافر",
    "الكامل",
    "الهزج",
    "الرجز",
    "الرمل",
    "السريع",
    "المنسرح",
    "الخفيف",
    "المضارع",
    "المقتضب",
    "المجتث",
    "المتقارب",
    "المتدارك",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lesson {
    pub id: u8,
    pub title: &'static str,
    pub summary: &'static str,
    pub level: QuizLevel,
}

pub const LESSONS: [Lesson; 6] = [
    Lesson {
        id: 1,
        title: "أساسيات الكتابة العروضية",
        summary: "ما ينطق يكتب وما لا ينطق لا يكتب.",
        level: QuizLevel::Beginner,
    },
    Lesson {
        id: 2,
        title: "مفهوم السبب والوتد",
        summary: "بناء اللبنات الأولى للتفعيلة الشعرية.",
        level: QuizLevel::Beginner,
    },
    Lesson {
        id: 3,
        title: "البحر الطويل",
        summary: "دراسة تفعيلات فعولن مفاعيلن وتفرعاتها.",
        level: QuizLevel::Intermediate,
    },
    Lesson {
        id: 4,
        title: "البحر البسيط",
        summary: "مستفعلن فاعلن مستفعلن فاعلن.",
        level: QuizLevel::Intermediate,
    },
    Lesson {
        id: 5,
        title: "الزحافات والعلل",
        summary: "التغييرات التي تطرأ على تفعيلات البحور.",
        level: QuizLevel::Advanced,
    },
    Lesson {
        id: 6,
        title: "الضرورات الشعرية",
        summary: "ما يجوز للشاعر ولا يجوز لغيره.",
        level: QuizLevel::Advanced,
    },
];

pub fn lessons_for(level: QuizLevel) -> impl Iterator<Item = &'static Lesson> {
    LESSONS.iter().filter(move |lesson| lesson.level == level)
}

/// Resolve user input to a canonical meter name.
///
/// Accepts the bare name with or without the article and an optional
/// leading "بحر", so "طويل", "الطويل" and "بحر الطويل" all match.
pub fn canonical_meter(input: &str) -> Option<&'static str> {
    let name = normalize_input(input);
    let name = name.strip_prefix("بحر").map(str::trim_start).unwrap_or(&name);
    METERS
        .iter()
        .copied()
        .find(|meter| *meter == name || meter.strip_prefix("ال") == Some(name))
}

/// Like [`canonical_meter`], with the user-facing validation errors.
pub fn validate_meter(input: &str) -> Result<&'static str> {
    let trimmed = normalize_input(input);
    if trimmed.is_empty() {
        return Err(AppError::Validation(t!("validation.meter_required").to_string()));
    }
    canonical_meter(&trimmed).ok_or_else(|| {
        AppError::Validation(t!("validation.meter_unknown", meter = trimmed.as_str()).to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_distinct_meters() {
        let mut names = METERS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn meter_spellings_resolve() {
        assert_eq!(canonical_meter("الطويل"), Some("الطويل"));
        assert_eq!(canonical_meter("  طويل "), Some("الطويل"));
        assert_eq!(canonical_meter("بحر الكامل"), Some("الكامل"));
        assert_eq!(canonical_meter("المتدارك"), Some("المتدارك"));
        assert_eq!(canonical_meter("السونيت"), None);
        assert_eq!(canonical_meter("ال"), None);
    }

    #[test]
    fn unknown_and_blank_meters_are_rejected() {
        rust_i18n::set_locale("en");
        match validate_meter("hexameter") {
            Err(AppError::Validation(msg)) => assert!(msg.contains("hexameter")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(matches!(validate_meter("   "), Err(AppError::Validation(_))));
    }

    #[test]
    fn every_level_has_two_lessons_in_order() {
        for level in [QuizLevel::Beginner, QuizLevel::Intermediate, QuizLevel::Advanced] {
            let ids: Vec<u8> = lessons_for(level).map(|l| l.id).collect();
            assert_eq!(ids.len(), 2, "{level:?}");
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(lessons_for(QuizLevel::Intermediate).next().map(|l| l.title), Some("البحر الطويل"));
    }
}
