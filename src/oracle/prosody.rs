//! Structured requests for the prosody lab.

use clap::ValueEnum;
use rust_i18n::t;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::meters::validate_meter;
use crate::oracle::schema::{
    AssessmentFeedback, CreativeSuggestions, GeneratedPoem, ProsodyAnalysis, QuizQuestion,
    StructuredResponse, decode,
};
use crate::oracle::{Oracle, OracleRequest};
use crate::text::normalize_input;

pub const MAX_POEM_VERSES: u32 = 10;

const PROSODY_INSTRUCTION: &str = "\
أنت خبير في علم العروض العربي. حلّل البيت المعطى بدقة، وأعد دائماً:
١. البيت مشكولاً بالحركات كاملة.
٢. اسم البحر.
٣. التقطيع العروضي بالرمزين 1 للمتحرك و0 للساكن.
٤. التفعيلات بالترتيب.
٥. حكماً على سلامة الوزن مع ذكر كل كسر أو زحاف معيب إن وُجد.";

const POET_INSTRUCTION: &str = "\
أنت شاعر يكتب الشعر العمودي الفصيح ملتزماً بالوزن والقافية. \
التزم بعدد الأبيات المطلوب حرفياً، ولا تضف شرحاً.";

const MUSE_INSTRUCTION: &str = "\
أنت مستشار إبداعي للشعراء. قدّم اقتراحات قصيرة جداً (كلمة أو كلمتين) \
في ثلاث فئات: ثيمات (themes)، صور (imagery)، مشاعر (emotions).";

const TUTOR_INSTRUCTION: &str = "\
أنت معلم عروض. أنشئ أسئلة دقيقة ذات قيمة تعليمية. لكل سؤال حقل hint \
يوجّه الطالب إلى القاعدة أو مفتاح الحل دون أن يكشف الإجابة.";

const FEEDBACK_INSTRUCTION: &str = "\
أنت معلم عروض يقدّم تغذية راجعة مفصلة. أعد: رسالة مشجعة (message)، \
شرحاً للقاعدة العروضية المتعلقة بالسؤال مع سبب كون الإجابة الصحيحة هي الأصوب (guidance)، \
ودرجة من 10 (score).";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    Knowledge,
    Skill,
}

impl QuizKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizKind::Knowledge => "knowledge",
            QuizKind::Skill => "skill",
        }
    }

    pub fn label(self) -> String {
        match self {
            QuizKind::Knowledge => t!("quiz.kind_knowledge"),
            QuizKind::Skill => t!("quiz.kind_skill"),
        }
        .to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuizLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl QuizLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizLevel::Beginner => "beginner",
            QuizLevel::Intermediate => "intermediate",
            QuizLevel::Advanced => "advanced",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "beginner" => Some(QuizLevel::Beginner),
            "intermediate" => Some(QuizLevel::Intermediate),
            "advanced" => Some(QuizLevel::Advanced),
            _ => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            QuizLevel::Beginner => t!("levels.beginner"),
            QuizLevel::Intermediate => t!("levels.intermediate"),
            QuizLevel::Advanced => t!("levels.advanced"),
        }
        .to_string()
    }

    fn arabic(self) -> &'static str {
        match self {
            QuizLevel::Beginner => "المبتدئ",
            QuizLevel::Intermediate => "المتوسط",
            QuizLevel::Advanced => "المتقدم",
        }
    }
}

/// Model names used by the prosody requests.
#[derive(Clone, Debug)]
pub struct ProsodyModels {
    pub analysis: String,
    pub poem: String,
}

pub struct ProsodyLab<'a> {
    oracle: &'a dyn Oracle,
    models: ProsodyModels,
}

impl<'a> ProsodyLab<'a> {
    pub fn new(oracle: &'a dyn Oracle, models: ProsodyModels) -> Self {
        Self { oracle, models }
    }

    pub fn analyze_verse(&self, verse: &str) -> Result<ProsodyAnalysis> {
        let verse = required(verse, "validation.verse_required")?;
        let prompt = format!("حلّل هذا البيت عروضياً بدقة: \"{verse}\"");
        self.call(&self.models.analysis, PROSODY_INSTRUCTION, prompt)
    }

    /// `count` is clamped to `1..=MAX_POEM_VERSES`.
    pub fn generate_poem(&self, topic: &str, meter: &str, count: u32) -> Result<Vec<String>> {
        let topic = required(topic, "validation.topic_required")?;
        let meter = validate_meter(meter)?;
        let count = count.clamp(1, MAX_POEM_VERSES);
        let prompt = format!("اكتب {count} أبيات من الشعر الفصيح عن \"{topic}\" على بحر \"{meter}\".");
        let poem: GeneratedPoem = self.call(&self.models.poem, POET_INSTRUCTION, prompt)?;
        Ok(poem.verses)
    }

    pub fn get_suggestions(&self, topic: &str) -> Result<CreativeSuggestions> {
        let topic = required(topic, "validation.topic_required")?;
        let prompt = format!("قدّم اقتراحات إبداعية ملهمة لشاعر يكتب عن \"{topic}\".");
        self.call(&self.models.analysis, MUSE_INSTRUCTION, prompt)
    }

    pub fn generate_quiz_question(&self, kind: QuizKind, level: QuizLevel) -> Result<QuizQuestion> {
        let prompt = match kind {
            QuizKind::Knowledge => format!(
                "أنشئ سؤالاً معرفياً من نوع الاختيار من متعدد حول قواعد علم العروض للمستوى {}. اجعل قيمة type هي \"knowledge\".",
                level.arabic()
            ),
            QuizKind::Skill => format!(
                "أنشئ سؤالاً مهارياً يطلب تحديد البحر أو التفعيلات لبيت شعري للمستوى {}. اجعل قيمة type هي \"skill\".",
                level.arabic()
            ),
        };
        let mut question: QuizQuestion =
            self.call(&self.models.analysis, TUTOR_INSTRUCTION, prompt)?;
        // Outcomes are bucketed by the kind we asked for, whatever the model echoes.
        question.kind = kind.as_str().to_string();
        Ok(question)
    }

    pub fn get_feedback(
        &self,
        question: &str,
        user_answer: &str,
        correct_answer: &str,
    ) -> Result<AssessmentFeedback> {
        let user_answer = required(user_answer, "validation.answer_required")?;
        let prompt = format!(
            "السؤال: {question}\nإجابة الطالب: {user_answer}\nالإجابة الصحيحة: {correct_answer}\n\nحلّل الإجابة بدقة عروضية."
        );
        self.call(&self.models.analysis, FEEDBACK_INSTRUCTION, prompt)
    }

    fn call<T: StructuredResponse>(&self, model: &str, instruction: &str, prompt: String) -> Result<T> {
        let request = OracleRequest::structured(model, instruction, prompt, T::schema());
        let raw = self.oracle.generate(&request)?;
        decode(&raw)
    }
}

fn required(value: &str, message_key: &str) -> Result<String> {
    let value = normalize_input(value);
    if value.is_empty() {
        return Err(AppError::Validation(t!(message_key).to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::scripted::ScriptedOracle;

    fn models() -> ProsodyModels {
        ProsodyModels {
            analysis: "flash".to_string(),
            poem: "pro".to_string(),
        }
    }

    #[test]
    fn blank_verse_never_reaches_oracle() {
        let oracle = ScriptedOracle::ok(&["{}"]);
        let lab = ProsodyLab::new(&oracle, models());
        assert!(matches!(lab.analyze_verse("   "), Err(AppError::Validation(_))));
        assert!(oracle.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn poem_uses_poem_model_and_clamps_count() {
        let oracle = ScriptedOracle::ok(&[r#"{"verses": ["أ", "ب"]}"#]);
        let lab = ProsodyLab::new(&oracle, models());
        let verses = lab.generate_poem("البحر", "الطويل", 99).unwrap();
        assert_eq!(verses.len(), 2);

        let seen = oracle.calls.lock().unwrap();
        assert_eq!(seen[0].model, "pro");
        assert!(seen[0].prompt.contains("اكتب 10 أبيات"));
        assert!(seen[0].response_schema.is_some());
    }

    #[test]
    fn unknown_meter_never_reaches_oracle() {
        let oracle = ScriptedOracle::ok(&[r#"{"verses": ["أ"]}"#]);
        let lab = ProsodyLab::new(&oracle, models());
        let err = lab.generate_poem("الليل", "السونيت", 4).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(oracle.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn meter_is_sent_in_canonical_form() {
        let oracle = ScriptedOracle::ok(&[r#"{"verses": ["أ"]}"#]);
        let lab = ProsodyLab::new(&oracle, models());
        lab.generate_poem("الليل", "بحر كامل", 2).unwrap();
        assert!(oracle.calls.lock().unwrap()[0].prompt.contains("على بحر \"الكامل\""));
    }

    #[test]
    fn quiz_kind_is_forced_to_requested_kind() {
        let oracle = ScriptedOracle::ok(&[
            r#"{"id":"1","type":"معرفي","question":"q","correctAnswer":"a","explanation":"e","hint":"h"}"#,
        ]);
        let lab = ProsodyLab::new(&oracle, models());
        let q = lab
            .generate_quiz_question(QuizKind::Knowledge, QuizLevel::Advanced)
            .unwrap();
        assert_eq!(q.kind, "knowledge");
        assert!(oracle.calls.lock().unwrap()[0].prompt.contains("المتقدم"));
    }

    #[test]
    fn malformed_feedback_is_schema_error() {
        let oracle = ScriptedOracle::ok(&[r#"{"isCorrect": true}"#]);
        let lab = ProsodyLab::new(&oracle, models());
        let err = lab.get_feedback("q", "a", "a").unwrap_err();
        assert!(matches!(err, AppError::OracleSchema(_)));
    }

    #[test]
    fn level_names_round_trip() {
        for level in [QuizLevel::Beginner, QuizLevel::Intermediate, QuizLevel::Advanced] {
            assert_eq!(QuizLevel::from_name(level.as_str()), Some(level));
        }
        assert_eq!(QuizLevel::from_name("expert"), None);
    }
}
