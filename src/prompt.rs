//! Instruction templates for the personality analyzer.

use crate::oracle::OracleRequest;
use crate::orchestrator::AnalysisRequest;
use crate::report::{CHART_CLOSE_TAG, CHART_OPEN_TAG};
use crate::store::schema::AnalysisMode;

const ANALYST_ROLE: &str = "You are an analyst of public digital footprints. You work only from \
what is publicly visible on the linked profile(s) and the context the user supplies. Do not invent \
facts; state uncertainty plainly and avoid clinical diagnoses.";

const PSYCHOLOGICAL_TASK: &str = "Write a psychological profile: dominant personality traits \
(Big Five framing), emotional tone, values and motivations, communication style, and a short list \
of strengths and blind spots.";

const BEHAVIORAL_TASK: &str = "Write a behavioral pattern report: posting rhythm and habits, \
recurring topics, interaction style with others, signs of influence-seeking or privacy caution, \
and notable shifts over time.";

const COMPARISON_TASK: &str = "Compare the two profiles side by side: shared and diverging traits, \
communication styles, likely friction points and complementarities, and an overall compatibility \
summary.";

/// Language the report should be written in, derived from the UI locale.
pub fn report_language(locale: &str) -> &'static str {
    match locale {
        "ar" => "Arabic",
        _ => "English",
    }
}

pub fn system_instruction(mode: AnalysisMode, language: &str) -> String {
    let task = match mode {
        AnalysisMode::Psychological => PSYCHOLOGICAL_TASK,
        AnalysisMode::Behavioral => BEHAVIORAL_TASK,
        AnalysisMode::Comparison => COMPARISON_TASK,
    };
    format!(
        "{ANALYST_ROLE}\n\n{task}\n\nWrite the report in {language} using short headed sections.\n\
         After the report, append exactly one chart block with 4-8 scores between 0 and 100, in this form:\n\
         {CHART_OPEN_TAG}{{\"title\": \"...\", \"data\": [{{\"label\": \"...\", \"value\": 0}}]}}{CHART_CLOSE_TAG}"
    )
}

pub fn user_prompt(request: &AnalysisRequest) -> String {
    let mut prompt = match (&request.mode, &request.secondary) {
        (AnalysisMode::Comparison, Some(second)) => format!(
            "First profile: {}\nSecond profile: {second}\n",
            request.primary
        ),
        _ => format!("Profile: {}\n", request.primary),
    };
    if let Some(extra) = &request.elaboration {
        prompt.push_str(&format!("Additional context from the user: {extra}\n"));
    }
    prompt
}

pub fn analysis_request(request: &AnalysisRequest, model: &str, language: &str) -> OracleRequest {
    OracleRequest::text(
        model,
        &system_instruction(request.mode, language),
        user_prompt(request),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_prompt_names_both_profiles() {
        let req = AnalysisRequest::new(
            AnalysisMode::Comparison,
            "https://facebook.com/a",
            "https://facebook.com/b",
            "colleagues",
        );
        let prompt = user_prompt(&req);
        assert!(prompt.contains("First profile: https://facebook.com/a"));
        assert!(prompt.contains("Second profile: https://facebook.com/b"));
        assert!(prompt.contains("colleagues"));
    }

    #[test]
    fn single_profile_prompt_ignores_stray_secondary() {
        let req = AnalysisRequest::new(AnalysisMode::Behavioral, "u1", "u2", "");
        let prompt = user_prompt(&req);
        assert_eq!(prompt, "Profile: u1\n");
    }

    #[test]
    fn system_instruction_is_mode_specific_and_asks_for_chart() {
        let psych = system_instruction(AnalysisMode::Psychological, "Arabic");
        let behav = system_instruction(AnalysisMode::Behavioral, "Arabic");
        assert_ne!(psych, behav);
        assert!(psych.contains("in Arabic"));
        assert!(psych.contains(CHART_OPEN_TAG) && psych.contains(CHART_CLOSE_TAG));
        assert_eq!(report_language("ar"), "Arabic");
        assert_eq!(report_language("en"), "English");
    }
}
