//! Default referee-analysis prompt.

/// Language the report is written in unless overridden.
pub const DEFAULT_LANGUAGE: &str = "Hebrew";

/// Build the FIBA referee-instructor prompt.
pub fn referee_prompt(language: &str) -> String {
    let language = match language.trim() {
        "" => DEFAULT_LANGUAGE,
        other => other,
    };

    format!(
        r#"Analyze the attached basketball video as a FIBA referee instructor.

Cover in detail:
1. Referee positioning and mechanics (Lead / Center / Trail)
2. Primary / Secondary coverage responsibility
3. Decision grading for every call or no-call (CC, CNC, IC, INC)
4. Professional teaching points for improvement

Give an exact timestamp (MM:SS) for every event you discuss.
Answer in professional, concise {language}."#
    )
}
