// src/parser.rs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const CORRECT: &str = "верно";
pub const INCORRECT: &str = "неверно";

// First line (after leading whitespace) that starts with the marker and a colon.
static VERDICT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*вердикт:([^\n]*)$").expect("verdict regex"));
static EXPLANATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*пояснение:([^\n]*)$").expect("explanation regex"));

/// Binary judgment extracted from the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn as_int(&self) -> u8 {
        match self {
            Verdict::Correct => 1,
            Verdict::Incorrect => 0,
        }
    }

    pub fn as_text(&self) -> &'static str {
        match self {
            Verdict::Correct => CORRECT,
            Verdict::Incorrect => INCORRECT,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOutput {
    pub verdict: Verdict,
    pub explanation: String,
}

impl Default for ParsedOutput {
    fn default() -> Self {
        Self {
            verdict: Verdict::Incorrect,
            explanation: String::new(),
        }
    }
}

/// Extracts the verdict and explanation lines from raw model output.
///
/// Never fails: a missing or malformed verdict line means `неверно`,
/// a missing explanation line means an empty explanation.
pub fn parse_output(text: &str) -> ParsedOutput {
    let mut parsed = ParsedOutput::default();

    if let Some(caps) = VERDICT_LINE.captures(text) {
        let value = caps[1].trim().to_lowercase();
        if value.contains(CORRECT) && !value.contains(INCORRECT) {
            parsed.verdict = Verdict::Correct;
        }
    }

    if let Some(caps) = EXPLANATION_LINE.captures(text) {
        parsed.explanation = caps[1].trim().to_string();
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_verdict_with_explanation() {
        let parsed = parse_output("Вердикт: верно\nПояснение: все шаги верны");
        assert_eq!(parsed.verdict, Verdict::Correct);
        assert_eq!(parsed.verdict.as_int(), 1);
        assert_eq!(parsed.verdict.as_text(), "верно");
        assert_eq!(parsed.explanation, "все шаги верны");
    }

    #[test]
    fn incorrect_verdict_with_explanation() {
        let parsed = parse_output("Вердикт: неверно\nПояснение: ошибка в вычислении");
        assert_eq!(parsed.verdict, Verdict::Incorrect);
        assert_eq!(parsed.verdict.as_int(), 0);
        assert_eq!(parsed.explanation, "ошибка в вычислении");
    }

    #[test]
    fn unrecognised_output_falls_back_to_defaults() {
        let parsed = parse_output("I don't know");
        assert_eq!(parsed, ParsedOutput::default());
        assert_eq!(parsed.verdict.as_text(), "неверно");
        assert_eq!(parsed.explanation, "");
    }

    #[test]
    fn markers_are_case_insensitive() {
        assert_eq!(parse_output("ВЕРДИКТ: ВЕРНО"), parse_output("вердикт: верно"));
        assert_eq!(parse_output("ВЕРДИКТ: ВЕРНО").verdict, Verdict::Correct);
        assert_eq!(
            parse_output("ПОЯСНЕНИЕ: Всё Ок").explanation,
            "Всё Ок"
        );
    }

    #[test]
    fn only_first_marker_line_counts() {
        let text = "Вердикт: верно\nПояснение: первое\nВердикт: неверно\nПояснение: второе";
        let parsed = parse_output(text);
        assert_eq!(parsed.verdict, Verdict::Correct);
        assert_eq!(parsed.explanation, "первое");
    }

    #[test]
    fn indented_and_crlf_lines_are_recognised() {
        let parsed = parse_output("Ответ модели:\r\n   Вердикт: верно\r\n  Пояснение: да\r\n");
        assert_eq!(parsed.verdict, Verdict::Correct);
        assert_eq!(parsed.explanation, "да");
    }

    #[test]
    fn marker_must_start_the_line() {
        let parsed = parse_output("Мой вердикт: верно");
        assert_eq!(parsed.verdict, Verdict::Incorrect);
    }

    #[test]
    fn verdict_mentioning_both_tokens_is_incorrect() {
        // Inherited rule: any mention of "неверно" wins.
        let parsed = parse_output("Вердикт: верно, хотя сначала казалось неверно");
        assert_eq!(parsed.verdict, Verdict::Incorrect);
    }

    #[test]
    fn empty_verdict_value_is_incorrect() {
        let parsed = parse_output("Вердикт:\nПояснение:");
        assert_eq!(parsed.verdict, Verdict::Incorrect);
        assert_eq!(parsed.explanation, "");
    }
}
