use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The model's verdict for one résumé / job-description pair.
///
/// Only syntactic validity is guaranteed. Recognized top-level sections are
/// `summary`, `skill_matching`, `clarity` and `impact`; anything else the model
/// returns is kept and relayed untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateEvaluation(Map<String, Value>);

impl CandidateEvaluation {
    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    /// `skill_matching.score`, the headline number shown to users. 0 when the
    /// model omitted it or returned something non-numeric.
    pub fn match_score(&self) -> i32 {
        self.section("skill_matching")
            .and_then(|s| s.get("score"))
            .and_then(score_as_i64)
            .map(|score| score.clamp(0, 100) as i32)
            .unwrap_or(0)
    }

    pub fn missing_keywords(&self) -> Vec<&str> {
        self.section("skill_matching")
            .and_then(|s| s.get("missing_keywords"))
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for CandidateEvaluation {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// Models sometimes emit 80.0 or "80" for an integer score.
fn score_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn evaluation(value: Value) -> CandidateEvaluation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_match_score_reads_skill_matching() {
        let eval = evaluation(json!({"skill_matching": {"score": 73, "feedback": "ok"}}));
        assert_eq!(eval.match_score(), 73);
    }

    #[test]
    fn test_match_score_defaults_to_zero() {
        assert_eq!(evaluation(json!({})).match_score(), 0);
        assert_eq!(evaluation(json!({"skill_matching": "n/a"})).match_score(), 0);
        assert_eq!(
            evaluation(json!({"skill_matching": {"score": null}})).match_score(),
            0
        );
    }

    #[test]
    fn test_match_score_tolerates_float_and_string() {
        assert_eq!(
            evaluation(json!({"skill_matching": {"score": 64.6}})).match_score(),
            65
        );
        assert_eq!(
            evaluation(json!({"skill_matching": {"score": " 42 "}})).match_score(),
            42
        );
    }

    #[test]
    fn test_match_score_is_clamped() {
        assert_eq!(
            evaluation(json!({"skill_matching": {"score": 250}})).match_score(),
            100
        );
        assert_eq!(
            evaluation(json!({"skill_matching": {"score": -3}})).match_score(),
            0
        );
    }

    #[test]
    fn test_missing_keywords_skips_non_strings() {
        let eval = evaluation(json!({
            "skill_matching": {"missing_keywords": ["Kubernetes", 7, "gRPC"]}
        }));
        assert_eq!(eval.missing_keywords(), vec!["Kubernetes", "gRPC"]);
    }

    #[test]
    fn test_unknown_keys_round_trip_untouched() {
        let raw = json!({"summary": {"score": 1}, "model_notes": ["extra"]});
        let eval = evaluation(raw.clone());
        assert_eq!(serde_json::to_value(&eval).unwrap(), raw);
    }
}
