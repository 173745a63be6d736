// Evaluation prompt template. `{job_description}` is substituted per request.

use crate::llm_client::prompts::JSON_API_PREAMBLE;

pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"
Analyze the provided resume content against the job description below.

The root object MUST have exactly these keys: "summary", "skill_matching", "clarity", and "impact".

1. "summary": an object with "score" (integer 0-100) and "feedback" (string).
2. "skill_matching": an object with "score" (integer 0-100), "feedback" (string), AND "missing_keywords" (an array of strings).
3. "clarity": an object with "score" (integer 0-100) and "feedback" (string).
4. "impact": an object with "score" (integer 0-100), "feedback" (string), AND "suggested_bullet_points" (an array of objects, each with "original" and "suggested" keys).

**Job Description:**
{job_description}

**Resume Content (to be provided next):**
"#;

pub fn build_evaluation_prompt(job_description: &str) -> String {
    format!(
        "{JSON_API_PREAMBLE}\n{}",
        EVALUATION_PROMPT_TEMPLATE.replace("{job_description}", job_description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_job_description() {
        let prompt = build_evaluation_prompt("Staff Rust engineer, payments");
        assert!(prompt.contains("Staff Rust engineer, payments"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_prompt_names_every_section() {
        let prompt = build_evaluation_prompt("x");
        for key in [
            "\"summary\"",
            "\"skill_matching\"",
            "\"clarity\"",
            "\"impact\"",
            "\"missing_keywords\"",
            "\"suggested_bullet_points\"",
        ] {
            assert!(prompt.contains(key), "prompt is missing {key}");
        }
    }

    #[test]
    fn test_prompt_starts_with_json_preamble() {
        assert!(build_evaluation_prompt("x").starts_with(JSON_API_PREAMBLE));
    }
}
