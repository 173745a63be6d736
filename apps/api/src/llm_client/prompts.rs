// Shared prompt fragments used across every evaluation request.

/// Sent ahead of an inline image part so the model knows the résumé is pictured.
pub const IMAGE_RESUME_INSTRUCTION: &str = "Analyze the resume in the following image.";

/// Opening framing that casts the model as a JSON-returning endpoint.
pub const JSON_API_PREAMBLE: &str = "\
    You are an expert career coach acting as a JSON API. \
    Your response MUST be a single valid JSON object. \
    Do NOT include any text outside the JSON object.";
