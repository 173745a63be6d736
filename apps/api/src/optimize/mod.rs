// Résumé optimization: intake → content extraction → model evaluation → history.
// All model calls go through llm_client — no direct Gemini calls here.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
