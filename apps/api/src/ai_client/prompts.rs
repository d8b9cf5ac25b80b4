// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs next to it; only cross-cutting instructions live here.

/// System prompt that pins the model to a single JSON object.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    Respond with exactly one valid JSON object. \
    Do not add text outside the object, markdown fences, or explanations.";

/// Appended to prompts whose output is shown to Korean-speaking users.
pub const KOREAN_OUTPUT: &str = "All user-facing strings must be written in natural Korean.";
