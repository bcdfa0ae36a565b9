// Cross-cutting prompt fragments. Each module that calls the LLM keeps its
// own prompt templates beside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every extraction prompt so the model does not invent data.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    Use only information present in the provided text. \
    If a field cannot be determined, use an empty string, an empty list, or null. \
    Never invent employers, dates, degrees or skills.";
