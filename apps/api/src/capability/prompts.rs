// Cross-cutting prompt fragments shared by every capability caller.
// Each component that prompts the model keeps its own prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to a prompt when the caller expects structured output.
const SCHEMA_INSTRUCTION: &str = "\n\nRespond with a single JSON object using EXACTLY this shape \
    (same field names, no extra fields):\n{schema}";

/// Appends the expected JSON shape to `prompt`.
pub fn with_schema_instruction(prompt: &str, schema_hint: &str) -> String {
    let mut full = String::with_capacity(prompt.len() + schema_hint.len() + 128);
    full.push_str(prompt);
    full.push_str(&SCHEMA_INSTRUCTION.replace("{schema}", schema_hint));
    full
}
