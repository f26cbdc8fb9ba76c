// Matching pipeline: canonical rendering → similarity scoring (embedding or
// fallback) → explainable decomposition → idempotent persistence.
// All model calls go through the capability ports; nothing here talks HTTP.

pub mod canonical;
pub mod education;
pub mod explainer;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod scorer;
pub mod skills;
pub mod stats;
pub mod store;

#[cfg(test)]
pub mod tests_support;
