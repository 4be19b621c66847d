// Job posting lifecycle: creation-time validation of requirement clauses,
// atomic create/replace, detail view, and eligibility-gated applications.

pub mod handlers;
pub mod service;
pub mod validation;
