// Eligibility matching engine.
// Pipeline: profile rows -> CandidateSnapshot -> per-clause policy checks ->
// per-posting eligibility -> filtered listing.
// Read-only over store data; all fetching happens up front in `listing`.

pub mod eligibility;
pub mod handlers;
pub mod listing;
pub mod policy;
pub mod snapshot;
