// Interview scheduling: deterministic slot proposals for matches above the
// score threshold, plus the externally driven invitation lifecycle.

pub mod handlers;
pub mod repository;
pub mod scheduler;
pub mod slots;

pub use scheduler::InterviewScheduler;
