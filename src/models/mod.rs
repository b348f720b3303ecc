pub mod record;
pub mod reporting;
pub mod submission;
