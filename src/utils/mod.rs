pub mod clock;
pub mod report_cache;
