//! Shared black-box test harness: builds throwaway SQLite stores matching
//! the schema in §6.1, for the Scenario A–F tests in `tests/`.

pub mod harness;
