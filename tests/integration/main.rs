//! Integration tests for Roster.

mod helpers;

mod country_import_test;
mod scheduler_test;
mod user_flow_test;
