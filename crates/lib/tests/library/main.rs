//! Library-level tests for rubybuild-lib.

mod pipeline_tests;
