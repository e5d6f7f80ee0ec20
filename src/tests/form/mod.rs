mod engine_tests;
mod lifecycle_tests;
