//! Unit tests for the canvas engine.

mod export_tests;
mod property_tests;
mod serialization_tests;
