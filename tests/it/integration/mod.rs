//! Multi-component workflow tests.

mod canvas_workflow_tests;
mod export_workflow_tests;
