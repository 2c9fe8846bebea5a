//! Integration tests for the hierarchical navigation engine

mod cli_workflow;
mod hierarchy_scenario;
mod state_persistence;
mod support;
