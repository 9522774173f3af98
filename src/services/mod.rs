pub mod acquisition;
pub mod orchestrator;
pub mod process_runner;
pub mod reconciler;
pub mod resolver;
