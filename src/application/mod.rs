// Application layer - Use cases and ports
pub mod analysis_service;
pub mod critique_model;
pub mod critique_service;
pub mod initial_checks;
pub mod prompt_composer;
