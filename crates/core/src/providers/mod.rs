pub mod registry;
pub mod traits;

// Collaborator implementations
pub mod iex;
pub mod simulation;
pub mod yahoo_finance;
