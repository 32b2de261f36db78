pub mod aggregate;

// Re-export command handlers
pub use aggregate::AggregateCommand;
