pub mod actors;
pub mod cache;
pub mod cli;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod github;
pub mod markup;
pub mod server;
pub mod types;
