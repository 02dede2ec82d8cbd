pub mod builder;
pub mod discover;
pub mod output;
pub mod parser;
pub mod stats;
