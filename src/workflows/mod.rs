pub mod catalog;
pub mod pipeline;
pub mod prompt;
pub mod upload;
