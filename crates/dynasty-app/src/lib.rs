// Library root for the command-line shell: configuration, the Yahoo client,
// the response cache, the fetch pipeline, and report output.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod pipeline;
pub mod report;
