pub mod crawler;
pub mod web;

#[cfg(test)]
mod tests;

pub use crawler::{CrawlReport, CrawlState, StopHandle};
pub use web::Crawler;
