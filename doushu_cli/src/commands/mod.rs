pub mod clear;
pub mod crawl;
pub mod export;
