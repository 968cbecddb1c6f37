pub mod archiver;
pub mod cli;
pub mod config;
pub mod curate;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod harvest;
pub mod models;
pub mod render;
pub mod session;
pub mod sitemap;
