// src/lib.rs
//! Profile and company page extraction over a browser page session.
//!
//! [`extractors::Person`] and [`extractors::Company`] drive a
//! [`session::PageSession`] through every section of a page and return a
//! [`extractors::ScrapeReport`] describing what each section produced.

pub mod config;
pub mod extractors;
pub mod models;
pub mod session;
pub mod storage;
pub mod utils;

pub use config::{BrowserSettings, PaginationConfig, ScrapeConfig};
pub use extractors::{Company, Person, ScrapeReport, Section, SectionOutcome, Strategy};
pub use utils::AppError;
