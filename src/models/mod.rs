// src/models/mod.rs
pub mod company;
pub mod person;

pub use company::{CompanyProfile, CompanySummary, Employee};
pub use person::{
    Accomplishment, Certification, Contact, Education, Experience, HonorAward, Interest, Language,
    Profile, Skill,
};

/// Empty or whitespace-only text counts as absent.
pub fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
