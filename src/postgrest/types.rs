//! Types for the PostgrestClient

/// Options for returning data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOption {
    /// Return representation (the data)
    Representation,

    /// Return minimal data
    Minimal,
}

impl ReturnOption {
    /// Value of the `Prefer` header
    pub fn prefer(&self) -> &'static str {
        match self {
            ReturnOption::Representation => "return=representation",
            ReturnOption::Minimal => "return=minimal",
        }
    }
}

/// `Accept` value asking PostgREST for a single JSON object instead of an array
pub const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
