pub mod crawler;
pub mod error;
pub mod heuristic;
pub mod links;
pub mod origin;
pub mod phone;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use heuristic::{Decision, PhoneCandidate, Rule};
pub use phone::{LibPhoneMatcher, PhoneMatch, PhoneMatcher};
pub use result::{ScrapeOutcome, ScrapeResult};
