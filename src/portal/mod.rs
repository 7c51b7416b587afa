//! Client and page parsers for the public course search portal.

pub mod client;
pub mod courses;
pub mod errors;
pub mod search;
pub mod subjects;

pub use client::{PortalClient, Transport};
pub use courses::{CourseMeeting, extract_courses, parse_courses};
pub use errors::PortalError;
pub use search::SearchForm;
pub use subjects::{SubjectOption, discover_subjects, parse_subjects};
