//! Subject, answer, countersubject, and exposition scheduling.

mod answer;
mod countersubject;
mod exposition;
mod generate;


pub use answer::{derive_answer, restate_answer, Answer};
pub use countersubject::{derive_countersubject, restate_countersubject, Countersubject};
pub use exposition::{build_exposition, schedule_entries, Entry, Exposition};
pub use generate::{generate_subject, restate_subject, Subject};
