// core logic - the ai engine and the cloud archive

mod ai;
mod store;

pub use ai::Gemini;
pub use store::{Archive, AuditRecord};
