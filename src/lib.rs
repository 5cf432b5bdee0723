// codeguard library - ai security audits for source code

pub mod cli;
mod core;
mod error;
mod server;

pub use core::{Archive, AuditRecord, Gemini};
pub use error::Error;
pub use server::{Server, router};
