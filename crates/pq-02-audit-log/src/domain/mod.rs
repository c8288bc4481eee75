//! Domain module for the audit log

pub mod converter;
pub mod entities;
pub mod errors;

pub use converter::EventToEntityConverter;
pub use entities::*;
pub use errors::*;
