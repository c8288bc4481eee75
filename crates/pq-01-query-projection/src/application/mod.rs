//! Application layer: handlers, dispatch context, and batch service

pub mod context;
pub mod handlers;
pub mod service;

pub use context::QueryEventHandlerContext;
pub use handlers::{default_handlers, QueryEventHandler};
pub use service::QueryProjectionService;
