//! Request handler module
//!
//! Routes HTTP requests onto the media dispatcher.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
