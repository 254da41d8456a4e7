//! Media file server with byte-range support and per-extension transform
//! pipelines.
//!
//! The [`media::StreamDispatcher`] decides which byte window of a file to
//! send and either pipes it straight into the response or hands the raw
//! stream to the [`media::TransformHandler`]s registered for the file's
//! extension.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod media;
pub mod server;

pub use error::{DispatchError, ServerError};
pub use http::{MediaRequest, MediaResponse};
pub use media::{DispatchOptions, MediaState, StreamDispatcher};
