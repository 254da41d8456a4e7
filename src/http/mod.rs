//! HTTP protocol layer module
//!
//! Range windows, MIME lookup, header sets and the streaming request/response
//! pair the media dispatcher writes into.

pub mod body;
pub mod exchange;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{LifecycleEvent, ResponseBody};
pub use exchange::{MediaRequest, MediaResponse};
pub use mime::MimeTable;
pub use range::{compute_window, RangeWindow, CHUNK_SIZE};
pub use response::{build_404_response, build_405_response, build_options_response};
