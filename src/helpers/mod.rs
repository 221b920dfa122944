//! Helper functions for listings and exported documents
//!
//! Date display, site URLs and listing logic shared by the commands.

mod date;
mod list;
mod url;

pub use date::*;
pub use list::*;
pub use url::*;
