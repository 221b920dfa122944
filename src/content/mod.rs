//! Content module - work entries and the content transformation pipeline

mod components;
pub mod directives;
mod entry;
mod frontmatter;
pub mod loader;
mod markdown;
pub mod resolver;
mod transform;

pub use components::ComponentRenderer;
pub use directives::{DirectiveFailure, DirectiveKind, PurchaseLink};
pub use entry::{slug_from_path, sort_by_date_desc, ContentEntry};
pub use frontmatter::{parse_date_string, Frontmatter, RawDocument};
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use transform::{ContentTransformer, RenderedDocument};
