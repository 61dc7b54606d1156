//! Content module - post models, rich text and read time

mod post;
pub mod read_time;
pub mod richtext;

pub use post::{posts_from_documents, ContentBlock, Post, PostDetail};
pub use richtext::{RichText, RichTextBlock, Span};
