//! Markdown rendering for ranked output

mod markdown;

pub use markdown::{render_category_nav, render_ranked_table};
