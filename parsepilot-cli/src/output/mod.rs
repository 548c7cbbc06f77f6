//! Output formatting for scrape workflow data.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

#[cfg(test)]
mod tests;
