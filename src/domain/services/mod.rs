pub mod content_fetcher;
pub mod tag_writer;
