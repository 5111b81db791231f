pub mod classifiers;
pub mod content;
pub mod di;
pub mod pocket;
pub mod repositories;
