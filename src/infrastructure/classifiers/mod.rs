pub mod lexicon;
pub mod remote;

pub use lexicon::LexiconClassifier;
pub use remote::RemoteClassifier;
