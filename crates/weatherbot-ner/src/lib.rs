//! Weatherbot NER crate - location detection over chat messages.
//!
//! Provides:
//! - The [`EntityClassifier`] seam over a token-classification model
//! - A hosted Hugging Face classifier and an offline gazetteer classifier
//! - [`LocationDetector`], which applies the location/confidence policy

pub mod classifier;
pub mod detector;
pub mod error;
pub mod gazetteer;
pub mod huggingface;
pub mod types;

pub use classifier::EntityClassifier;
pub use detector::LocationDetector;
pub use error::NerError;
pub use gazetteer::GazetteerClassifier;
pub use huggingface::HuggingFaceNerClassifier;
pub use types::EntitySpan;
