//! Semantic classification layer: sentence encoders, category exemplars, and
//! centroid similarity matching.

mod classifier;
mod encoder;
mod exemplars;

pub use classifier::{SemanticCapability, SemanticClassifier};
pub use encoder::{HashedBowEncoder, TextEncoder};
pub use exemplars::{DEFAULT_EXEMPLARS, Exemplar};

#[cfg(feature = "onnx")]
mod embedder;
#[cfg(feature = "onnx")]
pub use embedder::{Embedder, OnnxEncoder, Pooling};
