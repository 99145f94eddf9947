//! Centroid-based semantic classification of sentences.
//!
//! Exemplar sentences are embedded once when the classifier is built; each
//! category's centroid is the L2-normalized mean of its exemplar vectors.
//! A sentence is assigned to the single nearest centroid across all
//! namespaces when the cosine similarity clears the threshold. Emitting one
//! label per sentence keeps the semantic pass from double-counting evidence
//! the rule engine may already multi-label.

use std::sync::Arc;

use rayon::prelude::*;
use termscope_core::{Flattened, Match, MatchSource, Namespace, Segment};
use tracing::{debug, info, warn};

use crate::encoder::{TextEncoder, normalize};
use crate::exemplars::Exemplar;

pub const DEFAULT_THRESHOLD: f32 = 0.70;
pub const DEFAULT_BATCH_SIZE: usize = 32;

struct Centroid {
    category_id: String,
    namespace: Namespace,
    vector: Vec<f32>,
}

/// Sentence classifier holding an encoder and pre-computed centroids.
///
/// Read-only after [`build`](Self::build); safe to share across analyses.
pub struct SemanticClassifier {
    encoder: Arc<dyn TextEncoder>,
    centroids: Vec<Centroid>,
    threshold: f32,
    batch_size: usize,
}

impl SemanticClassifier {
    /// Embed every exemplar and compute one centroid per category.
    pub fn build(encoder: Arc<dyn TextEncoder>, exemplars: &[Exemplar]) -> anyhow::Result<Self> {
        let dim = encoder.dim();
        let mut centroids = Vec::with_capacity(exemplars.len());

        for exemplar in exemplars {
            let vectors = encoder.encode_batch(exemplar.sentences)?;
            match mean_centroid(&vectors, dim) {
                Some(vector) => centroids.push(Centroid {
                    category_id: exemplar.category_id.to_string(),
                    namespace: exemplar.namespace,
                    vector,
                }),
                None => warn!(category = exemplar.category_id, "exemplar produced no centroid"),
            }
        }

        anyhow::ensure!(!centroids.is_empty(), "no exemplar produced a centroid");
        info!(categories = centroids.len(), dim, "computed exemplar centroids");

        Ok(Self {
            encoder,
            centroids,
            threshold: DEFAULT_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Minimum cosine similarity for a sentence to be labelled.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sentences per encoder call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Categories with a centroid, in exemplar declaration order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, Namespace)> {
        self.centroids
            .iter()
            .map(|c| (c.category_id.as_str(), c.namespace))
    }

    /// Classify every sentence segment, emitting at most one match per sentence.
    pub fn classify(&self, segments: &[Segment]) -> anyhow::Result<Vec<Match>> {
        let sentences: Vec<&Segment> = segments.iter().filter(|s| s.is_sentence()).collect();
        if sentences.is_empty() {
            return Ok(vec![]);
        }

        let texts: Vec<String> = sentences
            .iter()
            .map(|s| Flattened::new(&s.text).text)
            .collect();
        let embeddings = self.embed(&texts)?;

        let matches: Vec<Match> = sentences
            .iter()
            .zip(texts)
            .zip(&embeddings)
            .filter_map(|((segment, text), embedding)| {
                let (centroid, similarity) = self.best_match(embedding)?;
                (similarity >= self.threshold).then(|| Match {
                    category_id: centroid.category_id.clone(),
                    namespace: centroid.namespace,
                    segment_id: segment.id,
                    offset: segment.start_offset,
                    matched_text: text,
                    source: MatchSource::Semantic,
                    confidence: similarity.clamp(0.0, 1.0),
                })
            })
            .collect();

        debug!(
            sentences = sentences.len(),
            matches = matches.len(),
            "semantic classification complete"
        );
        Ok(matches)
    }

    /// Embed sentences in parallel batches, preserving input order.
    fn embed(&self, sentences: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let texts: Vec<&str> = sentences.iter().map(String::as_str).collect();

        let batches: Vec<Vec<Vec<f32>>> = texts
            .par_chunks(self.batch_size)
            .map(|chunk| self.encoder.encode_batch(chunk))
            .collect::<anyhow::Result<_>>()?;

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in batches {
            for mut v in batch {
                normalize(&mut v);
                embeddings.push(v);
            }
        }

        anyhow::ensure!(
            embeddings.len() == texts.len(),
            "encoder returned {} vectors for {} sentences",
            embeddings.len(),
            texts.len()
        );
        Ok(embeddings)
    }

    /// Nearest centroid; ties go to the earlier-declared category.
    fn best_match(&self, embedding: &[f32]) -> Option<(&Centroid, f32)> {
        let mut best: Option<(&Centroid, f32)> = None;
        for centroid in &self.centroids {
            let sim = cosine_sim(embedding, &centroid.vector);
            if best.is_none_or(|(_, b)| sim > b) {
                best = Some((centroid, sim));
            }
        }
        best.filter(|(_, sim)| sim.is_finite())
    }
}

/// Whether the semantic pass is available for this process.
pub enum SemanticCapability {
    Enabled(SemanticClassifier),
    Disabled,
}

impl SemanticCapability {
    /// Degrade to [`Disabled`](Self::Disabled) when the backend failed to build.
    pub fn from_build(result: anyhow::Result<SemanticClassifier>) -> Self {
        match result {
            Ok(classifier) => Self::Enabled(classifier),
            Err(e) => {
                warn!(error = %e, "semantic backend unavailable, using pattern rules only");
                Self::Disabled
            }
        }
    }

    /// Load the ONNX encoder from `model_dir` and build centroids from `exemplars`.
    #[cfg(feature = "onnx")]
    pub fn load_onnx(model_dir: &std::path::Path, exemplars: &[Exemplar]) -> Self {
        let built = crate::embedder::OnnxEncoder::load(model_dir)
            .and_then(|encoder| SemanticClassifier::build(Arc::new(encoder), exemplars));
        Self::from_build(built)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn classifier(&self) -> Option<&SemanticClassifier> {
        match self {
            Self::Enabled(c) => Some(c),
            Self::Disabled => None,
        }
    }

    /// Run the semantic pass. `None` means it did not run: either disabled,
    /// or the encoder failed on this document.
    pub fn classify(&self, segments: &[Segment]) -> Option<Vec<Match>> {
        let classifier = self.classifier()?;
        match classifier.classify(segments) {
            Ok(matches) => Some(matches),
            Err(e) => {
                warn!(error = %e, "semantic classification failed, falling back to patterns");
                None
            }
        }
    }
}

fn mean_centroid(vectors: &[Vec<f32>], dim: usize) -> Option<Vec<f32>> {
    let mut sum = vec![0.0f32; dim];
    let mut count = 0usize;
    for v in vectors.iter().filter(|v| v.len() == dim) {
        let mut v = v.clone();
        normalize(&mut v);
        for (acc, val) in sum.iter_mut().zip(&v) {
            *acc += val;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    for v in &mut sum {
        *v /= count as f32;
    }
    normalize(&mut sum);
    sum.iter().any(|x| *x != 0.0).then_some(sum)
}

/// Cosine similarity of two unit vectors.
fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
