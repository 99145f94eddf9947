//! ONNX Runtime sentence encoder for BERT-family models.
//!
//! Works with sentence-transformers exports (mean pooling) and plain encoder
//! exports such as legal-bert-base-uncased (CLS pooling). The model directory
//! must contain `model.onnx` and `tokenizer.json`, and may contain a
//! `pooling` file holding `mean` or `cls`.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::encoder::{TextEncoder, normalize};

/// Maximum tokens per sentence; BERT position embeddings stop at 512.
const MAX_TOKENS: usize = 512;

/// How token states are reduced to one sentence vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    /// Attention-masked mean over all tokens.
    Mean,
    /// The `[CLS]` token state.
    Cls,
}

impl Pooling {
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "mean" => Ok(Self::Mean),
            "cls" => Ok(Self::Cls),
            other => anyhow::bail!("unknown pooling {other:?}, expected \"mean\" or \"cls\""),
        }
    }
}

/// Sentence embedding generator using ONNX Runtime.
///
/// Produces L2-normalized embeddings suitable for cosine similarity.
pub struct Embedder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
    pooling: Pooling,
}

impl Embedder {
    /// Load an embedding model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let pooling = match std::fs::read_to_string(model_dir.join("pooling")) {
            Ok(s) => Pooling::parse(&s)?,
            Err(_) => Pooling::Mean,
        };

        let session = Session::builder()?.commit_from_file(&model_path)?;

        // Infer embedding dimension from model output shape.
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(768);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        // Configure padding to pad all inputs in a batch to the same length.
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        info!(dim, ?pooling, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session,
            tokenizer,
            dim,
            pooling,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn pooling(&self) -> Pooling {
        self.pooling
    }

    /// Embed a batch of texts, returning one normalized vector per input.
    pub fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let batch_size = texts.len();

        // Tokenize all texts.
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        // Build flat input tensors: [batch_size, seq_len].
        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let offset = i * seq_len;
            for (j, &id) in encoding.get_ids().iter().enumerate() {
                input_ids[offset + j] = id as i64;
            }
            for (j, &mask) in encoding.get_attention_mask().iter().enumerate() {
                attention_mask[offset + j] = mask as i64;
            }
            for (j, &tid) in encoding.get_type_ids().iter().enumerate() {
                token_type_ids[offset + j] = tid as i64;
            }
        }

        let shape = [batch_size as i64, seq_len as i64];

        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.clone().into_boxed_slice()))?;
        let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        // Run inference.
        let outputs = self.session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        ])?;

        // Extract token embeddings: [batch_size, seq_len, dim].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == batch_size && dims[2] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [{batch_size}, {seq_len}, {}]",
            self.dim
        );

        let actual_seq_len = dims[1] as usize;

        let mut embeddings = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let mut pooled = match self.pooling {
                Pooling::Cls => {
                    let offset = i * actual_seq_len * self.dim;
                    output_data[offset..offset + self.dim].to_vec()
                }
                Pooling::Mean => {
                    let mut pooled = vec![0.0f32; self.dim];
                    let mut token_count = 0.0f32;
                    for j in 0..actual_seq_len {
                        let mask_val = attention_mask[i * seq_len + j] as f32;
                        if mask_val > 0.0 {
                            let offset = (i * actual_seq_len + j) * self.dim;
                            for (d, p) in pooled.iter_mut().enumerate() {
                                *p += output_data[offset + d] * mask_val;
                            }
                            token_count += mask_val;
                        }
                    }
                    if token_count > 0.0 {
                        for p in &mut pooled {
                            *p /= token_count;
                        }
                    }
                    pooled
                }
            };
            normalize(&mut pooled);
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }
}

/// [`TextEncoder`] over an [`Embedder`].
///
/// The ONNX session needs exclusive access per run, so concurrent batches
/// queue on the lock.
pub struct OnnxEncoder {
    inner: Mutex<Embedder>,
    dim: usize,
}

impl OnnxEncoder {
    pub fn new(embedder: Embedder) -> Self {
        let dim = embedder.dim();
        Self {
            inner: Mutex::new(embedder),
            dim,
        }
    }

    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        Embedder::load(model_dir).map(Self::new)
    }
}

impl TextEncoder for OnnxEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut embedder = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("embedder lock poisoned"))?;
        embedder.embed_batch(texts)
    }
}

/// Try to infer the embedding dimension from the ONNX model output type.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Last dimension is the embedding dim.
            shape
                .last()
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}
