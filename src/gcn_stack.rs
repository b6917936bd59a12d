use ndarray::{Array3, Array4};
use rand::Rng;
use tracing::debug;

use crate::embedding::Embedding;
use crate::error::{ensure_shape, EncoderError, EncoderResult};
use crate::label_aware_gcn::LabelAwareGcn;
use crate::layer::Layer;

/// Output of [`LabelAwareGcnStack::forward`].
#[derive(Debug, Clone)]
pub struct StackOutput {
    /// Node features after the last layer, [batch, seq_len, feature_dim]
    pub features: Array3<f32>,
    /// Edge logits of the last layer, [batch, seq_len, seq_len, feature_dim]
    pub logits: Array4<f32>,
    /// Edge attention of every layer, in order; only when requested
    pub attentions: Option<Vec<Array3<f32>>>,
}

/// Dependency-relation embedding followed by `num_layers` label-aware convolutions.
///
/// The relation embeddings are looked up once and shared by every layer; only the
/// node features change from one layer to the next.
pub struct LabelAwareGcnStack {
    pub layers: Vec<LabelAwareGcn>,
    pub dep_embedding: Embedding,
}

impl LabelAwareGcnStack {
    pub fn new(
        num_layers: usize,
        deprel_size: usize,
        dep_dim: usize,
        feature_dim: usize,
        pos_dim: usize,
    ) -> EncoderResult<Self> {
        Self::with_rng(num_layers, deprel_size, dep_dim, feature_dim, pos_dim, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        num_layers: usize,
        deprel_size: usize,
        dep_dim: usize,
        feature_dim: usize,
        pos_dim: usize,
        rng: &mut R,
    ) -> EncoderResult<Self> {
        if num_layers == 0 {
            return Err(EncoderError::config("num_layers must be at least 1"));
        }

        let layers = (0..num_layers)
            .map(|_| LabelAwareGcn::with_rng(dep_dim, feature_dim, pos_dim, rng))
            .collect();

        Ok(LabelAwareGcnStack {
            layers,
            dep_embedding: Embedding::with_rng("dependency relation", deprel_size, dep_dim, rng),
        })
    }

    /// # Arguments
    /// * `x` - word features [batch, seq_len, feature_dim]
    /// * `simple_graph` - binary adjacency [batch, seq_len, seq_len]
    /// * `graph` - dependency relation ids [batch, seq_len, seq_len], 0 is padding
    /// * `pos_embed` - POS embeddings [batch, seq_len, pos_dim]
    /// * `output_attention` - also return the attention of every layer
    pub fn forward(
        &self,
        x: &Array3<f32>,
        simple_graph: &Array3<f32>,
        graph: &Array3<usize>,
        pos_embed: &Array3<f32>,
        output_attention: bool,
    ) -> EncoderResult<StackOutput> {
        ensure_shape("relation graph", simple_graph.shape(), graph.shape())?;
        let dep_embed = self.dep_embedding.forward(graph)?;

        let mut features = x.clone();
        let mut logits = None;
        let mut attentions = Vec::with_capacity(self.layers.len());

        for (depth, layer) in self.layers.iter().enumerate() {
            debug!(depth, "label-aware gcn layer");
            let out = layer.forward(&features, simple_graph, &dep_embed, pos_embed)?;
            features = out.features;
            logits = Some(out.logits);
            if output_attention {
                attentions.push(out.attention);
            }
        }

        let logits =
            logits.ok_or_else(|| EncoderError::config("stack has no graph convolution layers"))?;

        Ok(StackOutput {
            features,
            logits,
            attentions: output_attention.then_some(attentions),
        })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

impl Layer for LabelAwareGcnStack {
    fn layer_type(&self) -> &str {
        "LabelAwareGcnStack"
    }

    fn parameters(&self) -> usize {
        self.dep_embedding.parameters()
            + self.layers.iter().map(|layer| layer.parameters()).sum::<usize>()
    }
}

