use itertools::izip;
use ndarray::{Array3, Array4, Axis};
use rand::Rng;

use crate::error::{ensure_shape, EncoderError, EncoderResult};
use crate::layer::Layer;
use crate::linear::Linear;
use crate::ops::{mask_non_edges, softmax_last_axis, EDGE_MASK_BIAS};

/// Result of one label-aware graph convolution.
#[derive(Debug, Clone)]
pub struct GcnOutput {
    /// Per-channel edge logits, [batch, seq_len, seq_len, feature_dim]
    pub logits: Array4<f32>,
    /// Aggregated node features, [batch, seq_len, feature_dim]
    pub features: Array3<f32>,
    /// Normalized edge attention, [batch, seq_len, seq_len]
    pub attention: Array3<f32>,
}

/// Graph convolution whose edge attention is conditioned on the dependency
/// label of the edge and the POS tag of the source node.
///
/// For node `i` and neighbor `j`:
/// - score(i, j) = sum over channels of `W_a [x_i; pos_i; dep_ij] + b_a`, masked to edges
/// - value(i, j) = `x_i + W_p pos_i + W_d dep_ij`
/// - out_i = sum_j softmax_j(score) * value(i, j)
pub struct LabelAwareGcn {
    pub dep_dim: usize,
    pub feature_dim: usize,
    pub pos_dim: usize,

    pub dep_attn: Linear, // [feature_dim + pos_dim + dep_dim -> feature_dim]
    pub dep_fc: Linear,
    pub pos_fc: Linear,
}

impl LabelAwareGcn {
    pub fn new(dep_dim: usize, feature_dim: usize, pos_dim: usize) -> Self {
        Self::with_rng(dep_dim, feature_dim, pos_dim, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        dep_dim: usize,
        feature_dim: usize,
        pos_dim: usize,
        rng: &mut R,
    ) -> Self {
        LabelAwareGcn {
            dep_dim,
            feature_dim,
            pos_dim,
            dep_attn: Linear::with_rng(feature_dim + pos_dim + dep_dim, feature_dim, rng),
            dep_fc: Linear::with_rng(dep_dim, feature_dim, rng),
            pos_fc: Linear::with_rng(pos_dim, feature_dim, rng),
        }
    }

    /// # Arguments
    /// * `text` - node features [batch, seq_len, feature_dim]
    /// * `adj` - binary adjacency [batch, seq_len, seq_len], zero marks a non-edge
    /// * `dep_embed` - edge label embeddings [batch, seq_len, seq_len, dep_dim]
    /// * `pos_embed` - node POS embeddings [batch, seq_len, pos_dim]
    pub fn forward(
        &self,
        text: &Array3<f32>,
        adj: &Array3<f32>,
        dep_embed: &Array4<f32>,
        pos_embed: &Array3<f32>,
    ) -> EncoderResult<GcnOutput> {
        let (batch_size, seq_len, _) = text.dim();
        ensure_shape("node features", &[batch_size, seq_len, self.feature_dim], text.shape())?;
        ensure_shape("adjacency", &[batch_size, seq_len, seq_len], adj.shape())?;
        ensure_shape(
            "dependency embedding",
            &[batch_size, seq_len, seq_len, self.dep_dim],
            dep_embed.shape(),
        )?;
        ensure_shape("pos embedding", &[batch_size, seq_len, self.pos_dim], pos_embed.shape())?;

        // Repeat each node's features and POS embedding over its neighbor axis
        let text_rows = text.view().insert_axis(Axis(2));
        let text_us = text_rows
            .broadcast((batch_size, seq_len, seq_len, self.feature_dim))
            .ok_or_else(|| {
                EncoderError::shape_mismatch(
                    "node features",
                    &[batch_size, seq_len, 1, self.feature_dim],
                    text_rows.shape(),
                )
            })?;
        let pos_rows = pos_embed.view().insert_axis(Axis(2));
        let pos_us = pos_rows
            .broadcast((batch_size, seq_len, seq_len, self.pos_dim))
            .ok_or_else(|| {
                EncoderError::shape_mismatch(
                    "pos embedding",
                    &[batch_size, seq_len, 1, self.pos_dim],
                    pos_rows.shape(),
                )
            })?;

        let edge_input = ndarray::concatenate(Axis(3), &[text_us, pos_us, dep_embed.view()])?;
        let logits = self.dep_attn.forward(&edge_input)?;

        let mut attention = logits.sum_axis(Axis(3));
        mask_non_edges(&mut attention, adj, EDGE_MASK_BIAS);
        softmax_last_axis(&mut attention);

        let node_values = text + &self.pos_fc.forward(pos_embed)?;
        let values = self.dep_fc.forward(dep_embed)? + &node_values.view().insert_axis(Axis(2));

        let mut features = Array3::<f32>::zeros((batch_size, seq_len, self.feature_dim));
        for (mut out_b, attn_b, values_b) in izip!(
            features.outer_iter_mut(),
            attention.outer_iter(),
            values.outer_iter()
        ) {
            for (mut out_i, attn_i, values_i) in
                izip!(out_b.outer_iter_mut(), attn_b.outer_iter(), values_b.outer_iter())
            {
                out_i.assign(&attn_i.dot(&values_i));
            }
        }

        Ok(GcnOutput {
            logits,
            features,
            attention,
        })
    }
}

impl Layer for LabelAwareGcn {
    fn layer_type(&self) -> &str {
        "LabelAwareGcn"
    }

    fn parameters(&self) -> usize {
        self.dep_attn.parameters() + self.dep_fc.parameters() + self.pos_fc.parameters()
    }
}
