//! Fusion of dependency-graph, POS and contextual word features.

use ndarray::{Array2, Array3, Array4, Axis};
use rand::Rng;
use tracing::{debug, info};

use crate::config::EncoderConfig;
use crate::dropout::Dropout;
use crate::embedding::Embedding;
use crate::error::{ensure_shape, EncoderResult};
use crate::gcn_stack::LabelAwareGcnStack;
use crate::layer::Layer;
use crate::linear::Linear;
use crate::local_attention::LocalAttention;

/// Output of [`SyntaxFusionEncoder::forward`].
#[derive(Debug, Clone)]
pub struct EncoderOutput {
    /// Fused token representations, [batch, seq_len, hidden_dim]
    pub fused: Array3<f32>,
    /// Edge logits of the last graph layer, [batch, seq_len, seq_len, hidden_dim]
    pub logits: Array4<f32>,
    /// Edge attention of every graph layer, when requested
    pub attentions: Option<Vec<Array3<f32>>>,
}

/// Encoder that enriches word representations with syntax.
///
/// The label-aware graph stack and the local POS attention run side by side on
/// the same inputs; their outputs are concatenated with the original word
/// representations and projected back to `hidden_dim`.
pub struct SyntaxFusionEncoder {
    pub config: EncoderConfig,
    pub pos_embedding: Embedding,
    pub gcn: LabelAwareGcnStack,
    pub local_attention: LocalAttention,
    fc: Linear,
    dropout: Dropout,
}

impl SyntaxFusionEncoder {
    pub fn new(config: EncoderConfig) -> EncoderResult<Self> {
        Self::with_rng(config, &mut rand::rng())
    }

    /// Builds the encoder drawing every initial weight from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: EncoderConfig, rng: &mut R) -> EncoderResult<Self> {
        config.validate()?;

        let gcn = LabelAwareGcnStack::with_rng(
            config.num_layers,
            config.deprel_size,
            config.dep_dim,
            config.hidden_dim,
            config.pos_dim,
            rng,
        )?;
        let encoder = SyntaxFusionEncoder {
            pos_embedding: Embedding::with_rng("pos tag", config.postag_size, config.pos_dim, rng),
            gcn,
            local_attention: LocalAttention::new(config.window, config.num_layers),
            fc: Linear::with_rng(config.fusion_dim(), config.hidden_dim, rng),
            dropout: Dropout::new(config.output_dropout),
            config,
        };

        info!(
            hidden_dim = encoder.config.hidden_dim,
            dep_dim = encoder.config.dep_dim,
            pos_dim = encoder.config.pos_dim,
            num_layers = encoder.config.num_layers,
            window = encoder.config.window,
            parameters = encoder.parameters(),
            "syntax fusion encoder initialized"
        );
        Ok(encoder)
    }

    /// Enables dropout.
    pub fn train(&mut self) {
        self.dropout.set_training(true);
    }

    /// Disables dropout. A new encoder starts in this mode.
    pub fn eval(&mut self) {
        self.dropout.set_training(false);
    }

    pub fn is_training(&self) -> bool {
        self.dropout.is_training()
    }

    /// # Arguments
    /// * `word_reps` - contextual word representations [batch, seq_len, hidden_dim]
    /// * `simple_graph` - binary dependency adjacency [batch, seq_len, seq_len]
    /// * `graph` - dependency relation ids [batch, seq_len, seq_len], 0 is padding
    /// * `pos` - POS tag ids [batch, seq_len], 0 is padding
    /// * `output_attention` - also return the attention of every graph layer
    pub fn forward(
        &self,
        word_reps: &Array3<f32>,
        simple_graph: &Array3<f32>,
        graph: &Array3<usize>,
        pos: &Array2<usize>,
        output_attention: bool,
    ) -> EncoderResult<EncoderOutput> {
        let (batch_size, seq_len, _) = word_reps.dim();
        debug!(batch_size, seq_len, output_attention, "encoder forward");

        ensure_shape(
            "word representations",
            &[batch_size, seq_len, self.config.hidden_dim],
            word_reps.shape(),
        )?;
        ensure_shape("simple graph", &[batch_size, seq_len, seq_len], simple_graph.shape())?;
        ensure_shape("relation graph", &[batch_size, seq_len, seq_len], graph.shape())?;
        ensure_shape("pos ids", &[batch_size, seq_len], pos.shape())?;

        let pos_embed = self.pos_embedding.forward(pos)?;
        let stack = self.gcn.forward(word_reps, simple_graph, graph, &pos_embed, output_attention)?;
        let pos_output = self.local_attention.forward(word_reps, &pos_embed)?;

        let fused_input = ndarray::concatenate(
            Axis(2),
            &[stack.features.view(), pos_output.view(), word_reps.view()],
        )?;
        let fused = self.dropout.forward(self.fc.forward(&fused_input)?);

        Ok(EncoderOutput {
            fused,
            logits: stack.logits,
            attentions: stack.attentions,
        })
    }
}

impl Layer for SyntaxFusionEncoder {
    fn layer_type(&self) -> &str {
        "SyntaxFusionEncoder"
    }

    fn parameters(&self) -> usize {
        self.pos_embedding.parameters() + self.gcn.parameters() + self.fc.parameters()
    }
}
