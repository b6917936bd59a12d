//! Encoder configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EncoderError, EncoderResult};
use crate::{DEP_DIM, HIDDEN_DIM, POS_DIM};

/// Hyper-parameters of [`crate::SyntaxFusionEncoder`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Width of the incoming word representations
    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,
    /// Width of a dependency-relation embedding
    #[serde(default = "default_dep_dim")]
    pub dep_dim: usize,
    /// Width of a POS embedding
    #[serde(default = "default_pos_dim")]
    pub pos_dim: usize,
    /// Depth of the graph convolution stack, also the number of local attention passes
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,
    /// Local attention radius on each side of a token
    #[serde(default = "default_window")]
    pub window: usize,
    /// Rows in the dependency-relation table, padding row included
    #[serde(default = "default_deprel_size")]
    pub deprel_size: usize,
    /// Rows in the POS table, padding row included
    #[serde(default = "default_postag_size")]
    pub postag_size: usize,
    /// Dropout probability on the fused output
    #[serde(default = "default_output_dropout")]
    pub output_dropout: f32,
}

fn default_hidden_dim() -> usize {
    HIDDEN_DIM
}

fn default_dep_dim() -> usize {
    DEP_DIM
}

fn default_pos_dim() -> usize {
    POS_DIM
}

fn default_num_layers() -> usize {
    1
}

fn default_window() -> usize {
    2
}

fn default_deprel_size() -> usize {
    38 // 37 universal dependency relations + padding
}

fn default_postag_size() -> usize {
    18 // 17 universal POS tags + padding
}

fn default_output_dropout() -> f32 {
    0.1
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            hidden_dim: default_hidden_dim(),
            dep_dim: default_dep_dim(),
            pos_dim: default_pos_dim(),
            num_layers: default_num_layers(),
            window: default_window(),
            deprel_size: default_deprel_size(),
            postag_size: default_postag_size(),
            output_dropout: default_output_dropout(),
        }
    }
}

impl EncoderConfig {
    /// Create a configuration with the given feature widths and defaults elsewhere
    pub fn new(hidden_dim: usize, dep_dim: usize, pos_dim: usize) -> Self {
        Self {
            hidden_dim,
            dep_dim,
            pos_dim,
            ..Default::default()
        }
    }

    /// Set the stack depth
    pub fn with_num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// Set the local attention radius
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the embedding vocabulary sizes
    pub fn with_vocab_sizes(mut self, deprel_size: usize, postag_size: usize) -> Self {
        self.deprel_size = deprel_size;
        self.postag_size = postag_size;
        self
    }

    /// Set the output dropout probability
    pub fn with_dropout(mut self, output_dropout: f32) -> Self {
        self.output_dropout = output_dropout;
        self
    }

    /// Parse a JSON document and validate it
    pub fn from_json(json: &str) -> EncoderResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> EncoderResult<()> {
        if self.hidden_dim == 0 {
            return Err(EncoderError::config("hidden_dim must be positive"));
        }
        if self.dep_dim == 0 {
            return Err(EncoderError::config("dep_dim must be positive"));
        }
        if self.pos_dim == 0 {
            return Err(EncoderError::config("pos_dim must be positive"));
        }
        if self.num_layers == 0 {
            return Err(EncoderError::config("num_layers must be at least 1"));
        }
        if self.deprel_size < 2 {
            return Err(EncoderError::config(
                "deprel_size must hold the padding row and at least one relation",
            ));
        }
        if self.postag_size < 2 {
            return Err(EncoderError::config(
                "postag_size must hold the padding row and at least one tag",
            ));
        }
        if !(0.0..1.0).contains(&self.output_dropout) {
            return Err(EncoderError::config("output_dropout must be in [0, 1)"));
        }
        Ok(())
    }

    /// Width of the fusion projection input: graph output, POS output and word representations
    pub fn fusion_dim(&self) -> usize {
        self.hidden_dim * 2 + self.pos_dim
    }
}
