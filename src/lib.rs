pub mod config;
pub mod dropout;
pub mod embedding;
pub mod encoder;
pub mod error;
pub mod gcn_stack;
pub mod label_aware_gcn;
pub mod layer;
pub mod linear;
pub mod local_attention;
pub mod ops;
// Re-export key structs for easier access
pub use config::EncoderConfig;
pub use dropout::Dropout;
pub use embedding::{Embedding, PADDING_ID};
pub use encoder::{EncoderOutput, SyntaxFusionEncoder};
pub use error::{EncoderError, EncoderResult};
pub use gcn_stack::{LabelAwareGcnStack, StackOutput};
pub use label_aware_gcn::{GcnOutput, LabelAwareGcn};
pub use layer::Layer;
pub use linear::Linear;
pub use local_attention::LocalAttention;

// Constants
pub const HIDDEN_DIM: usize = 768;
pub const DEP_DIM: usize = 100;
pub const POS_DIM: usize = 100;
