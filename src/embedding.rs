use ndarray::{Array, Array2, ArrayBase, Data, Dimension, IxDyn};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{EncoderError, EncoderResult};
use crate::layer::Layer;

/// Id reserved for padding in every lookup table.
pub const PADDING_ID: usize = 0;

/// Lookup table from integer ids to dense rows.
///
/// Row [`PADDING_ID`] is all zeros so padded positions carry no signal.
pub struct Embedding {
    pub name: &'static str,
    pub num_embeddings: usize,
    pub embedding_dim: usize,
    pub weight: Array2<f32>, // [num_embeddings, embedding_dim]
}

impl Embedding {
    pub fn new(name: &'static str, num_embeddings: usize, embedding_dim: usize) -> Self {
        Self::with_rng(name, num_embeddings, embedding_dim, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        name: &'static str,
        num_embeddings: usize,
        embedding_dim: usize,
        rng: &mut R,
    ) -> Self {
        let mut weight = Array2::from_shape_fn((num_embeddings, embedding_dim), |_| {
            rng.sample::<f32, _>(StandardNormal)
        });
        if num_embeddings > PADDING_ID {
            weight.row_mut(PADDING_ID).fill(0.0);
        }

        Embedding {
            name,
            num_embeddings,
            embedding_dim,
            weight,
        }
    }

    /// Replaces every id with its row: `[..]` ids become `[.., embedding_dim]`.
    pub fn forward<S, D>(&self, ids: &ArrayBase<S, D>) -> EncoderResult<Array<f32, D::Larger>>
    where
        S: Data<Elem = usize>,
        D: Dimension,
    {
        let mut data = Vec::with_capacity(ids.len() * self.embedding_dim);
        for &id in ids.iter() {
            if id >= self.num_embeddings {
                return Err(EncoderError::IndexOutOfRange {
                    table: self.name,
                    index: id,
                    size: self.num_embeddings,
                });
            }
            data.extend(self.weight.row(id).iter().copied());
        }

        let mut shape = ids.shape().to_vec();
        shape.push(self.embedding_dim);
        let embedded = Array::from_shape_vec(IxDyn(&shape), data)?;
        Ok(embedded.into_dimensionality::<D::Larger>()?)
    }
}

impl Layer for Embedding {
    fn layer_type(&self) -> &str {
        "Embedding"
    }

    fn parameters(&self) -> usize {
        self.weight.len()
    }
}
