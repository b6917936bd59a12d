use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, Dimension};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{EncoderError, EncoderResult};
use crate::layer::Layer;

/// Affine projection `x * W + b` over the last axis of its input.
pub struct Linear {
    pub in_features: usize,
    pub out_features: usize,
    pub weight: Array2<f32>, // [in_features, out_features]
    pub bias: Array1<f32>,
}

impl Linear {
    /// Initialize with random weights and zero bias
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_rng(in_features, out_features, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        // Xavier/He initialization: std = sqrt(2 / fan_in)
        let std = (2.0 / in_features as f32).sqrt();

        Linear {
            in_features,
            out_features,
            weight: Array2::from_shape_fn((in_features, out_features), |_| {
                let z: f32 = rng.sample(StandardNormal);
                z * std
            }),
            bias: Array1::zeros(out_features),
        }
    }

    /// Projects `[.., in_features]` to `[.., out_features]`.
    pub fn forward<S, D>(&self, input: &ArrayBase<S, D>) -> EncoderResult<Array<f32, D>>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        let last = input.ndim() - 1;
        let features = input.len_of(Axis(last));
        if features != self.in_features {
            return Err(EncoderError::shape_mismatch(
                "linear input",
                &[self.in_features],
                &[features],
            ));
        }

        let rows = input.len() / self.in_features.max(1);
        let flat = input.to_shape((rows, self.in_features))?;
        let projected = flat.dot(&self.weight) + &self.bias;

        let mut out_dim = input.raw_dim();
        out_dim[last] = self.out_features;
        Ok(projected.into_shape_with_order(out_dim)?)
    }
}

impl Layer for Linear {
    fn layer_type(&self) -> &str {
        "Linear"
    }

    fn parameters(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}
