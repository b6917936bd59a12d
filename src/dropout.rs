use ndarray::{Array, Dimension};
use rand::Rng;

/// Inverted dropout. Identity unless training is enabled.
pub struct Dropout {
    pub rate: f32,
    training: bool,
}

impl Dropout {
    pub fn new(rate: f32) -> Self {
        Dropout {
            rate,
            training: false,
        }
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn forward<D: Dimension>(&self, input: Array<f32, D>) -> Array<f32, D> {
        self.forward_with_rng(input, &mut rand::rng())
    }

    /// Zeroes each element with probability `rate` and rescales survivors by `1 / (1 - rate)`.
    pub fn forward_with_rng<D, R>(&self, mut input: Array<f32, D>, rng: &mut R) -> Array<f32, D>
    where
        D: Dimension,
        R: Rng + ?Sized,
    {
        if !self.training || self.rate <= 0.0 {
            return input;
        }

        let keep = 1.0 - self.rate;
        input.mapv_inplace(|x| {
            if rng.random::<f32>() < self.rate {
                0.0
            } else {
                x / keep
            }
        });
        input
    }
}
