use itertools::izip;
use ndarray::{s, Array2, Array3, ArrayView2, Axis, Zip};

use crate::error::{ensure_shape, EncoderResult};
use crate::ops::{pad_columns, softmax_last_axis, WINDOW_SENTINEL};

/// Windowed self-attention that smooths POS embeddings over nearby tokens.
///
/// Each pass scores token pairs on `[word; pos]` and lets every token take a
/// weighted sum of the POS vectors within `window` positions on either side.
pub struct LocalAttention {
    pub window: usize,
    pub iterations: usize,
}

impl LocalAttention {
    pub fn new(window: usize, iterations: usize) -> Self {
        LocalAttention { window, iterations }
    }

    /// Window selector over the padded key axis, shape [seq_len, seq_len + 2 * window].
    ///
    /// Row `i` covers padded columns `i..=i + 2 * window`, i.e. original
    /// positions `i - window..=i + window`.
    pub fn window_mask(seq_len: usize, window: usize) -> Array2<f32> {
        let mut mask = Array2::zeros((seq_len, seq_len + 2 * window));
        for i in 0..seq_len {
            mask.slice_mut(s![i, i..=i + 2 * window]).fill(1.0);
        }
        mask
    }

    /// # Arguments
    /// * `x` - word representations [batch, seq_len, hidden_dim]
    /// * `pos_embed` - POS embeddings [batch, seq_len, pos_dim]
    ///
    /// # Returns
    /// Refined POS representations [batch, seq_len, pos_dim]
    pub fn forward(&self, x: &Array3<f32>, pos_embed: &Array3<f32>) -> EncoderResult<Array3<f32>> {
        let (batch_size, seq_len, _) = x.dim();
        let pos_dim = pos_embed.len_of(Axis(2));
        ensure_shape("pos embedding", &[batch_size, seq_len, pos_dim], pos_embed.shape())?;

        let mask = Self::window_mask(seq_len, self.window);
        let mut output = pos_embed.clone();

        for _ in 0..self.iterations {
            let mut next = Array3::<f32>::zeros(output.raw_dim());
            for (mut next_b, x_b, pos_b) in
                izip!(next.outer_iter_mut(), x.outer_iter(), output.outer_iter())
            {
                let weights = self.masked_weights(x_b, pos_b, &mask)?;
                next_b.assign(&weights.dot(&pos_b));
            }
            output = next;
        }

        Ok(output)
    }

    /// Attention weights of a single sentence, [seq_len, seq_len].
    pub fn attention<'a>(
        &self,
        x: ArrayView2<'a, f32>,
        pos: ArrayView2<'a, f32>,
    ) -> EncoderResult<Array2<f32>> {
        ensure_shape("pos embedding", &[x.nrows(), pos.ncols()], pos.shape())?;
        let mask = Self::window_mask(x.nrows(), self.window);
        self.masked_weights(x, pos, &mask)
    }

    fn masked_weights<'a>(
        &self,
        x: ArrayView2<'a, f32>,
        pos: ArrayView2<'a, f32>,
        mask: &Array2<f32>,
    ) -> EncoderResult<Array2<f32>> {
        let seq_len = x.nrows();
        let val = ndarray::concatenate(Axis(1), &[x, pos])?;
        let scores = val.dot(&val.t());

        let mut padded = pad_columns(&scores, self.window, WINDOW_SENTINEL);
        Zip::from(&mut padded)
            .and(mask)
            .for_each(|score, &m| *score = *score * m + (1.0 - m) * WINDOW_SENTINEL);
        softmax_last_axis(&mut padded);

        Ok(padded
            .slice(s![.., self.window..self.window + seq_len])
            .to_owned())
    }
}
