//! Tensor helpers shared by the attention layers.

use ndarray::{Array, Array2, ArrayBase, Axis, Data, Dimension, Zip};

/// Bias added to graph attention scores of non-edges.
pub const EDGE_MASK_BIAS: f32 = -1e30;

/// Sentinel written into local attention cells outside the window.
pub const WINDOW_SENTINEL: f32 = -1e18;

/// Applies softmax over the last axis in place.
pub fn softmax_last_axis<D: Dimension>(scores: &mut Array<f32, D>) {
    let last = Axis(scores.ndim() - 1);
    for mut lane in scores.lanes_mut(last) {
        let max_val = lane.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
        lane.mapv_inplace(|x| (x - max_val).exp());
        let sum_exp = lane.sum();
        lane /= sum_exp;
    }
}

/// Adds `bias` to every score whose adjacency entry is zero.
pub fn mask_non_edges<S, D>(scores: &mut Array<f32, D>, adj: &ArrayBase<S, D>, bias: f32)
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    Zip::from(scores).and(adj).for_each(|s, &a| {
        if a == 0.0 {
            *s += bias;
        }
    });
}

/// Pads every row with `width` columns of `value` on both sides.
pub fn pad_columns(scores: &Array2<f32>, width: usize, value: f32) -> Array2<f32> {
    let (rows, cols) = scores.dim();
    let mut padded = Array2::from_elem((rows, cols + 2 * width), value);
    padded
        .slice_mut(ndarray::s![.., width..width + cols])
        .assign(scores);
    padded
}
