use ndarray::{s, Array1, Array2, Array3};
use synfue::{EncoderError, LocalAttention};

const BATCH: usize = 2;
const SEQ_LEN: usize = 9;
const HIDDEN: usize = 10;
const POS: usize = 4;

fn words() -> Array3<f32> {
    Array3::from_shape_fn((BATCH, SEQ_LEN, HIDDEN), |(b, i, j)| {
        ((b * 7 + i * HIDDEN + j) as f32 * 0.1).sin()
    })
}

fn tags() -> Array3<f32> {
    Array3::from_shape_fn((BATCH, SEQ_LEN, POS), |(b, i, j)| ((b + i * POS + j) as f32 * 0.2).cos())
}

#[test]
fn test_window_mask_selects_full_window_on_padded_axis() {
    let window = 2;
    let mask = LocalAttention::window_mask(SEQ_LEN, window);

    assert_eq!(mask.shape(), [SEQ_LEN, SEQ_LEN + 2 * window]);
    for row in mask.rows() {
        assert_eq!(row.sum(), (2 * window + 1) as f32);
    }
}

#[test]
fn test_window_mask_truncates_at_sequence_boundaries() {
    let window = 2;
    let mask = LocalAttention::window_mask(SEQ_LEN, window);
    let cropped = mask.slice(s![.., window..window + SEQ_LEN]);

    for i in 0..SEQ_LEN {
        let lo = i.saturating_sub(window);
        let hi = (i + window).min(SEQ_LEN - 1);
        let expected = (hi - lo + 1) as f32;
        assert_eq!(cropped.row(i).sum(), expected, "row {}", i);
        for j in 0..SEQ_LEN {
            let inside = j >= lo && j <= hi;
            assert_eq!(cropped[[i, j]] == 1.0, inside, "cell ({}, {})", i, j);
        }
    }

    // The first token never sees the end of the sentence
    assert_eq!(cropped[[0, SEQ_LEN - 1]], 0.0);
    assert_eq!(cropped[[SEQ_LEN - 1, 0]], 0.0);
}

#[test]
fn test_attention_is_confined_to_window() {
    let window = 1;
    let local = LocalAttention::new(window, 1);
    let x = words();
    let pos = tags();

    let weights = local
        .attention(x.slice(s![0, .., ..]), pos.slice(s![0, .., ..]))
        .unwrap();

    assert_eq!(weights.shape(), [SEQ_LEN, SEQ_LEN]);
    for i in 0..SEQ_LEN {
        let row_sum: f32 = weights.row(i).sum();
        assert!((row_sum - 1.0).abs() < 1e-5, "row {} sums to {}", i, row_sum);
        for j in 0..SEQ_LEN {
            if i.abs_diff(j) > window {
                assert!(weights[[i, j]] < 1e-6, "({}, {}) = {}", i, j, weights[[i, j]]);
            }
        }
    }
}

#[test]
fn test_local_attention_output_shape() {
    let local = LocalAttention::new(2, 3);

    let output = local.forward(&words(), &tags()).unwrap();

    assert_eq!(output.shape(), [BATCH, SEQ_LEN, POS]);
    assert!(output.iter().all(|x| x.is_finite()));
}

#[test]
fn test_zero_window_keeps_pos_embeddings() {
    let local = LocalAttention::new(0, 2);
    let pos = tags();

    let output = local.forward(&words(), &pos).unwrap();

    for (got, want) in output.iter().zip(pos.iter()) {
        assert!((got - want).abs() < 1e-6);
    }
}

#[test]
fn test_zero_iterations_is_identity() {
    let local = LocalAttention::new(3, 0);
    let pos = tags();

    let output = local.forward(&words(), &pos).unwrap();

    assert_eq!(output, pos);
}

#[test]
fn test_uniform_tags_stay_uniform() {
    // Any convex combination of identical vectors is that vector
    let local = LocalAttention::new(2, 2);
    let tag = Array1::from(vec![0.5, -1.0, 0.25, 2.0]);
    let pos = Array3::from_shape_fn((BATCH, SEQ_LEN, POS), |(_, _, j)| tag[j]);

    let output = local.forward(&words(), &pos).unwrap();

    for (got, want) in output.iter().zip(pos.iter()) {
        assert!((got - want).abs() < 1e-4, "Expected {}, got {}", want, got);
    }
}

#[test]
fn test_single_pass_is_windowed_weighted_sum() {
    let local = LocalAttention::new(2, 1);
    let x = words();
    let pos = tags();

    let output = local.forward(&x, &pos).unwrap();

    for b in 0..BATCH {
        let pos_b = pos.slice(s![b, .., ..]);
        let weights = local.attention(x.slice(s![b, .., ..]), pos_b).unwrap();
        let expected = weights.dot(&pos_b);
        for ((i, j), &want) in expected.indexed_iter() {
            let got = output[[b, i, j]];
            assert!((got - want).abs() < 1e-5, "({}, {}, {}): {} vs {}", b, i, j, got, want);
        }
    }
}

#[test]
fn test_one_hot_tags_expose_window_weights() {
    // With one-hot tags, output[i] is exactly the attention row of token i
    let window = 1;
    let local = LocalAttention::new(window, 1);
    let pos = Array3::from_shape_fn((BATCH, SEQ_LEN, SEQ_LEN), |(_, i, j)| {
        if i == j { 1.0 } else { 0.0 }
    });
    let x = words();

    let output = local.forward(&x, &pos).unwrap();

    for b in 0..BATCH {
        for i in 0..SEQ_LEN {
            let row_sum: f32 = (0..SEQ_LEN).map(|j| output[[b, i, j]]).sum();
            assert!((row_sum - 1.0).abs() < 1e-5, "row ({}, {}) sums to {}", b, i, row_sum);
            for j in 0..SEQ_LEN {
                if i.abs_diff(j) > window {
                    assert!(output[[b, i, j]] < 1e-6, "({}, {}, {})", b, i, j);
                } else {
                    assert!(output[[b, i, j]] > 0.0, "({}, {}, {})", b, i, j);
                }
            }
        }
    }
    assert_ne!(output, pos);
}

#[test]
fn test_mismatched_sequence_lengths_are_rejected() {
    let local = LocalAttention::new(1, 1);
    let pos = Array3::<f32>::zeros((BATCH, SEQ_LEN + 1, POS));

    let result = local.forward(&words(), &pos);
    assert!(matches!(result, Err(EncoderError::ShapeMismatch { .. })));

    let single = Array2::<f32>::zeros((SEQ_LEN - 1, POS));
    let result = local.attention(words().slice(s![0, .., ..]), single.view());
    assert!(matches!(result, Err(EncoderError::ShapeMismatch { .. })));
}
