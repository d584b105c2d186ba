use crate::activations::Activation;
use ndarray::{array, Array2};

#[test]
fn test_relu_apply() {
    let mut input = array![1.0, -0.5, 0.0, 2.0];
    Activation::Relu.apply(&mut input);
    assert_eq!(input, array![1.0, 0.0, 0.0, 2.0]);
}

#[test]
fn test_relu_derivative() {
    let input = array![1.0, -0.5, 0.0, 2.0];
    let deriv = Activation::Relu.derivative(&input);
    assert_eq!(deriv, array![1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_linear_is_identity() {
    let mut input = array![1.0, -0.5, 0.0, 2.0];
    Activation::Linear.apply(&mut input);
    assert_eq!(input, array![1.0, -0.5, 0.0, 2.0]);

    let deriv = Activation::Linear.derivative(&input);
    assert_eq!(deriv, array![1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_sigmoid_bounds() {
    let mut input = array![-100.0, -1.0, 0.0, 1.0, 100.0];
    Activation::Sigmoid.apply(&mut input);
    for &v in input.iter() {
        assert!((0.0..=1.0).contains(&v));
    }
    assert!((input[2] - 0.5).abs() < 1e-6);
}

#[test]
fn test_tanh_bounds() {
    let mut input = array![-100.0, 0.0, 100.0];
    Activation::Tanh.apply(&mut input);
    assert!((input[0] + 1.0).abs() < 1e-4);
    assert!(input[1].abs() < 1e-6);
    assert!((input[2] - 1.0).abs() < 1e-4);
}

#[test]
fn test_batch_matches_single() {
    let single = array![0.3, -0.7, 1.5];
    for activation in [
        Activation::Relu,
        Activation::Linear,
        Activation::Sigmoid,
        Activation::Tanh,
    ] {
        let mut expected = single.clone();
        activation.apply(&mut expected);

        let mut batch = Array2::zeros((2, 3));
        batch.row_mut(0).assign(&single);
        batch.row_mut(1).assign(&single);
        activation.apply_batch(&mut batch);

        for row in 0..2 {
            for col in 0..3 {
                assert!((batch[[row, col]] - expected[col]).abs() < 1e-6);
            }
        }
    }
}
