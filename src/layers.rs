use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;

// Initial weight range; biases start at zero.
const WEIGHT_INIT_LIMIT: f32 = 0.1;

/// A fully connected (dense) layer.
///
/// The affine transform `x * W + b` followed by the layer's activation.
/// `last_inputs` and `preactivation` hold the intermediates of the most
/// recent forward pass so `backward_batch` can apply the chain rule.
#[derive(Serialize, Deserialize, Clone)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    last_inputs: Option<Array2<f32>>,
    preactivation: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a layer with weights drawn uniformly from ±0.1 and zero
    /// biases.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        DenseLayer {
            weights: Array2::random(
                (input_size, output_size),
                Uniform::new(-WEIGHT_INIT_LIMIT, WEIGHT_INIT_LIMIT),
            ),
            biases: Array1::zeros(output_size),
            activation,
            last_inputs: None,
            preactivation: None,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass for a single input vector.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let batched = input.insert_axis(Axis(0));
        let output = self.forward_batch(batched.view());
        let width = output.shape()[1];
        output
            .into_shape((width,))
            .expect("batch of one flattens to a vector")
    }

    /// Forward pass for a batch of input rows, caching the intermediates
    /// needed by `backward_batch`.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.last_inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights);
        outputs += &self.biases.view().insert_axis(Axis(0));
        self.preactivation = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Gradients for a batch of output errors: the error propagated through
    /// the activation (to hand to the previous layer), the weight gradients,
    /// and the bias gradients.
    pub fn backward_batch(
        &self,
        output_errors: ArrayView2<f32>,
    ) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let preactivation = self
            .preactivation
            .as_ref()
            .expect("forward_batch() must run before backward_batch()");
        let inputs = self
            .last_inputs
            .as_ref()
            .expect("forward_batch() must run before backward_batch()");

        let adjusted_error =
            output_errors.to_owned() * &self.activation.derivative_batch(preactivation.view());
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));

        (adjusted_error, weight_gradients, bias_gradients)
    }
}
