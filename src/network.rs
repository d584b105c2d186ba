use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::layers::DenseLayer;
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// A feed-forward neural network: a stack of dense layers trained against a
/// mean-squared-error objective.
#[derive(Serialize, Deserialize, Clone)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes, activations,
    /// and optimizer. `layer_sizes` has one entry per layer boundary, so a
    /// `[4, 24, 24, 2]` network takes 4 inputs, has two hidden layers of 24
    /// units, and emits 2 outputs.
    pub fn new(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
    ) -> Self {
        assert_eq!(layer_sizes.len() - 1, activations.len());

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation))
            .collect::<Vec<_>>();

        NeuralNetwork { layers, optimizer }
    }

    /// Number of inputs the first layer expects.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.input_size())
    }

    /// Number of outputs the last layer produces.
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.output_size())
    }

    /// Perform a forward pass for a single input vector.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let input = input.insert_axis(Axis(0));
        let output = self.forward_batch(input.view());
        let output_shape = output.shape()[1];
        output
            .into_shape((output_shape,))
            .expect("batch of one flattens to a vector")
    }

    /// Perform a forward pass for a batch of input vectors.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// Backpropagate a batch of output errors through the network, returning
    /// per-layer (weight, bias) gradients in forward order.
    fn backward_batch(&mut self, output_errors: ArrayView2<f32>) -> Vec<(Array2<f32>, Array1<f32>)> {
        let mut gradients: Vec<(Array2<f32>, Array1<f32>)> = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for i in (0..self.layers.len()).rev() {
            let layer = &self.layers[i];
            let (adjusted_error, weight_gradients, bias_gradients) =
                layer.backward_batch(current_error.view());
            gradients.push((weight_gradients, bias_gradients));

            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        gradients
    }

    /// Perform one supervised training step on a single example, returning the
    /// mean squared error of the prediction before the update.
    pub fn fit(&mut self, input: ArrayView1<f32>, target: ArrayView1<f32>, learning_rate: f32) -> f32 {
        let input = input.insert_axis(Axis(0));
        let target = target.insert_axis(Axis(0));
        self.fit_batch(input.view(), target.view(), learning_rate)
    }

    /// Perform one supervised training step on a batch of examples, returning
    /// the mean squared error of the predictions before the update.
    pub fn fit_batch(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> f32 {
        let outputs = self.forward_batch(inputs);
        let output_errors = &outputs - &targets;
        let loss = output_errors.mapv(|e| e * e).mean().unwrap_or(0.0);

        let gradients = self.backward_batch(output_errors.view());
        for (i, (layer, (weight_gradients, bias_gradients))) in
            self.layers.iter_mut().zip(gradients).enumerate()
        {
            self.optimizer.update(
                i,
                &mut layer.weights,
                &mut layer.biases,
                &weight_gradients,
                &bias_gradients,
                learning_rate,
            );
        }
        self.optimizer.advance_step();

        loss
    }

    /// Save the network's state to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network from a file.
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read(path)?;
        let network: Self = bincode::deserialize(&data)?;
        if network.layers.is_empty() {
            return Err(DqnError::SerializationError(
                "network file contains no layers".to_string(),
            ));
        }
        Ok(network)
    }
}
