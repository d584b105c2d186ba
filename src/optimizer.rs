use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::layers::DenseLayer;

/// Applies gradient updates to a single layer.
///
/// `layer` identifies which layer of the network is being updated so that
/// stateful optimizers can address their per-layer accumulators.
/// `advance_step` is called once per training step, after every layer has
/// been updated.
pub trait Optimizer {
    fn update(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_gradients: &Array2<f32>,
        bias_gradients: &Array1<f32>,
        learning_rate: f32,
    );

    fn advance_step(&mut self) {}
}

#[derive(Serialize, Deserialize, Clone)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn update(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_gradients: &Array2<f32>,
        bias_gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update(
                layer,
                weights,
                biases,
                weight_gradients,
                bias_gradients,
                learning_rate,
            ),
            OptimizerWrapper::Adam(optimizer) => optimizer.update(
                layer,
                weights,
                biases,
                weight_gradients,
                bias_gradients,
                learning_rate,
            ),
        }
    }

    fn advance_step(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.advance_step(),
            OptimizerWrapper::Adam(optimizer) => optimizer.advance_step(),
        }
    }
}

/// Plain stochastic gradient descent.
#[derive(Serialize, Deserialize, Clone)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for SGD {
    fn update(
        &mut self,
        _layer: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_gradients: &Array2<f32>,
        bias_gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        weights.zip_mut_with(weight_gradients, |w, &g| *w -= learning_rate * g);
        biases.zip_mut_with(bias_gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam optimizer with per-layer first and second moment estimates.
///
/// The timestep `t` is shared by all layers and advances once per training
/// step, not once per layer update.
#[derive(Serialize, Deserialize, Clone)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    pub t: usize,
}

impl Adam {
    pub fn new(layers: &[DenseLayer], beta1: f32, beta2: f32, epsilon: f32) -> Self {
        let m_weights = layers
            .iter()
            .map(|layer| Array2::<f32>::zeros(layer.weights.dim()))
            .collect();
        let v_weights = layers
            .iter()
            .map(|layer| Array2::<f32>::zeros(layer.weights.dim()))
            .collect();
        let m_biases = layers
            .iter()
            .map(|layer| Array1::<f32>::zeros(layer.biases.dim()))
            .collect();
        let v_biases = layers
            .iter()
            .map(|layer| Array1::<f32>::zeros(layer.biases.dim()))
            .collect();

        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights,
            v_weights,
            m_biases,
            v_biases,
            t: 1,
        }
    }

    pub fn default_for(layers: &[DenseLayer]) -> Self {
        Self::new(layers, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn update(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        weight_gradients: &Array2<f32>,
        bias_gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.epsilon);
        let t = self.t as i32;
        let bias_correction1 = 1.0 - beta1.powi(t);
        let bias_correction2 = 1.0 - beta2.powi(t);

        let m = &mut self.m_weights[layer];
        let v = &mut self.v_weights[layer];
        m.zip_mut_with(weight_gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v.zip_mut_with(weight_gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        ndarray::Zip::from(&mut *weights)
            .and(&*m)
            .and(&*v)
            .for_each(|w, &m, &v| {
                let m_hat = m / bias_correction1;
                let v_hat = v / bias_correction2;
                *w -= learning_rate * m_hat / (v_hat.sqrt() + eps);
            });

        let m = &mut self.m_biases[layer];
        let v = &mut self.v_biases[layer];
        m.zip_mut_with(bias_gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v.zip_mut_with(bias_gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        ndarray::Zip::from(&mut *biases)
            .and(&*m)
            .and(&*v)
            .for_each(|b, &m, &v| {
                let m_hat = m / bias_correction1;
                let v_hat = v / bias_correction2;
                *b -= learning_rate * m_hat / (v_hat.sqrt() + eps);
            });
    }

    fn advance_step(&mut self) {
        self.t += 1;
    }
}
