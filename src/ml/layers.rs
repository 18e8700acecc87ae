// ============================================================
// Layer 5 — LayerStack Builder
// ============================================================
// Turns an ordered list of widths [a0, a1, ..., an] into n
// affine transforms T_i: a_i → a_{i+1}, held in an ordered Vec
// and addressed by position.
//
// Every transform owns its weight matrix and bias, drawn from
// the caller's RNG:
//
//   W, b ~ U(-1/√fan_in, 1/√fan_in)
//
// Threading the RNG through here (instead of relying on the
// backend's global generator) makes two models built from the
// same seed bit-identical.

use burn::{
    module::Param,
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
};
use rand::{distributions::Uniform, Rng};

use crate::domain::error::{AutoEncoderError, ModelResult};

#[derive(Module, Debug)]
pub struct LayerStack<B: Backend> {
    layers: Vec<Linear<B>>,
}

impl<B: Backend> LayerStack<B> {
    pub fn new<R: Rng + ?Sized>(
        widths: &[usize],
        rng:    &mut R,
        device: &B::Device,
    ) -> ModelResult<Self> {
        if widths.len() < 2 {
            return Err(AutoEncoderError::configuration(format!(
                "a layer stack needs at least 2 widths, got {:?}", widths
            )));
        }
        if widths.iter().any(|&w| w == 0) {
            return Err(AutoEncoderError::configuration(format!(
                "layer widths must be positive, got {:?}", widths
            )));
        }

        let layers = widths
            .windows(2)
            .map(|pair| init_linear(pair[0], pair[1], &mut *rng, device))
            .collect();

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Linear<B>] {
        &self.layers
    }

    /// Widths recovered from the parameter shapes: [a0, a1, ..., an].
    pub fn widths(&self) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.layers.len() + 1);
        for (i, layer) in self.layers.iter().enumerate() {
            let [d_in, d_out] = layer.weight.val().dims();
            if i == 0 {
                widths.push(d_in);
            }
            widths.push(d_out);
        }
        widths
    }
}

/// One independently initialised affine transform `d_in → d_out`.
pub fn init_linear<B: Backend, R: Rng + ?Sized>(
    d_in:   usize,
    d_out:  usize,
    rng:    &mut R,
    device: &B::Device,
) -> Linear<B> {
    let bound = 1.0 / (d_in as f32).sqrt();
    let dist  = Uniform::new_inclusive(-bound, bound);

    let weight: Vec<f32> = (0..d_in * d_out).map(|_| rng.sample(dist)).collect();
    let bias:   Vec<f32> = (0..d_out).map(|_| rng.sample(dist)).collect();

    // Zeros keeps the backend RNG out of it; both tensors are replaced below.
    let mut linear = LinearConfig::new(d_in, d_out)
        .with_initializer(Initializer::Zeros)
        .init(device);
    linear.weight = Param::from_tensor(Tensor::from_data(
        TensorData::new(weight, [d_in, d_out]),
        device,
    ));
    linear.bias = Some(Param::from_tensor(Tensor::from_data(
        TensorData::new(bias, [d_out]),
        device,
    )));
    linear
}
