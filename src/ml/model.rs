// ============================================================
// Layer 5 — AutoEncoder Model
// ============================================================
// input → input projection → encoder stack → embedding
// embedding → mirrored stack → output projection → input width
//
// ReLU follows the input projection and every hidden stack
// transform, and dropout follows the hidden stack transforms.
// The embedding and the reconstruction are linear.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig,
        Linear,
        Relu,
    },
    prelude::*,
};
use rand::Rng;

use crate::domain::{
    error::{AutoEncoderError, ModelResult},
    schedule::WidthSchedule,
};
use crate::ml::layers::{init_linear, LayerStack};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, do NOT add them again or you get conflicting impls.
/// Everything needed to rebuild an autoencoder's topology. Also stored next
/// to every checkpoint so a loader can check it before touching weights.
#[derive(Config, Debug)]
pub struct AutoEncoderConfig {
    /// Raw feature count (784 for flattened MNIST)
    pub input_width: usize,
    /// Encoder width schedule [w0, ..., wk]; wk is the embedding size
    pub widths:      Vec<usize>,
    /// Dropout probability in [0, 1)
    pub dropout:     f64,
}

impl AutoEncoderConfig {
    /// Check every field and return the validated schedule.
    pub fn validate(&self) -> ModelResult<WidthSchedule> {
        if self.input_width == 0 {
            return Err(AutoEncoderError::configuration("input_width must be positive"));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(AutoEncoderError::configuration(format!(
                "dropout must lie in [0, 1), got {}", self.dropout
            )));
        }
        WidthSchedule::new(self.widths.clone())
    }

    /// Build a fresh autoencoder. All parameters are drawn from `rng`.
    pub fn init<B: Backend, R: Rng + ?Sized>(
        &self,
        rng:    &mut R,
        device: &B::Device,
    ) -> ModelResult<AutoEncoder<B>> {
        let schedule = self.validate()?;
        let encoder  = Encoder::new(self.input_width, &schedule, self.dropout, rng, device)?;
        let decoder  = Decoder::from_encoder(&encoder, rng, device)?;
        Ok(AutoEncoder { encoder, decoder })
    }

    /// Describe how `other` differs topologically, if it does.
    /// Dropout is not part of the topology.
    pub fn topology_mismatch(&self, other: &AutoEncoderConfig) -> Option<String> {
        if self.input_width != other.input_width {
            return Some(format!(
                "input_width {} != {}", self.input_width, other.input_width
            ));
        }
        if self.widths != other.widths {
            return Some(format!(
                "width schedule {:?} != {:?}", self.widths, other.widths
            ));
        }
        None
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
/// input_width → w0 → w1 → ... → wk
///
/// The input projection and every stack transform except the last are
/// followed by ReLU; the stack's hidden outputs also get dropout. The last
/// transform is left raw: its output is the embedding.
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    input_projection: Linear<B>,
    stack:            LayerStack<B>,
    dropout:          Dropout,
    activation:       Relu,
}

impl<B: Backend> Encoder<B> {
    pub fn new<R: Rng + ?Sized>(
        input_width: usize,
        schedule:    &WidthSchedule,
        dropout:     f64,
        rng:         &mut R,
        device:      &B::Device,
    ) -> ModelResult<Self> {
        if input_width == 0 {
            return Err(AutoEncoderError::configuration("input_width must be positive"));
        }
        let input_projection = init_linear(input_width, schedule.first(), rng, device);
        let stack            = LayerStack::new(schedule.as_slice(), rng, device)?;
        Ok(Self {
            input_projection,
            stack,
            dropout:    DropoutConfig::new(dropout).init(),
            activation: Relu::new(),
        })
    }

    pub fn input_width(&self) -> usize {
        self.input_projection.weight.val().dims()[0]
    }

    /// The width schedule this encoder was built from.
    pub fn widths(&self) -> Vec<usize> {
        self.stack.widths()
    }

    pub fn embedding_width(&self) -> usize {
        self.stack.widths().last().copied().unwrap_or(0)
    }

    pub fn dropout_prob(&self) -> f64 {
        self.dropout.prob
    }

    /// x: [batch, input_width] → embedding: [batch, wk]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = self.activation.forward(self.input_projection.forward(x));
        let last  = self.stack.layers().len() - 1;
        for (i, layer) in self.stack.layers().iter().enumerate() {
            x = layer.forward(x);
            if i < last {
                x = self.dropout.forward(self.activation.forward(x));
            }
        }
        x
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
/// wk → ... → w0 → input_width
///
/// Built only from an existing encoder: its stack mirrors the encoder's
/// schedule and its output projection returns to the encoder's input width.
/// Every stack transform is followed by ReLU and dropout; the output
/// projection is not, so reconstructions are unconstrained.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    stack:             LayerStack<B>,
    output_projection: Linear<B>,
    dropout:           Dropout,
    activation:        Relu,
}

impl<B: Backend> Decoder<B> {
    pub fn from_encoder<R: Rng + ?Sized>(
        encoder: &Encoder<B>,
        rng:     &mut R,
        device:  &B::Device,
    ) -> ModelResult<Self> {
        let mirror = WidthSchedule::new(encoder.widths())?.reversed();

        let stack = LayerStack::new(mirror.as_slice(), rng, device)?;
        let output_projection = init_linear(mirror.embedding_width(), encoder.input_width(), rng, device);

        Ok(Self {
            stack,
            output_projection,
            dropout:    DropoutConfig::new(encoder.dropout_prob()).init(),
            activation: Relu::new(),
        })
    }

    /// Widths of the mirrored stack: [wk, ..., w0].
    pub fn widths(&self) -> Vec<usize> {
        self.stack.widths()
    }

    pub fn output_width(&self) -> usize {
        self.output_projection.weight.val().dims()[1]
    }

    /// z: [batch, wk] → reconstruction: [batch, input_width]
    pub fn forward(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = z;
        for layer in self.stack.layers() {
            x = self.dropout.forward(self.activation.forward(layer.forward(x)));
        }
        self.output_projection.forward(x)
    }
}

// ─── AutoEncoder ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct AutoEncoder<B: Backend> {
    encoder: Encoder<B>,
    decoder: Decoder<B>,
}

pub struct AutoEncoderOutput<B: Backend> {
    pub embedding:      Tensor<B, 2>,
    pub reconstruction: Tensor<B, 2>,
}

impl<B: Backend> AutoEncoder<B> {
    pub fn encoder(&self) -> &Encoder<B> {
        &self.encoder
    }

    /// Topology and dropout read back from the module itself.
    pub fn config(&self) -> AutoEncoderConfig {
        AutoEncoderConfig::new(
            self.encoder.input_width(),
            self.encoder.widths(),
            self.encoder.dropout_prob(),
        )
    }

    /// Describes the first parameter shape that differs from `other`, decoder
    /// included. Shapes come from the tensors, not from any stored config.
    pub fn shape_mismatch(&self, other: &AutoEncoder<B>) -> Option<String> {
        if let Some(reason) = self.config().topology_mismatch(&other.config()) {
            return Some(reason);
        }
        let (ours, theirs) = (self.decoder.widths(), other.decoder.widths());
        if ours != theirs {
            return Some(format!("decoder widths {:?} vs {:?}", ours, theirs));
        }
        let (ours, theirs) = (self.decoder.output_width(), other.decoder.output_width());
        if ours != theirs {
            return Some(format!("decoder output_width {} vs {}", ours, theirs));
        }
        None
    }

    /// x: [batch, input_width] → embedding [batch, wk] + reconstruction [batch, input_width]
    pub fn forward(&self, x: Tensor<B, 2>) -> AutoEncoderOutput<B> {
        let embedding      = self.encoder.forward(x);
        let reconstruction = self.decoder.forward(embedding.clone());
        AutoEncoderOutput { embedding, reconstruction }
    }

    pub fn embed(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.encoder.forward(x)
    }

    /// Mean squared reconstruction error against the input itself.
    pub fn forward_loss(&self, x: Tensor<B, 2>) -> (Tensor<B, 1>, AutoEncoderOutput<B>) {
        let output = self.forward(x.clone());
        let loss   = MseLoss::new().forward(output.reconstruction.clone(), x, Reduction::Mean);
        (loss, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{Autodiff, NdArray},
        module::AutodiffModule,
        tensor::Distribution,
    };
    use rand::{rngs::StdRng, SeedableRng};

    type B  = NdArray;
    type AD = Autodiff<NdArray>;

    fn values<Bk: Backend, const D: usize>(t: Tensor<Bk, D>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    fn input<Bk: Backend>(rows: usize, cols: usize, device: &Bk::Device) -> Tensor<Bk, 2> {
        let data: Vec<f32> = (0..rows * cols).map(|i| ((i * 37 % 101) as f32) / 50.0 - 1.0).collect();
        Tensor::from_data(TensorData::new(data, [rows, cols]), device)
    }

    #[test]
    fn test_output_shapes_follow_schedule() {
        let device = Default::default();
        let schedules = [vec![8, 3], vec![16, 8, 4], vec![32, 32, 64, 5]];
        for widths in schedules {
            let cfg   = AutoEncoderConfig::new(20, widths.clone(), 0.0);
            let model = cfg.init::<B, _>(&mut StdRng::seed_from_u64(0), &device).unwrap();
            let out   = model.forward(input::<B>(6, 20, &device));
            assert_eq!(out.embedding.dims(), [6, *widths.last().unwrap()]);
            assert_eq!(out.reconstruction.dims(), [6, 20]);
        }
    }

    #[test]
    fn test_decoder_mirrors_encoder() {
        let device = Default::default();
        let cfg    = AutoEncoderConfig::new(12, vec![10, 6, 3], 0.1);
        let model  = cfg.init::<B, _>(&mut StdRng::seed_from_u64(1), &device).unwrap();
        assert_eq!(model.encoder().widths(), vec![10, 6, 3]);
        assert_eq!(model.decoder.widths(), vec![3, 6, 10]);
        assert_eq!(model.decoder.output_width(), 12);
        assert_eq!(model.encoder().input_width(), 12);
    }

    #[test]
    fn test_reversed_schedules_give_same_topology_independent_params() {
        // A decoder built from an [a, b, c] encoder has the stack topology of
        // an encoder built from [c, b, a], but its own parameters.
        let device  = Default::default();
        let mut rng = StdRng::seed_from_u64(2);
        let forward = WidthSchedule::new(vec![9, 5, 2]).unwrap();
        let mirror  = forward.reversed();

        let enc_fwd = Encoder::<B>::new(7, &forward, 0.0, &mut rng, &device).unwrap();
        let enc_rev = Encoder::<B>::new(7, &mirror, 0.0, &mut rng, &device).unwrap();
        let dec     = Decoder::from_encoder(&enc_fwd, &mut rng, &device).unwrap();

        assert_eq!(dec.widths(), enc_rev.widths());
        let a = values(dec.stack.layers()[0].weight.val());
        let b = values(enc_rev.stack.layers()[0].weight.val());
        assert_ne!(a, b);

        let dec2 = Decoder::from_encoder(&enc_fwd, &mut rng, &device).unwrap();
        assert_eq!(dec2.widths(), dec.widths());
        assert_ne!(values(dec2.output_projection.weight.val()), values(dec.output_projection.weight.val()));
    }

    #[test]
    fn test_eval_mode_is_deterministic() {
        let device = Default::default();
        let cfg    = AutoEncoderConfig::new(10, vec![16, 16, 4], 0.5);
        let model  = cfg.init::<AD, _>(&mut StdRng::seed_from_u64(3), &device).unwrap();
        let eval   = model.valid();
        let x      = input::<B>(4, 10, &device);
        let a = eval.forward(x.clone());
        let b = eval.forward(x);
        assert_eq!(values(a.reconstruction), values(b.reconstruction));
        assert_eq!(values(a.embedding), values(b.embedding));
    }

    #[test]
    fn test_training_mode_dropout_is_stochastic() {
        let device = Default::default();
        let cfg    = AutoEncoderConfig::new(10, vec![64, 64, 64, 4], 0.5);
        let model  = cfg.init::<AD, _>(&mut StdRng::seed_from_u64(4), &device).unwrap();
        let x      = Tensor::<AD, 2>::random([8, 10], Distribution::Normal(0.0, 1.0), &device);
        let a = values(model.forward(x.clone()).reconstruction);
        let b = values(model.forward(x).reconstruction);
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_dropout_is_deterministic_in_training_mode() {
        let device = Default::default();
        let cfg    = AutoEncoderConfig::new(10, vec![32, 32, 4], 0.0);
        let model  = cfg.init::<AD, _>(&mut StdRng::seed_from_u64(5), &device).unwrap();
        let x      = input::<AD>(5, 10, &device);
        let a = values(model.forward(x.clone()).reconstruction);
        let b = values(model.forward(x).reconstruction);
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_seed_same_parameters() {
        let device = Default::default();
        let cfg    = AutoEncoderConfig::new(6, vec![5, 2], 0.0);
        let m1 = cfg.init::<B, _>(&mut StdRng::seed_from_u64(9), &device).unwrap();
        let m2 = cfg.init::<B, _>(&mut StdRng::seed_from_u64(9), &device).unwrap();
        let x  = input::<B>(3, 6, &device);
        assert_eq!(values(m1.forward(x.clone()).reconstruction), values(m2.forward(x).reconstruction));
    }

    #[test]
    fn test_configuration_rejected() {
        let device  = Default::default();
        let mut rng = StdRng::seed_from_u64(0);
        let bad = [
            AutoEncoderConfig::new(784, vec![10], 0.2),
            AutoEncoderConfig::new(784, vec![500, 0, 10], 0.2),
            AutoEncoderConfig::new(0, vec![500, 10], 0.2),
            AutoEncoderConfig::new(784, vec![500, 10], 1.0),
            AutoEncoderConfig::new(784, vec![500, 10], -0.1),
        ];
        for cfg in bad {
            let err = cfg.init::<B, _>(&mut rng, &device).unwrap_err();
            assert!(err.is_configuration(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_config_read_back_and_mismatch() {
        let device = Default::default();
        let cfg    = AutoEncoderConfig::new(30, vec![20, 8], 0.25);
        let model  = cfg.init::<B, _>(&mut StdRng::seed_from_u64(0), &device).unwrap();
        let back   = model.config();
        assert_eq!(back.input_width, 30);
        assert_eq!(back.widths, vec![20, 8]);
        assert_eq!(back.dropout, 0.25);
        assert!(cfg.topology_mismatch(&back).is_none());
        assert!(cfg.topology_mismatch(&AutoEncoderConfig::new(31, vec![20, 8], 0.25)).is_some());
        assert!(cfg.topology_mismatch(&AutoEncoderConfig::new(30, vec![20, 9], 0.25)).is_some());
        assert!(cfg.topology_mismatch(&AutoEncoderConfig::new(30, vec![20, 8], 0.0)).is_none());
    }

    #[test]
    fn test_shape_mismatch_covers_loaded_records() {
        let device = Default::default();
        let four   = AutoEncoderConfig::new(12, vec![8, 4], 0.1);
        let a = four.init::<B, _>(&mut StdRng::seed_from_u64(0), &device).unwrap();
        let b = four.init::<B, _>(&mut StdRng::seed_from_u64(1), &device).unwrap();
        assert!(a.shape_mismatch(&b).is_none());

        // load_record takes whatever shapes the record carries
        let three  = AutoEncoderConfig::new(12, vec![8, 3], 0.1)
            .init::<B, _>(&mut StdRng::seed_from_u64(2), &device)
            .unwrap();
        let loaded = a.clone().load_record(three.into_record());
        let reason = a.shape_mismatch(&loaded).unwrap();
        assert!(reason.contains("widths"), "{reason}");
    }

    #[test]
    fn test_loss_is_finite_and_non_negative() {
        let device = Default::default();
        let cfg    = AutoEncoderConfig::new(10, vec![8, 3], 0.0);
        let model  = cfg.init::<B, _>(&mut StdRng::seed_from_u64(0), &device).unwrap();
        let (loss, _) = model.forward_loss(input::<B>(4, 10, &device));
        let loss: f64 = loss.into_scalar().elem();
        assert!(loss.is_finite() && loss >= 0.0);
    }
}
