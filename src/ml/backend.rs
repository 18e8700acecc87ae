// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Training needs gradients, so it runs on Autodiff<InnerBackend>.
// Evaluation runs on InnerBackend itself (reached through
// AutodiffModule::valid()), where dropout is a no-op.
//
// InnerBackend is NdArray, or Wgpu with the `wgpu` feature.

use burn::prelude::Backend;

#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;

pub fn default_device() -> <InnerBackend as Backend>::Device {
    Default::default()
}
