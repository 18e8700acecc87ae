// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal at a time (a training phase, or the evaluation table).
//
// Rules for this layer:
//   - No tensor math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Pre-training and fine-tuning workflows, plus TrainConfig
pub mod train_use_case;

// Raw vs pre-trained vs fine-tuned clustering comparison
pub mod evaluate_use_case;
