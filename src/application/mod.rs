// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal
// (inspecting the training pipeline, scoring a baseline).
//
// Rules for this layer:
//   - No tensor math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - No direct file access (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Volumes arrive through the VolumeSource trait, so every use
// case can run on in-memory data in tests.

/// Run configuration shared by all use cases
pub mod config;

/// Dry run of the training data loader
pub mod inspect_use_case;

/// Nearest-neighbour baseline evaluation
pub mod baseline_use_case;
