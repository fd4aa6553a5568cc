// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what the data IS:
// which subjects and splits exist, how big their volumes are,
// and how a volume pair is laid out in memory.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums, traits and their invariants

/// Subject / split lookup table and dataset-name parsing
pub mod subject;

/// Volume and VolumePair buffers
pub mod volume;

/// Core abstractions (traits) that other layers implement
pub mod traits;
