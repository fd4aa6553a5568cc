// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the application layer:
//
//   experiment.rs — Experiment directory
//                   config.json, log.txt, results-{dataset}/
//                   and raw SR volume output (.DAT).
//
//   metrics.rs    — PSNR metrics logging
//                   One CSV row per (dataset, scale) evaluation
//                   for later analysis and plotting.
//
//   timer.rs      — tic/toc wall-clock timer with an
//                   accumulator for split measurements.

/// Experiment directory, config persistence, SR volume output
pub mod experiment;

/// PSNR metrics CSV logger
pub mod metrics;

/// Wall-clock timer
pub mod timer;
