/* ------------------------------------------------------------------ */
/* Hyperparameters and loop intervals                                 */
/* ------------------------------------------------------------------ */

// ── Architecture ──────────────────────────────────────────────────────────

pub const N_HIDDEN: usize = 128;

// ── Training ──────────────────────────────────────────────────────────────

// Too high and the loss explodes; too low and nothing is learned.
// Plain SGD, one example per step. No momentum, no batching.
pub const LEARNING_RATE: f32 = 0.005;
pub const N_ITERS: usize = 100_000;
pub const PRINT_EVERY: usize = 5_000;
pub const PLOT_EVERY: usize = 1_000;

// ── Evaluation ────────────────────────────────────────────────────────────

pub const N_CONFUSION: usize = 10_000;
pub const TOP_K: usize = 3;

// ── Defaults overridable from the command line ────────────────────────────

pub const DEFAULT_SEED: u64 = 1337;
pub const DEFAULT_DATA_DIR: &str = "data/names";
