/* ------------------------------------------------------------------ */
/* Training loops: sample → encode → forward → backward → SGD         */
/* ------------------------------------------------------------------ */
//
// One example per step. Every PRINT_EVERY iterations a progress line
// reports the current loss, the sampled name, the model's guess and
// whether it was right; every PLOT_EVERY iterations the running
// average lands in the loss history.

use std::time::Instant;

use crate::alphabet::encode_name;
use crate::backward::{lstm_backward, rnn_backward};
use crate::config::{PLOT_EVERY, PRINT_EVERY};
use crate::corpus::Corpus;
use crate::forward::{lstm_forward_traced, rnn_forward_traced};
use crate::model::{LstmClassifier, RnnClassifier};
use crate::ops::argmax;
use crate::optimizer::{update_lstm, update_rnn};
use crate::report::format_elapsed;
use crate::rng::Rng;

/// Loss bookkeeping for one training run. Explicit state handed back
/// to the caller; nothing global.
pub struct TrainStats {
    /// Average loss per PLOT_EVERY window, in order.
    pub history: Vec<f32>,
    current_sum: f32,
}

impl TrainStats {
    fn new() -> Self {
        Self { history: Vec::new(), current_sum: 0.0 }
    }

    fn record(&mut self, iter: usize, loss: f32) {
        self.current_sum += loss;
        if iter % PLOT_EVERY == 0 {
            self.history.push(self.current_sum / PLOT_EVERY as f32);
            self.current_sum = 0.0;
        }
    }
}

/// One RNN training step on an already-encoded example.
/// Returns (loss, guessed category).
pub fn rnn_train_step(
    model: &mut RnnClassifier,
    seq: &[Vec<f32>],
    target: usize,
    lr: f32,
) -> (f32, usize) {
    let trace = rnn_forward_traced(model, seq);
    let guess = argmax(&trace.logp);
    model.zero_grads();
    let loss = rnn_backward(model, &trace, target);
    update_rnn(model, lr);
    (loss, guess)
}

/// One LSTM training step on an already-encoded example.
pub fn lstm_train_step(
    model: &mut LstmClassifier,
    seq: &[Vec<f32>],
    target: usize,
    lr: f32,
) -> (f32, usize) {
    let trace = lstm_forward_traced(model, seq);
    let guess = argmax(&trace.logits);
    model.zero_grads();
    let loss = lstm_backward(model, seq, &trace, target);
    update_lstm(model, lr);
    (loss, guess)
}

pub fn train_rnn(
    model: &mut RnnClassifier,
    corpus: &Corpus,
    n_iters: usize,
    lr: f32,
    rng: &mut Rng,
) -> TrainStats {
    let start = Instant::now();
    let mut stats = TrainStats::new();

    for iter in 1..=n_iters {
        let (target, name) = corpus.sample(rng);
        let seq = encode_name(name);
        let (loss, guess) = rnn_train_step(model, &seq, target, lr);
        stats.record(iter, loss);
        if iter % PRINT_EVERY == 0 {
            print_progress(iter, n_iters, &start, loss, name, guess, target, corpus);
        }
    }
    stats
}

pub fn train_lstm(
    model: &mut LstmClassifier,
    corpus: &Corpus,
    n_iters: usize,
    lr: f32,
    rng: &mut Rng,
) -> TrainStats {
    let start = Instant::now();
    let mut stats = TrainStats::new();

    for iter in 1..=n_iters {
        let (target, name) = corpus.sample(rng);
        let seq = encode_name(name);
        let (loss, guess) = lstm_train_step(model, &seq, target, lr);
        stats.record(iter, loss);
        if iter % PRINT_EVERY == 0 {
            print_progress(iter, n_iters, &start, loss, name, guess, target, corpus);
        }
    }
    stats
}

#[allow(clippy::too_many_arguments)]
fn print_progress(
    iter: usize,
    n_iters: usize,
    start: &Instant,
    loss: f32,
    name: &str,
    guess: usize,
    target: usize,
    corpus: &Corpus,
) {
    let categories = corpus.categories();
    let verdict = if guess == target {
        "✓".to_string()
    } else {
        format!("✗ ({})", categories[target])
    };
    println!(
        "{} {}% ({}) {:.4} {} / {} {}",
        iter,
        iter * 100 / n_iters,
        format_elapsed(start.elapsed()),
        loss,
        name,
        categories[guess],
        verdict
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_corpus() -> Corpus {
        Corpus::from_parts(vec![
            ("alpha".into(), vec!["aaaaaa".into(), "aabaaa".into()]),
            ("zeta".into(), vec!["zzzzzz".into(), "zzyzzz".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn fixed_seed_training_is_deterministic() {
        let corpus = toy_corpus();
        let mut losses = Vec::new();
        for _ in 0..2 {
            let mut init_rng = Rng::new(17);
            let mut model =
                RnnClassifier::new(crate::alphabet::N_LETTERS, 8, 2, &mut init_rng);
            let mut sample_rng = Rng::new(99);
            let mut run = Vec::new();
            for _ in 0..50 {
                let (target, name) = corpus.sample(&mut sample_rng);
                let seq = encode_name(name);
                let (loss, _) = rnn_train_step(&mut model, &seq, target, 0.005);
                run.push(loss);
            }
            losses.push(run);
        }
        assert_eq!(losses[0], losses[1]);
    }

    #[test]
    fn rnn_learns_a_separable_toy_corpus() {
        let corpus = toy_corpus();
        let mut rng = Rng::new(4);
        let mut model = RnnClassifier::new(crate::alphabet::N_LETTERS, 12, 2, &mut rng);

        let mut first = 0.0;
        let mut last = 0.0;
        for iter in 0..800 {
            let (target, name) = corpus.sample(&mut rng);
            let seq = encode_name(name);
            let (loss, _) = rnn_train_step(&mut model, &seq, target, 0.02);
            if iter < 100 {
                first += loss;
            }
            if iter >= 700 {
                last += loss;
            }
        }
        assert!(last < first, "loss did not decrease: first={} last={}", first, last);
    }

    #[test]
    fn lstm_learns_a_separable_toy_corpus() {
        let corpus = toy_corpus();
        let mut rng = Rng::new(4);
        let mut model = LstmClassifier::new(crate::alphabet::N_LETTERS, 12, 2, &mut rng);

        let mut first = 0.0;
        let mut last = 0.0;
        for iter in 0..800 {
            let (target, name) = corpus.sample(&mut rng);
            let seq = encode_name(name);
            let (loss, _) = lstm_train_step(&mut model, &seq, target, 0.02);
            if iter < 100 {
                first += loss;
            }
            if iter >= 700 {
                last += loss;
            }
        }
        assert!(last < first, "loss did not decrease: first={} last={}", first, last);
    }

    #[test]
    fn history_buckets_running_average() {
        let mut stats = TrainStats::new();
        // PLOT_EVERY is 1000; feed exactly two windows of constant loss.
        for iter in 1..=(2 * PLOT_EVERY) {
            let loss = if iter <= PLOT_EVERY { 2.0 } else { 4.0 };
            stats.record(iter, loss);
        }
        assert_eq!(stats.history, vec![2.0, 4.0]);
    }
}
