/* ------------------------------------------------------------------ */
/* Inference: top-k prediction and confusion matrix                   */
/* ------------------------------------------------------------------ */
//
// Same forward pass as training minus the backward and the update.
// Nothing here touches gradient buffers.

use std::io;

use rayon::prelude::*;

use crate::alphabet::{encode_name, normalize};
use crate::corpus::Corpus;
use crate::forward::{lstm_forward, rnn_forward};
use crate::model::{LstmClassifier, RnnClassifier};
use crate::ops::{argmax, log_softmax};
use crate::rng::Rng;

/// Category log-probabilities for an encoded name. Both classifiers
/// report on the same scale so their predictions are comparable.
pub trait Scorer {
    fn n_categories(&self) -> usize;
    fn scores(&self, seq: &[Vec<f32>]) -> Vec<f32>;
}

impl Scorer for RnnClassifier {
    fn n_categories(&self) -> usize {
        self.n_categories
    }

    // Already log-probabilities (log-softmax output head).
    fn scores(&self, seq: &[Vec<f32>]) -> Vec<f32> {
        rnn_forward(self, seq)
    }
}

impl Scorer for LstmClassifier {
    fn n_categories(&self) -> usize {
        self.n_categories
    }

    // Raw logits through log-softmax.
    fn scores(&self, seq: &[Vec<f32>]) -> Vec<f32> {
        let logits = lstm_forward(self, seq);
        let mut logp = vec![0.0; logits.len()];
        log_softmax(&logits, &mut logp);
        logp
    }
}

/// Top `min(k, n_categories)` (score, category) pairs for a free-form
/// input string, scores descending.
pub fn predict_topk<S: Scorer>(
    model: &S,
    corpus: &Corpus,
    input: &str,
    k: usize,
) -> io::Result<Vec<(f32, String)>> {
    let cleaned = normalize(input);
    if cleaned.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{:?} contains no alphabet characters", input),
        ));
    }
    let scores = model.scores(&encode_name(&cleaned));

    // total_cmp keeps the sort panic-free even if divergent training
    // drove the scores to NaN.
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.truncate(k.min(scores.len()));

    Ok(order
        .into_iter()
        .map(|i| (scores[i], corpus.categories()[i].clone()))
        .collect())
}

// Trials are spread over a fixed chunk grid with per-chunk RNGs
// derived from the seed, and the integer count matrices are merged by
// summation, so the result is deterministic for a given seed no matter
// how rayon schedules the chunks.
const CONFUSION_CHUNKS: usize = 64;

/// Row-normalized confusion matrix: rows are true categories, columns
/// the predicted ones; each sampled row sums to 1. A row stays
/// all-zero only if its category was never sampled, which `trials`
/// should be large enough to avoid.
pub fn confusion_matrix<S: Scorer + Sync>(
    model: &S,
    corpus: &Corpus,
    trials: usize,
    seed: u64,
) -> Vec<Vec<f32>> {
    let n = corpus.n_categories();
    let per_chunk = trials / CONFUSION_CHUNKS;
    let remainder = trials % CONFUSION_CHUNKS;

    let counts: Vec<Vec<u32>> = (0..CONFUSION_CHUNKS)
        .into_par_iter()
        .map(|chunk| {
            let mut rng =
                Rng::new(seed ^ (chunk as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            let mut local = vec![vec![0u32; n]; n];
            let chunk_trials = per_chunk + usize::from(chunk < remainder);
            for _ in 0..chunk_trials {
                let (target, name) = corpus.sample(&mut rng);
                let scores = model.scores(&encode_name(name));
                local[target][argmax(&scores)] += 1;
            }
            local
        })
        .reduce(
            || vec![vec![0u32; n]; n],
            |mut acc, local| {
                for (row, local_row) in acc.iter_mut().zip(local) {
                    for (cell, v) in row.iter_mut().zip(local_row) {
                        *cell += v;
                    }
                }
                acc
            },
        );

    counts
        .into_iter()
        .map(|row| {
            let total: u32 = row.iter().sum();
            if total == 0 {
                vec![0.0; n]
            } else {
                row.into_iter().map(|c| c as f32 / total as f32).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::N_LETTERS;
    use crate::config::N_HIDDEN;

    fn western_corpus() -> Corpus {
        Corpus::from_parts(vec![
            ("English".into(), vec!["Smith".into(), "Jones".into()]),
            ("French".into(), vec!["Dubois".into(), "Moreau".into()]),
            ("Spanish".into(), vec!["García".into(), "Lopez".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn scores_have_category_width_for_untrained_models() {
        let corpus = western_corpus();
        let mut rng = Rng::new(1);
        let rnn = RnnClassifier::new(N_LETTERS, N_HIDDEN, corpus.n_categories(), &mut rng);
        let lstm = LstmClassifier::new(N_LETTERS, N_HIDDEN, corpus.n_categories(), &mut rng);
        let seq = encode_name("Smith");
        assert_eq!(rnn.scores(&seq).len(), 3);
        assert_eq!(lstm.scores(&seq).len(), 3);
    }

    #[test]
    fn topk_is_sorted_and_capped() {
        let corpus = western_corpus();
        let mut rng = Rng::new(2);
        let model = RnnClassifier::new(N_LETTERS, 16, corpus.n_categories(), &mut rng);

        let preds = predict_topk(&model, &corpus, "Satoshi", 3).unwrap();
        assert_eq!(preds.len(), 3);
        for pair in preds.windows(2) {
            assert!(pair[0].0 >= pair[1].0);
        }

        // k beyond the category count is clamped.
        let preds = predict_topk(&model, &corpus, "Satoshi", 10).unwrap();
        assert_eq!(preds.len(), corpus.n_categories());
    }

    #[test]
    fn topk_folds_its_input_first() {
        let corpus = western_corpus();
        let mut rng = Rng::new(2);
        let model = LstmClassifier::new(N_LETTERS, 16, corpus.n_categories(), &mut rng);
        let accented = predict_topk(&model, &corpus, "García", 2).unwrap();
        let folded = predict_topk(&model, &corpus, "Garcia", 2).unwrap();
        assert_eq!(accented, folded);
    }

    #[test]
    fn topk_survives_divergent_scores() {
        // A blown-up learning rate can leave the weights NaN; prediction
        // should still return ranked entries rather than panic.
        let corpus = western_corpus();
        let mut rng = Rng::new(2);
        let mut model = RnnClassifier::new(N_LETTERS, 8, corpus.n_categories(), &mut rng);
        for w in model.w_i2o.iter_mut() {
            *w = f32::NAN;
        }
        let preds = predict_topk(&model, &corpus, "Smith", 3).unwrap();
        assert_eq!(preds.len(), 3);
    }

    #[test]
    fn topk_rejects_unencodable_input() {
        let corpus = western_corpus();
        let mut rng = Rng::new(2);
        let model = RnnClassifier::new(N_LETTERS, 16, corpus.n_categories(), &mut rng);
        assert!(predict_topk(&model, &corpus, "北京", 3).is_err());
    }

    #[test]
    fn confusion_rows_sum_to_one() {
        let corpus = western_corpus();
        let mut rng = Rng::new(3);
        let model = RnnClassifier::new(N_LETTERS, 16, corpus.n_categories(), &mut rng);

        let matrix = confusion_matrix(&model, &corpus, 3_000, 7);
        assert_eq!(matrix.len(), 3);
        for row in &matrix {
            assert_eq!(row.len(), 3);
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "row sums to {}", sum);
        }
    }

    #[test]
    fn confusion_is_deterministic_per_seed() {
        let corpus = western_corpus();
        let mut rng = Rng::new(3);
        let model = LstmClassifier::new(N_LETTERS, 16, corpus.n_categories(), &mut rng);
        let a = confusion_matrix(&model, &corpus, 500, 42);
        let b = confusion_matrix(&model, &corpus, 500, 42);
        assert_eq!(a, b);
    }
}
