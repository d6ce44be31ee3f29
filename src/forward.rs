/* ------------------------------------------------------------------ */
/* Forward passes: RNN step/fold and LSTM sequence                    */
/* ------------------------------------------------------------------ */
//
// Traced variants additionally record the activations the backward
// pass needs; the plain variants are what evaluation uses.

use crate::model::{LstmClassifier, RnnClassifier};
use crate::ops::{linear_fwd, log_softmax, sigmoid};

/* ------------------------------------------------------------------ */
/* RNN                                                                */
/* ------------------------------------------------------------------ */

/// One recurrent step: (log-probabilities, next hidden state).
pub fn rnn_step(model: &RnnClassifier, x: &[f32], hidden: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let n_combined = model.n_inputs + model.n_hidden;
    let mut combined = Vec::with_capacity(n_combined);
    combined.extend_from_slice(x);
    combined.extend_from_slice(hidden);

    let mut next_hidden = vec![0.0; model.n_hidden];
    linear_fwd(&combined, &model.w_i2h, &model.b_i2h, model.n_hidden, n_combined, &mut next_hidden);

    let mut logits = vec![0.0; model.n_categories];
    linear_fwd(&combined, &model.w_i2o, &model.b_i2o, model.n_categories, n_combined, &mut logits);
    let mut logp = vec![0.0; model.n_categories];
    log_softmax(&logits, &mut logp);

    (logp, next_hidden)
}

/// Fold rnn_step over the sequence from a zero hidden state and return
/// the final step's log-probabilities. Intermediate step outputs are
/// discarded; only the last one classifies the name. `seq` must be
/// non-empty.
pub fn rnn_forward(model: &RnnClassifier, seq: &[Vec<f32>]) -> Vec<f32> {
    debug_assert!(!seq.is_empty(), "cannot classify an empty sequence");
    let init = (vec![0.0; model.n_categories], model.init_hidden());
    let (logp, _hidden) = seq
        .iter()
        .fold(init, |(_, hidden), x| rnn_step(model, x, &hidden));
    logp
}

/// Everything rnn_backward needs: the concatenated [x_t, h_{t-1}]
/// input of every step, and the final log-probabilities.
pub struct RnnTrace {
    pub combined: Vec<Vec<f32>>,
    pub logp: Vec<f32>,
}

pub fn rnn_forward_traced(model: &RnnClassifier, seq: &[Vec<f32>]) -> RnnTrace {
    debug_assert!(!seq.is_empty(), "cannot classify an empty sequence");
    let n_combined = model.n_inputs + model.n_hidden;
    let mut combined = Vec::with_capacity(seq.len());
    let mut hidden = model.init_hidden();
    let mut logp = vec![0.0; model.n_categories];

    for x in seq {
        let mut cat = Vec::with_capacity(n_combined);
        cat.extend_from_slice(x);
        cat.extend_from_slice(&hidden);

        let mut next_hidden = vec![0.0; model.n_hidden];
        linear_fwd(&cat, &model.w_i2h, &model.b_i2h, model.n_hidden, n_combined, &mut next_hidden);

        let mut logits = vec![0.0; model.n_categories];
        linear_fwd(&cat, &model.w_i2o, &model.b_i2o, model.n_categories, n_combined, &mut logits);
        log_softmax(&logits, &mut logp);

        combined.push(cat);
        hidden = next_hidden;
    }

    RnnTrace { combined, logp }
}

/* ------------------------------------------------------------------ */
/* LSTM                                                               */
/* ------------------------------------------------------------------ */

/// Per-step activations recorded for backpropagation through time.
/// `gates` holds the post-activation i, f, g, o values fused as [4H].
pub struct LstmTrace {
    pub gates: Vec<Vec<f32>>,
    pub cells: Vec<Vec<f32>>,
    pub tanh_c: Vec<Vec<f32>>,
    pub hiddens: Vec<Vec<f32>>,
    pub logits: Vec<f32>,
}

pub fn lstm_forward_traced(model: &LstmClassifier, seq: &[Vec<f32>]) -> LstmTrace {
    debug_assert!(!seq.is_empty(), "cannot classify an empty sequence");
    let h = model.n_hidden;
    let h4 = 4 * h;

    let mut trace = LstmTrace {
        gates: Vec::with_capacity(seq.len()),
        cells: Vec::with_capacity(seq.len()),
        tanh_c: Vec::with_capacity(seq.len()),
        hiddens: Vec::with_capacity(seq.len()),
        logits: vec![0.0; model.n_categories],
    };

    let mut hidden = vec![0.0; h];
    let mut cell = vec![0.0; h];
    let mut pre = vec![0.0; h4];
    let mut pre_h = vec![0.0; h4];

    for x in seq {
        linear_fwd(x, &model.w_ih, &model.b_ih, h4, model.n_inputs, &mut pre);
        linear_fwd(&hidden, &model.w_hh, &model.b_hh, h4, h, &mut pre_h);
        for k in 0..h4 {
            pre[k] += pre_h[k];
        }

        let mut gates = vec![0.0; h4];
        for j in 0..h {
            gates[j] = sigmoid(pre[j]); //            input gate
            gates[h + j] = sigmoid(pre[h + j]); //    forget gate
            gates[2 * h + j] = pre[2 * h + j].tanh(); // candidate
            gates[3 * h + j] = sigmoid(pre[3 * h + j]); // output gate
        }

        let mut next_cell = vec![0.0; h];
        let mut tanh_c = vec![0.0; h];
        let mut next_hidden = vec![0.0; h];
        for j in 0..h {
            next_cell[j] = gates[h + j] * cell[j] + gates[j] * gates[2 * h + j];
            tanh_c[j] = next_cell[j].tanh();
            next_hidden[j] = gates[3 * h + j] * tanh_c[j];
        }

        trace.gates.push(gates);
        trace.cells.push(next_cell.clone());
        trace.tanh_c.push(tanh_c);
        trace.hiddens.push(next_hidden.clone());
        cell = next_cell;
        hidden = next_hidden;
    }

    linear_fwd(&hidden, &model.w_ho, &model.b_ho, model.n_categories, h, &mut trace.logits);
    trace
}

/// Raw category logits from the whole-sequence pass.
pub fn lstm_forward(model: &LstmClassifier, seq: &[Vec<f32>]) -> Vec<f32> {
    lstm_forward_traced(model, seq).logits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{encode_name, N_LETTERS};
    use crate::rng::Rng;

    #[test]
    fn rnn_outputs_log_probabilities() {
        let mut rng = Rng::new(5);
        let model = RnnClassifier::new(N_LETTERS, 16, 3, &mut rng);
        let logp = rnn_forward(&model, &encode_name("Albert"));
        assert_eq!(logp.len(), 3);
        let total: f32 = logp.iter().map(|l| l.exp()).sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn rnn_fold_matches_manual_threading() {
        let mut rng = Rng::new(5);
        let model = RnnClassifier::new(N_LETTERS, 8, 2, &mut rng);
        let seq = encode_name("Jones");

        let mut hidden = model.init_hidden();
        let mut logp = Vec::new();
        for x in &seq {
            let (out, next) = rnn_step(&model, x, &hidden);
            logp = out;
            hidden = next;
        }
        assert_eq!(rnn_forward(&model, &seq), logp);
    }

    #[test]
    fn traced_rnn_agrees_with_plain_forward() {
        let mut rng = Rng::new(11);
        let model = RnnClassifier::new(N_LETTERS, 12, 4, &mut rng);
        let seq = encode_name("Garcia");
        let trace = rnn_forward_traced(&model, &seq);
        assert_eq!(trace.combined.len(), seq.len());
        assert_eq!(trace.logp, rnn_forward(&model, &seq));
    }

    #[test]
    fn lstm_logit_width_is_category_count() {
        let mut rng = Rng::new(6);
        let model = LstmClassifier::new(N_LETTERS, 16, 5, &mut rng);
        let logits = lstm_forward(&model, &encode_name("Satoshi"));
        assert_eq!(logits.len(), 5);
        assert!(logits.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn lstm_trace_has_one_entry_per_step() {
        let mut rng = Rng::new(6);
        let model = LstmClassifier::new(N_LETTERS, 8, 2, &mut rng);
        let seq = encode_name("Smith");
        let trace = lstm_forward_traced(&model, &seq);
        assert_eq!(trace.gates.len(), seq.len());
        assert_eq!(trace.cells.len(), seq.len());
        assert_eq!(trace.hiddens.len(), seq.len());
        // Gate activations are bounded: sigmoids in (0,1), tanh in (-1,1).
        for g in &trace.gates {
            assert!(g.iter().all(|&v| (-1.0..=1.0).contains(&v)));
        }
    }
}
