/* ------------------------------------------------------------------ */
/* Backpropagation through time for both recurrent cells              */
/* ------------------------------------------------------------------ */
//
// Gradients accumulate into the model's d_* buffers; callers zero them
// before each example. Both functions return the example's loss.
//
// The loss is taken from the final step only. For the RNN that means
// the output head receives gradient at the last step alone, while the
// recurrence gradient d_hidden is threaded back through every step.

use crate::forward::{LstmTrace, RnnTrace};
use crate::model::{LstmClassifier, RnnClassifier};
use crate::ops::{linear_bwd, log_softmax, nll_loss};

/// NLL loss + backward for one example through the Elman RNN.
pub fn rnn_backward(model: &mut RnnClassifier, trace: &RnnTrace, target: usize) -> f32 {
    let n_combined = model.n_inputs + model.n_hidden;
    let last = trace.combined.len() - 1;

    // d(loss)/d(logits) after log-softmax + NLL: softmax - onehot
    let mut d_logits: Vec<f32> = trace.logp.iter().map(|l| l.exp()).collect();
    d_logits[target] -= 1.0;

    // Output head: final step only.
    let mut d_combined = vec![0.0; n_combined];
    linear_bwd(
        &d_logits,
        &trace.combined[last],
        &model.w_i2o,
        model.n_categories,
        n_combined,
        &mut d_combined,
        &mut model.d_w_i2o,
        &mut model.d_b_i2o,
    );

    // The hidden slot of combined[last] is h_{last-1}; walk the
    // recurrence backwards from there. h_last itself feeds nothing.
    let mut d_hidden = d_combined[model.n_inputs..].to_vec();
    for t in (0..last).rev() {
        linear_bwd(
            &d_hidden,
            &trace.combined[t],
            &model.w_i2h,
            model.n_hidden,
            n_combined,
            &mut d_combined,
            &mut model.d_w_i2h,
            &mut model.d_b_i2h,
        );
        d_hidden.copy_from_slice(&d_combined[model.n_inputs..]);
    }

    nll_loss(&trace.logp, target)
}

/// Cross-entropy loss + backward for one example through the LSTM.
/// `seq` must be the same encoded sequence the trace was built from.
pub fn lstm_backward(
    model: &mut LstmClassifier,
    seq: &[Vec<f32>],
    trace: &LstmTrace,
    target: usize,
) -> f32 {
    let h = model.n_hidden;
    let h4 = 4 * h;
    let last = seq.len() - 1;

    let mut logp = vec![0.0; model.n_categories];
    log_softmax(&trace.logits, &mut logp);
    let mut d_logits: Vec<f32> = logp.iter().map(|l| l.exp()).collect();
    d_logits[target] -= 1.0;

    // Head projection off the last hidden state.
    let mut d_h = vec![0.0; h];
    linear_bwd(
        &d_logits,
        &trace.hiddens[last],
        &model.w_ho,
        model.n_categories,
        h,
        &mut d_h,
        &mut model.d_w_ho,
        &mut model.d_b_ho,
    );

    let zeros = vec![0.0; h];
    let mut d_c = vec![0.0; h];
    let mut d_pre = vec![0.0; h4];
    let mut d_x = vec![0.0; model.n_inputs]; // input gradient, discarded
    let mut d_h_prev = vec![0.0; h];

    for t in (0..seq.len()).rev() {
        let gates = &trace.gates[t];
        let tanh_c = &trace.tanh_c[t];
        let (h_prev, c_prev): (&[f32], &[f32]) = if t == 0 {
            (&zeros, &zeros)
        } else {
            (&trace.hiddens[t - 1], &trace.cells[t - 1])
        };

        for j in 0..h {
            let i_g = gates[j];
            let f_g = gates[h + j];
            let g_g = gates[2 * h + j];
            let o_g = gates[3 * h + j];

            let d_o = d_h[j] * tanh_c[j];
            let d_cell = d_c[j] + d_h[j] * o_g * (1.0 - tanh_c[j] * tanh_c[j]);
            let d_i = d_cell * g_g;
            let d_f = d_cell * c_prev[j];
            let d_g = d_cell * i_g;
            d_c[j] = d_cell * f_g; // carries to step t-1

            // Through the gate nonlinearities to the pre-activations.
            d_pre[j] = d_i * i_g * (1.0 - i_g);
            d_pre[h + j] = d_f * f_g * (1.0 - f_g);
            d_pre[2 * h + j] = d_g * (1.0 - g_g * g_g);
            d_pre[3 * h + j] = d_o * o_g * (1.0 - o_g);
        }

        // pre = w_ih·x + b_ih + w_hh·h_prev + b_hh, so d_pre feeds both
        // weight matrices and both bias vectors.
        linear_bwd(&d_pre, &seq[t], &model.w_ih, h4, model.n_inputs, &mut d_x, &mut model.d_w_ih, &mut model.d_b_ih);
        linear_bwd(&d_pre, h_prev, &model.w_hh, h4, h, &mut d_h_prev, &mut model.d_w_hh, &mut model.d_b_hh);
        d_h.copy_from_slice(&d_h_prev);
    }

    nll_loss(&logp, target)
}
