/* ------------------------------------------------------------------ */
/* Math primitives: linear layers with bias, log-softmax, NLL        */
/* ------------------------------------------------------------------ */

// Linear forward: out[nout] = W[nout×nin] · x[nin] + b[nout]
pub fn linear_fwd(x: &[f32], w: &[f32], b: &[f32], nout: usize, nin: usize, out: &mut [f32]) {
    for r in 0..nout {
        // zip-based dot product, auto-vectorizable
        let dot: f32 = w[r * nin..(r + 1) * nin]
            .iter()
            .zip(x.iter())
            .map(|(wi, xi)| wi * xi)
            .sum();
        out[r] = dot + b[r];
    }
}

// Linear backward:
//   d_w[r,c] += d_out[r] * x[c]
//   d_b[r]   += d_out[r]
//   d_x[c]    = Σ_r d_out[r] * w[r,c]   (overwritten)
pub fn linear_bwd(
    d_out: &[f32],
    x: &[f32],
    w: &[f32],
    nout: usize,
    nin: usize,
    d_x: &mut [f32],
    d_w: &mut [f32],
    d_b: &mut [f32],
) {
    d_x[..nin].fill(0.0);
    for r in 0..nout {
        d_b[r] += d_out[r];
        for c in 0..nin {
            d_w[r * nin + c] += d_out[r] * x[c];
            d_x[c] += d_out[r] * w[r * nin + c];
        }
    }
}

// Numerically stable log-softmax: out[i] = x[i] - max - ln Σ exp(x - max)
pub fn log_softmax(logits: &[f32], out: &mut [f32]) {
    let mx = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let sum: f32 = logits.iter().map(|&v| (v - mx).exp()).sum();
    let log_sum = sum.ln();
    for (o, &v) in out.iter_mut().zip(logits.iter()) {
        *o = v - mx - log_sum;
    }
}

// Negative log-likelihood against log-probabilities.
pub fn nll_loss(logp: &[f32], target: usize) -> f32 {
    -logp[target]
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// Index of the highest score. Ties resolve to the first maximum.
pub fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in scores.iter().enumerate() {
        if v > scores[best] {
            best = i;
        }
    }
    best
}
