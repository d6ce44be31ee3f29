/* ------------------------------------------------------------------ */
/* Model structs: weights and gradient buffers                        */
/* ------------------------------------------------------------------ */
//
// Flat row-major Vec<f32> weight buffers with matching d_* gradient
// twins, mutated in place by the SGD update after each training step.
// Weights init as gauss(0, 1/sqrt(fan_in)); biases start at zero.

use crate::rng::Rng;

fn gauss_params(rng: &mut Rng, n: usize, fan_in: usize) -> Vec<f32> {
    let std = 1.0 / (fan_in as f32).sqrt();
    (0..n).map(|_| rng.gauss(0.0, std)).collect()
}

/* ------------------------------------------------------------------ */
/* Elman RNN: two projections over [input, hidden]                    */
/* ------------------------------------------------------------------ */
//
// Per step: combined = [x_t, h_{t-1}]
//   h_t     = i2h(combined)                  (linear recurrence, no tanh;
//                                             a deliberate simplification)
//   out_t   = log_softmax(i2o(combined))
// Only the final step's out feeds the loss.

pub struct RnnClassifier {
    pub n_inputs: usize,
    pub n_hidden: usize,
    pub n_categories: usize,

    pub w_i2h: Vec<f32>, // [H × (I+H)]
    pub b_i2h: Vec<f32>, // [H]
    pub w_i2o: Vec<f32>, // [C × (I+H)]
    pub b_i2o: Vec<f32>, // [C]

    pub d_w_i2h: Vec<f32>,
    pub d_b_i2h: Vec<f32>,
    pub d_w_i2o: Vec<f32>,
    pub d_b_i2o: Vec<f32>,
}

impl RnnClassifier {
    pub fn new(n_inputs: usize, n_hidden: usize, n_categories: usize, rng: &mut Rng) -> Self {
        let combined = n_inputs + n_hidden;
        Self {
            n_inputs,
            n_hidden,
            n_categories,
            w_i2h: gauss_params(rng, n_hidden * combined, combined),
            b_i2h: vec![0.0; n_hidden],
            w_i2o: gauss_params(rng, n_categories * combined, combined),
            b_i2o: vec![0.0; n_categories],
            d_w_i2h: vec![0.0; n_hidden * combined],
            d_b_i2h: vec![0.0; n_hidden],
            d_w_i2o: vec![0.0; n_categories * combined],
            d_b_i2o: vec![0.0; n_categories],
        }
    }

    pub fn init_hidden(&self) -> Vec<f32> {
        vec![0.0; self.n_hidden]
    }

    pub fn zero_grads(&mut self) {
        self.d_w_i2h.fill(0.0);
        self.d_b_i2h.fill(0.0);
        self.d_w_i2o.fill(0.0);
        self.d_b_i2o.fill(0.0);
    }

    pub fn n_params(&self) -> usize {
        self.w_i2h.len() + self.b_i2h.len() + self.w_i2o.len() + self.b_i2o.len()
    }
}

/* ------------------------------------------------------------------ */
/* Single-layer LSTM with a linear head on the last hidden state      */
/* ------------------------------------------------------------------ */
//
// Fused gate layout, rows ordered i, f, g, o:
//   pre  = w_ih·x_t + b_ih + w_hh·h_{t-1} + b_hh        [4H]
//   i,f,o = sigmoid(pre slices), g = tanh(pre slice)
//   c_t  = f ⊙ c_{t-1} + i ⊙ g
//   h_t  = o ⊙ tanh(c_t)
// logits = w_ho·h_last + b_ho (raw; loss applies log-softmax).

pub struct LstmClassifier {
    pub n_inputs: usize,
    pub n_hidden: usize,
    pub n_categories: usize,

    pub w_ih: Vec<f32>, // [4H × I]
    pub w_hh: Vec<f32>, // [4H × H]
    pub b_ih: Vec<f32>, // [4H]
    pub b_hh: Vec<f32>, // [4H]
    pub w_ho: Vec<f32>, // [C × H]
    pub b_ho: Vec<f32>, // [C]

    pub d_w_ih: Vec<f32>,
    pub d_w_hh: Vec<f32>,
    pub d_b_ih: Vec<f32>,
    pub d_b_hh: Vec<f32>,
    pub d_w_ho: Vec<f32>,
    pub d_b_ho: Vec<f32>,
}

impl LstmClassifier {
    pub fn new(n_inputs: usize, n_hidden: usize, n_categories: usize, rng: &mut Rng) -> Self {
        let h4 = 4 * n_hidden;
        Self {
            n_inputs,
            n_hidden,
            n_categories,
            w_ih: gauss_params(rng, h4 * n_inputs, n_inputs),
            w_hh: gauss_params(rng, h4 * n_hidden, n_hidden),
            b_ih: vec![0.0; h4],
            b_hh: vec![0.0; h4],
            w_ho: gauss_params(rng, n_categories * n_hidden, n_hidden),
            b_ho: vec![0.0; n_categories],
            d_w_ih: vec![0.0; h4 * n_inputs],
            d_w_hh: vec![0.0; h4 * n_hidden],
            d_b_ih: vec![0.0; h4],
            d_b_hh: vec![0.0; h4],
            d_w_ho: vec![0.0; n_categories * n_hidden],
            d_b_ho: vec![0.0; n_categories],
        }
    }

    pub fn zero_grads(&mut self) {
        self.d_w_ih.fill(0.0);
        self.d_w_hh.fill(0.0);
        self.d_b_ih.fill(0.0);
        self.d_b_hh.fill(0.0);
        self.d_w_ho.fill(0.0);
        self.d_b_ho.fill(0.0);
    }

    pub fn n_params(&self) -> usize {
        self.w_ih.len()
            + self.w_hh.len()
            + self.b_ih.len()
            + self.b_hh.len()
            + self.w_ho.len()
            + self.b_ho.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rnn_shapes() {
        let mut rng = Rng::new(1);
        let m = RnnClassifier::new(57, 16, 4, &mut rng);
        assert_eq!(m.w_i2h.len(), 16 * (57 + 16));
        assert_eq!(m.w_i2o.len(), 4 * (57 + 16));
        assert_eq!(m.init_hidden(), vec![0.0; 16]);
        assert_eq!(m.n_params(), m.w_i2h.len() + 16 + m.w_i2o.len() + 4);
    }

    #[test]
    fn lstm_shapes() {
        let mut rng = Rng::new(1);
        let m = LstmClassifier::new(57, 16, 4, &mut rng);
        assert_eq!(m.w_ih.len(), 64 * 57);
        assert_eq!(m.w_hh.len(), 64 * 16);
        assert_eq!(m.b_ih.len(), 64);
        assert_eq!(m.w_ho.len(), 4 * 16);
    }

    #[test]
    fn zero_grads_clears_everything() {
        let mut rng = Rng::new(2);
        let mut m = RnnClassifier::new(10, 4, 3, &mut rng);
        m.d_w_i2h[0] = 1.0;
        m.d_b_i2o[2] = -1.0;
        m.zero_grads();
        assert!(m.d_w_i2h.iter().all(|&g| g == 0.0));
        assert!(m.d_b_i2o.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn init_is_seed_deterministic() {
        let mut a = Rng::new(9);
        let mut b = Rng::new(9);
        let ma = RnnClassifier::new(8, 4, 2, &mut a);
        let mb = RnnClassifier::new(8, 4, 2, &mut b);
        assert_eq!(ma.w_i2h, mb.w_i2h);
        assert_eq!(ma.w_i2o, mb.w_i2o);
    }
}
