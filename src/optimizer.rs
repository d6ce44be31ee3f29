/* ------------------------------------------------------------------ */
/* Plain stochastic gradient descent                                  */
/* ------------------------------------------------------------------ */

use crate::model::{LstmClassifier, RnnClassifier};

// p -= lr * g. No momentum, no weight decay, no clipping.
pub fn sgd_step(params: &mut [f32], grads: &[f32], lr: f32) {
    for (p, g) in params.iter_mut().zip(grads.iter()) {
        *p -= lr * g;
    }
}

pub fn update_rnn(model: &mut RnnClassifier, lr: f32) {
    sgd_step(&mut model.w_i2h, &model.d_w_i2h, lr);
    sgd_step(&mut model.b_i2h, &model.d_b_i2h, lr);
    sgd_step(&mut model.w_i2o, &model.d_w_i2o, lr);
    sgd_step(&mut model.b_i2o, &model.d_b_i2o, lr);
}

pub fn update_lstm(model: &mut LstmClassifier, lr: f32) {
    sgd_step(&mut model.w_ih, &model.d_w_ih, lr);
    sgd_step(&mut model.w_hh, &model.d_w_hh, lr);
    sgd_step(&mut model.b_ih, &model.d_b_ih, lr);
    sgd_step(&mut model.b_hh, &model.d_b_hh, lr);
    sgd_step(&mut model.w_ho, &model.d_w_ho, lr);
    sgd_step(&mut model.b_ho, &model.d_b_ho, lr);
}
