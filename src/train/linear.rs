//! A linear classifier trained by plain SGD, shared by the two training stages.
//!
//! The trainable input is a matrix whose rows are embeddings. One [LinearSgd::step] updates
//! the rows listed in `subjects` for an [Objective]:
//!
//! - [Objective::Softmax] : a second layer W (vocabulary x dimension) scores each subject row against the
//!   whole vocabulary, Z = W.Xᵗ, softmax is taken over the vocabulary axis (columns of Z) and the loss is the
//!   cross entropy with the target index of each pair. Gradients are dZ = softmax - onehot,
//!   dW = dZ.X / nb_pairs, dX = Wᵗ.dZ. Both X rows and W are updated.
//!
//! - [Objective::NegativeSampling] : each subject row g is contrasted against k fixed negative vectors n_i.
//!   With s_i = n_i.g, the loss is logsumexp(s) - g.p and g is moved by -lr * (Σ softmax(s)_i n_i - p)
//!
//! Softmax is made numerically stable by subtracting the max score. Exponent arguments below [UNDERFLOW_CLAMP]
//! are taken as giving exactly 0.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis};

use crate::error::{GraphEmbedError, Result};

/// exponent arguments (after max subtraction) below this value give 0.
pub const UNDERFLOW_CLAMP : f64 = -7.;


/// Softmax in place of scores, returns the log of the sum of exponentials of scores (with same clamping).
/// Output sums to 1 and does not change when a constant is added to all scores.
pub fn stable_softmax(mut scores : ArrayViewMut1<f64>) -> f64 {
    if scores.is_empty() {
        return f64::NEG_INFINITY;
    }
    let max = scores.fold(f64::NEG_INFINITY, |acc, x| acc.max(*x));
    let sum = scores.iter().filter(|x| **x - max >= UNDERFLOW_CLAMP).map(|x| (*x - max).exp()).sum::<f64>();
    scores.mapv_inplace(|x| {
        if x - max < UNDERFLOW_CLAMP { 0. } else { (x - max).exp() / sum }
    });
    max + sum.ln()
} // end of stable_softmax


/// Softmax of each column of scores (rows are the vocabulary), returns the log-sum-exp of each column.
pub fn stable_softmax_columns(scores : &mut Array2<f64>) -> Vec<f64> {
    scores.axis_iter_mut(Axis(1)).map(stable_softmax).collect()
} // end of stable_softmax_columns



/// Objective of a step, with the parameters specific to it
pub enum Objective<'a> {
    /// full softmax over a local vocabulary. targets\[j\] is the vocabulary index to predict from subjects\[j\]
    Softmax { targets : &'a [usize], weights : &'a mut Array2<f64> },
    /// contrast between a positive vector and negative vectors (rows of negatives)
    NegativeSampling { positive : ArrayView1<'a, f64>, negatives : ArrayView2<'a, f64> },
}


/// Plain SGD : param -= learning_rate * grad
#[derive(Copy, Clone, Debug)]
pub struct LinearSgd {
    learning_rate : f64,
}


impl LinearSgd {
    pub fn new(learning_rate : f64) -> Self {
        LinearSgd{learning_rate}
    }

    ///
    pub fn get_learning_rate(&self) -> f64 { self.learning_rate }

    /// Does one update of rows subjects of inputs.
    /// Returns the loss computed before the update (mean over pairs for Softmax, summed over subjects for NegativeSampling).
    pub fn step(&self, inputs : &mut Array2<f64>, subjects : &[usize], objective : Objective) -> Result<f64> {
        if let Some(bad) = subjects.iter().find(|s| **s >= inputs.nrows()) {
            return Err(GraphEmbedError::InvariantViolation(format!("LinearSgd subject {} out of {} rows", bad, inputs.nrows())));
        }
        match objective {
            Objective::Softmax { targets, weights } => self.softmax_step(inputs, subjects, targets, weights),
            Objective::NegativeSampling { positive, negatives } => self.negative_step(inputs, subjects, positive, negatives),
        }
    } // end of step


    fn softmax_step(&self, inputs : &mut Array2<f64>, subjects : &[usize], targets : &[usize], weights : &mut Array2<f64>) -> Result<f64> {
        if targets.len() != subjects.len() {
            return Err(GraphEmbedError::InvariantViolation(format!("softmax step : {} subjects, {} targets", subjects.len(), targets.len())));
        }
        if weights.ncols() != inputs.ncols() {
            return Err(GraphEmbedError::InvariantViolation(format!("softmax step : weights dim {} inputs dim {}", weights.ncols(), inputs.ncols())));
        }
        if let Some(bad) = targets.iter().find(|t| **t >= weights.nrows()) {
            return Err(GraphEmbedError::InvariantViolation(format!("softmax step : target {} out of vocabulary of size {}", bad, weights.nrows())));
        }
        let nb_pairs = subjects.len();
        if nb_pairs == 0 {
            return Ok(0.);
        }
        // forward. x is (nb_pairs, dim), z is (vocabulary, nb_pairs)
        let x = inputs.select(Axis(0), subjects);
        let z = weights.dot(&x.t());
        let mut grad_z = z.clone();
        let lse = stable_softmax_columns(&mut grad_z);
        let mut loss = 0.;
        for (j, target) in targets.iter().enumerate() {
            loss += lse[j] - z[[*target, j]];
            grad_z[[*target, j]] -= 1.;
        }
        loss /= nb_pairs as f64;
        // backward, dx uses weights before their update
        let grad_w = grad_z.dot(&x) / nb_pairs as f64;
        let grad_x = weights.t().dot(&grad_z);
        for (j, subject) in subjects.iter().enumerate() {
            inputs.row_mut(*subject).scaled_add(-self.learning_rate, &grad_x.column(j));
        }
        weights.scaled_add(-self.learning_rate, &grad_w);
        //
        Ok(loss)
    } // end of softmax_step


    fn negative_step(&self, inputs : &mut Array2<f64>, subjects : &[usize], positive : ArrayView1<f64>, negatives : ArrayView2<f64>) -> Result<f64> {
        if negatives.nrows() == 0 {
            return Err(GraphEmbedError::InvariantViolation("negative sampling step with no negative".into()));
        }
        if positive.len() != inputs.ncols() || negatives.ncols() != inputs.ncols() {
            return Err(GraphEmbedError::InvariantViolation(format!("negative sampling step : dimensions positive {} negatives {} inputs {}",
                    positive.len(), negatives.ncols(), inputs.ncols())));
        }
        let mut loss = 0.;
        for subject in subjects {
            let mut row = inputs.row_mut(*subject);
            let mut scores = negatives.dot(&row);
            let lse = stable_softmax(scores.view_mut());
            loss += lse - row.dot(&positive);
            // softmax weighted average of negatives minus positive
            let mut grad = negatives.t().dot(&scores);
            grad -= &positive;
            row.scaled_add(-self.learning_rate, &grad);
        }
        Ok(loss)
    } // end of negative_step

} // end of impl LinearSgd



//=====================================================================================

#[cfg(test)]
mod tests {

    use super::*;

    use ndarray::array;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }


    #[test]
    fn test_softmax_sum_and_shift() {
        log_init_test();
        //
        let scores = array![0.3, -1.2, 2.5, 0., 1.1];
        let mut p = scores.clone();
        stable_softmax(p.view_mut());
        assert!((p.sum() - 1.).abs() < 1.0e-12);
        assert!(p.iter().all(|x| *x >= 0.));
        // shift invariance
        let mut shifted = &scores + 123.4;
        stable_softmax(shifted.view_mut());
        for (a, b) in p.iter().zip(shifted.iter()) {
            assert!((a - b).abs() < 1.0e-12);
        }
        // same as plain softmax when nothing is clamped
        let plain_sum : f64 = scores.iter().map(|x| x.exp()).sum();
        for (i, x) in scores.iter().enumerate() {
            assert!((p[i] - x.exp() / plain_sum).abs() < 1.0e-12);
        }
    } // end of test_softmax_sum_and_shift


    #[test]
    fn test_softmax_clamp() {
        log_init_test();
        //
        let mut p = array![10., 2.9, 0., 9.];
        let lse = stable_softmax(p.view_mut());
        // 2.9 - 10 < -7 and 0 - 10 < -7
        assert_eq!(p[1], 0.);
        assert_eq!(p[2], 0.);
        assert!((p.sum() - 1.).abs() < 1.0e-12);
        let expected = 10. + (1. + (-1f64).exp()).ln();
        assert!((lse - expected).abs() < 1.0e-12);
    } // end of test_softmax_clamp


    #[test]
    fn test_softmax_columns() {
        log_init_test();
        //
        let mut scores = array![[1., 5.], [2., -3.], [3., 100.]];
        stable_softmax_columns(&mut scores);
        for column in scores.axis_iter(Axis(1)) {
            assert!((column.sum() - 1.).abs() < 1.0e-12);
        }
        // second column is dominated by 100.
        assert_eq!(scores[[2, 1]], 1.);
    } // end of test_softmax_columns


    #[test]
    fn test_softmax_step_reduces_loss() {
        log_init_test();
        //
        let mut inputs = array![[0.5, -0.2], [0.1, 0.8], [-0.7, 0.3]];
        let mut weights = array![[0.2, 0.4], [-0.5, 0.1], [0.3, -0.3]];
        let subjects = [0, 1, 2, 0];
        let targets = [1, 2, 0, 2];
        let sgd = LinearSgd::new(0.1);
        let mut losses = Vec::new();
        for _ in 0..200 {
            let loss = sgd.step(&mut inputs, &subjects, Objective::Softmax{targets : &targets, weights : &mut weights}).unwrap();
            losses.push(loss);
        }
        assert!(losses[199] < losses[0]);
    } // end of test_softmax_step_reduces_loss


    #[test]
    fn test_softmax_step_gradient() {
        log_init_test();
        // one pair, vocabulary of 2, check update against hand computation
        let mut inputs = array![[1., 0.]];
        let mut weights = array![[0., 0.], [0., 1.]];
        let sgd = LinearSgd::new(1.);
        let loss = sgd.step(&mut inputs, &[0], Objective::Softmax{targets : &[0], weights : &mut weights}).unwrap();
        // scores are 0 and 0 so softmax is 1/2, 1/2
        assert!((loss - 2f64.ln()).abs() < 1.0e-12);
        // dz = (-1/2, 1/2), dW = dz x = [[-1/2, 0], [1/2, 0]], dx = Wt dz = (0, 1/2)
        assert!((weights[[0, 0]] - 0.5).abs() < 1.0e-12);
        assert!((weights[[1, 0]] + 0.5).abs() < 1.0e-12);
        assert!((weights[[1, 1]] - 1.).abs() < 1.0e-12);
        assert!((inputs[[0, 0]] - 1.).abs() < 1.0e-12);
        assert!((inputs[[0, 1]] + 0.5).abs() < 1.0e-12);
    } // end of test_softmax_step_gradient


    #[test]
    fn test_vocabulary_of_one() {
        log_init_test();
        //
        let mut inputs = array![[0.3, -0.4, 0.9]];
        let before = inputs.clone();
        let mut weights = array![[0.5, 0.5, -0.1]];
        let sgd = LinearSgd::new(0.5);
        for _ in 0..5 {
            let loss = sgd.step(&mut inputs, &[0, 0], Objective::Softmax{targets : &[0, 0], weights : &mut weights}).unwrap();
            assert!(loss.abs() < 1.0e-12);
        }
        assert_eq!(inputs, before);
    } // end of test_vocabulary_of_one


    #[test]
    fn test_negative_step() {
        log_init_test();
        //
        let mut inputs = array![[0., 0.]];
        let positive = array![1., 0.];
        let negatives = array![[0., 1.], [0., -1.]];
        let sgd = LinearSgd::new(0.5);
        let loss = sgd.step(&mut inputs, &[0], Objective::NegativeSampling{positive : positive.view(), negatives : negatives.view()}).unwrap();
        // scores 0, 0 : average of negatives is 0 so g moves toward positive by lr
        assert!((loss - 2f64.ln()).abs() < 1.0e-12);
        assert!((inputs[[0, 0]] - 0.5).abs() < 1.0e-12);
        assert!(inputs[[0, 1]].abs() < 1.0e-12);
        //
        let empty = Array2::<f64>::zeros((0, 2));
        let res = sgd.step(&mut inputs, &[0], Objective::NegativeSampling{positive : positive.view(), negatives : empty.view()});
        assert!(res.is_err());
    } // end of test_negative_step


    #[test]
    fn test_bad_subject() {
        log_init_test();
        //
        let mut inputs = Array2::<f64>::zeros((2, 2));
        let mut weights = Array2::<f64>::zeros((2, 2));
        let sgd = LinearSgd::new(0.5);
        let res = sgd.step(&mut inputs, &[2], Objective::Softmax{targets : &[0], weights : &mut weights});
        assert!(matches!(res, Err(GraphEmbedError::InvariantViolation(_))));
    } // end of test_bad_subject

} // end of mod tests
