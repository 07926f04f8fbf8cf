//! Path-by-path payoff evaluation.
//!
//! Path-dependent products rarely need the whole `[path, time, asset]`
//! tensor: a knock-out note only looks at each observation once and stops
//! at the first trigger. [`PathPayoff`] lets such products walk a path step
//! by step and break out early, keeping memory per path constant.

use std::ops::ControlFlow;

/// A payoff evaluated while a path is generated.
pub trait PathPayoff {
    /// Per-path bookkeeping such as barrier flags or running extremes.
    type State;

    /// State at the start of a path, before the first step.
    fn start(&self) -> Self::State;

    /// Observes the asset prices at grid index `step` (1-based, so `step`
    /// is the price at `times[step - 1]`). Returning `Break(value)` ends
    /// the path with that value.
    fn observe(&self, state: &mut Self::State, step: usize, prices: &[f64]) -> ControlFlow<f64>;

    /// Value of a path that reached the last grid time without breaking.
    fn finish(&self, state: Self::State, prices: &[f64]) -> f64;
}

/// One path in flight.
pub(crate) struct Walker<S> {
    prices: Vec<f64>,
    state: S,
    result: Option<f64>,
}

impl<S> Walker<S> {
    pub(crate) fn new<P: PathPayoff<State = S>>(payoff: &P, spots: &[f64]) -> Self {
        Self {
            prices: spots.to_vec(),
            state: payoff.start(),
            result: None,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.result.is_some()
    }

    /// Advances one step with shocks `sign · diffusion · eps`.
    pub(crate) fn step<P: PathPayoff<State = S>>(
        &mut self,
        payoff: &P,
        step: usize,
        drift: &[f64],
        diffusion: &[f64],
        eps: &[f64],
        sign: f64,
    ) {
        if self.result.is_some() {
            return;
        }
        for i in 0..self.prices.len() {
            self.prices[i] *= (drift[i] + sign * diffusion[i] * eps[i]).exp();
        }
        if let ControlFlow::Break(value) = payoff.observe(&mut self.state, step, &self.prices) {
            self.result = Some(value);
        }
    }

    pub(crate) fn finish<P: PathPayoff<State = S>>(self, payoff: &P) -> f64 {
        match self.result {
            Some(value) => value,
            None => payoff.finish(self.state, &self.prices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::McConfig;
    use crate::gbm::Gbm;
    use approx::assert_relative_eq;

    struct Terminal;

    impl PathPayoff for Terminal {
        type State = ();
        fn start(&self) -> Self::State {}
        fn observe(&self, _: &mut (), _: usize, _: &[f64]) -> ControlFlow<f64> {
            ControlFlow::Continue(())
        }
        fn finish(&self, _: (), prices: &[f64]) -> f64 {
            prices[0]
        }
    }

    /// Pays the step index of the first close above `level`, else minus the
    /// last step seen.
    struct FirstAbove {
        level: f64,
    }

    impl PathPayoff for FirstAbove {
        type State = usize;
        fn start(&self) -> usize {
            0
        }
        fn observe(&self, seen: &mut usize, step: usize, prices: &[f64]) -> ControlFlow<f64> {
            *seen = step;
            if prices[0] > self.level {
                ControlFlow::Break(step as f64)
            } else {
                ControlFlow::Continue(())
            }
        }
        fn finish(&self, seen: usize, _: &[f64]) -> f64 {
            -(seen as f64)
        }
    }

    #[test]
    fn test_streamed_values_match_tensor() {
        let gbm = Gbm::new(100.0, 0.03, 0.25).unwrap();
        let config = McConfig::new(64, 6, 11);
        let times = [0.1, 0.2, 0.4, 0.6, 0.8, 1.0];
        let tensor = gbm.simulate_on_grid(&times, &config).unwrap();
        let streamed = gbm.evaluate_on_grid(&times, &config, &Terminal).unwrap();
        assert_eq!(streamed.len(), 128);
        for (p, value) in streamed.iter().enumerate() {
            assert_relative_eq!(*value, tensor[[p, 6]], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_early_exit_matches_first_crossing() {
        let gbm = Gbm::new(100.0, 0.0, 0.4).unwrap();
        let config = McConfig::new(200, 12, 3);
        let times: Vec<f64> = (1..=12).map(|k| f64::from(k) / 12.0).collect();
        let tensor = gbm.simulate_on_grid(&times, &config).unwrap();
        let values = gbm
            .evaluate_on_grid(&times, &config, &FirstAbove { level: 110.0 })
            .unwrap();
        for (p, value) in values.iter().enumerate() {
            let first = (1..=12).find(|&k| tensor[[p, k]] > 110.0);
            match first {
                Some(k) => assert_eq!(*value, k as f64),
                None => assert_eq!(*value, -12.0),
            }
        }
    }
}
