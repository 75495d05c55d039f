//! Parameter sweeps over an uptake rate, and assertions over the resulting flux sequences
use indexmap::IndexMap;
use log::debug;

use crate::metabolic_model::model::{BoundsChange, Model};
use crate::testing::TestError;

/// Carbon source exchange swept by default
pub const CARBON_SOURCE: &str = "EX_CARBON-MONOXIDE";

/// Fix an exchange to a series of uptake rates and record product fluxes at each
#[derive(Clone, Debug, PartialEq)]
pub struct UptakeSweep {
    pub exchange: String,
    /// Uptake rates, positive; the exchange is fixed to the negated rate
    pub rates: Vec<f64>,
    pub products: Vec<String>,
}

/// Product fluxes at each rate of a sweep
///
/// A `None` marks a rate where the model couldn't be solved.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepResult {
    pub rates: Vec<f64>,
    pub fluxes: IndexMap<String, Vec<Option<f64>>>,
}

impl SweepResult {
    /// Flux sequence of a product, empty if the product wasn't swept
    pub fn product(&self, id: &str) -> &[Option<f64>] {
        self.fluxes.get(id).map(|f| f.as_slice()).unwrap_or(&[])
    }
}

impl UptakeSweep {
    pub fn new<I, S>(exchange: &str, rates: I, products: &[S]) -> Self
    where
        I: IntoIterator<Item = f64>,
        S: AsRef<str>,
    {
        UptakeSweep {
            exchange: exchange.to_string(),
            rates: rates.into_iter().collect(),
            products: products.iter().map(|p| p.as_ref().to_string()).collect(),
        }
    }

    /// Carbon monoxide uptake from 15 to 49 in steps of 1
    pub fn carbon_monoxide<S: AsRef<str>>(products: &[S]) -> Self {
        Self::new(CARBON_SOURCE, (15..=49).map(f64::from), products)
    }

    /// Solve the model at each rate
    ///
    /// The exchange bounds are restored afterwards.
    pub fn run(&self, model: &mut Model) -> Result<SweepResult, TestError> {
        let mut fluxes: IndexMap<String, Vec<Option<f64>>> = self
            .products
            .iter()
            .map(|p| (p.clone(), Vec::with_capacity(self.rates.len())))
            .collect();
        for rate in &self.rates {
            let change = BoundsChange::fixed(&self.exchange, -rate);
            let solution = model.with_bounds(&[change], |m| Ok::<_, TestError>(m.optimize()?))?;
            debug!("{} at {}: {}", self.exchange, rate, solution.status);
            for (product, sequence) in fluxes.iter_mut() {
                let flux = if solution.is_optimal() {
                    solution.flux(product)
                } else {
                    None
                };
                sequence.push(flux);
            }
        }
        Ok(SweepResult {
            rates: self.rates.clone(),
            fluxes,
        })
    }
}

/// Every value present and each above the previous by more than `tolerance`
pub fn is_strictly_increasing(sequence: &[Option<f64>], tolerance: f64) -> bool {
    let Some(values) = sequence.iter().copied().collect::<Option<Vec<f64>>>() else {
        return false;
    };
    values.windows(2).all(|pair| pair[1] - pair[0] > tolerance)
}

/// Every value present and within `tolerance` of zero
pub fn all_zero(sequence: &[Option<f64>], tolerance: f64) -> bool {
    sequence
        .iter()
        .all(|value| matches!(value, Some(v) if v.abs() <= tolerance))
}

/// Same length, every value present, and pairwise within `tolerance`
pub fn sequences_equal(a: &[Option<f64>], b: &[Option<f64>], tolerance: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|pair| match pair {
            (Some(x), Some(y)) => (x - y).abs() <= tolerance,
            _ => false,
        })
}

#[cfg(test)]
mod sweep_tests {
    use super::*;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::objective::ObjectiveSense;

    #[test]
    fn sequence_checks() {
        let rising = [Some(0.), Some(1.), Some(2.5)];
        assert!(is_strictly_increasing(&rising, 1e-6));
        assert!(!is_strictly_increasing(&[Some(1.), Some(1.)], 1e-6));
        assert!(!is_strictly_increasing(&[Some(1.), None, Some(3.)], 1e-6));

        assert!(all_zero(&[Some(0.), Some(-1e-9)], 1e-6));
        assert!(!all_zero(&[Some(0.), None], 1e-6));
        assert!(!all_zero(&[Some(0.1)], 1e-6));

        assert!(sequences_equal(&rising, &[Some(0.), Some(1. + 1e-9), Some(2.5)], 1e-6));
        assert!(!sequences_equal(&rising, &rising[..2], 1e-6));
        assert!(!sequences_equal(&[None], &[None], 1e-6));
    }

    fn carbon_model() -> Model {
        // co -> p, with the exchange bounds (-20, 0)
        let mut model = Model::new_empty();
        let reactions = [
            (CARBON_SOURCE, vec![("co", -1.)], -20., 0.),
            ("CO2P", vec![("co", -1.), ("p", 1.)], 0., 1000.),
            ("EX_P", vec![("p", -1.)], 0., 1000.),
        ];
        for (id, mets, lb, ub) in reactions {
            model
                .add_reaction(
                    ReactionBuilder::default()
                        .id(id)
                        .metabolites(mets.into_iter().map(|(m, c)| (m.to_string(), c)).collect())
                        .lower_bound(lb)
                        .upper_bound(ub)
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        model
            .set_objective([("EX_P", 1.)], ObjectiveSense::Maximize)
            .unwrap();
        model
    }

    #[test]
    fn sweep_records_fluxes_and_restores() {
        let mut model = carbon_model();
        let sweep = UptakeSweep::new(CARBON_SOURCE, [5., 10., 30.], &["EX_P"]);
        let result = sweep.run(&mut model).unwrap();
        let produced = result.product("EX_P");
        assert_eq!(produced.len(), 3);
        assert!((produced[0].unwrap() - 5.).abs() < 1e-5);
        assert!((produced[1].unwrap() - 10.).abs() < 1e-5);
        // The fixed rate replaces the exchange bounds rather than being clipped by them
        assert!((produced[2].unwrap() - 30.).abs() < 1e-5);
        assert_eq!(model.bounds(CARBON_SOURCE).unwrap(), (-20., 0.));
        assert!(result.product("missing").is_empty());
    }

    #[test]
    fn default_carbon_sweep() {
        let sweep = UptakeSweep::carbon_monoxide(&["EX_P"]);
        assert_eq!(sweep.rates.len(), 35);
        assert_eq!(sweep.rates[0], 15.);
        assert_eq!(sweep.rates[34], 49.);
    }
}
