//! K-nearest-neighbours direction classifier.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::backtest::{
    Direction, Estimator, EstimatorError, ParamSet, ParamValue, check_training_input,
};

/// Neighbour weighting scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Every neighbour counts once.
    Uniform,
    /// Neighbours count by inverse distance; exact matches dominate.
    Distance,
}

impl Weighting {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Distance => "distance",
        }
    }
}

/// Majority vote among the `n_neighbors` closest training rows.
///
/// Hyperparameters: `n_neighbors` (int, >= 1), `weights` (`uniform` or
/// `distance`), `p` (1 for Manhattan, 2 for Euclidean distance). Equal
/// votes resolve to `Down`.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    n_neighbors: usize,
    weighting: Weighting,
    p: i64,
    train_x: Option<Array2<f64>>,
    train_y: Vec<Direction>,
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KnnClassifier {
    /// Create an unfitted classifier with uniform weights and Euclidean distance.
    #[must_use]
    pub const fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            weighting: Weighting::Uniform,
            p: 2,
            train_x: None,
            train_y: Vec::new(),
        }
    }

    /// Set the weighting scheme.
    #[must_use]
    pub const fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        let pairs = a.iter().zip(b.iter());
        if self.p == 1 {
            pairs.map(|(x, y)| (x - y).abs()).sum()
        } else {
            pairs.map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
        }
    }

    fn vote(&self, neighbours: &[(usize, f64)]) -> Direction {
        let mut up = 0.0;
        let mut down = 0.0;
        let exact = neighbours.iter().any(|(_, d)| *d == 0.0);
        for (idx, dist) in neighbours {
            let weight = match self.weighting {
                Weighting::Uniform => 1.0,
                // exact matches outvote everything else
                Weighting::Distance if exact => {
                    if *dist == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                Weighting::Distance => 1.0 / dist,
            };
            if self.train_y[*idx].is_up() {
                up += weight;
            } else {
                down += weight;
            }
        }
        if up > down { Direction::Up } else { Direction::Down }
    }
}

impl Estimator for KnnClassifier {
    fn kind(&self) -> &'static str {
        "knn"
    }

    fn fit(
        &mut self,
        features: ArrayView2<'_, f64>,
        labels: &[Direction],
    ) -> Result<(), EstimatorError> {
        check_training_input(features, labels)?;
        self.train_x = Some(features.to_owned());
        self.train_y = labels.to_vec();
        Ok(())
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<Direction>, EstimatorError> {
        let train_x = self.train_x.as_ref().ok_or(EstimatorError::NotFitted)?;
        if features.ncols() != train_x.ncols() {
            return Err(EstimatorError::ShapeMismatch {
                expected: train_x.ncols(),
                got: features.ncols(),
            });
        }

        let k = self.n_neighbors.min(train_x.nrows());
        let predictions = features
            .rows()
            .into_iter()
            .map(|sample| {
                let mut distances: Vec<(usize, f64)> = train_x
                    .rows()
                    .into_iter()
                    .enumerate()
                    .map(|(i, row)| (i, self.distance(sample, row)))
                    .collect();
                // stable: equidistant rows keep training order
                distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
                self.vote(&distances[..k])
            })
            .collect();
        Ok(predictions)
    }

    fn params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert(
            "n_neighbors".to_string(),
            ParamValue::Int(self.n_neighbors as i64),
        );
        params.insert(
            "weights".to_string(),
            ParamValue::String(self.weighting.as_str().to_string()),
        );
        params.insert("p".to_string(), ParamValue::Int(self.p));
        params
    }

    fn set_params(&mut self, params: &ParamSet) -> Result<(), EstimatorError> {
        for (name, value) in params {
            match name.as_str() {
                "n_neighbors" => {
                    let k = value
                        .as_int()
                        .filter(|k| *k >= 1)
                        .ok_or_else(|| EstimatorError::invalid(name, "expected an integer >= 1"))?;
                    self.n_neighbors = k as usize;
                }
                "weights" => {
                    self.weighting = match value.as_text() {
                        Some("uniform") => Weighting::Uniform,
                        Some("distance") => Weighting::Distance,
                        _ => {
                            return Err(EstimatorError::invalid(
                                name,
                                "expected 'uniform' or 'distance'",
                            ));
                        }
                    };
                }
                "p" => {
                    self.p = value
                        .as_int()
                        .filter(|p| *p == 1 || *p == 2)
                        .ok_or_else(|| EstimatorError::invalid(name, "expected 1 or 2"))?;
                }
                _ => return Err(EstimatorError::UnknownParameter { name: name.clone() }),
            }
        }
        self.train_x = None;
        self.train_y.clear();
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}
