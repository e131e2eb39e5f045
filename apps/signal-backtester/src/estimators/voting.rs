//! Hard-vote ensemble over member estimators.

use ndarray::ArrayView2;

use crate::backtest::{Direction, Estimator, EstimatorError, ParamSet, check_training_input};

const SEPARATOR: &str = "__";

/// Majority vote of named member estimators.
///
/// Every member is fit on the same rows. Each row goes to the direction with
/// the most member votes; equal votes resolve to `Down`. Member
/// hyperparameters are exposed as `member__param`.
#[derive(Debug, Clone)]
pub struct VotingClassifier {
    members: Vec<(String, Box<dyn Estimator>)>,
}

impl VotingClassifier {
    /// Create an ensemble from named members.
    #[must_use]
    pub const fn new(members: Vec<(String, Box<dyn Estimator>)>) -> Self {
        Self { members }
    }

    /// Member names, in vote order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }

    fn member_mut(&mut self, name: &str) -> Option<&mut Box<dyn Estimator>> {
        self.members
            .iter_mut()
            .find(|(member, _)| member == name)
            .map(|(_, estimator)| estimator)
    }
}

impl Estimator for VotingClassifier {
    fn kind(&self) -> &'static str {
        "voting"
    }

    fn fit(
        &mut self,
        features: ArrayView2<'_, f64>,
        labels: &[Direction],
    ) -> Result<(), EstimatorError> {
        check_training_input(features, labels)?;
        for (_, member) in &mut self.members {
            member.fit(features, labels)?;
        }
        Ok(())
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<Direction>, EstimatorError> {
        if self.members.is_empty() {
            return Err(EstimatorError::NotFitted);
        }
        let mut up_votes = vec![0_usize; features.nrows()];
        for (_, member) in &self.members {
            let votes = member.predict(features)?;
            if votes.len() != up_votes.len() {
                return Err(EstimatorError::ShapeMismatch {
                    expected: up_votes.len(),
                    got: votes.len(),
                });
            }
            for (count, vote) in up_votes.iter_mut().zip(votes) {
                if vote.is_up() {
                    *count += 1;
                }
            }
        }

        let members = self.members.len();
        Ok(up_votes
            .into_iter()
            .map(|up| {
                if up * 2 > members {
                    Direction::Up
                } else {
                    Direction::Down
                }
            })
            .collect())
    }

    fn params(&self) -> ParamSet {
        self.members
            .iter()
            .flat_map(|(name, member)| {
                member
                    .params()
                    .into_iter()
                    .map(move |(param, value)| (format!("{name}{SEPARATOR}{param}"), value))
            })
            .collect()
    }

    fn set_params(&mut self, params: &ParamSet) -> Result<(), EstimatorError> {
        let mut routed: Vec<(String, ParamSet)> = Vec::new();
        for (name, value) in params {
            let Some((member, param)) = name.split_once(SEPARATOR) else {
                return Err(EstimatorError::UnknownParameter { name: name.clone() });
            };
            if !self.members.iter().any(|(m, _)| m == member) {
                return Err(EstimatorError::UnknownParameter { name: name.clone() });
            }
            match routed.iter_mut().find(|(m, _)| m == member) {
                Some((_, set)) => {
                    set.insert(param.to_string(), value.clone());
                }
                None => {
                    let mut set = ParamSet::new();
                    set.insert(param.to_string(), value.clone());
                    routed.push((member.to_string(), set));
                }
            }
        }
        for (member, set) in &routed {
            if let Some(estimator) = self.member_mut(member) {
                estimator.set_params(set)?;
            }
        }
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}
