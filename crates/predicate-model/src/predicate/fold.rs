//! Folding of equality disjunctions into membership tests.
//!
//! `a = 1 OR a = 2` is compiled as `a IN (1, 2)` by both backends. Each
//! backend decides which equalities are eligible; grouping is shared.

use super::{InPredicate, Predicate, SimplePredicate};
use crate::parameter::SearchParameter;

/// Equalities on one key that can be folded into a single `In`.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualsGroup {
    key: SearchParameter,
    match_case: bool,
    scope: Option<String>,
    values: Vec<String>,
    members: Vec<usize>,
}

impl EqualsGroup {
    fn start(index: usize, p: &SimplePredicate) -> Self {
        Self {
            key: p.key.clone(),
            match_case: p.match_case,
            scope: p.scope.clone(),
            values: vec![p.value.clone()],
            members: vec![index],
        }
    }

    fn accepts(&self, p: &SimplePredicate) -> bool {
        self.key == p.key && self.match_case == p.match_case && self.scope == p.scope
    }

    fn push(&mut self, index: usize, p: &SimplePredicate) {
        if !self.values.contains(&p.value) {
            self.values.push(p.value.clone());
        }
        self.members.push(index);
    }

    pub fn key(&self) -> &SearchParameter {
        &self.key
    }

    pub fn match_case(&self) -> bool {
        self.match_case
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Distinct values in first-seen order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Positions of the folded children in the disjunction.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// The folded membership test. Values were validated when the
    /// equalities were built.
    pub fn to_predicate(&self) -> Predicate {
        Predicate::In(InPredicate {
            key: self.key.clone(),
            values: self.values.clone(),
            match_case: self.match_case,
            scope: self.scope.clone(),
        })
    }
}

/// Groups the eligible `Equals` children of a disjunction by key, case
/// sensitivity and scope. Only groups of two or more are returned, in the
/// order their first member appears.
pub fn equals_groups<F>(children: &[Predicate], eligible: F) -> Vec<EqualsGroup>
where
    F: Fn(&SimplePredicate) -> bool,
{
    let mut groups: Vec<EqualsGroup> = Vec::new();
    for (index, child) in children.iter().enumerate() {
        let Predicate::Equals(p) = child else {
            continue;
        };
        if !eligible(p) {
            continue;
        }
        match groups.iter_mut().find(|g| g.accepts(p)) {
            Some(group) => group.push(index, p),
            None => groups.push(EqualsGroup::start(index, p)),
        }
    }
    groups.retain(|g| g.members.len() > 1);
    groups
}

/// Folds the disjunction only when every child is an eligible equality in
/// one group.
pub fn fold_all_equals<F>(children: &[Predicate], eligible: F) -> Option<Predicate>
where
    F: Fn(&SimplePredicate) -> bool,
{
    let mut groups = equals_groups(children, eligible);
    match groups.pop() {
        Some(group) if groups.is_empty() && group.members.len() == children.len() => {
            Some(group.to_predicate())
        }
        _ => None,
    }
}
