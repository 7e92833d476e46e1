use super::validate;
use crate::{error::ConstructionError, parameter::SearchParameter};
use serde::{Deserialize, Serialize};

/// Explicit bounds of a `Range` predicate. At most one lower bound
/// (`gte`/`gt`) and at most one upper bound (`lte`/`lt`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
}

impl RangeValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gte(mut self, value: impl Into<String>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn gt(mut self, value: impl Into<String>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<String>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<String>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub(super) fn validate(&self, key: &SearchParameter) -> Result<(), ConstructionError> {
        if self.gte.is_some() && self.gt.is_some() {
            return Err(ConstructionError::InvalidRange(
                "only one of gte and gt may be set".into(),
            ));
        }
        if self.lte.is_some() && self.lt.is_some() {
            return Err(ConstructionError::InvalidRange(
                "only one of lte and lt may be set".into(),
            ));
        }

        let bounds = [&self.gte, &self.gt, &self.lte, &self.lt];
        if bounds.iter().all(|b| b.is_none()) {
            return Err(ConstructionError::InvalidRange("no bound given".into()));
        }
        for bound in bounds.into_iter().flatten() {
            validate::single_value(key, bound)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{NumberKind, ValueType};

    fn year() -> SearchParameter {
        SearchParameter::new("YEAR", ValueType::Number(NumberKind::Integer))
    }

    #[test]
    fn test_valid_range() {
        assert!(RangeValue::new().gt("1990").lt("2011").validate(&year()).is_ok());
        assert!(RangeValue::new().gte("1990").validate(&year()).is_ok());
    }

    #[test]
    fn test_conflicting_bounds() {
        let err = RangeValue::new()
            .gt("1990")
            .gte("1991")
            .validate(&year())
            .unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidRange(_)));
        assert!(RangeValue::new().validate(&year()).is_err());
        assert!(RangeValue::new().lte("soon").validate(&year()).is_err());
    }
}
