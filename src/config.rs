use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::types::AccrualModel;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub accrual_model: AccrualModel,
    pub rate_basis: RateBasis,
    pub status_filter: StatusFilter,
    /// decimal places used when figures are presented
    pub rounding_dp: u32,
}

/// which percentage the per-direction rate averages are taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    #[default]
    Monthly,
    Annual,
}

/// which loans contribute interest and cash flow to a summary
///
/// Loan counts, principal, gold and rate averages always cover every loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    ActiveOnly,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::simple()
    }
}

impl EngineConfig {
    /// max working precision of `Money`
    pub const MAX_ROUNDING_DP: u32 = 8;

    /// flat monthly accrual over monthly rates
    pub fn simple() -> Self {
        Self {
            accrual_model: AccrualModel::Simple,
            rate_basis: RateBasis::Monthly,
            status_filter: StatusFilter::All,
            rounding_dp: 2,
        }
    }

    /// level-payment projections over annual rates
    pub fn amortized() -> Self {
        Self {
            accrual_model: AccrualModel::Amortized,
            rate_basis: RateBasis::Annual,
            status_filter: StatusFilter::All,
            rounding_dp: 2,
        }
    }

    pub fn with_status_filter(mut self, filter: StatusFilter) -> Self {
        self.status_filter = filter;
        self
    }

    pub fn with_rate_basis(mut self, basis: RateBasis) -> Self {
        self.rate_basis = basis;
        self
    }

    pub fn with_rounding_dp(mut self, dp: u32) -> Self {
        self.rounding_dp = dp;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounding_dp > Self::MAX_ROUNDING_DP {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "rounding_dp {} exceeds money precision of {}",
                    self.rounding_dp,
                    Self::MAX_ROUNDING_DP
                ),
            });
        }
        Ok(())
    }

    /// parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let simple = EngineConfig::simple();
        assert_eq!(simple.accrual_model, AccrualModel::Simple);
        assert_eq!(simple.rate_basis, RateBasis::Monthly);
        assert_eq!(EngineConfig::default(), simple);

        let amortized = EngineConfig::amortized();
        assert_eq!(amortized.accrual_model, AccrualModel::Amortized);
        assert_eq!(amortized.rate_basis, RateBasis::Annual);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{ "accrual_model": "amortized", "status_filter": "active_only" }"#)
            .unwrap();

        assert_eq!(config.accrual_model, AccrualModel::Amortized);
        assert_eq!(config.status_filter, StatusFilter::ActiveOnly);
        assert_eq!(config.rate_basis, RateBasis::Monthly);
        assert_eq!(config.rounding_dp, 2);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::amortized()
            .with_status_filter(StatusFilter::ActiveOnly)
            .with_rounding_dp(4);

        let parsed = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_excess_rounding() {
        let config = EngineConfig::simple().with_rounding_dp(9);
        assert!(matches!(config.validate(), Err(LoanError::InvalidConfiguration { .. })));
        assert!(EngineConfig::from_json(r#"{ "rounding_dp": 12 }"#).is_err());
    }

    #[test]
    fn test_unknown_model_is_serialization_error() {
        let err = EngineConfig::from_json(r#"{ "accrual_model": "compound" }"#).unwrap_err();
        assert!(matches!(err, LoanError::Serialization(_)));
    }
}
