//! Domain types shared by the transformer, validator and analyzer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Column names
// ============================================================================

/// Column names as they appear in the vendor source file.
pub mod source {
    pub const CUSTOMER_ID: &str = "customerID";
    pub const GENDER: &str = "gender";
    pub const TENURE: &str = "tenure";
    pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
    pub const TOTAL_CHARGES: &str = "TotalCharges";
    pub const MULTIPLE_LINES: &str = "MultipleLines";
    pub const CONTRACT: &str = "Contract";
}

/// Column names of the staged (and loaded) table.
pub mod staged {
    pub const TENURE: &str = "tenure";
    pub const MONTHLY_CHARGES: &str = "monthlycharges";
    pub const TOTAL_CHARGES: &str = "totalcharges";
    pub const CONTRACT: &str = "contract";
    pub const CHURN: &str = "churn";
    pub const INTERNET_SERVICE: &str = "internetservice";
    pub const TENURE_GROUP: &str = "tenure_group";
    pub const MONTHLY_CHARGE_SEGMENT: &str = "monthly_charge_segment";
    pub const IS_MULTI_LINE_USER: &str = "is_multi_line_user";
    pub const CONTRACT_TYPE_CODE: &str = "contract_type_code";
}

/// Fill value for missing text cells.
pub const UNKNOWN_TEXT: &str = "unknown";

// ============================================================================
// Derived categories
// ============================================================================

/// Customer loyalty bucket derived from tenure in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenureGroup {
    New,
    Regular,
    Loyal,
    Champion,
}

impl TenureGroup {
    pub const ALL: [TenureGroup; 4] = [Self::New, Self::Regular, Self::Loyal, Self::Champion];

    /// Bucket a tenure: ≤12 new, ≤36 regular, ≤60 loyal, otherwise champion.
    pub fn from_tenure(tenure: f64) -> Self {
        if tenure <= 12.0 {
            Self::New
        } else if tenure <= 36.0 {
            Self::Regular
        } else if tenure <= 60.0 {
            Self::Loyal
        } else {
            Self::Champion
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Regular => "regular",
            Self::Loyal => "loyal",
            Self::Champion => "champion",
        }
    }
}

impl fmt::Display for TenureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price band derived from the monthly charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeSegment {
    Low,
    Medium,
    High,
}

impl ChargeSegment {
    pub const ALL: [ChargeSegment; 3] = [Self::Low, Self::Medium, Self::High];

    /// Band a monthly charge: <30 low, ≤70 medium, otherwise high.
    pub fn from_monthly_charge(charge: f64) -> Self {
        if charge < 30.0 {
            Self::Low
        } else if charge <= 70.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ChargeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract term recoded as an ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    MonthToMonth,
    OneYear,
    TwoYear,
}

impl ContractType {
    pub const ALL: [ContractType; 3] = [Self::MonthToMonth, Self::OneYear, Self::TwoYear];

    /// Map the vendor label. Matching is exact; anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::MonthToMonth => 0,
            Self::OneYear => 1,
            Self::TwoYear => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MonthToMonth => "Month-to-month",
            Self::OneYear => "One year",
            Self::TwoYear => "Two year",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenure_group_boundaries() {
        assert_eq!(TenureGroup::from_tenure(0.0), TenureGroup::New);
        assert_eq!(TenureGroup::from_tenure(12.0), TenureGroup::New);
        assert_eq!(TenureGroup::from_tenure(13.0), TenureGroup::Regular);
        assert_eq!(TenureGroup::from_tenure(36.0), TenureGroup::Regular);
        assert_eq!(TenureGroup::from_tenure(37.0), TenureGroup::Loyal);
        assert_eq!(TenureGroup::from_tenure(60.0), TenureGroup::Loyal);
        assert_eq!(TenureGroup::from_tenure(61.0), TenureGroup::Champion);
        assert_eq!(TenureGroup::from_tenure(72.0), TenureGroup::Champion);
    }

    #[test]
    fn test_charge_segment_boundaries() {
        assert_eq!(ChargeSegment::from_monthly_charge(29.99), ChargeSegment::Low);
        assert_eq!(ChargeSegment::from_monthly_charge(30.0), ChargeSegment::Medium);
        assert_eq!(ChargeSegment::from_monthly_charge(70.0), ChargeSegment::Medium);
        assert_eq!(ChargeSegment::from_monthly_charge(70.01), ChargeSegment::High);
    }

    #[test]
    fn test_contract_mapping() {
        assert_eq!(ContractType::from_label("Month-to-month").map(|c| c.code()), Some(0));
        assert_eq!(ContractType::from_label("One year").map(|c| c.code()), Some(1));
        assert_eq!(ContractType::from_label("Two year").map(|c| c.code()), Some(2));
        assert_eq!(ContractType::from_label("Three year"), None);
        assert_eq!(ContractType::from_label("one year"), None);
        assert_eq!(ContractType::from_label("unknown"), None);
    }

    #[test]
    fn test_contract_code_round_trip() {
        for contract in ContractType::ALL {
            assert_eq!(ContractType::from_code(contract.code()), Some(contract));
            assert_eq!(ContractType::from_label(contract.label()), Some(contract));
        }
        assert_eq!(ContractType::from_code(3), None);
    }

    #[test]
    fn test_category_display_matches_serde() {
        assert_eq!(TenureGroup::Champion.to_string(), "champion");
        assert_eq!(
            serde_json::to_string(&ChargeSegment::Medium).unwrap(),
            "\"medium\""
        );
    }
}
