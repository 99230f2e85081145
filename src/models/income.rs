use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyIncome {
    /// Zero-padded month number, "01" through "12".
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyIncome {
    /// Four-digit year as a string.
    pub year: String,
    pub amount: f64,
    pub monthly_breakdown: Vec<MonthlyIncome>,
}
