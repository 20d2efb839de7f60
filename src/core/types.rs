use serde::{Deserialize, Deserializer, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PayoffStrategy {
    Avalanche,
    Snowball,
}

/// A debt as the user typed it. Any numeric field may be missing or garbage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtEntry {
    pub name: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub balance: Option<f64>,
    #[serde(deserialize_with = "lenient_amount")]
    pub interest_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_amount")]
    pub min_payment: Option<f64>,
}

impl DebtEntry {
    pub fn new(name: &str, balance: f64, interest_rate: f64, min_payment: f64) -> Self {
        Self {
            name: name.to_string(),
            balance: Some(balance),
            interest_rate: Some(interest_rate),
            min_payment: Some(min_payment),
        }
    }

    /// Returns the simulatable debt, or `None` when the entry is not eligible
    /// (positive balance, non-negative rate and positive minimum payment).
    pub fn to_debt(&self) -> Option<Debt> {
        let balance = self.balance.filter(|v| *v > 0.0)?;
        let interest_rate = self.interest_rate.filter(|v| *v >= 0.0)?;
        let min_payment = self.min_payment.filter(|v| *v > 0.0)?;
        Some(Debt {
            name: self.name.clone(),
            balance,
            annual_rate_percent: interest_rate,
            min_payment,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    pub annual_rate_percent: f64,
    pub min_payment: f64,
}

impl Debt {
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialSnapshot {
    #[serde(deserialize_with = "lenient_non_negative")]
    pub monthly_income: f64,
    #[serde(deserialize_with = "lenient_non_negative")]
    pub monthly_expenses: f64,
    #[serde(deserialize_with = "lenient_non_negative")]
    pub savings: f64,
    #[serde(deserialize_with = "lenient_non_negative")]
    pub debts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffReport {
    pub months: u32,
    pub years: u32,
    pub remaining_months: u32,
    pub total_paid: f64,
    pub total_interest: f64,
    pub monthly_payment: f64,
}

impl PayoffReport {
    pub fn duration_label(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if self.years > 0 {
            parts.push(plural(self.years, "year"));
        }
        if self.remaining_months > 0 {
            parts.push(plural(self.remaining_months, "month"));
        }
        if parts.is_empty() {
            return "0 months".to_string();
        }
        parts.join(", ")
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// One simulated month of a payoff run. `balances` follows input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffMonth {
    pub month: u32,
    pub target: Option<usize>,
    pub extra_available: f64,
    pub extra_applied: f64,
    pub total_paid: f64,
    pub balances: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub extra_payment: f64,
    pub avalanche: PayoffReport,
    pub snowball: PayoffReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub total_debt: f64,
    pub total_min_payment: f64,
    pub recommended_extra: f64,
    pub current: ScenarioResult,
    pub recommended: ScenarioResult,
    pub debts: Vec<Debt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub value: f64,
    pub score: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub total: u32,
    pub savings_rate: ScoreComponent,
    pub debt_ratio: ScoreComponent,
    pub emergency_fund: ScoreComponent,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScoreRating {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl ScoreRating {
    pub fn label(self) -> &'static str {
        match self {
            ScoreRating::Excellent => "Excellent",
            ScoreRating::Good => "Good",
            ScoreRating::Fair => "Fair",
            ScoreRating::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl Serialize for ScoreRating {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(#[allow(dead_code)] serde::de::IgnoredAny),
}

/// Parses a user-entered amount. Text is trimmed before parsing; empty,
/// unparsable and non-finite values are treated as absent.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawAmount::Number(v)) if v.is_finite() => Some(v),
        Some(RawAmount::Text(text)) => parse_amount(&text),
        _ => None,
    })
}

fn lenient_non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_amount(deserializer)?
        .filter(|v| *v >= 0.0)
        .unwrap_or(0.0))
}
