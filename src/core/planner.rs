use tracing::debug;

use super::payoff::simulate_payoff;
use super::types::{
    Debt, DebtEntry, FinancialSnapshot, PayoffStrategy, PlanReport, ScenarioResult,
};

const DEFAULT_EXTRA_SHARE: f64 = 0.02;
const FALLBACK_RECOMMENDED_SHARE: f64 = 0.03;
const NO_SNAPSHOT_RECOMMENDED_SHARE: f64 = 0.05;
const MIN_ACTIONABLE_EXTRA: f64 = 100.0;
const RECOMMENDATION_STEP: f64 = 50.0;

/// Builds the current and recommended payoff scenarios for the eligible
/// subset of `entries`. Returns `None` when no entry is eligible.
///
/// `extra_payment` of `None` or a non-finite value defaults to 2% of the total debt. Without a
/// snapshot the recommendation is 5% of the total debt.
pub fn plan_payoff(
    entries: &[DebtEntry],
    extra_payment: Option<f64>,
    snapshot: Option<&FinancialSnapshot>,
) -> Option<PlanReport> {
    let debts: Vec<Debt> = entries.iter().filter_map(DebtEntry::to_debt).collect();
    if debts.is_empty() {
        return None;
    }

    let total_debt: f64 = debts.iter().map(|d| d.balance).sum();
    let total_min_payment: f64 = debts.iter().map(|d| d.min_payment).sum();

    let current_extra = match extra_payment {
        Some(v) if v.is_finite() => v.max(0.0),
        _ => (total_debt * DEFAULT_EXTRA_SHARE).round(),
    };
    let recommended_extra = match snapshot {
        Some(snapshot) => recommend_extra_payment(snapshot, total_debt, total_min_payment),
        None => (total_debt * NO_SNAPSHOT_RECOMMENDED_SHARE).round(),
    };

    let current = run_scenario(&debts, current_extra);
    let recommended = run_scenario(&debts, recommended_extra);

    debug!(
        eligible = debts.len(),
        skipped = entries.len() - debts.len(),
        total_debt,
        current_extra,
        recommended_extra,
        "planned payoff scenarios"
    );

    Some(PlanReport {
        total_debt,
        total_min_payment,
        recommended_extra,
        current,
        recommended,
        debts,
    })
}

/// Suggests a monthly extra payment from the household's cash flow.
///
/// A share of the surplus after expenses and minimum payments is offered,
/// larger when the savings cushion is deeper, and snapped to a multiple of 50.
/// Missing cash-flow data, or a suggestion under 100, falls back to 3% of the
/// total debt.
pub fn recommend_extra_payment(
    snapshot: &FinancialSnapshot,
    total_debt: f64,
    total_min_payment: f64,
) -> f64 {
    let income = snapshot.monthly_income;
    let expenses = snapshot.monthly_expenses;
    let fallback = (total_debt * FALLBACK_RECOMMENDED_SHARE).round();

    if income == 0.0 || expenses == 0.0 {
        return fallback;
    }

    let surplus = income - expenses - total_min_payment;
    let months_of_savings = snapshot.savings / expenses;
    let share = if months_of_savings >= 6.0 {
        0.7
    } else if months_of_savings >= 3.0 {
        0.5
    } else {
        0.3
    };

    let recommended = (surplus * share).round().max(0.0);
    if recommended < MIN_ACTIONABLE_EXTRA {
        return fallback;
    }

    (recommended / RECOMMENDATION_STEP).round() * RECOMMENDATION_STEP
}

fn run_scenario(debts: &[Debt], extra_payment: f64) -> ScenarioResult {
    ScenarioResult {
        extra_payment,
        avalanche: simulate_payoff(debts, extra_payment, PayoffStrategy::Avalanche),
        snowball: simulate_payoff(debts, extra_payment, PayoffStrategy::Snowball),
    }
}
