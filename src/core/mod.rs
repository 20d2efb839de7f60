mod health;
mod payoff;
mod planner;
mod types;

pub use health::{improvement_tips, rate_score, score_health};
pub use payoff::{MAX_MONTHS, run_payoff_schedule, simulate_payoff};
pub use planner::{plan_payoff, recommend_extra_payment};
pub(crate) use types::lenient_amount;
pub use types::{
    Debt, DebtEntry, FinancialSnapshot, HealthReport, PayoffMonth, PayoffReport, PayoffStrategy,
    PlanReport, ScenarioResult, ScoreComponent, ScoreRating, parse_amount,
};
