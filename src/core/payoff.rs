use super::types::{Debt, PayoffMonth, PayoffReport, PayoffStrategy};

/// Hard stop for runs whose payments never outpace interest.
pub const MAX_MONTHS: u32 = 600;

/// Balances at or below this are treated as paid off.
const BALANCE_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct WorkingDebt {
    balance: f64,
    monthly_rate: f64,
    min_payment: f64,
}

impl WorkingDebt {
    fn from_debt(debt: &Debt) -> Self {
        Self {
            balance: debt.balance,
            monthly_rate: debt.monthly_rate(),
            min_payment: debt.min_payment,
        }
    }

    fn is_open(self) -> bool {
        self.balance > 0.0
    }
}

#[derive(Debug)]
struct RunState {
    months: u32,
    total_paid: f64,
    extra_pool: f64,
}

/// Simulates month-by-month repayment of `debts` until every balance is
/// cleared or `MAX_MONTHS` elapse. `debts` must already be eligible; the input
/// slice is never mutated so the same list can feed several runs.
pub fn simulate_payoff(debts: &[Debt], extra_payment: f64, strategy: PayoffStrategy) -> PayoffReport {
    run_simulation(debts, extra_payment, strategy, None)
}

/// Same run as `simulate_payoff`, returning one row per simulated month.
pub fn run_payoff_schedule(
    debts: &[Debt],
    extra_payment: f64,
    strategy: PayoffStrategy,
) -> Vec<PayoffMonth> {
    let mut schedule = Vec::new();
    run_simulation(debts, extra_payment, strategy, Some(&mut schedule));
    schedule
}

fn run_simulation(
    debts: &[Debt],
    extra_payment: f64,
    strategy: PayoffStrategy,
    mut schedule: Option<&mut Vec<PayoffMonth>>,
) -> PayoffReport {
    let extra_payment = sanitize_extra(extra_payment);
    let mut working: Vec<WorkingDebt> = debts.iter().map(WorkingDebt::from_debt).collect();
    let mut state = RunState {
        months: 0,
        total_paid: 0.0,
        extra_pool: extra_payment,
    };

    while state.months < MAX_MONTHS && working.iter().any(|d| d.balance > BALANCE_EPSILON) {
        state.months += 1;
        apply_minimum_payments(&mut working, &mut state);

        let extra_available = state.extra_pool;
        let target = select_target(&working, strategy);
        let extra_applied = match target {
            Some(index) => apply_extra_payment(&mut working[index], &mut state),
            None => 0.0,
        };

        if let Some(schedule) = schedule.as_mut() {
            schedule.push(PayoffMonth {
                month: state.months,
                target,
                extra_available,
                extra_applied,
                total_paid: state.total_paid,
                balances: working.iter().map(|d| d.balance).collect(),
            });
        }
    }

    let total_original: f64 = debts.iter().map(|d| d.balance).sum();
    let total_min_payment: f64 = debts.iter().map(|d| d.min_payment).sum();

    PayoffReport {
        months: state.months,
        years: state.months / 12,
        remaining_months: state.months % 12,
        total_paid: state.total_paid,
        total_interest: state.total_paid - total_original,
        monthly_payment: total_min_payment + extra_payment,
    }
}

fn sanitize_extra(extra_payment: f64) -> f64 {
    if extra_payment.is_finite() {
        extra_payment.max(0.0)
    } else {
        0.0
    }
}

fn apply_minimum_payments(working: &mut [WorkingDebt], state: &mut RunState) {
    for debt in working.iter_mut().filter(|d| d.is_open()) {
        let interest = debt.balance * debt.monthly_rate;
        // The full minimum counts as paid even when it overshoots the balance.
        state.total_paid += debt.min_payment;
        debt.balance = (debt.balance + interest - debt.min_payment).max(0.0);
    }
}

fn apply_extra_payment(target: &mut WorkingDebt, state: &mut RunState) -> f64 {
    let applied = state.extra_pool.min(target.balance);
    target.balance -= applied;
    state.total_paid += applied;

    if target.balance <= BALANCE_EPSILON {
        target.balance = 0.0;
        state.extra_pool += target.min_payment;
    }
    applied
}

/// Picks the open debt receiving this month's extra funds. `min_by` keeps the
/// first of equal candidates, so ties resolve to input order.
fn select_target(working: &[WorkingDebt], strategy: PayoffStrategy) -> Option<usize> {
    let open = working.iter().enumerate().filter(|(_, d)| d.is_open());
    let chosen = match strategy {
        PayoffStrategy::Avalanche => {
            open.min_by(|(_, a), (_, b)| b.monthly_rate.total_cmp(&a.monthly_rate))
        }
        PayoffStrategy::Snowball => open.min_by(|(_, a), (_, b)| a.balance.total_cmp(&b.balance)),
    };
    chosen.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DebtEntry;
    use proptest::collection::vec;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn debt(name: &str, balance: f64, rate: f64, min_payment: f64) -> Debt {
        DebtEntry::new(name, balance, rate, min_payment)
            .to_debt()
            .expect("test debt must be eligible")
    }

    fn two_debts() -> Vec<Debt> {
        vec![debt("A", 1000.0, 20.0, 50.0), debt("B", 500.0, 10.0, 50.0)]
    }

    #[test]
    fn single_debt_without_extra_amortizes_with_interest() {
        let debts = vec![debt("Loan", 1200.0, 24.0, 100.0)];
        let report = simulate_payoff(&debts, 0.0, PayoffStrategy::Avalanche);

        assert_eq!(report.months, 14);
        assert_eq!(report.years, 1);
        assert_eq!(report.remaining_months, 2);
        assert_approx(report.total_paid, 1400.0);
        assert_approx(report.total_interest, 200.0);
        assert!(report.total_interest > 0.0);
        assert_approx(report.monthly_payment, 100.0);

        let schedule = run_payoff_schedule(&debts, 0.0, PayoffStrategy::Avalanche);
        assert_approx(schedule[0].balances[0], 1124.0);
        assert_approx(schedule[1].balances[0], 1124.0 * 1.02 - 100.0);
        assert_eq!(schedule.last().map(|m| m.balances[0]), Some(0.0));
    }

    #[test]
    fn avalanche_targets_highest_rate_then_rolls_minimum_over() {
        let debts = two_debts();
        let schedule = run_payoff_schedule(&debts, 150.0, PayoffStrategy::Avalanche);

        let a_cleared = schedule
            .iter()
            .position(|m| m.balances[0] == 0.0)
            .expect("A is eventually cleared");
        assert_eq!(a_cleared, 5);
        for month in &schedule[..=a_cleared] {
            assert_eq!(month.target, Some(0));
            assert_approx(month.extra_available, 150.0);
        }

        let next = &schedule[a_cleared + 1];
        assert_eq!(next.target, Some(1));
        assert_approx(next.extra_available, 200.0);
        assert!(next.extra_applied > 0.0);
    }

    #[test]
    fn snowball_targets_smallest_balance_first() {
        let debts = two_debts();
        let schedule = run_payoff_schedule(&debts, 100.0, PayoffStrategy::Snowball);
        assert_eq!(schedule[0].target, Some(1));

        let b_cleared = schedule
            .iter()
            .position(|m| m.balances[1] == 0.0)
            .expect("B is eventually cleared");
        assert!(schedule[b_cleared].balances[0] > 0.0);
        assert_approx(schedule[b_cleared + 1].extra_available, 150.0);
        assert_eq!(schedule[b_cleared + 1].target, Some(0));
    }

    #[test]
    fn ties_resolve_to_input_order() {
        let debts = vec![
            debt("first", 300.0, 12.0, 20.0),
            debt("second", 300.0, 12.0, 20.0),
        ];
        for strategy in [PayoffStrategy::Avalanche, PayoffStrategy::Snowball] {
            let schedule = run_payoff_schedule(&debts, 50.0, strategy);
            assert_eq!(schedule[0].target, Some(0));
        }
    }

    #[test]
    fn extra_payment_shortens_the_run_and_reduces_interest() {
        let debts = two_debts();
        let minimum_only = simulate_payoff(&debts, 0.0, PayoffStrategy::Avalanche);
        let with_extra = simulate_payoff(&debts, 200.0, PayoffStrategy::Avalanche);

        assert!(with_extra.months < minimum_only.months);
        assert!(with_extra.total_interest < minimum_only.total_interest);
        assert_approx(with_extra.monthly_payment, 300.0);
    }

    #[test]
    fn strategies_agree_without_extra_payment_on_interest_bearing_debts() {
        let card_and_car = vec![
            debt("Card", 5_000.0, 22.0, 150.0),
            debt("Car", 12_000.0, 6.5, 300.0),
        ];
        let three = vec![
            debt("Card", 2_500.0, 24.0, 100.0),
            debt("Store", 800.0, 18.0, 40.0),
            debt("Auto", 4_000.0, 7.0, 120.0),
        ];
        let cases = [
            (two_debts(), 25, 1_800.0),
            (card_and_car, 52, 21_600.0),
            (three, 38, 9_120.0),
        ];

        for (debts, months, total_paid) in cases {
            let avalanche = simulate_payoff(&debts, 0.0, PayoffStrategy::Avalanche);
            let snowball = simulate_payoff(&debts, 0.0, PayoffStrategy::Snowball);
            assert_eq!(avalanche.months, months);
            assert_eq!(snowball.months, months);
            assert_approx(avalanche.total_paid, total_paid);
            assert_approx(snowball.total_paid, total_paid);
        }
    }

    #[test]
    fn larger_extra_payments_shorten_a_multi_debt_run() {
        let debts = two_debts();
        let ladder = [0.0, 50.0, 100.0, 150.0, 200.0, 300.0, 400.0];

        let avalanche: Vec<u32> = ladder
            .iter()
            .map(|extra| simulate_payoff(&debts, *extra, PayoffStrategy::Avalanche).months)
            .collect();
        let snowball: Vec<u32> = ladder
            .iter()
            .map(|extra| simulate_payoff(&debts, *extra, PayoffStrategy::Snowball).months)
            .collect();

        assert_eq!(avalanche, vec![25, 12, 9, 7, 6, 4, 4]);
        assert_eq!(snowball, vec![25, 14, 9, 7, 6, 5, 4]);
    }

    #[test]
    fn runaway_interest_stops_at_month_cap() {
        let debts = vec![debt("Payday", 10_000.0, 60.0, 100.0)];
        let report = simulate_payoff(&debts, 0.0, PayoffStrategy::Snowball);
        assert_eq!(report.months, MAX_MONTHS);
        assert_eq!(report.years, 50);
        assert_eq!(report.remaining_months, 0);
        assert_approx(report.total_paid, 100.0 * MAX_MONTHS as f64);
    }

    #[test]
    fn negative_or_non_finite_extra_is_treated_as_zero() {
        let debts = two_debts();
        let baseline = simulate_payoff(&debts, 0.0, PayoffStrategy::Avalanche);
        assert_eq!(
            simulate_payoff(&debts, -50.0, PayoffStrategy::Avalanche),
            baseline
        );
        assert_eq!(
            simulate_payoff(&debts, f64::NAN, PayoffStrategy::Avalanche),
            baseline
        );
    }

    #[test]
    fn repeated_runs_do_not_share_state() {
        let debts = two_debts();
        let first = simulate_payoff(&debts, 75.0, PayoffStrategy::Snowball);
        let second = simulate_payoff(&debts, 75.0, PayoffStrategy::Snowball);
        assert_eq!(first, second);
        assert_eq!(debts, two_debts());
    }

    #[test]
    fn schedule_agrees_with_report() {
        let debts = two_debts();
        let report = simulate_payoff(&debts, 120.0, PayoffStrategy::Snowball);
        let schedule = run_payoff_schedule(&debts, 120.0, PayoffStrategy::Snowball);
        assert_eq!(schedule.len(), report.months as usize);
        assert_eq!(
            schedule.last().map(|m| m.total_paid),
            Some(report.total_paid)
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_runs_terminate_and_interest_identity_holds(
            raw in vec((1u32..50_000, 0u32..4_000, 1u32..2_000), 1..6),
            extra in 0u32..3_000,
            snowball in proptest::bool::ANY
        ) {
            let debts: Vec<Debt> = raw
                .iter()
                .enumerate()
                .map(|(i, (balance, rate_bp, min))| {
                    debt(&format!("d{i}"), *balance as f64, *rate_bp as f64 / 100.0, *min as f64)
                })
                .collect();
            let strategy = if snowball { PayoffStrategy::Snowball } else { PayoffStrategy::Avalanche };

            let report = simulate_payoff(&debts, extra as f64, strategy);
            let original: f64 = debts.iter().map(|d| d.balance).sum();

            prop_assert!(report.months <= MAX_MONTHS);
            prop_assert_eq!(report.total_interest, report.total_paid - original);
            prop_assert_eq!(report.years * 12 + report.remaining_months, report.months);
            prop_assert!(report.total_paid.is_finite());
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_more_extra_never_lengthens_a_single_debt_run(
            balance in 1u32..40_000,
            rate_bp in 0u32..3_000,
            min in 1u32..1_500,
            extra in 0u32..2_000,
            bump in 0u32..2_000
        ) {
            let debts = vec![debt("solo", balance as f64, rate_bp as f64 / 100.0, min as f64)];
            let lower = simulate_payoff(&debts, extra as f64, PayoffStrategy::Avalanche);
            let higher = simulate_payoff(&debts, (extra + bump) as f64, PayoffStrategy::Avalanche);
            prop_assert!(higher.months <= lower.months);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_strategies_agree_without_extra_payment(
            raw in vec((1u32..20_000, 1u32..1_000), 1..6)
        ) {
            // Zero-rate integer debts never leave sub-cent residue, so no
            // rollover can be triggered without extra funds.
            let debts: Vec<Debt> = raw
                .iter()
                .enumerate()
                .map(|(i, (balance, min))| debt(&format!("d{i}"), *balance as f64, 0.0, *min as f64))
                .collect();

            let avalanche = simulate_payoff(&debts, 0.0, PayoffStrategy::Avalanche);
            let snowball = simulate_payoff(&debts, 0.0, PayoffStrategy::Snowball);
            prop_assert_eq!(avalanche.months, snowball.months);
            prop_assert_eq!(avalanche.total_paid, snowball.total_paid);
        }
    }
}
