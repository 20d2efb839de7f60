use super::types::{FinancialSnapshot, HealthReport, ScoreComponent, ScoreRating};

const SAVINGS_MAX: u32 = 40;
const DEBT_MAX: u32 = 30;
const EMERGENCY_MAX: u32 = 30;

/// Scores a snapshot out of 100. `None` when there is no income to score against.
pub fn score_health(snapshot: &FinancialSnapshot) -> Option<HealthReport> {
    let income = snapshot.monthly_income;
    if income == 0.0 {
        return None;
    }
    let expenses = snapshot.monthly_expenses;

    let savings_rate = (income - expenses) / income * 100.0;
    let savings_score = if savings_rate >= 20.0 {
        40
    } else if savings_rate >= 15.0 {
        35
    } else if savings_rate >= 10.0 {
        25
    } else if savings_rate >= 5.0 {
        15
    } else if savings_rate > 0.0 {
        5
    } else {
        0
    };

    let annual_income = income * 12.0;
    let debt_ratio = if annual_income > 0.0 {
        snapshot.debts / annual_income * 100.0
    } else {
        0.0
    };
    let debt_score = if debt_ratio == 0.0 {
        30
    } else if debt_ratio < 10.0 {
        25
    } else if debt_ratio < 20.0 {
        20
    } else if debt_ratio < 36.0 {
        10
    } else {
        0
    };

    let months_of_expenses = if expenses > 0.0 {
        snapshot.savings / expenses
    } else {
        0.0
    };
    let emergency_score = if months_of_expenses >= 6.0 {
        30
    } else if months_of_expenses >= 3.0 {
        20
    } else if months_of_expenses >= 1.0 {
        10
    } else if months_of_expenses > 0.0 {
        5
    } else {
        0
    };

    Some(HealthReport {
        total: savings_score + debt_score + emergency_score,
        savings_rate: ScoreComponent {
            value: savings_rate,
            score: savings_score,
            max: SAVINGS_MAX,
        },
        debt_ratio: ScoreComponent {
            value: debt_ratio,
            score: debt_score,
            max: DEBT_MAX,
        },
        emergency_fund: ScoreComponent {
            value: months_of_expenses,
            score: emergency_score,
            max: EMERGENCY_MAX,
        },
    })
}

pub fn rate_score(total: u32) -> ScoreRating {
    match total {
        80.. => ScoreRating::Excellent,
        60..=79 => ScoreRating::Good,
        40..=59 => ScoreRating::Fair,
        _ => ScoreRating::NeedsImprovement,
    }
}

/// Up to three suggestions, one per weak area, or a single encouragement.
pub fn improvement_tips(report: &HealthReport) -> Vec<String> {
    let mut tips = Vec::with_capacity(3);

    if report.savings_rate.score < 30 {
        tips.push(format!(
            "Increase your savings rate: Currently saving {:.1}%, aim for 15-20%",
            report.savings_rate.value
        ));
    }
    if report.debt_ratio.score < 20 && report.debt_ratio.value > 0.0 {
        tips.push(format!(
            "Reduce debt: Current debt is {:.1}% of annual income, target below 20%",
            report.debt_ratio.value
        ));
    }
    if report.emergency_fund.score < 20 {
        tips.push(format!(
            "Build emergency fund: Currently {:.1} months of expenses, target 6 months",
            report.emergency_fund.value
        ));
    }

    if tips.is_empty() {
        tips.push("Great work! Keep maintaining these healthy financial habits.".to_string());
    }
    tips
}
