use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::api::{
    HealthResponse, PlanResponse, ScheduleResponse, build_health_response, build_plan_response,
    build_schedule_response, run_http_server,
};
use crate::config::{DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_PORT, ServerConfig};
use crate::core::{DebtEntry, FinancialSnapshot, PayoffReport, PayoffStrategy, parse_amount};
use crate::telemetry;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Avalanche,
    Snowball,
}

impl From<CliStrategy> for PayoffStrategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Avalanche => PayoffStrategy::Avalanche,
            CliStrategy::Snowball => PayoffStrategy::Snowball,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "smartmoney",
    about = "Debt payoff planner and financial health scorer"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API over HTTP
    Serve(ServeArgs),
    /// Score a household's financial health out of 100
    Score(ScoreArgs),
    /// Compare avalanche and snowball payoff for the current and recommended extra payment
    Plan(PlanArgs),
    /// Print the month-by-month payoff schedule for one strategy
    Schedule(ScheduleArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, default_value = DEFAULT_HOST, help = "IP address or 'localhost'")]
    host: String,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(
        long,
        default_value = DEFAULT_LOG_LEVEL,
        help = "tracing filter, overridden by RUST_LOG"
    )]
    log_level: String,
}

#[derive(Args, Debug, Default, Clone)]
struct SnapshotArgs {
    #[arg(long, default_value_t = 0.0, help = "Monthly take-home income")]
    income: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly expenses")]
    expenses: f64,
    #[arg(long, default_value_t = 0.0, help = "Savings on hand")]
    savings: f64,
    #[arg(long, default_value_t = 0.0, help = "Total outstanding debt")]
    total_debt: f64,
}

impl SnapshotArgs {
    fn snapshot(&self) -> FinancialSnapshot {
        FinancialSnapshot {
            monthly_income: non_negative(self.income),
            monthly_expenses: non_negative(self.expenses),
            savings: non_negative(self.savings),
            debts: non_negative(self.total_debt),
        }
    }

    fn is_empty(&self) -> bool {
        self.snapshot() == FinancialSnapshot::default()
    }
}

#[derive(Args, Debug)]
struct ScoreArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,
    #[arg(long, help = "Print JSON instead of a summary")]
    json: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[arg(
        long = "debt",
        value_parser = parse_debt_arg,
        help = "NAME:BALANCE:ANNUAL_RATE_PERCENT:MIN_PAYMENT, repeatable"
    )]
    debts: Vec<DebtEntry>,
    #[arg(long, help = "Monthly extra payment; defaults to 2% of total debt")]
    extra: Option<f64>,
    #[command(flatten)]
    snapshot: SnapshotArgs,
    #[arg(long, help = "Print JSON instead of a summary")]
    json: bool,
}

#[derive(Args, Debug)]
struct ScheduleArgs {
    #[arg(long = "debt", value_parser = parse_debt_arg)]
    debts: Vec<DebtEntry>,
    #[arg(long, default_value_t = 0.0)]
    extra: f64,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
    #[arg(long, help = "Print JSON instead of a table")]
    json: bool,
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Score(args) => {
            let response = build_health_response(&args.snapshot.snapshot());
            emit(args.json, &response, render_health)
        }
        Command::Plan(args) => {
            if args.debts.is_empty() {
                return Err("at least one --debt is required".to_string());
            }
            let snapshot = (!args.snapshot.is_empty()).then(|| args.snapshot.snapshot());
            let response = build_plan_response(&args.debts, args.extra, snapshot.as_ref());
            emit(args.json, &response, render_plan)
        }
        Command::Schedule(args) => {
            let response =
                build_schedule_response(&args.debts, Some(args.extra), args.strategy.into())?;
            emit(args.json, &response, render_schedule)
        }
    }
}

async fn serve(args: ServeArgs) -> Result<(), String> {
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        log_level: args.log_level,
    };
    telemetry::init(&config.log_level).map_err(|e| e.to_string())?;
    let addr = config.socket_addr().map_err(|e| e.to_string())?;
    run_http_server(addr)
        .await
        .map_err(|e| format!("Server error: {e}"))
}

fn emit<T: Serialize>(json: bool, value: &T, render: fn(&T) -> String) -> Result<(), String> {
    let out = if json {
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode JSON: {e}"))?
    } else {
        render(value)
    };
    println!("{out}");
    Ok(())
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn parse_debt_arg(raw: &str) -> Result<DebtEntry, String> {
    // Split from the right so names may contain ':'.
    let mut fields = raw.rsplitn(4, ':');
    let (Some(min), Some(rate), Some(balance), Some(name)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(format!(
            "expected NAME:BALANCE:RATE:MIN_PAYMENT, got '{raw}'"
        ));
    };

    let number = |label: &str, value: &str| {
        parse_amount(value).ok_or_else(|| format!("invalid {label} '{value}' in '{raw}'"))
    };
    Ok(DebtEntry {
        name: name.trim().to_string(),
        balance: Some(number("balance", balance)?),
        interest_rate: Some(number("rate", rate)?),
        min_payment: Some(number("minimum payment", min)?),
    })
}

fn money(value: f64) -> String {
    format!("${value:.2}")
}

fn render_health(response: &HealthResponse) -> String {
    let (Some(score), Some(rating)) = (response.score, response.rating) else {
        return "Not enough data: enter a monthly income to get a health score.".to_string();
    };

    let mut lines = vec![
        format!("Financial health score: {}/100 ({})", score.total, rating.label()),
        format!(
            "  Savings rate    {:>2}/{}  {:.1}% of income",
            score.savings_rate.score, score.savings_rate.max, score.savings_rate.value
        ),
        format!(
            "  Debt ratio      {:>2}/{}  {:.1}% of annual income",
            score.debt_ratio.score, score.debt_ratio.max, score.debt_ratio.value
        ),
        format!(
            "  Emergency fund  {:>2}/{}  {:.1} months saved",
            score.emergency_fund.score, score.emergency_fund.max, score.emergency_fund.value
        ),
        String::new(),
    ];
    lines.extend(response.tips.iter().map(|tip| format!("- {tip}")));
    lines.join("\n")
}

fn render_report(label: &str, report: &PayoffReport) -> String {
    format!(
        "  {label:<10} {:<20} {}/mo, total {}, interest {}",
        report.duration_label(),
        money(report.monthly_payment),
        money(report.total_paid),
        money(report.total_interest)
    )
}

fn render_plan(response: &PlanResponse) -> String {
    let Some(plan) = &response.plan else {
        return "No eligible debts: each needs a balance, an interest rate and a minimum payment."
            .to_string();
    };

    [
        format!(
            "Total debt {} across {} debts, minimum payments {}/mo",
            money(plan.total_debt),
            plan.debts.len(),
            money(plan.total_min_payment)
        ),
        format!("Current plan ({} extra/mo):", money(plan.current.extra_payment)),
        render_report("Avalanche", &plan.current.avalanche),
        render_report("Snowball", &plan.current.snowball),
        format!("Recommended plan ({} extra/mo):", money(plan.recommended_extra)),
        render_report("Avalanche", &plan.recommended.avalanche),
        render_report("Snowball", &plan.recommended.snowball),
    ]
    .join("\n")
}

fn render_schedule(response: &ScheduleResponse) -> String {
    let mut lines = vec![format!(
        "{} to debt free, total paid {}, interest {}",
        response.summary.duration_label(),
        money(response.summary.total_paid),
        money(response.summary.total_interest)
    )];
    for month in &response.months {
        let balances: Vec<String> = month.balances.iter().map(|b| format!("{b:.2}")).collect();
        let target = month
            .target
            .map(|i| format!("#{}", i + 1))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:>4}  target {:<4} extra {:>10}  balances [{}]",
            month.month,
            target,
            money(month.extra_applied),
            balances.join(", ")
        ));
    }
    lines.join("\n")
}
