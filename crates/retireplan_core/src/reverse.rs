//! Reverse calculation: the portfolio needed for a desired after-tax income
//!
//! Each risk profile is solved independently for its required portfolio.
//! When current savings are supplied the result also carries a funding gap
//! per profile and, with an annual savings figure, a linear savings roadmap.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::{Assumptions, ProfilePreset};
use crate::early_retirement::{evaluate_roth_ladder, total_penalties};
use crate::error::{PlannerError, Result};
use crate::format::format_currency_whole;
use crate::model::{
    GapAnalysis, HistoricalSeries, ProfileGap, ProfileRoadmap, ReverseCalculationResult,
    ReverseRequest, RiskProfile, RiskProfileScenario, RothLadderPlan, SavingsRoadmap,
};
use crate::optimization::{PortfolioGoal, after_tax_income_for, solve_required_portfolio};
use crate::progress::SweepProgress;
use crate::simulation::aggregate_over_all_windows;
use crate::taxes::{ordinary_income_tax, to_money};
use crate::withdrawal::effective_rate_pct;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Presets to solve: every configured profile, or only the preferred one
fn selected_presets(request: &ReverseRequest, assumptions: &Assumptions) -> Vec<ProfilePreset> {
    match request.preferred_risk_profile {
        Some(profile) => assumptions.preset(profile).copied().into_iter().collect(),
        None => assumptions.risk_profiles.clone(),
    }
}

/// Solve one risk profile end to end
pub fn solve_scenario(
    series: &HistoricalSeries,
    request: &ReverseRequest,
    preset: &ProfilePreset,
    assumptions: &Assumptions,
    progress: &SweepProgress,
) -> Result<RiskProfileScenario> {
    let goal = PortfolioGoal {
        desired_after_tax_income: request.desired_after_tax_income,
        retirement_age: request.retirement_age,
        current_age: request.current_age,
        target_success_rate: preset.target_success_rate,
        stock_allocation: preset.stock_allocation,
    };
    let duration_years = assumptions
        .retirement_duration(request.retirement_age)
        .ok_or(PlannerError::InvalidDuration {
            retirement_age: request.retirement_age,
            life_expectancy: assumptions.life_expectancy,
        })?;

    let solution = solve_required_portfolio(series, &goal, assumptions, progress)?;
    let portfolio = solution.portfolio;
    if portfolio <= 0.0 {
        return Err(PlannerError::Computation(format!(
            "no positive portfolio found for the {} profile",
            preset.profile
        )));
    }

    // Detail at the solved size; the whole portfolio is treated as tax-deferred
    let probe = after_tax_income_for(series, portfolio, &goal, duration_years, assumptions, progress)?;
    let gross = probe.gross_withdrawal;

    let early = request.retirement_age < assumptions.penalty_check_age;
    let penalty = early.then(|| total_penalties(request.retirement_age, duration_years, gross));
    let roth_ladder: Option<RothLadderPlan> = penalty
        .as_ref()
        .filter(|p| p.years_with_penalty > 0)
        .map(|p| {
            evaluate_roth_ladder(
                request.retirement_age,
                gross,
                ordinary_income_tax(gross),
                p.total_penalty,
                p.years_with_penalty,
            )
        });

    let statistics = aggregate_over_all_windows(
        series,
        portfolio,
        probe.withdrawal_rate,
        duration_years,
        preset.stock_allocation,
        progress,
    )?;

    let stock_allocation_pct = (preset.stock_allocation * 100.0).round() as u32;
    let recommendation =
        scenario_recommendation(preset.profile, statistics.success_rate, roth_ladder.as_ref());

    tracing::info!(
        profile = %preset.profile,
        portfolio,
        rate = probe.withdrawal_rate,
        success_rate = statistics.success_rate,
        termination = ?solution.termination_reason,
        "risk profile solved"
    );

    Ok(RiskProfileScenario {
        risk_profile: preset.profile,
        required_portfolio_size: to_money(portfolio),
        withdrawal_rate_pct: round2(probe.withdrawal_rate * 100.0),
        annual_pre_tax_withdrawal: gross,
        annual_after_tax_income: probe.after_tax_income.round_dp(2),
        estimated_annual_taxes: probe.tax,
        effective_tax_rate_pct: effective_rate_pct(probe.tax, gross),
        historical_success_rate: round2(statistics.success_rate),
        stock_allocation_pct,
        bond_allocation_pct: 100u32.saturating_sub(stock_allocation_pct),
        median_final_value: to_money(statistics.median_final_value),
        worst_case_final_value: to_money(statistics.worst_case_final_value),
        best_case_final_value: to_money(statistics.best_case_final_value),
        penalty,
        roth_ladder,
        recommendation,
    })
}

fn scenario_recommendation(
    profile: RiskProfile,
    success_rate: f64,
    roth_ladder: Option<&RothLadderPlan>,
) -> String {
    let mut text = format!("{profile} strategy has {success_rate:.1}% historical success rate. ");
    if let Some(plan) = roth_ladder.filter(|p| p.is_recommended) {
        text.push_str(&format!(
            "Consider Roth conversion ladder to save {} in penalties.",
            format_currency_whole(plan.estimated_savings)
        ));
    }
    text
}

fn gap_analysis(request: &ReverseRequest, scenarios: &[RiskProfileScenario]) -> GapAnalysis {
    let current = to_money(request.current_total_savings());
    let per_profile = scenarios
        .iter()
        .map(|s| ProfileGap {
            risk_profile: s.risk_profile,
            required: s.required_portfolio_size,
            gap: s.required_portfolio_size - current,
        })
        .collect::<Vec<_>>();

    // Savings that round to zero cents cannot close a gap
    let savings_roadmap = request
        .annual_savings
        .map(to_money)
        .filter(|savings| *savings > Decimal::ZERO)
        .map(|savings| savings_roadmap(request, savings, &per_profile));

    GapAnalysis {
        current_total_savings: current,
        per_profile,
        savings_roadmap,
    }
}

/// Whole years of `annual_savings` needed to cover `gap`, saturating at `u32::MAX`
fn years_to_close(gap: Decimal, annual_savings: Decimal) -> u32 {
    gap.checked_div(annual_savings)
        .and_then(|years| years.ceil().to_u32())
        .unwrap_or(u32::MAX)
}

fn savings_roadmap(
    request: &ReverseRequest,
    annual_savings: Decimal,
    gaps: &[ProfileGap],
) -> SavingsRoadmap {
    let years_until_retirement = request.retirement_age.saturating_sub(request.current_age);
    let months = Decimal::from(years_until_retirement) * Decimal::from(12);

    let monthly_for = |gap: Decimal| {
        (years_until_retirement > 0 && gap > Decimal::ZERO).then(|| gap / months)
    };

    let per_profile = gaps
        .iter()
        .map(|g| ProfileRoadmap {
            risk_profile: g.risk_profile,
            years_to_goal: (g.gap > Decimal::ZERO).then(|| years_to_close(g.gap, annual_savings)),
            required_monthly_savings: monthly_for(g.gap).map(|m| m.round_dp(2)),
        })
        .collect::<Vec<_>>();

    let moderate_gap = gaps.iter().find(|g| g.risk_profile == RiskProfile::Moderate);
    let moderate_years = per_profile
        .iter()
        .find(|p| p.risk_profile == RiskProfile::Moderate)
        .and_then(|p| p.years_to_goal);
    let moderate_monthly = moderate_gap.and_then(|g| monthly_for(g.gap));

    let recommendation = match (moderate_years, moderate_monthly) {
        (Some(years), _) if years <= years_until_retirement => format!(
            "At your current savings rate, you'll reach the Moderate goal in {years} years, \
             before your planned retirement."
        ),
        (_, Some(monthly)) => format!(
            "To reach the Moderate goal by retirement, save {} per month ({} annually).",
            format_currency_whole(monthly),
            format_currency_whole(monthly * Decimal::from(12))
        ),
        _ => "Increase your annual savings to reach your retirement goals on time.".to_string(),
    };

    SavingsRoadmap {
        annual_savings,
        years_until_retirement,
        per_profile,
        recommendation,
    }
}

fn summary(
    request: &ReverseRequest,
    scenarios: &[RiskProfileScenario],
    gap_analysis: Option<&GapAnalysis>,
) -> String {
    let Some(headline) = scenarios
        .iter()
        .find(|s| s.risk_profile == RiskProfile::Moderate)
        .or_else(|| scenarios.first())
    else {
        return "Unable to calculate required portfolio. Please adjust your inputs.".to_string();
    };

    let mut text = format!(
        "To generate {} per year after taxes in retirement, you need approximately {} \
         (based on {} strategy with {:.1}% success rate).",
        format_currency_whole(to_money(request.desired_after_tax_income)),
        format_currency_whole(headline.required_portfolio_size),
        headline.risk_profile,
        headline.historical_success_rate,
    );

    if let Some(analysis) = gap_analysis.filter(|a| a.current_total_savings > Decimal::ZERO) {
        let current = format_currency_whole(analysis.current_total_savings);
        let gap = analysis
            .gap_for(headline.risk_profile)
            .map_or(Decimal::ZERO, |g| g.gap);
        if gap > Decimal::ZERO {
            text.push_str(&format!(
                " You currently have {current} saved, leaving a gap of {}.",
                format_currency_whole(gap)
            ));
        } else {
            text.push_str(&format!(
                " Good news: Your current savings of {current} exceeds this requirement!"
            ));
        }
    }

    text
}

/// Required portfolio per risk profile, with gap analysis and a savings roadmap.
///
/// The request is validated first. A profile that fails to solve is logged and
/// omitted; cancellation aborts the whole calculation. No solvable profile is
/// an explicit empty state, not an error.
pub fn reverse_calculate(
    series: &HistoricalSeries,
    request: &ReverseRequest,
    assumptions: &Assumptions,
    progress: &SweepProgress,
) -> Result<ReverseCalculationResult> {
    request.validate()?;

    let presets = selected_presets(request, assumptions);
    tracing::info!(
        profiles = presets.len(),
        desired_income = request.desired_after_tax_income,
        retirement_age = request.retirement_age,
        "starting reverse calculation"
    );

    #[cfg(feature = "parallel")]
    let solved: Vec<(RiskProfile, Result<RiskProfileScenario>)> = presets
        .par_iter()
        .map(|preset| {
            (
                preset.profile,
                solve_scenario(series, request, preset, assumptions, progress),
            )
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let solved: Vec<(RiskProfile, Result<RiskProfileScenario>)> = presets
        .iter()
        .map(|preset| {
            (
                preset.profile,
                solve_scenario(series, request, preset, assumptions, progress),
            )
        })
        .collect();

    let mut scenarios = Vec::with_capacity(solved.len());
    for (profile, result) in solved {
        match result {
            Ok(scenario) => scenarios.push(scenario),
            Err(PlannerError::Cancelled) => return Err(PlannerError::Cancelled),
            Err(e) => tracing::warn!(%profile, error = %e, "risk profile omitted"),
        }
    }

    let gap_analysis = request
        .has_current_savings()
        .then(|| gap_analysis(request, &scenarios));
    let summary = summary(request, &scenarios, gap_analysis.as_ref());

    Ok(ReverseCalculationResult {
        scenarios,
        gap_analysis,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::model::MarketYear;

    fn steady_series() -> HistoricalSeries {
        HistoricalSeries::new(
            (1926..2026)
                .map(|year| MarketYear {
                    year,
                    equity_return: 0.08,
                    bond_return: 0.04,
                    inflation: 0.02,
                })
                .collect(),
        )
        .unwrap()
    }

    fn request() -> ReverseRequest {
        ReverseRequest {
            desired_after_tax_income: 60_000.0,
            current_age: 40,
            retirement_age: 65,
            success_rate_threshold: 0.90,
            current_retirement_account_balance: None,
            current_taxable_account_balance: None,
            annual_savings: None,
            preferred_risk_profile: None,
        }
    }

    fn scenario(profile: RiskProfile, required: Decimal) -> RiskProfileScenario {
        RiskProfileScenario {
            risk_profile: profile,
            required_portfolio_size: required,
            withdrawal_rate_pct: 4.0,
            annual_pre_tax_withdrawal: Decimal::ZERO,
            annual_after_tax_income: Decimal::ZERO,
            estimated_annual_taxes: Decimal::ZERO,
            effective_tax_rate_pct: Decimal::ZERO,
            historical_success_rate: 92.5,
            stock_allocation_pct: 60,
            bond_allocation_pct: 40,
            median_final_value: Decimal::ZERO,
            worst_case_final_value: Decimal::ZERO,
            best_case_final_value: Decimal::ZERO,
            penalty: None,
            roth_ladder: None,
            recommendation: String::new(),
        }
    }

    #[test]
    fn test_all_profiles_solved() {
        let result = reverse_calculate(
            &steady_series(),
            &request(),
            &Assumptions::default(),
            &SweepProgress::default(),
        )
        .unwrap();

        assert_eq!(result.scenarios.len(), 3);
        assert!(result.gap_analysis.is_none());
        for scenario in &result.scenarios {
            assert!(scenario.penalty.is_none());
            assert!(scenario.roth_ladder.is_none());
            assert_eq!(
                scenario.stock_allocation_pct + scenario.bond_allocation_pct,
                100
            );
            assert!(scenario.recommendation.starts_with(scenario.risk_profile.name()));
        }
        let aggressive = result.scenario_for(RiskProfile::Aggressive).unwrap();
        assert_eq!(aggressive.bond_allocation_pct, 20);
        assert!(result.summary.starts_with("To generate $60,000 per year after taxes"));
        assert!(result.summary.contains("based on Moderate strategy"));
    }

    #[test]
    fn test_preferred_profile_only() {
        let mut req = request();
        req.preferred_risk_profile = Some(RiskProfile::Conservative);
        let result = reverse_calculate(
            &steady_series(),
            &req,
            &Assumptions::default(),
            &SweepProgress::default(),
        )
        .unwrap();
        assert_eq!(result.scenarios.len(), 1);
        assert_eq!(result.scenarios[0].risk_profile, RiskProfile::Conservative);
        assert!(result.summary.contains("based on Conservative strategy"));
    }

    #[test]
    fn test_early_retirement_carries_penalty_and_ladder() {
        let mut req = request();
        req.current_age = 35;
        req.retirement_age = 50;
        req.preferred_risk_profile = Some(RiskProfile::Moderate);
        let result = reverse_calculate(
            &steady_series(),
            &req,
            &Assumptions::default(),
            &SweepProgress::default(),
        )
        .unwrap();

        let scenario = &result.scenarios[0];
        let penalty = scenario.penalty.as_ref().unwrap();
        assert_eq!(penalty.years_with_penalty, 10);
        assert_eq!(
            penalty.total_penalty,
            scenario.annual_pre_tax_withdrawal * dec!(0.10) * dec!(10)
        );
        let ladder = scenario.roth_ladder.as_ref().unwrap();
        assert_eq!(ladder.year_by_year_schedule.len(), 15);
        assert!(ladder.requires_immediate_funds);
    }

    #[test]
    fn test_invalid_request_is_rejected_before_solving() {
        let mut req = request();
        req.retirement_age = 40;
        let err = reverse_calculate(
            &steady_series(),
            &req,
            &Assumptions::default(),
            &SweepProgress::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));
    }

    #[test]
    fn test_unsolvable_profiles_are_omitted() {
        // Life expectancy at the retirement age leaves no retirement years
        let assumptions = Assumptions {
            life_expectancy: 65,
            ..Assumptions::default()
        };
        let result = reverse_calculate(
            &steady_series(),
            &request(),
            &assumptions,
            &SweepProgress::default(),
        )
        .unwrap();
        assert!(result.scenarios.is_empty());
        assert_eq!(
            result.summary,
            "Unable to calculate required portfolio. Please adjust your inputs."
        );
    }

    #[test]
    fn test_cancellation_propagates() {
        let progress = SweepProgress::default();
        progress.cancel();
        let err = reverse_calculate(
            &steady_series(),
            &request(),
            &Assumptions::default(),
            &progress,
        )
        .unwrap_err();
        assert_eq!(err, PlannerError::Cancelled);
    }

    #[test]
    fn test_gap_and_roadmap() {
        let mut req = request();
        req.current_retirement_account_balance = Some(300_000.0);
        req.current_taxable_account_balance = Some(100_000.0);
        req.annual_savings = Some(50_000.0);
        let scenarios = vec![
            scenario(RiskProfile::Conservative, dec!(2000000)),
            scenario(RiskProfile::Moderate, dec!(1500000)),
            scenario(RiskProfile::Aggressive, dec!(300000)),
        ];

        let analysis = gap_analysis(&req, &scenarios);
        assert_eq!(analysis.current_total_savings, dec!(400000));
        assert_eq!(analysis.gap_for(RiskProfile::Moderate).unwrap().gap, dec!(1100000));
        assert_eq!(analysis.gap_for(RiskProfile::Aggressive).unwrap().gap, dec!(-100000));

        let roadmap = analysis.savings_roadmap.as_ref().unwrap();
        assert_eq!(roadmap.years_until_retirement, 25);
        let moderate = &roadmap.per_profile[1];
        assert_eq!(moderate.years_to_goal, Some(22));
        assert_eq!(moderate.required_monthly_savings, Some(dec!(3666.67)));
        let aggressive = &roadmap.per_profile[2];
        assert_eq!(aggressive.years_to_goal, None);
        assert_eq!(aggressive.required_monthly_savings, None);
        assert_eq!(
            roadmap.recommendation,
            "At your current savings rate, you'll reach the Moderate goal in 22 years, \
             before your planned retirement."
        );

        let text = summary(&req, &scenarios, Some(&analysis));
        assert!(text.ends_with(" You currently have $400,000 saved, leaving a gap of $1,100,000."));
    }

    #[test]
    fn test_roadmap_asks_for_monthly_savings() {
        let mut req = request();
        req.current_taxable_account_balance = Some(0.0);
        req.annual_savings = Some(10_000.0);
        let scenarios = vec![scenario(RiskProfile::Moderate, dec!(1500000))];

        let analysis = gap_analysis(&req, &scenarios);
        let roadmap = analysis.savings_roadmap.unwrap();
        assert_eq!(
            roadmap.recommendation,
            "To reach the Moderate goal by retirement, save $5,000 per month ($60,000 annually)."
        );
    }

    #[test]
    fn test_sub_cent_savings_skip_roadmap() {
        let mut req = request();
        req.current_taxable_account_balance = Some(0.0);
        req.annual_savings = Some(0.001);
        let scenarios = vec![scenario(RiskProfile::Moderate, dec!(1500000))];

        let analysis = gap_analysis(&req, &scenarios);
        assert!(analysis.savings_roadmap.is_none());
        assert_eq!(analysis.gap_for(RiskProfile::Moderate).unwrap().gap, dec!(1500000));
    }

    #[test]
    fn test_tiny_savings_saturate_years_to_goal() {
        let mut req = request();
        req.current_taxable_account_balance = Some(0.0);
        req.annual_savings = Some(0.01);
        let scenarios = vec![scenario(RiskProfile::Moderate, dec!(9000000000000))];

        let roadmap = gap_analysis(&req, &scenarios).savings_roadmap.unwrap();
        assert_eq!(roadmap.per_profile[0].years_to_goal, Some(u32::MAX));
        assert!(roadmap.recommendation.starts_with("To reach the Moderate goal by retirement"));
        assert_eq!(years_to_close(dec!(100), dec!(30)), 4);
    }

    #[test]
    fn test_summary_when_over_funded() {
        let mut req = request();
        req.current_taxable_account_balance = Some(2_000_000.0);
        let scenarios = vec![scenario(RiskProfile::Moderate, dec!(1500000))];
        let analysis = gap_analysis(&req, &scenarios);
        assert!(analysis.savings_roadmap.is_none());

        let text = summary(&req, &scenarios, Some(&analysis));
        assert_eq!(
            text,
            "To generate $60,000 per year after taxes in retirement, you need approximately \
             $1,500,000 (based on Moderate strategy with 92.5% success rate). \
             Good news: Your current savings of $2,000,000 exceeds this requirement!"
        );
    }
}
