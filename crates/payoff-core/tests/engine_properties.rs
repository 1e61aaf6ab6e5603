use chrono::NaiveDate;
use payoff_core::loans::payment::{compute_monthly_payment, LoanTerms};
use payoff_core::loans::payoff::{months_to_payoff, project_payoff, project_payoff_simulated};
use payoff_core::loans::schedule::{simulate_amortization, AmortizationInput};
use payoff_core::loans::what_if::required_payment;
use payoff_core::{PayoffError, HORIZON_MONTHS};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 31).unwrap()
}

const CASES: [(Decimal, Decimal, Decimal); 6] = [
    (dec!(5000), dec!(5), dec!(428.04)),
    (dec!(18500), dec!(19.99), dec!(450)),
    (dec!(240000), dec!(6.5), dec!(1600)),
    (dec!(3200), dec!(29.99), dec!(95)),
    (dec!(750), dec!(0.5), dec!(25)),
    (dec!(99999.99), dec!(3.25), dec!(1000)),
];

#[test]
fn closed_form_month_count_agrees_with_simulation() {
    for (balance, rate, payment) in CASES {
        let schedule =
            simulate_amortization(&AmortizationInput::new(balance, rate, payment)).unwrap();
        let projected = project_payoff(balance, rate, payment, as_of()).unwrap();
        assert!(
            projected.total_months.abs_diff(schedule.months) <= 1,
            "{balance} @ {rate}% paying {payment}: closed form {} vs simulated {}",
            projected.total_months,
            schedule.months
        );
        assert!((projected.total_interest - schedule.total_interest).abs() <= dec!(0.01));
    }
}

#[test]
fn zero_rate_quote_is_even_split() {
    let payment = compute_monthly_payment(&LoanTerms::new(dec!(1200), dec!(0), 12)).unwrap();
    assert_eq!(payment, dec!(100.00));
}

#[test]
fn simulated_balance_never_rises() {
    for (balance, rate, payment) in CASES {
        let schedule =
            simulate_amortization(&AmortizationInput::new(balance, rate, payment)).unwrap();
        assert!(schedule
            .rows
            .windows(2)
            .all(|w| w[1].remaining_balance <= w[0].remaining_balance));
        assert!(schedule.rows.iter().all(|r| r.remaining_balance >= Decimal::ZERO));
    }
}

#[test]
fn payment_below_interest_is_rejected_immediately() {
    let result = simulate_amortization(&AmortizationInput::new(dec!(1000), dec!(24), dec!(15)));
    assert!(matches!(result, Err(PayoffError::PaymentTooLow { .. })));
}

#[test]
fn known_fixed_payment() {
    let payment = compute_monthly_payment(&LoanTerms::new(dec!(5000), dec!(5), 12)).unwrap();
    assert_eq!(payment, dec!(428.04));
}

#[test]
fn horizon_is_inclusive_of_month_600() {
    assert_eq!(HORIZON_MONTHS, 600);

    let schedule =
        simulate_amortization(&AmortizationInput::new(dec!(6000), dec!(0), dec!(10))).unwrap();
    assert_eq!(schedule.months, 600);
    assert_eq!(months_to_payoff(dec!(6000), dec!(0), dec!(10)).unwrap(), 600);

    let over = dec!(6000.01);
    assert!(matches!(
        simulate_amortization(&AmortizationInput::new(over, dec!(0), dec!(10))),
        Err(PayoffError::PayoffExceedsHorizon { horizon_months: 600 })
    ));
    assert!(matches!(
        project_payoff(over, dec!(0), dec!(10), as_of()),
        Err(PayoffError::PayoffExceedsHorizon { horizon_months: 600 })
    ));
}

#[test]
fn horizon_boundary_agrees_at_positive_rate() {
    let exact = dec!(526.41);
    let schedule =
        simulate_amortization(&AmortizationInput::new(dec!(100000), dec!(6), exact)).unwrap();
    assert_eq!(schedule.months, 600);
    assert_eq!(months_to_payoff(dec!(100000), dec!(6), exact).unwrap(), 600);

    let short = dec!(526.40);
    assert!(matches!(
        simulate_amortization(&AmortizationInput::new(dec!(100000), dec!(6), short)),
        Err(PayoffError::PayoffExceedsHorizon { horizon_months: 600 })
    ));
    assert!(matches!(
        months_to_payoff(dec!(100000), dec!(6), short),
        Err(PayoffError::PayoffExceedsHorizon { horizon_months: 600 })
    ));
}

#[test]
fn required_payment_round_trip() {
    for (balance, r1, r2, n) in [
        (dec!(10000), dec!(6), dec!(9), 36),
        (dec!(20000), dec!(5), dec!(8), 48),
        (dec!(250000), dec!(4), dec!(6.5), 360),
    ] {
        let current = compute_monthly_payment(&LoanTerms::new(balance, r1, n)).unwrap();
        let new_payment = required_payment(balance, r1, r2, current).unwrap();
        let projected = project_payoff(balance, r2, new_payment, as_of()).unwrap();
        assert!(
            projected.total_months.abs_diff(n) <= 1,
            "{balance}: {r1}% -> {r2}% took {} months, expected {n}",
            projected.total_months
        );
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    for (balance, rate, payment) in CASES {
        let a = serde_json::to_string(&project_payoff(balance, rate, payment, as_of()).unwrap()).unwrap();
        let b = serde_json::to_string(&project_payoff(balance, rate, payment, as_of()).unwrap()).unwrap();
        assert_eq!(a, b);

        let input = AmortizationInput::new(balance, rate, payment);
        let a = serde_json::to_string(&simulate_amortization(&input).unwrap()).unwrap();
        let b = serde_json::to_string(&simulate_amortization(&input).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn simulated_projection_dates_match_closed_form() {
    for (balance, rate, payment) in CASES {
        let closed = project_payoff(balance, rate, payment, as_of()).unwrap();
        let simulated = project_payoff_simulated(balance, rate, payment, as_of()).unwrap();
        if closed.total_months == simulated.total_months {
            assert_eq!(closed.payoff_date, simulated.payoff_date);
        }
    }
}
