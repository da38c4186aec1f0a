use std::time::Duration;

use rand::SeedableRng;

use shopfront_http::retry::{JitterStrategy, RetryPlan};

#[test]
fn delay_respects_cap_and_multiplier() {
    let plan = RetryPlan::new(
        6,
        Duration::from_millis(10),
        2.0,
        Duration::from_millis(40),
        JitterStrategy::Bounded,
    )
    .expect("valid plan");
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let delay = plan.delay_for_attempt(5, &mut rng);
    assert_eq!(delay, Duration::from_millis(40));
    let first = plan.delay_for_attempt(1, &mut rng);
    assert!(first >= Duration::from_millis(10));
    assert!(first < Duration::from_millis(15));
}

#[test]
fn default_plan_allows_three_retries() {
    let plan = RetryPlan::default();
    assert_eq!(plan.max_attempts, 4);
    assert_eq!(plan.max_retries(), 3);
    assert_eq!(RetryPlan::single_attempt().max_retries(), 0);
}

#[test]
fn jitter_strategy_parses_case_insensitively() {
    assert_eq!("Bounded".parse::<JitterStrategy>().unwrap(), JitterStrategy::Bounded);
    assert_eq!("none".parse::<JitterStrategy>().unwrap(), JitterStrategy::None);
    assert!("full".parse::<JitterStrategy>().is_err());
}
