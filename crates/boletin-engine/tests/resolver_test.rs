mod common;

use boletin_core::credentials::Credentials;
use boletin_core::error::WorkflowError;
use boletin_core::strategy::{FieldValue, Locator, ResolutionStrategy};
use boletin_engine::resolver::ElementResolver;
use common::MockBackend;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(30);

fn strategies() -> Vec<ResolutionStrategy> {
    vec![
        ResolutionStrategy::click(Locator::css("#first")),
        ResolutionStrategy::click(Locator::text("second")),
        ResolutionStrategy::click(Locator::attr("href", "third")),
    ]
}

#[tokio::test]
async fn first_satisfiable_strategy_wins_regardless_of_position() {
    let strategies = strategies();
    for (position, strategy) in strategies.iter().enumerate() {
        let mut backend = MockBackend::visible_only(&[&strategy.locator]);
        let resolved = ElementResolver::resolve(&mut backend, "target", &strategies, TIMEOUT)
            .await
            .expect("exactly one strategy is satisfiable");
        assert_eq!(resolved.strategy_index, position);
        assert_eq!(resolved.strategy.locator, strategy.locator);
    }
}

#[tokio::test]
async fn probe_error_falls_through_to_next_strategy() {
    let strategies = strategies();
    let mut backend =
        MockBackend::visible_only(&[&strategies[1].locator]).with_probe_errors(&["css:#first"]);
    let resolved = ElementResolver::resolve(&mut backend, "target", &strategies, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(resolved.strategy_index, 1);
}

#[tokio::test]
async fn exhaustion_reports_every_strategy_tried() {
    let strategies = strategies();
    let mut backend = MockBackend::visible_only(&[]);
    let err = ElementResolver::resolve(&mut backend, "login button", &strategies, TIMEOUT)
        .await
        .unwrap_err();
    match err {
        WorkflowError::ElementNotFound {
            description,
            strategies_tried,
        } => {
            assert_eq!(description, "login button");
            assert_eq!(
                strategies_tried,
                vec!["css:#first", "text:second", "attr:href*=third"]
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn resolve_is_a_pure_query() {
    let strategies = strategies();
    let mut backend = MockBackend::default();
    ElementResolver::resolve(&mut backend, "target", &strategies, TIMEOUT)
        .await
        .unwrap();
    assert!(backend.clicks.is_empty());
    assert!(backend.hovers.is_empty());
    assert!(backend.fills.is_empty());
}

#[tokio::test]
async fn resolve_and_act_clicks_the_matched_locator() {
    let strategies = strategies();
    let creds = Credentials::new("12.345.678-9", "clave");
    let mut backend = MockBackend::visible_only(&[&strategies[2].locator]);
    let resolved = ElementResolver::resolve_and_act(
        &mut backend,
        "target",
        &strategies,
        TIMEOUT,
        &creds,
        Duration::ZERO,
    )
    .await
    .unwrap();
    assert_eq!(resolved.strategy_index, 2);
    assert_eq!(backend.clicks, vec!["attr:href*=third"]);
}

#[tokio::test]
async fn resolve_and_act_fills_credential_text() {
    let strategies = vec![
        ResolutionStrategy::fill(Locator::css("#rutcntr"), FieldValue::Identity),
        ResolutionStrategy::fill(Locator::css("#clave"), FieldValue::Secret),
    ];
    let creds = Credentials::new("12.345.678-9", "hunter2");
    let mut backend = MockBackend::default();
    ElementResolver::resolve_and_act(
        &mut backend,
        "rut field",
        &strategies,
        TIMEOUT,
        &creds,
        Duration::ZERO,
    )
    .await
    .unwrap();
    assert_eq!(
        backend.fills,
        vec![("css:#rutcntr".to_string(), "12.345.678-9".to_string())]
    );
}

#[tokio::test]
async fn hover_then_click_does_both() {
    let strategies = vec![ResolutionStrategy::hover_click(Locator::css("#menu"))];
    let creds = Credentials::new("1-9", "x");
    let mut backend = MockBackend::default();
    ElementResolver::resolve_and_act(
        &mut backend,
        "menu",
        &strategies,
        TIMEOUT,
        &creds,
        Duration::ZERO,
    )
    .await
    .unwrap();
    assert_eq!(backend.hovers, vec!["css:#menu"]);
    assert_eq!(backend.clicks, vec!["css:#menu"]);
}
