use std::sync::Arc;

use chain_calculator::{
    evaluate, CalcError, CalculatorClient, CalculatorService, CalculatorSession, Chain, Config,
    HistoryPolicy, LocalCalculator, Operator, RequestState,
};
use httpmock::prelude::*;
use serde_json::json;

fn client_for(server: &MockServer) -> CalculatorClient {
    let config = Config {
        api_base_url: server.base_url(),
        ..Config::default()
    };
    CalculatorClient::new(&config).expect("创建客户端失败")
}

#[tokio::test]
async fn test_remote_chain_session() {
    let server = MockServer::start();
    let simple = server.mock(|when, then| {
        when.method(POST)
            .path("/calculate")
            .json_body(json!({"num1": 10.0, "num2": 5.0, "operator": "+"}));
        then.status(200).json_body(json!({"result": 15.0}));
    });
    let chain = server.mock(|when, then| {
        when.method(POST).path("/calculate-chain").json_body(json!({
            "operations": [
                {"num1": 10.0, "operator": "+", "num2": 5.0},
                {"operator": "*", "num2": 2.0}
            ]
        }));
        then.status(200).json_body(json!({"result": 30.0}));
    });

    let mut session = CalculatorSession::with_chain_mode(client_for(&server), true);
    session.enter(10.0);
    session.press_operator(Operator::Add).await.unwrap();
    session.enter(5.0);
    session.press_operator(Operator::Multiply).await.unwrap();
    session.enter(2.0);

    assert_eq!(session.press_equals().await.unwrap(), Some(30.0));
    simple.assert();
    chain.assert();
}

#[tokio::test]
async fn test_remote_failure_resets_chain() {
    let server = MockServer::start();
    let _simple = server.mock(|when, then| {
        when.method(POST).path("/calculate");
        then.status(200).json_body(json!({"result": 15.0}));
    });
    let _chain = server.mock(|when, then| {
        when.method(POST).path("/calculate-chain");
        then.status(400)
            .json_body(json!({"detail": "No se puede dividir por cero"}));
    });

    let mut session = CalculatorSession::with_chain_mode(client_for(&server), true);
    session.enter(10.0);
    session.press_operator(Operator::Add).await.unwrap();
    session.enter(5.0);
    session.press_operator(Operator::Divide).await.unwrap();
    session.enter(0.0);

    let err = session.press_equals().await.unwrap_err();
    assert_eq!(
        err,
        CalcError::RemoteCalculationError("No se puede dividir por cero".to_string())
    );
    assert_eq!(session.state(), RequestState::Failed);
    assert!(session.chain().is_none());
    assert_eq!(session.current(), None);
}

#[tokio::test]
async fn test_unreachable_service_resets_chain() {
    let config = Config {
        api_base_url: "http://127.0.0.1:1".to_string(),
        ..Config::default()
    };
    let client = CalculatorClient::new(&config).unwrap();
    let mut session = CalculatorSession::with_chain_mode(client, true);

    session.enter(2.0);
    session.press_operator(Operator::Add).await.unwrap();
    session.enter(3.0);
    let err = session.press_operator(Operator::Multiply).await.unwrap_err();

    assert!(matches!(err, CalcError::Unreachable(_)));
    assert!(session.chain().is_none());
    assert_eq!(session.pending_operator(), None);
}

#[tokio::test]
async fn test_single_step_equivalence_with_local_service() {
    let calc = LocalCalculator::default();
    for op in Operator::all() {
        let (a, b) = (12.5, 4.0);
        let chained = evaluate(&Chain::single(a, op, b));
        let simple = calc.calculate_simple(a, b, op).await;
        let remote_chain = calc.calculate_chain(&Chain::single(a, op, b)).await;
        assert_eq!(chained, simple);
        assert_eq!(chained, remote_chain);
    }
}

#[tokio::test]
async fn test_history_order_and_clear() {
    let calc = Arc::new(LocalCalculator::new(HistoryPolicy::PerStep));
    let mut session = CalculatorSession::new(calc.clone());

    for (a, op, b) in [
        (1.0, Operator::Add, 2.0),
        (6.0, Operator::Divide, 3.0),
        (4.0, Operator::Subtract, 9.0),
    ] {
        session.enter(a);
        session.press_operator(op).await.unwrap();
        session.enter(b);
        session.press_equals().await.unwrap();
    }

    let history = session.history().await.unwrap();
    let results: Vec<f64> = history.iter().map(|e| e.result).collect();
    assert_eq!(results, vec![3.0, 2.0, -5.0]);

    session.clear_history().await.unwrap();
    assert!(session.history().await.unwrap().is_empty());
    session.clear_history().await.unwrap();
}

#[test]
fn test_per_chain_policy_blocking() {
    let calc = LocalCalculator::new(HistoryPolicy::PerChain);
    let chain = Chain::single(10.0, Operator::Add, 5.0)
        .then(Operator::Multiply, 2.0)
        .then(Operator::Subtract, 3.0);

    let result = tokio_test::block_on(calc.calculate_chain(&chain)).unwrap();
    assert_eq!(result, 27.0);

    let history = tokio_test::block_on(calc.get_history()).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.as_slice()[0].result, 27.0);
}
