use jsonata_mcp_core::{EvaluateRequest, JsonataEngine, NULL_OR_UNDEFINED, ToolResponse, evaluate};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn run(data: &str, expression: &str, bindings: &str) -> ToolResponse {
    let request = EvaluateRequest::new(expression)
        .with_data(data)
        .with_bindings(bindings);
    evaluate(&JsonataEngine::new(), &request).await
}

fn text(response: &ToolResponse) -> &str {
    response.first_text().expect("response has a text item")
}

#[tokio::test]
async fn test_evaluate_path_expression() {
    let data = json!({"name": "Khuram", "age": 30}).to_string();

    let response = run(&data, "$.name", "{}").await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"content": [{"type": "text", "text": "\"Khuram\""}]})
    );
}

#[tokio::test]
async fn test_evaluation_error() {
    let data = json!({"name": "Khuram", "age": 30}).to_string();

    let response = run(&data, "'string' + 1", "{}").await;

    assert!(text(&response).starts_with("Evaluation error:"), "{:?}", response);
}

#[tokio::test]
async fn test_invalid_data_json() {
    let response = run("{ name: Khuram, age: 30 }", "name", "{}").await;

    assert!(text(&response).starts_with("Data JSON error:"), "{:?}", response);
}

#[tokio::test]
async fn test_missing_value_is_null_or_undefined() {
    let response = run("{}", "name", "{}").await;

    assert_eq!(response, ToolResponse::text(NULL_OR_UNDEFINED));
}

#[tokio::test]
async fn test_null_value_is_null_or_undefined() {
    let response = run(r#"{"name":null}"#, "name", "{}").await;

    assert_eq!(text(&response), NULL_OR_UNDEFINED);
}

#[tokio::test]
async fn test_empty_expression() {
    let response = run(r#"{"name":"Khuram"}"#, "", "{}").await;

    let text = text(&response);
    assert!(text.starts_with("JSONata expression error:"), "{}", text);
    assert!(text.contains(r#""token":"(end)""#), "{}", text);
}

#[tokio::test]
async fn test_malformed_expression() {
    let response = run("{}", "name[", "{}").await;

    assert!(text(&response).starts_with("JSONata expression error:"));
}

#[tokio::test]
async fn test_empty_bindings_default_to_object() {
    let data = json!({"name": "Khuram", "age": 30}).to_string();

    let response = run(&data, "name", "").await;

    assert_eq!(text(&response), "\"Khuram\"");
}

#[tokio::test]
async fn test_empty_data_defaults_to_object() {
    let response = run("", "name", "{}").await;

    assert_eq!(text(&response), NULL_OR_UNDEFINED);
}

#[tokio::test]
async fn test_invalid_bindings_json() {
    let data = json!({"name": "Khuram"}).to_string();

    let response = run(&data, "$.name", r#"{ invalid: "bindings" }"#).await;

    assert!(text(&response).starts_with("Bindings JSON error:"));
}

#[tokio::test]
async fn test_non_object_bindings_are_not_errors() {
    assert_eq!(text(&run("{}", "$x", "5").await), NULL_OR_UNDEFINED);
    assert_eq!(text(&run("{}", "1", "\"s\"").await), "1");
    assert_eq!(text(&run("{}", "$.name", "[1, 2]").await), NULL_OR_UNDEFINED);
    assert_eq!(text(&run("{}", "2", "null").await), "2");
}

#[tokio::test]
async fn test_number_overflow_is_an_evaluation_error() {
    let response = run("{}", "1e300 * 1e300", "{}").await;

    assert!(text(&response).starts_with("Evaluation error:"), "{:?}", response);
    assert!(text(&response).contains("D1001"));
}

#[tokio::test]
async fn test_function_result_is_null_or_undefined() {
    let response = run("{}", "function($x) { $x }", "{}").await;

    assert_eq!(text(&response), NULL_OR_UNDEFINED);
}

#[tokio::test]
async fn test_bindings_are_variables() {
    let response = run(r#"{"price": 10}"#, "price * $rate", r#"{"rate": 3}"#).await;

    assert_eq!(text(&response), "30");
}

#[tokio::test]
async fn test_nested_path() {
    let data = json!({
        "name": "Khuram",
        "address": {"city": "Calgary", "postal": "T2P 0S2"}
    })
    .to_string();

    let response = run(&data, "address.city", "{}").await;

    assert_eq!(text(&response), "\"Calgary\"");
}

#[tokio::test]
async fn test_sum_function() {
    let data = json!({"numbers": [1, 2, 3, 4, 5]}).to_string();

    let response = run(&data, "$sum(numbers)", "{}").await;

    assert_eq!(text(&response), "15");
}

#[tokio::test]
async fn test_block_with_variables() {
    let data = json!({"name": "Khuram", "age": 30}).to_string();

    let response = run(
        &data,
        r#"($name := name; $age := age; $name & " is " & $age & " years old")"#,
        "{}",
    )
    .await;

    assert_eq!(text(&response), "\"Khuram is 30 years old\"");
}

#[tokio::test]
async fn test_filter_predicate() {
    let data = json!({
        "people": [
            {"name": "Khuram", "age": 30},
            {"name": "Jane", "age": 25}
        ]
    })
    .to_string();

    let response = run(&data, "[people[age > 28].name]", "{}").await;

    assert_eq!(text(&response), r#"["Khuram"]"#);
}
