//! Tests for query evaluation.

use chrono::TimeZone;
use serde_json::json;

use super::*;
use crate::query::QueryParser;

// ==================== Test Helpers ====================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

fn record(value: Value) -> Record {
    Record::from_value("food", value, None).unwrap()
}

fn food_log() -> Vec<Record> {
    vec![
        record(json!({"food": "Vitamin D", "quantity": 1, "when": "2024-03-08T08:00:00Z"})),
        record(json!({"food": "coffee", "quantity": 2, "when": "2024-03-09T07:30:00Z"})),
        record(json!({"food": "vitamin c", "quantity": 2, "when": "2024-03-09T09:00:00Z"})),
        record(json!({"food": "apple", "quantity": 1, "tags": ["fruit", "Snack"],
                      "when": "2024-03-10T10:00:00Z"})),
        // logged ahead of time
        record(json!({"food": "vitamin d", "quantity": 1, "when": "2024-03-11T08:00:00Z"})),
    ]
}

fn run(expr: &str) -> Vec<QueryOutput> {
    QueryParser::parse(expr).unwrap().evaluate(&food_log(), now())
}

fn foods(results: &[QueryOutput]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.data.as_ref().unwrap()["food"].as_str().unwrap().to_string())
        .collect()
}

// ==================== Predicates ====================

#[test]
fn test_match_all_skips_future_records() {
    let results = run("food =>");
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.epoch <= now().timestamp()));
}

#[test]
fn test_results_are_oldest_first() {
    let results = run("food =>");
    assert_eq!(
        foods(&results),
        vec!["Vitamin D", "coffee", "vitamin c", "apple"]
    );
}

#[test]
fn test_contains_is_case_insensitive() {
    let results = run("food => food ~ 'VITAMIN'");
    assert_eq!(foods(&results), vec!["Vitamin D", "vitamin c"]);
}

#[test]
fn test_contains_on_array_matches_elements() {
    assert_eq!(foods(&run("food => tags ~ snack")), vec!["apple"]);
    assert!(run("food => tags ~ sna").is_empty());
}

#[test]
fn test_equality_is_case_sensitive() {
    assert_eq!(foods(&run("food => food == coffee")), vec!["coffee"]);
    assert!(run("food => food == Coffee").is_empty());
}

#[test]
fn test_numeric_comparisons() {
    assert_eq!(run("food => quantity > 1").len(), 2);
    assert_eq!(run("food => quantity >= 1").len(), 4);
    assert_eq!(run("food => quantity < 2").len(), 2);
    assert_eq!(run("food => quantity <= 2").len(), 4);
    assert_eq!(run("food => quantity == 2.0").len(), 2);
    assert_eq!(run("food => quantity != 2").len(), 2);
}

#[test]
fn test_string_ordering() {
    assert_eq!(foods(&run("food => food < b")), vec!["Vitamin D", "apple"]);
}

#[test]
fn test_mixed_types_never_order() {
    assert!(run("food => quantity > 'a'").is_empty());
    assert!(run("food => food < 5").is_empty());
}

#[test]
fn test_mixed_types_never_differ() {
    assert!(run("food => quantity != '5'").is_empty());
    assert!(run("food => food != 5").is_empty());
    assert!(run("food => rating != 5").is_empty());
    assert_eq!(run("food => quantity != null").len(), 4);
}

#[test]
fn test_missing_field() {
    assert!(run("food => rating > 3").is_empty());
    assert_eq!(run("food => rating == null").len(), 4);
    assert!(run("food => rating != null").is_empty());
    assert!(run("food => rating").is_empty());
    assert_eq!(run("food => !rating").len(), 4);
}

#[test]
fn test_truthiness() {
    let records = vec![
        record(json!({"v": 0, "when": 1})),
        record(json!({"v": 3, "when": 2})),
        record(json!({"v": "", "when": 3})),
        record(json!({"v": "x", "when": 4})),
        record(json!({"v": [], "when": 5})),
        record(json!({"v": [1], "when": 6})),
        record(json!({"v": false, "when": 7})),
        record(json!({"v": null, "when": 8})),
        record(json!({"v": {"a": 1}, "when": 9})),
    ];
    let query = QueryParser::parse("food => v").unwrap();
    let epochs: Vec<i64> = query
        .evaluate(&records, now())
        .iter()
        .map(|r| r.epoch)
        .collect();
    assert_eq!(epochs, vec![2, 4, 6, 9]);
}

#[test]
fn test_nested_field() {
    let records = vec![
        record(json!({"macros": {"protein": 30}, "when": 1})),
        record(json!({"macros": {"protein": 5}, "when": 2})),
    ];
    let query = QueryParser::parse("food => food.macros.protein > 10").unwrap();
    let results = query.evaluate(&records, now());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].epoch, 1);
}

#[test]
fn test_boolean_operators() {
    assert_eq!(
        foods(&run("food => food ~ vitamin & quantity == 2")),
        vec!["vitamin c"]
    );
    assert_eq!(
        foods(&run("food => food == coffee | food == apple")),
        vec!["coffee", "apple"]
    );
    assert_eq!(
        foods(&run("food => !(food ~ vitamin)")),
        vec!["coffee", "apple"]
    );
}

#[test]
fn test_false_matches_nothing() {
    assert!(run("food => false").is_empty());
}

#[test]
fn test_no_matches_is_empty_not_error() {
    assert!(run("food => food == 'pizza'").is_empty());
    assert!(run("food => food == 'pizza' every 1d").is_empty());
    assert!(run("food => food == 'pizza' recent 3").is_empty());
}

// ==================== Steps ====================

#[test]
fn test_every_keeps_latest_match() {
    let results = run("food => food ~ vitamin every 2d");
    assert_eq!(results.len(), 1);

    let result = &results[0];
    let last = Utc.with_ymd_and_hms(2024, 3, 9, 9, 0, 0).unwrap().timestamp();
    assert_eq!(result.name, "food");
    assert_eq!(result.epoch, last);
    assert_eq!(result.next_epoch, Some(last + 2 * 86_400));
    assert!(!result.expired);
    assert!(result.data.is_none());
}

#[test]
fn test_every_expired() {
    let results = run("food => food == coffee every 1d");
    assert_eq!(results.len(), 1);
    assert!(results[0].expired);
}

#[test]
fn test_every_expires_exactly_at_due_time() {
    let records = vec![record(json!({"when": "2024-03-09T12:00:00Z"}))];
    let query = QueryParser::parse("food => every 1d").unwrap();
    assert!(query.evaluate(&records, now())[0].expired);
}

#[test]
fn test_every_next_epoch_is_never_negative() {
    let records = vec![record(json!({"when": "1969-12-31T00:00:00Z"}))];
    let query = QueryParser::parse("food => every 1h").unwrap();
    let results = query.evaluate(&records, now());
    assert_eq!(results[0].next_epoch, Some(0));
    assert!(results[0].expired);
}

#[test]
fn test_recent_newest_first() {
    let results = run("food => recent 2");
    assert_eq!(foods(&results), vec!["apple", "vitamin c"]);
    assert!(results.iter().all(|r| r.next_epoch.is_none() && !r.expired));
}

#[test]
fn test_recent_larger_than_matches() {
    assert_eq!(run("food => food ~ vitamin recent 10").len(), 2);
}

// ==================== Labels & Actions ====================

#[test]
fn test_label_names_results() {
    let results = run("food => food ~ vitamin every 1d as vitamins");
    assert_eq!(results[0].name, "vitamins");
}

#[test]
fn test_show_projects_fields() {
    let results = run("food => food == apple show food, rating, food.tags");
    let data = results[0].data.as_ref().unwrap();

    let keys: Vec<&str> = data.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["food", "rating", "tags"]);
    assert_eq!(data["food"], json!("apple"));
    assert_eq!(data["rating"], Value::Null);
    assert_eq!(data["tags"], json!(["fruit", "Snack"]));
}

#[test]
fn test_show_with_every_attaches_data() {
    let results = run("food => food ~ vitamin every 1d show quantity");
    assert_eq!(results[0].data.as_ref().unwrap()["quantity"], json!(2));
}

#[test]
fn test_plain_results_carry_all_fields() {
    let results = run("food => food == coffee");
    let data = results[0].data.as_ref().unwrap();
    assert_eq!(data["quantity"], json!(2));
    assert_eq!(data["when"], json!("2024-03-09T07:30:00Z"));
}

// ==================== Output ====================

#[test]
fn test_output_json_shape() {
    let results = run("food => food == coffee every 1d as caffeine");
    let value = serde_json::to_value(&results[0]).unwrap();

    assert_eq!(
        value,
        json!({
            "name": "caffeine",
            "epoch": results[0].epoch,
            "next_epoch": results[0].epoch + 86_400,
            "expired": true,
        })
    );
}

#[test]
fn test_output_without_step_has_null_next_epoch() {
    let results = run("food => food == coffee");
    let value = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(value["next_epoch"], Value::Null);
    assert_eq!(value["expired"], json!(false));
}

#[test]
fn test_output_deserializes_with_defaults() {
    let output: QueryOutput = serde_json::from_str(r#"{"name": "x", "epoch": 5}"#).unwrap();
    assert_eq!(output.next_epoch, None);
    assert!(!output.expired);
    assert!(output.data.is_none());
}

#[test]
fn test_matches_single_record() {
    let query = QueryParser::parse("food => food ~ apple").unwrap();
    let evaluator = QueryEvaluator::new(&query, now());
    let log = food_log();
    assert!(evaluator.matches(&log[3]));
    assert!(!evaluator.matches(&log[0]));
}
