//! Tests for the query parser.

use chrono::Duration;
use serde_json::json;

use super::*;

// ==================== Parameter & Arrow ====================

#[test]
fn test_parse_category_from_parameter() {
    let query = QueryParser::parse("food => food ~ 'apple'").unwrap();
    assert_eq!(query.category, "food");
    assert_eq!(query.name(), "food");
    assert_eq!(query.source, "food => food ~ 'apple'");
}

#[test]
fn test_parse_empty_predicate_matches_all() {
    let query = QueryParser::parse("weight =>").unwrap();
    assert_eq!(query.predicate, Predicate::All);
    assert!(query.step.is_none());
}

#[test]
fn test_parse_empty_predicate_with_clause() {
    let query = QueryParser::parse("shower => every 2d").unwrap();
    assert_eq!(query.predicate, Predicate::All);
    assert_eq!(query.step, Some(Step::Every(Duration::days(2))));
}

#[test]
fn test_parse_trims_whitespace() {
    let query = QueryParser::parse("  \tfood =>  \n").unwrap();
    assert_eq!(query.category, "food");
    assert_eq!(query.source, "food =>");
}

#[test]
fn test_parse_empty_expression() {
    assert_eq!(QueryParser::parse(""), Err(QueryError::EmptyExpression));
    assert_eq!(QueryParser::parse("   "), Err(QueryError::EmptyExpression));
}

#[test]
fn test_parse_missing_parameter() {
    assert_eq!(
        QueryParser::parse("=> food"),
        Err(QueryError::MissingParameter)
    );
    assert_eq!(
        QueryParser::parse("'food' => x"),
        Err(QueryError::MissingParameter)
    );
}

#[test]
fn test_parse_missing_arrow() {
    assert_eq!(
        QueryParser::parse("food food ~ 'apple'"),
        Err(QueryError::MissingArrow {
            param: "food".to_string()
        })
    );
    assert_eq!(
        QueryParser::parse("food"),
        Err(QueryError::MissingArrow {
            param: "food".to_string()
        })
    );
}

// ==================== Predicates ====================

#[test]
fn test_parse_truthy_field() {
    let query = QueryParser::parse("food => organic").unwrap();
    assert_eq!(query.predicate, Predicate::Truthy("organic".to_string()));
}

#[test]
fn test_parse_dotted_field_through_parameter() {
    let query = QueryParser::parse("food => food.quantity > 2").unwrap();
    assert_eq!(
        query.predicate,
        Predicate::compare("quantity", CmpOp::Gt, 2)
    );
}

#[test]
fn test_parse_nested_field() {
    let query = QueryParser::parse("food => food.macros.protein >= 20.5").unwrap();
    assert_eq!(
        query.predicate,
        Predicate::compare("macros.protein", CmpOp::Ge, json!(20.5))
    );
}

#[test]
fn test_parse_keyword_after_dot_is_a_field() {
    let query = QueryParser::parse("event => event.recent == true").unwrap();
    assert_eq!(
        query.predicate,
        Predicate::compare("recent", CmpOp::Eq, true)
    );
}

#[test]
fn test_parse_unbound_name() {
    assert_eq!(
        QueryParser::parse("food => drink.name == 'tea'"),
        Err(QueryError::UnboundName {
            name: "drink".to_string(),
            param: "food".to_string()
        })
    );
}

#[test]
fn test_parse_all_comparison_operators() {
    let cases = [
        ("==", CmpOp::Eq),
        ("=", CmpOp::Eq),
        ("!=", CmpOp::Ne),
        ("<", CmpOp::Lt),
        ("<=", CmpOp::Le),
        (">", CmpOp::Gt),
        (">=", CmpOp::Ge),
        ("~", CmpOp::Contains),
    ];
    for (text, op) in cases {
        let query = QueryParser::parse(&format!("w => pounds {text} 180")).unwrap();
        assert_eq!(
            query.predicate,
            Predicate::compare("pounds", op, 180),
            "operator {text}"
        );
    }
}

#[test]
fn test_parse_literals() {
    let parse = |lit: &str| match QueryParser::parse(&format!("x => a == {lit}"))
        .unwrap()
        .predicate
    {
        Predicate::Compare { value, .. } => value,
        other => panic!("expected comparison, got {other:?}"),
    };

    assert_eq!(parse("'text'"), json!("text"));
    assert_eq!(parse("\"text\""), json!("text"));
    assert_eq!(parse("bare"), json!("bare"));
    assert_eq!(parse("cold-shower"), json!("cold-shower"));
    assert_eq!(parse("3rd"), json!("3rd"));
    assert_eq!(parse("-3"), json!(-3));
    assert_eq!(parse("1.25"), json!(1.25));
    assert_eq!(parse("true"), json!(true));
    assert_eq!(parse("false"), json!(false));
    assert_eq!(parse("null"), json!(null));
}

#[test]
fn test_parse_boolean_constants() {
    assert_eq!(
        QueryParser::parse("x => true").unwrap().predicate,
        Predicate::All
    );
    assert_eq!(
        QueryParser::parse("x => false").unwrap().predicate,
        Predicate::Nothing
    );
}

#[test]
fn test_parse_and_binds_tighter_than_or() {
    let query = QueryParser::parse("x => a | b & c").unwrap();
    assert_eq!(
        query.predicate,
        Predicate::or(
            Predicate::Truthy("a".into()),
            Predicate::and(Predicate::Truthy("b".into()), Predicate::Truthy("c".into()))
        )
    );
}

#[test]
fn test_parse_parentheses_and_not() {
    let query = QueryParser::parse("x => !(a | b) & c").unwrap();
    assert_eq!(
        query.predicate,
        Predicate::and(
            Predicate::negate(Predicate::or(
                Predicate::Truthy("a".into()),
                Predicate::Truthy("b".into())
            )),
            Predicate::Truthy("c".into())
        )
    );
}

#[test]
fn test_parse_double_negation() {
    let query = QueryParser::parse("x => !!a").unwrap();
    assert_eq!(
        query.predicate,
        Predicate::negate(Predicate::negate(Predicate::Truthy("a".into())))
    );
}

#[test]
fn test_parse_unclosed_parenthesis() {
    assert_eq!(
        QueryParser::parse("x => (a | b"),
        Err(QueryError::UnclosedParenthesis)
    );
}

#[test]
fn test_parse_dangling_operator() {
    assert_eq!(
        QueryParser::parse("x => a &"),
        Err(QueryError::UnexpectedEndOfInput)
    );
    assert_eq!(
        QueryParser::parse("x => a == "),
        Err(QueryError::UnexpectedEndOfInput)
    );
}

#[test]
fn test_parse_stray_token() {
    assert_eq!(
        QueryParser::parse("x => a )"),
        Err(QueryError::unexpected_token(")"))
    );
    assert_eq!(
        QueryParser::parse("x => & a"),
        Err(QueryError::unexpected_token("&"))
    );
}

#[test]
fn test_parse_lexer_error_propagates() {
    assert!(matches!(
        QueryParser::parse("x => a == 'open"),
        Err(QueryError::UnterminatedString { .. })
    ));
}

// ==================== Clauses ====================

#[test]
fn test_parse_every_clause() {
    let query = QueryParser::parse("food => food ~ vitamin every 1d12h").unwrap();
    assert_eq!(
        query.step,
        Some(Step::Every(Duration::days(1) + Duration::hours(12)))
    );
}

#[test]
fn test_parse_recent_clause() {
    let query = QueryParser::parse("food => recent 5").unwrap();
    assert_eq!(query.step, Some(Step::Recent(5)));
}

#[test]
fn test_parse_recent_invalid_count() {
    assert_eq!(
        QueryParser::parse("food => recent 0"),
        Err(QueryError::invalid_count("0"))
    );
    assert_eq!(
        QueryParser::parse("food => recent 2.5"),
        Err(QueryError::invalid_count("2.5"))
    );
    assert_eq!(
        QueryParser::parse("food => recent 3d"),
        Err(QueryError::invalid_count("3d"))
    );
}

#[test]
fn test_parse_as_clause() {
    let query = QueryParser::parse("food => as 'Vitamin D'").unwrap();
    assert_eq!(query.name(), "Vitamin D");

    let query = QueryParser::parse("food => as vitamins").unwrap();
    assert_eq!(query.name(), "vitamins");
}

#[test]
fn test_parse_show_clause() {
    let query = QueryParser::parse("food => show food, food.quantity, food.macros.kcal").unwrap();
    assert_eq!(
        query.action,
        Some(Action::Show(vec![
            "food".to_string(),
            "quantity".to_string(),
            "macros.kcal".to_string()
        ]))
    );
}

#[test]
fn test_parse_show_unbound_field() {
    assert!(matches!(
        QueryParser::parse("food => show macros.kcal"),
        Err(QueryError::UnboundName { .. })
    ));
}

#[test]
fn test_parse_clauses_in_any_order() {
    let query = QueryParser::parse("food => food ~ tea as tea show food every 6h").unwrap();
    assert_eq!(query.name(), "tea");
    assert_eq!(query.step, Some(Step::Every(Duration::hours(6))));
    assert_eq!(query.action, Some(Action::Show(vec!["food".to_string()])));
}

#[test]
fn test_parse_duplicate_clause() {
    assert_eq!(
        QueryParser::parse("x => every 1d every 2d"),
        Err(QueryError::duplicate_clause("every"))
    );
    assert_eq!(
        QueryParser::parse("x => as a as b"),
        Err(QueryError::duplicate_clause("as"))
    );
}

#[test]
fn test_parse_conflicting_clauses() {
    assert_eq!(
        QueryParser::parse("x => every 1d recent 3"),
        Err(QueryError::ConflictingClauses)
    );
    assert_eq!(
        QueryParser::parse("x => recent 3 every 1d"),
        Err(QueryError::ConflictingClauses)
    );
}

#[test]
fn test_parse_clause_missing_argument() {
    assert_eq!(
        QueryParser::parse("x => every"),
        Err(QueryError::UnexpectedEndOfInput)
    );
    assert_eq!(
        QueryParser::parse("x => as"),
        Err(QueryError::UnexpectedEndOfInput)
    );
}

#[test]
fn test_parse_predicate_after_clause_is_rejected() {
    assert_eq!(
        QueryParser::parse("x => every 1d a"),
        Err(QueryError::unexpected_token("a"))
    );
}

// ==================== Durations ====================

#[test]
fn test_parse_duration_units() {
    assert_eq!(parse_duration("45s").unwrap(), Duration::seconds(45));
    assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
    assert_eq!(parse_duration("12h").unwrap(), Duration::hours(12));
    assert_eq!(parse_duration("3d").unwrap(), Duration::days(3));
    assert_eq!(parse_duration("2w").unwrap(), Duration::weeks(2));
    assert_eq!(
        parse_duration("1w2d3h").unwrap(),
        Duration::weeks(1) + Duration::days(2) + Duration::hours(3)
    );
}

#[test]
fn test_parse_duration_invalid() {
    for text in ["", "5", "d", "3x", "0d", "1d5", "1.5d"] {
        assert_eq!(
            parse_duration(text),
            Err(QueryError::invalid_duration(text)),
            "duration {text:?}"
        );
    }
}

#[test]
fn test_parse_every_without_unit() {
    assert_eq!(
        QueryParser::parse("x => every 5"),
        Err(QueryError::invalid_duration("5"))
    );
}
