use indoc::indoc;
use insta::assert_snapshot;

use json_grammar::{parse, JsonValue};

#[test]
fn parses_a_nested_document() {
    let text = indoc! {r#"
        {
            "name": "lady-deirdre",
            "stable": true,
            "tags": ["parser", "ast", null],
            "version": 2.5
        }
    "#};

    let value = parse(text).unwrap();

    let expected = JsonValue::Object(vec![
        ("name".to_string(), JsonValue::String("lady-deirdre".to_string())),
        ("stable".to_string(), JsonValue::Bool(true)),
        (
            "tags".to_string(),
            JsonValue::Array(vec![
                JsonValue::String("parser".to_string()),
                JsonValue::String("ast".to_string()),
                JsonValue::Null,
            ]),
        ),
        ("version".to_string(), JsonValue::Number(2.5)),
    ]);

    assert_eq!(value, expected);
}

#[test]
fn a_member_with_a_missing_value_is_reported_as_invalid() {
    let err = parse(r#"{"a": }"#).unwrap_err();
    assert_snapshot!(err.to_string(), @"input is not valid JSON");
}
