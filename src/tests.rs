use crate::ast::*;
use crate::error::{ErrorKind, ExtractError};
use crate::identifier::TagIdentifier;
use crate::options::ParseOptions;

// ── Shared fixture runners ──────────────────────────────────────────

/// Embed fixture files at compile time.
const PARSE_FIXTURES: &str = include_str!("../test-data/fixtures/parse.json");
const PARSE_ERROR_FIXTURES: &str = include_str!("../test-data/fixtures/parse-errors.json");
const EXTRACT_FIXTURES: &str = include_str!("../test-data/fixtures/extract.json");

fn fixture_options(fixture: &serde_json::Value) -> ParseOptions {
    let raw = fixture
        .get("raw")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    ParseOptions::new().raw_values(raw)
}

fn fixture_lines(fixture: &serde_json::Value) -> Vec<&str> {
    fixture["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect()
}

#[test]
fn test_fixture_parse() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(PARSE_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();
        let options = fixture_options(fixture);

        let tag = match crate::parse_with(input, &options) {
            Ok(tag) => tag,
            Err(e) => panic!("Fixture '{}': unexpected parse error: {}", name, e),
        };
        let actual = crate::json::tag_to_value(&tag);
        assert_eq!(
            actual, fixture["expected"],
            "Fixture '{}': value mismatch\n  Got:      {}\n  Expected: {}",
            name, actual, fixture["expected"]
        );
    }
}

#[test]
fn test_fixture_parse_errors() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(PARSE_ERROR_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();
        let code = fixture["code"].as_str().unwrap();
        let options = fixture_options(fixture);

        match crate::parse_with(input, &options) {
            Ok(tag) => panic!(
                "Fixture '{}': expected a parse error for '{}', got {:?}",
                name, input, tag
            ),
            Err(err) => {
                assert_eq!(
                    err.code(),
                    code,
                    "Fixture '{}': error code mismatch ({})",
                    name,
                    err
                );
                assert!(
                    err.begin.offset <= err.end.offset,
                    "Fixture '{}': inverted span {:?}..{:?}",
                    name,
                    err.begin,
                    err.end
                );
                assert!(
                    err.end.offset <= input.len(),
                    "Fixture '{}': span past end of input",
                    name
                );
            }
        }
    }
}

#[test]
fn test_fixture_extract() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(EXTRACT_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let marker = fixture["marker"].as_str().unwrap();
        let group = fixture.get("group").and_then(|g| g.as_str());
        let lines = fixture_lines(fixture);

        let extracted = crate::extract(marker, group, &lines);
        let actual = crate::json::extracted_to_value(&extracted);
        assert_eq!(
            actual, fixture["expected"],
            "Fixture '{}': extract mismatch\n  Got:      {}\n  Expected: {}",
            name, actual, fixture["expected"]
        );
    }
}

// ── Properties over the fixture corpus ──────────────────────────────

#[test]
fn test_display_round_trips() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(PARSE_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();
        let options = fixture_options(fixture);

        let tag = crate::parse_with(input, &options).unwrap();
        let text = tag.to_string();
        let reparsed = match crate::parse_with(&text, &options) {
            Ok(t) => t,
            Err(e) => panic!(
                "Fixture '{}': rendered form '{}' does not parse: {}",
                name, text, e
            ),
        };
        assert_eq!(
            reparsed, tag,
            "Fixture '{}': round trip through '{}' changed the tag",
            name, text
        );
    }
}

#[test]
fn test_extracted_bodies_parse_like_direct_input() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(EXTRACT_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let marker = fixture["marker"].as_str().unwrap();
        let group = fixture.get("group").and_then(|g| g.as_str());
        let lines = fixture_lines(fixture);

        let extracted = crate::extract(marker, group, &lines);
        let parsed = crate::extract_and_parse(marker, group, &lines).unwrap();
        assert_eq!(
            extracted.keys().collect::<Vec<_>>(),
            parsed.keys().collect::<Vec<_>>(),
            "Fixture '{}': identifier sets differ",
            name
        );
        for (id, bodies) in &extracted {
            let direct = crate::parse_all(bodies).unwrap();
            assert_eq!(
                &direct, &parsed[id],
                "Fixture '{}': tags for '{}' differ",
                name, id
            );
        }
    }
}

// ── Parser (implementation-specific) ────────────────────────────────

#[test]
fn test_parse_bare_name() {
    let tag = crate::parse("name").unwrap();
    assert_eq!(tag.name, "name");
    assert!(tag.args.is_empty());
    assert_eq!(tag.value_kind(), ValueKind::None);
    assert_eq!(tag.value, None);
}

#[test]
fn test_empty_args_equal_absent_args() {
    assert_eq!(crate::parse("name()").unwrap(), crate::parse("name").unwrap());
}

#[test]
fn test_parse_numbers() {
    let tag =
        crate::parse("numbers(n1: 2, n2: -5, n3: 0xFF00B3, n4: 0o04167, n5: 0b10101)").unwrap();
    let expected = [
        ("n1", "2", 2),
        ("n2", "-5", -5),
        ("n3", "0xFF00B3", 16711859),
        ("n4", "0o04167", 2167),
        ("n5", "0b10101", 21),
    ];
    assert_eq!(tag.args.len(), expected.len());
    for (arg, (name, literal, value)) in tag.args.iter().zip(expected) {
        assert_eq!(arg.name, name);
        assert_eq!(
            arg.value,
            TypedValue::Int {
                literal: literal.to_string(),
                value
            }
        );
    }
}

#[test]
fn test_parse_escaped_string() {
    let tag = crate::parse(r#"quoted(s: "value \" \\")"#).unwrap();
    assert_eq!(tag.named_arg("s").and_then(|v| v.as_str()), Some(r#"value " \"#));
}

#[test]
fn test_parse_chained_tag() {
    let tag = crate::parse(r#"outer(param: "value")=+inner("innerArg")"#).unwrap();
    assert_eq!(tag.value_kind(), ValueKind::Tag);
    assert_eq!(tag.named_arg("param").and_then(|v| v.as_str()), Some("value"));
    let inner = tag.value_tag().unwrap();
    assert_eq!(inner.name, "inner");
    assert_eq!(
        inner.args,
        vec![Arg::positional(TypedValue::String("innerArg".to_string()))]
    );
}

#[test]
fn test_chain_iterates_every_link() {
    let tag = crate::parse("a=+b=+c(1)=+d=end").unwrap();
    let names: Vec<&str> = tag.chain().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c", "d"]);
    let last = tag.chain().last().unwrap();
    assert_eq!(last.typed_value().and_then(|v| v.as_str()), Some("end"));
}

#[test]
fn test_comment_dropped_or_kept_raw() {
    let tag = crate::parse("key=value // comment").unwrap();
    assert_eq!(
        tag.value,
        Some(TagValue::Value(TypedValue::String("value".to_string())))
    );

    let raw = crate::parse_with("key=value // comment", &ParseOptions::new().raw_values(true))
        .unwrap();
    assert_eq!(raw.value_kind(), ValueKind::Raw);
    assert_eq!(raw.value, Some(TagValue::Raw("value // comment".to_string())));
}

#[test]
fn test_bool_only_from_bare_identifiers() {
    let bare = crate::parse("name(true)=false").unwrap();
    assert_eq!(bare.positional_arg(), Some(&TypedValue::Bool(true)));
    assert_eq!(bare.typed_value().and_then(|v| v.as_bool()), Some(false));

    let quoted = crate::parse(r#"name=`false`"#).unwrap();
    assert_eq!(quoted.value_kind(), ValueKind::String);
}

#[test]
fn test_multiple_positional_arguments_rejected() {
    let err = crate::parse("name(arg1, arg2)").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Grammar);
    assert!(err.message.contains("positional"), "{}", err.message);
    // The span covers the whole argument list.
    assert_eq!(err.begin.offset, 4);
    assert_eq!(err.end.offset, 16);
}

#[test]
fn test_mixed_arguments_rejected() {
    let err = crate::parse("name(a, b: 1)").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Grammar);
    assert!(err.message.contains("Mixed"), "{}", err.message);
}

#[test]
fn test_max_depth() {
    let options = ParseOptions::new().max_depth(2);
    assert!(crate::parse_with("a=+b=+c", &options).is_ok());

    let err = crate::parse_with("a=+b=+c=+d", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Grammar);
    assert_eq!(err.begin.offset, 8);
}

#[test]
fn test_deep_chain_within_default_limit() {
    let input = (0..50).map(|i| format!("t{}", i)).collect::<Vec<_>>().join("=+");
    let tag = crate::parse(&input).unwrap();
    assert_eq!(tag.chain().count(), 50);

    let too_deep = (0..200).map(|i| format!("t{}", i)).collect::<Vec<_>>().join("=+");
    assert!(crate::parse(&too_deep).is_err());
}

#[test]
fn test_parse_all_fails_fast() {
    let tags = crate::parse_all(["a", "b=1", "c(x)"]).unwrap();
    assert_eq!(tags.len(), 3);

    let err = crate::parse_all(["a", "b(", "c=\""]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

// ── Error Position/Span Tests ───────────────────────────────────────

#[test]
fn test_error_unexpected_character_position() {
    let err = crate::parse("name(x)!").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.begin, err.end);
    assert_eq!(err.begin.column, 7);
    assert!(err.message.contains("'!'"), "{}", err.message);
}

#[test]
fn test_error_unterminated_args_span() {
    let err = crate::parse("tag(a: 1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.begin.offset, 3);
    assert_eq!(err.end.offset, 8);
}

#[test]
fn test_error_unterminated_string_span() {
    let err = crate::parse("k=\"abc").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
    assert_eq!(err.begin.offset, 2);
    assert_eq!(err.end.offset, 6);
}

#[test]
fn test_error_columns_count_characters() {
    let err = crate::parse("k=\"é\" !").unwrap_err();
    assert_eq!(err.begin.column, 6);
    assert_eq!(err.begin.offset, 7);
}

#[test]
fn test_error_display() {
    let err = crate::parse("name(x)!").unwrap_err();
    assert_eq!(
        err.to_string(),
        "7: Unexpected character '!' after argument list (tag-syntax-error)"
    );

    let err = crate::parse("k=\"abc").unwrap_err();
    assert_eq!(
        err.to_string(),
        "2-6: Unterminated string (tag-lexical-error)"
    );
}

// ── Display ─────────────────────────────────────────────────────────

#[test]
fn test_display_canonical_form() {
    let tag = crate::parse("a( x : `q\"t` , y:0x1F )=+b(true)=c // gone").unwrap();
    assert_eq!(tag.to_string(), r#"a(x: "q\"t", y: 0x1F)=+b(true)="c""#);
}

// ── Identifiers ─────────────────────────────────────────────────────

#[test]
fn test_identifier_text_form() {
    let grouped = TagIdentifier::parse("k8s:required");
    assert_eq!(grouped, TagIdentifier::new("k8s", "required"));
    assert_eq!(grouped.to_string(), "k8s:required");

    let bare: TagIdentifier = "listType".parse().unwrap();
    assert_eq!(bare.group(), "");
    assert_eq!(bare.to_string(), "listType");

    let nested = TagIdentifier::from("a:b:c");
    assert_eq!(nested.group(), "a");
    assert_eq!(nested.name(), "b:c");
    assert_eq!(TagIdentifier::parse(&nested.to_string()), nested);
}

// ── Extractor ───────────────────────────────────────────────────────

#[test]
fn test_extract_spec_example() {
    let lines = ["+k8s:required", "+listType=set", "+k8s:format=k8s-long-name"];
    let extracted = crate::extract("+", Some("k8s"), lines);
    assert_eq!(extracted.len(), 2);
    assert_eq!(
        extracted[&TagIdentifier::new("k8s", "required")],
        vec!["required".to_string()]
    );
    assert_eq!(
        extracted[&TagIdentifier::new("k8s", "format")],
        vec!["format=k8s-long-name".to_string()]
    );
}

#[test]
fn test_extract_preserves_order() {
    let lines = vec![
        "+k8s:item(a)".to_string(),
        "+other".to_string(),
        "+k8s:item(b)".to_string(),
        "+k8s:item(c)".to_string(),
    ];
    let extracted = crate::extract("+", None, &lines);
    assert_eq!(
        extracted[&TagIdentifier::new("k8s", "item")],
        vec!["item(a)", "item(b)", "item(c)"]
    );
}

#[test]
fn test_extract_never_fails_on_bad_syntax() {
    let extracted = crate::extract("+", None, ["+broken(", "+also=\"bad"]);
    assert_eq!(extracted[&TagIdentifier::new("", "broken")], vec!["broken("]);
    assert_eq!(extracted[&TagIdentifier::new("", "also")], vec!["also=\"bad"]);
}

#[test]
fn test_extract_and_parse() {
    let lines = [
        "// +k8s:required is not at the start",
        "+k8s:required",
        "+k8s:maxLength=64",
        "+k8s:ifEnabled(\"Feature\")=+k8s:minimum=0",
    ];
    let parsed = crate::extract_and_parse("+", Some("k8s"), lines).unwrap();
    assert_eq!(parsed.len(), 3);

    let max_len = &parsed[&TagIdentifier::new("k8s", "maxLength")][0];
    assert_eq!(max_len.name, "maxLength");
    assert_eq!(max_len.typed_value().and_then(|v| v.as_int()), Some(64));

    let if_enabled = &parsed[&TagIdentifier::new("k8s", "ifEnabled")][0];
    let inner = if_enabled.value_tag().unwrap();
    assert_eq!(inner.name, "k8s:minimum");
}

#[test]
fn test_extract_and_parse_reports_first_failure() {
    let lines = ["prose", "  +ok", "  +k8s:bad(x, y)", "+worse("];
    let err = crate::extract_and_parse("+", None, lines).unwrap_err();
    let ExtractError::Parse {
        line,
        body_offset,
        identifier,
        source,
    } = &err;
    assert_eq!(*line, 2);
    assert_eq!(*body_offset, 7);
    assert_eq!(identifier, &TagIdentifier::new("k8s", "bad"));
    assert_eq!(source.kind, ErrorKind::Grammar);
    assert!(err.to_string().starts_with("line 3: tag `k8s:bad`: "), "{}", err);
}

#[test]
fn test_extract_and_parse_raw() {
    let options = ParseOptions::new().raw_values(true);
    let parsed =
        crate::extract_and_parse_with("+", None, ["+pattern=^[a-z]+$ // anchored"], &options)
            .unwrap();
    assert_eq!(
        parsed[&TagIdentifier::new("", "pattern")][0].value,
        Some(TagValue::Raw("^[a-z]+$ // anchored".to_string()))
    );
}

// ── JSON Serialization Tests ────────────────────────────────────────

#[test]
fn test_json_tag() {
    let tag = crate::parse("limit(max: 0x10)=+inner").unwrap();
    let v: serde_json::Value = serde_json::from_str(&crate::json::to_json(&tag)).unwrap();
    assert_eq!(v["name"], "limit");
    assert_eq!(v["args"][0]["name"], "max");
    assert_eq!(v["args"][0]["value"], 16);
    assert_eq!(v["args"][0]["literal"], "0x10");
    assert_eq!(v["valueType"], "tag");
    assert_eq!(v["value"]["name"], "inner");
    assert!(v["value"].get("value").is_none());
}

#[test]
fn test_json_pretty_matches_compact() {
    let tag = crate::parse("a(b: \"c\")=1").unwrap();
    let compact: serde_json::Value =
        serde_json::from_str(&crate::json::to_json(&tag)).unwrap();
    let pretty_text = crate::json::to_json_pretty(&tag);
    assert!(pretty_text.contains('\n'));
    let pretty: serde_json::Value = serde_json::from_str(&pretty_text).unwrap();
    assert_eq!(compact, pretty);
}

#[test]
fn test_json_parsed_and_error() {
    let parsed = crate::extract_and_parse("+", None, ["+a=1", "+g:b"]).unwrap();
    let v: serde_json::Value = serde_json::from_str(&crate::json::parsed_to_json(
        &parsed,
        crate::json::JsonStyle::Compact,
    ))
    .unwrap();
    assert_eq!(v["a"][0]["value"]["value"], 1);
    assert_eq!(v["g:b"][0]["name"], "b");

    let err = crate::extract_and_parse("+", None, ["", "+x=\"open"]).unwrap_err();
    let v: serde_json::Value = serde_json::from_str(&crate::json::error_to_json(&err)).unwrap();
    assert_eq!(v["code"], "tag-lexical-error");
    assert_eq!(v["line"], 1);
    assert_eq!(v["identifier"], "x");
    assert_eq!(v["begin"]["offset"], 2);
}
