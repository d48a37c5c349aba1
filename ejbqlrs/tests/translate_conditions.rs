//! WHERE clause translation: operators, parameters, collection predicates
//! and functions.

mod common;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::*;
use ejbql::ast::{ComparisonOp, Expr, Function, Path, SelectExpression, SelectStatement, Statement, TrimSpec};
use ejbql::config::TranslatorConfig;
use ejbql::{SqlTranslator, TranslatedQuery, TranslationError, TranslationRequest};

fn artists_where(condition: Expr, params: &[(&str, Value)]) -> TranslatedQuery {
    translate_with(
        &plain_translator(),
        Statement::Select(select_entity("Artist", "a", Some(condition))),
        &named(params),
    )
}

fn artists_where_err(condition: Expr, params: &[(&str, Value)]) -> TranslationError {
    plain_translator()
        .translate(
            &catalog(),
            &Statement::Select(select_entity("Artist", "a", Some(condition))),
            &named(params),
        )
        .unwrap_err()
}

fn name_is(param_name: &str) -> Expr {
    eq(path("a", &["artistName"]), param(param_name))
}

#[test]
fn string_literal_is_bound_with_type() {
    let query = artists_where(eq(path("a", &["artistName"]), string("Monet")), &[]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME = #bind($id0 'VARCHAR')")
    );
    assert_eq!(query.parameters, vec![("id0".to_string(), json!("Monet"))]);
}

#[test]
fn or_inside_and_is_bracketed() {
    let condition = Expr::And(vec![
        Expr::Or(vec![name_is("n1"), name_is("n2")]),
        compare(ComparisonOp::LessThan, path("a", &["dateOfBirth"]), param("d")),
    ]);
    let query = artists_where(
        condition,
        &[("n1", json!("Monet")), ("n2", json!("Manet")), ("d", json!("1900-01-01"))],
    );
    assert_eq!(
        query.sql,
        format!(
            "{ARTIST_COLUMNS} WHERE ( t0.ARTIST_NAME = #bind($id0) OR t0.ARTIST_NAME = #bind($id1)) \
             AND t0.DATE_OF_BIRTH < #bind($id2)"
        )
    );
}

#[test]
fn and_inside_or_is_not_bracketed() {
    let condition = Expr::Or(vec![
        Expr::And(vec![name_is("n1"), name_is("n2")]),
        name_is("n3"),
    ]);
    let query = artists_where(
        condition,
        &[("n1", json!("a")), ("n2", json!("b")), ("n3", json!("c"))],
    );
    assert_eq!(
        query.sql,
        format!(
            "{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME = #bind($id0) AND t0.ARTIST_NAME = #bind($id1) \
             OR t0.ARTIST_NAME = #bind($id2)"
        )
    );
}

#[test]
fn not_brackets_connectives() {
    let condition = Expr::Not(Box::new(Expr::And(vec![name_is("n1"), name_is("n2")])));
    let query = artists_where(condition, &[("n1", json!("a")), ("n2", json!("b"))]);
    assert_eq!(
        query.sql,
        format!(
            "{ARTIST_COLUMNS} WHERE NOT ( t0.ARTIST_NAME = #bind($id0) AND t0.ARTIST_NAME = #bind($id1))"
        )
    );
}

#[test]
fn null_parameter_on_right_becomes_is_null() {
    let query = artists_where(name_is("name"), &[("name", Value::Null)]);
    assert_eq!(query.sql, format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME IS NULL"));
    assert!(query.parameters.is_empty());

    let not_equal = compare(ComparisonOp::NotEquals, path("a", &["artistName"]), param("name"));
    let query = artists_where(not_equal, &[("name", Value::Null)]);
    assert_eq!(query.sql, format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME IS NOT NULL"));
}

#[test]
fn null_parameter_on_left_is_bound_typed() {
    let query = artists_where(
        eq(param("name"), path("a", &["artistName"])),
        &[("name", Value::Null)],
    );
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE #bind($id0 'VARCHAR') = t0.ARTIST_NAME")
    );
    assert_eq!(query.parameter("id0"), Some(&Value::Null));
}

#[test]
fn null_bounds_take_type_from_path() {
    let condition = Expr::Between {
        negated: false,
        expr: Box::new(path("a", &["dateOfBirth"])),
        lower: Box::new(param("from")),
        upper: Box::new(param("to")),
    };
    let query = artists_where(condition, &[("from", Value::Null), ("to", json!("1900-01-01"))]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.DATE_OF_BIRTH BETWEEN #bind($id0 'DATE') AND #bind($id1)")
    );
}

#[test]
fn missing_parameter_binds_default_type() {
    let mut config = TranslatorConfig::default();
    config.translation.annotate_result_columns = false;
    config.translation.default_parameter_type = "INTEGER".to_string();
    config.translation.parameter_prefix = "p".to_string();
    let condition = compare(
        ComparisonOp::GreaterThan,
        Expr::Size(vec![path("a", &["paintingArray"])]),
        param("count"),
    );
    let query = translate_with(
        &SqlTranslator::with_config(config),
        Statement::Select(select_entity("Artist", "a", Some(condition))),
        &TranslationRequest::default(),
    );
    assert_eq!(
        query.sql,
        format!(
            "{ARTIST_COLUMNS} WHERE (SELECT COUNT(1) FROM PAINTING t1 WHERE t1.ARTIST_ID = t0.ARTIST_ID) \
             > #bind($p0 'INTEGER')"
        )
    );
}

#[test]
fn positional_parameters() {
    let request = TranslationRequest {
        positional_parameters: [(1, json!("Monet"))].into_iter().collect(),
        ..Default::default()
    };
    let query = translate_with(
        &plain_translator(),
        Statement::Select(select_entity(
            "Artist",
            "a",
            Some(eq(path("a", &["artistName"]), Expr::PositionalParameter(1))),
        )),
        &request,
    );
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME = #bind($id0)")
    );
    assert_eq!(query.parameter("id0"), Some(&json!("Monet")));
}

#[test]
fn composite_key_equality_expands_per_column() {
    let condition = eq(path("f", &["toCompoundPk"]), param("pk"));
    let query = translate_with(
        &plain_translator(),
        Statement::Select(select_entity("CompoundFkTest", "f", Some(condition))),
        &named(&[("pk", json!({"KEY1": "a", "KEY2": "b"}))]),
    );
    assert_eq!(
        query.sql,
        "SELECT t0.NAME, t0.PKEY, t0.F_KEY1, t0.F_KEY2 FROM COMPOUND_FK_TEST t0 \
         WHERE ( t0.F_KEY1 = #bind($id1) AND t0.F_KEY2 = #bind($id2))"
    );
    assert_eq!(query.parameter("id1"), Some(&json!("a")));
    assert_eq!(query.parameter("id2"), Some(&json!("b")));
}

#[test]
fn composite_key_inequality_uses_or() {
    let condition = compare(ComparisonOp::NotEquals, path("f", &["toCompoundPk"]), param("pk"));
    let query = translate_with(
        &plain_translator(),
        Statement::Select(select_entity("CompoundFkTest", "f", Some(condition))),
        &named(&[("pk", json!({"KEY1": "a", "KEY2": "b"}))]),
    );
    assert!(query
        .sql
        .ends_with("WHERE ( t0.F_KEY1 <> #bind($id1) OR t0.F_KEY2 <> #bind($id2))"));
}

#[test]
fn composite_key_inequality_stays_grouped_under_and() {
    let condition = Expr::And(vec![
        compare(ComparisonOp::NotEquals, path("f", &["toCompoundPk"]), param("pk")),
        eq(path("f", &["name"]), string("x")),
    ]);
    let query = translate_with(
        &plain_translator(),
        Statement::Select(select_entity("CompoundFkTest", "f", Some(condition))),
        &named(&[("pk", json!({"KEY1": "a", "KEY2": "b"}))]),
    );
    assert!(query.sql.ends_with(
        "WHERE ( t0.F_KEY1 <> #bind($id1) OR t0.F_KEY2 <> #bind($id2)) \
         AND t0.NAME = #bind($id3 'VARCHAR')"
    ));
}

#[test]
fn composite_key_null_checks_every_column() {
    let condition = eq(path("f", &["toCompoundPk"]), param("pk"));
    let query = translate_with(
        &plain_translator(),
        Statement::Select(select_entity("CompoundFkTest", "f", Some(condition))),
        &named(&[("pk", Value::Null)]),
    );
    assert!(query
        .sql
        .ends_with("WHERE ( t0.F_KEY1 IS NULL AND t0.F_KEY2 IS NULL)"));
}

#[test]
fn composite_key_ordering_is_unsupported() {
    let condition = compare(ComparisonOp::GreaterThan, path("f", &["toCompoundPk"]), param("pk"));
    let err = plain_translator()
        .translate(
            &catalog(),
            &Statement::Select(select_entity("CompoundFkTest", "f", Some(condition))),
            &named(&[("pk", json!({"KEY1": "a", "KEY2": "b"}))]),
        )
        .unwrap_err();
    assert!(matches!(err, TranslationError::Unsupported(_)));
}

#[test]
fn single_entry_object_id_is_unwrapped() {
    let condition = eq(path("p", &["toArtist"]), param("artist"));
    let query = translate_with(
        &plain_translator(),
        Statement::Select(select_entity("Painting", "p", Some(condition))),
        &named(&[("artist", json!({"ARTIST_ID": 33}))]),
    );
    assert!(query.sql.ends_with("WHERE t0.ARTIST_ID = #bind($id0)"));
    assert_eq!(query.parameter("id0"), Some(&json!(33)));
}

#[test]
fn empty_object_id_is_invalid() {
    let err = artists_where_err(name_is("id"), &[("id", json!({}))]);
    assert!(matches!(err, TranslationError::InvalidAst(_)));
}

#[test]
fn in_list_expands_collection_parameter() {
    let condition = Expr::In {
        negated: false,
        expr: Box::new(path("a", &["artistName"])),
        items: vec![param("names")],
    };
    let query = artists_where(condition, &[("names", json!(["Monet", "Manet"]))]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME IN ( #bind($id0), #bind($id1))")
    );
}

#[test]
fn in_list_with_empty_collection_is_invalid() {
    let condition = Expr::In {
        negated: true,
        expr: Box::new(path("a", &["artistName"])),
        items: vec![param("names")],
    };
    let err = artists_where_err(condition, &[("names", json!([]))]);
    assert!(matches!(err, TranslationError::InvalidAst(_)));
}

#[test]
fn in_subselect() {
    let subselect = SelectStatement {
        select: vec![SelectExpression::Path(Path::new("g", &["galleryName"]))],
        from: vec![from("Gallery", "g")],
        ..Default::default()
    };
    let condition = Expr::In {
        negated: false,
        expr: Box::new(path("a", &["artistName"])),
        items: vec![Expr::Subselect(Box::new(subselect))],
    };
    let query = artists_where(condition, &[]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME IN (SELECT t1.GALLERY_NAME FROM GALLERY t1)")
    );
}

#[test]
fn member_of_correlates_subquery() {
    let condition = Expr::MemberOf {
        negated: false,
        operands: vec![param("painting"), path("a", &["paintingArray"])],
    };
    let query = artists_where(condition, &[("painting", json!(5))]);
    assert_eq!(
        query.sql,
        format!(
            "{ARTIST_COLUMNS} WHERE EXISTS (SELECT 1 FROM PAINTING t1 \
             WHERE t1.ARTIST_ID = t0.ARTIST_ID AND t1.PAINTING_ID = #bind($id0))"
        )
    );
}

#[test]
fn member_of_flattened_relationship_joins_back() {
    let condition = Expr::MemberOf {
        negated: true,
        operands: vec![param("exhibit"), path("a", &["exhibits"])],
    };
    let query = artists_where(condition, &[("exhibit", json!(7))]);
    assert_eq!(
        query.sql,
        format!(
            "{ARTIST_COLUMNS} WHERE NOT EXISTS (SELECT 1 FROM EXHIBIT t1 \
             JOIN ARTIST_EXHIBIT t2 ON (t1.EXHIBIT_ID = t2.EXHIBIT_ID) \
             WHERE t2.ARTIST_ID = t0.ARTIST_ID AND t1.EXHIBIT_ID = #bind($id0))"
        )
    );
}

#[test]
fn member_of_requires_two_operands() {
    let condition = Expr::MemberOf {
        negated: false,
        operands: vec![path("a", &["paintingArray"])],
    };
    let err = artists_where_err(condition, &[]);
    assert!(matches!(err, TranslationError::InvalidAst(_)));
}

#[test]
fn is_not_empty_outer_joins_and_adds_distinct() {
    let condition = Expr::IsEmpty {
        negated: true,
        path: Path::new("a", &["paintingArray"]),
    };
    let query = artists_where(condition, &[]);
    assert_eq!(
        query.sql,
        "SELECT DISTINCT t0.ARTIST_NAME, t0.DATE_OF_BIRTH, t0.ARTIST_ID FROM ARTIST t0 \
         LEFT OUTER JOIN PAINTING t1 ON (t0.ARTIST_ID = t1.ARTIST_ID) WHERE t1.PAINTING_ID IS NOT NULL"
    );
}

#[test]
fn is_empty_on_to_one_is_invalid() {
    let err = plain_translator()
        .translate(
            &catalog(),
            &Statement::Select(select_entity(
                "Painting",
                "p",
                Some(Expr::IsEmpty {
                    negated: false,
                    path: Path::new("p", &["toArtist"]),
                }),
            )),
            &TranslationRequest::default(),
        )
        .unwrap_err();
    assert!(matches!(err, TranslationError::InvalidAst(_)));
}

#[test]
fn ignore_case_like_wraps_in_upper() {
    let condition = Expr::Like {
        negated: false,
        ignore_case: true,
        expr: Box::new(path("a", &["artistName"])),
        pattern: Box::new(param("pattern")),
        escape: None,
    };
    let query = artists_where(condition.clone(), &[("pattern", json!("m%"))]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE UPPER( t0.ARTIST_NAME) LIKE UPPER( #bind($id0))")
    );

    let mut config = TranslatorConfig::default();
    config.translation.annotate_result_columns = false;
    config.translation.case_insensitive = true;
    let query = translate_with(
        &SqlTranslator::with_config(config),
        Statement::Select(select_entity("Artist", "a", Some(condition))),
        &named(&[("pattern", json!("m%"))]),
    );
    assert_eq!(query.sql, format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME LIKE #bind($id0)"));
}

#[test]
fn like_with_escape_and_null_pattern() {
    let like = |negated| Expr::Like {
        negated,
        ignore_case: false,
        expr: Box::new(path("a", &["artistName"])),
        pattern: Box::new(param("pattern")),
        escape: Some('!'),
    };
    let query = artists_where(like(true), &[("pattern", json!("100!%"))]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME NOT LIKE #bind($id0) ESCAPE '!'")
    );

    let query = artists_where(like(true), &[("pattern", Value::Null)]);
    assert_eq!(query.sql, format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_NAME IS NOT NULL"));
}

#[test]
fn jdbc_escape_functions() {
    let condition = eq(
        Expr::Function(Function::Upper(Box::new(path("a", &["artistName"])))),
        Expr::Function(Function::Concat(vec![string("MO"), string("NET")])),
    );
    let query = artists_where(condition, &[]);
    assert_eq!(
        query.sql,
        format!(
            "{ARTIST_COLUMNS} WHERE {{fn UCASE( t0.ARTIST_NAME)}} = \
             {{fn CONCAT( #bind($id0 'VARCHAR'), #bind($id1 'VARCHAR'))}}"
        )
    );
}

#[test]
fn trim_uses_dialect_template() {
    let trimmed = |character: Option<&str>| {
        eq(
            Expr::Function(Function::Trim {
                spec: Some(TrimSpec::Leading),
                character: character.map(str::to_string),
                expr: Box::new(path("a", &["artistName"])),
            }),
            string("x"),
        )
    };
    let query = artists_where(trimmed(None), &[]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE {{fn LTRIM( t0.ARTIST_NAME)}} = #bind($id0 'VARCHAR')")
    );

    let err = artists_where_err(trimmed(Some("_")), &[]);
    assert!(matches!(err, TranslationError::Unsupported(_)));
}

#[test]
fn arithmetic_is_parenthesized() {
    let condition = compare(
        ComparisonOp::GreaterThan,
        Expr::Arithmetic {
            op: ejbql::ast::ArithmeticOp::Multiply,
            left: Box::new(path("p", &["estimatedPrice"])),
            right: Box::new(integer(2)),
        },
        Expr::DecimalLiteral {
            text: "1000.5".to_string(),
            negative: false,
        },
    );
    let query = translate(Statement::Select(select_entity("Painting", "p", Some(condition))));
    assert!(query.sql.ends_with(
        "WHERE ( t0.ESTIMATED_PRICE * #bind($id0 'INTEGER')) > #bind($id1 'DECIMAL')"
    ));
    assert_eq!(query.parameter("id1"), Some(&json!(1000.5)));
}

#[test]
fn malformed_integer_literal() {
    let condition = eq(
        path("a", &["artistName"]),
        Expr::IntegerLiteral {
            text: "12abc".to_string(),
            negative: false,
        },
    );
    let err = artists_where_err(condition, &[]);
    assert!(matches!(err, TranslationError::MalformedLiteral(_)));
}

#[test]
fn current_date_function() {
    let condition = compare(
        ComparisonOp::LessThan,
        path("a", &["dateOfBirth"]),
        Expr::Function(Function::CurrentDate),
    );
    let query = artists_where(condition, &[]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.DATE_OF_BIRTH < {{fn CURDATE()}}")
    );
}

#[test]
fn db_path_reads_column() {
    let condition = eq(
        Expr::DbPath(Path::new("a", &["ARTIST_ID"])),
        integer(1),
    );
    let query = artists_where(condition, &[]);
    assert_eq!(
        query.sql,
        format!("{ARTIST_COLUMNS} WHERE t0.ARTIST_ID = #bind($id0 'INTEGER')")
    );
}
