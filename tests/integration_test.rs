use format_sql::{format_sql, parse, style, tokenize, InvalidSql};
use pretty_assertions::assert_eq;

fn assert_format(sql: &str, expected: &[&str]) {
    let result = format_sql(sql).unwrap_or_else(|e| panic!("format failed for {sql:?}: {e}"));
    assert_eq!(result, expected.join("\n"));
    // Formatting is idempotent
    assert_eq!(format_sql(&result).unwrap(), result, "second pass changed {sql:?}");
}

#[test]
fn test_select_limit() {
    assert_format(
        "SELECT * FROM my_table LIMIT 65",
        &["SELECT", "    *", "FROM", "    my_table", "LIMIT 65"],
    );
}

#[test]
fn test_limit_offset_forms() {
    assert_format(
        "SELECT * FROM my_table LIMIT 65,90",
        &["SELECT", "    *", "FROM", "    my_table", "LIMIT 65, 90"],
    );
    assert_format(
        "select * from my_table limit 90 offset 65",
        &["SELECT", "    *", "FROM", "    my_table", "LIMIT 90 OFFSET 65"],
    );
}

#[test]
fn test_semicolon_attaches_to_last_line() {
    assert_format(
        "SELECT * FROM my_table;",
        &["SELECT", "    *", "FROM", "    my_table;"],
    );
}

#[test]
fn test_left_join_without_on() {
    assert_format(
        "SELECT * FROM my_table AS t1 LEFT JOIN my_table2 WHERE t = 3 AND x = '78';",
        &[
            "SELECT",
            "    *",
            "FROM",
            "    my_table AS t1",
            "    LEFT JOIN my_table2",
            "WHERE",
            "    t = 3",
            "    AND x = '78';",
        ],
    );
}

#[test]
fn test_columns_functions_and_in_list() {
    assert_format(
        "SELECT x1,x2 AS t,x3,count(1) FROM my_table AS t1 LEFT JOIN my_table2 WHERE t=3 OR x in ('78','d');",
        &[
            "SELECT",
            "    x1,",
            "    x2 AS t,",
            "    x3,",
            "    count(1)",
            "FROM",
            "    my_table AS t1",
            "    LEFT JOIN my_table2",
            "WHERE",
            "    t = 3",
            "    OR x IN (",
            "        '78',",
            "        'd');",
        ],
    );
}

#[test]
fn test_in_subselect() {
    assert_format(
        "SELECT name, some_par1  FROM  zauber_table WHERE  some_par1 IN (SELECT some_par1 FROM some_special_table)",
        &[
            "SELECT",
            "    name,",
            "    some_par1",
            "FROM",
            "    zauber_table",
            "WHERE",
            "    some_par1 IN (",
            "        SELECT",
            "            some_par1",
            "        FROM",
            "            some_special_table)",
        ],
    );
}

#[test]
fn test_quantified_subselect() {
    assert_format(
        "SELECT name, some_par1 FROM zauber_table WHERE some_par1 < ALL ( select some_par1 FROM some_special_table )",
        &[
            "SELECT",
            "    name,",
            "    some_par1",
            "FROM",
            "    zauber_table",
            "WHERE",
            "    some_par1 < ALL (",
            "        SELECT",
            "            some_par1",
            "        FROM",
            "            some_special_table)",
        ],
    );
}

#[test]
fn test_where_in_select_nested_two_levels() {
    assert_format(
        "select a from t where x in (select * from k)",
        &[
            "SELECT",
            "    a",
            "FROM",
            "    t",
            "WHERE",
            "    x IN (",
            "        SELECT",
            "            *",
            "        FROM",
            "            k)",
        ],
    );
}

#[test]
fn test_joins_with_on_and_groups() {
    assert_format(
        "SELECT * FROM uiop AS s INNER JOIN rag AS r ON s.r_id = r.id GROUP BY s.id HAVING cnt > 0 AND NOT (min_number = 1 AND max_number = cnt)",
        &[
            "SELECT",
            "    *",
            "FROM",
            "    uiop AS s",
            "    INNER JOIN rag AS r",
            "        ON s.r_id = r.id",
            "GROUP BY",
            "    s.id",
            "HAVING",
            "    cnt > 0",
            "    AND NOT (",
            "        min_number = 1",
            "        AND max_number = cnt)",
        ],
    );
}

#[test]
fn test_condition_group() {
    assert_format(
        r#"SELECT * FROM mart AS q WHERE m_id = "14" AND (qt IS NULL OR qt = 0)"#,
        &[
            "SELECT",
            "    *",
            "FROM",
            "    mart AS q",
            "WHERE",
            r#"    m_id = "14""#,
            "    AND (",
            "        qt IS NULL",
            "        OR qt = 0)",
        ],
    );
}

#[test]
fn test_chained_joins() {
    assert_format(
        "SELECT * FROM tab1 JOIN tab2 ON tab1.id = tab2.id JOIN tab3 ON tab2.id = tab3.id",
        &[
            "SELECT",
            "    *",
            "FROM",
            "    tab1",
            "    JOIN tab2",
            "        ON tab1.id = tab2.id",
            "    JOIN tab3",
            "        ON tab2.id = tab3.id",
        ],
    );
}

#[test]
fn test_subselect_in_from_and_join() {
    assert_format(
        "SELECT * FROM (SELECT x FROM tab1) AS t JOIN tab2 ON t.id = tab.id",
        &[
            "SELECT",
            "    *",
            "FROM",
            "    (",
            "        SELECT",
            "            x",
            "        FROM",
            "            tab1) AS t",
            "    JOIN tab2",
            "        ON t.id = tab.id",
        ],
    );
}

#[test]
fn test_group_by_having_limit() {
    assert_format(
        "SELECT country, product, SUM(profit) FROM sales left join x on x.id=sales.k GROUP BY country, product with rollup HAVING f > 7 and fk=9 limit 5;",
        &[
            "SELECT",
            "    country,",
            "    product,",
            "    SUM(profit)",
            "FROM",
            "    sales",
            "    LEFT JOIN x",
            "        ON x.id = sales.k",
            "GROUP BY",
            "    country,",
            "    product WITH ROLLUP",
            "HAVING",
            "    f > 7",
            "    AND fk = 9",
            "LIMIT 5;",
        ],
    );
}

#[test]
fn test_order_by() {
    assert_format(
        "select a, b from t order by a desc, 2 asc, b",
        &[
            "SELECT",
            "    a,",
            "    b",
            "FROM",
            "    t",
            "ORDER BY",
            "    a DESC,",
            "    2 ASC,",
            "    b",
        ],
    );
}

#[test]
fn test_between_is_not_null_and_like() {
    assert_format(
        "select * from t where a not between 1 and 10 and b is not null or c not like 'x%'",
        &[
            "SELECT",
            "    *",
            "FROM",
            "    t",
            "WHERE",
            "    a NOT BETWEEN 1 AND 10",
            "    AND b IS NOT NULL",
            "    OR c NOT LIKE 'x%'",
        ],
    );
}

#[test]
fn test_case_expression() {
    assert_format(
        "SELECT id, CASE WHEN x = 1 THEN 'a' WHEN x IN (2, 3) THEN 'b' ELSE 'c' END AS label FROM t",
        &[
            "SELECT",
            "    id,",
            "    CASE",
            "        WHEN x = 1 THEN 'a'",
            "        WHEN x IN (2, 3) THEN 'b'",
            "        ELSE 'c'",
            "    END AS label",
            "FROM",
            "    t",
        ],
    );
}

#[test]
fn test_case_without_end_gets_one() {
    assert_format(
        "select case when a is null then 0 else a end, b",
        &[
            "SELECT",
            "    CASE",
            "        WHEN a IS NULL THEN 0",
            "        ELSE a",
            "    END,",
            "    b",
        ],
    );
    assert_eq!(
        format_sql("select case when a = 1 then 2").unwrap(),
        "SELECT\n    CASE\n        WHEN a = 1 THEN 2\n    END"
    );
}

#[test]
fn test_insert_values() {
    assert_format(
        "insert into users (id, name) values (1, 'ann'), (2, %s);",
        &[
            "INSERT INTO",
            "    users (id, name)",
            "VALUES",
            "    (1, 'ann'),",
            "    (2, %s);",
        ],
    );
}

#[test]
fn test_insert_select() {
    assert_format(
        "INSERT INTO archive SELECT * FROM users WHERE active = 0",
        &[
            "INSERT INTO",
            "    archive",
            "SELECT",
            "    *",
            "FROM",
            "    users",
            "WHERE",
            "    active = 0",
        ],
    );
}

#[test]
fn test_multi_statement_separation() {
    assert_format(
        "SELECT a FROM t1; SELECT b FROM t2",
        &[
            "SELECT", "    a", "FROM", "    t1;", "", "", "SELECT", "    b", "FROM", "    t2",
        ],
    );
}

#[test]
fn test_keywords_are_uppercased() {
    let result = format_sql("sElEcT a FrOm t Left   Join u oN t.id = u.id wHeRe b = 1").unwrap();
    for keyword in ["SELECT", "FROM", "LEFT JOIN", "ON", "WHERE"] {
        assert!(result.contains(keyword), "{keyword} missing in {result}");
    }
    assert!(!result.contains("Left"));
}

#[test]
fn test_identifiers_and_literals_keep_case() {
    let result = format_sql("select MixedCase, 'Hello World', `Quoted`.`Name` from Tbl").unwrap();
    assert!(result.contains("MixedCase"));
    assert!(result.contains("'Hello World'"));
    assert!(result.contains("`Quoted`.`Name`"));
    assert!(result.contains("Tbl"));
}

#[test]
fn test_comma_discipline() {
    let result = format_sql("select a, b, c, d from t1, t2, t3 group by a, b order by c, d").unwrap();
    let with_comma = result.lines().filter(|l| l.ends_with(',')).count();
    // (4 - 1) + (3 - 1) + (2 - 1) + (2 - 1)
    assert_eq!(with_comma, 7);
}

#[test]
fn test_token_order_is_preserved() {
    let sql = "select a,  b from   t where x = 'a  b' and y in (1,2)";
    let texts: Vec<String> = tokenize(sql)
        .unwrap()
        .iter()
        .map(|t| t.text.to_string())
        .collect();
    assert_eq!(
        texts.join(" "),
        "select a , b from t where x = 'a  b' and y in ( 1 , 2 )"
    );
}

#[test]
fn test_every_character_survives() {
    let sql = "select a - b, price / 2, a || b, -x, count(distinct id) from t where c % 2 = 0 and d != {id}";
    let squeeze = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    };
    let texts: String = tokenize(sql).unwrap().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(squeeze(&texts), squeeze(sql));
    assert_eq!(squeeze(&format_sql(sql).unwrap()), squeeze(sql));
}

#[test]
fn test_arithmetic_and_concatenation() {
    assert_format(
        "select a - b from t",
        &["SELECT", "    a - b", "FROM", "    t"],
    );
    assert_format(
        "select price / 2 from t",
        &["SELECT", "    price / 2", "FROM", "    t"],
    );
    assert_format(
        "select a || b from t",
        &["SELECT", "    a || b", "FROM", "    t"],
    );
    assert_format(
        "select a+b * 2 total from t where a-1 > 0",
        &["SELECT", "    a + b * 2 total", "FROM", "    t", "WHERE", "    a - 1 > 0"],
    );
}

#[test]
fn test_count_distinct() {
    assert_format(
        "select count(distinct a) from t",
        &["SELECT", "    count(DISTINCT a)", "FROM", "    t"],
    );
}

#[test]
fn test_doubled_semicolon() {
    assert_format(
        "select x from t where y = 1;;",
        &["SELECT", "    x", "FROM", "    t", "WHERE", "    y = 1;"],
    );
}

#[test]
fn test_pipeline_stages_compose() {
    let sql = "select a from t;";
    let statements = parse(&tokenize(sql).unwrap()).unwrap();
    assert_eq!(style(&statements).unwrap().join("\n"), format_sql(sql).unwrap());
}

#[test]
fn test_empty_input() {
    assert_eq!(format_sql("").unwrap(), "");
    assert_eq!(format_sql("  -- only a comment\n").unwrap(), "");
}

#[test]
fn test_errors_identify_clause() {
    let cases: &[(&str, &str)] = &[
        ("select a from t limit", "LIMIT"),
        ("select a from t where x", "condition"),
        ("select 'abc", "string literal"),
        ("select from t", "SELECT"),
        ("select a from t group by 'x'", "GROUP BY"),
        ("select a from t order by count(a)", "ORDER BY"),
        ("select a from 42", "identifier"),
        ("select count(a b)", "function call"),
        ("select count(a", "parenthesis"),
        ("Select x T K", "statement"),
        ("select a [b] from t", "statement"),
        ("select a +", "SELECT"),
    ];
    for (sql, clause) in cases {
        let err = format_sql(sql).unwrap_err();
        assert_eq!(err.clause(), *clause, "unexpected error for {sql:?}: {err}");
    }
}

#[test]
fn test_specific_error_variants() {
    assert!(matches!(
        format_sql("LIMIT"),
        Err(InvalidSql::InvalidLimit(_))
    ));
    assert!(matches!(
        format_sql("WHERE x"),
        Err(InvalidSql::InvalidCondition(_))
    ));
    assert!(matches!(
        format_sql("select a from t where b in (1, 2"),
        Err(InvalidSql::UnbalancedParenthesis(_))
    ));
}

#[test]
fn test_deep_nesting_is_rejected_not_overflowed() {
    let depth = 10_000;
    let sql = format!(
        "select a from t where {}a = 1{}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    assert!(matches!(
        format_sql(&sql),
        Err(InvalidSql::NestingTooDeep { .. })
    ));
}

#[test]
fn test_reformatting_is_stable_across_inputs() {
    let inputs = [
        "select a, count(*) n from t join u on t.id = u.id and (u.x = 1 or u.y in (select y from z)) group by a having count(*) > 1 order by n desc limit 10;",
        "insert ignore into t (a) values (1), (2); select * from t",
        "select case when a between 1 and 2 then f(a, g(b)) end c from t where not a = b",
    ];
    for sql in inputs {
        let once = format_sql(sql).unwrap();
        assert_eq!(format_sql(&once).unwrap(), once, "unstable for {sql:?}");
    }
}
