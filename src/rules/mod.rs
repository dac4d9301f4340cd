pub mod core;

use crate::action::Action;
use crate::rule::Rule;
use crate::token::TokenKind;

/// Build a keyword rule from alternative phrases. Phrases are tried left to
/// right, so longer phrases must precede their prefixes. Internal spaces
/// match any whitespace run; the whole phrase must end on a word boundary.
fn keyword_rule(name: &str, priority: u32, phrases: &[&str], kind: TokenKind) -> Rule {
    let alternatives: Vec<String> = phrases
        .iter()
        .map(|phrase| phrase.split(' ').collect::<Vec<_>>().join(r"\s+"))
        .collect();
    Rule::new(
        name,
        priority,
        &format!(r"(?:{})\b", alternatives.join("|")),
        Action::AddToken { kind },
    )
}

/// Build the full rule set: CORE rules plus SQL keywords, sorted by priority.
pub fn main_rules() -> Vec<Rule> {
    let mut rules = core::core_rules();

    // ---- Clause keywords ----
    rules.push(keyword_rule(
        "select",
        1000,
        &[
            "select distinct",
            "select sql_no_cache",
            "select all",
            "select",
        ],
        TokenKind::Select,
    ));
    rules.push(keyword_rule(
        "insert",
        1010,
        &["insert ignore into", "insert into"],
        TokenKind::Insert,
    ));
    rules.push(keyword_rule("values", 1020, &["values"], TokenKind::Values));
    rules.push(keyword_rule("from", 1030, &["from"], TokenKind::From));
    rules.push(keyword_rule("where", 1040, &["where"], TokenKind::Where));
    rules.push(keyword_rule("group_by", 1050, &["group by"], TokenKind::GroupBy));
    rules.push(keyword_rule("having", 1060, &["having"], TokenKind::Having));
    rules.push(keyword_rule("order_by", 1070, &["order by"], TokenKind::OrderBy));
    rules.push(keyword_rule("limit", 1080, &["limit"], TokenKind::Limit));
    rules.push(keyword_rule("offset", 1090, &["offset"], TokenKind::Offset));
    rules.push(keyword_rule(
        "with_rollup",
        1100,
        &["with rollup"],
        TokenKind::WithRollup,
    ));

    // ---- Joins (longest first) ----
    rules.push(keyword_rule(
        "join",
        1110,
        &[
            "natural left outer join",
            "natural right outer join",
            "natural left join",
            "natural right join",
            "natural join",
            "cross join",
            "inner join",
            "left outer join",
            "left join",
            "right outer join",
            "right join",
            "full outer join",
            "full join",
            "straight_join",
            "join",
        ],
        TokenKind::Join,
    ));
    rules.push(keyword_rule("on", 1120, &["on"], TokenKind::On));
    rules.push(keyword_rule("as", 1130, &["as"], TokenKind::As));
    rules.push(keyword_rule("asc", 1140, &["asc"], TokenKind::Asc));
    rules.push(keyword_rule("desc", 1141, &["desc"], TokenKind::Desc));

    // ---- Condition keywords ----
    // Every NOT-prefixed phrase must match before the bare NOT at 1190.
    rules.push(keyword_rule(
        "between",
        1150,
        &["not between", "between"],
        TokenKind::Between,
    ));
    rules.push(keyword_rule("in", 1160, &["not in", "in"], TokenKind::In));
    rules.push(keyword_rule("is", 1170, &["is not", "is"], TokenKind::Is));
    rules.push(keyword_rule(
        "compare_word",
        1180,
        &[
            "not like",
            "like binary",
            "like",
            "not regexp",
            "regexp",
            "rlike",
        ],
        TokenKind::Compare,
    ));
    rules.push(keyword_rule("not", 1190, &["not"], TokenKind::Not));
    rules.push(keyword_rule("null", 1200, &["null"], TokenKind::Null));
    rules.push(keyword_rule("link", 1210, &["and", "or"], TokenKind::Link));
    rules.push(keyword_rule(
        "quantifier",
        1220,
        &["all", "any", "some"],
        TokenKind::Quantifier,
    ));

    // ---- CASE expressions ----
    rules.push(keyword_rule("case", 1230, &["case"], TokenKind::Case));
    rules.push(keyword_rule("when", 1231, &["when"], TokenKind::When));
    rules.push(keyword_rule("then", 1232, &["then"], TokenKind::Then));
    rules.push(keyword_rule("else", 1233, &["else"], TokenKind::Else));
    rules.push(keyword_rule("end", 1234, &["end"], TokenKind::End));

    rules.sort_by_key(|rule| rule.priority);
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(input: &str) -> Option<(String, usize)> {
        main_rules().into_iter().find_map(|rule| {
            rule.match_len(input)
                .map(|len| (rule.name.clone(), len))
        })
    }

    #[test]
    fn test_rules_sorted_by_priority() {
        let rules = main_rules();
        assert!(rules.windows(2).all(|w| w[0].priority <= w[1].priority));
        assert_eq!(rules.last().unwrap().name, "name");
    }

    #[test]
    fn test_multi_word_keywords_span_whitespace() {
        assert_eq!(first_match("GROUP   BY x"), Some(("group_by".into(), 10)));
        assert_eq!(first_match("left\nouter join t"), Some(("join".into(), 15)));
        assert_eq!(
            first_match("select distinct a"),
            Some(("select".into(), 15))
        );
    }

    #[test]
    fn test_keywords_respect_word_boundaries() {
        assert_eq!(first_match("into"), Some(("name".into(), 4)));
        assert_eq!(first_match("order_id"), Some(("name".into(), 8)));
        assert_eq!(first_match("selected"), Some(("name".into(), 8)));
        assert_eq!(first_match("in ("), Some(("in".into(), 2)));
    }

    #[test]
    fn test_not_phrases_win_over_bare_not() {
        assert_eq!(first_match("not in (1)"), Some(("in".into(), 6)));
        assert_eq!(first_match("NOT LIKE 'a'"), Some(("compare_word".into(), 8)));
        assert_eq!(first_match("not (a = 1)"), Some(("not".into(), 3)));
    }
}
