//! Renders a statement tree to indented lines.
//!
//! Clause keywords sit on their own line at the current level and their items
//! one level deeper, comma-terminated except the last. LIMIT, function calls
//! and CASE inside conditions stay on one line.

use std::sync::LazyLock;

use crate::error::{ErrorSite, InvalidSql};
use crate::statement::*;

pub const INDENT_WIDTH: usize = 4;

/// Pre-computed indentation for the nesting levels the parser allows.
static INDENT_CACHE: LazyLock<Vec<String>> = LazyLock::new(|| {
    (0..=crate::parser::MAX_DEPTH * 3)
        .map(|level| " ".repeat(level * INDENT_WIDTH))
        .collect()
});

fn indentation(level: usize) -> std::borrow::Cow<'static, str> {
    match INDENT_CACHE.get(level) {
        Some(cached) => std::borrow::Cow::Borrowed(cached.as_str()),
        None => std::borrow::Cow::Owned(" ".repeat(level * INDENT_WIDTH)),
    }
}

type StyleResult = Result<(), InvalidSql>;

/// Render statements to lines. The caller joins them with newlines.
pub fn style(statements: &[Statement]) -> Result<Vec<String>, InvalidSql> {
    let mut styler = Styler::default();
    styler.style_statements(statements, 0)?;
    Ok(styler.lines)
}

#[derive(Default)]
struct Styler {
    lines: Vec<String>,
}

impl Styler {
    fn push(&mut self, level: usize, text: &str) {
        let mut line = String::with_capacity(level * INDENT_WIDTH + text.len());
        line.push_str(&indentation(level));
        line.push_str(text);
        self.lines.push(line);
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Append to the last rendered line.
    fn append(&mut self, text: &str) -> StyleResult {
        match self.lines.last_mut() {
            Some(line) => {
                line.push_str(text);
                Ok(())
            }
            None => Err(InvalidSql::UnexpectedToken(ErrorSite::new(0, text))),
        }
    }

    /// Keyword line, then one item per line one level deeper.
    fn style_list<T>(
        &mut self,
        keyword: &str,
        items: &[T],
        level: usize,
        mut render: impl FnMut(&mut Self, &T, usize) -> StyleResult,
    ) -> StyleResult {
        self.push(level, keyword);
        for (i, item) in items.iter().enumerate() {
            render(self, item, level + 1)?;
            if i + 1 < items.len() {
                self.append(",")?;
            }
        }
        Ok(())
    }

    fn style_statements(&mut self, statements: &[Statement], level: usize) -> StyleResult {
        for (i, statement) in statements.iter().enumerate() {
            match statement {
                Statement::Select(select) => {
                    self.style_list(&select.value, &select.columns, level, Self::style_expr)?
                }
                Statement::From(from) => self.style_from(from, level)?,
                Statement::Where(filter) | Statement::Having(filter) => {
                    self.push(level, &filter.value);
                    self.style_conditions(&filter.conditions, level + 1, None)?;
                }
                Statement::GroupBy(group_by) => {
                    self.style_list(&group_by.value, &group_by.values, level, |s, v, l| {
                        s.push(l, &value_text(v));
                        Ok(())
                    })?;
                    if group_by.with_rollup {
                        self.append(" WITH ROLLUP")?;
                    }
                }
                Statement::OrderBy(order_by) => {
                    self.style_list(&order_by.value, &order_by.values, level, |s, v, l| {
                        s.push(l, &value_text(v));
                        Ok(())
                    })?
                }
                Statement::Limit(limit) => self.push(level, &limit_text(limit)),
                Statement::Insert(insert) => self.style_insert(insert, level)?,
                Statement::Semicolon => {
                    self.append(";")?;
                    let more = statements[i + 1..]
                        .iter()
                        .any(|s| !matches!(s, Statement::Semicolon));
                    if more {
                        self.blank();
                        self.blank();
                    }
                }
            }
        }
        Ok(())
    }

    fn style_expr(&mut self, expr: &Expr, level: usize) -> StyleResult {
        match expr {
            Expr::Case(case) => self.style_case(case, level),
            _ => {
                self.push(level, &expr_text(expr)?);
                Ok(())
            }
        }
    }

    fn style_case(&mut self, case: &Case, level: usize) -> StyleResult {
        self.push(level, "CASE");
        for when in &case.whens {
            let line = format!(
                "WHEN {} THEN {}",
                conditions_text(&when.conditions)?,
                expr_text(&when.result)?
            );
            self.push(level + 1, &line);
        }
        if let Some(else_result) = &case.else_result {
            self.push(level + 1, &format!("ELSE {}", expr_text(else_result)?));
        }
        self.push(level, &format!("END{}", alias_text(&case.alias)));
        Ok(())
    }

    fn style_from(&mut self, from: &From, level: usize) -> StyleResult {
        self.push(level, &from.value);
        for (i, item) in from.items.iter().enumerate() {
            match item {
                FromItem::Table(table) => self.style_table_ref(table, level + 1, None)?,
                FromItem::Join(join) => {
                    self.style_table_ref(&join.table, level + 1, Some(&join.value))?;
                    if let Some(on) = &join.on {
                        self.style_conditions(&on.conditions, level + 2, Some(&on.value))?;
                    }
                }
            }
            if matches!(from.items.get(i + 1), Some(FromItem::Table(_))) {
                self.append(",")?;
            }
        }
        Ok(())
    }

    fn style_table_ref(&mut self, table: &TableRef, level: usize, lead: Option<&str>) -> StyleResult {
        let lead = lead.map(|keyword| format!("{keyword} ")).unwrap_or_default();
        match table {
            TableRef::Table(value) => self.push(level, &format!("{lead}{}", value_text(value))),
            TableRef::SubSelect(sub) => {
                self.push(level, &format!("{lead}("));
                self.style_statements(&sub.statements, level + 1)?;
                self.append(&format!("){}", alias_text(&sub.alias)))?;
            }
        }
        Ok(())
    }

    /// One condition or group per line; a link prefixes the line after it.
    fn style_conditions(
        &mut self,
        items: &[ConditionItem],
        level: usize,
        first_prefix: Option<&str>,
    ) -> StyleResult {
        let mut prefix = first_prefix.map(str::to_string);
        for item in items {
            match item {
                ConditionItem::Link(link) => prefix = Some(link.clone()),
                ConditionItem::Condition(condition) => {
                    self.style_condition(condition, level, prefix.take())?
                }
                ConditionItem::Group(group) => {
                    let head = join_words([
                        prefix.take(),
                        group.not.then(|| "NOT".to_string()),
                        Some("(".to_string()),
                    ]);
                    self.push(level, &head);
                    self.style_conditions(&group.conditions, level + 1, None)?;
                    self.append(")")?;
                }
            }
        }
        Ok(())
    }

    fn style_condition(
        &mut self,
        condition: &Condition,
        level: usize,
        prefix: Option<String>,
    ) -> StyleResult {
        let head = join_words([prefix, Some(condition_head(condition)?)]);
        match predicate_target(&condition.predicate) {
            None => self.push(level, &head),
            Some(InTarget::List(items)) if items.is_empty() => {
                self.push(level, &format!("{head} ()"))
            }
            Some(InTarget::List(items)) => {
                self.push(level, &format!("{head} ("));
                for (i, item) in items.iter().enumerate() {
                    self.push(level + 1, &expr_text(item)?);
                    if i + 1 < items.len() {
                        self.append(",")?;
                    }
                }
                self.append(")")?;
            }
            Some(InTarget::SubSelect(statements)) => {
                self.push(level, &format!("{head} ("));
                self.style_statements(statements, level + 1)?;
                self.append(")")?;
            }
        }
        Ok(())
    }

    fn style_insert(&mut self, insert: &Insert, level: usize) -> StyleResult {
        self.push(level, &insert.value);
        let table = if insert.columns.is_empty() {
            insert.table.clone()
        } else {
            format!("{} ({})", insert.table, insert.columns.join(", "))
        };
        self.push(level + 1, &table);
        match &insert.source {
            InsertSource::Values { value, rows } => {
                self.style_list(value, rows, level, |s, row, l| {
                    s.push(l, &format!("({})", exprs_text(row)?));
                    Ok(())
                })?;
            }
            InsertSource::Select(statements) => self.style_statements(statements, level)?,
        }
        Ok(())
    }
}

// ---- Inline rendering ----

fn join_words<const N: usize>(words: [Option<String>; N]) -> String {
    words.into_iter().flatten().collect::<Vec<_>>().join(" ")
}

fn alias_text(alias: &Option<Alias>) -> String {
    match alias {
        Some(Alias {
            as_keyword: true,
            name,
        }) => format!(" AS {name}"),
        Some(Alias { name, .. }) => format!(" {name}"),
        None => String::new(),
    }
}

fn value_text(value: &Value) -> String {
    let mut text = value.text.clone();
    if let Some(sort) = &value.sort {
        text.push(' ');
        text.push_str(sort);
    }
    text.push_str(&alias_text(&value.alias));
    text
}

/// `LIMIT n`, `LIMIT offset, n` or `LIMIT n OFFSET offset`.
fn limit_text(limit: &Limit) -> String {
    match (&limit.offset, &limit.offset_keyword) {
        (Some(offset), Some(keyword)) => {
            format!("{} {} {keyword} {offset}", limit.value, limit.row_count)
        }
        (Some(offset), None) => format!("{} {offset}, {}", limit.value, limit.row_count),
        (None, _) => format!("{} {}", limit.value, limit.row_count),
    }
}

fn exprs_text(exprs: &[Expr]) -> Result<String, InvalidSql> {
    let texts = exprs.iter().map(expr_text).collect::<Result<Vec<_>, _>>()?;
    Ok(texts.join(", "))
}

fn expr_text(expr: &Expr) -> Result<String, InvalidSql> {
    Ok(match expr {
        Expr::Value(value) => value_text(value),
        Expr::Func(func) => {
            let modifier = func.modifier.as_ref().map(|m| format!("{m} "));
            format!(
                "{}({}{}){}",
                func.name,
                modifier.unwrap_or_default(),
                exprs_text(&func.args)?,
                alias_text(&func.alias)
            )
        }
        Expr::Case(case) => case_text(case)?,
        Expr::Unary(unary) => {
            let operand = expr_text(&unary.operand)?;
            // `- -1` must not become the comment `--1`
            let gap = if unary.op.ends_with('-') && operand.starts_with('-') {
                " "
            } else {
                ""
            };
            format!("{}{gap}{operand}{}", unary.op, alias_text(&unary.alias))
        }
        Expr::Operation(operation) => {
            let mut text = expr_text(&operation.first)?;
            for (op, term) in &operation.rest {
                text.push(' ');
                text.push_str(op);
                text.push(' ');
                text.push_str(&expr_text(term)?);
            }
            text.push_str(&alias_text(&operation.alias));
            text
        }
    })
}

fn case_text(case: &Case) -> Result<String, InvalidSql> {
    let mut parts = vec!["CASE".to_string()];
    for when in &case.whens {
        parts.push(format!(
            "WHEN {} THEN {}",
            conditions_text(&when.conditions)?,
            expr_text(&when.result)?
        ));
    }
    if let Some(else_result) = &case.else_result {
        parts.push(format!("ELSE {}", expr_text(else_result)?));
    }
    parts.push(format!("END{}", alias_text(&case.alias)));
    Ok(parts.join(" "))
}

/// `left op right` up to, but excluding, any parenthesized target.
fn condition_head(condition: &Condition) -> Result<String, InvalidSql> {
    let left = expr_text(&condition.left)?;
    let not = if condition.not { "NOT " } else { "" };
    Ok(match &condition.predicate {
        Predicate::Compare {
            op,
            quantifier,
            right,
        } => match (quantifier, right) {
            (Some(quantifier), _) => format!("{not}{left} {op} {quantifier}"),
            (None, Operand::Expr(right)) => format!("{not}{left} {op} {}", expr_text(right)?),
            (None, Operand::List(_)) => format!("{not}{left} {op}"),
        },
        Predicate::Between { op, low, high } => format!(
            "{not}{left} {op} {} AND {}",
            expr_text(low)?,
            expr_text(high)?
        ),
        Predicate::IsNull { op } => format!("{not}{left} {op} NULL"),
        Predicate::In { op, .. } => format!("{not}{left} {op}"),
    })
}

fn predicate_target(predicate: &Predicate) -> Option<&InTarget> {
    match predicate {
        Predicate::Compare {
            right: Operand::List(target),
            ..
        }
        | Predicate::In { target, .. } => Some(target),
        _ => None,
    }
}

/// Styled lines joined into one, with no space after an opening `(`.
fn flatten(lines: &[String]) -> String {
    let mut flat = String::new();
    for line in lines.iter().map(|line| line.trim()).filter(|line| !line.is_empty()) {
        if !flat.is_empty() && !flat.ends_with('(') {
            flat.push(' ');
        }
        flat.push_str(line);
    }
    flat
}

/// A condition chain on a single line, as used inside `WHEN`.
fn conditions_text(items: &[ConditionItem]) -> Result<String, InvalidSql> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        match item {
            ConditionItem::Link(link) => parts.push(link.clone()),
            ConditionItem::Condition(condition) => {
                let head = condition_head(condition)?;
                parts.push(match predicate_target(&condition.predicate) {
                    None => head,
                    Some(InTarget::List(items)) => format!("{head} ({})", exprs_text(items)?),
                    Some(InTarget::SubSelect(statements)) => {
                        format!("{head} ({})", flatten(&style(statements)?))
                    }
                });
            }
            ConditionItem::Group(group) => {
                let not = if group.not { "NOT " } else { "" };
                parts.push(format!("{not}({})", conditions_text(&group.conditions)?));
            }
        }
    }
    Ok(parts.join(" "))
}
