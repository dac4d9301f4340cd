//! Recursive-descent parser from tokens to the statement tree.
//!
//! Each clause has its own parse function. Parsing stops at `;` between
//! statements, and at `)` when the current query is nested inside parentheses.

use smallvec::SmallVec;

use crate::error::{ErrorSite, InvalidSql};
use crate::statement::*;
use crate::token::{Token, TokenKind};

/// Deepest allowed parenthesis nesting (subqueries, groups, calls, lists).
pub const MAX_DEPTH: usize = 64;

type ParseResult<T> = Result<T, InvalidSql>;

/// Constructor of the error to raise at the current token.
type ErrorKind = fn(ErrorSite) -> InvalidSql;

/// Parse a token sequence into top-level statements.
pub fn parse(tokens: &[Token]) -> ParseResult<Vec<Statement>> {
    Parser::new(tokens).parse()
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            let clauses = self.parse_statement()?;
            let empty = clauses.is_empty();
            statements.extend(clauses);
            match self.peek_kind() {
                None => break,
                Some(TokenKind::Semicolon) if !empty => {
                    self.advance();
                    statements.push(Statement::Semicolon);
                }
                // `;;`: the empty statement between them is dropped
                Some(TokenKind::Semicolon) if statements.last() == Some(&Statement::Semicolon) => {
                    self.advance();
                }
                Some(TokenKind::ParenClose) => {
                    return Err(self.error(InvalidSql::UnbalancedParenthesis));
                }
                Some(_) => return Err(self.error(InvalidSql::UnexpectedToken)),
            }
        }
        Ok(statements)
    }

    // ---- Token helpers ----

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_nth_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'a Token> {
        if self.peek_kind() == Some(kind) {
            self.advance()
        } else {
            None
        }
    }

    /// Consume the current token and return its normalized keyword text.
    fn keyword(&mut self) -> String {
        self.advance().map(Token::normalized).unwrap_or_default()
    }

    fn error(&self, kind: ErrorKind) -> InvalidSql {
        let site = match self.peek() {
            Some(token) => ErrorSite::new(self.pos, token.text.as_str()),
            None => ErrorSite::end_of_input(self.pos),
        };
        kind(site)
    }

    /// Inside parentheses, running out of tokens means the `)` is missing.
    fn error_in_parens(&self, kind: ErrorKind) -> InvalidSql {
        if self.peek().is_none() {
            self.error(InvalidSql::UnbalancedParenthesis)
        } else {
            self.error(kind)
        }
    }

    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_DEPTH {
            let site = match self.peek() {
                Some(token) => ErrorSite::new(self.pos, token.text.as_str()),
                None => ErrorSite::end_of_input(self.pos),
            };
            return Err(InvalidSql::NestingTooDeep {
                site,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Consume `(` and enter one nesting level.
    fn open_paren(&mut self) -> ParseResult<()> {
        if self.peek_kind() != Some(TokenKind::ParenOpen) {
            return Err(self.error(InvalidSql::UnbalancedParenthesis));
        }
        self.descend()?;
        self.advance();
        Ok(())
    }

    /// Consume `)` and leave one nesting level. Anything else is `otherwise`.
    fn close_paren(&mut self, otherwise: ErrorKind) -> ParseResult<()> {
        if self.eat(TokenKind::ParenClose).is_none() {
            return Err(self.error_in_parens(otherwise));
        }
        self.depth -= 1;
        Ok(())
    }

    fn parse_comma_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.eat(TokenKind::Comma).is_some() {
            items.push(item(self)?);
        }
        Ok(items)
    }

    // ---- Statements ----

    /// Parse clauses until `;`, an unmatched `)` or the end of input.
    fn parse_statement(&mut self) -> ParseResult<Vec<Statement>> {
        let mut clauses = Vec::new();
        while let Some(kind) = self.peek_kind() {
            let clause = match kind {
                TokenKind::Select => Statement::Select(self.parse_select()?),
                TokenKind::From => Statement::From(self.parse_from()?),
                TokenKind::Where => Statement::Where(self.parse_filter()?),
                TokenKind::Having => Statement::Having(self.parse_filter()?),
                TokenKind::GroupBy => Statement::GroupBy(self.parse_group_by()?),
                TokenKind::OrderBy => Statement::OrderBy(self.parse_order_by()?),
                TokenKind::Limit => Statement::Limit(self.parse_limit()?),
                TokenKind::Insert => Statement::Insert(self.parse_insert()?),
                TokenKind::Semicolon | TokenKind::ParenClose => break,
                _ => return Err(self.error(InvalidSql::UnexpectedToken)),
            };
            clauses.push(clause);
        }
        Ok(clauses)
    }

    /// `( SELECT ... )` as a nested statement sequence.
    fn parse_subquery(&mut self) -> ParseResult<Vec<Statement>> {
        self.open_paren()?;
        let statements = self.parse_statement()?;
        self.close_paren(InvalidSql::UnexpectedToken)?;
        Ok(statements)
    }

    fn at_subquery(&self) -> bool {
        self.peek_kind() == Some(TokenKind::ParenOpen)
            && self.peek_nth_kind(1) == Some(TokenKind::Select)
    }

    fn parse_select(&mut self) -> ParseResult<Select> {
        let value = self.keyword();
        let columns = self.parse_comma_list(Self::parse_column)?;
        Ok(Select { value, columns })
    }

    fn parse_column(&mut self) -> ParseResult<Expr> {
        let mut column = self.parse_operand(InvalidSql::InvalidSelect)?;
        column.set_alias(self.parse_alias()?);
        Ok(column)
    }

    /// Optional `AS`, then an optional identifier, string or number.
    fn parse_alias(&mut self) -> ParseResult<Option<Alias>> {
        let as_keyword = self.eat(TokenKind::As).is_some();
        match self.peek() {
            Some(token)
                if matches!(
                    token.kind,
                    TokenKind::Identifier | TokenKind::Str | TokenKind::Number
                ) =>
            {
                self.advance();
                Ok(Some(Alias {
                    as_keyword,
                    name: token.text.to_string(),
                }))
            }
            _ if as_keyword => Err(self.error(InvalidSql::InvalidIdentifier)),
            _ => Ok(None),
        }
    }

    fn parse_from(&mut self) -> ParseResult<From> {
        let value = self.keyword();
        let mut items = vec![FromItem::Table(self.parse_table_ref()?)];
        loop {
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.advance();
                    items.push(FromItem::Table(self.parse_table_ref()?));
                }
                Some(TokenKind::Join) => items.push(FromItem::Join(self.parse_join()?)),
                _ => break,
            }
        }
        Ok(From { value, items })
    }

    fn parse_table_ref(&mut self) -> ParseResult<TableRef> {
        if self.peek_kind() == Some(TokenKind::Identifier) {
            let mut table = self.parse_literal();
            table.alias = self.parse_alias()?;
            Ok(TableRef::Table(table))
        } else if self.at_subquery() {
            let statements = self.parse_subquery()?;
            let alias = self.parse_alias()?;
            Ok(TableRef::SubSelect(SubSelect { statements, alias }))
        } else {
            Err(self.error(InvalidSql::InvalidIdentifier))
        }
    }

    fn parse_join(&mut self) -> ParseResult<Join> {
        let value = self.keyword();
        let table = self.parse_table_ref()?;
        let on = match self.eat(TokenKind::On) {
            Some(token) => Some(On {
                value: token.normalized(),
                conditions: self.parse_conditions()?,
            }),
            None => None,
        };
        Ok(Join { value, table, on })
    }

    fn parse_filter(&mut self) -> ParseResult<Filter> {
        let value = self.keyword();
        let conditions = self.parse_conditions()?;
        Ok(Filter { value, conditions })
    }

    // ---- Conditions ----

    /// `item (LINK item)*`
    fn parse_conditions(&mut self) -> ParseResult<Vec<ConditionItem>> {
        let mut items = vec![self.parse_condition_item()?];
        while let Some(link) = self.eat(TokenKind::Link) {
            items.push(ConditionItem::Link(link.normalized()));
            items.push(self.parse_condition_item()?);
        }
        Ok(items)
    }

    fn parse_condition_item(&mut self) -> ParseResult<ConditionItem> {
        let not = self.eat(TokenKind::Not).is_some();
        if self.peek_kind() == Some(TokenKind::ParenOpen) {
            self.open_paren()?;
            let conditions = self.parse_conditions()?;
            self.close_paren(InvalidSql::InvalidCondition)?;
            return Ok(ConditionItem::Group(Group { not, conditions }));
        }
        let left = self.parse_operand(InvalidSql::InvalidCondition)?;
        let predicate = self.parse_predicate()?;
        Ok(ConditionItem::Condition(Condition {
            not,
            left,
            predicate,
        }))
    }

    fn parse_predicate(&mut self) -> ParseResult<Predicate> {
        let Some(token) = self.peek() else {
            return Err(self.error(InvalidSql::InvalidCondition));
        };
        let op = token.normalized();
        match token.kind {
            TokenKind::Compare => {
                self.advance();
                if let Some(quantifier) = self.eat(TokenKind::Quantifier) {
                    if !self.at_subquery() {
                        return Err(self.error(InvalidSql::InvalidCondition));
                    }
                    let statements = self.parse_subquery()?;
                    return Ok(Predicate::Compare {
                        op,
                        quantifier: Some(quantifier.normalized()),
                        right: Operand::List(InTarget::SubSelect(statements)),
                    });
                }
                let right = if self.peek_kind() == Some(TokenKind::ParenOpen) {
                    Operand::List(self.parse_in_target()?)
                } else {
                    Operand::Expr(self.parse_operand(InvalidSql::InvalidCondition)?)
                };
                Ok(Predicate::Compare {
                    op,
                    quantifier: None,
                    right,
                })
            }
            TokenKind::In => {
                self.advance();
                if self.peek_kind() != Some(TokenKind::ParenOpen) {
                    return Err(self.error(InvalidSql::InvalidCondition));
                }
                let target = self.parse_in_target()?;
                Ok(Predicate::In { op, target })
            }
            TokenKind::Between => {
                self.advance();
                let low = self.parse_operand(InvalidSql::InvalidCondition)?;
                match self.peek() {
                    Some(link) if link.kind == TokenKind::Link && link.normalized() == "AND" => {
                        self.advance();
                    }
                    _ => return Err(self.error(InvalidSql::InvalidCondition)),
                }
                let high = self.parse_operand(InvalidSql::InvalidCondition)?;
                Ok(Predicate::Between { op, low, high })
            }
            TokenKind::Is => {
                self.advance();
                if self.eat(TokenKind::Null).is_none() {
                    return Err(self.error(InvalidSql::InvalidCondition));
                }
                Ok(Predicate::IsNull { op })
            }
            _ => Err(self.error(InvalidSql::InvalidCondition)),
        }
    }

    /// At `(`: a subquery when SELECT follows, otherwise a literal list.
    fn parse_in_target(&mut self) -> ParseResult<InTarget> {
        if self.at_subquery() {
            return Ok(InTarget::SubSelect(self.parse_subquery()?));
        }
        self.open_paren()?;
        let items = if self.peek_kind() == Some(TokenKind::ParenClose) {
            Vec::new()
        } else {
            self.parse_comma_list(|p| {
                if p.peek().is_none() {
                    return Err(p.error(InvalidSql::UnbalancedParenthesis));
                }
                p.parse_operand(InvalidSql::InvalidCondition)
            })?
        };
        self.close_paren(InvalidSql::InvalidCondition)?;
        Ok(InTarget::List(items))
    }

    // ---- Values and expressions ----

    /// A term, or terms joined by binary operators, without alias.
    fn parse_operand(&mut self, invalid: ErrorKind) -> ParseResult<Expr> {
        let first = self.parse_term(invalid)?;
        let mut rest = Vec::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Operator => {
                    self.advance();
                    rest.push((token.text.to_string(), self.parse_term(invalid)?));
                }
                // `*` lexes as a name
                TokenKind::Identifier if token.text == "*" => {
                    self.advance();
                    rest.push(("*".to_string(), self.parse_term(invalid)?));
                }
                // `a -1` lexes as a name and a signed number
                TokenKind::Number if token.text.starts_with(['-', '+']) => {
                    self.advance();
                    let (sign, digits) = token.text.split_at(1);
                    rest.push((
                        sign.to_string(),
                        Expr::Value(Value::new(ValueKind::Number, digits)),
                    ));
                }
                _ => break,
            }
        }
        if rest.is_empty() {
            return Ok(first);
        }
        Ok(Expr::Operation(Operation {
            first: Box::new(first),
            rest,
            alias: None,
        }))
    }

    /// A literal, function call or CASE expression behind optional prefix
    /// operators.
    fn parse_term(&mut self, invalid: ErrorKind) -> ParseResult<Expr> {
        let mut prefix = Vec::new();
        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Operator {
                break;
            }
            if !matches!(token.text.as_str(), "-" | "+" | "~" | "!") {
                return Err(self.error(invalid));
            }
            self.advance();
            prefix.push(token.text.as_str());
        }
        let term = match self.peek_kind() {
            Some(TokenKind::Func) => Expr::Func(self.parse_func()?),
            Some(TokenKind::Case) => Expr::Case(self.parse_case()?),
            Some(kind) if kind.is_literal() => Expr::Value(self.parse_literal()),
            _ => return Err(self.error(invalid)),
        };
        if prefix.is_empty() {
            return Ok(term);
        }
        Ok(Expr::Unary(Unary {
            op: prefix.join(" "),
            operand: Box::new(term),
            alias: None,
        }))
    }

    /// Consume the current literal token. Callers check the kind first.
    fn parse_literal(&mut self) -> Value {
        let token = self.advance();
        let kind = match token.map(|t| t.kind) {
            Some(TokenKind::Number) => ValueKind::Number,
            Some(TokenKind::Str) => ValueKind::Str,
            Some(TokenKind::Null) => ValueKind::Null,
            _ => ValueKind::Identifier,
        };
        Value::new(kind, token.map(Token::normalized).unwrap_or_default())
    }

    fn parse_func(&mut self) -> ParseResult<Func> {
        let name = self
            .advance()
            .map(|t| t.text.to_string())
            .unwrap_or_default();
        self.open_paren()?;
        let modifier = self.parse_func_modifier();
        let args = if self.peek_kind() == Some(TokenKind::ParenClose) {
            Vec::new()
        } else {
            self.parse_comma_list(|p| match p.peek_kind() {
                None => Err(p.error(InvalidSql::UnbalancedParenthesis)),
                _ => p.parse_operand(InvalidSql::InvalidFunc),
            })?
        };
        self.close_paren(InvalidSql::InvalidFunc)?;
        Ok(Func {
            name,
            modifier,
            args,
            alias: None,
        })
    }

    /// `DISTINCT` or `ALL` ahead of the arguments. A lone `distinct` argument
    /// is a column name.
    fn parse_func_modifier(&mut self) -> Option<String> {
        let token = self.peek()?;
        let modifier = match token.kind {
            TokenKind::Quantifier if token.normalized() == "ALL" => "ALL",
            TokenKind::Identifier if token.text.eq_ignore_ascii_case("distinct") => {
                if matches!(
                    self.peek_nth_kind(1),
                    None | Some(TokenKind::ParenClose | TokenKind::Comma | TokenKind::Operator)
                ) {
                    return None;
                }
                "DISTINCT"
            }
            _ => return None,
        };
        self.advance();
        Some(modifier.to_string())
    }

    /// `CASE (WHEN cond THEN val)+ [ELSE val] [END]`
    fn parse_case(&mut self) -> ParseResult<Case> {
        self.descend()?;
        self.advance();
        let mut whens = Vec::new();
        while self.eat(TokenKind::When).is_some() {
            let conditions = self.parse_conditions()?;
            if self.eat(TokenKind::Then).is_none() {
                return Err(self.error(InvalidSql::InvalidSelect));
            }
            let result = self.parse_operand(InvalidSql::InvalidSelect)?;
            whens.push(When { conditions, result });
        }
        if whens.is_empty() {
            return Err(self.error(InvalidSql::InvalidSelect));
        }
        let else_result = match self.eat(TokenKind::Else) {
            Some(_) => Some(Box::new(self.parse_operand(InvalidSql::InvalidSelect)?)),
            None => None,
        };
        self.eat(TokenKind::End);
        self.depth -= 1;
        Ok(Case {
            whens,
            else_result,
            alias: None,
        })
    }

    // ---- Remaining clauses ----

    /// An identifier or number, as listed by GROUP BY and ORDER BY.
    fn parse_plain_value(&mut self, invalid: ErrorKind) -> ParseResult<Value> {
        match self.peek_kind() {
            Some(TokenKind::Identifier | TokenKind::Number) => Ok(self.parse_literal()),
            _ => Err(self.error(invalid)),
        }
    }

    fn parse_group_by(&mut self) -> ParseResult<GroupBy> {
        let value = self.keyword();
        let values = self.parse_comma_list(|p| p.parse_plain_value(InvalidSql::InvalidGroupBy))?;
        let with_rollup = self.eat(TokenKind::WithRollup).is_some();
        Ok(GroupBy {
            value,
            values: SmallVec::from_vec(values),
            with_rollup,
        })
    }

    fn parse_order_by(&mut self) -> ParseResult<OrderBy> {
        let value = self.keyword();
        let values = self.parse_comma_list(|p| {
            let mut value = p.parse_plain_value(InvalidSql::InvalidOrderBy)?;
            if matches!(p.peek_kind(), Some(TokenKind::Asc | TokenKind::Desc)) {
                value.sort = Some(p.keyword());
            }
            Ok(value)
        })?;
        Ok(OrderBy {
            value,
            values: SmallVec::from_vec(values),
        })
    }

    fn parse_limit(&mut self) -> ParseResult<Limit> {
        let value = self.keyword();
        let first = self.parse_limit_value()?;
        let limit = if self.eat(TokenKind::Comma).is_some() {
            Limit {
                value,
                row_count: self.parse_limit_value()?,
                offset: Some(first),
                offset_keyword: None,
            }
        } else if let Some(keyword) = self.eat(TokenKind::Offset) {
            Limit {
                value,
                row_count: first,
                offset: Some(self.parse_limit_value()?),
                offset_keyword: Some(keyword.normalized()),
            }
        } else {
            Limit {
                value,
                row_count: first,
                offset: None,
                offset_keyword: None,
            }
        };
        Ok(limit)
    }

    /// A number, or an identifier for placeholders like `%s`.
    fn parse_limit_value(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(token) if matches!(token.kind, TokenKind::Number | TokenKind::Identifier) => {
                self.advance();
                Ok(token.text.to_string())
            }
            _ => Err(self.error(InvalidSql::InvalidLimit)),
        }
    }

    fn parse_insert(&mut self) -> ParseResult<Insert> {
        let value = self.keyword();
        let table = match self.peek() {
            Some(token) if matches!(token.kind, TokenKind::Identifier | TokenKind::Func) => {
                self.advance();
                token.text.to_string()
            }
            _ => return Err(self.error(InvalidSql::InvalidIdentifier)),
        };

        let mut columns = SmallVec::new();
        if self.peek_kind() == Some(TokenKind::ParenOpen) && !self.at_subquery() {
            self.open_paren()?;
            let names = self.parse_comma_list(|p| match p.peek() {
                Some(token) if token.kind == TokenKind::Identifier => {
                    p.advance();
                    Ok(token.text.to_string())
                }
                _ => Err(p.error_in_parens(InvalidSql::InvalidIdentifier)),
            })?;
            self.close_paren(InvalidSql::InvalidIdentifier)?;
            columns = SmallVec::from_vec(names);
        }

        let source = match self.peek_kind() {
            Some(TokenKind::Values) => {
                let value = self.keyword();
                let rows = self.parse_comma_list(Self::parse_row)?;
                InsertSource::Values { value, rows }
            }
            Some(TokenKind::Select) => InsertSource::Select(self.parse_statement()?),
            _ => return Err(self.error(InvalidSql::UnexpectedToken)),
        };
        Ok(Insert {
            value,
            table,
            columns,
            source,
        })
    }

    /// `( v, v, ... )` of a VALUES list.
    fn parse_row(&mut self) -> ParseResult<Vec<Expr>> {
        if self.peek_kind() != Some(TokenKind::ParenOpen) {
            return Err(self.error(InvalidSql::UnexpectedToken));
        }
        self.open_paren()?;
        let row = self.parse_comma_list(|p| match p.peek_kind() {
            None => Err(p.error(InvalidSql::UnbalancedParenthesis)),
            _ => p.parse_operand(InvalidSql::UnexpectedToken),
        })?;
        self.close_paren(InvalidSql::UnexpectedToken)?;
        Ok(row)
    }
}
