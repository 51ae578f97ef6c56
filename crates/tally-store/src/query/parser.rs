//! Recursive descent parser for query expressions.

use chrono::Duration;
use serde_json::{Number, Value};

use super::ast::{Action, Predicate, Query, Step};
use super::error::{QueryError, QueryResult};
use super::lexer::{Lexer, Token};

/// Parser for query expressions.
///
/// A query names one parameter, which doubles as the category the predicate
/// runs against, followed by an optional predicate and optional clauses.
///
/// # Grammar
///
/// ```text
/// query      ::= param "=>" [expression] clause*
/// expression ::= or_expr
/// or_expr    ::= and_expr ("|" and_expr)*
/// and_expr   ::= unary ("&" unary)*
/// unary      ::= "!" unary | primary
/// primary    ::= "(" expression ")" | "true" | "false" | field [op literal]
/// field      ::= param "." name ("." name)* | name
/// op         ::= "==" | "!=" | "<" | "<=" | ">" | ">=" | "~"
/// literal    ::= string | number | name | word | "true" | "false" | "null"
/// word       ::= digit (letter | digit)*     (a non-numeric word such as `3rd`)
/// clause     ::= "every" duration | "recent" integer
///              | "as" (string | name) | "show" field ("," field)*
/// ```
///
/// A bare `name` or `word` literal is read as a string, so `food == coffee`
/// is the same as `food == 'coffee'`.
///
/// # Operator Precedence (highest to lowest)
///
/// 1. comparison operators
/// 2. `!` (NOT) - unary
/// 3. `&` (AND) - binary, left-associative
/// 4. `|` (OR) - binary, left-associative
///
/// # Example
///
/// ```
/// use tally_store::query::{QueryParser, Step};
///
/// let query = QueryParser::parse("food => food ~ 'vitamin' every 1d as vitamins").unwrap();
/// assert_eq!(query.category, "food");
/// assert_eq!(query.name(), "vitamins");
/// assert!(matches!(query.step, Some(Step::Every(_))));
/// ```
pub struct QueryParser {
    tokens: Vec<Token>,
    position: usize,
    param: String,
}

impl QueryParser {
    /// Parses a query expression.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyExpression` for blank input,
    /// `QueryError::MissingParameter` / `QueryError::MissingArrow` when the
    /// expression does not open with `name =>`, and the other
    /// [`QueryError`] variants for malformed predicates or clauses.
    pub fn parse(input: &str) -> QueryResult<Query> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyExpression);
        }

        let tokens: Vec<Token> = Lexer::new(trimmed)
            .tokenize()?
            .into_iter()
            .map(|t| t.token)
            .collect();

        let mut parser = Self {
            tokens,
            position: 0,
            param: String::new(),
        };

        let param = match parser.advance() {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(QueryError::MissingParameter),
        };
        parser.param = param;
        if parser.advance() != Some(&Token::Arrow) {
            return Err(QueryError::MissingArrow {
                param: parser.param.clone(),
            });
        }

        let predicate = match parser.peek() {
            None => Predicate::All,
            Some(token) if token.starts_clause() => Predicate::All,
            Some(_) => parser.parse_expression()?,
        };

        let mut query = Query {
            category: parser.param.clone(),
            predicate,
            label: None,
            step: None,
            action: None,
            source: trimmed.to_string(),
        };
        parser.parse_clauses(&mut query)?;

        Ok(query)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token.
    fn check(&self, expected: &Token) -> bool {
        self.peek() == Some(expected)
    }

    /// Parses the top-level expression (OR expression).
    fn parse_expression(&mut self) -> QueryResult<Predicate> {
        self.parse_or_expr()
    }

    /// Parses OR expressions: `and_expr ("|" and_expr)*`
    fn parse_or_expr(&mut self) -> QueryResult<Predicate> {
        let mut left = self.parse_and_expr()?;

        while self.check(&Token::Or) {
            self.advance(); // consume '|'
            let right = self.parse_and_expr()?;
            left = Predicate::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions: `unary ("&" unary)*`
    fn parse_and_expr(&mut self) -> QueryResult<Predicate> {
        let mut left = self.parse_unary_expr()?;

        while self.check(&Token::And) {
            self.advance(); // consume '&'
            let right = self.parse_unary_expr()?;
            left = Predicate::and(left, right);
        }

        Ok(left)
    }

    /// Parses unary expressions: `"!" unary | primary`
    fn parse_unary_expr(&mut self) -> QueryResult<Predicate> {
        if self.check(&Token::Not) {
            self.advance(); // consume '!'
            let inner = self.parse_unary_expr()?;
            return Ok(Predicate::negate(inner));
        }

        self.parse_primary()
    }

    /// Parses primary expressions: parenthesized, boolean constant, or field test.
    fn parse_primary(&mut self) -> QueryResult<Predicate> {
        let token = self
            .advance()
            .cloned()
            .ok_or(QueryError::UnexpectedEndOfInput)?;

        match token {
            Token::OpenParen => {
                let inner = self.parse_expression()?;
                if !self.check(&Token::CloseParen) {
                    return Err(QueryError::UnclosedParenthesis);
                }
                self.advance(); // consume ')'
                Ok(inner)
            }

            Token::True => Ok(Predicate::All),
            Token::False => Ok(Predicate::Nothing),

            Token::Ident(name) => {
                let field = self.parse_field_rest(name)?;
                match self.peek() {
                    Some(Token::Cmp(op)) => {
                        let op = *op;
                        self.advance();
                        let value = self.parse_literal()?;
                        Ok(Predicate::Compare { field, op, value })
                    }
                    _ => Ok(Predicate::Truthy(field)),
                }
            }

            other => Err(QueryError::unexpected_token(other.to_string())),
        }
    }

    /// Parses the remainder of a field reference after its first name.
    ///
    /// `param.a.b` resolves to the attribute path `a.b`; a bare `a` is the
    /// attribute `a`. A dotted reference through any other name is unbound.
    fn parse_field_rest(&mut self, first: String) -> QueryResult<String> {
        if !self.check(&Token::Dot) {
            return Ok(first);
        }
        if first != self.param {
            return Err(QueryError::UnboundName {
                name: first,
                param: self.param.clone(),
            });
        }

        let mut segments = Vec::new();
        while self.check(&Token::Dot) {
            self.advance(); // consume '.'
            match self.advance() {
                Some(token) => match Self::name_of(token) {
                    Some(name) => segments.push(name),
                    None => return Err(QueryError::unexpected_token(token.to_string())),
                },
                None => return Err(QueryError::UnexpectedEndOfInput),
            }
        }
        Ok(segments.join("."))
    }

    /// Parses a field that may start with the parameter (used by `show`).
    fn parse_field(&mut self) -> QueryResult<String> {
        match self.advance().cloned() {
            Some(token) => match Self::name_of(&token) {
                Some(name) => self.parse_field_rest(name),
                None => Err(QueryError::unexpected_token(token.to_string())),
            },
            None => Err(QueryError::UnexpectedEndOfInput),
        }
    }

    /// Returns the attribute name a token spells, allowing keywords after a dot.
    fn name_of(token: &Token) -> Option<String> {
        match token {
            Token::Ident(name) => Some(name.clone()),
            Token::Every
            | Token::Recent
            | Token::As
            | Token::Show
            | Token::True
            | Token::False
            | Token::Null => Some(token.to_string()),
            _ => None,
        }
    }

    /// Parses the right-hand side of a comparison.
    fn parse_literal(&mut self) -> QueryResult<Value> {
        let token = self
            .advance()
            .cloned()
            .ok_or(QueryError::UnexpectedEndOfInput)?;

        match token {
            Token::Str(s) | Token::Ident(s) | Token::Word(s) => Ok(Value::String(s)),
            Token::Number(text) => parse_number(&text),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::Null => Ok(Value::Null),
            other => Err(QueryError::unexpected_token(other.to_string())),
        }
    }

    /// Parses trailing clauses into the query.
    fn parse_clauses(&mut self, query: &mut Query) -> QueryResult<()> {
        while let Some(token) = self.advance().cloned() {
            match token {
                Token::Every => {
                    if matches!(query.step, Some(Step::Every(_))) {
                        return Err(QueryError::duplicate_clause("every"));
                    }
                    if query.step.is_some() {
                        return Err(QueryError::ConflictingClauses);
                    }
                    let text = self.clause_argument()?;
                    query.step = Some(Step::Every(parse_duration(&text)?));
                }
                Token::Recent => {
                    if matches!(query.step, Some(Step::Recent(_))) {
                        return Err(QueryError::duplicate_clause("recent"));
                    }
                    if query.step.is_some() {
                        return Err(QueryError::ConflictingClauses);
                    }
                    let text = self.clause_argument()?;
                    let count = text
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| QueryError::invalid_count(&text))?;
                    query.step = Some(Step::Recent(count));
                }
                Token::As => {
                    if query.label.is_some() {
                        return Err(QueryError::duplicate_clause("as"));
                    }
                    query.label = Some(match self.advance().cloned() {
                        Some(Token::Str(s)) | Some(Token::Ident(s)) => s,
                        Some(other) => return Err(QueryError::unexpected_token(other.to_string())),
                        None => return Err(QueryError::UnexpectedEndOfInput),
                    });
                }
                Token::Show => {
                    if query.action.is_some() {
                        return Err(QueryError::duplicate_clause("show"));
                    }
                    let mut fields = vec![self.parse_field()?];
                    while self.check(&Token::Comma) {
                        self.advance(); // consume ','
                        fields.push(self.parse_field()?);
                    }
                    query.action = Some(Action::Show(fields));
                }
                other => return Err(QueryError::unexpected_token(other.to_string())),
            }
        }
        Ok(())
    }

    /// Reads the numeric or word argument of `every` / `recent`.
    fn clause_argument(&mut self) -> QueryResult<String> {
        match self.advance() {
            Some(Token::Number(text)) | Some(Token::Word(text)) => Ok(text.clone()),
            Some(other) => Err(QueryError::unexpected_token(other.to_string())),
            None => Err(QueryError::UnexpectedEndOfInput),
        }
    }
}

/// Parses a numeric literal into a JSON number.
fn parse_number(text: &str) -> QueryResult<Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| QueryError::unexpected_token(text))
}

/// Parses a duration such as `30m`, `12h`, `1d`, `2w` or `1d12h`.
///
/// # Errors
///
/// Returns `QueryError::InvalidDuration` for a missing or unknown unit, or a
/// total of zero.
pub fn parse_duration(text: &str) -> QueryResult<Duration> {
    let invalid = || QueryError::invalid_duration(text);

    let mut total = Duration::zero();
    let mut digits = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let amount: i64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();
        let part = match c {
            's' => Duration::try_seconds(amount),
            'm' => Duration::try_minutes(amount),
            'h' => Duration::try_hours(amount),
            'd' => Duration::try_days(amount),
            'w' => Duration::try_weeks(amount),
            _ => None,
        }
        .ok_or_else(invalid)?;
        total = total.checked_add(&part).ok_or_else(invalid)?;
    }

    if !digits.is_empty() || total <= Duration::zero() {
        return Err(invalid());
    }
    Ok(total)
}
