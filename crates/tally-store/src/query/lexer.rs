//! Lexer (tokenizer) for query expressions.

use std::iter::Peekable;
use std::str::Chars;

use super::ast::CmpOp;
use super::error::{QueryError, QueryResult};

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: Token,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ==================== Names & Literals ====================
    /// A bare name (parameter or attribute).
    Ident(String),

    /// A quoted string literal.
    Str(String),

    /// A numeric literal, kept as written.
    Number(String),

    /// A word starting with a digit that is not a plain number (`1d12h`).
    Word(String),

    // ==================== Keywords ====================
    /// `every`
    Every,
    /// `recent`
    Recent,
    /// `as`
    As,
    /// `show`
    Show,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,

    // ==================== Operators ====================
    /// `=>`
    Arrow,
    /// A comparison operator.
    Cmp(CmpOp),
    /// `&`
    And,
    /// `|`
    Or,
    /// `!`
    Not,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `.`
    Dot,
    /// `,`
    Comma,
}

impl Token {
    /// Returns true for keywords that start a trailing clause.
    pub fn starts_clause(&self) -> bool {
        matches!(self, Token::Every | Token::Recent | Token::As | Token::Show)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Word(s) => write!(f, "{s}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Every => write!(f, "every"),
            Token::Recent => write!(f, "recent"),
            Token::As => write!(f, "as"),
            Token::Show => write!(f, "show"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Arrow => write!(f, "=>"),
            Token::Cmp(op) => write!(
                f,
                "{}",
                match op {
                    CmpOp::Eq => "==",
                    CmpOp::Ne => "!=",
                    CmpOp::Lt => "<",
                    CmpOp::Le => "<=",
                    CmpOp::Gt => ">",
                    CmpOp::Ge => ">=",
                    CmpOp::Contains => "~",
                }
            ),
            Token::And => write!(f, "&"),
            Token::Or => write!(f, "|"),
            Token::Not => write!(f, "!"),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::Dot => write!(f, "."),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Lexer for tokenizing query expressions.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenizes the whole input.
    ///
    /// # Errors
    ///
    /// Fails on the first character that cannot start a token, or on an
    /// unterminated string literal.
    pub fn tokenize(mut self) -> QueryResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Consumes the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(&expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.next_char();
        }
    }

    /// Reads characters while the predicate holds.
    fn read_while(&mut self, mut pred: impl FnMut(char) -> bool, into: &mut String) {
        while let Some(&c) = self.peek() {
            if !pred(c) {
                break;
            }
            into.push(c);
            self.next_char();
        }
    }

    /// Reads a quoted string (single or double quotes) with backslash escapes.
    fn read_quoted_string(&mut self, quote_char: char, start: usize) -> QueryResult<String> {
        // Consume the opening quote
        self.next_char();

        let mut result = String::new();
        loop {
            match self.next_char() {
                None => return Err(QueryError::UnterminatedString { position: start }),
                Some(c) if c == quote_char => return Ok(result),
                Some('\\') => {
                    if let Some(escaped) = self.next_char() {
                        result.push(escaped);
                    }
                }
                Some(c) => result.push(c),
            }
        }
    }

    /// Reads a number, or a digit-led word such as a duration.
    fn read_number(&mut self) -> Token {
        let mut text = String::new();
        if self.eat('-') {
            text.push('-');
        }
        self.read_while(|c| c.is_ascii_digit(), &mut text);

        // Fraction, only if a digit follows the dot
        if self.peek() == Some(&'.') {
            let mut ahead = self.chars.clone();
            ahead.next();
            if ahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.push('.');
                self.next_char();
                self.read_while(|c| c.is_ascii_digit(), &mut text);
            }
        }

        if self.peek().is_some_and(|c| c.is_alphabetic()) {
            self.read_while(|c| c.is_alphanumeric(), &mut text);
            Token::Word(text)
        } else {
            Token::Number(text)
        }
    }

    fn keyword_or_ident(ident: String) -> Token {
        match ident.as_str() {
            "every" => Token::Every,
            "recent" => Token::Recent,
            "as" => Token::As,
            "show" => Token::Show,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            _ => Token::Ident(ident),
        }
    }

    /// Returns the next token with its position, or None at end of input.
    pub fn next_token(&mut self) -> QueryResult<Option<PositionedToken>> {
        self.skip_whitespace();

        let Some(&c) = self.peek() else {
            return Ok(None);
        };
        let start = self.position;

        let token = match c {
            '&' => {
                self.next_char();
                Token::And
            }
            '|' => {
                self.next_char();
                Token::Or
            }
            '(' => {
                self.next_char();
                Token::OpenParen
            }
            ')' => {
                self.next_char();
                Token::CloseParen
            }
            '.' => {
                self.next_char();
                Token::Dot
            }
            ',' => {
                self.next_char();
                Token::Comma
            }
            '~' => {
                self.next_char();
                Token::Cmp(CmpOp::Contains)
            }
            '!' => {
                self.next_char();
                if self.eat('=') {
                    Token::Cmp(CmpOp::Ne)
                } else {
                    Token::Not
                }
            }
            '=' => {
                self.next_char();
                if self.eat('>') {
                    Token::Arrow
                } else {
                    // `=` and `==` both read as equality
                    self.eat('=');
                    Token::Cmp(CmpOp::Eq)
                }
            }
            '<' => {
                self.next_char();
                if self.eat('=') {
                    Token::Cmp(CmpOp::Le)
                } else {
                    Token::Cmp(CmpOp::Lt)
                }
            }
            '>' => {
                self.next_char();
                if self.eat('=') {
                    Token::Cmp(CmpOp::Ge)
                } else {
                    Token::Cmp(CmpOp::Gt)
                }
            }
            '"' | '\'' => Token::Str(self.read_quoted_string(c, start)?),
            '-' => {
                let mut ahead = self.chars.clone();
                ahead.next();
                if ahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number()
                } else {
                    return Err(QueryError::UnexpectedCharacter {
                        character: c,
                        position: start,
                    });
                }
            }
            _ if c.is_ascii_digit() => self.read_number(),
            _ if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '-', &mut ident);
                Self::keyword_or_ident(ident)
            }
            _ => {
                return Err(QueryError::UnexpectedCharacter {
                    character: c,
                    position: start,
                })
            }
        };

        Ok(Some(PositionedToken {
            token,
            position: start,
        }))
    }
}
