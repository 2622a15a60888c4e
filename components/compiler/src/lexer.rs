//! AMPL lexer - tokenizes source code into tokens

use crate::error::lexical_error;
use core_types::{CompileError, SourcePosition, Span};
use std::fmt;

/// Maximum number of characters in an identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 32;

/// Token kinds produced by the lexer.
///
/// Reserved words and symbolic operators are separate variants; the three
/// literal kinds carry their decoded payloads. String payloads hold the
/// unescaped contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// End of the source text
    Eof,
    /// Identifier with its lexeme
    Identifier(String),
    /// Numeric literal with its value
    Number(i32),
    /// String literal with its unescaped contents
    Str(String),

    /// and operator
    And,
    /// array keyword
    Array,
    /// as keyword
    As,
    /// back keyword
    Back,
    /// boolean type name
    Boolean,
    /// chillax keyword
    Chillax,
    /// do keyword
    Do,
    /// elif keyword
    Elif,
    /// else keyword
    Else,
    /// end keyword
    End,
    /// false literal
    False,
    /// if keyword
    If,
    /// input keyword
    Input,
    /// integer type name
    Integer,
    /// let keyword
    Let,
    /// main keyword
    Main,
    /// mod operator
    Mod,
    /// not operator
    Not,
    /// or operator
    Or,
    /// output keyword
    Output,
    /// program keyword
    Program,
    /// returns keyword
    Returns,
    /// takes keyword
    Takes,
    /// true literal
    True,
    /// vars keyword
    Vars,
    /// while keyword
    While,

    /// Equality operator `=`
    Eq,
    /// Greater-or-equal operator `>=`
    Ge,
    /// Greater-than operator `>`
    Gt,
    /// Less-or-equal operator `<=`
    Le,
    /// Less-than operator `<`
    Lt,
    /// Inequality operator `/=`
    Ne,
    /// Minus operator `-`
    Minus,
    /// Plus operator `+`
    Plus,
    /// Division operator `/`
    Divide,
    /// Multiplication operator `*`
    Multiply,
    /// Opening parenthesis
    LParen,
    /// Closing parenthesis
    RParen,
    /// Output concatenation `&`
    Concat,
    /// Comma
    Comma,
    /// Colon
    Colon,
    /// Semicolon
    Semicolon,
    /// Opening bracket
    LBracket,
    /// Closing bracket
    RBracket,
}

impl TokenKind {
    /// Whether this token is a relational operator.
    pub fn is_relop(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Ge
                | TokenKind::Gt
                | TokenKind::Le
                | TokenKind::Lt
                | TokenKind::Ne
        )
    }

    /// Whether this token is an additive operator.
    pub fn is_addop(&self) -> bool {
        matches!(self, TokenKind::Minus | TokenKind::Or | TokenKind::Plus)
    }

    /// Whether this token is a multiplicative operator.
    pub fn is_mulop(&self) -> bool {
        matches!(
            self,
            TokenKind::And | TokenKind::Divide | TokenKind::Mod | TokenKind::Multiply
        )
    }

    /// Whether this token can begin a factor.
    pub fn starts_factor(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::Number(_)
                | TokenKind::LParen
                | TokenKind::Not
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Whether this token can begin an expression.
    pub fn starts_expr(&self) -> bool {
        self.starts_factor() || *self == TokenKind::Minus
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Eof => "end-of-file",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Number(_) => "numeric literal",
            TokenKind::Str(_) => "string literal",
            TokenKind::And => "'and'",
            TokenKind::Array => "'array'",
            TokenKind::As => "'as'",
            TokenKind::Back => "'back'",
            TokenKind::Boolean => "'boolean'",
            TokenKind::Chillax => "'chillax'",
            TokenKind::Do => "'do'",
            TokenKind::Elif => "'elif'",
            TokenKind::Else => "'else'",
            TokenKind::End => "'end'",
            TokenKind::False => "'false'",
            TokenKind::If => "'if'",
            TokenKind::Input => "'input'",
            TokenKind::Integer => "'integer'",
            TokenKind::Let => "'let'",
            TokenKind::Main => "'main'",
            TokenKind::Mod => "'mod'",
            TokenKind::Not => "'not'",
            TokenKind::Or => "'or'",
            TokenKind::Output => "'output'",
            TokenKind::Program => "'program'",
            TokenKind::Returns => "'returns'",
            TokenKind::Takes => "'takes'",
            TokenKind::True => "'true'",
            TokenKind::Vars => "'vars'",
            TokenKind::While => "'while'",
            TokenKind::Eq => "'='",
            TokenKind::Ge => "'>='",
            TokenKind::Gt => "'>'",
            TokenKind::Le => "'<='",
            TokenKind::Lt => "'<'",
            TokenKind::Ne => "'/='",
            TokenKind::Minus => "'-'",
            TokenKind::Plus => "'+'",
            TokenKind::Divide => "'/'",
            TokenKind::Multiply => "'*'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Concat => "'&'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
        };
        f.write_str(text)
    }
}

/// A token together with the source span it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was recognized
    pub kind: TokenKind,
    /// Where it was recognized; the end position is exclusive
    pub span: Span,
}

/// Reserved words in sorted order, for binary search.
const RESERVED: [(&str, TokenKind); 26] = [
    ("and", TokenKind::And),
    ("array", TokenKind::Array),
    ("as", TokenKind::As),
    ("back", TokenKind::Back),
    ("boolean", TokenKind::Boolean),
    ("chillax", TokenKind::Chillax),
    ("do", TokenKind::Do),
    ("elif", TokenKind::Elif),
    ("else", TokenKind::Else),
    ("end", TokenKind::End),
    ("false", TokenKind::False),
    ("if", TokenKind::If),
    ("input", TokenKind::Input),
    ("integer", TokenKind::Integer),
    ("let", TokenKind::Let),
    ("main", TokenKind::Main),
    ("mod", TokenKind::Mod),
    ("not", TokenKind::Not),
    ("or", TokenKind::Or),
    ("output", TokenKind::Output),
    ("program", TokenKind::Program),
    ("returns", TokenKind::Returns),
    ("takes", TokenKind::Takes),
    ("true", TokenKind::True),
    ("vars", TokenKind::Vars),
    ("while", TokenKind::While),
];

fn reserved_word(lexeme: &str) -> Option<TokenKind> {
    RESERVED
        .binary_search_by(|(word, _)| (*word).cmp(lexeme))
        .ok()
        .map(|index| RESERVED[index].1.clone())
}

/// Whether a character may appear in a string literal.
fn is_printable(ch: char) -> bool {
    ch.is_ascii_graphic() || ch == ' '
}

/// Lexer for AMPL source code
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    /// Create a new lexer for the given source code.
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the next token from the source.
    ///
    /// After the source is exhausted this keeps returning [`TokenKind::Eof`]
    /// tokens positioned one past the last character.
    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace_and_comments()?;
        let start = self.current_position();
        if self.is_at_end() {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::point(start),
            });
        }
        let ch = self.peek();
        let kind = if ch.is_ascii_alphabetic() || ch == '_' {
            self.scan_word(start)?
        } else if ch.is_ascii_digit() {
            self.scan_number(start)?
        } else if ch == '"' {
            self.scan_string(start)?
        } else {
            self.scan_operator(start)?
        };
        Ok(Token {
            kind,
            span: Span::new(start, self.current_position()),
        })
    }

    /// Scan an identifier or reserved word.
    fn scan_word(&mut self, start: SourcePosition) -> Result<TokenKind, CompileError> {
        let mut lexeme = String::new();
        let mut last_was_digit = false;
        while !self.is_at_end() {
            let ch = self.peek();
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            if ch == '_' && last_was_digit {
                return Err(lexical_error(
                    "illegal character '_' in identifier",
                    self.current_position(),
                ));
            }
            if lexeme.len() == MAX_IDENTIFIER_LENGTH {
                return Err(lexical_error("identifier too long", start));
            }
            last_was_digit = ch.is_ascii_digit();
            lexeme.push(ch);
            self.advance();
        }
        Ok(match reserved_word(&lexeme) {
            Some(kind) => kind,
            None => TokenKind::Identifier(lexeme),
        })
    }

    /// Scan a numeric literal, checking for overflow at every digit.
    fn scan_number(&mut self, start: SourcePosition) -> Result<TokenKind, CompileError> {
        let mut value: i32 = 0;
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            let digit = (self.peek() as u8 - b'0') as i32;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| lexical_error("number too large", start))?;
            self.advance();
        }
        if !self.is_at_end() {
            let next = self.peek();
            if next.is_ascii_alphabetic() || next == '_' {
                return Err(lexical_error(
                    format!("illegal character '{}' (ASCII #{})", next, next as u32),
                    self.current_position(),
                ));
            }
        }
        Ok(TokenKind::Number(value))
    }

    /// Scan a string literal between double quotes.
    ///
    /// Contents must be printable ASCII. The recognized escapes store their
    /// escaped character in the payload; anything else after a backslash is
    /// fatal at the backslash.
    fn scan_string(&mut self, start: SourcePosition) -> Result<TokenKind, CompileError> {
        self.advance();
        let mut contents = String::new();
        loop {
            if self.is_at_end() {
                return Err(lexical_error("string not closed", start));
            }
            let ch = self.peek();
            if ch == '"' {
                self.advance();
                break;
            }
            if ch == '\\' {
                let escape_position = self.current_position();
                self.advance();
                if self.is_at_end() {
                    return Err(lexical_error("string not closed", start));
                }
                match self.peek() {
                    'n' => contents.push('\n'),
                    't' => contents.push('\t'),
                    '"' => contents.push('"'),
                    '\\' => contents.push('\\'),
                    other => {
                        return Err(lexical_error(
                            format!("illegal escape code '\\{}' in string", other),
                            escape_position,
                        ))
                    }
                }
                self.advance();
                continue;
            }
            if !is_printable(ch) {
                return Err(lexical_error(
                    format!("non-printable character (ASCII #{})", ch as u32),
                    self.current_position(),
                ));
            }
            contents.push(ch);
            self.advance();
        }
        Ok(TokenKind::Str(contents))
    }

    /// Scan a symbolic operator or punctuation token.
    fn scan_operator(&mut self, start: SourcePosition) -> Result<TokenKind, CompileError> {
        let ch = self.advance();
        match ch {
            '=' => Ok(TokenKind::Eq),
            '>' => {
                if self.match_char('=') {
                    Ok(TokenKind::Ge)
                } else {
                    Ok(TokenKind::Gt)
                }
            }
            '<' => {
                if self.match_char('=') {
                    Ok(TokenKind::Le)
                } else {
                    Ok(TokenKind::Lt)
                }
            }
            '/' => {
                if self.match_char('=') {
                    Ok(TokenKind::Ne)
                } else {
                    Ok(TokenKind::Divide)
                }
            }
            '-' => Ok(TokenKind::Minus),
            '+' => Ok(TokenKind::Plus),
            '*' => Ok(TokenKind::Multiply),
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            '&' => Ok(TokenKind::Concat),
            ',' => Ok(TokenKind::Comma),
            ':' => Ok(TokenKind::Colon),
            ';' => Ok(TokenKind::Semicolon),
            '[' => Ok(TokenKind::LBracket),
            ']' => Ok(TokenKind::RBracket),
            other => Err(lexical_error(
                format!("illegal character '{}' (ASCII #{})", other, other as u32),
                start,
            )),
        }
    }

    /// Skip whitespace and brace comments before the next token.
    fn skip_whitespace_and_comments(&mut self) -> Result<(), CompileError> {
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '{' {
                let outermost = self.current_position();
                self.advance();
                self.skip_comment(outermost)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Skip one comment body whose opening brace was already consumed.
    ///
    /// Nested comments recurse; `outermost` stays the position of the
    /// outermost opening brace so an unterminated comment is reported there.
    fn skip_comment(&mut self, outermost: SourcePosition) -> Result<(), CompileError> {
        loop {
            if self.is_at_end() {
                return Err(lexical_error("comment not closed", outermost));
            }
            match self.advance() {
                '}' => return Ok(()),
                '{' => self.skip_comment(outermost)?,
                _ => {}
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.position]
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.position];
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.position] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn current_position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column)
    }
}
