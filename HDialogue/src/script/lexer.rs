//! Tokenizer for the Lua data subset

use crate::error::{Error, Result};

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Name(String),
    Str(String),
    Integer(i64),
    Float(f64),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Assign,
    Comma,
    Semicolon,
    Dot,
    Minus,
    Eof,
}

impl Token {
    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self {
            Token::Name(n) => format!("`{n}`"),
            Token::Str(_) => "string literal".to_string(),
            Token::Integer(_) | Token::Float(_) => "number".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Assign => "`=`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Semicolon => "`;`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// A token with the 1-based position where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        // Tolerate a UTF-8 BOM, which some editors leave on the game scripts.
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error_at(&self, line: usize, column: usize, message: impl Into<String>) -> Error {
        Error::Parse {
            path: None,
            line,
            column,
            message: message.into(),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        self.error_at(self.line, self.column, message)
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Result<Spanned> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let spanned = |token| Spanned { token, line, column };

        let Some(c) = self.peek_char() else {
            return Ok(spanned(Token::Eof));
        };

        let token = match c {
            '{' | '}' | ']' | '(' | ')' | '=' | ',' | ';' | '-' => {
                self.bump();
                match c {
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    ']' => Token::RBracket,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '=' => Token::Assign,
                    ',' => Token::Comma,
                    ';' => Token::Semicolon,
                    _ => Token::Minus,
                }
            }
            '[' => match self.long_bracket_level() {
                Some(level) => Token::Str(self.long_bracket(level, line, column)?),
                None => {
                    self.bump();
                    Token::LBracket
                }
            },
            '.' if self.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => self.number()?,
            '.' => {
                self.bump();
                Token::Dot
            }
            '"' | '\'' => Token::Str(self.quoted_string(line, column)?),
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_alphabetic() || c == '_' => Token::Name(self.name()),
            other => return Err(self.error(format!("unexpected character {other:?}"))),
        };

        Ok(spanned(token))
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('-') if self.peek_nth(1) == Some('-') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    if let Some(level) = self.long_bracket_level() {
                        self.long_bracket(level, line, column)?;
                    } else {
                        while let Some(c) = self.bump() {
                            if c == '\n' {
                                break;
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// If positioned at `[[` or `[==[`, the number of `=` signs.
    fn long_bracket_level(&self) -> Option<usize> {
        let rest = self.src[self.pos..].strip_prefix('[')?;
        let level = rest.chars().take_while(|&c| c == '=').count();
        rest[level..].starts_with('[').then_some(level)
    }

    fn long_bracket(&mut self, level: usize, line: usize, column: usize) -> Result<String> {
        // Opening bracket: '[' + '='*level + '['
        for _ in 0..level + 2 {
            self.bump();
        }
        // A newline directly after the opening bracket is not part of the string.
        if self.peek_char() == Some('\r') {
            self.bump();
        }
        if self.peek_char() == Some('\n') {
            self.bump();
        }

        let close = format!("]{}]", "=".repeat(level));
        let Some(end) = self.src[self.pos..].find(&close) else {
            return Err(self.error_at(line, column, "unfinished long string or comment"));
        };
        let body = self.src[self.pos..self.pos + end].to_string();
        for _ in 0..body.chars().count() + close.len() {
            self.bump();
        }
        Ok(body)
    }

    fn quoted_string(&mut self, line: usize, column: usize) -> Result<String> {
        let quote = self.bump().unwrap_or('"');
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error_at(line, column, "unfinished string"));
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<()> {
        let Some(c) = self.bump() else {
            return Err(self.error("unfinished escape sequence"));
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '\\' | '"' | '\'' => out.push(c),
            '\n' => out.push('\n'),
            '\r' => {
                out.push('\n');
                if self.peek_char() == Some('\n') {
                    self.bump();
                }
            }
            'z' => {
                while self.peek_char().is_some_and(char::is_whitespace) {
                    self.bump();
                }
            }
            'x' => {
                let mut value = 0u32;
                for _ in 0..2 {
                    let digit = self
                        .bump()
                        .and_then(|d| d.to_digit(16))
                        .ok_or_else(|| self.error("invalid \\x escape"))?;
                    value = value * 16 + digit;
                }
                out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'u' => {
                if self.bump() != Some('{') {
                    return Err(self.error("expected `{` in \\u escape"));
                }
                let mut value = 0u32;
                loop {
                    match self.bump() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_hexdigit() => {
                            value = value
                                .checked_mul(16)
                                .and_then(|v| v.checked_add(d.to_digit(16).unwrap_or(0)))
                                .ok_or_else(|| self.error("\\u escape too large"))?;
                        }
                        _ => return Err(self.error("invalid \\u escape")),
                    }
                }
                out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            d if d.is_ascii_digit() => {
                let mut value = d.to_digit(10).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek_char().and_then(|n| n.to_digit(10)) {
                        Some(n) => {
                            self.bump();
                            value = value * 10 + n;
                        }
                        None => break,
                    }
                }
                if value > 255 {
                    return Err(self.error("decimal escape too large"));
                }
                out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            other => return Err(self.error(format!("invalid escape sequence \\{other}"))),
        }
        Ok(())
    }

    fn name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn number(&mut self) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        let start = self.pos;

        if self.peek_char() == Some('0') && matches!(self.peek_nth(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let digits_start = self.pos;
            while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits = &self.src[digits_start..self.pos];
            return u64::from_str_radix(digits, 16)
                // Lua wraps hex literals around into the integer range
                .map(|v| Token::Integer(v as i64))
                .map_err(|_| self.error_at(line, column, "malformed hex number"));
        }

        let mut is_float = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.bump();
            } else if c == '.' && !is_float {
                is_float = true;
                self.bump();
            } else if c == 'e' || c == 'E' {
                is_float = true;
                self.bump();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.bump();
                }
            } else {
                break;
            }
        }
        if self.peek_char().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return Err(self.error_at(line, column, "malformed number"));
        }

        let text = &self.src[start..self.pos];
        if !is_float {
            if let Ok(v) = text.parse::<i64>() {
                return Ok(Token::Integer(v));
            }
        }
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| self.error_at(line, column, format!("malformed number `{text}`")))
    }
}
