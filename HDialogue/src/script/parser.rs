//! Recursive-descent parser for the Lua data subset
//!
//! Only what the game's data scripts use is understood: assignments of table
//! constructors and literals to (dotted) global names, plus bare function
//! call statements, which are parsed and dropped. Anything else is a
//! [`Error::Parse`].

use std::collections::VecDeque;

use super::lexer::{Lexer, Spanned, Token};
use super::value::{LuaTable, LuaValue, RawTable, TableKey};
use crate::error::{Error, Result};

/// Parse script source text into a [`RawTable`] keyed by assigned name.
///
/// `UnitSetData.NPCs = { ... }` produces an entry named `UnitSetData.NPCs`.
///
/// # Errors
/// Returns [`Error::Parse`] if the text is not valid for the supported grammar.
pub fn parse(source: &str) -> Result<RawTable> {
    Parser::new(source).chunk()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Spanned>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: VecDeque::new(),
        }
    }

    fn fill(&mut self, n: usize) -> Result<()> {
        while self.lookahead.len() <= n {
            let next = self.lexer.next_token()?;
            self.lookahead.push_back(next);
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<&Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&mut self, n: usize) -> Result<&Token> {
        self.fill(n)?;
        Ok(&self.lookahead[n].token)
    }

    fn advance(&mut self) -> Result<Spanned> {
        self.fill(0)?;
        Ok(self
            .lookahead
            .pop_front()
            .unwrap_or(Spanned {
                token: Token::Eof,
                line: 0,
                column: 0,
            }))
    }

    fn unexpected(&self, got: &Spanned, expected: &str) -> Error {
        Error::Parse {
            path: None,
            line: got.line,
            column: got.column,
            message: format!("expected {expected}, found {}", got.token.describe()),
        }
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<()> {
        let got = self.advance()?;
        if &got.token == token {
            Ok(())
        } else {
            Err(self.unexpected(&got, expected))
        }
    }

    fn chunk(&mut self) -> Result<RawTable> {
        let mut globals = LuaTable::new();
        loop {
            match self.peek()? {
                Token::Eof => return Ok(globals),
                Token::Semicolon => {
                    self.advance()?;
                }
                Token::Name(_) => self.statement(&mut globals)?,
                _ => {
                    let got = self.advance()?;
                    return Err(self.unexpected(&got, "a statement"));
                }
            }
        }
    }

    fn statement(&mut self, globals: &mut LuaTable) -> Result<()> {
        if matches!(self.peek()?, Token::Name(n) if n == "local") {
            self.advance()?;
        }
        let target = self.dotted_name()?;
        match self.peek()? {
            Token::Assign => {
                self.advance()?;
                let value = self.expression()?;
                globals.insert(TableKey::Name(target), value);
                Ok(())
            }
            Token::LParen | Token::LBrace | Token::Str(_) => {
                tracing::trace!("skipping call statement {target}");
                self.call_arguments()
            }
            _ => {
                let got = self.advance()?;
                Err(self.unexpected(&got, "`=` or a call"))
            }
        }
    }

    /// `Name { '.' Name }`
    fn dotted_name(&mut self) -> Result<String> {
        let first = self.advance()?;
        let Token::Name(mut name) = first.token.clone() else {
            return Err(self.unexpected(&first, "a name"));
        };
        while matches!(self.peek()?, Token::Dot) {
            self.advance()?;
            let part = self.advance()?;
            match part.token {
                Token::Name(p) => {
                    name.push('.');
                    name.push_str(&p);
                }
                _ => return Err(self.unexpected(&part, "a name after `.`")),
            }
        }
        Ok(name)
    }

    /// Arguments of a call: `( [expr {, expr}] )`, a table, or a string.
    fn call_arguments(&mut self) -> Result<()> {
        match self.peek()? {
            Token::LBrace => {
                self.table()?;
            }
            Token::Str(_) => {
                self.advance()?;
            }
            _ => {
                self.expect(&Token::LParen, "`(`")?;
                if !matches!(self.peek()?, Token::RParen) {
                    loop {
                        self.expression()?;
                        if matches!(self.peek()?, Token::Comma) {
                            self.advance()?;
                        } else {
                            break;
                        }
                    }
                }
                self.expect(&Token::RParen, "`)`")?;
            }
        }
        Ok(())
    }

    /// `primary { 'or' primary }`
    ///
    /// Names are not resolved, so `X = X or {}` keeps the first operand that
    /// is an actual value.
    fn expression(&mut self) -> Result<LuaValue> {
        let mut value = self.primary()?;
        while matches!(self.peek()?, Token::Name(n) if n == "or") {
            self.advance()?;
            let rhs = self.primary()?;
            if matches!(value, LuaValue::Name(_) | LuaValue::Nil) {
                value = rhs;
            }
        }
        Ok(value)
    }

    fn primary(&mut self) -> Result<LuaValue> {
        match self.peek()?.clone() {
            Token::LBrace => Ok(LuaValue::Table(self.table()?)),
            Token::Str(s) => {
                self.advance()?;
                Ok(LuaValue::Str(s))
            }
            Token::Integer(i) => {
                self.advance()?;
                Ok(LuaValue::Integer(i))
            }
            Token::Float(f) => {
                self.advance()?;
                Ok(LuaValue::Float(f))
            }
            Token::Minus => {
                self.advance()?;
                let got = self.advance()?;
                match got.token {
                    Token::Integer(i) => Ok(LuaValue::Integer(i.wrapping_neg())),
                    Token::Float(f) => Ok(LuaValue::Float(-f)),
                    _ => Err(self.unexpected(&got, "a number after `-`")),
                }
            }
            Token::Name(n) => match n.as_str() {
                "true" | "false" | "nil" => {
                    self.advance()?;
                    Ok(match n.as_str() {
                        "true" => LuaValue::Bool(true),
                        "false" => LuaValue::Bool(false),
                        _ => LuaValue::Nil,
                    })
                }
                _ => {
                    let name = self.dotted_name()?;
                    if matches!(self.peek()?, Token::LParen) {
                        // Call results are opaque to a data parser.
                        self.call_arguments()?;
                        Ok(LuaValue::Nil)
                    } else {
                        Ok(LuaValue::Name(name))
                    }
                }
            },
            _ => {
                let got = self.advance()?;
                Err(self.unexpected(&got, "a value"))
            }
        }
    }

    /// Table constructor. Positional fields are numbered from 1.
    fn table(&mut self) -> Result<LuaTable> {
        self.expect(&Token::LBrace, "`{`")?;
        let mut table = LuaTable::new();
        let mut next_index: i64 = 1;

        loop {
            if matches!(self.peek()?, Token::RBrace) {
                self.advance()?;
                return Ok(table);
            }

            let is_named_field = matches!(self.peek()?, Token::Name(_))
                && matches!(self.peek_nth(1)?, Token::Assign);

            if is_named_field {
                let field = self.advance()?;
                let Token::Name(key) = field.token.clone() else {
                    return Err(self.unexpected(&field, "a field name"));
                };
                self.advance()?;
                let value = self.expression()?;
                table.insert(TableKey::Name(key), value);
            } else if matches!(self.peek()?, Token::LBracket) {
                let open = self.advance()?;
                let key = match self.expression()? {
                    LuaValue::Str(s) => TableKey::Name(s),
                    LuaValue::Integer(i) => TableKey::Index(i),
                    LuaValue::Float(f) if f.fract().abs() < f64::EPSILON => {
                        TableKey::Index(f as i64)
                    }
                    other => {
                        return Err(Error::Parse {
                            path: None,
                            line: open.line,
                            column: open.column,
                            message: format!("unsupported table key of type {}", other.type_name()),
                        });
                    }
                };
                self.expect(&Token::RBracket, "`]`")?;
                self.expect(&Token::Assign, "`=`")?;
                let value = self.expression()?;
                table.insert(key, value);
            } else {
                let value = self.expression()?;
                table.insert(TableKey::Index(next_index), value);
                next_index += 1;
            }

            match self.peek()? {
                Token::Comma | Token::Semicolon => {
                    self.advance()?;
                }
                Token::RBrace => {}
                _ => {
                    let got = self.advance()?;
                    return Err(self.unexpected(&got, "`,` or `}`"));
                }
            }
        }
    }
}
