use crate::error::{Position, SchemaError};
use crate::schema::lexer::{Lexer, Token, TokenType};
use crate::schema::FieldCategory;

/// A parsed, not yet validated, `Kind: [fields]` line
#[derive(Debug, Clone, PartialEq)]
pub struct KindDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub pos: Position,
}

/// One entry of a declaration's field list
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub category: FieldCategory,
    pub pos: Position,
}

impl KindDecl {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDecl>, pos: Position) -> Self {
        Self { name: name.into(), fields, pos }
    }
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, category: FieldCategory, pos: Position) -> Self {
        Self { name: name.into(), category, pos }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse_str(input: &str) -> Result<Vec<KindDecl>, SchemaError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    pub fn parse(&mut self) -> Result<Vec<KindDecl>, SchemaError> {
        let mut decls = Vec::new();

        while !self.is_at_end() {
            if self.check(&TokenType::Newline) {
                self.advance();
                continue;
            }

            decls.push(self.parse_decl()?);
            self.expect_line_end()?;
        }

        Ok(decls)
    }

    fn parse_decl(&mut self) -> Result<KindDecl, SchemaError> {
        let token = self.current_token().clone();

        if token.typ != TokenType::Name {
            return match token.typ {
                TokenType::Colon => Err(SchemaError::MissingName { what: "kind", pos: token.pos }),
                _ => Err(self.expected("node kind name", &token)),
            };
        }

        let (name, marker) = token.split_marker();
        if !marker.is_empty() {
            return Err(SchemaError::InvalidMarker {
                name: name.to_string(),
                marker: marker.to_string(),
                pos: token.pos,
            });
        }
        self.advance();

        self.consume(TokenType::Colon, "':'")?;

        let open = self.current_token().clone();
        self.consume(TokenType::LBracket, "'['")?;

        let fields = self.parse_fields(name, open.pos)?;

        Ok(KindDecl::new(name, fields, token.pos))
    }

    fn parse_fields(&mut self, kind: &str, open: Position) -> Result<Vec<FieldDecl>, SchemaError> {
        let mut fields = Vec::new();

        if self.check(&TokenType::RBracket) {
            self.advance();
            return Ok(fields);
        }

        loop {
            let token = self.current_token().clone();
            match token.typ {
                TokenType::Name => {
                    fields.push(field_from_token(&token)?);
                    self.advance();
                }
                TokenType::Comma | TokenType::RBracket => {
                    return Err(SchemaError::MissingName { what: "field", pos: token.pos });
                }
                TokenType::Newline | TokenType::Eof => {
                    return Err(SchemaError::UnterminatedBracket {
                        kind: kind.to_string(),
                        pos: open,
                    });
                }
                _ => return Err(self.expected("field name", &token)),
            }

            let token = self.current_token().clone();
            match token.typ {
                TokenType::Comma => self.advance(),
                TokenType::RBracket => {
                    self.advance();
                    return Ok(fields);
                }
                TokenType::Newline | TokenType::Eof => {
                    return Err(SchemaError::UnterminatedBracket {
                        kind: kind.to_string(),
                        pos: open,
                    });
                }
                _ => return Err(self.expected("',' or ']'", &token)),
            }
        }
    }

    fn expect_line_end(&mut self) -> Result<(), SchemaError> {
        let token = self.current_token().clone();
        match token.typ {
            TokenType::Newline => {
                self.advance();
                Ok(())
            }
            TokenType::Eof => Ok(()),
            _ => Err(self.expected("end of line", &token)),
        }
    }

    fn consume(&mut self, typ: TokenType, what: &str) -> Result<(), SchemaError> {
        let token = self.current_token().clone();
        if token.typ == typ {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(what, &token))
        }
    }

    fn expected(&self, expected: &str, token: &Token) -> SchemaError {
        let found = match token.typ {
            TokenType::Newline => "end of line".to_string(),
            TokenType::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.lexeme),
        };
        SchemaError::Expected { expected: expected.to_string(), found, pos: token.pos }
    }

    fn current_token(&self) -> &Token {
        // The lexer always terminates the stream with Eof
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn check(&self, typ: &TokenType) -> bool {
        &self.current_token().typ == typ
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.check(&TokenType::Eof)
    }
}

fn field_from_token(token: &Token) -> Result<FieldDecl, SchemaError> {
    let (name, marker) = token.split_marker();
    let category = match marker {
        "" => FieldCategory::Attribute,
        "*" => FieldCategory::SingleChild,
        "**" => FieldCategory::ChildSequence,
        _ => {
            return Err(SchemaError::InvalidMarker {
                name: name.to_string(),
                marker: marker.to_string(),
                pos: token.pos,
            })
        }
    };
    Ok(FieldDecl::new(name, category, token.pos))
}
