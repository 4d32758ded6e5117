use crate::error::{LexError, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// Identifier, possibly followed by a `*` / `**` marker
    Name,
    Colon,
    LBracket,
    RBracket,
    Comma,
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub typ: TokenType,
    pub lexeme: String,
    pub pos: Position,
}

impl Token {
    /// Splits a `Name` lexeme into identifier and trailing marker.
    pub fn split_marker(&self) -> (&str, &str) {
        let ident = self.lexeme.trim_end_matches('*');
        (ident, &self.lexeme[ident.len()..])
    }
}

pub struct Lexer {
    input: Vec<char>,
    current: usize,
    offset: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self { input: input.chars().collect(), current: 0, offset: 0, line: 1, column: 1 }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token {
                    typ: TokenType::Eof,
                    lexeme: String::new(),
                    pos: self.current_position(),
                });
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let pos = self.current_position();
        let Some(ch) = self.current_char() else {
            return Ok(Token { typ: TokenType::Eof, lexeme: String::new(), pos });
        };

        let typ = match ch {
            ':' => TokenType::Colon,
            '[' => TokenType::LBracket,
            ']' => TokenType::RBracket,
            ',' => TokenType::Comma,
            '\n' => TokenType::Newline,
            _ if is_ident_start(ch) => return Ok(self.read_name()),
            _ => return Err(LexError::UnexpectedChar { ch, pos }),
        };

        self.advance();
        Ok(Token { typ, lexeme: ch.to_string(), pos })
    }

    fn read_name(&mut self) -> Token {
        let pos = self.current_position();
        let start = self.current;

        while let Some(ch) = self.current_char() {
            if is_ident_char(ch) {
                self.advance();
            } else {
                break;
            }
        }

        // Marker stars must touch the identifier
        while self.current_char() == Some('*') {
            self.advance();
        }

        let lexeme: String = self.input[start..self.current].iter().collect();

        Token { typ: TokenType::Name, lexeme, pos }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() && ch != '\n' => {
                    self.advance();
                }
                Some('#') => {
                    // Skip comment, leaving the newline for the parser
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.current).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.current += 1;
            self.offset += ch.len_utf8();

            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.input.len()
    }

    fn current_position(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }
}

/// Whether `name` is a complete identifier, without marker stars
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
