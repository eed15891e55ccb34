//! Tokenizer for the expression language.

use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
    // Keywords
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    If,
    Else,
    For,
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

fn keyword(name: &str) -> Option<Token> {
    Some(match name {
        "True" => Token::True,
        "False" => Token::False,
        "None" => Token::None,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "if" => Token::If,
        "else" => Token::Else,
        "for" => Token::For,
        _ => return None,
    })
}

struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.src.len(), |(i, _)| *i)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ExprError {
        ExprError::Syntax {
            offset,
            message: message.into(),
        }
    }

    fn number(&mut self) -> Result<Token, ExprError> {
        let start = self.offset();
        let mut is_float = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += 1 + sign;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        let text = &self.src[start..self.offset()];
        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return Err(self.error(start, format!("invalid number literal '{text}'")));
        }

        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(start, format!("invalid float literal '{text}'")))
        } else if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
            Err(self.error(start, "leading zeros in integer literals are not permitted"))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| self.error(start, format!("integer literal '{text}' is too large")))
        }
    }

    fn string(&mut self, quote: char) -> Result<Token, ExprError> {
        let start = self.offset();
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error(start, "unterminated string literal"));
            };
            self.pos += 1;
            match c {
                c if c == quote => return Ok(Token::Str(out)),
                '\\' => {
                    let Some(escaped) = self.peek() else {
                        return Err(self.error(start, "unterminated string literal"));
                    };
                    self.pos += 1;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' | '\'' | '"' => out.push(escaped),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn name(&mut self) -> Token {
        let start = self.offset();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let text = &self.src[start..self.offset()];
        keyword(text).unwrap_or_else(|| Token::Name(text.to_string()))
    }

    fn operator(&mut self) -> Result<Token, ExprError> {
        let offset = self.offset();
        let c = self.peek().unwrap_or('\0');
        let next = self.peek_at(1);
        let (token, width) = match (c, next) {
            ('*', Some('*')) => (Token::DoubleStar, 2),
            ('/', Some('/')) => (Token::DoubleSlash, 2),
            ('=', Some('=')) => (Token::EqEq, 2),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            ('{', _) => (Token::LBrace, 1),
            ('}', _) => (Token::RBrace, 1),
            (',', _) => (Token::Comma, 1),
            (':', _) => (Token::Colon, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('=', _) => return Err(self.error(offset, "assignment is not allowed")),
            ('.', _) => return Err(self.error(offset, "attribute access is not allowed")),
            (other, _) => return Err(self.error(offset, format!("unexpected character '{other}'"))),
        };
        self.pos += width;
        Ok(token)
    }
}

/// Splits `src` into tokens, ending with [`Token::Eof`].
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut lexer = Lexer {
        src,
        chars: src.char_indices().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();

    while let Some(c) = lexer.peek() {
        if c.is_whitespace() {
            lexer.pos += 1;
            continue;
        }
        let offset = lexer.offset();
        let token = if c.is_ascii_digit()
            || (c == '.' && lexer.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
        {
            lexer.number()?
        } else if c == '\'' || c == '"' {
            lexer.string(c)?
        } else if c.is_ascii_alphabetic() || c == '_' {
            lexer.name()
        } else {
            lexer.operator()?
        };
        tokens.push(Spanned { token, offset });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: src.len(),
    });
    Ok(tokens)
}
