use logos::Logos;

/// Tokens of one G-code program line
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f\r]+")] // Skip whitespace
#[logos(error = LexerError)]
pub enum Token {
    /// Program stream delimiter
    #[token("%")]
    Percent,

    /// Block address, `N12`
    #[regex(r"N[0-9]+", |lex| lex.slice()[1..].parse::<u32>().ok())]
    Address(u32),

    /// Parenthesized comment, without the parentheses
    #[regex(r"\([^)]*\)", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].trim().to_string()
    })]
    Comment(String),

    /// Tool select, `T100001` or `TEM-1`; the code is kept as written
    #[regex(r"T[^ \t\f\r\n();%]+", |lex| lex.slice()[1..].to_string())]
    Tool(String),

    /// Address word, `G1`, `X-1.25`
    #[regex(r"[A-MO-SU-Z]-?[0-9]+(\.[0-9]+)?", |lex| Word::parse(lex.slice()))]
    Word(Word),

    // Semicolon comments run to end of line
    #[regex(r";[^\n]*", logos::skip)]
    LineComment,
}

/// Letter plus the number text as written
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub letter: char,
    pub number: String,
}

impl Word {
    fn parse(slice: &str) -> Option<Self> {
        let mut chars = slice.chars();
        let letter = chars.next()?;
        Some(Self {
            letter,
            number: chars.as_str().to_string(),
        })
    }

    pub fn value(&self) -> Option<f64> {
        self.number.parse().ok()
    }

    /// True for `letter` with an integer code, e.g. `is('G', 41)`
    pub fn is(&self, letter: char, code: u32) -> bool {
        self.letter == letter && self.number.parse::<u32>().ok() == Some(code)
    }
}

impl Token {
    /// `(@@ key = value)` annotation parts
    pub fn annotation(&self) -> Option<(&str, &str)> {
        match self {
            Token::Comment(text) => {
                let (key, value) = text.strip_prefix("@@")?.split_once('=')?;
                Some((key.trim(), value.trim()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LexerError;

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lexer error")
    }
}

impl std::error::Error for LexerError {}

/// Lex one program line, failing on the first unrecognized text
pub fn lex(line: &str) -> Result<Vec<Token>, LexerError> {
    Token::lexer(line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(letter: char, number: &str) -> Token {
        Token::Word(Word {
            letter,
            number: number.to_string(),
        })
    }

    #[test]
    fn test_motion_block() {
        let tokens = lex("N14 G2 X1.25 Y-0.25 I0.0 J-0.25").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Address(14),
                word('G', "2"),
                word('X', "1.25"),
                word('Y', "-0.25"),
                word('I', "0.0"),
                word('J', "-0.25"),
            ]
        );
    }

    #[test]
    fn test_annotation() {
        let tokens = lex("N3 (@@ seq_start = 4)").unwrap();
        assert_eq!(tokens[0], Token::Address(3));
        assert_eq!(tokens[1].annotation(), Some(("seq_start", "4")));

        let plain = lex("(rough pass)").unwrap();
        assert_eq!(plain, vec![Token::Comment("rough pass".to_string())]);
        assert_eq!(plain[0].annotation(), None);
    }

    #[test]
    fn test_percent_and_line_comment() {
        assert_eq!(lex("%").unwrap(), vec![Token::Percent]);
        assert_eq!(lex("G20 ; inches").unwrap(), vec![word('G', "20")]);
    }

    #[test]
    fn test_word_helpers() {
        let Token::Word(g41) = &lex("G41").unwrap()[0] else {
            panic!("expected a word");
        };
        assert!(g41.is('G', 41));
        assert!(!g41.is('G', 40));
        assert_eq!(g41.value(), Some(41.0));
    }

    #[test]
    fn test_tool_codes_are_opaque() {
        assert_eq!(
            lex("N5 T100001 M6").unwrap(),
            vec![Token::Address(5), Token::Tool("100001".to_string()), word('M', "6")]
        );
        assert_eq!(
            lex("N9 TEM-1 M6").unwrap(),
            vec![Token::Address(9), Token::Tool("EM-1".to_string()), word('M', "6")]
        );
        assert_eq!(
            lex("T12(@@ seq_name = x)").unwrap()[0],
            Token::Tool("12".to_string())
        );
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert_eq!(lex("N2 G1 X1.0 $$"), Err(LexerError));
    }
}
