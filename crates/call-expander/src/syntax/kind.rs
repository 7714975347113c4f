use logos::Logos;

/// Raw C-family tokens.
///
/// Keywords are not distinguished from identifiers: the preprocessor sees
/// them all as names, and so does macro parameter substitution.
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[logos(error = ())] // Use unit type for error
pub enum TokenKind {
    #[regex(r"[ \t\r\n\f\v]+")]
    Whitespace,

    #[regex(r"//.*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    // Preprocessor tokens
    #[token("##")]
    HashHash,
    #[token("#")]
    Hash,
    #[token("\\")]
    Backslash,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("...")]
    Ellipsis,
    #[token("->*")]
    ArrowStar,
    #[token("->")]
    Arrow,
    #[token(".*")]
    DotStar,
    #[token(".")]
    Dot,
    #[token("::")]
    DoubleColon,
    #[token("?")]
    Question,

    // Operators (multi-char first)
    #[token(">>=")]
    RightShiftEqual,
    #[token("<<=")]
    LeftShiftEqual,
    #[token("<=>")]
    Spaceship,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,
    #[token("!")]
    Exclaim,
    #[token("=")]
    Equal,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r#"'([^'\\\n]|\\[\s\S])*'"#)]
    Char,
    #[regex(r#""([^"\\\n]|\\[\s\S])*""#)]
    String,
    #[regex(r#"R"([^"]*)""#)]
    RawString,
    #[regex(r"0[xX][0-9A-Fa-f](_?[0-9A-Fa-f])*([uUlL]+)?")]
    #[regex(r"0[bB][01](_?[01])*([uUlL]+)?")]
    #[regex(r"[0-9](_?[0-9])*([uUlL]+)?")]
    Integer,
    #[regex(r"[0-9](_?[0-9])*\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?([fFlL]+)?")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?([fFlL]+)?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*([fFlL]+)?")]
    Float,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}
