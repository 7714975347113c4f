//! C-family tokenizer used for token measurement and the macro trace.

pub mod kind;
pub mod lexer;

pub use kind::TokenKind;
pub use lexer::{Lexeme, Lexer, measure_token_length};
