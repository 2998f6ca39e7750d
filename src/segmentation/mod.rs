pub mod token;
pub mod tokenizer;
pub mod vietnamese;

pub use token::{
    SubToken,
    Token,
    TokenKind,
};
pub use tokenizer::{
    DictType,
    Tokenizer,
    VibratoTokenizer,
};
pub use vietnamese::VietnameseDictionary;
