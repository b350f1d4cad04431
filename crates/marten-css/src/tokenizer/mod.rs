//! CSS tokenization per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).

mod token;
#[allow(clippy::module_inception)]
mod tokenizer;

pub use token::{CssToken, HashType, NumericType};
pub use tokenizer::CssTokenizer;
