mod tokenizer;

pub use tokenizer::PromptTokenizer;
