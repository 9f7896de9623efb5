pub mod cyk;
pub mod min_word;
