//! Chomsky Normal Form conversion for letter grammars, and the
//! lexicographically smallest word such a grammar derives within a length
//! bound.
//!
//! - `grammars`: symbols, rules, non-terminal allocation, JSON loading
//! - `cnf`: the four normalization passes and `CnfGrammar`
//! - `parsers`: the minimal-word table and a CYK recognizer

pub mod cnf;
pub mod grammars;
pub mod parsers;

pub use cnf::{CnfGrammar, NullableSet};
pub use grammars::{Grammar, GrammarError, NonTerminalAllocator, Rule, Symbol};
pub use parsers::min_word::{minimal_word, MinWord, MinWordSolver};
