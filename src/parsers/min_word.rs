// Lexicographically minimal word - CYK-style table indexed by word length
// instead of input span

use crate::cnf::CnfGrammar;
use crate::grammars::{terminal_char, Grammar, Symbol};
use std::fmt;

/// Printed when the empty word is the answer
pub const EMPTY_WORD_MARKER: &str = "$";
/// Printed when no word within the length bound exists
pub const IMPOSSIBLE_MARKER: &str = "IMPOSSIBLE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinWord {
    /// The start symbol is nullable, so the empty word wins
    Empty,
    Word(String),
    Impossible,
}

impl MinWord {
    pub fn as_word(&self) -> Option<&str> {
        match self {
            MinWord::Empty => Some(""),
            MinWord::Word(word) => Some(word),
            MinWord::Impossible => None,
        }
    }
}

impl fmt::Display for MinWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinWord::Empty => f.write_str(EMPTY_WORD_MARKER),
            MinWord::Word(word) => f.write_str(word),
            MinWord::Impossible => f.write_str(IMPOSSIBLE_MARKER),
        }
    }
}

/// table[len][nt] = smallest word of exactly `len` letters derivable from `nt`
pub type MinWordTable = Vec<Vec<Option<String>>>;

pub struct MinWordSolver {
    pub grammar: CnfGrammar,
    pub terminal_productions: Vec<(u32, char)>,
    pub nonterminal_productions: Vec<(u32, (u32, u32))>,
}

impl MinWordSolver {
    pub fn new(grammar: CnfGrammar) -> Self {
        let mut terminal_productions: Vec<(u32, char)> = Vec::new();
        let mut nonterminal_productions: Vec<(u32, (u32, u32))> = Vec::new();

        for rule in &grammar.rules {
            match rule.right() {
                [Symbol::Terminal(t)] => match terminal_char(*t) {
                    Some(letter) => terminal_productions.push((rule.left(), letter)),
                    None => debug_assert!(false, "terminal id {} outside the alphabet", t),
                },
                [Symbol::NonTerminal(b), Symbol::NonTerminal(c)] => {
                    nonterminal_productions.push((rule.left(), (*b, *c)))
                }
                _ => debug_assert!(false, "rule {} is not in CNF", rule),
            }
        }

        MinWordSolver {
            grammar,
            terminal_productions,
            nonterminal_productions,
        }
    }

    fn init_table(&self, length: usize) -> MinWordTable {
        vec![vec![None; self.grammar.num_non_terminals as usize]; length + 1]
    }

    /// Single letters
    fn fill_1(&self, table: &mut MinWordTable) {
        for &(key, letter) in &self.terminal_productions {
            offer(&mut table[1][key as usize], letter.to_string());
        }
    }

    /// Words of length n, split as p + (n - p)
    fn fill_n(&self, n: usize, table: &mut MinWordTable) {
        for &(k, (r_b, r_c)) in &self.nonterminal_productions {
            for p in 1..n {
                let candidate = match (&table[p][r_b as usize], &table[n - p][r_c as usize]) {
                    (Some(left), Some(right)) => {
                        let mut word = String::with_capacity(n);
                        word.push_str(left);
                        word.push_str(right);
                        word
                    }
                    _ => continue,
                };
                offer(&mut table[n][k as usize], candidate);
            }
        }
    }

    /// Fill the table for every length up to `length`. Row 0 stays empty.
    pub fn build_table(&self, length: usize) -> MinWordTable {
        let mut table = self.init_table(length);
        if length == 0 {
            return table;
        }
        self.fill_1(&mut table);
        for n in 2..=length {
            self.fill_n(n, &mut table);
        }
        table
    }

    /// Smallest word derivable from the start symbol with at most `length`
    /// letters
    pub fn solve(&self, length: usize) -> MinWord {
        if self.grammar.start_nullable() {
            return MinWord::Empty;
        }

        let table = self.build_table(length);
        let start = self.grammar.start as usize;
        table
            .iter()
            .skip(1)
            .filter_map(|row| row[start].as_ref())
            .min()
            .map_or(MinWord::Impossible, |word| MinWord::Word(word.clone()))
    }
}

/// Keep the smaller of the current entry and `candidate`
fn offer(slot: &mut Option<String>, candidate: String) {
    match slot {
        Some(best) if *best <= candidate => {}
        _ => *slot = Some(candidate),
    }
}

/// Normalize `grammar` and find its smallest word of at most `length` letters
pub fn minimal_word(grammar: &Grammar, length: usize) -> MinWord {
    MinWordSolver::new(grammar.to_cnf()).solve(length)
}
