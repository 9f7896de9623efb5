// CYK recognizer over a CNF grammar

use crate::cnf::CnfGrammar;
use crate::grammars::{Grammar, Symbol};
use std::collections::HashSet;

/// CYK table: table[s][e] holds the non-terminals deriving text[s..e]
pub type CYKTable = Vec<Vec<HashSet<u32>>>;

pub struct CYKParser {
    pub grammar: CnfGrammar,
    pub terminal_productions: Vec<(u32, u32)>,
    pub nonterminal_productions: Vec<(u32, (u32, u32))>,
}

impl CYKParser {
    pub fn new(grammar: CnfGrammar) -> Self {
        let mut terminal_productions: Vec<(u32, u32)> = Vec::new();
        let mut nonterminal_productions: Vec<(u32, (u32, u32))> = Vec::new();

        // Classify by type
        for rule in &grammar.rules {
            match rule.right() {
                [Symbol::Terminal(t)] => terminal_productions.push((rule.left(), *t)),
                [Symbol::NonTerminal(nt1), Symbol::NonTerminal(nt2)] => {
                    nonterminal_productions.push((rule.left(), (*nt1, *nt2)))
                }
                _ => {}
            }
        }

        CYKParser {
            grammar,
            terminal_productions,
            nonterminal_productions,
        }
    }

    /// We need table[s][e] for 0 <= s <= e <= length
    fn init_table(&self, length: usize) -> CYKTable {
        vec![vec![HashSet::new(); length + 1]; length + 1]
    }

    /// Parse terminals (length 1 substrings)
    fn parse_1(&self, text: &[u32], length: usize, table: &mut CYKTable) {
        for s in 0..length {
            for &(key, terminal) in &self.terminal_productions {
                if text[s] == terminal {
                    table[s][s + 1].insert(key);
                }
            }
        }
    }

    /// Parse non-terminals for spans of length n
    fn parse_n(&self, n: usize, length: usize, table: &mut CYKTable) {
        for s in 0..=length - n {
            for p in 1..n {
                for &(k, (r_b, r_c)) in &self.nonterminal_productions {
                    if table[s][s + p].contains(&r_b) && table[s + p][s + n].contains(&r_c) {
                        table[s][s + n].insert(k);
                    }
                }
            }
        }
    }

    /// Recognize a sequence of terminal IDs from the start symbol
    pub fn recognize_tokens(&self, text: &[u32]) -> bool {
        let length = text.len();
        if length == 0 {
            return self.grammar.start_nullable();
        }

        let mut table = self.init_table(length);
        self.parse_1(text, length, &mut table);

        for n in 2..=length {
            self.parse_n(n, length, &mut table);
        }

        table[0][length].contains(&self.grammar.start)
    }

    /// Recognize a word of lowercase letters. Any other character rejects.
    pub fn recognize(&self, word: &str) -> bool {
        match tokenize(word) {
            Some(tokens) => self.recognize_tokens(&tokens),
            None => false,
        }
    }
}

/// Tokenize a word to terminal IDs.
/// Returns None if any character is not a terminal letter
pub fn tokenize(word: &str) -> Option<Vec<u32>> {
    word.chars()
        .map(|c| match Symbol::from_letter(c)? {
            Symbol::Terminal(id) => Some(id),
            Symbol::NonTerminal(_) => None,
        })
        .collect()
}

/// Normalize `grammar` and check whether it derives `word`
pub fn recognize(grammar: &Grammar, word: &str) -> bool {
    CYKParser::new(grammar.to_cnf()).recognize(word)
}
