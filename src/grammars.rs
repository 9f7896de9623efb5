// Grammars module - letter-based symbol model, rule store and JSON grammar loading

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of letters available to terminals (`a`..`z`) and to source
/// non-terminals (`A`..`Z`)
pub const ALPHABET_SIZE: u32 = 26;

/// Start symbol used when a grammar does not name one
pub const DEFAULT_START: char = 'S';

/// Directory holding the bundled grammar definitions
pub const GRAMMARS_DIR: &str = "grammars";

// ============================================================================
// Symbols
// ============================================================================

/// A grammar symbol - either a terminal or non-terminal identified by ID.
/// Terminals and non-terminals have independent ID spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(u32),
    NonTerminal(u32),
}

impl Symbol {
    /// Lowercase letters are terminals, uppercase letters are non-terminals
    pub fn from_letter(letter: char) -> Option<Symbol> {
        match letter {
            'a'..='z' => Some(Symbol::Terminal(letter as u32 - 'a' as u32)),
            'A'..='Z' => Some(Symbol::NonTerminal(letter as u32 - 'A' as u32)),
            _ => None,
        }
    }

    /// Check if this is a terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// Check if this is a non-terminal
    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    /// Get the numeric ID
    pub fn id(&self) -> u32 {
        match self {
            Symbol::Terminal(id) | Symbol::NonTerminal(id) => *id,
        }
    }

    /// The letter this symbol was written as. Synthetic non-terminals
    /// introduced by normalization have none.
    pub fn to_char(&self) -> Option<char> {
        match self {
            Symbol::Terminal(id) => terminal_char(*id),
            Symbol::NonTerminal(id) if *id < ALPHABET_SIZE => char::from_u32('A' as u32 + id),
            Symbol::NonTerminal(_) => None,
        }
    }
}

/// Map a terminal ID back to its letter
pub fn terminal_char(id: u32) -> Option<char> {
    if id < ALPHABET_SIZE {
        char::from_u32('a' as u32 + id)
    } else {
        None
    }
}

/// Display name of a non-terminal ID: its letter, or `<N{id}>` for helpers
pub fn non_terminal_name(id: u32) -> String {
    match Symbol::NonTerminal(id).to_char() {
        Some(letter) => letter.to_string(),
        None => format!("<N{}>", id),
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(id) => match terminal_char(*id) {
                Some(letter) => write!(f, "'{}'", letter),
                None => write!(f, "'t{}'", id),
            },
            Symbol::NonTerminal(id) => write!(f, "{}", non_terminal_name(*id)),
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// A production `left -> right`. An empty right-hand side is an epsilon rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    left: u32,
    right: Vec<Symbol>,
}

impl Rule {
    pub fn new(left: u32, right: Vec<Symbol>) -> Self {
        Rule { left, right }
    }

    pub fn unary(left: u32, symbol: Symbol) -> Self {
        Rule::new(left, vec![symbol])
    }

    pub fn binary(left: u32, first: Symbol, second: Symbol) -> Self {
        Rule::new(left, vec![first, second])
    }

    /// Build a rule from letters, e.g. `('S', "aSb")`. An empty body is epsilon.
    pub fn from_letters(left: char, right: &str) -> Option<Self> {
        let left = match Symbol::from_letter(left)? {
            Symbol::NonTerminal(id) => id,
            Symbol::Terminal(_) => return None,
        };
        let right = right
            .chars()
            .map(Symbol::from_letter)
            .collect::<Option<Vec<_>>>()?;
        Some(Rule::new(left, right))
    }

    /// ID of the left-hand non-terminal
    pub fn left(&self) -> u32 {
        self.left
    }

    pub fn right(&self) -> &[Symbol] {
        &self.right
    }

    pub fn len(&self) -> usize {
        self.right.len()
    }

    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }

    /// `A -> B` with a single non-terminal on the right
    pub fn is_chain(&self) -> bool {
        matches!(self.right.as_slice(), [Symbol::NonTerminal(_)])
    }

    /// Two-symbol rule with at least one terminal
    pub fn is_mixed(&self) -> bool {
        self.right.len() == 2 && self.right.iter().any(Symbol::is_terminal)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.right.is_empty() {
            return write!(f, "{} -> ε", non_terminal_name(self.left));
        }
        let rhs: Vec<String> = self.right.iter().map(|sym| sym.to_string()).collect();
        write!(f, "{} -> {}", non_terminal_name(self.left), rhs.join(" "))
    }
}

// ============================================================================
// Non-terminal allocation
// ============================================================================

/// Hands out fresh non-terminal IDs. IDs are never reused, and the letter
/// range `0..ALPHABET_SIZE` is reserved for source non-terminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminalAllocator {
    next: u32,
}

impl NonTerminalAllocator {
    pub fn new() -> Self {
        NonTerminalAllocator {
            next: ALPHABET_SIZE,
        }
    }

    pub fn fresh(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Allocate `n` contiguous IDs
    pub fn fresh_block(&mut self, n: u32) -> Range<u32> {
        let block = self.next..self.next + n;
        self.next += n;
        block
    }

    /// Number of non-terminal IDs in use, letters included
    pub fn count(&self) -> u32 {
        self.next
    }
}

impl Default for NonTerminalAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Grammar
// ============================================================================

#[derive(Debug, Clone)]
pub struct Grammar {
    pub name: String,
    pub start: u32,
    pub rules: Vec<Rule>,
    pub allocator: NonTerminalAllocator,
    /// Words the grammar is expected to derive
    pub tests: Vec<String>,
}

impl Grammar {
    /// Create a new empty grammar with start symbol `S`
    pub fn new(name: &str) -> Self {
        let start = Symbol::from_letter(DEFAULT_START).map_or(0, |sym| sym.id());
        Grammar::with_start(name, start)
    }

    pub fn with_start(name: &str, start: u32) -> Self {
        debug_assert!(start < ALPHABET_SIZE, "start symbol must be a letter");
        Grammar {
            name: name.to_string(),
            start,
            rules: Vec::new(),
            allocator: NonTerminalAllocator::new(),
            tests: Vec::new(),
        }
    }

    /// Build a grammar from `(left, right)` letter pairs, start symbol `S`
    pub fn from_letter_rules(name: &str, rules: &[(char, &str)]) -> Option<Self> {
        let mut grammar = Grammar::new(name);
        for &(left, right) in rules {
            grammar.push_rule(Rule::from_letters(left, right)?);
        }
        Some(grammar)
    }

    pub fn push_rule(&mut self, rule: Rule) {
        debug_assert!(
            self.in_bounds(&rule),
            "rule {} references a non-terminal outside the allocated range",
            rule
        );
        self.rules.push(rule);
    }

    fn in_bounds(&self, rule: &Rule) -> bool {
        let limit = self.allocator.count();
        rule.left() < limit
            && rule.right().iter().all(|sym| match sym {
                Symbol::NonTerminal(id) => *id < limit,
                Symbol::Terminal(_) => true,
            })
    }

    /// Count total number of productions
    pub fn production_count(&self) -> usize {
        self.rules.len()
    }

    /// Productions whose left-hand side is `nt`
    pub fn productions_of(&self, nt: u32) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |rule| rule.left() == nt)
    }

    /// Get the start symbol's name
    pub fn start_str(&self) -> String {
        non_terminal_name(self.start)
    }

    pub fn debug_print(&self) {
        println!("=== Grammar: {} ===", self.name);
        println!("Start symbol: {} (id={})", self.start_str(), self.start);
        println!("Non-terminal IDs in use: {}", self.allocator.count());
        println!("\nRules:");
        for rule in &self.rules {
            println!("  {}", rule);
        }
        println!("=== End Grammar ===\n");
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse grammar JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid symbol {symbol:?} in {context}")]
    InvalidSymbol { context: String, symbol: String },
    #[error("start symbol {0:?} is not a non-terminal letter")]
    InvalidStart(String),
    #[error("grammars directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

// ============================================================================
// Grammar Loading
// ============================================================================

fn default_start() -> String {
    DEFAULT_START.to_string()
}

/// JSON structure for grammar files
#[derive(Debug, Deserialize)]
struct GrammarJson {
    name: String,
    #[serde(default = "default_start")]
    start: String,
    rules: BTreeMap<String, Vec<Vec<String>>>,
    #[serde(default)]
    tests: Vec<String>,
}

/// Parse a single-letter symbol
fn parse_symbol(text: &str, context: &str) -> Result<Symbol, GrammarError> {
    let mut chars = text.chars();
    let symbol = match (chars.next(), chars.next()) {
        (Some(letter), None) => Symbol::from_letter(letter),
        _ => None,
    };
    symbol.ok_or_else(|| GrammarError::InvalidSymbol {
        context: context.to_string(),
        symbol: text.to_string(),
    })
}

fn parse_non_terminal(text: &str, context: &str) -> Result<u32, GrammarError> {
    match parse_symbol(text, context)? {
        Symbol::NonTerminal(id) => Ok(id),
        Symbol::Terminal(_) => Err(GrammarError::InvalidSymbol {
            context: context.to_string(),
            symbol: text.to_string(),
        }),
    }
}

/// Load a grammar from a JSON file
pub fn load_grammar_from_file<P: AsRef<Path>>(path: P) -> Result<Grammar, GrammarError> {
    let content = fs::read_to_string(&path).map_err(|source| GrammarError::Io {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    load_grammar_from_str(&content)
}

/// Load a grammar from a JSON string
pub fn load_grammar_from_str(json: &str) -> Result<Grammar, GrammarError> {
    let parsed: GrammarJson = serde_json::from_str(json)?;

    let start = parse_non_terminal(&parsed.start, "start")
        .map_err(|_| GrammarError::InvalidStart(parsed.start.clone()))?;
    let mut grammar = Grammar::with_start(&parsed.name, start);

    // BTreeMap keeps rules ordered by left-hand side
    for (lhs, productions) in &parsed.rules {
        let left = parse_non_terminal(lhs, "rule head")?;
        for prod in productions {
            let context = format!("rule for {}", lhs);
            let right = prod
                .iter()
                .map(|sym| parse_symbol(sym, &context))
                .collect::<Result<Vec<_>, _>>()?;
            grammar.push_rule(Rule::new(left, right));
        }
    }

    for test in &parsed.tests {
        if let Some(bad) = test.chars().find(|c| !c.is_ascii_lowercase()) {
            return Err(GrammarError::InvalidSymbol {
                context: format!("test word {:?}", test),
                symbol: bad.to_string(),
            });
        }
        grammar.tests.push(test.clone());
    }

    Ok(grammar)
}

/// Load all grammars from a directory of `*.json` files, sorted by file name.
/// Files that fail to load are skipped with a warning.
pub fn load_all_grammars<P: AsRef<Path>>(grammars_dir: P) -> Result<Vec<Grammar>, GrammarError> {
    let dir = grammars_dir.as_ref();

    if !dir.exists() {
        return Err(GrammarError::MissingDirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| GrammarError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GrammarError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut grammars = Vec::new();
    for path in paths {
        match load_grammar_from_file(&path) {
            Ok(grammar) => grammars.push(grammar),
            Err(e) => eprintln!("Warning: Failed to load {:?}: {}", path, e),
        }
    }

    Ok(grammars)
}

/// Load a specific grammar by name from a grammars directory
pub fn load_grammar<P: AsRef<Path>>(grammars_dir: P, name: &str) -> Result<Grammar, GrammarError> {
    let path = grammars_dir.as_ref().join(format!("{}.json", name));
    load_grammar_from_file(&path)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "grammars_tests.rs"]
mod tests;
