// CNF module - the four rewriting passes that bring a grammar into
// Chomsky Normal Form, and the resulting grammar
//
// Pass order matters:
//   binarize -> eliminate_epsilon -> eliminate_chains -> isolate_terminals
// Each pass is a pure function from a rule collection to a new one. Passes
// that introduce helper non-terminals take the allocator by `&mut`.

use crate::grammars::{non_terminal_name, Grammar, NonTerminalAllocator, Rule, Symbol};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// Non-terminals that derive the empty word
pub type NullableSet = BTreeSet<u32>;

/// A grammar in Chomsky Normal Form: every rule is `A -> B C` or `A -> a`.
/// The empty word is tracked separately through `nullable`.
#[derive(Debug, Clone)]
pub struct CnfGrammar {
    pub name: String,
    pub start: u32,
    pub rules: Vec<Rule>,
    /// Nullable set of the grammar before epsilon elimination
    pub nullable: NullableSet,
    /// Non-terminal IDs in use, helpers included
    pub num_non_terminals: u32,
}

impl CnfGrammar {
    /// Whether the source grammar derives the empty word
    pub fn start_nullable(&self) -> bool {
        self.nullable.contains(&self.start)
    }

    pub fn is_cnf(&self) -> bool {
        is_cnf(&self.rules)
    }

    pub fn debug_print(&self) {
        println!("=== CNF Grammar: {} ===", self.name);
        println!(
            "Start symbol: {} (id={}, nullable={})",
            non_terminal_name(self.start),
            self.start,
            self.start_nullable()
        );
        println!("Non-terminal IDs in use: {}", self.num_non_terminals);
        println!("\nRules:");
        for rule in &self.rules {
            println!("  {}", rule);
        }
        println!("=== End Grammar ===\n");
    }
}

impl fmt::Display for CnfGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

// ============================================================================
// Long rules
// ============================================================================

// [t1, t2, t3, t4] under A becomes
//   A -> t1 B1, B1 -> t2 B2, B2 -> t3 t4
// with B1, B2 a fresh contiguous block.
pub fn binarize(rules: &[Rule], allocator: &mut NonTerminalAllocator) -> Vec<Rule> {
    let mut new_rules = Vec::with_capacity(rules.len());

    for rule in rules {
        let right = rule.right();
        let length = right.len();
        if length <= 2 {
            new_rules.push(rule.clone());
            continue;
        }

        let helpers = allocator.fresh_block((length - 2) as u32);
        let mut left = rule.left();
        for (&symbol, helper) in right.iter().zip(helpers) {
            new_rules.push(Rule::binary(left, symbol, Symbol::NonTerminal(helper)));
            left = helper;
        }
        new_rules.push(Rule::binary(left, right[length - 2], right[length - 1]));
    }

    new_rules
}

// ============================================================================
// Epsilon rules
// ============================================================================

/// Least fixed point of "every right-hand symbol is nullable", found by
/// sweeping all rules until nothing new turns up
pub fn nullable_set(rules: &[Rule]) -> NullableSet {
    let mut nullable = NullableSet::new();
    let mut changed = true;

    while changed {
        changed = false;
        for rule in rules {
            if nullable.contains(&rule.left()) {
                continue;
            }
            // Terminals are never nullable; an empty right side trivially is
            let all_nullable = rule.right().iter().all(|sym| match sym {
                Symbol::NonTerminal(nt) => nullable.contains(nt),
                Symbol::Terminal(_) => false,
            });
            if all_nullable {
                nullable.insert(rule.left());
                changed = true;
            }
        }
    }

    nullable
}

/// Drop epsilon rules and add the shortened variants of binary rules.
/// Rules must already be binarized.
pub fn eliminate_epsilon(rules: &[Rule], nullable: &NullableSet) -> Vec<Rule> {
    let is_nullable = |sym: &Symbol| matches!(sym, Symbol::NonTerminal(nt) if nullable.contains(nt));
    let mut new_rules = Vec::with_capacity(rules.len());

    for rule in rules {
        debug_assert!(rule.len() <= 2, "eliminate_epsilon before binarize: {}", rule);
        match rule.right() {
            [] => continue,
            [first, second] => {
                new_rules.push(rule.clone());
                if is_nullable(first) {
                    new_rules.push(Rule::unary(rule.left(), *second));
                }
                if is_nullable(second) {
                    new_rules.push(Rule::unary(rule.left(), *first));
                }
            }
            _ => new_rules.push(rule.clone()),
        }
    }

    new_rules
}

// ============================================================================
// Chain rules
// ============================================================================

/// For every non-terminal `v`, the non-terminals `u` with `u ->+ v` through
/// chain rules. `u` is its own ancestor only when a chain cycle leads back to it.
pub fn chain_ancestors(rules: &[Rule], num_non_terminals: u32) -> Vec<Vec<u32>> {
    let n = num_non_terminals as usize;
    let mut graph: Vec<Vec<usize>> = vec![Vec::new(); n];
    for rule in rules {
        if let [Symbol::NonTerminal(to)] = rule.right() {
            graph[rule.left() as usize].push(*to as usize);
        }
    }

    let mut ancestors: Vec<Vec<u32>> = vec![Vec::new(); n];
    for vertex in 0..n {
        if graph[vertex].is_empty() {
            continue;
        }
        let mut visited = vec![false; n];
        let mut queue = VecDeque::from([vertex]);
        while let Some(current) = queue.pop_front() {
            for &to in &graph[current] {
                if !visited[to] {
                    visited[to] = true;
                    queue.push_back(to);
                    ancestors[to].push(vertex as u32);
                }
            }
        }
    }

    ancestors
}

/// Remove chain rules, copying every other rule of `B` up to each chain
/// ancestor of `B`
pub fn eliminate_chains(rules: &[Rule], num_non_terminals: u32) -> Vec<Rule> {
    let ancestors = chain_ancestors(rules, num_non_terminals);
    let mut new_rules = Vec::with_capacity(rules.len());

    for rule in rules.iter().filter(|rule| !rule.is_chain()) {
        new_rules.push(rule.clone());
        for &from in &ancestors[rule.left() as usize] {
            if from != rule.left() {
                new_rules.push(Rule::new(from, rule.right().to_vec()));
            }
        }
    }

    new_rules
}

// ============================================================================
// Mixed rules
// ============================================================================

/// Give every terminal occurrence in a two-symbol rule its own helper
/// non-terminal `N -> t`
pub fn isolate_terminals(rules: &[Rule], allocator: &mut NonTerminalAllocator) -> Vec<Rule> {
    let mut new_rules = Vec::with_capacity(rules.len());

    for rule in rules {
        if !rule.is_mixed() {
            new_rules.push(rule.clone());
            continue;
        }

        let mut new_right = Vec::with_capacity(rule.len());
        for &symbol in rule.right() {
            match symbol {
                Symbol::Terminal(_) => {
                    let helper = allocator.fresh();
                    new_rules.push(Rule::unary(helper, symbol));
                    new_right.push(Symbol::NonTerminal(helper));
                }
                Symbol::NonTerminal(_) => new_right.push(symbol),
            }
        }
        new_rules.push(Rule::new(rule.left(), new_right));
    }

    new_rules
}

/// Every rule is one terminal or exactly two non-terminals
pub fn is_cnf(rules: &[Rule]) -> bool {
    rules.iter().all(|rule| {
        matches!(
            rule.right(),
            [Symbol::Terminal(_)] | [Symbol::NonTerminal(_), Symbol::NonTerminal(_)]
        )
    })
}

// Converting grammars to CNF
impl Grammar {
    /// Convert the grammar to Chomsky Normal Form (CNF)
    pub fn to_cnf(&self) -> CnfGrammar {
        let mut allocator = self.allocator.clone();

        let rules = binarize(&self.rules, &mut allocator);
        let nullable = nullable_set(&rules);
        let rules = eliminate_epsilon(&rules, &nullable);
        let rules = eliminate_chains(&rules, allocator.count());
        let rules = isolate_terminals(&rules, &mut allocator);
        debug_assert!(is_cnf(&rules));

        CnfGrammar {
            name: self.name.clone(),
            start: self.start,
            rules,
            nullable,
            num_non_terminals: allocator.count(),
        }
    }
}

#[cfg(test)]
#[path = "cnf_tests.rs"]
pub(crate) mod tests;
