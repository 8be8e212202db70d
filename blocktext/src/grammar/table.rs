use std::collections::{BTreeMap, BTreeSet};

use crate::grammar::{Production, RuleName};
use crate::parser::error::ConfigurationError;
use crate::token::TokenKind;

/// A validated, immutable rule set with precomputed lead-token (FIRST) sets.
#[derive(Debug)]
pub struct GrammarTable {
    start: RuleName,
    rules: BTreeMap<RuleName, Production>,
    first: BTreeMap<RuleName, BTreeSet<TokenKind>>,
    nullable: BTreeSet<RuleName>,
}

impl GrammarTable {
    /// Validate `definitions` and build the table.
    ///
    /// Checks, in order: duplicate definitions, that the start rule and every
    /// referenced rule exist, left recursion, repetitions over bodies that can
    /// match nothing, and choice points whose alternatives share lead tokens.
    pub fn build(
        start: RuleName,
        definitions: Vec<(RuleName, Production)>,
    ) -> Result<Self, ConfigurationError> {
        let mut rules = BTreeMap::new();
        let mut order = Vec::new();
        for (name, production) in definitions {
            if rules.insert(name, production).is_some() {
                return Err(ConfigurationError::DuplicateRule(name));
            }
            order.push(name);
        }

        if !rules.contains_key(&start) {
            return Err(ConfigurationError::UndefinedRule {
                rule: start,
                referenced_by: None,
            });
        }
        for name in &order {
            let mut references = Vec::new();
            collect_references(&rules[name], &mut references);
            if let Some(missing) = references.into_iter().find(|r| !rules.contains_key(r)) {
                return Err(ConfigurationError::UndefinedRule {
                    rule: missing,
                    referenced_by: Some(*name),
                });
            }
        }

        let nullable = compute_nullable(&rules);
        let first = compute_first(&rules, &nullable);

        check_left_recursion(&order, &rules, &nullable)?;
        for name in &order {
            check_production(*name, &rules[name], &first, &nullable)?;
        }

        Ok(GrammarTable {
            start,
            rules,
            first,
            nullable,
        })
    }

    pub fn start(&self) -> RuleName {
        self.start
    }

    pub fn rule(&self, name: RuleName) -> Option<&Production> {
        self.rules.get(&name)
    }

    /// Whether `kind` can begin `rule`.
    pub fn starts(&self, rule: RuleName, kind: TokenKind) -> bool {
        self.first.get(&rule).is_some_and(|set| set.contains(&kind))
    }

    /// Lead tokens of `rule`, in a stable order.
    pub fn first(&self, rule: RuleName) -> Vec<TokenKind> {
        self.first
            .get(&rule)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_nullable(&self, rule: RuleName) -> bool {
        self.nullable.contains(&rule)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

fn collect_references(production: &Production, out: &mut Vec<RuleName>) {
    match production {
        Production::Terminal(_) => {}
        Production::Rule(name) => out.push(*name),
        Production::Seq(parts) | Production::Choice(parts) => {
            for part in parts {
                collect_references(part, out);
            }
        }
        Production::Optional(inner) | Production::Many(inner) | Production::AtLeastOne(inner) => {
            collect_references(inner, out)
        }
    }
}

fn is_nullable(production: &Production, nullable: &BTreeSet<RuleName>) -> bool {
    match production {
        Production::Terminal(_) => false,
        Production::Rule(name) => nullable.contains(name),
        Production::Seq(parts) => parts.iter().all(|p| is_nullable(p, nullable)),
        Production::Choice(alternatives) => alternatives.iter().any(|p| is_nullable(p, nullable)),
        Production::Optional(_) | Production::Many(_) => true,
        Production::AtLeastOne(inner) => is_nullable(inner, nullable),
    }
}

fn first_of(
    production: &Production,
    first: &BTreeMap<RuleName, BTreeSet<TokenKind>>,
    nullable: &BTreeSet<RuleName>,
) -> BTreeSet<TokenKind> {
    match production {
        Production::Terminal(terminal) => terminal.kinds().iter().copied().collect(),
        Production::Rule(name) => first.get(name).cloned().unwrap_or_default(),
        Production::Seq(parts) => {
            let mut set = BTreeSet::new();
            for part in parts {
                set.extend(first_of(part, first, nullable));
                if !is_nullable(part, nullable) {
                    break;
                }
            }
            set
        }
        Production::Choice(alternatives) => alternatives
            .iter()
            .flat_map(|p| first_of(p, first, nullable))
            .collect(),
        Production::Optional(inner) | Production::Many(inner) | Production::AtLeastOne(inner) => {
            first_of(inner, first, nullable)
        }
    }
}

fn compute_nullable(rules: &BTreeMap<RuleName, Production>) -> BTreeSet<RuleName> {
    let mut nullable = BTreeSet::new();
    loop {
        let before = nullable.len();
        for (name, production) in rules {
            if !nullable.contains(name) && is_nullable(production, &nullable) {
                nullable.insert(*name);
            }
        }
        if nullable.len() == before {
            return nullable;
        }
    }
}

fn compute_first(
    rules: &BTreeMap<RuleName, Production>,
    nullable: &BTreeSet<RuleName>,
) -> BTreeMap<RuleName, BTreeSet<TokenKind>> {
    let mut first: BTreeMap<RuleName, BTreeSet<TokenKind>> =
        rules.keys().map(|name| (*name, BTreeSet::new())).collect();
    loop {
        let mut changed = false;
        for (name, production) in rules {
            let set = first_of(production, &first, nullable);
            if first.get(name) != Some(&set) {
                first.insert(*name, set);
                changed = true;
            }
        }
        if !changed {
            return first;
        }
    }
}

/// Rules that can be entered before any token of `production` is consumed.
fn leading_rules(production: &Production, nullable: &BTreeSet<RuleName>, out: &mut Vec<RuleName>) {
    match production {
        Production::Terminal(_) => {}
        Production::Rule(name) => out.push(*name),
        Production::Seq(parts) => {
            for part in parts {
                leading_rules(part, nullable, out);
                if !is_nullable(part, nullable) {
                    break;
                }
            }
        }
        Production::Choice(alternatives) => {
            for alternative in alternatives {
                leading_rules(alternative, nullable, out);
            }
        }
        Production::Optional(inner) | Production::Many(inner) | Production::AtLeastOne(inner) => {
            leading_rules(inner, nullable, out)
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Active,
    Done,
}

fn check_left_recursion(
    order: &[RuleName],
    rules: &BTreeMap<RuleName, Production>,
    nullable: &BTreeSet<RuleName>,
) -> Result<(), ConfigurationError> {
    let edges: BTreeMap<RuleName, Vec<RuleName>> = rules
        .iter()
        .map(|(name, production)| {
            let mut leading = Vec::new();
            leading_rules(production, nullable, &mut leading);
            (*name, leading)
        })
        .collect();

    let mut state = BTreeMap::new();
    let mut path = Vec::new();
    for name in order {
        visit(*name, &edges, &mut state, &mut path)?;
    }
    Ok(())
}

fn visit(
    rule: RuleName,
    edges: &BTreeMap<RuleName, Vec<RuleName>>,
    state: &mut BTreeMap<RuleName, Visit>,
    path: &mut Vec<RuleName>,
) -> Result<(), ConfigurationError> {
    match state.get(&rule) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::Active) => {
            let start = path.iter().position(|r| *r == rule).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(rule);
            return Err(ConfigurationError::LeftRecursion(cycle));
        }
        None => {}
    }

    state.insert(rule, Visit::Active);
    path.push(rule);
    for next in edges.get(&rule).into_iter().flatten() {
        visit(*next, edges, state, path)?;
    }
    path.pop();
    state.insert(rule, Visit::Done);
    Ok(())
}

fn check_production(
    rule: RuleName,
    production: &Production,
    first: &BTreeMap<RuleName, BTreeSet<TokenKind>>,
    nullable: &BTreeSet<RuleName>,
) -> Result<(), ConfigurationError> {
    match production {
        Production::Terminal(_) | Production::Rule(_) => Ok(()),
        Production::Seq(parts) => parts
            .iter()
            .try_for_each(|part| check_production(rule, part, first, nullable)),
        Production::Choice(alternatives) => {
            let lead: Vec<BTreeSet<TokenKind>> = alternatives
                .iter()
                .map(|alternative| first_of(alternative, first, nullable))
                .collect();
            for (i, a) in lead.iter().enumerate() {
                for b in &lead[i + 1..] {
                    let overlap: Vec<TokenKind> = a.intersection(b).copied().collect();
                    if !overlap.is_empty() {
                        return Err(ConfigurationError::AmbiguousChoice { rule, overlap });
                    }
                }
            }
            let empty = alternatives
                .iter()
                .filter(|alternative| is_nullable(alternative, nullable))
                .count();
            if empty > 1 {
                return Err(ConfigurationError::NullableAlternatives(rule));
            }
            alternatives
                .iter()
                .try_for_each(|alternative| check_production(rule, alternative, first, nullable))
        }
        Production::Optional(inner) => check_production(rule, inner, first, nullable),
        Production::Many(inner) | Production::AtLeastOne(inner) => {
            if is_nullable(inner, nullable) {
                return Err(ConfigurationError::EmptyLoop(rule));
            }
            check_production(rule, inner, first, nullable)
        }
    }
}
