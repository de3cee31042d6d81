use std::fmt;
use std::result::Result as stdResult;

use anyhow::bail;
use log::{info, warn};
use pest::{error::Error as PestError, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::tree::{
    Node,
    NodeIdx::{self, Internal as Int, Leaf},
    Tree,
};
use crate::Result;

#[derive(Parser)]
#[grammar = "./tree/newick.pest"]
pub struct NewickParser;

#[derive(Debug)]
pub struct ParsingError(pub Box<PestError<Rule>>);

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Malformed newick string")?;
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParsingError {}

/// Parses one or more newick trees from a string.
///
/// Internal nodes keep all of their children, so unrooted trees stay rooted at their
/// trifurcation without any extra nodes.
///
/// # Example
/// ```
/// use asr_gaps::tree::tree_parser::from_newick;
/// let trees = from_newick("((A:1.0,B:2.0)5:0.5,C:1.0)4;").unwrap();
/// assert_eq!(trees.len(), 1);
/// assert_eq!(trees[0].leaves().len(), 3);
/// assert_eq!(trees[0].internals().len(), 2);
/// ```
pub fn from_newick(newick_string: &str) -> Result<Vec<Tree>> {
    info!("Parsing newick trees.");
    let mut trees = Vec::new();
    let newick_rule = match NewickParser::parse(Rule::newick, newick_string) {
        Ok(mut pairs) => match pairs.next() {
            Some(rule) => rule,
            None => unreachable!(),
        },
        Err(e) => bail!(ParsingError(Box::new(e))),
    };
    for tree_rule in newick_rule.into_inner() {
        match tree_rule.as_rule() {
            Rule::tree => {
                let mut tree = Tree::new_empty();
                if let Err(e) = tree.parse_tree_rule(tree_rule) {
                    bail!(ParsingError(e));
                }
                trees.push(tree);
            }
            Rule::EOI => (),
            _ => unreachable!(),
        }
    }
    info!("Finished parsing {} newick tree(s) successfully.", trees.len());
    Ok(trees)
}

impl Tree {
    fn parse_tree_rule(&mut self, tree_rule: Pair<Rule>) -> stdResult<(), Box<PestError<Rule>>> {
        let Some(node_rule) = tree_rule.into_inner().next() else {
            unreachable!()
        };
        match node_rule.as_rule() {
            Rule::leaf => {
                self.root = self.parse_leaf_rule(None, node_rule)?;
            }
            Rule::internal => {
                self.root = self.parse_internal_rule(None, node_rule)?;
            }
            _ => unreachable!(),
        }
        if self.nodes.iter().any(|node| node.blen < 0.0) {
            warn!("Tree contains negative branch lengths.");
        }
        self.complete();
        Ok(())
    }

    fn parse_internal_rule(
        &mut self,
        parent: Option<NodeIdx>,
        internal_rule: Pair<Rule>,
    ) -> stdResult<NodeIdx, Box<PestError<Rule>>> {
        let node_idx = self.nodes.len();
        self.nodes.push(Node::unlabelled_internal(node_idx, parent));

        let mut children = Vec::new();
        for rule in internal_rule.into_inner() {
            match rule.as_rule() {
                Rule::label => self.nodes[node_idx].id = Tree::parse_label_rule(rule),
                Rule::branch_length => {
                    self.nodes[node_idx].blen = Tree::parse_branch_length_rule(rule)?
                }
                Rule::internal => children.push(self.parse_internal_rule(Some(Int(node_idx)), rule)?),
                Rule::leaf => children.push(self.parse_leaf_rule(Some(Int(node_idx)), rule)?),
                _ => unreachable!(),
            }
        }
        self.nodes[node_idx].children = children;
        Ok(Int(node_idx))
    }

    fn parse_leaf_rule(
        &mut self,
        parent: Option<NodeIdx>,
        leaf_rule: Pair<Rule>,
    ) -> stdResult<NodeIdx, Box<PestError<Rule>>> {
        let mut id = String::from("");
        let mut blen = 0.0;
        for rule in leaf_rule.into_inner() {
            match rule.as_rule() {
                Rule::label => id = Tree::parse_label_rule(rule),
                Rule::branch_length => blen = Tree::parse_branch_length_rule(rule)?,
                _ => unreachable!(),
            }
        }
        let node_idx = self.nodes.len();
        self.nodes.push(Node::new_leaf(node_idx, parent, blen, id));
        Ok(Leaf(node_idx))
    }

    fn parse_branch_length_rule(rule: Pair<Rule>) -> stdResult<f64, Box<PestError<Rule>>> {
        let span = rule.as_span();
        let value = rule
            .into_inner()
            .find(|inner| inner.as_rule() == Rule::float)
            .map_or("", |inner| inner.as_str());
        value.parse::<f64>().map_err(|e| {
            Box::new(PestError::new_from_span(
                pest::error::ErrorVariant::CustomError {
                    message: format!("Invalid branch length {}: {}", value, e),
                },
                span,
            ))
        })
    }

    fn parse_label_rule(rule: Pair<Rule>) -> String {
        rule.as_str().trim_matches('\'').to_string()
    }
}
