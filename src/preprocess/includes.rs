//! `#include` resolution.
//!
//! Includes are spliced into the line buffer until none remain. Every
//! inserted line keeps its origin so diagnostics point into the included
//! file. The include relation is kept as a directed graph to tell cycles
//! apart from plain duplicates.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::context::{Context, IncludeRecord};
use crate::error::{CompilerError, Phase};
use crate::source::{self, Cursor, LoadError, Origin, SourceLoader};

pub struct IncludeGraph {
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl IncludeGraph {
    pub fn new(root: &str) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let idx = graph.add_node(root.to_string());
        node_indices.insert(root.to_string(), idx);
        IncludeGraph { graph, node_indices }
    }

    /// Record that `includer` includes `included`.
    pub fn add(&mut self, includer: &str, included: &str) -> Result<(), String> {
        let from = self.node(includer);
        if let Some(&to) = self.node_indices.get(included) {
            if to == from || has_path_connecting(&self.graph, to, from, None) {
                let mut chain = self.chain(from);
                chain.push(included.to_string());
                return Err(format!("Include cycle: {}", chain.join(" -> ")));
            }
            return Err(format!("File '{included}' has already been included."));
        }
        let to = self.node(included);
        self.graph.add_edge(from, to, ());
        Ok(())
    }

    fn node(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_string());
        self.node_indices.insert(path.to_string(), idx);
        idx
    }

    /// Files from the root down to `idx`. Each file has one includer.
    fn chain(&self, mut idx: NodeIndex) -> Vec<String> {
        let mut chain = vec![self.graph[idx].clone()];
        while let Some(parent) = self.graph.neighbors_directed(idx, Direction::Incoming).next() {
            chain.push(self.graph[parent].clone());
            idx = parent;
        }
        chain.reverse();
        chain
    }
}

pub fn resolve(
    ctx: &mut Context,
    cursor: &mut Cursor,
    loader: &dyn SourceLoader,
) -> Result<(), CompilerError> {
    let mut graph = IncludeGraph::new(ctx.file_path());
    let base_dir = source::relative_dir(ctx.file_path());

    loop {
        cursor.reset();
        if !cursor.seek_line_keyword("#include") {
            break;
        }
        let line_idx = cursor.line_idx();
        cursor.skip_spaces();
        let path = collect_path(cursor)?;

        let (resolved, contents) = match source::embedded(&path) {
            Some(contents) => (path.clone(), contents.to_string()),
            None => {
                let resolved = if path.contains("..") {
                    path.clone()
                } else {
                    format!("{base_dir}{path}")
                };
                let contents = loader.load(&resolved).map_err(|err| match err {
                    LoadError::NotFound(_) => cursor.error(
                        Phase::Preprocess,
                        "R002",
                        format!("Included file '{resolved}' does not exist"),
                    ),
                    other => cursor.error(Phase::Preprocess, "R003", other.to_string()),
                })?;
                (resolved, contents)
            }
        };

        let includer = cursor
            .origin(line_idx)
            .map(|origin| origin.file.clone())
            .unwrap_or_default();
        graph
            .add(&includer, &resolved)
            .map_err(|message| cursor.error(Phase::Preprocess, "R004", message))?;

        let lines: Vec<String> = contents
            .replace("\r\n", "\n")
            .split('\n')
            .map(str::to_string)
            .collect();
        let origins = (0..lines.len())
            .map(|i| Origin {
                file: resolved.clone(),
                line: i + 1,
            })
            .collect();
        debug!(file = %resolved, lines = lines.len(), "include resolved");
        ctx.includes.push(IncludeRecord {
            file: resolved,
            start_line: line_idx + 1,
            end_line: line_idx + lines.len(),
        });
        cursor.splice_lines(line_idx, 1, lines, origins);
    }
    Ok(())
}

fn collect_path(cursor: &mut Cursor) -> Result<String, CompilerError> {
    let quote = match cursor.char() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(cursor.error(Phase::Preprocess, "R001", "Expected file path")),
    };
    cursor.advance();
    let path = cursor.collect_until(quote);
    if path.is_empty() || cursor.char() != Some(quote) {
        return Err(cursor.error(Phase::Preprocess, "R001", "Expected file path"));
    }
    cursor.advance();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_distinguishes_cycles_from_duplicates() {
        let mut graph = IncludeGraph::new("main.cherri");
        graph.add("main.cherri", "a.cherri").unwrap();
        graph.add("a.cherri", "b.cherri").unwrap();

        let cycle = graph.add("b.cherri", "a.cherri").unwrap_err();
        assert_eq!(cycle, "Include cycle: main.cherri -> a.cherri -> b.cherri -> a.cherri");

        graph.add("main.cherri", "c.cherri").unwrap();
        let duplicate = graph.add("c.cherri", "b.cherri").unwrap_err();
        assert!(duplicate.contains("already been included"));
    }

    #[test]
    fn self_include_is_a_cycle() {
        let mut graph = IncludeGraph::new("main.cherri");
        let err = graph.add("main.cherri", "main.cherri").unwrap_err();
        assert!(err.starts_with("Include cycle"));
    }
}
