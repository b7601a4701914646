// Infrastructure implementations for revcg.

pub mod concurrency;
pub mod loader;
pub mod settings;
pub mod store;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::domain::callgraph::CallScope;
use crate::domain::hierarchy::Scope;
use crate::domain::methods::MethodId;
use crate::domain::revision::RevisionCallGraph;
use crate::ports::OutputExporter;

/// Writes the JSON interchange format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pub pretty: bool,
}

impl JsonExporter {
    pub fn to_json(&self, rcg: &RevisionCallGraph) -> Result<String> {
        let json = if self.pretty {
            rcg.to_json_string_pretty()?
        } else {
            rcg.to_json_string()?
        };
        Ok(json)
    }
}

impl OutputExporter for JsonExporter {
    fn export(&self, rcg: &RevisionCallGraph, path: &str) -> Result<()> {
        loader::write_string(Path::new(path), &self.to_json(rcg)?)
    }
}

/// Writes a Graphviz rendering of the call graph.
pub struct DotExporter;

impl OutputExporter for DotExporter {
    fn export(&self, rcg: &RevisionCallGraph, path: &str) -> Result<()> {
        loader::write_string(Path::new(path), &Self::to_dot(rcg))
    }
}

impl DotExporter {
    pub fn to_dot(rcg: &RevisionCallGraph) -> String {
        let mut lines = Vec::new();

        lines.push("digraph CallGraph {".to_string());
        lines.push("    rankdir=LR;".to_string());
        lines.push(format!("    label=\"{}\";", Self::escape_label(rcg.uri().as_str())));
        lines.push("    node [fontname=\"Helvetica\", fontsize=11, shape=box, style=filled];".to_string());
        lines.push("".to_string());

        // Same collision order as map_of_all_methods: later scopes win.
        let mut nodes: BTreeMap<MethodId, (Scope, String)> = BTreeMap::new();
        for (scope, types) in rcg.class_hierarchy().iter() {
            for ty in types.values() {
                for (id, node) in ty.methods().iter() {
                    nodes.insert(id, (scope, node.entity().to_string()));
                }
            }
        }
        for (id, (scope, label)) in &nodes {
            lines.push(format!(
                "    \"{}\" [label=\"{}\", fillcolor=\"{}\"];",
                id,
                Self::escape_label(label),
                Self::fill_color(*scope)
            ));
        }

        // Callees without a declared method still get a node.
        let mut undeclared: Vec<MethodId> = CallScope::ALL
            .iter()
            .flat_map(|&scope| rcg.graph().calls(scope).keys())
            .flat_map(|&(caller, callee)| [caller, callee])
            .filter(|id| !nodes.contains_key(id))
            .collect();
        undeclared.sort_unstable();
        undeclared.dedup();
        for id in undeclared {
            lines.push(format!(
                "    \"{}\" [label=\"#{}\", fillcolor=\"{}\"];",
                id,
                id,
                Self::fill_color(Scope::ExternalTypes)
            ));
        }

        lines.push("".to_string());

        for scope in CallScope::ALL {
            for (&(caller, callee), sites) in rcg.graph().calls(scope) {
                lines.push(format!(
                    "    \"{}\" -> \"{}\" [style={}, label=\"{}\"];",
                    caller,
                    callee,
                    Self::edge_style(scope),
                    sites.len()
                ));
            }
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn fill_color(scope: Scope) -> &'static str {
        match scope {
            Scope::InternalTypes => "#89b4fa", // Blue
            Scope::ExternalTypes | Scope::ResolvedTypes => "#6c7086", // Gray
        }
    }

    fn edge_style(scope: CallScope) -> &'static str {
        match scope {
            CallScope::Internal => "solid",
            CallScope::External => "dashed",
            CallScope::Resolved => "dotted",
        }
    }

    fn escape_label(s: &str) -> String {
        s.replace('\\', "\\\\").replace('"', "\\\"")
    }
}
