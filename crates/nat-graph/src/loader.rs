//! Line-oriented `from to [weight]` edge-list reader.
//!
//! The loader only drives the public [`Graph`] contract: it never reaches into
//! a store's tables, and it never hides a [`GraphError::Corrupted`].

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use nat_core::errors::GraphError;
use nat_core::{Graph, NodeId};
use thiserror::Error;
use tracing::{info, warn};

/// Neighbor capacity requested for every node the loader creates.
pub const LOADER_NEIGHBOR_CAPACITY: usize = 16;

/// Weight assigned to records that omit one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Failure that stopped a load before the end of input.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Reading from the input failed part way through.
    #[error("failed to read line {line}: {source}")]
    Read {
        /// One-based line number being read.
        line: usize,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The store reported corruption; loading cannot continue.
    #[error("store corrupted at line {line}: {source}")]
    Graph {
        /// One-based line number being applied.
        line: usize,
        /// The fatal store error.
        #[source]
        source: GraphError,
    },
}

/// Summary of a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Lines read, including comments and blanks.
    pub lines: usize,
    /// Edges the store accepted.
    pub edges_added: usize,
    /// Malformed lines plus records the store rejected.
    pub warnings: usize,
}

impl LoadReport {
    /// Returns true when every record was applied.
    pub fn is_complete(&self) -> bool {
        self.warnings == 0
    }
}

/// One parsed `from to [weight]` record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    /// Source endpoint.
    pub from: NodeId,
    /// Target endpoint.
    pub to: NodeId,
    /// Edge weight, [`DEFAULT_WEIGHT`] when omitted.
    pub weight: f64,
}

/// Parses one line. `Ok(None)` marks a blank or comment line.
pub fn parse_line(line: &str) -> Result<Option<EdgeRecord>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut tokens = line.split_whitespace();
    let from = parse_id(tokens.next(), "from")?;
    let to = parse_id(tokens.next(), "to")?;
    let weight = match tokens.next() {
        None => DEFAULT_WEIGHT,
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|err| format!("invalid weight `{raw}`: {err}"))?,
    };
    Ok(Some(EdgeRecord { from, to, weight }))
}

fn parse_id(token: Option<&str>, field: &str) -> Result<NodeId, String> {
    let raw = token.ok_or_else(|| format!("missing `{field}` endpoint"))?;
    raw.parse::<i64>()
        .map(NodeId::from_raw)
        .map_err(|err| format!("invalid `{field}` endpoint `{raw}`: {err}"))
}

/// Loads every record from `reader` into `graph`.
pub fn load_edge_list<R, G>(mut reader: R, graph: &mut G) -> Result<LoadReport, LoadError>
where
    R: BufRead,
    G: Graph + ?Sized,
{
    let mut report = LoadReport::default();
    let mut buf = Vec::new();
    loop {
        let line_no = report.lines + 1;
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| LoadError::Read {
                line: line_no,
                source,
            })?;
        if read == 0 {
            break;
        }
        report.lines = line_no;
        let parsed = match std::str::from_utf8(&buf) {
            Ok(line) => parse_line(line),
            Err(err) => Err(format!("line is not valid UTF-8: {err}")),
        };
        let record = match parsed {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(reason) => {
                warn!(line = line_no, %reason, "loader.malformed_line");
                report.warnings += 1;
                continue;
            }
        };
        if apply_record(graph, record, line_no)? {
            report.edges_added += 1;
        } else {
            report.warnings += 1;
        }
    }
    info!(
        lines = report.lines,
        edges = report.edges_added,
        warnings = report.warnings,
        "loader.done"
    );
    Ok(report)
}

/// Opens `path` and loads it with [`load_edge_list`].
pub fn load_edge_list_path<G>(path: impl AsRef<Path>, graph: &mut G) -> Result<LoadReport, LoadError>
where
    G: Graph + ?Sized,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    load_edge_list(BufReader::new(file), graph)
}

/// Applies one record. Returns whether the edge was added.
fn apply_record<G>(graph: &mut G, record: EdgeRecord, line: usize) -> Result<bool, LoadError>
where
    G: Graph + ?Sized,
{
    for endpoint in [record.from, record.to] {
        match graph.insert_node(endpoint, LOADER_NEIGHBOR_CAPACITY) {
            Ok(()) | Err(GraphError::AlreadyExists(_)) => {}
            Err(err) => return reject(err, line),
        }
    }
    match graph.insert_edge(record.from, record.to, record.weight) {
        Ok(()) => Ok(true),
        Err(err) => reject(err, line),
    }
}

fn reject(err: GraphError, line: usize) -> Result<bool, LoadError> {
    if err.is_fatal() {
        return Err(LoadError::Graph { line, source: err });
    }
    warn!(line, code = %err.code(), error = %err, "loader.rejected_record");
    Ok(false)
}
