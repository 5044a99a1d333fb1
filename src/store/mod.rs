//! Triple store wrapper over Oxigraph.
//!
//! The replay engine treats the triple store as an external collaborator and
//! consumes exactly three read operations from it: subject discovery by
//! relation, single attribute lookup, and full fact retrieval for one
//! subject. This module wraps the Oxigraph in-memory store behind that
//! interface and adds dataset loading, which (re)fills the store from an RDF
//! file on disk.

use crate::core::SubjectId;
use oxigraph::io::RdfFormat;
use oxigraph::model::{NamedNode, NamedOrBlankNode, Quad, Term};
use oxigraph::store::Store;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised by triple store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid IRI: {0}")]
    InvalidIri(#[from] oxigraph::model::IriParseError),
    #[error("storage error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),
    #[error("failed to load dataset: {0}")]
    Load(#[from] oxigraph::store::LoaderError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported RDF file extension: {0:?}")]
    UnsupportedFormat(String),
}

/// In-memory RDF store holding the raw loaded dataset.
pub struct TripleStore {
    store: Store,
}

impl TripleStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self { store: Store::new()? })
    }

    /// Load an RDF file into the store, picking the parser from the file
    /// extension. Returns the number of quads added.
    pub fn load_file(&self, path: &Path) -> Result<usize, StoreError> {
        let extension =
            path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase();
        let format = rdf_format_from_extension(&extension)
            .ok_or_else(|| StoreError::UnsupportedFormat(extension))?;
        let file = BufReader::new(File::open(path)?);
        self.load_reader(format, file)
    }

    /// Load RDF data from any reader. Returns the number of quads added.
    pub fn load_reader(
        &self,
        format: RdfFormat,
        reader: impl Read,
    ) -> Result<usize, StoreError> {
        let initial_count = self.store.len()?;
        self.store.load_from_reader(format, reader)?;
        let final_count = self.store.len()?;
        Ok(final_count - initial_count)
    }

    /// Total number of quads currently loaded.
    pub fn quad_count(&self) -> Result<usize, StoreError> {
        Ok(self.store.len()?)
    }

    /// Find every subject that appears in at least one fact using the given
    /// relation.
    ///
    /// The result is deduplicated while preserving first-seen order; that
    /// order is the discovery order later used by the sequencer to break
    /// timestamp ties.
    pub fn find_subjects_by_relation(
        &self,
        relation: &str,
    ) -> Result<Vec<SubjectId>, StoreError> {
        let predicate = NamedNode::new(relation)?;
        let mut seen = HashSet::new();
        let mut subjects = Vec::new();
        for quad in self.store.quads_for_pattern(None, Some(predicate.as_ref()), None, None) {
            let quad = quad?;
            let subject = subject_value(&quad.subject);
            if seen.insert(subject.clone()) {
                debug!(subject = %subject, "discovered observation subject");
                subjects.push(subject);
            }
        }
        Ok(subjects)
    }

    /// Look up the value of a single attribute of a subject.
    ///
    /// Returns the first matching object's lexical value, or `None` when the
    /// subject has no fact with that attribute.
    pub fn attribute(
        &self,
        subject: &str,
        attribute: &str,
    ) -> Result<Option<String>, StoreError> {
        let subject = NamedNode::new(subject)?;
        let predicate = NamedNode::new(attribute)?;
        for quad in self.store.quads_for_pattern(
            Some(subject.as_ref().into()),
            Some(predicate.as_ref()),
            None,
            None,
        ) {
            let quad = quad?;
            return Ok(Some(term_value(&quad.object)));
        }
        Ok(None)
    }

    /// Retrieve every fact whose subject is the given identifier.
    pub fn all_facts(&self, subject: &str) -> Result<Vec<Quad>, StoreError> {
        let subject = NamedNode::new(subject)?;
        let mut facts = Vec::new();
        for quad in
            self.store.quads_for_pattern(Some(subject.as_ref().into()), None, None, None)
        {
            facts.push(quad?);
        }
        Ok(facts)
    }
}

/// Map a lowercase file extension onto an RDF parser format.
pub fn rdf_format_from_extension(extension: &str) -> Option<RdfFormat> {
    match extension {
        "nt" | "ntriples" => Some(RdfFormat::NTriples),
        "nq" | "nquads" => Some(RdfFormat::NQuads),
        "ttl" | "turtle" => Some(RdfFormat::Turtle),
        "trig" => Some(RdfFormat::TriG),
        "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
        "n3" => Some(RdfFormat::N3),
        _ => None,
    }
}

fn subject_value(subject: &NamedOrBlankNode) -> SubjectId {
    match subject {
        NamedOrBlankNode::NamedNode(node) => node.as_str().to_string(),
        NamedOrBlankNode::BlankNode(node) => node.as_str().to_string(),
    }
}

fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}
