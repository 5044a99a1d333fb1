//! Core data structures and types for the Kairos replay engine

use oxigraph::model::Quad;

/// Identifier of an observation subject (an IRI held as a plain string).
pub type SubjectId = String;

/// One timestamped sensor reading: a subject identifier together with every
/// fact currently known about it in the triple store.
///
/// Observations are materialized lazily from the store on lookup and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct Observation {
    pub subject: SubjectId,
    pub facts: Vec<Quad>,
}

impl Observation {
    pub fn new(subject: impl Into<SubjectId>, facts: Vec<Quad>) -> Self {
        Self { subject: subject.into(), facts }
    }

    /// Length in bytes of this observation rendered as an N-Triples/N-Quads
    /// document. Used as the serialized-size sample by the batch grouper and
    /// as the wire body by the LDP sink.
    pub fn serialized_len(&self) -> usize {
        ntriples_document(&self.facts).len()
    }
}

/// A bundle of observations sized for one sink write.
///
/// The bundle's estimated serialized size approximates the configured target
/// resource size. The estimate is derived from a single sample observation,
/// so heterogeneous observation sizes can make the real serialized size
/// deviate from the target.
#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub members: Vec<Observation>,
}

impl ResourceGroup {
    pub fn new(members: Vec<Observation>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Render every member's facts as one N-Triples/N-Quads document.
    pub fn to_document(&self) -> String {
        let mut doc = String::new();
        for member in &self.members {
            doc.push_str(&ntriples_document(&member.facts));
        }
        doc
    }
}

/// Render a set of quads as an N-Triples/N-Quads document, one statement per
/// line. Quads in the default graph serialize as plain triples.
pub fn ntriples_document(facts: &[Quad]) -> String {
    let mut doc = String::new();
    for fact in facts {
        doc.push_str(&fact.to_string());
        doc.push_str(" .\n");
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{GraphName, Literal, NamedNode};

    #[test]
    fn test_ntriples_document_renders_one_statement_per_line() {
        let quad = Quad::new(
            NamedNode::new("http://example.org/obs/1").unwrap(),
            NamedNode::new("http://example.org/value").unwrap(),
            Literal::new_simple_literal("23.5"),
            GraphName::DefaultGraph,
        );
        let doc = ntriples_document(&[quad]);
        assert_eq!(doc.lines().count(), 1);
        assert!(doc.ends_with(" .\n"));
        assert!(doc.contains("<http://example.org/obs/1>"));
    }

    #[test]
    fn test_observation_serialized_len_matches_document() {
        let quad = Quad::new(
            NamedNode::new("http://example.org/obs/1").unwrap(),
            NamedNode::new("http://example.org/value").unwrap(),
            Literal::new_simple_literal("23.5"),
            GraphName::DefaultGraph,
        );
        let obs = Observation::new("http://example.org/obs/1", vec![quad.clone()]);
        assert_eq!(obs.serialized_len(), ntriples_document(&[quad]).len());
    }
}
