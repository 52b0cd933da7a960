//! Graph access for DCAT metadata
//!
//! The mapper only needs three questions answered about a node: its first
//! value for a property, the node a property points to, and all values of a
//! property in encounter order. [`GraphAccessor`] captures exactly that, and
//! [`RdfGraph`] answers it for triples read by `oxrdfio`.

use std::collections::HashMap;

use oxrdf::{Literal, NamedOrBlankNode, Term as RdfTerm, Triple};

use crate::vocab::{dcat, rdf, xsd};

/// An RDF term as seen by the mapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Named node
    Iri(String),
    /// Blank node identifier, including the `_:` prefix
    Blank(String),
    /// Literal with optional datatype and language tag
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    /// Plain literal without datatype or language
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Literal tagged with a datatype IRI
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// Literal text, or the identifier for nodes
    pub fn as_text(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::Blank(id) => id,
            Term::Literal { value, .. } => value,
        }
    }

    /// Identifier of the referenced node, if this term is a node
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Term::Iri(id) | Term::Blank(id) => Some(id),
            Term::Literal { .. } => None,
        }
    }

    pub fn datatype(&self) -> Option<&str> {
        match self {
            Term::Literal { datatype, .. } => datatype.as_deref(),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }
}

/// Read-only access to the statements of a metadata graph
///
/// Nodes are addressed by identifier (IRI or `_:` blank node id). A property
/// with no value is reported as absent (`None` / empty), which is distinct
/// from a property whose value is the empty string.
pub trait GraphAccessor {
    /// All values of `property` on `subject`, in encounter order
    fn values(&self, subject: &str, property: &str) -> Vec<Term>;

    /// First value of `property` on `subject`
    fn scalar(&self, subject: &str, property: &str) -> Option<Term> {
        self.values(subject, property).into_iter().next()
    }

    /// Identifier of the first node `property` points to from `subject`
    fn related(&self, subject: &str, property: &str) -> Option<String> {
        self.values(subject, property)
            .into_iter()
            .find_map(|t| t.node_id().map(String::from))
    }
}

/// In-memory triple store keyed by subject
///
/// Statements keep the order they were inserted in, which for parsed
/// documents is the order the parser produced them. Inserting a triple that
/// is already present is a no-op, as in any RDF graph.
#[derive(Debug, Default)]
pub struct RdfGraph {
    statements: HashMap<String, Vec<(String, Term)>>,
    order: Vec<String>,
    triples: usize,
}

impl RdfGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple, returning false if the graph already held it
    pub fn insert(&mut self, triple: Triple) -> bool {
        let Some(object) = to_term(triple.object) else {
            return false;
        };
        let subject = subject_id(&triple.subject);
        let predicate = triple.predicate.into_string();

        if !self.statements.contains_key(&subject) {
            self.order.push(subject.clone());
        }
        let statements = self.statements.entry(subject).or_default();
        if statements
            .iter()
            .any(|(p, o)| *p == predicate && *o == object)
        {
            return false;
        }
        statements.push((predicate, object));
        self.triples += 1;
        true
    }

    /// Identifiers of all nodes typed `dcat:Dataset`, in insertion order
    pub fn datasets(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.has_type(id, dcat::DATASET))
            .cloned()
            .collect()
    }

    /// Check if a node appears as the subject of any statement
    pub fn contains(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    /// Number of subject nodes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn triple_count(&self) -> usize {
        self.triples
    }

    /// Check if a node carries a specific rdf:type
    pub fn has_type(&self, id: &str, type_iri: &str) -> bool {
        self.values(id, rdf::TYPE)
            .iter()
            .any(|t| t.node_id() == Some(type_iri))
    }
}

impl GraphAccessor for RdfGraph {
    fn values(&self, subject: &str, property: &str) -> Vec<Term> {
        self.statements
            .get(subject)
            .map(|statements| {
                statements
                    .iter()
                    .filter(|(p, _)| p == property)
                    .map(|(_, t)| t.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn subject_id(subject: &NamedOrBlankNode) -> String {
    match subject {
        NamedOrBlankNode::NamedNode(node) => node.as_str().to_string(),
        NamedOrBlankNode::BlankNode(node) => format!("_:{}", node.as_str()),
    }
}

/// Convert an object term; quoted triples have no meaning for the mapper
fn to_term(term: RdfTerm) -> Option<Term> {
    match term {
        RdfTerm::NamedNode(node) => Some(Term::Iri(node.into_string())),
        RdfTerm::BlankNode(node) => Some(Term::Blank(format!("_:{}", node.as_str()))),
        RdfTerm::Literal(literal) => Some(literal_term(&literal)),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Simple and language-tagged strings become untyped literals
fn literal_term(literal: &Literal) -> Term {
    let datatype = literal.datatype().as_str();
    Term::Literal {
        value: literal.value().to_string(),
        datatype: (datatype != xsd::STRING && datatype != rdf::LANG_STRING)
            .then(|| datatype.to_string()),
        language: literal.language().map(String::from),
    }
}
