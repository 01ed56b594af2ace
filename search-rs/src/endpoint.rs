//! Query executors for the remote SPARQL endpoint and the in-memory store
//!
//! Both executors return the same `Binding` rows, so everything above this
//! layer (mapping, session, CLI) is endpoint-agnostic. The HTTP executor
//! carries a request timeout; a dead endpoint surfaces as
//! `SearchError::Network` instead of an indefinite hang. No retries.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use oxigraph::io::RdfFormat;
use oxigraph::store::Store;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{Result, SearchError};
use crate::sparql::SparqlQuery;

/// Default request timeout for the HTTP executor.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One RDF term of a result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfTerm {
    Iri(String),
    Literal(String),
    Blank(String),
}

impl RdfTerm {
    /// Lexical value regardless of term kind.
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Iri(v) | RdfTerm::Literal(v) | RdfTerm::Blank(v) => v,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, RdfTerm::Iri(_))
    }

    /// Parse the term as an unsigned integer (aggregate counts, frame
    /// numbers).
    pub fn as_u64(&self) -> Result<u64> {
        self.value()
            .parse::<u64>()
            .map_err(|_| SearchError::Parse(format!("expected integer literal, got {:?}", self)))
    }
}

/// One row of a SELECT result: variable name to term.
pub type Binding = HashMap<String, RdfTerm>;

/// A query executor. Implemented by [`HttpEndpoint`] for the remote
/// graph-query service and [`MemoryEndpoint`] for an in-process store.
pub trait SparqlEndpoint {
    fn select(&self, query: &SparqlQuery) -> impl Future<Output = Result<Vec<Binding>>> + Send;
    fn ask(&self, query: &SparqlQuery) -> impl Future<Output = Result<bool>> + Send;
}

// ---------------------------------------------------------------------------
// SPARQL 1.1 JSON results format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ResultsJson {
    #[serde(default)]
    results: Option<SolutionsJson>,
    #[serde(default)]
    boolean: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SolutionsJson {
    #[serde(default)]
    bindings: Vec<HashMap<String, TermJson>>,
}

#[derive(Debug, Deserialize)]
struct TermJson {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

/// Parse the body of a `application/sparql-results+json` SELECT response.
pub fn parse_select_results(body: &str) -> Result<Vec<Binding>> {
    let parsed: ResultsJson = serde_json::from_str(body)?;
    let solutions = parsed
        .results
        .ok_or_else(|| SearchError::Query("response has no results section".to_string()))?;

    let mut rows = Vec::with_capacity(solutions.bindings.len());
    for binding in solutions.bindings {
        let mut row = Binding::new();
        for (var, term) in binding {
            let term = match term.kind.as_str() {
                "uri" => RdfTerm::Iri(term.value),
                "literal" | "typed-literal" => RdfTerm::Literal(term.value),
                "bnode" => RdfTerm::Blank(term.value),
                other => {
                    return Err(SearchError::Query(format!(
                        "unknown term type in results: {}",
                        other
                    )))
                }
            };
            row.insert(var, term);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse the body of an ASK response.
pub fn parse_ask_results(body: &str) -> Result<bool> {
    let parsed: ResultsJson = serde_json::from_str(body)?;
    parsed
        .boolean
        .ok_or_else(|| SearchError::Query("response has no boolean section".to_string()))
}

// ---------------------------------------------------------------------------
// HTTP executor
// ---------------------------------------------------------------------------

/// Executor for a remote SPARQL 1.1 Protocol endpoint.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    /// Executor with the default request timeout.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn execute(&self, query: &SparqlQuery) -> Result<String> {
        debug!(endpoint = %self.url, "dispatching SPARQL query");
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/sparql-query")
            .header("Accept", "application/sparql-results+json")
            .body(query.as_str().to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let excerpt: String = body.chars().take(200).collect();
            return Err(SearchError::Query(format!(
                "endpoint returned {}: {}",
                status, excerpt
            )));
        }
        Ok(body)
    }
}

impl SparqlEndpoint for HttpEndpoint {
    async fn select(&self, query: &SparqlQuery) -> Result<Vec<Binding>> {
        let body = self.execute(query).await?;
        parse_select_results(&body)
    }

    async fn ask(&self, query: &SparqlQuery) -> Result<bool> {
        let body = self.execute(query).await?;
        parse_ask_results(&body)
    }
}

// ---------------------------------------------------------------------------
// In-memory executor
// ---------------------------------------------------------------------------

/// Executor over an in-process oxigraph store. Used for offline runs
/// against a Turtle dump and for integration tests.
pub struct MemoryEndpoint {
    store: Store,
}

impl std::fmt::Debug for MemoryEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEndpoint").finish_non_exhaustive()
    }
}

impl MemoryEndpoint {
    pub fn new() -> Result<Self> {
        let store = Store::new().map_err(|e| SearchError::Store(e.to_string()))?;
        Ok(Self { store })
    }

    /// Store pre-loaded with Turtle data.
    pub fn from_turtle(turtle: &str) -> Result<Self> {
        let endpoint = Self::new()?;
        endpoint.load_turtle(turtle)?;
        Ok(endpoint)
    }

    pub fn load_turtle(&self, turtle: &str) -> Result<()> {
        self.store
            .load_from_reader(RdfFormat::Turtle, turtle.as_bytes())
            .map_err(|e| SearchError::Store(e.to_string()))?;
        Ok(())
    }

    fn run_select(&self, query: &SparqlQuery) -> Result<Vec<Binding>> {
        use oxigraph::model::Term;
        use oxigraph::sparql::QueryResults;

        let results = self
            .store
            .query(query.as_str())
            .map_err(|e| SearchError::Query(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| SearchError::Query(e.to_string()))?;
                    let mut row = Binding::new();
                    for (var, term) in solution.iter() {
                        let term = match term {
                            Term::NamedNode(node) => RdfTerm::Iri(node.as_str().to_string()),
                            Term::Literal(literal) => {
                                RdfTerm::Literal(literal.value().to_string())
                            }
                            Term::BlankNode(node) => RdfTerm::Blank(node.as_str().to_string()),
                            Term::Triple(_) => {
                                return Err(SearchError::Query(
                                    "quoted triples are not supported".to_string(),
                                ))
                            }
                        };
                        row.insert(var.as_str().to_string(), term);
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            QueryResults::Boolean(_) => Err(SearchError::Query(
                "expected solutions, got boolean result".to_string(),
            )),
            QueryResults::Graph(_) => Err(SearchError::Query(
                "expected solutions, got graph result".to_string(),
            )),
        }
    }

    fn run_ask(&self, query: &SparqlQuery) -> Result<bool> {
        use oxigraph::sparql::QueryResults;

        let results = self
            .store
            .query(query.as_str())
            .map_err(|e| SearchError::Query(e.to_string()))?;
        match results {
            QueryResults::Boolean(value) => Ok(value),
            _ => Err(SearchError::Query(
                "expected boolean result from ASK".to_string(),
            )),
        }
    }
}

impl SparqlEndpoint for MemoryEndpoint {
    async fn select(&self, query: &SparqlQuery) -> Result<Vec<Binding>> {
        self.run_select(query)
    }

    async fn ask(&self, query: &SparqlQuery) -> Result<bool> {
        self.run_ask(query)
    }
}
