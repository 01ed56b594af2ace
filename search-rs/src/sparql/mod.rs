//! SPARQL query construction for the VirtualHome2KG graph

pub mod escape;
pub mod query;

pub use escape::{escape_literal, escape_regex};
pub use query::{SparqlQuery, VideoFilter};

/// Instance namespace (`ex:`)
pub const PREFIX_EX: &str = "http://kgrc4si.home.kg/virtualhome2kg/instance/";

/// Ontology namespace (`vh2kg:`)
pub const PREFIX_VH2KG: &str = "http://kgrc4si.home.kg/virtualhome2kg/ontology/";

/// Action namespace, a sub-namespace of the ontology
pub const PREFIX_ACTION: &str = "http://kgrc4si.home.kg/virtualhome2kg/ontology/action/";

/// MSSN media segmentation namespace (`mssn:`)
pub const PREFIX_MSSN: &str = "http://mssn.sigappfr.org/mssn/";

/// RDF namespace
pub const PREFIX_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// RDFS namespace
pub const PREFIX_RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// Strip the instance namespace from an IRI, returning local names like
/// `clean_sink3_1_scene7_camera2` unchanged when the prefix is absent.
pub fn strip_instance_prefix(iri: &str) -> &str {
    iri.strip_prefix(PREFIX_EX).unwrap_or(iri)
}
