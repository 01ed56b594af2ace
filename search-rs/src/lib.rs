//! # mmkg-search - VirtualHome2KG Media Search Core
//!
//! Search core for the KGRC4SI multimedia knowledge graph: simulated
//! household activities recorded as scenes, camera views and video/image
//! media, plus an action/object video search. This crate owns everything
//! between the user's filter selections and the graph-query endpoint:
//!
//! - parameterized SPARQL construction with mandatory escaping of
//!   free-text filters
//! - query execution against a remote SPARQL 1.1 endpoint or an
//!   in-process store
//! - mapping of result bindings into domain records
//! - the cascading activity → scene → camera → media selection state
//! - page windows and shareable URL search parameters
//!
//! ## Architecture
//!
//! ```text
//! selection / pagination state
//!          │
//!          ▼
//!   sparql::SparqlQuery ──► endpoint (HTTP or memory) ──► mapping
//!          ▲                                                │
//!          └──────────── session::SearchSession ◄───────────┘
//! ```
//!
//! Rendering, routing and theming live in the consuming front end, not
//! here.

pub mod endpoint;
pub mod errors;
pub mod mapping;
pub mod pagination;
pub mod selection;
pub mod session;
pub mod sparql;

pub use endpoint::{Binding, HttpEndpoint, MemoryEndpoint, RdfTerm, SparqlEndpoint};
pub use errors::{Result, SearchError};
pub use mapping::{
    Action, Activity, BboxAnnotation, FrameSpan, ImageFrame, Recording, SegmentAction, VideoRecord,
};
pub use pagination::{PageWindow, SearchParams, TOTAL_VIDEOS_PER_PAGE};
pub use selection::{adjust_frame, MediaKind, SelectionEvent, SelectionStage, SelectionState};
pub use session::{SearchSession, VideoPage};
pub use sparql::{SparqlQuery, VideoFilter};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default repository endpoint of the KGRC4SI GraphDB container.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:7200/repositories/kgrc4si";
