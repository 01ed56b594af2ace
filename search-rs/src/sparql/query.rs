//! Query types and builders for SPARQL
//!
//! Every constructor returns a complete, self-contained query string.
//! Optional text filters are omitted entirely when empty rather than
//! rendered as match-anything patterns, so the endpoint never evaluates
//! a clause that constrains nothing. Paginated queries always carry a
//! stable `ORDER BY` key so that `OFFSET` windows line up across
//! repeated requests.

use crate::errors::{Result, SearchError};
use crate::pagination::PageWindow;
use crate::sparql::escape::{escape_literal, escape_regex};
use crate::sparql::{PREFIX_EX, PREFIX_MSSN, PREFIX_RDF, PREFIX_RDFS, PREFIX_VH2KG};

/// A built SPARQL query string.
pub struct SparqlQuery {
    query: String,
}

/// Filter values for the action/object video search.
///
/// `action` is an exact-match IRI; `main_object`, `target_object` and
/// `camera` are case-insensitive substring filters. Empty optional fields
/// drop their clause from the generated query.
#[derive(Debug, Clone)]
pub struct VideoFilter {
    action: String,
    main_object: String,
    target_object: String,
    camera: String,
}

impl VideoFilter {
    /// Create a filter from the two required inputs.
    ///
    /// Fails with `SearchError::Validation` when the action IRI contains
    /// characters that could terminate the `<...>` form, or when the main
    /// object is empty.
    pub fn new(action_iri: impl Into<String>, main_object: impl Into<String>) -> Result<Self> {
        let action = action_iri.into();
        if action.is_empty() {
            return Err(SearchError::Validation("action IRI is empty".to_string()));
        }
        if action.contains(['>', '<', '"', ' ', '\n', '\t']) {
            return Err(SearchError::Validation(format!(
                "action IRI contains forbidden characters: {}",
                action
            )));
        }
        let main_object = main_object.into();
        if main_object.is_empty() {
            return Err(SearchError::Validation(
                "main object filter is empty".to_string(),
            ));
        }
        Ok(Self {
            action,
            main_object,
            target_object: String::new(),
            camera: String::new(),
        })
    }

    /// Constrain the event's target object (substring, case-insensitive).
    pub fn with_target_object(mut self, target_object: impl Into<String>) -> Self {
        self.target_object = target_object.into();
        self
    }

    /// Constrain the camera identifier (substring, case-insensitive).
    pub fn with_camera(mut self, camera: impl Into<String>) -> Self {
        self.camera = camera.into();
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    fn target_object_clauses(&self) -> (String, String) {
        if self.target_object.is_empty() {
            (String::new(), String::new())
        } else {
            (
                format!(
                    "?targetObject rdfs:label ?targetObjectLabel FILTER regex(?targetObjectLabel, \"{}\", \"i\") .\n",
                    escape_regex(&self.target_object)
                ),
                "vh2kg:targetObject ?targetObject ;\n".to_string(),
            )
        }
    }

    fn camera_clause(&self) -> String {
        if self.camera.is_empty() {
            String::new()
        } else {
            format!(
                "FILTER regex(STR(?camera), \"{}\", \"i\") .\n",
                escape_regex(&self.camera)
            )
        }
    }
}

/// Validate a graph local name (activity, scene or camera identifier)
/// before splicing it into an instance IRI.
fn validated_local(kind: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(SearchError::Validation(format!("{} name is empty", kind)));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(SearchError::Validation(format!(
            "{} name contains forbidden characters: {}",
            kind, value
        )));
    }
    Ok(value.to_string())
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Endpoint liveness probe.
    pub fn probe() -> Self {
        Self::new("ASK {}")
    }

    /// All activity instances (e.g. `ex:cook_some_food_scene1`), ordered.
    pub fn activities() -> Self {
        Self::new(format!(
            r#"
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?activity WHERE {{
                ?activity a vh2kg:Activity .
            }} ORDER BY asc(?activity)
            "#,
            vh2kg = PREFIX_VH2KG
        ))
    }

    /// All action classes, ordered ascending.
    pub fn actions() -> Self {
        Self::new(format!(
            r#"
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?action WHERE {{
                ?action a vh2kg:Action .
            }} ORDER BY asc(?action)
            "#,
            vh2kg = PREFIX_VH2KG
        ))
    }

    /// One page of camera/video pairs matching the filter.
    pub fn videos(filter: &VideoFilter, window: &PageWindow) -> Self {
        let (target_label, target_event) = filter.target_object_clauses();
        Self::new(format!(
            r#"
            PREFIX rdfs: <{rdfs}>
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?camera ?base64Video WHERE {{
                ?mainObject rdfs:label ?mainObjectLabel FILTER regex(?mainObjectLabel, "{main_object}", "i") .
                {target_label}?event vh2kg:mainObject ?mainObject ;
                       {target_event}vh2kg:action <{action}> .
                ?scene vh2kg:hasEvent ?event ;
                       vh2kg:hasVideo ?camera .
                ?camera vh2kg:video ?base64Video .
                {camera_filter}
            }} ORDER BY asc(?camera) LIMIT {limit} OFFSET {offset}
            "#,
            rdfs = PREFIX_RDFS,
            vh2kg = PREFIX_VH2KG,
            main_object = escape_regex(&filter.main_object),
            target_label = target_label,
            target_event = target_event,
            action = filter.action,
            camera_filter = filter.camera_clause(),
            limit = window.limit(),
            offset = window.offset(),
        ))
    }

    /// Total number of distinct cameras matching the filter.
    pub fn video_count(filter: &VideoFilter) -> Self {
        let (target_label, target_event) = filter.target_object_clauses();
        Self::new(format!(
            r#"
            PREFIX rdfs: <{rdfs}>
            PREFIX vh2kg: <{vh2kg}>

            SELECT (COUNT(DISTINCT ?camera) AS ?videoCount) WHERE {{
                ?mainObject rdfs:label ?mainObjectLabel FILTER regex(?mainObjectLabel, "{main_object}", "i") .
                {target_label}?event vh2kg:mainObject ?mainObject ;
                       {target_event}vh2kg:action <{action}> .
                ?scene vh2kg:hasEvent ?event ;
                       vh2kg:hasVideo ?camera .
                {camera_filter}
            }}
            "#,
            rdfs = PREFIX_RDFS,
            vh2kg = PREFIX_VH2KG,
            main_object = escape_regex(&filter.main_object),
            target_label = target_label,
            target_event = target_event,
            action = filter.action,
            camera_filter = filter.camera_clause(),
        ))
    }

    /// Distinct camera identifiers matching the filter.
    pub fn cameras(filter: &VideoFilter) -> Self {
        let (target_label, target_event) = filter.target_object_clauses();
        Self::new(format!(
            r#"
            PREFIX rdfs: <{rdfs}>
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?camera WHERE {{
                ?mainObject rdfs:label ?mainObjectLabel FILTER regex(?mainObjectLabel, "{main_object}", "i") .
                {target_label}?event vh2kg:mainObject ?mainObject ;
                       {target_event}vh2kg:action <{action}> .
                ?scene vh2kg:hasEvent ?event ;
                       vh2kg:hasVideo ?camera .
                {camera_filter}
            }} ORDER BY asc(?camera)
            "#,
            rdfs = PREFIX_RDFS,
            vh2kg = PREFIX_VH2KG,
            main_object = escape_regex(&filter.main_object),
            target_label = target_label,
            target_event = target_event,
            action = filter.action,
            camera_filter = filter.camera_clause(),
        ))
    }

    /// Video segments (with frame bounds) of events matching the filter.
    pub fn video_segments(filter: &VideoFilter) -> Self {
        let (target_label, target_event) = filter.target_object_clauses();
        Self::new(format!(
            r#"
            PREFIX rdfs: <{rdfs}>
            PREFIX mssn: <{mssn}>
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?videoSegment ?startFrame ?endFrame WHERE {{
                ?mainObject rdfs:label ?mainObjectLabel FILTER regex(?mainObjectLabel, "{main_object}", "i") .
                {target_label}?event vh2kg:mainObject ?mainObject ;
                       {target_event}vh2kg:action <{action}> ;
                       vh2kg:hasVideoSegment ?videoSegment .
                ?videoSegment vh2kg:hasStartFrame ?startFrame ;
                              vh2kg:hasEndFrame ?endFrame .
                ?camera mssn:hasMediaSegment ?videoSegment .
                {camera_filter}
            }} ORDER BY asc(?videoSegment)
            "#,
            rdfs = PREFIX_RDFS,
            mssn = PREFIX_MSSN,
            vh2kg = PREFIX_VH2KG,
            main_object = escape_regex(&filter.main_object),
            target_label = target_label,
            target_event = target_event,
            action = filter.action,
            camera_filter = filter.camera_clause(),
        ))
    }

    /// All media segments of one camera recording.
    pub fn media_segments(activity: &str, scene: &str, camera: &str) -> Result<Self> {
        let recording = recording_iri(activity, scene, camera)?;
        Ok(Self::new(format!(
            r#"
            PREFIX mssn: <{mssn}>
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?segment ?startFrame ?endFrame WHERE {{
                <{recording}> mssn:hasMediaSegment ?segment .
                ?segment vh2kg:hasStartFrame ?startFrame ;
                         vh2kg:hasEndFrame ?endFrame .
            }} ORDER BY asc(?segment)
            "#,
            mssn = PREFIX_MSSN,
            vh2kg = PREFIX_VH2KG,
            recording = recording,
        )))
    }

    /// Frame rate and base64 video of one camera recording.
    pub fn recording(activity: &str, scene: &str, camera: &str) -> Result<Self> {
        let recording = recording_iri(activity, scene, camera)?;
        Ok(Self::new(format!(
            r#"
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?frameRate ?video WHERE {{
                <{recording}> vh2kg:frameRate ?frameRate ;
                              vh2kg:video ?video .
            }}
            "#,
            vh2kg = PREFIX_VH2KG,
            recording = recording,
        )))
    }

    /// Split-image rows of one media segment, optionally bounded by frame
    /// number, ordered by frame then split-image id.
    pub fn images(
        segment: &str,
        start_frame: Option<u64>,
        end_frame: Option<u64>,
    ) -> Result<Self> {
        let segment = validated_local("segment", segment)?;
        let mut bounds = String::new();
        if let Some(start) = start_frame {
            bounds.push_str(&format!("FILTER (?frameNumber >= {})\n", start));
        }
        if let Some(end) = end_frame {
            bounds.push_str(&format!("FILTER (?frameNumber <= {})\n", end));
        }
        Ok(Self::new(format!(
            r#"
            PREFIX mssn: <{mssn}>
            PREFIX vh2kg: <{vh2kg}>
            PREFIX rdf: <{rdf}>

            SELECT DISTINCT ?descriptor ?frameNumber ?splitWidth ?imageId ?image WHERE {{
                <{ex}{segment}> mssn:hasMediaDescriptor ?descriptor .
                ?descriptor vh2kg:frameNumber ?frameNumber ;
                            vh2kg:splitWidth ?splitWidth ;
                            vh2kg:image ?splitImage .
                ?splitImage vh2kg:splitImageID ?imageId ;
                            rdf:value ?image .
                {bounds}
            }} ORDER BY asc(?frameNumber) asc(?imageId)
            "#,
            mssn = PREFIX_MSSN,
            vh2kg = PREFIX_VH2KG,
            rdf = PREFIX_RDF,
            ex = PREFIX_EX,
            segment = segment,
            bounds = bounds,
        )))
    }

    /// 2D bounding-box annotations over a media segment's frames: frame
    /// number, annotated object and its `bbox-2d-value`, filtered to the
    /// event's main object (and, when given, its target object).
    pub fn bbox_annotations(
        segment: &str,
        main_object: &str,
        target_object: Option<&str>,
    ) -> Result<Self> {
        let segment = validated_local("segment", segment)?;
        let main_object = required_text("main object filter", main_object)?;
        let target_object = target_object.filter(|t| !t.is_empty());
        let (bbox_of, target_event, target_label) = annotated_object_clauses(target_object);
        Ok(Self::new(format!(
            r#"
            PREFIX rdfs: <{rdfs}>
            PREFIX mssn: <{mssn}>
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?frameNumber ?object ?bbox WHERE {{
                ?event vh2kg:hasVideoSegment <{ex}{segment}> ;
                       vh2kg:mainObject ?mainObject .
                {target_event}<{ex}{segment}> mssn:hasMediaDescriptor ?frame .
                ?frame mssn:hasMediaDescriptor ?object ;
                       vh2kg:frameNumber ?frameNumber .
                {bbox_of}?object vh2kg:bbox-2d-value ?bbox .
                ?mainObject rdfs:label ?mainObjectLabel FILTER regex(?mainObjectLabel, "{main_object}", "i") .
                {target_label}
            }} ORDER BY asc(?frameNumber) asc(?object)
            "#,
            rdfs = PREFIX_RDFS,
            mssn = PREFIX_MSSN,
            vh2kg = PREFIX_VH2KG,
            ex = PREFIX_EX,
            segment = segment,
            main_object = main_object,
            bbox_of = bbox_of,
            target_event = target_event,
            target_label = target_label,
        )))
    }

    /// Frame numbers of a segment where the searched object carries a
    /// bounding-box annotation, ordered ascending.
    pub fn object_frames(
        segment: &str,
        main_object: &str,
        target_object: Option<&str>,
    ) -> Result<Self> {
        let segment = validated_local("segment", segment)?;
        let main_object = required_text("main object filter", main_object)?;
        let target_object = target_object.filter(|t| !t.is_empty());
        let (bbox_of, target_event, target_label) = annotated_object_clauses(target_object);
        Ok(Self::new(format!(
            r#"
            PREFIX rdfs: <{rdfs}>
            PREFIX mssn: <{mssn}>
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?frameNumber WHERE {{
                ?scene vh2kg:hasVideo ?camera ;
                       vh2kg:hasEvent ?event .
                ?event vh2kg:mainObject ?mainObject .
                {target_event}?camera mssn:hasMediaSegment <{ex}{segment}> .
                <{ex}{segment}> mssn:hasMediaDescriptor ?frame .
                ?frame mssn:hasMediaDescriptor ?object ;
                       vh2kg:frameNumber ?frameNumber .
                {bbox_of}?mainObject rdfs:label ?mainObjectLabel FILTER regex(?mainObjectLabel, "{main_object}", "i") .
                {target_label}
            }} ORDER BY asc(?frameNumber)
            "#,
            rdfs = PREFIX_RDFS,
            mssn = PREFIX_MSSN,
            vh2kg = PREFIX_VH2KG,
            ex = PREFIX_EX,
            segment = segment,
            main_object = main_object,
            bbox_of = bbox_of,
            target_event = target_event,
            target_label = target_label,
        )))
    }

    /// Action, main object and optional target object of the event a video
    /// segment belongs to.
    pub fn segment_action(segment: &str) -> Result<Self> {
        let segment = validated_local("segment", segment)?;
        Ok(Self::new(format!(
            r#"
            PREFIX vh2kg: <{vh2kg}>

            SELECT DISTINCT ?action ?mainObject ?targetObject WHERE {{
                <{ex}{segment}> vh2kg:isVideoSegmentOf ?event .
                ?event vh2kg:action ?action ;
                       vh2kg:mainObject ?mainObject .
                OPTIONAL {{ ?event vh2kg:targetObject ?targetObject }}
            }}
            "#,
            vh2kg = PREFIX_VH2KG,
            ex = PREFIX_EX,
            segment = segment,
        )))
    }
}

fn required_text(kind: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(SearchError::Validation(format!("{} is empty", kind)));
    }
    Ok(escape_regex(value))
}

/// The three clauses that switch on an optional target object in the
/// bbox-annotation queries: the `is2DbboxOf` pattern (plain or a UNION of
/// main and target), the event's target triple, and the target label
/// filter.
fn annotated_object_clauses(target_object: Option<&str>) -> (String, String, String) {
    match target_object {
        None => (
            "?object vh2kg:is2DbboxOf ?mainObject .\n".to_string(),
            String::new(),
            String::new(),
        ),
        Some(target) => (
            "{ ?object vh2kg:is2DbboxOf ?mainObject . } UNION { ?object vh2kg:is2DbboxOf ?targetObject . }\n"
                .to_string(),
            "?event vh2kg:targetObject ?targetObject .\n".to_string(),
            format!(
                "?targetObject rdfs:label ?targetObjectLabel FILTER regex(?targetObjectLabel, \"{}\", \"i\") .\n",
                escape_regex(target)
            ),
        ),
    }
}

fn recording_iri(activity: &str, scene: &str, camera: &str) -> Result<String> {
    let activity = validated_local("activity", activity)?;
    let scene = validated_local("scene", scene)?;
    let camera = validated_local("camera", camera)?;
    Ok(format!("{}{}_{}_{}", PREFIX_EX, activity, scene, camera))
}

impl std::fmt::Display for SparqlQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query)
    }
}
