// Query Shape Contract Tests
//
// The endpoint evaluates whatever string the builder produces. These
// tests pin the clauses that carry the search semantics: empty optional
// filters vanish, free text is escaped, and paginated queries keep a
// stable order key.

use mmkg_search::{PageWindow, SparqlQuery, VideoFilter};

const GRAB: &str = "http://kgrc4si.home.kg/virtualhome2kg/ontology/action/grab";

fn base_filter() -> VideoFilter {
    VideoFilter::new(GRAB, "cup").unwrap()
}

/// WHY: An empty optional filter must omit its clause entirely
/// REASON: a match-anything regex still forces the endpoint to bind and
/// scan the optional pattern; omission keeps the query unconstrained
/// BREAKS: searches without a target object return nothing if the clause
/// is emitted with an empty pattern joined to a required triple
#[test]
fn empty_optional_filters_emit_no_clause() {
    for query in [
        SparqlQuery::videos(&base_filter(), &PageWindow::first(12)),
        SparqlQuery::video_count(&base_filter()),
        SparqlQuery::cameras(&base_filter()),
        SparqlQuery::video_segments(&base_filter()),
    ] {
        let text = query.as_str();
        assert!(!text.contains("targetObject"), "stray clause in: {}", text);
        assert!(!text.contains("STR(?camera)"), "stray clause in: {}", text);
    }
}

/// WHY: Non-empty optional filters are case-insensitive substring matches
#[test]
fn optional_filters_render_as_insensitive_regex() {
    let filter = base_filter().with_target_object("table").with_camera("camera1");
    let text_query = SparqlQuery::videos(&filter, &PageWindow::first(12));
    let text = text_query.as_str();
    assert!(text.contains(r#"regex(?targetObjectLabel, "table", "i")"#));
    assert!(text.contains(r#"regex(STR(?camera), "camera1", "i")"#));
}

/// WHY: The action filter is an exact IRI match, never a regex
#[test]
fn action_is_exact_match() {
    let text_query = SparqlQuery::videos(&base_filter(), &PageWindow::first(12));
    assert!(text_query.as_str().contains(&format!("vh2kg:action <{}>", GRAB)));
}

/// WHY: Pagination offsets are only meaningful over a stable order
/// REASON: SPARQL result order is unspecified without ORDER BY; two
/// requests for adjacent pages could overlap or skip rows
/// BREAKS: paging through results if changed
#[test]
fn paginated_query_keeps_order_key() {
    for page in 1..5u64 {
        let window = PageWindow::new(page, 12);
        let query = SparqlQuery::videos(&base_filter(), &window);
        let text = query.as_str();
        assert!(text.contains("ORDER BY asc(?camera)"));
        assert!(text.contains(&format!("LIMIT 12 OFFSET {}", 12 * (page - 1))));
    }
}

/// WHY: Free text must never reach the query unescaped
/// REASON: quotes or regex metacharacters would change the query's
/// structure instead of its pattern
#[test]
fn free_text_filters_are_escaped() {
    let filter = VideoFilter::new(GRAB, r#"mug" ) } UNION { ?s ?p ?o"#)
        .unwrap()
        .with_target_object("a.b*c");
    let query = SparqlQuery::videos(&filter, &PageWindow::first(12));
    let text = query.as_str();
    assert!(!text.contains(r#"mug" )"#));
    assert!(text.contains(r"a\\.b\\*c"));
}

/// WHY: Without a target object, the bbox queries must not emit the
/// UNION arm or any target pattern
/// REASON: an unconstrained ?targetObject pattern would demand a target
/// triple on every event and drop single-object events entirely
#[test]
fn bbox_union_arm_only_with_target_object() {
    for query in [
        SparqlQuery::bbox_annotations("seg1", "cup", None).unwrap(),
        SparqlQuery::object_frames("seg1", "cup", None).unwrap(),
    ] {
        let text = query.as_str();
        assert!(!text.contains("UNION"), "stray UNION in: {}", text);
        assert!(!text.contains("targetObject"), "stray clause in: {}", text);
    }
    let with_target = SparqlQuery::bbox_annotations("seg1", "cup", Some("table")).unwrap();
    assert!(with_target.as_str().contains("UNION"));
}

/// WHY: Hostile action IRIs are rejected up front
#[test]
fn hostile_action_iri_rejected() {
    assert!(VideoFilter::new("http://x/a> . ?s ?p ?o . <", "cup").is_err());
    assert!(VideoFilter::new("", "cup").is_err());
}

/// WHY: Instance names splice into IRIs and must stay inert
#[test]
fn hostile_instance_names_rejected() {
    assert!(SparqlQuery::media_segments("act> <x", "scene1", "camera1").is_err());
    assert!(SparqlQuery::recording("act", "scene1", "cam> <x").is_err());
    assert!(SparqlQuery::images("seg> <x", None, None).is_err());
}
