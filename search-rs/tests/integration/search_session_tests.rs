//! End-to-end session tests over an in-memory store
//!
//! The fixture models one kitchen: two actions, three activity instances,
//! an event (grab the cup at the kitchen table) recorded by two cameras,
//! and one media segment with split-image frames.

use std::time::Duration;

use mmkg_search::endpoint::{Binding, MemoryEndpoint, SparqlEndpoint};
use mmkg_search::errors::Result;
use mmkg_search::sparql::SparqlQuery;
use mmkg_search::{SearchSession, VideoFilter};

const KITCHEN: &str = include_str!("../fixtures/kitchen.ttl");
const GRAB: &str = "http://kgrc4si.home.kg/virtualhome2kg/ontology/action/grab";

fn session() -> SearchSession<MemoryEndpoint> {
    SearchSession::new(MemoryEndpoint::from_turtle(KITCHEN).unwrap())
}

#[tokio::test]
async fn probe_succeeds() {
    assert!(session().probe().await.unwrap());
}

#[tokio::test]
async fn fetch_actions_returns_ordered_labels() {
    let actions = session().fetch_actions().await.unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].label, "grab");
    assert_eq!(actions[1].label, "wash");
    assert!(actions[0].iri.ends_with("action/grab"));
}

#[tokio::test]
async fn fetch_activities_groups_scenes_in_first_seen_order() {
    let activities = session().fetch_activities().await.unwrap();
    assert_eq!(activities.len(), 2);
    // Instance IRIs order ascending: cook_some_food before wash_dishes.
    assert_eq!(activities[0].name, "cook_some_food");
    assert_eq!(activities[0].scenes, vec!["scene1"]);
    assert_eq!(activities[1].name, "wash_dishes");
    assert_eq!(activities[1].scenes, vec!["scene1", "scene2"]);
}

#[tokio::test]
async fn search_videos_returns_both_cameras() {
    let filter = VideoFilter::new(GRAB, "cup").unwrap();
    let page = session().search_videos(&filter, 1).await.unwrap().unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.page, 1);
    assert_eq!(page.page_count, 1);
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[0].camera, "wash_dishes_scene1_camera1");
    assert_eq!(page.records[0].base64_video, "QUFBQQ==");
    assert_eq!(page.records[1].camera, "wash_dishes_scene1_camera2");
}

#[tokio::test]
async fn search_videos_is_case_insensitive_substring() {
    let filter = VideoFilter::new(GRAB, "CU").unwrap();
    let page = session().search_videos(&filter, 1).await.unwrap().unwrap();
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn search_videos_with_matching_target_object() {
    let filter = VideoFilter::new(GRAB, "cup").unwrap().with_target_object("table");
    let page = session().search_videos(&filter, 1).await.unwrap().unwrap();
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn search_videos_with_non_matching_target_object() {
    let filter = VideoFilter::new(GRAB, "cup").unwrap().with_target_object("sofa");
    let page = session().search_videos(&filter, 1).await.unwrap().unwrap();
    assert_eq!(page.total, 0);
    assert!(page.records.is_empty());
}

#[tokio::test]
async fn search_videos_with_camera_filter() {
    let filter = VideoFilter::new(GRAB, "cup").unwrap().with_camera("camera2");
    let page = session().search_videos(&filter, 1).await.unwrap().unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.records[0].camera, "wash_dishes_scene1_camera2");
}

#[tokio::test]
async fn search_videos_clamps_out_of_range_page() {
    let filter = VideoFilter::new(GRAB, "cup").unwrap();
    let page = session().search_videos(&filter, 99).await.unwrap().unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.records.len(), 2);
}

#[tokio::test]
async fn search_videos_injection_attempt_finds_nothing() {
    let filter = VideoFilter::new(GRAB, r#"cup", "i") . ?s ?p ?o"#).unwrap();
    let page = session().search_videos(&filter, 1).await.unwrap().unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn cameras_matching_filter() {
    let filter = VideoFilter::new(GRAB, "cup").unwrap();
    let cameras = session().cameras(&filter).await.unwrap();
    assert_eq!(
        cameras,
        vec![
            "wash_dishes_scene1_camera1".to_string(),
            "wash_dishes_scene1_camera2".to_string()
        ]
    );
}

#[tokio::test]
async fn video_segments_matching_filter() {
    let filter = VideoFilter::new(GRAB, "cup").unwrap();
    let spans = session().video_segments(&filter).await.unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].segment, "wash_dishes_1_scene1_video_segment1");
    assert_eq!(spans[0].start_frame, 0);
    assert_eq!(spans[0].end_frame, 45);
}

#[tokio::test]
async fn media_segments_of_recording() {
    let spans = session()
        .media_segments("wash_dishes", "scene1", "camera1")
        .await
        .unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].segment, "wash_dishes_1_scene1_video_segment1");
}

#[tokio::test]
async fn recording_frame_rate_and_media() {
    let recording = session()
        .recording("wash_dishes", "scene1", "camera1")
        .await
        .unwrap();
    assert!((recording.frame_rate - 14.5).abs() < f64::EPSILON);
    assert_eq!(recording.video, "QUFBQQ==");
}

#[tokio::test]
async fn segment_images_grouped_by_frame() {
    let frames = session()
        .segment_images("wash_dishes_1_scene1_video_segment1", None, None)
        .await
        .unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].frame_number, 10);
    assert_eq!(frames[0].images.len(), 2);
    assert_eq!(frames[0].images[0], (0, "aW1nMTAtMA==".to_string()));
    assert_eq!(frames[1].frame_number, 15);
}

#[tokio::test]
async fn bbox_annotations_for_main_object() {
    let annotations = session()
        .bbox_annotations("wash_dishes_1_scene1_video_segment1", "cup", None)
        .await
        .unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].frame_number, 10);
    assert_eq!(annotations[0].object, "bbox_cup1_frame10");
    assert_eq!(annotations[0].bbox, "229,142,20,38");
    assert_eq!(annotations[1].frame_number, 15);
    assert_eq!(annotations[1].bbox, "231,140,20,38");
}

#[tokio::test]
async fn bbox_annotations_include_target_object_boxes() {
    let annotations = session()
        .bbox_annotations("wash_dishes_1_scene1_video_segment1", "cup", Some("table"))
        .await
        .unwrap();
    // Frame 10 carries both boxes; frame 15 only the cup's.
    assert_eq!(annotations.len(), 3);
    assert_eq!(annotations[0].object, "bbox_cup1_frame10");
    assert_eq!(annotations[1].object, "bbox_table1_frame10");
    assert_eq!(annotations[2].object, "bbox_cup1_frame15");
}

#[tokio::test]
async fn bbox_annotations_unknown_object_finds_nothing() {
    let annotations = session()
        .bbox_annotations("wash_dishes_1_scene1_video_segment1", "sofa", None)
        .await
        .unwrap();
    assert!(annotations.is_empty());
}

#[tokio::test]
async fn object_frames_where_object_is_annotated() {
    let frames = session()
        .object_frames("wash_dishes_1_scene1_video_segment1", "cup", None)
        .await
        .unwrap();
    assert_eq!(frames, vec![10, 15]);
}

#[tokio::test]
async fn segment_actions_of_recorded_event() {
    let actions = session()
        .segment_actions("wash_dishes_1_scene1_video_segment1", "scene1")
        .await
        .unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action, "grab");
    assert_eq!(actions[0].main_object, "cup1");
    assert_eq!(actions[0].target_object.as_deref(), Some("table1"));
}

#[tokio::test]
async fn segment_images_respects_frame_bounds() {
    let frames = session()
        .segment_images("wash_dishes_1_scene1_video_segment1", Some(12), Some(20))
        .await
        .unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].frame_number, 15);
}

// ---------------------------------------------------------------------------
// Stale-response guard
// ---------------------------------------------------------------------------

/// Endpoint that answers only after a delay, to hold a search in flight.
struct SlowEndpoint {
    inner: MemoryEndpoint,
    delay: Duration,
}

impl SparqlEndpoint for SlowEndpoint {
    async fn select(&self, query: &SparqlQuery) -> Result<Vec<Binding>> {
        tokio::time::sleep(self.delay).await;
        self.inner.select(query).await
    }

    async fn ask(&self, query: &SparqlQuery) -> Result<bool> {
        tokio::time::sleep(self.delay).await;
        self.inner.ask(query).await
    }
}

#[tokio::test]
async fn superseded_search_is_discarded() {
    let session = SearchSession::new(SlowEndpoint {
        inner: MemoryEndpoint::from_turtle(KITCHEN).unwrap(),
        delay: Duration::from_millis(50),
    });
    let filter = VideoFilter::new(GRAB, "cup").unwrap();

    let (stale, _) = tokio::join!(session.search_videos(&filter, 1), async {
        // Let the first search dispatch, then supersede it.
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.invalidate();
    });
    assert_eq!(stale.unwrap(), None);
}

#[tokio::test]
async fn newest_of_two_concurrent_searches_wins() {
    let session = SearchSession::new(SlowEndpoint {
        inner: MemoryEndpoint::from_turtle(KITCHEN).unwrap(),
        delay: Duration::from_millis(50),
    });
    let old_filter = VideoFilter::new(GRAB, "cup").unwrap();
    let new_filter = VideoFilter::new(GRAB, "cup").unwrap().with_camera("camera2");

    let (old, new) = tokio::join!(session.search_videos(&old_filter, 1), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.search_videos(&new_filter, 1).await
    });
    assert_eq!(old.unwrap(), None);
    let new = new.unwrap().unwrap();
    assert_eq!(new.total, 1);
}
