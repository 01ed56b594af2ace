//! Search orchestration: builder → executor → mapper
//!
//! [`SearchSession`] owns an executor and exposes the application-level
//! operations. Responses from the endpoint are not guaranteed to arrive
//! in request order, so paged searches carry a generation ticket: a
//! search that completes after a newer search (or an explicit
//! [`SearchSession::invalidate`]) has been dispatched is discarded
//! instead of overwriting fresher results.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, info};

use crate::endpoint::SparqlEndpoint;
use crate::errors::Result;
use crate::mapping::{
    self, Action, Activity, BboxAnnotation, FrameSpan, ImageFrame, Recording, SegmentAction,
    VideoRecord,
};
use crate::pagination::{PageWindow, TOTAL_VIDEOS_PER_PAGE};
use crate::sparql::{SparqlQuery, VideoFilter};

/// One page of video search results together with its window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoPage {
    pub records: Vec<VideoRecord>,
    pub total: u64,
    pub page: u64,
    pub page_count: u64,
}

pub struct SearchSession<E> {
    endpoint: E,
    generation: AtomicU64,
}

impl<E: SparqlEndpoint> SearchSession<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            generation: AtomicU64::new(0),
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    fn ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Mark every in-flight paged search as stale. Callers invoke this on
    /// any filter change so a slow superseded response cannot land on top
    /// of the new search.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// `ASK {}` liveness probe against the endpoint.
    pub async fn probe(&self) -> Result<bool> {
        self.endpoint.ask(&SparqlQuery::probe()).await
    }

    /// All action classes, fetched once at startup.
    pub async fn fetch_actions(&self) -> Result<Vec<Action>> {
        let rows = self.endpoint.select(&SparqlQuery::actions()).await?;
        mapping::action_list(&rows)
    }

    /// All activities with their scene lists.
    pub async fn fetch_activities(&self) -> Result<Vec<Activity>> {
        let rows = self.endpoint.select(&SparqlQuery::activities()).await?;
        mapping::activity_scene_list(&rows)
    }

    /// One page of camera/video records for the filter.
    ///
    /// The requested page is clamped against the total count before the
    /// page query runs. Returns `Ok(None)` when a newer search was
    /// dispatched while this one was in flight.
    pub async fn search_videos(
        &self,
        filter: &VideoFilter,
        page: u64,
    ) -> Result<Option<VideoPage>> {
        let ticket = self.ticket();
        debug!(action = filter.action(), page, ticket, "video search");

        let count_rows = self
            .endpoint
            .select(&SparqlQuery::video_count(filter))
            .await?;
        let total = mapping::video_count(&count_rows)?;

        let window = PageWindow::new(page, TOTAL_VIDEOS_PER_PAGE).clamped(total);
        let rows = self
            .endpoint
            .select(&SparqlQuery::videos(filter, &window))
            .await?;

        if !self.is_current(ticket) {
            debug!(ticket, "discarding superseded search response");
            return Ok(None);
        }

        let records = mapping::video_records(&rows)?;
        info!(
            total,
            page = window.page(),
            returned = records.len(),
            "video search complete"
        );
        Ok(Some(VideoPage {
            records,
            total,
            page: window.page(),
            page_count: PageWindow::page_count(total, TOTAL_VIDEOS_PER_PAGE),
        }))
    }

    /// Distinct cameras matching the filter.
    pub async fn cameras(&self, filter: &VideoFilter) -> Result<Vec<String>> {
        let rows = self.endpoint.select(&SparqlQuery::cameras(filter)).await?;
        mapping::camera_list(&rows)
    }

    /// Video segments (with frame bounds) of events matching the filter.
    pub async fn video_segments(&self, filter: &VideoFilter) -> Result<Vec<FrameSpan>> {
        let rows = self
            .endpoint
            .select(&SparqlQuery::video_segments(filter))
            .await?;
        mapping::frame_spans(&rows)
    }

    /// All media segments of one camera recording.
    pub async fn media_segments(
        &self,
        activity: &str,
        scene: &str,
        camera: &str,
    ) -> Result<Vec<FrameSpan>> {
        let query = SparqlQuery::media_segments(activity, scene, camera)?;
        let rows = self.endpoint.select(&query).await?;
        mapping::frame_spans(&rows)
    }

    /// Split-image frames of a media segment, optionally frame-bounded.
    pub async fn segment_images(
        &self,
        segment: &str,
        start_frame: Option<u64>,
        end_frame: Option<u64>,
    ) -> Result<Vec<ImageFrame>> {
        let query = SparqlQuery::images(segment, start_frame, end_frame)?;
        let rows = self.endpoint.select(&query).await?;
        mapping::image_frames(&rows)
    }

    /// Frame rate and media reference of one camera recording.
    pub async fn recording(&self, activity: &str, scene: &str, camera: &str) -> Result<Recording> {
        let query = SparqlQuery::recording(activity, scene, camera)?;
        let rows = self.endpoint.select(&query).await?;
        mapping::recording(&rows)
    }

    /// 2D bounding-box annotations of one media segment.
    pub async fn bbox_annotations(
        &self,
        segment: &str,
        main_object: &str,
        target_object: Option<&str>,
    ) -> Result<Vec<BboxAnnotation>> {
        let query = SparqlQuery::bbox_annotations(segment, main_object, target_object)?;
        let rows = self.endpoint.select(&query).await?;
        mapping::bbox_annotations(&rows)
    }

    /// Frame numbers of a segment where the searched object is annotated.
    pub async fn object_frames(
        &self,
        segment: &str,
        main_object: &str,
        target_object: Option<&str>,
    ) -> Result<Vec<u64>> {
        let query = SparqlQuery::object_frames(segment, main_object, target_object)?;
        let rows = self.endpoint.select(&query).await?;
        mapping::object_frame_numbers(&rows)
    }

    /// Action annotations of the event one video segment records.
    pub async fn segment_actions(&self, segment: &str, scene: &str) -> Result<Vec<SegmentAction>> {
        let query = SparqlQuery::segment_action(segment)?;
        let rows = self.endpoint.select(&query).await?;
        mapping::segment_actions(&rows, scene)
    }
}
