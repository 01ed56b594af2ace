//! Pure transforms from result bindings to domain records
//!
//! Nothing here touches the network; every function takes the rows an
//! executor already produced. Row order is preserved throughout because
//! the queries carry the ordering.

use serde::Serialize;
use tracing::debug;

use crate::endpoint::Binding;
use crate::errors::{Result, SearchError};
use crate::sparql::{strip_instance_prefix, PREFIX_ACTION};

/// Delimiter between activity name and scene suffix in instance names,
/// e.g. `wash_dishes_scene3`.
const SCENE_DELIMITER: &str = "_scene";

/// An activity and its scenes, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub name: String,
    pub scenes: Vec<String>,
}

/// An action class reference with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub iri: String,
    pub label: String,
}

/// One search hit: a camera recording and its embedded media reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub camera: String,
    pub base64_video: String,
}

/// Frame bounds of a media segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSpan {
    pub segment: String,
    pub start_frame: u64,
    pub end_frame: u64,
}

/// One annotated frame of a segment: the split images that tile it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFrame {
    pub descriptor: String,
    pub frame_number: u64,
    pub split_width: u64,
    /// (split image id, base64 payload), ordered by numeric id.
    pub images: Vec<(u64, String)>,
}

/// Frame rate and media reference of one camera recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    pub frame_rate: f64,
    pub video: String,
}

/// One 2D bounding box: the annotated object in one frame of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BboxAnnotation {
    pub frame_number: u64,
    pub object: String,
    /// Comma-separated box value as stored in the graph.
    pub bbox: String,
}

/// The event a segment records: action plus its objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentAction {
    pub action: String,
    pub main_object: String,
    pub target_object: Option<String>,
}

fn require<'a>(row: &'a Binding, var: &str) -> Result<&'a crate::endpoint::RdfTerm> {
    row.get(var)
        .ok_or_else(|| SearchError::Query(format!("binding is missing ?{}", var)))
}

/// Group activity bindings into per-activity scene lists.
///
/// Each `?activity` value names an instance like `<ex>wash_dishes_scene3`;
/// the instance prefix is stripped and the remainder split on `_scene`.
/// Scenes accumulate per activity in first-seen order. Repeated bindings
/// for the same activity/scene pair are kept as-is, matching the source
/// behavior consumers already depend on.
pub fn activity_scene_list(rows: &[Binding]) -> Result<Vec<Activity>> {
    let mut activities: Vec<Activity> = Vec::new();
    for row in rows {
        let iri = require(row, "activity")?.value();
        let local = strip_instance_prefix(iri);
        let Some((name, suffix)) = local.split_once(SCENE_DELIMITER) else {
            debug!(instance = local, "activity instance without scene suffix, skipping");
            continue;
        };
        let scene = format!("scene{}", suffix);
        match activities.iter_mut().find(|a| a.name == name) {
            Some(activity) => activity.scenes.push(scene),
            None => activities.push(Activity {
                name: name.to_string(),
                scenes: vec![scene],
            }),
        }
    }
    Ok(activities)
}

/// Action references with display labels derived from the IRI local name.
pub fn action_list(rows: &[Binding]) -> Result<Vec<Action>> {
    rows.iter()
        .map(|row| {
            let iri = require(row, "action")?.value().to_string();
            let label = iri
                .strip_prefix(PREFIX_ACTION)
                .map(str::to_string)
                .unwrap_or_else(|| iri.rsplit('/').next().unwrap_or(&iri).to_string());
            Ok(Action { iri, label })
        })
        .collect()
}

/// Camera/media pairs of a video search page.
pub fn video_records(rows: &[Binding]) -> Result<Vec<VideoRecord>> {
    rows.iter()
        .map(|row| {
            Ok(VideoRecord {
                camera: strip_instance_prefix(require(row, "camera")?.value()).to_string(),
                base64_video: require(row, "base64Video")?.value().to_string(),
            })
        })
        .collect()
}

/// Distinct camera identifiers.
pub fn camera_list(rows: &[Binding]) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| Ok(strip_instance_prefix(require(row, "camera")?.value()).to_string()))
        .collect()
}

/// Extract the aggregate count from a `?videoCount` result. Fails on an
/// empty result set.
pub fn video_count(rows: &[Binding]) -> Result<u64> {
    let row = rows
        .first()
        .ok_or_else(|| SearchError::EmptyResult("videoCount".to_string()))?;
    require(row, "videoCount")?.as_u64()
}

/// Frame spans keyed by segment. Accepts both the `?segment` and
/// `?videoSegment` variable spellings the segment queries use.
pub fn frame_spans(rows: &[Binding]) -> Result<Vec<FrameSpan>> {
    rows.iter()
        .map(|row| {
            let term = row
                .get("segment")
                .or_else(|| row.get("videoSegment"))
                .ok_or_else(|| {
                    SearchError::Query("binding is missing ?segment/?videoSegment".to_string())
                })?;
            Ok(FrameSpan {
                segment: strip_instance_prefix(term.value()).to_string(),
                start_frame: require(row, "startFrame")?.as_u64()?,
                end_frame: require(row, "endFrame")?.as_u64()?,
            })
        })
        .collect()
}

/// Group split-image rows into per-descriptor frames. Input rows are
/// ordered by frame then image id; descriptors keep first-seen order and
/// each frame's images are sorted by numeric id.
pub fn image_frames(rows: &[Binding]) -> Result<Vec<ImageFrame>> {
    let mut frames: Vec<ImageFrame> = Vec::new();
    for row in rows {
        let descriptor = strip_instance_prefix(require(row, "descriptor")?.value()).to_string();
        let frame_number = require(row, "frameNumber")?.as_u64()?;
        let split_width = require(row, "splitWidth")?.as_u64()?;
        let image_id = require(row, "imageId")?.as_u64()?;
        let image = require(row, "image")?.value().to_string();

        match frames.iter_mut().find(|f| f.descriptor == descriptor) {
            Some(frame) => frame.images.push((image_id, image)),
            None => frames.push(ImageFrame {
                descriptor,
                frame_number,
                split_width,
                images: vec![(image_id, image)],
            }),
        }
    }
    for frame in &mut frames {
        frame.images.sort_by_key(|(id, _)| *id);
    }
    Ok(frames)
}

/// Frame rate and video of a single recording. Fails on an empty result.
pub fn recording(rows: &[Binding]) -> Result<Recording> {
    let row = rows
        .first()
        .ok_or_else(|| SearchError::EmptyResult("recording".to_string()))?;
    let frame_rate = require(row, "frameRate")?
        .value()
        .parse::<f64>()
        .map_err(|_| SearchError::Parse("frame rate is not numeric".to_string()))?;
    Ok(Recording {
        frame_rate,
        video: require(row, "video")?.value().to_string(),
    })
}

/// Bounding-box rows of a segment, in query order (frame, then object).
pub fn bbox_annotations(rows: &[Binding]) -> Result<Vec<BboxAnnotation>> {
    rows.iter()
        .map(|row| {
            Ok(BboxAnnotation {
                frame_number: require(row, "frameNumber")?.as_u64()?,
                object: strip_instance_prefix(require(row, "object")?.value()).to_string(),
                bbox: require(row, "bbox")?.value().to_string(),
            })
        })
        .collect()
}

/// Frame numbers where the searched object is annotated.
pub fn object_frame_numbers(rows: &[Binding]) -> Result<Vec<u64>> {
    rows.iter()
        .map(|row| require(row, "frameNumber")?.as_u64())
        .collect()
}

/// Action annotations of a segment. `scene` strips the per-scene instance
/// suffix, so `cup1_scene1` renders as `cup1`. The target object is
/// optional in the source data.
pub fn segment_actions(rows: &[Binding], scene: &str) -> Result<Vec<SegmentAction>> {
    let suffix = format!("_{}", scene);
    rows.iter()
        .map(|row| {
            let action_iri = require(row, "action")?.value();
            let action = action_iri
                .strip_prefix(PREFIX_ACTION)
                .unwrap_or(action_iri)
                .to_string();
            let main_object = object_name(require(row, "mainObject")?.value(), &suffix);
            let target_object = row
                .get("targetObject")
                .map(|term| object_name(term.value(), &suffix));
            Ok(SegmentAction {
                action,
                main_object,
                target_object,
            })
        })
        .collect()
}

fn object_name(iri: &str, scene_suffix: &str) -> String {
    let local = strip_instance_prefix(iri);
    local.strip_suffix(scene_suffix).unwrap_or(local).to_string()
}
