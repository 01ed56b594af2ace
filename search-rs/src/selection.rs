//! Cascading selection state for the activity browser
//!
//! The browse flow is a strict chain: activity → scene → camera → media
//! kind → frame. Each field's candidate set is derived from the fields
//! above it, so changing an upstream field clears everything downstream.
//! All transitions go through one reducer, [`SelectionState::apply`].

/// Kind of recorded media attached to a camera view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

/// Interval between stored image snapshots. The media store only has
/// image assets at multiples of 5 frames, plus an off-by-one boundary
/// where frame `5k + 1` maps back to `5k`.
pub const IMAGE_FRAME_STEP: u64 = 5;

/// Snap a requested frame to an available asset.
///
/// Image media: `f % 5 == 1` rounds down to `f - 1`; anything else rounds
/// up to the smallest multiple of 5 that is `>= f`. Video media plays any
/// frame, so the value passes through unchanged.
pub fn adjust_frame(frame: u64, media: MediaKind) -> u64 {
    match media {
        MediaKind::Video => frame,
        MediaKind::Image => {
            if frame % IMAGE_FRAME_STEP == 1 {
                frame - 1
            } else {
                frame.div_ceil(IMAGE_FRAME_STEP) * IMAGE_FRAME_STEP
            }
        }
    }
}

/// How far down the chain the user has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectionStage {
    Empty,
    ActivityChosen,
    SceneChosen,
    CameraChosen,
    MediaChosen,
}

/// A selection transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    SetActivity(String),
    SetScene(String),
    SetCamera(String),
    SetMedia(MediaKind),
    SetFrame(u64),
    Clear,
}

/// The user's in-progress browse selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    activity: Option<String>,
    scene: Option<String>,
    camera: Option<String>,
    media: Option<MediaKind>,
    frame: Option<u64>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    pub fn scene(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    pub fn camera(&self) -> Option<&str> {
        self.camera.as_deref()
    }

    pub fn media(&self) -> Option<MediaKind> {
        self.media
    }

    pub fn frame(&self) -> Option<u64> {
        self.frame
    }

    pub fn stage(&self) -> SelectionStage {
        if self.media.is_some() {
            SelectionStage::MediaChosen
        } else if self.camera.is_some() {
            SelectionStage::CameraChosen
        } else if self.scene.is_some() {
            SelectionStage::SceneChosen
        } else if self.activity.is_some() {
            SelectionStage::ActivityChosen
        } else {
            SelectionStage::Empty
        }
    }

    /// Apply one transition. Setting a field clears every field causally
    /// downstream of it; a frame set before a media kind is chosen is
    /// dropped because there is no candidate set for it yet.
    pub fn apply(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::SetActivity(activity) => {
                self.activity = Some(activity);
                self.scene = None;
                self.camera = None;
                self.media = None;
                self.frame = None;
            }
            SelectionEvent::SetScene(scene) => {
                self.scene = Some(scene);
                self.camera = None;
                self.media = None;
                self.frame = None;
            }
            SelectionEvent::SetCamera(camera) => {
                self.camera = Some(camera);
                self.media = None;
                self.frame = None;
            }
            SelectionEvent::SetMedia(media) => {
                self.media = Some(media);
                self.frame = None;
            }
            SelectionEvent::SetFrame(frame) => {
                if let Some(media) = self.media {
                    self.frame = Some(adjust_frame(frame, media));
                }
            }
            SelectionEvent::Clear => *self = Self::default(),
        }
    }
}
