// Frame Adjustment Contract Tests
//
// These tests verify INVARIANTS that MUST NEVER BREAK regardless of
// implementation. The media store only holds image snapshots at frame
// multiples of 5 (plus the 5k+1 boundary); a request for any other frame
// must snap to an asset that actually exists.

use mmkg_search::{adjust_frame, MediaKind};

/// WHY: Image assets exist only at multiples of 5 frames
/// REASON: frame 5k+1 belongs to the 5k snapshot; everything else rounds up
/// BREAKS: image lookups 404 against the media store if changed
#[test]
fn image_remainder_one_rounds_down() {
    assert_eq!(adjust_frame(1, MediaKind::Image), 0);
    assert_eq!(adjust_frame(6, MediaKind::Image), 5);
    assert_eq!(adjust_frame(11, MediaKind::Image), 10);
    assert_eq!(adjust_frame(16, MediaKind::Image), 15);
    assert_eq!(adjust_frame(101, MediaKind::Image), 100);
}

/// WHY: Non-boundary frames round UP, never down
/// REASON: rounding down could land before the segment's first snapshot
#[test]
fn image_other_remainders_round_up() {
    assert_eq!(adjust_frame(12, MediaKind::Image), 15);
    assert_eq!(adjust_frame(13, MediaKind::Image), 15);
    assert_eq!(adjust_frame(14, MediaKind::Image), 15);
    assert_eq!(adjust_frame(17, MediaKind::Image), 20);
    assert_eq!(adjust_frame(99, MediaKind::Image), 100);
}

/// WHY: A frame already on the grid stays put
#[test]
fn image_multiples_of_five_are_fixed_points() {
    for f in (0..200).step_by(5) {
        assert_eq!(adjust_frame(f, MediaKind::Image), f);
    }
}

/// WHY: Every adjusted image frame must be a stored asset
/// REASON: result is always a multiple of 5, and never more than 4 ahead
#[test]
fn image_adjustment_lands_on_grid_near_request() {
    for f in 0..500u64 {
        let adjusted = adjust_frame(f, MediaKind::Image);
        assert_eq!(adjusted % 5, 0, "frame {} -> {} off grid", f, adjusted);
        if f % 5 == 1 {
            assert_eq!(adjusted, f - 1);
        } else {
            assert!(adjusted >= f && adjusted < f + 5);
        }
    }
}

/// WHY: Video playback accepts arbitrary frames
/// REASON: videos are continuous; snapping would skip requested moments
/// BREAKS: video seeking if changed
#[test]
fn video_frames_pass_through_unchanged() {
    for f in 0..500u64 {
        assert_eq!(adjust_frame(f, MediaKind::Video), f);
    }
}
