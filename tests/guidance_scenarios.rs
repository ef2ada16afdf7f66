//! End-to-end scenarios on synthetic frames: detection, deduplication,
//! guidance messages and the decode hand-off.

use qr_guidance::config::{DecodeGate, DedupConfig, DedupStrategy, GuidanceConfig};
use qr_guidance::decode::FixedDecoder;
use qr_guidance::detector::dedup::dedupe;
use qr_guidance::detector::pyramid::ScalePass;
use qr_guidance::guidance::{AngleHint, GuidanceEngine, PositionHint};
use qr_guidance::tools::synthetic;
use qr_guidance::{
    ChannelOrder, DECODED_BANNER, FinderPatternCandidate, Frame, GuidanceStatus, NoDecoder, Point, ScanConfig,
    Scanner,
};

/// Pin a closure to the decoder signature
fn decoder_fn<F: FnMut(&Frame<'_>) -> Option<String>>(f: F) -> F {
    f
}

fn candidate(x: f32, y: f32, area: f32) -> FinderPatternCandidate {
    let h = area.sqrt() / 2.0;
    FinderPatternCandidate::new(
        Point::new(x, y),
        area,
        vec![
            Point::new(x - h, y - h),
            Point::new(x - h, y + h),
            Point::new(x + h, y + h),
            Point::new(x + h, y - h),
        ],
    )
}

#[test]
fn single_finder_center_within_a_pixel() {
    let (w, h) = (100, 100);
    let mut rgb = synthetic::finder_rgb(w, h, 30, 30, 4);
    let frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let found = Scanner::default().detect(&frame);
    assert_eq!(found.len(), 1);
    let expected = synthetic::finder_center(30, 30, 4);
    assert!(found[0].center.distance(&expected) < 1.0, "center {:?}", found[0].center);
}

#[test]
fn solid_blobs_are_not_finders() {
    let (w, h) = (160, 120);
    let mut rgb = synthetic::blank_rgb(w, h);
    for (x0, y0) in [(20, 20), (80, 40), (120, 90)] {
        for y in y0..y0 + 6 {
            for x in x0..x0 + 6 {
                let idx = (y * w + x) * 3;
                rgb[idx..idx + 3].fill(0);
            }
        }
    }
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Bgr).unwrap();
    let report = Scanner::default().process_frame(&mut frame, &mut NoDecoder);
    assert!(report.candidates.is_empty());
    assert_eq!(report.headline(), "No QR Code Found");
}

#[test]
fn upscaled_pass_agrees_with_native() {
    let (w, h) = (100, 100);
    let mut rgb = synthetic::finder_rgb(w, h, 30, 30, 4);
    let frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let config = ScanConfig::default();
    let gray = frame.luma();

    let native = ScalePass::original(&config).run(&gray, w, h, &config);
    let upscaled = ScalePass::upscaled(&config).run(&gray, w, h, &config);
    assert_eq!(native.len(), 1);
    assert_eq!(upscaled.len(), 1);
    assert!(native[0].center.distance(&upscaled[0].center) < 1.0);
    assert!((upscaled[0].area / native[0].area - 1.0).abs() < 0.1);
}

#[test]
fn nearby_centers_merge_distant_ones_do_not() {
    let config = DedupConfig::default();
    let close = vec![candidate(100.0, 100.0, 900.0), candidate(105.0, 100.0, 900.0)];
    let kept = dedupe(close, &config);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].center, Point::new(100.0, 100.0));

    let apart = vec![candidate(100.0, 100.0, 900.0), candidate(120.0, 100.0, 900.0)];
    assert_eq!(dedupe(apart, &config).len(), 2);

    let cluster = DedupConfig {
        strategy: DedupStrategy::Cluster,
        ..config
    };
    let chain = vec![
        candidate(0.0, 0.0, 900.0),
        candidate(10.0, 0.0, 900.0),
        candidate(20.0, 0.0, 900.0),
    ];
    assert_eq!(dedupe(chain.clone(), &config).len(), 2);
    assert_eq!(dedupe(chain, &cluster).len(), 1);
}

#[test]
fn small_patterns_ask_to_move_closer() {
    let (w, h) = (100, 100);
    let mut rgb = synthetic::finder_rgb(w, h, 30, 30, 4);
    let config = ScanConfig {
        guidance: GuidanceConfig {
            min_guidance_area: 5000.0,
            ..GuidanceConfig::default()
        },
        ..ScanConfig::default()
    };
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let report = Scanner::new(config).process_frame(&mut frame, &mut NoDecoder);
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.headline(), "Move Closer");
}

#[test]
fn centered_upright_marker_is_ok() {
    let (w, h) = (240, 240);
    let mut rgb = synthetic::marker_rgb(w, h, 60, 60, 5, 21);
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let report = Scanner::default().process_frame(&mut frame, &mut NoDecoder);
    assert_eq!(
        report.decision.map(|d| d.status),
        Some(GuidanceStatus::Aligning {
            position: PositionHint::Centered,
            angle: Some(AngleHint::Aligned),
        })
    );
}

#[test]
fn marker_in_top_left_corner_says_move_up() {
    // Centroid is both above and left of center; the vertical instruction wins
    let (w, h) = (400, 400);
    let mut rgb = synthetic::marker_rgb(w, h, 10, 10, 5, 21);
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let report = Scanner::default().process_frame(&mut frame, &mut NoDecoder);
    assert_eq!(report.candidates.len(), 3);
    assert_eq!(report.headline(), "Move Camera UP");
}

#[test]
fn rotation_follows_edge_ratio() {
    let engine = GuidanceEngine::new(GuidanceConfig::default());
    let square = [
        candidate(220.0, 140.0, 900.0),
        candidate(420.0, 140.0, 900.0),
        candidate(220.0, 340.0, 900.0),
    ];
    assert_eq!(engine.guide(640, 480, &square).overlay.messages, vec!["Position: OK", "Angle: OK"]);

    let wide = [
        candidate(220.0, 190.0, 900.0),
        candidate(420.0, 190.0, 900.0),
        candidate(220.0, 290.0, 900.0),
    ];
    assert_eq!(engine.guide(640, 480, &wide).overlay.messages[1], "Rotate Camera RIGHT");

    let tall = [
        candidate(270.0, 140.0, 900.0),
        candidate(370.0, 140.0, 900.0),
        candidate(270.0, 340.0, 900.0),
    ];
    assert_eq!(engine.guide(640, 480, &tall).overlay.messages[1], "Rotate Camera LEFT");
}

#[test]
fn decoder_runs_once_inside_the_gate_and_banner_follows() {
    let (w, h) = (240, 240);
    let mut rgb = synthetic::marker_rgb(w, h, 60, 60, 5, 21);
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let mut decoder = FixedDecoder::new("1-2:54,290,N008-N010");
    let report = Scanner::default().process_frame(&mut frame, &mut decoder);

    assert_eq!(decoder.calls(), 1);
    assert_eq!(report.decoded_text(), "1-2:54,290,N008-N010");
    let banner = report.decision.and_then(|d| d.overlay.banner);
    assert_eq!(banner.as_deref(), Some(DECODED_BANNER));
}

#[test]
fn decoder_is_skipped_outside_the_gate() {
    let (w, h) = (240, 240);
    let mut rgb = synthetic::marker_rgb(w, h, 60, 60, 5, 21);
    let config = ScanConfig {
        decode: DecodeGate {
            min_area: 1.0e6,
            max_area: 2.0e6,
        },
        ..ScanConfig::default()
    };
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let mut decoder = FixedDecoder::new("1-2:54,290,N008-N010");
    let report = Scanner::new(config).process_frame(&mut frame, &mut decoder);

    assert_eq!(decoder.calls(), 0);
    assert!(report.decoded.is_none());
    assert!(report.decision.and_then(|d| d.overlay.banner).is_none());
}

#[test]
fn decoder_sees_the_unannotated_frame() {
    let (w, h) = (240, 240);
    let source = synthetic::marker_rgb(w, h, 60, 60, 5, 21);
    let mut rgb = source.clone();
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let mut seen_clean = false;
    let mut decoder = decoder_fn(|frame| {
        seen_clean = frame.as_bytes() == source.as_slice();
        None
    });
    let report = Scanner::default().process_frame(&mut frame, &mut decoder);
    assert!(seen_clean);
    assert!(report.decoded.is_none());
    // Guidance was still drawn afterwards
    assert_ne!(rgb, source);
}

#[test]
fn report_serializes_to_json() {
    let (w, h) = (240, 240);
    let mut rgb = synthetic::marker_rgb(w, h, 60, 60, 5, 21);
    let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Rgb).unwrap();
    let report = Scanner::default().process_frame(&mut frame, &mut NoDecoder);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["decision"]["status"]["kind"], "aligning");
    assert_eq!(value["candidates"].as_array().map(Vec::len), Some(3));
}
