use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qr_guidance::config::{DedupConfig, DedupStrategy};
use qr_guidance::detector::dedup::dedupe;
use qr_guidance::tools::synthetic;
use qr_guidance::{ChannelOrder, FinderPatternCandidate, Frame, NoDecoder, Point, ScanConfig, Scanner};

fn bench_locate_native(c: &mut Criterion) {
    let (w, h) = (640, 480);
    let mut rgb = synthetic::marker_rgb(w, h, 200, 120, 6, 21);
    let frame = Frame::new(&mut rgb, w, h, ChannelOrder::Bgr).unwrap();
    let scanner = Scanner::default();
    c.bench_function("locate_native_640x480", |b| b.iter(|| scanner.locate(black_box(&frame))));
}

fn bench_locate_small_modules(c: &mut Criterion) {
    let (w, h) = (320, 240);
    let mut rgb = synthetic::marker_rgb(w, h, 100, 60, 2, 21);
    let frame = Frame::new(&mut rgb, w, h, ChannelOrder::Bgr).unwrap();
    let scanner = Scanner::default();
    c.bench_function("locate_small_modules_320x240", |b| b.iter(|| scanner.locate(black_box(&frame))));
}

fn bench_locate_blank(c: &mut Criterion) {
    let (w, h) = (640, 480);
    let mut rgb = synthetic::blank_rgb(w, h);
    let frame = Frame::new(&mut rgb, w, h, ChannelOrder::Bgr).unwrap();
    let scanner = Scanner::default();
    c.bench_function("locate_blank_640x480", |b| b.iter(|| scanner.locate(black_box(&frame))));
}

fn bench_process_frame(c: &mut Criterion) {
    let (w, h) = (640, 480);
    let source = synthetic::marker_rgb(w, h, 200, 120, 6, 21);
    let scanner = Scanner::new(ScanConfig::default());
    c.bench_function("process_frame_640x480", |b| {
        b.iter(|| {
            let mut rgb = source.clone();
            let mut frame = Frame::new(&mut rgb, w, h, ChannelOrder::Bgr).unwrap();
            scanner.process_frame(black_box(&mut frame), &mut NoDecoder)
        })
    });
}

fn scattered_candidates(n: usize) -> Vec<FinderPatternCandidate> {
    (0..n)
        .map(|i| {
            let x = (i * 37 % 640) as f32;
            let y = (i * 53 % 480) as f32;
            FinderPatternCandidate::new(Point::new(x, y), 400.0, vec![Point::new(x, y)])
        })
        .collect()
}

fn bench_dedupe(c: &mut Criterion) {
    let candidates = scattered_candidates(200);
    let greedy = DedupConfig::default();
    let cluster = DedupConfig {
        strategy: DedupStrategy::Cluster,
        ..DedupConfig::default()
    };
    c.bench_function("dedupe_greedy_200", |b| {
        b.iter(|| dedupe(black_box(candidates.clone()), &greedy))
    });
    c.bench_function("dedupe_cluster_200", |b| {
        b.iter(|| dedupe(black_box(candidates.clone()), &cluster))
    });
}

criterion_group!(
    benches,
    bench_locate_native,
    bench_locate_small_modules,
    bench_locate_blank,
    bench_process_frame,
    bench_dedupe
);
criterion_main!(benches);
