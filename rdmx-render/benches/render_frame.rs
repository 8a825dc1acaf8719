use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use pprof::criterion::{Output, PProfProfiler};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rdmx_core::{Angle, DotField, DotFieldParams, Feedback, Layout, TaskPhase, TrialState};
use rdmx_render::{Captions, Scene, SkiaRenderer, Style, load_font};
use rdmx_timing::HighPrecisionTimer;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 900;

fn harness() -> (SkiaRenderer, DotField, Vec<u8>, HighPrecisionTimer) {
    let layout = Layout::standard(250.0).expect("layout");
    let font = load_font(None).ok().flatten();
    let r = SkiaRenderer::new(
        WIDTH,
        HEIGHT,
        &layout,
        Style::default(),
        Captions::standard(5, 54),
        font,
    )
    .expect("renderer");

    let mut rng = StdRng::seed_from_u64(1);
    let mut field = DotField::new(DotFieldParams::default(), &mut rng);
    field.set_motion(Angle::new(120).expect("angle"), 0.15, &mut rng);
    for _ in 0..30 {
        field.step(&mut rng);
    }

    let fb = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    (r, field, fb, HighPrecisionTimer::new())
}

pub fn bench_frames(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("stimulus_frame", |b| {
        b.iter_batched(
            harness,
            |(mut r, field, mut fb, mut t)| {
                let scene = Scene {
                    phase: &TaskPhase::Experiment,
                    trial_state: Some(TrialState::Stimulus),
                    dots: field.dots(),
                    feedback: None,
                    progress: Some((10, 54)),
                };
                let stats = r.render_frame(&scene, &mut fb, &mut t);
                black_box(stats.ok());
            },
            BatchSize::SmallInput,
        )
    });

    g.bench_function("feedback_frame", |b| {
        let feedback = Feedback {
            target: Angle::new(120).expect("angle"),
            chosen: Angle::new(60).expect("angle"),
            correct: false,
            rt: 0.842,
        };
        b.iter_batched(
            harness,
            |(mut r, field, mut fb, mut t)| {
                let scene = Scene {
                    phase: &TaskPhase::Practice,
                    trial_state: Some(TrialState::Feedback),
                    dots: field.dots(),
                    feedback: Some(&feedback),
                    progress: Some((3, 5)),
                };
                let stats = r.render_frame(&scene, &mut fb, &mut t);
                black_box(stats.ok());
            },
            BatchSize::SmallInput,
        )
    });

    g.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_frames
}
criterion_main!(benches);
