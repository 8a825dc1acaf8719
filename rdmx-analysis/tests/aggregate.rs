use approx::assert_abs_diff_eq;
use rdmx_analysis::{
    error_distribution, filter_latency, load_dataset, plot, psychometric_curve, report,
    rt_distribution,
};
use rdmx_core::{ErrorCategory, Layout};
use std::fs;
use std::path::Path;

const HEADER: &str = "RT,Response,Correct,Coherence,TargetAngle";

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), format!("{HEADER}\n{body}")).unwrap();
}

#[test]
fn unrecognized_responses_count_as_raw_trials_only() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "001_6Choice_DDM.csv",
        "0.6,e,0,0.1,0\n\
         0.7,space,0,0.1,0\n\
         0.5,d,1,0.1,0\n",
    );

    let dataset = load_dataset(dir.path()).unwrap();
    assert_eq!(dataset.len(), 3);

    let layout = Layout::for_analysis().unwrap();
    let dist = error_distribution(&dataset.rows, &layout).unwrap();
    assert_eq!(dist.raw_trials, 3);
    assert_eq!(dist.scored_trials, 2);
    assert_eq!(dist.errors, 1);
    assert_eq!(dist.count(ErrorCategory::Neighbor), 1);
    assert_abs_diff_eq!(dist.neighbor_share(), 1.0);
}

#[test]
fn latency_window_drops_anticipations_and_lapses() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "002_6Choice_DDM.csv",
        "0.05,d,1,0.1,0\n\
         0.5,d,1,0.1,0\n\
         1.0,e,0,0.1,0\n\
         6.0,d,1,0.1,0\n",
    );

    let dataset = load_dataset(dir.path()).unwrap();
    let rows = filter_latency(&dataset.rows);
    let rts: Vec<f64> = rows.iter().map(|r| r.rt).collect();
    assert_eq!(rts, vec![0.5, 1.0]);

    let curve = psychometric_curve(&rows);
    assert_eq!(curve.len(), 1);
    assert_eq!(curve[0].trials, 2);
    assert_abs_diff_eq!(curve[0].accuracy, 0.5);
    assert_abs_diff_eq!(curve[0].mean_rt.unwrap(), 0.5);
}

#[test]
fn broken_files_are_skipped_and_the_rest_merged() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a_6Choice_DDM.csv", "0.5,d,1,0.05,0\nnot,a,row\n");
    fs::write(dir.path().join("b.csv"), "foo,bar\n1,2\n").unwrap();
    write(dir.path(), "c_4Choice.csv", "0.8,a,0,0.05,0\n");
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let dataset = load_dataset(dir.path()).unwrap();
    assert_eq!(dataset.files.len(), 2);
    assert_eq!(dataset.skipped.len(), 1);
    assert_eq!(dataset.malformed_rows, 1);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows[0].n_choice, 6);
    assert_eq!(dataset.rows[1].n_choice, 4);

    // the four-choice session stays out of the six-choice curves
    let rows = filter_latency(&dataset.rows);
    let curve = psychometric_curve(&rows);
    assert_eq!(curve[0].trials, 1);
}

#[test]
fn a_directory_of_rejected_files_says_so() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("001_6Choice_DDM.csv"), "foo,bar\n1,2\n").unwrap();

    let dataset = load_dataset(dir.path()).unwrap();
    assert!(dataset.is_empty());
    assert_eq!(dataset.skipped.len(), 1);
    let text = report::empty_dataset_report(&dataset);
    assert!(text.contains("skipped 1 unreadable file(s)"));
    assert_ne!(text, report::NO_FILES);
}

#[test]
fn empty_directory_is_an_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_dataset(dir.path()).unwrap();
    assert!(dataset.is_empty());
    assert!(load_dataset(&dir.path().join("missing")).unwrap().is_empty());
}

#[test]
fn figures_are_written_without_a_font() {
    let dir = tempfile::tempdir().unwrap();
    let body: String = (0..12)
        .map(|i| format!("{},e,{},0.05,{}\n", 0.4 + i as f64 * 0.1, i % 2, (i % 6) * 60))
        .collect();
    write(dir.path(), "003_6Choice_DDM.csv", &body);

    let dataset = load_dataset(dir.path()).unwrap();
    let layout = Layout::for_analysis().unwrap();
    let dist = error_distribution(&dataset.rows, &layout).unwrap();
    let rows = filter_latency(&dataset.rows);
    let curve = psychometric_curve(&rows);
    let rt = rt_distribution(&rows).unwrap();
    assert!(!rt.pooled);

    let plots = dir.path().join("plots");
    let a = plot::plot_path(&plots, "errors.png").unwrap();
    plot::plot_error_distribution(&dist, &a).unwrap();
    let b = plot::plot_path(&plots, "psy.png").unwrap();
    plot::plot_psychometrics(&curve, &b).unwrap();
    let c = plot::plot_path(&plots, "rt.png").unwrap();
    plot::plot_rt_distribution(&rt, &c).unwrap();

    for p in [a, b, c] {
        let bytes = fs::read(p).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
