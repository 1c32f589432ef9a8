use cenplot::bed::BedRecord;
use cenplot::track::{BarOptions, IntervalTable, LabelOptions, ValueOptions};
use cenplot::{
    plot_one_cen, shared_range, Config, DispatchOutcome, LegendPosition, OutputFormat, PlotSettings, RenderError,
    Track, TrackData, TrackPosition, TrackVariant,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn records(recs: &[(u64, u64, &str)]) -> TrackData {
    TrackData::Intervals(IntervalTable::new(
        recs.iter()
            .map(|&(st, end, name)| BedRecord::new("chr1", st, end, name))
            .collect(),
    ))
}

fn small_settings(format: OutputFormat) -> PlotSettings {
    PlotSettings {
        format,
        dim: (4.0, 2.0),
        dpi: 60,
        ..PlotSettings::default()
    }
}

fn three_tracks() -> Vec<Track> {
    vec![
        Track::new(
            "ideogram",
            TrackPosition::Normal,
            TrackVariant::Bar(BarOptions::default()),
            records(&[(0, 400_000, "p"), (400_000, 1_000_000, "q")]),
        ),
        Track::new(
            "genes",
            TrackPosition::Normal,
            TrackVariant::Label(LabelOptions::default()),
            records(&[(100_000, 150_000, "GENE1"), (600_000, 700_000, "GENE2")]),
        ),
        Track::new(
            "gc",
            TrackPosition::Normal,
            TrackVariant::Value(ValueOptions::default()),
            records(&[(0, 500_000, "0.4"), (500_000, 1_000_000, "0.6")]),
        ),
    ]
}

#[test]
fn three_track_figure_end_to_end() {
    let dir = tempdir().unwrap();
    let tracks = three_tracks();
    let rendered = plot_one_cen(
        &tracks,
        dir.path(),
        "chr1",
        &small_settings(OutputFormat::Png),
        (0, 1_000_000),
    )
    .unwrap();

    assert_eq!(rendered.path, dir.path().join("chr1.png"));
    let grid = rendered.grid();
    assert_eq!(grid.shape(), (3, 2));
    let labels: Vec<&str> = (0..3).filter_map(|r| grid.get(r, 0).and_then(|s| s.ylabel())).collect();
    assert_eq!(labels, vec!["ideogram", "genes", "gc"]);
    for row in 0..3 {
        assert_eq!(grid.get(row, 0).unwrap().xlim(), (0.0, 1_000_000.0));
    }
    assert!(fs::metadata(&rendered.path).unwrap().len() > 0);
}

#[test]
fn renders_are_byte_identical() {
    for format in [OutputFormat::Png, OutputFormat::Svg] {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let tracks = three_tracks();
        let settings = small_settings(format);
        let first = plot_one_cen(&tracks, a.path(), "chr1", &settings, (0, 1_000_000)).unwrap();
        let second = plot_one_cen(&tracks, b.path(), "chr1", &settings, (0, 1_000_000)).unwrap();
        assert_ne!(first.path, second.path);
        assert_eq!(fs::read(&first.path).unwrap(), fs::read(&second.path).unwrap());
    }
}

#[test]
fn svg_output_carries_row_labels() {
    let dir = tempdir().unwrap();
    let rendered = plot_one_cen(
        &three_tracks(),
        dir.path(),
        "chr1",
        &small_settings(OutputFormat::Svg),
        (0, 1_000_000),
    )
    .unwrap();
    let svg = fs::read_to_string(&rendered.path).unwrap();
    assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
    for label in ["ideogram", "genes", "gc"] {
        assert!(svg.contains(label), "missing {label}");
    }
}

#[test]
fn overlap_first_aborts_before_writing() {
    let dir = tempdir().unwrap();
    let mut tracks = three_tracks();
    tracks[0].position = TrackPosition::Overlap;
    let err = plot_one_cen(&tracks, dir.path(), "chr1", &small_settings(OutputFormat::Png), (0, 10)).unwrap_err();
    assert!(matches!(err, RenderError::Config { .. }));
    assert!(!dir.path().join("chr1.png").exists());
}

#[test]
fn draw_failure_leaves_no_image() {
    let dir = tempdir().unwrap();
    let mut tracks = three_tracks();
    tracks[2].data = records(&[(0, 10, "high")]);
    let err = plot_one_cen(&tracks, dir.path(), "chr1", &small_settings(OutputFormat::Png), (0, 10)).unwrap_err();
    assert!(matches!(err, RenderError::Draw { ref track, .. } if track == "gc"));
    assert!(!dir.path().join("chr1.png").exists());
}

#[test]
fn left_legend_swaps_columns() {
    let dir = tempdir().unwrap();
    let mut tracks = three_tracks();
    tracks[1].options.legend = true;
    let settings = PlotSettings {
        legend_pos: LegendPosition::Left,
        ..small_settings(OutputFormat::Png)
    };
    let rendered = plot_one_cen(&tracks, dir.path(), "chr1", &settings, (0, 1_000_000)).unwrap();
    let grid = rendered.grid();
    assert_eq!(grid.track_col(), 1);
    assert_eq!(grid.get(1, 1).and_then(|s| s.ylabel()), Some("genes"));
    let legend = grid.get(1, 0).unwrap();
    assert!(!legend.is_empty());
    assert!(!legend.style.spines.any());
    assert!(legend.rect().right() <= grid.get(1, 1).unwrap().rect().x);
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn config_driven_render() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "hor.bed",
        "chr2\t0\t1020\tS1C2H1L\t0\t+\t0\t1020\t0,0,0\n\
         chr2\t1020\t1360\tS1C2H1L\t0\t-\t1020\t1360\t0,0,0\n\
         chr2\t1360\t2000\tS1C2H1d\t0\t+\t1360\t2000\t0,0,0\n\
         chr9\t0\t340\tS1C9H1L\t0\t+\t0\t340\t0,0,0\n",
    );
    write(
        dir.path(),
        "cdr.bed",
        "chr2\t500\t900\tCDR\t0\t.\t500\t900\t255,0,0\n",
    );
    write(
        dir.path(),
        "tracks.toml",
        r#"
[settings]
format = "svg"
dim = [5.0, 3.0]
dpi = 40

[[tracks]]
title = "HOR"
type = "hor"
path = "hor.bed"
options = { legend = true, mer_filter = 2 }

[[tracks]]
title = "Strand"
position = "overlap"
type = "hor_ort"
path = "hor.bed"

[[tracks]]
title = "CDR"
type = "label"
path = "cdr.bed"
options = { chrom_as_title = true }
"#,
    );

    let config = Config::from_path(&dir.path().join("tracks.toml")).unwrap();
    assert_eq!(config.chroms().unwrap(), vec!["chr2".to_string(), "chr9".to_string()]);

    let tracks = config.load_tracks("chr2").unwrap();
    let TrackData::Intervals(hor) = &tracks[0].data else {
        panic!("HOR track should hold intervals");
    };
    // The dead HOR (no `L`) is dropped; the rest is sorted by mer, largest first.
    assert_eq!(hor.records.len(), 2);
    assert_eq!(hor.records[0].mer, Some(6));

    let range = shared_range(&tracks).unwrap();
    assert_eq!(range, (0, 1360));

    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let rendered = plot_one_cen(&tracks, &out, "chr2", &config.settings, range).unwrap();
    assert_eq!(rendered.path, out.join("chr2.svg"));
    let grid = rendered.grid();
    assert_eq!(grid.shape(), (2, 2));
    assert_eq!(grid.get(0, 0).and_then(|s| s.ylabel()), Some("HOR\nStrand"));
    assert_eq!(grid.get(1, 0).and_then(|s| s.ylabel()), Some("chr2"));
}

#[test]
fn dispatch_reports_skips_separately_from_failures() {
    let tracks = three_tracks();
    let mut grid = cenplot::allocate(&tracks[..1], LegendPosition::None).unwrap();
    let report = cenplot::dispatch(&mut grid, &tracks, "chr1", (0, 1_000_000)).unwrap();
    assert_eq!(report.skipped(), 2);
    assert!(matches!(report.outcomes[0], DispatchOutcome::Drawn { row: 0, .. }));
    assert!(matches!(
        &report.outcomes[2],
        DispatchOutcome::Skipped { label, .. } if label == "gc"
    ));
}
