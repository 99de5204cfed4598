use scatter_vector::ir::DrawCommand;
use scatter_vector::{
    Dataset, FileSource, MemorySource, PixelRect, RenderOptions, ScatterVector,
    ScatterVectorConfig,
};
use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Helper function to run scatter-vector with arguments and optional stdin
fn run_scatter_vector(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_scatter-vector"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn process");

    if let Some(mut handle) = child.stdin.take() {
        if let Some(input) = stdin {
            handle
                .write_all(input.as_bytes())
                .expect("Failed to write to stdin");
        }
    }

    child.wait_with_output().expect("Failed to wait for process")
}

fn stdout_svg(output: &Output) -> String {
    assert!(
        output.status.success(),
        "Failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let svg = String::from_utf8(output.stdout.clone()).expect("SVG is not UTF-8");
    assert!(svg.contains("<svg"), "Output is not an SVG document");
    svg
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Command line
// =============================================================================

#[test]
fn test_end_to_end_csv() {
    let output = run_scatter_vector(
        &["test/iris.csv", "--primary", "sw", "--factors", "species"],
        None,
    );
    let svg = stdout_svg(&output);
    // 9 rows in 2 panels, plus one legend swatch per species
    assert!(svg.matches("<circle").count() >= 18);
    assert!(svg.contains("setosa"));
    assert!(svg.contains("virginica"));
}

#[test]
fn test_end_to_end_json() {
    let output = run_scatter_vector(
        &["test/iris.json", "--primary", "pl", "--factors", "species"],
        None,
    );
    let svg = stdout_svg(&output);
    // sw and pw panels, 3 rows each
    assert!(svg.matches("<circle").count() >= 6);
}

#[test]
fn test_end_to_end_stdin() {
    let csv = fs::read_to_string("test/iris.csv").expect("Failed to read test CSV");
    let output = run_scatter_vector(
        &["-", "--primary", "pw", "--factors", "species"],
        Some(&csv),
    );
    stdout_svg(&output);
}

#[test]
fn test_output_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plot.svg");
    let output = run_scatter_vector(
        &[
            "test/iris.csv",
            "--primary",
            "sw",
            "--factors",
            "species",
            "-o",
            path.to_str().unwrap(),
        ],
        None,
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let svg = fs::read_to_string(&path).expect("Output file missing");
    assert!(svg.contains("<circle"));
}

#[test]
fn test_config_file_with_override() {
    let output = run_scatter_vector(
        &["--config", "test/config.json", "--primary", "pl", "--values", "sw"],
        None,
    );
    let svg = stdout_svg(&output);
    // Only the sw panel survives the --values override
    assert!(svg.matches("<circle").count() >= 9);
    assert!(svg.contains("sw"));
}

#[test]
fn test_brush_writes_selection() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let selection = dir.path().join("selected.csv");
    // Left half of the pl panel: pl below the midpoint of 1.3..6.0
    let output = run_scatter_vector(
        &[
            "test/iris.csv",
            "--primary",
            "sw",
            "--factors",
            "species",
            "--brush",
            "pl: 0,0 -> 70,140",
            "--selection",
            selection.to_str().unwrap(),
        ],
        None,
    );
    stdout_svg(&output);

    let mut reader = csv::Reader::from_path(&selection).expect("Selection file missing");
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["sw", "pl", "pw", "species"]);
    let species: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[3].to_string())
        .collect();
    assert_eq!(species, vec!["setosa", "setosa", "setosa"]);
}

#[test]
fn test_cleared_brush_selects_nothing() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let selection = dir.path().join("selected.csv");
    let output = run_scatter_vector(
        &[
            "test/iris.csv",
            "--primary",
            "sw",
            "--factors",
            "species",
            "--brush",
            "#0: 0,0 -> 140,140 | #0: clear",
            "--selection",
            selection.to_str().unwrap(),
        ],
        None,
    );
    stdout_svg(&output);

    let mut reader = csv::Reader::from_path(&selection).expect("Selection file missing");
    assert_eq!(reader.records().count(), 0);
}

#[test]
fn test_invalid_gesture() {
    let output = run_scatter_vector(
        &["test/iris.csv", "--primary", "sw", "--factors", "species", "--brush", "pl 0,0"],
        None,
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Parse error"));
}

#[test]
fn test_unknown_panel_gesture() {
    let output = run_scatter_vector(
        &["test/iris.csv", "--primary", "sw", "--factors", "species", "--brush", "#7: clear"],
        None,
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no panel matches"));
}

#[test]
fn test_unknown_primary() {
    let output = run_scatter_vector(
        &["test/iris.csv", "--primary", "petal", "--factors", "species"],
        None,
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("'petal'"));
}

#[test]
fn test_missing_data_file() {
    let output = run_scatter_vector(
        &["test/nonexistent.csv", "--primary", "sw", "--factors", "species"],
        None,
    );
    assert!(!output.status.success());
}

#[test]
fn test_missing_roles() {
    let output = run_scatter_vector(&["test/iris.csv", "--primary", "sw"], None);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid configuration"));
}

// =============================================================================
// Library scenarios
// =============================================================================

fn two_row_iris() -> Dataset {
    Dataset::new(
        strings(&["sw", "pl", "pw", "species"]),
        vec![
            strings(&["3.5", "1.4", "0.2", "a"]),
            strings(&["3.0", "4.5", "1.5", "b"]),
        ],
    )
    .unwrap()
}

#[test]
fn test_primary_swap() {
    let config = ScatterVectorConfig::new("iris")
        .with_factors(["species"])
        .with_values(["sw", "pl", "pw"]);
    let mut plot = ScatterVector::new(config).unwrap();
    let source = MemorySource::new(two_row_iris());

    plot.draw("sw", &source).unwrap();
    assert_eq!(plot.groups(), &["a", "b"]);
    let names: Vec<&str> = plot.panels().iter().map(|p| p.value.name.as_str()).collect();
    assert_eq!(names, vec!["pl", "pw"]);
    assert!(plot.panels().iter().all(|p| p.primary.name == "sw"));

    plot.draw("pl", &source).unwrap();
    let names: Vec<&str> = plot.panels().iter().map(|p| p.value.name.as_str()).collect();
    assert_eq!(names, vec!["sw", "pw"]);
    assert!(plot.panels().iter().all(|p| p.primary.name == "pl"));
    assert_eq!(plot.columns().unwrap().value_names(), vec!["sw", "pw"]);
}

#[test]
fn test_unparseable_value_renders_invisible() {
    let config = ScatterVectorConfig::new("test/with_na.csv").with_factors(["species"]);
    let mut plot = ScatterVector::new(config).unwrap();
    plot.draw("sw", &FileSource).unwrap();

    let scene = plot.scene(&RenderOptions::default()).unwrap();
    let radii: Vec<f64> = scene.panels[0]
        .points()
        .filter_map(|c| match c {
            DrawCommand::Point { radius, .. } => Some(*radius),
            _ => None,
        })
        .collect();
    assert_eq!(radii, vec![3.0, 0.0, 0.0]);

    // Brushing the whole panel never selects rows with a missing coordinate
    plot.brush_start(0).unwrap();
    plot.brush_move(0, PixelRect::new((0.0, 0.0), (140.0, 140.0)))
        .unwrap();
    plot.brush_end(0).unwrap();
    assert_eq!(plot.selected_rows().len(), 1);
}

#[test]
fn test_brush_moves_between_panels() {
    let config = ScatterVectorConfig::new("test/iris.csv").with_factors(["species"]);
    let mut plot = ScatterVector::new(config).unwrap();
    plot.draw("sw", &FileSource).unwrap();

    plot.brush_start(0).unwrap();
    plot.brush_move(0, PixelRect::new((0.0, 0.0), (140.0, 140.0)))
        .unwrap();
    plot.brush_end(0).unwrap();
    assert_eq!(plot.active_panel().map(|p| p.index), Some(0));

    plot.brush_start(1).unwrap();
    assert_eq!(plot.active_panel().map(|p| p.index), Some(1));
    assert!(plot.brush_extent().is_none());
    assert!(plot.selected_rows().is_empty());
}

#[test]
fn test_json_keeps_column_order() {
    let config = ScatterVectorConfig::new("test/iris.json").with_factors(["species"]);
    let mut plot = ScatterVector::new(config).unwrap();
    plot.draw("pw", &FileSource).unwrap();

    assert_eq!(plot.dataset().unwrap().columns(), &["sw", "pl", "pw", "species"]);
    let names: Vec<&str> = plot.panels().iter().map(|p| p.value.name.as_str()).collect();
    assert_eq!(names, vec!["sw", "pl"]);
}
