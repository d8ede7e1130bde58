mod support;

use std::path::Path;
use std::process::{Command, Output};

use support::wav::{clicks, tone, write_test_wav};
use tempfile::tempdir;

fn audiocluster(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_audiocluster"))
        .args(args)
        .current_dir(workdir)
        .env("AUDIOCLUSTER_CONFIG_HOME", workdir.join("home"))
        .env_remove("AUDIOCLUSTER_CONFIG")
        .env("RUST_LOG", "warn")
        .output()
        .expect("run audiocluster")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn empty_folder_exits_cleanly_without_image() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("music")).unwrap();
    let output = audiocluster(dir.path(), &["music"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Scanning folder: music..."));
    assert!(text.contains("No audio files found."));
    assert!(!dir.path().join("analysis_result.png").exists());
}

#[test]
fn unreadable_files_exit_cleanly_without_image() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    std::fs::create_dir(&music).unwrap();
    std::fs::write(music.join("bad.ogg"), "nope").unwrap();
    let output = audiocluster(dir.path(), &["music"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Found 1 audio files. Analyzing..."));
    assert!(text.contains("Analyzing bad.ogg..."));
    assert!(text.contains("Error analyzing"));
    assert!(text.contains("Could not extract features from any files."));
    assert!(!dir.path().join("analysis_result.png").exists());
}

#[test]
fn non_positive_cluster_count_is_rejected_before_scanning() {
    let dir = tempdir().unwrap();
    let output = audiocluster(dir.path(), &["missing-folder", "--clusters", "0"]);
    assert!(!output.status.success());
    assert!(!stdout(&output).contains("Scanning folder"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cluster count"));
}

#[test]
fn full_run_writes_plot_and_summary() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    write_test_wav(&music.join("calm.wav"), &tone(220.0, 0.2, 1.0));
    write_test_wav(&music.join("bright.wav"), &tone(2500.0, 0.5, 1.0));
    write_test_wav(&music.join("beat.wav"), &clicks(120.0, 0.8, 2.0));

    let output = audiocluster(dir.path(), &["music", "--clusters", "2"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("Feature Loadings (Correlations with axes):"));
    assert!(text.contains("Analysis complete. Visualization saved to analysis_result.png"));
    assert!(text.contains("Cluster Summary:"));
    let plot = dir.path().join("analysis_result.png");
    assert!(plot.is_file());
    assert_eq!(&std::fs::read(&plot).unwrap()[..4], b"\x89PNG");
}
