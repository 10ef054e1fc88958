//! CLI integration tests for msvscpp-convert
//!
//! These tests run the built binary and check its exit status and
//! diagnostics.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run the converter binary inside `dir`
fn run_msvscpp_convert(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_msvscpp-convert"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// Helper to check if output contains expected text
fn output_contains(output: &Output, text: &str) -> bool {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout.contains(text) || stderr.contains(text)
}

/// Copy the VS 2008 fixture solution into a fresh directory
fn fixture_solution() -> (TempDir, PathBuf) {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join("vs2008");
    let tmp = TempDir::new().unwrap();
    for relative in [
        "example.sln",
        "libexample/libexample.vcproj",
        "exampletool/exampletool.vcproj",
    ] {
        let target = tmp.path().join(relative);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::copy(source.join(relative), &target).unwrap();
    }
    let solution = tmp.path().join("example.sln");
    (tmp, solution)
}

mod cli_parsing {
    use super::*;

    #[test]
    fn test_help_flag() {
        let tmp = TempDir::new().unwrap();
        let output = run_msvscpp_convert(&["--help"], tmp.path());
        assert!(output.status.success());
        assert!(output_contains(&output, "Usage"));
        assert!(output_contains(&output, "--to"));
    }

    #[test]
    fn test_missing_solution() {
        let tmp = TempDir::new().unwrap();
        let output = run_msvscpp_convert(&[], tmp.path());
        assert_eq!(output.status.code(), Some(1));
        assert!(output_contains(&output, "Usage"));
        assert!(output_contains(&output, "missing solution file"));
    }

    #[test]
    fn test_unknown_version() {
        let (tmp, solution) = fixture_solution();
        let output = run_msvscpp_convert(&["--to", "2019", solution.to_str().unwrap()], tmp.path());
        assert_eq!(output.status.code(), Some(1));
        assert!(output_contains(&output, "unknown Visual Studio version: 2019"));
        assert!(!tmp.path().join("2019").exists());
    }

    #[test]
    fn test_unsupported_version() {
        let (tmp, solution) = fixture_solution();
        let output = run_msvscpp_convert(&["--to", "2008", solution.to_str().unwrap()], tmp.path());
        assert_eq!(output.status.code(), Some(1));
        assert!(output_contains(&output, "unsupported conversion"));
        assert!(!tmp.path().join("2008").exists());
    }
}

mod conversion {
    use super::*;

    #[test]
    fn test_converts_solution() {
        let (tmp, solution) = fixture_solution();
        let out = tmp.path().join("out");
        let output = run_msvscpp_convert(
            &["--output", out.to_str().unwrap(), solution.to_str().unwrap()],
            tmp.path(),
        );
        assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
        assert!(out.join("example.sln").is_file());
        assert!(out.join("libexample").join("libexample.vcxproj").is_file());
        assert!(out.join("libexample").join("libexample.vcxproj.filters").is_file());
        assert!(out.join("exampletool").join("exampletool.vcxproj").is_file());
        assert!(!out.join("examplesharp").exists());
    }

    #[test]
    fn test_default_output_directory() {
        let (tmp, solution) = fixture_solution();
        let output = run_msvscpp_convert(&[solution.to_str().unwrap()], tmp.path());
        assert!(output.status.success());
        assert!(tmp.path().join("2010").join("example.sln").is_file());
    }

    #[test]
    fn test_existing_output_directory() {
        let (tmp, solution) = fixture_solution();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();
        let output = run_msvscpp_convert(
            &["-o", out.to_str().unwrap(), solution.to_str().unwrap()],
            tmp.path(),
        );
        assert_eq!(output.status.code(), Some(1));
        assert!(output_contains(&output, "output directory already exists"));
        assert!(!out.join("example.sln").exists());
    }

    #[test]
    fn test_missing_solution_file() {
        let tmp = TempDir::new().unwrap();
        let output = run_msvscpp_convert(&["-q", "absent.sln"], tmp.path());
        assert_eq!(output.status.code(), Some(1));
        assert!(output_contains(&output, "absent.sln"));
    }
}
