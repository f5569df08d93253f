use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn descriptor(dir: &Path, record: serde_json::Value) -> Descriptor {
    Descriptor::prepare(record, dir, "case.json", None).unwrap()
}

fn check(desc: &Descriptor, stdout: &str, stderr: &str) -> (Result<(), Failure>, String) {
    let mut report = Reporter::new(Vec::new());
    let result = check_targets(desc, stdout.to_string(), stderr.to_string(), &mut report);
    (result, String::from_utf8(report.into_inner()).unwrap())
}

#[test]
fn test_no_targets_requires_silence() {
    let tmp = TempDir::new().unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d" }));
    assert!(check(&desc, "", "").0.is_ok());

    let (result, out) = check(&desc, "", "warning: x\n");
    assert!(matches!(
        result,
        Err(Failure::UnconsumedStreamOutput { stream: Stream::Stderr })
    ));
    assert!(out.contains("\t--- stderr\n\twarning: x\n"));
}

#[test]
fn test_identical_artifact_passes() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("a.bin"), [0x90, 0xc3]).unwrap();
    std::fs::write(tmp.path().join("a.bin.t"), [0x90, 0xc3]).unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d", "target": [{ "output": "a.bin" }] }));
    let (result, out) = check(&desc, "", "");
    assert!(result.is_ok());
    assert!(out.starts_with("\tComparing "));
}

#[test]
fn test_single_differing_byte_fails() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("a.bin"), [0x90, 0xc3]).unwrap();
    std::fs::write(tmp.path().join("a.bin.t"), [0x90, 0xc2]).unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d", "target": [{ "output": "a.bin" }] }));
    let (result, out) = check(&desc, "", "");
    assert!(matches!(result, Err(Failure::ArtifactMismatch { .. })));
    assert!(out.contains("--- hexdump"));
    assert!(out.contains("-00000000   90 c2"));
    assert!(out.contains("+00000000   90 c3"));
}

#[test]
fn test_missing_reference_is_not_a_mismatch() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("t1.bin"), [0x90]).unwrap();
    let desc = descriptor(
        tmp.path(),
        json!({ "description": "d", "id": "t1", "target": [{ "output": "t1.bin" }] }),
    );
    match check(&desc, "", "").0.unwrap_err() {
        Failure::Unreadable { path, source } => {
            assert_eq!(path, tmp.path().join("t1.bin.t"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected unreadable reference, got {:?}", other),
    }
}

#[test]
fn test_expected_failure_skips_artifacts() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("e.stderr"), "e.asm:1: error: boom\n").unwrap();
    let desc = descriptor(
        tmp.path(),
        json!({
            "description": "d",
            "error": "expected",
            "target": [{ "output": "e.bin" }, { "stderr": "e.stderr" }]
        }),
    );
    let (result, out) = check(&desc, "", "e.asm:1: error: boom\n");
    assert!(result.is_ok());
    assert!(!out.contains("Comparing e.bin"));
}

#[test]
fn test_stream_filter_before_compare() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("a.stdout"), "addr=ADDR\n").unwrap();
    let desc = descriptor(
        tmp.path(),
        json!({
            "description": "d",
            "target": [{ "stdout": "a.stdout", "filter": { "match": "0x[0-9a-f]+", "subst": "ADDR" } }]
        }),
    );
    let (result, out) = check(&desc, "addr=0x1000\n", "");
    assert!(result.is_ok(), "{}", out);
    assert_eq!(out, "\tComparing stdout\n");
}

#[test]
fn test_stream_mismatch_renders_diff() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("a.stdout"), "one\n").unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d", "target": [{ "stdout": "a.stdout" }] }));
    let (result, out) = check(&desc, "two\n", "");
    assert!(matches!(
        result,
        Err(Failure::StreamMismatch { stream: Stream::Stdout })
    ));
    assert!(out.contains("\t-one\n\t+two\n"));
}

// Stream targets consume their stream; the other one must still be empty
#[test]
fn test_consumed_stream_does_not_leak() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("a.stdout"), "listing\n").unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d", "target": [{ "stdout": "a.stdout" }] }));
    assert!(check(&desc, "listing\n", "").0.is_ok());

    let (result, _) = check(&desc, "listing\n", "warning\n");
    assert!(matches!(
        result,
        Err(Failure::UnconsumedStreamOutput { stream: Stream::Stderr })
    ));
}

#[test]
fn test_missing_stream_reference() {
    let tmp = TempDir::new().unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d", "target": [{ "stderr": "none.stderr" }] }));
    assert!(matches!(
        check(&desc, "", "").0,
        Err(Failure::Unreadable { .. })
    ));
}

#[test]
fn test_disabled_is_skipped_without_running() {
    let tmp = TempDir::new().unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d", "disable": "needs macho" }));
    let config = Config {
        nasm: PathBuf::from("/nonexistent/nasm"),
        ..Config::default()
    };
    let mut report = Reporter::new(Vec::new());
    let outcome = run(&desc, &config, &mut report);
    assert!(matches!(&outcome, Outcome::Skip(reason) if reason == "needs macho"));
    assert_eq!(Verdict::of(&desc, &outcome), Verdict::Skip);
    let out = String::from_utf8(report.into_inner()).unwrap();
    assert!(!out.contains("Executing"));
}

#[test]
fn test_verdict_tolerates_over() {
    let tmp = TempDir::new().unwrap();
    let over = descriptor(tmp.path(), json!({ "description": "d", "error": "over" }));
    let plain = descriptor(tmp.path(), json!({ "description": "d" }));
    let failed = || Outcome::Fail(Failure::StreamMismatch { stream: Stream::Stdout });
    assert_eq!(Verdict::of(&over, &failed()), Verdict::ErrorTolerated);
    assert_eq!(Verdict::of(&plain, &failed()), Verdict::Fail);
    assert_eq!(Verdict::of(&plain, &Outcome::Pass), Verdict::Pass);
    assert_eq!(Verdict::of_failure(&over), Verdict::ErrorTolerated);
    assert_eq!(Verdict::of_failure(&plain), Verdict::Fail);
}

// Tolerance comes from the verdict handed in, not from re-reading the descriptor
#[test]
fn test_record_failure_follows_verdict() {
    let tmp = TempDir::new().unwrap();
    let desc = descriptor(tmp.path(), json!({ "description": "d" }));
    let failure = Failure::StreamMismatch { stream: Stream::Stdout };
    let config = Config::default();
    let mut report = Reporter::new(Vec::new());
    let mut summary = Summary::default();

    assert!(!summary.record_failure(&desc, &failure, Verdict::ErrorTolerated, &config, &mut report));
    assert_eq!((summary.tolerated, summary.failed), (1, 0));

    assert!(summary.record_failure(&desc, &failure, Verdict::Fail, &config, &mut report));
    assert_eq!((summary.tolerated, summary.failed), (1, 1));
    assert!(summary.aborted);
}

#[test]
fn test_launch_failure_fails_and_stops() {
    let tmp = TempDir::new().unwrap();
    let descs = vec![
        descriptor(tmp.path(), json!({ "description": "first" })),
        descriptor(tmp.path(), json!({ "description": "second" })),
    ];
    let config = Config {
        nasm: PathBuf::from("/nonexistent/nasm"),
        ..Config::default()
    };
    let mut report = Reporter::new(Vec::new());
    let summary = run_all(&descs, &config, &mut report);
    assert_eq!(summary.failed, 1);
    assert!(summary.aborted);
    assert_eq!(summary.status(), RunStatus::Failure);
    let out = String::from_utf8(report.into_inner()).unwrap();
    assert_eq!(out.matches("=== Running").count(), 1);
    assert!(out.contains("ABORT ==="));
}

#[test]
fn test_tolerated_failures_keep_going() {
    let tmp = TempDir::new().unwrap();
    let descs = vec![
        descriptor(tmp.path(), json!({ "description": "first", "error": "over" })),
        descriptor(tmp.path(), json!({ "description": "second", "error": "over" })),
    ];
    let config = Config {
        nasm: PathBuf::from("/nonexistent/nasm"),
        ..Config::default()
    };
    let mut report = Reporter::new(Vec::new());
    let summary = run_all(&descs, &config, &mut report);
    assert_eq!(summary.tolerated, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.status(), RunStatus::Success);
    let out = String::from_utf8(report.into_inner()).unwrap();
    assert_eq!(out.matches("ERROR OVER").count(), 2);
}
