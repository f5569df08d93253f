use super::*;
use pretty_assertions::assert_eq;

fn render(f: impl FnOnce(&mut Reporter<Vec<u8>>)) -> String {
    let mut report = Reporter::new(Vec::new());
    f(&mut report);
    String::from_utf8(report.into_inner()).unwrap()
}

#[test]
fn test_banners() {
    let out = render(|r| {
        r.running("t/a");
        r.pass("t/a");
        r.fail("t/b", "stdout mismatch");
        r.error_over("t/b");
        r.skip("t/c", "needs elf");
        r.abort("t/d", "Error detected");
        r.updated("t/e");
    });
    assert_eq!(
        out,
        "=== Running t/a ===\n\
         === Test t/a PASS ===\n\
         \tt/b: stdout mismatch\n\
         === Test t/b FAIL ===\n\
         === Test t/b ERROR OVER ===\n\
         \tt/c: needs elf\n\
         === Test t/c SKIP ===\n\
         \tt/d: Error detected\n\
         === Test t/d ABORT ===\n\
         === Test t/e UPDATED ===\n"
    );
}

#[test]
fn test_show_std_indents_every_line() {
    let out = render(|r| r.show_std("stdout", "one\ntwo\n"));
    assert_eq!(out, "\t--- stdout\n\tone\n\ttwo\n\t\n\t---\n");
}

#[test]
fn test_text_mismatch_includes_diff() {
    let out = render(|r| r.text_mismatch("t/a.stdout", "x\n", "stdout", "y\n"));
    assert_eq!(
        out,
        "\t--- t/a.stdout\n\tx\n\t\n\t--- stdout\n\ty\n\t\n\
         \t--- t/a.stdout\n\t+++ stdout\n\t@@ -1,2 +1,2 @@\n\t-x\n\t+y\n\t \n\t---\n"
    );
}

#[test]
fn test_binary_mismatch_dumps_both_files() {
    let out = render(|r| {
        r.binary_mismatch(Path::new("a.t"), &[0x90], Path::new("a"), &[0xc3])
    });
    assert!(out.contains("\t--- hexdump a.t\n\t00000000   90"));
    assert!(out.contains("\t--- hexdump a\n\t00000000   c3"));
    assert!(out.contains("\t--- a.t\n\t+++ a\n"));
    assert!(out.ends_with("\t---\n"));
}

#[test]
fn test_list_entry_alignment() {
    let out = render(|r| {
        r.list_entry("Name", "Description");
        r.list_entry("t/br3392", "Single test");
    });
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], format!("{:<32} Description", "Name"));
    assert_eq!(&lines[1][..9], "t/br3392 ");
    assert_eq!(&lines[1][33..], "Single test");
}
