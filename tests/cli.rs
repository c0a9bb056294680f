use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const VIMBALL: &str = "\" Vimball Archiver\nUseVimball\nfinish\nplugin/hello.vim\t[[[1\n2\n\" hello\ncommand Hello echo 'hi'\ndoc/hello.txt\t[[[1\n1\n*hello.txt*\n";

#[test]
fn test_cli_dir_to_vimball_exact_output() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::create_dir(source_dir.path().join("a"))?;
    fs::write(source_dir.path().join("a/b.txt"), "hi")?;

    let out_dir = tempdir()?;
    let out = out_dir.path().join("out.vba");

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.arg("--to").arg("vba").arg(source_dir.path()).arg(&out);
    cmd.assert().success();

    let text = fs::read_to_string(&out)?;
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with('"'));
    assert_eq!(lines[1], "UseVimball\n");
    assert_eq!(lines[2], "finish\n");
    assert_eq!(lines[3..].concat(), "a/b.txt\t[[[1\n1\nhi\n");
    Ok(())
}

#[test]
fn test_cli_program_name_selects_zip() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    fs::write(work.path().join("hello.vba"), VIMBALL)?;

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.current_dir(work.path()).arg("hello.vba");
    cmd.assert().success().stdout(predicate::str::is_empty());

    let zip_path = work.path().join("hello.zip");
    assert!(zip_path.exists());
    let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path)?)?;
    let mut names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    names.sort();
    assert_eq!(names, vec!["doc/hello.txt", "plugin/hello.vim"]);
    let entry = archive.by_name("doc/hello.txt")?;
    assert_eq!(entry.size(), "*hello.txt*\n".len() as u64);
    Ok(())
}

#[test]
fn test_cli_vimball_to_directory() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    fs::write(work.path().join("hello.vba"), VIMBALL)?;

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.current_dir(work.path()).args(["-t", "dir", "hello.vba"]);
    cmd.assert().success();

    let root = work.path().join("hello");
    assert!(root.join("plugin").is_dir());
    assert_eq!(fs::read_to_string(root.join("plugin/hello.vim"))?, "\" hello\ncommand Hello echo 'hi'\n");
    assert_eq!(fs::read_to_string(root.join("doc/hello.txt"))?, "*hello.txt*\n");
    Ok(())
}

#[test]
fn test_cli_list_outputs() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.arg("--list-outputs");
    cmd.assert().success().stdout(
        predicate::str::contains("dir")
            .and(predicate::str::contains("vba.gz"))
            .and(predicate::str::contains("zip")),
    );
    Ok(())
}

#[test]
fn test_cli_wrong_argument_count_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.assert().code(1).stderr(predicate::str::contains("Usage"));

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.args(["one", "two", "three"]);
    cmd.assert().code(1).stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn test_cli_existing_directory_destination_fails() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    fs::write(work.path().join("hello.vba"), VIMBALL)?;
    let dest = work.path().join("taken");
    fs::create_dir(&dest)?;

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.args(["--to", "dir"]).arg(work.path().join("hello.vba")).arg(&dest);
    cmd.assert().code(1).stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_dir(&dest)?.count(), 0);
    Ok(())
}

#[test]
fn test_cli_malformed_vimball_fails() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let bad = work.path().join("bad.vba");
    fs::write(&bad, "UseVimball\nfinish\nfile.vim\t[[[1\nabc\n")?;

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.arg(&bad).arg(work.path().join("bad.zip"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("bad Vimball count").and(predicate::str::contains("bad.vba")));
    Ok(())
}

#[test]
fn test_cli_unsupported_source_fails() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let junk = work.path().join("junk.dat");
    fs::write(&junk, [0u8, 159, 146, 150])?;

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.args(["--to", "zip"]).arg(&junk);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported format").and(predicate::str::contains("junk.dat")));
    Ok(())
}

fn long_preamble_vimball() -> String {
    let mut text = String::new();
    for i in 0..200 {
        text.push_str(&format!("\" {i:03}: licensed under the same terms as Vim itself, see :help license\n"));
    }
    text.push_str("UseVimball\nfinish\nplugin/long.vim\t[[[1\n1\nlet g:long = 1\n");
    text
}

#[test]
fn test_cli_program_name_reads_vimball_past_probe_window() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    fs::write(work.path().join("long.vba"), long_preamble_vimball())?;

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.current_dir(work.path()).arg("long.vba");
    cmd.assert().success();

    let mut archive = zip::ZipArchive::new(fs::File::open(work.path().join("long.zip"))?)?;
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.by_index(0)?.name(), "plugin/long.vim");
    Ok(())
}

#[test]
fn test_cli_from_flag_overrides_detection() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let src = work.path().join("long.vba");
    fs::write(&src, long_preamble_vimball())?;
    let out = work.path().join("out");

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.args(["--to", "dir"]).arg(&src).arg(&out);
    cmd.assert().code(1).stderr(predicate::str::contains("unsupported format"));
    assert!(!out.exists());

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.args(["--from", "vba", "--to", "dir"]).arg(&src).arg(&out);
    cmd.assert().success();
    assert_eq!(fs::read_to_string(out.join("plugin/long.vim"))?, "let g:long = 1\n");
    Ok(())
}

#[test]
fn test_cli_logs_destination_once() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    fs::write(work.path().join("hello.vba"), VIMBALL)?;

    let mut cmd = Command::cargo_bin("vba2zip")?;
    cmd.current_dir(work.path()).env("RUST_LOG", "info").arg("hello.vba");
    let output = cmd.assert().success().get_output().clone();
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(stderr.matches("hello.zip").count(), 1, "{stderr}");
    Ok(())
}
