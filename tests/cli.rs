use assert_cmd::Command;

fn oiltype() -> Command {
    Command::cargo_bin("oiltype").unwrap()
}

#[test]
fn list_modes_prints_every_mode() {
    let out = oiltype().arg("--list-modes").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    for mode in oiltype::Mode::ALL {
        assert!(stdout.contains(&mode.to_string()), "missing {mode}");
    }
}

#[test]
fn list_sets_prints_builtin_sets() {
    let out = oiltype().arg("--list-sets").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.lines().any(|l| l == "default"));
    assert!(stdout.lines().any(|l| l == "pro"));
}

#[test]
fn malformed_word_pair_is_rejected() {
    oiltype().args(["--word", "abura"]).assert().failure();
}

#[test]
fn unknown_word_set_is_rejected() {
    oiltype().args(["--set", "missing"]).assert().failure();
}

#[test]
fn refuses_to_run_without_a_tty() {
    let out = oiltype()
        .args(["--word", "油=abura"])
        .write_stdin("abura")
        .assert()
        .failure();
    let stderr = String::from_utf8(out.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("tty"));
}
