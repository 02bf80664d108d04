use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn snipmark_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("snipmark").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn snipmark_help_prints_usage() {
    let temp = TempDir::new().unwrap();
    snipmark_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Screenshot annotation and clipboard transfer engine",
        ));
}

#[test]
fn no_flags_prints_usage() {
    let temp = TempDir::new().unwrap();
    snipmark_cmd(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("snipmark --transfer FILE"));
}

#[test]
fn chunk_size_requires_transfer_flag() {
    let temp = TempDir::new().unwrap();
    snipmark_cmd(&temp)
        .args(["--chunk-size", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn dump_config_reads_config_home() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("snipmark");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[transfer]\nchunk_size = 4096\nbusy_policy = \"queue\"\n",
    )
    .unwrap();

    snipmark_cmd(&temp)
        .arg("--dump-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("chunk_size = 4096"))
        .stdout(predicate::str::contains("busy_policy = \"queue\""));
}

#[test]
fn small_payload_is_sent_in_one_write() {
    let temp = TempDir::new().unwrap();
    let payload = temp.path().join("small.bin");
    std::fs::write(&payload, [7u8; 10]).unwrap();

    snipmark_cmd(&temp)
        .arg("--transfer")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("single write: 10 bytes"))
        .stdout(predicate::str::contains("reassembly verified"));
}

#[test]
fn large_payload_is_chunked_and_reassembled() {
    let temp = TempDir::new().unwrap();
    let payload = temp.path().join("large.bin");
    let bytes: Vec<u8> = (0..25u8).collect();
    std::fs::write(&payload, bytes).unwrap();

    snipmark_cmd(&temp)
        .arg("--transfer")
        .arg(&payload)
        .args(["--chunk-size", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("incr: announced 25 bytes"))
        .stdout(predicate::str::contains("chunk 3: bytes 20..25"))
        .stdout(predicate::str::contains("terminal: zero-length write"))
        .stdout(predicate::str::contains(
            "Transferred 25 bytes in 3 chunk(s); reassembly verified",
        ));
}

#[test]
fn targets_request_lists_supported_targets() {
    let temp = TempDir::new().unwrap();
    let payload = temp.path().join("payload.bin");
    std::fs::write(&payload, [1u8; 4]).unwrap();

    snipmark_cmd(&temp)
        .arg("--transfer")
        .arg(&payload)
        .args(["--target", "TARGETS"])
        .assert()
        .success()
        .stdout(predicate::str::contains("targets: 2 atom(s)"));
}

#[test]
fn missing_payload_file_fails() {
    let temp = TempDir::new().unwrap();
    snipmark_cmd(&temp)
        .arg("--transfer")
        .arg(temp.path().join("missing.bin"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read payload"));
}

#[test]
fn version_carries_build_stamp() {
    let temp = TempDir::new().unwrap();
    snipmark_cmd(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^snipmark \d+\.\d+\.\d+ \([0-9a-z-]+\)\n$").unwrap());
}
