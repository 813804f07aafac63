#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const HEARTBEAT: &str = "fd090000000101000000000000000203510303e292";
const PING_WIRE: &str = "fd04000000ff00010000070000008dfd";

const PING_DIALECT: &str = r#"{
  "dialect": "ping-only",
  "version": 1,
  "messages": [
    { "id": 1, "name": "PING", "fields": [ { "name": "seq", "type": "uint32_t" } ] }
  ]
}"#;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/mavwire-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn mavwire() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mavwire"));
    cmd.arg("--log-level").arg("error");
    cmd.env_remove("MAVWIRE_TARGET")
        .env_remove("MAVWIRE_DIALECT")
        .env_remove("MAVWIRE_CONFIG");
    cmd
}

fn run_with_stdin(mut cmd: Command, stdin: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("command should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept input");
    child.wait_with_output().expect("command should finish")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

#[test]
fn decode_hex_file_prints_records() {
    let dir = unique_temp_dir("decode-hex");
    let input = dir.join("capture.hex");
    std::fs::write(&input, format!("{HEARTBEAT}\n{HEARTBEAT}\n")).unwrap();

    let output = mavwire()
        .args(["--format", "json", "decode", "--hex", "--input"])
        .arg(&input)
        .output()
        .expect("decode should run");

    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["MSGNAME"], "HEARTBEAT");
    assert_eq!(lines[0]["SYSID"], 1);
    assert_eq!(lines[0]["base_mode"], 81);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_stdin_reports_corrupt_frames_and_keeps_going() {
    let good = hex::decode(HEARTBEAT).unwrap();
    let mut bad = good.clone();
    bad[12] ^= 0x40;

    let mut stream = vec![0x11, 0x22];
    stream.extend(&bad);
    stream.extend(&good);

    let mut cmd = mavwire();
    cmd.args(["--format", "json", "decode", "--chunk", "3"]);
    let output = run_with_stdin(cmd, &stream);

    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["channel"], "DECODE_ERROR");
    assert_eq!(lines[0]["MSGID"], 65535);
    assert_eq!(lines[0]["ERROR_TYPE"], "CHECKSUM_FAILURE");
    assert_eq!(lines[0]["RAW_DATA"], hex::encode(&bad));
    assert_eq!(lines[1]["MSGNAME"], "HEARTBEAT");
}

#[test]
fn decode_target_filter_drops_other_systems() {
    let mut cmd = mavwire();
    cmd.args(["--format", "json", "decode", "--hex", "--target", "9"]);
    let output = run_with_stdin(cmd, HEARTBEAT.as_bytes());

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn encode_with_custom_dialect_matches_reference_frame() {
    let dir = unique_temp_dir("encode-ping");
    let dialect = dir.join("ping.json");
    std::fs::write(&dialect, PING_DIALECT).unwrap();

    let output = mavwire()
        .arg("--dialect")
        .arg(&dialect)
        .args(["--format", "pretty", "encode", "--hex", "--json"])
        .arg(r#"{"MSGNAME":"PING","seq":7}"#)
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), PING_WIRE);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn encode_raw_output_decodes_back() {
    let encoded = mavwire()
        .args(["encode", "--sysid", "1", "--compid", "1", "--json"])
        .arg(r#"[{"MSGNAME":"HEARTBEAT","type":2,"autopilot":3,"base_mode":81,"system_status":3,"mavlink_version":3},{"MSGNAME":"HEARTBEAT"}]"#)
        .output()
        .expect("encode should run");
    assert!(encoded.status.success());
    assert_eq!(encoded.stdout.len(), 42);
    assert_eq!(hex::encode(&encoded.stdout[..21]), HEARTBEAT);

    let mut cmd = mavwire();
    cmd.args(["--format", "json", "decode"]);
    let decoded = run_with_stdin(cmd, &encoded.stdout);
    let lines = json_lines(&decoded);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["SEQ"], 0);
    assert_eq!(lines[0]["base_mode"], 81);
    assert_eq!(lines[1]["SEQ"], 1);
    assert_eq!(lines[1]["SYSID"], 1);
}

#[test]
fn encode_unknown_message_exits_data_invalid() {
    let output = mavwire()
        .args(["encode", "--hex", "--json", r#"{"MSGNAME":"NOT_A_MESSAGE"}"#])
        .output()
        .expect("encode should run");

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown message type: NOT_A_MESSAGE"));
}

#[test]
fn messages_shows_layout() {
    let output = mavwire()
        .args(["--format", "json", "messages", "heartbeat"])
        .output()
        .expect("messages should run");

    assert!(output.status.success());
    let layout = &json_lines(&output)[0];
    assert_eq!(layout["name"], "HEARTBEAT");
    assert_eq!(layout["length"], 9);
    assert_eq!(layout["crc_extra"], 50);
}

#[test]
fn missing_dialect_file_fails() {
    let output = mavwire()
        .args(["--dialect", "/nonexistent/dialect.json", "messages"])
        .output()
        .expect("messages should run");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn version_prints_package_version() {
    let output = mavwire().arg("version").output().expect("version should run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("mavwire {}", env!("CARGO_PKG_VERSION"))
    );
}
