//! End-to-end tests for the `sha-engine` binary.
//!
//! | Code | Meaning                                  |
//! |------|------------------------------------------|
//! |  0   | Success                                  |
//! |  1   | Operation failed (bad input, self-test)  |
//! |  2   | Command line rejected                    |

use assert_cmd::Command;

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

// ============================================================================
// Test Infrastructure
// ============================================================================

fn sha_engine() -> Command {
    let mut command = Command::cargo_bin("sha-engine").expect("sha-engine binary must be built");
    command.env_remove("SHA_ENGINE_POLICY").env_remove("SHA_ENGINE_LANES");
    command
}

fn stdout_of(command: &mut Command) -> String {
    let output = command.output().expect("failed to run sha-engine");
    assert!(
        output.status.success(),
        "sha-engine failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 stdout").trim().to_owned()
}

// ============================================================================
// digest
// ============================================================================

#[test]
fn digest_defaults_to_sha256() {
    assert_eq!(stdout_of(sha_engine().args(["digest", "abc"])), ABC_SHA256);
}

#[test]
fn digest_reads_standard_input() {
    assert_eq!(
        stdout_of(sha_engine().arg("digest").write_stdin("abc")),
        ABC_SHA256
    );
}

#[test]
fn digest_every_variant() {
    assert_eq!(
        stdout_of(sha_engine().args(["digest", "--variant", "sha160", "abc"])),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_eq!(
        stdout_of(sha_engine().args(["digest", "--variant", "sha512", "abc"])),
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
}

#[test]
fn double_digest_rehashes_raw_bytes() {
    let first = stdout_of(sha_engine().args(["digest", "abc"]));
    let second = stdout_of(sha_engine().args(["digest", "--hex", &first]));
    assert_eq!(
        stdout_of(sha_engine().args(["digest", "--double", "abc"])),
        second
    );
}

#[test]
fn policy_does_not_change_the_digest() {
    for policy in ["scalar", "vector", "native", "all"] {
        let output = sha_engine()
            .args(["digest", "--policy", policy, "abc"])
            .output()
            .expect("failed to run sha-engine");
        // A forced tier the machine lacks is a reported failure, not a wrong digest.
        if output.status.success() {
            assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), ABC_SHA256);
        } else {
            assert_eq!(output.status.code(), Some(1));
        }
    }
}

#[test]
fn environment_policy_is_honoured() {
    sha_engine()
        .env("SHA_ENGINE_POLICY", "scalar")
        .args(["digest", "abc"])
        .assert()
        .success()
        .stdout(format!("{ABC_SHA256}\n"));

    sha_engine()
        .env("SHA_ENGINE_POLICY", "warp")
        .args(["digest", "abc"])
        .assert()
        .code(1);
}

#[test]
fn command_line_policy_wins_over_invalid_environment() {
    sha_engine()
        .env("SHA_ENGINE_POLICY", "turbo")
        .env("SHA_ENGINE_LANES", "3")
        .args(["digest", "--policy", "scalar", "--lanes", "4", "abc"])
        .assert()
        .success()
        .stdout(format!("{ABC_SHA256}\n"));
}

#[test]
fn invalid_lane_count_is_a_usage_error() {
    for lanes in ["3", "0", "32", "x"] {
        sha_engine()
            .args(["digest", "--lanes", lanes, "abc"])
            .assert()
            .code(2);
    }
    sha_engine()
        .args(["selftest", "--lanes", "5"])
        .assert()
        .code(2);
}

// ============================================================================
// merkle
// ============================================================================

#[test]
fn merkle_of_two_leaves_matches_double_digest_of_concatenation() {
    let leaf = ABC_SHA256;
    let joined = format!("{leaf}{leaf}");
    let expected = stdout_of(sha_engine().args(["digest", "--double", "--hex", &joined]));
    assert_eq!(stdout_of(sha_engine().args(["merkle", leaf, leaf])), expected);
}

#[test]
fn merkle_rejects_sha160() {
    sha_engine()
        .args(["merkle", "--variant", "sha160", "a9993e364706816aba3e25717850c26c9cd0d89d"])
        .assert()
        .code(2);
}

#[test]
fn merkle_rejects_malformed_hex() {
    sha_engine().args(["merkle", "xyz0"]).assert().code(1);
}

// ============================================================================
// caps / selftest
// ============================================================================

#[test]
fn caps_reports_each_variant() {
    let report = stdout_of(sha_engine().arg("caps"));
    for name in ["sha160", "sha256", "sha512"] {
        assert!(report.contains(name), "missing {name} in:\n{report}");
    }
    assert!(report.contains("available: scalar"));
}

#[test]
fn selftest_passes_on_every_tier() {
    for policy in ["scalar", "vector", "native", "all"] {
        let report = stdout_of(sha_engine().args(["selftest", "--policy", policy]));
        assert!(report.ends_with("all checks passed"), "{policy}:\n{report}");
    }
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    sha_engine().assert().code(2);
}
