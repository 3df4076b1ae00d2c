//! Command-line front end: capability report, self-test, digests and Merkle
//! roots.

use std::env;
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use logging::VerbosityConfig;
use sha::{
    Bytes, Capabilities, Config, ConfigError, DigestLengthError, DispatchError, Engine, LANES_ENV,
    POLICY_ENV, Policy, Sha160, Sha256, Sha512, Variant,
};
use thiserror::Error;

const PROGRAM_NAME: &str = "sha-engine";
const VARIANTS: [&str; 3] = ["sha160", "sha256", "sha512"];
const MERKLE_VARIANTS: [&str; 2] = ["sha256", "sha512"];

/// Exit status for a failed operation.
const FAILURE_EXIT_CODE: u8 = 1;
/// Exit status for a rejected command line.
const USAGE_EXIT_CODE: u8 = 2;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("leaf {index}: {source}")]
    Leaf {
        index: usize,
        source: DigestLengthError,
    },
    #[error("invalid hex input: {0}")]
    Hex(String),
    #[error("{0} cannot be double hashed: its digest does not fill half a block")]
    NoDouble(&'static str),
    #[error("merkle root needs at least one digest")]
    NoLeaves,
    #[error("self-test failed: {0} check(s) did not match")]
    SelfTest(usize),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

fn policy_arg() -> Arg {
    Arg::new("policy")
        .long("policy")
        .value_name("POLICY")
        .help("Execution policy: scalar, vector, native or all (default from SHA_ENGINE_POLICY).")
        .value_parser(|text: &str| text.parse::<Policy>().map_err(|e| e.to_string()))
}

fn lanes_arg() -> Arg {
    Arg::new("lanes")
        .long("lanes")
        .value_name("N")
        .help("Vector lane count: 2, 4, 8 or 16 (default from SHA_ENGINE_LANES).")
        .value_parser(parse_lanes)
}

/// Lane counts are validated while parsing so a bad value is a usage error.
fn parse_lanes(text: &str) -> Result<usize, String> {
    let lanes = text
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidLanes(text.to_owned()).to_string())?;
    Config::default()
        .with_lanes(lanes)
        .map(|_| lanes)
        .map_err(|error| error.to_string())
}

fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multi-strategy SHA engine diagnostics")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase diagnostic output; repeat for more.")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(Command::new("caps").about("Report detected CPU features and selected tiers."))
        .subcommand(
            Command::new("selftest")
                .about("Check every available tier against known digests.")
                .arg(policy_arg())
                .arg(lanes_arg()),
        )
        .subcommand(
            Command::new("digest")
                .about("Hash TEXT (or standard input) and print the hex digest.")
                .arg(
                    Arg::new("variant")
                        .long("variant")
                        .value_name("VARIANT")
                        .default_value("sha256")
                        .value_parser(VARIANTS),
                )
                .arg(
                    Arg::new("double")
                        .long("double")
                        .help("Hash the digest a second time.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("hex")
                        .long("hex")
                        .help("Treat TEXT as hex-encoded bytes.")
                        .action(ArgAction::SetTrue),
                )
                .arg(policy_arg())
                .arg(lanes_arg())
                .arg(Arg::new("text").value_name("TEXT")),
        )
        .subcommand(
            Command::new("merkle")
                .about("Print the Merkle root of hex-encoded leaf digests.")
                .arg(
                    Arg::new("variant")
                        .long("variant")
                        .value_name("VARIANT")
                        .default_value("sha256")
                        .value_parser(MERKLE_VARIANTS),
                )
                .arg(policy_arg())
                .arg(lanes_arg())
                .arg(
                    Arg::new("leaves")
                        .value_name("HEX")
                        .action(ArgAction::Append)
                        .num_args(1..)
                        .required(true),
                ),
        )
}

/// Parses `args`, runs the selected command and maps the outcome to an exit
/// status. Output goes to `stdout`; diagnostics go to `stderr`.
#[must_use]
pub fn run_with<I, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let matches = match clap_command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => {
            let rendered = error.render().to_string();
            return if error.use_stderr() {
                let _ = write!(stderr, "{rendered}");
                ExitCode::from(USAGE_EXIT_CODE)
            } else {
                let _ = write!(stdout, "{rendered}");
                ExitCode::SUCCESS
            };
        }
    };

    logging::init_tracing(VerbosityConfig::from_verbose_level(matches.get_count("verbose")));

    match run(&matches, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

fn run<Out: Write>(matches: &ArgMatches, stdout: &mut Out) -> Result<(), CliError> {
    match matches.subcommand() {
        Some(("caps", _)) => caps(stdout),
        Some(("selftest", sub)) => selftest(&config_from(sub)?, stdout),
        Some(("digest", sub)) => digest(sub, stdout),
        Some(("merkle", sub)) => merkle(sub, stdout),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn config_from(matches: &ArgMatches) -> Result<Config, CliError> {
    resolve_config(
        matches,
        env::var(POLICY_ENV).ok().as_deref(),
        env::var(LANES_ENV).ok().as_deref(),
    )
}

/// Command-line values override the environment; an environment value is
/// only parsed when the matching option is absent.
fn resolve_config(
    matches: &ArgMatches,
    policy_env: Option<&str>,
    lanes_env: Option<&str>,
) -> Result<Config, CliError> {
    let policy = matches
        .get_one::<Policy>("policy")
        .map(|policy| policy.as_str())
        .or(policy_env);
    let lanes = matches.get_one::<usize>("lanes").map(usize::to_string);
    Ok(Config::from_vars(policy, lanes.as_deref().or(lanes_env))?)
}

fn engine<V: Variant>(config: Config) -> Result<Engine<V>, CliError> {
    Ok(Engine::<V>::new(config, Capabilities::detect())?)
}

// ============================================================================
// Hex
// ============================================================================

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>, CliError> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(CliError::Hex(format!("odd number of digits in '{text}'")));
    }
    text.as_bytes()
        .chunks_exact(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(high), Some(low)) => Ok((high << 4) | low),
            _ => Err(CliError::Hex(format!("non-hex digit in '{text}'"))),
        })
        .collect()
}

fn encode_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

// ============================================================================
// Commands
// ============================================================================

fn caps<Out: Write>(stdout: &mut Out) -> Result<(), CliError> {
    let caps = Capabilities::detect();
    writeln!(stdout, "features: {caps}")?;
    writeln!(stdout, "vector bits: {}", caps.vector_bits())?;
    describe::<Sha160>(caps, stdout)?;
    describe::<Sha256>(caps, stdout)?;
    describe::<Sha512>(caps, stdout)?;
    Ok(())
}

fn describe<V: Variant>(caps: Capabilities, stdout: &mut impl Write) -> Result<(), CliError> {
    let available: Vec<&str> = [Policy::Scalar, Policy::Vector, Policy::Native]
        .into_iter()
        .filter(|&policy| Engine::<V>::new(Config::new(policy), caps).is_ok())
        .map(Policy::as_str)
        .collect();
    let best = Engine::<V>::new(Config::default(), caps)?;
    writeln!(
        stdout,
        "{}: {} tier, {} lane(s); available: {}",
        V::NAME,
        best.tier(),
        best.lanes(),
        available.join(" ")
    )?;
    Ok(())
}

fn digest<Out: Write>(matches: &ArgMatches, stdout: &mut Out) -> Result<(), CliError> {
    let config = config_from(matches)?;
    let double = matches.get_flag("double");

    let message = match matches.get_one::<String>("text") {
        Some(text) if matches.get_flag("hex") => decode_hex(text)?,
        Some(text) => text.clone().into_bytes(),
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            if matches.get_flag("hex") {
                decode_hex(&String::from_utf8_lossy(&buf))?
            } else {
                buf
            }
        }
    };

    let variant = matches.get_one::<String>("variant").map_or("sha256", String::as_str);
    let hex = match (variant, double) {
        ("sha160", true) => return Err(CliError::NoDouble(Sha160::NAME)),
        ("sha160", false) => single::<Sha160>(config, &message)?,
        ("sha512", false) => single::<Sha512>(config, &message)?,
        ("sha512", true) => double_of::<Sha512>(config, &message)?,
        (_, false) => single::<Sha256>(config, &message)?,
        (_, true) => double_of::<Sha256>(config, &message)?,
    };
    writeln!(stdout, "{hex}")?;
    Ok(())
}

fn single<V: Variant>(config: Config, message: &[u8]) -> Result<String, CliError> {
    Ok(encode_hex(engine::<V>(config)?.hash_message(message).as_ref()))
}

fn double_of<V: Variant>(config: Config, message: &[u8]) -> Result<String, CliError> {
    Ok(encode_hex(engine::<V>(config)?.double_hash_message(message).as_ref()))
}

fn merkle<Out: Write>(matches: &ArgMatches, stdout: &mut Out) -> Result<(), CliError> {
    let config = config_from(matches)?;
    let leaves: Vec<&String> = matches.get_many::<String>("leaves").map(Iterator::collect).unwrap_or_default();
    if leaves.is_empty() {
        return Err(CliError::NoLeaves);
    }

    let root = match matches.get_one::<String>("variant").map(String::as_str) {
        Some("sha512") => merkle_of::<Sha512>(config, &leaves)?,
        _ => merkle_of::<Sha256>(config, &leaves)?,
    };
    writeln!(stdout, "{root}")?;
    Ok(())
}

fn merkle_of<V: Variant>(config: Config, leaves: &[&String]) -> Result<String, CliError> {
    let digests = leaves
        .iter()
        .enumerate()
        .map(|(index, text)| {
            sha::digest_from_slice::<V>(&decode_hex(text)?)
                .map_err(|source| CliError::Leaf { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode_hex(engine::<V>(config)?.merkle_root(digests).as_ref()))
}

// ============================================================================
// Self-test
// ============================================================================

struct Known {
    message: &'static [u8],
    sha160: &'static str,
    sha256: &'static str,
    sha512: &'static str,
}

const KNOWN: [Known; 2] = [
    Known {
        message: b"",
        sha160: "da39a3ee5e6b4b0d3255bfef95601890afd80709",
        sha256: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        sha512: "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
                 47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
    },
    Known {
        message: b"abc",
        sha160: "a9993e364706816aba3e25717850c26c9cd0d89d",
        sha256: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        sha512: "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                 2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
    },
];

fn selftest<Out: Write>(config: &Config, stdout: &mut Out) -> Result<(), CliError> {
    let mut failures = 0;
    failures += check_variant::<Sha160>(*config, |k| k.sha160, stdout)?;
    failures += check_variant::<Sha256>(*config, |k| k.sha256, stdout)?;
    failures += check_variant::<Sha512>(*config, |k| k.sha512, stdout)?;
    failures += check_batches::<Sha256>(*config, stdout)?;
    failures += check_batches::<Sha512>(*config, stdout)?;

    if failures == 0 {
        writeln!(stdout, "all checks passed")?;
        Ok(())
    } else {
        Err(CliError::SelfTest(failures))
    }
}

fn report(stdout: &mut impl Write, ok: bool, label: &str) -> Result<usize, CliError> {
    writeln!(stdout, "{} {label}", if ok { "ok  " } else { "FAIL" })?;
    Ok(usize::from(!ok))
}

/// Known digests on the configured engine, skipping variants whose forced
/// tier is unavailable.
fn check_variant<V: Variant>(
    config: Config,
    expected: impl Fn(&Known) -> &'static str,
    stdout: &mut impl Write,
) -> Result<usize, CliError> {
    let engine = match Engine::<V>::new(config, Capabilities::detect()) {
        Ok(engine) => engine,
        Err(error) => {
            writeln!(stdout, "skip {}: {error}", V::NAME)?;
            return Ok(0);
        }
    };

    let mut failures = 0;
    for known in &KNOWN {
        let ok = encode_hex(engine.hash_message(known.message).as_ref()) == expected(known);
        let label = format!("{} {} tier, {}-byte message", V::NAME, engine.tier(), known.message.len());
        failures += report(stdout, ok, &label)?;
    }
    Ok(failures)
}

/// Batched and Merkle results of the configured engine against the scalar
/// engine.
fn check_batches<V: Variant>(config: Config, stdout: &mut impl Write) -> Result<usize, CliError> {
    let Ok(engine) = Engine::<V>::new(config, Capabilities::detect()) else {
        return Ok(0);
    };
    let scalar = Engine::<V>::scalar();

    let blocks: Vec<V::Block> = (0..37u8)
        .map(|seed| {
            let mut block = V::Block::zeroed();
            for (i, byte) in block.as_mut().iter_mut().enumerate() {
                *byte = seed.wrapping_mul(31).wrapping_add(i as u8);
            }
            block
        })
        .collect();

    let expected: Vec<V::Digest> = blocks.iter().map(|block| scalar.hash_block(block)).collect();
    let label = format!("{} {} tier, {} lane(s), batch of {}", V::NAME, engine.tier(), engine.lanes(), blocks.len());
    let mut failures = report(stdout, engine.hash_each(&blocks) == expected, &label)?;

    let label = format!("{} {} tier, merkle root of {}", V::NAME, engine.tier(), expected.len());
    failures += report(
        stdout,
        engine.merkle_root(expected.clone()) == scalar.merkle_root(expected),
        &label,
    )?;
    Ok(failures)
}
