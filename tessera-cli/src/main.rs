//! Tessera CLI - ML-DSA signature verification tool.

use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tessera_ml_dsa::params::ALL;
use tessera_ml_dsa::{
    MatrixProvider, ParameterSet, ShakeExpander, Verifier, MAX_CONTEXT_LEN, ML_DSA_44, ML_DSA_65, ML_DSA_87,
};

/// ML-DSA signature verification tool
#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an ML-DSA signature
    Verify {
        /// Path to the public key file
        #[arg(long = "pub")]
        pubkey: PathBuf,

        /// Input file that was signed
        #[arg(short, long)]
        input: PathBuf,

        /// Signature file
        #[arg(short, long)]
        signature: PathBuf,

        /// Parameter set (detected from the key size if not specified)
        #[arg(short, long, value_enum)]
        params: Option<Params>,

        /// Context string (UTF-8, at most 255 bytes)
        #[arg(long, conflicts_with = "context_hex")]
        context: Option<String>,

        /// Context string as hex
        #[arg(long)]
        context_hex: Option<String>,

        /// Precomputed public matrix (see `expand-matrix`)
        #[arg(long)]
        matrix: Option<PathBuf>,
    },

    /// Expand the public matrix of a key into the compact 23-bit encoding
    ExpandMatrix {
        /// Path to the public key file
        #[arg(long = "pub")]
        pubkey: PathBuf,

        /// Output file for the matrix
        #[arg(short, long)]
        output: PathBuf,

        /// Parameter set (detected from the key size if not specified)
        #[arg(short, long, value_enum)]
        params: Option<Params>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "hex")]
        format: OutputFormat,
    },

    /// Display information about supported parameter sets
    Info,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Params {
    /// ML-DSA-44 (NIST Security Level 2, 128-bit)
    #[value(name = "ml-dsa-44")]
    MlDsa44,
    /// ML-DSA-65 (NIST Security Level 3, 192-bit)
    #[value(name = "ml-dsa-65")]
    MlDsa65,
    /// ML-DSA-87 (NIST Security Level 5, 256-bit)
    #[value(name = "ml-dsa-87")]
    MlDsa87,
}

impl Params {
    fn parameter_set(self) -> ParameterSet {
        match self {
            Params::MlDsa44 => ML_DSA_44,
            Params::MlDsa65 => ML_DSA_65,
            Params::MlDsa87 => ML_DSA_87,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Hexadecimal encoding
    Hex,
    /// Base64 encoding
    Base64,
    /// PEM format
    Pem,
}

/// Encode bytes to the specified format
fn encode_output(data: &[u8], format: OutputFormat, label: &str) -> String {
    match format {
        OutputFormat::Hex => hex::encode(data),
        OutputFormat::Base64 => BASE64.encode(data),
        OutputFormat::Pem => {
            let wrapped: String = BASE64
                .encode(data)
                .as_bytes()
                .chunks(64)
                .map(String::from_utf8_lossy)
                .collect::<Vec<_>>()
                .join("\n");
            format!("-----BEGIN {label}-----\n{wrapped}\n-----END {label}-----")
        }
    }
}

/// Check if a string is valid hexadecimal
fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Decode bytes with auto-detection of format.
/// Detection order: PEM (by header) -> Hex (if all hex chars) -> Base64.
fn decode_input(data: &str) -> Result<Vec<u8>> {
    let data = data.trim();

    if data.starts_with("-----BEGIN") {
        let lines: Vec<&str> = data.lines().collect();
        if lines.len() < 3 {
            bail!("Invalid PEM format");
        }
        let b64: String = lines[1..lines.len() - 1].join("");
        return BASE64
            .decode(&b64)
            .context("Failed to decode PEM base64 content");
    }

    if is_hex(data) && data.len() % 2 == 0 {
        return hex::decode(data).context("Failed to decode hex");
    }

    BASE64.decode(data).context("Failed to decode base64")
}

fn read_encoded(path: &Path, what: &str) -> Result<Vec<u8>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {what} file"))?;
    decode_input(&text)
}

/// Detect the parameter set from a public key size
fn detect_params_from_pk(key_size: usize) -> Result<ParameterSet> {
    ALL.iter()
        .copied()
        .find(|p| p.public_key_bytes() == key_size)
        .ok_or_else(|| {
            anyhow!(
                "Unknown public key size: {} bytes. Expected ML-DSA (1312/1952/2592).",
                key_size
            )
        })
}

/// Use the explicit parameter set if given, otherwise detect from the key
fn resolve_params(explicit: Option<Params>, pk_bytes: &[u8]) -> Result<ParameterSet> {
    match explicit {
        Some(p) => {
            let params = p.parameter_set();
            if pk_bytes.len() != params.public_key_bytes() {
                bail!(
                    "Key size {} bytes does not match {} (expected {} bytes)",
                    pk_bytes.len(),
                    params,
                    params.public_key_bytes()
                );
            }
            Ok(params)
        }
        None => detect_params_from_pk(pk_bytes.len()),
    }
}

fn parse_context(context: Option<&str>, context_hex: Option<&str>) -> Result<Vec<u8>> {
    let ctx = match (context, context_hex) {
        (Some(s), _) => s.as_bytes().to_vec(),
        (None, Some(h)) => hex::decode(h.trim()).context("Failed to decode context hex")?,
        (None, None) => Vec::new(),
    };
    if ctx.len() > MAX_CONTEXT_LEN {
        bail!(
            "Context is {} bytes; at most {} are allowed",
            ctx.len(),
            MAX_CONTEXT_LEN
        );
    }
    Ok(ctx)
}

struct VerifyArgs<'a> {
    pubkey: &'a Path,
    input: &'a Path,
    signature: &'a Path,
    params: Option<Params>,
    context: Option<&'a str>,
    context_hex: Option<&'a str>,
    matrix: Option<&'a Path>,
}

/// Verify a signature on a file
fn cmd_verify(args: &VerifyArgs<'_>, verbose: bool) -> Result<()> {
    let pk_bytes = read_encoded(args.pubkey, "public key")?;
    let params = resolve_params(args.params, &pk_bytes)?;
    let context = parse_context(args.context, args.context_hex)?;

    if verbose {
        eprintln!("Parameter set: {params}");
        eprintln!("Public key size: {} bytes", pk_bytes.len());
        eprintln!("Context size: {} bytes", context.len());
    }

    let verifier = Verifier::new(params).map_err(|e| anyhow!("Unsupported parameter set: {e}"))?;
    let mut pk = verifier
        .public_key(&pk_bytes)
        .map_err(|e| anyhow!("Invalid public key: {e}"))?;

    if let Some(path) = args.matrix {
        let bytes = read_encoded(path, "matrix")?;
        let matrix = tessera_ml_dsa::Matrix::from_compact_bytes(&bytes, params.k, params.l)
            .map_err(|e| anyhow!("Invalid matrix: {e}"))?;
        pk = pk.with_matrix(matrix).map_err(|e| anyhow!("Invalid matrix: {e}"))?;
        if verbose {
            eprintln!("Using precomputed matrix ({} bytes)", bytes.len());
        }
    }

    let message = fs::read(args.input).context("Failed to read input file")?;
    let sig_bytes = read_encoded(args.signature, "signature")?;

    if verbose {
        eprintln!("Message size: {} bytes", message.len());
        eprintln!(
            "Signature size: {} bytes (expected {})",
            sig_bytes.len(),
            params.signature_bytes()
        );
    }

    let start = Instant::now();
    let valid = verifier
        .verify(&pk, &message, &sig_bytes, &context)
        .map_err(|e| anyhow!("Verification could not complete: {e}"))?;

    if verbose {
        eprintln!("Verification took {:?}", start.elapsed());
    }

    if valid {
        println!("Signature is valid.");
        Ok(())
    } else {
        bail!("Signature verification failed.")
    }
}

/// Expand and write the public matrix for a key
fn cmd_expand_matrix(
    pubkey: &Path,
    output: &Path,
    params: Option<Params>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let pk_bytes = read_encoded(pubkey, "public key")?;
    let params = resolve_params(params, &pk_bytes)?;
    let verifier = Verifier::new(params).map_err(|e| anyhow!("Unsupported parameter set: {e}"))?;
    let pk = verifier
        .public_key(&pk_bytes)
        .map_err(|e| anyhow!("Invalid public key: {e}"))?;

    if verbose {
        eprintln!("Expanding {}x{} matrix for {}...", params.k, params.l, params);
    }

    let matrix = ShakeExpander
        .expand(pk.rho(), &params)
        .map_err(|e| anyhow!("Matrix expansion failed: {e}"))?;
    let bytes = matrix.to_compact_bytes();
    fs::write(output, encode_output(&bytes, format, "ML-DSA PUBLIC MATRIX"))
        .context("Failed to write matrix file")?;

    if verbose {
        eprintln!("Matrix written to: {}", output.display());
        eprintln!("Matrix size: {} bytes", bytes.len());
    }
    Ok(())
}

/// Display information about supported parameter sets
fn cmd_info() {
    println!("Tessera - ML-DSA Signature Verification");
    println!();
    println!("  ML-DSA (FIPS 204) - Digital Signature Algorithm (verification only)");
    for (params, level) in ALL.iter().zip(["2 (128-bit)", "3 (192-bit)", "5 (256-bit)"]) {
        println!(
            "    {:<12} Security Level {}  PK: {}B  SIG: {}B  k={} l={} tau={} omega={}",
            params.name.to_ascii_lowercase(),
            level,
            params.public_key_bytes(),
            params.signature_bytes(),
            params.k,
            params.l,
            params.tau,
            params.omega
        );
    }
    println!();
    println!("Input formats (auto-detected):");
    println!("    hex    - Hexadecimal encoding");
    println!("    base64 - Base64 encoding");
    println!("    pem    - PEM format with headers");
}

/// Generate shell completions
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tessera", &mut io::stdout());
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            pubkey,
            input,
            signature,
            params,
            context,
            context_hex,
            matrix,
        } => cmd_verify(
            &VerifyArgs {
                pubkey: &pubkey,
                input: &input,
                signature: &signature,
                params,
                context: context.as_deref(),
                context_hex: context_hex.as_deref(),
                matrix: matrix.as_deref(),
            },
            cli.verbose,
        ),

        Commands::ExpandMatrix {
            pubkey,
            output,
            params,
            format,
        } => cmd_expand_matrix(&pubkey, &output, params, format, cli.verbose),

        Commands::Info => {
            cmd_info();
            Ok(())
        }

        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
