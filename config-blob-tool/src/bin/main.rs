use std::path::PathBuf;

use clap::{
    Parser,
    Subcommand,
};
use config_blob_tool::keyfile::{
    host_crypto,
    load_key,
};
use config_blob_tool::{
    inspect_blob_file,
    verify_password,
    GenerateOptions,
    Manifest,
};
use secure_config_store::credentials::{
    Verdict,
    VerifierConfig,
    DEFAULT_ITERATIONS,
};
use secure_config_store::raw::{
    DEFAULT_REGION_SIZE,
    ENTRY_STRIDE,
    MAX_ENTRIES,
};
use secure_config_store::{
    Layout,
    DEVICE_KEY_HANDLE,
};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "config-blob-tool")]
#[command(about = "Encrypted configuration blob generator and inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an encrypted blob from a CSV manifest
    Generate {
        /// Input CSV manifest path
        input: PathBuf,

        /// Output binary file path
        output: PathBuf,

        /// Device key file, 32 raw bytes or 64 hex digits
        #[arg(short, long)]
        key: PathBuf,

        /// Region size in bytes
        #[arg(short, long, value_parser = parse_size, default_value_t = DEFAULT_REGION_SIZE)]
        size: usize,

        /// Slot stride in bytes
        #[arg(long, value_parser = parse_size, default_value_t = ENTRY_STRIDE)]
        stride: usize,

        /// Also provision salt and reference hash for this administration password
        #[arg(long)]
        admin_password: Option<String>,

        /// PBKDF2 iteration count for the administration password
        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,

        /// Skip the decrypt round-trip check of every field
        #[arg(long)]
        no_verify: bool,
    },
    /// Print slots, field names and integrity of a blob without decrypting it
    Inspect {
        /// Input binary file path
        input: PathBuf,

        /// Slot stride in bytes
        #[arg(long, value_parser = parse_size, default_value_t = ENTRY_STRIDE)]
        stride: usize,
    },
    /// Decrypt a blob back into a CSV manifest
    Decrypt {
        /// Input binary file path
        input: PathBuf,

        /// Output CSV file path
        output: PathBuf,

        /// Device key file, 32 raw bytes or 64 hex digits
        #[arg(short, long)]
        key: PathBuf,

        /// Slot stride in bytes
        #[arg(long, value_parser = parse_size, default_value_t = ENTRY_STRIDE)]
        stride: usize,
    },
    /// Check an administration password against a blob
    Verify {
        /// Input binary file path
        input: PathBuf,

        /// Device key file, 32 raw bytes or 64 hex digits
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        password: String,

        /// PBKDF2 iteration count used at provisioning time
        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,

        /// Slot stride in bytes
        #[arg(long, value_parser = parse_size, default_value_t = ENTRY_STRIDE)]
        stride: usize,
    },
}

fn parse_size(s: &str) -> Result<usize, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        s.parse::<usize>().map_err(|e| e.to_string())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            key,
            size,
            stride,
            admin_password,
            iterations,
            no_verify,
        } => {
            println!("Parsing manifest: {}", input.display());
            let manifest = Manifest::from_csv_file(&input)?;
            println!("Found {} fields", manifest.entries.len());

            let layout = Layout::new(size, stride, MAX_ENTRIES)?;
            let options = GenerateOptions {
                layout,
                verify: !no_verify,
                admin_password: admin_password.map(Zeroizing::new),
                verifier: VerifierConfig {
                    iterations,
                    ..Default::default()
                },
            };

            let key = load_key(&key)?;
            println!("Encrypting fields...");
            manifest.generate_blob_file(&output, host_crypto(&key)?, DEVICE_KEY_HANDLE, &options)?;

            println!("Successfully generated blob: {}", output.display());
            println!(
                "Size: {} bytes ({} slots of {} bytes)",
                size,
                layout.capacity(),
                stride
            );

            Ok(())
        }
        Commands::Inspect { input, stride } => {
            let parsed = inspect_blob_file(&input, stride)?;

            println!("Blob: {}", input.display());
            println!("Integrity: {:?}", parsed.integrity);
            for entry in &parsed.entries {
                println!(
                    "  {:#06x}  {:<24} iv {:>2}  ciphertext {:>3}",
                    entry.offset(),
                    entry.name_display().to_string(),
                    entry.iv().len(),
                    entry.ciphertext_and_tag().len()
                );
            }
            for skipped in &parsed.skipped {
                println!("  {:#06x}  skipped: {}", skipped.offset, skipped.reason);
            }
            println!(
                "{} fields, {} skipped slots",
                parsed.entries.len(),
                parsed.skipped.len()
            );

            Ok(())
        }
        Commands::Decrypt {
            input,
            output,
            key,
            stride,
        } => {
            println!("Decrypting blob: {}", input.display());
            let key = load_key(&key)?;
            let mut crypto = host_crypto(&key)?;
            let manifest =
                Manifest::decrypt_blob_file(&input, stride, &mut crypto, DEVICE_KEY_HANDLE)?;
            println!("Found {} fields", manifest.entries.len());

            manifest.to_csv_file(&output)?;
            println!("Successfully wrote manifest: {}", output.display());

            Ok(())
        }
        Commands::Verify {
            input,
            key,
            password,
            iterations,
            stride,
        } => {
            let password = Zeroizing::new(password);
            let key = load_key(&key)?;
            let mut crypto = host_crypto(&key)?;
            let data = std::fs::read(&input)?;

            let verdict = verify_password(
                &data,
                stride,
                &mut crypto,
                DEVICE_KEY_HANDLE,
                password.as_bytes(),
                VerifierConfig {
                    iterations,
                    ..Default::default()
                },
            )?;

            match verdict {
                Verdict::Verified => {
                    println!("Password verified");
                    Ok(())
                }
                Verdict::Rejected => Err("password rejected".into()),
            }
        }
    }
}
