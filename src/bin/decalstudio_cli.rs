//! Decal Studio CLI - Bridge interface for the storefront backend
//!
//! Commands: price, classify, bounds, promote, sweep
//! Outputs JSON to stdout
//! Returns non-zero on domain failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use decalstudio_core::{
    deserialize_session, price_session, print_area_bounds, promotion, LayerContent,
    PrintSide, ProductKind, ProductSize, PromotionPipeline,
};

#[derive(Parser)]
#[command(name = "decalstudio-cli")]
#[command(about = "Decal Studio CLI - Design Layer Engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a serialized session
    Price {
        /// JSON payload (DesignSession)
        #[arg(short, long)]
        payload: String,
    },

    /// Classify a layer content payload
    Classify {
        /// Raw content JSON (string or object)
        #[arg(short, long)]
        payload: String,
    },

    /// Resolve a print-area rectangle
    Bounds {
        /// JSON payload: {"kind": ..., "size": ..., "side": ...}
        #[arg(short, long)]
        payload: String,
    },

    /// Promote a saved session's staged uploads to permanent storage
    Promote {
        /// Path to a persisted session envelope (rewritten in place)
        #[arg(long)]
        session_file: PathBuf,

        #[arg(long)]
        temp_root: PathBuf,

        #[arg(long)]
        perm_root: PathBuf,

        /// Owner id keying permanent storage
        #[arg(long)]
        owner: String,

        /// Design id keying permanent storage
        #[arg(long)]
        design: String,
    },

    /// Delete stale temporary upload sessions
    Sweep {
        #[arg(long)]
        temp_root: PathBuf,

        #[arg(long, default_value_t = 24)]
        max_age_hours: i64,
    },
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoundsQuery {
    kind: ProductKind,
    size: ProductSize,
    side: PrintSide,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Price { payload } => {
            let session = match serde_json::from_str(&payload) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!(r#"{{"error": "Invalid session payload: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };
            let amount = price_session(&session);
            println!("{}", serde_json::json!({ "amount": amount }));
            ExitCode::SUCCESS
        }

        Commands::Classify { payload } => {
            let raw = match serde_json::from_str(&payload) {
                Ok(v) => v,
                Err(e) => {
                    eprintln!(r#"{{"error": "Invalid content payload: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };
            let content = LayerContent::classify(&raw);
            let output = serde_json::json!({
                "renderable": content.is_renderable(),
                "staged": content.is_staged(),
                "content": content,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Bounds { payload } => {
            let query: BoundsQuery = match serde_json::from_str(&payload) {
                Ok(q) => q,
                Err(e) => {
                    eprintln!(r#"{{"error": "Invalid bounds query: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };
            let rect = print_area_bounds(query.kind, query.size, query.side);
            println!("{}", serde_json::to_string(&rect).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Promote {
            session_file,
            temp_root,
            perm_root,
            owner,
            design,
        } => {
            let bytes = match std::fs::read(&session_file) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!(r#"{{"error": "Cannot read session file: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };
            let mut envelope = match deserialize_session(&bytes) {
                Ok(env) => env,
                Err(e) => {
                    eprintln!(r#"{{"error": "Cannot parse session: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            let pipeline = PromotionPipeline::new(temp_root, perm_root);
            let report = pipeline.promote_session(&mut envelope.session, &owner, &design);

            let serialized = match serde_json::to_vec(&envelope) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!(r#"{{"error": "Cannot serialize session: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = std::fs::write(&session_file, serialized) {
                eprintln!(r#"{{"error": "Cannot rewrite session file: {}"}}"#, e);
                return ExitCode::FAILURE;
            }

            println!("{}", serde_json::to_string_pretty(&report).unwrap());
            if report.fully_promoted() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Partial promotion
            }
        }

        Commands::Sweep {
            temp_root,
            max_age_hours,
        } => {
            let max_age = chrono::Duration::hours(max_age_hours);
            match promotion::sweep_stale(&temp_root, max_age) {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!(r#"{{"error": "Sweep failed: {}"}}"#, e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
