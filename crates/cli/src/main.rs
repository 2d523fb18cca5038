use clap::{Parser, Subcommand};
use fhir::{Converter, ConverterConfig, ResourceKind};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Convert clinical intake records into FHIR resources")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported resource kinds
    Kinds,
    /// Convert one intake record
    Convert {
        /// Resource kind (patient or practitioner)
        kind: ResourceKind,
        /// JSON file with the intake record (reads stdin when omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Pretty-print the resource
        #[arg(long)]
        pretty: bool,
        /// Latest accepted birth year (defaults to the current year)
        #[arg(long, env = "INTAKE_MAX_BIRTH_YEAR")]
        max_birth_year: Option<i32>,
        /// Assign a random resource id
        #[arg(long)]
        assign_id: bool,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("fhir=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Kinds) => {
            for kind in ResourceKind::ALL {
                println!("{kind}");
            }
        }
        Some(Commands::Convert {
            kind,
            input,
            pretty,
            max_birth_year,
            assign_id,
        }) => {
            let mut config = ConverterConfig::default().with_resource_ids(assign_id);
            if let Some(year) = max_birth_year {
                config = config.with_max_birth_year(year)?;
            }

            let text = match input {
                Some(path) => std::fs::read_to_string(&path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let raw: serde_json::Value = serde_json::from_str(&text)?;

            match Converter::new(config).convert(kind, &raw) {
                Ok(resource) => {
                    let json = resource.to_json()?;
                    if pretty {
                        println!("{}", serde_json::to_string_pretty(&json)?);
                    } else {
                        println!("{json}");
                    }
                }
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        None => {
            println!("Use 'intake --help' for commands");
        }
    }

    Ok(ExitCode::SUCCESS)
}
