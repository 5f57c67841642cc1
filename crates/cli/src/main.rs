//! OpenAPI Provider CLI
//!
//! Command-line interface for assembling providers from spec documents.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use openapi_provider_common::{ConfigurationKind, ConfigurationValues};
use openapi_provider_docs::DocsGenerator;
use openapi_provider_engine::{ProviderDefinition, ProviderFactory};
use openapi_provider_spec::{ServiceConfigurationFile, SpecDocument};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-provider")]
#[command(version, about = "Assemble infrastructure providers from OpenAPI spec documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Inputs every command assembles a provider from
#[derive(Args)]
struct AssemblyArgs {
    /// Path to the spec document (JSON or YAML)
    #[arg(short, long)]
    spec: PathBuf,

    /// Provider name, used as the prefix of every resource name
    #[arg(short, long)]
    provider: String,

    /// Path to the service configuration file (YAML)
    #[arg(long)]
    service_config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a provider and display its configuration, resources and data sources
    #[command(after_help = "EXAMPLES:\n  \
        openapi-provider inspect --spec acme.yaml --provider acme\n\n  \
        # With property defaults from a service configuration\n  \
        openapi-provider inspect --spec acme.yaml --provider acme --service-config acme-service.yaml")]
    Inspect {
        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Render Markdown documentation for an assembled provider
    #[command(after_help = "EXAMPLES:\n  \
        openapi-provider docs --spec acme.yaml --provider acme --output ./docs")]
    Docs {
        #[command(flatten)]
        assembly: AssemblyArgs,

        /// Output directory
        #[arg(short, long, default_value = "./docs")]
        output: PathBuf,
    },

    /// Validate configuration values and print the resulting client context
    #[command(after_help = "EXAMPLES:\n  \
        openapi-provider configure --spec acme.yaml --provider acme --values acme.tfvars.yaml")]
    Configure {
        #[command(flatten)]
        assembly: AssemblyArgs,

        /// Path to the configuration values (YAML or JSON)
        #[arg(long)]
        values: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { assembly } => inspect_command(&assembly, cli.verbose),
        Commands::Docs { assembly, output } => docs_command(&assembly, output.as_path()),
        Commands::Configure { assembly, values } => configure_command(&assembly, values.as_path()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn assemble(args: &AssemblyArgs) -> Result<ProviderDefinition> {
    println!("{} Loading spec document: {}", "→".cyan(), args.spec.display());
    let spec = SpecDocument::from_file(&args.spec).context("Failed to load spec document")?;

    let service_configuration = match &args.service_config {
        Some(path) => {
            println!(
                "{} Loading service configuration: {}",
                "→".cyan(),
                path.display()
            );
            ServiceConfigurationFile::load(path)
                .context("Failed to load service configuration")?
        }
        None => ServiceConfigurationFile::default(),
    };

    debug!(provider = %args.provider, "assembling provider");
    ProviderFactory::builder(args.provider.as_str())
        .spec_model(Arc::new(spec))
        .service_configuration(Arc::new(service_configuration))
        .build()
        .context("Invalid provider")?
        .create_provider()
        .context("Failed to assemble provider")
}

fn inspect_command(args: &AssemblyArgs, verbose: bool) -> Result<()> {
    let provider = assemble(args)?;

    println!("\n{}", "✓ Provider assembled!".green().bold());

    println!("\n{}", "Configuration:".bold());
    for property in provider.configuration_schema.iter() {
        match &property.kind {
            ConfigurationKind::Block(nested) => {
                println!("  • {} (block, {} properties)", property.name.cyan(), nested.len());
                if verbose {
                    for nested in nested {
                        println!("      {}", nested.name);
                    }
                }
            }
            ConfigurationKind::String => {
                let required = if property.required { "required" } else { "optional" };
                print!("  • {} ({})", property.name.cyan(), required);
                if let Some(default) = &property.default_value {
                    print!(" default: {}", default.yellow());
                }
                if !property.allowed_values.is_empty() {
                    print!(" one of: {}", property.allowed_values.join(", "));
                }
                println!();
            }
        }
    }

    println!("\n{} ({})", "Resources:".bold(), provider.resources.len());
    for (name, resource) in &provider.resources {
        let operations = &resource.operations;
        let mut ops = vec!["C", "R"];
        if operations.update.is_some() {
            ops.push("U");
        }
        if operations.delete.is_some() {
            ops.push("D");
        }
        println!("  • {} ({})", name.as_str().cyan(), ops.join(""));
        if verbose {
            println!("    Properties: {}", resource.properties.len());
            println!("    Path: {}", operations.create.path);
        }
    }

    println!("\n{} ({})", "Data Sources:".bold(), provider.data_sources.len());
    for (name, data_source) in &provider.data_sources {
        println!("  • {}", name.as_str().cyan());
        if verbose {
            println!("    Properties: {}", data_source.properties.len());
            println!("    Path: {}", data_source.read.path);
        }
    }

    if !provider.collisions.is_empty() {
        println!("\n{}", "Dropped (name collisions):".yellow().bold());
        for collision in &provider.collisions {
            println!(
                "  • {} claimed by {}",
                collision.name.as_str().yellow(),
                collision.paths.join(", ")
            );
        }
    }

    Ok(())
}

fn docs_command(args: &AssemblyArgs, output: &Path) -> Result<()> {
    let provider = assemble(args)?;

    println!(
        "{} Writing documentation to: {}",
        "→".cyan(),
        output.display()
    );
    DocsGenerator::new(&args.provider, &provider)
        .context("Failed to load documentation templates")?
        .generate_to_directory(output)
        .context("Failed to generate documentation")?;

    println!("\n{}", "✓ Documentation generated!".green().bold());
    println!("  Resources: {}", provider.resources.len());
    println!("  Data sources: {}", provider.data_sources.len());

    Ok(())
}

fn configure_command(args: &AssemblyArgs, values_path: &Path) -> Result<()> {
    let provider = assemble(args)?;

    let content = fs::read_to_string(values_path)
        .with_context(|| format!("Failed to read configuration values {}", values_path.display()))?;
    // YAML is a superset of JSON, so both parse here
    let values: ConfigurationValues =
        serde_yaml::from_str(&content).context("Failed to parse configuration values")?;

    provider
        .configuration_schema
        .validate(&values)
        .context("Invalid configuration values")?;

    let client = provider.configure(&values);
    println!("\n{}", "✓ Configuration valid!".green().bold());
    println!(
        "{}",
        serde_json::to_string_pretty(client.context())
            .context("Failed to serialize client context")?
    );

    Ok(())
}
