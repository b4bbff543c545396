use anyhow::Result;
use clap::{Parser, Subcommand};
use cooking_assistant::commands::{ask, ingest, reindex, serve};
use cooking_assistant::config::{Config, show_config, write_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cooking-assistant")]
#[command(about = "A cooking assistant that answers from your own PDF cookbooks")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml; relative data paths resolve against it
    #[arg(
        long,
        global = true,
        env = "COOKING_ASSISTANT_CONFIG_DIR",
        default_value = "."
    )]
    config_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat web server
    Serve {
        /// Address to bind, overriding the configured host
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ingest and index one or more PDF cookbooks
    Ingest {
        /// PDF files to index
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Index every PDF in the upload directory
    Reindex,
    /// Ask a single question from the terminal
    Ask {
        /// The question to ask
        message: String,
    },
    /// Write the configuration file, or show the effective configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = Config::load(&cli.config_dir)?.with_bind_overrides(host, port)?;
            serve(&config).await?;
        }
        Commands::Ingest { paths } => {
            ingest(&Config::load(&cli.config_dir)?, &paths).await?;
        }
        Commands::Reindex => {
            reindex(&Config::load(&cli.config_dir)?).await?;
        }
        Commands::Ask { message } => {
            ask(&Config::load(&cli.config_dir)?, &message).await?;
        }
        Commands::Config { show } => {
            if show {
                show_config(&Config::load(&cli.config_dir)?)?;
            } else {
                let path = write_config(&cli.config_dir)?;
                println!("Configuration written to {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["cooking-assistant", "reindex"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Reindex));
            assert_eq!(parsed.config_dir, PathBuf::from("."));
        }
    }

    #[test]
    fn serve_command_with_overrides() {
        let cli = Cli::try_parse_from([
            "cooking-assistant",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Serve { host, port } = parsed.command {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            } else {
                panic!("expected serve command");
            }
        }
    }

    #[test]
    fn serve_command_without_overrides() {
        let cli = Cli::try_parse_from(["cooking-assistant", "serve"]);

        if let Ok(parsed) = cli {
            if let Commands::Serve { host, port } = parsed.command {
                assert_eq!(host, None);
                assert_eq!(port, None);
            } else {
                panic!("expected serve command");
            }
        } else {
            panic!("serve should parse");
        }
    }

    #[test]
    fn serve_rejects_invalid_port() {
        let result = Cli::try_parse_from(["cooking-assistant", "serve", "--port", "99999"]);
        assert!(result.is_err());
    }

    #[test]
    fn ingest_command_with_paths() {
        let cli = Cli::try_parse_from(["cooking-assistant", "ingest", "a.pdf", "b.pdf"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ingest { paths } = parsed.command {
                assert_eq!(paths, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
            }
        }
    }

    #[test]
    fn ingest_requires_a_path() {
        let result = Cli::try_parse_from(["cooking-assistant", "ingest"]);
        assert!(result.is_err());

        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn ask_command_with_message() {
        let cli = Cli::try_parse_from(["cooking-assistant", "ask", "How long do I boil eggs?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { message } = parsed.command {
                assert_eq!(message, "How long do I boil eggs?");
            }
        }
    }

    #[test]
    fn config_dir_is_global() {
        let cli = Cli::try_parse_from([
            "cooking-assistant",
            "config",
            "--show",
            "--config-dir",
            "/tmp/kitchen",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert_eq!(parsed.config_dir, PathBuf::from("/tmp/kitchen"));
            assert!(matches!(parsed.command, Commands::Config { show: true }));
        }
    }

    #[test]
    fn invalid_command() {
        let result = Cli::try_parse_from(["cooking-assistant", "invalid"]);
        assert!(result.is_err());

        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_flag() {
        let result = Cli::try_parse_from(["cooking-assistant", "--help"]);
        assert!(result.is_err());

        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
