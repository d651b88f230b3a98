mod app_config;

use app_config::AppConfig;
use clap::{Parser, Subcommand};
use std::{error::Error, path::PathBuf};
use tagnet::{subcommands, utils};
use tracing::debug;

#[derive(Parser)]
#[command(version, about = "Train and query the directional tag classifier")]
struct Cli {
  /// Log at debug level
  #[arg(short, long, global = true)]
  verbose: bool,
  /// YAML file with defaults for the options below
  #[arg(short, long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Train, persist and verify until every example is predicted exactly
  Train {
    /// Rows of `X Y Up Down Right Left Tag`
    #[arg(short, long, value_name = "PATH")]
    data: PathBuf,
    #[arg(short, long, value_name = "DIR")]
    weights_dir: Option<PathBuf>,
    #[arg(short, long, value_name = "INT")]
    epochs: Option<usize>,
    #[arg(long, value_name = "FLOAT")]
    learning_rate: Option<f64>,
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,
    /// Give up after this many failed attempts (retries forever by default)
    #[arg(long, value_name = "INT")]
    max_attempts: Option<usize>,
  },
  /// Predict a tag for every row of a file using the stored weights
  Predict {
    #[arg(short, long, value_name = "PATH")]
    data: PathBuf,
    #[arg(short, long, value_name = "DIR")]
    weights_dir: Option<PathBuf>,
  },
  /// Serve predictions over HTTP
  Serve {
    #[arg(short, long, default_value_t = 4545)]
    port: u16,
    #[arg(short, long, value_name = "DIR")]
    weights_dir: Option<PathBuf>,
  },
  /// Delete the stored weights
  Clear {
    #[arg(short, long, value_name = "DIR")]
    weights_dir: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  let args = Cli::parse();
  utils::init_logging(args.verbose)?;

  let file_config = match &args.config {
    Some(path) => {
      let config = AppConfig::from_file(path)?;
      debug!(path = %path.display(), ?config, "loaded config file");
      config
    }
    None => AppConfig::default(),
  };

  match args.command {
    Command::Train {
      data,
      weights_dir,
      epochs,
      learning_rate,
      seed,
      max_attempts,
    } => {
      let config = file_config.merge(AppConfig {
        epochs,
        learning_rate,
        seed,
        max_attempts,
        weights_dir,
        ..AppConfig::default()
      });
      let app = subcommands::Train::new(
        &data,
        &config.weights_dir(),
        config.training_config(),
        config.seed,
        config.max_attempts,
      );
      app.run().await?;
    }
    Command::Predict { data, weights_dir } => {
      let config = file_config.merge(AppConfig {
        weights_dir,
        ..AppConfig::default()
      });
      let app = subcommands::Predict::new(&data, &config.weights_dir(), config.training_config());
      app.run()?;
    }
    Command::Serve { port, weights_dir } => {
      let config = file_config.merge(AppConfig {
        weights_dir,
        ..AppConfig::default()
      });
      let app = subcommands::Server::new(port, config.weights_dir(), config.training_config());
      app.run().await?;
    }
    Command::Clear { weights_dir } => {
      let config = file_config.merge(AppConfig {
        weights_dir,
        ..AppConfig::default()
      });
      subcommands::Clear::new(&config.weights_dir()).run()?;
    }
  }
  Ok(())
}
