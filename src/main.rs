//! pioctl - embedded library manager and CI helper
//!
//! A command-line tool for installing libraries from a PlatformIO-style
//! registry and building sources against a set of boards.

use clap::Parser;
use pioctl::cli::args::{generate_completions, Cli, Commands};
use pioctl::commands::{run_boards, run_ci, run_lib, run_settings};
use pioctl::config::{Config, ConfigBuilder};
use pioctl::error::{AppError, CiError, ConfigError, PackageError, RegistryError};
use pioctl::services::settings::{Settings, FORCE_VERBOSE};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_env()
        .build();

    match &cli.command {
        Commands::Lib(args) => run_lib(args, &config, cli.format),

        Commands::Ci(args) => {
            let verbose = cli.verbose || force_verbose(&config)?;
            run_ci(args, &config, cli.format, verbose)
        }

        Commands::Boards(args) => run_boards(args, &config, cli.format),

        Commands::Settings(args) => run_settings(args, &config, cli.format),

        Commands::Completions { .. } => Ok(()),
    }
}

fn force_verbose(config: &Config) -> Result<bool, AppError> {
    let settings = Settings::load(&config.home_dir()?)?;
    Ok(settings.get(FORCE_VERBOSE)?)
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Registry(RegistryError::Http { .. })
        | AppError::Package(PackageError::Registry(RegistryError::Http { .. }))
        | AppError::Ci(CiError::Registry(RegistryError::Http { .. })) => {
            eprintln!();
            eprintln!("Hint: Check your internet connection or set PLATFORMIO_API_URL");
            eprintln!("      to a reachable registry.");
        }
        AppError::Package(PackageError::LibNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Try 'pioctl lib search <name>' to find the exact library name.");
        }
        AppError::Ci(CiError::MissingSource) => {
            eprintln!();
            eprintln!("Hint: Pass source paths or set PLATFORMIO_CI_SRC, e.g.");
            eprintln!("      PLATFORMIO_CI_SRC=examples/blink pioctl ci -b uno");
        }
        AppError::Ci(CiError::BuildSpawn { .. }) => {
            eprintln!();
            eprintln!("Hint: Install PlatformIO Core or set [ci] build_command in the");
            eprintln!("      configuration file.");
        }
        AppError::Config(ConfigError::NoHomeDir) => {
            eprintln!();
            eprintln!("Hint: Set PLATFORMIO_HOME_DIR to a writable directory.");
        }
        _ => {}
    }
}
