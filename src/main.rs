use clap::{Parser, Subcommand};
use hard75_client::{handlers, App, Config};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

/// Terminal client for the #75HARD checklist.
#[derive(Debug, Parser)]
#[command(name = "hard75", version)]
struct Cli {
    /// Base URL of the checklist API.
    #[arg(long, env = "HARD75_API_URL", default_value = hard75_client::config::DEFAULT_API_URL)]
    api_url: String,

    /// Where the session (token, user id, username) is kept between runs.
    #[arg(long, env = "HARD75_DATA_PATH", default_value = hard75_client::config::DEFAULT_DATA_PATH)]
    data_path: PathBuf,

    /// Seconds between refreshes in `watch`.
    #[arg(long, env = "HARD75_POLL_SECS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    poll_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and remember the session.
    Login { username: String, password: String },
    /// Forget the stored session.
    Logout,
    /// Print the logged-in user.
    Whoami,
    /// Show the week-by-week checklist.
    Progress,
    /// Flip one task for one day.
    Toggle {
        day: u32,
        /// diet, workoutOutside, workoutAnywhere, water, reading or progressPic
        task: String,
        /// Photo to upload when turning progressPic on.
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Upload a progress picture for a day.
    Upload { day: u32, file: PathBuf },
    /// List progress pictures.
    Gallery,
    /// Wipe all progress.
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Start the challenge today.
    Start {
        #[arg(long)]
        yes: bool,
    },
    /// Keep the checklist on screen, refreshing periodically.
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("failed to initialise logging: {err}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    let config = Config {
        api_url: cli.api_url,
        data_path: cli.data_path,
        poll_interval: Duration::from_secs(cli.poll_secs),
    };
    let app = App::open(config).await;

    let result = match cli.command {
        Command::Login { username, password } => handlers::login(&app, &username, &password).await,
        Command::Logout => {
            handlers::logout(&app);
            Ok(())
        }
        Command::Whoami => {
            handlers::whoami(&app);
            Ok(())
        }
        Command::Progress => handlers::progress(&app).await,
        Command::Toggle { day, task, photo } => {
            handlers::toggle(&app, day, &task, photo.as_deref()).await
        }
        Command::Upload { day, file } => handlers::upload(&app, day, &file).await,
        Command::Gallery => handlers::gallery(&app).await,
        Command::Reset { yes } => handlers::reset(&app, yes).await,
        Command::Start { yes } => handlers::start(&app, yes).await,
        Command::Watch => handlers::watch_tracker(&app).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
