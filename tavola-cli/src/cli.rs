//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::{NewReservation, ReservationPatch};

#[derive(Debug, Parser)]
#[command(name = "tavola", version, about = "Reservation & menu-catalog bridge")]
pub struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, env = "TAVOLA_JSON_LOGS")]
    pub json_logs: bool,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "tavola=info,tavola_client=info")]
    pub log_level: String,

    /// redb cache file (overrides TAVOLA_CACHE_PATH; defaults to the user data dir)
    #[arg(long, global = true)]
    pub cache_path: Option<PathBuf>,

    /// Request timeout in seconds (overrides TAVOLA_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync categories and available menu items into the cache
    SyncCatalog,
    /// Check the stored session has admin access
    Guard {
        /// Redirect target for unauthorized users (defaults to TAVOLA_LOGIN_URL)
        #[arg(long)]
        login_url: Option<String>,
    },
    /// Sync all reservations into the cache
    SyncAdmin,
    /// Create a reservation
    Create(CreateArgs),
    /// Update fields of a reservation
    Update(UpdateArgs),
    /// Delete a reservation
    Delete {
        id: String,
    },
    /// Sign in and store the session
    Login {
        #[arg(long, env = "TAVOLA_EMAIL")]
        email: String,
        #[arg(long, env = "TAVOLA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Print cached data (all keys when none given)
    Cache {
        key: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    /// ISO-8601 start time
    #[arg(long)]
    pub date: String,
    #[arg(long, default_value_t = 1)]
    pub people: u32,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub table: Option<String>,
    /// Minutes (default 90)
    #[arg(long)]
    pub duration: Option<u32>,
}

impl From<CreateArgs> for NewReservation {
    fn from(args: CreateArgs) -> Self {
        Self {
            name: args.name,
            phone: args.phone,
            date: args.date,
            people: args.people,
            notes: args.notes,
            table: args.table,
            duration: args.duration,
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub people: Option<u32>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub table: Option<String>,
    #[arg(long)]
    pub duration: Option<u32>,
}

impl UpdateArgs {
    pub fn into_parts(self) -> (String, ReservationPatch) {
        let patch = ReservationPatch {
            name: self.name,
            phone: self.phone,
            date: self.date,
            people: self.people,
            status: self.status,
            notes: self.notes,
            table: self.table,
            duration: self.duration,
        };
        (self.id, patch)
    }
}
