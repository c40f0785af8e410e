use crate::domain::model::{JobSort, LatLng};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "marketplace-page")]
#[command(about = "Drive the service-marketplace page headlessly")]
pub struct Cli {
    #[arg(long, help = "Path to a TOML page configuration")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override api.base_url")]
    pub base_url: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines on stderr")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Filter job cards loaded from a CSV file and print the visible ones
    Filter {
        #[arg(long)]
        cards: PathBuf,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        min_rate: String,
        #[arg(long, default_value = "")]
        max_distance: String,
        #[arg(long, default_value = "")]
        keyword: String,
        #[arg(long, requires = "origin_lng", allow_hyphen_values = true)]
        origin_lat: Option<f64>,
        #[arg(long, requires = "origin_lat", allow_hyphen_values = true)]
        origin_lng: Option<f64>,
        #[arg(long, help = "rate-desc, rate-asc or distance")]
        sort: Option<JobSort>,
    },
    /// Send a chat message to a recipient
    SendMessage {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        message: String,
    },
    /// Mark a time slot as available or unavailable
    Availability {
        #[arg(long, help = "Date as YYYY-MM-DD")]
        date: NaiveDate,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        unavailable: bool,
    },
    /// Show an image file in the preview element
    Preview {
        #[arg(long)]
        file: PathBuf,
    },
}

impl Command {
    pub fn origin(&self) -> Option<LatLng> {
        match self {
            Command::Filter {
                origin_lat: Some(lat),
                origin_lng: Some(lng),
                ..
            } => Some(LatLng::new(*lat, *lng)),
            _ => None,
        }
    }
}
