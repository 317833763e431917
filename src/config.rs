use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_DATA_PATH: &str = "2024fuel.csv";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Parser)]
#[command(name = "fuel-price-analyzer")]
#[command(about = "NSW fuel price dashboard", long_about = None)]
pub struct Cli {
    /// Fuel price dataset (.csv, .json or .parquet)
    #[arg(long, env = "FUEL_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Print the aggregate report to stdout instead of opening the dashboard
    #[arg(long)]
    pub summary: bool,

    #[command(flatten)]
    pub geocoder: GeocoderSettings,
}

/// Where and how postcodes are geocoded for the map.
#[derive(Debug, Clone, clap::Args)]
pub struct GeocoderSettings {
    /// Nominatim-compatible search endpoint
    #[arg(long = "geocoder-url", env = "FUEL_GEOCODER_URL", default_value = DEFAULT_GEOCODER_URL)]
    pub endpoint: String,

    /// ISO country code lookups are restricted to
    #[arg(long, env = "FUEL_COUNTRY", default_value = "au")]
    pub country: String,

    /// User-Agent sent with every lookup (required by Nominatim's usage policy)
    #[arg(long, default_value = "fuel-price-analyzer")]
    pub user_agent: String,

    #[arg(long = "geocoder-timeout-secs", default_value_t = 10)]
    pub timeout_secs: u64,
}
