use anyhow::{bail, Context, Result};

use crate::layout::GridSpec;

/// Application configuration loaded from environment variables.
/// Every value has a default matching the standard print setup: 63 × 88.4 mm
/// cards on 3×3 US-letter sheets at 300 dpi.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Default card width/height in millimeters; callers may override per
    /// request via the `card_width`/`card_height` form fields.
    pub card_width_mm: f64,
    pub card_height_mm: f64,
    pub dpi: f64,
    pub page_width_in: f64,
    pub page_height_in: f64,
    pub grid: GridSpec,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            card_width_mm: env_or("CARD_WIDTH_MM", 63.0)?,
            card_height_mm: env_or("CARD_HEIGHT_MM", 88.4)?,
            dpi: env_or("DPI", 300.0)?,
            page_width_in: env_or("PAGE_WIDTH_IN", 8.5)?,
            page_height_in: env_or("PAGE_HEIGHT_IN", 11.0)?,
            grid: GridSpec {
                columns: env_or("GRID_COLUMNS", 3u32)?,
                rows: env_or("GRID_ROWS", 3u32)?,
            },
        };

        if config.grid.capacity() == 0 {
            bail!("GRID_COLUMNS and GRID_ROWS must both be at least 1");
        }
        Ok(config)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
