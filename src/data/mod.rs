//! Data layer: core types, loading, filtering, sorting and statistics.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file once → FuelDataset (cached by DataLoader)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────┐
//!   │ FuelDataset  │  Vec<FuelRecord>, sorted option lists, price bounds
//!   └─────────────┘
//!        │                         │
//!        ▼                         ▼
//!   ┌──────────┐  ┌────────┐   ┌────────┐
//!   │  filter   │→│  sort   │   │ stats   │  group-by means, std-dev,
//!   └──────────┘  └────────┘   └────────┘  weekday, histogram, trend
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  filtered view → CSV
//!   └──────────┘
//! ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod sort;
pub mod stats;
