//! Data layer: the filter-and-aggregate pipeline behind the dashboard.
//!
//! Architecture:
//! ```text
//!  listings.csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read rows → Vec<RawListing>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  clean    │  coerce price / revenue, drop incomplete rows
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ ListingDataset  │  immutable, loaded once
//!   └────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  room type, price range, neighbourhood → indices
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  top-N neighbourhoods, mean price, geo subset
//!   └───────────┘
//! ```
//!
//! `boundary` supplies the neighbourhood outlines drawn under the map.

pub mod aggregate;
pub mod boundary;
pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
