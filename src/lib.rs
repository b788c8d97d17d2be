//! Join a plot library's country codes to a GDP dataset keyed by another code
//! scheme, and derive per-country log10 GDP for choropleth maps.

pub mod config;
pub mod convert;
pub mod countries;
pub mod error;
pub mod gdp;
pub mod reconcile;
pub mod render;
pub mod table;

pub use config::{CodeInfo, Config, GdpInfo};
pub use convert::{build_converter, CodeMapping};
pub use countries::{load_plot_countries, PlotCountries};
pub use error::{Error, Result};
pub use gdp::{build_gdp_map, gdp_countries, GdpMapResult, GdpSummary};
pub use reconcile::{reconcile, reconcile_countries_by_code, CountryKeys, ReconciliationResult};
pub use render::{render_world_map, ChoroplethMap, MapRenderer, SvgRenderer};
pub use table::{index_by_key, load_table, read_nested_table, NestedTable, Row, Table};
