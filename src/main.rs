use anyhow::{Context, Result};
use gdpcodes::{
    gdp_countries, load_plot_countries, reconcile_countries_by_code, render_world_map, Config,
    SvgRenderer,
};
use std::{env, path::PathBuf, process};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_YEARS: [&str; 4] = ["1960", "1980", "2000", "2010"];

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    // ─── 2) args ─────────────────────────────────────────────────────
    let mut args = env::args().skip(1);
    let (cfg_path, countries_path) = match (args.next(), args.next()) {
        (Some(c), Some(p)) => (PathBuf::from(c), PathBuf::from(p)),
        _ => {
            eprintln!("Usage: gdpcodes <config.yaml> <plot_countries.(yaml|json|csv)> [years…]");
            process::exit(1);
        }
    };
    let mut years: Vec<String> = args.collect();
    if years.is_empty() {
        years = DEFAULT_YEARS.iter().map(|y| y.to_string()).collect();
    }
    let out_dir = env::var("GDPCODES_OUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    // ─── 3) load config + plot countries ─────────────────────────────
    let cfg = Config::from_file(&cfg_path)
        .with_context(|| format!("loading config {}", cfg_path.display()))?;
    let plot_countries = load_plot_countries(&countries_path)
        .with_context(|| format!("loading plot countries {}", countries_path.display()))?;
    info!(countries = plot_countries.len(), years = ?years, "startup");

    // ─── 4) code coverage report ─────────────────────────────────────
    let gdp_table = gdp_countries(&cfg.gdpinfo).context("loading GDP table")?;
    match reconcile_countries_by_code(&cfg.codeinfo, &plot_countries, &gdp_table) {
        Ok(rec) => info!(
            matched = rec.matched.len(),
            unmatched = rec.unmatched.len(),
            "reconciled plot codes against GDP table"
        ),
        Err(e) => warn!("code reconciliation skipped: {}", e),
    }

    // ─── 5) one map per year ─────────────────────────────────────────
    let renderer = SvgRenderer::default();
    for year in &years {
        if !cfg.gdpinfo.contains_year(year) {
            warn!(
                year = %year,
                min = cfg.gdpinfo.min_year,
                max = cfg.gdpinfo.max_year,
                "year outside configured range"
            );
        }
        let map_file = out_dir.join(format!("isp_gdp_world_code_{}.svg", year));
        let gdp = render_world_map(
            &cfg.gdpinfo,
            &cfg.codeinfo,
            &plot_countries,
            year,
            &map_file,
            &renderer,
        )
        .with_context(|| format!("rendering {}", year))?;
        println!("{}", serde_json::to_string(&gdp.summary(year))?);
    }

    info!("all done");
    Ok(())
}
