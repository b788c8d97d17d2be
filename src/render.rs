// src/render.rs
use std::{fmt::Write as _, fs, path::Path};
use tracing::info;

use crate::config::{CodeInfo, GdpInfo};
use crate::countries::PlotCountries;
use crate::error::{Error, Result};
use crate::gdp::{build_gdp_map, GdpMapResult};

/// What a renderer gets to draw.
#[derive(Debug, Clone, Copy)]
pub struct ChoroplethMap<'a> {
    pub year: &'a str,
    pub plot_countries: &'a PlotCountries,
    pub gdp: &'a GdpMapResult,
}

impl ChoroplethMap<'_> {
    pub fn title(&self) -> String {
        format!(
            "GDP by Country for {} (log scale), unified by common country codes",
            self.year
        )
    }
}

/// Turns a GDP map into an output file.
pub trait MapRenderer {
    fn render(&self, map: &ChoroplethMap<'_>, path: &Path) -> Result<()>;
}

/// Build the GDP map for `year` and hand it to `renderer`. Returns the map so
/// callers can report on it.
pub fn render_world_map<R: MapRenderer + ?Sized>(
    gdpinfo: &GdpInfo,
    codeinfo: &CodeInfo,
    plot_countries: &PlotCountries,
    year: &str,
    map_file: &Path,
    renderer: &R,
) -> Result<GdpMapResult> {
    let gdp = build_gdp_map(gdpinfo, codeinfo, plot_countries, year)?;
    let map = ChoroplethMap {
        year,
        plot_countries,
        gdp: &gdp,
    };
    renderer.render(&map, map_file)?;
    info!(path = %map_file.display(), year, "map written");
    Ok(gdp)
}

const MISSING_FILL: &str = "#d62728";
const NO_DATA_FILL: &str = "#ff7f0e";
const UNLISTED_FILL: &str = "#cccccc";
const LOW_RGB: (u8, u8, u8) = (0xde, 0xeb, 0xf7);
const HIGH_RGB: (u8, u8, u8) = (0x08, 0x30, 0x6b);

/// Self-contained SVG: one labelled cell per plot country, shaded by log10
/// GDP, with separate fills for the two "no value" series. No geography.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub columns: usize,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            columns: 16,
            cell_width: 56,
            cell_height: 32,
        }
    }
}

impl SvgRenderer {
    pub fn to_svg(&self, map: &ChoroplethMap<'_>) -> String {
        let columns = self.columns.max(1);
        let (cw, ch) = (self.cell_width, self.cell_height);
        let header = 80u32;
        let rows = (map.plot_countries.len() + columns - 1) / columns;
        let width = cw * columns as u32;
        let height = header + ch * rows as u32;
        let range = map.gdp.value_range();

        let mut svg = String::new();
        // writes into a String cannot fail
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width,
            h = height
        );
        let _ = writeln!(
            svg,
            r#"<text x="8" y="24" font-size="16" font-family="sans-serif">{}</text>"#,
            escape(&map.title())
        );

        let legend = [
            (fill_for(range.map_or(0.0, |r| r.1), range), "GDP for ".to_string() + map.year),
            (MISSING_FILL.to_string(), "Missing from World Bank Data".to_string()),
            (NO_DATA_FILL.to_string(), format!("No GDP data for {}", map.year)),
        ];
        for (i, (fill, label)) in legend.iter().enumerate() {
            let x = 8 + 220 * i as u32;
            let _ = writeln!(
                svg,
                r#"<rect x="{x}" y="40" width="14" height="14" fill="{fill}"/><text x="{tx}" y="52" font-size="12" font-family="sans-serif">{label}</text>"#,
                x = x,
                fill = fill,
                tx = x + 20,
                label = escape(label)
            );
        }

        for (i, (code, name)) in map.plot_countries.iter().enumerate() {
            let x = cw * (i % columns) as u32;
            let y = header + ch * (i / columns) as u32;
            let (fill, detail) = match map.gdp.gdp.get(code) {
                Some(&v) => (fill_for(v, range), format!("log10 GDP {:.3}", v)),
                None if map.gdp.missing_codes.contains(code) => {
                    (MISSING_FILL.to_string(), "missing from GDP data".to_string())
                }
                None if map.gdp.no_data.contains(code) => {
                    (NO_DATA_FILL.to_string(), format!("no data for {}", map.year))
                }
                None => (UNLISTED_FILL.to_string(), "no GDP row".to_string()),
            };
            let _ = writeln!(
                svg,
                r##"<g><title>{name}: {detail}</title><rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}" stroke="#ffffff"/><text x="{tx}" y="{ty}" font-size="11" font-family="monospace">{code}</text></g>"##,
                name = escape(name),
                detail = escape(&detail),
                x = x,
                y = y,
                w = cw,
                h = ch,
                fill = fill,
                tx = x + 4,
                ty = y + ch / 2 + 4,
                code = escape(code)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl MapRenderer for SvgRenderer {
    fn render(&self, map: &ChoroplethMap<'_>, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| Error::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, self.to_svg(map)).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Linear blend between the low and high colours over the mapped range.
fn fill_for(value: f64, range: Option<(f64, f64)>) -> String {
    let t = match range {
        Some((lo, hi)) if hi > lo => ((value - lo) / (hi - lo)).clamp(0.0, 1.0),
        _ => 1.0,
    };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(LOW_RGB.0, HIGH_RGB.0),
        mix(LOW_RGB.1, HIGH_RGB.1),
        mix(LOW_RGB.2, HIGH_RGB.2)
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample() -> (PlotCountries, GdpMapResult) {
        let plot: PlotCountries = [("fr", "France"), ("us", "United States"), ("zz", "Tom & Jerry")]
            .into_iter()
            .map(|(c, n)| (c.to_string(), n.to_string()))
            .collect();
        let mut gdp = GdpMapResult::default();
        gdp.gdp.insert("fr".into(), 12.0);
        gdp.no_data.insert("us".into());
        gdp.missing_codes.insert("zz".into());
        (plot, gdp)
    }

    #[test]
    fn fill_spans_low_to_high() {
        assert_eq!(fill_for(1.0, Some((1.0, 3.0))), "#deebf7");
        assert_eq!(fill_for(3.0, Some((1.0, 3.0))), "#08306b");
        assert_eq!(fill_for(7.0, None), "#08306b");
    }

    #[test]
    fn svg_has_one_cell_per_country_and_escapes_names() {
        let (plot, gdp) = sample();
        let map = ChoroplethMap {
            year: "2010",
            plot_countries: &plot,
            gdp: &gdp,
        };
        let svg = SvgRenderer::default().to_svg(&map);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<g>").count(), 3);
        assert!(svg.contains("Tom &amp; Jerry: missing from GDP data"));
        assert!(svg.contains("United States: no data for 2010"));
        assert!(svg.contains("France: log10 GDP 12.000"));
        assert!(svg.contains("GDP by Country for 2010"));
    }

    #[test]
    fn render_creates_parent_dirs() -> Result<()> {
        let (plot, gdp) = sample();
        let dir = tempdir()?;
        let path = dir.path().join("maps").join("gdp_2010.svg");
        let map = ChoroplethMap {
            year: "2010",
            plot_countries: &plot,
            gdp: &gdp,
        };
        SvgRenderer::default().render(&map, &path)?;
        assert!(fs::read_to_string(&path)?.contains("<svg"));
        Ok(())
    }

    struct Recording(RefCell<Vec<(String, PathBuf)>>);

    impl MapRenderer for Recording {
        fn render(&self, map: &ChoroplethMap<'_>, path: &Path) -> Result<(), Error> {
            self.0
                .borrow_mut()
                .push((map.year.to_string(), path.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn render_world_map_hands_map_to_renderer() -> Result<()> {
        let dir = tempdir()?;
        let codes = dir.path().join("codes.csv");
        let gdp = dir.path().join("gdp.csv");
        fs::write(&codes, "ISO3166-1-Alpha-2,ISO3166-1-Alpha-3\nFR,FRA\n")?;
        fs::write(&gdp, "Country Name,Country Code,1980\nFrance,FRA,100\n")?;
        let codeinfo = CodeInfo {
            codefile: codes,
            ..CodeInfo::default()
        };
        let gdpinfo = GdpInfo {
            gdpfile: gdp,
            ..GdpInfo::default()
        };
        let plot: PlotCountries = [("fr".to_string(), "France".to_string())].into();
        let rec = Recording(RefCell::new(Vec::new()));
        let out = dir.path().join("map.svg");

        let res = render_world_map(&gdpinfo, &codeinfo, &plot, "1980", &out, &rec)?;
        assert!((res.gdp["fr"] - 2.0).abs() < 1e-9);
        assert_eq!(rec.0.borrow().as_slice(), &[("1980".to_string(), out)]);
        Ok(())
    }
}
