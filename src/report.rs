//! Reporting
//!
//! Consumers of a finished run. The core never renders anything itself;
//! reporters receive the series and metrics through [`Reporter::render`].
//! Plotting tools pick up the CSV or JSON output.

use serde::Serialize;
use std::io::{self, Write};

use crate::error::Result;
use crate::metrics::Metrics;
use crate::params::DerivedConstants;
use crate::simulator::{WeekRecord, WeekSeries};

pub trait Reporter {
    fn render(&mut self, series: &WeekSeries, metrics: &Metrics) -> Result<()>;
}

/// Summary block plus a weekly table sampled every `stride` weeks.
pub struct ConsoleReport<W: Write> {
    out: W,
    stride: usize,
}

impl ConsoleReport<io::Stdout> {
    pub fn stdout(stride: usize) -> Self {
        Self::new(io::stdout(), stride)
    }
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(out: W, stride: usize) -> Self {
        Self {
            out,
            stride: stride.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReport<W> {
    fn render(&mut self, series: &WeekSeries, metrics: &Metrics) -> Result<()> {
        let c = series.constants();
        let s = &metrics.summary;
        let last = series.last();
        let out = &mut self.out;

        writeln!(out, "Curve constants:")?;
        writeln!(out, "  kappa:                   {:.4}", c.kappa)?;
        writeln!(out, "  Weekly growth rate:      {:.4}%", c.weekly_growth_rate * 100.0)?;
        writeln!(out, "  Initial reserve R0:      {:.2} EUR", c.initial_reserve)?;
        writeln!(out, "  Initial supply S0:       {:.0}", c.initial_supply)?;
        writeln!(out, "  Invariant V0:            {:.6e}", c.invariant_scale)?;
        writeln!(out)?;
        writeln!(out, "After {} weeks:", last.week)?;
        writeln!(out, "  Reserve:                 {:.2} EUR", last.reserve)?;
        writeln!(out, "  Supply:                  {:.0}", last.supply)?;
        writeln!(out, "  Spot price:              {:.4} EUR", last.price)?;
        writeln!(out, "  Funding pool:            {:.2} EUR", last.funding_pool)?;
        writeln!(out, "  Funding to projects:     {:.2} EUR", last.project_funding)?;
        writeln!(
            out,
            "  Ratio to funding goal:   {:.4} ({} weeks vs {:.0} EUR)",
            s.target_ratio, s.window_weeks, s.funding_goal
        )?;
        writeln!(out)?;

        writeln!(
            out,
            "| Week | Funding/wk | Reserve      | Supply       | Price    | Pool         | pROI     | mROI   |"
        )?;
        writeln!(
            out,
            "|------|------------|--------------|--------------|----------|--------------|----------|--------|"
        )?;
        for r in series.records().iter().step_by(self.stride) {
            let (p_roi, m_roi) = match metrics.roi_for_week(r.week) {
                Some(p) => (p.break_even_price, p.required_multiple),
                None => (f64::NAN, f64::NAN),
            };
            writeln!(
                out,
                "| {:4} | {:10.0} | {:12.2} | {:12.0} | {:8.4} | {:12.2} | {:8.4} | {:6.2} |",
                r.week, r.funding, r.reserve, r.supply, r.price, r.funding_pool, p_roi, m_roi
            )?;
        }
        out.flush()?;
        Ok(())
    }
}

pub const CSV_HEADER: &str = "week,funding,reserve_delta,burn_delta,minted,reserve,supply,price,\
funding_pool,project_funding,annual_revenue,break_even_price,required_multiple";

/// One row per week. ROI columns are empty for week 0.
pub struct CsvReport<W: Write> {
    out: W,
}

impl<W: Write> CsvReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row(&mut self, r: &WeekRecord, metrics: &Metrics) -> io::Result<()> {
        let revenue = metrics.annual_revenue.get(r.week).copied().unwrap_or(f64::NAN);
        write!(
            self.out,
            "{},{},{},{},{},{},{},{},{},{},{}",
            r.week,
            r.funding,
            r.reserve_delta,
            r.burn_delta,
            r.minted,
            r.reserve,
            r.supply,
            r.price,
            r.funding_pool,
            r.project_funding,
            revenue
        )?;
        match metrics.roi_for_week(r.week) {
            Some(p) => writeln!(self.out, ",{},{}", p.break_even_price, p.required_multiple),
            None => writeln!(self.out, ",,"),
        }
    }
}

impl<W: Write> Reporter for CsvReport<W> {
    fn render(&mut self, series: &WeekSeries, metrics: &Metrics) -> Result<()> {
        writeln!(self.out, "{}", CSV_HEADER)?;
        for r in series.records() {
            self.write_row(r, metrics)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    constants: &'a DerivedConstants,
    weeks: &'a [WeekRecord],
    metrics: &'a Metrics,
}

/// Pretty-printed JSON; NaN and infinite metrics serialise as `null`.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReport<W> {
    fn render(&mut self, series: &WeekSeries, metrics: &Metrics) -> Result<()> {
        let doc = JsonDocument {
            constants: series.constants(),
            weeks: series.records(),
            metrics,
        };
        serde_json::to_writer_pretty(&mut self.out, &doc)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
