// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text input readers
//!
//! All formats are whitespace separated, one record per line. Blank lines and
//! lines starting with `#` are ignored; malformed records are skipped and
//! reported in the returned [`ParseReport`].
//!
//! - Wall lines: `x_start x_end y_start y_end` (note the axis grouping)
//! - Openings: `kind x1 y1 z_min x2 y2 z_max`, kind `door`/`window` or `1`/`2`
//! - Wall points: `x y label`

use crate::error::{Error, Result};
use crate::types::{Opening, Point2D, Wall, WallKind};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A skipped input record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    pub content: String,
    pub reason: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line, self.reason, self.content)
    }
}

/// Parsed records plus the lines that were skipped
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport<T> {
    pub items: Vec<T>,
    pub errors: Vec<ParseError>,
}

impl<T> Default for ParseReport<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Labelled group of wall points belonging to one planar wall
#[derive(Debug, Clone, PartialEq)]
pub struct PointCluster {
    pub label: String,
    pub points: Vec<Point2D>,
}

/// Parse wall lines given as `x_start x_end y_start y_end`
pub fn parse_wall_lines(text: &str) -> ParseReport<Wall> {
    parse_records(text, |tokens| {
        let [xs, xe, ys, ye] = parse_floats::<4>(tokens)?;
        let wall = Wall::plain(Point2D::new(xs, ys), Point2D::new(xe, ye));
        if wall.length() == 0.0 {
            return Err("zero-length wall".to_string());
        }
        Ok(wall)
    })
}

/// Parse opening elements given as `kind x1 y1 z_min x2 y2 z_max`
pub fn parse_openings(text: &str) -> ParseReport<Opening> {
    parse_records(text, |tokens| {
        let (kind_token, rest) = tokens
            .split_first()
            .ok_or_else(|| "empty record".to_string())?;
        let kind = match WallKind::parse_token(kind_token) {
            Some(kind) if kind.is_opening() => kind,
            _ => return Err(format!("unknown opening kind {:?}", kind_token)),
        };
        let element = parse_floats::<6>(rest)?;
        let opening = Opening::from_element(kind, element);
        if opening.z_range.max < opening.z_range.min {
            return Err("z_max below z_min".to_string());
        }
        Ok(opening)
    })
}

/// Parse labelled wall points `x y label`, grouped by label in first-seen order
pub fn parse_wall_points(text: &str) -> ParseReport<PointCluster> {
    let labelled = parse_records(text, |tokens| {
        let (label, coords) = tokens
            .split_last()
            .ok_or_else(|| "empty record".to_string())?;
        let [x, y] = parse_floats::<2>(coords)?;
        Ok((label.to_string(), Point2D::new(x, y)))
    });

    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut clusters: Vec<PointCluster> = Vec::new();
    for (label, point) in labelled.items {
        let idx = *index.entry(label.clone()).or_insert_with(|| {
            clusters.push(PointCluster {
                label,
                points: Vec::new(),
            });
            clusters.len() - 1
        });
        clusters[idx].points.push(point);
    }

    ParseReport {
        items: clusters,
        errors: labelled.errors,
    }
}

/// Read the wall line file; its absence is an error
pub fn read_wall_lines(path: &Path) -> Result<ParseReport<Wall>> {
    if !path.exists() {
        return Err(Error::MissingWallFile(path.to_path_buf()));
    }
    let report = parse_wall_lines(&read_text(path)?);
    log_report(path, &report);
    Ok(report)
}

pub fn read_openings(path: &Path) -> Result<ParseReport<Opening>> {
    let report = parse_openings(&read_text(path)?);
    log_report(path, &report);
    Ok(report)
}

pub fn read_wall_points(path: &Path) -> Result<ParseReport<PointCluster>> {
    let report = parse_wall_points(&read_text(path)?);
    log_report(path, &report);
    Ok(report)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn log_report<T>(path: &Path, report: &ParseReport<T>) {
    for err in &report.errors {
        tracing::warn!(
            file = %path.display(),
            line = err.line,
            reason = %err.reason,
            "Skipping malformed line"
        );
    }
    tracing::info!(
        file = %path.display(),
        records = report.items.len(),
        skipped = report.errors.len(),
        "Loaded input"
    );
}

fn parse_records<T, F>(text: &str, mut parse: F) -> ParseReport<T>
where
    F: FnMut(&[&str]) -> std::result::Result<T, String>,
{
    let mut report = ParseReport::default();

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match parse(&tokens) {
            Ok(item) => report.items.push(item),
            Err(reason) => report.errors.push(ParseError {
                line: idx + 1,
                content: trimmed.to_string(),
                reason,
            }),
        }
    }

    report
}

fn parse_floats<const N: usize>(tokens: &[&str]) -> std::result::Result<[f64; N], String> {
    if tokens.len() != N {
        return Err(format!("expected {} numbers, found {}", N, tokens.len()));
    }
    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid number {:?}", token))?;
    }
    Ok(values)
}
