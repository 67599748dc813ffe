use parkdist::{CandidatePair, Point, RunStats};
use serde::Serialize;
use std::fmt::Write;

const RULE_WIDTH: usize = 80;
const TITLE: &str = "Nearest To A Park";

/// Drops line breaks and collapses whitespace runs to a single space.
pub fn sanitize_address(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn maps_url(point: &Point) -> String {
    format!(
        "https://maps.google.com/maps/?q={:.6},{:.6}&z=17",
        point.lat(),
        point.lng()
    )
}

/// The text report for a finished run.
pub fn render_text(answer: Option<&CandidatePair>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("{rule}\n{TITLE}\n{rule}\n\n");

    match answer {
        Some(pair) => {
            let source = pair.source();
            let _ = writeln!(out, "{}", source.name());
            let _ = writeln!(out, "{}", sanitize_address(&source.placemark().address));
            let _ = writeln!(out, "{}", maps_url(source.geometry()));
            let _ = writeln!(
                out,
                "nearest park: {}, {:.6}",
                pair.target().name(),
                pair.distance()
            );
        }
        None => {
            let _ = writeln!(out, "No source could be paired with a park.");
        }
    }
    out
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub answer: Option<JsonAnswer<'a>>,
    pub stats: JsonStats,
}

#[derive(Debug, Serialize)]
pub struct JsonAnswer<'a> {
    pub source: &'a str,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub maps_url: String,
    pub target: &'a str,
    pub distance: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonStats {
    pub sources: usize,
    pub targets: usize,
    pub workers: usize,
    pub candidates: u64,
    pub comparisons: u64,
    pub failed_comparisons: u64,
    pub elapsed_ms: f64,
}

impl<'a> JsonReport<'a> {
    pub fn new(answer: Option<&'a CandidatePair>, stats: &RunStats) -> Self {
        let answer = answer.map(|pair| {
            let point = pair.source().geometry();
            JsonAnswer {
                source: pair.source().name(),
                address: sanitize_address(&pair.source().placemark().address),
                lat: point.lat(),
                lng: point.lng(),
                maps_url: maps_url(point),
                target: pair.target().name(),
                distance: pair.distance(),
            }
        });
        Self {
            answer,
            stats: JsonStats {
                sources: stats.sources,
                targets: stats.targets,
                workers: stats.workers,
                candidates: stats.candidates,
                comparisons: stats.comparisons,
                failed_comparisons: stats.failed_comparisons,
                elapsed_ms: stats.elapsed_ms(),
            },
        }
    }

    pub fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
