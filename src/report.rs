/// Analysis report assembly and export
///
/// Collects what one run produced (the channel grouping and the detected
/// cycles) into a single structure exportable as human-readable text or
/// JSON. The JSON form is what a downstream plotting tool consumes to draw
/// cycle markers and annotations.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::analysis::cycles::CycleAnalysis;
use crate::data::recording::{ChannelRole, Recording};

/// Aggregate cycle statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycles: usize,
    pub mean_s: Option<f64>,
    pub min_s: Option<f64>,
    pub max_s: Option<f64>,
}

impl From<&CycleAnalysis> for CycleSummary {
    fn from(analysis: &CycleAnalysis) -> Self {
        Self {
            cycles: analysis.num_cycles(),
            mean_s: analysis.mean_duration_s(),
            min_s: analysis.min_duration_s(),
            max_s: analysis.max_duration_s(),
        }
    }
}

/// Full report for one analyzed recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source_file: String,
    pub title: String,
    pub generated: DateTime<Local>,
    pub samples: usize,
    pub duration_s: f64,
    pub temperature_channels: Vec<String>,
    pub pressure_channels: Vec<String>,
    pub position_channels: Vec<String>,
    pub unclassified_channels: Vec<String>,
    /// None when cycle detection was skipped
    pub cycles: Option<CycleAnalysis>,
    pub summary: Option<CycleSummary>,
}

impl AnalysisReport {
    pub fn new(recording: &Recording, cycles: Option<CycleAnalysis>) -> Self {
        let names = |role: ChannelRole| -> Vec<String> {
            recording
                .channels_with_role(&role)
                .iter()
                .map(|c| c.name.clone())
                .collect()
        };

        Self {
            source_file: recording.source_path.display().to_string(),
            title: recording.title.clone(),
            generated: Local::now(),
            samples: recording.num_samples(),
            duration_s: recording.duration_s(),
            temperature_channels: names(ChannelRole::Temperature),
            pressure_channels: names(ChannelRole::Pressure),
            position_channels: names(ChannelRole::Position),
            unclassified_channels: names(ChannelRole::Unclassified),
            summary: cycles.as_ref().map(CycleSummary::from),
            cycles,
        }
    }

    /// Export as human-readable text
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════════════\n");
        out.push_str("  Cycle-Time Analysis\n");
        out.push_str("═══════════════════════════════════════════════════\n");
        out.push_str(&format!("  Source:    {}\n", self.source_file));
        for line in self.title.lines() {
            out.push_str(&format!("  Title:     {}\n", line));
        }
        out.push_str(&format!(
            "  Samples:   {} over {:.1} s\n",
            self.samples, self.duration_s
        ));
        out.push_str(&format!(
            "  Generated: {}\n",
            self.generated.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("───────────────────────────────────────────────────\n");
        out.push_str(&format!(
            "  Temperature:  {}\n",
            join_or_dash(&self.temperature_channels)
        ));
        out.push_str(&format!(
            "  Pressure:     {}\n",
            join_or_dash(&self.pressure_channels)
        ));
        out.push_str(&format!(
            "  Position:     {}\n",
            join_or_dash(&self.position_channels)
        ));
        if !self.unclassified_channels.is_empty() {
            out.push_str(&format!(
                "  Unclassified: {}\n",
                join_or_dash(&self.unclassified_channels)
            ));
        }

        if let Some(cycles) = &self.cycles {
            out.push_str("───────────────────────────────────────────────────\n");
            if cycles.events.is_empty() {
                out.push_str("  No cycle starts detected\n");
            } else {
                out.push_str("  Cycle starts:\n");
                for (n, event) in cycles.events.iter().enumerate() {
                    out.push_str(&format!(
                        "    [{:3}]  t = {:10.3} s   pos = {:7.3} cm\n",
                        n + 1,
                        event.time_s,
                        event.position
                    ));
                }
            }
            if let Some(summary) = &self.summary {
                if summary.cycles > 0 {
                    out.push_str(&format!(
                        "  Cycles: {}   mean {:.3} s   min {:.3} s   max {:.3} s\n",
                        summary.cycles,
                        summary.mean_s.unwrap_or(0.0),
                        summary.min_s.unwrap_or(0.0),
                        summary.max_s.unwrap_or(0.0)
                    ));
                }
            }
        }
        out.push_str("═══════════════════════════════════════════════════\n");
        out
    }

    /// Export as pretty-printed JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

fn join_or_dash(names: &[String]) -> String {
    if names.is_empty() {
        "—".to_string()
    } else {
        names.join(", ")
    }
}
