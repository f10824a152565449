/// Cycle-boundary detection from the piston position signal.
///
/// One cycle is a full back-and-forth traversal of the piston. Its start is
/// marked by a local minimum of the position signal; candidate minima that
/// fall closer together than the debounce gap are counted as one boundary,
/// so sensor noise around the turning point cannot double-count cycles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::extrema::local_minima;
use crate::data::recording::Series;

/// Extremum half-window matched to the logger's sampling rate
pub const DEFAULT_ORDER: usize = 2000;

/// Minimum seconds between two distinct cycle starts
pub const DEFAULT_MIN_GAP_S: f64 = 40.0;

/// Tuning parameters for cycle detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Samples on each side a minimum must dominate
    pub order: usize,
    /// Candidates closer than this to the last accepted start are treated
    /// as noise around the same boundary
    pub min_gap_s: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            min_gap_s: DEFAULT_MIN_GAP_S,
        }
    }
}

/// An accepted cycle start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleEvent {
    /// Seconds since the first sample of the recording
    pub time_s: f64,
    /// Piston position at the cycle start, cm
    pub position: f64,
}

/// Detected cycle starts and the completed cycles between them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleAnalysis {
    /// Accepted cycle starts, strictly increasing in time
    pub events: Vec<CycleEvent>,
    /// Elapsed seconds between consecutive accepted starts
    pub durations_s: Vec<f64>,
}

impl CycleAnalysis {
    /// Number of completed cycles
    pub fn num_cycles(&self) -> usize {
        self.durations_s.len()
    }

    pub fn mean_duration_s(&self) -> Option<f64> {
        if self.durations_s.is_empty() {
            return None;
        }
        Some(self.durations_s.iter().sum::<f64>() / self.durations_s.len() as f64)
    }

    pub fn min_duration_s(&self) -> Option<f64> {
        self.durations_s.iter().copied().reduce(f64::min)
    }

    pub fn max_duration_s(&self) -> Option<f64> {
        self.durations_s.iter().copied().reduce(f64::max)
    }
}

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("series too short for extremum window: {len} samples, need at least {required}")]
    InsufficientData { len: usize, required: usize },
    #[error("time axis not strictly increasing at sample {index}: {prev} then {next}")]
    NonMonotonicTime { index: usize, prev: f64, next: f64 },
}

/// Detect cycle starts in a position series.
///
/// Candidate starts are the windowed local minima of the position values.
/// They are then filtered in time order: the first candidate is accepted
/// unconditionally, and each later one only if at least `min_gap_s` seconds
/// have passed since the last accepted start. Each accepted gap is one
/// completed cycle, so every reported duration is >= `min_gap_s`.
pub fn extract_cycles(series: &Series, config: &CycleConfig) -> Result<CycleAnalysis, CycleError> {
    // An absent or empty position signal means nothing to detect, not a
    // malformed input.
    if series.is_empty() {
        return Ok(CycleAnalysis::default());
    }

    let required = 2 * config.order + 1;
    if series.len() < required {
        return Err(CycleError::InsufficientData {
            len: series.len(),
            required,
        });
    }

    for i in 1..series.time_s.len() {
        if series.time_s[i] <= series.time_s[i - 1] {
            return Err(CycleError::NonMonotonicTime {
                index: i,
                prev: series.time_s[i - 1],
                next: series.time_s[i],
            });
        }
    }

    let candidates = local_minima(&series.values, config.order);
    log::debug!(
        "{} candidate minima at order {}",
        candidates.len(),
        config.order
    );

    let mut analysis = CycleAnalysis::default();
    // Acceptance is tracked explicitly; a start at t = 0.0 is an ordinary
    // boundary, not a "nothing accepted yet" sentinel.
    let mut last_start: Option<f64> = None;

    for &i in &candidates {
        let t = series.time_s[i];
        match last_start {
            None => {
                analysis.events.push(CycleEvent {
                    time_s: t,
                    position: series.values[i],
                });
                last_start = Some(t);
            }
            Some(start) => {
                let delta = t - start;
                if delta < config.min_gap_s {
                    // noise near the previous boundary
                    continue;
                }
                analysis.events.push(CycleEvent {
                    time_s: t,
                    position: series.values[i],
                });
                analysis.durations_s.push(delta);
                last_start = Some(t);
            }
        }
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> Series {
        Series::new(
            points.iter().map(|(t, _)| *t).collect(),
            points.iter().map(|(_, v)| *v).collect(),
        )
    }

    fn config(order: usize, min_gap_s: f64) -> CycleConfig {
        CycleConfig { order, min_gap_s }
    }

    /// Sawtooth with strictly monotone flanks: minima sit exactly at the
    /// requested valley times, nowhere else.
    fn sawtooth(valleys: &[f64], start: f64, end: f64, step: f64) -> Series {
        let mut points = Vec::new();
        let mut t = start;
        while t <= end + 1e-9 {
            let nearest = valleys
                .iter()
                .map(|v| (t - v).abs())
                .fold(f64::INFINITY, f64::min);
            points.push((t, 1.0 + nearest));
            t += step;
        }
        series(&points)
    }

    #[test]
    fn test_no_minima_no_events() {
        // Strictly decreasing: the only minimum is the edge sample, which
        // has no full window.
        let s = series(&[(0.0, 5.0), (1.0, 4.0), (2.0, 3.0), (3.0, 2.0), (4.0, 1.0)]);
        let analysis = extract_cycles(&s, &config(1, 40.0)).unwrap();
        assert!(analysis.events.is_empty());
        assert!(analysis.durations_s.is_empty());
    }

    #[test]
    fn test_single_minimum_single_event() {
        let s = series(&[(0.0, 5.0), (10.0, 1.0), (20.0, 5.0)]);
        let analysis = extract_cycles(&s, &config(1, 40.0)).unwrap();
        assert_eq!(analysis.events.len(), 1);
        assert_eq!(analysis.events[0].time_s, 10.0);
        assert_eq!(analysis.events[0].position, 1.0);
        assert!(analysis.durations_s.is_empty());
        assert_eq!(analysis.num_cycles(), 0);
    }

    #[test]
    fn test_debounce_collapses_nearby_minima() {
        let s = sawtooth(&[10.0, 15.0, 60.0, 65.0, 120.0], 0.0, 125.0, 2.5);
        let analysis = extract_cycles(&s, &config(1, 40.0)).unwrap();

        let times: Vec<f64> = analysis.events.iter().map(|e| e.time_s).collect();
        assert_eq!(times, vec![10.0, 60.0, 120.0]);
        assert_eq!(analysis.durations_s, vec![50.0, 60.0]);
    }

    #[test]
    fn test_durations_at_least_min_gap() {
        let s = sawtooth(&[5.0, 30.0, 55.0, 110.0, 130.0], 0.0, 140.0, 2.5);
        let analysis = extract_cycles(&s, &config(1, 40.0)).unwrap();
        for d in &analysis.durations_s {
            assert!(*d >= 40.0, "duration {d} below the debounce gap");
        }
        for pair in analysis.events.windows(2) {
            assert!(pair[0].time_s < pair[1].time_s);
        }
    }

    #[test]
    fn test_constant_signal_with_two_dips() {
        // Constant 5.0, dips to 1.0 at t=10 and t=60. The flat stretches are
        // all tied minima; the debounce gap absorbs them into the two dips.
        let points: Vec<(f64, f64)> = (0..10)
            .map(|i| {
                let t = i as f64 * 10.0;
                let v = if t == 10.0 || t == 60.0 { 1.0 } else { 5.0 };
                (t, v)
            })
            .collect();
        let analysis = extract_cycles(&series(&points), &config(1, 40.0)).unwrap();

        let times: Vec<f64> = analysis.events.iter().map(|e| e.time_s).collect();
        assert_eq!(times, vec![10.0, 60.0]);
        assert_eq!(analysis.durations_s, vec![50.0]);
    }

    #[test]
    fn test_minimum_at_time_zero_is_accepted() {
        // A genuine boundary on the very first time stamp must not be
        // mistaken for "no event yet".
        let s = series(&[
            (0.0, 5.0),
            (1.0, 1.0),
            (2.0, 5.0),
            (50.0, 6.0),
            (60.0, 1.0),
            (70.0, 6.0),
        ]);
        // Shift so the first accepted minimum lands exactly on t = 0.
        let shifted = Series::new(
            s.time_s.iter().map(|t| t - 1.0).collect(),
            s.values.clone(),
        );
        let analysis = extract_cycles(&shifted, &config(1, 40.0)).unwrap();
        assert_eq!(analysis.events.len(), 2);
        assert_eq!(analysis.events[0].time_s, 0.0);
        assert_eq!(analysis.durations_s, vec![59.0]);
    }

    #[test]
    fn test_empty_series_is_not_an_error() {
        let analysis = extract_cycles(&Series::default(), &config(2000, 40.0)).unwrap();
        assert!(analysis.events.is_empty());
        assert!(analysis.durations_s.is_empty());
    }

    #[test]
    fn test_too_short_series() {
        let s = series(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        let err = extract_cycles(&s, &config(2, 40.0)).unwrap_err();
        match err {
            CycleError::InsufficientData { len, required } => {
                assert_eq!(len, 3);
                assert_eq!(required, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_monotonic_time() {
        let s = series(&[(0.0, 1.0), (1.0, 2.0), (1.0, 3.0), (2.0, 1.0), (3.0, 2.0)]);
        let err = extract_cycles(&s, &config(1, 40.0)).unwrap_err();
        match err {
            CycleError::NonMonotonicTime { index, prev, next } => {
                assert_eq!(index, 2);
                assert_eq!(prev, 1.0);
                assert_eq!(next, 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_summary_accessors() {
        let analysis = CycleAnalysis {
            events: Vec::new(),
            durations_s: vec![50.0, 60.0, 40.0],
        };
        assert_eq!(analysis.num_cycles(), 3);
        assert_eq!(analysis.mean_duration_s(), Some(50.0));
        assert_eq!(analysis.min_duration_s(), Some(40.0));
        assert_eq!(analysis.max_duration_s(), Some(60.0));
        assert_eq!(CycleAnalysis::default().mean_duration_s(), None);
    }
}
