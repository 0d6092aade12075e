//! Coordinates for the execution chart: one banded row per shard, one bar
//! per execution event, and a time axis along the top.

use crate::{Time, Timeline};
use chrono::{TimeZone, Utc};
use serde::Serialize;

const AXIS_SPACE: f64 = 30.0;
const ROW_HEIGHT: f64 = 25.0;
const CHAR_WIDTH: f64 = 7.5;
const PIXELS_PER_TICK: f64 = 50.0;
const BAND_PADDING: f64 = 0.4;

/// Continuous mapping from `domain` onto `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
  pub domain: (f64, f64),
  pub range: (f64, f64),
}

impl LinearScale {
  pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
    LinearScale { domain, range }
  }

  pub fn map(&self, value: f64) -> f64 {
    let (d0, d1) = self.domain;
    let (r0, r1) = self.range;
    let span = d1 - d0;
    // a collapsed domain maps everything to the middle of the range
    let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
    r0 + t * (r1 - r0)
  }

  /// Roughly `count` round values inside the domain, spaced 1, 2 or 5
  /// times a power of ten.
  pub fn ticks(&self, count: usize) -> Vec<f64> {
    let (d0, d1) = self.domain;
    let (start, stop, reversed) = if d1 < d0 {
      (d1, d0, true)
    } else {
      (d0, d1, false)
    };

    let mut ticks = if start == stop {
      vec![start]
    } else {
      tick_values(start, stop, count as f64)
    };

    if reversed {
      ticks.reverse();
    }
    ticks
  }
}

fn tick_values(start: f64, stop: f64, count: f64) -> Vec<f64> {
  if count <= 0.0 || !start.is_finite() || !stop.is_finite() {
    return vec![];
  }

  let step = (stop - start) / count;
  let power = step.log10().floor();
  let error = step / 10f64.powf(power);
  let factor = if error >= 50f64.sqrt() {
    10.0
  } else if error >= 10f64.sqrt() {
    5.0
  } else if error >= 2f64.sqrt() {
    2.0
  } else {
    1.0
  };

  if power < 0.0 {
    let inverse = 10f64.powf(-power) / factor;
    let mut first = (start * inverse).round();
    let mut last = (stop * inverse).round();
    if first / inverse < start {
      first += 1.0;
    }
    if last / inverse > stop {
      last -= 1.0;
    }
    if last < first && (0.5..2.0).contains(&count) {
      return tick_values(start, stop, count * 2.0);
    }
    steps(first, last).map(|i| i / inverse).collect()
  } else {
    let increment = 10f64.powf(power) * factor;
    let mut first = (start / increment).round();
    let mut last = (stop / increment).round();
    if first * increment < start {
      first += 1.0;
    }
    if last * increment > stop {
      last -= 1.0;
    }
    if last < first && (0.5..2.0).contains(&count) {
      return tick_values(start, stop, count * 2.0);
    }
    steps(first, last).map(|i| i * increment).collect()
  }
}

fn steps(first: f64, last: f64) -> impl Iterator<Item = f64> {
  let count = if last < first {
    0
  } else {
    (last - first) as usize + 1
  };
  (0..count).map(move |i| first + i as f64)
}

/// Discrete bands with equal inner and outer padding, centred in `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandScale {
  pub count: usize,
  pub range: (f64, f64),
  pub padding: f64,
}

impl BandScale {
  pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
    BandScale {
      count,
      range,
      padding,
    }
  }

  pub fn step(&self) -> f64 {
    let (r0, r1) = self.range;
    let slots = self.count as f64 - self.padding + 2.0 * self.padding;
    (r1 - r0) / slots.max(1.0)
  }

  pub fn bandwidth(&self) -> f64 {
    self.step() * (1.0 - self.padding)
  }

  fn offset(&self) -> f64 {
    let (r0, r1) = self.range;
    r0 + (r1 - r0 - self.step() * (self.count as f64 - self.padding)) * 0.5
  }

  pub fn position(&self, index: usize) -> f64 {
    self.offset() + self.step() * index as f64
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
  pub time: Time,
  pub offset: f64,
  /// `HH:MM`, UTC.
  pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
  pub label: String,
  pub x: f64,
  pub width: f64,
  pub height: f64,
  /// Position of the bar within its shard, 0 for the first event and 1 for
  /// the last; callers map it onto a colour ramp.
  pub colour: f64,
}

/// Background strip behind a row, shifted up by half the band padding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strip {
  pub y_offset: f64,
  pub width: f64,
  pub height: f64,
  pub filled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
  pub label: String,
  pub call_index: usize,
  pub y: f64,
  pub strip: Strip,
  pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotArea {
  pub width: f64,
  pub height: f64,
  pub margin_left: f64,
  pub margin_top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
  pub width: f64,
  pub height: f64,
  pub label_width: f64,
  pub plot: PlotArea,
  pub x: LinearScale,
  pub y: BandScale,
  pub ticks: Vec<Tick>,
  pub rows: Vec<ChartRow>,
}

fn millis(time: &Time) -> f64 {
  time.timestamp_millis() as f64
}

impl ChartLayout {
  pub fn new(timeline: &Timeline, width: f64) -> Self {
    let row_count = timeline.shard_count();
    let longest_name = timeline
      .calls
      .iter()
      .map(|call| call.call_name.chars().count())
      .max()
      .unwrap_or(0);

    // two extra characters for the shard suffix
    let label_width = (longest_name + 2) as f64 * CHAR_WIDTH;
    let height = row_count as f64 * ROW_HEIGHT + 2.0 * AXIS_SPACE;
    let plot = PlotArea {
      width: width - 2.0 * AXIS_SPACE - label_width,
      height: height - 2.0 * AXIS_SPACE,
      margin_left: AXIS_SPACE + label_width,
      margin_top: AXIS_SPACE,
    };

    let domain = match (&timeline.start, &timeline.end) {
      (Some(start), Some(end)) => (millis(start), millis(end)),
      _ => (0.0, 0.0),
    };
    let x = LinearScale::new(domain, (0.0, plot.width));
    let y = BandScale::new(row_count, (0.0, plot.height), BAND_PADDING);

    let ticks = if timeline.is_empty() {
      vec![]
    } else {
      let target = (plot.width / PIXELS_PER_TICK).floor().max(1.0) as usize;
      x.ticks(target)
        .into_iter()
        .filter_map(|value| {
          let time = Utc.timestamp_millis_opt(value as i64).single()?;
          Some(Tick {
            time,
            offset: x.map(value),
            label: time.format("%H:%M").to_string(),
          })
        })
        .collect()
    };

    let mut rows = Vec::with_capacity(row_count);
    for (call_index, call) in timeline.calls.iter().enumerate() {
      let sharded = call.shards.len() > 1;
      for shard in &call.shards {
        let label = match shard.shard_index {
          Some(index) if sharded => format!("{}.{}", call.call_name, index),
          _ => call.call_name.clone(),
        };

        let last = shard.events.len().saturating_sub(1);
        let bars = shard
          .events
          .iter()
          .enumerate()
          .map(|(k, event)| {
            let start = x.map(millis(&event.start));
            Bar {
              label: event.label.clone(),
              x: start,
              width: x.map(millis(&event.end)) - start,
              height: y.bandwidth(),
              colour: if last == 0 { 0.0 } else { k as f64 / last as f64 },
            }
          })
          .collect();

        let row_y = y.position(rows.len());
        rows.push(ChartRow {
          label,
          call_index,
          y: row_y,
          strip: Strip {
            y_offset: -(y.step() * y.padding) / 2.0,
            width: plot.width,
            height: y.step(),
            filled: call_index % 2 == 0,
          },
          bars,
        });
      }
    }

    ChartLayout {
      width,
      height,
      label_width,
      plot,
      x,
      y,
      ticks,
      rows,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}
