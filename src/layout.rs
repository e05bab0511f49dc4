use serde::Serialize;

use crate::color::{self, Rgb};
use crate::metrics::{AugmentedDataset, Measured};
use crate::thresholds::Thresholds;
use crate::units::TimeUnit;

/// Thickness of the lead-time bar, in slot units.
pub const OUTER_HEIGHT: f64 = 0.8;
/// Thickness of the process-time bar, in slot units.
pub const INNER_HEIGHT: f64 = 0.6;

const ROLLUP_OUTER_OPACITY: f64 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Task,
    Rollup,
}

/// A horizontal bar: left edge, length along the time axis, thickness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub offset: f64,
    pub width: f64,
    pub height: f64,
}

impl Bar {
    pub fn end(&self) -> f64 {
        self.offset + self.width
    }
}

/// Text attached to a bar. `x` is the anchor on the time axis: the bar's
/// left edge for left labels, its right edge for right labels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub color: Rgb,
    pub x: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutElement {
    pub row_name: String,
    pub kind: RowKind,
    /// Vertical slot counted from the bottom; the rollup sits in slot 0.
    pub slot: usize,
    pub bar_outer: Bar,
    pub bar_inner: Bar,
    /// Seed color; the fills and outline are derived from it.
    pub color: Rgb,
    pub outer_color: Rgb,
    pub outer_opacity: f64,
    pub inner_color: Rgb,
    pub outline_color: Rgb,
    /// Idle time, anchored at the left edge.
    pub label_left: Option<Label>,
    /// Completeness, anchored at the right edge.
    pub label_right: Option<Label>,
    /// Efficiency caption centered on the rollup's process-time bar.
    pub caption: Option<Label>,
}

/// Renders a number with at most two decimals and no trailing zeros.
pub fn format_value(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

struct Placement {
    kind: RowKind,
    slot: usize,
    offset: f64,
    color: Rgb,
}

fn place(
    row: &Measured,
    at: Placement,
    thresholds: &Thresholds,
    unit: TimeUnit,
) -> LayoutElement {
    let Placement {
        kind,
        slot,
        offset,
        color: base,
    } = at;
    let is_task = kind == RowKind::Task;

    let bar_outer = Bar {
        offset,
        width: row.lead_time,
        height: OUTER_HEIGHT,
    };
    let bar_inner = Bar {
        offset: offset + row.lead_time - row.process_time,
        width: row.process_time,
        height: INNER_HEIGHT,
    };

    let label_right = (row.completeness_rate > 0.0).then(|| Label {
        text: format!("{}%", format_value(row.completeness_rate)),
        color: if is_task && thresholds.is_high_error(row) {
            color::FIREBRICK
        } else {
            color::DARK_GRAY
        },
        x: bar_outer.end(),
    });

    let label_left = (row.activity_ratio > 0.0).then(|| Label {
        text: format!("{}{}", format_value(row.activity_ratio), unit.suffix()),
        color: if is_task && thresholds.is_long_lead(row) {
            color::DARK_ORANGE
        } else {
            color::DARK_GRAY
        },
        x: bar_outer.offset,
    });

    let (outer_color, outer_opacity, inner_color, caption) = if is_task {
        (color::soften(base), 1.0, color::emphasize(base), None)
    } else {
        let caption = row.efficiency().map(|efficiency| Label {
            text: format!("{efficiency:.2}% Efficiency"),
            color: color::WHITE,
            x: bar_inner.offset + bar_inner.width / 2.0,
        });
        (base, ROLLUP_OUTER_OPACITY, base, caption)
    };

    LayoutElement {
        row_name: row.name.clone(),
        kind,
        slot,
        bar_outer,
        bar_inner,
        color: base,
        outer_color,
        outer_opacity,
        inner_color,
        outline_color: color::mute(base),
        label_left,
        label_right,
        caption,
    }
}

/// Positions every row on the shared time axis.
///
/// Task bars are stacked end to end in input order, the first task on top.
/// The rollup restarts at offset 0 in the bottom slot so its length can be
/// compared against the whole stack above it. The output has one element per
/// row, tasks first, rollup last.
pub fn layout(
    dataset: &AugmentedDataset,
    thresholds: &Thresholds,
    unit: TimeUnit,
) -> Vec<LayoutElement> {
    let task_count = dataset.tasks.len();
    let palette = color::viridis(task_count);

    let tasks = dataset
        .tasks
        .iter()
        .zip(palette.iter().rev())
        .enumerate()
        .scan(0.0, |offset, (i, (row, &seed))| {
            let at = Placement {
                kind: RowKind::Task,
                slot: task_count - i,
                offset: *offset,
                color: seed,
            };
            *offset += row.lead_time;
            Some(place(row, at, thresholds, unit))
        });

    let rollup = place(
        &dataset.rollup,
        Placement {
            kind: RowKind::Rollup,
            slot: 0,
            offset: 0.0,
            color: color::GRAY,
        },
        thresholds,
        unit,
    );

    tasks.chain(std::iter::once(rollup)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Row};
    use crate::metrics::augment;
    use crate::thresholds::select;

    fn plan(rows: &[(&str, f64, f64, f64)], k: usize) -> Vec<LayoutElement> {
        let data: Dataset = rows
            .iter()
            .map(|&(n, lt, pt, ca)| Row::new(n, lt, pt, ca))
            .collect();
        let augmented = augment(&data);
        let thresholds = select(&augmented, k);
        layout(&augmented, &thresholds, TimeUnit::Hours)
    }

    fn scenario() -> Vec<LayoutElement> {
        plan(
            &[("A", 10.0, 8.0, 90.0), ("B", 20.0, 15.0, 0.0), ("C", 5.0, 5.0, 95.0)],
            1,
        )
    }

    #[test]
    fn task_offsets_accumulate_and_rollup_restarts() {
        let elements = scenario();
        let offsets: Vec<f64> = elements.iter().map(|e| e.bar_outer.offset).collect();
        assert_eq!(offsets, [0.0, 10.0, 30.0, 0.0]);
        assert_eq!(elements[3].kind, RowKind::Rollup);
        assert_eq!(elements[3].bar_outer.width, 35.0);
    }

    #[test]
    fn one_element_per_row_with_descending_slots() {
        let elements = scenario();
        assert_eq!(elements.len(), 4);
        let slots: Vec<usize> = elements.iter().map(|e| e.slot).collect();
        assert_eq!(slots, [3, 2, 1, 0]);
    }

    #[test]
    fn inner_bar_is_right_aligned() {
        let elements = scenario();
        let b = &elements[1];
        assert_eq!(b.bar_inner.offset, 15.0);
        assert_eq!(b.bar_inner.end(), b.bar_outer.end());
        assert_eq!(b.bar_outer.height, OUTER_HEIGHT);
        assert_eq!(b.bar_inner.height, INNER_HEIGHT);
    }

    #[test]
    fn labels_follow_values_and_outliers() {
        let elements = scenario();
        let (a, b, c, overall) = (&elements[0], &elements[1], &elements[2], &elements[3]);

        let a_right = a.label_right.as_ref().unwrap();
        assert_eq!(a_right.text, "90%");
        assert_eq!(a_right.color, color::FIREBRICK);
        assert_eq!(a_right.x, 10.0);
        assert_eq!(a.label_left.as_ref().unwrap().color, color::DARK_GRAY);

        assert!(b.label_right.is_none());
        let b_left = b.label_left.as_ref().unwrap();
        assert_eq!(b_left.text, "5h");
        assert_eq!(b_left.color, color::DARK_ORANGE);
        assert_eq!(b_left.x, 10.0);

        assert!(c.label_left.is_none());
        assert_eq!(c.label_right.as_ref().unwrap().color, color::DARK_GRAY);

        assert_eq!(overall.label_right.as_ref().unwrap().text, "85.5%");
        assert_eq!(overall.label_right.as_ref().unwrap().color, color::DARK_GRAY);
        assert_eq!(overall.label_left.as_ref().unwrap().color, color::DARK_GRAY);
    }

    #[test]
    fn rollup_is_never_flagged() {
        // k large enough that every positive value, the rollup's included, is
        // at or past the cutoff.
        let elements = plan(&[("A", 4.0, 1.0, 50.0), ("B", 2.0, 1.0, 60.0)], 10);
        let overall = elements.last().unwrap();
        assert_eq!(overall.label_right.as_ref().unwrap().color, color::DARK_GRAY);
        assert_eq!(overall.label_left.as_ref().unwrap().color, color::DARK_GRAY);
        assert_eq!(elements[0].label_right.as_ref().unwrap().color, color::FIREBRICK);
    }

    #[test]
    fn rollup_uses_neutral_colors_and_caption() {
        let elements = scenario();
        let overall = &elements[3];
        assert_eq!(overall.color, color::GRAY);
        assert_eq!(overall.outer_opacity, ROLLUP_OUTER_OPACITY);
        let caption = overall.caption.as_ref().unwrap();
        assert_eq!(caption.text, "80.00% Efficiency");
        assert_eq!(caption.x, 21.0);
        assert!(elements[..3].iter().all(|e| e.caption.is_none()));
    }

    #[test]
    fn task_colors_come_from_one_seed() {
        let elements = scenario();
        let palette = color::viridis(3);
        assert_eq!(elements[0].color, palette[2]);
        assert_eq!(elements[2].color, palette[0]);
        let a = &elements[0];
        assert_eq!(a.outer_color, color::soften(a.color));
        assert_eq!(a.inner_color, color::emphasize(a.color));
        assert_eq!(a.outline_color, color::mute(a.color));
    }

    #[test]
    fn unit_suffix_on_idle_label() {
        let data: Dataset = [Row::new("A", 16.0, 8.0, 0.0)].into_iter().collect();
        let days = crate::units::convert(&data, TimeUnit::Days);
        let augmented = augment(&days);
        let elements = layout(&augmented, &select(&augmented, 1), TimeUnit::Days);
        assert_eq!(elements[0].label_left.as_ref().unwrap().text, "1d");
    }

    #[test]
    fn empty_dataset_yields_only_rollup() {
        let elements = plan(&[], 3);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, RowKind::Rollup);
        assert!(elements[0].caption.is_none());
    }

    #[test]
    fn repeated_runs_are_identical() {
        assert_eq!(scenario(), scenario());
    }

    #[test]
    fn formats_values_compactly() {
        assert_eq!(format_value(90.0), "90");
        assert_eq!(format_value(85.5), "85.5");
        assert_eq!(format_value(2.0 / 3.0), "0.67");
        assert_eq!(format_value(0.001), "0");
    }
}
