//! Typed column descriptors for the workload list
//!
//! A [`Column`] pairs a header with an accessor over the row type, so the CLI
//! table and the TUI rows are produced from the same definitions.

use crate::models::workload::{MetricSeries, WorkloadSummary};

/// Horizontal alignment of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

type Accessor<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// One column of a table over rows of type `T`
pub struct Column<T> {
    pub title: &'static str,
    pub width: usize,
    pub align: Align,
    accessor: Accessor<T>,
}

impl<T> Column<T> {
    pub fn new(
        title: &'static str,
        width: usize,
        accessor: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            title,
            width,
            align: Align::Left,
            accessor: Box::new(accessor),
        }
    }

    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    /// Cell text for a row, unpadded
    pub fn value(&self, row: &T) -> String {
        (self.accessor)(row)
    }

    /// Cell text for a row, truncated and padded to the column width
    pub fn cell(&self, row: &T) -> String {
        fit(&self.value(row), self.width, self.align)
    }
}

impl<T> std::fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("title", &self.title)
            .field("width", &self.width)
            .field("align", &self.align)
            .finish()
    }
}

/// Truncate `text` to `width` characters (with a trailing `~`) and pad it
fn fit(text: &str, width: usize, align: Align) -> String {
    let len = text.chars().count();
    let shown = if len > width && width > 0 {
        let mut s: String = text.chars().take(width - 1).collect();
        s.push('~');
        s
    } else {
        text.to_string()
    };
    match align {
        Align::Left => format!("{:<width$}", shown, width = width),
        Align::Right => format!("{:>width$}", shown, width = width),
    }
}

/// Render rows as a plain-text table, two spaces between columns
pub fn render_table<T>(columns: &[Column<T>], rows: &[T]) -> String {
    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .map(|c| fit(c.title, c.width, c.align))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = columns.iter().map(|c| c.cell(row)).collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    out
}

const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_ASCII: [char; 8] = ['_', '.', '-', '~', '=', '+', '*', '#'];

/// Render the last `width` samples of a percent series as a sparkline
pub fn sparkline(series: &MetricSeries, width: usize, ascii: bool) -> String {
    let glyphs = if ascii { &SPARK_ASCII } else { &SPARK_BLOCKS };
    let skip = series.len().saturating_sub(width);
    series
        .values()
        .skip(skip)
        .map(|v| {
            let level = (v.clamp(0.0, 100.0) / 100.0 * 7.0).round() as usize;
            glyphs[level.min(7)]
        })
        .collect()
}

fn usage_cell(series: &MetricSeries, ascii: bool) -> String {
    let latest = series
        .latest()
        .map(|v| format!("{:.0}%", v))
        .unwrap_or_else(|| "-".to_string());
    format!("{} {:>4}", sparkline(series, 10, ascii), latest)
}

/// Columns of the workload list
///
/// `ascii` swaps the block sparkline glyphs for plain characters.
pub fn workload_columns(ascii: bool) -> Vec<Column<WorkloadSummary>> {
    vec![
        Column::new("NAME", 28, |w: &WorkloadSummary| w.name.clone()),
        Column::new("STATUS", 9, |w: &WorkloadSummary| {
            w.status.label().to_string()
        }),
        Column::new("CREATED", 16, |w: &WorkloadSummary| w.created_display()),
        Column::new("CPU", 15, move |w: &WorkloadSummary| {
            usage_cell(&w.cpu_usage, ascii)
        }),
        Column::new("MEMORY", 15, move |w: &WorkloadSummary| {
            usage_cell(&w.memory_usage, ascii)
        }),
        Column::new("REPLICAS", 10, |w: &WorkloadSummary| w.replicas_display()).right(),
        Column::new("STORAGE", 7, |w: &WorkloadSummary| {
            if w.storage_gib == 0 {
                "-".to_string()
            } else {
                format!("{}Gi", w.storage_gib)
            }
        })
        .right(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workload::MetricSample;

    #[test]
    fn test_fit_truncates_and_pads() {
        assert_eq!(fit("abc", 5, Align::Left), "abc  ");
        assert_eq!(fit("abc", 5, Align::Right), "  abc");
        assert_eq!(fit("abcdefgh", 5, Align::Left), "abcd~");
    }

    #[test]
    fn test_sparkline_levels() {
        let mut series = MetricSeries::new(4);
        series.extend([
            MetricSample::new(1, 0.0),
            MetricSample::new(2, 50.0),
            MetricSample::new(3, 100.0),
            MetricSample::new(4, 250.0),
        ]);
        assert_eq!(sparkline(&series, 4, false), "▁▅██");
        assert_eq!(sparkline(&series, 2, true), "##");
    }

    #[test]
    fn test_usage_cell_without_data() {
        let series = MetricSeries::new(3);
        assert_eq!(usage_cell(&series, true), "___    -");
    }
}
