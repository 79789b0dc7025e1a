use crate::domain::model::{CellValue, Table};
use serde::Serialize;

/// 長條圖最多顯示的數值欄位數
pub const MAX_CHART_SERIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// 以列索引為 x 軸的長條圖資料
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
}

/// 取前兩個數值欄位；沒有數值欄位時回傳 None
pub fn bar_chart_data(table: &Table) -> Option<ChartData> {
    let series: Vec<ChartSeries> = table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .take(MAX_CHART_SERIES)
        .map(|c| ChartSeries {
            name: c.name.clone(),
            values: c.values.iter().map(CellValue::as_f64).collect(),
        })
        .collect();

    if series.is_empty() {
        None
    } else {
        Some(ChartData { series })
    }
}

pub fn render_bars(chart: &ChartData, width: usize) -> String {
    let max = chart
        .series
        .iter()
        .flat_map(|s| s.values.iter().flatten())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let label_width = chart
        .series
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for series in &chart.series {
        for (index, value) in series.values.iter().enumerate() {
            let (bar, label) = match value {
                Some(v) => {
                    let len = if max > 0.0 {
                        ((v.abs() / max) * width as f64).round() as usize
                    } else {
                        0
                    };
                    ("█".repeat(len), v.to_string())
                }
                None => (String::new(), "<NA>".to_string()),
            };
            out.push_str(&format!(
                "{:<lw$} [{:>3}] {} {}\n",
                series.name,
                index,
                bar,
                label,
                lw = label_width
            ));
        }
    }
    out
}
