//! Tabular query results and the post-processing applied before display

use std::collections::HashSet;

use moviedash_model::{parse_duration_minutes, DURATION_COLUMN, DURATION_MINUTES_COLUMN};
use serde::Serialize;
use serde_json::{json, Value};

const NUMERIC_COLUMNS: [&str; 2] = ["Rating", "Votes"];

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
}

/// Headline metrics shown above a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<usize>,
}

impl QueryResult {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }

    /// Normalize a raw result for display: numeric coercion, then the derived
    /// duration column.
    pub fn post_process(&mut self) {
        self.coerce_numeric();
        self.add_duration_minutes();
    }

    /// Force `Rating` and `Votes` to numbers. Numeric text is parsed; NULL and
    /// anything unparsable becomes 0.
    pub fn coerce_numeric(&mut self) {
        for name in NUMERIC_COLUMNS {
            let Some(idx) = self.column_index(name) else {
                continue;
            };
            for row in &mut self.rows {
                if let Some(cell) = row.get_mut(idx) {
                    *cell = coerce_number(cell);
                }
            }
        }
    }

    /// Append `Duration_Minutes` when the result has `Duration` but not the
    /// derived column. Unparsable durations become null. Returns whether the
    /// column was added.
    pub fn add_duration_minutes(&mut self) -> bool {
        let Some(idx) = self.column_index(DURATION_COLUMN) else {
            return false;
        };
        if self.has_column(DURATION_MINUTES_COLUMN) {
            return false;
        }

        self.columns.push(DURATION_MINUTES_COLUMN.to_string());
        for row in &mut self.rows {
            let minutes = row
                .get(idx)
                .and_then(Value::as_str)
                .and_then(parse_duration_minutes)
                .map_or(Value::Null, Value::from);
            row.push(minutes);
        }
        true
    }

    pub fn summary(&self) -> ResultSummary {
        let average_rating = self.column("Rating").and_then(|values| {
            let ratings: Vec<f64> = values.into_iter().filter_map(Value::as_f64).collect();
            if ratings.is_empty() {
                None
            } else {
                Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
            }
        });

        let genres = self.column("genre").map(|values| {
            values
                .into_iter()
                .map(Value::to_string)
                .collect::<HashSet<_>>()
                .len()
        });

        ResultSummary {
            total: self.row_count,
            average_rating,
            genres,
        }
    }

    /// `{columns, rows: [{column: value}], row_count}`
    pub fn to_json(&self) -> Value {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let mut row_obj = serde_json::Map::new();
                for (col_name, value) in self.columns.iter().zip(row) {
                    row_obj.insert(col_name.clone(), value.clone());
                }
                Value::Object(row_obj)
            })
            .collect();

        json!({
            "columns": self.columns,
            "rows": rows,
            "row_count": self.row_count
        })
    }
}

fn coerce_number(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Value::from(i)
            } else {
                s.parse::<f64>()
                    .ok()
                    .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                    .unwrap_or_else(|| Value::from(0))
            }
        }
        _ => Value::from(0),
    }
}
