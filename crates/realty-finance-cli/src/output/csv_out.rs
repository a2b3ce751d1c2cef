use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Results become a two-column field/value listing. A result carrying a
/// `schedule` array lists its summary fields first, then one row per period.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    write_csv(stdout.lock(), value);
}

fn write_csv<W: io::Write>(out: W, value: &Value) {
    // Summary and schedule blocks differ in width
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                if let Some(Value::Array(rows)) = result.get("schedule") {
                    let mut summary = result.clone();
                    summary.remove("schedule");
                    write_fields_csv(&mut wtr, &summary);
                    write_array_csv(&mut wtr, rows);
                } else {
                    write_fields_csv(&mut wtr, result);
                }
            } else {
                write_fields_csv(&mut wtr, map);
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields_csv<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &serde_json::Map<String, Value>,
) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        match val {
            // Flatten one level so breakdown factors get their own rows
            Value::Object(nested) => {
                for (inner_key, inner_val) in nested {
                    let name = format!("{key}.{inner_key}");
                    let _ = wtr.write_record([name.as_str(), &format_csv_value(inner_val)]);
                }
            }
            _ => {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_schedule_output_keeps_summary_fields() {
        let value = json!({
            "result": {
                "basePayment": "105",
                "totalInterest": "10",
                "totalPaid": "210",
                "truncated": false,
                "schedule": [
                    {"period": 1, "payment": "105", "balance": "100"},
                    {"period": 2, "payment": "105", "balance": "0"}
                ]
            }
        });
        let out = render(&value);

        for line in ["basePayment,105", "totalInterest,10", "totalPaid,210", "truncated,false"] {
            assert!(out.contains(line), "missing {line:?} in:\n{out}");
        }
        assert!(!out.contains("schedule"));
        let lines: Vec<&str> = out.lines().collect();
        let header = lines.iter().position(|l| l.contains("period")).unwrap();
        assert_eq!(lines[header].split(',').count(), 3);
        assert_eq!(lines.len(), header + 3);
        let mut last: Vec<&str> = lines[header + 2].split(',').collect();
        last.sort_unstable();
        assert_eq!(last, vec!["0", "105", "2"]);
    }

    #[test]
    fn test_nested_objects_flatten_one_level() {
        let value = json!({"result": {"breakdown": {"roadFactor": "1.03"}}});
        assert_eq!(render(&value), "field,value\nbreakdown.roadFactor,1.03\n");
    }
}
