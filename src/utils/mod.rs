use serde_json::Value;
use std::path::PathBuf;

/// Integer out of a JSON number or numeric string; anything else is None.
pub fn int_or_none(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float out of a JSON number or numeric string, divided by `scale`.
pub fn float_or_none(value: Option<&Value>, scale: f64) -> Option<f64> {
    let raw = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    Some(raw / scale)
}

pub fn sanitize_filename(filename: &str) -> String {
    // Remove or replace characters that are invalid in filenames
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '-',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

pub fn generate_output_filename(template: &str, record: &crate::core::MediaRecord) -> PathBuf {
    // Get the best format for determining extension
    let best_format = record
        .formats
        .iter()
        .max_by_key(|f| f.tbr.unwrap_or(0.0) as i32)
        .or_else(|| record.formats.first());

    let ext = best_format.map(|f| f.ext.as_str()).unwrap_or("mp4");

    // Simple template replacement
    let filename = template
        .replace("%(title)s", &sanitize_filename(&record.title))
        .replace("%(id)s", &record.id)
        .replace("%(ext)s", ext);

    PathBuf::from(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("hello/world"), "hello-world");
        assert_eq!(sanitize_filename("test<>file"), "test__file");
        assert_eq!(sanitize_filename("normal_file.mp4"), "normal_file.mp4");
    }

    #[test]
    fn test_int_or_none_is_total() {
        assert_eq!(int_or_none(Some(&json!("not a number"))), None);
        assert_eq!(int_or_none(None), None);
        assert_eq!(int_or_none(Some(&Value::Null)), None);
        assert_eq!(int_or_none(Some(&json!("42"))), Some(42));
        assert_eq!(int_or_none(Some(&json!(42))), Some(42));
        assert_eq!(int_or_none(Some(&json!(" 7 "))), Some(7));
        assert_eq!(int_or_none(Some(&json!([1, 2]))), None);
    }

    #[test]
    fn test_float_or_none_scaling() {
        assert_eq!(
            float_or_none(Some(&json!(1530634789610_i64)), 1000.0),
            Some(1530634789.61)
        );
        assert_eq!(float_or_none(Some(&json!("2500")), 1000.0), Some(2.5));
        assert_eq!(float_or_none(Some(&json!("n/a")), 1000.0), None);
        assert_eq!(float_or_none(None, 1.0), None);
    }
}
