//! JSON and YAML transformers

use super::text::utf8;
use crate::error::{Error, Result};
use bytes::Bytes;

/// Parse JSON and re-serialize it as YAML
pub fn json_to_yaml(data: &Bytes) -> Result<Bytes> {
    let value: serde_json::Value = serde_json::from_slice(data)
        .map_err(|e| Error::Conversion(format!("invalid json: {}", e)))?;
    let yaml = serde_yaml::to_string(&value)
        .map_err(|e| Error::Conversion(format!("yaml encode: {}", e)))?;
    Ok(Bytes::from(yaml))
}

/// JSON bytes as plain text
pub fn json_to_text(data: &Bytes) -> Result<Bytes> {
    utf8(data, "json")?;
    Ok(data.clone())
}

/// Parse YAML and render it as indented JSON text
pub fn yaml_to_text(data: &Bytes) -> Result<Bytes> {
    let value: serde_yaml::Value = serde_yaml::from_slice(data)
        .map_err(|e| Error::Conversion(format!("invalid yaml: {}", e)))?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| Error::Conversion(format!("yaml is not representable as json: {}", e)))?;
    Ok(Bytes::from(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_yaml_round_trip() {
        let original = json!({
            "name": "fragment",
            "tags": ["a", "b"],
            "nested": {"n": 1, "f": 2.5, "ok": true, "none": null}
        });
        let yaml = json_to_yaml(&Bytes::from(serde_json::to_vec(&original).unwrap())).unwrap();
        let reparsed: serde_json::Value = serde_yaml::from_slice(&yaml).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_json_to_yaml_rejects_malformed() {
        let result = json_to_yaml(&Bytes::from_static(b"{not json"));
        assert!(matches!(result, Err(Error::Conversion(_))));
    }

    #[test]
    fn test_json_to_text_is_verbatim() {
        let data = Bytes::from_static(br#"{"a": 1}"#);
        assert_eq!(json_to_text(&data).unwrap(), data);
    }

    #[test]
    fn test_yaml_to_text_is_indented_json() {
        let out = yaml_to_text(&Bytes::from_static(b"a: 1\nb:\n  - x\n  - y\n")).unwrap();
        let text = String::from_utf8(out.to_vec()).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("  \"a\": 1"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"a": 1, "b": ["x", "y"]}));
    }

    #[test]
    fn test_yaml_to_text_rejects_malformed() {
        let result = yaml_to_text(&Bytes::from_static(b"a: [unclosed"));
        assert!(matches!(result, Err(Error::Conversion(_))));
    }
}
