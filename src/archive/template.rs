//! Path template expansion.
//!
//! Templates such as `{Y_create}-{m_create}/{filename}` are populated from an
//! asset's metadata plus four derived date fields (`Y_create`, `m_create`,
//! `Y_mod`, `m_mod`: 4-digit year and zero-padded month, UTC). Expansion is a
//! pure function of the metadata, so the same asset always maps to the same
//! path.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike};

use super::error::ArchiveError;
use crate::types::Asset;

/// Build the template-expansion dictionary for one asset.
///
/// Fails with `MissingField` when `creation_date` or `modification_date` is
/// absent, since the derived year/month fields cannot be computed.
pub fn expansion_map(asset: &Asset) -> Result<BTreeMap<&'static str, String>, ArchiveError> {
    let mut map = BTreeMap::new();
    map.insert("local_id", asset.local_id.clone());
    map.insert("filename", asset.filename.clone());
    map.insert(
        "media_type",
        match serde_json::to_value(asset.media_type) {
            Ok(serde_json::Value::String(s)) => s,
            _ => "unknown".to_string(),
        },
    );
    map.insert("pixel_width", asset.pixel_width.to_string());
    map.insert("pixel_height", asset.pixel_height.to_string());

    for (suffix, field, value) in [
        ("create", "creation_date", asset.creation_date),
        ("mod", "modification_date", asset.modification_date),
    ] {
        let ts = value.ok_or_else(|| ArchiveError::MissingField {
            local_id: asset.local_id.clone(),
            field,
        })?;
        let date: DateTime<chrono::Utc> =
            DateTime::from_timestamp(ts, 0).ok_or_else(|| ArchiveError::InvalidTimestamp {
                local_id: asset.local_id.clone(),
                value: ts,
            })?;
        map.insert(
            match suffix {
                "create" => "Y_create",
                _ => "Y_mod",
            },
            format!("{:04}", date.year()),
        );
        map.insert(
            match suffix {
                "create" => "m_create",
                _ => "m_mod",
            },
            format!("{:02}", date.month()),
        );
        map.insert(field, ts.to_string());
    }

    Ok(map)
}

/// Expand `{field}` placeholders in a single pass over the template.
///
/// Unknown placeholders are an error rather than passing through silently: a
/// typo in a path template must not scatter files under literal `{...}`
/// directory names.
pub fn expand(template: &str, fields: &BTreeMap<&'static str, String>) -> Result<String, ArchiveError> {
    let mut result = String::with_capacity(template.len() + 16);
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '{' {
            result.push(c);
            continue;
        }
        let mut name = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => {
                    return Err(ArchiveError::UnterminatedPlaceholder {
                        template: template.to_string(),
                    })
                }
            }
        }
        match fields.get(name.as_str()) {
            Some(value) => result.push_str(value),
            None => return Err(ArchiveError::UnknownPlaceholder { name }),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaType;

    fn asset() -> Asset {
        Asset {
            local_id: "AAAA-1111".to_string(),
            media_type: MediaType::Image,
            pixel_width: 4032,
            pixel_height: 3024,
            media_subtypes: vec![],
            // 2025-01-15 00:00:00 UTC
            creation_date: Some(1_736_899_200),
            // 2025-03-02 00:00:00 UTC
            modification_date: Some(1_740_873_600),
            hidden: false,
            favorite: false,
            duration: 0.0,
            location: None,
            filename: "IMG_0001.JPG".to_string(),
        }
    }

    #[test]
    fn test_expansion_map_derived_fields() {
        let map = expansion_map(&asset()).unwrap();
        assert_eq!(map["Y_create"], "2025");
        assert_eq!(map["m_create"], "01");
        assert_eq!(map["Y_mod"], "2025");
        assert_eq!(map["m_mod"], "03");
        assert_eq!(map["local_id"], "AAAA-1111");
        assert_eq!(map["filename"], "IMG_0001.JPG");
        assert_eq!(map["media_type"], "image");
    }

    #[test]
    fn test_expansion_map_zero_pads_month() {
        let mut a = asset();
        // 2024-07-04 00:00:00 UTC
        a.creation_date = Some(1_720_051_200);
        let map = expansion_map(&a).unwrap();
        assert_eq!(map["Y_create"], "2024");
        assert_eq!(map["m_create"], "07");
    }

    #[test]
    fn test_expansion_map_missing_creation_date() {
        let mut a = asset();
        a.creation_date = None;
        let err = expansion_map(&a).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::MissingField {
                field: "creation_date",
                ..
            }
        ));
    }

    #[test]
    fn test_expansion_map_missing_modification_date() {
        let mut a = asset();
        a.modification_date = None;
        let err = expansion_map(&a).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::MissingField {
                field: "modification_date",
                ..
            }
        ));
    }

    #[test]
    fn test_expand_basic() {
        let map = expansion_map(&asset()).unwrap();
        let out = expand("{Y_create}-{m_create}/{filename}", &map).unwrap();
        assert_eq!(out, "2025-01/IMG_0001.JPG");
    }

    #[test]
    fn test_expand_is_deterministic() {
        let map = expansion_map(&asset()).unwrap();
        let a = expand("{local_id}/{filename}", &map).unwrap();
        let b = expand("{local_id}/{filename}", &map).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_expand_unknown_placeholder() {
        let map = expansion_map(&asset()).unwrap();
        let err = expand("{nope}/{filename}", &map).unwrap_err();
        assert!(matches!(err, ArchiveError::UnknownPlaceholder { name } if name == "nope"));
    }

    #[test]
    fn test_expand_unterminated_placeholder() {
        let map = expansion_map(&asset()).unwrap();
        let err = expand("{filename", &map).unwrap_err();
        assert!(matches!(err, ArchiveError::UnterminatedPlaceholder { .. }));
    }

    #[test]
    fn test_expand_literal_text_unchanged() {
        let map = expansion_map(&asset()).unwrap();
        let out = expand("backup/{media_type}/plain", &map).unwrap();
        assert_eq!(out, "backup/image/plain");
    }
}
