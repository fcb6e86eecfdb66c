//! String encodings of reference lists used by older project files.
//!
//! | Field | Structured | Legacy |
//! |-------|-----------|--------|
//! | layer members | `[1, 2]` | `"1, 2"` |
//! | hex vertices | `[1, 2, ...]` | `"Point 1, Point 2, ..."` |
//! | edge points | `[{"id": 1}, {"at": [x, y, z]}]` | `"1, 2, (1.5,2.5,0)"` |
//! | patch faces | `[[0, 4, 7, 3]]` | `"(0 4 7 3), (1 5 6 2)"` |
//!
//! Each field deserializes into an untagged enum that accepts either
//! form; the registry only ever sees the structured one.

use serde::Deserialize;

use crate::model::{EndpointRef, PointId};

/// A list of point IDs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdList {
    Ids(Vec<u32>),
    Text(String),
}

impl IdList {
    pub(crate) fn into_ids(self) -> Result<Vec<PointId>, String> {
        match self {
            IdList::Ids(ids) => Ok(ids.into_iter().map(PointId).collect()),
            IdList::Text(s) => parse_id_list(&s),
        }
    }
}

impl Default for IdList {
    fn default() -> Self {
        IdList::Ids(Vec::new())
    }
}

/// A single point ID, as a number or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdValue {
    Num(u32),
    Text(String),
}

impl IdValue {
    pub(crate) fn into_id(self) -> Result<PointId, String> {
        match self {
            IdValue::Num(n) => Ok(PointId(n)),
            IdValue::Text(s) => parse_id(&s),
        }
    }
}

/// Edge control points: start, end, then intermediates.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RefList {
    Refs(Vec<EndpointRef>),
    Text(String),
}

impl RefList {
    pub(crate) fn into_refs(self) -> Result<Vec<EndpointRef>, String> {
        match self {
            RefList::Refs(refs) => Ok(refs),
            RefList::Text(s) => parse_ref_list(&s),
        }
    }
}

/// Patch faces, four IDs each.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum FaceList {
    Faces(Vec<Vec<u32>>),
    Text(String),
}

impl FaceList {
    /// One result per face, so a bad face does not take its siblings down.
    pub(crate) fn into_faces(self) -> Vec<Result<Vec<PointId>, String>> {
        match self {
            FaceList::Faces(faces) => faces
                .into_iter()
                .map(|f| Ok(f.into_iter().map(PointId).collect()))
                .collect(),
            FaceList::Text(s) => parse_face_list(&s),
        }
    }
}

impl Default for FaceList {
    fn default() -> Self {
        FaceList::Faces(Vec::new())
    }
}

/// `"3"` or `"Point 3"`.
fn parse_id(s: &str) -> Result<PointId, String> {
    let s = s.trim();
    let digits = s.strip_prefix("Point").map(str::trim_start).unwrap_or(s);
    digits
        .parse::<u32>()
        .map(PointId)
        .map_err(|_| format!("invalid point id '{s}'"))
}

/// `"1, 2, 3"` or `"Point 1, Point 2"`. Empty input is an empty list.
pub(crate) fn parse_id_list(s: &str) -> Result<Vec<PointId>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_id)
        .collect()
}

/// `"1, 2, (1.5,2.5,0)"`: IDs and parenthesized coordinate triples,
/// split on commas outside parentheses.
pub(crate) fn parse_ref_list(s: &str) -> Result<Vec<EndpointRef>, String> {
    split_top_level(s)?
        .into_iter()
        .map(|part| {
            if let Some(inner) = part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
                parse_triple(inner).map(EndpointRef::Literal)
            } else {
                parse_id(part).map(EndpointRef::Point)
            }
        })
        .collect()
}

fn parse_triple(inner: &str) -> Result<[f64; 3], String> {
    let coords: Vec<f64> = inner
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|_| format!("invalid coordinate '{}'", c.trim())))
        .collect::<Result<_, _>>()?;
    <[f64; 3]>::try_from(coords.as_slice())
        .map_err(|_| format!("expected 3 coordinates, got {}", coords.len()))
}

fn split_top_level(s: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced ')' at byte {i}"))?;
            }
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unclosed '('".to_string());
    }
    parts.push(s[start..].trim());
    Ok(parts.into_iter().filter(|p| !p.is_empty()).collect())
}

/// `"(0 4 7 3), (1 5 6 2)"`; IDs inside a group may be separated by
/// spaces or commas. Each group parses on its own; a group that is not
/// four IDs (older writers emit `(face_3)` placeholders) is an error for
/// that group only. An unclosed group ends the list.
pub(crate) fn parse_face_list(s: &str) -> Vec<Result<Vec<PointId>, String>> {
    let mut faces = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')').map(|c| open + c) else {
            faces.push(Err("unclosed '('".to_string()));
            break;
        };
        faces.push(parse_face(&rest[open + 1..close]));
        rest = &rest[close + 1..];
    }
    faces
}

fn parse_face(group: &str) -> Result<Vec<PointId>, String> {
    let ids = group
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(parse_id)
        .collect::<Result<Vec<_>, _>>()?;
    if ids.len() != 4 {
        return Err(format!("expected 4 point ids, got {}", ids.len()));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(v: &[u32]) -> Vec<PointId> {
        v.iter().copied().map(PointId).collect()
    }

    #[test]
    fn test_id_lists() {
        assert_eq!(parse_id_list("1, 2, 10").unwrap(), ids(&[1, 2, 10]));
        assert_eq!(parse_id_list("Point 1, Point 2").unwrap(), ids(&[1, 2]));
        assert_eq!(parse_id_list("").unwrap(), ids(&[]));
        assert!(parse_id_list("1, x").is_err());
    }

    #[test]
    fn test_ref_list_mixes_ids_and_literals() {
        let refs = parse_ref_list("1, 2, (1.5,2.5,0)").unwrap();
        assert_eq!(
            refs,
            vec![
                EndpointRef::Point(PointId(1)),
                EndpointRef::Point(PointId(2)),
                EndpointRef::Literal([1.5, 2.5, 0.0]),
            ]
        );
    }

    #[test]
    fn test_ref_list_errors() {
        assert!(parse_ref_list("1, (1,2)").is_err());
        assert!(parse_ref_list("1, (1,2,3").is_err());
        assert!(parse_ref_list("1), 2").is_err());
    }

    #[test]
    fn test_face_list() {
        let faces = parse_face_list("(0 4 7 3), (1, 5, 6, 2)");
        assert_eq!(faces, vec![Ok(ids(&[0, 4, 7, 3])), Ok(ids(&[1, 5, 6, 2]))]);
        assert!(parse_face_list("").is_empty());
    }

    #[test]
    fn test_bad_face_group_kept_separate() {
        let faces = parse_face_list("(1 2 3 4), (face_3), (5 6 7), (8 9 10 11");
        assert_eq!(faces.len(), 4);
        assert_eq!(faces[0], Ok(ids(&[1, 2, 3, 4])));
        assert_eq!(faces[1], Err("invalid point id 'face_3'".to_string()));
        assert_eq!(faces[2], Err("expected 4 point ids, got 3".to_string()));
        assert_eq!(faces[3], Err("unclosed '('".to_string()));
    }

    #[test]
    fn test_untagged_accepts_both_forms() {
        let structured: IdList = serde_json::from_str("[4, 5]").unwrap();
        let legacy: IdList = serde_json::from_str("\"4, 5\"").unwrap();
        assert_eq!(structured.into_ids().unwrap(), legacy.into_ids().unwrap());

        let n: IdValue = serde_json::from_str("7").unwrap();
        let s: IdValue = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(n.into_id().unwrap(), s.into_id().unwrap());
    }
}
