//! Delimited regions: locating a marker pair inside a hand-authored file and
//! splicing a fragment body between them.
//!
//! Everything outside the markers, the markers themselves included, is kept
//! byte-for-byte. The replaced body adopts the file's line-ending convention.

use std::ops::Range;
use std::path::Path;

use techdocs_core::{RegionMarkers, RegionName};

use crate::error::SyncError;

/// Byte range strictly between the end of the begin marker and the start of
/// the end marker.
pub fn locate(
    content: &str,
    markers: &RegionMarkers,
    path: &Path,
    region: &RegionName,
) -> Result<Range<usize>, SyncError> {
    let begin = single_occurrence(content, &markers.begin, markers, path, region)?;
    let end = single_occurrence(content, &markers.end, markers, path, region)?;

    let inner_start = begin + markers.begin.len();
    if end < inner_start {
        return Err(not_found(
            markers,
            path,
            region,
            "end marker precedes begin marker".to_string(),
        ));
    }
    Ok(inner_start..end)
}

/// Replace the region's current body with `body`.
///
/// The result contains `begin EOL body EOL end`; `body` is stripped of
/// trailing newlines first so repeated splices are stable.
pub fn splice(
    content: &str,
    markers: &RegionMarkers,
    body: &str,
    path: &Path,
    region: &RegionName,
) -> Result<String, SyncError> {
    let range = locate(content, markers, path, region)?;
    let eol = detect_eol(content);

    let body = body.replace("\r\n", "\n");
    let body = body.trim_end_matches('\n');

    let mut out = String::with_capacity(content.len() + body.len());
    out.push_str(&content[..range.start]);
    out.push_str(eol);
    if !body.is_empty() {
        out.push_str(&body.replace('\n', eol));
        out.push_str(eol);
    }
    out.push_str(&content[range.end..]);
    Ok(out)
}

/// `"\r\n"` when the file already uses CRLF, `"\n"` otherwise.
pub fn detect_eol(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn single_occurrence(
    content: &str,
    marker: &str,
    markers: &RegionMarkers,
    path: &Path,
    region: &RegionName,
) -> Result<usize, SyncError> {
    let positions: Vec<usize> = content.match_indices(marker).map(|(i, _)| i).collect();
    match positions.as_slice() {
        [] => Err(not_found(markers, path, region, format!("marker `{marker}` is missing"))),
        [only] => Ok(*only),
        many => Err(SyncError::AmbiguousRegion {
            path: path.to_path_buf(),
            region: region.clone(),
            marker: marker.to_string(),
            count: many.len(),
        }),
    }
}

fn not_found(markers: &RegionMarkers, path: &Path, region: &RegionName, detail: String) -> SyncError {
    SyncError::RegionNotFound {
        path: path.to_path_buf(),
        region: region.clone(),
        begin: markers.begin.clone(),
        end: markers.end.clone(),
        detail,
    }
}
