//! Revision 3 source maps for extracted blocks.
//!
//! An extracted block is a verbatim slice of the component, so one segment
//! at the start of the generated code is enough to locate it.

use compiler::Position;
use serde::{Deserialize, Serialize};

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Maps generated line 1, column 0 to where the block content starts
    /// in the component.
    pub fn for_block(filename: &str, component_source: &str, content_start: Position) -> Self {
        let column = utf16_column(component_source, content_start.offset);
        let mut mappings = String::new();
        encode_vlq(&mut mappings, 0); // generated column
        encode_vlq(&mut mappings, 0); // source index
        encode_vlq(&mut mappings, content_start.line as i64 - 1);
        encode_vlq(&mut mappings, column as i64);
        Self {
            version: 3,
            file: filename.to_owned(),
            sources: vec![filename.to_owned()],
            sources_content: vec![component_source.to_owned()],
            names: vec![],
            mappings,
        }
    }

    /// Looks up the original position of the first segment on a generated
    /// line. Lines are 1-based, columns 0-based. Lines without a segment
    /// continue the previous mapping one line further down.
    pub fn original_position_for(&self, generated_line: usize) -> Option<(usize, usize)> {
        if generated_line == 0 {
            return None;
        }
        // (source line, source column) of the last segment seen, 0-based
        let mut state = (0i64, 0i64);
        let mut last: Option<(i64, i64, usize)> = None;
        for (i, line) in self.mappings.split(';').enumerate() {
            if i + 1 > generated_line {
                break;
            }
            for (j, segment) in line.split(',').filter(|s| !s.is_empty()).enumerate() {
                let fields = decode_vlq(segment)?;
                if fields.len() >= 4 {
                    state.0 += fields[2];
                    state.1 += fields[3];
                }
                if j == 0 {
                    last = Some((state.0, state.1, i));
                }
            }
        }
        let (line, column, at) = last?;
        let line = line + (generated_line - 1 - at) as i64;
        Some((line as usize + 1, column as usize))
    }
}

/// 0-based column of a byte offset in UTF-16 code units, the unit
/// source map consumers count in.
fn utf16_column(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..offset].chars().map(char::len_utf16).sum()
}

fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (vlq & 0b11111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

fn decode_vlq(segment: &str) -> Option<Vec<i64>> {
    let mut values = vec![];
    let mut value = 0i64;
    let mut shift = 0;
    for c in segment.bytes() {
        let digit = BASE64.iter().position(|&b| b == c)? as i64;
        value += (digit & 0b11111) << shift;
        if digit & 0b100000 != 0 {
            shift += 5;
            continue;
        }
        let negative = value & 1 == 1;
        value >>= 1;
        values.push(if negative { -value } else { value });
        value = 0;
        shift = 0;
    }
    Some(values)
}
