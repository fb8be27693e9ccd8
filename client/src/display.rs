//! Terminal rendering of server lines
//!
//! The server marks colors with presentation-layer tags such as `[#FFC0CB]`,
//! `[red]` and `[-]`. A plain terminal cannot show those, so they are
//! stripped; brackets that are not tags are left alone.

/// Removes color markup tags from a display line
pub fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        match candidate.find(']') {
            Some(end) if is_tag(&candidate[1..end]) => {
                rest = &candidate[end + 1..];
            }
            _ => {
                out.push('[');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_tag(inner: &str) -> bool {
    if inner == "-" {
        return true;
    }

    if let Some(hex) = inner.strip_prefix('#') {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_alphanumeric());
    }

    !inner.is_empty() && inner.chars().all(|c| c.is_ascii_alphabetic())
}
