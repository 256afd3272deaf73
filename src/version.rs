use std::cmp::Ordering;

/// Parses dotted numeric versions like `1.2`, `v1.2.3` or `1.2.3.4`.
///
/// Returns `None` for anything with a non-numeric segment (`1.2.3-beta`, `latest`, ...).
fn parse_dotted(s: &str) -> Option<Vec<u64>> {
    let s = s.trim().trim_start_matches(['v', 'V']);
    if s.is_empty() {
        return None;
    }
    s.split('.').map(|part| part.parse::<u64>().ok()).collect()
}

/// Component-wise compare; missing trailing segments count as 0.
pub fn cmp_versions(a: &str, b: &str) -> Option<Ordering> {
    let va = parse_dotted(a)?;
    let vb = parse_dotted(b)?;
    let len = va.len().max(vb.len());
    for i in 0..len {
        let x = va.get(i).copied().unwrap_or(0);
        let y = vb.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(Ordering::Equal)
}

/// Whether `remote` should be installed over `local`.
///
/// If either side is not a dotted numeric version, any difference counts as newer.
pub fn is_newer(remote: &str, local: &str) -> bool {
    match cmp_versions(remote, local) {
        Some(ord) => ord == Ordering::Greater,
        None => remote != local,
    }
}
