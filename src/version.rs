use std::cmp::Ordering;

/// Compare two tool version strings of the form `"<label> X.Y.Z"`.
///
/// Only the second space-separated word is compared, component by component
/// over three components. A component that is missing or not a number loses
/// against one that is a number, whichever side it is on; two non-numeric
/// components are treated as equal. An empty component counts as 0.
pub fn sem_ver(a: &str, b: &str) -> Ordering {
    let pa = components(a);
    let pb = components(b);

    for i in 0..3 {
        let na = pa.get(i).and_then(|c| component_value(c));
        let nb = pb.get(i).and_then(|c| component_value(c));
        match (na, nb) {
            (Some(x), Some(y)) if x != y => return x.cmp(&y),
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            _ => {}
        }
    }
    Ordering::Equal
}

fn components(version: &str) -> Vec<&str> {
    match version.split(' ').nth(1) {
        Some(v) => v.split('.').collect(),
        None => vec![],
    }
}

/// Only plain decimal integers count as numbers. Exponent (`1e2`), hex
/// (`0x10`), signed, fractional, or out-of-range `u64` components are
/// non-numeric and so lose.
fn component_value(c: &str) -> Option<u64> {
    let c = c.trim();
    if c.is_empty() {
        return Some(0);
    }
    c.parse().ok()
}
