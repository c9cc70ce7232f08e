// Step numbers are the two-digit prefixes that group module scripts into migration phases.
// Accepted shapes, tried in order and anchored at the start of the basename:
//   NN_MM_<rest>.sql  -> NN
//   NN_<rest>.sql     -> NN

const SQL_SUFFIX: &str = ".sql";

pub fn extract_step_number(basename: &str) -> Option<u32> {
    match_step_and_sub_step(basename).or_else(|| match_step_only(basename))
}

fn match_step_and_sub_step(basename: &str) -> Option<u32> {
    let step = two_digit_prefix(basename)?;
    let rest = basename.get(3..)?;
    two_digit_prefix(rest)?;
    let tail = rest.get(3..)?;
    if !tail.ends_with(SQL_SUFFIX) {
        return None;
    }
    log::trace!("Step {} matched (NN_MM_ shape): {}", step, basename);
    Some(step)
}

fn match_step_only(basename: &str) -> Option<u32> {
    let step = two_digit_prefix(basename)?;
    let tail = basename.get(3..)?;
    if !tail.ends_with(SQL_SUFFIX) {
        return None;
    }
    log::trace!("Step {} matched (NN_ shape): {}", step, basename);
    Some(step)
}

/// Parses `DD_` at the start of `s`, returning the two digits as a number.
fn two_digit_prefix(s: &str) -> Option<u32> {
    match s.as_bytes() {
        [tens @ b'0'..=b'9', ones @ b'0'..=b'9', b'_', ..] => {
            Some(u32::from((*tens - b'0') * 10 + (*ones - b'0')))
        }
        _ => None,
    }
}
