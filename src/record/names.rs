//! Name suffix arithmetic.
//!
//! A name like `Zone 12` or `Pump_3` splits into a base (`Zone`, `Pump`), a
//! spacer (`' '` or `'_'`), and a positive integer suffix. Names in the same
//! series share a base name, compared case-insensitively.

/// Integer suffix and the spacer that precedes it, if the name has one.
pub fn name_suffix(name: &str) -> Option<(u64, char)> {
    let (pos, spacer) = last_spacer(name)?;
    let digits = &name[pos + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u64>() {
        Ok(n) if n > 0 => Some((n, spacer)),
        _ => None,
    }
}

/// Name with any integer suffix removed.
pub fn base_name(name: &str) -> &str {
    match (name_suffix(name), last_spacer(name)) {
        (Some(_), Some((pos, _))) => &name[..pos],
        _ => name,
    }
}

/// `true` if `candidate` belongs to the series whose base is `base`.
pub fn base_names_match(base: &str, candidate: &str) -> bool {
    eq_ignore_case(base, base_name(candidate))
}

/// Next name in a series.
///
/// With `fill_in`, the lowest positive suffix not taken by `series`;
/// otherwise one past the highest. The spacer follows the last suffixed
/// member of the series and defaults to a space.
///
/// ```rust
/// use bem_graph::record::names::construct_next_name;
/// let taken = ["Zone 1", "Zone 2", "Zone 5"];
/// assert_eq!(construct_next_name("Zone", taken, true), "Zone 3");
/// assert_eq!(construct_next_name("Zone", taken, false), "Zone 6");
/// ```
pub fn construct_next_name<'a, I>(name: &str, series: I, fill_in: bool) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken = Vec::new();
    let mut spacer = ' ';
    for member in series {
        if let Some((n, s)) = name_suffix(member) {
            taken.push(n);
            spacer = s;
        }
    }
    taken.sort_unstable();
    taken.dedup();

    let past_highest = taken.last().map_or(Some(1), |m| m.checked_add(1));
    let suffix = match past_highest {
        Some(next) if !fill_in => next,
        // The series tops out at u64::MAX: fall back to the lowest gap.
        _ => lowest_free(&taken),
    };
    format!("{}{}{}", base_name(name), spacer, suffix)
}

/// Lowest positive suffix missing from sorted, deduplicated `taken`.
fn lowest_free(taken: &[u64]) -> u64 {
    let mut next = 1u64;
    for &used in taken {
        if used != next {
            break;
        }
        next = next.saturating_add(1);
    }
    next
}

/// Case-insensitive comparison used for every name match.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Key used by the name indices.
pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}

fn last_spacer(name: &str) -> Option<(usize, char)> {
    let space = name.rfind(' ');
    let under = name.rfind('_');
    match (space, under) {
        (Some(s), Some(u)) if u > s => Some((u, '_')),
        (Some(s), _) => Some((s, ' ')),
        (None, Some(u)) => Some((u, '_')),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_and_base() {
        assert_eq!(name_suffix("Zone 12"), Some((12, ' ')));
        assert_eq!(name_suffix("Pump_3"), Some((3, '_')));
        assert_eq!(name_suffix("My Room"), None);
        assert_eq!(name_suffix("Zone 0"), None);
        assert_eq!(name_suffix("Zone 1a"), None);
        assert_eq!(name_suffix("Zone"), None);
        assert_eq!(base_name("Zone 12"), "Zone");
        assert_eq!(base_name("Air Loop_2"), "Air Loop");
        assert_eq!(base_name("Air_Loop 2"), "Air_Loop");
        assert_eq!(base_name("My Room"), "My Room");
        assert_eq!(base_name("Zone "), "Zone ");
    }

    #[test]
    fn series_matching_ignores_case() {
        assert!(base_names_match("zone", "Zone 3"));
        assert!(base_names_match("Zone", "ZONE"));
        assert!(!base_names_match("Zone", "Zone Mixer 1"));
    }

    #[test]
    fn next_name_fill_in_and_append() {
        assert_eq!(construct_next_name("Zone", std::iter::empty(), true), "Zone 1");
        assert_eq!(construct_next_name("Zone 7", ["Zone 1", "Zone 7"], true), "Zone 2");
        assert_eq!(construct_next_name("Zone 7", ["Zone 1", "Zone 7"], false), "Zone 8");
        assert_eq!(construct_next_name("Pump", ["Pump_1"], true), "Pump_2");
        assert_eq!(construct_next_name("Zone", ["Zone", "Zone 2"], true), "Zone 1");
    }

    #[test]
    fn next_name_past_the_largest_suffix_fills_in() {
        let top = format!("Zone {}", u64::MAX);
        assert_eq!(construct_next_name(&top, [top.as_str()], false), "Zone 1");
        assert_eq!(construct_next_name(&top, ["Zone 1", top.as_str()], false), "Zone 2");
    }

    #[test]
    fn case_insensitive_equality() {
        assert!(eq_ignore_case("Main Zone", "main zone"));
        assert!(eq_ignore_case("ÉTAGE", "étage"));
        assert!(!eq_ignore_case("Zone 1", "Zone 2"));
    }
}
