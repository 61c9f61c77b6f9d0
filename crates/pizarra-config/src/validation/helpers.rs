//! Shared validation helpers used by the section validators.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error unless `value` is an absolute URL with one of `schemes`.
pub(crate) fn validate_url(errors: &mut Vec<String>, name: &str, value: &str, schemes: &[&str]) {
    let ok = value
        .split_once("://")
        .is_some_and(|(scheme, rest)| schemes.contains(&scheme) && !rest.is_empty());
    if !ok {
        errors.push(format!(
            "{name} = {value:?} must be a URL with scheme {}",
            schemes.join("/")
        ));
    }
}
