//! Human-readable labels for field names

/// Labels that are not a plain split of the field name
const LABEL_OVERRIDES: [(&str, &str); 7] = [
    ("DOB", "Date of Birth"),
    ("NIC", "NIC No"),
    ("MobileNo", "Mobile No"),
    ("LandNo", "Telephone No"),
    ("PostAppliedFor", "Post Applied For"),
    ("ApplicationDate", "Date of Application"),
    ("NameWithInitials", "Name with Initials"),
];

/// Turn a PascalCase field name into a label, e.g. `FullName` -> `Full Name`
///
/// Runs of capitals stay together (`NICNumber` -> `NIC Number`).
pub fn humanize_field_name(name: &str) -> String {
    if let Some((_, label)) = LABEL_OVERRIDES.iter().find(|(field, _)| *field == name) {
        return (*label).to_string();
    }

    let chars: Vec<char> = name.chars().collect();
    let mut label = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                label.push(' ');
            }
        }
        if c == '_' {
            label.push(' ');
        } else {
            label.push(c);
        }
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pascal_case() {
        assert_eq!(humanize_field_name("FullName"), "Full Name");
        assert_eq!(humanize_field_name("PermanentAddress"), "Permanent Address");
        assert_eq!(humanize_field_name("Email"), "Email");
    }

    #[test]
    fn test_acronym_runs() {
        assert_eq!(humanize_field_name("NICNumber"), "NIC Number");
        assert_eq!(humanize_field_name("OLResults"), "OL Results");
    }

    #[test]
    fn test_overrides() {
        assert_eq!(humanize_field_name("DOB"), "Date of Birth");
        assert_eq!(humanize_field_name("NIC"), "NIC No");
        assert_eq!(humanize_field_name("LandNo"), "Telephone No");
    }

    #[test]
    fn test_underscores() {
        assert_eq!(humanize_field_name("present_post"), "present post");
    }
}
