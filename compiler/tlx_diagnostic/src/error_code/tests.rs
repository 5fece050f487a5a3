use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::W2001.to_string(), "W2001");
    assert_eq!(ErrorCode::E1001.as_str(), "E1001");
}

#[test]
fn test_numeric_codes_are_stable() {
    assert_eq!(ErrorCode::E0001.number(), 1);
    assert_eq!(ErrorCode::E1002.number(), 1002);
    assert_eq!(ErrorCode::W2001.number(), 2001);
    assert_eq!(ErrorCode::W4001.number(), 4001);
    assert_eq!(ErrorCode::E9001.number(), 9001);
}

#[test]
fn test_numeric_codes_are_unique() {
    let mut numbers: Vec<u32> = ErrorCode::ALL.iter().map(ErrorCode::number).collect();
    numbers.sort_unstable();
    numbers.dedup();
    assert_eq!(numbers.len(), ErrorCode::ALL.len());
}

#[test]
fn test_from_number_round_trips() {
    for code in ErrorCode::ALL {
        assert_eq!(ErrorCode::from_number(code.number()), Some(*code));
    }
    assert_eq!(ErrorCode::from_number(7777), None);
}

#[test]
fn test_predicate_exclusivity() {
    for code in ErrorCode::ALL {
        assert_ne!(code.is_fatal(), code.is_warning(), "{code}");
        let groups = [
            code.is_mapping_warning(),
            code.is_reference_warning(),
            code.is_naming_warning(),
        ];
        assert!(groups.iter().filter(|g| **g).count() <= 1, "{code}");
    }
}

#[test]
fn test_reference_warnings() {
    assert!(ErrorCode::W3001.is_reference_warning());
    assert!(ErrorCode::W3005.is_reference_warning());
    assert!(!ErrorCode::W3001.is_mapping_warning());
    assert!(!ErrorCode::W2001.is_reference_warning());
}

#[test]
fn test_every_code_has_summary() {
    for code in ErrorCode::ALL {
        assert!(!code.summary().is_empty(), "{code}");
    }
}
