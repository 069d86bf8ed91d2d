//! REG Node - command-line helpers shared by `regd` and `regctl`
//!
//! Register assignments are written `key=value`; a bare `key` clears the
//! register. The unnamed register is `"`.

use reg_core::{FullValues, PartialValues, RegError, RegResult, RegisterKey};

/// Parse one `key=value` or bare `key`
pub fn parse_assignment(text: &str) -> RegResult<(RegisterKey, Option<String>)> {
    match text.split_once('=') {
        Some((key, value)) => Ok((key.parse()?, Some(value.to_string()))),
        None => Ok((text.parse()?, None)),
    }
}

/// Assignments for a partial update; later entries win
pub fn parse_partial<S: AsRef<str>>(args: &[S]) -> RegResult<PartialValues> {
    args.iter()
        .map(|arg| parse_assignment(arg.as_ref()))
        .collect()
}

/// Assignments for a full replacement; every key needs a value
pub fn parse_full<S: AsRef<str>>(args: &[S]) -> RegResult<FullValues> {
    args.iter()
        .map(|arg| match parse_assignment(arg.as_ref())? {
            (key, Some(value)) => Ok((key, value)),
            (key, None) => Err(RegError::InvalidParams(format!(
                "register {key} needs a value for a full replacement"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_forms() {
        assert_eq!(
            parse_assignment("k=v").unwrap(),
            (RegisterKey::K, Some("v".into()))
        );
        assert_eq!(
            parse_assignment("k=a=b").unwrap(),
            (RegisterKey::K, Some("a=b".into()))
        );
        assert_eq!(parse_assignment("k=").unwrap(), (RegisterKey::K, Some(String::new())));
        assert_eq!(parse_assignment("z").unwrap(), (RegisterKey::Z, None));
        assert_eq!(
            parse_assignment("\"=clip").unwrap(),
            (RegisterKey::Unnamed, Some("clip".into()))
        );
    }

    #[test]
    fn test_bad_register_name() {
        assert!(matches!(
            parse_assignment("K=v"),
            Err(RegError::InvalidRegisterName { .. })
        ));
        assert!(parse_assignment("ab=v").is_err());
    }

    #[test]
    fn test_partial_and_full() {
        let partial = parse_partial(&["a=1", "b", "a=2"]).unwrap();
        assert_eq!(partial[&RegisterKey::A], Some("2".into()));
        assert_eq!(partial[&RegisterKey::B], None);

        let full = parse_full(&["a=1", "c=3"]).unwrap();
        assert_eq!(full.len(), 2);
        assert!(matches!(
            parse_full(&["a"]),
            Err(RegError::InvalidParams(_))
        ));
    }
}
