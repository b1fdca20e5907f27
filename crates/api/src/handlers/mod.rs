pub mod articles;
pub mod categories;
pub mod comments;
pub mod notifications;
pub mod profiles;
pub mod users;
pub mod votes;

/// Validation helpers shared by request DTOs.
pub(crate) mod rules {
    use std::sync::LazyLock;

    use regex::Regex;
    use validator::ValidationError;

    static USERNAME: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").expect("valid username regex"));

    /// Names are letters only (any script).
    pub fn letters_only(value: &str) -> Result<(), ValidationError> {
        if !value.is_empty() && value.chars().all(char::is_alphabetic) {
            Ok(())
        } else {
            Err(ValidationError::new("letters_only").with_message("must contain letters only".into()))
        }
    }

    /// 3 to 30 ASCII letters, digits or underscores.
    pub fn username(value: &str) -> Result<(), ValidationError> {
        if USERNAME.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::new("username").with_message(
                "Username must be 3-30 letters, digits or underscores".into(),
            ))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn names_reject_digits_and_spaces() {
            assert!(letters_only("Chinedu").is_ok());
            assert!(letters_only("Zoë").is_ok());
            assert!(letters_only("Jane2").is_err());
            assert!(letters_only("Mary Jane").is_err());
            assert!(letters_only("").is_err());
        }

        #[test]
        fn usernames() {
            assert!(username("jane_doe").is_ok());
            assert!(username("jd").is_err());
            assert!(username("jane-doe").is_err());
        }
    }
}
