// Helper functions for safe logging and serialization

use serde::{Serialize, Serializer};

/// Masks email addresses for safe logging
///
/// `"user@example.com"` becomes `"u***@example.com"`.
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            format!("{}***@{}", &parts[0][..1], parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Masks phone numbers, keeping the last 3 digits
pub fn safe_phone_log(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 3 {
        let tail: String = digits[digits.len() - 3..].iter().collect();
        format!("***{}", tail)
    } else {
        "***".to_string()
    }
}

/// Serializes a JSON-encoded string column (e.g. `languages`) as an array
pub fn serialize_json_list<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(raw) => {
            let items: Vec<String> = serde_json::from_str(raw).unwrap_or_else(|_| Vec::new());
            items.serialize(serializer)
        }
        None => Vec::<String>::new().serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("no-at-sign"), "***@***.***");
        assert_eq!(safe_email_log("a@b"), "***@***.***");
    }

    #[test]
    fn test_safe_token_log() {
        assert_eq!(safe_token_log("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(safe_token_log("short"), "***");
    }

    #[test]
    fn test_safe_phone_log() {
        assert_eq!(safe_phone_log("+91 98765 43210"), "***210");
        assert_eq!(safe_phone_log("12"), "***");
    }

    #[test]
    fn test_json_list_column_serializes_as_array() {
        #[derive(Serialize)]
        struct Holder {
            #[serde(serialize_with = "serialize_json_list")]
            languages: Option<String>,
        }

        let stored = Holder {
            languages: Some(r#"["Hindi","English"]"#.to_string()),
        };
        let out = serde_json::to_value(&stored).unwrap();
        assert_eq!(out["languages"], serde_json::json!(["Hindi", "English"]));

        let empty = serde_json::to_value(&Holder { languages: None }).unwrap();
        assert_eq!(empty["languages"], serde_json::json!([]));
    }
}
