use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// 突尼斯车牌格式，如 "123TU456" 或 "123 TUNISIA 456"（归一化后匹配）
static PLATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(TU|TUNISIA)\d{1,4}$").unwrap());

/// 车牌归一化：大写并去除所有空白，存储和查询使用同一形式
pub fn normalize_plate(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

pub fn is_valid_plate(plate: &str) -> bool {
    PLATE_REGEX.is_match(&normalize_plate(plate))
}

pub fn validate_plate(plate: &str) -> Result<()> {
    if plate.trim().is_empty() {
        return Err(AppError::Validation("Plate number is required".to_string()));
    }

    if !is_valid_plate(plate) {
        return Err(AppError::Validation(
            "Invalid plate number, expected format: 123TU4567".to_string(),
        ));
    }

    Ok(())
}

/// validator derive 使用的自定义校验函数
pub fn validate_plate_field(plate: &str) -> std::result::Result<(), ValidationError> {
    if is_valid_plate(plate) {
        Ok(())
    } else {
        Err(ValidationError::new("plate_format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("123 tu 456"), "123TU456");
        assert_eq!(normalize_plate("  45 Tunisia 789 "), "45TUNISIA789");
        assert_eq!(normalize_plate("123TU456"), "123TU456");
    }

    #[test]
    fn test_valid_plates() {
        assert!(is_valid_plate("123TU456"));
        assert!(is_valid_plate("1 TU 1"));
        assert!(is_valid_plate("45 Tunisia 789"));
        assert!(is_valid_plate("999 TUNISIA 9999"));
    }

    #[test]
    fn test_invalid_plates() {
        assert!(!is_valid_plate(""));
        assert!(!is_valid_plate("ABC123"));
        assert!(!is_valid_plate("1234TU456"));
        assert!(!is_valid_plate("123TU45678"));
        assert!(!is_valid_plate("123FR456"));
    }

    #[test]
    fn test_validate_plate_errors() {
        assert!(validate_plate("123TU456").is_ok());
        assert!(validate_plate("").is_err());
        assert!(validate_plate("not-a-plate").is_err());
    }
}
