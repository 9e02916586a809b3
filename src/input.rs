/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::consts::MAX_NAME_LENGTH;

pub fn greater_than_zero<
    T: std::str::FromStr + std::cmp::PartialOrd + std::fmt::Display + Default,
>(
    s: &str,
) -> Result<T, String> {
    let num: T = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number", s))?;

    if num > T::default() {
        Ok(num)
    } else {
        Err(format!("`{}` is not larger than 0", s))
    }
}

pub fn check_display_name(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if s.trim() != s {
        return Err("Name cannot have leading or trailing whitespace".to_string());
    }

    if s.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name cannot exceed {} characters", MAX_NAME_LENGTH));
    }

    if s.contains(|c: char| c.is_control()) {
        return Err("Name cannot contain control characters".to_string());
    }

    Ok(())
}

pub fn check_color(s: &str) -> Result<(), String> {
    if s.len() != 7 || !s.starts_with('#') {
        return Err("Color must be a #rrggbb hex string".to_string());
    }

    if s[1..].contains(|c: char| !c.is_ascii_hexdigit()) {
        return Err("Color must be a #rrggbb hex string".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greater_than_zero_accepts_positive_numbers() {
        assert_eq!(greater_than_zero::<u32>("5"), Ok(5));
        assert!(greater_than_zero::<u32>("0").is_err());
        assert!(greater_than_zero::<u32>("five").is_err());
    }

    #[test]
    fn display_names_are_trimmed_and_bounded() {
        assert!(check_display_name("Radiology").is_ok());
        assert!(check_display_name("Ward 3 / Night shift").is_ok());
        assert!(check_display_name("").is_err());
        assert!(check_display_name(" padded ").is_err());
        assert!(check_display_name("a\tb").is_err());
        assert!(check_display_name(&"x".repeat(121)).is_err());
    }

    #[test]
    fn colors_must_be_hex_triplets() {
        assert!(check_color("#4f6df5").is_ok());
        assert!(check_color("#FFFFFF").is_ok());
        assert!(check_color("4f6df5").is_err());
        assert!(check_color("#4f6df").is_err());
        assert!(check_color("#4f6dfg").is_err());
    }
}
