use crate::constants::BOT_NAMES;

const MAX_NAME_CHARS: usize = 16;
const DEFAULT_NAME: &str = "Player";

/// Display name for a human: trimmed, control characters stripped and
/// capped at 16 characters.
pub fn sanitize_name(value: Option<&str>) -> String {
    let trimmed = value.map(str::trim).unwrap_or_default();
    let cleaned: String = trimmed
        .chars()
        .filter(|ch| !ch.is_control())
        .take(MAX_NAME_CHARS)
        .collect();
    if cleaned.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    if BOT_NAMES
        .iter()
        .any(|bot| bot.eq_ignore_ascii_case(&cleaned))
    {
        return format!("{cleaned}*");
    }
    cleaned
}

/// Numeric suffix of an entity id, used to keep listings in join order.
pub fn entity_order_key(entity_id: &str) -> u64 {
    entity_id
        .rsplit('_')
        .next()
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_order_key_uses_numeric_suffix() {
        assert!(entity_order_key("player_2") < entity_order_key("player_10"));
        assert_eq!(entity_order_key("garbage"), u64::MAX);
    }

    #[test]
    fn sanitize_name_applies_trim_empty_and_max_len() {
        assert_eq!(sanitize_name(None), "Player");
        assert_eq!(sanitize_name(Some("   ")), "Player");
        assert_eq!(sanitize_name(Some(" Alice ")), "Alice");
        assert_eq!(
            sanitize_name(Some("12345678901234567890")),
            "1234567890123456"
        );
        assert_eq!(sanitize_name(Some("a\u{0007}b")), "ab");
    }

    #[test]
    fn bot_names_are_reserved() {
        assert_eq!(sanitize_name(Some("ghost")), "ghost*");
    }
}
