use anyhow::{Result, anyhow};

/// E.164-style number: optional leading `+`, then 8 to 15 digits.
pub fn validate_phone_number(phone: &str) -> Result<()> {
    if phone.is_empty() {
        return Err(anyhow!("Phone number cannot be empty"));
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("Phone number contains invalid characters"));
    }

    if digits.len() < 8 {
        return Err(anyhow!("Phone number too short (minimum 8 digits)"));
    }

    if digits.len() > 15 {
        return Err(anyhow!("Phone number too long (maximum 15 digits)"));
    }

    Ok(())
}

/// Numeric chat id (negative for groups) or a public `@username`.
pub fn validate_chat_id(chat_id: &str) -> Result<()> {
    if chat_id.is_empty() {
        return Err(anyhow!("Chat id cannot be empty"));
    }

    if let Some(username) = chat_id.strip_prefix('@') {
        let valid = username.len() >= 5
            && username.len() <= 32
            && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid {
            return Err(anyhow!("Invalid chat username '{}'", chat_id));
        }
        return Ok(());
    }

    chat_id
        .parse::<i64>()
        .map(|_| ())
        .map_err(|_| anyhow!("Chat id must be numeric or an @username"))
}
