//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted player name. Anything larger is presumed garbage input.
pub const MAX_PLAYER_NAME_LEN: usize = 64;

/// Validates that a player name is non-blank and of reasonable length.
///
/// Surrounding whitespace is ignored when judging emptiness; the caller is
/// expected to trim before storing.
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("player_name_blank");
        err.message = Some("Player name must not be empty".into());
        return Err(err);
    }

    if name.chars().count() > MAX_PLAYER_NAME_LEN {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some(
            format!(
                "Player name must be at most {} characters (got {})",
                MAX_PLAYER_NAME_LEN,
                name.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}
