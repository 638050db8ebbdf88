//! The session token stored in the encrypted auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

mod expiry_format {
    //! Serializes the token expiry with a fixed width format.
    //!
    //! The default format for [time::OffsetDateTime] writes midnight as
    //! "0:00:00.0", which its own parser then rejects because it expects two
    //! digit hours.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(expiry: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = expiry
            .format(EXPIRY_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&raw, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies the logged in user until `expires_at`.
///
/// The cookie expiry is only a hint to the browser, so the server checks
/// `expires_at` itself before trusting a token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `user_id` that is valid for `duration` from now.
    ///
    /// # Errors
    ///
    /// Returns [Error::CookieExpiryOverflow] if the expiry cannot be represented.
    pub fn new(user_id: UserID, duration: Duration) -> Result<Self, Error> {
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(duration)
            .ok_or(Error::CookieExpiryOverflow)?;

        Ok(Self {
            user_id,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|error| Error::JSONSerializationError(error.to_string()))
    }

    /// Parse a token from a cookie value, returning `None` for anything that
    /// is not a token (e.g., the "deleted" placeholder).
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime, UtcOffset, macros::datetime};

    use crate::auth::{Token, UserID};

    #[test]
    fn token_json_has_fixed_width_expiry() {
        let token = Token {
            user_id: UserID::new(7),
            expires_at: datetime!(2026-03-01 09:15:00).assume_offset(UtcOffset::UTC),
        };

        let json = token.to_json().unwrap();

        assert_eq!(
            json,
            r#"{"user_id":7,"expires_at":"2026-03-01 09:15:00.0 +00:00:00"}"#
        );
    }

    #[test]
    fn token_with_midnight_expiry_parses() {
        let raw = r#"{"user_id":7,"expires_at":"2026-03-01 00:00:00.0 +00:00:00"}"#;

        let token = Token::from_json(raw).expect("Could not parse token");

        assert_eq!(
            token.expires_at,
            datetime!(2026-03-01 00:00:00).assume_offset(UtcOffset::UTC)
        );
    }

    #[test]
    fn garbage_is_not_a_token() {
        assert_eq!(Token::from_json("deleted"), None);
    }

    #[test]
    fn token_expires_after_duration() {
        let token = Token::new(UserID::new(1), Duration::minutes(5)).unwrap();
        let now = OffsetDateTime::now_utc();

        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::minutes(6)));
    }
}
