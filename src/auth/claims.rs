use serde::{Deserialize, Serialize};

/// JWT payload for a session token. Anything beyond these two claims is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub sub: i64, // user ID
    pub exp: i64, // expires at (unix timestamp)
}
