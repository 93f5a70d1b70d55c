//! Anonymous login identities.

use rand::Rng;

/// Nickname prefix the chat service accepts without credentials.
const ANONYMOUS_PREFIX: &str = "justinfan";

/// Generate a read-only anonymous nickname of the form `justinfan<5 digits>`.
pub fn generate_anonymous_identity() -> String {
    let suffix: u32 = rand::rng().random_range(10000..99999);
    format!("{}{}", ANONYMOUS_PREFIX, suffix)
}
