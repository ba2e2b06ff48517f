//! Public slug minting.

use rand::Rng;

/// Random bytes per slug. Hex-encoded this gives 24 URL-safe characters.
pub const SLUG_BYTES: usize = 12;

/// How many fresh slugs to try before giving up on a collision streak.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Mint an unguessable slug from the thread-local CSPRNG.
pub fn new_slug() -> String {
    let mut bytes = [0u8; SLUG_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}
