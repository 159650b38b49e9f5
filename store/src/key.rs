use std::fmt;
use std::str::FromStr;

/// The fixed key space of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Movies,
    Theaters,
    CurrentUser,
    CurrentBooking,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Movies,
        StoreKey::Theaters,
        StoreKey::CurrentUser,
        StoreKey::CurrentBooking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Movies => "movies",
            StoreKey::Theaters => "theaters",
            StoreKey::CurrentUser => "currentUser",
            StoreKey::CurrentBooking => "currentBooking",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoreKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid StoreKey value: {}", s))
    }
}
