//! Capability codes granted to a user.

/// Well-known permission codes.
pub mod permission_codes {
    pub const MOVIES_READ: &str = "movies:read";
    pub const MOVIES_WRITE: &str = "movies:write";

    /// Every code seeded into the `permissions` table.
    pub const ALL: &[&str] = &[MOVIES_READ, MOVIES_WRITE];
}

/// Ordered set of codes granted to one user. Membership is exact string
/// equality; there is no hierarchy or wildcard matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Permissions(Vec<String>);

impl Permissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn includes(&self, code: &str) -> bool {
        self.0.iter().any(|granted| granted == code)
    }

    pub fn includes_all(&self, codes: &[&str]) -> bool {
        codes.iter().all(|code| self.includes(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Permissions {
    fn from(codes: Vec<String>) -> Self {
        Permissions(codes)
    }
}

impl FromIterator<String> for Permissions {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Permissions(iter.into_iter().collect())
    }
}
