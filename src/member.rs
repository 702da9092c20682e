//! # Membership records.

use std::fmt;

use crate::error::Result;

/// The membership tier of a member.
///
/// Values outside the known tiers are kept as [`Level::Unknown`] instead of being rejected, so
/// that they survive a load/save cycle unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
    /// No active membership.
    #[default]
    Inactive,
    /// Basic tier.
    Basic,
    /// Gold tier.
    Gold,
    /// Platinum tier.
    Platinum,
    /// A raw level value with no known tier.
    Unknown(u16),
}

impl From<u16> for Level {
    fn from(raw: u16) -> Self {
        match raw {
            0 => Self::Inactive,
            1 => Self::Basic,
            2 => Self::Gold,
            3 => Self::Platinum,
            other => Self::Unknown(other),
        }
    }
}

impl From<Level> for u16 {
    fn from(level: Level) -> Self {
        match level {
            Level::Inactive => 0,
            Level::Basic => 1,
            Level::Gold => 2,
            Level::Platinum => 3,
            Level::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inactive => "INACTIVE",
            Self::Basic => "BASIC",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
            Self::Unknown(_) => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// A single gym member. The member owns both of its names and has no ties to the buffers it was
/// built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    first_name: String,
    last_name: String,
    id: u32,
    level: Level,
    paid: bool,
}

impl Member {
    /// Creates a member, duplicating both names into newly owned strings.
    pub fn new(first_name: &str, last_name: &str, id: u32, level: Level, paid: bool) -> Self {
        Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            id,
            level,
            paid,
        }
    }

    /// Creates a member like [`Member::new`], but reports a failed name allocation as an error
    /// instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Allocation`] if memory for either name can not be reserved.
    pub fn try_new(
        first_name: &str,
        last_name: &str,
        id: u32,
        level: Level,
        paid: bool,
    ) -> Result<Self> {
        Ok(Self {
            first_name: duplicate(first_name)?,
            last_name: duplicate(last_name)?,
            id,
            level,
            paid,
        })
    }

    /// Creates an independent copy of this member using fallible allocation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Allocation`] if memory for either name can not be reserved.
    pub fn try_clone(&self) -> Result<Self> {
        Self::try_new(
            &self.first_name,
            &self.last_name,
            self.id,
            self.level,
            self.paid,
        )
    }

    /// The member's first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// The member's last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// The unique identifier the member is indexed by.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// The member's tier.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Whether the member has paid.
    #[must_use]
    pub const fn paid(&self) -> bool {
        self.paid
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {} {}, Level: {}, Paid: {}",
            self.id,
            self.first_name,
            self.last_name,
            self.level,
            if self.paid { "yes" } else { "no" }
        )
    }
}

/// Mutable access to a member stored in a [`crate::Tree`].
///
/// Only the level and the paid flag can be changed. The id and the names stay fixed while the
/// member is indexed, so the tree's ordering can never be broken through this handle.
#[derive(Debug)]
pub struct MemberMut<'a> {
    member: &'a mut Member,
}

impl<'a> MemberMut<'a> {
    pub(crate) fn new(member: &'a mut Member) -> Self {
        Self { member }
    }

    /// Sets the member's level and returns the new level.
    pub fn set_level(&mut self, level: Level) -> Level {
        self.member.level = level;
        self.member.level
    }

    /// Sets the member's paid flag and returns the new flag.
    pub fn set_paid(&mut self, paid: bool) -> bool {
        self.member.paid = paid;
        self.member.paid
    }
}

impl std::ops::Deref for MemberMut<'_> {
    type Target = Member;

    fn deref(&self) -> &Self::Target {
        self.member
    }
}

fn duplicate(name: &str) -> Result<String> {
    let mut owned = String::new();
    owned.try_reserve_exact(name.len())?;
    owned.push_str(name);
    Ok(owned)
}
