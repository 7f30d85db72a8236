//! Authoritative board state: every connected user and their placed shapes.
//!
//! The store is a plain value owned and mutated by exactly one task (the
//! server's event loop); it never locks. Users are held in connection order,
//! which is also the order snapshots list them in. Nothing here persists:
//! restarting the process is an empty board.

use log::info;
use shared::{Shape, UserColor, UserSnapshot};
use std::error::Error;
use std::fmt;

/// Error for operations naming a session the store does not hold.
///
/// A placement can legitimately race a disconnect, so callers are expected
/// to treat this as recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownUser(pub u32);

impl fmt::Display for UnknownUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no connected user with session id {}", self.0)
    }
}

impl Error for UnknownUser {}

/// One connected user's record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u32,
    pub color: UserColor,
    pub placed_shapes: Vec<Shape>,
}

/// Ordered roster of connected users, keyed by session id.
///
/// Shapes accumulate without bound for the lifetime of a session; they are
/// only ever appended, never edited or removed short of the user leaving.
#[derive(Debug, Default)]
pub struct BoardStore {
    users: Vec<User>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self { users: Vec::new() }
    }

    /// Registers a newly connected user with an empty shape list.
    pub fn add_user(&mut self, id: u32, color: UserColor) {
        debug_assert!(self.users.iter().all(|user| user.id != id));

        info!("Client joined: {} ({:?})", id, color);
        self.users.push(User {
            id,
            color,
            placed_shapes: Vec::new(),
        });
    }

    /// Drops the user for a closed session. Returns whether it was present.
    pub fn remove_user(&mut self, id: u32) -> bool {
        let before = self.users.len();
        self.users.retain(|user| user.id != id);

        let removed = self.users.len() != before;
        if removed {
            info!("Client left: {}", id);
        }
        removed
    }

    /// Appends shapes, in order, to the given user's placed list.
    pub fn append_shapes(&mut self, id: u32, shapes: Vec<Shape>) -> Result<(), UnknownUser> {
        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(UnknownUser(id))?;

        user.placed_shapes.extend(shapes);
        Ok(())
    }

    /// Full-state snapshot in connection order, as broadcast to clients.
    pub fn snapshot(&self) -> Vec<UserSnapshot> {
        self.users
            .iter()
            .map(|user| UserSnapshot {
                id: user.id,
                color: user.color,
                placed_shapes: user.placed_shapes.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
