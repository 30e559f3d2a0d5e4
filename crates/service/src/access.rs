//! Ownership-or-admin access guard.

use models::user::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: Uuid,
    pub role: Role,
}

/// True iff the requester owns the record or is an admin.
pub fn allow(owner_id: Uuid, requester_id: Uuid, role: Role) -> bool {
    owner_id == requester_id || role == Role::Admin
}

impl Requester {
    pub fn new(id: Uuid, role: Role) -> Self { Self { id, role } }

    pub fn may_modify(&self, owner_id: Uuid) -> bool {
        allow(owner_id, self.id, self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
