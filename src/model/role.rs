#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    Director = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::Director),
            _ => None,
        }
    }

    /// HR staff handle intake: receipt, protocol numbers, documentation.
    pub fn handles_intake(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    /// Directors take the final approve/reject decision.
    pub fn decides(self) -> bool {
        matches!(self, Role::Admin | Role::Director)
    }

    /// May read every application, not only their own.
    pub fn is_staff(self) -> bool {
        !matches!(self, Role::Employee)
    }
}
