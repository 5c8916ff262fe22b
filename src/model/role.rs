#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin,
    Student,
    /// Role id carried by the token that this service does not know about.
    Unrecognized(u8),
}

impl Role {
    pub const ADMIN_ID: u8 = 1;
    pub const STUDENT_ID: u8 = 2;

    pub fn from_id(id: u8) -> Self {
        match id {
            Self::ADMIN_ID => Role::Admin,
            Self::STUDENT_ID => Role::Student,
            other => Role::Unrecognized(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Unrecognized(_) => "unrecognized",
        }
    }
}
