use uuid::Uuid;
use crate::types::UserRole;

/// Principal populated by the upstream authentication gate.
///
/// The reporting endpoints perform no authorization of their own; by the time a
/// request reaches them the gate has already admitted a `funcionario` or `admin`.
/// The context is only used to attribute report activity in the logs.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The ID of the authenticated user
    pub user_id: Uuid,

    /// The role of the authenticated user
    pub role: UserRole,
}

impl AuthContext {
    /// Create a new authentication context
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Short label used in log lines
    pub fn describe(&self) -> String {
        format!("{} ({})", self.user_id, self.role.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_names_user_and_role() {
        let ctx = AuthContext::new(Uuid::nil(), UserRole::Funcionario);
        assert_eq!(ctx.describe(), "00000000-0000-0000-0000-000000000000 (funcionario)");
    }
}
