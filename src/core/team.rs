//! User roles and the acting-user identity supplied by the auth layer

use serde::{Deserialize, Serialize};

/// Roles recognised by the order workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    ProductionCoordinator,
    ProcurementSpecialist,
    QcPerson,
    Assembler,
    ServiceDepartment,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::ProductionCoordinator,
        Role::ProcurementSpecialist,
        Role::QcPerson,
        Role::Assembler,
        Role::ServiceDepartment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::ProductionCoordinator => "PRODUCTION_COORDINATOR",
            Role::ProcurementSpecialist => "PROCUREMENT_SPECIALIST",
            Role::QcPerson => "QC_PERSON",
            Role::Assembler => "ASSEMBLER",
            Role::ServiceDepartment => "SERVICE_DEPARTMENT",
        }
    }

    /// Roles that may move an order between any two statuses
    pub fn bypasses_transition_graph(&self) -> bool {
        matches!(self, Role::Admin | Role::ProductionCoordinator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        Role::ALL
            .iter()
            .find(|role| role.as_str() == normalized)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Invalid role: {}. Use ADMIN, PRODUCTION_COORDINATOR, PROCUREMENT_SPECIALIST, QC_PERSON, ASSEMBLER or SERVICE_DEPARTMENT",
                    s
                )
            })
    }
}

/// The authenticated user performing an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: String,
    pub role: Role,
}

impl ActingUser {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("qc_person".parse::<Role>().unwrap(), Role::QcPerson);
        assert_eq!(
            "production-coordinator".parse::<Role>().unwrap(),
            Role::ProductionCoordinator
        );
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_admin_and_coordinator_bypass() {
        let bypass: Vec<_> = Role::ALL
            .iter()
            .filter(|r| r.bypasses_transition_graph())
            .copied()
            .collect();
        assert_eq!(bypass, vec![Role::Admin, Role::ProductionCoordinator]);
    }
}
