//! Résolution d'identité sur des collections déjà chargées.

use crate::model::{Employee, EmployeeId, Identity, Role};

pub const UNKNOWN_USER: &str = "Unknown User";

/// Nom affiché d'une identité : nom porté par l'enregistrement, puis
/// recherche par id, puis par email, sinon "Unknown User".
pub fn resolve_display_name(identity: &Identity, employees: &[Employee]) -> String {
    if let Some(name) = identity.name.as_deref().map(str::trim) {
        if !name.is_empty() {
            return name.to_string();
        }
    }
    employees
        .iter()
        .find(|e| e.id == identity.id)
        .or_else(|| {
            employees
                .iter()
                .find(|e| e.email.eq_ignore_ascii_case(&identity.email))
        })
        .map(|e| e.name.clone())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

/// Profil de l'utilisateur authentifié.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub employee: Option<EmployeeId>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Identité à enregistrer sur une réservation.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self
                .employee
                .clone()
                .unwrap_or_else(|| EmployeeId::new(&self.email)),
            name: Some(self.name.clone()),
            email: self.email.clone(),
        }
    }
}

/// Associe l'email fourni par le fournisseur d'identité à un employé.
/// Un email inconnu donne un simple employé "Unknown User".
pub fn resolve_profile(email: &str, employees: &[Employee]) -> Profile {
    match employees
        .iter()
        .find(|e| e.email.eq_ignore_ascii_case(email))
    {
        Some(e) => Profile {
            employee: Some(e.id.clone()),
            name: e.name.clone(),
            email: email.to_string(),
            role: e.role,
        },
        None => Profile {
            employee: None,
            name: UNKNOWN_USER.to_string(),
            email: email.to_string(),
            role: Role::Employee,
        },
    }
}
