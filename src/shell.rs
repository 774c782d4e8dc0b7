//! Role-specific landing destination and tab set.

use serde::Serialize;

use crate::models::Role;

/// Where a freshly signed-in user lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    DoctorHome,
    PatientHome,
}

impl Destination {
    pub fn landing_for(role: Role) -> Self {
        match role {
            Role::Doctor => Self::DoctorHome,
            Role::Patient => Self::PatientHome,
        }
    }

    pub fn tabs(self) -> &'static [Tab] {
        match self {
            Self::DoctorHome => DOCTOR_TABS,
            Self::PatientHome => PATIENT_TABS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: &'static str,
    pub title: &'static str,
}

const DOCTOR_TABS: &[Tab] = &[
    Tab { id: "appointments", title: "Appointments" },
    Tab { id: "records", title: "Records" },
    Tab { id: "profile", title: "Profile" },
];

const PATIENT_TABS: &[Tab] = &[
    Tab { id: "home", title: "Home" },
    Tab { id: "book", title: "Book" },
    Tab { id: "appointments", title: "Appointments" },
    Tab { id: "profile", title: "Profile" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_follows_role() {
        assert_eq!(Destination::landing_for(Role::Doctor), Destination::DoctorHome);
        assert_eq!(Destination::landing_for(Role::Patient), Destination::PatientHome);
    }

    #[test]
    fn only_patients_can_book() {
        let has_book = |d: Destination| d.tabs().iter().any(|t| t.id == "book");
        assert!(has_book(Destination::PatientHome));
        assert!(!has_book(Destination::DoctorHome));
    }
}
