//! # Doctor Directory
//!
//! Static list of doctors and the conditions they take.
//!
//! ## Matching
//! - Symptom text is lowercased, keywords are stored lowercase
//! - Records are checked in declaration order, the first record with any keyword
//!   contained in the text wins
//! - No ranking: a symptom mentioning both "fever" and "chest pain" goes to the
//!   General Physician because that record is declared first

pub const NO_RECOMMENDATION: &str = "No specific doctor recommendation.";

#[derive(Debug, PartialEq, Eq)]
pub struct DoctorRecord {
    pub name: &'static str,
    pub specialty: &'static str,
    pub condition_keywords: &'static [&'static str],
}

impl DoctorRecord {
    pub fn treats(&self, lowered_symptom: &str) -> bool {
        self.condition_keywords
            .iter()
            .any(|keyword| lowered_symptom.contains(keyword))
    }

    pub fn recommendation(&self) -> String {
        format!(
            "Recommended Doctor: {} (Specialist: {})",
            self.name, self.specialty
        )
    }
}

pub const DOCTORS: &[DoctorRecord] = &[
    DoctorRecord {
        name: "Dr. Padmapriya",
        specialty: "General Physician",
        condition_keywords: &["cold", "flu", "fever"],
    },
    DoctorRecord {
        name: "Dr. Shanmugasundar",
        specialty: "Cardiologist",
        condition_keywords: &["chest pain", "abnormal pressure", "fast heart beat"],
    },
    DoctorRecord {
        name: "Dr. Naveen",
        specialty: "Orthopedic",
        condition_keywords: &["bone pain", "muscle pain", "joint pain"],
    },
];

#[derive(Clone, Copy, Debug)]
pub struct DoctorDirectory {
    doctors: &'static [DoctorRecord],
}

impl Default for DoctorDirectory {
    fn default() -> Self {
        Self { doctors: DOCTORS }
    }
}

impl DoctorDirectory {
    pub fn new(doctors: &'static [DoctorRecord]) -> Self {
        Self { doctors }
    }

    pub fn find(&self, symptom: &str) -> Option<&'static DoctorRecord> {
        let lowered = symptom.to_lowercase();

        self.doctors.iter().find(|doctor| doctor.treats(&lowered))
    }

    pub fn recommend(&self, symptom: &str) -> String {
        self.find(symptom)
            .map(DoctorRecord::recommendation)
            .unwrap_or_else(|| NO_RECOMMENDATION.to_string())
    }
}

/// Recommendation against the built-in directory.
pub fn recommend(symptom: &str) -> String {
    DoctorDirectory::default().recommend(symptom)
}
