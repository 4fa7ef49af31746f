use async_graphql::{Enum, SimpleObject};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum MappingStatus {
    Compliant,
    Gap,
    Partial,
}

/// A regulatory requirement and the internal control mapped to it, if any.
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub(crate) struct Regulation {
    pub(crate) id: String,
    /// Framework name, e.g. `ISO 27001` or `GDPR`.
    pub(crate) name: String,
    pub(crate) section: String,
    pub(crate) description: String,
    pub(crate) mapped_control_id: Option<String>,
    pub(crate) status: MappingStatus,
    pub(crate) evidence_count: i32,
}

#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RegulationSummary {
    /// Compliant requirements count fully, partial ones half; rounded percent.
    pub(crate) coverage_score: i32,
    pub(crate) critical_gaps: i32,
    pub(crate) mapped_controls: i32,
    pub(crate) total_requirements: i32,
}

fn regulation(
    id: &str,
    name: &str,
    section: &str,
    description: &str,
    mapped_control_id: Option<&str>,
    status: MappingStatus,
    evidence_count: i32,
) -> Regulation {
    Regulation {
        id: id.to_string(),
        name: name.to_string(),
        section: section.to_string(),
        description: description.to_string(),
        mapped_control_id: mapped_control_id.map(str::to_string),
        status,
        evidence_count,
    }
}

pub(super) fn sample_regulations() -> Vec<Regulation> {
    use MappingStatus::{Compliant, Gap, Partial};

    vec![
        regulation(
            "r1",
            "ISO 27001",
            "A.9.2.1",
            "User registration and de-registration",
            Some("CTRL-052"),
            Compliant,
            4,
        ),
        regulation(
            "r2",
            "ISO 27001",
            "A.9.2.3",
            "Management of privileged access rights",
            Some("CTRL-088"),
            Compliant,
            12,
        ),
        regulation(
            "r3",
            "GDPR",
            "Art. 33",
            "Notification of a personal data breach",
            Some("CTRL-012"),
            Partial,
            1,
        ),
        regulation(
            "r4",
            "SOC 2",
            "CC6.1",
            "Logical access security software",
            Some("CTRL-099"),
            Compliant,
            8,
        ),
        regulation(
            "r5",
            "HIPAA",
            "164.312(a)(1)",
            "Access Control",
            None,
            Gap,
            0,
        ),
        regulation(
            "r6",
            "NIST CSF",
            "PR.AC-1",
            "Identities and credentials are managed",
            Some("CTRL-052"),
            Compliant,
            6,
        ),
    ]
}
