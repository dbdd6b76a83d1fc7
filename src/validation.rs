use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::models::{CandidateRecord, LeadRecord, LeadStamp};
use crate::store::find_duplicate;

/// Required candidate fields, in the order they are reported when missing.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "name",
    "lastname",
    "documentType",
    "documentNumber",
    "phone",
    "email",
];

/// Minimum length of `documentNumber`, counted in UTF-16 code units.
pub const MIN_DOCUMENT_LENGTH: usize = 8;

// local@domain.tld, no whitespace and no extra '@' in any segment
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Decides when a submitted field value counts as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlankPolicy {
    /// Only the empty string is blank; `"   "` is accepted as a value.
    #[default]
    EmptyOnly,
    /// A value that is empty after trimming whitespace is blank.
    TrimWhitespace,
}

impl BlankPolicy {
    pub fn is_blank(self, value: &str) -> bool {
        match self {
            BlankPolicy::EmptyOnly => value.is_empty(),
            BlankPolicy::TrimWhitespace => value.trim().is_empty(),
        }
    }
}

impl FromStr for BlankPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(BlankPolicy::EmptyOnly),
            "trim" => Ok(BlankPolicy::TrimWhitespace),
            other => anyhow::bail!("unknown blank policy '{}' (expected 'empty' or 'trim')", other),
        }
    }
}

/// Why a submission was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Offending fields, in `REQUIRED_FIELDS` order.
    MissingFields(Vec<&'static str>),
    InvalidEmail,
    DocumentTooShort,
    /// Email or document number already belongs to a stored lead.
    Duplicate,
}

impl Rejection {
    /// Message returned to HTTP clients.
    pub fn client_message(&self) -> String {
        match self {
            Rejection::MissingFields(fields) => {
                format!("Campos requeridos faltantes: {}", fields.join(", "))
            }
            Rejection::InvalidEmail => "Formato de email inválido".to_string(),
            Rejection::DocumentTooShort => {
                "Número de documento debe tener al menos 8 dígitos".to_string()
            }
            Rejection::Duplicate => {
                "Ya existe un registro con este email o número de documento".to_string()
            }
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingFields(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Rejection::InvalidEmail => write!(f, "invalid email format"),
            Rejection::DocumentTooShort => write!(f, "document number too short"),
            Rejection::Duplicate => write!(f, "duplicate email or document number"),
        }
    }
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted(LeadRecord),
    Rejected(Rejection),
}

/// Length as browsers and JSON clients count it (UTF-16 code units).
pub fn document_length(document_number: &str) -> usize {
    document_number.encode_utf16().count()
}

/// Returns true when `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Submission validation pipeline.
///
/// Checks run in a fixed order and stop at the first failure:
/// 1. required fields present and not blank
/// 2. email format
/// 3. document number length
/// 4. no stored lead shares the email or the document number
///
/// The validator never touches the store; the caller inserts the accepted record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionValidator {
    blank_policy: BlankPolicy,
}

impl SubmissionValidator {
    pub fn new(blank_policy: BlankPolicy) -> Self {
        Self { blank_policy }
    }

    pub fn blank_policy(&self) -> BlankPolicy {
        self.blank_policy
    }

    /// Lists the required fields that are absent or blank, in canonical order.
    pub fn missing_fields(&self, candidate: &CandidateRecord) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| match candidate.field(field) {
                Some(value) => self.blank_policy.is_blank(value),
                None => true,
            })
            .collect()
    }

    /// Runs every check against `existing`.
    ///
    /// `stamp` is called only when the candidate is accepted.
    pub fn validate<F>(
        &self,
        candidate: &CandidateRecord,
        existing: &[LeadRecord],
        stamp: F,
    ) -> Decision
    where
        F: FnOnce() -> LeadStamp,
    {
        let missing = self.missing_fields(candidate);
        if !missing.is_empty() {
            return Decision::Rejected(Rejection::MissingFields(missing));
        }

        // All six are Some past this point.
        let field = |name: &str| candidate.field(name).unwrap_or_default();
        let email = field("email");
        let document_number = field("documentNumber");

        if !is_valid_email(email) {
            return Decision::Rejected(Rejection::InvalidEmail);
        }

        if document_length(document_number) < MIN_DOCUMENT_LENGTH {
            return Decision::Rejected(Rejection::DocumentTooShort);
        }

        if let Some(existing_lead) = find_duplicate(existing, email, document_number) {
            tracing::debug!(
                "Candidate collides with stored lead {} (email or document number)",
                existing_lead.id
            );
            return Decision::Rejected(Rejection::Duplicate);
        }

        let LeadStamp { id, created_at } = stamp();

        Decision::Accepted(LeadRecord {
            name: field("name").to_string(),
            lastname: field("lastname").to_string(),
            document_type: field("documentType").to_string(),
            document_number: document_number.to_string(),
            phone: field("phone").to_string(),
            email: email.to_string(),
            id,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ana() -> CandidateRecord {
        CandidateRecord {
            name: Some("Ana".to_string()),
            lastname: Some("Lopez".to_string()),
            document_type: Some("DNI".to_string()),
            document_number: Some("12345678".to_string()),
            phone: Some("555-1111".to_string()),
            email: Some("ana@test.com".to_string()),
        }
    }

    fn fixed_stamp() -> LeadStamp {
        LeadStamp {
            id: "1700000000000".to_string(),
            created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    fn stored(email: &str, document_number: &str) -> LeadRecord {
        let mut candidate = ana();
        candidate.email = Some(email.to_string());
        candidate.document_number = Some(document_number.to_string());
        match SubmissionValidator::default().validate(&candidate, &[], fixed_stamp) {
            Decision::Accepted(lead) => lead,
            other => panic!("fixture should be accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_valid_candidate_verbatim() {
        let decision = SubmissionValidator::default().validate(&ana(), &[], fixed_stamp);

        let Decision::Accepted(lead) = decision else {
            panic!("expected acceptance");
        };
        assert_eq!(lead.name, "Ana");
        assert_eq!(lead.lastname, "Lopez");
        assert_eq!(lead.document_type, "DNI");
        assert_eq!(lead.document_number, "12345678");
        assert_eq!(lead.phone, "555-1111");
        assert_eq!(lead.email, "ana@test.com");
        assert_eq!(lead.id, "1700000000000");
    }

    #[test]
    fn test_missing_fields_reported_in_canonical_order() {
        let candidate = CandidateRecord {
            email: None,
            name: Some(String::new()),
            phone: None,
            ..ana()
        };

        let decision = SubmissionValidator::default().validate(&candidate, &[], fixed_stamp);

        assert_eq!(
            decision,
            Decision::Rejected(Rejection::MissingFields(vec!["name", "phone", "email"]))
        );
    }

    #[test]
    fn test_empty_candidate_lists_every_field() {
        let decision =
            SubmissionValidator::default().validate(&CandidateRecord::default(), &[], fixed_stamp);

        assert_eq!(
            decision,
            Decision::Rejected(Rejection::MissingFields(REQUIRED_FIELDS.to_vec()))
        );
    }

    #[test]
    fn test_whitespace_only_depends_on_blank_policy() {
        let candidate = CandidateRecord {
            lastname: Some("   ".to_string()),
            ..ana()
        };

        let lenient = SubmissionValidator::new(BlankPolicy::EmptyOnly);
        assert!(matches!(
            lenient.validate(&candidate, &[], fixed_stamp),
            Decision::Accepted(_)
        ));

        let strict = SubmissionValidator::new(BlankPolicy::TrimWhitespace);
        assert_eq!(
            strict.validate(&candidate, &[], fixed_stamp),
            Decision::Rejected(Rejection::MissingFields(vec!["lastname"]))
        );
    }

    #[test]
    fn test_zero_string_is_present() {
        let candidate = CandidateRecord {
            name: Some("0".to_string()),
            ..ana()
        };

        assert!(matches!(
            SubmissionValidator::default().validate(&candidate, &[], fixed_stamp),
            Decision::Accepted(_)
        ));
    }

    #[test]
    fn test_missing_fields_win_over_bad_email() {
        let candidate = CandidateRecord {
            phone: None,
            email: Some("not-an-email".to_string()),
            document_number: Some("1".to_string()),
            ..ana()
        };

        assert_eq!(
            SubmissionValidator::default().validate(&candidate, &[], fixed_stamp),
            Decision::Rejected(Rejection::MissingFields(vec!["phone"]))
        );
    }

    #[test]
    fn test_bad_email_wins_over_short_document() {
        let candidate = CandidateRecord {
            email: Some("ana@test".to_string()),
            document_number: Some("123".to_string()),
            ..ana()
        };

        assert_eq!(
            SubmissionValidator::default().validate(&candidate, &[], fixed_stamp),
            Decision::Rejected(Rejection::InvalidEmail)
        );
    }

    #[test]
    fn test_short_document_rejected() {
        let candidate = CandidateRecord {
            document_number: Some("1234567".to_string()),
            ..ana()
        };

        assert_eq!(
            SubmissionValidator::default().validate(&candidate, &[], fixed_stamp),
            Decision::Rejected(Rejection::DocumentTooShort)
        );
    }

    #[test]
    fn test_document_length_counts_raw_characters() {
        let candidate = CandidateRecord {
            document_number: Some("12.345-6".to_string()),
            ..ana()
        };

        assert!(matches!(
            SubmissionValidator::default().validate(&candidate, &[], fixed_stamp),
            Decision::Accepted(_)
        ));
    }

    #[test]
    fn test_document_length_counts_utf16_units() {
        assert_eq!(document_length("123456\u{1F600}"), 8);
        assert_eq!(document_length("1234567é"), 8);

        let candidate = CandidateRecord {
            document_number: Some("123456\u{1F600}".to_string()),
            ..ana()
        };
        assert!(matches!(
            SubmissionValidator::default().validate(&candidate, &[], fixed_stamp),
            Decision::Accepted(_)
        ));

        let candidate = CandidateRecord {
            document_number: Some("12345\u{1F600}".to_string()),
            ..ana()
        };
        assert_eq!(
            SubmissionValidator::default().validate(&candidate, &[], fixed_stamp),
            Decision::Rejected(Rejection::DocumentTooShort)
        );
    }

    #[test]
    fn test_duplicate_email_or_document_rejected() {
        let existing = vec![stored("ana@test.com", "99999999")];
        let validator = SubmissionValidator::default();

        let same_email = CandidateRecord {
            document_number: Some("11111111".to_string()),
            ..ana()
        };
        assert_eq!(
            validator.validate(&same_email, &existing, fixed_stamp),
            Decision::Rejected(Rejection::Duplicate)
        );

        let same_document = CandidateRecord {
            email: Some("other@test.com".to_string()),
            document_number: Some("99999999".to_string()),
            ..ana()
        };
        assert_eq!(
            validator.validate(&same_document, &existing, fixed_stamp),
            Decision::Rejected(Rejection::Duplicate)
        );
    }

    #[test]
    fn test_no_normalization_before_dedup() {
        let existing = vec![stored("ana@test.com", "99999999")];
        let candidate = CandidateRecord {
            email: Some("ANA@test.com".to_string()),
            ..ana()
        };

        assert!(matches!(
            SubmissionValidator::default().validate(&candidate, &existing, fixed_stamp),
            Decision::Accepted(_)
        ));
    }

    #[test]
    fn test_stamp_not_called_on_rejection() {
        let candidate = CandidateRecord {
            email: None,
            ..ana()
        };

        let decision = SubmissionValidator::default().validate(&candidate, &[], || {
            panic!("stamp must not be generated for a rejected candidate")
        });

        assert!(matches!(decision, Decision::Rejected(_)));
    }

    #[test]
    fn test_client_messages() {
        assert_eq!(
            Rejection::MissingFields(vec!["name", "email"]).client_message(),
            "Campos requeridos faltantes: name, email"
        );
        assert_eq!(
            Rejection::InvalidEmail.client_message(),
            "Formato de email inválido"
        );
        assert_eq!(
            Rejection::DocumentTooShort.client_message(),
            "Número de documento debe tener al menos 8 dígitos"
        );
        assert_eq!(
            Rejection::Duplicate.client_message(),
            "Ya existe un registro con este email o número de documento"
        );
    }

    #[test]
    fn test_blank_policy_parsing() {
        assert_eq!("empty".parse::<BlankPolicy>().unwrap(), BlankPolicy::EmptyOnly);
        assert_eq!(" TRIM ".parse::<BlankPolicy>().unwrap(), BlankPolicy::TrimWhitespace);
        assert!("sometimes".parse::<BlankPolicy>().is_err());
    }
}
