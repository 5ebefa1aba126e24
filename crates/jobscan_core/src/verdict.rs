use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification label the backend assigns to one email.
///
/// Deserialization is total: tags outside the known set are kept verbatim in
/// [`Verdict::Unrecognized`] and rank with `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    Rejected,
    ApplicationReceived,
    Referred,
    OaReceived,
    InterviewScheduled,
    OfferReceived,
    Unknown,
    /// Legacy label, displayed but never prioritized.
    Ghosted,
    /// Legacy label, displayed but never prioritized.
    ReferredNoResponse,
    Unrecognized(String),
}

impl Verdict {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "rejected" => Verdict::Rejected,
            "application_received" => Verdict::ApplicationReceived,
            "referred" => Verdict::Referred,
            "oa_received" => Verdict::OaReceived,
            "interview_scheduled" => Verdict::InterviewScheduled,
            "offer_received" => Verdict::OfferReceived,
            "unknown" => Verdict::Unknown,
            "ghosted" => Verdict::Ghosted,
            "referred_no_response" => Verdict::ReferredNoResponse,
            _ => Verdict::Unrecognized(tag.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Verdict::Rejected => "rejected",
            Verdict::ApplicationReceived => "application_received",
            Verdict::Referred => "referred",
            Verdict::OaReceived => "oa_received",
            Verdict::InterviewScheduled => "interview_scheduled",
            Verdict::OfferReceived => "offer_received",
            Verdict::Unknown => "unknown",
            Verdict::Ghosted => "ghosted",
            Verdict::ReferredNoResponse => "referred_no_response",
            Verdict::Unrecognized(tag) => tag,
        }
    }

    /// Sort rank, higher first.
    pub fn priority(&self) -> u8 {
        match self {
            Verdict::OfferReceived => 4,
            Verdict::InterviewScheduled => 3,
            Verdict::OaReceived | Verdict::Referred => 2,
            Verdict::ApplicationReceived | Verdict::Rejected => 1,
            Verdict::Unknown
            | Verdict::Ghosted
            | Verdict::ReferredNoResponse
            | Verdict::Unrecognized(_) => 0,
        }
    }

    /// Membership in the "positive" filter. `referred` only counts when the
    /// caller opts in.
    pub fn is_positive(&self, include_referred: bool) -> bool {
        match self {
            Verdict::OaReceived | Verdict::InterviewScheduled | Verdict::OfferReceived => true,
            Verdict::Referred => include_referred,
            _ => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Rejected => "Rejected",
            Verdict::ApplicationReceived => "Application received",
            Verdict::Referred => "Referred",
            Verdict::OaReceived => "Online assessment",
            Verdict::InterviewScheduled => "Interview scheduled",
            Verdict::OfferReceived => "Offer received",
            Verdict::Ghosted => "Ghosted",
            Verdict::ReferredNoResponse => "Referred, no response",
            Verdict::Unknown | Verdict::Unrecognized(_) => "Unknown",
        }
    }
}

impl From<String> for Verdict {
    fn from(tag: String) -> Self {
        Verdict::from_tag(&tag)
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        verdict.tag().to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
