use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Filing category filter offered by the search form
///
/// The set is closed: anything else is rejected when the criteria are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingCategory {
    #[serde(rename = "all_except_section_16")]
    AllExceptSection16,
    AllAnnualQuarterlyAndCurrentReports,
    #[serde(rename = "all_section_16")]
    AllSection16,
    BeneficialOwnershipReports,
    ExemptOfferings,
    RegistrationStatements,
    FilingReviewCorrespondence,
    SecOrdersAndNotices,
    ProxyMaterials,
    TenderOffersAndGoingPrivateTx,
    TrustIndentures,
}

impl FilingCategory {
    /// Every category, in form order
    pub const ALL: [FilingCategory; 11] = [
        Self::AllExceptSection16,
        Self::AllAnnualQuarterlyAndCurrentReports,
        Self::AllSection16,
        Self::BeneficialOwnershipReports,
        Self::ExemptOfferings,
        Self::RegistrationStatements,
        Self::FilingReviewCorrespondence,
        Self::SecOrdersAndNotices,
        Self::ProxyMaterials,
        Self::TenderOffersAndGoingPrivateTx,
        Self::TrustIndentures,
    ];

    /// Returns the user-facing key for this category
    pub fn key(&self) -> &'static str {
        match self {
            Self::AllExceptSection16 => "all_except_section_16",
            Self::AllAnnualQuarterlyAndCurrentReports => "all_annual_quarterly_and_current_reports",
            Self::AllSection16 => "all_section_16",
            Self::BeneficialOwnershipReports => "beneficial_ownership_reports",
            Self::ExemptOfferings => "exempt_offerings",
            Self::RegistrationStatements => "registration_statements",
            Self::FilingReviewCorrespondence => "filing_review_correspondence",
            Self::SecOrdersAndNotices => "sec_orders_and_notices",
            Self::ProxyMaterials => "proxy_materials",
            Self::TenderOffersAndGoingPrivateTx => "tender_offers_and_going_private_tx",
            Self::TrustIndentures => "trust_indentures",
        }
    }

    /// Returns the opaque code the search interface expects
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllExceptSection16 => "form-cat0",
            Self::AllAnnualQuarterlyAndCurrentReports => "form-cat1",
            Self::AllSection16 => "form-cat2",
            Self::BeneficialOwnershipReports => "form-cat3",
            Self::ExemptOfferings => "form-cat4",
            Self::RegistrationStatements => "form-cat5",
            Self::FilingReviewCorrespondence => "form-cat6",
            Self::SecOrdersAndNotices => "form-cat7",
            Self::ProxyMaterials => "form-cat8",
            Self::TenderOffersAndGoingPrivateTx => "form-cat9",
            Self::TrustIndentures => "form-cat10",
        }
    }
}

impl FromStr for FilingCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.key() == key)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for FilingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What to search for, fixed for the duration of a harvest
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchCriteria {
    /// Document words or phrases, joined by a single space
    pub keywords: Vec<String>,

    /// Company name, ticker, or CIK
    pub entity: Option<String>,

    /// Filing category filter
    pub category: Option<FilingCategory>,

    /// Whether the joined keywords must match as an exact phrase
    pub exact: bool,
}

impl SearchCriteria {
    /// Creates criteria matching the given keywords with no filters
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_category(mut self, category: FilingCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Returns the free-text search phrase as sent in the `q` parameter
    ///
    /// Returns `None` when there are no keywords.
    pub fn phrase(&self) -> Option<String> {
        let joined = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.is_empty() {
            None
        } else if self.exact {
            Some(format!("\"{}\"", joined))
        } else {
            Some(joined)
        }
    }

    /// Returns the entity filter, treating a blank value as absent
    pub fn entity(&self) -> Option<&str> {
        self.entity
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}
