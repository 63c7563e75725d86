//! Template keyword catalog.
//!
//! Data keywords are dotted paths (`invoice.total`) substituted with values.
//! Action keywords are single hyphenated names (`pay-invoice`) substituted
//! with a link or button.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::render::extract_keywords;
use super::types::TemplateType;

/// Keyword category, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Contact,
    Business,
    System,
    Invoice,
    Payment,
    Appointment,
    Job,
    Actions,
}

impl KeywordCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 8] = [
        Self::Contact,
        Self::Business,
        Self::System,
        Self::Invoice,
        Self::Payment,
        Self::Appointment,
        Self::Job,
        Self::Actions,
    ];

    /// Group heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contact => "Contact Information",
            Self::Business => "Business Information",
            Self::System => "Company Information",
            Self::Invoice => "Invoice Details",
            Self::Payment => "Payment Details",
            Self::Appointment => "Appointment Details",
            Self::Job => "Job Details",
            Self::Actions => "Action Links",
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A substitutable token described for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateKeyword {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub example: &'static str,
    pub category: KeywordCategory,
}

impl TemplateKeyword {
    /// Whether this keyword renders as a link or button.
    #[must_use]
    pub fn is_action(&self) -> bool {
        self.category == KeywordCategory::Actions
    }

    /// The matching action keyword, if any.
    #[must_use]
    pub fn action(&self) -> Option<ActionKeyword> {
        ActionKeyword::from_key(self.key)
    }
}

/// Keywords grouped under one category heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordGroup {
    pub category: KeywordCategory,
    pub label: &'static str,
    pub keywords: Vec<&'static TemplateKeyword>,
}

/// Call-to-action keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKeyword {
    ViewInvoice,
    PayInvoice,
    ViewProposal,
    AcceptProposal,
    RescheduleLink,
    ConfirmAppointment,
    PaymentLink,
    BookingFormLink,
}

impl ActionKeyword {
    pub const ALL: [Self; 8] = [
        Self::ViewInvoice,
        Self::PayInvoice,
        Self::ViewProposal,
        Self::AcceptProposal,
        Self::RescheduleLink,
        Self::ConfirmAppointment,
        Self::PaymentLink,
        Self::BookingFormLink,
    ];

    /// Token name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ViewInvoice => "view-invoice",
            Self::PayInvoice => "pay-invoice",
            Self::ViewProposal => "view-proposal",
            Self::AcceptProposal => "accept-proposal",
            Self::RescheduleLink => "reschedule-link",
            Self::ConfirmAppointment => "confirm-appointment",
            Self::PaymentLink => "payment-link",
            Self::BookingFormLink => "booking-form-link",
        }
    }

    /// Visible button text.
    #[must_use]
    pub const fn button_label(self) -> &'static str {
        match self {
            Self::ViewInvoice => "View Invoice",
            Self::PayInvoice => "Pay Now",
            Self::ViewProposal => "View Proposal",
            Self::AcceptProposal => "Accept Proposal",
            Self::RescheduleLink => "Reschedule",
            Self::ConfirmAppointment => "Confirm Appointment",
            Self::PaymentLink => "Make Payment",
            Self::BookingFormLink => "Book Now",
        }
    }

    /// Look up by token name (case-sensitive).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }
}

impl fmt::Display for ActionKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

macro_rules! keyword {
    ($key:expr, $label:expr, $description:expr, $example:expr, $category:ident) => {
        TemplateKeyword {
            key: $key,
            label: $label,
            description: $description,
            example: $example,
            category: KeywordCategory::$category,
        }
    };
}

/// Every keyword, in catalog order.
pub static TEMPLATE_KEYWORDS: &[TemplateKeyword] = &[
    keyword!("contact.firstName", "Contact First Name", "The contact's first name", "John", Contact),
    keyword!("contact.lastName", "Contact Last Name", "The contact's last name", "Smith", Contact),
    keyword!("contact.fullName", "Contact Full Name", "The contact's full name", "John Smith", Contact),
    keyword!("contact.email", "Contact Email", "The contact's email address", "john.smith@example.com", Contact),
    keyword!("contact.phone", "Contact Phone", "The contact's phone number", "(555) 123-4567", Contact),
    keyword!("contact.address", "Contact Address", "The contact's full address", "123 Main St, Atlanta, GA 30301", Contact),
    keyword!("business.name", "Business Name", "The business name for this contact", "Acme Corporation", Business),
    keyword!("business.phone", "Business Phone", "The business phone number", "(555) 987-6543", Business),
    keyword!("business.address", "Business Address", "The business full address", "456 Business Blvd, Atlanta, GA 30302", Business),
    keyword!("company.name", "Company Name", "Your company name", "DripJobs Demo Co.", System),
    keyword!("company.phone", "Company Phone", "Your company phone number", "(555) 123-4567", System),
    keyword!("company.email", "Company Email", "Your company email address", "hello@dripjobs.com", System),
    keyword!("company.website", "Company Website", "Your company website URL", "https://dripjobs.com", System),
    keyword!("company.address", "Company Address", "Your company physical address", "123 Main St, Atlanta, GA 30301", System),
    keyword!("invoice.number", "Invoice Number", "The invoice number", "INV-1234", Invoice),
    keyword!("invoice.date", "Invoice Date", "The invoice creation date", "January 15, 2025", Invoice),
    keyword!("invoice.dueDate", "Invoice Due Date", "The invoice payment due date", "January 30, 2025", Invoice),
    keyword!("invoice.total", "Invoice Total", "The total invoice amount", "$1,250.00", Invoice),
    keyword!("invoice.subtotal", "Invoice Subtotal", "The invoice subtotal (before tax)", "$1,150.00", Invoice),
    keyword!("invoice.tax", "Invoice Tax", "The invoice tax amount", "$100.00", Invoice),
    keyword!("invoice.balance", "Invoice Balance", "The remaining balance due", "$500.00", Invoice),
    keyword!("payment.amount", "Payment Amount", "The payment amount", "$750.00", Payment),
    keyword!("payment.method", "Payment Method", "The payment method used", "Credit Card", Payment),
    keyword!("payment.date", "Payment Date", "The payment date", "January 20, 2025", Payment),
    keyword!("appointment.date", "Appointment Date", "The appointment date", "January 25, 2025", Appointment),
    keyword!("appointment.time", "Appointment Time", "The appointment time", "2:00 PM", Appointment),
    keyword!("appointment.duration", "Appointment Duration", "The appointment expected duration", "1 hour", Appointment),
    keyword!("appointment.type", "Appointment Type", "The type of appointment", "Estimate", Appointment),
    keyword!("appointment.address", "Appointment Address", "The appointment location address", "123 Main St, Atlanta, GA 30301", Appointment),
    keyword!("appointment.notes", "Appointment Notes", "Any notes about the appointment", "Please bring paint samples", Appointment),
    keyword!("job.number", "Job Number", "The job number", "JOB-5678", Job),
    keyword!("job.title", "Job Title", "The job title or description", "Exterior Painting", Job),
    keyword!("job.date", "Job Date", "The scheduled job date", "February 1, 2025", Job),
    keyword!("job.time", "Job Time", "The scheduled job time", "8:00 AM", Job),
    keyword!("job.address", "Job Address", "The job location address", "123 Main St, Atlanta, GA 30301", Job),
    keyword!("job.crew", "Job Crew", "The crew assigned to the job", "Team Alpha", Job),
    keyword!("job.estimatedDuration", "Job Estimated Duration", "The estimated job duration", "2 days", Job),
    keyword!("job.total", "Job Total", "The total job amount", "$2,500.00", Job),
    keyword!("view-invoice", "View Invoice Link", "A clickable link to view the invoice", "<a href=\"...\">View Invoice</a>", Actions),
    keyword!("pay-invoice", "Pay Invoice Link", "A clickable link to pay the invoice", "<a href=\"...\">Pay Now</a>", Actions),
    keyword!("view-proposal", "View Proposal Link", "A clickable link to view the proposal", "<a href=\"...\">View Proposal</a>", Actions),
    keyword!("accept-proposal", "Accept Proposal Link", "A clickable link to accept the proposal", "<a href=\"...\">Accept Proposal</a>", Actions),
    keyword!("reschedule-link", "Reschedule Link", "A clickable link to reschedule", "<a href=\"...\">Reschedule</a>", Actions),
    keyword!("confirm-appointment", "Confirm Appointment Link", "A clickable link to confirm the appointment", "<a href=\"...\">Confirm Appointment</a>", Actions),
    keyword!("payment-link", "Payment Link", "A clickable link to make a payment", "<a href=\"...\">Make Payment</a>", Actions),
    keyword!("booking-form-link", "Booking Form Link", "A clickable link to the booking form", "<a href=\"...\">Book Now</a>", Actions),
];

/// Find a catalog entry by key.
#[must_use]
pub fn find_keyword(key: &str) -> Option<&'static TemplateKeyword> {
    TEMPLATE_KEYWORDS.iter().find(|k| k.key == key)
}

/// Keys offered for a template type.
#[must_use]
pub const fn keyword_keys(template_type: TemplateType) -> &'static [&'static str] {
    use TemplateType as T;

    match template_type {
        T::TermsAndConditions => &["company.name", "company.phone", "company.email", "company.address"],
        T::ProposalEmail => &[
            "contact.firstName",
            "contact.fullName",
            "company.name",
            "view-proposal",
            "accept-proposal",
        ],
        T::ProposalSms => &["contact.firstName", "company.name", "view-proposal"],
        T::InvoiceEmail => &[
            "contact.firstName",
            "contact.fullName",
            "invoice.number",
            "invoice.date",
            "invoice.dueDate",
            "invoice.total",
            "invoice.balance",
            "view-invoice",
            "pay-invoice",
            "company.name",
        ],
        T::InvoiceSms => &[
            "contact.firstName",
            "invoice.number",
            "invoice.total",
            "invoice.balance",
            "pay-invoice",
            "company.name",
        ],
        T::ReceiptEmail => &[
            "contact.firstName",
            "contact.fullName",
            "invoice.number",
            "payment.amount",
            "payment.method",
            "payment.date",
            "invoice.balance",
            "company.name",
        ],
        T::PaymentRequestEmail => &[
            "contact.firstName",
            "invoice.number",
            "invoice.balance",
            "payment-link",
            "company.name",
        ],
        T::PaymentRequestSms => &[
            "contact.firstName",
            "invoice.number",
            "invoice.balance",
            "payment-link",
        ],
        T::InvoiceFineprint => &["company.name", "company.phone", "company.email", "invoice.dueDate"],
        T::AppointmentScheduledEmail => &[
            "contact.firstName",
            "appointment.date",
            "appointment.time",
            "appointment.type",
            "appointment.address",
            "appointment.duration",
            "appointment.notes",
            "reschedule-link",
            "confirm-appointment",
            "company.name",
            "company.phone",
        ],
        T::AppointmentRescheduledEmail => &[
            "contact.firstName",
            "appointment.date",
            "appointment.time",
            "appointment.type",
            "appointment.address",
            "reschedule-link",
            "company.name",
            "company.phone",
        ],
        T::AppointmentScheduledSms
        | T::AppointmentRescheduledSms
        | T::OnSiteEstimateScheduledSms => &[
            "contact.firstName",
            "appointment.date",
            "appointment.time",
            "appointment.address",
            "company.name",
        ],
        T::JobScheduledEmail => &[
            "contact.firstName",
            "job.number",
            "job.title",
            "job.date",
            "job.time",
            "job.address",
            "job.crew",
            "job.estimatedDuration",
            "company.name",
            "company.phone",
        ],
        T::JobRescheduledEmail => &[
            "contact.firstName",
            "job.number",
            "job.title",
            "job.date",
            "job.time",
            "job.address",
            "company.name",
            "company.phone",
        ],
        T::JobScheduledSms => &[
            "contact.firstName",
            "job.number",
            "job.date",
            "job.time",
            "job.address",
            "company.name",
        ],
        T::JobRescheduledSms => &[
            "contact.firstName",
            "job.number",
            "job.date",
            "job.time",
            "company.name",
        ],
        T::WorkOrderEmail => &[
            "contact.firstName",
            "job.number",
            "job.title",
            "job.date",
            "job.address",
            "job.crew",
            "company.name",
        ],
        T::WorkOrderSms => &["contact.firstName", "job.number", "job.date", "company.name"],
        T::ChangeOrderEmail => &[
            "contact.firstName",
            "job.number",
            "job.title",
            "invoice.total",
            "company.name",
        ],
        T::ChangeOrderSms | T::SecretWorkOrderSms => {
            &["contact.firstName", "job.number", "company.name"]
        },
        T::SecretWorkOrderEmail => &[
            "contact.firstName",
            "job.number",
            "job.title",
            "job.date",
            "company.name",
        ],
        T::OnSiteEstimateScheduledEmail => &[
            "contact.firstName",
            "appointment.date",
            "appointment.time",
            "appointment.address",
            "confirm-appointment",
            "reschedule-link",
            "company.name",
            "company.phone",
        ],
        T::BookingFormEmail => &[
            "contact.firstName",
            "booking-form-link",
            "company.name",
            "company.phone",
        ],
        T::BookingFormSms => &["contact.firstName", "booking-form-link", "company.name"],
        T::ConfirmationEmailTemplate => &[
            "contact.firstName",
            "appointment.date",
            "appointment.time",
            "company.name",
        ],
        T::ConfirmationSmsTemplate => &["contact.firstName", "appointment.date", "appointment.time"],
        T::ResolveEmailTemplate => &["contact.firstName", "company.name", "company.phone"],
        T::ResolveSmsTemplate => &["contact.firstName", "company.name"],
        T::FinancingOffersReceivedEmail
        | T::FinancingApprovedEstimateAcceptedEmail
        | T::FinancingApprovedEstimatePendingEmail => &[
            "contact.firstName",
            "job.title",
            "job.total",
            "company.name",
        ],
    }
}

/// Keywords offered for a template type, in catalog order.
#[must_use]
pub fn get_keywords_for_template(template_type: TemplateType) -> Vec<&'static TemplateKeyword> {
    let keys = keyword_keys(template_type);
    TEMPLATE_KEYWORDS
        .iter()
        .filter(|k| keys.contains(&k.key))
        .collect()
}

/// The full catalog grouped by category.
#[must_use]
pub fn get_keywords_by_category() -> Vec<KeywordGroup> {
    group(TEMPLATE_KEYWORDS.iter())
}

/// Case-insensitive search across label, key and description.
///
/// An empty or blank query matches everything.
#[must_use]
pub fn search_keywords<'a, I>(keywords: I, query: &str) -> Vec<&'static TemplateKeyword>
where
    I: IntoIterator<Item = &'a &'static TemplateKeyword>,
{
    let query = query.trim().to_lowercase();
    keywords
        .into_iter()
        .copied()
        .filter(|k| {
            query.is_empty()
                || k.label.to_lowercase().contains(&query)
                || k.key.to_lowercase().contains(&query)
                || k.description.to_lowercase().contains(&query)
        })
        .collect()
}

/// Groups for the keyword picker: narrowed to a template type (if any) and
/// a search query, with empty groups dropped.
#[must_use]
pub fn keyword_picker_groups(template_type: Option<TemplateType>, query: &str) -> Vec<KeywordGroup> {
    let candidates: Vec<&'static TemplateKeyword> = match template_type {
        Some(t) => get_keywords_for_template(t),
        None => TEMPLATE_KEYWORDS.iter().collect(),
    };

    group(search_keywords(&candidates, query).into_iter())
}

fn group<I>(keywords: I) -> Vec<KeywordGroup>
where
    I: Iterator<Item = &'static TemplateKeyword> + Clone,
{
    KeywordCategory::ALL
        .into_iter()
        .map(|category| KeywordGroup {
            category,
            label: category.label(),
            keywords: keywords.clone().filter(|k| k.category == category).collect(),
        })
        .filter(|g| !g.keywords.is_empty())
        .collect()
}

/// Wrap a key in token delimiters.
#[must_use]
pub fn format_keyword(key: &str) -> String {
    format!("{{{{{key}}}}}")
}

/// Outcome of checking content for required keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordValidation {
    pub valid: bool,
    pub missing: Vec<String>,
}

/// Check that every required keyword appears in the content.
#[must_use]
pub fn validate_template_keywords<S: AsRef<str>>(content: &str, required: &[S]) -> KeywordValidation {
    let used = extract_keywords(content);
    let missing: Vec<String> = required
        .iter()
        .map(AsRef::as_ref)
        .filter(|key| !used.contains(*key))
        .map(str::to_string)
        .collect();

    KeywordValidation {
        valid: missing.is_empty(),
        missing,
    }
}

/// Keys referenced in the content that are not offered for the type.
#[must_use]
pub fn unknown_keywords(content: &str, template_type: TemplateType) -> BTreeSet<String> {
    let offered = keyword_keys(template_type);
    extract_keywords(content)
        .into_iter()
        .filter(|key| !offered.contains(&key.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keys_are_unique() {
        let keys: BTreeSet<_> = TEMPLATE_KEYWORDS.iter().map(|k| k.key).collect();
        assert_eq!(keys.len(), TEMPLATE_KEYWORDS.len());
    }

    #[test]
    fn test_action_keywords_match_catalog() {
        for action in ActionKeyword::ALL {
            let entry = find_keyword(action.key()).unwrap();
            assert!(entry.is_action());
            assert_eq!(entry.action(), Some(action));
        }
        assert_eq!(ActionKeyword::PayInvoice.button_label(), "Pay Now");
        assert!(ActionKeyword::from_key("invoice.total").is_none());
    }

    #[test]
    fn test_every_type_key_is_in_catalog() {
        for t in TemplateType::ALL {
            for key in keyword_keys(t) {
                assert!(find_keyword(key).is_some(), "{t}: {key}");
            }
        }
    }

    #[test]
    fn test_keywords_for_template_follow_catalog_order() {
        let keys: Vec<_> = get_keywords_for_template(TemplateType::InvoiceSms)
            .iter()
            .map(|k| k.key)
            .collect();

        assert_eq!(
            keys,
            vec![
                "contact.firstName",
                "company.name",
                "invoice.number",
                "invoice.total",
                "invoice.balance",
                "pay-invoice",
            ]
        );
    }

    #[test]
    fn test_grouping() {
        let groups = get_keywords_by_category();
        assert_eq!(groups.len(), 8);
        assert_eq!(groups[2].label, "Company Information");
        assert_eq!(groups[7].keywords.len(), 8);

        let picker = keyword_picker_groups(Some(TemplateType::ResolveSmsTemplate), "");
        assert_eq!(picker.len(), 2);
        assert_eq!(picker[0].category, KeywordCategory::Contact);
        assert_eq!(picker[1].category, KeywordCategory::System);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let all: Vec<_> = TEMPLATE_KEYWORDS.iter().collect();

        let hits = search_keywords(&all, "DUE DATE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "invoice.dueDate");

        // matches description
        assert!(search_keywords(&all, "paint samples").is_empty());
        assert_eq!(search_keywords(&all, "crew assigned").len(), 1);

        assert_eq!(search_keywords(&all, "  ").len(), TEMPLATE_KEYWORDS.len());

        let picker = keyword_picker_groups(None, "balance");
        assert_eq!(picker.len(), 1);
        assert_eq!(picker[0].label, "Invoice Details");
    }

    #[test]
    fn test_format_keyword() {
        assert_eq!(format_keyword("invoice.total"), "{{invoice.total}}");
    }

    #[test]
    fn test_validate_template_keywords() {
        let result = validate_template_keywords(
            "Hi {{contact.firstName}}, {{pay-invoice}}",
            &["contact.firstName", "invoice.total"],
        );
        assert!(!result.valid);
        assert_eq!(result.missing, vec!["invoice.total".to_string()]);

        let ok = validate_template_keywords::<&str>("no tokens", &[]);
        assert!(ok.valid);
    }

    #[test]
    fn test_unknown_keywords() {
        let unknown = unknown_keywords(
            "{{contact.firstName}} {{job.crew}} {{made.up}}",
            TemplateType::ResolveSmsTemplate,
        );
        assert_eq!(
            unknown.into_iter().collect::<Vec<_>>(),
            vec!["job.crew".to_string(), "made.up".to_string()]
        );
    }
}
