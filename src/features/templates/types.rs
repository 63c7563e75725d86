//! Template data types.
//!
//! Defines the template kinds, the categories they are listed under, the
//! delivery channel each kind renders for, and the template records held by
//! the library.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CrmError;

/// Every concrete template kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    TermsAndConditions,
    ProposalEmail,
    ProposalSms,
    InvoiceEmail,
    InvoiceSms,
    ReceiptEmail,
    PaymentRequestEmail,
    PaymentRequestSms,
    InvoiceFineprint,
    AppointmentScheduledEmail,
    AppointmentRescheduledEmail,
    AppointmentScheduledSms,
    AppointmentRescheduledSms,
    JobScheduledEmail,
    JobRescheduledEmail,
    JobScheduledSms,
    JobRescheduledSms,
    WorkOrderEmail,
    WorkOrderSms,
    ChangeOrderEmail,
    ChangeOrderSms,
    SecretWorkOrderEmail,
    SecretWorkOrderSms,
    OnSiteEstimateScheduledEmail,
    OnSiteEstimateScheduledSms,
    BookingFormEmail,
    BookingFormSms,
    ConfirmationEmailTemplate,
    ConfirmationSmsTemplate,
    ResolveEmailTemplate,
    ResolveSmsTemplate,
    FinancingOffersReceivedEmail,
    FinancingApprovedEstimateAcceptedEmail,
    FinancingApprovedEstimatePendingEmail,
}

impl TemplateType {
    /// Every template kind, in catalog order.
    pub const ALL: [Self; 34] = [
        Self::TermsAndConditions,
        Self::ProposalEmail,
        Self::ProposalSms,
        Self::InvoiceEmail,
        Self::InvoiceSms,
        Self::ReceiptEmail,
        Self::PaymentRequestEmail,
        Self::PaymentRequestSms,
        Self::InvoiceFineprint,
        Self::AppointmentScheduledEmail,
        Self::AppointmentRescheduledEmail,
        Self::AppointmentScheduledSms,
        Self::AppointmentRescheduledSms,
        Self::JobScheduledEmail,
        Self::JobRescheduledEmail,
        Self::JobScheduledSms,
        Self::JobRescheduledSms,
        Self::WorkOrderEmail,
        Self::WorkOrderSms,
        Self::ChangeOrderEmail,
        Self::ChangeOrderSms,
        Self::SecretWorkOrderEmail,
        Self::SecretWorkOrderSms,
        Self::OnSiteEstimateScheduledEmail,
        Self::OnSiteEstimateScheduledSms,
        Self::BookingFormEmail,
        Self::BookingFormSms,
        Self::ConfirmationEmailTemplate,
        Self::ConfirmationSmsTemplate,
        Self::ResolveEmailTemplate,
        Self::ResolveSmsTemplate,
        Self::FinancingOffersReceivedEmail,
        Self::FinancingApprovedEstimateAcceptedEmail,
        Self::FinancingApprovedEstimatePendingEmail,
    ];

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TermsAndConditions => "terms_and_conditions",
            Self::ProposalEmail => "proposal_email",
            Self::ProposalSms => "proposal_sms",
            Self::InvoiceEmail => "invoice_email",
            Self::InvoiceSms => "invoice_sms",
            Self::ReceiptEmail => "receipt_email",
            Self::PaymentRequestEmail => "payment_request_email",
            Self::PaymentRequestSms => "payment_request_sms",
            Self::InvoiceFineprint => "invoice_fineprint",
            Self::AppointmentScheduledEmail => "appointment_scheduled_email",
            Self::AppointmentRescheduledEmail => "appointment_rescheduled_email",
            Self::AppointmentScheduledSms => "appointment_scheduled_sms",
            Self::AppointmentRescheduledSms => "appointment_rescheduled_sms",
            Self::JobScheduledEmail => "job_scheduled_email",
            Self::JobRescheduledEmail => "job_rescheduled_email",
            Self::JobScheduledSms => "job_scheduled_sms",
            Self::JobRescheduledSms => "job_rescheduled_sms",
            Self::WorkOrderEmail => "work_order_email",
            Self::WorkOrderSms => "work_order_sms",
            Self::ChangeOrderEmail => "change_order_email",
            Self::ChangeOrderSms => "change_order_sms",
            Self::SecretWorkOrderEmail => "secret_work_order_email",
            Self::SecretWorkOrderSms => "secret_work_order_sms",
            Self::OnSiteEstimateScheduledEmail => "on_site_estimate_scheduled_email",
            Self::OnSiteEstimateScheduledSms => "on_site_estimate_scheduled_sms",
            Self::BookingFormEmail => "booking_form_email",
            Self::BookingFormSms => "booking_form_sms",
            Self::ConfirmationEmailTemplate => "confirmation_email_template",
            Self::ConfirmationSmsTemplate => "confirmation_sms_template",
            Self::ResolveEmailTemplate => "resolve_email_template",
            Self::ResolveSmsTemplate => "resolve_sms_template",
            Self::FinancingOffersReceivedEmail => "financing_offers_received_email",
            Self::FinancingApprovedEstimateAcceptedEmail => {
                "financing_approved_estimate_accepted_email"
            },
            Self::FinancingApprovedEstimatePendingEmail => {
                "financing_approved_estimate_pending_email"
            },
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TermsAndConditions => "Terms and Conditions",
            Self::ProposalEmail => "Proposal Email",
            Self::ProposalSms => "Proposal SMS",
            Self::InvoiceEmail => "Invoice Email",
            Self::InvoiceSms => "Invoice SMS",
            Self::ReceiptEmail => "Receipt Email",
            Self::PaymentRequestEmail => "Payment Request Email",
            Self::PaymentRequestSms => "Payment Request SMS",
            Self::InvoiceFineprint => "Invoice Fineprint",
            Self::AppointmentScheduledEmail => "Appointment Scheduled Email",
            Self::AppointmentRescheduledEmail => "Appointment Re-Scheduled Email",
            Self::AppointmentScheduledSms => "Appointment Scheduled SMS",
            Self::AppointmentRescheduledSms => "Appointment Re-Scheduled SMS",
            Self::JobScheduledEmail => "Job Scheduled Email",
            Self::JobRescheduledEmail => "Job Re-Scheduled Email",
            Self::JobScheduledSms => "Job Scheduled SMS",
            Self::JobRescheduledSms => "Job Re-Scheduled SMS",
            Self::WorkOrderEmail => "Work Order Email",
            Self::WorkOrderSms => "Work Order SMS",
            Self::ChangeOrderEmail => "Change Order Email",
            Self::ChangeOrderSms => "Change Order SMS",
            Self::SecretWorkOrderEmail => "Secret Work Order Email",
            Self::SecretWorkOrderSms => "Secret Work Order SMS",
            Self::OnSiteEstimateScheduledEmail => "On Site Estimate Scheduled Email",
            Self::OnSiteEstimateScheduledSms => "On Site Estimate Scheduled SMS",
            Self::BookingFormEmail => "Booking Form Email",
            Self::BookingFormSms => "Booking Form SMS",
            Self::ConfirmationEmailTemplate => "Confirmation Email Template",
            Self::ConfirmationSmsTemplate => "Confirmation SMS Template",
            Self::ResolveEmailTemplate => "Resolve Email Template",
            Self::ResolveSmsTemplate => "Resolve SMS Template",
            Self::FinancingOffersReceivedEmail => "Financing Offers Received Email",
            Self::FinancingApprovedEstimateAcceptedEmail => {
                "Financing Approved (Estimate Accepted) Email"
            },
            Self::FinancingApprovedEstimatePendingEmail => {
                "Financing Approved (Estimate Pending) Email"
            },
        }
    }

    /// The category this kind is listed under.
    #[must_use]
    pub const fn category(self) -> TemplateCategory {
        match self {
            Self::TermsAndConditions => TemplateCategory::Terms,
            Self::ProposalEmail | Self::ProposalSms => TemplateCategory::Proposals,
            Self::InvoiceEmail
            | Self::InvoiceSms
            | Self::ReceiptEmail
            | Self::PaymentRequestEmail
            | Self::PaymentRequestSms
            | Self::InvoiceFineprint => TemplateCategory::Invoices,
            Self::AppointmentScheduledEmail
            | Self::AppointmentRescheduledEmail
            | Self::AppointmentScheduledSms
            | Self::AppointmentRescheduledSms => TemplateCategory::Appointments,
            Self::JobScheduledEmail
            | Self::JobRescheduledEmail
            | Self::JobScheduledSms
            | Self::JobRescheduledSms => TemplateCategory::Jobs,
            Self::WorkOrderEmail | Self::WorkOrderSms => TemplateCategory::WorkOrders,
            Self::ChangeOrderEmail
            | Self::ChangeOrderSms
            | Self::SecretWorkOrderEmail
            | Self::SecretWorkOrderSms => TemplateCategory::ChangeOrders,
            Self::OnSiteEstimateScheduledEmail | Self::OnSiteEstimateScheduledSms => {
                TemplateCategory::Estimates
            },
            Self::BookingFormEmail | Self::BookingFormSms => TemplateCategory::BookingForms,
            Self::ConfirmationEmailTemplate | Self::ConfirmationSmsTemplate => {
                TemplateCategory::Confirmations
            },
            Self::ResolveEmailTemplate | Self::ResolveSmsTemplate => TemplateCategory::Resolutions,
            Self::FinancingOffersReceivedEmail
            | Self::FinancingApprovedEstimateAcceptedEmail
            | Self::FinancingApprovedEstimatePendingEmail => TemplateCategory::Financing,
        }
    }

    /// The channel this kind is delivered through.
    #[must_use]
    pub fn channel(self) -> Channel {
        match self {
            Self::TermsAndConditions | Self::InvoiceFineprint => Channel::Document,
            _ if self.as_str().contains("_sms") => Channel::Sms,
            _ => Channel::Email,
        }
    }

    /// Whether this kind is sent (or attached) as email rather than SMS.
    ///
    /// Terms count as email; the invoice fineprint does not.
    #[must_use]
    pub fn is_email(self) -> bool {
        self != Self::InvoiceFineprint && self.channel() != Channel::Sms
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| CrmError::InvalidArgument(format!("Unknown template type: {s}")))
    }
}

/// Listing category of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Terms,
    Proposals,
    Invoices,
    Appointments,
    Jobs,
    WorkOrders,
    ChangeOrders,
    Estimates,
    BookingForms,
    Confirmations,
    Resolutions,
    Financing,
}

impl TemplateCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 12] = [
        Self::Terms,
        Self::Proposals,
        Self::Invoices,
        Self::Appointments,
        Self::Jobs,
        Self::WorkOrders,
        Self::ChangeOrders,
        Self::Estimates,
        Self::BookingForms,
        Self::Confirmations,
        Self::Resolutions,
        Self::Financing,
    ];

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::Proposals => "proposals",
            Self::Invoices => "invoices",
            Self::Appointments => "appointments",
            Self::Jobs => "jobs",
            Self::WorkOrders => "work_orders",
            Self::ChangeOrders => "change_orders",
            Self::Estimates => "estimates",
            Self::BookingForms => "booking_forms",
            Self::Confirmations => "confirmations",
            Self::Resolutions => "resolutions",
            Self::Financing => "financing",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Terms => "Terms & Conditions",
            Self::Proposals => "Proposals",
            Self::Invoices => "Invoices & Payments",
            Self::Appointments => "Appointments",
            Self::Jobs => "Job Scheduling",
            Self::WorkOrders => "Work Orders",
            Self::ChangeOrders => "Change Orders",
            Self::Estimates => "Estimates",
            Self::BookingForms => "Booking Forms",
            Self::Confirmations => "Confirmations",
            Self::Resolutions => "Resolutions",
            Self::Financing => "Financing",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateCategory {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| CrmError::InvalidArgument(format!("Unknown template category: {s}")))
    }
}

/// How a rendered template reaches its recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// HTML email.
    #[default]
    Email,
    /// Plain-text SMS.
    Sms,
    /// HTML fragment embedded in another document.
    Document,
}

impl Channel {
    /// Whether the body is HTML.
    #[must_use]
    pub const fn is_html(self) -> bool {
        !matches!(self, Self::Sms)
    }
}

impl FromStr for Channel {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" | "text" => Ok(Self::Sms),
            "document" | "doc" => Ok(Self::Document),
            _ => Err(CrmError::InvalidArgument(format!("Unknown channel: {s}"))),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Sms => f.write_str("sms"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// A message template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Template kind; fixed at creation.
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    /// Listing category.
    pub category: TemplateCategory,
    /// Body with `{{keyword}}` tokens.
    pub content: String,
    /// Subject line (email kinds only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Keywords offered for this kind.
    #[serde(default)]
    pub available_keywords: Vec<String>,
    /// Whether the template is in use.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// The channel this template renders for.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.template_type.channel()
    }
}

/// A named variation of the Terms & Conditions document.
///
/// Whether a variation is the default is owned by the registry, not stored
/// on the variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsAndConditions {
    /// The underlying template (always `terms_and_conditions`).
    #[serde(flatten)]
    pub template: Template,
    /// Variation name, e.g. "Standard" or "Commercial".
    pub variation_name: String,
}

/// Partial update of a template. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
    pub subject: Option<String>,
    pub is_active: Option<bool>,
}

impl TemplateUpdate {
    /// Update only the content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Apply to a template, bumping `updated_at`.
    pub fn apply_to(self, template: &mut Template) {
        if let Some(name) = self.name {
            template.name = name;
        }
        if let Some(content) = self.content {
            template.content = content;
        }
        if let Some(subject) = self.subject {
            template.subject = Some(subject);
        }
        if let Some(active) = self.is_active {
            template.is_active = active;
        }
        template.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_count_and_round_trip_names() {
        assert_eq!(TemplateType::ALL.len(), 34);
        for t in TemplateType::ALL {
            assert_eq!(t.as_str().parse::<TemplateType>().unwrap(), t);
        }
        assert!("weekly_newsletter".parse::<TemplateType>().is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            TemplateType::SecretWorkOrderSms.category(),
            TemplateCategory::ChangeOrders
        );
        assert_eq!(
            TemplateType::InvoiceFineprint.category(),
            TemplateCategory::Invoices
        );
        assert_eq!(TemplateCategory::Invoices.label(), "Invoices & Payments");
        assert_eq!(
            "booking-forms".parse::<TemplateCategory>().unwrap(),
            TemplateCategory::BookingForms
        );
    }

    #[test]
    fn test_channels() {
        assert_eq!(TemplateType::InvoiceSms.channel(), Channel::Sms);
        assert_eq!(TemplateType::ConfirmationSmsTemplate.channel(), Channel::Sms);
        assert_eq!(TemplateType::InvoiceEmail.channel(), Channel::Email);
        assert_eq!(TemplateType::InvoiceFineprint.channel(), Channel::Document);
        assert_eq!(TemplateType::TermsAndConditions.channel(), Channel::Document);

        assert!(TemplateType::TermsAndConditions.is_email());
        assert!(!TemplateType::InvoiceFineprint.is_email());
        assert!(!TemplateType::ResolveSmsTemplate.is_email());
    }

    #[test]
    fn test_template_serializes_wire_names() {
        let now = Utc::now();
        let template = Template {
            id: "template_1_0".to_string(),
            name: "Invoice SMS".to_string(),
            template_type: TemplateType::InvoiceSms,
            category: TemplateCategory::Invoices,
            content: "Hi".to_string(),
            subject: None,
            available_keywords: vec!["contact.firstName".to_string()],
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["type"], "invoice_sms");
        assert_eq!(json["isActive"], true);
        assert!(json.get("subject").is_none());
    }
}
