//! Built-in subject lines and bodies for every template type.
//!
//! Email bodies share one card layout assembled by [`EmailBody`]; SMS bodies
//! are single lines. Every default only references keywords offered for its
//! type.

use super::types::TemplateType;

const BLUE: &str = "#3498db";
const GREEN: &str = "#27ae60";
const GREY: &str = "#7f8c8d";

/// Default subject for a template type. SMS and fineprint kinds have none.
#[must_use]
pub const fn default_subject(template_type: TemplateType) -> Option<&'static str> {
    use TemplateType as T;

    let subject = match template_type {
        T::TermsAndConditions => "Terms and Conditions",
        T::ProposalEmail => "Your Proposal from {{company.name}} is Ready",
        T::InvoiceEmail => "Invoice #{{invoice.number}} from {{company.name}}",
        T::ReceiptEmail => "Payment Receipt - {{company.name}}",
        T::PaymentRequestEmail => "Payment Reminder - Invoice #{{invoice.number}}",
        T::AppointmentScheduledEmail => "Appointment Confirmed - {{appointment.date}}",
        T::AppointmentRescheduledEmail => "Appointment Rescheduled - {{appointment.date}}",
        T::JobScheduledEmail => "Job Scheduled - {{job.title}}",
        T::JobRescheduledEmail => "Job Rescheduled - {{job.title}}",
        T::WorkOrderEmail => "Work Order - {{job.title}}",
        T::ChangeOrderEmail => "Change Order Request - {{job.title}}",
        T::SecretWorkOrderEmail => "Work Order Update",
        T::OnSiteEstimateScheduledEmail => "On-Site Estimate Scheduled",
        T::BookingFormEmail => "Schedule Your Service with {{company.name}}",
        T::ConfirmationEmailTemplate => "Confirmation - {{company.name}}",
        T::ResolveEmailTemplate => "Issue Resolution Update",
        T::FinancingOffersReceivedEmail => "Financing Options Available",
        T::FinancingApprovedEstimateAcceptedEmail => "Financing Approved!",
        T::FinancingApprovedEstimatePendingEmail => "Financing Approved - Next Steps",
        _ => return None,
    };
    Some(subject)
}

/// Default body for a template type.
#[must_use]
pub fn default_content(template_type: TemplateType) -> String {
    use TemplateType as T;

    match template_type {
        T::TermsAndConditions => terms_document(),
        T::InvoiceFineprint => invoice_fineprint(),

        T::ProposalEmail => EmailBody::new("New Proposal Available")
            .greeting()
            .paragraph("Thank you for considering {{company.name}} for your project. We've prepared a detailed proposal for you based on our discussion.")
            .button("view-proposal", "View Proposal", BLUE)
            .paragraph("If you have any questions or would like to discuss the proposal, please don't hesitate to reach out. We're here to help!")
            .sign_off("Best regards,", false),
        T::InvoiceEmail => EmailBody::new("Invoice #{{invoice.number}}")
            .greeting()
            .paragraph("Thank you for choosing {{company.name}}! Your invoice is now ready.")
            .details(&[
                ("Invoice Number", "{{invoice.number}}"),
                ("Invoice Date", "{{invoice.date}}"),
                ("Due Date", "{{invoice.dueDate}}"),
                ("Amount Due", "{{invoice.balance}}"),
            ])
            .button("view-invoice", "View Invoice", BLUE)
            .button("pay-invoice", "Pay Now", GREEN)
            .paragraph("If you have any questions about this invoice, please don't hesitate to contact us.")
            .sign_off("Thank you for your business!", false),
        T::ReceiptEmail => EmailBody::new("Payment Receipt")
            .badge("PAYMENT RECEIVED")
            .greeting()
            .paragraph("Thank you! We've received your payment.")
            .details(&[
                ("Invoice Number", "{{invoice.number}}"),
                ("Amount Paid", "{{payment.amount}}"),
                ("Payment Method", "{{payment.method}}"),
                ("Payment Date", "{{payment.date}}"),
                ("Remaining Balance", "{{invoice.balance}}"),
            ])
            .sign_off("Thank you for your business!", false),
        T::PaymentRequestEmail => EmailBody::new("Payment Request")
            .greeting()
            .paragraph("This is a friendly reminder that you have an outstanding balance on invoice #{{invoice.number}}.")
            .callout("Balance Due: {{invoice.balance}}")
            .button("payment-link", "Pay Now", GREEN)
            .sign_off("Thank you,", false),

        T::AppointmentScheduledEmail => EmailBody::new("Appointment Confirmed")
            .greeting()
            .paragraph("Your {{appointment.type}} appointment with {{company.name}} has been scheduled!")
            .details(&[
                ("Date", "{{appointment.date}}"),
                ("Time", "{{appointment.time}}"),
                ("Duration", "{{appointment.duration}}"),
                ("Location", "{{appointment.address}}"),
            ])
            .callout("Notes: {{appointment.notes}}")
            .button("confirm-appointment", "Confirm Appointment", GREEN)
            .button("reschedule-link", "Reschedule", GREY)
            .sign_off("See you soon!", true),
        T::AppointmentRescheduledEmail => EmailBody::new("Appointment Rescheduled")
            .greeting()
            .paragraph("Your {{appointment.type}} appointment has been moved to a new time.")
            .details(&[
                ("New Date", "{{appointment.date}}"),
                ("New Time", "{{appointment.time}}"),
                ("Location", "{{appointment.address}}"),
            ])
            .button("reschedule-link", "Need to Reschedule Again?", BLUE)
            .sign_off("See you soon!", true),
        T::OnSiteEstimateScheduledEmail => EmailBody::new("On-Site Estimate Scheduled")
            .greeting()
            .paragraph("Thank you for your interest in {{company.name}}! We've scheduled an on-site visit to provide you with a detailed estimate.")
            .details(&[
                ("Date", "{{appointment.date}}"),
                ("Time", "{{appointment.time}}"),
                ("Location", "{{appointment.address}}"),
            ])
            .button("confirm-appointment", "Confirm Appointment", GREEN)
            .button("reschedule-link", "Reschedule", GREY)
            .sign_off("We look forward to meeting you!", true),
        T::ConfirmationEmailTemplate => EmailBody::new("Appointment Confirmed")
            .badge("CONFIRMED")
            .greeting()
            .paragraph("Thank you for confirming your appointment!")
            .callout("{{appointment.date}} at {{appointment.time}}")
            .sign_off("See you then!", false),

        T::JobScheduledEmail => EmailBody::new("Job Scheduled - {{job.title}}")
            .greeting()
            .paragraph("Great news! Your job has been scheduled.")
            .details(&[
                ("Job Number", "{{job.number}}"),
                ("Date", "{{job.date}}"),
                ("Start Time", "{{job.time}}"),
                ("Location", "{{job.address}}"),
                ("Crew", "{{job.crew}}"),
                ("Estimated Duration", "{{job.estimatedDuration}}"),
            ])
            .sign_off("Thank you for choosing us!", true),
        T::JobRescheduledEmail => EmailBody::new("Job Rescheduled")
            .greeting()
            .paragraph("Your job ({{job.title}}) has been rescheduled to a new date.")
            .details(&[
                ("Job Number", "{{job.number}}"),
                ("New Date", "{{job.date}}"),
                ("Start Time", "{{job.time}}"),
                ("Location", "{{job.address}}"),
            ])
            .sign_off("We apologize for any inconvenience.", true),
        T::WorkOrderEmail => EmailBody::new("Work Order - {{job.title}}")
            .greeting()
            .paragraph("Here are the details of your upcoming work order.")
            .details(&[
                ("Job Number", "{{job.number}}"),
                ("Date", "{{job.date}}"),
                ("Location", "{{job.address}}"),
                ("Crew", "{{job.crew}}"),
            ])
            .sign_off("Thank you,", false),
        T::ChangeOrderEmail => EmailBody::new("Change Order Request")
            .greeting()
            .paragraph("We've identified some changes to the original scope of work for job #{{job.number}} ({{job.title}}).")
            .callout("Total Additional Cost: {{invoice.total}}")
            .paragraph("Please review and approve these changes so we can proceed.")
            .sign_off("Thank you,", false),
        T::SecretWorkOrderEmail => EmailBody::new("Confidential Work Order")
            .greeting()
            .paragraph("This is a confidential work order for job #{{job.number}} ({{job.title}}).")
            .paragraph("Scheduled for: {{job.date}}")
            .sign_off("Thank you,", false),

        T::BookingFormEmail => EmailBody::new("Schedule Your Service")
            .greeting()
            .paragraph("Thank you for your interest in {{company.name}}! We make it easy to schedule your service online.")
            .button("booking-form-link", "Book Now", BLUE)
            .paragraph("Prefer to book over the phone? Call us at {{company.phone}}")
            .sign_off("We look forward to serving you!", false),
        T::ResolveEmailTemplate => EmailBody::new("Issue Resolution Update")
            .greeting()
            .paragraph("We wanted to let you know that we're actively working on resolving your issue. Your satisfaction is our top priority.")
            .paragraph("We'll keep you updated on our progress.")
            .sign_off("Thank you for your patience,", true),

        T::FinancingOffersReceivedEmail => EmailBody::new("Financing Options Available")
            .greeting()
            .paragraph("Great news! We've received financing offers for your project: {{job.title}}")
            .callout("Project Total: {{job.total}}")
            .paragraph("Review your offers to choose the option that works best for you.")
            .sign_off("Best regards,", false),
        T::FinancingApprovedEstimateAcceptedEmail => EmailBody::new("You're All Set!")
            .badge("FINANCING APPROVED")
            .greeting()
            .paragraph("Excellent news! Your financing has been approved and your estimate has been accepted. We're ready to start your project!")
            .details(&[("Project", "{{job.title}}"), ("Approved Amount", "{{job.total}}")])
            .sign_off("Thank you for choosing us!", false),
        T::FinancingApprovedEstimatePendingEmail => EmailBody::new("Financing Approved!")
            .badge("FINANCING APPROVED")
            .greeting()
            .paragraph("Great news! Your financing has been approved for your project: {{job.title}}")
            .callout("Next Step: Please review and accept your estimate to proceed with scheduling.")
            .details(&[("Approved Amount", "{{job.total}}")])
            .paragraph("Once you accept the estimate, we'll schedule your project start date.")
            .sign_off("Best regards,", false),

        T::ProposalSms => "Hi {{contact.firstName}}, your proposal from {{company.name}} is ready! View it here: {{view-proposal}}".to_string(),
        T::InvoiceSms => "Hi {{contact.firstName}}, your invoice #{{invoice.number}} for {{invoice.total}} is ready. Balance due: {{invoice.balance}}. Pay now: {{pay-invoice}} - {{company.name}}".to_string(),
        T::PaymentRequestSms => "Hi {{contact.firstName}}, you have an outstanding balance of {{invoice.balance}} on invoice #{{invoice.number}}. Pay securely here: {{payment-link}}".to_string(),
        T::AppointmentScheduledSms => "Hi {{contact.firstName}}! Your appointment is confirmed for {{appointment.date}} at {{appointment.time}}. Location: {{appointment.address}}. See you soon! - {{company.name}}".to_string(),
        T::AppointmentRescheduledSms => "Hi {{contact.firstName}}, your appointment has been rescheduled to {{appointment.date}} at {{appointment.time}}. Location: {{appointment.address}} - {{company.name}}".to_string(),
        T::JobScheduledSms => "Hi {{contact.firstName}}! Your job #{{job.number}} is scheduled for {{job.date}} at {{job.time}}. Location: {{job.address}}. - {{company.name}}".to_string(),
        T::JobRescheduledSms => "Hi {{contact.firstName}}, job #{{job.number}} has been rescheduled to {{job.date}} at {{job.time}}. - {{company.name}}".to_string(),
        T::WorkOrderSms => "Work Order for {{job.number}} scheduled on {{job.date}}. Our crew will be on-site as planned. - {{company.name}}".to_string(),
        T::ChangeOrderSms => "Change order for job #{{job.number}}. Please review and approve the additional work. Contact us with questions. - {{company.name}}".to_string(),
        T::SecretWorkOrderSms => "Confidential work order for job #{{job.number}}. Details sent via secure channel. - {{company.name}}".to_string(),
        T::OnSiteEstimateScheduledSms => "Hi {{contact.firstName}}! On-site estimate scheduled for {{appointment.date}} at {{appointment.time}}. Location: {{appointment.address}}. - {{company.name}}".to_string(),
        T::BookingFormSms => "Hi {{contact.firstName}}! Ready to schedule? Book your appointment online: {{booking-form-link}} - {{company.name}}".to_string(),
        T::ConfirmationSmsTemplate => "Thanks for confirming, {{contact.firstName}}! We'll see you on {{appointment.date}} at {{appointment.time}}.".to_string(),
        T::ResolveSmsTemplate => "Hi {{contact.firstName}}, we're working on resolving your issue. We'll keep you updated. Thank you for your patience. - {{company.name}}".to_string(),
    }
}

/// Built-in Terms & Conditions variations as `(variation name, content)`.
#[must_use]
pub fn default_terms_variations() -> Vec<(&'static str, String)> {
    vec![("Standard", terms_document())]
}

fn terms_document() -> String {
    const SECTIONS: [(&str, &str); 5] = [
        ("1. Payment Terms", "Payment is due upon completion of work unless otherwise agreed in writing. We accept cash, check, credit card, and ACH transfers. A deposit may be required for larger projects."),
        ("2. Warranty", "All work is guaranteed for one year from the date of completion. This warranty covers defects in workmanship but does not cover damage from normal wear and tear, improper use, or external factors."),
        ("3. Cancellation Policy", "Cancellations must be made at least 48 hours in advance. Late cancellations may be subject to a cancellation fee."),
        ("4. Liability", "{{company.name}} carries full liability insurance. We are not responsible for damage to property caused by pre-existing conditions or factors beyond our control."),
        ("5. Changes to Work", "Any changes to the agreed scope of work must be approved in writing and may result in additional charges."),
    ];

    let mut html = String::from(
        "<div style=\"font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; line-height: 1.6; color: #333;\">\n  \
         <h1 style=\"color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px;\">Terms and Conditions</h1>\n",
    );
    for (heading, text) in SECTIONS {
        html.push_str(&format!(
            "  <h2 style=\"color: #34495e; margin-top: 30px;\">{heading}</h2>\n  <p>{text}</p>\n"
        ));
    }
    html.push_str(
        "  <div style=\"margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 12px; color: #7f8c8d;\">\n    \
         <p><strong>{{company.name}}</strong><br>\n    {{company.phone}}<br>\n    {{company.email}}<br>\n    {{company.address}}</p>\n  \
         </div>\n</div>\n",
    );
    html
}

fn invoice_fineprint() -> String {
    "<div style=\"font-size: 11px; color: #7f8c8d; line-height: 1.5; border-top: 1px solid #ddd; padding-top: 15px; margin-top: 30px;\">\n  \
     <p style=\"margin: 8px 0;\"><strong>Payment Terms:</strong> Payment is due by {{invoice.dueDate}}. Late payments may be subject to interest charges.</p>\n  \
     <p style=\"margin: 8px 0;\"><strong>Questions?</strong> Contact us at {{company.phone}} or {{company.email}}</p>\n  \
     <p style=\"margin: 8px 0; font-size: 10px;\">{{company.name}} - All rights reserved.</p>\n\
     </div>\n"
        .to_string()
}

/// Card-style HTML email assembled block by block.
struct EmailBody {
    heading: String,
    badge: Option<String>,
    blocks: Vec<String>,
}

impl EmailBody {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            badge: None,
            blocks: Vec::new(),
        }
    }

    fn badge(mut self, text: &str) -> Self {
        self.badge = Some(text.to_string());
        self
    }

    fn greeting(self) -> Self {
        self.paragraph("Hi {{contact.firstName}},")
    }

    fn paragraph(mut self, text: &str) -> Self {
        self.blocks.push(format!("<p>{text}</p>"));
        self
    }

    fn callout(mut self, text: &str) -> Self {
        self.blocks.push(format!(
            "<div style=\"background-color: #fff3cd; padding: 20px; border-radius: 6px; margin: 20px 0; border-left: 4px solid #ffc107;\">\
             <p style=\"margin: 0; font-size: 16px;\"><strong>{text}</strong></p></div>"
        ));
        self
    }

    fn details(mut self, rows: &[(&str, &str)]) -> Self {
        let rows: String = rows
            .iter()
            .map(|(label, value)| {
                format!(
                    "\n      <tr><td style=\"padding: 8px 0; color: #7f8c8d;\">{label}:</td>\
                     <td style=\"padding: 8px 0; text-align: right; font-weight: bold;\">{value}</td></tr>"
                )
            })
            .collect();
        self.blocks.push(format!(
            "<div style=\"background-color: #f8f9fa; padding: 20px; border-radius: 6px; margin: 20px 0;\">\n    \
             <table style=\"width: 100%; border-collapse: collapse;\">{rows}\n    </table>\n    </div>"
        ));
        self
    }

    fn button(mut self, action: &str, label: &str, color: &str) -> Self {
        self.blocks.push(format!(
            "<div style=\"text-align: center; margin: 25px 0;\">\
             <a href=\"{{{{{action}}}}}\" style=\"display: inline-block; background-color: {color}; color: #ffffff; \
             padding: 12px 30px; text-decoration: none; border-radius: 5px; font-weight: bold;\">{label}</a></div>"
        ));
        self
    }

    fn sign_off(self, closing: &str, with_phone: bool) -> String {
        let phone = if with_phone { "<br>\n        {{company.phone}}" } else { "" };
        let badge = self
            .badge
            .map(|text| {
                format!(
                    "\n    <div style=\"text-align: center; margin-bottom: 25px;\">\
                     <span style=\"display: inline-block; background-color: #27ae60; color: white; padding: 10px 20px; \
                     border-radius: 25px; font-size: 14px; font-weight: bold;\">&#10003; {text}</span></div>"
                )
            })
            .unwrap_or_default();
        let blocks: String = self
            .blocks
            .iter()
            .map(|b| format!("\n    {b}"))
            .collect();

        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; background-color: #f9f9f9; padding: 20px;\">\n  \
             <div style=\"background-color: #ffffff; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);\">{badge}\n    \
             <h2 style=\"color: #2c3e50; margin-top: 0;\">{heading}</h2>{blocks}\n    \
             <div style=\"margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd;\">\n      \
             <p style=\"margin: 5px 0; color: #7f8c8d; font-size: 14px;\">\n        \
             {closing}<br>\n        <strong>{{{{company.name}}}}</strong>{phone}\n      </p>\n    </div>\n  </div>\n</div>\n",
            heading = self.heading,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::templates::keywords::unknown_keywords;
    use crate::features::templates::render::extract_keywords;

    #[test]
    fn test_defaults_only_use_offered_keywords() {
        for t in TemplateType::ALL {
            let unknown = unknown_keywords(&default_content(t), t);
            assert!(unknown.is_empty(), "{t}: {unknown:?}");
            if let Some(subject) = default_subject(t) {
                assert!(unknown_keywords(subject, t).is_empty(), "{t} subject");
            }
        }
    }

    #[test]
    fn test_every_type_has_a_body() {
        for t in TemplateType::ALL {
            assert!(!default_content(t).trim().is_empty(), "{t}");
        }
    }

    #[test]
    fn test_subjects_only_for_email_kinds() {
        assert_eq!(
            default_subject(TemplateType::InvoiceEmail),
            Some("Invoice #{{invoice.number}} from {{company.name}}")
        );
        assert_eq!(
            default_subject(TemplateType::TermsAndConditions),
            Some("Terms and Conditions")
        );
        assert!(default_subject(TemplateType::InvoiceSms).is_none());
        assert!(default_subject(TemplateType::InvoiceFineprint).is_none());

        for t in TemplateType::ALL {
            if default_subject(t).is_some() {
                assert!(t.is_email(), "{t}");
            }
        }
    }

    #[test]
    fn test_email_buttons_are_action_hrefs() {
        let body = default_content(TemplateType::InvoiceEmail);
        assert!(body.contains("href=\"{{view-invoice}}\""));
        assert!(body.contains("href=\"{{pay-invoice}}\""));
        assert!(body.contains(">Pay Now</a>"));

        let keys = extract_keywords(&body);
        assert!(keys.contains("invoice.balance"));
        assert!(keys.contains("company.name"));
    }

    #[test]
    fn test_sms_bodies_are_plain_text() {
        for t in TemplateType::ALL {
            if t.channel() == crate::features::templates::types::Channel::Sms {
                let body = default_content(t);
                assert!(!body.contains('<'), "{t}");
                assert!(!body.contains('\n'), "{t}");
            }
        }
    }

    #[test]
    fn test_default_terms_variation() {
        let variations = default_terms_variations();
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].0, "Standard");
        assert!(variations[0].1.contains("1. Payment Terms"));
        assert!(variations[0].1.contains("{{company.address}}"));
    }
}
