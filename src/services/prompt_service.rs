use crate::models::email_request::EmailRequestFields;

const DRAFTING_INSTRUCTIONS: &str = "Instructions for drafting the email:
1. Read the details about the recipient, the sender and the other attributes of the email such as reason, tone and language.
2. No subject line is provided. Once you understand the reason and the other details, write a subject line that fits them.
3. Return the result in an email format, not as one long paragraph.
4. Add a greeting and a closing that suit the kind of email.

IMPORTANT: Some of these details may be left blank by the user: recipient role, recipient company name, sender role, sender contact, sender company, specific details, call to action, attachment information and additional instructions. A blank detail is an empty value. Do not invent content for blank details. Write the email only from the details that were provided and ignore the blank ones.

Do not show the detail labels in the email. Do not add any commentary outside the complete email. Avoid symbols such as * where they are not needed.

These are the details of the email provided by the user. Remember that some of them may be empty:";

/// Renders the instruction prompt for one generation request.
///
/// Every field is listed under its label, including blank ones, so the model
/// can see what was left out. Values are copied verbatim.
pub fn build_prompt(fields: &EmailRequestFields) -> String {
    let details: [(&str, String); 14] = [
        ("Recipient Name", fields.recipient_name.clone()),
        ("Recipient Role", fields.recipient_role.clone()),
        ("Recipient Company Name", fields.company_name.clone()),
        ("Sender Name", fields.sender_name.clone()),
        ("Sender Role", fields.sender_role.clone()),
        ("Sender Contact", fields.sender_contact.clone()),
        ("Sender Company", fields.sender_company.clone()),
        ("Reason for the email", fields.email_reason.clone()),
        ("Specific details, if any", fields.specific_details.clone()),
        ("Formality", fields.language.to_string()),
        ("Tone of the email", fields.tone_style.to_string()),
        ("Call to action, if any", fields.cta_outcome.clone()),
        ("Attachment information, if any", fields.attachment_info.clone()),
        ("Additional instructions from the user", fields.additional_instructions.clone()),
    ];

    let mut prompt = String::from(DRAFTING_INSTRUCTIONS);
    prompt.push('\n');
    for (label, value) in details.iter() {
        prompt.push('\n');
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(value);
    }
    prompt
}
