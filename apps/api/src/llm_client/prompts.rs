// Prompt constants for the resume parse pipeline.

/// System persona sent on every chat request.
pub const PARSE_SYSTEM: &str = "You are a resume parsing expert that extracts \
    structured information accurately. Only respond with the JSON.";

/// Instruction template for structuring a resume. The target shape is
/// described as a JSON skeleton with placeholder values; the model is
/// trusted to follow it loosely rather than against a machine-checked
/// schema.
pub const PARSE_PROMPT_TEMPLATE: &str = r#"You are a resume parsing expert. Extract structured information from the following resume text.
Return a JSON object with the following structure:
{
    "personal_details": {
        "name": "Full Name",
        "phone": "Phone Number",
        "email": "Email Address",
        "linkedin": "LinkedIn URL",
        "location": "Location/Address",
        "other_contacts": ["Any other contact information"]
    },
    "about": "Extract the about/summary/profile section text (this might not have a header and could be at the beginning)",
    "sections": [
        {
            "title": "Section Title (e.g. Experience, Education, Skills)",
            "content": "Full text content of this section"
        }
    ]
}

When extracting sections, make sure to:
1. Preserve the original section headers exactly as they appear
2. Include ALL content under each section
3. Keep the order of sections as they appear in the resume
4. Don't miss any sections, even minor ones
5. Make sure the JSON is valid and properly formatted

Resume text:
{resume_text}
"#;

/// Builds the parse prompt for one resume. Pure substitution, no side
/// effects.
pub fn build_prompt(resume_text: &str) -> String {
    PARSE_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}
