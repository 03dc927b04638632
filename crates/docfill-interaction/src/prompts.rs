//! Prompt templates for the oracle calls.

use docfill_core::oracle::OracleError;
use minijinja::{Environment, context};
use once_cell::sync::Lazy;

pub const DETECTION_SYSTEM: &str = "You are an expert at analyzing legal documents and \
identifying dynamic placeholders that need to be filled in. You can distinguish between \
placeholders (like [Company Name], {{client_name}}, $[__________]) and static template text \
(like [Section 1(d)], [1]). Always respond with valid JSON only.";

pub const PHRASING_SYSTEM: &str = "You are a helpful legal assistant that converts technical \
field names into natural, conversational questions. Always respond with valid JSON only.";

pub const RESOLUTION_SYSTEM: &str = "You are an expert at analyzing documents and finding \
placeholders. Always respond with valid JSON only.";

const DETECTION_TEMPLATE: &str = r#"Analyze the following legal document text and identify all DYNAMIC PLACEHOLDERS that need to be filled in with user data.

INCLUDE placeholders like:
- [Company Name], [Investor Name], [Date]
- {{ "{{client_name}}" }}, {{ "{{contract_amount}}" }}
- $[_____________] or $[__________] when they represent fields to be filled (look at nearby text for context)
- Any text that looks like a variable to be filled in

EXCLUDE:
- Section references like [Section 1(d)], [1], [a], [i]
- Footnote markers like [1], [2]
- Static text in brackets
- Legal citation references
- Page numbers

For underscore blanks, infer the field name from the surrounding text. For example,
"$[_____________] (the "Purchase Amount")" is the field "Purchase Amount".

Document text:
{{ document }}

Return ONLY a JSON array of the dynamic placeholder field names you found, using descriptive names from context.
For example:
["Company Name", "Investor Name", "Date of Safe", "Purchase Amount", "Valuation Cap"]

Do not include any explanation, just the JSON array."#;

const PHRASING_TEMPLATE: &str = r#"I have a legal document with the following placeholder fields:
{% for field in fields %}- {{ field }}
{% endfor %}
Convert each field name into a natural, conversational question that I can ask a client.
The questions should be friendly, professional and easy to understand.
Also pick the input type of each field: "text", "number" or "date".

Return ONLY a JSON object whose keys are the field names exactly as listed above.
Example format: {"field_name": {"question": "What is the field name you'd like to use?", "type": "text"}}

Do not include any explanation, just the JSON object."#;

const RESOLUTION_TEMPLATE: &str = r#"Given this document text and a list of field names, find the EXACT placeholder text in the document that should be replaced for each field.

Fields to find: {{ fields | tojson }}

Document text:
{{ document }}

For each field, identify the exact placeholder text as it appears in the document. This could be:
- [Field Name] format
- {{ "{{field_name}}" }} format
- $[___________] (underscore blanks)
- Any other placeholder format

Return a JSON object mapping each field name to its exact placeholder text. For example:
{"company_name": "[COMPANY]", "investor_name": "[Investor Name]", "purchase_amount": "$[_____________]"}

Return the EXACT text as it appears in the document, including brackets, dollar signs and underscores.
Omit fields you cannot find. Do not include any explanation, just the JSON object."#;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    // Document text is not HTML.
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    for (name, source) in [
        ("detect", DETECTION_TEMPLATE),
        ("phrase", PHRASING_TEMPLATE),
        ("resolve", RESOLUTION_TEMPLATE),
    ] {
        if let Err(err) = env.add_template(name, source) {
            tracing::error!(template = name, error = %err, "Invalid prompt template");
        }
    }
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Result<String, OracleError> {
    TEMPLATES
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|e| OracleError::NotConfigured(format!("prompt '{name}' failed to render: {e}")))
}

/// Field detection prompt over already truncated document text.
pub fn detection_prompt(document: &str) -> Result<String, OracleError> {
    render("detect", context! { document => document })
}

pub fn phrasing_prompt(fields: &[String]) -> Result<String, OracleError> {
    render("phrase", context! { fields => fields })
}

/// Placeholder resolution prompt over already truncated document text.
pub fn resolution_prompt(document: &str, fields: &[String]) -> Result<String, OracleError> {
    render("resolve", context! { document => document, fields => fields })
}
