//! Prompts sent to the extraction and validation collaborators.
//!
//! Every prompt asks for a single JSON object so replies can go through the
//! parsers in [`crate::extraction`].

/// Instructions accompanying a price-slip image.
pub const PRICE_SLIP_PROMPT: &str = r#"You are reading a photo of a pharmacy price list or bill.

Extract every medicine listed with:
- medicine_name: The medicine name as printed, including strength (e.g. "Dolo 650")
- price: Price per strip as a number, without currency symbols
- stock: "Available" or "Unavailable" if the slip says so, otherwise null

Ignore totals, taxes, discounts and store details.

Output JSON with an "items" array."#;

/// Instructions accompanying a prescription image.
pub const PRESCRIPTION_PROMPT: &str = r#"You are reading a photo of a medical prescription.

Identify the first prescribed medicine and return its name exactly as a
pharmacist would search for it, including strength if written.

Output JSON of the form {"medicine_name": "..."}. If no medicine can be read,
return {"medicine_name": null}."#;

/// Ask whether a typed medicine name is a real medicine.
pub fn make_validation_prompt(name: &str) -> String {
    format!(
        r#"A user searched a pharmacy app for the medicine "{}".

Decide whether this is a real medicine name (brand or generic).
If it is misspelled, give the corrected name.

Return a JSON object with:
- valid: true if the name is a real medicine, possibly misspelled
- corrected_name: The corrected spelling (null if already correct)
- reason: Short explanation when not valid (null otherwise)"#,
        name
    )
}

/// Example price-slip replies for few-shot prompting.
pub const PRICE_SLIP_EXAMPLES: &[(&str, &str)] = &[
    (
        "Dolo 650 ........ Rs 30\nAzee 500 ........ Rs 119 (out of stock)",
        r#"{"items":[{"medicine_name":"Dolo 650","price":30,"stock":null},{"medicine_name":"Azee 500","price":119,"stock":"Unavailable"}]}"#,
    ),
    (
        "CROCIN ADVANCE 20 | 15 tabs\nTotal 20",
        r#"{"items":[{"medicine_name":"Crocin Advance","price":20,"stock":null}]}"#,
    ),
];

/// Price-slip instructions, optionally followed by worked examples.
pub fn build_price_slip_prompt(include_examples: bool) -> String {
    let mut prompt = String::from(PRICE_SLIP_PROMPT);

    if include_examples {
        prompt.push_str("\n\nExamples:\n");
        for (slip, reply) in PRICE_SLIP_EXAMPLES {
            prompt.push_str("\nSlip:\n");
            prompt.push_str(slip);
            prompt.push_str("\nReply:\n");
            prompt.push_str(reply);
            prompt.push('\n');
        }
    }

    prompt
}
