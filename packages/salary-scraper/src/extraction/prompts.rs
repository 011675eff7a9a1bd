//! Extraction prompt.

/// Separator placed between discussion texts in one prompt.
pub const CHUNK_DELIMITER: &str = "\n\n\n---------\n\n\n";

/// Instruction template; `{data}` is replaced with the joined texts.
pub const EXTRACTION_PROMPT: &str = r#"You are an AI that returns ONLY valid JSON. No prose, no explanation.

Extract salary related information from the following discussion content. Each output object must have the following structure:
{
    "level_name": string or null, // e.g. "SDE I", "SDE II", "Senior Software Engineer", "L3", "L4"
    "compensation": {
        "base": number or null,
        "bonus": number or null,
        "stock": number or null,
        "total_compensation": number or null // sum of base, bonus and stock
    }
}
For every value you are not able to find, set it to null. DO NOT FILL IN VALUES BASED ON ASSUMPTIONS.
If the data explicitly states an amount is zero (for example "no bonus" or "0 stock"), return 0 for it, not null.
If you are not able to find the level_name or any salary related information, return an empty JSON object {} for that data.
Do not make mistakes when identifying if a number is in lakhs or crores: 1 lakh = 100,000 and 1 crore = 10,000,000. Numbers in lakhs may carry an L suffix, e.g. 12L = 12 lakhs = 1,200,000. Numbers in crores may carry a Cr suffix, e.g. 1.5Cr = 15,000,000. Return all amounts as plain numbers.

There are multiple data given, separated by 9 dashes (---------). Process each data separately and return a JSON list with exactly one object per data, in the same order.

This is the data you are supposed to work on:

{data}
"#;

/// Join texts with [`CHUNK_DELIMITER`] and embed them in the template.
pub fn render_prompt(chunks: &[&str]) -> String {
    EXTRACTION_PROMPT.replace("{data}", &chunks.join(CHUNK_DELIMITER))
}
