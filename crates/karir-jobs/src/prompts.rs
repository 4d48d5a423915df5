//! Instructions for the single-purpose model calls

pub const RATING_INSTRUCTIONS: &str = "\
Your task is to evaluate the compatibility between a keyword and a job.
The compatibility score must be an integer between 0 and 100, where:
- 100: the keyword is highly relevant to the job, essential or frequently used in it.
- 0: the keyword has no relevance to the job and is not typically associated with it.
Focus on whether the keyword is relevant for the job, such as a required skill, tool, interest or qualification.
Output only the compatibility score as an integer (e.g. 85). Do not include any other text, symbols or characters.";

pub fn rating_prompt(keyword: &str, job: &str) -> String {
    format!(
        "From the scale 0 - 100, what is the compatibility for {} to have a job as a {}",
        keyword, job
    )
}

pub const KEYWORD_INSTRUCTIONS: &str = "\
You turn a RIASEC (Holland Code) profile into job search keywords.
Given the user's three strongest types, list short job titles (one to three words each) that suit the profile.
Output only the titles as a comma separated list, in English, without numbering, brackets or quotes.";

pub fn keyword_prompt(top3: &str, count: usize) -> String {
    format!("Give {} job titles for a person whose strongest RIASEC types are: {}", count, top3)
}

pub const TOPIC_INSTRUCTIONS: &str = "\
You are a topic generation expert. Your task is to:
1. Take a user's RIASEC test result as input.
2. Identify the most relevant occupations suited for the given RIASEC profile.
3. Generate a topic for educational content that would help the user prepare for those occupations.
Output the topic in a single sentence, focusing on specific skills, knowledge, or training areas.";

pub fn topic_prompt(riasec_result: &str) -> String {
    format!("Generate a topic for RIASEC result: {}", riasec_result)
}

pub const SYNTHESIS_INSTRUCTIONS: &str = "\
You are a synthesis expert. Analyze the raw educational content provided, identify key themes,
combine information from the sources and keep to the facts.
Provide a 2-3 paragraph synthesis of the main points.";

pub fn synthesis_prompt(raw: &str) -> String {
    format!("Synthesize this educational content:\n{}", raw)
}

pub const SUMMARY_INSTRUCTIONS: &str = "\
You are an expert educational content summarizer.
Highlight the key skills, knowledge areas or certifications related to the topic, practical steps or resources
to acquire them, and why they matter for career preparation. Only use what is found in the provided content or
is general knowledge; never fabricate resources. Always include the URLs of the sources that are mentioned.
Write a single paragraph of 250-400 words and start directly with the content, without meta-text such as
\"Here's a summary\".";

pub fn summary_prompt(synthesis: &str) -> String {
    format!("Summarize this synthesis:\n{}", synthesis)
}
