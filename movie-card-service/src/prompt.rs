/// Preamble for every recommendation request
pub const SYSTEM_PROMPT: &str = r#"You are a professional movie recommendation expert. Your task is to recommend the movies that best fit the user's description.

Follow these rules:
1. Only recommend movies that match the user's description
2. Make every reason personal and tied to what the user wrote
3. Pick a color that captures the overall atmosphere of the movie
4. Keep tags short and relevant

Output requirements:
- Respond with strict JSON only, no other text
- The reason must be at most two sentences
- Use 3 to 5 mood tags per movie"#;

/// Builds the user turn asking for `count` movies.
pub fn user_prompt(user_input: &str, count: usize) -> String {
    format!(
        r#"Recommend {count} movie(s) for the following description:

User description: {user_input}

For each movie provide:
1. "title": the movie title
2. "year": the release year
3. "director": the director
4. "reason_for_recommendation": why this movie suits the user
5. "mood_tags": 3 to 5 mood or style tags
6. "color_hex": a hex color representing the movie's atmosphere, such as #0F172A

Return the result as a JSON array."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_carries_description_and_count() {
        let prompt = user_prompt("a cozy rainy-day anime", 3);
        assert!(prompt.contains("Recommend 3 movie(s)"));
        assert!(prompt.contains("User description: a cozy rainy-day anime"));
        assert!(prompt.contains("\"color_hex\""));
    }
}
