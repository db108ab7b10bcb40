//! Prompt templates for each analysis kind.

/// Question used for the cached general-insights analysis.
pub const GENERAL_INSIGHTS_QUESTION: &str = "Provide a general overview of the current balloon constellation status and any notable patterns or observations.";

/// Prompt answering a user question against the constellation summary.
pub fn question_prompt(data_summary: &str, question: &str) -> String {
    format!(
        r#"You are an expert analyst for WindBorne Systems, a company that deploys weather balloons to collect atmospheric data.
You have access to the current data about their balloon constellation.

Here's a summary of the current balloon data:
{data_summary}

User question: {question}

Provide a clear, concise, and insightful analysis that answers the question.
Focus on patterns, anomalies, or operational insights that would be valuable for the WindBorne team.
Make sure your analysis is specific to the balloon data provided."#
    )
}

/// Prompt asking for next-launch recommendations.
pub fn launch_prompt(data_summary: &str) -> String {
    format!(
        r#"You are an expert mission planner for WindBorne Systems, a company that deploys weather balloons to collect atmospheric data.
Based on the current constellation data, provide recommendations for the next balloon launch.

Current constellation data:
{data_summary}

Please provide:
1. Recommended launch locations (up to 3) that would optimize global coverage
2. Explanation of why these locations would be beneficial
3. Any other strategic advice for the WindBorne team

Make your recommendations specific and actionable."#
    )
}

/// Prompt asking for an assessment of detected anomalies.
pub fn anomaly_prompt(anomaly_summary: &str) -> String {
    format!(
        r#"You are an expert analyst for WindBorne Systems specializing in anomaly detection.
Based on the data analysis, provide insights about potential anomalies in the balloon constellation.

Anomaly Detection Results:
{anomaly_summary}

Please provide:
1. An assessment of these anomalies - are they concerning or expected?
2. Possible explanations for the observed anomalies
3. Recommendations for further investigation or action

Keep your analysis concise and focused on operational implications."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_prompt_text() {
        let expected = "\
You are an expert analyst for WindBorne Systems, a company that deploys weather balloons to collect atmospheric data.
You have access to the current data about their balloon constellation.

Here's a summary of the current balloon data:
SUMMARY

User question: Where is the wind blowing?

Provide a clear, concise, and insightful analysis that answers the question.
Focus on patterns, anomalies, or operational insights that would be valuable for the WindBorne team.
Make sure your analysis is specific to the balloon data provided.";

        assert_eq!(question_prompt("SUMMARY", "Where is the wind blowing?"), expected);
    }

    #[test]
    fn test_launch_prompt_text() {
        let expected = "\
You are an expert mission planner for WindBorne Systems, a company that deploys weather balloons to collect atmospheric data.
Based on the current constellation data, provide recommendations for the next balloon launch.

Current constellation data:
SUMMARY

Please provide:
1. Recommended launch locations (up to 3) that would optimize global coverage
2. Explanation of why these locations would be beneficial
3. Any other strategic advice for the WindBorne team

Make your recommendations specific and actionable.";

        assert_eq!(launch_prompt("SUMMARY"), expected);
    }

    #[test]
    fn test_anomaly_prompt_text() {
        let expected = "\
You are an expert analyst for WindBorne Systems specializing in anomaly detection.
Based on the data analysis, provide insights about potential anomalies in the balloon constellation.

Anomaly Detection Results:
ANOMALIES

Please provide:
1. An assessment of these anomalies - are they concerning or expected?
2. Possible explanations for the observed anomalies
3. Recommendations for further investigation or action

Keep your analysis concise and focused on operational implications.";

        assert_eq!(anomaly_prompt("ANOMALIES"), expected);
    }
}
