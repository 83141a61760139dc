//! Prompt and report templates for sector analysis.
//!
//! The model prompt and the fallback report share the same five numbered sections.

/// Section headings every report carries, in order.
pub const REPORT_SECTIONS: [&str; 5] = [
    "## 1. Market Overview",
    "## 2. Key Trade Opportunities",
    "## 3. Risks and Challenges",
    "## 4. Conclusion",
    "## 5. Sources",
];

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

pub fn analysis_prompt(sector: &str, region: &str, market_data: &str) -> String {
    let title = capitalize(sector);
    format!(
        r#"You are a Trade Analyst Expert. Analyze the following market data for the '{sector}' sector in {region} and provide a structured report on trade opportunities.

Market Data:
{market_data}

Required Report Format (Markdown):
# Trade Opportunities Report: {title}

## 1. Market Overview
- Current status and key trends.

## 2. Key Trade Opportunities
- Import/Export potential.
- Emerging niches.

## 3. Risks and Challenges
- Regulatory hurdles or market barriers.

## 4. Conclusion & Recommendations

## 5. Sources
- List the titles/links provided in the data.
"#
    )
}

pub fn fallback_report(sector: &str, region: &str, reason: &str) -> String {
    let title = capitalize(sector);
    format!(
        r#"# Trade Opportunities Report: {title} (Fallback)

> **Note**: The AI analysis service is currently unavailable. This is a generated placeholder report based on the requested sector.

## 1. Market Overview
The **{sector}** sector in {region} is currently witnessing significant activity. While real-time AI analysis is temporarily unavailable, this sector generally plays a pivotal role in the country's economy.

## 2. Key Trade Opportunities
- **Exports**: High potential in international markets.
- **Domestic Growth**: Increasing demand within tier-2 and tier-3 cities.

## 3. Risks and Challenges
- **Regulatory**: Compliance with evolving government standards.
- **Global Factors**: Supply chain disruptions and currency fluctuations.

## 4. Conclusion
Investors and businesses are advised to monitor official government announcements and trade bodies for the most accurate and up-to-date specific opportunities in {sector}.

## 5. Sources
- *Data processing fell back to internal templates due to: {reason}*
- *Refer to the snippet provided in the 'market_data' section if available.*
"#
    )
}

pub fn insufficient_data_notice(sector: &str) -> String {
    format!("No sufficient data found for sector '{sector}' to perform analysis.")
}

/// True when `report` contains all five section headings in order.
pub fn has_report_sections(report: &str) -> bool {
    let mut from = 0;
    for heading in REPORT_SECTIONS {
        match report[from..].find(heading) {
            Some(idx) => from += idx + heading.len(),
            None => return false,
        }
    }
    true
}
